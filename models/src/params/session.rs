use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::game::SessionMode;

/// Tunables a session may be configured with while still waiting.
#[derive(Deserialize, Serialize, Validate, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    #[validate(range(min = 1.0, max = 20.0))]
    pub ball_speed: f32,
    #[validate(range(min = 1.0, max = 20.0))]
    pub paddle_speed: f32,
    #[validate(range(min = 1, max = 21))]
    pub win_score: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            ball_speed: 5.0,
            paddle_speed: 6.0,
            win_score: 5,
        }
    }
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionParams {
    pub mode: SessionMode,
    pub tournament_id: Option<String>,
    /// Required for tournament mode: the session id minted at bracket
    /// generation. Ad hoc modes get a fresh id instead.
    pub session_id: Option<String>,
    #[validate(nested)]
    pub settings: Option<GameSettings>,
}
