use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::players;

/// Caller identity injected by the upstream gateway. Constructed once at the
/// request boundary and passed explicitly into every handler; business logic
/// never re-derives it from headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Principal {
    pub id: i32,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlayerSchema {
    pub id: i32,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<players::Model> for PlayerSchema {
    fn from(player: players::Model) -> Self {
        Self {
            id: player.id,
            username: player.username,
            avatar: player.avatar,
        }
    }
}
