use sea_orm::prelude::DateTimeUtc;
use serde::Serialize;

use crate::domains::matches;
use crate::domains::sea_orm_active_enums::MatchRound;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchSchema {
    pub id: i32,
    pub tournament_id: Option<String>,
    pub player_a: i32,
    pub player_b: i32,
    pub session_id: Option<String>,
    pub score_a: i32,
    pub score_b: i32,
    pub winner_id: Option<i32>,
    pub round: Option<MatchRound>,
    pub created_at: DateTimeUtc,
}

impl From<matches::Model> for MatchSchema {
    fn from(m: matches::Model) -> Self {
        Self {
            id: m.id,
            tournament_id: m.tournament_id,
            player_a: m.player_a,
            player_b: m.player_b,
            session_id: m.session_id,
            score_a: m.score_a,
            score_b: m.score_b,
            winner_id: m.winner_id,
            round: m.round,
            created_at: m.created_at.to_utc(),
        }
    }
}
