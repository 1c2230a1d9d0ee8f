use sea_orm::prelude::DateTimeUtc;
use serde::Serialize;

use crate::domains::sea_orm_active_enums::TournamentStatus;
use crate::domains::{tournament_players, tournaments};

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSchema {
    pub id: String,
    pub created_by: i32,
    pub status: TournamentStatus,
    pub created_at: DateTimeUtc,
}

impl From<tournaments::Model> for TournamentSchema {
    fn from(tournament: tournaments::Model) -> Self {
        Self {
            id: tournament.id,
            created_by: tournament.created_by,
            status: tournament.status,
            created_at: tournament.created_at.to_utc(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlayerSchema {
    pub player_id: i32,
    pub username: Option<String>,
    pub slot: i32,
    pub position: Option<i32>,
}

impl TournamentPlayerSchema {
    pub fn new(row: tournament_players::Model, username: Option<String>) -> Self {
        Self {
            player_id: row.player_id,
            username,
            slot: row.slot,
            position: row.position,
        }
    }
}

/// Roster view: tournament plus its slot assignments in slot order.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDetailSchema {
    #[serde(flatten)]
    pub tournament: TournamentSchema,
    pub players: Vec<TournamentPlayerSchema>,
}
