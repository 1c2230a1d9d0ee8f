use serde::{Deserialize, Serialize};

/// Lifecycle of a live session.
///
/// Waiting -> Playing -> Paused -> Playing ... -> Finished. Finished is
/// terminal; a new session must be created to play again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Local,
    Remote,
    Tournament,
}

/// One of the two logical player slots within a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddleIntent {
    Up,
    Down,
    Stop,
}

#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct BallSchema {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct PaddleSchema {
    pub y: f32,
    pub intent: PaddleIntent,
}

#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSchema {
    pub left: u32,
    pub right: u32,
}

/// Immutable projection of one simulation tick, safe to serialize and push
/// to every connected seat.
#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub ball: BallSchema,
    pub left_paddle: PaddleSchema,
    pub right_paddle: PaddleSchema,
    pub score: ScoreSchema,
    pub status: SessionStatus,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateSchema {
    pub session_id: String,
    pub snapshot: Snapshot,
}
