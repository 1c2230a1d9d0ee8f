use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User lifecycle event as published on the auth service's stream.
///
/// The payload is parsed into this closed set at the consumer boundary;
/// an unknown `type` tag fails deserialization and is handled there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum UserEvent {
    Created {
        id: i32,
        username: String,
        avatar: Option<String>,
        timestamp: DateTime<Utc>,
    },
    Updated {
        id: i32,
        username: String,
        avatar: Option<String>,
        timestamp: DateTime<Utc>,
    },
    Deleted { id: i32, timestamp: DateTime<Utc> },
}

impl UserEvent {
    pub fn player_id(&self) -> i32 {
        match self {
            UserEvent::Created { id, .. } => *id,
            UserEvent::Updated { id, .. } => *id,
            UserEvent::Deleted { id, .. } => *id,
        }
    }
}
