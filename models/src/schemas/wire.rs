use serde::{Deserialize, Serialize};

use super::game::{PaddleIntent, Side, Snapshot};

/// Frames a seat may send over its real-time connection. Newline-delimited
/// JSON text, dispatched on the `type` tag.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    Paddle { direction: PaddleIntent },
    Start,
    Stop,
    Ping,
}

/// Frames pushed to a seat. `State` is broadcast at the tick rate, not a
/// reply to anything.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    Connected { seat: Side },
    State { snapshot: Snapshot },
    GameOver { snapshot: Snapshot },
    Error { message: String },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_frames_dispatch_on_the_type_tag() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"paddle","direction":"up"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Paddle {
                direction: PaddleIntent::Up
            }
        );

        let frame: ClientFrame = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Ping);
    }

    #[test]
    fn unknown_inbound_types_fail_to_parse() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"cheat"}"#).is_err());
    }

    #[test]
    fn outbound_frames_carry_their_tag() {
        let text = serde_json::to_string(&ServerFrame::Connected { seat: Side::Left }).unwrap();
        assert_eq!(text, r#"{"type":"connected","seat":"left"}"#);

        let text = serde_json::to_string(&ServerFrame::Pong).unwrap();
        assert_eq!(text, r#"{"type":"pong"}"#);
    }
}
