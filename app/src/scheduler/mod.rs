use std::sync::{Arc, Mutex};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use models::domains::matches;
use models::schemas::game::{SessionStatus, Side, Snapshot};
use models::schemas::player::Principal;
use models::schemas::wire::ServerFrame;

use crate::engine::physics::TICK_INTERVAL;
use crate::engine::session::Session;
use crate::error::AppError;
use crate::persistence::matches as match_store;
use crate::persistence::tournaments::{self, MatchOutcome};
use crate::state::AppState;

enum Tick {
    Ran,
    Finished,
    Stopped,
}

/// Transition a session into Playing and make sure exactly one tick task is
/// scheduled for it. Both happen under one lock, so two racing starts cannot
/// double-schedule.
pub fn start_session(state: &AppState, session: &Arc<Mutex<Session>>) -> Result<(), AppError> {
    let mut guard = session.lock().unwrap();
    guard.start()?;
    if !guard.has_ticker() {
        let handle = tokio::spawn(run_ticks(state.clone(), Arc::clone(session)));
        guard.set_ticker(handle);
    }
    Ok(())
}

/// Pause a session and cancel its tick schedule.
pub fn stop_session(session: &Arc<Mutex<Session>>) {
    let mut guard = session.lock().unwrap();
    guard.stop();
    if let Some(handle) = guard.take_ticker() {
        handle.abort();
    }
}

/// The per-session tick task. Each iteration does the in-memory work under
/// the session lock (no await inside), then the snapshot fan-out rides the
/// seats' send queues; a backpressured socket cannot delay the next tick.
async fn run_ticks(state: AppState, session: Arc<Mutex<Session>>) {
    let mut timer = interval(TICK_INTERVAL);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        let outcome = {
            let mut guard = session.lock().unwrap();
            if guard.status() != SessionStatus::Playing {
                Tick::Stopped
            } else {
                guard.advance();
                let snapshot = guard.snapshot();
                if snapshot.status == SessionStatus::Finished {
                    guard.broadcast(&ServerFrame::GameOver { snapshot });
                    Tick::Finished
                } else {
                    guard.broadcast(&ServerFrame::State { snapshot });
                    Tick::Ran
                }
            }
        };
        match outcome {
            Tick::Ran => {}
            Tick::Stopped => break,
            Tick::Finished => {
                finalize(&state, &session).await;
                break;
            }
        }
    }

    session.lock().unwrap().take_ticker();
}

/// Persist the outcome of a finished session and let the tournament state
/// machine advance. Ad hoc sessions have no match row and nothing to record.
async fn finalize(state: &AppState, session: &Arc<Mutex<Session>>) {
    let (session_id, match_id, snapshot, left, right) = {
        let guard = session.lock().unwrap();
        (
            guard.id.clone(),
            guard.match_id,
            guard.snapshot(),
            guard.player_at(Side::Left).cloned(),
            guard.player_at(Side::Right).cloned(),
        )
    };

    info!(
        session = %session_id,
        left = snapshot.score.left,
        right = snapshot.score.right,
        "match finished"
    );

    let Some(match_id) = match_id else { return };
    let row = match match_store::get_match(&state.conn, match_id).await {
        Ok(row) => row,
        Err(err) => {
            error!(match_id, "finished match row missing: {err}");
            return;
        }
    };

    if left.is_none() && right.is_none() {
        warn!(match_id, "no seat was ever bound; result not recorded");
        return;
    }

    let outcome = seat_outcome(&row, snapshot, left, right);
    if let Err(err) = tournaments::record_match_result(&state.conn, match_id, outcome).await {
        error!(match_id, "failed to record match result: {err}");
    }
}

/// Seats are handed out first come first served, so seat Left is not
/// necessarily `player_a` of the match row. The sticky bind-time principals
/// decide the mapping; an unbound seat falls back to row order.
fn seat_outcome(
    row: &matches::Model,
    snapshot: Snapshot,
    left: Option<Principal>,
    right: Option<Principal>,
) -> MatchOutcome {
    let left_score = snapshot.score.left as i32;
    let right_score = snapshot.score.right as i32;

    let swapped = matches!(&left, Some(p) if p.id == row.player_b)
        || matches!(&right, Some(p) if p.id == row.player_a);
    let (score_a, score_b) = if swapped {
        (right_score, left_score)
    } else {
        (left_score, right_score)
    };
    let winner_id = if score_a > score_b {
        row.player_a
    } else {
        row.player_b
    };

    MatchOutcome {
        score_a,
        score_b,
        winner_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::domains::sea_orm_active_enums::MatchRound;
    use models::schemas::game::{
        BallSchema, PaddleIntent, PaddleSchema, ScoreSchema, SessionStatus,
    };

    fn row(player_a: i32, player_b: i32) -> matches::Model {
        matches::Model {
            id: 1,
            tournament_id: Some("t".into()),
            player_a,
            player_b,
            session_id: Some("s".into()),
            score_a: 0,
            score_b: 0,
            winner_id: None,
            round: Some(MatchRound::Semi1),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn snapshot(left: u32, right: u32) -> Snapshot {
        Snapshot {
            ball: BallSchema {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
            },
            left_paddle: PaddleSchema {
                y: 0.0,
                intent: PaddleIntent::Stop,
            },
            right_paddle: PaddleSchema {
                y: 0.0,
                intent: PaddleIntent::Stop,
            },
            score: ScoreSchema { left, right },
            status: SessionStatus::Finished,
        }
    }

    fn principal(id: i32) -> Principal {
        Principal {
            id,
            username: format!("p{id}"),
        }
    }

    #[test]
    fn outcome_follows_row_order_when_seats_match() {
        let outcome = seat_outcome(
            &row(10, 20),
            snapshot(5, 2),
            Some(principal(10)),
            Some(principal(20)),
        );
        assert_eq!((outcome.score_a, outcome.score_b), (5, 2));
        assert_eq!(outcome.winner_id, 10);
    }

    #[test]
    fn outcome_swaps_scores_when_player_b_sat_left() {
        let outcome = seat_outcome(
            &row(10, 20),
            snapshot(5, 2),
            Some(principal(20)),
            Some(principal(10)),
        );
        assert_eq!((outcome.score_a, outcome.score_b), (2, 5));
        assert_eq!(outcome.winner_id, 20);
    }

    #[test]
    fn outcome_falls_back_to_row_order_for_unbound_seats() {
        let outcome = seat_outcome(&row(10, 20), snapshot(1, 5), Some(principal(10)), None);
        assert_eq!((outcome.score_a, outcome.score_b), (1, 5));
        assert_eq!(outcome.winner_id, 20);
    }
}
