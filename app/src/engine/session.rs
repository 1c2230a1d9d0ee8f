use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use models::params::session::GameSettings;
use models::schemas::game::{PaddleIntent, SessionMode, SessionStatus, Side, Snapshot};
use models::schemas::player::Principal;
use models::schemas::wire::ServerFrame;

use crate::error::AppError;
use crate::engine::physics::Engine;

/// A bound connection: the seat's identity plus the queue its writer task
/// drains. Sends never block; a slow socket only backs up its own queue.
pub struct Seat {
    pub principal: Principal,
    tx: UnboundedSender<ServerFrame>,
}

/// Complete runtime state of one match. Owned by the registry and only ever
/// touched through it; the mutex around a session is held for in-memory work
/// only, never across an await.
pub struct Session {
    pub id: String,
    pub mode: SessionMode,
    pub tournament_id: Option<String>,
    pub match_id: Option<i32>,
    engine: Engine,
    seats: [Option<Seat>; 2],
    /// Seat occupants as of bind time. Sticky: survives disconnects so a
    /// finished match can still be attributed to its players.
    players: [Option<Principal>; 2],
    ticker: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        id: String,
        mode: SessionMode,
        tournament_id: Option<String>,
        match_id: Option<i32>,
    ) -> Self {
        Self {
            id,
            mode,
            tournament_id,
            match_id,
            engine: Engine::new(),
            seats: [None, None],
            players: [None, None],
            ticker: None,
        }
    }

    /// First connection takes the left seat, second the right; a third is
    /// refused without touching the existing seats.
    pub fn bind(
        &mut self,
        principal: Principal,
        tx: UnboundedSender<ServerFrame>,
    ) -> Result<Side, AppError> {
        let index = match self.seats.iter().position(Option::is_none) {
            Some(index) => index,
            None => return Err(AppError::conflict("session full")),
        };
        let side = if index == 0 { Side::Left } else { Side::Right };
        self.players[index] = Some(principal.clone());
        self.seats[index] = Some(Seat { principal, tx });
        Ok(side)
    }

    pub fn unbind(&mut self, side: Side) {
        self.seats[seat_index(side)] = None;
    }

    pub fn seat_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_some()).count()
    }

    pub fn player_at(&self, side: Side) -> Option<&Principal> {
        self.players[seat_index(side)].as_ref()
    }

    /// Queue a frame to every bound seat. A seat whose receiver is gone is
    /// skipped; the disconnect path will reap it.
    pub fn broadcast(&self, frame: &ServerFrame) {
        for seat in self.seats.iter().flatten() {
            let _ = seat.tx.send(frame.clone());
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.engine.status()
    }

    pub fn start(&mut self) -> Result<(), AppError> {
        self.engine.start()
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn advance(&mut self) {
        self.engine.advance();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn apply_intent(&mut self, side: Side, intent: PaddleIntent) {
        self.engine.apply_intent(side, intent);
    }

    pub fn apply_settings(&mut self, settings: &GameSettings) -> Result<(), AppError> {
        self.engine.apply_settings(settings)
    }

    pub fn set_ticker(&mut self, handle: JoinHandle<()>) {
        self.ticker = Some(handle);
    }

    pub fn take_ticker(&mut self) -> Option<JoinHandle<()>> {
        self.ticker.take()
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }
}

fn seat_index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}
