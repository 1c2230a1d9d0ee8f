use std::sync::{Arc, Mutex};

use models::schemas::game::{SessionMode, SessionStatus, Side};

use crate::cache::Cache;
use crate::engine::session::Session;
use crate::persistence::{ID_ALPHABET, SESSION_ID_LENGTH};

pub type SharedSession = Arc<Mutex<Session>>;

/// Single source of truth for which matches are live. All lookups, inserts
/// and deletes go through the one cache mutex, so two concurrent creates for
/// the same externally-supplied id converge on one instance.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<SharedSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Cache::new(),
        }
    }

    /// Ad hoc session with a freshly minted id.
    pub fn create(&self, mode: SessionMode) -> (String, SharedSession) {
        let id = nanoid::nanoid!(SESSION_ID_LENGTH, &ID_ALPHABET);
        let session = self.sessions.get_or_insert(&id, || {
            Arc::new(Mutex::new(Session::new(id.clone(), mode, None, None)))
        });
        (id, session)
    }

    /// Session under an id minted elsewhere (a bracket match). The second of
    /// two racing callers observes the first's instance.
    pub fn get_or_create(
        &self,
        id: &str,
        mode: SessionMode,
        tournament_id: Option<String>,
        match_id: Option<i32>,
    ) -> SharedSession {
        self.sessions.get_or_insert(id, || {
            Arc::new(Mutex::new(Session::new(
                id.to_owned(),
                mode,
                tournament_id,
                match_id,
            )))
        })
    }

    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.get_data(id)
    }

    /// Drop a session, cancelling its ticker if one is still scheduled.
    pub fn remove(&self, id: &str) -> Option<SharedSession> {
        let session = self.sessions.delete_data(id)?;
        if let Some(handle) = session.lock().unwrap().take_ticker() {
            handle.abort();
        }
        Some(session)
    }

    pub fn count(&self) -> usize {
        self.sessions.count()
    }

    /// Seat teardown policy, run on every close or transport error. A
    /// session never keeps a tick schedule with zero live connections.
    pub fn handle_disconnect(&self, id: &str, side: Side) {
        let Some(session) = self.get(id) else { return };
        let destroy = {
            let mut guard = session.lock().unwrap();
            guard.unbind(side);
            if guard.seat_count() > 0 {
                false
            } else {
                if let Some(handle) = guard.take_ticker() {
                    handle.abort();
                }
                match guard.status() {
                    // terminal sessions are dropped once the last seat leaves
                    SessionStatus::Finished => true,
                    _ => {
                        guard.stop();
                        // tournament sessions stay resumable; ad hoc ones die
                        guard.tournament_id.is_none()
                    }
                }
            }
        };
        if destroy {
            self.remove(id);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_creates_for_one_id_converge() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create("match-1", SessionMode::Tournament, None, Some(1));
        let b = registry.get_or_create("match-1", SessionMode::Tournament, None, Some(1));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn adhoc_sessions_are_destroyed_when_empty() {
        let registry = SessionRegistry::new();
        let (id, session) = registry.create(SessionMode::Remote);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let side = session
            .lock()
            .unwrap()
            .bind(
                models::schemas::player::Principal {
                    id: 1,
                    username: "p1".into(),
                },
                tx,
            )
            .unwrap();

        registry.handle_disconnect(&id, side);
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn tournament_sessions_pause_instead_of_dying() {
        let registry = SessionRegistry::new();
        let session =
            registry.get_or_create("m", SessionMode::Tournament, Some("t".into()), Some(9));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let side = session
            .lock()
            .unwrap()
            .bind(
                models::schemas::player::Principal {
                    id: 1,
                    username: "p1".into(),
                },
                tx,
            )
            .unwrap();
        session.lock().unwrap().start().unwrap();

        registry.handle_disconnect("m", side);

        let session = registry.get("m").expect("session must survive");
        assert_eq!(session.lock().unwrap().status(), SessionStatus::Paused);
        assert!(!session.lock().unwrap().has_ticker());
    }
}
