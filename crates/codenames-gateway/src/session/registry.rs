//! Registry of live sessions
//!
//! Maps session ids to their running [`Session`]. Sessions are created on
//! first join and removed once their last member leaves.

use super::{Session, SessionError};
use crate::connection::Member;
use codenames_core::SessionId;
use codenames_store::GameStateRepository;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Point-in-time registry counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub sessions: usize,
    pub members: usize,
    pub members_per_session: BTreeMap<SessionId, usize>,
}

pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    games: GameStateRepository,
}

impl SessionRegistry {
    pub fn new(games: GameStateRepository) -> Arc<Self> {
        Arc::new(Self {
            sessions: DashMap::new(),
            games,
        })
    }

    pub fn games(&self) -> &GameStateRepository {
        &self.games
    }

    /// Return the session for `id`, creating it if absent.
    ///
    /// Concurrent callers for the same id all get the same instance.
    pub fn get_or_create(self: &Arc<Self>, id: SessionId) -> Arc<Session> {
        self.sessions
            .entry(id)
            .or_insert_with(|| {
                tracing::info!(session_id = %id, "Session created");
                Session::new(id, self.games.clone(), Arc::downgrade(self))
            })
            .value()
            .clone()
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Drop the session for `id` if it has no members.
    ///
    /// The session is retired under its own lock before it is unlinked, so a
    /// join racing with removal either lands first (and the removal is
    /// skipped) or sees the retired session and retries on a fresh one.
    pub async fn remove(&self, id: SessionId) -> bool {
        let Some(session) = self.get(id) else {
            return false;
        };
        let removed = session
            .retire_if_empty(|| {
                self.sessions
                    .remove_if(&id, |_, current| Arc::ptr_eq(current, &session))
                    .is_some()
            })
            .await;
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Add `member` to the session for `id`, creating the session if needed
    pub async fn admit(
        self: &Arc<Self>,
        id: SessionId,
        member: Member,
    ) -> Result<Arc<Session>, SessionError> {
        loop {
            let session = self.get_or_create(id);
            match session.add_member(member.clone()).await {
                Ok(()) => return Ok(session),
                Err(SessionError::Retired(_)) => {
                    tracing::debug!(session_id = %id, "Session retired during join, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let members_per_session: BTreeMap<_, _> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().len()))
            .collect();
        RegistryStats {
            sessions: members_per_session.len(),
            members: members_per_session.values().sum(),
            members_per_session,
        }
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}
