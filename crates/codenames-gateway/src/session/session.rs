//! A running game session and its connected members
//!
//! Membership changes take the session's write lock and hold it across the
//! state-store round trips they trigger, so joins and leaves of one session
//! are totally ordered. Broadcasts only need the read lock. Members whose
//! connection fails during a fan-out are removed by a spawned task once the
//! lock is released.

use super::SessionRegistry;
use crate::connection::Member;
use crate::protocol::{CloseCode, ServerMessage};
use codenames_core::{GameState, MemberId, PlayerSummary, Roster, SessionId};
use codenames_store::{GameStateRepository, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session operation errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session emptied and was dropped from the registry
    #[error("Session {0} has been closed")]
    Retired(SessionId),

    #[error("Member belongs to session {member_session}, not {session}")]
    WrongSession {
        session: SessionId,
        member_session: SessionId,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Members to drop after a fan-out, keyed by the connection that failed
type FailedDeliveries = Vec<(MemberId, Uuid)>;

pub struct Session {
    id: SessionId,
    members: RwLock<HashMap<MemberId, Member>>,
    /// Mirrors `members.len()` for lock-free reads
    size: AtomicUsize,
    retired: AtomicBool,
    games: GameStateRepository,
    registry: Weak<SessionRegistry>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        games: GameStateRepository,
        registry: Weak<SessionRegistry>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            members: RwLock::new(HashMap::new()),
            size: AtomicUsize::new(0),
            retired: AtomicBool::new(false),
            games,
            registry,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Number of connected members
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A retired session accepts no more members
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Summaries of the connected members, ordered by id
    pub async fn members(&self) -> Vec<PlayerSummary> {
        let members = self.members.read().await;
        let mut summaries: Vec<_> = members.values().map(Member::summary).collect();
        summaries.sort_by_key(|p| p.id);
        summaries
    }

    pub async fn contains(&self, member_id: MemberId) -> bool {
        self.members.read().await.contains_key(&member_id)
    }

    /// Register `member`, sync it into the spectator roster and announce it.
    ///
    /// A member id already present on another connection is replaced and the
    /// old connection closed. If the state store fails, an error is broadcast
    /// and returned but the member stays registered.
    pub async fn add_member(self: &Arc<Self>, member: Member) -> Result<(), SessionError> {
        if member.session_id() != self.id {
            return Err(SessionError::WrongSession {
                session: self.id,
                member_session: member.session_id(),
            });
        }

        let mut members = self.members.write().await;
        if self.is_retired() {
            return Err(SessionError::Retired(self.id));
        }

        let summary = member.summary();
        let connection_id = member.connection().id();
        if let Some(previous) = members.insert(summary.id, member) {
            if previous.connection().id() != connection_id {
                tracing::info!(
                    session_id = %self.id,
                    member_id = %summary.id,
                    "Member reconnected, closing previous connection"
                );
                previous.connection().close(CloseCode::Replaced);
            }
        }
        self.size.store(members.len(), Ordering::Release);

        tracing::info!(
            session_id = %self.id,
            member_id = %summary.id,
            members = members.len(),
            "Member joined"
        );

        let mut failed = FailedDeliveries::new();
        let result = self.announce_join(&members, &summary, &mut failed).await;
        drop(members);

        self.schedule_removals(failed);
        result
    }

    async fn announce_join(
        &self,
        members: &HashMap<MemberId, Member>,
        summary: &PlayerSummary,
        failed: &mut FailedDeliveries,
    ) -> Result<(), SessionError> {
        if let Err(e) = self
            .games
            .add_to_roster(self.id, Roster::Spectators, summary)
            .await
        {
            tracing::error!(
                session_id = %self.id,
                member_id = %summary.id,
                error = %e,
                "Failed to add member to game state"
            );
            let message = ServerMessage::error(
                Some(self.id),
                "Could not add member to game state",
                Some(&e),
            );
            failed.extend(self.fan_out(members, &message));
            return Err(e.into());
        }

        let joined = ServerMessage::MemberJoined {
            session_id: self.id,
            member: summary.clone(),
        };
        failed.extend(self.fan_out(members, &joined));

        self.send_snapshot(members, failed).await
    }

    /// Remove a member whatever connection it is on. Idempotent.
    pub async fn remove_member(self: &Arc<Self>, member_id: MemberId) -> bool {
        self.remove_where(member_id, None, CloseCode::Normal).await
    }

    /// Remove a member only if it is still on `connection_id`, closing it
    /// with `code`.
    ///
    /// Used by connection teardown so a stale connection cannot evict a
    /// member that has since reconnected.
    pub async fn remove_connection(
        self: &Arc<Self>,
        member_id: MemberId,
        connection_id: Uuid,
        code: CloseCode,
    ) -> bool {
        self.remove_where(member_id, Some(connection_id), code).await
    }

    async fn remove_where(
        self: &Arc<Self>,
        member_id: MemberId,
        connection_id: Option<Uuid>,
        code: CloseCode,
    ) -> bool {
        let mut members = self.members.write().await;
        let on_connection = members.get(&member_id).is_some_and(|m| {
            connection_id.is_none_or(|id| m.connection().id() == id)
        });
        if !on_connection {
            return false;
        }
        let Some(member) = members.remove(&member_id) else {
            return false;
        };
        self.size.store(members.len(), Ordering::Release);
        member.connection().close(code);

        tracing::info!(
            session_id = %self.id,
            member_id = %member_id,
            name = member.name(),
            members = members.len(),
            code = code.as_u16(),
            "Member left"
        );

        let mut failed = FailedDeliveries::new();
        if let Err(e) = self
            .games
            .remove_from_roster(self.id, Roster::Spectators, member_id)
            .await
        {
            tracing::warn!(
                session_id = %self.id,
                member_id = %member_id,
                error = %e,
                "Failed to remove member from game state"
            );
            let message = ServerMessage::error(
                Some(self.id),
                "Could not remove member from game state",
                Some(&e),
            );
            failed.extend(self.fan_out(&members, &message));
        }

        if !members.is_empty() {
            let left = ServerMessage::MemberLeft {
                session_id: self.id,
                member: member.summary(),
            };
            failed.extend(self.fan_out(&members, &left));
            if let Err(e) = self.send_snapshot(&members, &mut failed).await {
                tracing::debug!(session_id = %self.id, error = %e, "Snapshot after leave skipped");
            }
        }

        let now_empty = members.is_empty();
        drop(members);

        self.schedule_removals(failed);
        if now_empty {
            self.request_collection().await;
        }
        true
    }

    /// Send `message` to every member. Returns how many sends succeeded.
    pub async fn broadcast(self: &Arc<Self>, message: ServerMessage) -> usize {
        let members = self.members.read().await;
        let failed = self.fan_out(&members, &message);
        let delivered = members.len() - failed.len();
        drop(members);

        self.schedule_removals(failed);
        delivered
    }

    /// Read the game-state document. Failures are broadcast before being
    /// returned.
    pub async fn fetch_state(self: &Arc<Self>) -> Result<GameState, SessionError> {
        match self.games.fetch(self.id).await {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Failed to read game state");
                let message =
                    ServerMessage::error(Some(self.id), "Could not read game state", Some(&e));
                self.broadcast(message).await;
                Err(e.into())
            }
        }
    }

    /// Broadcast a fresh `state_snapshot`
    pub async fn broadcast_state(self: &Arc<Self>) -> Result<(), SessionError> {
        let state = self.fetch_state().await?;
        self.broadcast(ServerMessage::snapshot(self.id, state)).await;
        Ok(())
    }

    async fn send_snapshot(
        &self,
        members: &HashMap<MemberId, Member>,
        failed: &mut FailedDeliveries,
    ) -> Result<(), SessionError> {
        match self.games.fetch(self.id).await {
            Ok(state) => {
                failed.extend(self.fan_out(members, &ServerMessage::snapshot(self.id, state)));
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Failed to read game state");
                let message =
                    ServerMessage::error(Some(self.id), "Could not read game state", Some(&e));
                failed.extend(self.fan_out(members, &message));
                Err(e.into())
            }
        }
    }

    fn fan_out(
        &self,
        members: &HashMap<MemberId, Member>,
        message: &ServerMessage,
    ) -> FailedDeliveries {
        let mut failed = FailedDeliveries::new();
        for member in members.values() {
            if let Err(e) = member.connection().send(message.clone()) {
                tracing::warn!(
                    session_id = %self.id,
                    member_id = %member.id(),
                    message_type = %message.message_type(),
                    error = %e,
                    "Failed to deliver message"
                );
                failed.push((member.id(), member.connection().id()));
            }
        }
        failed
    }

    fn schedule_removals(self: &Arc<Self>, failed: FailedDeliveries) {
        for (member_id, connection_id) in failed {
            let session = Arc::clone(self);
            tokio::spawn(async move {
                session
                    .remove_connection(member_id, connection_id, CloseCode::SendFailed)
                    .await;
            });
        }
    }

    async fn request_collection(&self) {
        match self.registry.upgrade() {
            Some(registry) => {
                registry.remove(self.id).await;
            }
            None => tracing::debug!(session_id = %self.id, "Registry gone, nothing to collect"),
        }
    }

    /// Retire the session if it is still empty, running `unlink` while joins
    /// are held off. Returns what `unlink` returned.
    pub(crate) async fn retire_if_empty(&self, unlink: impl FnOnce() -> bool) -> bool {
        let members = self.members.write().await;
        if !members.is_empty() || self.is_retired() {
            return false;
        }
        self.retired.store(true, Ordering::Release);
        let unlinked = unlink();
        drop(members);
        unlinked
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("members", &self.len())
            .field("retired", &self.is_retired())
            .finish_non_exhaustive()
    }
}
