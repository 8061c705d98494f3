//! Typed access to game-state documents and roster synchronization.

use codenames_core::{GameState, JsonPath, MemberId, PlayerSummary, Roster, SessionId};
use std::sync::Arc;

use crate::state::{StateStore, StoreError, StoreResult};

/// What roster synchronization did for a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterOutcome {
    /// The member was already listed in some roster (holds which one)
    AlreadyPresent(Roster),
    /// The member's summary was appended to the target roster
    Appended,
}

/// Game-state operations over a [`StateStore`].
///
/// Roster synchronization is check-then-append: two processes adding the
/// same member at once can both append. Within one process callers serialize
/// joins per session, so duplicates only arise across processes.
#[derive(Clone)]
pub struct GameStateRepository {
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for GameStateRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateRepository").finish_non_exhaustive()
    }
}

impl GameStateRepository {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Write the initial document for a new game
    pub async fn create(&self, session_id: SessionId, state: &GameState) -> StoreResult<()> {
        let document = serde_json::to_value(state)?;
        self.store.write_document(session_id, &document).await
    }

    /// Read and decode the whole document
    pub async fn fetch(&self, session_id: SessionId) -> StoreResult<GameState> {
        let document = self
            .store
            .read_path(session_id, &JsonPath::root())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(session_id))?;
        Ok(serde_json::from_value(document)?)
    }

    /// The first roster that lists `member`, checking each in turn
    pub async fn find_roster(
        &self,
        session_id: SessionId,
        member: MemberId,
    ) -> StoreResult<Option<Roster>> {
        for roster in Roster::ALL {
            let matches = self
                .store
                .read_path(session_id, &roster.member_path(member))
                .await?;
            if !matches.is_empty() {
                return Ok(Some(roster));
            }
        }
        Ok(None)
    }

    /// Add `player` to `target` unless any roster already lists them
    pub async fn add_to_roster(
        &self,
        session_id: SessionId,
        target: Roster,
        player: &PlayerSummary,
    ) -> StoreResult<RosterOutcome> {
        if let Some(existing) = self.find_roster(session_id, player.id).await? {
            tracing::debug!(
                session_id = %session_id,
                member_id = %player.id,
                roster = %existing.path(),
                "Member already in game state"
            );
            return Ok(RosterOutcome::AlreadyPresent(existing));
        }

        self.store
            .append_to_array(session_id, &target.path(), serde_json::to_value(player)?)
            .await?;
        tracing::debug!(
            session_id = %session_id,
            member_id = %player.id,
            roster = %target.path(),
            "Member added to game state"
        );
        Ok(RosterOutcome::Appended)
    }

    /// Drop every entry for `member` from `roster`
    pub async fn remove_from_roster(
        &self,
        session_id: SessionId,
        roster: Roster,
        member: MemberId,
    ) -> StoreResult<usize> {
        self.store
            .delete_path(session_id, &roster.member_path(member))
            .await
    }
}
