use async_trait::async_trait;

use crate::domain::roster::Roster;

/// Repository trait for the roster snapshot
///
/// Defines the contract for holding the current agents, tasks and
/// assignments. Implementations swap whole snapshots; they never patch
/// individual entities.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Returns the current snapshot
    async fn load(&self) -> Result<Roster, String>;

    /// Replaces the current snapshot with `roster`
    async fn store(&self, roster: Roster) -> Result<(), String>;
}
