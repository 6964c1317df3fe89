use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::repositories::RosterRepository;
use crate::domain::roster::Roster;

/// In-memory implementation of RosterRepository
///
/// Holds a single snapshot for the lifetime of the session. Nothing is
/// written anywhere else, so the data is gone when the process exits.
pub struct InMemoryRosterRepository {
    current: RwLock<Roster>,
}

impl InMemoryRosterRepository {
    /// Creates a new InMemoryRosterRepository
    ///
    /// # Arguments
    /// * `roster` - Snapshot served until the first `store`
    pub fn new(roster: Roster) -> Self {
        Self {
            current: RwLock::new(roster),
        }
    }
}

#[async_trait]
impl RosterRepository for InMemoryRosterRepository {
    async fn load(&self) -> Result<Roster, String> {
        Ok(self.current.read().await.clone())
    }

    async fn store(&self, roster: Roster) -> Result<(), String> {
        *self.current.write().await = roster;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;

    #[tokio::test]
    async fn load_returns_initial_snapshot() {
        let repo = InMemoryRosterRepository::new(seed::roster().unwrap());

        let roster = repo.load().await.unwrap();

        assert_eq!(roster.agents().len(), 3);
        assert_eq!(roster.tasks().len(), 6);
    }

    #[tokio::test]
    async fn store_swaps_whole_snapshot() {
        let repo = InMemoryRosterRepository::new(seed::roster().unwrap());
        let held = repo.load().await.unwrap();

        let agent = held.agents()[0].clone().activate();
        repo.store(held.replace_agent(agent)).await.unwrap();

        let fresh = repo.load().await.unwrap();
        assert!(fresh.agents()[0].is_active());
        // A snapshot taken earlier never changes underneath its reader
        assert!(!held.agents()[0].is_active());
    }
}
