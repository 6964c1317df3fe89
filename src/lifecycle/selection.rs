use tokio::sync::RwLock;

use crate::domain::agent::AgentId;

/// Which agent the user has picked to run the next task
///
/// Transient UI state: it is never part of a roster snapshot and has no
/// effect on the lifecycle other than deciding who `start_selected` uses.
#[derive(Debug, Default)]
pub struct Selection {
    current: RwLock<Option<AgentId>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<AgentId> {
        self.current.read().await.clone()
    }

    /// Selects `agent`, or clears the selection if it was already selected
    ///
    /// Returns the selection after the toggle.
    pub async fn toggle(&self, agent: AgentId) -> Option<AgentId> {
        let mut current = self.current.write().await;
        if current.as_ref() == Some(&agent) {
            *current = None;
        } else {
            *current = Some(agent);
        }
        current.clone()
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
