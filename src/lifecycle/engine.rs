use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::errors::{LifecycleError, LifecycleResult};
use super::scheduler::{TransitionHandle, TransitionKind, TransitionScheduler};
use super::selection::Selection;
use crate::domain::agent::{Agent, AgentId};
use crate::domain::events::LifecycleEvent;
use crate::domain::repositories::RosterRepository;
use crate::domain::roster::Roster;
use crate::domain::seed;
use crate::domain::stats::Stats;
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::infrastructure::repositories::InMemoryRosterRepository;

/// How the engine treats unknown ids and conflicting starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPolicy {
    /// Unknown ids are ignored and nothing stops a busy agent or a task that
    /// is not available from being started. Callers do their own gating.
    Permissive,
    /// Unknown ids fail with a not-found error; busy agents and unavailable
    /// tasks fail with a conflict error.
    #[default]
    Strict,
}

impl GuardPolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, GuardPolicy::Strict)
    }
}

impl fmt::Display for GuardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardPolicy::Permissive => write!(f, "permissive"),
            GuardPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for GuardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(GuardPolicy::Permissive),
            "strict" => Ok(GuardPolicy::Strict),
            other => Err(format!("Unknown guard policy: {}", other)),
        }
    }
}

/// Tunables for a lifecycle engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub guard: GuardPolicy,
    /// Multiplier applied to every task duration (1.0 = real seconds)
    pub time_scale: f64,
    /// How long a completed task stays completed before it is available again
    pub reset_delay: Duration,
    /// Buffered events per subscriber before slow readers start lagging
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guard: GuardPolicy::Strict,
            time_scale: 1.0,
            reset_delay: Duration::from_secs(3),
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Wall-clock time a task of `duration_secs` takes to complete
    pub fn task_delay(&self, duration_secs: u64) -> Duration {
        let base = Duration::from_secs(duration_secs);
        if self.time_scale == 1.0 {
            return base;
        }
        Duration::try_from_secs_f64(base.as_secs_f64() * self.time_scale).unwrap_or(base)
    }
}

/// Timers that have not fired yet
///
/// Completions are keyed by task and agent, so two agents running the same
/// task each keep their own timer. A task has at most one pending reset.
#[derive(Debug, Default)]
struct PendingTransitions {
    completions: HashMap<(TaskId, AgentId), TransitionHandle>,
    resets: HashMap<TaskId, TransitionHandle>,
}

impl PendingTransitions {
    /// Tracks the completion timer of `agent` on the handle's task
    ///
    /// Cancels an earlier completion for the same pair and any reset still
    /// pending for the task.
    fn track_completion(&mut self, agent: AgentId, handle: TransitionHandle) {
        let task = handle.task_id();
        if let Some(previous) = self.completions.insert((task, agent), handle) {
            previous.cancel();
        }
        if let Some(reset) = self.resets.remove(&task) {
            reset.cancel();
        }
    }

    /// Tracks the reset timer of the handle's task, cancelling the previous one
    fn track_reset(&mut self, handle: TransitionHandle) {
        if let Some(previous) = self.resets.insert(handle.task_id(), handle) {
            previous.cancel();
        }
    }

    /// Forgets the completion of `agent` on `task` if it is still the timer `id`
    fn release_completion(&mut self, task: TaskId, agent: &AgentId, id: Uuid) -> bool {
        let key = (task, agent.clone());
        match self.completions.get(&key) {
            Some(handle) if handle.id() == id => {
                self.completions.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Forgets the reset of `task` if it is still the timer `id`
    fn release_reset(&mut self, task: TaskId, id: Uuid) -> bool {
        match self.resets.get(&task) {
            Some(handle) if handle.id() == id => {
                self.resets.remove(&task);
                true
            }
            _ => false,
        }
    }

    /// Removes and cancels the completion of `agent` on `task`, if any
    fn cancel_completion(&mut self, task: TaskId, agent: &AgentId) {
        if let Some(handle) = self.completions.remove(&(task, agent.clone())) {
            handle.cancel();
        }
    }

    /// Removes every timer of `task`, returning the agents whose completions
    /// were pending and the handles that were taken
    fn take_task(&mut self, task: TaskId) -> (Vec<AgentId>, Vec<TransitionHandle>) {
        let keys: Vec<_> = self
            .completions
            .keys()
            .filter(|(pending_task, _)| *pending_task == task)
            .cloned()
            .collect();

        let mut agents = Vec::with_capacity(keys.len());
        let mut handles = Vec::with_capacity(keys.len() + 1);
        for key in keys {
            if let Some(handle) = self.completions.remove(&key) {
                handles.push(handle);
                agents.push(key.1);
            }
        }
        handles.extend(self.resets.remove(&task));

        (agents, handles)
    }

    /// True while `agent` still has a completion pending on any task
    fn is_working(&self, agent: &AgentId) -> bool {
        self.completions.keys().any(|(_, pending)| pending == agent)
    }

    fn handles(&self) -> Vec<TransitionHandle> {
        let mut handles: Vec<_> = self
            .completions
            .values()
            .chain(self.resets.values())
            .cloned()
            .collect();
        handles.sort_by_key(|handle| handle.task_id());
        handles
    }
}

struct EngineInner {
    repository: Arc<dyn RosterRepository>,
    config: EngineConfig,
    scheduler: TransitionScheduler,
    events: broadcast::Sender<LifecycleEvent>,
    /// Held for the whole of every mutation, so only one runs at a time
    pending: Mutex<PendingTransitions>,
    selection: Selection,
}

/// Owns the roster and drives every task through
/// available -> in-progress -> completed -> available
///
/// Cloning is cheap and every clone drives the same roster. Timer callbacks
/// hold their own clone plus copies of the ids and reward they need, and
/// look both entities up again in whatever snapshot is current when they fire.
#[derive(Clone)]
pub struct LifecycleEngine {
    inner: Arc<EngineInner>,
}

impl fmt::Debug for LifecycleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEngine")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl LifecycleEngine {
    /// Creates an engine over the seeded agents and tasks
    pub fn init(config: EngineConfig) -> LifecycleResult<Self> {
        let roster = seed::roster().map_err(LifecycleError::InvalidData)?;
        Ok(Self::with_roster(roster, config))
    }

    /// Creates an engine over an in-memory copy of `roster`
    pub fn with_roster(roster: Roster, config: EngineConfig) -> Self {
        Self::with_repository(Arc::new(InMemoryRosterRepository::new(roster)), config)
    }

    pub fn with_repository(repository: Arc<dyn RosterRepository>, config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(EngineInner {
                repository,
                config,
                scheduler: TransitionScheduler::new(),
                events,
                pending: Mutex::new(PendingTransitions::default()),
                selection: Selection::new(),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Receives every transition published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }

    // ===== Transitions =====

    /// Puts `agent_id` to work on `task_id` and schedules the completion
    ///
    /// Returns immediately with the handle of the completion timer, which
    /// fires after the task's duration. `Ok(None)` means the request was
    /// ignored under [`GuardPolicy::Permissive`].
    ///
    /// # Errors (strict policy)
    /// * `AgentNotFound` / `TaskNotFound` - Unknown id
    /// * `AgentBusy` - The agent is already working
    /// * `TaskUnavailable` - The task is in progress or completed
    pub async fn start_task(
        &self,
        agent_id: &AgentId,
        task_id: TaskId,
    ) -> LifecycleResult<Option<TransitionHandle>> {
        let mut pending = self.inner.pending.lock().await;
        let roster = self.load().await?;

        let Some(agent) = roster.agent(agent_id).cloned() else {
            return self.missing(LifecycleError::AgentNotFound(agent_id.clone()), None);
        };
        let Some(task) = roster.task(task_id).cloned() else {
            return self.missing(LifecycleError::TaskNotFound(task_id), None);
        };

        if self.inner.config.guard.is_strict() {
            if agent.is_active() {
                tracing::warn!(%agent_id, %task_id, "Rejected start: agent is busy");
                return Err(LifecycleError::AgentBusy(agent_id.clone()));
            }
            if !task.is_available() {
                tracing::warn!(%agent_id, %task_id, status = %task.status(), "Rejected start: task is not available");
                return Err(LifecycleError::TaskUnavailable {
                    task_id,
                    status: task.status(),
                });
            }
        }

        let reward = task.reward();
        let duration = task.duration();
        let task = self.advance(task, TaskStatus::InProgress)?;
        let next = roster
            .replace_agent(agent.activate())
            .replace_task(task)
            .assign(task_id, agent_id.clone());
        self.store(next).await?;

        let engine = self.clone();
        let callback_agent = agent_id.clone();
        let handle = self.inner.scheduler.schedule(
            task_id,
            TransitionKind::Complete,
            self.inner.config.task_delay(duration),
            move |id| async move {
                engine
                    .fire_completion(id, callback_agent, task_id, reward)
                    .await;
            },
        );
        pending.track_completion(agent_id.clone(), handle.clone());

        tracing::info!(%agent_id, %task_id, duration_secs = duration, %reward, "Task started");
        self.publish(LifecycleEvent::TaskStarted {
            agent_id: agent_id.clone(),
            task_id,
            occurred_at: Utc::now(),
        });

        Ok(Some(handle))
    }

    /// Pays `reward` to `agent_id`, marks `task_id` completed and schedules
    /// the reset to available
    ///
    /// Normally triggered by the timer set in [`start_task`](Self::start_task);
    /// calling it directly supersedes that timer. Returns the reset handle.
    ///
    /// # Errors (strict policy)
    /// * `AgentNotFound` / `TaskNotFound` - Unknown id
    /// * `InvalidStateTransition` - The task is not in progress
    /// * `NotAssigned` - Another agent is working on the task
    pub async fn complete_task(
        &self,
        agent_id: &AgentId,
        task_id: TaskId,
        reward: Decimal,
    ) -> LifecycleResult<Option<TransitionHandle>> {
        let mut pending = self.inner.pending.lock().await;
        self.complete_locked(&mut pending, agent_id, task_id, reward)
            .await
    }

    /// Stops every pending timer of `task_id` and undoes its in-flight state
    ///
    /// An in-progress task goes back to available and its agents go idle
    /// without being paid. A completed task becomes available right away.
    /// Returns `false` when nothing was pending for the task.
    pub async fn cancel_task(&self, task_id: TaskId) -> LifecycleResult<bool> {
        let mut pending = self.inner.pending.lock().await;
        let roster = self.load().await?;

        let Some(task) = roster.task(task_id).cloned() else {
            return self.missing(LifecycleError::TaskNotFound(task_id), false);
        };
        let (agents, handles) = pending.take_task(task_id);
        if handles.is_empty() {
            tracing::debug!(%task_id, "Nothing pending to cancel");
            return Ok(false);
        }
        for handle in &handles {
            handle.cancel();
        }

        let assignee = roster.assignee(task_id).cloned();
        let mut next = match task.status() {
            TaskStatus::Available => roster.clone(),
            TaskStatus::InProgress | TaskStatus::Completed => roster
                .replace_task(task.with_status(TaskStatus::Available))
                .unassign(task_id),
        };
        // Agents whose completion was dropped go idle unpaid, unless a
        // permissive start left them running another task
        for agent_id in &agents {
            if pending.is_working(agent_id) {
                continue;
            }
            if let Some(agent) = roster.agent(agent_id) {
                next = next.replace_agent(agent.clone().deactivate());
            }
        }
        self.store(next).await?;

        tracing::warn!(%task_id, timers = handles.len(), agent_id = ?assignee, "Task cancelled");
        self.publish(LifecycleEvent::TaskCancelled {
            task_id,
            agent_id: assignee,
            occurred_at: Utc::now(),
        });

        Ok(true)
    }

    async fn fire_completion(&self, id: Uuid, agent_id: AgentId, task_id: TaskId, reward: Decimal) {
        let mut pending = self.inner.pending.lock().await;
        if !pending.release_completion(task_id, &agent_id, id) {
            tracing::debug!(%task_id, handle = %id, "Skipping superseded completion");
            return;
        }

        if let Err(err) = self
            .complete_locked(&mut pending, &agent_id, task_id, reward)
            .await
        {
            tracing::error!(%agent_id, %task_id, error = %err, "Scheduled completion failed");
        }
    }

    async fn complete_locked(
        &self,
        pending: &mut PendingTransitions,
        agent_id: &AgentId,
        task_id: TaskId,
        reward: Decimal,
    ) -> LifecycleResult<Option<TransitionHandle>> {
        let roster = self.load().await?;

        let Some(agent) = roster.agent(agent_id).cloned() else {
            return self.missing(LifecycleError::AgentNotFound(agent_id.clone()), None);
        };
        let Some(task) = roster.task(task_id).cloned() else {
            return self.missing(LifecycleError::TaskNotFound(task_id), None);
        };

        let task = self.advance(task, TaskStatus::Completed)?;
        let assigned = roster.assignee(task_id) == Some(agent_id);
        if self.inner.config.guard.is_strict() && !assigned {
            tracing::warn!(%agent_id, %task_id, assignee = ?roster.assignee(task_id), "Rejected completion: agent is not assigned");
            return Err(LifecycleError::NotAssigned {
                task_id,
                agent_id: agent_id.clone(),
            });
        }

        let agent = agent.credit(reward);
        let level = agent.level();
        let total_earned = agent.total_earned();
        let tasks_completed = agent.tasks_completed();

        let mut next = roster.replace_agent(agent).replace_task(task);
        // Another agent may still be running the task after a permissive restart
        if assigned {
            next = next.unassign(task_id);
        }
        self.store(next).await?;
        // A manual completion supersedes the agent's own timer
        pending.cancel_completion(task_id, agent_id);

        let engine = self.clone();
        let handle = self.inner.scheduler.schedule(
            task_id,
            TransitionKind::Reset,
            self.inner.config.reset_delay,
            move |id| async move {
                engine.fire_reset(id, task_id).await;
            },
        );
        pending.track_reset(handle.clone());

        tracing::info!(
            %agent_id,
            %task_id,
            %reward,
            %total_earned,
            tasks_completed,
            level,
            "Task completed"
        );
        self.publish(LifecycleEvent::TaskCompleted {
            agent_id: agent_id.clone(),
            task_id,
            reward,
            level,
            occurred_at: Utc::now(),
        });

        Ok(Some(handle))
    }

    async fn fire_reset(&self, id: Uuid, task_id: TaskId) {
        let mut pending = self.inner.pending.lock().await;
        if !pending.release_reset(task_id, id) {
            tracing::debug!(%task_id, handle = %id, "Skipping superseded reset");
            return;
        }

        if let Err(err) = self.reset_locked(task_id).await {
            tracing::error!(%task_id, error = %err, "Scheduled reset failed");
        }
    }

    async fn reset_locked(&self, task_id: TaskId) -> LifecycleResult<()> {
        let roster = self.load().await?;

        let Some(task) = roster.task(task_id).cloned() else {
            tracing::debug!(%task_id, "Reset for unknown task ignored");
            return Ok(());
        };
        if task.status() != TaskStatus::Completed {
            tracing::debug!(%task_id, status = %task.status(), "Reset skipped: task is not completed");
            return Ok(());
        }

        self.store(roster.replace_task(task.with_status(TaskStatus::Available)))
            .await?;

        tracing::info!(%task_id, "Task available again");
        self.publish(LifecycleEvent::TaskReset {
            task_id,
            occurred_at: Utc::now(),
        });

        Ok(())
    }

    // ===== Selection =====

    /// Toggles the selected agent and returns the new selection
    pub async fn select_agent(&self, agent_id: &AgentId) -> LifecycleResult<Option<AgentId>> {
        let roster = self.load().await?;
        if roster.agent(agent_id).is_none() {
            let current = self.inner.selection.current().await;
            return self.missing(LifecycleError::AgentNotFound(agent_id.clone()), current);
        }

        Ok(self.inner.selection.toggle(agent_id.clone()).await)
    }

    pub async fn selected_agent(&self) -> Option<AgentId> {
        self.inner.selection.current().await
    }

    pub async fn clear_selection(&self) {
        self.inner.selection.clear().await;
    }

    /// True when an idle agent is selected and `task_id` is available
    pub async fn can_start(&self, task_id: TaskId) -> LifecycleResult<bool> {
        let Some(selected) = self.inner.selection.current().await else {
            return Ok(false);
        };
        let roster = self.load().await?;

        let idle = roster.agent(&selected).is_some_and(|agent| !agent.is_active());
        let available = roster.task(task_id).is_some_and(Task::is_available);

        Ok(idle && available)
    }

    /// Starts `task_id` for the selected agent
    ///
    /// Under the permissive policy this is the only place the
    /// "idle agent, available task" gate is checked; a closed gate is a no-op.
    pub async fn start_selected(&self, task_id: TaskId) -> LifecycleResult<Option<TransitionHandle>> {
        let Some(selected) = self.inner.selection.current().await else {
            return self.missing(LifecycleError::NoAgentSelected, None);
        };

        if !self.inner.config.guard.is_strict() && !self.can_start(task_id).await? {
            tracing::debug!(agent_id = %selected, %task_id, "Start gated off");
            return Ok(None);
        }

        self.start_task(&selected, task_id).await
    }

    // ===== Readers =====

    pub async fn snapshot(&self) -> LifecycleResult<Roster> {
        self.load().await
    }

    pub async fn agents(&self) -> LifecycleResult<Vec<Agent>> {
        Ok(self.load().await?.agents().to_vec())
    }

    pub async fn tasks(&self) -> LifecycleResult<Vec<Task>> {
        Ok(self.load().await?.tasks().to_vec())
    }

    pub async fn agent(&self, agent_id: &AgentId) -> LifecycleResult<Option<Agent>> {
        Ok(self.load().await?.agent(agent_id).cloned())
    }

    pub async fn task(&self, task_id: TaskId) -> LifecycleResult<Option<Task>> {
        Ok(self.load().await?.task(task_id).cloned())
    }

    pub async fn assignee(&self, task_id: TaskId) -> LifecycleResult<Option<AgentId>> {
        Ok(self.load().await?.assignee(task_id).cloned())
    }

    pub async fn stats(&self) -> LifecycleResult<Stats> {
        Ok(self.load().await?.stats())
    }

    /// Timers that have not fired yet, ordered by task id
    pub async fn pending_transitions(&self) -> Vec<TransitionHandle> {
        self.inner.pending.lock().await.handles()
    }

    // ===== Helpers =====

    async fn load(&self) -> LifecycleResult<Roster> {
        self.inner
            .repository
            .load()
            .await
            .map_err(LifecycleError::Storage)
    }

    async fn store(&self, roster: Roster) -> LifecycleResult<()> {
        self.inner
            .repository
            .store(roster)
            .await
            .map_err(LifecycleError::Storage)
    }

    /// Applies the guard policy to a failed lookup
    fn missing<T>(&self, err: LifecycleError, fallback: T) -> LifecycleResult<T> {
        if self.inner.config.guard.is_strict() {
            tracing::warn!(error = %err, "Request rejected");
            Err(err)
        } else {
            tracing::debug!(error = %err, "Request ignored");
            Ok(fallback)
        }
    }

    /// Moves `task` to `next`, checking the transition table under the
    /// strict policy only
    fn advance(&self, task: Task, next: TaskStatus) -> LifecycleResult<Task> {
        if !self.inner.config.guard.is_strict() {
            return Ok(task.with_status(next));
        }

        let (task_id, from) = (task.id(), task.status());
        task.transition(next)
            .map_err(|_| LifecycleError::InvalidStateTransition {
                task_id,
                from,
                to: next,
            })
    }

    fn publish(&self, event: LifecycleEvent) {
        if self.inner.events.send(event).is_err() {
            tracing::trace!("No lifecycle subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_id(raw: &str) -> AgentId {
        AgentId::new(raw).unwrap()
    }

    #[test]
    fn default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.guard, GuardPolicy::Strict);
        assert_eq!(config.reset_delay, Duration::from_secs(3));
        assert_eq!(config.task_delay(5), Duration::from_secs(5));
    }

    #[test]
    fn task_delay_is_scaled() {
        let config = EngineConfig {
            time_scale: 0.1,
            ..EngineConfig::default()
        };

        assert_eq!(config.task_delay(10), Duration::from_secs(1));
    }

    #[test]
    fn invalid_scale_falls_back_to_real_time() {
        let config = EngineConfig {
            time_scale: -2.0,
            ..EngineConfig::default()
        };

        assert_eq!(config.task_delay(7), Duration::from_secs(7));
    }

    #[test]
    fn guard_policy_parsing() {
        assert_eq!("strict".parse::<GuardPolicy>(), Ok(GuardPolicy::Strict));
        assert_eq!(" Permissive ".parse::<GuardPolicy>(), Ok(GuardPolicy::Permissive));
        assert!("lenient".parse::<GuardPolicy>().is_err());
        assert_eq!(GuardPolicy::Permissive.to_string(), "permissive");
    }

    #[tokio::test(start_paused = true)]
    async fn start_marks_agent_and_task() {
        let engine = LifecycleEngine::init(EngineConfig::default()).unwrap();

        let handle = engine
            .start_task(&agent_id("agent-002"), TaskId::new(3))
            .await
            .unwrap()
            .expect("completion scheduled");

        assert_eq!(handle.kind(), TransitionKind::Complete);
        let roster = engine.snapshot().await.unwrap();
        assert!(roster.agent(&agent_id("agent-002")).unwrap().is_active());
        assert_eq!(roster.task(TaskId::new(3)).unwrap().status(), TaskStatus::InProgress);
        assert_eq!(roster.assignee(TaskId::new(3)), Some(&agent_id("agent-002")));
        assert_eq!(engine.pending_transitions().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_swaps_pending_timer_for_reset() {
        let engine = LifecycleEngine::init(EngineConfig::default()).unwrap();
        engine
            .start_task(&agent_id("agent-002"), TaskId::new(3))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(3_100)).await;

        let pending = engine.pending_transitions().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind(), TransitionKind::Reset);
        assert!(engine.assignee(TaskId::new(3)).await.unwrap().is_none());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(engine.pending_transitions().await.is_empty());
    }

    #[tokio::test]
    async fn strict_complete_of_available_task_is_rejected() {
        let engine = LifecycleEngine::init(EngineConfig::default()).unwrap();

        let err = engine
            .complete_task(&agent_id("agent-001"), TaskId::new(1), Decimal::ONE)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LifecycleError::InvalidStateTransition {
                task_id: TaskId::new(1),
                from: TaskStatus::Available,
                to: TaskStatus::Completed,
            }
        );
        let agent = engine.agent(&agent_id("agent-001")).await.unwrap().unwrap();
        assert_eq!(agent.tasks_completed(), 42);
    }
}
