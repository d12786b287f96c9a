//! Tasks, experience and levels
//!
//! Three tasks are active at a time. Progress is recomputed every tick from
//! the session and lifetime counters; a completed task pays out only when
//! the player collects it, after which its slot is refilled from the catalog.

pub mod catalog;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use catalog::{TASKS, TaskDefinition, TaskId, TaskKind};
use crate::consts::{ACTIVE_TASK_SLOTS, XP_PER_LEVEL};

/// Experience and level, persisted per account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub xp: u32,
    pub level: u32,
}

impl Progression {
    /// Credit XP, rolling over as many levels as it covers.
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        // Widened so a huge reward cannot overflow before the rollover
        let total = self.xp as u64 + amount as u64;
        let per_level = XP_PER_LEVEL as u64;
        let before = self.level;
        self.level = self.level.saturating_add((total / per_level) as u32);
        self.xp = (total % per_level) as u32;
        self.level - before
    }
}

/// Counter values a tick feeds into task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressInputs {
    pub score: u64,
    pub seconds_played: u32,
    pub jumps: u32,
    pub games_played: u32,
    pub level: u32,
    pub boosts_purchased: u32,
}

impl ProgressInputs {
    fn counter(&self, kind: TaskKind) -> u64 {
        match kind {
            TaskKind::Score => self.score,
            TaskKind::Time => self.seconds_played as u64,
            TaskKind::Jump => self.jumps as u64,
            TaskKind::Games => self.games_played as u64,
            TaskKind::Level => self.level as u64,
            TaskKind::Boost => self.boosts_purchased as u64,
        }
    }
}

/// Lifetime counters that only exist to feed task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeCounters {
    pub games_played: u32,
    pub boosts_purchased: u32,
}

/// Persisted part of the task state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub completed: BTreeSet<TaskId>,
    pub collected: BTreeSet<TaskId>,
    #[serde(default)]
    pub lifetime: LifetimeCounters,
}

/// One row of the task list as shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub label: &'static str,
    pub progress: u32,
    pub goal: u32,
    pub xp_reward: u32,
    pub done: bool,
    pub collected: bool,
}

/// Active task window plus progress bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBoard {
    active: [Option<TaskId>; ACTIVE_TASK_SLOTS],
    progress: BTreeMap<TaskId, u32>,
    record: TaskRecord,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::from_record(TaskRecord::default())
    }
}

impl TaskBoard {
    /// Rebuild the board from persisted state, filling slots lowest-id first
    pub fn from_record(record: TaskRecord) -> Self {
        let mut board = Self {
            active: [None; ACTIVE_TASK_SLOTS],
            progress: BTreeMap::new(),
            record,
        };
        // Completed but uncollected tasks keep their slot so they can still be claimed
        let mut pending: Vec<TaskId> = board
            .record
            .completed
            .difference(&board.record.collected)
            .copied()
            .collect();
        pending.truncate(ACTIVE_TASK_SLOTS);
        for (slot, id) in pending.into_iter().enumerate() {
            board.active[slot] = Some(id);
            if let Some(def) = catalog::find(id) {
                board.progress.insert(id, def.goal);
            }
        }
        for slot in 0..ACTIVE_TASK_SLOTS {
            if board.active[slot].is_none() {
                board.active[slot] = board.next_available();
            }
        }
        board
    }

    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub fn lifetime(&self) -> LifetimeCounters {
        self.record.lifetime
    }

    pub fn lifetime_mut(&mut self) -> &mut LifetimeCounters {
        &mut self.record.lifetime
    }

    /// Active slots in order (a slot is empty once the catalog runs out)
    pub fn active(&self) -> &[Option<TaskId>] {
        &self.active
    }

    pub fn progress(&self, id: TaskId) -> u32 {
        self.progress.get(&id).copied().unwrap_or(0)
    }

    pub fn is_completed(&self, id: TaskId) -> bool {
        self.record.completed.contains(&id)
    }

    pub fn is_collected(&self, id: TaskId) -> bool {
        self.record.collected.contains(&id)
    }

    /// Clear session-scoped progress (completed tasks keep theirs)
    pub fn begin_session(&mut self) {
        let completed = &self.record.completed;
        self.progress.retain(|id, _| {
            completed.contains(id)
                || catalog::find(*id).is_some_and(|def| !def.kind.is_session_scoped())
        });
    }

    /// Recompute progress for the active tasks. Returns ids that became
    /// completed during this call.
    pub fn update(&mut self, inputs: &ProgressInputs) -> Vec<TaskId> {
        let mut newly_completed = Vec::new();
        for id in self.active.iter().flatten() {
            let Some(def) = catalog::find(*id) else {
                continue;
            };
            if self.record.completed.contains(id) {
                continue;
            }
            let value = inputs.counter(def.kind).min(def.goal as u64) as u32;
            // Never move backwards within a session
            let entry = self.progress.entry(*id).or_insert(0);
            *entry = (*entry).max(value);
            if *entry >= def.goal {
                self.record.completed.insert(*id);
                newly_completed.push(*id);
            }
        }
        newly_completed
    }

    /// Claim a completed task's XP. No-op (returns None) if the task is not
    /// completed or was already collected; otherwise credits the reward,
    /// retires the task for good and refills its slot.
    pub fn collect(&mut self, id: TaskId, progression: &mut Progression) -> Option<u32> {
        if self.record.collected.contains(&id) || !self.record.completed.contains(&id) {
            return None;
        }
        let def = catalog::find(id)?;
        progression.add_xp(def.xp_reward);
        self.record.collected.insert(id);

        if let Some(slot) = self.active.iter().position(|a| *a == Some(id)) {
            self.active[slot] = None;
            self.active[slot] = self.next_available();
        }
        log::info!(
            "Collected task {} (+{} XP, now level {} / {} XP)",
            id,
            def.xp_reward,
            progression.level,
            progression.xp
        );
        Some(def.xp_reward)
    }

    /// Lowest-id task that is not active, completed or collected
    fn next_available(&self) -> Option<TaskId> {
        TASKS
            .iter()
            .map(|t| t.id)
            .find(|id| {
                !self.active.contains(&Some(*id))
                    && !self.record.completed.contains(id)
                    && !self.record.collected.contains(id)
            })
    }

    /// Rows for the active tasks
    pub fn views(&self) -> Vec<TaskView> {
        self.active
            .iter()
            .flatten()
            .filter_map(|id| catalog::find(*id))
            .map(|def| TaskView {
                id: def.id,
                label: def.label,
                progress: self.progress(def.id),
                goal: def.goal,
                xp_reward: def.xp_reward,
                done: self.is_completed(def.id),
                collected: self.is_collected(def.id),
            })
            .collect()
    }
}
