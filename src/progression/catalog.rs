//! Static task catalog

use serde::{Deserialize, Serialize};

pub type TaskId = u32;

/// Which counter a task tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Session score
    Score,
    /// Seconds played this session
    Time,
    /// Jumps this session
    Jump,
    /// Lifetime games played
    Games,
    /// Current level
    Level,
    /// Lifetime boosts purchased
    Boost,
}

impl TaskKind {
    /// Session-scoped kinds restart from zero every session
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, TaskKind::Score | TaskKind::Time | TaskKind::Jump)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub kind: TaskKind,
    pub goal: u32,
    pub xp_reward: u32,
    pub label: &'static str,
}

const fn task(id: TaskId, kind: TaskKind, goal: u32, label: &'static str, xp_reward: u32) -> TaskDefinition {
    TaskDefinition {
        id,
        kind,
        goal,
        xp_reward,
        label,
    }
}

use TaskKind::*;

/// Every task, sorted by id
pub static TASKS: [TaskDefinition; 50] = [
    task(1, Score, 10, "Score 10", 100),
    task(2, Time, 30, "Play 30 seconds", 100),
    task(3, Jump, 10, "Jump 10 times", 100),
    task(4, Jump, 20, "Jump 20 times", 100),
    task(5, Score, 20, "Score 20", 100),
    task(6, Score, 40, "Score 40", 100),
    task(7, Jump, 30, "Jump 30 times", 100),
    task(8, Jump, 40, "Jump 40 times", 100),
    task(9, Jump, 50, "Jump 50 times", 100),
    task(10, Time, 60, "Play 60 seconds", 100),
    task(11, Time, 120, "Play 120 seconds", 100),
    task(12, Time, 240, "Play 240 seconds", 100),
    task(13, Level, 2, "Reach level 2", 100),
    task(14, Level, 3, "Reach level 3", 100),
    task(15, Games, 3, "Play 3 games", 100),
    task(16, Games, 5, "Play 5 games", 100),
    task(17, Score, 100, "Score 100", 200),
    task(18, Jump, 100, "Jump 100 times", 200),
    task(19, Time, 180, "Play 3 minutes", 200),
    task(20, Level, 5, "Reach level 5", 200),
    task(21, Score, 100, "Score 100", 100),
    task(22, Jump, 120, "Jump 120 times", 100),
    task(23, Time, 180, "Play 3 minutes", 100),
    task(24, Score, 130, "Score 130", 100),
    task(25, Jump, 150, "Jump 150 times", 100),
    task(26, Time, 240, "Play 4 minutes", 100),
    task(27, Score, 160, "Score 160", 100),
    task(28, Jump, 180, "Jump 180 times", 100),
    task(29, Score, 180, "Score 180", 100),
    task(30, Time, 300, "Play 5 minutes", 100),
    task(31, Score, 200, "Score 200", 90),
    task(32, Jump, 220, "Jump 220 times", 90),
    task(33, Time, 360, "Play 6 minutes", 90),
    task(34, Score, 230, "Score 230", 90),
    task(35, Jump, 250, "Jump 250 times", 90),
    task(36, Time, 420, "Play 7 minutes", 90),
    task(37, Score, 260, "Score 260", 90),
    task(38, Jump, 280, "Jump 280 times", 90),
    task(39, Score, 280, "Score 280", 90),
    task(40, Time, 480, "Play 8 minutes", 90),
    task(41, Score, 300, "Score 300", 80),
    task(42, Jump, 320, "Jump 320 times", 80),
    task(43, Time, 540, "Play 9 minutes", 80),
    task(44, Score, 330, "Score 330", 80),
    task(45, Jump, 350, "Jump 350 times", 80),
    task(46, Time, 600, "Play 10 minutes", 80),
    task(47, Score, 360, "Score 360", 80),
    task(48, Jump, 380, "Jump 380 times", 80),
    task(49, Score, 380, "Score 380", 80),
    task(50, Time, 660, "Play 11 minutes", 80),
];

/// Look up a task by id
pub fn find(id: TaskId) -> Option<&'static TaskDefinition> {
    TASKS.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sorted_and_unique() {
        for pair in TASKS.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
        assert!(TASKS.iter().all(|t| t.goal > 0 && t.xp_reward > 0));
    }

    #[test]
    fn test_find() {
        assert_eq!(find(17).map(|t| t.xp_reward), Some(200));
        assert_eq!(find(13).map(|t| t.kind), Some(TaskKind::Level));
        assert!(find(0).is_none());
        assert!(find(51).is_none());
    }
}
