//! Session orchestrator
//!
//! `Game` owns everything a run touches: the simulation state, spawner,
//! biome machine, score tracker and the loaded account. The host calls
//! [`Game::frame`] once per rendered frame and reads a [`Snapshot`] back.
//! Account changes are written through the [`Store`] as they happen and
//! never read back during a session.

use serde::Serialize;

use crate::boosts::{BoostInventory, BoostKind};
use crate::leaderboard::Leaderboard;
use crate::persistence::Store;
use crate::platform::Clock;
use crate::progression::{ProgressInputs, Progression, TaskBoard, TaskId, TaskView};
use crate::sim::{
    Biome, BiomeFsm, Coin, Pipe, RandomSource, ScoreTracker, SessionPhase, SessionState, SpawnGenerator, TickInput,
    Transition, tick,
};
use crate::tuning::{Tuning, Viewport};

/// Something the host may want to play a sound or effect for
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Jumped,
    PipePassed { score: u64 },
    CoinCollected { balance: u64 },
    NewHighScore { score: u64 },
    RankGained { gain: usize },
    BiomeChanged { from: Biome, to: Biome },
    SessionEnded { score: u64, new_high_score: bool },
}

/// Read-only view of one frame, for drawing
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub viewport: Viewport,
    pub player_x: f32,
    pub player_y: f32,
    pub player_size: f32,
    pub obstacles: Vec<Pipe>,
    pub collectibles: Vec<Coin>,
    /// Base biome (the outgoing one while crossfading)
    pub biome: Biome,
    pub transition: Option<Transition>,
    pub transition_progress: f32,
    pub score: u64,
    pub high_score: u64,
    pub rank_gain: Option<usize>,
    pub phase: SessionPhase,
    pub active_boost: Option<BoostKind>,
    pub coins: u64,
}

pub struct Game {
    tuning: Tuning,
    state: SessionState,
    spawner: SpawnGenerator,
    biome: BiomeFsm,
    scores: ScoreTracker,
    store: Store,
    clock: Box<dyn Clock>,

    // Account
    coins: u64,
    progression: Progression,
    boosts: BoostInventory,
    tasks: TaskBoard,

    jump_requested: bool,
    events: Vec<GameEvent>,
}

impl Game {
    /// Game with a spawner seeded from `tuning.seed`
    pub fn new(tuning: Tuning, viewport: Viewport, store: Store, clock: Box<dyn Clock>) -> Self {
        let spawner = SpawnGenerator::seeded(tuning.seed, tuning.coin_chance);
        Self::with_spawner(tuning, viewport, store, clock, spawner)
    }

    /// Game drawing spawn randomness from `source`
    pub fn with_source(
        tuning: Tuning,
        viewport: Viewport,
        store: Store,
        clock: Box<dyn Clock>,
        source: Box<dyn RandomSource>,
    ) -> Self {
        let spawner = SpawnGenerator::with_source(source, tuning.coin_chance);
        Self::with_spawner(tuning, viewport, store, clock, spawner)
    }

    fn with_spawner(
        tuning: Tuning,
        viewport: Viewport,
        store: Store,
        clock: Box<dyn Clock>,
        spawner: SpawnGenerator,
    ) -> Self {
        let account = store.load_account();
        log::info!(
            "Account loaded (identity: {}, high score {}, {} coins, level {})",
            store.identity().unwrap_or("none"),
            account.high_score,
            account.coins,
            account.progression.level
        );
        Self {
            biome: BiomeFsm::new(tuning.biome_transition_ms),
            tuning,
            state: SessionState::new(viewport),
            spawner,
            scores: ScoreTracker::new(account.high_score),
            store,
            clock,
            coins: account.coins,
            progression: account.progression,
            boosts: account.boosts,
            tasks: TaskBoard::from_record(account.tasks),
            jump_requested: false,
            events: Vec::new(),
        }
    }

    /// Begin a fresh session
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.state.begin(now);
        self.scores.begin_session();
        self.biome.reset();
        self.jump_requested = false;

        self.tasks.lifetime_mut().games_played += 1;
        self.tasks.begin_session();
        self.update_progress();
        let record = self.tasks.record();
        self.store.write("tasks", |p, id| p.set_tasks(id, record));

        log::info!(
            "Session started (high score {}, rank {:?}, boost {:?})",
            self.scores.high_score,
            self.scores.initial_rank,
            self.boosts.active.map(|b| b.as_str())
        );
    }

    /// Queue a jump for the next tick; dropped unless playing
    pub fn request_jump(&mut self) {
        if self.state.is_playing() {
            self.jump_requested = true;
        }
    }

    /// Advance one tick. Does nothing unless a session is playing.
    ///
    /// Returns whether the session is still playing afterwards, so a host
    /// loop knows when to stop scheduling frames.
    pub fn frame(&mut self) -> bool {
        if !self.state.is_playing() {
            self.jump_requested = false;
            return false;
        }

        let input = TickInput {
            jump: std::mem::take(&mut self.jump_requested),
        };
        let outcome = tick(&mut self.state, &mut self.spawner, &self.tuning, &input);

        if outcome.jumped {
            self.events.push(GameEvent::Jumped);
        }
        if outcome.collided {
            self.end_session();
            return false;
        }

        let score = self.state.score;
        if outcome.pipes_passed > 0 {
            self.events.push(GameEvent::PipePassed { score });
        }
        if self.scores.check_new_high(score) {
            log::info!("New high score: {}", score);
            self.events.push(GameEvent::NewHighScore { score });
        }

        if outcome.coins_collected > 0 {
            self.coins += outcome.coins_collected as u64;
            let balance = self.coins;
            self.store.write("coins", |p, id| p.set_coins(id, balance));
            self.events.push(GameEvent::CoinCollected { balance });
        }

        let now = self.clock.now_ms();
        self.state.counters.seconds_played = ((now - self.state.started_at_ms).max(0.0) / 1000.0) as u32;

        if let Some(t) = self.biome.update(score, now) {
            self.events.push(GameEvent::BiomeChanged { from: t.from, to: t.to });
        }

        self.update_progress();
        true
    }

    /// Playing -> Ended: spend the boost, settle the high score
    fn end_session(&mut self) {
        let score = self.state.score;

        if self.boosts.consume_active().is_some() {
            let boosts = &self.boosts;
            self.store.write("boosts", |p, id| p.set_boosts(id, boosts));
        }

        let new_high_score = self.scores.finish_session(score);
        if new_high_score {
            self.store
                .write("high score", |p, id| p.set_high_score_if_higher(id, score));
        }

        let record = self.tasks.record();
        self.store.write("tasks", |p, id| p.set_tasks(id, record));

        log::info!(
            "Session ended: score {}, {} jumps, {} coins, {}s{}",
            score,
            self.state.counters.jumps,
            self.state.counters.coins,
            self.state.counters.seconds_played,
            if new_high_score { " (new high score)" } else { "" }
        );
        self.events.push(GameEvent::SessionEnded { score, new_high_score });
    }

    /// Feed current counters into the task board, persisting new completions
    fn update_progress(&mut self) {
        let lifetime = self.tasks.lifetime();
        let inputs = ProgressInputs {
            score: self.state.score,
            seconds_played: self.state.counters.seconds_played,
            jumps: self.state.counters.jumps,
            games_played: lifetime.games_played,
            level: self.progression.level,
            boosts_purchased: lifetime.boosts_purchased,
        };
        let done = self.tasks.update(&inputs);
        if !done.is_empty() {
            log::info!("Tasks completed: {:?}", done);
            let record = self.tasks.record();
            self.store.write("tasks", |p, id| p.set_tasks(id, record));
        }
    }

    /// Pull a leaderboard snapshot from storage
    pub fn fetch_leaderboard(&self) -> Option<Leaderboard> {
        self.store.ranked_scores().map(Leaderboard::new)
    }

    /// Apply a leaderboard snapshot. Outside Playing it only updates the
    /// rank the next session starts from.
    pub fn on_leaderboard(&mut self, board: &Leaderboard) {
        let rank = self.store.identity().and_then(|id| board.rank_of(id));
        if let Some(gain) = self.scores.observe_rank(rank, self.state.is_playing()) {
            log::debug!("Rank gain now {}", gain);
            self.events.push(GameEvent::RankGained { gain });
        }
    }

    /// Claim a completed task's XP; false if there was nothing to claim
    pub fn collect_task(&mut self, task: TaskId) -> bool {
        if self.tasks.collect(task, &mut self.progression).is_none() {
            return false;
        }
        let progression = self.progression;
        self.store
            .write("progression", |p, id| p.set_progression(id, progression));
        let record = self.tasks.record();
        self.store.write("tasks", |p, id| p.set_tasks(id, record));
        // A level-up can complete level tasks
        self.update_progress();
        true
    }

    pub fn purchase_boost(&mut self, kind: BoostKind) -> bool {
        if !self
            .boosts
            .purchase(kind, &mut self.coins, self.tuning.boost_price)
        {
            return false;
        }
        self.tasks.lifetime_mut().boosts_purchased += 1;

        let (coins, boosts) = (self.coins, &self.boosts);
        self.store.write("coins", |p, id| p.set_coins(id, coins));
        self.store.write("boosts", |p, id| p.set_boosts(id, boosts));
        let record = self.tasks.record();
        self.store.write("tasks", |p, id| p.set_tasks(id, record));
        self.update_progress();
        true
    }

    pub fn activate_boost(&mut self, kind: BoostKind) -> bool {
        if !self.boosts.activate(kind) {
            return false;
        }
        let boosts = &self.boosts;
        self.store.write("boosts", |p, id| p.set_boosts(id, boosts));
        true
    }

    pub fn deactivate_boost(&mut self) {
        self.boosts.deactivate();
        let boosts = &self.boosts;
        self.store.write("boosts", |p, id| p.set_boosts(id, boosts));
    }

    pub fn snapshot(&self) -> Snapshot {
        let vp = self.state.viewport;
        Snapshot {
            viewport: vp,
            player_x: crate::consts::PLAYER_X,
            player_y: self.state.player.y,
            player_size: vp.player_size(),
            obstacles: self.state.pipes.clone(),
            collectibles: self.state.coins.iter().filter(|c| !c.collected).cloned().collect(),
            biome: self.biome.current(),
            transition: self.biome.transition(),
            transition_progress: self.biome.progress(self.clock.now_ms()),
            score: self.state.score,
            high_score: self.scores.high_score,
            rank_gain: self.scores.rank_gain,
            phase: self.state.phase,
            active_boost: self.boosts.active,
            coins: self.coins,
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn task_views(&self) -> Vec<TaskView> {
        self.tasks.views()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    pub fn scores(&self) -> &ScoreTracker {
        &self.scores
    }

    pub fn biome(&self) -> &BiomeFsm {
        &self.biome
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn progression(&self) -> Progression {
        self.progression
    }

    pub fn boosts(&self) -> &BoostInventory {
        &self.boosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::RankedScore;
    use crate::persistence::{AccountRecord, MemoryStore};
    use crate::platform::ManualClock;
    use crate::sim::{ScriptedSource, autopilot};

    const FRAME_MS: f64 = 20.0;

    /// Gaps all land at 160; coins (every other pipe) sit at y = 40
    fn scripted(store: Store, clock: &ManualClock) -> Game {
        Game::with_source(
            Tuning::default(),
            Viewport::default(),
            store,
            Box::new(clock.clone()),
            Box::new(ScriptedSource::new(vec![0.5, 0.25, 0.0, 0.5, 0.75])),
        )
    }

    fn store_for(backend: &MemoryStore, identity: Option<&str>) -> Store {
        Store::new(Box::new(backend.clone()), identity.map(String::from))
    }

    /// One autopilot frame; returns the events it raised
    fn step(game: &mut Game, clock: &ManualClock) -> Vec<GameEvent> {
        clock.advance(FRAME_MS);
        if autopilot(game.state()) {
            game.request_jump();
        }
        game.frame();
        game.drain_events()
    }

    fn fall_until_ended(game: &mut Game, clock: &ManualClock) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..1000 {
            clock.advance(FRAME_MS);
            game.frame();
            events.extend(game.drain_events());
            if game.phase() == SessionPhase::Ended {
                break;
            }
        }
        events
    }

    #[test]
    fn test_scripted_run_500_ticks() {
        let backend = MemoryStore::new();
        backend.insert(
            "pilot",
            AccountRecord {
                high_score: 1,
                ..Default::default()
            },
        );
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("pilot")), &clock);
        game.start();

        let mut high_score_ticks = Vec::new();
        let mut biome_changes = Vec::new();
        for frame in 1..=500u64 {
            for event in step(&mut game, &clock) {
                match event {
                    GameEvent::NewHighScore { .. } => high_score_ticks.push(frame),
                    GameEvent::BiomeChanged { from, to } => biome_changes.push((frame, from, to)),
                    GameEvent::SessionEnded { .. } => panic!("crashed at frame {}", frame),
                    _ => {}
                }
            }
        }

        let state = game.state();
        assert_eq!(state.time_ticks, 500);
        assert_eq!(state.pipes_spawned, 4);
        assert_eq!(state.pipes.len(), 2);
        assert_eq!(state.coins_spawned, 2);
        assert_eq!(state.counters.coins, 0);
        assert_eq!(state.score, 2);
        assert_eq!(state.counters.seconds_played, 10);
        assert!(state.pipes.iter().all(|p| p.gap_top == 160.0));

        assert_eq!(high_score_ticks, vec![432]);
        assert_eq!(biome_changes, vec![(432, Biome::Winter, Biome::Spring)]);
        // Crossfade committed 1000 ms later
        assert_eq!(game.biome().steady(), Biome::Spring);
        assert!(game.biome().transition().is_none());

        // The jump task completed but pays nothing until collected
        assert!(state.counters.jumps >= 10);
        assert!(game.tasks().is_completed(3));
        assert!(!game.tasks().is_completed(1));
        assert_eq!(game.progression(), Progression::default());
        assert!(game.collect_task(3));
        assert!(!game.collect_task(3));
        assert_eq!(game.progression().xp, 100);
        assert_eq!(backend.record("pilot").map(|r| r.progression.xp), Some(100));

        // High score is only written when the run ends
        assert_eq!(backend.record("pilot").map(|r| r.high_score), Some(1));
        fall_until_ended(&mut game, &clock);
        assert_eq!(backend.record("pilot").map(|r| r.high_score), Some(2));
        assert_eq!(game.scores().last_score, 2);
    }

    #[test]
    fn test_jump_dropped_when_not_playing() {
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&MemoryStore::new(), None), &clock);
        game.request_jump();
        game.frame();
        assert_eq!(game.phase(), SessionPhase::Idle);
        assert!(game.drain_events().is_empty());

        game.start();
        game.frame();
        assert_eq!(game.state().counters.jumps, 0);
    }

    #[test]
    fn test_frame_reports_when_to_keep_running() {
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&MemoryStore::new(), None), &clock);
        assert!(!game.frame());

        game.start();
        let mut frames = 0;
        while game.frame() {
            frames += 1;
            assert!(frames < 1000);
        }
        // The frame that ended the run is the one that said stop
        assert_eq!(game.phase(), SessionPhase::Ended);
        assert!(matches!(game.drain_events().last(), Some(GameEvent::SessionEnded { .. })));
        let ticks = game.state().time_ticks;
        assert!(!game.frame());
        assert_eq!(game.state().time_ticks, ticks);

        game.start();
        assert!(game.frame());
    }

    #[test]
    fn test_session_end_consumes_boost() {
        let backend = MemoryStore::new();
        backend.insert(
            "buyer",
            AccountRecord {
                coins: 60,
                ..Default::default()
            },
        );
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("buyer")), &clock);

        assert!(game.purchase_boost(BoostKind::Speed));
        assert_eq!(game.coins(), 10);
        assert!(!game.purchase_boost(BoostKind::Shield));
        assert_eq!(game.coins(), 10);
        assert!(!game.activate_boost(BoostKind::Shield));
        assert!(game.activate_boost(BoostKind::Speed));

        let saved = backend.record("buyer").unwrap_or_default();
        assert_eq!(saved.coins, 10);
        assert_eq!(saved.boosts.active, Some(BoostKind::Speed));
        assert_eq!(saved.tasks.lifetime.boosts_purchased, 1);

        game.start();
        assert_eq!(game.snapshot().active_boost, Some(BoostKind::Speed));
        let events = fall_until_ended(&mut game, &clock);
        assert!(matches!(
            events.last(),
            Some(GameEvent::SessionEnded {
                score: 0,
                new_high_score: false
            })
        ));

        assert_eq!(game.boosts(), &BoostInventory::default());
        let saved = backend.record("buyer").unwrap_or_default();
        assert!(saved.boosts.owned.is_empty());
        assert_eq!(saved.boosts.active, None);
        assert_eq!(saved.tasks.lifetime.games_played, 1);
    }

    #[test]
    fn test_deactivate_keeps_boost_owned() {
        let backend = MemoryStore::new();
        backend.insert(
            "buyer",
            AccountRecord {
                coins: 50,
                ..Default::default()
            },
        );
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("buyer")), &clock);
        assert!(game.purchase_boost(BoostKind::Shield));
        assert!(game.activate_boost(BoostKind::Shield));
        game.deactivate_boost();

        game.start();
        fall_until_ended(&mut game, &clock);
        assert!(game.boosts().owned.contains(&BoostKind::Shield));
        assert!(game.boosts().is_consistent());
    }

    #[test]
    fn test_no_identity_plays_without_storage() {
        let backend = MemoryStore::new();
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, None), &clock);
        game.start();
        for _ in 0..300 {
            step(&mut game, &clock);
        }
        fall_until_ended(&mut game, &clock);

        assert_eq!(game.scores().high_score, 1);
        assert!(backend.snapshot().is_empty());
    }

    #[test]
    fn test_storage_failure_does_not_block_play() {
        let backend = MemoryStore::new();
        backend.set_failing(true);
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("offline")), &clock);
        game.start();
        for _ in 0..300 {
            let events = step(&mut game, &clock);
            assert!(!events.iter().any(|e| matches!(e, GameEvent::SessionEnded { .. })));
        }
        assert_eq!(game.state().score, 1);
        assert!(game.fetch_leaderboard().is_none());

        fall_until_ended(&mut game, &clock);
        assert_eq!(game.snapshot().high_score, 1);
        backend.set_failing(false);
        assert!(backend.snapshot().is_empty());
    }

    #[test]
    fn test_rank_gain_and_late_snapshot() {
        let board = |me: u64| {
            Leaderboard::new(vec![
                RankedScore {
                    identity: "a".into(),
                    score: 30,
                },
                RankedScore {
                    identity: "b".into(),
                    score: 20,
                },
                RankedScore {
                    identity: "c".into(),
                    score: 10,
                },
                RankedScore {
                    identity: "me".into(),
                    score: me,
                },
            ])
        };
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&MemoryStore::new(), Some("me")), &clock);

        // Idle snapshot only sets the starting rank
        game.on_leaderboard(&board(5));
        assert!(game.drain_events().is_empty());

        game.start();
        assert_eq!(game.scores().initial_rank, Some(4));
        game.on_leaderboard(&board(25));
        assert_eq!(game.drain_events(), vec![GameEvent::RankGained { gain: 2 }]);
        game.on_leaderboard(&board(25));
        assert!(game.drain_events().is_empty());

        fall_until_ended(&mut game, &clock);
        game.drain_events();
        game.on_leaderboard(&board(99));
        assert!(game.drain_events().is_empty());
        assert_eq!(game.snapshot().rank_gain, Some(2));
    }

    #[test]
    fn test_fetch_leaderboard_from_store() {
        let backend = MemoryStore::new();
        for (who, score) in [("x", 8), ("me", 12), ("y", 3)] {
            backend.insert(
                who,
                AccountRecord {
                    high_score: score,
                    ..Default::default()
                },
            );
        }
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("me")), &clock);
        let board = game.fetch_leaderboard().unwrap_or_default();
        assert_eq!(board.rank_of("me"), Some(1));
        game.on_leaderboard(&board);
        game.start();
        assert_eq!(game.scores().initial_rank, Some(1));
    }

    #[test]
    fn test_games_task_counts_starts() {
        let backend = MemoryStore::new();
        backend.insert(
            "veteran",
            AccountRecord {
                tasks: crate::progression::TaskRecord {
                    completed: (1..=12).collect(),
                    collected: (1..=12).collect(),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&backend, Some("veteran")), &clock);
        for _ in 0..3 {
            game.start();
            fall_until_ended(&mut game, &clock);
        }
        assert!(game.tasks().is_completed(15));
        let saved = backend.record("veteran").unwrap_or_default();
        assert!(saved.tasks.completed.contains(&15));
        assert_eq!(saved.tasks.lifetime.games_played, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let clock = ManualClock::new(0.0);
        let mut game = scripted(store_for(&MemoryStore::new(), None), &clock);
        game.start();
        step(&mut game, &clock);
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["obstacles"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(json["collectibles"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(json["player_x"], 100.0);
    }
}
