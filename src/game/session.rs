//! The active game session.
//!
//! `Session` is the single owner of the current [`Game`]. It turns the
//! second flip of a pair into a delayed evaluation task, runs the one-second
//! timer as a repeating task, and reports everything that happens to a
//! [`Renderer`]. Restarting or abandoning cancels whatever is still queued,
//! and every task carries the generation of the game that scheduled it so a
//! task from a superseded game is dropped.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::deck::{Glyph, GridSize};
use super::difficulty::Difficulty;
use super::schedule::{Task, TaskHandle, TaskQueue};
use super::state::{Game, MatchOutcome, Phase};
use super::timer::format_mm_ss;
use crate::config::GameConfig;
use crate::error::{AudioError, GameError};
use crate::store::{BestTimes, DifficultyKey, KeyValueStore};

/// What the renderer needs to draw one card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardView {
    pub position: usize,
    pub glyph: Glyph,
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinSummary {
    pub grid: GridSize,
    pub elapsed_seconds: u32,
    pub formatted_time: String,
    pub moves: u32,
    pub mismatches: u32,
    pub precision_pct: u8,
    pub is_new_record: bool,
    /// Best time before this win, if there was one.
    pub previous_best: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    BoardReady { grid: GridSize, cards: Vec<CardView> },
    Started,
    Paused,
    CardFlipped { position: usize, glyph: Glyph },
    PairMatched { first: usize, second: usize },
    /// Both cards go face down again.
    PairMismatched { first: usize, second: usize },
    Tick { elapsed_seconds: u32 },
    /// Unresolved cards turned face down without an evaluation.
    FlipsCleared { positions: Vec<usize> },
    Won(WinSummary),
    Abandoned,
}

/// Presentation side of the game. The session never draws anything itself.
pub trait Renderer {
    fn render(&mut self, event: &GameEvent);
}

/// Buffers events for a frontend that drains them after each call.
impl Renderer for Vec<GameEvent> {
    fn render(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// Fire-and-forget victory sound.
pub trait AudioCue {
    fn play_victory(&mut self) -> Result<(), AudioError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioCue for Silent {
    fn play_victory(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

pub struct Session<R, A, S> {
    match_delay: Duration,
    tick_interval: Duration,
    game: Option<Game>,
    generation: u64,
    queue: TaskQueue,
    pending_evaluation: Option<TaskHandle>,
    tick_handle: Option<TaskHandle>,
    best_times: BestTimes<S>,
    renderer: R,
    audio: A,
    rng: StdRng,
}

impl<R: Renderer, A: AudioCue, S: KeyValueStore> Session<R, A, S> {
    pub fn new(config: &GameConfig, store: S, renderer: R, audio: A) -> Self {
        Session {
            match_delay: config.match_delay(),
            tick_interval: config.tick_interval(),
            game: None,
            generation: 0,
            queue: TaskQueue::new(),
            pending_evaluation: None,
            tick_handle: None,
            best_times: BestTimes::new(store),
            renderer,
            audio,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Makes deals reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Deals a fresh shuffled board. Any previous game is discarded along
    /// with its queued tasks. The new game is Ready; call [`Self::start`].
    pub fn new_game(&mut self, grid: GridSize) -> Result<(), GameError> {
        let game = Game::new(grid, &mut self.rng)?;
        self.install(game);
        Ok(())
    }

    pub fn new_game_for(&mut self, difficulty: Option<Difficulty>) -> Result<(), GameError> {
        let difficulty = difficulty.ok_or(GameError::NoDifficultySelected)?;
        self.new_game(difficulty.grid())
    }

    /// Installs a game dealt by the caller, e.g. [`Game::unshuffled`]. The
    /// game comes in Ready: its clock is zeroed and unresolved flips are
    /// turned face down, matched pairs are kept.
    pub fn load_game(&mut self, game: Game) {
        self.install(game);
    }

    fn install(&mut self, mut game: Game) {
        self.cancel_pending();
        game.reset_timer();
        game.clear_flipped();
        self.generation = self.generation.wrapping_add(1);
        info!(grid = %game.grid(), generation = self.generation, "new game dealt");
        let cards = game
            .cards()
            .iter()
            .map(|card| CardView {
                position: card.position(),
                glyph: card.glyph(),
                matched: game.matched_ids().contains(&card.id()),
            })
            .collect();
        let grid = game.grid();
        self.game = Some(game);
        self.renderer.render(&GameEvent::BoardReady { grid, cards });
    }

    /// Re-deals the current board shape. No-op without a game.
    pub fn restart(&mut self) -> Result<(), GameError> {
        match self.game.as_ref().map(Game::grid) {
            Some(grid) => self.new_game(grid),
            None => Ok(()),
        }
    }

    /// Drops the current game and cancels its queued tasks.
    pub fn abandon(&mut self) {
        if self.game.take().is_none() {
            return;
        }
        self.cancel_pending();
        self.generation = self.generation.wrapping_add(1);
        info!("game abandoned");
        self.renderer.render(&GameEvent::Abandoned);
    }

    /// Ready -> Playing: starts the clock so flips are accepted. Returns
    /// `false` without a game, once won, or when already running.
    pub fn start(&mut self) -> bool {
        self.start_timer()
    }

    pub fn start_timer(&mut self) -> bool {
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        if game.is_win() || !game.start_timer() {
            return false;
        }
        self.tick_handle = Some(self.queue.schedule(
            self.tick_interval,
            Task::TimerTick {
                generation: self.generation,
            },
        ));
        self.renderer.render(&GameEvent::Started);
        true
    }

    /// Stops the clock; flips are rejected until it starts again.
    pub fn stop_timer(&mut self) -> bool {
        let stopped = self.game.as_mut().is_some_and(Game::stop_timer);
        if let Some(handle) = self.tick_handle.take() {
            self.queue.cancel(handle);
        }
        if stopped {
            self.renderer.render(&GameEvent::Paused);
        }
        stopped
    }

    /// Stops and zeroes the clock. A pair awaiting evaluation is dropped
    /// and its cards turned face down.
    pub fn reset_timer(&mut self) {
        self.stop_timer();
        if let Some(handle) = self.pending_evaluation.take() {
            self.queue.cancel(handle);
        }
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.reset_timer();
        let positions = game.clear_flipped();
        if !positions.is_empty() {
            self.renderer.render(&GameEvent::FlipsCleared { positions });
        }
        self.renderer.render(&GameEvent::Tick { elapsed_seconds: 0 });
    }

    /// Forwards a flip to the game. The second card of a pair queues the
    /// evaluation after the match delay; the board stays locked until then.
    pub fn request_flip(&mut self, position: usize) -> bool {
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        if !game.request_flip(position) {
            debug!(position, "flip rejected");
            return false;
        }
        let Some(glyph) = game.card(position).map(|card| card.glyph()) else {
            return false;
        };
        let locked = game.is_locked();
        self.renderer.render(&GameEvent::CardFlipped { position, glyph });
        if locked {
            self.pending_evaluation = Some(self.queue.schedule(
                self.match_delay,
                Task::EvaluateMatch {
                    generation: self.generation,
                },
            ));
        }
        true
    }

    /// Moves the session clock forward by `elapsed`, running every task that
    /// falls due, one at a time in deadline order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.queue.now() + elapsed;
        while let Some(task) = self.queue.pop_due(until) {
            self.run_task(task);
        }
        self.queue.settle(until);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::EvaluateMatch { generation } if generation == self.generation => {
                self.pending_evaluation = None;
                self.evaluate();
            }
            Task::TimerTick { generation } if generation == self.generation => {
                self.tick_handle = None;
                self.tick();
            }
            stale => debug!(?stale, current = self.generation, "dropping stale task"),
        }
    }

    fn tick(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if !game.tick() {
            return;
        }
        let elapsed_seconds = game.elapsed_seconds();
        self.tick_handle = Some(self.queue.schedule(
            self.tick_interval,
            Task::TimerTick {
                generation: self.generation,
            },
        ));
        self.renderer.render(&GameEvent::Tick { elapsed_seconds });
    }

    fn evaluate(&mut self) {
        let Some(outcome) = self.game.as_mut().and_then(Game::evaluate_match) else {
            return;
        };
        let MatchOutcome {
            first,
            second,
            matched,
            won,
        } = outcome;
        if matched {
            self.renderer.render(&GameEvent::PairMatched { first, second });
        } else {
            self.renderer.render(&GameEvent::PairMismatched { first, second });
        }
        if won {
            self.finish_win();
        }
    }

    fn finish_win(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            self.queue.cancel(handle);
        }
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let grid = game.grid();
        let key = DifficultyKey::from(grid);
        let elapsed_seconds = game.elapsed_seconds();
        let previous_best = self.best_times.load(key);
        let is_new_record = self.best_times.record_if_best(key, elapsed_seconds);
        let summary = WinSummary {
            grid,
            elapsed_seconds,
            formatted_time: format_mm_ss(elapsed_seconds),
            moves: game.moves(),
            mismatches: game.mismatches(),
            precision_pct: game.precision_pct(),
            is_new_record,
            previous_best,
        };
        info!(
            %grid,
            elapsed_seconds,
            moves = summary.moves,
            is_new_record,
            "board cleared"
        );

        if let Err(err) = self.audio.play_victory() {
            warn!(error = %err, "victory cue failed");
        }
        self.renderer.render(&GameEvent::Won(summary));
    }

    fn cancel_pending(&mut self) {
        for handle in [self.pending_evaluation.take(), self.tick_handle.take()]
            .into_iter()
            .flatten()
        {
            self.queue.cancel(handle);
        }
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.game.as_ref().map_or(Phase::Idle, Game::phase)
    }

    pub fn is_win(&self) -> bool {
        self.game.as_ref().is_some_and(Game::is_win)
    }

    /// Whether a pair evaluation is queued.
    pub fn has_pending_evaluation(&self) -> bool {
        self.pending_evaluation
            .is_some_and(|handle| self.queue.is_pending(handle))
    }

    pub fn best_time(&self, grid: GridSize) -> Option<u32> {
        self.best_times.load(DifficultyKey::from(grid))
    }

    pub fn best_times(&self) -> &BestTimes<S> {
        &self.best_times
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn now(&self) -> Duration {
        self.queue.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    type TestSession = Session<Vec<GameEvent>, Silent, MemoryStore>;

    fn session_4x4() -> TestSession {
        let mut session = Session::new(
            &GameConfig::default(),
            MemoryStore::new(),
            Vec::new(),
            Silent,
        );
        session.load_game(Game::unshuffled(GridSize::new(4, 4).unwrap()).unwrap());
        session.start();
        session.renderer_mut().clear();
        session
    }

    #[test]
    fn test_idle_without_game() {
        let mut session: TestSession =
            Session::new(&GameConfig::default(), MemoryStore::new(), Vec::new(), Silent);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.start());
        assert!(!session.request_flip(0));
    }

    #[test]
    fn test_evaluation_waits_for_match_delay() {
        let mut session = session_4x4();
        assert!(session.request_flip(0));
        assert!(session.request_flip(1));
        assert_eq!(session.phase(), Phase::Evaluating);
        assert!(session.has_pending_evaluation());

        session.advance(Duration::from_millis(999));
        assert_eq!(session.phase(), Phase::Evaluating);
        assert!(!session.request_flip(2));

        session.advance(Duration::from_millis(1));
        assert_eq!(session.phase(), Phase::Playing);
        let game = session.game().unwrap();
        assert_eq!(game.matched_ids().len(), 2);
        assert!(game.flipped().is_empty());
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_events_in_order() {
        let mut session = session_4x4();
        session.request_flip(0);
        session.request_flip(2);
        session.advance(Duration::from_millis(1000));

        let events = session.renderer();
        assert!(matches!(events[0], GameEvent::CardFlipped { position: 0, .. }));
        assert!(matches!(events[1], GameEvent::CardFlipped { position: 2, .. }));
        // The tick and the evaluation share a deadline; the tick was queued first.
        assert_eq!(events[2], GameEvent::Tick { elapsed_seconds: 1 });
        assert_eq!(
            events[3],
            GameEvent::PairMismatched {
                first: 0,
                second: 2
            }
        );
    }

    #[test]
    fn test_restart_cancels_pending_evaluation() {
        let mut session = session_4x4();
        session.request_flip(0);
        session.request_flip(1);
        session.restart().unwrap();
        assert!(!session.has_pending_evaluation());

        session.advance(Duration::from_secs(5));
        let game = session.game().unwrap();
        assert!(game.matched_ids().is_empty());
        assert_eq!(game.moves(), 0);
        assert_eq!(game.elapsed_seconds(), 0);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn test_abandon_goes_idle() {
        let mut session = session_4x4();
        session.request_flip(0);
        session.request_flip(1);
        session.abandon();
        session.advance(Duration::from_secs(2));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.renderer().last(), Some(&GameEvent::Abandoned));
    }

    #[test]
    fn test_paused_timer_rejects_flips() {
        let mut session = session_4x4();
        session.advance(Duration::from_secs(3));
        assert!(session.stop_timer());
        session.advance(Duration::from_secs(3));
        assert!(!session.request_flip(0));
        assert_eq!(session.game().unwrap().elapsed_seconds(), 3);

        assert!(session.start_timer());
        assert!(!session.start_timer());
        session.advance(Duration::from_secs(1));
        assert_eq!(session.game().unwrap().elapsed_seconds(), 4);
    }

    #[test]
    fn test_reset_timer_zeroes_clock() {
        let mut session = session_4x4();
        session.advance(Duration::from_secs(2));
        session.reset_timer();
        assert_eq!(session.game().unwrap().elapsed_seconds(), 0);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn test_reset_timer_drops_unresolved_pair() {
        let mut session: TestSession =
            Session::new(&GameConfig::default(), MemoryStore::new(), Vec::new(), Silent);
        let grid = GridSize::new(2, 2).unwrap();
        session.load_game(Game::unshuffled(grid).unwrap());
        session.start();
        session.request_flip(0);
        session.request_flip(1);
        session.advance(Duration::from_secs(5));
        assert!(session.request_flip(2));
        assert!(session.request_flip(3));

        session.reset_timer();
        assert!(!session.has_pending_evaluation());
        assert_eq!(
            session.renderer().iter().rev().nth(1),
            Some(&GameEvent::FlipsCleared {
                positions: vec![2, 3]
            })
        );
        session.advance(Duration::from_secs(1));
        assert!(!session.is_win());
        assert_eq!(session.best_time(grid), None);
        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.game().unwrap().flipped().is_empty());

        assert!(session.start());
        session.request_flip(2);
        session.request_flip(3);
        session.advance(Duration::from_secs(1));
        assert!(session.is_win());
        assert_eq!(session.best_time(grid), Some(1));
    }

    #[test]
    fn test_load_game_normalises_running_and_locked_game() {
        let mut session: TestSession =
            Session::new(&GameConfig::default(), MemoryStore::new(), Vec::new(), Silent);
        let mut game = Game::unshuffled(GridSize::new(4, 4).unwrap()).unwrap();
        game.start_timer();
        game.request_flip(0);
        game.request_flip(1);
        game.evaluate_match();
        game.request_flip(2);
        game.request_flip(4);
        session.load_game(game);

        assert_eq!(session.phase(), Phase::Ready);
        assert!(!session.has_pending_evaluation());
        match session.renderer().last() {
            Some(GameEvent::BoardReady { cards, .. }) => {
                assert!(cards[0].matched && cards[1].matched);
                assert!(!cards[2].matched);
            }
            other => panic!("expected BoardReady, got {other:?}"),
        }

        assert!(session.start());
        session.advance(Duration::from_secs(10));
        assert_eq!(session.game().unwrap().elapsed_seconds(), 10);
        assert!(session.request_flip(2));
        assert!(session.request_flip(3));
        session.advance(Duration::from_secs(1));
        let game = session.game().unwrap();
        assert_eq!(game.matched_ids().len(), 4);
        assert_eq!(game.elapsed_seconds(), 11);
    }

    #[test]
    fn test_new_game_for_requires_difficulty() {
        let mut session: TestSession =
            Session::new(&GameConfig::default(), MemoryStore::new(), Vec::new(), Silent);
        assert_eq!(
            session.new_game_for(None),
            Err(GameError::NoDifficultySelected)
        );
        assert_eq!(session.phase(), Phase::Idle);
        session.new_game_for(Some(Difficulty::Easy)).unwrap();
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.game().unwrap().cards().len(), 12);
    }

    #[test]
    fn test_invalid_grid_never_reaches_play() {
        assert!(GridSize::new(3, 3).is_err());
        let mut session: TestSession =
            Session::new(&GameConfig::default(), MemoryStore::new(), Vec::new(), Silent);
        assert!(matches!(
            session.new_game(GridSize::new(10, 10).unwrap()),
            Err(GameError::PaletteExhausted { .. })
        ));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_seeded_deals_repeat() {
        let deal = |seed| {
            let mut session: TestSession = Session::new(
                &GameConfig::default(),
                MemoryStore::new(),
                Vec::new(),
                Silent,
            )
            .with_seed(seed);
            session.new_game(GridSize::new(4, 4).unwrap()).unwrap();
            session
                .game()
                .unwrap()
                .cards()
                .iter()
                .map(|card| card.id())
                .collect::<Vec<_>>()
        };
        assert_eq!(deal(9), deal(9));
    }
}
