use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use super::deck::{Card, CardId, GridSize, generate_deck, new_shuffled_deck};
use super::timer::Timer;
use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No game.
    Idle,
    /// Deck dealt and the clock stopped: not started yet, or paused.
    /// Flips are rejected.
    Ready,
    /// Flips accepted.
    Playing,
    /// Two cards face up, board locked until they are evaluated.
    Evaluating,
    /// Every pair matched.
    Won,
}

/// Result of resolving a flipped pair. `first` and `second` are positions in
/// flip order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub first: usize,
    pub second: usize,
    pub matched: bool,
    pub won: bool,
}

/// One game of Concentration: the dealt board, the face-up cards awaiting
/// evaluation, the resolved pairs and the clock.
#[derive(Clone, Debug)]
pub struct Game {
    grid: GridSize,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    matched: BTreeSet<CardId>,
    moves: u32,
    mismatches: u32,
    timer: Timer,
}

impl Game {
    /// Deals a freshly shuffled deck. The game starts Ready with the timer
    /// stopped.
    pub fn new<R: Rng + ?Sized>(grid: GridSize, rng: &mut R) -> Result<Self, GameError> {
        let cards = new_shuffled_deck(grid, rng)?;
        Ok(Self::with_cards(grid, cards))
    }

    /// Deals the deck in generation order, so positions `2k` and `2k + 1`
    /// hold a pair. Used for replays and tests.
    pub fn unshuffled(grid: GridSize) -> Result<Self, GameError> {
        let cards = generate_deck(grid)?;
        Ok(Self::with_cards(grid, cards))
    }

    fn with_cards(grid: GridSize, cards: Vec<Card>) -> Self {
        debug_assert_eq!(cards.len(), grid.total_cards());
        Game {
            grid,
            cards,
            flipped: Vec::with_capacity(2),
            matched: BTreeSet::new(),
            moves: 0,
            mismatches: 0,
            timer: Timer::default(),
        }
    }

    pub fn start_timer(&mut self) -> bool {
        self.timer.start()
    }

    pub fn stop_timer(&mut self) -> bool {
        self.timer.stop()
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    /// Turns unresolved flips face down without counting a mismatch.
    pub(crate) fn clear_flipped(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.flipped)
    }

    pub(crate) fn tick(&mut self) -> bool {
        self.timer.tick()
    }

    /// Turns the card at `position` face up. Returns `false` and leaves the
    /// board untouched when the game is not running, two cards are already
    /// awaiting evaluation, the position is off the board, or the card is
    /// already matched or face up.
    pub fn request_flip(&mut self, position: usize) -> bool {
        if !self.timer.is_running() || self.is_locked() {
            return false;
        }
        let Some(card) = self.cards.get(position) else {
            return false;
        };
        if self.matched.contains(&card.id()) || self.flipped.contains(&position) {
            return false;
        }

        self.flipped.push(position);
        if self.flipped.len() == 2 {
            self.moves = self.moves.saturating_add(1);
        }
        debug!(position, glyph = %card.glyph(), moves = self.moves, "card flipped");
        true
    }

    /// Resolves the two face-up cards. Does nothing unless exactly two are
    /// flipped. Clears the flipped set in every case, stopping the timer when
    /// the match completes the board.
    pub fn evaluate_match(&mut self) -> Option<MatchOutcome> {
        let [first, second] = self.flipped[..] else {
            return None;
        };
        self.flipped.clear();

        let (a, b) = (&self.cards[first], &self.cards[second]);
        let matched = a.matches(b);
        if matched {
            self.matched.insert(a.id());
            self.matched.insert(b.id());
        } else {
            self.mismatches = self.mismatches.saturating_add(1);
        }

        let won = self.is_win();
        if won {
            self.timer.stop();
        }
        debug!(first, second, matched, won, "pair evaluated");
        Some(MatchOutcome {
            first,
            second,
            matched,
            won,
        })
    }

    pub fn is_win(&self) -> bool {
        self.matched.len() == self.grid.total_cards()
    }

    pub fn phase(&self) -> Phase {
        if self.is_win() {
            Phase::Won
        } else if self.is_locked() {
            Phase::Evaluating
        } else if self.timer.is_running() {
            Phase::Playing
        } else {
            Phase::Ready
        }
    }

    /// Board lock: two cards face up awaiting evaluation.
    pub fn is_locked(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    /// Face-up, unresolved positions in flip order.
    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched_ids(&self) -> &BTreeSet<CardId> {
        &self.matched
    }

    pub fn is_matched(&self, position: usize) -> bool {
        self.cards
            .get(position)
            .is_some_and(|card| self.matched.contains(&card.id()))
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Share of evaluated pairs that matched, rounded. 100 before any pair.
    pub fn precision_pct(&self) -> u8 {
        let matches = (self.matched.len() / 2) as u32;
        let attempts = matches.saturating_add(self.mismatches);
        if attempts == 0 {
            100
        } else {
            ((matches as f64 / attempts as f64) * 100.0).round() as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_4x4() -> Game {
        let mut game = Game::unshuffled(GridSize::new(4, 4).unwrap()).unwrap();
        game.start_timer();
        game
    }

    #[test]
    fn test_new_game_is_ready() {
        let game = Game::unshuffled(GridSize::new(4, 4).unwrap()).unwrap();
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.cards().len(), 16);
        assert!(game.flipped().is_empty());
        assert!(game.matched_ids().is_empty());
        assert_eq!(game.moves(), 0);
        assert_eq!(game.elapsed_seconds(), 0);
        assert!(!game.is_running());
    }

    #[test]
    fn test_flip_rejected_before_start() {
        let mut game = Game::unshuffled(GridSize::new(4, 4).unwrap()).unwrap();
        assert!(!game.request_flip(0));
        assert!(game.flipped().is_empty());
    }

    #[test]
    fn test_flip_rejections() {
        let mut game = running_4x4();
        assert!(!game.request_flip(16));
        assert!(game.request_flip(3));
        assert!(!game.request_flip(3));
        assert_eq!(game.flipped(), &[3]);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_board_locks_after_second_flip() {
        let mut game = running_4x4();
        assert!(game.request_flip(0));
        assert!(game.request_flip(2));
        assert_eq!(game.phase(), Phase::Evaluating);
        assert!(!game.request_flip(4));
        assert_eq!(game.flipped(), &[0, 2]);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_evaluate_needs_two_flipped() {
        let mut game = running_4x4();
        assert_eq!(game.evaluate_match(), None);
        game.request_flip(0);
        assert_eq!(game.evaluate_match(), None);
        assert_eq!(game.flipped(), &[0]);
    }

    #[test]
    fn test_matching_pair() {
        let mut game = running_4x4();
        game.request_flip(0);
        game.request_flip(1);
        let outcome = game.evaluate_match().unwrap();
        assert_eq!(
            outcome,
            MatchOutcome {
                first: 0,
                second: 1,
                matched: true,
                won: false,
            }
        );
        assert_eq!(game.matched_ids().len(), 2);
        assert!(game.is_matched(0) && game.is_matched(1));
        assert!(game.flipped().is_empty());
        assert_eq!(game.moves(), 1);
        assert_eq!(game.phase(), Phase::Playing);

        assert!(!game.request_flip(0));
    }

    #[test]
    fn test_mismatching_pair() {
        let mut game = running_4x4();
        game.request_flip(2);
        game.request_flip(0);
        let outcome = game.evaluate_match().unwrap();
        assert_eq!((outcome.first, outcome.second), (2, 0));
        assert!(!outcome.matched);
        assert!(game.matched_ids().is_empty());
        assert!(game.flipped().is_empty());
        assert_eq!(game.moves(), 1);
        assert_eq!(game.mismatches(), 1);
        assert_eq!(game.precision_pct(), 0);
    }

    #[test]
    fn test_win_after_all_pairs() {
        let mut game = running_4x4();
        for pair in 0..8 {
            assert!(!game.is_win());
            game.request_flip(pair * 2);
            game.request_flip(pair * 2 + 1);
            let outcome = game.evaluate_match().unwrap();
            assert_eq!(outcome.won, pair == 7);
        }
        assert!(game.is_win());
        assert_eq!(game.phase(), Phase::Won);
        assert!(!game.is_running());
        assert_eq!(game.moves(), 8);
        assert_eq!(game.precision_pct(), 100);
    }

    #[test]
    fn test_timer_counts_only_while_running() {
        let mut game = Game::unshuffled(GridSize::new(2, 2).unwrap()).unwrap();
        assert!(!game.tick());
        game.start_timer();
        game.tick();
        game.tick();
        game.stop_timer();
        game.tick();
        assert_eq!(game.elapsed_seconds(), 2);
        game.reset_timer();
        assert_eq!(game.elapsed_seconds(), 0);
        assert_eq!(game.phase(), Phase::Ready);
    }

    #[test]
    fn test_paused_game_reads_ready_and_keeps_progress() {
        let mut game = running_4x4();
        game.request_flip(0);
        game.request_flip(1);
        game.evaluate_match();
        assert!(game.stop_timer());
        assert_eq!(game.phase(), Phase::Ready);
        assert!(!game.request_flip(2));
        assert_eq!(game.matched_ids().len(), 2);

        game.start_timer();
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_clear_flipped_unlocks_without_mismatch() {
        let mut game = running_4x4();
        game.request_flip(0);
        game.request_flip(2);
        assert_eq!(game.clear_flipped(), vec![0, 2]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.mismatches(), 0);
        assert_eq!(game.evaluate_match(), None);
    }
}
