use std::fmt;

use rand::Rng;

use super::shuffle::shuffle_cards;
use crate::error::GameError;

/// Symbols dealt onto card faces, one per pair. Sized for the largest preset
/// board (6x8, 24 pairs) with room to spare.
pub const PALETTE: [&str; 48] = [
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵", "🦄",
    "🐝", "🦋", "🐌", "🐞", "🐢", "🐙", "🦀", "🐬",
    // Fruits
    "🍏", "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🍒", "🍑", "🥝",
    // Activities/Objects
    "🎨", "🎬", "🎤", "🎧", "🎮", "🎯", "🎲", "🚀", "🚂", "🚢", "🌙", "🚲",
];

/// Board dimensions. Construction guarantees a non-empty grid with an even
/// number of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawGridSize", into = "RawGridSize")]
pub struct GridSize {
    rows: u16,
    cols: u16,
}

#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
struct RawGridSize {
    rows: u16,
    cols: u16,
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = GameError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        GridSize::new(raw.rows, raw.cols)
    }
}

impl From<GridSize> for RawGridSize {
    fn from(grid: GridSize) -> Self {
        RawGridSize {
            rows: grid.rows,
            cols: grid.cols,
        }
    }
}

impl GridSize {
    pub fn new(rows: u16, cols: u16) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidGrid { rows, cols });
        }
        if (rows as usize * cols as usize) % 2 != 0 {
            return Err(GameError::OddCardCount { rows, cols });
        }
        Ok(GridSize { rows, cols })
    }

    pub fn rows(self) -> u16 {
        self.rows
    }

    pub fn cols(self) -> u16 {
        self.cols
    }

    pub fn total_cards(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn total_pairs(self) -> usize {
        self.total_cards() / 2
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub u32);

/// Face symbol. Two cards match when their glyphs are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph(&'static str);

impl Glyph {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    glyph: Glyph,
    pub(crate) position: usize,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn glyph(&self) -> Glyph {
        self.glyph
    }

    /// Index of this card in the board sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn matches(&self, other: &Card) -> bool {
        self.glyph == other.glyph
    }
}

/// Builds the unshuffled deck for `grid`: pair `k` carries `PALETTE[k]` on
/// cards `2k` and `2k + 1`, and every card starts at position == id.
pub fn generate_deck(grid: GridSize) -> Result<Vec<Card>, GameError> {
    let total_pairs = grid.total_pairs();
    if total_pairs > PALETTE.len() {
        return Err(GameError::PaletteExhausted {
            pairs: total_pairs,
            palette: PALETTE.len(),
        });
    }

    let mut cards = Vec::with_capacity(grid.total_cards());
    for &symbol in PALETTE.iter().take(total_pairs) {
        for _ in 0..2 {
            let id = cards.len();
            cards.push(Card {
                id: CardId(id as u32),
                glyph: Glyph(symbol),
                position: id,
            });
        }
    }
    Ok(cards)
}

/// Generates a deck and shuffles it ready for play.
pub fn new_shuffled_deck<R: Rng + ?Sized>(
    grid: GridSize,
    rng: &mut R,
) -> Result<Vec<Card>, GameError> {
    let mut cards = generate_deck(grid)?;
    shuffle_cards(&mut cards, rng);
    Ok(cards)
}
