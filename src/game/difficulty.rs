use super::deck::GridSize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// `(cols, rows)` of the board.
    pub fn config(self) -> (u16, u16) {
        match self {
            Difficulty::Easy => (3, 4),
            Difficulty::Normal => (4, 6),
            Difficulty::Hard => (6, 7),
            Difficulty::Expert => (6, 8),
        }
    }

    pub fn grid(self) -> GridSize {
        let (cols, rows) = self.config();
        match GridSize::new(rows, cols) {
            Ok(grid) => grid,
            Err(_) => unreachable!("preset {self:?} has an even card count"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::generate_deck;

    #[test]
    fn test_every_preset_builds_a_deck() {
        for difficulty in Difficulty::ALL {
            let grid = difficulty.grid();
            let (cols, rows) = difficulty.config();
            assert_eq!((grid.cols(), grid.rows()), (cols, rows));
            assert_eq!(generate_deck(grid).unwrap().len(), grid.total_cards());
        }
    }

    #[test]
    fn test_serde_codes() {
        assert_eq!(serde_json::to_string(&Difficulty::Expert).unwrap(), "\"expert\"");
        let parsed: Difficulty = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(parsed, Difficulty::Normal);
    }
}
