use std::fmt::Display;
use std::str::FromStr;

use crate::error::Error;

use super::DiscreteAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridAction {
    Up,
    Down,
    Left,
    Right,
}

impl GridAction {
    pub const ALL: [GridAction; 4] = [
        GridAction::Up,
        GridAction::Down,
        GridAction::Left,
        GridAction::Right,
    ];

    pub fn arrow(self) -> char {
        match self {
            GridAction::Up => '^',
            GridAction::Down => 'v',
            GridAction::Left => '<',
            GridAction::Right => '>',
        }
    }

    /// Row and column offsets of the move.
    pub fn delta(self) -> (i32, i32) {
        match self {
            GridAction::Up => (-1, 0),
            GridAction::Down => (1, 0),
            GridAction::Left => (0, -1),
            GridAction::Right => (0, 1),
        }
    }
}

impl DiscreteAction for GridAction {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl Display for GridAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = match self {
            GridAction::Up => "up",
            GridAction::Down => "down",
            GridAction::Left => "left",
            GridAction::Right => "right",
        };
        f.write_str(label)
    }
}

impl FromStr for GridAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(GridAction::Up),
            "down" => Ok(GridAction::Down),
            "left" => Ok(GridAction::Left),
            "right" => Ok(GridAction::Right),
            _ => Err(Error::UnknownAction(s.trim().to_string())),
        }
    }
}
