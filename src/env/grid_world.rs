use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{Error, Result};

use super::{Environment, GridAction, RewardProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular grid of cell values, `None` marking a hole.
#[derive(Debug, Clone)]
pub struct GridWorld {
    grid: Array2<Option<f64>>,
    positions: Vec<Position>,
    starting_positions: Vec<Position>,
}

impl GridWorld {
    pub const HOLE: &'static str = "#";

    pub const DEFAULT_MAP: [&'static str; 4] = [
        "0 0 0 0 0 # #",
        "0 0 5 0 0 0 #",
        "0 0 # 5 # 0 #",
        "# 0 5 5 # 10 0",
    ];

    pub fn new(cells: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let nrow: usize = cells.len();
        let ncol: usize = cells.first().map_or(0, Vec::len);
        if nrow == 0 || ncol == 0 {
            return Err(Error::EmptyGrid);
        }
        for (row, cells_row) in cells.iter().enumerate() {
            if cells_row.len() != ncol {
                return Err(Error::RaggedGrid {
                    row,
                    expected: ncol,
                    found: cells_row.len(),
                });
            }
            for (col, cell) in cells_row.iter().enumerate() {
                if let Some(value) = cell {
                    if !value.is_finite() {
                        return Err(Error::InvalidCell {
                            row,
                            col,
                            token: value.to_string(),
                        });
                    }
                }
            }
        }
        let grid = Array2::from_shape_vec((nrow, ncol), cells.into_iter().flatten().collect())?;

        let mut env = Self {
            grid,
            positions: vec![],
            starting_positions: vec![],
        };
        env.positions = (0..nrow as i32)
            .flat_map(|row| (0..ncol as i32).map(move |col| Position::new(row, col)))
            .collect();
        env.starting_positions = env
            .positions
            .iter()
            .filter(|pos| !env.is_terminal(pos))
            .copied()
            .collect();
        Ok(env)
    }

    /// Parses one whitespace separated line per row, `#` marking a hole.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let mut cells: Vec<Vec<Option<f64>>> = vec![];
        for (row, line) in rows.iter().enumerate() {
            let mut parsed: Vec<Option<f64>> = vec![];
            for (col, token) in line.split_whitespace().enumerate() {
                parsed.push(Self::parse_cell(row, col, token)?);
            }
            cells.push(parsed);
        }
        Self::new(cells)
    }

    fn parse_cell(row: usize, col: usize, token: &str) -> Result<Option<f64>> {
        if token == Self::HOLE || token.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(Error::InvalidCell {
                row,
                col,
                token: token.to_string(),
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.nrows()
    }

    pub fn cols(&self) -> usize {
        self.grid.ncols()
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    fn cell(&self, pos: &Position) -> Option<Option<f64>> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        self.grid
            .get((pos.row as usize, pos.col as usize))
            .copied()
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        match Self::from_rows(&Self::DEFAULT_MAP) {
            Ok(env) => env,
            Err(e) => unreachable!("default map is well formed: {}", e),
        }
    }
}

impl FromStr for GridWorld {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        Self::from_rows(&rows)
    }
}

impl Environment for GridWorld {
    type State = Position;
    type Action = GridAction;

    fn actions(&self, state: &Position) -> Vec<GridAction> {
        let mut actions: Vec<GridAction> = Vec::with_capacity(4);
        if state.row > 0 {
            actions.push(GridAction::Up);
        }
        if state.row < self.rows() as i32 - 1 {
            actions.push(GridAction::Down);
        }
        if state.col > 0 {
            actions.push(GridAction::Left);
        }
        if state.col < self.cols() as i32 - 1 {
            actions.push(GridAction::Right);
        }
        actions
    }

    fn transition(&self, state: &Position, action: GridAction) -> Position {
        let (drow, dcol) = action.delta();
        Position::new(state.row + drow, state.col + dcol)
    }

    fn value(&self, state: &Position) -> Option<f64> {
        self.cell(state).flatten()
    }

    // holes are terminal too, the agent should never stand on one
    fn is_terminal(&self, state: &Position) -> bool {
        match self.value(state) {
            None => true,
            Some(value) => value > 0.0,
        }
    }

    fn reward(&self, state: &Position) -> f64 {
        match self.value(state) {
            Some(value) if value != 0.0 => value,
            _ => -1.0,
        }
    }

    fn starting_positions(&self) -> &[Position] {
        &self.starting_positions
    }
}

impl RewardProvider<Position> for GridWorld {
    fn reward(&self, state: &Position) -> f64 {
        Environment::reward(self, state)
    }
}
