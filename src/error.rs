use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid action `{action}` from state {state}")]
    InvalidAction { action: String, state: String },

    #[error("unrecognized action `{0}`")]
    UnknownAction(String),

    #[error("no legal actions from state {state}")]
    DeadEnd { state: String },

    #[error("the environment has no starting positions")]
    NoStartingPositions,

    #[error("grid is empty")]
    EmptyGrid,

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid cell `{token}` at row {row}, column {col}")]
    InvalidCell {
        row: usize,
        col: usize,
        token: String,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("plotting failed: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
