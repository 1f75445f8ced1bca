pub mod action_selection;
pub mod agent;
pub mod env;
pub mod error;
pub mod policy;
pub mod render;
pub mod trainer;
pub mod utils;

pub use agent::QLearner;
pub use env::{Environment, GridAction, GridWorld, Position, RewardProvider};
pub use error::{Error, Result};
pub use trainer::{TrainingConfig, TrainingSession};
