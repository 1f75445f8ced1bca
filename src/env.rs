mod grid_action;
mod grid_world;

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use crate::error::Error;

pub use grid_action::GridAction;
pub use grid_world::{GridWorld, Position};

/// A finite action enumeration with stable indices in `0..COUNT`.
pub trait DiscreteAction: Copy + Eq + Debug + Display + FromStr<Err = Error> {
    const COUNT: usize;

    fn index(self) -> usize;

    fn from_index(index: usize) -> Option<Self>;
}

/// Deterministic, side-effect free description of a finite environment.
pub trait Environment {
    type State: Hash + Eq + Clone + Debug;
    type Action: DiscreteAction;

    /// Legal actions from `state`, always in index order.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn transition(&self, state: &Self::State, action: Self::Action) -> Self::State;

    /// Intrinsic value of a state, `None` for holes.
    fn value(&self, state: &Self::State) -> Option<f64>;

    fn is_terminal(&self, state: &Self::State) -> bool;

    fn reward(&self, state: &Self::State) -> f64;

    fn starting_positions(&self) -> &[Self::State];
}

/// Anything that can score the state an agent lands on.
pub trait RewardProvider<S> {
    fn reward(&self, state: &S) -> f64;
}

impl<S, F> RewardProvider<S> for F
where
    F: Fn(&S) -> f64,
{
    fn reward(&self, state: &S) -> f64 {
        self(state)
    }
}
