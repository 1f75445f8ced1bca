mod epsilon_decreasing;
mod epsilon_greedy;

use enum_dispatch::enum_dispatch;

pub use epsilon_decreasing::EpsilonDecreasing;
pub use epsilon_greedy::EpsilonGreedy;

/// Exploration half of an epsilon-greedy policy; the greedy half lives in the Q-table.
#[enum_dispatch]
pub trait ActionSelection {
    /// Draws whether the next decision should be random.
    fn should_explore(&mut self) -> bool;

    /// Uniform index in `0..len`.
    fn random_index(&mut self, len: usize) -> usize;

    fn epsilon(&self) -> f64;

    fn set_epsilon(&mut self, epsilon: f64);

    /// Called once at the end of every training episode.
    fn update(&mut self);
}

#[derive(Debug, Clone)]
#[enum_dispatch(ActionSelection)]
pub enum EnumActionSelection {
    EpsilonGreedy(EpsilonGreedy),
    EpsilonDecreasing(EpsilonDecreasing),
}
