use crate::env::Environment;
use crate::policy::QTable;

/// Read-only snapshot handed to observers between steps.
pub struct Frame<'a, E: Environment> {
    pub env: &'a E,
    pub state: &'a E::State,
    pub q_table: &'a QTable<E::State, E::Action>,
    pub episode: u128,
    pub step: u128,
    pub episode_reward: f64,
    pub explore: f64,
    pub discount: f64,
}

/// Presentation hooks, called only at episode boundaries and after each step.
pub trait Observer<E: Environment> {
    fn episode_start(&mut self, _frame: &Frame<'_, E>) {}

    fn step(&mut self, _frame: &Frame<'_, E>, _action: E::Action) {}

    fn episode_end(&mut self, _frame: &Frame<'_, E>) {}
}

/// Observer that ignores everything.
impl<E: Environment> Observer<E> for () {}
