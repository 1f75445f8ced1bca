/// Everything a [`TrainingSession`](super::TrainingSession) needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub discount_factor: f64,
    pub learning_rate: f64,
    /// Exploration rate used while training.
    pub explore: f64,
    /// When set, exploration decays linearly to this value over the
    /// first `exploration_time` share of the training episodes.
    pub final_explore: Option<f64>,
    pub exploration_time: f64,
    pub train_episodes: u128,
    pub eval_episodes: u128,
    /// Episodes hitting this many steps are truncated. `None` lets them run
    /// until a terminal state.
    pub max_steps: Option<u128>,
    pub seed: u64,
    pub progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.9,
            learning_rate: 1.0,
            explore: 0.5,
            final_explore: None,
            exploration_time: 1.0,
            train_episodes: 500,
            eval_episodes: 5,
            max_steps: None,
            seed: 42,
            progress: false,
        }
    }
}
