use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ActionSelection;

#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, seed: u64) -> Self {
        Self {
            epsilon,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ActionSelection for EpsilonGreedy {
    fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.rng.gen::<f64>() < self.epsilon
    }

    fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    fn update(&mut self) {}
}
