use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ActionSelection;

/// Epsilon-greedy exploration whose epsilon shrinks linearly after every
/// training episode until it reaches `final_epsilon`.
#[derive(Debug, Clone)]
pub struct EpsilonDecreasing {
    epsilon: f64,
    epsilon_decay: f64,
    final_epsilon: f64,
    rng: StdRng,
}

impl EpsilonDecreasing {
    pub fn new(epsilon: f64, epsilon_decay: f64, final_epsilon: f64, seed: u64) -> Self {
        Self {
            epsilon,
            epsilon_decay,
            final_epsilon,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decay that walks from `epsilon` to `final_epsilon` within `episodes`.
    pub fn over_episodes(epsilon: f64, final_epsilon: f64, episodes: u128, seed: u64) -> Self {
        let epsilon_decay: f64 = (epsilon - final_epsilon).max(0.0) / episodes.max(1) as f64;
        Self::new(epsilon, epsilon_decay, final_epsilon, seed)
    }
}

impl ActionSelection for EpsilonDecreasing {
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

    fn update(&mut self) {
        let new_epsilon: f64 = self.epsilon - self.epsilon_decay;
        self.epsilon = new_epsilon.max(self.final_epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_down_to_the_floor() {
        let mut selection = EpsilonDecreasing::new(0.5, 0.2, 0.05, 1);
        selection.update();
        assert!((selection.epsilon() - 0.3).abs() < 1e-12);
        selection.update();
        selection.update();
        assert_eq!(selection.epsilon(), 0.05);
    }

    #[test]
    fn reaches_final_epsilon_after_the_given_episodes() {
        let mut selection = EpsilonDecreasing::over_episodes(1.0, 0.0, 10, 1);
        for _ in 0..10 {
            selection.update();
        }
        assert!(selection.epsilon().abs() < 1e-9);
        selection.update();
        assert_eq!(selection.epsilon(), 0.0);
        assert!(!selection.should_explore());
    }
}
