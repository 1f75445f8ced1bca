mod config;
mod observer;

use std::io::{BufRead, Write};

use kdam::{tqdm, BarExt};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::action_selection::{EnumActionSelection, EpsilonDecreasing, EpsilonGreedy};
use crate::agent::QLearner;
use crate::env::{Environment, RewardProvider};
use crate::error::{Error, Result};
use crate::utils::mean;

pub use config::TrainingConfig;
pub use observer::{Frame, Observer};

/// Per-episode rewards, per-episode lengths and the temporal differences of
/// every update made while training.
pub type TrainResults = (Vec<f64>, Vec<u128>, Vec<f64>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f64,
    pub steps: u128,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub rewards: Vec<f64>,
    pub lengths: Vec<u128>,
    pub mean_reward: f64,
}

/// Drives a [`QLearner`] through training, evaluation and interactive play.
pub struct TrainingSession<'a, E: Environment, R: RewardProvider<E::State>> {
    env: &'a E,
    learner: QLearner<'a, E, R>,
    config: TrainingConfig,
    rng: StdRng,
    episode: u128,
}

impl<'a, E: Environment, R: RewardProvider<E::State>> TrainingSession<'a, E, R> {
    pub const QUIT: &'static str = "quit";

    pub fn new(env: &'a E, rewards: R, config: TrainingConfig) -> Result<Self> {
        let mut rng: StdRng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let start: E::State = env
            .starting_positions()
            .choose(&mut rng)
            .cloned()
            .ok_or(Error::NoStartingPositions)?;

        let action_selection: EnumActionSelection = match config.final_explore {
            Some(final_explore) => {
                let decay_episodes: u128 =
                    (config.train_episodes as f64 * config.exploration_time).round() as u128;
                EpsilonDecreasing::over_episodes(
                    config.explore,
                    final_explore,
                    decay_episodes,
                    config.seed,
                )
                .into()
            }
            None => EpsilonGreedy::new(config.explore, config.seed).into(),
        };
        let learner = QLearner::new(
            start,
            env,
            rewards,
            config.discount_factor,
            config.learning_rate,
            action_selection,
        );
        Ok(Self {
            env,
            learner,
            config,
            rng,
            episode: 0,
        })
    }

    pub fn learner(&self) -> &QLearner<'a, E, R> {
        &self.learner
    }

    fn random_start(&mut self) -> Result<E::State> {
        self.env
            .starting_positions()
            .choose(&mut self.rng)
            .cloned()
            .ok_or(Error::NoStartingPositions)
    }

    fn frame(&self, step: u128) -> Frame<'_, E> {
        Frame {
            env: self.env,
            state: self.learner.state(),
            q_table: self.learner.q_table(),
            episode: self.episode,
            step,
            episode_reward: self.learner.episode_reward(),
            explore: self.learner.explore(),
            discount: self.learner.discount(),
        }
    }

    /// Runs one policy-driven episode from a random starting position.
    pub fn run_episode(&mut self, observer: &mut dyn Observer<E>) -> Result<EpisodeSummary> {
        let start: E::State = self.random_start()?;
        self.learner.reset(start);
        observer.episode_start(&self.frame(0));

        let mut steps: u128 = 0;
        let mut truncated: bool = false;
        while !self.env.is_terminal(self.learner.state()) {
            if let Some(max_steps) = self.config.max_steps {
                if steps >= max_steps {
                    warn!(
                        episode = self.episode,
                        max_steps,
                        state = ?self.learner.state(),
                        "episode truncated"
                    );
                    truncated = true;
                    break;
                }
            }
            let action: E::Action = self.learner.step(None)?;
            steps += 1;
            observer.step(&self.frame(steps), action);
        }
        observer.episode_end(&self.frame(steps));
        self.episode += 1;

        Ok(EpisodeSummary {
            reward: self.learner.episode_reward(),
            steps,
            truncated,
        })
    }

    pub fn train(&mut self, observer: &mut dyn Observer<E>) -> Result<TrainResults> {
        let n_episodes: u128 = self.config.train_episodes;
        info!(
            episodes = n_episodes,
            explore = self.config.explore,
            discount = self.config.discount_factor,
            "training"
        );
        self.learner.set_explore(self.config.explore);

        let mut training_reward: Vec<f64> = vec![];
        let mut training_length: Vec<u128> = vec![];
        let error_start: usize = self.learner.training_error().len();

        let mut pb = if self.config.progress {
            Some(tqdm!(total = n_episodes as usize))
        } else {
            None
        };

        for episode in 0..n_episodes {
            let summary: EpisodeSummary = self.run_episode(observer)?;
            self.learner.end_episode();
            debug!(
                episode,
                reward = summary.reward,
                steps = summary.steps,
                explore = self.learner.explore(),
                "training episode finished"
            );
            training_reward.push(summary.reward);
            training_length.push(summary.steps);
            if let Some(pb) = pb.as_mut() {
                pb.set_postfix(format!("reward={}", summary.reward));
                pb.update(1);
            }
        }

        let training_error: Vec<f64> = self.learner.training_error()[error_start..].to_vec();
        info!(
            mean_reward = mean(&training_reward),
            states = self.learner.q_table().len(),
            "done training"
        );
        Ok((training_reward, training_length, training_error))
    }

    /// Greedy episodes; the exploration rate is restored afterwards.
    pub fn evaluate(&mut self, observer: &mut dyn Observer<E>) -> Result<Evaluation> {
        let explore: f64 = self.learner.explore();
        self.learner.set_explore(0.0);

        let mut rewards: Vec<f64> = vec![];
        let mut lengths: Vec<u128> = vec![];
        for _ in 0..self.config.eval_episodes {
            let summary: EpisodeSummary = self.run_episode(observer)?;
            debug!(
                reward = summary.reward,
                steps = summary.steps,
                "evaluation episode finished"
            );
            rewards.push(summary.reward);
            lengths.push(summary.steps);
        }
        self.learner.set_explore(explore);

        let mean_reward: f64 = mean(&rewards);
        info!(episodes = rewards.len(), mean_reward, "evaluation");
        Ok(Evaluation {
            rewards,
            lengths,
            mean_reward,
        })
    }

    /// Trains for the configured number of episodes, then evaluates greedily.
    pub fn run(&mut self, observer: &mut dyn Observer<E>) -> Result<(TrainResults, Evaluation)> {
        let results: TrainResults = self.train(&mut ())?;
        let evaluation: Evaluation = self.evaluate(observer)?;
        Ok((results, evaluation))
    }

    /// Plays with actions typed one per line until `quit` or end of input.
    /// Returns the number of accepted moves.
    pub fn interact<I: BufRead, W: Write>(
        &mut self,
        input: I,
        output: &mut W,
        observer: &mut dyn Observer<E>,
    ) -> Result<u128> {
        let start: E::State = self.random_start()?;
        self.learner.reset(start);
        observer.episode_start(&self.frame(0));

        let mut lines = input.lines();
        let mut steps: u128 = 0;
        loop {
            if self.env.is_terminal(self.learner.state()) {
                observer.episode_end(&self.frame(steps));
                writeln!(
                    output,
                    "episode over, reward: {}",
                    self.learner.episode_reward()
                )?;
                self.episode += 1;
                let start: E::State = self.random_start()?;
                self.learner.reset(start);
                observer.episode_start(&self.frame(0));
            }

            let actions: Vec<String> = self
                .learner
                .actions(self.learner.state())
                .iter()
                .map(|a| a.to_string())
                .collect();
            write!(output, "what should I do? [{}] >>> ", actions.join(", "))?;
            output.flush()?;

            let line: String = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            let command: &str = line.trim();
            if command == Self::QUIT {
                break;
            }

            let action: E::Action = match command.parse::<E::Action>() {
                Ok(action) => action,
                Err(e) => {
                    writeln!(output, "{}", e)?;
                    continue;
                }
            };
            let action: E::Action = match self.learner.step(Some(action)) {
                Ok(action) => action,
                Err(e @ Error::InvalidAction { .. }) => {
                    writeln!(output, "{}", e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            observer.step(&self.frame(steps + 1), action);

            writeln!(
                output,
                "step: {:03}, explore: {:.2}, discount: {}",
                steps,
                self.learner.explore(),
                self.learner.discount()
            )?;
            for (state, values) in self.learner.q_table().iter() {
                let entries: Vec<String> = values
                    .iter()
                    .map(|(a, v)| format!("{}: {:.2}", a, v))
                    .collect();
                writeln!(output, "{:?} -> {{{}}}", state, entries.join(", "))?;
            }
            steps += 1;
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{GridAction, GridWorld, Position};

    #[derive(Default)]
    struct Counter {
        starts: u128,
        steps: u128,
        ends: u128,
    }

    impl Observer<GridWorld> for Counter {
        fn episode_start(&mut self, frame: &Frame<'_, GridWorld>) {
            assert_eq!(frame.step, 0);
            assert_eq!(frame.episode_reward, 0.0);
            self.starts += 1;
        }

        fn step(&mut self, frame: &Frame<'_, GridWorld>, _action: GridAction) {
            assert!(frame.q_table.contains(frame.state));
            self.steps += 1;
        }

        fn episode_end(&mut self, _frame: &Frame<'_, GridWorld>) {
            self.ends += 1;
        }
    }

    fn config() -> TrainingConfig {
        TrainingConfig {
            train_episodes: 2000,
            eval_episodes: 20,
            max_steps: Some(200),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn training_reaches_positive_greedy_reward() {
        let env = GridWorld::default();
        let mut session = TrainingSession::new(&env, env.clone(), config()).unwrap();
        let ((rewards, lengths, errors), evaluation) = session.run(&mut ()).unwrap();

        assert_eq!(rewards.len(), 2000);
        assert_eq!(lengths.len(), 2000);
        assert_eq!(errors.len() as u128, lengths.iter().sum::<u128>());
        assert_eq!(evaluation.rewards.len(), 20);
        assert!(evaluation.mean_reward > 0.0, "{:?}", evaluation);
        assert!(evaluation.lengths.iter().all(|l| *l < 200));
        assert_eq!(session.learner().explore(), 0.5);
    }

    #[test]
    fn trained_policy_heads_for_the_nearest_goal() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(0.0), Some(0.0), Some(5.0)]]).unwrap();
        let mut session = TrainingSession::new(&env, env.clone(), config()).unwrap();
        session.train(&mut ()).unwrap();
        for col in 0..3 {
            assert_eq!(
                session.learner().best_action(&Position::new(0, col)),
                Some(GridAction::Right)
            );
        }
        let evaluation = session.evaluate(&mut ()).unwrap();
        assert!(evaluation.rewards.iter().all(|r| *r >= 3.0));
    }

    #[test]
    fn observer_sees_every_step() {
        let env = GridWorld::default();
        let mut session = TrainingSession::new(
            &env,
            env.clone(),
            TrainingConfig {
                train_episodes: 30,
                max_steps: Some(500),
                ..TrainingConfig::default()
            },
        )
        .unwrap();
        let mut counter = Counter::default();
        let mut total_steps: u128 = 0;
        for _ in 0..30 {
            total_steps += session.run_episode(&mut counter).unwrap().steps;
        }
        assert_eq!(counter.starts, 30);
        assert_eq!(counter.ends, 30);
        assert_eq!(counter.steps, total_steps);
    }

    #[test]
    fn step_cap_truncates_endless_episodes() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(0.0)]]).unwrap();
        let mut session = TrainingSession::new(
            &env,
            env.clone(),
            TrainingConfig {
                max_steps: Some(10),
                ..TrainingConfig::default()
            },
        )
        .unwrap();
        let summary = session.run_episode(&mut ()).unwrap();
        assert!(summary.truncated);
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.reward, -10.0);
    }

    #[test]
    fn decaying_exploration_ends_at_final_value() {
        let env = GridWorld::default();
        let mut session = TrainingSession::new(
            &env,
            env.clone(),
            TrainingConfig {
                explore: 1.0,
                final_explore: Some(0.1),
                exploration_time: 0.5,
                train_episodes: 100,
                max_steps: Some(500),
                ..TrainingConfig::default()
            },
        )
        .unwrap();
        session.train(&mut ()).unwrap();
        assert!((session.learner().explore() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn needs_a_starting_position() {
        let env = GridWorld::new(vec![vec![Some(5.0), None]]).unwrap();
        let session = TrainingSession::new(&env, env.clone(), TrainingConfig::default());
        assert!(matches!(session, Err(Error::NoStartingPositions)));
    }

    #[test]
    fn interactive_play_reprompts_and_quits() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(5.0)]]).unwrap();
        let mut session = TrainingSession::new(&env, env.clone(), TrainingConfig::default()).unwrap();
        let input: &[u8] = b"up\njump\nright\nquit\nright\n";
        let mut output: Vec<u8> = vec![];
        let steps = session.interact(input, &mut output, &mut ()).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(steps, 1);
        assert!(output.contains("what should I do? [right] >>> "));
        assert!(output.contains("invalid action `up`"));
        assert!(output.contains("unrecognized action `jump`"));
        assert!(output.contains("step: 000, explore: 0.50, discount: 0.9"));
        assert!(output.contains("right: 5.00"));
        assert!(output.contains("episode over, reward: 5"));
        assert_eq!(session.learner().state(), &Position::new(0, 0));
    }

    #[test]
    fn training_with_progress_bar() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(0.0), Some(5.0)]]).unwrap();
        let mut session = TrainingSession::new(
            &env,
            env.clone(),
            TrainingConfig {
                train_episodes: 10,
                max_steps: Some(100),
                progress: true,
                ..TrainingConfig::default()
            },
        )
        .unwrap();
        let (rewards, lengths, _) = session.train(&mut ()).unwrap();
        assert_eq!(rewards.len(), 10);
        assert!(lengths.iter().all(|l| *l >= 1));
    }

    #[test]
    fn interactive_restart_begins_a_fresh_episode() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(5.0)]]).unwrap();
        let mut session = TrainingSession::new(&env, env.clone(), TrainingConfig::default()).unwrap();
        let mut counter = Counter::default();
        let mut output: Vec<u8> = vec![];
        let steps = session
            .interact(&b"right\nquit\n"[..], &mut output, &mut counter)
            .unwrap();
        assert_eq!(steps, 1);
        assert_eq!(counter.starts, 2);
        assert_eq!(counter.steps, 1);
        assert_eq!(counter.ends, 1);
    }

    #[test]
    fn interactive_play_stops_at_end_of_input() {
        let env = GridWorld::new(vec![vec![Some(0.0), Some(0.0), Some(5.0)]]).unwrap();
        let mut session = TrainingSession::new(&env, env.clone(), TrainingConfig::default()).unwrap();
        let input: &[u8] = b"left\nright\n";
        let mut output: Vec<u8> = vec![];
        let steps = session.interact(input, &mut output, &mut ()).unwrap();
        assert!(steps >= 1);
        assert!(session.learner().q_table().len() >= 2);
    }
}
