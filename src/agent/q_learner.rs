use tracing::trace;

use crate::action_selection::{ActionSelection, EnumActionSelection};
use crate::env::{Environment, RewardProvider};
use crate::error::{Error, Result};
use crate::policy::QTable;

/// Tabular one-step Q-learning agent.
///
/// Owns the Q-table for the whole run; `state` and the episode reward are
/// reset at the start of every episode.
pub struct QLearner<'a, E: Environment, R: RewardProvider<E::State>> {
    env: &'a E,
    rewards: R,
    state: E::State,
    reward: f64,
    discount: f64,
    learning_rate: f64,
    action_selection: EnumActionSelection,
    q: QTable<E::State, E::Action>,
    training_error: Vec<f64>,
}

impl<'a, E: Environment, R: RewardProvider<E::State>> QLearner<'a, E, R> {
    /// `learning_rate` should stay at 1.0 for deterministic environments.
    pub fn new(
        state: E::State,
        env: &'a E,
        rewards: R,
        discount: f64,
        learning_rate: f64,
        action_selection: EnumActionSelection,
    ) -> Self {
        Self {
            env,
            rewards,
            state,
            reward: 0.0,
            discount,
            learning_rate,
            action_selection,
            q: QTable::new(),
            training_error: vec![],
        }
    }

    pub fn reset(&mut self, state: E::State) {
        self.state = state;
        self.reward = 0.0;
    }

    pub fn actions(&self, state: &E::State) -> Vec<E::Action> {
        self.env.actions(state)
    }

    /// Takes `action`, or picks one epsilon-greedily when `None`, then learns
    /// from the transition. Returns the action taken.
    pub fn step(&mut self, action: Option<E::Action>) -> Result<E::Action> {
        let actions: Vec<E::Action> = self.actions(&self.state);
        self.q.get_or_init(self.state.clone(), &actions);

        let action: E::Action = match action {
            None => self.choose_action(&actions)?,
            Some(action) if actions.contains(&action) => action,
            Some(action) => {
                return Err(Error::InvalidAction {
                    action: action.to_string(),
                    state: format!("{:?}", self.state),
                })
            }
        };

        let prev_state: E::State = self.state.clone();
        let new_state: E::State = self.env.transition(&prev_state, action);
        self.learn(&prev_state, action, &new_state)?;
        self.state = new_state;
        Ok(action)
    }

    fn choose_action(&mut self, actions: &[E::Action]) -> Result<E::Action> {
        if actions.is_empty() {
            return Err(Error::DeadEnd {
                state: format!("{:?}", self.state),
            });
        }
        if self.action_selection.should_explore() {
            let i: usize = self.action_selection.random_index(actions.len());
            return Ok(actions[i]);
        }
        match self.best_action(&self.state) {
            Some(action) => Ok(action),
            None => Ok(actions[0]),
        }
    }

    /// Greedy action for `state`, `None` if it was never visited.
    pub fn best_action(&self, state: &E::State) -> Option<E::Action> {
        self.q.get(state).and_then(|row| row.best_action())
    }

    /// One-step Q-learning update, returns the temporal difference.
    /// Fails without touching anything when `action` is not legal in `prev_state`.
    pub(crate) fn learn(
        &mut self,
        prev_state: &E::State,
        action: E::Action,
        new_state: &E::State,
    ) -> Result<f64> {
        let prev_actions: Vec<E::Action> = self.env.actions(prev_state);
        if !prev_actions.contains(&action) {
            return Err(Error::InvalidAction {
                action: action.to_string(),
                state: format!("{:?}", prev_state),
            });
        }

        let next_actions: Vec<E::Action> = self.env.actions(new_state);
        let future_q_value: f64 = self
            .q
            .get_or_init(new_state.clone(), &next_actions)
            .max_value();

        let reward: f64 = self.rewards.reward(new_state);
        let learning_rate: f64 = self.learning_rate;
        let discount: f64 = self.discount;
        let row = self.q.get_or_init(prev_state.clone(), &prev_actions);
        let value: &mut f64 = row.get_mut(action).ok_or_else(|| Error::InvalidAction {
            action: action.to_string(),
            state: format!("{:?}", prev_state),
        })?;
        let temporal_difference: f64 = reward + discount * future_q_value - *value;
        *value += learning_rate * temporal_difference;
        trace!(
            ?prev_state,
            %action,
            ?new_state,
            reward,
            q = *value,
            "q-value updated"
        );
        self.reward += reward;
        self.training_error.push(temporal_difference);
        Ok(temporal_difference)
    }

    /// Lets the exploration strategy react to the end of a training episode.
    pub fn end_episode(&mut self) {
        self.action_selection.update();
    }

    pub fn state(&self) -> &E::State {
        &self.state
    }

    /// Cumulative reward of the current episode.
    pub fn episode_reward(&self) -> f64 {
        self.reward
    }

    pub fn q_table(&self) -> &QTable<E::State, E::Action> {
        &self.q
    }

    /// Temporal difference of every update so far.
    pub fn training_error(&self) -> &[f64] {
        &self.training_error
    }

    pub fn explore(&self) -> f64 {
        self.action_selection.epsilon()
    }

    pub fn set_explore(&mut self, explore: f64) {
        self.action_selection.set_epsilon(explore);
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }
}
