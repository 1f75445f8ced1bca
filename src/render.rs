mod plot;

use std::io::Write;

use tracing::warn;

use crate::env::{Environment, GridAction, GridWorld, Position};
use crate::policy::{ActionValues, QTable};
use crate::trainer::{Frame, Observer};

pub use plot::{plot_moving_average, save_policy_image};

const CELL_WIDTH: usize = 7;

fn value_label(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "hole".to_string(),
    }
}

/// Describes a cell: its Q-values and greedy arrow once something was
/// learned there, otherwise its own value.
pub fn cell_label(
    values: Option<&ActionValues<GridAction>>,
    value: Option<f64>,
    show_q_values: bool,
) -> String {
    let mut lines: Vec<String> = vec![];
    match values {
        Some(values) if !values.is_untouched() => {
            if show_q_values {
                for (action, v) in values.iter() {
                    let initial: String = action.to_string()[..1].to_uppercase();
                    lines.push(format!("{}{:.2}", initial, v));
                }
            }
            if let Some(best) = values.best_action() {
                lines.push(best.arrow().to_string());
            }
        }
        _ => lines.push(value_label(value)),
    }
    lines.join("\n")
}

/// Text rendering of the grid, the current position in brackets.
pub fn render_grid(env: &GridWorld, pos: Option<&Position>) -> String {
    let mut rows: Vec<String> = vec![];
    for row in 0..env.rows() as i32 {
        let mut line: String = String::new();
        for col in 0..env.cols() as i32 {
            let here = Position::new(row, col);
            let mut label: String = match env.value(&here) {
                Some(v) => v.to_string(),
                None => GridWorld::HOLE.to_string(),
            };
            if pos == Some(&here) {
                label = format!("[{}]", label);
            }
            line.push_str(&format!("{:^width$}", label, width = CELL_WIDTH));
        }
        rows.push(line.trim_end().to_string());
    }
    rows.join("\n")
}

/// Greedy arrows for visited cells, cell values elsewhere.
pub fn render_policy(env: &GridWorld, q_table: &QTable<Position, GridAction>) -> String {
    let mut rows: Vec<String> = vec![];
    for row in 0..env.rows() as i32 {
        let mut line: String = String::new();
        for col in 0..env.cols() as i32 {
            let here = Position::new(row, col);
            let label: String = match env.value(&here) {
                None => GridWorld::HOLE.to_string(),
                value => cell_label(q_table.get(&here), value, false),
            };
            line.push_str(&format!("{:^width$}", label, width = CELL_WIDTH));
        }
        rows.push(line.trim_end().to_string());
    }
    rows.join("\n")
}

/// Prints the grid after every step, like watching the agent play.
pub struct TerminalObserver<W: Write> {
    out: W,
    episodes: u128,
    total_reward: f64,
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            episodes: 0,
            total_reward: 0.0,
        }
    }

    pub fn mean_reward(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_reward / self.episodes as f64
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!(error = %e, "could not render frame");
        }
    }
}

impl<W: Write> Observer<GridWorld> for TerminalObserver<W> {
    fn episode_start(&mut self, frame: &Frame<'_, GridWorld>) {
        let text: String = format!(
            "{}\nstarting episode {}\nmean reward: {}",
            render_grid(frame.env, Some(frame.state)),
            frame.episode,
            self.mean_reward()
        );
        self.emit(text);
    }

    fn step(&mut self, frame: &Frame<'_, GridWorld>, action: GridAction) {
        let text: String = format!(
            "{}\naction: {}, steps: {}, reward: {}\nexplore: {:.2}, discount: {}",
            render_grid(frame.env, Some(frame.state)),
            action,
            frame.step,
            frame.episode_reward,
            frame.explore,
            frame.discount
        );
        self.emit(text);
    }

    fn episode_end(&mut self, frame: &Frame<'_, GridWorld>) {
        self.episodes += 1;
        self.total_reward += frame.episode_reward;
        let text: String = format!(
            "episode reward: {}, mean reward: {}",
            frame.episode_reward,
            self.mean_reward()
        );
        self.emit(text);
    }
}
