use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use q_gridworld::render::{plot_moving_average, render_policy, save_policy_image, TerminalObserver};
use q_gridworld::trainer::TrainResults;
use q_gridworld::utils::moving_average;
use q_gridworld::{GridWorld, Result, TrainingConfig, TrainingSession};

extern crate structopt;

use structopt::StructOpt;

/// Train a tabular Q-learning agent on a gridworld and show how it plays
#[derive(StructOpt, Debug)]
#[structopt(name = "q_gridworld")]
struct Cli {
    /// Map file, one row per line, cells separated by spaces, `#` for holes
    #[structopt(long = "map", parse(from_os_str))]
    map: Option<PathBuf>,

    /// Number of episodes for the training
    #[structopt(long = "n_episodes", short = "n", default_value = "500")]
    n_episodes: u128,

    /// Number of greedy episodes played after training
    #[structopt(long = "eval_episodes", default_value = "5")]
    eval_episodes: u128,

    /// Discount factor to be used on the temporal difference calculation
    #[structopt(long = "discount_factor", default_value = "0.9")]
    discount_factor: f64,

    /// Learning rate of the agent
    #[structopt(long = "learning_rate", default_value = "1.0")]
    learning_rate: f64,

    /// Initial value for the exploration ratio
    #[structopt(long = "explore", default_value = "0.5")]
    explore: f64,

    /// Final value for the exploration ratio, enables linear decay
    #[structopt(long = "final_explore")]
    final_explore: Option<f64>,

    /// Share of the training episodes over which exploration decays
    #[structopt(long = "exploration_time", default_value = "1.0")]
    exploration_time: f64,

    /// Maximum number of steps per episode
    #[structopt(long = "max_steps")]
    max_steps: Option<u128>,

    /// Seed for exploration and starting positions
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,

    /// Choose the actions by hand, typing them on stdin
    #[structopt(long = "interactive", short = "i")]
    interactive: bool,

    /// Skip the training phase
    #[structopt(long = "no_train")]
    no_train: bool,

    /// Print every step of the evaluation episodes
    #[structopt(long = "show_example", short = "s")]
    show_example: bool,

    /// Save an image of the learned policy
    #[structopt(long = "policy_image", parse(from_os_str))]
    policy_image: Option<PathBuf>,

    /// Save a plot of the training rewards
    #[structopt(long = "plot", parse(from_os_str))]
    plot: Option<PathBuf>,

    /// Moving average window to be used on the reward plot
    #[structopt(long = "moving_average_window", default_value = "10")]
    moving_average_window: usize,
}

fn load_map(cli: &Cli) -> Result<GridWorld> {
    match &cli.map {
        Some(path) => fs::read_to_string(path)?.parse(),
        None => Ok(GridWorld::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let env: GridWorld = load_map(&cli)?;
    info!(rows = env.rows(), cols = env.cols(), "loaded map");

    let config = TrainingConfig {
        discount_factor: cli.discount_factor,
        learning_rate: cli.learning_rate,
        explore: cli.explore,
        final_explore: cli.final_explore,
        exploration_time: cli.exploration_time,
        train_episodes: cli.n_episodes,
        eval_episodes: cli.eval_episodes,
        max_steps: cli.max_steps,
        seed: cli.seed,
        progress: true,
    };
    let mut session = TrainingSession::new(&env, env.clone(), config)?;

    if cli.interactive {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut observer = TerminalObserver::new(io::stdout());
        let steps: u128 = session.interact(stdin.lock(), &mut stdout, &mut observer)?;
        info!(steps, "interactive session over");
        return Ok(());
    }

    if !cli.no_train {
        let now: Instant = Instant::now();
        let (reward_history, _episode_length, _training_error): TrainResults =
            session.train(&mut ())?;
        info!(elapsed = ?now.elapsed(), "training done");

        if let Some(path) = &cli.plot {
            let ma_reward: Vec<f64> = moving_average(cli.moving_average_window, &reward_history);
            plot_moving_average(&[ma_reward], &["ε-Greedy Q-learning"], "Training reward", path)?;
            info!(path = %path.display(), "saved reward plot");
        }
    }

    let evaluation = if cli.show_example {
        session.evaluate(&mut TerminalObserver::new(io::stdout()))?
    } else {
        session.evaluate(&mut ())?
    };
    println!("mean reward: {}", evaluation.mean_reward);
    println!("{}", render_policy(&env, session.learner().q_table()));

    if let Some(path) = &cli.policy_image {
        save_policy_image(&env, session.learner().q_table(), path, 100)?;
        info!(path = %path.display(), "saved policy image");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli: Cli = Cli::from_args();
    if let Err(e) = run(cli) {
        error!(error = %e, "q_gridworld failed");
        std::process::exit(1);
    }
}
