//! NEAT Pong entry point
//!
//! Runs episodes headless (or streams frames as JSON lines) for the built-in
//! agents and for random network populations.

use std::io::{self, BufWriter, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use neat_pong::agent::{Agent, FeedForwardNet, HoldAgent, TrackerAgent};
use neat_pong::renderer::{JsonLinesRenderer, NullRenderer, Renderer, Snapshot};
use neat_pong::sim::{Episode, Match, RngState};
use neat_pong::trainer::{EvaluationStats, evaluate_population};
use neat_pong::{Leaderboard, Settings};

#[derive(Parser)]
#[command(name = "neat-pong", version, about = "Pong fitness engine for paddle-control agents")]
struct Cli {
    #[command(flatten)]
    world: WorldArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct WorldArgs {
    /// Fitness at which an episode counts as solved
    #[arg(long, global = true)]
    fitness_cap: Option<f64>,

    /// Frame budget per episode or match
    #[arg(long, global = true)]
    max_frames: Option<u64>,

    /// Paddle speed in pixels per frame
    #[arg(long, global = true)]
    paddle_speed: Option<f64>,
}

#[derive(Args)]
struct OutputArgs {
    /// Stream frames to stdout as JSON lines
    #[arg(long)]
    frames: bool,

    /// Only emit every n-th frame
    #[arg(long, default_value_t = 1)]
    stride: u64,

    /// Pace frames at the configured frame rate
    #[arg(long)]
    realtime: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Score a built-in agent over several seeds
    Evaluate {
        #[arg(long, value_enum, default_value_t = AgentKind::Tracker)]
        agent: AgentKind,
        #[arg(long, default_value_t = 10)]
        episodes: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Score a population of random feed-forward networks
    Population {
        #[arg(long, default_value_t = 50)]
        size: usize,
        /// Hidden layer sizes, e.g. `--hidden 4 --hidden 4`
        #[arg(long)]
        hidden: Vec<usize>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Leaderboard entries to print
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Play two built-in agents against each other
    Versus {
        #[arg(long, value_enum, default_value_t = AgentKind::Tracker)]
        left: AgentKind,
        #[arg(long, value_enum, default_value_t = AgentKind::Hold)]
        right: AgentKind,
        #[arg(long, default_value_t = 5)]
        target: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AgentKind {
    Hold,
    Tracker,
}

impl AgentKind {
    fn build(self, settings: &Settings) -> Box<dyn Agent> {
        match self {
            AgentKind::Hold => Box::new(HoldAgent),
            AgentKind::Tracker => Box::new(TrackerAgent::new(settings.paddle_height)),
        }
    }
}

/// Sleeps between frames so a viewer sees them at `frame_rate`
struct Paced<R> {
    inner: R,
    period: Duration,
    next: Instant,
}

impl<R: Renderer> Paced<R> {
    fn new(inner: R, frame_rate: u32) -> Self {
        Self {
            inner,
            period: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            next: Instant::now(),
        }
    }
}

impl<R: Renderer> Renderer for Paced<R> {
    fn draw(&mut self, snapshot: &Snapshot) {
        self.next += self.period;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }
        self.inner.draw(snapshot);
    }
}

fn make_renderer(output: &OutputArgs, settings: &Settings) -> Box<dyn Renderer> {
    if !output.frames {
        return Box::new(NullRenderer);
    }
    let json = JsonLinesRenderer::new(BufWriter::new(io::stdout())).with_stride(output.stride);
    if output.realtime {
        Box::new(Paced::new(json, settings.frame_rate))
    } else {
        Box::new(json)
    }
}

fn settings_from(world: &WorldArgs) -> Result<Settings> {
    let mut settings = Settings::default().with_max_frames(world.max_frames);
    if let Some(cap) = world.fitness_cap {
        settings = settings.with_fitness_cap(cap);
    }
    if let Some(speed) = world.paddle_speed {
        settings.paddle_speed = speed;
    }
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = settings_from(&cli.world)?;
    log::info!("NEAT Pong starting...");

    match cli.command {
        Command::Evaluate {
            agent,
            episodes,
            seed,
            output,
        } => {
            let agent = agent.build(&settings);
            let mut renderer = make_renderer(&output, &settings);
            let base = RngState::new(seed);
            let mut results = Vec::with_capacity(episodes);
            for i in 0..episodes {
                let mut episode = Episode::new(&settings, base.offset(i as u64).seed)?;
                results.push(episode.run(&agent, &mut renderer));
            }
            drop(renderer);
            let stats = EvaluationStats::from_results(&results);
            log::info!("{} agent evaluated", agent.name());
            eprintln!("{}", stats);
        }

        Command::Population {
            size,
            hidden,
            seed,
            top,
        } => {
            let mut rng = RngState::new(seed).to_rng();
            let nets = (0..size)
                .map(|_| FeedForwardNet::random(&hidden, &mut rng))
                .collect::<Result<Vec<_>, _>>()
                .context("invalid hidden layer sizes")?;

            let results = evaluate_population(&nets, &settings, seed)?;
            let stats = EvaluationStats::from_results(&results);
            log::info!("Population of {} evaluated", size);

            let mut board = Leaderboard::new(top);
            for (i, result) in results.iter().enumerate() {
                board.add(format!("net-{}", i), result);
            }

            let mut out = io::stdout().lock();
            writeln!(out, "{}", stats)?;
            for (rank, entry) in board.entries.iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {:<8} fitness {:>8.3}  frames {:>7}  seed {}",
                    rank + 1,
                    entry.label,
                    entry.fitness,
                    entry.frames,
                    entry.seed
                )?;
            }
        }

        Command::Versus {
            left,
            right,
            target,
            seed,
            output,
        } => {
            let left = left.build(&settings);
            let right = right.build(&settings);
            let mut renderer = make_renderer(&output, &settings);
            let mut game = Match::new(&settings, seed, target)?;
            let result = game.run(&left, &right, &mut renderer);
            drop(renderer);
            eprintln!(
                "{} {} - {} {} ({} frames)",
                left.name(),
                result.score.left,
                result.score.right,
                right.name(),
                result.frames
            );
        }
    }

    Ok(())
}
