//! Trainer-side evaluation
//!
//! Whatever search process produces agents, it consumes the engine the same
//! way: one fresh episode per agent, run to termination, fitness read back.
//! Every episode owns its own ball, paddles and RNG.

use std::fmt;

use crate::agent::Agent;
use crate::error::ConfigError;
use crate::renderer::NullRenderer;
use crate::settings::Settings;
use crate::sim::{Episode, EpisodeResult, RngState, TerminationReason};

/// Run one headless episode for `agent`
pub fn evaluate_agent<A: Agent + ?Sized>(
    agent: &A,
    settings: &Settings,
    seed: u64,
) -> Result<EpisodeResult, ConfigError> {
    let mut episode = Episode::new(settings, seed)?;
    let result = episode.run(agent, &mut NullRenderer);
    log::debug!(
        "{} (seed {}): fitness {:.3}, {}",
        agent.name(),
        seed,
        result.fitness,
        result.reason.as_str()
    );
    Ok(result)
}

/// Evaluate each agent in order; agent `i` plays with seed `base_seed + i`
pub fn evaluate_population<A: Agent>(
    agents: &[A],
    settings: &Settings,
    base_seed: u64,
) -> Result<Vec<EpisodeResult>, ConfigError> {
    settings.validate()?;
    let base = RngState::new(base_seed);
    agents
        .iter()
        .enumerate()
        .map(|(i, agent)| evaluate_agent(agent, settings, base.offset(i as u64).seed))
        .collect()
}

/// Summary over a batch of episode results
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationStats {
    pub num_episodes: usize,
    pub mean_fitness: f64,
    pub std_fitness: f64,
    pub best_fitness: f64,
    /// Index of the best result (first one on ties)
    pub best_index: Option<usize>,
    /// Episodes that reached the fitness cap
    pub num_capped: usize,
    pub mean_frames: f64,
}

impl EvaluationStats {
    pub fn from_results(results: &[EpisodeResult]) -> Self {
        let n = results.len();
        if n == 0 {
            return Self {
                num_episodes: 0,
                mean_fitness: 0.0,
                std_fitness: 0.0,
                best_fitness: 0.0,
                best_index: None,
                num_capped: 0,
                mean_frames: 0.0,
            };
        }

        let mean_fitness = results.iter().map(|r| r.fitness).sum::<f64>() / n as f64;
        let variance = results
            .iter()
            .map(|r| (r.fitness - mean_fitness).powi(2))
            .sum::<f64>()
            / n as f64;
        let mean_frames = results.iter().map(|r| r.frames as f64).sum::<f64>() / n as f64;

        let mut best_index = 0;
        for (i, r) in results.iter().enumerate() {
            if r.fitness > results[best_index].fitness {
                best_index = i;
            }
        }

        Self {
            num_episodes: n,
            mean_fitness,
            std_fitness: variance.sqrt(),
            best_fitness: results[best_index].fitness,
            best_index: Some(best_index),
            num_capped: results
                .iter()
                .filter(|r| r.reason == TerminationReason::FitnessCapReached)
                .count(),
            mean_frames,
        }
    }
}

impl fmt::Display for EvaluationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluation ({} episodes):", self.num_episodes)?;
        writeln!(
            f,
            "  Fitness: {:.3} ± {:.3} (best {:.3})",
            self.mean_fitness, self.std_fitness, self.best_fitness
        )?;
        writeln!(f, "  Mean frames: {:.1}", self.mean_frames)?;
        let pct = if self.num_episodes == 0 {
            0.0
        } else {
            100.0 * self.num_capped as f64 / self.num_episodes as f64
        };
        write!(
            f,
            "  Reached cap: {}/{} ({:.1}%)",
            self.num_capped, self.num_episodes, pct
        )
    }
}
