//! Evolutionary trainer for agent B's genome.
//!
//! Each generation scores every genome by averaging several episodes against
//! the forward-first heuristic, keeps a fixed number of the best as survivors,
//! and breeds one pair of children from each consecutive pair of survivors.

use crate::config::Config;
use crate::error::Result;
use crate::genome::Genome;
use crate::sim::Simulation;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// A genome with its last measured fitness. Fresh children carry 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scored {
    pub genome: Genome,
    pub fitness: u32,
}

impl Scored {
    pub fn unscored(genome: Genome) -> Self {
        Self { genome, fitness: 0 }
    }
}

/// Cooperative stop flag shared between a driver and a running trainer.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Published after every completed generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Progress {
    /// Zero-based index of the generation just evaluated.
    pub generation: usize,
    pub evaluated: usize,
    pub best_fitness: u32,
    pub mean_fitness: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub generations_completed: usize,
    pub cancelled: bool,
    /// Best genomes of the last fully evaluated generation, fittest first.
    pub ranked: Vec<Scored>,
    pub best_per_generation: Vec<u32>,
}

pub struct Trainer {
    config: Config,
    population: Vec<Scored>,
    ranked: Vec<Scored>,
    best_per_generation: Vec<u32>,
    generation: usize,
    rng: SmallRng,
}

impl Trainer {
    /// Seeds a random generation 0 of `training.population_size` genomes.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let population = (0..config.training.population_size)
            .map(|_| Scored::unscored(Genome::random(&mut rng)))
            .collect();
        Ok(Self::from_parts(config, population, rng))
    }

    /// Starts from caller-supplied genomes instead of a random population.
    pub fn with_population(config: Config, genomes: Vec<Genome>) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let population = genomes.into_iter().map(Scored::unscored).collect();
        Ok(Self::from_parts(config, population, rng))
    }

    fn from_parts(config: Config, population: Vec<Scored>, rng: SmallRng) -> Self {
        Self {
            config,
            population,
            ranked: Vec::new(),
            best_per_generation: Vec::new(),
            generation: 0,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn population(&self) -> &[Scored] {
        &self.population
    }

    /// Number of generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn ranked(&self) -> &[Scored] {
        &self.ranked
    }

    /// Evaluate, select, breed and replace once.
    ///
    /// Returns `Ok(None)` when cancelled mid-evaluation; the population is
    /// then exactly what it was before the call.
    pub fn step_generation(&mut self, cancel: &CancelToken) -> Result<Option<Progress>> {
        let Some(fitness) = self.evaluate_population(cancel)? else {
            return Ok(None);
        };

        let mut population = std::mem::take(&mut self.population);
        for (scored, fitness) in population.iter_mut().zip(&fitness) {
            scored.fitness = *fitness;
        }
        let evaluated = population.len();
        let total: u64 = fitness.iter().map(|&f| f as u64).sum();
        let mean_fitness = if evaluated == 0 { 0.0 } else { total as f64 / evaluated as f64 };

        let survivors = select(population, self.config.training.survivors);
        let best_fitness = survivors.first().map_or(0, |s| s.fitness);
        let children = breed(&survivors);

        self.ranked = survivors
            .iter()
            .take(self.config.training.report_top)
            .cloned()
            .collect();
        self.best_per_generation.push(best_fitness);

        let mut next = survivors;
        next.extend(children);
        self.population = next;

        let progress = Progress {
            generation: self.generation,
            evaluated,
            best_fitness,
            mean_fitness,
        };
        self.generation += 1;
        debug!(
            generation = progress.generation,
            evaluated,
            best_fitness,
            mean_fitness,
            next_population = self.population.len(),
            "generation complete"
        );
        Ok(Some(progress))
    }

    /// Runs generations until the configured limit or until `cancel` fires.
    pub fn train(&mut self, cancel: &CancelToken, mut on_progress: impl FnMut(&Progress)) -> Result<TrainingReport> {
        let limit = self.config.training.generations;
        info!(
            population = self.population.len(),
            generations = limit,
            trials = self.config.training.trials,
            "training started"
        );
        let mut cancelled = false;
        while self.generation < limit {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.step_generation(cancel)? {
                Some(progress) => on_progress(&progress),
                None => {
                    cancelled = true;
                    break;
                }
            }
        }

        if cancelled {
            warn!(completed = self.generation, "training cancelled");
        } else {
            info!(
                completed = self.generation,
                best = self.ranked.first().map_or(0, |s| s.fitness),
                "training finished"
            );
        }
        Ok(self.report(cancelled))
    }

    pub fn report(&self, cancelled: bool) -> TrainingReport {
        TrainingReport {
            generations_completed: self.generation,
            cancelled,
            ranked: self.ranked.clone(),
            best_per_generation: self.best_per_generation.clone(),
        }
    }

    fn evaluate_population(&mut self, cancel: &CancelToken) -> Result<Option<Vec<u32>>> {
        let seeds: Vec<u64> = self.population.iter().map(|_| self.rng.next_u64()).collect();
        let setup = EpisodeSetup::from_config(&self.config);

        if self.config.training.parallel {
            let results = self
                .population
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(scored, &seed)| {
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    setup.fitness(&scored.genome, seed).map(Some)
                })
                .collect::<Result<Vec<Option<u32>>>>()?;
            return Ok(results.into_iter().collect());
        }

        let mut fitness = Vec::with_capacity(self.population.len());
        for (scored, seed) in self.population.iter().zip(seeds) {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            fitness.push(setup.fitness(&scored.genome, seed)?);
        }
        Ok(Some(fitness))
    }
}

/// Arena parameters shared by every evaluation in a generation.
#[derive(Clone, Copy, Debug)]
struct EpisodeSetup {
    width: usize,
    height: usize,
    max_steps: usize,
    trials: usize,
}

impl EpisodeSetup {
    fn from_config(config: &Config) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_steps: config.max_steps(),
            trials: config.training.trials,
        }
    }

    /// Integer-truncated mean of B's score over `trials` fresh episodes.
    fn fitness(&self, genome: &Genome, seed: u64) -> Result<u32> {
        let mut sim = Simulation::with_rng(
            self.width,
            self.height,
            self.max_steps,
            SmallRng::seed_from_u64(seed),
        )?;
        let mut sum = 0u64;
        for _ in 0..self.trials {
            sum += u64::from(sim.run_episode(genome, self.max_steps)?.b);
        }
        // the mean never exceeds one episode's score, which is a u32
        Ok((sum / self.trials as u64) as u32)
    }
}

/// Scores one genome outside a trainer, e.g. to re-check a stored champion.
pub fn evaluate(config: &Config, genome: &Genome, seed: u64) -> Result<u32> {
    config.validate()?;
    EpisodeSetup::from_config(config).fitness(genome, seed)
}

/// Truncation selection: the `keep` fittest, fittest first, ties in original order.
pub fn select(mut population: Vec<Scored>, keep: usize) -> Vec<Scored> {
    population.sort_by_key(|s| Reverse(s.fitness));
    population.truncate(keep);
    population
}

/// Two children per consecutive survivor pair; an odd last survivor sits out.
pub fn breed(survivors: &[Scored]) -> Vec<Scored> {
    survivors
        .chunks_exact(2)
        .flat_map(|pair| {
            let (c1, c2) = Genome::crossover(&pair[0].genome, &pair[1].genome);
            [Scored::unscored(c1), Scored::unscored(c2)]
        })
        .collect()
}
