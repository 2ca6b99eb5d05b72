use anyhow::{Context, Result, bail};
use matrix_survival::automata::{Elementary, Life, elementary};
use matrix_survival::persist::{self, GenomeArchive};
use matrix_survival::{AgentId, CancelToken, Config, Controller, Progress, Simulation, Trainer};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_VAR: &str = "MATRIX_SURVIVAL_CONFIG";
const MODE_VAR: &str = "MATRIX_SURVIVAL_MODE";
const ARCHIVE_VAR: &str = "MATRIX_SURVIVAL_ARCHIVE";
const BUDGET_VAR: &str = "MATRIX_SURVIVAL_BUDGET_SECS";

enum Msg {
    Progress(Progress),
    Done(matrix_survival::Result<matrix_survival::TrainingReport>),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var_os(CONFIG_VAR) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mode = std::env::var(MODE_VAR).unwrap_or_else(|_| "train".to_string());
    let archive_path = std::env::var_os(ARCHIVE_VAR);

    match mode.as_str() {
        "train" => {
            let budget = match std::env::var(BUDGET_VAR) {
                Ok(secs) => Some(Duration::from_secs(secs.parse().with_context(|| format!("{BUDGET_VAR}={secs}"))?)),
                Err(_) => None,
            };
            let archive = train(config.clone(), budget)?;
            if let Some(path) = &archive_path {
                persist::save(path, &archive)?;
                info!(path = %path.to_string_lossy(), "saved ranked genomes");
            }
            if let Some(best) = archive.best() {
                replay(&config, Controller::Genome(best.genome.clone()))?;
            }
        }
        "replay" => {
            let Some(path) = &archive_path else {
                bail!("replay mode needs {ARCHIVE_VAR} pointing at a saved archive");
            };
            let archive = persist::load(path)?;
            let best = archive.best().context("archive holds no genomes")?;
            info!(fitness = best.fitness, generations = archive.generations, "replaying stored champion");
            replay(&config, Controller::Genome(best.genome.clone()))?;
        }
        "automata" => automata(config.seed),
        other => bail!("unknown {MODE_VAR} {other:?}; expected train, replay or automata"),
    }
    Ok(())
}

/// Trains on a worker thread, relaying progress and enforcing the optional time budget.
fn train(config: Config, budget: Option<Duration>) -> Result<GenomeArchive> {
    let (width, height) = (config.width, config.height);
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();

    let worker = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            let result = Trainer::new(config).and_then(|mut trainer| {
                let progress_tx = tx.clone();
                trainer.train(&cancel, |p| {
                    let _ = progress_tx.send(Msg::Progress(p.clone()));
                })
            });
            let _ = tx.send(Msg::Done(result));
        })
    };

    let started = Instant::now();
    let report = loop {
        let msg = match budget {
            Some(limit) => match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(msg) => msg,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if started.elapsed() >= limit && !cancel.is_cancelled() {
                        warn!(?limit, "time budget spent, stopping after this generation");
                        cancel.cancel();
                    }
                    continue;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => bail!("trainer thread exited without a report"),
            },
            None => rx.recv().context("trainer thread exited without a report")?,
        };
        match msg {
            Msg::Progress(p) => info!(
                generation = p.generation,
                best = p.best_fitness,
                mean = p.mean_fitness,
                "generation done"
            ),
            Msg::Done(result) => break result?,
        }
    };
    if worker.join().is_err() {
        bail!("trainer thread panicked");
    }

    for (rank, s) in report.ranked.iter().enumerate() {
        info!(rank = rank + 1, fitness = s.fitness, genome = %s.genome, "ranked genome");
    }
    Ok(GenomeArchive::from_report(width, height, &report))
}

/// Steps one visible episode with the given controller on B and the heuristic on A.
fn replay(config: &Config, controller: Controller) -> Result<()> {
    let mut sim = Simulation::new(config)?;
    sim.set_controller(AgentId::A, Controller::Heuristic);
    sim.set_controller(AgentId::B, controller);
    while !sim.finished() {
        sim.step_once()?;
    }
    let score = sim.score();
    info!(ticks = sim.tick(), score_a = score.a, score_b = score.b, "replay finished");
    Ok(())
}

/// Runs both cellular automata for their default spans and logs a summary line per run.
fn automata(seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let mut ca = Elementary::random(elementary::RULE_30, elementary::DEFAULT_WIDTH, &mut rng);
    let history = ca.run(elementary::DEFAULT_GENERATIONS);
    let alive = history.last().map_or(0, |row| row.iter().filter(|&&c| c).count());
    info!(rule = %ca.rule_string(), rows = ca.history().len(), alive, "elementary automaton done");

    let mut life = Life::default();
    for _ in 0..100 {
        life.step();
    }
    info!(generation = life.generation(), alive = life.alive(), "life done");
}
