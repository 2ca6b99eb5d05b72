//! Matrix survival: two agents paint a bounded grid, and a genetic algorithm
//! evolves the lookup-table brain of agent B against a fixed heuristic A.
//!
//! The crate also carries the two classic cellular automata under [`automata`].

pub mod automata;
pub mod config;
pub mod error;
pub mod genome;
pub mod grid;
pub mod persist;
pub mod sensor;
pub mod sim;
pub mod stepper;
pub mod strategy;
pub mod trainer;

pub use config::{Config, TrainingConfig};
pub use error::{Result, SimError};
pub use genome::{CROSSOVER_POINT, GENOME_LEN, Genome};
pub use grid::{Agent, AgentId, Grid, Heading, Pos, Score, Tag};
pub use sim::{Simulation, Snapshot};
pub use strategy::{Action, Controller, Strategy};
pub use trainer::{CancelToken, Progress, Scored, Trainer, TrainingReport};
