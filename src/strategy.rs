//! Action selection. Every controller, whether scripted, evolved or random,
//! answers the same question: given this agent on this grid, what next?

use crate::error::{Result, SimError};
use crate::genome::Genome;
use crate::grid::{Agent, Grid};
use crate::sensor::{self, ConditionTable};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Forward = 0,
    TurnLeft = 1,
    TurnRight = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Forward, Action::TurnLeft, Action::TurnRight];

    pub fn random(rng: &mut impl Rng) -> Action {
        Action::ALL[rng.gen_range(0..Action::ALL.len())]
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Action {
    type Error = SimError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Action::Forward),
            1 => Ok(Action::TurnLeft),
            2 => Ok(Action::TurnRight),
            other => Err(SimError::InvalidAction(other)),
        }
    }
}

/// A borrowed view of a controller, ready to decide.
#[derive(Clone, Copy, Debug)]
pub enum Strategy<'g> {
    /// Forward-first: keep going while the next cell is fresh, otherwise flail.
    Heuristic,
    Genome(&'g Genome),
    Random,
}

impl Strategy<'_> {
    pub fn decide(&self, agent: &Agent, grid: &Grid, rng: &mut impl Rng) -> Result<Action> {
        match self {
            Strategy::Heuristic => Ok(forward_first(agent, grid, rng)),
            Strategy::Genome(genome) => {
                let key = sensor::encode(agent, grid);
                let index = ConditionTable::get().lookup(&key);
                genome.action_at(index)
            }
            Strategy::Random => Ok(Action::random(rng)),
        }
    }
}

fn forward_first(agent: &Agent, grid: &Grid, rng: &mut impl Rng) -> Action {
    let (dx, dy) = agent.heading.offset();
    let x = agent.pos.x as i64 + dx;
    let y = agent.pos.y as i64 + dy;
    match grid.owner_at(x, y) {
        Ok(tag) if tag != agent.id.tag() => Action::Forward,
        _ => Action::random(rng),
    }
}

/// Owned controller setting for one agent in manually stepped runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Controller {
    #[default]
    Heuristic,
    Genome(Genome),
    Random,
}

impl Controller {
    pub fn strategy(&self) -> Strategy<'_> {
        match self {
            Controller::Heuristic => Strategy::Heuristic,
            Controller::Genome(genome) => Strategy::Genome(genome),
            Controller::Random => Strategy::Random,
        }
    }
}
