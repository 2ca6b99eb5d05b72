//! The two-agent territorial contest.
//!
//! [`Simulation`] owns the grid, both agents and the random source. Front ends
//! either step it tick by tick with [`Simulation::step_once`] or hand it a
//! genome and run a whole episode with [`Simulation::run_episode`].

use crate::config::Config;
use crate::error::Result;
use crate::genome::Genome;
use crate::grid::{Agent, AgentId, Grid, Score};
use crate::stepper::apply_action;
use crate::strategy::{Controller, Strategy};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

/// Everything a renderer needs after a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: usize,
    pub grid: Grid,
    pub agents: [Agent; 2],
    pub score: Score,
}

pub struct Simulation {
    grid: Grid,
    agents: [Agent; 2],
    controllers: [Controller; 2],
    max_steps: usize,
    tick: usize,
    rng: SmallRng,
}

impl Simulation {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config.width, config.height, config.max_steps(), rng)
    }

    pub(crate) fn with_rng(width: usize, height: usize, max_steps: usize, rng: SmallRng) -> Result<Self> {
        let mut grid = Grid::new(width, height)?;
        let agents = grid.reset();
        Ok(Self {
            grid,
            agents,
            controllers: [Controller::Heuristic, Controller::Random],
            max_steps,
            tick: 0,
            rng,
        })
    }

    pub fn reset(&mut self) {
        self.agents = self.grid.reset();
        self.tick = 0;
    }

    pub fn set_controller(&mut self, id: AgentId, controller: Controller) {
        self.controllers[id.slot()] = controller;
    }

    pub fn controller(&self, id: AgentId) -> &Controller {
        &self.controllers[id.slot()]
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.slot()]
    }

    pub fn score(&self) -> Score {
        self.grid.score()
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Default episode budget for this arena.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Whether a manually stepped run has used up its budget.
    pub fn finished(&self) -> bool {
        self.tick >= self.max_steps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            grid: self.grid.clone(),
            agents: self.agents,
            score: self.grid.score(),
        }
    }

    /// One tick with the configured controllers: A moves, then B.
    pub fn step_once(&mut self) -> Result<Snapshot> {
        let a = self.controllers[0].strategy();
        let b = self.controllers[1].strategy();
        advance(&mut self.grid, &mut self.agents, [a, b], &mut self.rng)?;
        self.tick += 1;
        Ok(self.snapshot())
    }

    /// Full episode from a fresh reset: the heuristic drives A, `genome` drives B.
    ///
    /// There is no early exit; every episode runs all `max_steps` ticks.
    pub fn run_episode(&mut self, genome: &Genome, max_steps: usize) -> Result<Score> {
        self.reset();
        let strategies = [Strategy::Heuristic, Strategy::Genome(genome)];
        for _ in 0..max_steps {
            advance(&mut self.grid, &mut self.agents, strategies, &mut self.rng)?;
        }
        self.tick = max_steps;
        Ok(self.grid.score())
    }
}

fn advance(grid: &mut Grid, agents: &mut [Agent; 2], strategies: [Strategy<'_>; 2], rng: &mut SmallRng) -> Result<()> {
    for (agent, strategy) in agents.iter_mut().zip(strategies) {
        let action = strategy.decide(agent, grid, rng)?;
        apply_action(agent, action, grid, rng)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Pos;
    use crate::strategy::Action;

    fn seeded(w: usize, h: usize, seed: u64) -> Simulation {
        let config = Config {
            seed: Some(seed),
            ..Config::with_size(w, h)
        };
        Simulation::new(&config).unwrap()
    }

    #[test]
    fn episode_scores_are_bounded() {
        let mut sim = seeded(6, 5, 17);
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..10 {
            let genome = Genome::random(&mut rng);
            let score = sim.run_episode(&genome, sim.max_steps()).unwrap();
            assert!(score.total() as usize <= 30);
            assert!(score.a >= 1 && score.b >= 1);
        }
    }

    #[test]
    fn same_seed_same_episode() {
        let genome = Genome::random(&mut SmallRng::seed_from_u64(4));
        let s1 = seeded(8, 8, 123).run_episode(&genome, 128).unwrap();
        let s2 = seeded(8, 8, 123).run_episode(&genome, 128).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn step_once_advances_and_reports() {
        let mut sim = seeded(5, 5, 1);
        sim.set_controller(AgentId::A, Controller::Heuristic);
        sim.set_controller(AgentId::B, Controller::Genome(Genome::uniform(Action::TurnLeft)));
        let snap = sim.step_once().unwrap();
        assert_eq!(snap.tick, 1);
        // Heuristic A has a fresh cell straight ahead.
        assert_eq!(snap.agents[0].pos, Pos::new(0, 1));
        // B only spins on its corner.
        assert_eq!(snap.agents[1].pos, Pos::new(4, 4));
        assert_eq!(snap.score.a, 2);
        assert_eq!(snap.score.b, 1);
        assert_eq!(sim.agent(AgentId::B).heading, crate::grid::Heading::West);

        sim.reset();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.score().total(), 2);
    }

    #[test]
    fn reset_between_episodes() {
        let mut sim = seeded(4, 4, 8);
        let genome = Genome::uniform(Action::Forward);
        sim.run_episode(&genome, 32).unwrap();
        sim.reset();
        assert_eq!(*sim.agent(AgentId::A), sim.grid().start_of(AgentId::A));
        assert_eq!(sim.score().total(), 2);
    }
}
