use crate::error::Result;
use crate::grid::{Agent, Grid, Heading};
use crate::strategy::Action;
use rand::Rng;

/// Applies one action to `agent`, then claims the cell it stands on.
///
/// A forward move into the boundary leaves the agent in place with a fresh
/// random heading.
pub fn apply_action(agent: &mut Agent, action: Action, grid: &mut Grid, rng: &mut impl Rng) -> Result<()> {
    match action {
        Action::Forward => {
            let (dx, dy) = agent.heading.offset();
            let x = agent.pos.x as i64 + dx;
            let y = agent.pos.y as i64 + dy;
            if grid.contains(x, y) {
                agent.pos.x = x as usize;
                agent.pos.y = y as usize;
            } else {
                agent.heading = Heading::random(rng);
            }
        }
        Action::TurnLeft => agent.heading = agent.heading.left(),
        Action::TurnRight => agent.heading = agent.heading.right(),
    }
    grid.claim(agent.pos.x as i64, agent.pos.y as i64, agent.id)
}
