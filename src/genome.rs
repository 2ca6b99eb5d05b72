//! Behavioural genomes: one action per condition key.
//!
//! The canonical text form is a string of `GENOME_LEN` digits `0`-`2`
//! (forward, turn left, turn right). Serde goes through that form so stored
//! genomes stay human readable and are validated on the way in.

use crate::error::{Result, SimError};
use crate::sensor::CONDITION_COUNT;
use crate::strategy::Action;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const GENOME_LEN: usize = CONDITION_COUNT;
pub const CROSSOVER_POINT: usize = GENOME_LEN / 2;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Genome {
    genes: Vec<Action>,
}

impl Genome {
    /// Uniformly random genome in which a right turn never directly follows a left turn.
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut genes = Vec::with_capacity(GENOME_LEN);
        for i in 0..GENOME_LEN {
            let mut action = Action::random(rng);
            if i > 0 && genes[i - 1] == Action::TurnLeft {
                while action == Action::TurnRight {
                    action = Action::random(rng);
                }
            }
            genes.push(action);
        }
        Self { genes }
    }

    pub fn uniform(action: Action) -> Self {
        Self {
            genes: vec![action; GENOME_LEN],
        }
    }

    pub fn from_actions(genes: Vec<Action>) -> Result<Self> {
        if genes.len() != GENOME_LEN {
            return Err(SimError::GenomeLength {
                expected: GENOME_LEN,
                got: genes.len(),
            });
        }
        Ok(Self { genes })
    }

    pub fn action_at(&self, index: usize) -> Result<Action> {
        self.genes.get(index).copied().ok_or(SimError::GenomeLength {
            expected: index + 1,
            got: self.genes.len(),
        })
    }

    pub fn actions(&self) -> &[Action] {
        &self.genes
    }

    /// Single-point crossover at [`CROSSOVER_POINT`]. Parents are left untouched.
    pub fn crossover(first: &Genome, second: &Genome) -> (Genome, Genome) {
        let (f_head, f_tail) = first.genes.split_at(CROSSOVER_POINT);
        let (s_head, s_tail) = second.genes.split_at(CROSSOVER_POINT);
        let child1 = Genome {
            genes: [f_head, s_tail].concat(),
        };
        let child2 = Genome {
            genes: [s_head, f_tail].concat(),
        };
        (child1, child2)
    }
}

impl FromStr for Genome {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let len = s.chars().count();
        if len != GENOME_LEN {
            return Err(SimError::GenomeLength {
                expected: GENOME_LEN,
                got: len,
            });
        }
        let genes = s
            .chars()
            .enumerate()
            .map(|(index, symbol)| match symbol {
                '0' => Ok(Action::Forward),
                '1' => Ok(Action::TurnLeft),
                '2' => Ok(Action::TurnRight),
                _ => Err(SimError::InvalidGenomeSymbol { index, symbol }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { genes })
    }
}

impl TryFrom<String> for Genome {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Genome> for String {
    fn from(genome: Genome) -> String {
        genome.to_string()
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.genes {
            write!(f, "{}", a.code())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_string();
        write!(f, "Genome({}..)", &text[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn random_genomes_never_turn_right_after_left() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let g = Genome::random(&mut rng);
            assert_eq!(g.actions().len(), GENOME_LEN);
            for pair in g.actions().windows(2) {
                assert!(!(pair[0] == Action::TurnLeft && pair[1] == Action::TurnRight));
            }
        }
    }

    #[test]
    fn crossover_halves_rebuild_both_parents() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p1 = Genome::random(&mut rng);
        let p2 = Genome::random(&mut rng);
        let (c1, c2) = Genome::crossover(&p1, &p2);

        let rebuilt1 = [&c1.actions()[..CROSSOVER_POINT], &c2.actions()[CROSSOVER_POINT..]].concat();
        let rebuilt2 = [&c2.actions()[..CROSSOVER_POINT], &c1.actions()[CROSSOVER_POINT..]].concat();
        assert_eq!(rebuilt1, p1.actions());
        assert_eq!(rebuilt2, p2.actions());
        assert_eq!(&c1.actions()[CROSSOVER_POINT..], &p2.actions()[CROSSOVER_POINT..]);
    }

    #[test]
    fn crossover_of_uniform_parents_splits_at_midpoint() {
        let fwd = Genome::uniform(Action::Forward);
        let left = Genome::uniform(Action::TurnLeft);
        let (c1, c2) = Genome::crossover(&fwd, &left);
        assert_eq!(c1.actions()[CROSSOVER_POINT - 1], Action::Forward);
        assert_eq!(c1.actions()[CROSSOVER_POINT], Action::TurnLeft);
        assert_eq!(c2.actions()[CROSSOVER_POINT - 1], Action::TurnLeft);
        assert_eq!(c2.actions()[CROSSOVER_POINT], Action::Forward);
    }

    #[test]
    fn text_form_round_trips() {
        let mut rng = SmallRng::seed_from_u64(9);
        let g = Genome::random(&mut rng);
        let text = g.to_string();
        assert_eq!(text.len(), GENOME_LEN);
        assert_eq!(text.parse::<Genome>().unwrap(), g);
    }

    #[test]
    fn malformed_text_is_rejected() {
        let mut text = "0".repeat(GENOME_LEN);
        text.replace_range(5..6, "3");
        assert_eq!(
            text.parse::<Genome>(),
            Err(SimError::InvalidGenomeSymbol { index: 5, symbol: '3' })
        );
        assert!(matches!(
            "012".parse::<Genome>(),
            Err(SimError::GenomeLength { got: 3, .. })
        ));
        assert!(Genome::from_actions(vec![Action::Forward; 10]).is_err());
    }
}
