use rand::Rng;
use serde::{Deserialize, Serialize};

pub const RULE_30: u8 = 30;
pub const DEFAULT_WIDTH: usize = 200;
pub const DEFAULT_GENERATIONS: usize = 200;

/// Wolfram elementary automaton on a ring, keeping every generation it has produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elementary {
    rule: u8,
    history: Vec<Vec<bool>>,
}

impl Elementary {
    pub fn new(rule: u8, initial: Vec<bool>) -> Self {
        Self {
            rule,
            history: vec![initial],
        }
    }

    pub fn random(rule: u8, width: usize, rng: &mut impl Rng) -> Self {
        let row = (0..width).map(|_| rng.gen_bool(0.5)).collect();
        Self::new(rule, row)
    }

    /// Single live cell in the middle.
    pub fn centered(rule: u8, width: usize) -> Self {
        let mut row = vec![false; width];
        if width > 0 {
            row[width / 2] = true;
        }
        Self::new(rule, row)
    }

    pub fn rule(&self) -> u8 {
        self.rule
    }

    /// Rule as an 8-character bit string, most significant neighbourhood first.
    pub fn rule_string(&self) -> String {
        format!("{:08b}", self.rule)
    }

    pub fn current(&self) -> &[bool] {
        self.history.last().map_or(&[][..], Vec::as_slice)
    }

    pub fn history(&self) -> &[Vec<bool>] {
        &self.history
    }

    /// Next value of the cell whose neighbourhood is (left, centre, right).
    pub fn apply(&self, left: bool, centre: bool, right: bool) -> bool {
        let index = (left as u8) << 2 | (centre as u8) << 1 | right as u8;
        (self.rule >> index) & 1 == 1
    }

    pub fn step(&mut self) {
        let row = self.current();
        let width = row.len();
        let next: Vec<bool> = (0..width)
            .map(|i| {
                let left = row[(i + width - 1) % width];
                let right = row[(i + 1) % width];
                self.apply(left, row[i], right)
            })
            .collect();
        self.history.push(next);
    }

    /// Advances `generations` times and returns the whole history.
    pub fn run(&mut self, generations: usize) -> &[Vec<bool>] {
        for _ in 0..generations {
            self.step();
        }
        &self.history
    }
}
