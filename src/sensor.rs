//! Local sensing: an agent's four axis neighbours plus its own heading,
//! packed into a base-4 condition key that indexes a genome.

use crate::grid::{Agent, Grid, Heading, Tag};
use std::sync::OnceLock;

/// Digits per condition key: north, west, south, east, heading.
pub const KEY_DIGITS: usize = 5;
/// Number of distinct condition keys, and the genome length.
pub const CONDITION_COUNT: usize = 4usize.pow(KEY_DIGITS as u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConditionKey {
    pub north: Tag,
    pub west: Tag,
    pub south: Tag,
    pub east: Tag,
    pub heading: Heading,
}

impl ConditionKey {
    pub fn digits(&self) -> [u8; KEY_DIGITS] {
        [
            self.north as u8,
            self.west as u8,
            self.south as u8,
            self.east as u8,
            self.heading as u8,
        ]
    }

    /// Base-4 numeral, north as the most significant digit.
    pub fn pack(&self) -> u16 {
        self.digits()
            .iter()
            .fold(0u16, |acc, &d| acc * 4 + d as u16)
    }
}

/// Reads the condition key around `agent`. Off-grid neighbours read as walls.
pub fn encode(agent: &Agent, grid: &Grid) -> ConditionKey {
    let x = agent.pos.x as i64;
    let y = agent.pos.y as i64;
    ConditionKey {
        north: grid.sense(x, y - 1),
        west: grid.sense(x - 1, y),
        south: grid.sense(x, y + 1),
        east: grid.sense(x + 1, y),
        heading: agent.heading,
    }
}

/// Fixed bijection from packed condition keys to genome indices.
pub struct ConditionTable {
    index: Box<[u16; CONDITION_COUNT]>,
}

const TAGS: [Tag; 4] = [Tag::Wall, Tag::Unclaimed, Tag::OwnedByA, Tag::OwnedByB];

impl ConditionTable {
    /// Enumerates every key in canonical nested order, numbering them as it goes.
    fn build() -> Self {
        let mut index = Box::new([0u16; CONDITION_COUNT]);
        let mut next = 0u16;
        for north in TAGS {
            for west in TAGS {
                for south in TAGS {
                    for east in TAGS {
                        for heading in Heading::ALL {
                            let key = ConditionKey {
                                north,
                                west,
                                south,
                                east,
                                heading,
                            };
                            index[key.pack() as usize] = next;
                            next += 1;
                        }
                    }
                }
            }
        }
        Self { index }
    }

    /// Shared table, built on first use.
    pub fn get() -> &'static ConditionTable {
        static TABLE: OnceLock<ConditionTable> = OnceLock::new();
        TABLE.get_or_init(ConditionTable::build)
    }

    pub fn lookup(&self, key: &ConditionKey) -> usize {
        self.index[key.pack() as usize] as usize
    }
}
