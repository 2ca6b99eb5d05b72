use crate::error::{Result, SimError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ownership tag of a single cell. The discriminants are the sensor alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tag {
    Wall = 0,
    Unclaimed = 1,
    OwnedByA = 2,
    OwnedByB = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Heading {
    North = 0,
    South = 1,
    West = 2,
    East = 3,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::South, Heading::West, Heading::East];

    /// North -> West -> South -> East -> North
    pub fn left(self) -> Heading {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    pub fn right(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    pub fn offset(self) -> (i64, i64) {
        match self {
            Heading::North => (0, -1),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
            Heading::East => (1, 0),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Heading {
        Heading::ALL[rng.gen_range(0..Heading::ALL.len())]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    A,
    B,
}

impl AgentId {
    pub fn tag(self) -> Tag {
        match self {
            AgentId::A => Tag::OwnedByA,
            AgentId::B => Tag::OwnedByB,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            AgentId::A => 0,
            AgentId::B => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub pos: Pos,
    pub heading: Heading,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

impl Score {
    pub fn of(&self, id: AgentId) -> u32 {
        match id {
            AgentId::A => self.a,
            AgentId::B => self.b,
        }
    }

    pub fn total(&self) -> u32 {
        self.a + self.b
    }
}

/// Territory matrix with hard edges. Cells are stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tag>,
}

impl Grid {
    /// Both agents need a corner of their own, so anything under 2x2 is refused.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(SimError::InvalidConfig(format!(
                "grid must be at least 2x2, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![Tag::Unclaimed; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Tag] {
        &self.cells
    }

    /// Starting cell and heading of each agent.
    pub fn start_of(&self, id: AgentId) -> Agent {
        match id {
            AgentId::A => Agent {
                id,
                pos: Pos::new(0, 0),
                heading: Heading::South,
            },
            AgentId::B => Agent {
                id,
                pos: Pos::new(self.width - 1, self.height - 1),
                heading: Heading::North,
            },
        }
    }

    /// Wipes the grid and returns both agents at their starting cells, already claimed.
    pub fn reset(&mut self) -> [Agent; 2] {
        self.cells.fill(Tag::Unclaimed);
        let agents = [self.start_of(AgentId::A), self.start_of(AgentId::B)];
        for agent in &agents {
            let i = self.width * agent.pos.y + agent.pos.x;
            self.cells[i] = agent.id.tag();
        }
        agents
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i64, y: i64) -> Result<usize> {
        if !self.contains(x, y) {
            return Err(SimError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn owner_at(&self, x: i64, y: i64) -> Result<Tag> {
        Ok(self.cells[self.index(x, y)?])
    }

    /// Tag at `(x, y)`, or [`Tag::Wall`] for anything off the grid.
    pub fn sense(&self, x: i64, y: i64) -> Tag {
        self.owner_at(x, y).unwrap_or(Tag::Wall)
    }

    pub fn claim(&mut self, x: i64, y: i64, owner: AgentId) -> Result<()> {
        let i = self.index(x, y)?;
        if self.cells[i] != Tag::Wall {
            self.cells[i] = owner.tag();
        }
        Ok(())
    }

    pub fn score(&self) -> Score {
        let mut score = Score::default();
        for tag in &self.cells {
            match tag {
                Tag::OwnedByA => score.a += 1,
                Tag::OwnedByB => score.b += 1,
                Tag::Wall | Tag::Unclaimed => {}
            }
        }
        score
    }
}
