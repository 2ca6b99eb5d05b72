use serde::{Deserialize, Serialize};

/// Conway's Life (B3/S23) on a torus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Life {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    generation: usize,
}

/// Cells of the glider the board starts from.
pub const GLIDER: [(usize, usize); 5] = [(3, 1), (1, 2), (3, 2), (2, 3), (3, 3)];

impl Life {
    pub fn new(width: usize, height: usize) -> Self {
        let mut life = Self {
            width,
            height,
            cells: vec![false; width * height],
            generation: 0,
        };
        life.reset();
        life
    }

    /// Clears the board and places the glider.
    pub fn reset(&mut self) {
        self.cells.fill(false);
        self.generation = 0;
        for (x, y) in GLIDER {
            self.set(x, y, true);
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = alive;
        }
    }

    pub fn alive(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.get(x, y))
            .collect()
    }

    fn neighbours(&self, x: usize, y: usize) -> usize {
        let mut n = 0;
        for dy in [self.height - 1, 0, 1] {
            for dx in [self.width - 1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (x + dx) % self.width;
                let ny = (y + dy) % self.height;
                if self.cells[ny * self.width + nx] {
                    n += 1;
                }
            }
        }
        n
    }

    pub fn step(&mut self) {
        let next = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let n = self.neighbours(x, y);
                matches!((self.get(x, y), n), (true, 2) | (_, 3))
            })
            .collect();
        self.cells = next;
        self.generation += 1;
    }
}

impl Default for Life {
    fn default() -> Self {
        Self::new(12, 12)
    }
}
