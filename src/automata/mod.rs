//! Fixed-rule cellular automata that share the simulation's step-and-read shape.

pub mod elementary;
pub mod life;

pub use elementary::Elementary;
pub use life::Life;
