//! Growth automaton: neighbour counting → single-step rule → multi-step driver.
pub mod growth;
pub mod neighborhood;
pub mod simulate;

pub use growth::grow_step;
pub use neighborhood::{count_neighbors, NeighborCounts};
pub use simulate::{simulate, SweepStrategy};
