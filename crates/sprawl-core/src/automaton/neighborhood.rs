//! Moore-neighbourhood occupancy counts with zero padding.
use crate::grid::{OccupancyGrid, OCCUPIED};

/// The 8 Moore offsets (row, col): N, S, W, E, NW, NE, SW, SE.
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Per-cell count of occupied Moore neighbours, row-major, same shape as the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborCounts {
    pub counts: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl NeighborCounts {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.counts[row * self.width + col]
    }
}

/// Flat indices of the in-bounds Moore neighbours of cell `idx`.
/// Out-of-grid positions are simply absent: the grid is padded with vacant cells.
#[inline]
pub fn moore_neighbors(idx: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let r = (idx / width) as isize;
    let c = (idx % width) as isize;
    MOORE_OFFSETS.into_iter().filter_map(move |(dr, dc)| {
        let nr = r + dr;
        let nc = c + dc;
        if nr < 0 || nc < 0 || nr >= height as isize || nc >= width as isize {
            None
        } else {
            Some(nr as usize * width + nc as usize)
        }
    })
}

/// Count occupied neighbours of every cell.
///
/// Equivalent to convolving with the 3×3 kernel
/// `[[1,1,1],[1,0,1],[1,1,1]]` under constant-zero boundary mode. Edge cells
/// see fewer real neighbours (5 on an edge, 3 in a corner); no wraparound.
pub fn count_neighbors(grid: &OccupancyGrid) -> NeighborCounts {
    let (w, h) = (grid.width, grid.height);
    let mut counts = vec![0u8; w * h];

    // Scatter from occupied cells: each contributes 1 to its neighbours.
    for (idx, &v) in grid.data.iter().enumerate() {
        if v == OCCUPIED {
            for n in moore_neighbors(idx, w, h) {
                counts[n] += 1;
            }
        }
    }

    NeighborCounts { counts, width: w, height: h }
}
