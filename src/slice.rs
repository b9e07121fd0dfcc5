//! Horizontal slicing of a tile.
//!
//! A tile's rows are partitioned into up to four slices that the tile
//! codec walks in lock-step, keeping four independent prediction chains
//! live in the inner loop at once. Earlier slices are at least as tall
//! as later ones and heights differ by at most one row, so the slices
//! still active at a given lock-step row always form a prefix of the
//! slice list.

/// Upper bound on the number of slices per tile.
pub const MAX_SLICES: usize = 4;

/// Row partition of one tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct SliceLayout {
    /// Number of slices, `min(tile_height, 4)`.
    pub count: usize,
    /// Height of each slice; entries past `count` are zero.
    pub heights: [usize; MAX_SLICES],
    /// Starting row of each slice within the tile.
    pub rows: [usize; MAX_SLICES],
}

impl SliceLayout {
    /// Partitions `tile_height` rows into lock-step slices.
    pub fn new(tile_height: usize) -> Self {
        debug_assert!(tile_height > 0);
        let count = tile_height.min(MAX_SLICES);
        let base = tile_height / count;
        let extra = tile_height % count;

        let mut layout = SliceLayout {
            count,
            ..Default::default()
        };
        let mut row = 0;
        for i in 0..count {
            layout.heights[i] = base + (i < extra) as usize;
            layout.rows[i] = row;
            row += layout.heights[i];
        }
        layout
    }

    /// Number of slices that still have a row at slice-local row `y`.
    pub fn active_at(&self, y: usize) -> usize {
        self.heights[..self.count].iter().filter(|&&h| y < h).count()
    }
}
