//! Strided access to a caller-owned pixel grid.
//!
//! Callers address a width x height grid inside their own buffer with an
//! origin cell and per-column / per-row strides counted in cells, not
//! bytes. Strides may be negative (bottom-up or mirrored layouts) and may
//! interleave several logical planes in one allocation; the only
//! requirement is that every cell of the grid lands inside the buffer.
//! The cell offset is affine in (column, row), so checking the four grid
//! corners at construction bounds every later access.

use crate::error::{Error, Result};

/// Read-only view of a pixel grid.
pub struct PlaneRef<'a> {
    data: &'a [u16],
    origin: isize,
    dx: isize,
    dy: isize,
}

/// Mutable view of a pixel grid.
pub struct PlaneMut<'a> {
    data: &'a mut [u16],
    origin: isize,
    dx: isize,
    dy: isize,
}

fn check_bounds(
    len: usize,
    origin: usize,
    dx: isize,
    dy: isize,
    width: usize,
    height: usize,
) -> Result<()> {
    if dx == 0 || dy == 0 {
        return Err(Error::InvalidInputData(
            "strides must be nonzero".to_owned(),
        ));
    }
    let col_span = (width as isize - 1) * dx;
    let row_span = (height as isize - 1) * dy;
    let first = origin as isize + col_span.min(0) + row_span.min(0);
    let last = origin as isize + col_span.max(0) + row_span.max(0);
    if first < 0 || last >= len as isize {
        return Err(Error::InvalidInputData(format!(
            "{}x{} plane spans cells {}..={}, buffer holds {}",
            width, height, first, last, len
        )));
    }
    Ok(())
}

impl<'a> PlaneRef<'a> {
    /// Creates a view of a `width` x `height` grid inside `data`.
    pub fn new(
        data: &'a [u16],
        origin: usize,
        dx: isize,
        dy: isize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        check_bounds(data.len(), origin, dx, dy, width, height)?;
        Ok(Self {
            data,
            origin: origin as isize,
            dx,
            dy,
        })
    }

    /// Re-anchors the view at (col, row), e.g. at a tile origin.
    pub fn window(&self, col: usize, row: usize) -> PlaneRef<'_> {
        PlaneRef {
            data: self.data,
            origin: self.origin + col as isize * self.dx + row as isize * self.dy,
            dx: self.dx,
            dy: self.dy,
        }
    }

    /// Reads the cell at (col, row).
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> u16 {
        self.data[(self.origin + col as isize * self.dx + row as isize * self.dy) as usize]
    }
}

impl<'a> PlaneMut<'a> {
    /// Creates a mutable view of a `width` x `height` grid inside `data`.
    pub fn new(
        data: &'a mut [u16],
        origin: usize,
        dx: isize,
        dy: isize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        check_bounds(data.len(), origin, dx, dy, width, height)?;
        Ok(Self {
            data,
            origin: origin as isize,
            dx,
            dy,
        })
    }

    /// Re-anchors the view at (col, row), e.g. at a tile origin.
    pub fn window(&mut self, col: usize, row: usize) -> PlaneMut<'_> {
        PlaneMut {
            origin: self.origin + col as isize * self.dx + row as isize * self.dy,
            dx: self.dx,
            dy: self.dy,
            data: &mut *self.data,
        }
    }

    /// Reads the cell at (col, row).
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> u16 {
        self.data[(self.origin + col as isize * self.dx + row as isize * self.dy) as usize]
    }

    /// Writes the cell at (col, row).
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: u16) {
        self.data[(self.origin + col as isize * self.dx + row as isize * self.dy) as usize] =
            value;
    }
}
