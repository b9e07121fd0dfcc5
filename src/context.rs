//! The pack context: validated frame and tile geometry, the reusable
//! per-tile scratch buffer, and whole-frame encode/decode around the
//! per-tile length table.
//!
//! A packed frame is laid out as `nx * ny` little-endian u32 tile
//! lengths, in row-major tile order, followed by the tile payloads in
//! the same order. The total packed length travels out of band (the
//! container's framing); the decoder consumes exactly that many bytes
//! and fails on anything shorter or longer.

use byteorder::{ByteOrder, LittleEndian};

use crate::delta::SAMPLE_BITS;
use crate::error::{Error, Result};
use crate::plane::{PlaneMut, PlaneRef};
use crate::ricecoder::RiceCoder;
use crate::tile;

/// Bytes per length-table entry.
const TABLE_ENTRY: usize = 4;

/// A reusable frame codec instance.
///
/// The context owns one tile's worth of delta scratch and nothing else;
/// it may be reused across frames and across encode and decode. Every
/// operation takes `&mut self`, so one context serves one operation at a
/// time. Contexts share no state: hold one per worker to process
/// distinct frames in parallel.
pub struct PackContext {
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
    tiles_x: usize,
    tiles_y: usize,
    scratch: Vec<u16>,
    coder: RiceCoder,
}

impl PackContext {
    /// Creates a context for the given frame and tile geometry.
    ///
    /// Only 12 bits per pixel is accepted; the parameter stays in the
    /// surface to leave room for other sample formats. Tiles may not
    /// exceed the frame; right and bottom edge tiles shrink when the
    /// frame is not an exact multiple of the tile size.
    pub fn new(
        width: usize,
        height: usize,
        bits_per_pixel: u32,
        tile_width: usize,
        tile_height: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "invalid frame dimensions: {}x{}",
                width, height
            )));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "invalid tile dimensions: {}x{}",
                tile_width, tile_height
            )));
        }
        if bits_per_pixel != SAMPLE_BITS {
            return Err(Error::InvalidConfiguration(format!(
                "only {} bits per pixel is supported, got {}",
                SAMPLE_BITS, bits_per_pixel
            )));
        }
        if tile_width > width || tile_height > height {
            return Err(Error::InvalidConfiguration(format!(
                "tile {}x{} exceeds frame {}x{}",
                tile_width, tile_height, width, height
            )));
        }

        let tiles_x = (width + tile_width - 1) / tile_width;
        let tiles_y = (height + tile_height - 1) / tile_height;

        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles_x,
            tiles_y,
            scratch: vec![0; tile_width * tile_height],
            coder: RiceCoder::new(SAMPLE_BITS),
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile grid dimensions, columns then rows.
    pub fn tile_grid(&self) -> (usize, usize) {
        (self.tiles_x, self.tiles_y)
    }

    /// Worst-case packed frame size: every tile raw, plus the length
    /// table. The bound is tight, and any destination meeting it can
    /// never run out of room mid-frame.
    pub fn max_packed_size(&self) -> usize {
        2 * self.width * self.height + TABLE_ENTRY * self.tiles_x * self.tiles_y
    }

    /// Encodes one frame read through `(origin, dx, dy)` into `dst`,
    /// returning the packed byte length.
    ///
    /// `dst` must hold at least [`max_packed_size`](Self::max_packed_size)
    /// bytes. On failure the destination contents are indeterminate.
    pub fn encode_frame(
        &mut self,
        src: &[u16],
        origin: usize,
        dx: isize,
        dy: isize,
        dst: &mut [u8],
    ) -> Result<usize> {
        let plane = PlaneRef::new(src, origin, dx, dy, self.width, self.height)?;
        if dst.len() < self.max_packed_size() {
            return Err(Error::InvalidInputData(format!(
                "destination holds {} bytes, worst case frame is {}",
                dst.len(),
                self.max_packed_size()
            )));
        }

        let table = TABLE_ENTRY * self.tiles_x * self.tiles_y;
        let mut tail = table;
        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let x0 = tx * self.tile_width;
                let y0 = ty * self.tile_height;
                let tw = self.tile_width.min(self.width - x0);
                let th = self.tile_height.min(self.height - y0);
                let view = plane.window(x0, y0);
                let len = tile::encode_tile(
                    &self.coder,
                    &view,
                    tw,
                    th,
                    &mut self.scratch,
                    &mut dst[tail..],
                )?;
                let slot = ty * self.tiles_x + tx;
                LittleEndian::write_u32(&mut dst[TABLE_ENTRY * slot..], len as u32);
                tail += len;
            }
        }
        Ok(tail)
    }

    /// Decodes a packed frame into `dst` written through
    /// `(origin, dx, dy)`.
    ///
    /// `src` must be exactly the bytes the encoder produced: the packed
    /// length is part of the format, so a truncated or padded buffer
    /// fails. Every cell written has a zero high nibble.
    pub fn decode_frame(
        &mut self,
        src: &[u8],
        dst: &mut [u16],
        origin: usize,
        dx: isize,
        dy: isize,
    ) -> Result<()> {
        let mut plane = PlaneMut::new(dst, origin, dx, dy, self.width, self.height)?;
        let table = TABLE_ENTRY * self.tiles_x * self.tiles_y;
        if src.len() < table {
            return Err(Error::FrameError(format!(
                "packed frame of {} bytes cannot hold its {}-byte length table",
                src.len(),
                table
            )));
        }

        let mut offset = table;
        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let slot = ty * self.tiles_x + tx;
                let len = LittleEndian::read_u32(&src[TABLE_ENTRY * slot..]) as usize;
                if len == 0 {
                    return Err(Error::FrameError(format!(
                        "tile {} has zero length",
                        slot
                    )));
                }
                if len > src.len() - offset {
                    return Err(Error::FrameError(format!(
                        "tile {} of {} bytes overruns the packed frame",
                        slot, len
                    )));
                }
                let x0 = tx * self.tile_width;
                let y0 = ty * self.tile_height;
                let tw = self.tile_width.min(self.width - x0);
                let th = self.tile_height.min(self.height - y0);
                let mut view = plane.window(x0, y0);
                tile::decode_tile(
                    &self.coder,
                    &src[offset..offset + len],
                    tw,
                    th,
                    &mut self.scratch,
                    &mut view,
                )?;
                offset += len;
            }
        }
        if offset != src.len() {
            return Err(Error::FrameError(format!(
                "{} trailing bytes after the last tile",
                src.len() - offset
            )));
        }
        Ok(())
    }
}
