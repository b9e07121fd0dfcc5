//! Per-tile coding: sliced predictive deltas with three wire encodings.
//!
//! A tile is coded as up to four horizontal slices walked in lock-step:
//! one raw seed pixel per slice, then the deltas of all active slices
//! interleaved step by step so the four prediction chains sit next to
//! each other in the scratch buffer. The delta stream goes to the
//! entropy coder. Tiles whose deltas are all equal collapse to a single
//! coded value, and tiles the coder cannot shrink are stored as raw
//! pixels. The decoder tells the three layouts apart by the tile byte
//! length alone:
//!
//! | length        | layout                                          |
//! |---------------|-------------------------------------------------|
//! | `2 * tw * th` | raw little-endian pixels in scan order          |
//! | `2 * s + 2`   | `s` seed pixels, then one shared delta          |
//! | other         | `s` seed pixels, then the entropy-coded deltas  |
//!
//! A raw tile and a constant tile can never share a length: constant
//! coding requires at least two deltas, so `2 * tw * th >= 2 * s + 4`.
//! Coded streams are at least 3 and less than `2 * (tw * th - s)` bytes,
//! which keeps the third row distinct from the other two. This holds for
//! every permitted tile shape, with no preconditions on the dimensions;
//! degenerate tiles (a 2x1, say) simply always take the raw layout.

use byteorder::{ByteOrder, LittleEndian};

use crate::delta;
use crate::entropy::{Compression, EntropyCoder};
use crate::error::{Error, Result};
use crate::plane::{PlaneMut, PlaneRef};
use crate::pred;
use crate::slice::{SliceLayout, MAX_SLICES};

/// Encodes one tile into `dst`, returning the tile byte length.
///
/// `src` must be anchored at the tile origin, `scratch` must hold at
/// least `tw * th` cells, and `dst` at least `2 * tw * th` bytes, the
/// raw-fallback size.
pub fn encode_tile<C: EntropyCoder>(
    coder: &C,
    src: &PlaneRef<'_>,
    tw: usize,
    th: usize,
    scratch: &mut [u16],
    dst: &mut [u8],
) -> Result<usize> {
    let raw_len = 2 * tw * th;
    if dst.len() < raw_len {
        return Err(Error::FrameError(format!(
            "tile needs {} output bytes, {} available",
            raw_len,
            dst.len()
        )));
    }
    let layout = SliceLayout::new(th);
    let seeds = layout.count;

    // Raw seed pixels, one per slice.
    for i in 0..seeds {
        let pixel = src.get(0, layout.rows[i]) & delta::SAMPLE_MASK;
        LittleEndian::write_u16(&mut dst[2 * i..], pixel);
    }

    let deltas = fill_deltas(src, tw, &layout, scratch);
    debug_assert_eq!(deltas, tw * th - seeds);

    match coder.compress(&mut dst[2 * seeds..], &scratch[..deltas])? {
        Compression::Packed(written) => Ok(2 * seeds + written),
        Compression::Constant => {
            debug_assert!(deltas >= 2);
            LittleEndian::write_u16(&mut dst[2 * seeds..], scratch[0]);
            Ok(2 * seeds + 2)
        }
        Compression::Expanded => {
            // Scan order through the strides; the source may not be
            // contiguous.
            for row in 0..th {
                for col in 0..tw {
                    let pixel = src.get(col, row) & delta::SAMPLE_MASK;
                    LittleEndian::write_u16(&mut dst[2 * (row * tw + col)..], pixel);
                }
            }
            Ok(raw_len)
        }
    }
}

/// Walks the tile in lock-step and fills `scratch` with the interleaved
/// delta stream, returning the delta count.
///
/// At each (row, column) step the deltas of all active slices land in
/// adjacent scratch cells; the step at the slice origins emits nothing,
/// since those pixels travel raw.
fn fill_deltas(
    src: &PlaneRef<'_>,
    tw: usize,
    layout: &SliceLayout,
    scratch: &mut [u16],
) -> usize {
    let mut out = 0;
    let mut left = [0u16; MAX_SLICES];
    for y in 0..layout.heights[0] {
        let active = layout.active_at(y);
        for x in 0..tw {
            if y == 0 && x == 0 {
                for i in 0..active {
                    left[i] = src.get(0, layout.rows[i]) & delta::SAMPLE_MASK;
                }
                continue;
            }
            for i in 0..active {
                let row = layout.rows[i] + y;
                let pixel = src.get(x, row) & delta::SAMPLE_MASK;
                let prediction = if y == 0 {
                    left[i]
                } else if x == 0 {
                    src.get(x, row - 1) & delta::SAMPLE_MASK
                } else {
                    pred::average(left[i], src.get(x, row - 1) & delta::SAMPLE_MASK)
                };
                scratch[out + i] = delta::encode(pixel, prediction);
                left[i] = pixel;
            }
            out += active;
        }
    }
    out
}

/// Decodes one tile from its exact byte payload into `dst`, which must
/// be anchored at the tile origin.
pub fn decode_tile<C: EntropyCoder>(
    coder: &C,
    src: &[u8],
    tw: usize,
    th: usize,
    scratch: &mut [u16],
    dst: &mut PlaneMut<'_>,
) -> Result<()> {
    if src.is_empty() {
        return Err(Error::TileError("empty tile payload".to_owned()));
    }
    let raw_len = 2 * tw * th;
    let layout = SliceLayout::new(th);
    let seeds = layout.count;
    let header = 2 * seeds;
    let deltas = tw * th - seeds;

    if src.len() == raw_len {
        for row in 0..th {
            for col in 0..tw {
                let pixel =
                    LittleEndian::read_u16(&src[2 * (row * tw + col)..]) & delta::SAMPLE_MASK;
                dst.set(col, row, pixel);
            }
        }
        return Ok(());
    }

    if src.len() == header + 2 {
        let value = LittleEndian::read_u16(&src[header..]) & delta::SAMPLE_MASK;
        for cell in scratch[..deltas].iter_mut() {
            *cell = value;
        }
    } else {
        if src.len() <= header {
            return Err(Error::TileError(format!(
                "tile payload of {} bytes cannot hold {} seed pixels",
                src.len(),
                seeds
            )));
        }
        coder.decompress(&mut scratch[..deltas], &src[header..])?;
    }

    // Seeds to the top-left of each slice, then the lock-step walk,
    // mirroring the encoder. The left neighbor rides in a register; the
    // top neighbor is read back from the reconstructed output.
    for i in 0..seeds {
        let pixel = LittleEndian::read_u16(&src[2 * i..]) & delta::SAMPLE_MASK;
        dst.set(0, layout.rows[i], pixel);
    }

    let mut taken = 0;
    let mut left = [0u16; MAX_SLICES];
    for y in 0..layout.heights[0] {
        let active = layout.active_at(y);
        for x in 0..tw {
            if y == 0 && x == 0 {
                for i in 0..active {
                    left[i] = dst.get(0, layout.rows[i]);
                }
                continue;
            }
            for i in 0..active {
                let row = layout.rows[i] + y;
                let prediction = if y == 0 {
                    left[i]
                } else if x == 0 {
                    dst.get(x, row - 1)
                } else {
                    pred::average(left[i], dst.get(x, row - 1))
                };
                let pixel = delta::decode(scratch[taken + i], prediction);
                dst.set(x, row, pixel);
                left[i] = pixel;
            }
            taken += active;
        }
    }
    debug_assert_eq!(taken, deltas);
    Ok(())
}
