//! Contract between the tile codec and the delta entropy coder.
//!
//! The tile wire format carries no type tag: the decoder tells the three
//! tile encodings apart by payload length alone. The compression outcome
//! exists to keep that dispatch sound, so its variants carry guarantees
//! beyond "how many bytes were written".

use crate::error::Result;

/// Outcome of one compression call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// The coded stream would not have been smaller than the raw
    /// symbols, or the destination could not hold it. Both mean the
    /// same thing to the caller: store the data uncoded.
    Expanded,
    /// Every input symbol carried the same value; nothing was written.
    /// Never reported for inputs of fewer than two symbols.
    Constant,
    /// The stream was written, always `3..2 * src.len()` bytes. The
    /// lower bound keeps a coded tile from masquerading as a
    /// constant-delta tile, the upper bound from masquerading as a raw
    /// one.
    Packed(usize),
}

/// A 16-bit-symbol entropy coder usable by the tile codec.
///
/// Every call codes one self-contained stream; implementations keep no
/// state across calls. The tile codec masks deltas to 12 bits before
/// compressing, so implementations may assume symbols fit the width they
/// were constructed for.
pub trait EntropyCoder {
    /// Compresses `src` into `dst`, reporting how (or whether) the
    /// stream was written.
    ///
    /// A destination too small for the coded stream is an `Expanded`
    /// outcome rather than an error.
    fn compress(&self, dst: &mut [u8], src: &[u16]) -> Result<Compression>;

    /// Decompresses `src`, filling `dst` exactly.
    ///
    /// Fails on truncated input and on streams that do not end within
    /// the final byte of `src`.
    fn decompress(&self, dst: &mut [u16], src: &[u8]) -> Result<()>;
}
