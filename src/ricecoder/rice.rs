//! An adaptive Golomb-Rice coder for modular delta streams.
//!
//! Deltas produced by the predictor cluster around zero: small positive
//! values, and values just under the modulus standing in for small
//! negative ones. Each symbol is folded to an unsigned magnitude code
//! and Rice-coded with a parameter derived from running magnitude
//! statistics, so encoder and decoder stay in lock-step without any side
//! information in the stream.

use crate::entropy::{Compression, EntropyCoder};
use crate::error::{Error, Result};
use crate::ricecoder::bitreader::BitReader;
use crate::ricecoder::bitwriter::BitWriter;

/// Quotients at or above this escape to a raw symbol code.
const QUOT_LIMIT: u32 = 20;

/// Count at which the adaptation state is halved.
const RESET_COUNT: u32 = 64;

/// A Golomb-Rice coder for streams of `bits`-wide symbols.
pub struct RiceCoder {
    bits: u32,
}

/// Running magnitude statistics driving the Rice parameter.
struct Adapt {
    magnitude: u32,
    count: u32,
}

impl Adapt {
    fn new() -> Self {
        Self {
            magnitude: 4,
            count: 1,
        }
    }

    /// Rice parameter for the next symbol: the smallest k with
    /// `count << k >= magnitude`.
    fn k(&self) -> u32 {
        let mut k = 0;
        while self.count << k < self.magnitude {
            k += 1;
        }
        k
    }

    fn update(&mut self, folded: u32) {
        self.magnitude += folded;
        if self.count == RESET_COUNT {
            self.magnitude >>= 1;
            self.count >>= 1;
        }
        self.count += 1;
    }
}

impl RiceCoder {
    /// Creates a coder for symbols of the given width, 1 to 14 bits.
    pub fn new(bits: u32) -> Self {
        assert!(bits >= 1 && bits <= 14);
        Self { bits }
    }

    /// Folds a modular residual to its magnitude code: 0, -1, +1, -2,
    /// ... map to 0, 1, 2, 3, ... relative to the `bits`-wide modulus.
    fn fold(&self, symbol: u16) -> u32 {
        let half = 1i32 << (self.bits - 1);
        let value = i32::from(symbol);
        let signed = if value < half {
            value
        } else {
            value - (1 << self.bits)
        };
        if signed >= 0 {
            (signed as u32) << 1
        } else {
            ((-signed as u32) << 1) - 1
        }
    }

    fn unfold(&self, folded: u32) -> u16 {
        let signed = if folded & 1 == 0 {
            (folded >> 1) as i32
        } else {
            -(((folded + 1) >> 1) as i32)
        };
        (signed & ((1 << self.bits) - 1)) as u16
    }

    fn pack(&self, dst: &mut [u8], src: &[u16]) -> Option<usize> {
        let mut writer = BitWriter::new(dst);
        let mut adapt = Adapt::new();
        for &symbol in src {
            let folded = self.fold(symbol);
            let k = adapt.k();
            let quotient = folded >> k;
            if quotient < QUOT_LIMIT {
                // Quotient zeros, a one, then k remainder bits.
                writer.write(1, quotient + 1)?;
                writer.write(folded & ((1 << k) - 1), k)?;
            } else {
                // Escape: QUOT_LIMIT zeros, then the symbol itself.
                writer.write(0, QUOT_LIMIT)?;
                writer.write(folded, self.bits)?;
            }
            adapt.update(folded);
        }
        writer.finish()
    }
}

impl EntropyCoder for RiceCoder {
    fn compress(&self, dst: &mut [u8], src: &[u16]) -> Result<Compression> {
        if src.is_empty() {
            return Ok(Compression::Expanded);
        }
        if src.len() >= 2 && src.iter().all(|&s| s == src[0]) {
            return Ok(Compression::Constant);
        }
        // Anything at 2 * len bytes or more loses to storing the
        // symbols raw, so cap the writer there and let an overflow mean
        // "expanded". Streams under 3 bytes are reported the same way
        // to keep the caller's length dispatch unambiguous.
        let budget = (2 * src.len() - 1).min(dst.len());
        match self.pack(&mut dst[..budget], src) {
            Some(written) if written >= 3 => Ok(Compression::Packed(written)),
            _ => Ok(Compression::Expanded),
        }
    }

    fn decompress(&self, dst: &mut [u16], src: &[u8]) -> Result<()> {
        let max_folded = (1u32 << self.bits) - 1;
        let mut reader = BitReader::new(src);
        let mut adapt = Adapt::new();
        for cell in dst.iter_mut() {
            let k = adapt.k();
            let mut quotient = 0;
            while quotient < QUOT_LIMIT && reader.read(1)? == 0 {
                quotient += 1;
            }
            let folded = if quotient == QUOT_LIMIT {
                reader.read(self.bits)?
            } else {
                quotient << k | reader.read(k)?
            };
            if folded > max_folded {
                return Err(Error::EntropyError(format!(
                    "symbol magnitude {} exceeds {} bits",
                    folded, self.bits
                )));
            }
            *cell = self.unfold(folded);
            adapt.update(folded);
        }
        // The stream must end inside its final byte; whole trailing
        // bytes mean the declared length was wrong.
        if (reader.bit_position() + 7) / 8 != src.len() {
            return Err(Error::EntropyError(
                "stream length does not match symbol count".to_owned(),
            ));
        }
        Ok(())
    }
}
