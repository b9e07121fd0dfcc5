use crate::error::{Error, Result};

/// MSB-first bit reader over a byte buffer.
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    bit_buf: u64,
    bits_in_buf: u32,
}

impl<'a> BitReader<'a> {
    /// Creates a new bitreader.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            bit_buf: 0,
            bits_in_buf: 0,
        }
    }

    /// Reads `count` bits, up to 32.
    pub fn read(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        while self.bits_in_buf < count {
            if self.pos >= self.buf.len() {
                return Err(Error::EntropyError("bitstream exhausted".to_owned()));
            }
            self.bit_buf = self.bit_buf << 8 | u64::from(self.buf[self.pos]);
            self.bits_in_buf += 8;
            self.pos += 1;
        }
        self.bits_in_buf -= count;
        Ok(((self.bit_buf >> self.bits_in_buf) & ((1u64 << count) - 1)) as u32)
    }

    /// Total bits consumed so far.
    pub fn bit_position(&self) -> usize {
        self.pos * 8 - self.bits_in_buf as usize
    }
}
