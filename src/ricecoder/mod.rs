//! Adaptive Golomb-Rice coding of 12-bit delta streams.

pub mod bitreader;
pub mod bitwriter;
pub mod rice;

pub use self::rice::RiceCoder;
