//! Rotate - whole-file one-bit circular rotation
//!
//! Treats a file of N bytes as a single sequence of 8N bits (most
//! significant bit of the first byte first) and moves every bit one
//! position left or right. The bit pushed off one end of the file
//! reappears at the other.
//!
//! ## Layers
//!
//! ```text
//! StreamRotator → rotate_chunk → rotate_byte
//! ```
//!
//! - **Byte**: shift one byte, fold in the incoming carry, return the bit pushed out
//! - **Chunk**: rotate a run of bytes, threading the carry between neighbours
//! - **Stream**: read the wraparound bit, then walk the stream chunk by chunk
//!   (backwards for left, forwards for right) so only one chunk is in memory
//!
//! ## Example
//!
//! ```no_run
//! use rotate::cli::rotate_file;
//! use rotate::{Direction, RotateOptions};
//! use std::path::Path;
//!
//! rotate_file(
//!     Path::new("input.bin"),
//!     Path::new("rotated.bin"),
//!     Direction::Left,
//!     &RotateOptions::default(),
//! ).unwrap();
//! ```
//!
//! In memory:
//!
//! ```
//! use rotate::{rotate_bytes, Direction};
//!
//! let rotated = rotate_bytes(&[0, 0, 255, 0, 0], Direction::Right).unwrap();
//! assert_eq!(rotated, vec![0, 0, 0b0111_1111, 0b1000_0000, 0]);
//! ```

pub mod cli;
pub mod config;
pub mod direction;
pub mod error;
pub mod rotator;

pub use config::{ReportFormat, RotateOptions, DEFAULT_CHUNK_SIZE};
pub use direction::Direction;
pub use error::{Result, RotateError};
pub use rotator::{rotate_bytes, Carry, RotationStats, StreamRotator};
