use super::byte::{rotate_byte, Carry};
use crate::direction::Direction;

/// A rotated chunk together with the bit pushed out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRotation {
    pub bytes: Vec<u8>,
    pub carry: Carry,
}

/// Rotate a chunk by one bit, returning a new buffer.
pub fn rotate_chunk(chunk: &[u8], carry: Carry, direction: Direction) -> ChunkRotation {
    let mut bytes = chunk.to_vec();
    let carry = rotate_chunk_in_place(&mut bytes, carry, direction);
    ChunkRotation { bytes, carry }
}

/// Rotate a chunk by one bit in place.
///
/// Rotating left walks from the last byte to the first, since the bit
/// leaving the top of a byte lands in the bottom of the byte before it.
/// Rotating right walks first to last. The incoming carry enters the first
/// byte visited and the carry leaving the last byte visited is returned.
/// An empty chunk hands `carry` back untouched.
pub fn rotate_chunk_in_place(chunk: &mut [u8], carry: Carry, direction: Direction) -> Carry {
    let step = |carry: Carry, byte: &mut u8| {
        let (rotated, out) = rotate_byte(*byte, carry, direction);
        *byte = rotated;
        out
    };

    match direction {
        Direction::Left => chunk.iter_mut().rev().fold(carry, step),
        Direction::Right => chunk.iter_mut().fold(carry, step),
    }
}
