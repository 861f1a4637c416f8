use crate::direction::Direction;

/// Encoded carry entering the bottom of a byte when rotating left
pub const LOW_BIT: u8 = 0b0000_0001;
/// Encoded carry entering the top of a byte when rotating right
pub const HIGH_BIT: u8 = 0b1000_0000;

/// The single bit handed from one byte (or chunk) to its neighbour.
///
/// The bit itself carries no position. It is placed at the boundary it
/// crosses only when it is folded into a byte, so a carry produced while
/// rotating one way can be fed straight back into the opposite rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Carry(bool);

impl Carry {
    pub const ZERO: Carry = Carry(false);
    pub const ONE: Carry = Carry(true);

    pub fn new(bit: bool) -> Self {
        Self(bit)
    }

    /// Decode a carry from its byte form (zero, or a single boundary bit)
    pub fn from_encoded(byte: u8) -> Self {
        Self(byte != 0)
    }

    /// The bit as 0 or 1
    pub fn bit(self) -> u8 {
        self.0 as u8
    }

    /// Place the bit where it enters a byte rotated in `direction`
    pub fn encoded(self, direction: Direction) -> u8 {
        match (self.0, direction) {
            (false, _) => 0,
            (true, Direction::Left) => LOW_BIT,
            (true, Direction::Right) => HIGH_BIT,
        }
    }

    /// The bit that leaves `byte` when it is rotated in `direction`
    pub fn leaving(byte: u8, direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::from_encoded(byte & HIGH_BIT),
            Direction::Right => Self::from_encoded(byte & LOW_BIT),
        }
    }
}

/// Rotate one byte by one bit, folding in `carry` and returning the bit
/// pushed out of the opposite end.
#[inline]
pub fn rotate_byte(byte: u8, carry: Carry, direction: Direction) -> (u8, Carry) {
    let shifted = match direction {
        Direction::Left => byte << 1,
        Direction::Right => byte >> 1,
    };
    (
        shifted | carry.encoded(direction),
        Carry::leaving(byte, direction),
    )
}
