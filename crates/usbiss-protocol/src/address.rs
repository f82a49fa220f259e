use crate::FrameError;
use std::fmt;

/// Transfer direction, carried in bit 0 of the address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    fn bit(self) -> u8 {
        match self {
            Direction::Write => 0,
            Direction::Read => 1,
        }
    }
}

/// A 7-bit I2C peripheral address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I2cAddress(u8);

impl I2cAddress {
    pub const MAX: u8 = 0x7F;

    pub fn new(raw: u8) -> Result<Self, FrameError> {
        if raw > Self::MAX {
            return Err(FrameError::AddressOutOfRange(raw));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The address as it appears on the wire: shifted left with the
    /// direction in the low bit.
    pub fn wire_byte(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction.bit()
    }
}

impl TryFrom<u8> for I2cAddress {
    type Error = FrameError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_byte_carries_direction_for_every_address() {
        for raw in 0..=I2cAddress::MAX {
            let addr = I2cAddress::new(raw).unwrap();
            assert_eq!(addr.wire_byte(Direction::Write), raw << 1);
            assert_eq!(addr.wire_byte(Direction::Read), (raw << 1) | 1);
        }
    }

    #[test]
    fn rejects_eight_bit_addresses() {
        assert_eq!(I2cAddress::new(0x80), Err(FrameError::AddressOutOfRange(0x80)));
        assert_eq!(I2cAddress::try_from(0xFF), Err(FrameError::AddressOutOfRange(0xFF)));
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(I2cAddress::new(0x39).unwrap().to_string(), "0x39");
    }
}
