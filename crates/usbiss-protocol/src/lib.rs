//! USB-ISS wire protocol: addresses, operating modes, command frames.
//!
//! Nothing in this crate performs I/O. It only knows how to lay out the
//! bytes of a request and how many bytes the adapter answers with.

pub mod address;
pub mod command;
pub mod mode;

pub use address::{Direction, I2cAddress};
pub use command::{parse_serial_number, Command, ModuleInfo, MAX_PAYLOAD};
pub use mode::I2cMode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("I2C address 0x{0:02X} is out of the 7-bit range")]
    AddressOutOfRange(u8),

    #[error("payload of {0} bytes exceeds the {} byte frame limit", MAX_PAYLOAD)]
    PayloadTooLong(usize),
}
