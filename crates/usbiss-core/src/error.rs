use std::io;
use usbiss_protocol::FrameError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The port could not be opened, or a read/write failed or timed out.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The adapter answered the set-mode command with a failure byte.
    #[error(
        "adapter rejected I2C mode 0x{mode:02X} (status 0x{status:02X}); check the USB connection"
    )]
    Initialization { mode: u8, status: u8 },

    #[error("device not found or not initialized")]
    NotReady,

    #[error("invalid argument: {0}")]
    Validation(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, Error>;
