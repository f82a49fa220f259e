//! Blocking driver for the USB-ISS USB-to-I2C bridge.

pub mod adapter;
pub mod error;
pub mod mock;
pub mod shared;
pub mod trace;
pub mod transport;

pub use adapter::{Adapter, State};
pub use error::{Error, Result};
pub use shared::SharedAdapter;
pub use trace::{Direction, TraceEntry, TrafficLog};
pub use transport::{list_ports, AdapterConfig, PortInfo, SerialTransport, Transport};
pub use usbiss_protocol::{FrameError, I2cAddress, I2cMode, ModuleInfo};
