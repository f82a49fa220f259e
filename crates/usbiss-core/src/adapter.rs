//! The USB-ISS adapter state machine.
//!
//! An [`Adapter`] starts out [`State::Closed`]. [`Adapter::open`] acquires
//! the transport and runs the set-mode handshake; only a successful
//! handshake moves it to [`State::Ready`]. Every bus operation checks the
//! state first and fails with [`Error::NotReady`] without touching the
//! transport otherwise.
//!
//! All calls block until the adapter has answered or the transport
//! timeout has elapsed. Nothing is retried.

use crate::error::{Error, Result};
use crate::trace::{Direction, TrafficLog};
use crate::transport::{AdapterConfig, SerialTransport, Transport};
use log::{debug, info, warn};
use std::io;
use usbiss_protocol::{parse_serial_number, Command, I2cAddress, I2cMode, ModuleInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Ready,
}

pub struct Adapter<T: Transport = SerialTransport> {
    transport: T,
    state: State,
    mode: I2cMode,
    trace: Option<TrafficLog>,
}

impl Adapter<SerialTransport> {
    /// An adapter on `port_name` with 32 ms timeouts and 100 kHz hardware
    /// I2C. The port is not touched until [`Adapter::open`].
    pub fn new(port_name: impl Into<String>) -> Self {
        Self::with_config(AdapterConfig::new(port_name))
    }

    pub fn with_config(cfg: AdapterConfig) -> Self {
        Self::with_transport(SerialTransport::new(&cfg)).with_mode(cfg.mode)
    }
}

impl<T: Transport> Adapter<T> {
    /// Wrap an existing transport. A transport that is already open is
    /// closed first so the adapter always starts from a known state.
    pub fn with_transport(mut transport: T) -> Self {
        if transport.is_open() {
            if let Err(e) = transport.close() {
                warn!("{}: closing stale handle failed: {e}", transport.name());
            }
        }
        Self {
            transport,
            state: State::Closed,
            mode: I2cMode::default(),
            trace: None,
        }
    }

    /// Mode requested by the next handshake.
    pub fn with_mode(mut self, mode: I2cMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> I2cMode {
        self.mode
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start recording every frame sent and received, keeping the most
    /// recent `capacity` entries.
    pub fn enable_trace(&mut self, capacity: usize) {
        self.trace = Some(TrafficLog::new(capacity));
    }

    pub fn trace(&self) -> Option<&TrafficLog> {
        self.trace.as_ref()
    }

    /// Open the transport and switch the adapter into I2C mode.
    ///
    /// On any failure the transport is released again and the adapter stays
    /// closed. Opening an adapter that is already ready does nothing.
    pub fn open(&mut self) -> Result<()> {
        if self.is_ready() {
            debug!("{}: already open", self.transport.name());
            return Ok(());
        }

        self.state = State::Closed;
        if let Err(e) = self.transport.open() {
            warn!("{}: open failed: {e}", self.transport.name());
            self.release();
            return Err(Error::Transport(e));
        }

        match self.handshake() {
            Ok(()) => {
                self.state = State::Ready;
                info!("{}: ready in {} mode", self.transport.name(), self.mode);
                Ok(())
            }
            Err(e) => {
                warn!("{}: handshake failed: {e}", self.transport.name());
                self.release();
                Err(e)
            }
        }
    }

    /// Release the transport. Never fails and may be called repeatedly.
    pub fn close(&mut self) {
        if self.transport.is_open() {
            info!("{}: closing", self.transport.name());
        }
        self.release();
    }

    /// Write `payload` to `register` of the device at `address` and return
    /// the adapter's status byte unchanged. By convention 0 means the write
    /// failed on the bus; checking it is left to the caller.
    pub fn write(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<u8> {
        self.ensure_ready()?;
        let address = I2cAddress::new(address)?;
        let reply = self.exchange(&Command::WriteRegister { address, register, payload })?;
        Ok(reply[0])
    }

    /// Read `count` bytes starting at `register`. Either exactly `count`
    /// bytes come back or the call fails.
    pub fn read(&mut self, address: u8, register: u8, count: u8) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        let address = I2cAddress::new(address)?;
        self.exchange(&Command::ReadRegister { address, register, count })
    }

    /// Ask the adapter whether a device acknowledges `address`.
    pub fn validate_address(&mut self, address: u8) -> Result<bool> {
        self.ensure_ready()?;
        let address = I2cAddress::new(address)?;
        let reply = self.exchange(&Command::TestAddress(address))?;
        Ok(reply[0] != 0)
    }

    pub fn module_info(&mut self) -> Result<ModuleInfo> {
        self.ensure_ready()?;
        let reply = self.exchange(&Command::GetVersion)?;
        ModuleInfo::parse(&reply).ok_or_else(|| invalid_reply("version", &reply))
    }

    pub fn serial_number(&mut self) -> Result<String> {
        self.ensure_ready()?;
        let reply = self.exchange(&Command::GetSerialNumber)?;
        Ok(parse_serial_number(&reply))
    }

    fn handshake(&mut self) -> Result<()> {
        let command = Command::SetMode(self.mode);
        let reply = self.exchange(&command)?;
        match reply[..] {
            [0x00, status] => Err(Error::Initialization {
                mode: self.mode.as_byte(),
                status,
            }),
            // The second byte is not interpreted, only drained.
            _ => Ok(()),
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            State::Ready => Ok(()),
            State::Closed => Err(Error::NotReady),
        }
    }

    /// Send one frame and read its complete reply. Replies of length zero
    /// skip the read entirely.
    fn exchange(&mut self, command: &Command<'_>) -> Result<Vec<u8>> {
        let frame = command.encode()?;
        let expected = command.response_len();

        debug!("{}: tx {:02X?}", self.transport.name(), frame);
        self.transport.write_all(&frame)?;
        self.record(Direction::Tx, &frame);

        if expected == 0 {
            return Ok(Vec::new());
        }

        let reply = self.transport.read_exact(expected)?;
        if reply.len() != expected {
            return Err(invalid_reply("short", &reply));
        }
        debug!("{}: rx {:02X?}", self.transport.name(), reply);
        self.record(Direction::Rx, &reply);
        Ok(reply)
    }

    fn record(&mut self, direction: Direction, data: &[u8]) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(direction, data);
        }
    }

    fn release(&mut self) {
        self.state = State::Closed;
        if !self.transport.is_open() {
            return;
        }
        if let Err(e) = self.transport.close() {
            warn!("{}: close failed: {e}", self.transport.name());
        }
    }
}

impl<T: Transport> Drop for Adapter<T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn invalid_reply(what: &str, reply: &[u8]) -> Error {
    Error::Transport(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{what} reply from adapter: {reply:02X?}"),
    ))
}
