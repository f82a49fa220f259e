//! In-memory [`Transport`] for exercising the adapter without hardware.
//!
//! Response bytes are queued up front and handed out in order by
//! `read_exact`. Every write and every read request is recorded so tests
//! can assert exactly what went over the wire.
//!
//! ```
//! use usbiss_core::mock::MockTransport;
//! use usbiss_core::Adapter;
//!
//! let mut mock = MockTransport::new();
//! mock.queue_response(&[0x01, 0x00]);
//! let mut adapter = Adapter::with_transport(mock);
//! adapter.open().unwrap();
//! assert_eq!(adapter.transport().written(), &[vec![0x5A, 0x02, 0x60]]);
//! ```

use crate::transport::Transport;
use std::collections::VecDeque;
use std::io;

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: VecDeque<u8>,
    open: bool,
    open_error: Option<io::ErrorKind>,
    close_error: bool,
    written: Vec<Vec<u8>>,
    reads: Vec<usize>,
    opens: usize,
    closes: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes the adapter will read back, in order.
    pub fn queue_response(&mut self, bytes: &[u8]) {
        self.responses.extend(bytes);
    }

    /// Make every subsequent `open` fail with `kind`.
    pub fn fail_open(&mut self, kind: io::ErrorKind) {
        self.open_error = Some(kind);
    }

    /// Make `close` report an error after releasing the port.
    pub fn fail_close(&mut self) {
        self.close_error = true;
    }

    /// Pretend the port was left open by someone else.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Every frame passed to `write_all`, one entry per call.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Length requested by each `read_exact` call.
    pub fn reads(&self) -> &[usize] {
        &self.reads
    }

    pub fn open_count(&self) -> usize {
        self.opens
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    /// Queued response bytes that nobody read.
    pub fn pending(&self) -> usize {
        self.responses.len()
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotConnected, "mock port is not open"))
        }
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> io::Result<()> {
        self.opens += 1;
        if let Some(kind) = self.open_error {
            return Err(io::Error::new(kind, "mock open failure"));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes += 1;
        self.open = false;
        if self.close_error {
            return Err(io::Error::new(io::ErrorKind::Other, "mock close failure"));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.ensure_open()?;
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>> {
        self.ensure_open()?;
        self.reads.push(len);
        if self.responses.len() < len {
            let got = self.responses.len();
            self.responses.clear();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("read timed out after {got} of {len} bytes"),
            ));
        }
        Ok(self.responses.drain(..len).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_read_times_out_and_drops_bytes() {
        let mut mock = MockTransport::new();
        mock.open().unwrap();
        mock.queue_response(&[0x01]);
        let err = mock.read_exact(2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(mock.pending(), 0);
    }

    #[test]
    fn io_requires_open_port() {
        let mut mock = MockTransport::new();
        assert_eq!(mock.write_all(&[1]).unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert!(mock.written().is_empty());
        assert!(mock.reads().is_empty());
    }
}
