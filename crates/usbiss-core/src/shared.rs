use crate::adapter::Adapter;
use crate::error::Result;
use crate::transport::{SerialTransport, Transport};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// A cloneable handle that serializes access to one [`Adapter`].
///
/// Each call holds the lock for the full request/response round trip, so
/// frames from different threads never interleave on the wire. Use
/// [`SharedAdapter::lock`] to keep the bus for a sequence of transactions.
pub struct SharedAdapter<T: Transport = SerialTransport> {
    inner: Arc<Mutex<Adapter<T>>>,
}

impl<T: Transport> Clone for SharedAdapter<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Transport> SharedAdapter<T> {
    pub fn new(adapter: Adapter<T>) -> Self {
        Self { inner: Arc::new(Mutex::new(adapter)) }
    }

    pub fn lock(&self) -> MutexGuard<'_, Adapter<T>> {
        self.inner.lock()
    }

    pub fn open(&self) -> Result<()> {
        self.inner.lock().open()
    }

    pub fn close(&self) {
        self.inner.lock().close();
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().is_ready()
    }

    pub fn write(&self, address: u8, register: u8, payload: &[u8]) -> Result<u8> {
        self.inner.lock().write(address, register, payload)
    }

    pub fn read(&self, address: u8, register: u8, count: u8) -> Result<Vec<u8>> {
        self.inner.lock().read(address, register, count)
    }

    pub fn validate_address(&self, address: u8) -> Result<bool> {
        self.inner.lock().validate_address(address)
    }
}

impl<T: Transport> From<Adapter<T>> for SharedAdapter<T> {
    fn from(adapter: Adapter<T>) -> Self {
        Self::new(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::thread;

    #[test]
    fn concurrent_reads_keep_frames_whole() {
        let mut mock = MockTransport::new();
        mock.queue_response(&[0x01, 0x00]);
        mock.queue_response(&[0xAA, 0xAA, 0xBB, 0xBB]);
        let shared = SharedAdapter::new(Adapter::with_transport(mock));
        shared.open().unwrap();

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || shared.read(0x39, i, 2).unwrap())
            })
            .collect();
        let mut results: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort();
        assert_eq!(results, [vec![0xAA, 0xAA], vec![0xBB, 0xBB]]);

        let guard = shared.lock();
        assert_eq!(guard.transport().written().len(), 3);
        assert_eq!(guard.transport().reads(), &[2, 2, 2]);
    }

    #[test]
    fn close_through_any_clone() {
        let mut mock = MockTransport::new();
        mock.queue_response(&[0x01, 0x00]);
        let shared: SharedAdapter<_> = Adapter::with_transport(mock).into();
        let other = shared.clone();
        shared.open().unwrap();
        assert!(other.is_ready());
        other.close();
        assert!(!shared.is_ready());
        assert!(matches!(shared.validate_address(0x10), Err(crate::Error::NotReady)));
    }
}
