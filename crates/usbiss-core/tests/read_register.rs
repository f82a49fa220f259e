use usbiss_core::mock::MockTransport;
use usbiss_core::{Adapter, AdapterConfig, Error, State, Transport};

#[test]
fn open_read_close() {
    let mut mock = MockTransport::new();
    mock.queue_response(&[0x01, 0x00]);
    mock.queue_response(&[0xAB]);

    let mut adapter = Adapter::with_transport(mock);
    assert_eq!(adapter.state(), State::Closed);

    adapter.open().unwrap();
    assert!(adapter.is_ready());

    let bytes = adapter.read(0x39, 0x92, 1).unwrap();
    assert_eq!(bytes, [0xAB]);

    adapter.close();
    assert!(!adapter.is_ready());
    assert!(!adapter.transport().is_open());
    assert_eq!(
        adapter.transport().written(),
        &[vec![0x5A, 0x02, 0x60], vec![0x55, 0x73, 0x92, 0x01]]
    );
}

#[test]
fn reopen_after_close() {
    let mut mock = MockTransport::new();
    mock.queue_response(&[0x01, 0x00, 0x01, 0x00, 0x01]);
    let mut adapter = Adapter::with_transport(mock);

    adapter.open().unwrap();
    adapter.close();
    assert!(matches!(adapter.write(0x20, 0x00, &[0xFF]), Err(Error::NotReady)));

    adapter.open().unwrap();
    assert_eq!(adapter.write(0x20, 0x00, &[0xFF]).unwrap(), 0x01);
    assert_eq!(adapter.transport().open_count(), 2);
}

#[test]
fn missing_serial_port_fails_to_open() {
    let mut adapter = Adapter::with_config(AdapterConfig::new("/dev/usbiss-test-no-such-port"));
    assert!(matches!(adapter.open(), Err(Error::Transport(_))));
    assert!(!adapter.is_ready());
    adapter.close();
}
