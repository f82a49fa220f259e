use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;
use usbiss_protocol::I2cMode;

/// USB vendor and product id of the Devantech USB-ISS.
pub const USB_ISS_VID: u16 = 0x04D8;
pub const USB_ISS_PID: u16 = 0xFFEE;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(32);

/// Byte stream the adapter protocol runs over.
///
/// Reads and writes are all-or-nothing: a short read is an error, never a
/// partial result.
pub trait Transport {
    fn open(&mut self) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
    fn is_open(&self) -> bool;
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
    fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>>;

    /// Label used in log messages.
    fn name(&self) -> &str {
        "transport"
    }
}

#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl PortInfo {
    pub fn is_usb_iss(&self) -> bool {
        self.vid == Some(USB_ISS_VID) && self.pid == Some(USB_ISS_PID)
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (port_type, usb) = match info.port_type {
            SerialPortType::UsbPort(usb) => ("USB", Some(usb)),
            SerialPortType::PciPort => ("PCI", None),
            SerialPortType::BluetoothPort => ("Bluetooth", None),
            SerialPortType::Unknown => ("Unknown", None),
        };
        let mut port = Self {
            port_name: info.port_name,
            port_type: port_type.to_string(),
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        };
        if let Some(usb) = usb {
            port.vid = Some(usb.vid);
            port.pid = Some(usb.pid);
            port.serial_number = usb.serial_number;
            port.manufacturer = usb.manufacturer;
            port.product = usb.product;
        }
        port
    }
}

/// `name (VID:PID) manufacturer product, serial N` for USB ports,
/// `name (type)` otherwise.
impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(vid), Some(pid)) = (self.vid, self.pid) else {
            return write!(f, "{} ({})", self.port_name, self.port_type);
        };
        write!(f, "{} ({vid:04X}:{pid:04X})", self.port_name)?;
        for label in [&self.manufacturer, &self.product].into_iter().flatten() {
            write!(f, " {label}")?;
        }
        if let Some(serial) = &self.serial_number {
            write!(f, ", serial {serial}")?;
        }
        Ok(())
    }
}

/// Enumerate serial ports. Enumeration failures yield an empty list.
pub fn list_ports() -> Vec<PortInfo> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub port_name: String,
    /// Ignored by the CDC firmware but required to open the port.
    pub baud_rate: u32,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub mode: I2cMode,
}

impl AdapterConfig {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Default::default()
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 19_200,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            mode: I2cMode::default(),
        }
    }
}

/// [`Transport`] over a serial port opened through `serialport`.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    read_timeout: Duration,
    write_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(cfg: &AdapterConfig) -> Self {
        Self {
            port_name: cfg.port_name.clone(),
            baud_rate: cfg.baud_rate,
            read_timeout: cfg.read_timeout,
            write_timeout: cfg.write_timeout,
            port: None,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port is not open"))
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> io::Result<()> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.read_timeout)
            .open()?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        // The handle is released even when the final flush fails.
        if let Some(mut port) = self.port.take() {
            port.flush()?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let timeout = self.write_timeout;
        let port = self.port()?;
        port.set_timeout(timeout)?;
        port.write_all(data)?;
        port.flush()
    }

    fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let timeout = self.read_timeout;
        let port = self.port()?;
        port.set_timeout(timeout)?;
        let mut buf = vec![0u8; len];
        port.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn name(&self) -> &str {
        &self.port_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_32ms_timeouts() {
        let cfg = AdapterConfig::new("COM3");
        assert_eq!(cfg.port_name, "COM3");
        assert_eq!(cfg.read_timeout, Duration::from_millis(32));
        assert_eq!(cfg.write_timeout, Duration::from_millis(32));
        assert_eq!(cfg.mode, I2cMode::Hardware100k);
    }

    #[test]
    fn unopened_serial_transport_refuses_io() {
        let mut t = SerialTransport::new(&AdapterConfig::new("/dev/does-not-exist"));
        assert!(!t.is_open());
        assert_eq!(t.write_all(&[0x5A]).unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert_eq!(t.read_exact(1).unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert!(t.close().is_ok());
    }

    #[test]
    fn describes_usb_and_other_ports() {
        let usb = PortInfo {
            port_name: "/dev/ttyACM0".into(),
            port_type: "USB".into(),
            vid: Some(USB_ISS_VID),
            pid: Some(USB_ISS_PID),
            serial_number: Some("00012345".into()),
            manufacturer: Some("Devantech".into()),
            product: Some("USB-ISS".into()),
        };
        assert_eq!(usb.to_string(), "/dev/ttyACM0 (04D8:FFEE) Devantech USB-ISS, serial 00012345");

        let bare = PortInfo { manufacturer: None, product: None, serial_number: None, ..usb };
        assert_eq!(bare.to_string(), "/dev/ttyACM0 (04D8:FFEE)");

        let pci = PortInfo { port_type: "PCI".into(), vid: None, pid: None, ..bare };
        assert_eq!(pci.to_string(), "/dev/ttyACM0 (PCI)");
    }

    #[test]
    fn recognises_usb_iss_ids() {
        let mut info = PortInfo {
            port_name: "/dev/ttyACM0".into(),
            port_type: "USB".into(),
            vid: Some(USB_ISS_VID),
            pid: Some(USB_ISS_PID),
            serial_number: None,
            manufacturer: None,
            product: None,
        };
        assert!(info.is_usb_iss());
        info.pid = Some(0x000A);
        assert!(!info.is_usb_iss());
    }
}
