use crate::{Direction, FrameError, I2cAddress, I2cMode};

const ISS_CMD: u8 = 0x5A;
const ISS_VERSION: u8 = 0x01;
const ISS_MODE: u8 = 0x02;
const GET_SER_NUM: u8 = 0x03;
const I2C_AD1: u8 = 0x55;
const I2C_TEST: u8 = 0x58;

/// Largest payload a single register write can carry; the length travels
/// in one byte.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// One request to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    SetMode(I2cMode),
    GetVersion,
    GetSerialNumber,
    /// Write `payload` starting at `register` of a one-byte-addressed device.
    WriteRegister {
        address: I2cAddress,
        register: u8,
        payload: &'a [u8],
    },
    /// Read `count` bytes starting at `register`.
    ReadRegister {
        address: I2cAddress,
        register: u8,
        count: u8,
    },
    /// Check for an ACK at `address`.
    TestAddress(I2cAddress),
}

impl Command<'_> {
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let frame = match *self {
            Command::SetMode(mode) => vec![ISS_CMD, ISS_MODE, mode.as_byte()],
            Command::GetVersion => vec![ISS_CMD, ISS_VERSION],
            Command::GetSerialNumber => vec![ISS_CMD, GET_SER_NUM],
            Command::WriteRegister { address, register, payload } => {
                let len = u8::try_from(payload.len())
                    .map_err(|_| FrameError::PayloadTooLong(payload.len()))?;
                let mut frame = Vec::with_capacity(4 + payload.len());
                frame.extend_from_slice(&[
                    I2C_AD1,
                    address.wire_byte(Direction::Write),
                    register,
                    len,
                ]);
                frame.extend_from_slice(payload);
                frame
            }
            Command::ReadRegister { address, register, count } => {
                vec![I2C_AD1, address.wire_byte(Direction::Read), register, count]
            }
            Command::TestAddress(address) => vec![I2C_TEST, address.get()],
        };
        Ok(frame)
    }

    /// Number of bytes the adapter sends back for this request.
    pub fn response_len(&self) -> usize {
        match *self {
            Command::SetMode(_) => 2,
            Command::GetVersion => 3,
            Command::GetSerialNumber => 8,
            Command::WriteRegister { .. } | Command::TestAddress(_) => 1,
            Command::ReadRegister { count, .. } => count as usize,
        }
    }
}

/// Reply to [`Command::GetVersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub module_id: u8,
    pub firmware: u8,
    pub mode: u8,
}

impl ModuleInfo {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [module_id, firmware, mode] => Some(Self { module_id, firmware, mode }),
            _ => None,
        }
    }

    /// The operating mode, if it is one of the I2C modes.
    pub fn i2c_mode(&self) -> Option<I2cMode> {
        I2cMode::from_byte(self.mode)
    }
}

/// Decode the reply to [`Command::GetSerialNumber`].
pub fn parse_serial_number(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(raw: u8) -> I2cAddress {
        I2cAddress::new(raw).unwrap()
    }

    #[test]
    fn set_mode_default_frame() {
        let frame = Command::SetMode(I2cMode::default()).encode().unwrap();
        assert_eq!(frame, [0x5A, 0x02, 0x60]);
        let fast = Command::SetMode(I2cMode::Hardware400k).encode().unwrap();
        assert_eq!(fast, [0x5A, 0x02, 0x70]);
    }

    #[test]
    fn write_frame_with_payload() {
        let cmd = Command::WriteRegister {
            address: addr(0x39),
            register: 0x80,
            payload: &[0x03, 0x10],
        };
        assert_eq!(cmd.encode().unwrap(), [0x55, 0x72, 0x80, 0x02, 0x03, 0x10]);
        assert_eq!(cmd.response_len(), 1);
    }

    #[test]
    fn write_frame_without_payload() {
        let cmd = Command::WriteRegister { address: addr(0x39), register: 0x80, payload: &[] };
        assert_eq!(cmd.encode().unwrap(), [0x55, 0x72, 0x80, 0x00]);
    }

    #[test]
    fn write_payload_limit() {
        let max = vec![0xAA; MAX_PAYLOAD];
        let cmd = Command::WriteRegister { address: addr(0x10), register: 0, payload: &max };
        let frame = cmd.encode().unwrap();
        assert_eq!(frame.len(), 4 + MAX_PAYLOAD);
        assert_eq!(frame[3], 0xFF);

        let over = vec![0xAA; MAX_PAYLOAD + 1];
        let cmd = Command::WriteRegister { address: addr(0x10), register: 0, payload: &over };
        assert_eq!(cmd.encode(), Err(FrameError::PayloadTooLong(256)));
    }

    #[test]
    fn read_frame_sets_direction_bit() {
        let cmd = Command::ReadRegister { address: addr(0x39), register: 0x92, count: 4 };
        assert_eq!(cmd.encode().unwrap(), [0x55, 0x73, 0x92, 0x04]);
        assert_eq!(cmd.response_len(), 4);

        let empty = Command::ReadRegister { address: addr(0x39), register: 0x92, count: 0 };
        assert_eq!(empty.response_len(), 0);
    }

    #[test]
    fn test_address_sends_raw_address() {
        let cmd = Command::TestAddress(addr(0x48));
        assert_eq!(cmd.encode().unwrap(), [0x58, 0x48]);
        assert_eq!(cmd.response_len(), 1);
    }

    #[test]
    fn module_queries() {
        assert_eq!(Command::GetVersion.encode().unwrap(), [0x5A, 0x01]);
        assert_eq!(Command::GetVersion.response_len(), 3);
        assert_eq!(Command::GetSerialNumber.encode().unwrap(), [0x5A, 0x03]);
        assert_eq!(Command::GetSerialNumber.response_len(), 8);
    }

    #[test]
    fn module_info_parsing() {
        let info = ModuleInfo::parse(&[0x07, 0x09, 0x60]).unwrap();
        assert_eq!(info.module_id, 0x07);
        assert_eq!(info.firmware, 0x09);
        assert_eq!(info.i2c_mode(), Some(I2cMode::Hardware100k));
        assert_eq!(ModuleInfo::parse(&[0x07, 0x09]), None);
    }

    #[test]
    fn serial_number_is_trimmed() {
        assert_eq!(parse_serial_number(b"00001234"), "00001234");
        assert_eq!(parse_serial_number(b"  42\0\0\0\0"), "42");
    }
}
