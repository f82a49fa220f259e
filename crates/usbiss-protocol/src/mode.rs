use serde::{Deserialize, Serialize};
use std::fmt;

/// I2C operating modes accepted by the set-mode command.
///
/// Software modes are bit-banged by the adapter firmware and work on any
/// pin pair; hardware modes use the on-chip I2C peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum I2cMode {
    #[serde(rename = "software_20k")]
    Software20k,
    #[serde(rename = "software_50k")]
    Software50k,
    #[serde(rename = "software_100k")]
    Software100k,
    #[serde(rename = "software_400k")]
    Software400k,
    #[default]
    #[serde(rename = "hardware_100k")]
    Hardware100k,
    #[serde(rename = "hardware_400k")]
    Hardware400k,
    #[serde(rename = "hardware_1000k")]
    Hardware1000k,
}

impl I2cMode {
    pub const ALL: [I2cMode; 7] = [
        I2cMode::Software20k,
        I2cMode::Software50k,
        I2cMode::Software100k,
        I2cMode::Software400k,
        I2cMode::Hardware100k,
        I2cMode::Hardware400k,
        I2cMode::Hardware1000k,
    ];

    pub fn as_byte(self) -> u8 {
        match self {
            I2cMode::Software20k => 0x20,
            I2cMode::Software50k => 0x30,
            I2cMode::Software100k => 0x40,
            I2cMode::Software400k => 0x50,
            I2cMode::Hardware100k => 0x60,
            I2cMode::Hardware400k => 0x70,
            I2cMode::Hardware1000k => 0x80,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_byte() == byte)
    }

    fn name(self) -> &'static str {
        match self {
            I2cMode::Software20k => "software_20k",
            I2cMode::Software50k => "software_50k",
            I2cMode::Software100k => "software_100k",
            I2cMode::Software400k => "software_400k",
            I2cMode::Hardware100k => "hardware_100k",
            I2cMode::Hardware400k => "hardware_400k",
            I2cMode::Hardware1000k => "hardware_1000k",
        }
    }
}

impl fmt::Display for I2cMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for I2cMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown I2C mode '{s}'"))
    }
}
