mod settings;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use settings::Settings;
use std::path::PathBuf;
use usbiss_core::{list_ports, Adapter, I2cMode};

#[derive(Debug, Parser)]
#[command(name = "usbiss", version, about = "Talk to I2C devices through a USB-ISS adapter")]
struct Cli {
    /// Serial port of the adapter, e.g. /dev/ttyACM0 or COM3
    #[arg(short, long, global = true)]
    port: Option<String>,

    #[arg(long, global = true)]
    read_timeout_ms: Option<u64>,

    #[arg(long, global = true)]
    write_timeout_ms: Option<u64>,

    /// I2C mode, e.g. hardware_100k or software_400k
    #[arg(long, global = true)]
    mode: Option<I2cMode>,

    /// Print every frame exchanged with the adapter
    #[arg(long, global = true)]
    trace: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// List serial ports; USB-ISS adapters are marked with '*'
    Ports,
    /// Store port, timeouts and mode as defaults
    Save,
    #[command(flatten)]
    Bus(BusCmd),
}

/// Commands that need an open adapter.
#[derive(Debug, Subcommand)]
enum BusCmd {
    /// Show module id, firmware, mode and serial number
    Info,
    /// Check whether a device acknowledges an address
    Probe {
        #[arg(value_parser = parse_byte)]
        address: u8,
    },
    /// Read bytes from a register
    Read {
        #[arg(value_parser = parse_byte)]
        address: u8,
        #[arg(value_parser = parse_byte)]
        register: u8,
        #[arg(value_parser = parse_byte, default_value = "1")]
        count: u8,
    },
    /// Write hex bytes to a register
    Write {
        #[arg(value_parser = parse_byte)]
        address: u8,
        #[arg(value_parser = parse_byte)]
        register: u8,
        /// Payload as hex, e.g. "03 10" or 0310
        payload: Option<String>,
    },
}

/// Accept decimal or 0x-prefixed hex.
fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}' is not a byte value: {e}"))
}

fn parse_payload(s: &str) -> Result<Vec<u8>> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits).with_context(|| format!("invalid hex payload '{s}'"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.config.clone().or_else(Settings::default_path);
    let mut settings = match &path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(ms) = cli.read_timeout_ms {
        settings.read_timeout_ms = ms;
    }
    if let Some(ms) = cli.write_timeout_ms {
        settings.write_timeout_ms = ms;
    }
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    log::debug!("effective settings: {settings:?}");

    match cli.command {
        Cmd::Ports => {
            print_ports();
            Ok(())
        }
        Cmd::Save => {
            let path = path.context("no user config directory; pass --config")?;
            settings.save(&path)?;
            println!("saved {}", path.display());
            Ok(())
        }
        Cmd::Bus(cmd) => run_on_adapter(&settings, cli.trace, cmd),
    }
}

fn print_ports() {
    let ports = list_ports();
    if ports.is_empty() {
        println!("no serial ports found");
    }
    for p in ports {
        let marker = if p.is_usb_iss() { '*' } else { ' ' };
        println!("{marker} {p}");
    }
}

fn run_on_adapter(settings: &Settings, trace: bool, cmd: BusCmd) -> Result<()> {
    let cfg = settings.adapter_config()?;
    let port = cfg.port_name.clone();
    let mut adapter = Adapter::with_config(cfg);
    if trace {
        adapter.enable_trace(256);
    }
    adapter
        .open()
        .with_context(|| format!("could not initialize adapter on {port}; wrong port?"))?;

    let result = run_command(&mut adapter, cmd);
    adapter.close();

    if let Some(log) = adapter.trace() {
        eprint!("{}", log.to_hex_text(true));
    }
    result
}

fn run_command(adapter: &mut Adapter, cmd: BusCmd) -> Result<()> {
    match cmd {
        BusCmd::Info => {
            let info = adapter.module_info()?;
            let serial = adapter.serial_number()?;
            println!("module id: 0x{:02X}", info.module_id);
            println!("firmware:  0x{:02X}", info.firmware);
            match info.i2c_mode() {
                Some(mode) => println!("mode:      {mode}"),
                None => println!("mode:      0x{:02X}", info.mode),
            }
            println!("serial:    {serial}");
        }
        BusCmd::Probe { address } => {
            let present = adapter.validate_address(address)?;
            let state = if present { "present" } else { "absent" };
            println!("0x{address:02X}: {state}");
        }
        BusCmd::Read { address, register, count } => {
            let bytes = adapter.read(address, register, count).with_context(|| {
                format!("reading {count} bytes from 0x{address:02X}/0x{register:02X}")
            })?;
            println!("{}", hex::encode_upper(bytes));
        }
        BusCmd::Write { address, register, payload } => {
            let payload = match payload {
                Some(p) => parse_payload(&p)?,
                None => Vec::new(),
            };
            let status = adapter.write(address, register, &payload)?;
            if status == 0 {
                bail!("adapter reported a failed write to 0x{address:02X}/0x{register:02X}");
            }
            println!("ok (status 0x{status:02X})");
        }
    }
    Ok(())
}
