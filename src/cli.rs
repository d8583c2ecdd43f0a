//! Command-line surface.
//!
//! Mirrors the classic getopt interface `-v -d <device> -b <baud> -r|-t -s`,
//! including its quirks: repeated flags take the last value, `-r`/`-t` is
//! last-one-wins, and `-b` is parsed like `atoi`.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::settings::{DevicePath, Mode, Settings};
use clap::Parser;
use std::ffi::OsString;

/// Version printed in the usage banner.
pub const VERSION: &str = "1.0";

/// Command-line arguments.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "sertest",
    about = "Serial port throughput and data-integrity tester.",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    /// Enable verbose output
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Serial device path
    #[arg(short = 'd', value_name = "device", allow_hyphen_values = true)]
    pub device: Option<String>,

    /// Requested baud rate
    #[arg(
        short = 'b',
        value_name = "baud",
        allow_hyphen_values = true,
        value_parser = parse_baud
    )]
    pub baud: Option<i64>,

    /// Receive mode
    #[arg(short = 'r', overrides_with = "transmit")]
    pub receive: bool,

    /// Transmit mode
    #[arg(short = 't', overrides_with = "receive")]
    pub transmit: bool,

    /// Single character mode
    #[arg(short = 's')]
    pub single: bool,

    /// Print usage
    #[arg(short = 'h', short_alias = '?')]
    pub help: bool,
}

/// Parse an integer the way C `atoi` does: optional leading whitespace and
/// sign, then as many digits as are present. Anything else yields 0.
/// Out-of-range values saturate.
pub fn parse_baud(raw: &str) -> Result<i64, std::convert::Infallible> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }
    Ok(if negative { -value } else { value })
}

/// Usage text printed for `-h`, `-?` and invalid invocations.
pub fn usage(program: &str) -> String {
    format!(
        "sertest version {VERSION}\n\
         usage: ./{program} [-v] [-d device] [-b baud] -t|-r\n\
         \x20 -v enables verbose mode\n\
         \x20 -d <devicename> sets the serial device\n\
         \x20 -b <baud> sets the baud rate\n\
         \x20 -t sets mode to transmit\n\
         \x20 -r sets mode to receive\n\
         \x20 -s turns on single character mode"
    )
}

impl Args {
    /// Parse arguments, turning `-h`/`-?` and clap errors into
    /// [`AppError::Usage`].
    pub fn parse_from_args<I, T>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Self::try_parse_from(args).map_err(|e| {
            let message = e.to_string();
            let first = message.lines().next().unwrap_or_default().to_string();
            AppError::Usage(first)
        })?;

        if args.help {
            return Err(AppError::Usage(String::new()));
        }
        Ok(args)
    }

    pub fn mode(&self) -> Mode {
        if self.receive {
            Mode::Receive
        } else if self.transmit {
            Mode::Transmit
        } else {
            Mode::Unset
        }
    }

    /// Merge flags over configuration defaults into immutable settings.
    pub fn into_settings(self, config: &Config) -> AppResult<Settings> {
        let mode = self.mode();
        let device = DevicePath::new(self.device.unwrap_or_else(|| config.serial.device.clone()))?;

        Ok(Settings {
            verbose: self.verbose,
            device,
            baud_rate: self.baud.unwrap_or(config.serial.baud),
            mode,
            single_char: self.single,
            timing: config.run.timing(),
        })
    }
}
