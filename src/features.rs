//! Feature helpers
//!
//! One-shot commands layered on the session: fixed `consolefeatures`
//! operations of the call agent plus a few plain debug-monitor commands.

use std::fmt::Write;

use crate::error::{Result, RpcError};
use crate::network::Session;
use crate::rpc::{checked_exchange, payload, string_payload, ReturnKind, JRPC_VERSION};

/// Operation codes the call agent understands besides plain calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
enum Feature {
    ResolveFunction = 9,
    CpuKey = 10,
    Shutdown = 11,
    Notify = 12,
    KernelVersion = 13,
    SetLeds = 14,
    Temperature = 15,
    TitleId = 16,
    ConsoleType = 17,
    ConstantMemorySet = 18,
}

/// Unit of a feature command's `params`
enum FeatureArg<'a> {
    Int(i64),
    Str(&'a str),
}

/// Front-panel ring light colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LedState {
    Off = 0x00,
    Red = 0x08,
    Green = 0x80,
    Orange = 0x88,
}

/// Temperature sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TemperatureKind {
    Cpu = 0,
    Gpu = 1,
    Edram = 2,
    Motherboard = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootKind {
    Cold,
    Warm,
}

/// Icon shown next to an on-screen notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyLogo(pub u32);

impl NotifyLogo {
    pub const XBOX_LOGO: NotifyLogo = NotifyLogo(0);
    pub const NEW_MESSAGE: NotifyLogo = NotifyLogo(3);
    pub const ACHIEVEMENT_UNLOCKED: NotifyLogo = NotifyLogo(27);
    pub const READY_TO_PLAY: NotifyLogo = NotifyLogo(31);
    pub const FLASHING_XBOX_CONSOLE: NotifyLogo = NotifyLogo(34);
    pub const DEVICE_FULL: NotifyLogo = NotifyLogo(36);
    pub const UPDATING: NotifyLogo = NotifyLogo(76);
}

impl Default for NotifyLogo {
    fn default() -> Self {
        NotifyLogo::FLASHING_XBOX_CONSOLE
    }
}

/// Render a feature command line
///
/// Strings use the string tag with their character count and the low
/// byte of each character; integers use the int tag with decimal text.
fn feature_command(feature: Feature, address: u32, args: &[FeatureArg<'_>]) -> String {
    let mut line = format!(
        "consolefeatures ver={} type={} params=\"A\\{:X}\\A\\{}\\",
        JRPC_VERSION,
        feature as u32,
        address,
        args.len()
    );
    for arg in args {
        let _ = match arg {
            FeatureArg::Int(v) => write!(line, "{}\\{}\\", ReturnKind::Int.code(), v),
            FeatureArg::Str(s) => {
                let (len, payload) = string_payload(s);
                write!(line, "{}/{}\\{}\\", ReturnKind::String.code(), len, payload)
            }
        };
    }
    line.push('"');
    line
}

fn parse_hex_u32(text: &str) -> Result<u32> {
    u32::from_str_radix(text.trim(), 16)
        .map_err(|_| RpcError::DecodeMismatch(format!("expected hex, got {:?}", text.trim())))
}

/// Drop a leading `200- ` style status prefix
fn strip_status(line: &str) -> &str {
    let s = line.trim();
    match s.find("- ") {
        Some(pos) if s[..pos].chars().all(|c| c.is_ascii_digit()) => s[pos + 2..].trim(),
        _ => s,
    }
}

impl Session {
    fn feature(&self, feature: Feature, address: u32, args: &[FeatureArg<'_>]) -> Result<String> {
        let command = feature_command(feature, address, args);
        let text = checked_exchange(&mut self.lock(), &command)?;
        Ok(payload(&text).to_string())
    }

    /// Send a plain command; a 4xx/5xx status becomes a protocol error
    fn plain(&self, command: &str) -> Result<String> {
        let response = self.send_command(command)?;
        match response.status_code() {
            Some(code) if code >= 400 => Err(RpcError::Protocol(response.status)),
            _ => Ok(response.text()),
        }
    }

    // =========================================================================
    // Call Agent Features
    // =========================================================================

    /// Address of export `ordinal` in `module`
    pub fn resolve_function(&self, module: &str, ordinal: u32) -> Result<u32> {
        let text = self.feature(
            Feature::ResolveFunction,
            0,
            &[FeatureArg::Str(module), FeatureArg::Int(ordinal as i64)],
        )?;
        parse_hex_u32(&text)
    }

    pub fn cpu_key(&self) -> Result<String> {
        self.feature(Feature::CpuKey, 0, &[])
    }

    /// Power the target off; the link drops, so failures are ignored
    pub fn shutdown(&self) {
        if let Err(e) = self.feature(Feature::Shutdown, 0, &[]) {
            tracing::debug!("Shutdown ended with {}", e);
        }
    }

    /// Show an on-screen notification
    pub fn notify(&self, logo: NotifyLogo, text: &str) -> Result<()> {
        self.feature(
            Feature::Notify,
            0,
            &[FeatureArg::Str(text), FeatureArg::Int(logo.0 as i64)],
        )
        .map(|_| ())
    }

    pub fn kernel_version(&self) -> Result<u64> {
        let text = self.feature(Feature::KernelVersion, 0, &[])?;
        text.trim().parse().map_err(|_| {
            RpcError::DecodeMismatch(format!("expected kernel version, got {:?}", text.trim()))
        })
    }

    /// Set the four ring lights: top-left, top-right, bottom-left, bottom-right
    pub fn set_leds(&self, leds: [LedState; 4]) -> Result<()> {
        let args = leds.map(|led| FeatureArg::Int(led as i64));
        self.feature(Feature::SetLeds, 0, &args).map(|_| ())
    }

    pub fn temperature(&self, kind: TemperatureKind) -> Result<u32> {
        let text = self.feature(Feature::Temperature, 0, &[FeatureArg::Int(kind as i64)])?;
        parse_hex_u32(&text)
    }

    /// Id of the running title
    pub fn title_id(&self) -> Result<u32> {
        let text = self.feature(Feature::TitleId, 0, &[])?;
        parse_hex_u32(&text)
    }

    pub fn console_type(&self) -> Result<String> {
        self.feature(Feature::ConsoleType, 0, &[])
    }

    /// Have the agent keep writing `value` to `address`
    ///
    /// With `condition`, only while the word there equals it; with
    /// `title_id`, only while that title runs.
    pub fn constant_memory_set(
        &self,
        address: u32,
        value: u32,
        condition: Option<u32>,
        title_id: Option<u32>,
    ) -> Result<()> {
        let args = [
            FeatureArg::Int(value as i32 as i64),
            FeatureArg::Int(condition.is_some() as i64),
            FeatureArg::Int(condition.unwrap_or(0) as i64),
            FeatureArg::Int(title_id.is_some() as i64),
            FeatureArg::Int(title_id.unwrap_or(0) as i32 as i64),
        ];
        self.feature(Feature::ConstantMemorySet, address, &args).map(|_| ())
    }

    // =========================================================================
    // Debug Monitor Commands
    // =========================================================================

    pub fn dm_version(&self) -> Result<String> {
        Ok(strip_status(&self.plain("dmversion")?).to_string())
    }

    pub fn console_id(&self) -> Result<String> {
        let text = self.plain("getconsoleid")?;
        let s = strip_status(&text);
        Ok(s.strip_prefix("consoleid=").unwrap_or(s).trim().to_string())
    }

    pub fn reboot(&self, kind: RebootKind) -> Result<()> {
        let command = match kind {
            RebootKind::Cold => "magicboot cold",
            RebootKind::Warm => "magicboot warm",
        };
        self.plain(command).map(|_| ())
    }

    /// Resume (`true`) or freeze (`false`) execution on the target
    pub fn set_running(&self, running: bool) -> Result<()> {
        self.plain(if running { "go" } else { "stop" }).map(|_| ())
    }
}
