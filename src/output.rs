//! # Output Configuration
//!
//! User-facing progress lines of the `cpm` binary (the banner, the final
//! timing line, failure markers) go through this module so they honour the
//! user's colour preferences. Diagnostic detail goes through `log` instead.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cpm::output::{emoji, ColorWhen, OutputConfig};
//!
//! let config = OutputConfig::new(ColorWhen::Auto);
//! println!("{} Fetching...", emoji(&config, "📥", "[FETCH]"));
//! ```

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorWhen {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorWhen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!(
                "unknown color mode '{}' (expected auto, always or never)",
                other
            )),
        }
    }
}

impl fmt::Display for ColorWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        })
    }
}

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// `Always` and `Never` are final; `Auto` consults the environment first
    /// and the terminal last.
    pub fn new(when: ColorWhen) -> Self {
        let use_color = match when {
            ColorWhen::Always => true,
            ColorWhen::Never => false,
            ColorWhen::Auto => color_from_env(|key| env::var_os(key))
                .unwrap_or_else(|| console::Term::stdout().features().colors_supported()),
        };
        Self { use_color }
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorWhen::Auto)
    }
}

/// Colour decision forced by the conventional variables, if any.
///
/// `NO_COLOR` (even empty) wins, then `CLICOLOR_FORCE`, then `CLICOLOR=0`
/// and `TERM=dumb`. `None` leaves the decision to terminal detection.
fn color_from_env(lookup: impl Fn(&str) -> Option<OsString>) -> Option<bool> {
    if lookup("NO_COLOR").is_some() {
        return Some(false);
    }
    let is = |key: &str, value: &str| lookup(key).is_some_and(|v| v == value);
    let forced = lookup("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0");
    if forced {
        Some(true)
    } else if is("CLICOLOR", "0") || is("TERM", "dumb") {
        Some(false)
    } else {
        None
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Format a run duration rounded to a tenth of a millisecond.
pub fn format_elapsed(elapsed: Duration) -> String {
    let tenths_of_ms = (elapsed.as_micros() + 50) / 100;
    let ms = tenths_of_ms as f64 / 10.0;
    if ms >= 1000.0 {
        format!("{:.4}s", ms / 1000.0)
    } else {
        format!("{:.1}ms", ms)
    }
}
