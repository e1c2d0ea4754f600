//! # Target Operating Systems
//!
//! Build commands carry an OS pattern: empty, the wildcard `any`, or a
//! whitespace-separated list of OS identifiers. This module models the
//! identifiers as a closed set and decides, as a pure function of the pattern
//! and a target OS, how many times a command applies. Host detection is kept
//! apart so the matching rule can be tested for any target.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The wildcard token that matches every target.
pub const ANY: &str = "any";

/// Operating systems a build command can be tagged with.
///
/// Identifiers follow the names used by Go's `runtime.GOOS`, which is what
/// existing descriptors are written against; `macos` is accepted as an alias
/// for `darwin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOs {
    Linux,
    Windows,
    Darwin,
    FreeBsd,
    NetBsd,
    OpenBsd,
    Android,
    Ios,
}

impl TargetOs {
    pub const ALL: [TargetOs; 8] = [
        TargetOs::Linux,
        TargetOs::Windows,
        TargetOs::Darwin,
        TargetOs::FreeBsd,
        TargetOs::NetBsd,
        TargetOs::OpenBsd,
        TargetOs::Android,
        TargetOs::Ios,
    ];

    /// Canonical identifier as written in descriptors.
    pub fn identifier(self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Windows => "windows",
            TargetOs::Darwin => "darwin",
            TargetOs::FreeBsd => "freebsd",
            TargetOs::NetBsd => "netbsd",
            TargetOs::OpenBsd => "openbsd",
            TargetOs::Android => "android",
            TargetOs::Ios => "ios",
        }
    }

    /// Look up an identifier, case-insensitively.
    pub fn from_identifier(id: &str) -> Option<Self> {
        let id = id.to_ascii_lowercase();
        if id == "macos" {
            return Some(TargetOs::Darwin);
        }
        Self::ALL.into_iter().find(|os| os.identifier() == id)
    }

    /// The operating system this binary was compiled for.
    pub fn host() -> Result<Self, Error> {
        std::env::consts::OS.parse()
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for TargetOs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| Error::UnsupportedOs(s.to_string()))
    }
}

/// A single token of an OS pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsTag {
    Any,
    Os(TargetOs),
}

impl OsTag {
    /// Unknown identifiers yield `None` and never match.
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case(ANY) {
            Some(OsTag::Any)
        } else {
            TargetOs::from_identifier(token).map(OsTag::Os)
        }
    }

    pub fn matches(self, target: TargetOs) -> bool {
        match self {
            OsTag::Any => true,
            OsTag::Os(os) => os == target,
        }
    }
}

/// Number of times a command with `pattern` runs on `target`.
///
/// Each token equal to the target or to `any` counts once; an empty pattern
/// counts as a single `any`.
pub fn applicable_runs(pattern: &str, target: TargetOs) -> usize {
    let mut tokens = pattern.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return 1;
    }
    tokens
        .filter_map(OsTag::parse)
        .filter(|tag| tag.matches(target))
        .count()
}

/// Whether a command with `pattern` runs at all on `target`.
pub fn applies(pattern: &str, target: TargetOs) -> bool {
    applicable_runs(pattern, target) > 0
}
