//! Platform profiles.
//!
//! A [`PlatformProfile`] is the resolved, immutable description of one staging
//! run: where assets come from, where they go, which categories are enabled
//! and whether a payload manifest is produced.

pub mod resolver;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::catalog::CategorySet;
use crate::extras::ExtrasSource;
use crate::sync::{CategoryRule, SyncPlan};

pub use resolver::resolve;

/// Top-level asset directory mirrored by the category pass.
pub const ASSET_DATA_DIR: &str = "ba_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinArch {
    Win32,
    X64,
}

impl WinArch {
    pub fn as_str(self) -> &'static str {
        match self {
            WinArch::Win32 => "Win32",
            WinArch::X64 => "x64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Cmake,
    CmakeServer,
    Windows(WinArch),
    WindowsServer(WinArch),
    XcodeMac,
    XcodeIos,
}

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::Android,
        Platform::Cmake,
        Platform::CmakeServer,
        Platform::Windows(WinArch::Win32),
        Platform::Windows(WinArch::X64),
        Platform::WindowsServer(WinArch::Win32),
        Platform::WindowsServer(WinArch::X64),
        Platform::XcodeMac,
        Platform::XcodeIos,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Cmake => "cmake",
            Platform::CmakeServer => "cmakeserver",
            Platform::Windows(WinArch::Win32) => "win-Win32",
            Platform::Windows(WinArch::X64) => "win-x64",
            Platform::WindowsServer(WinArch::Win32) => "winserver-Win32",
            Platform::WindowsServer(WinArch::X64) => "winserver-x64",
            Platform::XcodeMac => "xcode-mac",
            Platform::XcodeIos => "xcode-ios",
        }
    }

    pub fn is_server(self) -> bool {
        matches!(self, Platform::CmakeServer | Platform::WindowsServer(_))
    }

    pub fn win_arch(self) -> Option<WinArch> {
        match self {
            Platform::Windows(arch) | Platform::WindowsServer(arch) => Some(arch),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.selector())
    }
}

impl FromStr for Platform {
    type Err = ();

    /// Accepts selectors with or without a leading dash (`-android`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('-').unwrap_or(s);
        Platform::ALL
            .into_iter()
            .find(|p| p.selector() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub categories: CategorySet,
    pub texture_suffix: Option<String>,
    pub extras: Option<ExtrasSource>,
    pub wants_manifest: bool,
    pub manifest_is_full: bool,
}

impl PlatformProfile {
    pub fn category_source(&self) -> PathBuf {
        self.source_root.join(ASSET_DATA_DIR)
    }

    pub fn category_destination(&self) -> PathBuf {
        self.destination_root.join(ASSET_DATA_DIR)
    }

    pub fn category_rule(&self) -> CategoryRule {
        CategoryRule::new(self.categories, self.texture_suffix.as_deref())
    }

    /// Mirror plan for the main category pass.
    pub fn category_plan(&self) -> SyncPlan {
        SyncPlan::new(
            self.category_source(),
            self.category_destination(),
            self.category_rule(),
        )
    }

    pub fn destination(&self) -> &Path {
        &self.destination_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_parse_with_or_without_dash() {
        for platform in Platform::ALL {
            assert_eq!(platform.selector().parse::<Platform>(), Ok(platform));
            assert_eq!(
                format!("-{}", platform.selector()).parse::<Platform>(),
                Ok(platform)
            );
        }
        assert!("win-arm64".parse::<Platform>().is_err());
        assert!("--android".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_traits() {
        assert!(Platform::CmakeServer.is_server());
        assert!(Platform::WindowsServer(WinArch::X64).is_server());
        assert!(!Platform::Windows(WinArch::X64).is_server());
        assert_eq!(
            Platform::WindowsServer(WinArch::Win32).win_arch(),
            Some(WinArch::Win32)
        );
        assert_eq!(Platform::Android.win_arch(), None);
    }
}
