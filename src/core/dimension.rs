//! Target dimension vocabularies.
//!
//! Each dimension is a closed set of atomic values. Declarations may list
//! several values per dimension (the optimization list plays the role of a
//! flag union); expansion into atomic tuples happens once, in
//! `core::target`, and nothing downstream ever sees a combined value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GenError;

/// Operating system / architecture the generated projects build for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win32,
    Win64,
    Linux64,
    Mac64,
}

impl Platform {
    /// OS name used for output filename conventions.
    pub fn os(&self) -> &'static str {
        match self {
            Platform::Win32 | Platform::Win64 => "windows",
            Platform::Linux64 => "linux",
            Platform::Mac64 => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
            Platform::Linux64 => "linux64",
            Platform::Mac64 => "mac64",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Platform {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win32" => Ok(Platform::Win32),
            "win64" => Ok(Platform::Win64),
            "linux64" => Ok(Platform::Linux64),
            "mac64" => Ok(Platform::Mac64),
            other => Err(GenError::unknown_dimension("platform", other)),
        }
    }
}

/// Compiler / IDE toolchain the projects are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    #[serde(alias = "vs2019")]
    Msvc2019,
    #[serde(alias = "vs2022")]
    Msvc2022,
    Gcc,
    Clang,
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Toolchain::Msvc2019 => "msvc2019",
            Toolchain::Msvc2022 => "msvc2022",
            Toolchain::Gcc => "gcc",
            Toolchain::Clang => "clang",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Toolchain {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msvc2019" | "vs2019" => Ok(Toolchain::Msvc2019),
            "msvc2022" | "vs2022" => Ok(Toolchain::Msvc2022),
            "gcc" => Ok(Toolchain::Gcc),
            "clang" => Ok(Toolchain::Clang),
            other => Err(GenError::unknown_dimension("toolchain", other)),
        }
    }
}

/// Optimization profile.
///
/// Declarations list profiles together ("debug, release, retail"); each
/// listed profile expands into its own atomic target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimization {
    Debug,
    Release,
    Retail,
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Optimization::Debug => "debug",
            Optimization::Release => "release",
            Optimization::Retail => "retail",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Optimization {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Optimization::Debug),
            "release" => Ok(Optimization::Release),
            "retail" => Ok(Optimization::Retail),
            other => Err(GenError::unknown_dimension("optimization", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_display_parse() {
        for p in [
            Platform::Win32,
            Platform::Win64,
            Platform::Linux64,
            Platform::Mac64,
        ] {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
        for t in [
            Toolchain::Msvc2019,
            Toolchain::Msvc2022,
            Toolchain::Gcc,
            Toolchain::Clang,
        ] {
            assert_eq!(t.to_string().parse::<Toolchain>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_value_names_offender() {
        let err = "win128".parse::<Platform>().unwrap_err();
        assert!(err.to_string().contains("win128"));

        let err = "fastdebug".parse::<Optimization>().unwrap_err();
        assert!(err.to_string().contains("fastdebug"));
    }

    #[test]
    fn test_toolchain_ide_alias() {
        assert_eq!("vs2019".parse::<Toolchain>().unwrap(), Toolchain::Msvc2019);
    }
}
