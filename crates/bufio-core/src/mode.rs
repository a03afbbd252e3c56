//! Access modes for descriptor-backed sources.
//!
//! Mode strings follow the familiar `fopen` shape: one of `r`, `w`, `a`,
//! optionally followed by `b` (ignored, all streams are binary) and/or `+`
//! (read and write).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenMode {
    pub const READ_ONLY: OpenMode = OpenMode {
        read: true,
        write: false,
        append: false,
        create: false,
        truncate: false,
    };

    /// Parse a mode string such as `"r"`, `"w+"` or `"ab"`.
    pub fn parse(mode: &str) -> Result<Self> {
        let illegal = || Error::Argument(format!("illegal access mode {mode}"));

        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => Self::READ_ONLY,
            Some('w') => OpenMode {
                read: false,
                write: true,
                append: false,
                create: true,
                truncate: true,
            },
            Some('a') => OpenMode {
                read: false,
                write: true,
                append: true,
                create: true,
                truncate: false,
            },
            _ => return Err(illegal()),
        };

        for c in chars {
            match c {
                'b' => {}
                '+' => {
                    parsed.read = true;
                    parsed.write = true;
                }
                _ => return Err(illegal()),
            }
        }
        Ok(parsed)
    }

    pub fn is_readable(&self) -> bool {
        self.read
    }

    pub fn is_writable(&self) -> bool {
        self.write
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self::READ_ONLY
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
