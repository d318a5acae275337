//! RISC-V Privilege Modes.
//!
//! Privilege levels as they appear in interrupt-target descriptions, where each
//! level is written as a single letter (`M`, `S`, `U`).

use std::fmt;

/// RISC-V privilege mode levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeMode {
    /// User mode (U-mode).
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode).
    Machine = 3,
}

impl PrivilegeMode {
    /// Parses a privilege letter (`'M'`, `'S'`, or `'U'`).
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'U' => Some(Self::User),
            'S' => Some(Self::Supervisor),
            'M' => Some(Self::Machine),
            _ => None,
        }
    }

    /// Returns the single-letter form of the mode.
    pub fn letter(self) -> char {
        match self {
            Self::User => 'U',
            Self::Supervisor => 'S',
            Self::Machine => 'M',
        }
    }

    /// Returns the human-readable name of the privilege mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
