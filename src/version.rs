use crate::weak_error;
use once_cell::sync;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Gdb version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(pub (u32, u32, u32));

impl Version {
    /// First version with `-gdb-set mi-async`.
    pub const MIN_SUPPORTED: Version = Version((7, 8, 0));

    /// Parse gdb version from the first line of `gdb --version` output like:
    /// "GNU gdb (Ubuntu 12.1-0ubuntu1~22.04) 12.1" or "GNU gdb (GDB) 14.2".
    pub fn gdb_parse(s: &str) -> Option<Self> {
        static V_RE: sync::Lazy<Regex> =
            sync::Lazy::new(|| Regex::new(r"(\d+)\.(\d+)").expect("must compile"));

        let line = s.lines().find(|l| l.starts_with("GNU gdb"))?;
        let (_, [major, minor]) = V_RE.captures_iter(line).last()?.extract();
        let major = weak_error!(major.parse::<u32>())?;
        let minor = weak_error!(minor.parse::<u32>())?;
        Some(Version((major, minor, 0)))
    }

    pub fn is_supported(&self) -> bool {
        *self >= Self::MIN_SUPPORTED
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (major, minor, patch) = self.0;
        write!(f, "{major}.{minor}.{patch}")
    }
}
