use crate::debugger::address::Address;
use crate::debugger::error::Error;
use crate::debugger::path::PathTranslator;
use strum_macros::{Display, EnumString};

/// Ignore count that makes gdb pass a countpoint without stopping.
const COUNTPOINT_IGNORE_COUNT: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakMode {
    #[default]
    Breakpoint,
    Countpoint,
    Watchpoint,
}

impl BreakMode {
    /// Map gdb breakpoint `type` field.
    pub fn from_mi(kind: &str) -> Self {
        match kind {
            "countpoint" => BreakMode::Countpoint,
            k if k.contains("watchpoint") => BreakMode::Watchpoint,
            _ => BreakMode::Breakpoint,
        }
    }
}

/// What happens with a breakpoint after it is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
pub enum Disposition {
    #[default]
    #[strum(serialize = "keep")]
    Keep,
    #[strum(serialize = "dis")]
    Disable,
    #[strum(serialize = "del")]
    DeleteNextHit,
    #[strum(serialize = "dstp")]
    DeleteNextStop,
}

impl Disposition {
    /// Map gdb `disp` field, unknown values are treated as [`Disposition::Keep`].
    pub fn from_mi(disp: &str) -> Self {
        disp.parse().unwrap_or_default()
    }
}

/// Breakpoint property that caller may ask to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BreakpointChange {
    Enabled,
    Condition,
    Count,
}

/// Breakpoint as known by gdb.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Breakpoint {
    /// Gdb breakpoint number, [`None`] until gdb creates the breakpoint.
    pub id: Option<String>,
    pub mode: BreakMode,
    pub disposition: Disposition,
    pub enabled: bool,
    pub address: Address,
    pub function: Option<String>,
    pub file: Option<String>,
    /// 1-based line, 0 if unknown.
    pub line: u32,
    /// Hit count.
    pub count: u64,
    pub thread: Option<String>,
    pub condition: Option<String>,
}

impl Breakpoint {
    pub fn at_line(file: impl Into<String>, line: u32) -> Self {
        Self {
            enabled: true,
            file: Some(file.into()),
            line,
            ..Self::default()
        }
    }

    pub fn at_function(file: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            enabled: true,
            file: Some(file.into()),
            function: Some(function.into()),
            ..Self::default()
        }
    }

    pub fn at_address(address: Address) -> Self {
        Self {
            enabled: true,
            address,
            ..Self::default()
        }
    }

    pub fn with_condition(self, condition: impl Into<String>) -> Self {
        Self {
            condition: Some(condition.into()),
            ..self
        }
    }

    pub fn with_thread(self, thread: impl Into<String>) -> Self {
        Self {
            thread: Some(thread.into()),
            ..self
        }
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Build `-break-insert` command for this breakpoint.
    ///
    /// A countpoint never stops the debugee, it is a breakpoint gdb ignores
    /// for as long as it can and only counts the hits.
    pub(crate) fn insert_command(&self, translator: &PathTranslator) -> Result<String, Error> {
        let mut command = String::from("-break-insert");

        if !self.enabled {
            command.push_str(" -d");
        }
        if self.mode == BreakMode::Countpoint {
            command.push_str(&format!(" -i {COUNTPOINT_IGNORE_COUNT}"));
        }
        if let Some(condition) = &self.condition {
            command.push_str(" -c ");
            command.push_str(&quote(condition));
        }
        if let Some(thread) = &self.thread {
            command.push_str(" -p ");
            command.push_str(&quote(thread));
        }

        let file = self
            .file
            .as_deref()
            .map(|file| translator.relative_to_builddir(file));
        match (file, self.function.as_deref()) {
            (Some(file), _) if self.line > 0 => {
                command.push_str(&format!(" --source {} --line {}", quote(&file), self.line));
            }
            (Some(file), Some(function)) => {
                command.push_str(&format!(
                    " --source {} --function {}",
                    quote(&file),
                    quote(function)
                ));
            }
            _ if self.address.is_valid() => {
                command.push_str(&format!(" *{:#x}", self.address.as_u64()));
            }
            _ => return Err(Error::InvalidBreakpoint),
        }

        Ok(command)
    }

    pub(crate) fn delete_command(&self) -> Result<String, Error> {
        let id = self.id.as_deref().ok_or(Error::MissingIdentifier)?;
        Ok(format!("-break-delete {id}"))
    }

    pub(crate) fn change_command(&self, change: BreakpointChange) -> Result<String, Error> {
        if change != BreakpointChange::Enabled {
            return Err(Error::UnsupportedChange(change));
        }
        let id = self.id.as_deref().ok_or(Error::MissingIdentifier)?;
        if self.enabled {
            Ok(format!("-break-enable {id}"))
        } else {
            Ok(format!("-break-disable {id}"))
        }
    }
}

/// Quote MI command argument if it contains whitespace or quotes.
pub(crate) fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
