//! Structured replies of MI commands whose output shape is fixed.

use crate::debugger::error::Error;
use crate::mi::{Lookup, MiResult, ResultRecord};
use strum_macros::EnumString;

#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum MiDisposition {
    #[strum(serialize = "del")]
    Delete,
    #[strum(serialize = "dstp")]
    DeleteNextStop,
    #[strum(serialize = "dis")]
    Disable,
    #[strum(serialize = "keep")]
    Keep,
    #[strum(default)]
    Unknown(String),
}

/// Row of a `BreakpointTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiBreakpoint {
    pub number: String,
    pub kind: String,
    pub disposition: MiDisposition,
    pub enabled: bool,
    pub address: Option<String>,
    pub function: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub line: Option<u32>,
    pub times: u64,
    pub thread: Option<String>,
    pub condition: Option<String>,
}

impl MiBreakpoint {
    fn from_fields(fields: &[MiResult]) -> Result<Self, Error> {
        let owned = |name: &str| fields.get_str(name).map(ToString::to_string);

        Ok(Self {
            number: owned("number").ok_or(Error::InvalidReply("breakpoint without number"))?,
            kind: owned("type").unwrap_or_else(|| "breakpoint".to_string()),
            disposition: fields
                .get_str("disp")
                .map(|d| d.parse().unwrap_or_else(|_| MiDisposition::Unknown(d.into())))
                .unwrap_or(MiDisposition::Keep),
            enabled: fields.get_str("enabled") == Some("y"),
            address: owned("addr"),
            function: owned("func"),
            file: owned("file"),
            fullname: owned("fullname"),
            line: fields.get_str("line").and_then(|l| l.parse().ok()),
            times: fields
                .get_str("times")
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            thread: owned("thread"),
            condition: owned("cond"),
        })
    }
}

/// Reply of `-break-info` and `-break-list`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BreakInfo {
    pub breakpoints: Vec<MiBreakpoint>,
}

impl BreakInfo {
    pub fn from_record(record: &ResultRecord) -> Result<Self, Error> {
        let table = record
            .results
            .get_tuple("BreakpointTable")
            .ok_or(Error::InvalidReply("BreakpointTable expected"))?;
        let body = table
            .get_list("body")
            .ok_or(Error::InvalidReply("BreakpointTable without body"))?;

        let breakpoints = body
            .iter()
            .filter(|row| row.is("bkpt"))
            .map(|row| {
                let fields = row
                    .value
                    .as_tuple()
                    .ok_or(Error::InvalidReply("bkpt must be a tuple"))?;
                MiBreakpoint::from_fields(fields)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { breakpoints })
    }
}
