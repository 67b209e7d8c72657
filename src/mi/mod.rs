//! GDB machine interface (MI v2) output model.
//!
//! Only the subset of the grammar that gdb actually emits is modeled: result records,
//! async records, stream records and the `(gdb)` prompt.

pub mod command;
pub mod parser;

pub use parser::MiParser;

use strum_macros::EnumString;

/// Value part of an MI `variable=value` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Const(String),
    Tuple(Vec<MiResult>),
    List(Vec<MiResult>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Const(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[MiResult]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MiResult]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a tuple or a list, empty for constants.
    pub fn entries(&self) -> &[MiResult] {
        match self {
            Value::Tuple(items) | Value::List(items) => items,
            Value::Const(_) => &[],
        }
    }
}

/// A (possibly anonymous) `variable=value` pair. List elements and the bare tuples gdb
/// prints for multi-location breakpoints have no variable.
#[derive(Debug, Clone, PartialEq)]
pub struct MiResult {
    pub variable: Option<String>,
    pub value: Value,
}

impl MiResult {
    pub fn new(variable: impl Into<String>, value: Value) -> Self {
        Self {
            variable: Some(variable.into()),
            value,
        }
    }

    pub fn anonymous(value: Value) -> Self {
        Self {
            variable: None,
            value,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.variable.as_deref() == Some(name)
    }
}

/// Field access over a sequence of results.
pub trait Lookup {
    fn field(&self, name: &str) -> Option<&Value>;

    fn get_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    fn get_tuple(&self, name: &str) -> Option<&[MiResult]> {
        self.field(name).and_then(Value::as_tuple)
    }

    fn get_list(&self, name: &str) -> Option<&[MiResult]> {
        self.field(name).and_then(Value::as_list)
    }
}

impl Lookup for [MiResult] {
    fn field(&self, name: &str) -> Option<&Value> {
        self.iter().find(|r| r.is(name)).map(|r| &r.value)
    }
}

impl Lookup for Vec<MiResult> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_slice().field(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub token: Option<String>,
    pub class: ResultClass,
    pub results: Vec<MiResult>,
    /// Raw line as received from gdb.
    pub line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    /// `*` records: execution state changes.
    Exec,
    /// `+` records: progress of slow operations.
    Status,
    /// `=` records: supplementary notifications.
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum AsyncClass {
    Stopped,
    Running,
    ThreadGroupAdded,
    ThreadGroupRemoved,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadExited,
    ThreadSelected,
    LibraryLoaded,
    LibraryUnloaded,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    CmdParamChanged,
    Download,
    MemoryChanged,
    RecordStarted,
    RecordStopped,
    TraceframeChanged,
    TsvCreated,
    TsvDeleted,
    TsvModified,
    #[strum(default)]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsyncRecord {
    pub token: Option<String>,
    pub kind: AsyncKind,
    pub class: AsyncClass,
    pub results: Vec<MiResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Console,
    Target,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub kind: StreamKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OobRecord {
    Async(AsyncRecord),
    Stream(StreamRecord),
}

/// One unit of parser output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    /// A line that is not valid MI output.
    ParseError(String),
    Result(ResultRecord),
    OutOfBand(OobRecord),
    Prompt,
}
