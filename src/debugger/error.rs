use crate::debugger::breakpoint::BreakpointChange;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- transport errors ------------------------------------------
    #[error("debugger is not connected")]
    NotConnected,
    #[error("debugger already connected")]
    AlreadyConnected,
    #[error("connection to gdb is closed")]
    Closed,
    #[error("operation was cancelled")]
    Cancelled,
    #[error("there was a communication failure")]
    CommunicationFailure,
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // --------------------------------- protocol errors -------------------------------------------
    #[error("failed to parse gdb communication: {0}")]
    Parse(String),
    #[error("invalid reply from gdb: {0}")]
    InvalidReply(&'static str),

    // --------------------------------- request errors --------------------------------------------
    #[error("breakpoint has no resolvable location")]
    InvalidBreakpoint,
    #[error("breakpoint has no identifier")]
    MissingIdentifier,
    #[error("changing breakpoint {0} is not supported")]
    UnsupportedChange(BreakpointChange),
    #[error("invalid address range")]
    InvalidRange,

    // --------------------------------- remote errors ---------------------------------------------
    #[error("gdb: {0}")]
    Remote(String),

    // --------------------------------- gdb process errors ----------------------------------------
    #[error("gdb executable not found: {0}")]
    GdbNotFound(#[from] which::Error),
    #[error("{0} syscall error: {1}")]
    Syscall(&'static str, nix::Error),
    #[error("unrecognized gdb version output")]
    UnrecognizedVersion,

    // --------------------------------- configuration errors --------------------------------------
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Return a hint to a caller - keep using the session after error or start a new one.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::AlreadyConnected => false,
            Error::InvalidReply(_) => false,
            Error::InvalidBreakpoint => false,
            Error::MissingIdentifier => false,
            Error::UnsupportedChange(_) => false,
            Error::InvalidRange => false,
            Error::Remote(_) => false,
            Error::UnrecognizedVersion => false,
            Error::Config(_) => false,
            Error::IO(_) => false,

            // session can't be used anymore
            Error::NotConnected => true,
            Error::Closed => true,
            Error::Cancelled => true,
            Error::CommunicationFailure => true,
            Error::Parse(_) => true,
            Error::GdbNotFound(_) => true,
            Error::Syscall(_, _) => true,
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "mi::session", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "mi::session", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
