use crate::debugger::breakpoint::Breakpoint;
use crate::debugger::library::Library;
use crate::debugger::thread::{Thread, ThreadGroup};
use strum_macros::EnumString;

/// Stop caused by one of gdb catchpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchKind {
    Solib,
    Fork,
    Vfork,
    SyscallEntry,
    SyscallReturn,
    Exec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum StopReason {
    #[strum(serialize = "exited-normally")]
    ExitedNormally,
    #[strum(serialize = "breakpoint-hit")]
    BreakpointHit,
    #[strum(serialize = "function-finished")]
    FunctionFinished,
    #[strum(serialize = "location-reached")]
    LocationReached,
    #[strum(serialize = "exited-signalled", serialize = "exited-signaled")]
    ExitedSignaled,
    #[strum(serialize = "exited")]
    Exited,
    #[strum(serialize = "signal-received")]
    SignalReceived,
    #[strum(disabled)]
    Catch(CatchKind),
    #[strum(disabled)]
    Unknown,
}

impl StopReason {
    /// Map gdb `reason` field of `*stopped` record.
    pub fn from_mi(reason: &str) -> Self {
        let catch = match reason {
            "solib-event" => Some(CatchKind::Solib),
            "fork" => Some(CatchKind::Fork),
            "vfork" => Some(CatchKind::Vfork),
            "syscall-entry" => Some(CatchKind::SyscallEntry),
            "syscall-return" => Some(CatchKind::SyscallReturn),
            "exec" => Some(CatchKind::Exec),
            _ => None,
        };
        match catch {
            Some(kind) => StopReason::Catch(kind),
            None => reason.parse().unwrap_or(StopReason::Unknown),
        }
    }

    /// True if the debugee is gone after this stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StopReason::ExitedNormally | StopReason::ExitedSignaled | StopReason::Exited
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEvent {
    pub reason: StopReason,
    /// Stop location. Breakpoint `id` is set if a breakpoint was hit.
    pub breakpoint: Breakpoint,
    pub thread: Option<String>,
}

/// Origin of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannel {
    /// Gdb console output.
    Console,
    /// Output of the debugee (remote targets only).
    Target,
    /// Gdb internal messages.
    Log,
}

/// Typed debugger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ThreadGroupAdded(ThreadGroup),
    ThreadGroupRemoved(ThreadGroup),
    ThreadGroupStarted(ThreadGroup),
    ThreadGroupExited(ThreadGroup),
    ThreadAdded(Thread),
    ThreadRemoved(Thread),
    ThreadSelected(Thread),
    BreakpointCreated(Breakpoint),
    BreakpointModified(Breakpoint),
    BreakpointRemoved(Breakpoint),
    Running,
    Stopped(StopEvent),
    LibraryLoaded(Library),
    LibraryUnloaded(Library),
    Log { channel: LogChannel, text: String },
    /// Recoverable problem that callers may want to show.
    Warning(String),
    /// Connection with gdb is lost, no more events will follow.
    Disconnected,
}

/// Ways to resume the debugee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Run the program from the beginning and stop at `main`.
    Start,
    Continue,
    StepIn,
    StepOver,
    Finish,
}

impl Movement {
    pub(crate) fn command(self) -> &'static str {
        match self {
            Movement::Start => "-exec-run --all --start",
            Movement::Continue => "-exec-continue",
            Movement::StepIn => "-exec-step",
            Movement::StepOver => "-exec-next",
            Movement::Finish => "-exec-finish",
        }
    }
}
