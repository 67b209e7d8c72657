use std::sync::atomic::{AtomicBool, Ordering};

static WIRE_TRACE: AtomicBool = AtomicBool::new(false);

/// Log target for raw bytes exchanged with gdb.
pub const WIRE_TARGET: &str = "mi::wire";

#[inline(always)]
pub fn is_wire_trace_enabled() -> bool {
    WIRE_TRACE.load(Ordering::SeqCst)
}

pub fn enable_wire_trace() {
    WIRE_TRACE.store(true, Ordering::SeqCst)
}

pub fn disable_wire_trace() {
    WIRE_TRACE.store(false, Ordering::SeqCst)
}

/// Trace a chunk of MI traffic. Arguments are not evaluated while
/// wire tracing is switched off.
#[macro_export]
macro_rules! wire_trace {
    ($($arg:tt)+) => {
        if $crate::log::is_wire_trace_enabled() {
            log::trace!(target: $crate::log::WIRE_TARGET, $($arg)+)
        }
    };
}
