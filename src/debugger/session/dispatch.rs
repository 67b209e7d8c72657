use crate::debugger::decode::{decode_async, DecodeError};
use crate::debugger::event::{Event, LogChannel, StopEvent};
use crate::debugger::session::Session;
use crate::debugger::thread::Thread;
use crate::mi::{AsyncKind, AsyncRecord, OobRecord, ParsedOutput, StreamKind};

impl Session {
    /// Route one parser output.
    pub(crate) fn dispatch(&mut self, output: ParsedOutput) {
        match output {
            ParsedOutput::ParseError(line) => {
                self.panic();
                self.emit(Event::Warning(format!(
                    "failed to parse gdb communication: {line}"
                )));
            }
            ParsedOutput::Result(record) => self.complete(record),
            ParsedOutput::OutOfBand(OobRecord::Async(record)) => {
                if record.kind != AsyncKind::Status {
                    self.handle_async(&record);
                }
            }
            ParsedOutput::OutOfBand(OobRecord::Stream(record)) => {
                let channel = match record.kind {
                    StreamKind::Console => LogChannel::Console,
                    StreamKind::Target => LogChannel::Target,
                    StreamKind::Log => LogChannel::Log,
                };
                self.emit(Event::Log {
                    channel,
                    text: record.text,
                });
            }
            ParsedOutput::Prompt => {}
        }
    }

    fn handle_async(&mut self, record: &AsyncRecord) {
        match decode_async(self.translator(), record) {
            Ok(Some(Event::Stopped(stop))) => self.handle_stopped(stop),
            Ok(Some(Event::Running)) => self.handle_running(),
            Ok(Some(event)) => self.emit(event),
            Ok(None) => {}
            Err(e @ DecodeError::Unsupported(_)) if cfg!(debug_assertions) => {
                log::error!(target: "mi::session", "{e}");
            }
            Err(e) => log::debug!(target: "mi::session", "{e}"),
        }
    }

    fn handle_stopped(&mut self, stop: StopEvent) {
        let terminal = stop.reason.is_terminal();
        self.emit(Event::Stopped(stop));

        self.reload_breakpoints();
        if terminal {
            self.submit_logged(None, "-gdb-exit");
        }
    }

    fn handle_running(&mut self) {
        self.emit(Event::Running);

        // gdb doesn't announce the initial thread selection
        if self.selected_thread.is_none() {
            self.emit(Event::ThreadSelected(Thread::new("1")));
        }
    }
}
