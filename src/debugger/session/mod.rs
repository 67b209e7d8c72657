//! Session actor. Owns all state of one gdb connection and processes
//! [`Message`]s one at a time on a dedicated thread.

pub(crate) mod control;
pub(crate) mod correlator;
pub(crate) mod dispatch;
pub(crate) mod registry;
pub(crate) mod transport;

use crate::debugger::breakpoint::Breakpoint;
use crate::debugger::error::Error;
use crate::debugger::event::Event;
use crate::debugger::path::PathTranslator;
use crate::debugger::register::RegisterNames;
use crate::debugger::session::correlator::{PendingQueue, TokenCounter};
use crate::debugger::session::transport::Transport;
use crate::debugger::thread::Thread;
use crate::debugger::EventHook;
use crate::mi::{MiParser, ResultRecord};
use crate::wire_trace;
use bytes::Bytes;
use indexmap::IndexMap;
use std::io;
use std::sync::mpsc;

/// Called once with the outcome of a submitted command.
pub(crate) type OnReply =
    Box<dyn FnOnce(&mut Session, Result<Option<ResultRecord>, Error>) + Send>;

pub(crate) enum Message {
    Read(Bytes),
    ReadClosed(Option<io::Error>),
    Written(io::Result<()>),
    Exec(Box<dyn FnOnce(&mut Session) + Send>),
    Cancel,
    Shutdown,
}

pub(crate) struct Session {
    transport: Transport,
    parser: MiParser,
    tokens: TokenCounter,
    pending: PendingQueue<OnReply>,
    translator: PathTranslator,
    register_names: RegisterNames,
    selected_thread: Option<Thread>,
    running: bool,
    breakpoints: IndexMap<String, Breakpoint>,
    hook: Box<dyn EventHook>,
    /// Set by a panic, gdb output and command replies no longer line up.
    desynchronized: bool,
    finished: bool,
}

impl Session {
    pub(crate) fn new(
        transport: Transport,
        translator: PathTranslator,
        hook: Box<dyn EventHook>,
    ) -> Self {
        Self {
            transport,
            parser: MiParser::new(),
            tokens: TokenCounter::default(),
            pending: PendingQueue::default(),
            translator,
            register_names: RegisterNames::new(),
            selected_thread: None,
            running: false,
            breakpoints: IndexMap::new(),
            hook,
            desynchronized: false,
            finished: false,
        }
    }

    /// Commands every fresh connection starts with.
    pub(crate) fn bootstrap(&mut self) {
        self.submit_logged(None, "-gdb-set mi-async on");
        self.reload_breakpoints();
    }

    pub(crate) fn run(mut self, messages: mpsc::Receiver<Message>) {
        self.bootstrap();

        while let Ok(message) = messages.recv() {
            self.handle(message);
            if self.finished {
                break;
            }
        }

        log::debug!(target: "mi::session", "session exits");
    }

    pub(crate) fn handle(&mut self, message: Message) {
        match message {
            Message::Read(bytes) => self.read(&bytes),
            Message::ReadClosed(err) => {
                if let Some(e) = err {
                    log::warn!(target: "mi::session", "read from gdb failed: {e}");
                }
                self.disconnect(|| Error::Closed);
            }
            Message::Written(Ok(())) => {
                if let Err(e) = self.transport.write_finished() {
                    log::warn!(target: "mi::session", "write to gdb failed: {e}");
                    self.panic();
                }
            }
            Message::Written(Err(e)) => {
                log::warn!(target: "mi::session", "write to gdb failed: {e}");
                self.transport.close();
                self.panic();
            }
            Message::Exec(f) => f(self),
            Message::Cancel | Message::Shutdown => self.disconnect(|| Error::Cancelled),
        }
    }

    fn read(&mut self, bytes: &[u8]) {
        if self.transport.is_closed() {
            return;
        }
        wire_trace!("<< {}", String::from_utf8_lossy(bytes).trim_end());

        for output in self.parser.push(bytes) {
            self.dispatch(output);
        }
    }

    /// Close transport, fail what is still pending and tell the hook
    /// that no more events will come.
    fn disconnect(&mut self, error: impl Fn() -> Error) {
        if self.finished {
            return;
        }
        self.transport.close();
        self.fail_pending(error);
        self.finished = true;
        self.emit(Event::Disconnected);
    }

    /// Update session state and pass event to the hook.
    pub(crate) fn emit(&mut self, event: Event) {
        match &event {
            Event::BreakpointCreated(bp) | Event::BreakpointModified(bp) => {
                if let Some(id) = &bp.id {
                    self.breakpoints.insert(id.clone(), bp.clone());
                }
            }
            Event::BreakpointRemoved(bp) => {
                if let Some(id) = &bp.id {
                    self.breakpoints.shift_remove(id);
                }
            }
            Event::ThreadSelected(thread) => self.selected_thread = Some(thread.clone()),
            Event::Running => self.running = true,
            Event::Stopped(_) => self.running = false,
            _ => {}
        }

        self.hook.on_event(event);
    }

    pub(crate) fn translator(&self) -> &PathTranslator {
        &self.translator
    }
}
