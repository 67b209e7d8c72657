pub mod address;
pub mod breakpoint;
pub mod decode;
pub mod error;
pub mod event;
pub mod frame;
pub mod library;
pub mod path;
pub mod pending;
pub mod register;
pub mod reply;
mod session;
pub mod thread;

pub use crate::debugger::session::correlator::SPLICE_MARKER;

use crate::config::BuildConfig;
use crate::debugger::address::AddressRange;
use crate::debugger::breakpoint::{Breakpoint, BreakpointChange};
use crate::debugger::error::Error;
use crate::debugger::event::{Event, Movement};
use crate::debugger::frame::{Frame, Instruction, Variable};
use crate::debugger::path::PathTranslator;
use crate::debugger::pending::{pending, Pending, Responder};
use crate::debugger::register::Register;
use crate::debugger::session::transport::Transport;
use crate::debugger::session::{Message, Session};
use crate::debugger::thread::{Thread, ThreadGroup};
use crate::mi::ResultRecord;
use once_cell::sync::OnceCell;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

/// Receiver of debugger events. Called on the session thread, so
/// implementations should not block.
pub trait EventHook: Send {
    fn on_event(&mut self, event: Event);
}

impl EventHook for mpsc::Sender<Event> {
    fn on_event(&mut self, event: Event) {
        // receiver is gone, nobody listens
        _ = self.send(event);
    }
}

/// Hook that drops every event.
pub struct NopHook;

impl EventHook for NopHook {
    fn on_event(&mut self, _: Event) {}
}

#[derive(Default)]
pub struct DebuggerBuilder {
    build_config: Option<Arc<dyn BuildConfig>>,
    builddir: Option<PathBuf>,
}

impl DebuggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use build system knowledge to resolve paths reported by gdb.
    pub fn with_build_config(self, build_config: Arc<dyn BuildConfig>) -> Self {
        Self {
            build_config: Some(build_config),
            ..self
        }
    }

    /// Resolve relative paths against `builddir`, takes precedence over
    /// the build config directory.
    pub fn with_builddir(self, builddir: impl Into<PathBuf>) -> Self {
        Self {
            builddir: Some(builddir.into()),
            ..self
        }
    }

    pub fn build(self, hook: impl EventHook + 'static) -> Debugger {
        let mut translator = PathTranslator::new(self.build_config);
        if let Some(dir) = self.builddir {
            translator = translator.override_builddir(dir);
        }

        Debugger {
            translator,
            hook: Mutex::new(Some(Box::new(hook))),
            link: OnceCell::new(),
        }
    }
}

struct Link {
    messages: mpsc::Sender<Message>,
    session: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a gdb session.
///
/// Every operation is executed on the session thread and returns a [`Pending`]
/// that completes when gdb answers. Operations invoked before [`Debugger::connect`]
/// fail with [`Error::NotConnected`].
pub struct Debugger {
    translator: PathTranslator,
    hook: Mutex<Option<Box<dyn EventHook>>>,
    link: OnceCell<Link>,
}

impl Debugger {
    /// Start talking to gdb over `reader` (gdb stdout) and `writer` (gdb stdin).
    /// A debugger can be connected only once.
    pub fn connect<R, W>(&self, reader: R, writer: W) -> Result<(), Error>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        self.attach(move |messages| Transport::spawn(reader, writer, messages))
    }

    /// Start the session over a transport made by `transport`. Nothing is
    /// consumed if any step fails, so connecting may be retried.
    fn attach(
        &self,
        transport: impl FnOnce(mpsc::Sender<Message>) -> io::Result<Transport>,
    ) -> Result<(), Error> {
        let mut hook_slot = self.hook.lock().unwrap();
        if hook_slot.is_none() {
            return Err(Error::AlreadyConnected);
        }

        let (messages_tx, messages_rx) = mpsc::channel();
        let (session_tx, session_rx) = mpsc::sync_channel::<Session>(1);
        let handle = std::thread::Builder::new()
            .name("mi-session".to_string())
            .spawn(move || {
                // sender is dropped without a session if connecting fails
                if let Ok(session) = session_rx.recv() {
                    session.run(messages_rx);
                }
            })?;

        let transport = transport(messages_tx.clone())?;
        let hook = hook_slot.take().ok_or(Error::AlreadyConnected)?;
        session_tx
            .send(Session::new(transport, self.translator.clone(), hook))
            .map_err(|_| Error::Closed)?;

        _ = self.link.set(Link {
            messages: messages_tx,
            session: Mutex::new(Some(handle)),
        });
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.link.get().is_some()
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    fn send(&self, message: Message) -> Result<(), Error> {
        let link = self.link.get().ok_or(Error::NotConnected)?;
        link.messages.send(message).map_err(|_| Error::Closed)
    }

    fn request<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut Session, Responder<T>) + Send + 'static,
    ) -> Pending<T> {
        if self.link.get().is_none() {
            return Pending::ready(Err(Error::NotConnected));
        }

        let (responder, pending) = pending();
        // on failure responder is dropped together with the message and
        // pending completes with `Error::Closed`
        _ = self.send(Message::Exec(Box::new(move |session| f(session, responder))));
        pending
    }

    /// Run a raw command. Commands starting with `-` (or containing
    /// [`SPLICE_MARKER`]) complete with gdb result record, others complete
    /// immediately with [`None`].
    pub fn exec(&self, thread: Option<&Thread>, command: &str) -> Pending<Option<ResultRecord>> {
        let thread = thread.cloned();
        let command = command.to_string();
        self.request(move |session, responder| {
            session.exec(thread.as_ref(), &command, responder)
        })
    }

    /// Refresh breakpoints from gdb, each of them is reported as
    /// [`Event::BreakpointModified`]. Completes once gdb answered and all
    /// events are emitted.
    pub fn reload_breakpoints(&self) -> Pending<()> {
        self.request(|session, responder| session.refresh_breakpoints(responder))
    }

    /// Query gdb for current breakpoints.
    pub fn list_breakpoints(&self) -> Pending<Vec<Breakpoint>> {
        self.request(|session, responder| session.list_breakpoints(responder))
    }

    /// Breakpoints known from events seen so far.
    pub fn breakpoints(&self) -> Pending<Vec<Breakpoint>> {
        self.request(|session, responder| responder.respond(Ok(session.known_breakpoints())))
    }

    pub fn insert_breakpoint(&self, breakpoint: &Breakpoint) -> Pending<Breakpoint> {
        let command = match breakpoint.insert_command(&self.translator) {
            Ok(command) => command,
            Err(e) => return Pending::ready(Err(e)),
        };
        self.request(move |session, responder| session.insert_breakpoint(&command, responder))
    }

    pub fn remove_breakpoint(&self, breakpoint: &Breakpoint) -> Pending<()> {
        let command = match breakpoint.delete_command() {
            Ok(command) => command,
            Err(e) => return Pending::ready(Err(e)),
        };
        let breakpoint = breakpoint.clone();
        self.request(move |session, responder| {
            session.remove_breakpoint(&command, breakpoint, responder)
        })
    }

    /// Apply `change` using the new state from `breakpoint`.
    pub fn modify_breakpoint(
        &self,
        change: BreakpointChange,
        breakpoint: &Breakpoint,
    ) -> Pending<()> {
        let command = match breakpoint.change_command(change) {
            Ok(command) => command,
            Err(e) => return Pending::ready(Err(e)),
        };
        self.request(move |session, responder| session.modify_breakpoint(&command, responder))
    }

    pub fn move_execution(&self, movement: Movement) -> Pending<()> {
        self.request(move |session, responder| session.move_execution(movement, responder))
    }

    /// Interrupt a thread group, or all of them.
    pub fn interrupt(&self, group: Option<&ThreadGroup>) -> Pending<()> {
        let group = group.cloned();
        self.request(move |session, responder| session.interrupt(group.as_ref(), responder))
    }

    pub fn send_signal(&self, signum: i32) -> Pending<()> {
        self.request(move |session, responder| session.send_signal(signum, responder))
    }

    pub fn list_frames(&self, thread: &Thread) -> Pending<Vec<Frame>> {
        let thread = thread.clone();
        self.request(move |session, responder| session.list_frames(&thread, responder))
    }

    pub fn list_locals(&self, thread: &Thread, frame: &Frame) -> Pending<Vec<Variable>> {
        let thread = thread.clone();
        let frame = frame.clone();
        self.request(move |session, responder| session.list_locals(&thread, &frame, responder))
    }

    pub fn list_params(&self, thread: &Thread, frame: &Frame) -> Pending<Vec<Variable>> {
        let thread = thread.clone();
        let frame = frame.clone();
        self.request(move |session, responder| session.list_params(&thread, &frame, responder))
    }

    pub fn list_registers(&self, thread: &Thread) -> Pending<Vec<Register>> {
        let thread = thread.clone();
        self.request(move |session, responder| session.list_registers(&thread, responder))
    }

    pub fn disassemble(&self, range: AddressRange) -> Pending<Vec<Instruction>> {
        if !range.is_valid() {
            return Pending::ready(Err(Error::InvalidRange));
        }
        self.request(move |session, responder| session.disassemble(range, responder))
    }

    /// Make the debugee use terminal at `path` for its io.
    pub fn set_inferior_tty(&self, path: &Path) -> Pending<()> {
        let path = path.to_path_buf();
        self.request(move |session, responder| session.set_inferior_tty(&path, responder))
    }

    /// Stop the session. Pending operations fail with [`Error::Cancelled`].
    pub fn cancel(&self) -> Result<(), Error> {
        self.send(Message::Cancel)
    }
}

impl Drop for Debugger {
    fn drop(&mut self) {
        if let Some(link) = self.link.get() {
            _ = link.messages.send(Message::Shutdown);
            if let Some(handle) = link.session.lock().unwrap().take() {
                _ = handle.join();
            }
        }
    }
}
