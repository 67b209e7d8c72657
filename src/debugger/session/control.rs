use crate::debugger::address::AddressRange;
use crate::debugger::breakpoint::quote;
use crate::debugger::error::Error;
use crate::debugger::event::Movement;
use crate::debugger::frame::{Frame, Instruction, Variable};
use crate::debugger::pending::Responder;
use crate::debugger::register::Register;
use crate::debugger::reply;
use crate::debugger::session::correlator::SPLICE_MARKER;
use crate::debugger::session::registry::expect_record;
use crate::debugger::session::Session;
use crate::debugger::thread::{Thread, ThreadGroup};
use crate::mi::ResultRecord;
use crate::weak_error;
use std::path::Path;

impl Session {
    /// Submit raw command text, reply is passed as is.
    pub(crate) fn exec(
        &mut self,
        thread: Option<&Thread>,
        text: &str,
        responder: Responder<Option<ResultRecord>>,
    ) {
        self.submit(
            thread,
            text,
            Box::new(move |_, reply| responder.respond(reply)),
        );
    }

    fn exec_unit(&mut self, thread: Option<&Thread>, text: &str, responder: Responder<()>) {
        self.submit(
            thread,
            text,
            Box::new(move |_, reply| responder.respond(reply.map(|_| ()))),
        );
    }

    pub(crate) fn move_execution(&mut self, movement: Movement, responder: Responder<()>) {
        if self.register_names.is_empty() {
            self.submit(
                None,
                "-data-list-register-names",
                Box::new(|session, reply| {
                    let names = expect_record(reply)
                        .and_then(|record| reply::register_names(&record));
                    if let Some(names) = weak_error!(names, "register names:") {
                        session.register_names = names;
                    }
                }),
            );
        }

        self.exec_unit(None, movement.command(), responder);
    }

    pub(crate) fn interrupt(&mut self, group: Option<&ThreadGroup>, responder: Responder<()>) {
        let command = match group {
            Some(group) => format!("-exec-interrupt --thread-group {}", group.id),
            None => "-exec-interrupt --all".to_string(),
        };
        self.exec_unit(None, &command, responder);
    }

    pub(crate) fn send_signal(&mut self, signum: i32, responder: Responder<()>) {
        self.exec_unit(None, &format!("signal {signum}"), responder);
    }

    pub(crate) fn list_frames(&mut self, thread: &Thread, responder: Responder<Vec<Frame>>) {
        self.submit(
            Some(thread),
            "-stack-list-frames",
            Box::new(move |session, reply| {
                let result = expect_record(reply)
                    .and_then(|record| reply::frames(session.translator(), &record));
                responder.respond(result);
            }),
        );
    }

    /// Locals are listed for the selected frame only, so the frame is selected
    /// for the duration of the command.
    pub(crate) fn list_locals(
        &mut self,
        thread: &Thread,
        frame: &Frame,
        responder: Responder<Vec<Variable>>,
    ) {
        let command = format!(
            "-stack-select-frame {depth}\n{SPLICE_MARKER}-stack-list-locals --simple-values\n-stack-select-frame 0",
            depth = frame.depth
        );
        self.submit(
            Some(thread),
            &command,
            Box::new(move |_, reply| {
                responder.respond(expect_record(reply).and_then(|record| reply::locals(&record)));
            }),
        );
    }

    pub(crate) fn list_params(
        &mut self,
        thread: &Thread,
        frame: &Frame,
        responder: Responder<Vec<Variable>>,
    ) {
        let depth = frame.depth;
        let command = format!("-stack-list-arguments --simple-values {depth} {depth}");
        self.submit(
            Some(thread),
            &command,
            Box::new(move |_, reply| {
                responder.respond(
                    expect_record(reply).and_then(|record| reply::params(&record, depth)),
                );
            }),
        );
    }

    pub(crate) fn list_registers(&mut self, thread: &Thread, responder: Responder<Vec<Register>>) {
        self.submit(
            Some(thread),
            "-data-list-register-values x",
            Box::new(move |session, reply| {
                let result = expect_record(reply)
                    .and_then(|record| reply::registers(&record, &session.register_names));
                responder.respond(result);
            }),
        );
    }

    pub(crate) fn disassemble(&mut self, range: AddressRange, responder: Responder<Vec<Instruction>>) {
        if !range.is_valid() {
            responder.respond(Err(Error::InvalidRange));
            return;
        }

        let command = format!(
            "-data-disassemble -s {:#x} -e {:#x} -- 0",
            range.from.as_u64(),
            range.to.as_u64()
        );
        self.submit(
            None,
            &command,
            Box::new(move |_, reply| {
                responder.respond(expect_record(reply).and_then(|record| reply::instructions(&record)));
            }),
        );
    }

    pub(crate) fn set_inferior_tty(&mut self, path: &Path, responder: Responder<()>) {
        self.exec_unit(
            None,
            &format!("-gdb-set inferior-tty {}", quote(&path.to_string_lossy())),
            responder,
        );
    }
}
