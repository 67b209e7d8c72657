use crate::debugger::breakpoint::Breakpoint;
use crate::debugger::error::Error;
use crate::debugger::event::Event;
use crate::debugger::pending::Responder;
use crate::debugger::reply;
use crate::debugger::session::Session;
use crate::mi::command::BreakInfo;
use crate::mi::ResultRecord;
use crate::weak_error;

/// Reply of a command that must produce a result record.
pub(crate) fn expect_record(reply: Result<Option<ResultRecord>, Error>) -> Result<ResultRecord, Error> {
    reply?.ok_or(Error::InvalidReply("result record expected"))
}

impl Session {
    /// Ask gdb for all breakpoints and announce each of them as modified.
    pub(crate) fn reload_breakpoints(&mut self) {
        self.reload_with(|result| {
            weak_error!(result, "reload breakpoints:");
        });
    }

    /// Like [`Session::reload_breakpoints`] but the caller learns when the
    /// reload is done.
    pub(crate) fn refresh_breakpoints(&mut self, responder: Responder<()>) {
        self.reload_with(move |result| responder.respond(result));
    }

    fn reload_with(&mut self, done: impl FnOnce(Result<(), Error>) + Send + 'static) {
        self.submit(
            None,
            "-break-list",
            Box::new(move |session, reply| {
                let breakpoints = expect_record(reply)
                    .and_then(|record| reply::break_table(session.translator(), &record));
                match breakpoints {
                    Ok(breakpoints) => {
                        for bp in breakpoints {
                            session.emit(Event::BreakpointModified(bp));
                        }
                        done(Ok(()));
                    }
                    Err(e) => done(Err(e)),
                }
            }),
        );
    }

    pub(crate) fn list_breakpoints(&mut self, responder: Responder<Vec<Breakpoint>>) {
        self.submit(
            None,
            "-break-info",
            Box::new(move |session, reply| {
                let result = expect_record(reply)
                    .and_then(|record| BreakInfo::from_record(&record))
                    .map(|info| reply::break_info(session.translator(), info));
                responder.respond(result);
            }),
        );
    }

    pub(crate) fn known_breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints.values().cloned().collect()
    }

    /// `command` is a ready `-break-insert` command for a breakpoint.
    pub(crate) fn insert_breakpoint(&mut self, command: &str, responder: Responder<Breakpoint>) {
        self.submit(
            None,
            command,
            Box::new(move |session, reply| {
                let result = expect_record(reply)
                    .and_then(|record| reply::inserted_breakpoint(session.translator(), &record));
                if let Ok(bp) = &result {
                    session.emit(Event::BreakpointCreated(bp.clone()));
                }
                responder.respond(result);
            }),
        );
    }

    pub(crate) fn remove_breakpoint(
        &mut self,
        command: &str,
        breakpoint: Breakpoint,
        responder: Responder<()>,
    ) {
        self.submit(
            None,
            command,
            Box::new(move |session, reply| {
                let result = reply.map(|_| ());
                if result.is_ok() {
                    session.emit(Event::BreakpointRemoved(breakpoint));
                }
                responder.respond(result);
            }),
        );
    }

    /// Gdb doesn't report the new breakpoint state, so it is reloaded
    /// after the change unless the session is broken.
    pub(crate) fn modify_breakpoint(&mut self, command: &str, responder: Responder<()>) {
        self.submit(
            None,
            command,
            Box::new(move |session, reply| {
                if !matches!(&reply, Err(e) if e.is_fatal()) {
                    session.reload_breakpoints();
                }
                responder.respond(reply.map(|_| ()));
            }),
        );
    }
}
