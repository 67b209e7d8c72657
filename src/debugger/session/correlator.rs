use crate::debugger::error::Error;
use crate::debugger::session::{OnReply, Session};
use crate::debugger::thread::Thread;
use crate::mi::{Lookup, ResultClass, ResultRecord};
use bytes::Bytes;
use std::collections::VecDeque;

/// Tokens are issued in `1..TOKEN_MODULUS`, 0 is never used.
pub(crate) const TOKEN_MODULUS: u32 = 10_000;

/// Place in a multi-line command text where the token is inserted.
pub const SPLICE_MARKER: &str = "@@@@";

#[derive(Debug, Default)]
pub(crate) struct TokenCounter {
    last: u32,
}

impl TokenCounter {
    pub(crate) fn next(&mut self) -> String {
        self.last = self.last % (TOKEN_MODULUS - 1) + 1;
        format!("{:03}", self.last)
    }
}

/// Commands waiting for their result record, in submission order.
pub(crate) struct PendingQueue<C> {
    commands: VecDeque<(String, C)>,
}

impl<C> Default for PendingQueue<C> {
    fn default() -> Self {
        Self {
            commands: VecDeque::new(),
        }
    }
}

impl<C> PendingQueue<C> {
    pub(crate) fn push(&mut self, token: String, completion: C) {
        self.commands.push_back((token, completion));
    }

    /// Remove the first command with exactly this token.
    pub(crate) fn take(&mut self, token: &str) -> Option<C> {
        let idx = self.commands.iter().position(|(t, _)| t == token)?;
        self.commands.remove(idx).map(|(_, completion)| completion)
    }

    pub(crate) fn drain(&mut self) -> Vec<C> {
        self.commands.drain(..).map(|(_, c)| c).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Only machine commands get a token, cli commands have no result record to match.
pub(crate) fn needs_token(text: &str) -> bool {
    text.starts_with('-') || text.contains(SPLICE_MARKER)
}

/// Wire form of a command.
pub(crate) fn frame_command(token: Option<&str>, thread: Option<&Thread>, text: &str) -> String {
    let mut line = String::with_capacity(text.len() + 32);

    if let Some(thread) = thread {
        line.push_str("-thread-select ");
        line.push_str(&thread.id);
        line.push('\n');
    }

    match token {
        Some(token) if text.contains(SPLICE_MARKER) => {
            line.push_str(&text.replacen(SPLICE_MARKER, token, 1))
        }
        Some(token) => {
            line.push_str(token);
            line.push_str(text);
        }
        None => line.push_str(text),
    }

    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

/// Turn `^error` records into [`Error::Remote`].
pub(crate) fn into_result(record: ResultRecord) -> Result<ResultRecord, Error> {
    if record.class != ResultClass::Error {
        return Ok(record);
    }
    let msg = record
        .results
        .get_str("msg")
        .map(ToString::to_string)
        .unwrap_or(record.line);
    Err(Error::Remote(msg))
}

impl Session {
    /// Send a command to gdb. `on_reply` is called once with the result record,
    /// right away with `Ok(None)` for commands without token.
    pub(crate) fn submit(&mut self, thread: Option<&Thread>, text: &str, on_reply: OnReply) {
        if self.transport.is_closed() {
            on_reply(self, Err(Error::Closed));
            return;
        }
        if self.desynchronized {
            on_reply(self, Err(Error::CommunicationFailure));
            return;
        }

        let token = needs_token(text).then(|| self.tokens.next());
        let line = frame_command(token.as_deref(), thread, text);

        if let Err(e) = self.transport.enqueue(Bytes::from(line)) {
            on_reply(self, Err(e));
            return;
        }

        match token {
            Some(token) => self.pending.push(token, on_reply),
            None => on_reply(self, Ok(None)),
        }
    }

    /// Submit a command whose result is only interesting when it fails.
    pub(crate) fn submit_logged(&mut self, thread: Option<&Thread>, text: &str) {
        let command = text.to_string();
        self.submit(
            thread,
            text,
            Box::new(move |_, reply| {
                if let Err(e) = reply {
                    log::warn!(target: "mi::session", "`{command}` failed: {e}");
                }
            }),
        );
    }

    /// Hand a result record to the command waiting for it.
    pub(crate) fn complete(&mut self, record: ResultRecord) {
        let Some(token) = record.token.clone() else {
            log::debug!(target: "mi::session", "discard result without token: {}", record.line);
            return;
        };

        match self.pending.take(&token) {
            Some(on_reply) => on_reply(self, into_result(record).map(Some)),
            None => {
                log::warn!(target: "mi::session", "no command waits for result: {}", record.line)
            }
        }
    }

    /// Fail every pending command, gdb output can't be trusted anymore.
    /// New commands fail too until the session is recreated.
    pub(crate) fn panic(&mut self) {
        self.desynchronized = true;
        self.fail_pending(|| Error::CommunicationFailure);
    }

    pub(crate) fn fail_pending(&mut self, error: impl Fn() -> Error) {
        for on_reply in self.pending.drain() {
            on_reply(self, Err(error()));
        }
    }
}
