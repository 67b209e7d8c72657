use crate::debugger::error::Error;
use std::sync::mpsc;
use std::time::Duration;

/// Result of a debugger operation that completes when gdb answers.
#[must_use]
pub struct Pending<T> {
    receiver: mpsc::Receiver<Result<T, Error>>,
}

impl<T> Pending<T> {
    /// Already completed operation.
    pub fn ready(result: Result<T, Error>) -> Self {
        let (responder, pending) = pending();
        responder.respond(result);
        pending
    }

    /// Block until the operation completes. If the session is gone before
    /// that, [`Error::Closed`] is returned.
    pub fn wait(self) -> Result<T, Error> {
        self.receiver.recv().unwrap_or(Err(Error::Closed))
    }

    /// Like [`Pending::wait`] but gives up after `timeout`, [`None`] on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, Error>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(Error::Closed)),
        }
    }

    /// Take the result if the operation already completed.
    pub fn try_take(&self) -> Option<Result<T, Error>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(Error::Closed)),
        }
    }
}

/// Completion side of a [`Pending`]. Dropping it without a response completes
/// the operation with [`Error::Closed`].
pub(crate) struct Responder<T> {
    sender: mpsc::SyncSender<Result<T, Error>>,
}

impl<T> Responder<T> {
    pub(crate) fn respond(self, result: Result<T, Error>) {
        // receiver may be already dropped, nobody is interested in result then
        _ = self.sender.send(result);
    }
}

pub(crate) fn pending<T>() -> (Responder<T>, Pending<T>) {
    let (sender, receiver) = mpsc::sync_channel(1);
    (Responder { sender }, Pending { receiver })
}
