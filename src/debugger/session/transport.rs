use crate::debugger::error::Error;
use crate::debugger::session::Message;
use crate::wire_trace;
use bytes::Bytes;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::thread;

const READ_BUFFER_LEN: usize = 4096;

/// Duplex byte stream to gdb.
///
/// Reading and writing happen on dedicated threads that report back to the session
/// through [`Message`]s. At most one buffer is handed to the writer thread at a time,
/// the rest waits in a queue until the previous write completes.
pub(crate) struct Transport {
    writer: Option<mpsc::Sender<Bytes>>,
    queue: VecDeque<Bytes>,
    in_flight: bool,
}

impl Transport {
    pub(crate) fn spawn<R, W>(
        reader: R,
        writer: W,
        session: mpsc::Sender<Message>,
    ) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (writer_tx, writer_rx) = mpsc::channel();

        thread::Builder::new()
            .name("mi-reader".to_string())
            .spawn({
                let session = session.clone();
                move || read_loop(reader, session)
            })?;
        thread::Builder::new()
            .name("mi-writer".to_string())
            .spawn(move || write_loop(writer, writer_rx, session))?;

        Ok(Self::with_writer(writer_tx))
    }

    fn with_writer(writer: mpsc::Sender<Bytes>) -> Self {
        Self {
            writer: Some(writer),
            queue: VecDeque::new(),
            in_flight: false,
        }
    }

    /// Transport without io threads, written buffers go to returned receiver.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel();
        (Self::with_writer(tx), rx)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub(crate) fn enqueue(&mut self, bytes: Bytes) -> Result<(), Error> {
        if self.writer.is_none() {
            return Err(Error::Closed);
        }

        if self.in_flight {
            self.queue.push_back(bytes);
            return Ok(());
        }
        self.start_write(bytes)
    }

    /// Previous write completed, start the next one if any.
    pub(crate) fn write_finished(&mut self) -> Result<(), Error> {
        self.in_flight = false;
        match self.queue.pop_front() {
            Some(next) => self.start_write(next),
            None => Ok(()),
        }
    }

    fn start_write(&mut self, bytes: Bytes) -> Result<(), Error> {
        let writer = self.writer.as_ref().ok_or(Error::Closed)?;
        wire_trace!(">> {}", String::from_utf8_lossy(&bytes).trim_end());
        writer.send(bytes).map_err(|_| Error::Closed)?;
        self.in_flight = true;
        Ok(())
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drop queued buffers and stop the writer thread. Gdb sees end of its input.
    pub(crate) fn close(&mut self) {
        self.writer = None;
        self.queue.clear();
        self.in_flight = false;
    }
}

fn read_loop(mut reader: impl Read, session: mpsc::Sender<Message>) {
    let mut buffer = [0; READ_BUFFER_LEN];
    loop {
        let message = match reader.read(&mut buffer) {
            Ok(0) => Message::ReadClosed(None),
            Ok(n) => Message::Read(Bytes::copy_from_slice(&buffer[..n])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Message::ReadClosed(Some(e)),
        };

        let last = matches!(message, Message::ReadClosed(_));
        if session.send(message).is_err() || last {
            break;
        }
    }
    log::debug!(target: "mi::transport", "reader exits");
}

fn write_loop(
    mut writer: impl Write,
    buffers: mpsc::Receiver<Bytes>,
    session: mpsc::Sender<Message>,
) {
    while let Ok(buffer) = buffers.recv() {
        let result = writer.write_all(&buffer).and_then(|_| writer.flush());
        let failed = result.is_err();
        if session.send(Message::Written(result)).is_err() || failed {
            break;
        }
    }
    log::debug!(target: "mi::transport", "writer exits");
}
