use midriver::debugger::event::Event;
use midriver::debugger::{Debugger, DebuggerBuilder};
use os_pipe::{PipeReader, PipeWriter};
use std::io::{BufRead, BufReader, Write};
use std::sync::mpsc;
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub const EMPTY_TABLE: &str =
    r#"BreakpointTable={nr_rows="0",nr_cols="6",hdr=[],body=[]}"#;

/// Gdb stand-in on the other side of the pipes.
pub struct FakeGdb {
    commands: BufReader<PipeReader>,
    replies: PipeWriter,
}

impl FakeGdb {
    /// Next command line written by the debugger.
    pub fn next_command(&mut self) -> String {
        let mut line = String::new();
        self.commands.read_line(&mut line).unwrap();
        line.trim_end_matches('\n').to_string()
    }

    pub fn expect(&mut self, command: &str) {
        assert_eq!(self.next_command(), command);
    }

    pub fn reply(&mut self, text: &str) {
        self.replies.write_all(text.as_bytes()).unwrap();
        self.replies.flush().unwrap();
    }

    /// Answer commands of a fresh connection.
    pub fn bootstrap(&mut self) {
        self.expect("001-gdb-set mi-async on");
        self.expect("002-break-list");
        self.reply(&format!("001^done\n002^done,{EMPTY_TABLE}\n(gdb) \n"));
    }
}

pub struct Env {
    pub debugger: Debugger,
    pub gdb: FakeGdb,
    pub events: mpsc::Receiver<Event>,
}

impl Env {
    pub fn next_event(&self) -> Event {
        self.events.recv_timeout(TIMEOUT).unwrap()
    }

    pub fn no_events(&self) {
        assert!(self
            .events
            .recv_timeout(Duration::from_millis(100))
            .is_err());
    }
}

/// Connected debugger with bootstrap completed.
pub fn env() -> Env {
    let (commands_reader, commands_writer) = os_pipe::pipe().unwrap();
    let (replies_reader, replies_writer) = os_pipe::pipe().unwrap();
    let (events_tx, events) = mpsc::channel();

    let debugger = DebuggerBuilder::new().build(events_tx);
    debugger.connect(replies_reader, commands_writer).unwrap();

    let mut gdb = FakeGdb {
        commands: BufReader::new(commands_reader),
        replies: replies_writer,
    };
    gdb.bootstrap();

    Env {
        debugger,
        gdb,
        events,
    }
}
