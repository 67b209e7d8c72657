mod common;

mod breakpoints;
mod execution;

use crate::common::{env, TIMEOUT};
use midriver::debugger::error::Error;
use midriver::debugger::event::{Event, LogChannel};

#[test]
fn test_already_connected() {
    let env = env();
    let (reader, _) = os_pipe::pipe().unwrap();
    let (_, writer) = os_pipe::pipe().unwrap();
    assert!(matches!(
        env.debugger.connect(reader, writer),
        Err(Error::AlreadyConnected)
    ));
}

#[test]
fn test_out_of_order_replies() {
    let mut env = env();

    let first = env.debugger.exec(None, "-list-features");
    let second = env.debugger.exec(None, "-gdb-version");
    env.gdb.expect("003-list-features");
    env.gdb.expect("004-gdb-version");

    env.gdb
        .reply("004^done\n003^done,features=[\"frozen-varobjs\"]\n");

    assert_eq!(second.wait().unwrap().unwrap().line, "004^done");
    let first = first.wait().unwrap().unwrap();
    assert_eq!(first.line, "003^done,features=[\"frozen-varobjs\"]");
}

#[test]
fn test_fire_and_forget() {
    let mut env = env();

    let sent = env.debugger.exec(None, "signal 2");
    assert!(sent.wait().unwrap().is_none());
    env.gdb.expect("signal 2");

    // next tokenized command keeps counting from bootstrap
    let _ = env.debugger.exec(None, "-gdb-version");
    env.gdb.expect("003-gdb-version");
}

#[test]
fn test_stream_records() {
    let mut env = env();
    env.gdb.reply("~\"GNU gdb (GDB) 14.2\\n\"\n&\"warning: x\\n\"\n");

    assert_eq!(
        env.next_event(),
        Event::Log {
            channel: LogChannel::Console,
            text: "GNU gdb (GDB) 14.2\n".to_string()
        }
    );
    assert_eq!(
        env.next_event(),
        Event::Log {
            channel: LogChannel::Log,
            text: "warning: x\n".to_string()
        }
    );
}

#[test]
fn test_parse_error_fails_pending() {
    let mut env = env();

    let first = env.debugger.exec(None, "-gdb-version");
    let second = env.debugger.exec(None, "-list-features");
    env.gdb.expect("003-gdb-version");
    env.gdb.expect("004-list-features");

    env.gdb.reply("this is not mi\n");

    assert!(matches!(first.wait(), Err(Error::CommunicationFailure)));
    assert!(matches!(second.wait(), Err(Error::CommunicationFailure)));
    assert!(matches!(env.next_event(), Event::Warning(_)));

    // nothing more goes to gdb until reconnect
    assert!(matches!(
        env.debugger.exec(None, "-gdb-version").wait(),
        Err(Error::CommunicationFailure)
    ));
    assert!(env.debugger.exec(None, "signal 2").wait().is_err());
}

#[test]
fn test_remote_error() {
    let mut env = env();

    let reply = env.debugger.exec(None, "-file-list-exec-source-file");
    env.gdb.expect("003-file-list-exec-source-file");
    env.gdb
        .reply("003^error,msg=\"No symbol table is loaded.\"\n");

    let err = reply.wait().unwrap_err();
    assert!(matches!(&err, Error::Remote(msg) if msg == "No symbol table is loaded."));
    assert!(!err.is_fatal());
}

#[test]
fn test_cancel() {
    let mut env = env();

    let reply = env.debugger.exec(None, "-exec-continue");
    env.gdb.expect("003-exec-continue");
    env.debugger.cancel().unwrap();

    assert!(matches!(reply.wait(), Err(Error::Cancelled)));
    assert_eq!(env.next_event(), Event::Disconnected);
    assert!(matches!(
        env.debugger.exec(None, "-gdb-version").wait(),
        Err(Error::Closed)
    ));
}

#[test]
fn test_gdb_exits() {
    let env = env();
    let common::Env {
        debugger,
        mut gdb,
        events,
    } = env;

    let reply = debugger.exec(None, "-exec-continue");
    gdb.expect("003-exec-continue");
    drop(gdb);

    assert!(matches!(reply.wait(), Err(Error::Closed)));
    assert_eq!(events.recv_timeout(TIMEOUT).unwrap(), Event::Disconnected);
}
