use crate::common::env;
use midriver::debugger::address::{Address, AddressRange};
use midriver::debugger::event::{Event, Movement, StopReason};
use midriver::debugger::frame::Frame;
use midriver::debugger::thread::Thread;

#[test]
fn test_start() {
    let mut env = env();

    let started = env.debugger.move_execution(Movement::Start);
    env.gdb.expect("003-data-list-register-names");
    env.gdb.expect("004-exec-run --all --start");
    env.gdb.reply(
        "003^done,register-names=[\"rax\",\"rbx\",\"rcx\"]\n\
         =thread-group-started,id=\"i1\",pid=\"4242\"\n\
         =thread-created,id=\"1\",group-id=\"i1\"\n\
         004^running\n\
         *running,thread-id=\"all\"\n\
         (gdb) \n",
    );
    started.wait().unwrap();

    let Event::ThreadGroupStarted(group) = env.next_event() else {
        panic!("thread group started event expected");
    };
    assert_eq!(group.pid.as_deref(), Some("4242"));
    let Event::ThreadAdded(thread) = env.next_event() else {
        panic!("thread added event expected");
    };
    assert_eq!(thread.id, "1");
    assert_eq!(env.next_event(), Event::Running);
    assert_eq!(env.next_event(), Event::ThreadSelected(Thread::new("1")));
}

#[test]
fn test_breakpoint_hit() {
    let mut env = env();

    env.gdb.reply(
        "*stopped,reason=\"breakpoint-hit\",disp=\"keep\",bkptno=\"1\",\
         frame={addr=\"0x0000000000401136\",func=\"main\",args=[],file=\"main.c\",\
         fullname=\"/nonexistent/main.c\",line=\"10\",arch=\"i386:x86-64\"},\
         thread-id=\"1\",stopped-threads=\"all\",core=\"3\"\n",
    );

    let Event::Stopped(stop) = env.next_event() else {
        panic!("stopped event expected");
    };
    assert_eq!(stop.reason, StopReason::BreakpointHit);
    assert_eq!(stop.breakpoint.id.as_deref(), Some("1"));
    assert_eq!(stop.breakpoint.address, Address::from(0x401136u64));
    assert_eq!(stop.breakpoint.file.as_deref(), Some("main.c"));
    assert_eq!(stop.breakpoint.line, 10);
    assert_eq!(stop.thread.as_deref(), Some("1"));

    env.gdb.expect("003-break-list");
}

#[test]
fn test_exit_ends_gdb() {
    let mut env = env();

    env.gdb
        .reply("*stopped,reason=\"exited-normally\"\n=thread-group-exited,id=\"i1\",exit-code=\"0\"\n");

    let Event::Stopped(stop) = env.next_event() else {
        panic!("stopped event expected");
    };
    assert_eq!(stop.reason, StopReason::ExitedNormally);
    let Event::ThreadGroupExited(group) = env.next_event() else {
        panic!("thread group exited event expected");
    };
    assert_eq!(group.exit_code.as_deref(), Some("0"));

    env.gdb.expect("003-break-list");
    env.gdb.expect("004-gdb-exit");
}

#[test]
fn test_library_events() {
    let mut env = env();

    env.gdb.reply(
        "=library-loaded,id=\"/lib/libc.so.6\",target-name=\"/lib/libc.so.6\",\
         host-name=\"/lib/libc.so.6\",symbols-loaded=\"0\",thread-group=\"i1\",\
         ranges=[{from=\"0x00007ffff7dab700\",to=\"0x00007ffff7f3d93d\"},{from=\"0x0\",to=\"0x0\"}]\n",
    );

    let Event::LibraryLoaded(library) = env.next_event() else {
        panic!("library loaded event expected");
    };
    assert_eq!(library.host_name.as_deref(), Some("/lib/libc.so.6"));
    assert_eq!(
        library.ranges,
        vec![AddressRange::new(0x7ffff7dab700u64, 0x7ffff7f3d93du64)]
    );
}

#[test]
fn test_inspection() {
    let mut env = env();
    let thread = Thread::new("1");

    let frames = env.debugger.list_frames(&thread);
    env.gdb.expect("-thread-select 1");
    env.gdb.expect("003-stack-list-frames");
    env.gdb.reply(
        "^done,new-thread-id=\"1\",frame={level=\"0\",addr=\"0x401136\",func=\"main\"}\n\
         003^done,stack=[frame={level=\"0\",addr=\"0x0000000000401136\",func=\"main\",\
         file=\"main.c\",fullname=\"/nonexistent/main.c\",line=\"10\",arch=\"i386:x86-64\"}]\n",
    );
    let frames = frames.wait().unwrap();
    assert_eq!(
        frames,
        vec![Frame {
            address: Address::from(0x401136u64),
            function: Some("main".to_string()),
            file: Some("main.c".to_string()),
            line: 10,
            depth: 0,
        }]
    );

    let locals = env.debugger.list_locals(&thread, &frames[0]);
    env.gdb.expect("-thread-select 1");
    env.gdb.expect("-stack-select-frame 0");
    env.gdb.expect("004-stack-list-locals --simple-values");
    env.gdb.expect("-stack-select-frame 0");
    env.gdb.reply(
        "^done\n^done\n004^done,locals=[{name=\"n\",type=\"int\",value=\"5\"},{name=\"buf\",type=\"char [16]\"}]\n^done\n",
    );
    let locals = locals.wait().unwrap();
    assert_eq!(locals.len(), 2);
    assert_eq!(locals[0].value.as_deref(), Some("5"));
    assert_eq!(locals[1].value, None);
}

#[test]
fn test_raw_command_with_splice() {
    let mut env = env();

    let reply = env
        .debugger
        .exec(None, "-stack-select-frame 1\n@@@@-stack-info-frame");
    env.gdb.expect("-stack-select-frame 1");
    env.gdb.expect("003-stack-info-frame");
    env.gdb
        .reply("^done\n003^done,frame={level=\"1\",addr=\"0x401150\",func=\"f\"}\n");

    let record = reply.wait().unwrap().unwrap();
    assert_eq!(record.token.as_deref(), Some("003"));
}
