use crate::common::env;
use midriver::debugger::breakpoint::{Breakpoint, BreakpointChange, Disposition};
use midriver::debugger::error::Error;
use midriver::debugger::event::Event;

const BKPT: &str = r#"bkpt={number="1",type="breakpoint",disp="keep",enabled="y",addr="0x0000000000401136",func="main",file="main.c",fullname="/nonexistent/src/main.c",line="10",thread-groups=["i1"],times="0",original-location="main.c:10"}"#;

#[test]
fn test_insert_breakpoint() {
    let mut env = env();

    let inserted = env
        .debugger
        .insert_breakpoint(&Breakpoint::at_line("main.c", 10));
    env.gdb
        .expect("003-break-insert --source main.c --line 10");
    env.gdb.reply(&format!("003^done,{BKPT}\n(gdb) \n"));

    let bp = inserted.wait().unwrap();
    assert_eq!(bp.id.as_deref(), Some("1"));
    assert_eq!(bp.function.as_deref(), Some("main"));
    assert_eq!(bp.file.as_deref(), Some("main.c"));
    assert_eq!(bp.line, 10);
    assert_eq!(bp.address.as_u64(), 0x401136);
    assert_eq!(bp.disposition, Disposition::Keep);
    assert!(bp.enabled);

    assert_eq!(env.next_event(), Event::BreakpointCreated(bp.clone()));
    assert_eq!(env.debugger.breakpoints().wait().unwrap(), vec![bp]);
}

#[test]
fn test_insert_conditional_breakpoint() {
    let mut env = env();

    let _ = env.debugger.insert_breakpoint(
        &Breakpoint::at_function("main.c", "compute")
            .with_condition("n > 3")
            .with_thread("2")
            .disabled(),
    );
    env.gdb.expect(
        "003-break-insert -d -c \"n > 3\" -p 2 --source main.c --function compute",
    );
}

#[test]
fn test_insert_breakpoint_error() {
    let mut env = env();

    let inserted = env
        .debugger
        .insert_breakpoint(&Breakpoint::at_line("nope.c", 1));
    env.gdb
        .expect("003-break-insert --source nope.c --line 1");
    env.gdb
        .reply("003^error,msg=\"No source file named nope.c.\"\n");

    assert!(matches!(inserted.wait(), Err(Error::Remote(_))));
    env.no_events();
}

#[test]
fn test_breakpoint_notifications() {
    let mut env = env();

    env.gdb.reply(&format!("=breakpoint-created,{BKPT}\n"));
    let Event::BreakpointCreated(created) = env.next_event() else {
        panic!("breakpoint created event expected");
    };
    assert_eq!(created.line, 10);

    env.gdb.reply(
        &format!("=breakpoint-modified,{}\n", BKPT.replace("times=\"0\"", "times=\"1\"")),
    );
    let Event::BreakpointModified(modified) = env.next_event() else {
        panic!("breakpoint modified event expected");
    };
    assert_eq!(modified.count, 1);

    env.gdb.reply("=breakpoint-deleted,id=\"1\"\n");
    let Event::BreakpointRemoved(removed) = env.next_event() else {
        panic!("breakpoint removed event expected");
    };
    assert_eq!(removed.id.as_deref(), Some("1"));
    assert!(env.debugger.breakpoints().wait().unwrap().is_empty());
}

#[test]
fn test_remove_and_disable() {
    let mut env = env();
    let mut bp = Breakpoint::at_line("main.c", 10);
    bp.id = Some("4".to_string());

    let removed = env.debugger.remove_breakpoint(&bp);
    env.gdb.expect("003-break-delete 4");
    env.gdb.reply("003^done\n");
    removed.wait().unwrap();
    assert_eq!(env.next_event(), Event::BreakpointRemoved(bp.clone()));

    let disabled = env
        .debugger
        .modify_breakpoint(BreakpointChange::Enabled, &bp.clone().disabled());
    env.gdb.expect("004-break-disable 4");
    env.gdb.reply("004^done\n");
    disabled.wait().unwrap();
    env.gdb.expect("005-break-list");
}

#[test]
fn test_list_breakpoints() {
    let mut env = env();

    let list = env.debugger.list_breakpoints();
    env.gdb.expect("003-break-info");
    env.gdb.reply(&format!(
        "003^done,BreakpointTable={{nr_rows=\"1\",nr_cols=\"6\",hdr=[],body=[{BKPT}]}}\n"
    ));

    let breakpoints = list.wait().unwrap();
    assert_eq!(breakpoints.len(), 1);
    assert_eq!(breakpoints[0].id.as_deref(), Some("1"));
    assert_eq!(breakpoints[0].line, 10);
}

#[test]
fn test_reload_completes_after_reply() {
    let mut env = env();

    let reloaded = env.debugger.reload_breakpoints();
    env.gdb.expect("003-break-list");
    assert!(reloaded.try_take().is_none());

    env.gdb.reply(&format!(
        "003^done,BreakpointTable={{nr_rows=\"1\",nr_cols=\"6\",hdr=[],body=[{BKPT}]}}\n"
    ));
    reloaded.wait().unwrap();
    let Event::BreakpointModified(bp) = env.next_event() else {
        panic!("breakpoint modified event expected");
    };
    assert_eq!(bp.id.as_deref(), Some("1"));
}
