//! Out-of-band MI records to typed debugger events.

use crate::debugger::address::{Address, AddressRange};
use crate::debugger::breakpoint::{BreakMode, Breakpoint, Disposition};
use crate::debugger::event::{Event, StopEvent, StopReason};
use crate::debugger::library::Library;
use crate::debugger::path::PathTranslator;
use crate::debugger::thread::{Thread, ThreadGroup};
use crate::mi::{AsyncClass, AsyncRecord, Lookup, MiResult};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported async record class `{0}`")]
    Unsupported(String),
    #[error("`{0}` record without `{1}` field")]
    MissingField(&'static str, &'static str),
}

/// Decode an exec or notify record. `Ok(None)` means the record carries nothing
/// a debugger client is interested in.
pub fn decode_async(
    translator: &PathTranslator,
    record: &AsyncRecord,
) -> Result<Option<Event>, DecodeError> {
    let results = record.results.as_slice();

    let event = match &record.class {
        AsyncClass::ThreadGroupAdded => Event::ThreadGroupAdded(thread_group(results)?),
        AsyncClass::ThreadGroupRemoved => Event::ThreadGroupRemoved(thread_group(results)?),
        AsyncClass::ThreadGroupStarted => Event::ThreadGroupStarted(thread_group(results)?),
        AsyncClass::ThreadGroupExited => Event::ThreadGroupExited(thread_group(results)?),
        AsyncClass::ThreadCreated => Event::ThreadAdded(thread(results)?),
        AsyncClass::ThreadExited => Event::ThreadRemoved(thread(results)?),
        AsyncClass::ThreadSelected => Event::ThreadSelected(thread(results)?),
        AsyncClass::BreakpointCreated => {
            Event::BreakpointCreated(decode_breakpoint(translator, results))
        }
        AsyncClass::BreakpointModified => {
            Event::BreakpointModified(decode_breakpoint(translator, results))
        }
        AsyncClass::BreakpointDeleted => {
            Event::BreakpointRemoved(decode_breakpoint(translator, results))
        }
        AsyncClass::Running => Event::Running,
        AsyncClass::Stopped => Event::Stopped(stop_event(translator, results)),
        AsyncClass::LibraryLoaded => Event::LibraryLoaded(library(results)?),
        AsyncClass::LibraryUnloaded => Event::LibraryUnloaded(library(results)?),
        AsyncClass::CmdParamChanged
        | AsyncClass::Download
        | AsyncClass::MemoryChanged
        | AsyncClass::RecordStarted
        | AsyncClass::RecordStopped
        | AsyncClass::TraceframeChanged
        | AsyncClass::TsvCreated
        | AsyncClass::TsvDeleted
        | AsyncClass::TsvModified => return Ok(None),
        AsyncClass::Unsupported(class) => return Err(DecodeError::Unsupported(class.clone())),
    };

    Ok(Some(event))
}

fn thread_group(results: &[MiResult]) -> Result<ThreadGroup, DecodeError> {
    Ok(ThreadGroup {
        id: results
            .get_str("id")
            .ok_or(DecodeError::MissingField("thread-group", "id"))?
            .to_string(),
        pid: results.get_str("pid").map(ToString::to_string),
        exit_code: results.get_str("exit-code").map(ToString::to_string),
    })
}

fn thread(results: &[MiResult]) -> Result<Thread, DecodeError> {
    Ok(Thread {
        id: results
            .get_str("id")
            .ok_or(DecodeError::MissingField("thread", "id"))?
            .to_string(),
        group: results.get_str("group-id").map(ToString::to_string),
    })
}

fn library(results: &[MiResult]) -> Result<Library, DecodeError> {
    let ranges = results
        .get_list("ranges")
        .unwrap_or_default()
        .iter()
        .filter_map(|range| {
            let range = range.value.as_tuple()?;
            let range = AddressRange {
                from: Address::parse(range.get_str("from")?),
                to: Address::parse(range.get_str("to")?),
            };
            range.is_valid().then_some(range)
        })
        .collect();

    Ok(Library {
        id: results
            .get_str("id")
            .ok_or(DecodeError::MissingField("library", "id"))?
            .to_string(),
        host_name: results.get_str("host-name").map(ToString::to_string),
        target_name: results.get_str("target-name").map(ToString::to_string),
        ranges,
    })
}

fn parse_line_number(line: Option<&str>) -> u32 {
    line.and_then(|l| l.parse().ok()).unwrap_or_default()
}

/// Decode breakpoint fields. Gdb sends them either directly in the record or
/// wrapped in a `bkpt` tuple, both forms give the same result.
pub fn decode_breakpoint(translator: &PathTranslator, results: &[MiResult]) -> Breakpoint {
    let fields = results.get_tuple("bkpt").unwrap_or(results);
    let owned = |name: &str| fields.get_str(name).map(ToString::to_string);

    Breakpoint {
        id: owned("id").or_else(|| owned("number")),
        mode: fields
            .get_str("type")
            .map(BreakMode::from_mi)
            .unwrap_or_default(),
        disposition: fields
            .get_str("disp")
            .map(Disposition::from_mi)
            .unwrap_or_default(),
        enabled: fields.get_str("enabled") == Some("y"),
        address: fields
            .get_str("addr")
            .map(Address::parse)
            .unwrap_or(Address::INVALID),
        function: owned("func"),
        file: translator.choose_file(fields.get_str("file"), fields.get_str("fullname")),
        line: parse_line_number(fields.get_str("line")),
        count: fields
            .get_str("times")
            .and_then(|t| t.parse().ok())
            .unwrap_or_default(),
        thread: owned("thread"),
        condition: owned("cond"),
    }
}

fn stop_event(translator: &PathTranslator, results: &[MiResult]) -> StopEvent {
    let thread = results.get_str("thread-id").map(ToString::to_string);
    let frame = results.get_tuple("frame").unwrap_or_default();

    let breakpoint = Breakpoint {
        id: results.get_str("bkptno").map(ToString::to_string),
        disposition: results
            .get_str("disp")
            .map(Disposition::from_mi)
            .unwrap_or_default(),
        enabled: true,
        address: frame
            .get_str("addr")
            .map(Address::parse)
            .unwrap_or(Address::INVALID),
        function: frame.get_str("func").map(ToString::to_string),
        file: translator.choose_file(frame.get_str("file"), frame.get_str("fullname")),
        line: parse_line_number(frame.get_str("line")),
        thread: thread.clone(),
        ..Breakpoint::default()
    };

    StopEvent {
        reason: results
            .get_str("reason")
            .map(StopReason::from_mi)
            .unwrap_or(StopReason::Unknown),
        breakpoint,
        thread,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::debugger::event::CatchKind;
    use crate::mi::parser::parse_line;
    use crate::mi::{OobRecord, ParsedOutput};

    fn async_record(line: &str) -> AsyncRecord {
        match parse_line(line) {
            ParsedOutput::OutOfBand(OobRecord::Async(r)) => r,
            other => panic!("async record expected, got {other:?}"),
        }
    }

    fn decode(line: &str) -> Result<Option<Event>, DecodeError> {
        decode_async(&PathTranslator::default(), &async_record(line))
    }

    #[test]
    fn test_decode_threads() {
        struct TestCase {
            line: &'static str,
            expected: Event,
        }
        let cases = vec![
            TestCase {
                line: r#"=thread-group-added,id="i1""#,
                expected: Event::ThreadGroupAdded(ThreadGroup::new("i1")),
            },
            TestCase {
                line: r#"=thread-group-started,id="i1",pid="4242""#,
                expected: Event::ThreadGroupStarted(ThreadGroup {
                    id: "i1".to_string(),
                    pid: Some("4242".to_string()),
                    exit_code: None,
                }),
            },
            TestCase {
                line: r#"=thread-group-exited,id="i1",exit-code="03""#,
                expected: Event::ThreadGroupExited(ThreadGroup {
                    id: "i1".to_string(),
                    pid: None,
                    exit_code: Some("03".to_string()),
                }),
            },
            TestCase {
                line: r#"=thread-created,id="2",group-id="i1""#,
                expected: Event::ThreadAdded(Thread {
                    id: "2".to_string(),
                    group: Some("i1".to_string()),
                }),
            },
            TestCase {
                line: r#"=thread-exited,id="2",group-id="i1""#,
                expected: Event::ThreadRemoved(Thread {
                    id: "2".to_string(),
                    group: Some("i1".to_string()),
                }),
            },
            TestCase {
                line: r#"=thread-selected,id="3",frame={level="0",func="f"}"#,
                expected: Event::ThreadSelected(Thread::new("3")),
            },
            TestCase {
                line: r#"*running,thread-id="all""#,
                expected: Event::Running,
            },
        ];

        for tc in cases {
            assert_eq!(decode(tc.line).unwrap(), Some(tc.expected), "{}", tc.line);
        }

        assert_eq!(
            decode(r#"=thread-created,group-id="i1""#),
            Err(DecodeError::MissingField("thread", "id"))
        );
    }

    #[test]
    fn test_decode_breakpoint_wrapped_and_flat() {
        let wrapped = decode(
            r#"=breakpoint-modified,bkpt={number="1",type="breakpoint",disp="del",enabled="y",addr="0x401136",func="main",file="main.c",line="10",times="1",thread="2",cond="i > 0"}"#,
        )
        .unwrap();
        let flat = decode(
            r#"=breakpoint-modified,number="1",type="breakpoint",disp="del",enabled="y",addr="0x401136",func="main",file="main.c",line="10",times="1",thread="2",cond="i > 0""#,
        )
        .unwrap();

        let expected = Breakpoint {
            id: Some("1".to_string()),
            mode: BreakMode::Breakpoint,
            disposition: Disposition::DeleteNextHit,
            enabled: true,
            address: Address::from(0x401136),
            function: Some("main".to_string()),
            file: Some("main.c".to_string()),
            line: 10,
            count: 1,
            thread: Some("2".to_string()),
            condition: Some("i > 0".to_string()),
        };
        assert_eq!(wrapped, Some(Event::BreakpointModified(expected.clone())));
        assert_eq!(flat, wrapped);
    }

    #[test]
    fn test_decode_breakpoint_created_and_deleted() {
        let translator = PathTranslator::with_builddir("/work/build");

        let created = decode_async(
            &translator,
            &async_record(
                r#"=breakpoint-created,bkpt={number="4",type="hw watchpoint",disp="keep",enabled="n",addr="<PENDING>",file="src/a.c",fullname="/nonexistent/a.c",line="7"}"#,
            ),
        )
        .unwrap();
        let Some(Event::BreakpointCreated(bp)) = created else {
            panic!("breakpoint created event expected");
        };
        assert_eq!(bp.mode, BreakMode::Watchpoint);
        assert!(!bp.enabled);
        assert_eq!(bp.address, Address::INVALID);
        assert_eq!(bp.file.as_deref(), Some("/work/build/src/a.c"));

        let deleted = decode(r#"=breakpoint-deleted,id="4""#).unwrap();
        assert_eq!(
            deleted,
            Some(Event::BreakpointRemoved(Breakpoint {
                id: Some("4".to_string()),
                ..Breakpoint::default()
            }))
        );
    }

    #[test]
    fn test_decode_stopped() {
        let exited = decode(r#"*stopped,reason="exited-normally",thread-id="1""#).unwrap();
        let Some(Event::Stopped(stop)) = exited else {
            panic!("stopped event expected");
        };
        assert_eq!(stop.reason, StopReason::ExitedNormally);
        assert_eq!(stop.breakpoint.id, None);
        assert_eq!(stop.thread.as_deref(), Some("1"));

        let hit = decode(
            r#"*stopped,reason="breakpoint-hit",disp="keep",bkptno="1",frame={addr="0x0000000000401136",func="main",args=[],file="main.c",fullname="/nonexistent/main.c",line="10",arch="i386:x86-64"},thread-id="1",stopped-threads="all",core="3""#,
        )
        .unwrap();
        let Some(Event::Stopped(stop)) = hit else {
            panic!("stopped event expected");
        };
        assert_eq!(stop.reason, StopReason::BreakpointHit);
        assert_eq!(stop.breakpoint.id.as_deref(), Some("1"));
        assert_eq!(stop.breakpoint.address, Address::from(0x401136));
        assert_eq!(stop.breakpoint.function.as_deref(), Some("main"));
        assert_eq!(stop.breakpoint.file.as_deref(), Some("main.c"));
        assert_eq!(stop.breakpoint.line, 10);

        let caught = decode(r#"*stopped,reason="fork",newpid="77",thread-id="1""#).unwrap();
        assert!(matches!(
            caught,
            Some(Event::Stopped(StopEvent {
                reason: StopReason::Catch(CatchKind::Fork),
                ..
            }))
        ));

        let bare = decode(r#"*stopped"#).unwrap();
        assert!(matches!(
            bare,
            Some(Event::Stopped(StopEvent {
                reason: StopReason::Unknown,
                thread: None,
                ..
            }))
        ));
    }

    #[test]
    fn test_decode_library() {
        let loaded = decode(
            r#"=library-loaded,id="/lib64/libc.so.6",target-name="/lib64/libc.so.6",host-name="/lib64/libc.so.6",symbols-loaded="0",thread-group="i1",ranges=[{from="0x00007ffff7dc2700",to="0x00007ffff7f3893d"},{from="0x0",to="0x10"},{from="garbage",to="0x20"}]"#,
        )
        .unwrap();

        assert_eq!(
            loaded,
            Some(Event::LibraryLoaded(Library {
                id: "/lib64/libc.so.6".to_string(),
                host_name: Some("/lib64/libc.so.6".to_string()),
                target_name: Some("/lib64/libc.so.6".to_string()),
                ranges: vec![AddressRange::new(0x7ffff7dc2700u64, 0x7ffff7f3893du64)],
            }))
        );

        let unloaded = decode(r#"=library-unloaded,id="/lib/x.so",thread-group="i1""#).unwrap();
        assert!(matches!(unloaded, Some(Event::LibraryUnloaded(lib)) if lib.ranges.is_empty()));
    }

    #[test]
    fn test_ignored_and_unsupported() {
        for line in [
            r#"=cmd-param-changed,param="print pretty",value="on""#,
            r#"=memory-changed,thread-group="i1",addr="0x1",len="0x4""#,
            r#"=tsv-created,name="trace",initial="0""#,
            r#"=record-started,thread-group="i1",method="full""#,
            r#"=traceframe-changed,num="1",tracepoint="2""#,
        ] {
            assert_eq!(decode(line), Ok(None), "{line}");
        }

        assert_eq!(
            decode(r#"=shiny-new-event,x="1""#),
            Err(DecodeError::Unsupported("shiny-new-event".to_string()))
        );
    }
}
