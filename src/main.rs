use anyhow::{anyhow, Context};
use clap::Parser;
use itertools::Itertools;
use midriver::config::Config;
use midriver::debugger::breakpoint::Breakpoint;
use midriver::debugger::event::{Event, LogChannel, Movement};
use midriver::debugger::thread::Thread;
use midriver::debugger::{Debugger, DebuggerBuilder};
use midriver::process::{self, Gdb, InferiorTty};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: ~/.config/midriver/config.toml)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Gdb executable
    #[clap(long, env = "MIDRIVER_GDB")]
    gdb: Option<String>,

    /// Directory the debugee was built in, relative source paths are resolved against it
    #[clap(long)]
    builddir: Option<PathBuf>,

    /// Log every byte exchanged with gdb (at trace level, target `mi::wire`)
    #[clap(long)]
    trace_wire: bool,

    /// Debugee program
    program: String,

    /// Debugee arguments
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

/// Shortcuts typed on stdin, anything else goes to gdb as is.
enum Input<'a> {
    Move(Movement),
    Break(&'a str, u32),
    Backtrace,
    Breakpoints,
    Raw(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Input<'a> {
        match line.split_whitespace().collect_vec().as_slice() {
            ["c" | "continue"] => Input::Move(Movement::Continue),
            ["n" | "next"] => Input::Move(Movement::StepOver),
            ["s" | "step"] => Input::Move(Movement::StepIn),
            ["finish"] => Input::Move(Movement::Finish),
            ["bt" | "backtrace"] => Input::Backtrace,
            ["info", "break"] => Input::Breakpoints,
            ["b" | "break", location] => match (*location).rsplit_once(':') {
                Some((file, number)) => match number.parse() {
                    Ok(number) => Input::Break(file, number),
                    Err(_) => Input::Raw(line),
                },
                None => Input::Raw(line),
            },
            _ => Input::Raw(line),
        }
    }
}

fn print_event(event: &Event) {
    match event {
        Event::Stopped(stop) => {
            let location = match (&stop.breakpoint.file, stop.breakpoint.line) {
                (Some(file), line) if line > 0 => format!(" at {file}:{line}"),
                _ => String::new(),
            };
            println!("stopped: {:?}{location}", stop.reason);
        }
        Event::Running => println!("running"),
        Event::BreakpointCreated(bp) => println!(
            "breakpoint {} at {}:{}",
            bp.id.as_deref().unwrap_or("?"),
            bp.file.as_deref().unwrap_or("??"),
            bp.line
        ),
        Event::ThreadGroupExited(group) => println!(
            "process {} exited with code {}",
            group.pid.as_deref().unwrap_or("?"),
            group.exit_code.as_deref().unwrap_or("0")
        ),
        Event::Log {
            channel: LogChannel::Console | LogChannel::Target,
            text,
        } => print!("{text}"),
        Event::Log {
            channel: LogChannel::Log,
            text,
        } => eprint!("{text}"),
        Event::Warning(text) => eprintln!("warning: {text}"),
        Event::LibraryLoaded(lib) => log::debug!(
            "library loaded: {}",
            lib.host_name.as_deref().unwrap_or(&lib.id)
        ),
        event => log::debug!("{event:?}"),
    }
}

fn execute(debugger: &Debugger, line: &str) {
    let result = match Input::parse(line) {
        Input::Move(movement) => debugger.move_execution(movement).wait(),
        Input::Break(file, number) => debugger
            .insert_breakpoint(&Breakpoint::at_line(file, number))
            .wait()
            .map(|_| ()),
        Input::Backtrace => debugger.list_frames(&Thread::new("1")).wait().map(|frames| {
            let text = frames
                .iter()
                .map(|frame| {
                    format!(
                        "#{} {} in {} at {}:{}",
                        frame.depth,
                        frame.address,
                        frame.function.as_deref().unwrap_or("??"),
                        frame.file.as_deref().unwrap_or("??"),
                        frame.line
                    )
                })
                .join("\n");
            println!("{text}");
        }),
        Input::Breakpoints => debugger.list_breakpoints().wait().map(|breakpoints| {
            for bp in breakpoints {
                println!(
                    "{}\t{}\t{}:{}",
                    bp.id.as_deref().unwrap_or("?"),
                    if bp.enabled { "y" } else { "n" },
                    bp.file.as_deref().unwrap_or("??"),
                    bp.line
                );
            }
        }),
        Input::Raw(text) => debugger.exec(None, text).wait().map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::from_file(args.config.as_deref()).context("load configuration")?;
    if args.trace_wire || config.trace_wire {
        midriver::log::enable_wire_trace();
    }

    let gdb_name = args.gdb.clone().unwrap_or_else(|| config.gdb.clone());
    let gdb = Gdb::new(&gdb_name, args.program.clone(), args.args.clone())?
        .with_gdb_args(config.gdb_args.clone());
    let version = process::probe_version(gdb.gdb())?;
    log::info!("using gdb {version}");

    let mut gdb = gdb.spawn()?;
    let (reader, writer) = gdb
        .take_io()
        .ok_or_else(|| anyhow!("gdb io is already taken"))?;

    let (events_tx, events_rx) = mpsc::channel();
    let mut builder = DebuggerBuilder::new().with_build_config(Arc::new(config.build_tree()));
    if let Some(dir) = args.builddir {
        builder = builder.with_builddir(dir);
    }
    let debugger = Arc::new(builder.build(events_tx));
    debugger.connect(reader, writer)?;

    let InferiorTty { mut master, path } = InferiorTty::open()?;
    debugger.set_inferior_tty(&path).wait()?;
    thread::spawn(move || {
        let mut buf = [0u8; 1024];
        let mut stdout = std::io::stdout();
        while let Ok(n @ 1..) = master.read(&mut buf) {
            _ = stdout.write_all(&buf[..n]);
            _ = stdout.flush();
        }
    });

    {
        let debugger = debugger.clone();
        ctrlc::set_handler(move || {
            if let Err(e) = debugger.interrupt(None).wait() {
                log::warn!("interrupt: {e}");
            }
        })?;
    }

    {
        let debugger = debugger.clone();
        thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if !line.is_empty() {
                    execute(&debugger, line);
                }
            }
        });
    }

    debugger.move_execution(Movement::Start).wait()?;

    for event in events_rx {
        print_event(&event);
        if event == Event::Disconnected {
            break;
        }
    }

    gdb.terminate()?;
    Ok(())
}
