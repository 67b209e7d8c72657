//! Gdb process launcher.

use crate::debugger::error::Error;
use crate::version::Version;
use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::unistd::{setsid, Pid};
use os_pipe::{PipeReader, PipeWriter};
use std::marker::PhantomData;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Process state.
pub trait State {}

/// Gdb is running.
pub struct Running;

impl State for Running {}

/// Gdb command line is prepared but not started.
pub struct Template;

impl State for Template {}

/// Terminal for the debugee io. Gdb owns the slave side, the master side
/// stays with the caller.
pub struct InferiorTty {
    pub master: PtyMaster,
    pub path: PathBuf,
}

impl InferiorTty {
    pub fn open() -> Result<Self, Error> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY | OFlag::O_CLOEXEC)
            .map_err(|e| Error::Syscall("posix_openpt", e))?;
        grantpt(&master).map_err(|e| Error::Syscall("grantpt", e))?;
        unlockpt(&master).map_err(|e| Error::Syscall("unlockpt", e))?;
        let path = ptsname_r(&master).map_err(|e| Error::Syscall("ptsname", e))?;

        Ok(Self {
            master,
            path: PathBuf::from(path),
        })
    }
}

/// Gdb process talking MI over a pair of pipes.
pub struct Gdb<S: State> {
    gdb: PathBuf,
    gdb_args: Vec<String>,
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    child: Option<std::process::Child>,
    io: Option<(PipeReader, PipeWriter)>,
    _p: PhantomData<S>,
}

impl Gdb<Template> {
    /// Prepare gdb for debugging `program`.
    ///
    /// # Arguments
    ///
    /// * `gdb`: gdb executable, a name is looked up in `PATH`
    /// * `program`: debugee
    /// * `args`: debugee arguments
    pub fn new<ARGS: IntoIterator<Item = I>, I: Into<String>>(
        gdb: impl AsRef<Path>,
        program: impl Into<String>,
        args: ARGS,
    ) -> Result<Self, Error> {
        Ok(Self {
            gdb: which::which(gdb.as_ref())?,
            gdb_args: vec![],
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            child: None,
            io: None,
            _p: PhantomData,
        })
    }

    /// Extra gdb arguments, placed before the debugee.
    pub fn with_gdb_args<ARGS: IntoIterator<Item = I>, I: Into<String>>(
        mut self,
        args: ARGS,
    ) -> Self {
        self.gdb_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Start gdb in its own session, so terminal signals reach the debugger
    /// and not gdb.
    pub fn spawn(self) -> Result<Gdb<Running>, Error> {
        let (out_reader, out_writer) = os_pipe::pipe()?;
        let (in_reader, in_writer) = os_pipe::pipe()?;

        let child = {
            let mut cmd = Command::new(&self.gdb);
            cmd.args(self.command_line())
                .stdin(in_reader)
                .stdout(out_writer)
                .stderr(Stdio::inherit());
            if let Some(cwd) = self.cwd.as_deref() {
                cmd.current_dir(cwd);
            }

            unsafe {
                cmd.pre_exec(|| {
                    setsid()?;
                    Ok(())
                });
            }

            // command owns the child ends of pipes, they close with it
            cmd.spawn()?
        };

        log::info!(target: "mi::session", "gdb started, pid {}", child.id());

        let mut template = self;
        Ok(Gdb {
            gdb: std::mem::take(&mut template.gdb),
            gdb_args: std::mem::take(&mut template.gdb_args),
            program: std::mem::take(&mut template.program),
            args: std::mem::take(&mut template.args),
            cwd: template.cwd.take(),
            child: Some(child),
            io: Some((out_reader, in_writer)),
            _p: PhantomData,
        })
    }
}

impl Gdb<Running> {
    pub fn pid(&self) -> Option<Pid> {
        self.child
            .as_ref()
            .map(|child| Pid::from_raw(child.id() as i32))
    }

    /// Take gdb stdout reader and stdin writer. Available once.
    pub fn take_io(&mut self) -> Option<(PipeReader, PipeWriter)> {
        self.io.take()
    }

    /// Stop gdb and reap it.
    pub fn terminate(&mut self) -> Result<(), Error> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let pid = Pid::from_raw(child.id() as i32);
        if let Ok(None) = child.try_wait() {
            kill(pid, Signal::SIGTERM).map_err(|e| Error::Syscall("kill", e))?;
        }
        let status = child.wait()?;
        log::info!(target: "mi::session", "gdb exited with {status}");
        Ok(())
    }
}

impl<S: State> Gdb<S> {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn gdb(&self) -> &Path {
        &self.gdb
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Gdb arguments.
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec!["--interpreter=mi2".to_string()];
        line.extend(self.gdb_args.iter().cloned());
        line.push("--args".to_string());
        line.push(self.program.clone());
        line.extend(self.args.iter().cloned());
        line
    }
}

impl<S: State> Drop for Gdb<S> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
            _ = child.wait();
        }
    }
}

/// Run `gdb --version` and parse the result.
pub fn probe_version(gdb: impl AsRef<Path>) -> Result<Version, Error> {
    let output = Command::new(gdb.as_ref())
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = Version::gdb_parse(&stdout).ok_or(Error::UnrecognizedVersion)?;
    if !version.is_supported() {
        log::warn!(
            target: "mi::session",
            "gdb {version} is older than {}, asynchronous mode is not available",
            Version::MIN_SUPPORTED
        );
    }
    Ok(version)
}
