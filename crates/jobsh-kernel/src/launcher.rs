//! Process launcher: fork one child per stage, wire pipes and redirections,
//! place the children in one process group, and exec.
//!
//! Program names are resolved in the parent before forking so the child only
//! has to dup descriptors, reset signals and exec. A child never returns into
//! shell logic: it leaves through `_exit`.

#![allow(unsafe_code)]

use std::ffi::{CString, OsStr};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::libc;
use nix::unistd::{self, AccessFlags, ForkResult, Pid};

use crate::builtins::{self, BuiltinKind};
use crate::error::{ShellError, Status};
use crate::pipeline::{Pipeline, StageDescriptor};
use crate::session::ShellSession;
use crate::signals;

/// What a stage's program name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    Builtin(BuiltinKind),
    External(PathBuf),
    NotFound(String),
}

/// Resolve `name` against the builtins, then as a path, then along
/// `search_path` (a `PATH`-style list).
pub fn resolve(name: &str, search_path: Option<&OsStr>) -> Program {
    if let Some(kind) = BuiltinKind::lookup(name) {
        return Program::Builtin(kind);
    }
    if name.contains('/') {
        return Program::External(PathBuf::from(name));
    }
    search_path
        .into_iter()
        .flat_map(|paths| std::env::split_paths(paths))
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
        .map_or_else(|| Program::NotFound(name.to_string()), Program::External)
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && unistd::access(path, AccessFlags::X_OK).is_ok()
}

/// Identifiers of a launched job, for the job table to record.
#[derive(Debug)]
pub struct SpawnedJob {
    pub group_id: Pid,
    /// Every forked member, in stage order.
    pub member_pids: Vec<Pid>,
    /// Set when a later stage could not be forked. The members above are
    /// still running and must be waited on.
    pub incomplete: Option<ShellError>,
}

struct PreparedStage<'a> {
    stage: &'a StageDescriptor,
    program: Option<Program>,
    argv: Vec<CString>,
}

fn prepare<'a>(
    stage: &'a StageDescriptor,
    search_path: Option<&OsStr>,
) -> Result<PreparedStage<'a>, ShellError> {
    let argv = stage
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ShellError::Syntax("argument contains a NUL byte".into()))?;
    let program = stage.program().map(|name| resolve(name, search_path));
    Ok(PreparedStage {
        stage,
        program,
        argv,
    })
}

/// Fork every stage of `pipeline`.
///
/// For k stages, k-1 pipes are allocated up front; stage i writes into pipe i
/// and stage i+1 reads from it. In interactive mode the first child leads a
/// new process group that the rest join, and a foreground job gets the
/// terminal as soon as its leader exists.
pub fn spawn(session: &mut ShellSession, pipeline: &Pipeline) -> Result<SpawnedJob, ShellError> {
    let search_path = session.search_path();
    let prepared = pipeline
        .stages
        .iter()
        .map(|stage| prepare(stage, search_path.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pipes = (0..pipeline.pipe_count())
        .map(|_| unistd::pipe())
        .collect::<Result<Vec<(OwnedFd, OwnedFd)>, _>>()
        .map_err(|source| ShellError::Resource {
            what: "pipe",
            source,
            fatal: false,
        })?;

    let interactive = session.is_interactive();
    let foreground = !pipeline.background;
    let count = prepared.len();

    // Anything still buffered would be written twice, once by each process.
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();

    let mut group: Option<Pid> = None;
    let mut members = Vec::with_capacity(count);
    let mut incomplete = None;

    for (index, stage) in prepared.iter().enumerate() {
        // SAFETY: the shell is single-threaded. The child only dups
        // descriptors, resets signal dispositions and then execs or runs a
        // builtin before `_exit`.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => {
                run_child(session, stage, index, count, &mut pipes, group, interactive)
            }
            Ok(ForkResult::Parent { child }) => {
                let pgid = *group.get_or_insert(child);
                tracing::debug!(pid = child.as_raw(), pgid = pgid.as_raw(), index, "forked stage");
                if interactive {
                    match unistd::setpgid(child, pgid) {
                        // The child already exec'd (EACCES) or exited (ESRCH)
                        // after placing itself.
                        Ok(()) | Err(Errno::EACCES) | Err(Errno::ESRCH) => {}
                        Err(e) => tracing::warn!("setpgid({}, {}) failed: {}", child, pgid, e),
                    }
                    if index == 0 && foreground {
                        if let Some(term) = session.terminal_mut() {
                            if let Err(e) = term.give_to(pgid, None) {
                                tracing::warn!("handing terminal to {} failed: {}", pgid, e);
                            }
                        }
                    }
                }
                members.push(child);
            }
            Err(source) => {
                let fatal = members.is_empty();
                let err = ShellError::Resource {
                    what: "fork",
                    source,
                    fatal,
                };
                if fatal {
                    return Err(err);
                }
                incomplete = Some(err);
                break;
            }
        }
    }

    // Closing our copies lets readers see end-of-input once the writers exit.
    drop(pipes);

    let group_id = group.ok_or(ShellError::Resource {
        what: "fork",
        source: Errno::EAGAIN,
        fatal: true,
    })?;
    Ok(SpawnedJob {
        group_id,
        member_pids: members,
        incomplete,
    })
}

/// Child side of [`spawn`]. Never returns.
fn run_child(
    session: &mut ShellSession,
    stage: &PreparedStage<'_>,
    index: usize,
    count: usize,
    pipes: &mut Vec<(OwnedFd, OwnedFd)>,
    group: Option<Pid>,
    interactive: bool,
) -> ! {
    if interactive {
        let pgid = group.unwrap_or(Pid::from_raw(0));
        let _ = unistd::setpgid(Pid::from_raw(0), pgid);
    }

    let status = match exec_stage(session, stage, index, count, pipes) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{err}");
            err.child_status()
        }
    };
    exit_child(status)
}

fn exec_stage(
    session: &mut ShellSession,
    prepared: &PreparedStage<'_>,
    index: usize,
    count: usize,
    pipes: &mut Vec<(OwnedFd, OwnedFd)>,
) -> Result<Status, ShellError> {
    if let Err(e) = signals::restore_default_signals() {
        tracing::warn!("restoring signal defaults failed: {}", e);
    }

    if index > 0 {
        redirect_fd(pipes[index - 1].0.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if index + 1 < count {
        redirect_fd(pipes[index].1.as_raw_fd(), libc::STDOUT_FILENO)?;
    }
    pipes.clear();

    if let Some(path) = &prepared.stage.input {
        let file = open_input(path)?;
        redirect_fd(file.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if let Some(path) = &prepared.stage.output {
        let file = open_output(path)?;
        redirect_fd(file.as_raw_fd(), libc::STDOUT_FILENO)?;
    }

    match &prepared.program {
        None => Ok(0),
        Some(Program::Builtin(kind)) => {
            // Runs on the child's copy of the session; it must not move the
            // terminal.
            session.detach_terminal();
            let mut out = std::io::stdout();
            Ok(builtins::run(*kind, &prepared.stage.argv, session, &mut out))
        }
        Some(Program::External(path)) => {
            let c_path = CString::new(path.as_os_str().as_bytes())
                .map_err(|_| ShellError::Syntax("path contains a NUL byte".into()))?;
            match unistd::execv(&c_path, &prepared.argv) {
                Ok(never) => match never {},
                Err(source) => Err(ShellError::Exec {
                    path: path.display().to_string(),
                    source,
                }),
            }
        }
        Some(Program::NotFound(name)) => Err(ShellError::CommandNotFound(name.clone())),
    }
}

fn redirect_fd(from: RawFd, to: RawFd) -> Result<(), ShellError> {
    unistd::dup2(from, to).map_err(|source| ShellError::Resource {
        what: "dup2",
        source,
        fatal: false,
    })?;
    Ok(())
}

/// Open a `<` redirection target.
pub(crate) fn open_input(path: &Path) -> Result<File, ShellError> {
    File::open(path).map_err(|source| ShellError::Path {
        path: path.display().to_string(),
        source,
    })
}

/// Open a `>` redirection target: create or truncate, mode 0644.
pub(crate) fn open_output(path: &Path) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .map_err(|source| ShellError::Path {
            path: path.display().to_string(),
            source,
        })
}

fn exit_child(status: Status) -> ! {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    // SAFETY: `_exit` skips atexit handlers and destructors that belong to
    // the parent's copy of this process image.
    unsafe { libc::_exit(status) }
}
