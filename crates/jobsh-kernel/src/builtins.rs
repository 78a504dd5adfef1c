//! Builtin commands.
//!
//! Each [`BuiltinKind`] maps to a plain function taking the arguments, the
//! session, and an output sink. Errors are printed here as `name: message`
//! and turn into status 1.

use std::io::Write;
use std::path::PathBuf;

use crate::error::{ShellError, Status};
use crate::session::ShellSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Help,
    Exit,
    Pwd,
    Cd,
    Wait,
    Fg,
    Bg,
    Jobs,
}

type Handler = fn(&[String], &mut ShellSession, &mut dyn Write) -> Result<Status, ShellError>;

struct Entry {
    name: &'static str,
    kind: BuiltinKind,
    doc: &'static str,
    handler: Handler,
}

/// One row per variant, in declaration order.
static TABLE: [Entry; 8] = [
    Entry { name: "help", kind: BuiltinKind::Help, doc: "show this help menu", handler: cmd_help },
    Entry { name: "exit", kind: BuiltinKind::Exit, doc: "exit the command shell", handler: cmd_exit },
    Entry { name: "pwd", kind: BuiltinKind::Pwd, doc: "print current working directory", handler: cmd_pwd },
    Entry { name: "cd", kind: BuiltinKind::Cd, doc: "change current working directory", handler: cmd_cd },
    Entry { name: "wait", kind: BuiltinKind::Wait, doc: "wait for all background jobs to finish", handler: cmd_wait },
    Entry { name: "fg", kind: BuiltinKind::Fg, doc: "move a job to the foreground", handler: cmd_fg },
    Entry { name: "bg", kind: BuiltinKind::Bg, doc: "resume a stopped job in the background", handler: cmd_bg },
    Entry { name: "jobs", kind: BuiltinKind::Jobs, doc: "list jobs", handler: cmd_jobs },
];

impl BuiltinKind {
    /// Look up a builtin by command name. `?` is an alias for `help`.
    pub fn lookup(name: &str) -> Option<Self> {
        if name == "?" {
            return Some(BuiltinKind::Help);
        }
        TABLE.iter().find(|e| e.name == name).map(|e| e.kind)
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn doc(self) -> &'static str {
        self.entry().doc
    }

    fn entry(self) -> &'static Entry {
        &TABLE[self as usize]
    }
}

/// Run a builtin and report its error, if any, on stderr.
pub fn run(kind: BuiltinKind, args: &[String], session: &mut ShellSession, out: &mut dyn Write) -> Status {
    let result = (kind.entry().handler)(args, session, out);
    let _ = out.flush();
    match result {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{}: {}", kind.name(), err);
            1
        }
    }
}

fn cmd_help(_args: &[String], _session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    for entry in &TABLE {
        writeln!(out, "{} - {}", entry.name, entry.doc)?;
    }
    Ok(0)
}

fn cmd_exit(_args: &[String], session: &mut ShellSession, _out: &mut dyn Write) -> Result<Status, ShellError> {
    session.request_exit(0);
    Ok(0)
}

fn cmd_pwd(_args: &[String], _session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    let cwd = std::env::current_dir()?;
    writeln!(out, "{}", cwd.display())?;
    Ok(0)
}

fn cmd_cd(args: &[String], _session: &mut ShellSession, _out: &mut dyn Write) -> Result<Status, ShellError> {
    let target = match args.get(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or(ShellError::MissingHome)?,
    };
    std::env::set_current_dir(&target).map_err(|source| ShellError::Path {
        path: target.display().to_string(),
        source,
    })?;
    Ok(0)
}

fn cmd_wait(_args: &[String], session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    session.wait_all(out)?;
    Ok(0)
}

fn cmd_fg(args: &[String], session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    session.foreground(args.get(1).map(String::as_str), out)
}

fn cmd_bg(args: &[String], session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    session.background(args.get(1).map(String::as_str), out)
}

fn cmd_jobs(_args: &[String], session: &mut ShellSession, out: &mut dyn Write) -> Result<Status, ShellError> {
    for job in session.jobs().iter() {
        writeln!(out, "[{}] {} {}", job.group_id, job.state, job.command)?;
    }
    Ok(0)
}
