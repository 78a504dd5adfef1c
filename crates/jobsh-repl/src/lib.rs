//! jobsh REPL: reads lines and hands them to a [`ShellSession`].
//!
//! Interactive sessions (stdin is a tty) get a numbered prompt and line
//! editing via rustyline. Piped input is read plainly with no prompt.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use jobsh_kernel::{ShellConfig, ShellSession, Status};

/// What one read from the input produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    Eof,
}

/// Source of input lines.
pub enum LineReader {
    Editor(Box<DefaultEditor>),
    Plain(io::StdinLock<'static>),
}

impl LineReader {
    /// An editor for a terminal, plain stdin otherwise.
    pub fn for_session(session: &ShellSession) -> Result<Self> {
        if session.is_interactive() {
            let editor = DefaultEditor::new().context("failed to create line editor")?;
            Ok(LineReader::Editor(Box::new(editor)))
        } else {
            Ok(LineReader::Plain(io::stdin().lock()))
        }
    }

    pub fn read(&mut self, prompt: &str) -> Result<Input> {
        match self {
            LineReader::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    Ok(Input::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                Err(ReadlineError::Eof) => Ok(Input::Eof),
                Err(err) => Err(err).context("reading input"),
            },
            LineReader::Plain(stdin) => {
                let mut raw = Vec::new();
                let n = stdin.read_until(b'\n', &mut raw).context("reading input")?;
                if n == 0 {
                    return Ok(Input::Eof);
                }
                // Invalid UTF-8 becomes U+FFFD rather than ending the session.
                Ok(Input::Line(String::from_utf8_lossy(&raw).into_owned()))
            }
        }
    }
}

/// The read-execute loop around a session.
pub struct Repl {
    session: ShellSession,
    lines_read: usize,
}

impl Repl {
    pub fn new(session: ShellSession) -> Self {
        Self {
            session,
            lines_read: 0,
        }
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    /// Prompt for the next line; empty when not interactive.
    pub fn prompt(&self) -> String {
        if self.session.is_interactive() {
            format!("{}: ", self.lines_read)
        } else {
            String::new()
        }
    }

    /// Print job notices collected since the last prompt.
    pub fn report_background(&mut self, out: &mut dyn Write) -> io::Result<()> {
        for event in self.session.reap_background() {
            writeln!(out, "{event}")?;
        }
        out.flush()
    }

    /// Run one line. Returns the exit status once the shell should stop.
    pub fn process_line(&mut self, line: &str) -> Option<Status> {
        self.lines_read += 1;
        if let Err(err) = self.session.execute_line(line) {
            eprintln!("jobsh: {err}");
            if err.is_fatal() {
                return Some(1);
            }
        }
        self.session.exit_requested()
    }

    /// Loop until `exit`, end of input, or a fatal error.
    pub fn run_with(&mut self, reader: &mut LineReader) -> Result<Status> {
        let mut stdout = io::stdout();
        loop {
            self.report_background(&mut stdout)?;
            let prompt = self.prompt();
            match reader.read(&prompt)? {
                Input::Line(line) => {
                    if let Some(status) = self.process_line(&line) {
                        return Ok(status);
                    }
                }
                Input::Interrupted => continue,
                Input::Eof => return Ok(0),
            }
        }
    }
}

/// Set up the session and run the shell on stdin. Returns the exit status.
pub fn run() -> Result<Status> {
    let session = match ShellSession::new(ShellConfig::detect()) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("jobsh: {err}");
            return Ok(1);
        }
    };
    tracing::debug!(interactive = session.is_interactive(), "session started");

    let mut reader = LineReader::for_session(&session)?;
    let mut repl = Repl::new(session);
    repl.run_with(&mut reader)
}
