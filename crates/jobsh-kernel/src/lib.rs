//! jobsh-kernel: the core of jobsh.
//!
//! This crate provides:
//!
//! - **Tokens**: splits a line into words using logos
//! - **Pipeline**: turns words into stages with `|`, `<`, `>` and `&`
//! - **Launcher**: resolves programs, wires pipes, forks and execs
//! - **Jobs**: the table of launched process groups
//! - **Terminal**: hands the controlling terminal between shell and jobs
//! - **Builtins**: `help`, `exit`, `pwd`, `cd`, `wait`, `fg`, `bg`, `jobs`
//! - **Session**: ties it together, one line at a time

pub mod builtins;
pub mod error;
pub mod jobs;
pub mod launcher;
pub mod pipeline;
pub mod session;
pub mod signals;
pub mod terminal;
pub mod tokens;

pub use builtins::BuiltinKind;
pub use error::{ShellError, Status};
pub use jobs::{Job, JobState, JobTable, MemberExit};
pub use pipeline::{Pipeline, StageDescriptor};
pub use session::{JobEvent, ShellConfig, ShellSession};
pub use terminal::{TerminalController, TerminalDevice, TerminalOwner};
pub use tokens::{Tokens, Word, tokenize};
