//! The shell session: one per process, owns the job table and the terminal.
//!
//! Foreground jobs are waited on synchronously with `WUNTRACED`, so a Ctrl-Z
//! returns control to the shell. Background jobs are polled once per prompt
//! with `WNOHANG`; there are no signal handlers touching session state.

use std::ffi::OsString;
use std::fmt;
use std::io::{IsTerminal, Write};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;

use crate::builtins::{self, BuiltinKind};
use crate::error::{ShellError, Status};
use crate::jobs::{JobState, JobTable, MemberExit, ReapOutcome};
use crate::launcher;
use crate::pipeline::{self, StageDescriptor};
use crate::signals;
use crate::terminal::TerminalController;
use crate::tokens::tokenize;

/// Configuration for session initialization.
#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    /// Force job control on or off. `None` means: on iff stdin is a tty.
    pub interactive: Option<bool>,
    /// Search list used instead of `$PATH`.
    pub search_path: Option<OsString>,
}

impl ShellConfig {
    /// Decide interactivity from stdin.
    pub fn detect() -> Self {
        Self::default()
    }

    /// Job control on: process groups and terminal handoff.
    pub fn interactive() -> Self {
        Self {
            interactive: Some(true),
            ..Self::default()
        }
    }

    /// No job control: children stay in the shell's group.
    pub fn non_interactive() -> Self {
        Self {
            interactive: Some(false),
            ..Self::default()
        }
    }

    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    fn wants_terminal(&self) -> bool {
        self.interactive
            .unwrap_or_else(|| std::io::stdin().is_terminal())
    }
}

/// A job state change noticed while reaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    Done {
        group_id: Pid,
        last_exit: Option<MemberExit>,
    },
    Stopped {
        group_id: Pid,
    },
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::Done { group_id, .. } => write!(f, "[{group_id}] Done"),
            JobEvent::Stopped { group_id } => write!(f, "[{group_id}] Stopped"),
        }
    }
}

/// How a foreground wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForegroundWait {
    Finished(Option<MemberExit>),
    Stopped(Signal),
}

/// Shell state threaded through every operation.
pub struct ShellSession {
    config: ShellConfig,
    terminal: Option<TerminalController>,
    jobs: JobTable,
    exit_request: Option<Status>,
    last_status: Status,
}

impl ShellSession {
    /// Set up the process: take the terminal when interactive, and ignore
    /// the job-control signals either way.
    pub fn new(config: ShellConfig) -> Result<Self, ShellError> {
        let terminal = if config.wants_terminal() {
            Some(TerminalController::init()?)
        } else {
            signals::ignore_job_control_signals().map_err(ShellError::Terminal)?;
            None
        };
        let mut session = Self::without_terminal(config);
        session.terminal = terminal;
        Ok(session)
    }

    /// A session that does no process setup and has no terminal.
    pub fn without_terminal(config: ShellConfig) -> Self {
        Self {
            config,
            terminal: None,
            jobs: JobTable::new(),
            exit_request: None,
            last_status: 0,
        }
    }

    /// A session driving the given terminal controller. Does no process
    /// setup.
    pub fn with_terminal(config: ShellConfig, terminal: TerminalController) -> Self {
        let mut session = Self::without_terminal(config);
        session.terminal = Some(terminal);
        session
    }

    pub fn is_interactive(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn terminal(&self) -> Option<&TerminalController> {
        self.terminal.as_ref()
    }

    pub(crate) fn terminal_mut(&mut self) -> Option<&mut TerminalController> {
        self.terminal.as_mut()
    }

    /// Drop terminal control. Used in forked children running a builtin.
    pub(crate) fn detach_terminal(&mut self) {
        self.terminal = None;
    }

    pub(crate) fn search_path(&self) -> Option<OsString> {
        self.config
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
    }

    pub fn request_exit(&mut self, status: Status) {
        self.exit_request = Some(status);
    }

    /// Status the shell should exit with, once `exit` has run.
    pub fn exit_requested(&self) -> Option<Status> {
        self.exit_request
    }

    pub fn last_status(&self) -> Status {
        self.last_status
    }

    /// Run one input line to completion (foreground) or until it is launched
    /// (background). Job notices go to stdout.
    pub fn execute_line(&mut self, line: &str) -> Result<Status, ShellError> {
        let mut out = std::io::stdout();
        let status = self.execute_line_to(line, &mut out)?;
        self.last_status = status;
        Ok(status)
    }

    fn execute_line_to(&mut self, line: &str, out: &mut dyn Write) -> Result<Status, ShellError> {
        let tokens = tokenize(line);
        let pipeline = pipeline::build(tokens.as_slice())?;
        if pipeline.is_empty() {
            return Ok(0);
        }

        if let [stage] = pipeline.stages.as_slice() {
            if let Some(kind) = stage.program().and_then(BuiltinKind::lookup) {
                return Ok(self.run_builtin_in_process(kind, stage, out));
            }
        }

        let saved_mode = self.terminal.as_ref().and_then(TerminalController::current_mode);
        let spawned = launcher::spawn(self, &pipeline)?;
        let group_id = spawned.group_id;
        self.jobs.add(
            group_id,
            spawned.member_pids,
            pipeline.background,
            saved_mode,
            line.trim(),
        );
        if let Some(err) = spawned.incomplete {
            eprintln!("jobsh: {err}");
        }

        if pipeline.background {
            writeln!(out, "[{group_id}] Background")?;
            return Ok(0);
        }
        self.wait_in_foreground(group_id, out)
    }

    fn run_builtin_in_process(
        &mut self,
        kind: BuiltinKind,
        stage: &StageDescriptor,
        out: &mut dyn Write,
    ) -> Status {
        tracing::debug!(builtin = kind.name(), "running builtin in shell process");
        // Builtins ignore stdin; the `<` target must still open.
        if let Some(path) = &stage.input {
            if let Err(err) = launcher::open_input(path) {
                eprintln!("{err}");
                return 1;
            }
        }
        match &stage.output {
            Some(path) => match launcher::open_output(path) {
                Ok(mut file) => builtins::run(kind, &stage.argv, self, &mut file),
                Err(err) => {
                    eprintln!("{}: {}", kind.name(), err);
                    1
                }
            },
            None => builtins::run(kind, &stage.argv, self, out),
        }
    }

    /// `fg`: resume a job with the terminal and wait for it.
    pub fn foreground(&mut self, target: Option<&str>, out: &mut dyn Write) -> Result<Status, ShellError> {
        let group_id = self.resolve_job(target)?;
        let (was_stopped, mode) = match self.jobs.find_mut(group_id) {
            Some(job) => {
                let was_stopped = job.state == JobState::Stopped;
                job.state = JobState::Running;
                job.is_background = false;
                (was_stopped, job.saved_terminal_mode.clone())
            }
            None => return Err(ShellError::JobNotFound(group_id.as_raw())),
        };

        if let Some(term) = self.terminal.as_mut() {
            if let Err(e) = term.give_to(group_id, mode.as_ref()) {
                tracing::warn!("handing terminal to {} failed: {}", group_id, e);
            }
        }
        if was_stopped {
            self.signal_job(group_id, Signal::SIGCONT);
        }
        self.wait_in_foreground(group_id, out)
    }

    /// `bg`: resume a stopped job without giving it the terminal.
    pub fn background(&mut self, target: Option<&str>, out: &mut dyn Write) -> Result<Status, ShellError> {
        let group_id = self.resolve_job(target)?;
        let was_stopped = match self.jobs.find_mut(group_id) {
            Some(job) if job.state == JobState::Stopped => {
                job.state = JobState::Running;
                job.is_background = true;
                true
            }
            Some(_) => false,
            None => return Err(ShellError::JobNotFound(group_id.as_raw())),
        };
        if was_stopped {
            self.signal_job(group_id, Signal::SIGCONT);
            writeln!(out, "[{group_id}] Running")?;
        }
        Ok(0)
    }

    /// `wait`: block until no running job has members left. Stopped jobs are
    /// skipped; they cannot finish until resumed.
    pub fn wait_all(&mut self, out: &mut dyn Write) -> Result<(), ShellError> {
        loop {
            let next = self
                .jobs
                .iter()
                .filter(|job| job.state == JobState::Running)
                .find_map(|job| job.outstanding().next());
            let Some(pid) = next else {
                return Ok(());
            };
            let result = waitpid(pid, Some(WaitPidFlag::WUNTRACED));
            if let Some(event @ JobEvent::Stopped { .. }) = self.record(pid, result) {
                writeln!(out, "{event}")?;
            }
        }
    }

    /// Poll every outstanding background member without blocking.
    pub fn reap_background(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();
        for pid in self.jobs.outstanding_pids() {
            let result = waitpid(pid, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED));
            if let Some(event) = self.record(pid, result) {
                events.push(event);
            }
        }
        events
    }

    fn resolve_job(&self, target: Option<&str>) -> Result<Pid, ShellError> {
        match target {
            None => self
                .jobs
                .most_recent()
                .map(|job| job.group_id)
                .ok_or(ShellError::NoCurrentJob),
            Some(arg) => {
                let raw: i32 = arg
                    .parse()
                    .map_err(|_| ShellError::InvalidPid(arg.to_string()))?;
                if raw <= 0 {
                    return Err(ShellError::InvalidPid(arg.to_string()));
                }
                self.jobs
                    .find(Pid::from_raw(raw))
                    .map(|job| job.group_id)
                    .ok_or(ShellError::JobNotFound(raw))
            }
        }
    }

    /// Send `sig` to every process of a job. Without job control the members
    /// share the shell's group, so they are signaled one by one.
    fn signal_job(&self, group_id: Pid, sig: Signal) {
        let result = if self.is_interactive() {
            signal::killpg(group_id, sig)
        } else {
            self.jobs
                .find(group_id)
                .map(|job| job.outstanding().try_for_each(|pid| signal::kill(pid, sig)))
                .unwrap_or(Ok(()))
        };
        if let Err(e) = result {
            tracing::warn!("sending {} to job {} failed: {}", sig, group_id, e);
        }
    }

    /// Wait for a foreground job, then give the terminal back to the shell.
    fn wait_in_foreground(&mut self, group_id: Pid, out: &mut dyn Write) -> Result<Status, ShellError> {
        let outcome = self.wait_for_job(group_id);
        let job_mode = self.terminal.as_mut().and_then(TerminalController::reclaim);

        match outcome {
            ForegroundWait::Finished(exit) => Ok(exit.map_or(0, MemberExit::status)),
            ForegroundWait::Stopped(sig) => {
                if let Some(job) = self.jobs.find_mut(group_id) {
                    if job_mode.is_some() {
                        job.saved_terminal_mode = job_mode;
                    }
                }
                writeln!(out, "[{group_id}] Stopped")?;
                Ok(128 + sig as i32)
            }
        }
    }

    /// Block until every member of the job has exited or one of them stops.
    fn wait_for_job(&mut self, group_id: Pid) -> ForegroundWait {
        loop {
            let next = self
                .jobs
                .find(group_id)
                .and_then(|job| job.outstanding().next());
            let Some(pid) = next else {
                return ForegroundWait::Finished(None);
            };

            let result = waitpid(pid, Some(WaitPidFlag::WUNTRACED));
            if let Ok(WaitStatus::Stopped(_, sig)) = result {
                self.record(pid, result);
                return ForegroundWait::Stopped(sig);
            }
            if let Some(JobEvent::Done { last_exit, .. }) = self.record(pid, result) {
                return ForegroundWait::Finished(last_exit);
            }
        }
    }

    /// Apply one `waitpid` result for `pid` to the job table.
    fn record(&mut self, pid: Pid, result: nix::Result<WaitStatus>) -> Option<JobEvent> {
        let exit = match result {
            Ok(WaitStatus::Exited(_, code)) => MemberExit::Exited(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => MemberExit::Signaled(sig as i32),
            Ok(WaitStatus::Stopped(_, _)) => {
                let was_running = self
                    .jobs
                    .find(pid)
                    .is_some_and(|job| job.state == JobState::Running);
                let group_id = self.jobs.mark_stopped(pid)?;
                tracing::debug!(pid = pid.as_raw(), pgid = group_id.as_raw(), "job stopped");
                return was_running.then_some(JobEvent::Stopped { group_id });
            }
            Ok(_) | Err(Errno::EINTR) => return None,
            // Someone else already collected it.
            Err(Errno::ECHILD) => MemberExit::Exited(0),
            Err(e) => {
                tracing::error!("waitpid({}) failed: {}", pid, e);
                MemberExit::Exited(1)
            }
        };

        match self.jobs.mark_reaped(pid, exit)? {
            ReapOutcome::Partial => None,
            ReapOutcome::JobDone {
                group_id,
                last_exit,
                ..
            } => {
                tracing::debug!(pgid = group_id.as_raw(), ?last_exit, "job done");
                Some(JobEvent::Done {
                    group_id,
                    last_exit,
                })
            }
        }
    }
}

impl fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellSession")
            .field("interactive", &self.is_interactive())
            .field("jobs", &self.jobs.len())
            .field("last_status", &self.last_status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::terminal::TerminalOwner;
    use crate::terminal::testing::RecordingDevice;

    fn plain_session() -> ShellSession {
        ShellSession::without_terminal(ShellConfig::non_interactive())
    }

    fn job_control_session() -> (ShellSession, Rc<RefCell<Vec<Pid>>>, Pid) {
        let (device, handoffs) = RecordingDevice::new();
        let shell_pgid = nix::unistd::getpgrp();
        let term = TerminalController::with_device(Box::new(device), shell_pgid);
        let session = ShellSession::with_terminal(ShellConfig::interactive(), term);
        (session, handoffs, shell_pgid)
    }

    fn run(session: &mut ShellSession, line: &str) -> (Status, String) {
        let mut out = Vec::new();
        let status = session
            .execute_line_to(line, &mut out)
            .unwrap_or_else(|e| panic!("{line:?} failed: {e}"));
        (status, String::from_utf8(out).expect("utf8"))
    }

    fn only_job(session: &ShellSession) -> Pid {
        assert_eq!(session.jobs().len(), 1, "expected exactly one job");
        session.jobs().most_recent().map(|j| j.group_id).expect("job")
    }

    #[test]
    fn empty_line_is_a_no_op() {
        let mut s = plain_session();
        assert_eq!(run(&mut s, "   ").0, 0);
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn syntax_error_launches_nothing() {
        let mut s = plain_session();
        let mut out = Vec::new();
        let err = s.execute_line_to("cat <", &mut out).expect_err("syntax error");
        assert!(matches!(err, ShellError::Syntax(_)));
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn exit_status_of_foreground_command() {
        let mut s = plain_session();
        assert_eq!(run(&mut s, "sh -c 'exit 3'").0, 3);
        assert_eq!(run(&mut s, "true").0, 0);
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn missing_program_exits_127() {
        let mut s = plain_session();
        assert_eq!(run(&mut s, "nosuchprogram-jobsh-test").0, 127);
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn output_redirection_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let mut s = plain_session();
        let (status, _) = run(&mut s, &format!("echo hi > {}", path.display()));
        assert_eq!(status, 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "hi\n");
    }

    #[test]
    fn three_stage_pipeline_with_redirections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("a.txt");
        let output = dir.path().join("count.txt");
        std::fs::write(&input, "foo\nbar\nfoo bar\nbaz\n").expect("write");

        let mut s = plain_session();
        let line = format!(
            "cat {} | grep foo | wc -l > {}",
            input.display(),
            output.display()
        );
        assert_eq!(run(&mut s, &line).0, 0);
        let count = std::fs::read_to_string(&output).expect("read");
        assert_eq!(count.trim(), "2");
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn builtin_in_pipeline_does_not_touch_shell_state() {
        let mut s = plain_session();
        run(&mut s, "exit | cat");
        assert_eq!(s.exit_requested(), None);
        run(&mut s, "exit");
        assert_eq!(s.exit_requested(), Some(0));
    }

    #[test]
    fn in_process_builtin_honors_output_redirection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pwd.txt");
        let mut s = plain_session();
        run(&mut s, &format!("pwd > {}", path.display()));
        let cwd = std::env::current_dir().expect("cwd");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            format!("{}\n", cwd.display())
        );
    }

    #[test]
    fn in_process_builtin_checks_input_redirection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.txt");
        let mut s = plain_session();
        let (status, out) = run(&mut s, &format!("pwd < {}", missing.display()));
        assert_eq!(status, 1);
        assert!(out.is_empty());

        let present = dir.path().join("present.txt");
        std::fs::write(&present, "").expect("write");
        let (status, out) = run(&mut s, &format!("pwd < {}", present.display()));
        assert_eq!(status, 0);
        assert!(!out.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn children_get_default_sigpipe() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("status.txt");
        let mut s = plain_session();
        run(&mut s, &format!("grep SigIgn /proc/self/status > {}", path.display()));

        let status = std::fs::read_to_string(&path).expect("read");
        let mask = status
            .trim()
            .strip_prefix("SigIgn:")
            .map(str::trim)
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .expect("SigIgn mask");
        let sigpipe_bit = 1u64 << (Signal::SIGPIPE as i32 - 1);
        assert_eq!(mask & sigpipe_bit, 0, "SIGPIPE ignored in child: {status}");
    }

    #[test]
    fn background_job_returns_immediately() {
        let mut s = plain_session();
        let started = Instant::now();
        let (status, out) = run(&mut s, "sleep 0.3 &");
        assert_eq!(status, 0);
        assert!(started.elapsed() < Duration::from_millis(300));

        let group = only_job(&s);
        assert_eq!(out, format!("[{group}] Background\n"));
        let job = s.jobs().find(group).expect("job");
        assert!(job.is_background);
        assert_eq!(job.state, JobState::Running);

        s.wait_all(&mut Vec::new()).expect("wait");
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn reaping_reports_finished_background_job() {
        let mut s = plain_session();
        run(&mut s, "true &");
        let group = only_job(&s);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.is_empty() && Instant::now() < deadline {
            events = s.reap_background();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(
            events,
            vec![JobEvent::Done {
                group_id: group,
                last_exit: Some(MemberExit::Exited(0)),
            }]
        );
        assert_eq!(events[0].to_string(), format!("[{group}] Done"));
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn background_pipeline_tracks_every_member() {
        let (mut s, handoffs, _) = job_control_session();
        run(&mut s, "sleep 0.2 | cat &");
        let group = only_job(&s);
        let members = s.jobs().find(group).expect("job").member_pids.clone();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0], group);
        assert_eq!(s.jobs().find(members[1]).map(|j| j.group_id), Some(group));
        assert!(handoffs.borrow().is_empty(), "background jobs never get the terminal");

        s.wait_all(&mut Vec::new()).expect("wait");
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn foreground_job_returns_terminal_to_shell() {
        let (mut s, handoffs, shell_pgid) = job_control_session();
        assert_eq!(run(&mut s, "sh -c 'exit 4'").0, 4);

        let handoffs = handoffs.borrow();
        assert_eq!(handoffs.len(), 2);
        assert_ne!(handoffs[0], shell_pgid);
        assert_eq!(handoffs[1], shell_pgid);
        assert_eq!(
            s.terminal().map(TerminalController::owner),
            Some(TerminalOwner::Shell)
        );
    }

    #[test]
    fn stopped_job_resumes_with_bg() {
        let (mut s, handoffs, shell_pgid) = job_control_session();
        let (_, out) = run(&mut s, "sh -c 'kill -STOP $$; exit 0'");

        let group = only_job(&s);
        assert_eq!(out, format!("[{group}] Stopped\n"));
        assert_eq!(s.jobs().find(group).map(|j| j.state), Some(JobState::Stopped));
        assert_eq!(handoffs.borrow().last(), Some(&shell_pgid));

        let mut out = Vec::new();
        assert_eq!(s.background(None, &mut out).expect("bg"), 0);
        assert_eq!(String::from_utf8(out).expect("utf8"), format!("[{group}] Running\n"));
        let job = s.jobs().find(group).expect("job");
        assert_eq!(job.state, JobState::Running);
        assert!(job.is_background);
        assert_eq!(handoffs.borrow().len(), 2, "bg never hands over the terminal");

        s.wait_all(&mut Vec::new()).expect("wait");
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn stopped_job_resumes_with_fg() {
        let (mut s, handoffs, shell_pgid) = job_control_session();
        run(&mut s, "sh -c 'kill -STOP $$; exit 5'");
        let group = only_job(&s);

        let target = group.to_string();
        let mut out = Vec::new();
        assert_eq!(s.foreground(Some(&target), &mut out).expect("fg"), 5);
        assert!(out.is_empty());
        assert!(s.jobs().is_empty());
        assert_eq!(
            *handoffs.borrow(),
            vec![group, shell_pgid, group, shell_pgid]
        );
    }

    #[test]
    fn fg_and_bg_target_most_recent_job() {
        let (mut s, _, _) = job_control_session();
        run(&mut s, "sh -c 'kill -STOP $$'");
        let first = only_job(&s);
        run(&mut s, "sh -c 'kill -STOP $$'");
        let second = s.jobs().most_recent().map(|j| j.group_id).expect("job");
        assert_ne!(first, second);

        s.foreground(None, &mut Vec::new()).expect("fg second");
        assert!(s.jobs().find(second).is_none());
        assert_eq!(s.jobs().most_recent().map(|j| j.group_id), Some(first));

        s.background(None, &mut Vec::new()).expect("bg first");
        s.wait_all(&mut Vec::new()).expect("wait");
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn wait_skips_stopped_jobs() {
        let (mut s, _, _) = job_control_session();
        run(&mut s, "sh -c 'kill -STOP $$'");
        let group = only_job(&s);
        s.wait_all(&mut Vec::new()).expect("wait");
        assert_eq!(s.jobs().find(group).map(|j| j.state), Some(JobState::Stopped));

        s.signal_job(group, Signal::SIGKILL);
        s.foreground(None, &mut Vec::new()).expect("fg");
        assert!(s.jobs().is_empty());
    }
}
