//! Terminal control for interactive job control.
//!
//! The controlling terminal is a singleton: exactly one process group is in
//! the foreground at a time. [`TerminalController`] is the only code that
//! moves it. Children never call `tcsetpgrp`.

use std::io::Stdin;
use std::os::fd::AsFd;

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::termios::{self, SetArg, Termios};
use nix::unistd::{self, Pid};

use crate::error::ShellError;
use crate::signals;

/// Operations on a terminal device.
///
/// The real implementation is [`Tty`]; tests substitute a recorder.
pub trait TerminalDevice {
    /// Process group currently in the foreground.
    fn foreground_group(&self) -> nix::Result<Pid>;

    /// Put `pgid` in the foreground.
    fn set_foreground_group(&mut self, pgid: Pid) -> nix::Result<()>;

    fn get_mode(&self) -> nix::Result<Termios>;

    /// Apply `mode` once pending output has drained.
    fn set_mode(&mut self, mode: &Termios) -> nix::Result<()>;
}

/// The controlling terminal on standard input.
pub struct Tty {
    stdin: Stdin,
}

impl Tty {
    pub fn stdin() -> Self {
        Self {
            stdin: std::io::stdin(),
        }
    }
}

impl TerminalDevice for Tty {
    fn foreground_group(&self) -> nix::Result<Pid> {
        unistd::tcgetpgrp(self.stdin.as_fd())
    }

    fn set_foreground_group(&mut self, pgid: Pid) -> nix::Result<()> {
        unistd::tcsetpgrp(self.stdin.as_fd(), pgid)
    }

    fn get_mode(&self) -> nix::Result<Termios> {
        termios::tcgetattr(self.stdin.as_fd())
    }

    fn set_mode(&mut self, mode: &Termios) -> nix::Result<()> {
        termios::tcsetattr(self.stdin.as_fd(), SetArg::TCSADRAIN, mode)
    }
}

/// Who holds the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOwner {
    Shell,
    Job(Pid),
}

/// Arbitrates the controlling terminal between the shell and foreground jobs.
pub struct TerminalController {
    device: Box<dyn TerminalDevice>,
    shell_pgid: Pid,
    shell_mode: Option<Termios>,
    owner: TerminalOwner,
}

impl TerminalController {
    /// Take control of the terminal on stdin.
    ///
    /// - Waits (via SIGTTIN) until the shell's group is in the foreground
    /// - Puts the shell in its own process group
    /// - Ignores the job-control signals
    /// - Takes the terminal and saves its mode
    pub fn init() -> Result<Self, ShellError> {
        let tty = Tty::stdin();

        loop {
            let pgrp = unistd::getpgrp();
            let foreground = tty.foreground_group().map_err(ShellError::Terminal)?;
            if foreground == pgrp {
                break;
            }
            killpg(pgrp, Signal::SIGTTIN).map_err(ShellError::Terminal)?;
        }

        let shell_pid = unistd::getpid();
        match unistd::setpgid(shell_pid, shell_pid) {
            Ok(()) => {}
            // Session leaders already lead their own group.
            Err(Errno::EPERM) => {}
            Err(e) => return Err(ShellError::Terminal(e)),
        }

        signals::ignore_job_control_signals().map_err(ShellError::Terminal)?;

        let mut tty = tty;
        tty.set_foreground_group(shell_pid)
            .map_err(ShellError::Terminal)?;

        Ok(Self::with_device(Box::new(tty), shell_pid))
    }

    /// Wrap an already-prepared device. The shell's mode is captured now.
    pub fn with_device(device: Box<dyn TerminalDevice>, shell_pgid: Pid) -> Self {
        let shell_mode = device.get_mode().ok();
        Self {
            device,
            shell_pgid,
            shell_mode,
            owner: TerminalOwner::Shell,
        }
    }

    pub fn shell_group(&self) -> Pid {
        self.shell_pgid
    }

    pub fn owner(&self) -> TerminalOwner {
        self.owner
    }

    pub fn shell_mode(&self) -> Option<&Termios> {
        self.shell_mode.as_ref()
    }

    /// Current terminal attributes, if the device has any.
    pub fn current_mode(&self) -> Option<Termios> {
        self.device.get_mode().ok()
    }

    /// Hand the terminal to a foreground job, applying its saved mode first.
    pub fn give_to(&mut self, pgid: Pid, mode: Option<&Termios>) -> nix::Result<()> {
        if self.shell_mode.is_none() {
            self.shell_mode = self.current_mode();
        }
        if let Some(mode) = mode {
            if let Err(e) = self.device.set_mode(mode) {
                tracing::warn!("restoring job terminal mode failed: {}", e);
            }
        }
        self.device.set_foreground_group(pgid)?;
        tracing::debug!(pgid = pgid.as_raw(), "terminal handed to job");
        self.owner = TerminalOwner::Job(pgid);
        Ok(())
    }

    /// Take the terminal back for the shell and restore the shell's mode.
    ///
    /// Returns the mode the job left the terminal in, so a stopped job can
    /// get it back on resume.
    pub fn reclaim(&mut self) -> Option<Termios> {
        let job_mode = match self.owner {
            TerminalOwner::Job(_) => self.current_mode(),
            TerminalOwner::Shell => None,
        };

        if let Err(e) = self.device.set_foreground_group(self.shell_pgid) {
            tracing::error!("reclaiming terminal failed: {}", e);
        }
        if let Some(mode) = &self.shell_mode {
            if let Err(e) = self.device.set_mode(mode) {
                tracing::warn!("restoring shell terminal mode failed: {}", e);
            }
        }
        tracing::debug!("terminal reclaimed by shell");
        self.owner = TerminalOwner::Shell;
        job_mode
    }
}

impl std::fmt::Debug for TerminalController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalController")
            .field("shell_pgid", &self.shell_pgid)
            .field("owner", &self.owner)
            .finish()
    }
}
