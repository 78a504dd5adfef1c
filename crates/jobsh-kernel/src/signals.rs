//! Signal dispositions for the shell and its children.
//!
//! The shell ignores the interactive-control signals so Ctrl-C or Ctrl-Z never
//! hit it. Ignored dispositions survive `exec`, so every child puts the
//! defaults back before running anything.

#![allow(unsafe_code)]

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals the shell ignores and children reset.
pub const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Ignored by the Rust runtime before `main`. The shell keeps it ignored;
/// children get the default back.
const RUNTIME_IGNORED_SIGNALS: [Signal; 1] = [Signal::SIGPIPE];

fn set_disposition(sig: Signal, handler: SigHandler) -> nix::Result<()> {
    // SAFETY: only SIG_IGN and SIG_DFL are installed here; no handler code
    // runs in signal context.
    unsafe {
        signal::sigaction(
            sig,
            &SigAction::new(handler, SaFlags::empty(), SigSet::empty()),
        )?;
    }
    Ok(())
}

/// Ignore every job-control signal in the shell process.
pub fn ignore_job_control_signals() -> nix::Result<()> {
    for sig in JOB_CONTROL_SIGNALS {
        set_disposition(sig, SigHandler::SigIgn)?;
    }
    Ok(())
}

/// Restore default dispositions. Called in a child right after fork.
pub fn restore_default_signals() -> nix::Result<()> {
    for sig in JOB_CONTROL_SIGNALS.into_iter().chain(RUNTIME_IGNORED_SIGNALS) {
        set_disposition(sig, SigHandler::SigDfl)?;
    }
    Ok(())
}
