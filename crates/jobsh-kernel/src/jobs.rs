//! Job table: every live job, indexed by process group and by member pid.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use nix::sys::termios::Termios;
use nix::unistd::Pid;

/// Run state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Stopped,
    /// Every member has been reaped. A job in this state is no longer in the
    /// table.
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobState::Running => "Running",
            JobState::Stopped => "Stopped",
            JobState::Done => "Done",
        })
    }
}

/// How a member process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberExit {
    Exited(i32),
    Signaled(i32),
}

impl MemberExit {
    /// Shell-style status: the exit code, or 128 + signal number.
    pub fn status(self) -> i32 {
        match self {
            MemberExit::Exited(code) => code,
            MemberExit::Signaled(sig) => 128 + sig,
        }
    }
}

/// Identifies a job in the table. Equal to the job's process-group id.
pub type JobHandle = Pid;

/// One command or pipeline sharing a process group.
#[derive(Debug, Clone)]
pub struct Job {
    pub group_id: Pid,
    pub member_pids: Vec<Pid>,
    pub state: JobState,
    pub saved_terminal_mode: Option<Termios>,
    pub is_background: bool,
    pub command: String,
    outstanding: BTreeSet<Pid>,
    last_exit: Option<MemberExit>,
}

impl Job {
    /// Members that have not been reaped yet, in launch order.
    pub fn outstanding(&self) -> impl Iterator<Item = Pid> + '_ {
        self.member_pids
            .iter()
            .copied()
            .filter(|pid| self.outstanding.contains(pid))
    }

    pub fn has_outstanding(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Exit of the last stage, once it has been reaped.
    pub fn last_exit(&self) -> Option<MemberExit> {
        self.last_exit
    }

    pub fn is_member(&self, pid: Pid) -> bool {
        self.member_pids.contains(&pid)
    }
}

/// Result of recording a member's termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Other members are still outstanding.
    Partial,
    /// That was the last member; the job has been removed.
    JobDone {
        group_id: Pid,
        is_background: bool,
        last_exit: Option<MemberExit>,
    },
}

/// All live jobs.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: HashMap<Pid, Job>,
    by_member: HashMap<Pid, Pid>,
    /// Group ids, oldest first.
    order: Vec<Pid>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly launched job. The first member is the group leader
    /// unless `group_id` says otherwise.
    ///
    /// Re-adding a live group id replaces the old entry.
    pub fn add(
        &mut self,
        group_id: Pid,
        member_pids: Vec<Pid>,
        is_background: bool,
        saved_terminal_mode: Option<Termios>,
        command: impl Into<String>,
    ) -> JobHandle {
        if self.jobs.contains_key(&group_id) {
            self.remove(group_id);
        }
        for &pid in &member_pids {
            self.by_member.insert(pid, group_id);
        }
        let job = Job {
            group_id,
            outstanding: member_pids.iter().copied().collect(),
            member_pids,
            state: JobState::Running,
            saved_terminal_mode,
            is_background,
            command: command.into(),
            last_exit: None,
        };
        self.jobs.insert(group_id, job);
        self.order.push(group_id);
        group_id
    }

    /// Remove the job containing `pid` (leader or any member).
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let group_id = self.group_of(pid)?;
        let mut job = self.jobs.remove(&group_id)?;
        for member in &job.member_pids {
            self.by_member.remove(member);
        }
        self.order.retain(|g| *g != group_id);
        job.state = JobState::Done;
        Some(job)
    }

    /// Find the job containing `pid` (leader or any member).
    pub fn find(&self, pid: Pid) -> Option<&Job> {
        self.group_of(pid).and_then(|g| self.jobs.get(&g))
    }

    pub fn find_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        let group_id = self.group_of(pid)?;
        self.jobs.get_mut(&group_id)
    }

    /// The most recently added live job.
    pub fn most_recent(&self) -> Option<&Job> {
        self.order.last().and_then(|g| self.jobs.get(g))
    }

    /// Live jobs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().filter_map(|g| self.jobs.get(g))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Every outstanding member pid across all jobs.
    pub fn outstanding_pids(&self) -> Vec<Pid> {
        self.iter().flat_map(Job::outstanding).collect()
    }

    /// Record that member `pid` terminated. Removes the job once no member is
    /// left. Returns `None` for a pid no job knows about.
    pub fn mark_reaped(&mut self, pid: Pid, exit: MemberExit) -> Option<ReapOutcome> {
        let job = self.find_mut(pid)?;
        job.outstanding.remove(&pid);
        if job.member_pids.last() == Some(&pid) {
            job.last_exit = Some(exit);
        }
        if job.has_outstanding() {
            return Some(ReapOutcome::Partial);
        }

        let group_id = job.group_id;
        let done = self.remove(group_id)?;
        Some(ReapOutcome::JobDone {
            group_id,
            is_background: done.is_background,
            last_exit: done.last_exit,
        })
    }

    /// Mark the job containing `pid` as stopped. Returns the job's group id.
    pub fn mark_stopped(&mut self, pid: Pid) -> Option<Pid> {
        let job = self.find_mut(pid)?;
        job.state = JobState::Stopped;
        Some(job.group_id)
    }

    fn group_of(&self, pid: Pid) -> Option<Pid> {
        if self.jobs.contains_key(&pid) {
            return Some(pid);
        }
        self.by_member.get(&pid).copied()
    }
}
