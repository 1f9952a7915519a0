use nix::unistd::{self, Pid};
use nix::sys::wait::{self, WaitStatus};

pub trait WaitStatusExt {
	fn code(self) -> u8;
	fn is_done(self) -> bool;
}

impl WaitStatusExt for WaitStatus {
	/// Exit code as a shell reports it; death by signal maps to 128 + signo.
	fn code(self) -> u8 {
		match self {
			WaitStatus::Exited(_, c) => c as u8,
			WaitStatus::Signaled(_, sig, _) => 128u8.wrapping_add(sig as u8),
			_ => 0,
		}
	}
	fn is_done(self) -> bool {
		match self {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => true,
			_ => false,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

/// The processes spawned for one input line, in left-to-right order.
#[derive(Debug, Default)]
pub struct Job {
	pub processes: Vec<Process>,
}

impl Job {
	pub fn new(size_hint: usize) -> Job {
		Job { processes: Vec::with_capacity(size_hint) }
	}

	/// Forks and, in the parent, records the child. The child gets the
	/// `ForkResult::Child` back and must exec or exit; it never returns here.
	pub fn push_fork(&mut self) -> nix::Result<unistd::ForkResult> {
		let r = unsafe { unistd::fork() }?;
		if let unistd::ForkResult::Parent { child } = r {
			self.processes.push(Process { pid: child, status: WaitStatus::StillAlive });
		}
		Ok(r)
	}

	/// Blocks until every recorded process has terminated. A failing waitpid
	/// does not stop the remaining processes from being reaped; the first
	/// error is returned afterwards.
	pub fn wait(&mut self) -> nix::Result<()> {
		let mut first_err = None;
		for pr in self.processes.iter_mut() {
			while !pr.status.is_done() {
				match wait::waitpid(pr.pid, None) {
					Ok(status) => { pr.status = status; },
					Err(nix::Error::EINTR) => {},
					Err(e) => {
						first_err.get_or_insert(e);
						break;
					},
				}
			}
		}
		match first_err {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	/// Status of the rightmost process, which is what the line reports.
	pub fn code(&self) -> u8 {
		self.processes.last().map_or(0, |pr| pr.status.code())
	}
}
