use std::ffi::{self, CString, OsStr};
use std::iter;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult};
use thiserror::Error;

use crate::diag;
use crate::job::Job;
use crate::parser::ParseError;
use crate::signals;
use crate::types::*;

#[derive(Debug, Error)]
pub enum ExecError {
	#[error("{0}")]
	Syntax(#[from] ParseError),
	#[error("pipe: {0}")]
	Pipe(#[source] nix::Error),
	#[error("fork: {0}")]
	Fork(#[source] nix::Error),
	#[error("wait: {0}")]
	Wait(#[source] nix::Error),
	#[error("dup2: {0}")]
	Dup(#[source] nix::Error),
	#[error("{path}: {source}")]
	Open { path: String, source: nix::Error },
	#[error("{program}: {source}")]
	Exec { program: String, source: nix::Error },
	#[error("empty command")]
	EmptyCommand,
	#[error("nul byte in argument: {0}")]
	Nul(#[from] ffi::NulError),
}

impl ExecError {
	/// Status a child exits with after failing to become its program.
	fn exit_code(&self) -> libc::c_int {
		match *self {
			ExecError::Open { .. } => 1,
			ExecError::Exec { source: Errno::ENOENT, .. } => 127,
			ExecError::EmptyCommand => 127,
			_ => 126,
		}
	}
}

/// A command's arguments converted for execvp, built before forking so the
/// child does no more than rebind descriptors and exec.
struct Argv(Vec<CString>);

impl Argv {
	fn new(command: &Command) -> Result<Argv, ExecError> {
		if command.name().is_none() {
			return Err(ExecError::EmptyCommand);
		}
		let argv: Result<Vec<CString>, ffi::NulError> = command.args.iter().map(|a| CString::new(a.as_bytes())).collect();
		Ok(Argv(argv?))
	}
}

fn child_exit(err: &ExecError) -> ! {
	diag::report(err);
	unsafe { libc::_exit(err.exit_code()) }
}

/// Replaces the current process image. Runs only in a forked child and never
/// returns: either execvp succeeds or the child exits.
fn exec_command(argv: &Argv) -> ! {
	let _ = signals::restore_default();
	let program = &argv.0[0];
	let err = match unistd::execvp(program, &argv.0) {
		Ok(never) => match never {},
		Err(e) => ExecError::Exec { program: program.to_string_lossy().into_owned(), source: e },
	};
	child_exit(&err)
}

fn close_pipe(read_end: RawFd, write_end: RawFd) {
	let _ = unistd::close(read_end);
	let _ = unistd::close(write_end);
}

/// Pipe ends a stage has no use for once `slot` is bound. An end that already
/// is `slot` (stdin or stdout was closed when the pipe was made) stays open.
fn stale_ends(pipe: (RawFd, RawFd), slot: RawFd) -> impl Iterator<Item = RawFd> {
	iter::once(pipe.0).chain(iter::once(pipe.1)).filter(move |&fd| fd != slot)
}

/// Forks one pipeline stage with `fd` bound to the standard stream `slot`.
/// The child drops both pipe ends once the rebinding is in place.
fn spawn_stage(job: &mut Job, argv: &Argv, fd: RawFd, slot: RawFd, pipe: (RawFd, RawFd)) -> Result<(), ExecError> {
	match job.push_fork().map_err(ExecError::Fork)? {
		ForkResult::Parent { .. } => Ok(()),
		ForkResult::Child => {
			if let Err(e) = unistd::dup2(fd, slot) {
				child_exit(&ExecError::Dup(e));
			}
			for end in stale_ends(pipe, slot) {
				let _ = unistd::close(end);
			}
			exec_command(argv)
		},
	}
}

/// Runs `left | right`. Both stages are children of the interpreter and both
/// are waited for; the line's status is the right stage's.
pub fn run_pipeline(pipeline: &Pipeline) -> Result<u8, ExecError> {
	let left = Argv::new(&pipeline.left)?;
	let right = Argv::new(&pipeline.right)?;

	let (read_end, write_end) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;
	let pipe = (read_end, write_end);
	let mut job = Job::new(2);
	let spawned = spawn_stage(&mut job, &left, write_end, libc::STDOUT_FILENO, pipe)
		.and_then(|_| spawn_stage(&mut job, &right, read_end, libc::STDIN_FILENO, pipe));
	// The reader only sees end of stream once every copy of the write end is gone.
	close_pipe(read_end, write_end);
	let waited = job.wait().map_err(ExecError::Wait);
	spawned?;
	waited?;
	Ok(job.code())
}

fn open_target(target: &OsStr, typ: RedirectType) -> Result<(), ExecError> {
	let (flags, mode, slot) = match typ {
		RedirectType::Input => (OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO),
		RedirectType::Output => (
			OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
			Mode::S_IRUSR | Mode::S_IWUSR,
			libc::STDOUT_FILENO,
		),
	};
	let fd = fcntl::open(target, flags, mode).map_err(|e| ExecError::Open {
		path: target.to_string_lossy().into_owned(),
		source: e,
	})?;
	if fd != slot {
		unistd::dup2(fd, slot).map_err(ExecError::Dup)?;
		let _ = unistd::close(fd);
	}
	Ok(())
}

/// Runs one command with stdin or stdout bound to a file and waits for it.
/// A target that cannot be opened ends only the child.
pub fn run_redirect(redirect: &Redirect) -> Result<u8, ExecError> {
	let argv = Argv::new(&redirect.command)?;
	let mut job = Job::new(1);
	if let ForkResult::Child = job.push_fork().map_err(ExecError::Fork)? {
		if let Err(e) = open_target(redirect.target, redirect.typ) {
			child_exit(&e);
		}
		exec_command(&argv);
	}
	job.wait().map_err(ExecError::Wait)?;
	Ok(job.code())
}

/// Runs one command with the interpreter's own streams and waits for it.
pub fn run_plain(command: &Command) -> Result<u8, ExecError> {
	let argv = Argv::new(command)?;
	let mut job = Job::new(1);
	if let ForkResult::Child = job.push_fork().map_err(ExecError::Fork)? {
		exec_command(&argv);
	}
	job.wait().map_err(ExecError::Wait)?;
	Ok(job.code())
}

pub fn eval(split: &Split) -> Result<u8, ExecError> {
	match *split {
		Split::Pipeline(ref pipeline) => run_pipeline(pipeline),
		Split::Redirect(ref redirect) => run_redirect(redirect),
		Split::Plain(ref command) => run_plain(command),
	}
}
