use nix::sys::signal::{self, SigHandler, Signal};

const INTERACTIVE: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

fn set_all(handler: SigHandler) -> nix::Result<()> {
	for &sig in INTERACTIVE.iter() {
		unsafe { signal::signal(sig, handler) }?;
	}
	Ok(())
}

/// Keeps ^C and ^\ from killing the interpreter. Applied once at startup.
pub fn ignore_interactive() -> nix::Result<()> {
	set_all(SigHandler::SigIgn)
}

/// Ignored dispositions survive exec, so children put the defaults back.
pub fn restore_default() -> nix::Result<()> {
	set_all(SigHandler::SigDfl)
}
