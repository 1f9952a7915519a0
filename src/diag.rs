use std::fmt::Display;

use nix::unistd;

const NAME: &str = "psh";

fn write_stderr(msg: &str) {
	let _ = unistd::write(libc::STDERR_FILENO, msg.as_bytes());
}

/// Writes `psh: <err>` to stderr in one write(2), bypassing std's stderr lock
/// so a child can report between fork and exec.
pub fn report<E: Display>(err: &E) {
	write_stderr(&format!("{}: {}\n", NAME, err));
}

/// Message printed right before the interpreter gives up entirely.
pub fn fatal<E: Display>(what: &str, err: &E) {
	write_stderr(&format!("Error: {},{}\n", what, err));
}
