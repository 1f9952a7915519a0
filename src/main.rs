mod diag;
mod eval;
mod expand;
mod job;
mod parser;
mod signals;
mod types;

use std::io;
use std::io::{BufRead, Write};
use std::process;

use crate::eval::ExecError;

const PROMPT: &[u8] = b"> ";

/// Tokenizes, expands, splits and runs one line. Blank lines are skipped.
fn dispatch(line: &[u8]) -> Result<Option<u8>, ExecError> {
	let mut args = parser::tokenize(line);
	if args.is_empty() {
		return Ok(None);
	}
	expand::glob_args(&mut args);
	let split = parser::split(&args)?;
	eval::eval(&split).map(Some)
}

/// Read loop. Returns the interpreter's exit status.
fn repl() -> i32 {
	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		let _ = stdout.write_all(PROMPT);
		let _ = stdout.flush();
		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => { return 0; },
			Ok(_) => {},
			Err(e) => {
				diag::report(&e);
				return 0;
			},
		}
		match dispatch(&line) {
			Ok(_) => {},
			Err(ExecError::Pipe(e)) => {
				diag::fatal("pipe", &e);
				return 1;
			},
			Err(e) => diag::report(&e),
		}
	}
}

fn main() {
	if let Err(e) = signals::ignore_interactive() {
		diag::report(&e);
	}
	process::exit(repl());
}
