use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use thiserror::Error;

use crate::types::*;

const PIPE: &str = "|";
const REDIRECT_INPUT: &str = "<";
const REDIRECT_OUTPUT: &str = ">";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("missing file name after '{0}'")]
	MissingTarget(&'static str),
}

struct Tokenizer<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Tokenizer<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		match c {
			b' ' | b'\t' | b'\n' | b'\r' => true,
			_ => false,
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Tokenizer::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(|c| !Tokenizer::is_whitespace(c));
		&self.line[orig .. self.i]
	}
}

/// Splits a raw line into whitespace separated tokens. No quoting is honoured.
pub fn tokenize(line: &[u8]) -> Vec<OsString> {
	let mut tokenizer = Tokenizer { line: line, i: 0 };
	let mut args = vec![];
	loop {
		tokenizer.skip_whitespaces();
		let word = tokenizer.read_word();
		if word.is_empty() {
			break;
		}
		args.push(OsStr::from_bytes(word).to_os_string());
	}
	args
}

/// Cuts the line at the first standalone `|`. Any later `|` is left to the
/// right-hand command as a plain argument.
pub fn split_pipe<'a>(args: &'a [OsString]) -> Option<Pipeline<'a>> {
	let i = args.iter().position(|a| a == PIPE)?;
	Some(Pipeline {
		left: Command::new(&args[.. i]),
		right: Command::new(&args[i+1 ..]),
	})
}

/// Cuts the line at the first `<` or `>`. The target is the single token after
/// the operator; anything past it is dropped.
pub fn split_redirect<'a>(args: &'a [OsString]) -> Result<Option<Redirect<'a>>, ParseError> {
	let found = args.iter().enumerate().find_map(|(i, a)| {
		if a == REDIRECT_INPUT {
			Some((i, RedirectType::Input, REDIRECT_INPUT))
		} else if a == REDIRECT_OUTPUT {
			Some((i, RedirectType::Output, REDIRECT_OUTPUT))
		} else {
			None
		}
	});
	let (i, typ, op) = match found {
		Some(f) => f,
		None => { return Ok(None); },
	};
	let target = match args.get(i + 1) {
		Some(t) => t.as_os_str(),
		None => { return Err(ParseError::MissingTarget(op)); },
	};
	Ok(Some(Redirect { command: Command::new(&args[.. i]), target: target, typ: typ }))
}

/// Picks at most one operator per line; a pipe wins over any redirection.
pub fn split<'a>(args: &'a [OsString]) -> Result<Split<'a>, ParseError> {
	if let Some(pipeline) = split_pipe(args) {
		return Ok(Split::Pipeline(pipeline));
	}
	match split_redirect(args)? {
		Some(redirect) => Ok(Split::Redirect(redirect)),
		None => Ok(Split::Plain(Command::new(args))),
	}
}
