use std::ffi::{OsStr, OsString};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output }

/// A program name followed by its arguments, borrowed from the line's tokens.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Command<'a> {
	pub args: &'a [OsString],
}

impl<'a> Command<'a> {
	pub fn new(args: &'a [OsString]) -> Command<'a> {
		Command { args: args }
	}

	pub fn name(&self) -> Option<&'a OsStr> {
		self.args.first().map(|s| s.as_os_str())
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct Redirect<'a> {
	pub command: Command<'a>,
	pub target: &'a OsStr,
	pub typ: RedirectType,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline<'a> {
	pub left: Command<'a>,
	pub right: Command<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Split<'a> {
	Pipeline(Pipeline<'a>),
	Redirect(Redirect<'a>),
	Plain(Command<'a>),
}
