use std::ffi::OsString;

use glob::{glob_with, MatchOptions};

/// A wildcard never matches a leading dot; `.profile` needs `.*` or the literal.
const OPTIONS: MatchOptions = MatchOptions {
	case_sensitive: true,
	require_literal_separator: false,
	require_literal_leading_dot: true,
};

/// First path matching `pattern`, in the order the glob iterator yields them.
/// Entries that cannot be read are skipped.
fn first_match(pattern: &OsString) -> Option<OsString> {
	let pattern = pattern.to_str()?;
	let paths = glob_with(pattern, OPTIONS).ok()?;
	paths.filter_map(Result::ok).next().map(|path| path.into_os_string())
}

/// Replaces each token that matches something on the filesystem with its first
/// match. Only one path ever takes a token's place; tokens with no match are
/// kept as typed.
pub fn glob_args(args: &mut [OsString]) {
	for arg in args.iter_mut() {
		if let Some(path) = first_match(arg) {
			*arg = path;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs::File;

	fn touch(dir: &tempfile::TempDir, name: &str) {
		File::create(dir.path().join(name)).unwrap();
	}

	fn pattern(dir: &tempfile::TempDir, rest: &str) -> OsString {
		dir.path().join(rest).into_os_string()
	}

	#[test]
	fn replaces_with_first_match_only() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir, "b.txt");
		touch(&dir, "a.txt");
		touch(&dir, "c.log");
		let mut args = vec![OsString::from("cat"), pattern(&dir, "*.txt")];
		glob_args(&mut args);
		assert_eq!(args.len(), 2);
		assert_eq!(args[1], pattern(&dir, "a.txt"));
	}

	#[test]
	fn wildcard_skips_dotfiles() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir, ".hidden");
		touch(&dir, "a.txt");
		let mut args = vec![pattern(&dir, "*")];
		glob_args(&mut args);
		assert_eq!(args[0], pattern(&dir, "a.txt"));

		let mut args = vec![pattern(&dir, ".*")];
		glob_args(&mut args);
		assert_eq!(args[0], pattern(&dir, ".hidden"));
	}

	#[test]
	fn unreadable_entries_do_not_hide_later_matches() {
		use std::fs;
		use std::os::unix::fs::PermissionsExt;
		let dir = tempfile::tempdir().unwrap();
		let locked = dir.path().join("a");
		fs::create_dir(&locked).unwrap();
		fs::create_dir(dir.path().join("b")).unwrap();
		touch(&dir, "b/x");
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
		let mut args = vec![pattern(&dir, "*/x")];
		glob_args(&mut args);
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
		assert_eq!(args[0], pattern(&dir, "b/x"));
	}

	#[test]
	fn leaves_unmatched_tokens() {
		let dir = tempfile::tempdir().unwrap();
		let missing = pattern(&dir, "*.none");
		let mut args = vec![OsString::from("-l"), missing.clone()];
		glob_args(&mut args);
		assert_eq!(args, vec![OsString::from("-l"), missing]);
	}

	#[test]
	fn leaves_invalid_patterns() {
		let mut args = vec![OsString::from("[")];
		glob_args(&mut args);
		assert_eq!(args, vec![OsString::from("[")]);
	}

	#[test]
	fn literal_existing_path_is_kept() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir, "plain");
		let path = pattern(&dir, "plain");
		let mut args = vec![path.clone()];
		glob_args(&mut args);
		assert_eq!(args, vec![path]);
	}

	#[test]
	fn non_utf8_tokens_pass_through() {
		use std::ffi::OsStr;
		use std::os::unix::ffi::OsStrExt;
		let odd = OsStr::from_bytes(b"\xff*").to_os_string();
		let mut args = vec![odd.clone()];
		glob_args(&mut args);
		assert_eq!(args, vec![odd]);
	}
}
