use std::path::{Path, PathBuf};
use std::{env, fs, io};

use log::{info, warn};

use crate::error::ModelError;
use crate::gutenberg::strip_disclaimers;

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted so that the corpus is always
/// concatenated in the same order.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Loads every `.txt` file of `folder` into one corpus string.
///
/// # Behavior
/// - Files are read in file-name order, each followed by a single space
/// - Files that are not valid UTF-8 (or cannot be read) are skipped with a
///   warning
/// - With `strip_gutenberg`, Project Gutenberg headers, footers and licence
///   blurb are removed from each file first
///
/// # Errors
/// Returns `ModelError::NotADirectory` if `folder` is not a directory, or an
/// I/O error if the directory cannot be listed.
pub fn read_corpus<P: AsRef<Path>>(folder: P, strip_gutenberg: bool) -> Result<String, ModelError> {
	let folder = folder.as_ref();
	if !folder.is_dir() {
		return Err(ModelError::NotADirectory(folder.to_path_buf()));
	}

	let mut corpus = String::new();
	let mut loaded = 0usize;
	for file in list_files(folder, "txt")? {
		let path = folder.join(&file);
		let text = match fs::read_to_string(&path) {
			Ok(text) => text,
			Err(e) => {
				warn!("skipping {}: {e}", path.display());
				continue;
			}
		};
		if strip_gutenberg {
			corpus.push_str(&strip_disclaimers(&text));
		} else {
			corpus.push_str(&text);
		}
		corpus.push(' ');
		loaded += 1;
	}

	info!("loaded {loaded} files ({} bytes) from {}", corpus.len(), folder.display());
	Ok(corpus)
}

/// Replaces every character that is not alphanumeric, a space, `_` or `-`
/// by `_`.
///
/// Example:
/// `"Book: 1/2"` → `"Book_ 1_2"`
pub fn safe_file_name(title: &str) -> String {
	title
		.chars()
		.map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') { c } else { '_' })
		.collect()
}

/// Writes `text` to `<folder>/<safe title>.txt`, creating the folder if
/// needed, and returns the written path.
pub fn save_text<P: AsRef<Path>>(folder: P, title: &str, text: &str) -> io::Result<PathBuf> {
	let folder = folder.as_ref();
	fs::create_dir_all(folder)?;

	let mut path = folder.join(safe_file_name(title));
	path.set_extension("txt");
	fs::write(&path, text)?;

	Ok(path)
}
