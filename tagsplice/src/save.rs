//! Writing a [`Tag`] back to storage
//!
//! Every function here builds the complete new file in memory before touching the destination,
//! since the engines read from the original while producing their output.
//!
//! * [`write_to_path`] leaves the original alone, writing to a new path
//! * [`save_to_path`] replaces a file atomically, through a temporary file in the same directory
//! * [`save_to`] rewrites an open handle in place

use crate::config::WriteOptions;
use crate::error::{Result, TagspliceError};
use crate::file::FileType;
use crate::io::{FileLike, Length, Truncate};
use crate::probe::Probe;
use crate::tag::Tag;

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Build the new file, preferring the format sniffed from `original` over `file_type`
fn render(
	original: &[u8],
	file_type: FileType,
	tag: &Tag,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let mut output = Vec::with_capacity(original.len());

	Probe::with_file_type(Cursor::new(original), file_type)
		.guess_file_type()?
		.write_to(tag, &mut output, write_options)?;

	Ok(output)
}

fn fallback_file_type(path: &Path, tag: &Tag) -> FileType {
	FileType::from_path(path).unwrap_or(tag.file_type())
}

/// Write `original` with its tag replaced by `tag` to `new_path`
///
/// `new_path` is created, or truncated if it exists. It may also be `original`.
///
/// # Errors
///
/// * `original` can't be read, or `new_path` can't be written
/// * See [`TagCodec::write_to`](crate::file::TagCodec::write_to)
pub fn write_to_path<P, Q>(
	original: P,
	tag: &Tag,
	new_path: Q,
	write_options: WriteOptions,
) -> Result<()>
where
	P: AsRef<Path>,
	Q: AsRef<Path>,
{
	let original = original.as_ref();
	let new_path = new_path.as_ref();
	log::debug!(
		"Writing tag of `{}` to `{}`",
		original.display(),
		new_path.display()
	);

	let content = fs::read(original)?;
	let output = render(&content, fallback_file_type(original, tag), tag, write_options)?;

	fs::write(new_path, output)?;
	Ok(())
}

/// Replace the tag of the file at `path`
///
/// The new file is written to a temporary file next to `path`, which is then renamed over it.
/// If anything fails, `path` is left untouched.
///
/// # Errors
///
/// * `path` can't be read
/// * The temporary file can't be created or renamed
/// * See [`TagCodec::write_to`](crate::file::TagCodec::write_to)
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> tagsplice::error::Result<()> {
/// use tagsplice::config::WriteOptions;
/// use tagsplice::probe::read_from_path;
/// use tagsplice::save::save_to_path;
///
/// let mut tag = read_from_path("song.flac")?;
/// tag.set_title("New title");
///
/// save_to_path("song.flac", &tag, WriteOptions::default())?;
/// # Ok(()) }
/// ```
pub fn save_to_path<P>(path: P, tag: &Tag, write_options: WriteOptions) -> Result<()>
where
	P: AsRef<Path>,
{
	let path = path.as_ref();
	log::debug!("Saving tag to `{}`", path.display());

	let content = fs::read(path)?;
	let output = render(&content, fallback_file_type(path, tag), tag, write_options)?;

	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp_file = NamedTempFile::new_in(parent)?;
	temp_file.write_all(&output)?;
	temp_file.as_file().sync_all()?;

	let permissions = fs::metadata(path)?.permissions();
	temp_file.as_file().set_permissions(permissions)?;

	log::trace!(
		"Renaming `{}` over `{}`",
		temp_file.path().display(),
		path.display()
	);
	temp_file.persist(path).map_err(|e| e.error)?;

	Ok(())
}

/// Replace the tag of an open file in place
///
/// The entire content of `file` is read, the new file is built in memory, and `file` is then
/// truncated and rewritten. Unlike [`save_to_path`], a failure while writing leaves `file`
/// in an undefined state.
///
/// # Errors
///
/// * See [`TagCodec::write_to`](crate::file::TagCodec::write_to)
/// * [`Truncate::truncate`], [`Length::len`], or [`std::io::Error`]
pub fn save_to<F>(file: &mut F, tag: &Tag, write_options: WriteOptions) -> Result<()>
where
	F: FileLike,
	TagspliceError: From<<F as Truncate>::Error>,
	TagspliceError: From<<F as Length>::Error>,
{
	file.rewind()?;

	let mut content = Vec::with_capacity(<F as Length>::len(file)? as usize);
	file.read_to_end(&mut content)?;

	let output = render(&content, tag.file_type(), tag, write_options)?;

	file.rewind()?;
	file.truncate(0)?;
	file.write_all(&output)?;
	file.flush()?;

	Ok(())
}
