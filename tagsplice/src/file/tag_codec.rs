use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::FileType;
use crate::tag::Tag;

use std::io::{Read, Seek, Write};

/// The parse/write contract every format engine implements
///
/// Engines are stateless. Reading produces a [`Tag`], writing takes the untouched original stream
/// alongside a [`Tag`] and emits the complete new file. The audio payload is copied through as-is.
pub trait TagCodec {
	/// The container format handled by the engine
	const FILE_TYPE: FileType;

	/// Read the tag from a stream
	///
	/// # Errors
	///
	/// The stream is not a valid file of this type, or the tag region is malformed
	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Tag>
	where
		R: Read + Seek;

	/// Write `original` with its tag region replaced by `tag` to `writer`
	///
	/// NOTE: `writer` must not refer to the same storage as `original`, see
	/// [`save_to`](crate::save::save_to) for in-place saving.
	///
	/// # Errors
	///
	/// * `original` is not a valid file of this type
	/// * `tag` holds values that can't be encoded in this format
	/// * [`std::io::Error`]
	fn write_to<R, W>(
		original: &mut R,
		tag: &Tag,
		writer: &mut W,
		write_options: WriteOptions,
	) -> Result<()>
	where
		R: Read + Seek,
		W: Write;
}
