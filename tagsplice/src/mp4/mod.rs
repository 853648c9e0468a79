//! MP4
//!
//! Tags live in `moov > udta > meta > ilst`, one atom per item. Since `moov` changes size on
//! write, any `mdat` following it moves, so every entry of the `stco` and `co64` chunk offset
//! tables is shifted by the same amount.
//!
//! Items that aren't mapped to a [`Field`](crate::tag::Field) are carried over as-is. Missing
//! `udta`, `meta`, or `ilst` atoms are created.

mod atom_info;
mod ilst;
mod read;
mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{FileType, TagCodec};
use crate::tag::Tag;

use std::io::{Read, Seek, Write};

/// The MP4 engine
pub struct Mp4File;

impl TagCodec for Mp4File {
	const FILE_TYPE: FileType = FileType::Mp4;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Tag>
	where
		R: Read + Seek,
	{
		read::read_from(reader, parse_options)
	}

	fn write_to<R, W>(
		original: &mut R,
		tag: &Tag,
		writer: &mut W,
		_write_options: WriteOptions,
	) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		write::write_to(original, tag, writer)
	}
}
