//! FLAC
//!
//! A FLAC stream starts with `fLaC`, followed by a list of metadata blocks. The first is always
//! `STREAMINFO`, and the last has its "last metadata block" bit set. Audio frames follow directly.
//!
//! Only five fields are read from the `VORBIS_COMMENT` block, everything else is dropped on
//! write. An ID3v2 tag preceding the stream is skipped when reading, and kept as-is when writing.

pub(crate) mod block;
mod read;
mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{FileType, TagCodec};
use crate::tag::{Field, Tag};

use std::io::{Read, Seek, Write};

/// The fields stored in the `VORBIS_COMMENT` block, in the order they are written
pub(crate) const FLAC_FIELDS: [(Field, &str); 5] = [
	(Field::Title, "TITLE"),
	(Field::Album, "ALBUM"),
	(Field::Artist, "ARTIST"),
	(Field::Genre, "GENRE"),
	(Field::Date, "DATE"),
];

/// Map a Vorbis comment key to its [`Field`], case-insensitively
pub(crate) fn field_for_key(key: &str) -> Option<Field> {
	FLAC_FIELDS
		.iter()
		.find(|(_, flac_key)| flac_key.eq_ignore_ascii_case(key))
		.map(|(field, _)| *field)
}

/// The FLAC engine
pub struct FlacFile;

impl TagCodec for FlacFile {
	const FILE_TYPE: FileType = FileType::Flac;

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
		write_options: WriteOptions,
	) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		write::write_to(original, tag, writer, write_options)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::block::{BLOCK_ID_STREAMINFO, Block};
	use super::{FlacFile, field_for_key};
	use crate::config::{ParseOptions, WriteOptions};
	use crate::file::{FileType, TagCodec};
	use crate::tag::{Field, Tag};

	use std::io::Cursor;

	pub(crate) const FRAMES: &[u8] = &[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x0F, 0xAB, 0xCD];

	/// `fLaC`, the given blocks (the last one flagged as such), and some audio frames
	pub(crate) fn flac_stream(blocks: Vec<Block>) -> Vec<u8> {
		let mut file = b"fLaC".to_vec();

		let count = blocks.len();
		for (idx, mut block) in blocks.into_iter().enumerate() {
			block.last = idx + 1 == count;
			block.write_to(&mut file).unwrap();
		}

		file.extend(FRAMES);
		file
	}

	pub(crate) fn streaminfo() -> Block {
		Block::new(BLOCK_ID_STREAMINFO, (0..34).collect())
	}

	#[test_log::test]
	fn keys() {
		assert_eq!(field_for_key("title"), Some(Field::Title));
		assert_eq!(field_for_key("Date"), Some(Field::Date));
		assert_eq!(field_for_key("ALBUMARTIST"), None);
		assert_eq!(field_for_key("COMMENT"), None);
	}

	#[test_log::test]
	fn round_trip() {
		let file = flac_stream(vec![streaminfo()]);

		let mut tag = FlacFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).unwrap();
		assert!(tag.is_empty());
		assert_eq!(tag.file_type(), FileType::Flac);

		tag.set_title("Foo title");
		tag.set_album("Bar album");
		tag.set_comment("Not stored in FLAC");

		let mut out = Vec::new();
		FlacFile::write_to(&mut Cursor::new(&file), &tag, &mut out, WriteOptions::new()).unwrap();
		assert!(out.ends_with(FRAMES));

		let reread = FlacFile::read_from(&mut Cursor::new(&out), ParseOptions::new()).unwrap();
		assert_eq!(reread.title(), "Foo title");
		assert_eq!(reread.album(), "Bar album");
		assert_eq!(reread.comment(), "");

		let mut cleared = Tag::new(FileType::Flac);
		cleared.set_date("2024");
		let mut out2 = Vec::new();
		FlacFile::write_to(&mut Cursor::new(&out), &cleared, &mut out2, WriteOptions::new())
			.unwrap();

		let reread = FlacFile::read_from(&mut Cursor::new(&out2), ParseOptions::new()).unwrap();
		assert_eq!(reread.fields().collect::<Vec<_>>(), [(Field::Date, "2024")]);
	}
}
