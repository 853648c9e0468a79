//! MPEG audio with an ID3v2 tag
//!
//! The tag sits at the very start of the stream, announcing its own size with a synchsafe
//! integer. Writing regenerates the entire frame set and splices it onto the audio that followed
//! the original tag.
//!
//! Only the frames mapped to a [`Field`](crate::tag::Field) and the front cover are kept,
//! every other frame is dropped on write.

pub(crate) mod frame;
pub(crate) mod header;
pub(crate) mod read;
pub(crate) mod synchsafe;
pub(crate) mod write;

pub use header::Id3v2Version;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{FileType, TagCodec};
use crate::tag::Tag;
use header::Id3v2Header;

use std::io::{Read, Seek, SeekFrom, Write};

/// Look for an ID3v2 tag at the current position
///
/// If one is found, the reader is left at the start of the frames. Otherwise, the reader is
/// returned to where it started.
pub(crate) fn find_id3v2<R>(data: &mut R) -> Result<Option<Id3v2Header>>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;
	log::debug!("Searching for an ID3v2 tag at offset: {start}");

	let mut identifier = Vec::with_capacity(3);
	data.by_ref().take(3).read_to_end(&mut identifier)?;
	data.seek(SeekFrom::Start(start))?;

	if identifier != b"ID3" {
		return Ok(None);
	}

	log::debug!("Found an ID3v2 tag, parsing");
	Id3v2Header::parse(data).map(Some)
}

/// The MPEG/ID3v2 engine
pub struct MpegFile;

impl TagCodec for MpegFile {
	const FILE_TYPE: FileType = FileType::Mpeg;

	fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Tag>
	where
		R: Read + Seek,
	{
		reader.rewind()?;

		match find_id3v2(reader)? {
			Some(header) => read::parse_id3v2(reader, header, parse_options),
			None => {
				log::debug!("No ID3v2 tag found");
				Ok(Tag::new(FileType::Mpeg))
			},
		}
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
		log::debug!("Writing ID3v2 tag");

		original.rewind()?;

		// The audio starts right after the original tag, or at the very beginning without one
		let audio_start = find_id3v2(original)?.map_or(0, |header| header.full_tag_size());

		let id3v2 = write::create_tag(tag, write_options)?;
		writer.write_all(&id3v2)?;

		original.seek(SeekFrom::Start(u64::from(audio_start)))?;
		std::io::copy(original, writer)?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::MpegFile;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::file::{FileType, TagCodec};
	use crate::tag::Tag;

	use std::io::Cursor;

	const AUDIO: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x0F, 0xF0, 0x00];

	#[test_log::test]
	fn untagged_file() {
		let tag = MpegFile::read_from(&mut Cursor::new(AUDIO), ParseOptions::new()).unwrap();
		assert!(tag.is_empty());
		assert_eq!(tag.file_type(), FileType::Mpeg);

		let mut tag = Tag::new(FileType::Mpeg);
		tag.set_title("Foo title");

		let mut out = Vec::new();
		MpegFile::write_to(&mut Cursor::new(AUDIO), &tag, &mut out, WriteOptions::new()).unwrap();
		assert!(out.starts_with(b"ID3"));
		assert!(out.ends_with(AUDIO));
	}

	#[test_log::test]
	fn replace_and_strip() {
		let mut tag = Tag::new(FileType::Mpeg);
		tag.set_artist("OldArtist");
		tag.set_album("OldAlbum");

		let mut tagged = Vec::new();
		MpegFile::write_to(&mut Cursor::new(AUDIO), &tag, &mut tagged, WriteOptions::new())
			.unwrap();

		let mut read = MpegFile::read_from(&mut Cursor::new(&tagged), ParseOptions::new()).unwrap();
		assert_eq!(read.artist(), "OldArtist");

		read.set_artist("A much longer artist name than before");
		let mut rewritten = Vec::new();
		MpegFile::write_to(
			&mut Cursor::new(&tagged),
			&read,
			&mut rewritten,
			WriteOptions::new(),
		)
		.unwrap();
		assert!(rewritten.ends_with(AUDIO));

		let reread =
			MpegFile::read_from(&mut Cursor::new(&rewritten), ParseOptions::new()).unwrap();
		assert_eq!(reread.artist(), "A much longer artist name than before");
		assert_eq!(reread.album(), "OldAlbum");

		read.clear();
		let mut stripped = Vec::new();
		MpegFile::write_to(
			&mut Cursor::new(&rewritten),
			&read,
			&mut stripped,
			WriteOptions::new(),
		)
		.unwrap();
		assert_eq!(stripped, AUDIO);
	}
}
