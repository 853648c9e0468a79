use super::frame::{ATTACHED_PICTURE_ID, frame_id};
use super::header::Id3v2Version;
use super::synchsafe::SynchsafeInteger;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::{err, try_vec};
use crate::picture::{COVER_DESCRIPTION, FRONT_COVER, MimeType, Picture};
use crate::tag::{Field, Tag};
use crate::util::text::TextEncoding;

use byteorder::{BigEndian, WriteBytesExt};

/// Serialize a full ID3v2 tag (header, frames, and padding) from a [`Tag`]
///
/// A tag without fields or a picture produces no bytes at all, which strips the tag from the file.
pub(crate) fn create_tag(tag: &Tag, write_options: WriteOptions) -> Result<Vec<u8>> {
	if tag.fields().next().is_none() && tag.picture().is_none() {
		log::debug!("Tag is empty, stripping the ID3v2 tag");
		return Ok(Vec::new());
	}

	let (version, encoding) = if write_options.use_id3v23 {
		log::debug!("Using ID3v2.3");
		(Id3v2Version::V3, TextEncoding::UTF16)
	} else {
		(Id3v2Version::V4, TextEncoding::UTF8)
	};

	let mut frames = Vec::new();
	for (field, value) in tag.fields() {
		let Some(id) = frame_id(field, version) else {
			continue;
		};

		let content = match field {
			Field::Comment => comment_content(value, encoding),
			_ => text_content(value, encoding),
		};

		log::trace!("Writing frame \"{id}\"");
		write_frame(&mut frames, id, &content, version)?;
	}

	if let Some(picture) = tag.picture() {
		log::trace!("Writing frame \"{ATTACHED_PICTURE_ID}\"");
		write_frame(
			&mut frames,
			ATTACHED_PICTURE_ID,
			&picture_content(picture, encoding)?,
			version,
		)?;
	}

	let padding_len = write_options.preferred_padding.unwrap_or(0) as usize;
	let Ok(content_len) = u32::try_from(frames.len() + padding_len) else {
		err!(TooMuchData);
	};

	let mut id3v2 = Vec::with_capacity(10 + frames.len() + padding_len);
	id3v2.extend(b"ID3");
	id3v2.push(match version {
		Id3v2Version::V3 => 3,
		_ => 4,
	});
	// Revision, flags
	id3v2.extend([0, 0]);
	id3v2.write_u32::<BigEndian>(content_len.synch()?)?;
	id3v2.extend(frames);

	if padding_len > 0 {
		log::trace!("Padding tag with {padding_len} bytes");
		id3v2.extend(try_vec![0; padding_len]);
	}

	Ok(id3v2)
}

fn write_frame(
	out: &mut Vec<u8>,
	id: &str,
	content: &[u8],
	version: Id3v2Version,
) -> Result<()> {
	let Ok(len) = u32::try_from(content.len()) else {
		err!(TooMuchData);
	};

	out.extend(id.as_bytes());
	match version {
		Id3v2Version::V4 => out.write_u32::<BigEndian>(len.synch()?)?,
		_ => out.write_u32::<BigEndian>(len)?,
	}
	// Flags
	out.extend([0, 0]);
	out.extend(content);

	Ok(())
}

fn text_content(value: &str, encoding: TextEncoding) -> Vec<u8> {
	let mut content = vec![encoding as u8];
	content.extend(encoding.encode(value, false));
	content
}

fn comment_content(value: &str, encoding: TextEncoding) -> Vec<u8> {
	let mut content = vec![encoding as u8];
	content.extend(b"eng");
	// Empty description
	content.extend(encoding.encode("", true));
	content.extend(encoding.encode(value, false));
	content
}

fn picture_content(picture: &Picture, encoding: TextEncoding) -> Result<Vec<u8>> {
	if let MimeType::Unknown(mime) = picture.mime_type() {
		err!(UnsupportedMime(mime.clone()));
	}

	let mut content = vec![encoding as u8];
	content.extend(TextEncoding::Latin1.encode(picture.mime_type().as_str(), true));
	content.push(FRONT_COVER);
	content.extend(encoding.encode(COVER_DESCRIPTION, true));
	content.extend(picture.data());

	Ok(content)
}

#[cfg(test)]
mod tests {
	use super::create_tag;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::error::ErrorKind;
	use crate::file::FileType;
	use crate::id3::header::{Id3v2Header, Id3v2Version};
	use crate::id3::read::parse_id3v2;
	use crate::picture::{MimeType, Picture};
	use crate::tag::Tag;

	fn tag() -> Tag {
		let mut tag = Tag::new(FileType::Mpeg);
		tag.set_artist("Foo artist");
		tag.set_title("Føø title");
		tag.set_comment("Qux comment");
		tag.set_date("2024-01-01");
		tag.set_picture(Picture::new(MimeType::Jpeg, vec![0xFF, 0xD8, 0xFF, 0xE0]));
		tag
	}

	fn reparse(bytes: &[u8]) -> (Id3v2Header, Tag) {
		let mut reader = bytes;
		let header = Id3v2Header::parse(&mut reader).unwrap();
		let tag = parse_id3v2(&mut reader, header, ParseOptions::new()).unwrap();
		(header, tag)
	}

	#[test_log::test]
	fn v24_round_trip() {
		let tag = tag();
		let bytes = create_tag(&tag, WriteOptions::new()).unwrap();
		assert_eq!(&bytes[..5], b"ID3\x04\x00");

		let (header, read) = reparse(&bytes);
		assert_eq!(header.full_tag_size() as usize, bytes.len());
		assert_eq!(read.fields().collect::<Vec<_>>(), tag.fields().collect::<Vec<_>>());
		assert_eq!(read.picture(), tag.picture());
	}

	#[test_log::test]
	fn v23_uses_utf16() {
		let tag = tag();
		let bytes = create_tag(&tag, WriteOptions::new().use_id3v23(true)).unwrap();

		let (header, read) = reparse(&bytes);
		assert_eq!(header.version, Id3v2Version::V3);
		assert_eq!(read.title(), "Føø title");
		assert_eq!(read.comment(), "Qux comment");

		// The frame content starts with the encoding, UTF-16
		let tit2 = bytes.windows(4).position(|w| w == b"TIT2").unwrap();
		assert_eq!(bytes[tit2 + 10], 1);
	}

	#[test_log::test]
	fn padding() {
		let mut tag = Tag::new(FileType::Mpeg);
		tag.set_album("Baz album");

		let unpadded = create_tag(&tag, WriteOptions::new()).unwrap();
		let padded = create_tag(&tag, WriteOptions::new().preferred_padding(100)).unwrap();
		assert_eq!(padded.len(), unpadded.len() + 100);

		let (header, read) = reparse(&padded);
		assert_eq!(header.full_tag_size() as usize, padded.len());
		assert_eq!(read.album(), "Baz album");
	}

	#[test_log::test]
	fn empty_tag_strips() {
		let tag = Tag::new(FileType::Mpeg);
		assert!(create_tag(&tag, WriteOptions::new()).unwrap().is_empty());
	}

	#[test_log::test]
	fn unsupported_picture() {
		let mut tag = Tag::new(FileType::Mpeg);
		tag.set_picture(Picture::new(MimeType::from_str("image/gif"), b"GIF89a".to_vec()));

		let err = create_tag(&tag, WriteOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::UnsupportedMime(_)));
	}
}
