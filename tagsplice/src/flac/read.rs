use super::block::{BLOCK_ID_PICTURE, BLOCK_ID_STREAMINFO, BLOCK_ID_VORBIS_COMMENTS, Block};
use super::field_for_key;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::id3::find_id3v2;
use crate::macros::{decode_err, err};
use crate::ogg::comments::VorbisComments;
use crate::picture::{FRONT_COVER, Picture};
use crate::tag::Tag;

use std::io::{Read, Seek, SeekFrom};

/// Skip any ID3v2 tag, then check for `fLaC` and a leading `STREAMINFO` block
///
/// The reader is left after the `STREAMINFO` block.
pub(super) fn verify_flac<R>(data: &mut R) -> Result<Block>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;

	// It is possible for a FLAC file to contain an ID3v2 tag
	if let Some(header) = find_id3v2(data)? {
		log::warn!("Encountered an ID3v2 tag before the FLAC stream, skipping");
		data.seek(SeekFrom::Start(start + u64::from(header.full_tag_size())))?;
	}

	let mut marker = [0; 4];
	if data.read_exact(&mut marker).is_err() || &marker != b"fLaC" {
		decode_err!(@BAIL Flac, "File missing \"fLaC\" stream marker");
	}

	let block = Block::read(data, |_| true)?;

	if block.ty != BLOCK_ID_STREAMINFO {
		decode_err!(@BAIL Flac, "File missing mandatory STREAMINFO block");
	}

	log::debug!("File verified to be FLAC");
	Ok(block)
}

/// Decode the content of a `VORBIS_COMMENT` block
pub(super) fn read_comments(block: &Block) -> Result<VorbisComments> {
	if block.ty != BLOCK_ID_VORBIS_COMMENTS {
		err!(NotVorbisComment);
	}

	VorbisComments::parse(&block.content)
}

pub(super) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<Tag>
where
	R: Read + Seek,
{
	data.rewind()?;

	let stream_info = verify_flac(data)?;

	let mut tag = Tag::new(FileType::Flac);
	let mut picture_type = None;

	let mut last_block = stream_info.last;
	while !last_block {
		let block = Block::read(data, |block_type| {
			block_type == BLOCK_ID_VORBIS_COMMENTS
				|| (block_type == BLOCK_ID_PICTURE && parse_options.read_cover_art)
		})?;

		last_block = block.last;

		match block.ty {
			BLOCK_ID_VORBIS_COMMENTS => {
				log::debug!("Encountered a Vorbis Comments block, parsing");

				// Only one block is allowed per stream, the last one wins
				let comments = read_comments(&block)?;
				for (key, value) in comments.items {
					match field_for_key(&key) {
						Some(field) => tag.set(field, value),
						None => log::trace!("Dropping unmapped comment \"{key}\""),
					}
				}

				tag.set_vendor(comments.vendor);
			},
			BLOCK_ID_PICTURE if parse_options.read_cover_art => {
				log::debug!("Encountered a FLAC picture block, parsing");

				let (picture, pic_type) = Picture::from_flac_bytes(&block.content, false)?;
				if picture_type == Some(u32::from(FRONT_COVER)) {
					log::debug!("Skipping picture of type {pic_type}, a front cover was already found");
					continue;
				}

				picture_type = Some(pic_type);
				tag.set_picture(picture);
			},
			_ => {},
		}
	}

	Ok(tag)
}

#[cfg(test)]
mod tests {
	use super::read_comments;
	use crate::config::ParseOptions;
	use crate::error::ErrorKind;
	use crate::file::TagCodec;
	use crate::flac::FlacFile;
	use crate::flac::block::{BLOCK_ID_PADDING, BLOCK_ID_PICTURE, BLOCK_ID_VORBIS_COMMENTS, Block};
	use crate::flac::tests::{flac_stream, streaminfo};
	use crate::ogg::comments::VorbisComments;
	use crate::picture::{MimeType, Picture, PictureInformation};

	use std::io::Cursor;

	fn comment_block(items: &[(&str, &str)]) -> Block {
		let mut comments = VorbisComments::new();
		for (key, value) in items {
			comments.push(*key, *value);
		}

		Block::new(BLOCK_ID_VORBIS_COMMENTS, comments.as_bytes().unwrap())
	}

	fn picture_block(picture: &Picture, pic_type: u32) -> Block {
		let info = PictureInformation::from_picture(picture).unwrap();
		let mut content = picture.as_flac_bytes(info, false).unwrap();
		content[..4].copy_from_slice(&pic_type.to_be_bytes());

		Block::new(BLOCK_ID_PICTURE, content)
	}

	#[test_log::test]
	fn five_fields() {
		let file = flac_stream(vec![
			streaminfo(),
			comment_block(&[
				("title", "Foo title"),
				("ARTIST", "Bar artist"),
				("ALBUMARTIST", "Dropped"),
				("TRACKNUMBER", "1"),
			]),
			Block::new(BLOCK_ID_PADDING, vec![0; 16]),
		]);

		let tag = FlacFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).unwrap();
		assert_eq!(tag.title(), "Foo title");
		assert_eq!(tag.artist(), "Bar artist");
		assert_eq!(tag.album_artist(), "");
		assert!(tag.passthrough().is_empty());
		assert_eq!(tag.fields().count(), 2);
	}

	#[test_log::test]
	fn prefers_front_cover() {
		let back = Picture::new(MimeType::Png, crate::picture::tests::png(2, 2, None));
		let front = Picture::new(MimeType::Jpeg, crate::picture::tests::jpeg(2, 2));

		let file = flac_stream(vec![
			streaminfo(),
			picture_block(&back, 4),
			picture_block(&front, 3),
			picture_block(&back, 4),
		]);

		let tag = FlacFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).unwrap();
		assert_eq!(tag.picture(), Some(&front));

		let tag = FlacFile::read_from(
			&mut Cursor::new(&file),
			ParseOptions::new().read_cover_art(false),
		)
		.unwrap();
		assert!(tag.picture().is_none());
	}

	#[test_log::test]
	fn behind_id3v2() {
		let mut file = b"ID3\x04\x00\x00\x00\x00\x00\x0A".to_vec();
		file.extend([0; 10]);
		file.extend(flac_stream(vec![streaminfo(), comment_block(&[("DATE", "2024")])]));

		let tag = FlacFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).unwrap();
		assert_eq!(tag.date(), "2024");
	}

	#[test_log::test]
	fn invalid_streams() {
		let err = FlacFile::read_from(&mut Cursor::new(b"OggS...."), ParseOptions::new())
			.unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::FileDecoding(_)));

		// PADDING before STREAMINFO
		let file = flac_stream(vec![Block::new(BLOCK_ID_PADDING, vec![0; 4]), streaminfo()]);
		let err = FlacFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::FileDecoding(_)));

		let err = read_comments(&Block::new(BLOCK_ID_PADDING, Vec::new())).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::NotVorbisComment));
	}
}
