use super::FLAC_FIELDS;
use super::block::{BLOCK_ID_PADDING, BLOCK_ID_PICTURE, BLOCK_ID_VORBIS_COMMENTS, Block};
use super::read::verify_flac;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::macros::err;
use crate::ogg::comments::VorbisComments;
use crate::picture::PictureInformation;
use crate::tag::Tag;

use std::io::{Cursor, Read, Seek, Write};

pub(super) fn write_to<R, W>(
	original: &mut R,
	tag: &Tag,
	writer: &mut W,
	write_options: WriteOptions,
) -> Result<()>
where
	R: Read + Seek,
	W: Write,
{
	original.rewind()?;

	let mut file_bytes = Vec::new();
	original.read_to_end(&mut file_bytes)?;

	let mut cursor = Cursor::new(file_bytes.as_slice());

	// Anything before `fLaC` (an ID3v2 tag) is kept as-is
	let mut stream_info = verify_flac(&mut cursor)?;
	let metadata_start = stream_info.start as usize - 4;

	let mut is_last_block = stream_info.last;
	let mut has_padding = false;

	// Determined later
	stream_info.last = false;

	let mut blocks = vec![stream_info];
	while !is_last_block {
		let mut block = Block::read(&mut cursor, |ty| {
			ty != BLOCK_ID_VORBIS_COMMENTS && ty != BLOCK_ID_PICTURE
		})?;

		is_last_block = block.last;

		match block.ty {
			BLOCK_ID_VORBIS_COMMENTS | BLOCK_ID_PICTURE => {
				log::trace!("Removing existing block (ty: {})", block.ty);
				continue;
			},
			BLOCK_ID_PADDING => has_padding = true,
			_ => {},
		}

		block.last = false;
		blocks.push(block);
	}

	let metadata_end = cursor.position() as usize;
	if metadata_end > file_bytes.len() {
		log::error!("FLAC metadata blocks extend past the end of the stream");
		err!(TruncatedInput);
	}

	// New padding goes ahead of the comment and picture blocks, after anything kept
	if let (false, Some(preferred_padding)) = (has_padding, write_options.preferred_padding) {
		log::debug!("File is missing a PADDING block, adding one");
		blocks.push(Block::new_padding(preferred_padding as usize)?);
	}

	blocks.push(Block::new(
		BLOCK_ID_VORBIS_COMMENTS,
		create_comments(tag).as_bytes()?,
	));

	if let Some(picture) = tag.picture() {
		let information = PictureInformation::from_picture(picture)?;
		blocks.push(Block::new(
			BLOCK_ID_PICTURE,
			picture.as_flac_bytes(information, false)?,
		));
	}

	if let Some(block) = blocks.last_mut() {
		block.last = true;
	}

	let mut encoded_metadata = b"fLaC".to_vec();
	for block in &blocks {
		block.write_to(&mut encoded_metadata)?;
		log::trace!(
			"Wrote a block (ty: {}, size: {})",
			block.ty,
			block.content.len()
		);
	}

	writer.write_all(&file_bytes[..metadata_start])?;
	writer.write_all(&encoded_metadata)?;
	writer.write_all(&file_bytes[metadata_end..])?;

	Ok(())
}

fn create_comments(tag: &Tag) -> VorbisComments {
	let mut comments = VorbisComments::new();

	for (field, key) in FLAC_FIELDS {
		let value = tag.get(field);
		if !value.is_empty() {
			comments.push(key, value);
		}
	}

	comments
}
