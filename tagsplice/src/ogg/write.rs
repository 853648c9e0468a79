use super::comments::{PICTURE_KEY, VorbisComments};
use super::{field_for_key, field_key};
use crate::error::Result;
use crate::file::OggCodec;
use crate::picture::PictureInformation;
use crate::tag::Tag;

use std::io::{Cursor, Read, Seek, Write};

use tagsplice_ogg::{Packets, Page, replace_packet};

pub(crate) fn write_to<R, W>(original: &mut R, tag: &Tag, writer: &mut W) -> Result<()>
where
	R: Read + Seek,
	W: Write,
{
	original.rewind()?;

	let mut file_bytes = Vec::new();
	original.read_to_end(&mut file_bytes)?;
	let file_len = file_bytes.len() as u64;

	let mut reader = Cursor::new(file_bytes);

	// The codec is taken from the stream itself, the tag may have been created for another file
	let packets = Packets::read_count(&mut reader, Some(2), false)?;
	let codec = OggCodec::identify(
		packets.get(0).unwrap_or_default(),
		packets.get(1).unwrap_or_default(),
	)?;

	if tag.ogg_codec().is_some_and(|tag_codec| tag_codec != codec) {
		log::warn!("Writing a tag read from another codec to an Ogg {codec:?} stream");
	}

	let packet = create_comment_packet(tag, codec)?;

	reader.rewind()?;
	let mut pages = Vec::new();
	while reader.position() < file_len {
		pages.push(Page::read(&mut reader)?);
	}

	log::debug!(
		"Replacing the comment packet of stream {:#010X}, {} pages",
		packets.serial(),
		pages.len()
	);

	for page in replace_packet(&pages, packets.serial(), 1, &packet)? {
		writer.write_all(&page.as_bytes())?;
	}

	Ok(())
}

/// Build the comment packet: codec marker, comment block, and for Vorbis the framing bit
pub(crate) fn create_comment_packet(tag: &Tag, codec: OggCodec) -> Result<Vec<u8>> {
	let comments = create_comments(tag)?;

	let mut packet = codec.comment_marker().to_vec();
	packet.extend(comments.as_bytes()?);

	if codec == OggCodec::Vorbis {
		packet.push(1);
	}

	Ok(packet)
}

fn create_comments(tag: &Tag) -> Result<VorbisComments> {
	let mut comments = VorbisComments::new();

	for (field, value) in tag.fields() {
		if let Some(key) = field_key(field) {
			comments.push(key, value);
		}
	}

	for (key, value) in tag.passthrough() {
		if value.is_empty() {
			continue;
		}

		if key == PICTURE_KEY || field_for_key(key).is_some() {
			log::warn!("Passthrough key \"{key}\" collides with a mapped key, skipping");
			continue;
		}

		comments.push(key.as_str(), value.as_str());
	}

	if let Some(picture) = tag.picture() {
		let information = PictureInformation::from_picture(picture)?;
		let encoded = picture.as_flac_bytes(information, true)?;
		comments.push(PICTURE_KEY, String::from_utf8(encoded)?);
	}

	Ok(comments)
}
