use super::comments::{PICTURE_KEY, VorbisComments};
use super::field_for_key;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::OggCodec;
use crate::picture::FRONT_COVER;
use crate::picture::Picture;
use crate::tag::Tag;

use std::io::{Read, Seek};

use tagsplice_ogg::Packets;

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Tag>
where
	R: Read + Seek,
{
	reader.rewind()?;

	// The identification and comment headers, of the first logical stream
	let packets = Packets::read_count(reader, Some(2), parse_options.verify_ogg_crc)?;
	let ident = packets.get(0).unwrap_or_default();
	let comment = packets.get(1).unwrap_or_default();

	let codec = OggCodec::identify(ident, comment)?;
	log::debug!(
		"Found an Ogg {codec:?} stream, serial: {:#010X}",
		packets.serial()
	);

	let comments = VorbisComments::parse(&comment[codec.comment_marker().len()..])?;
	tag_from_comments(codec, comments, parse_options)
}

fn tag_from_comments(
	codec: OggCodec,
	comments: VorbisComments,
	parse_options: ParseOptions,
) -> Result<Tag> {
	let mut tag = Tag::new_ogg(codec);
	tag.set_vendor(comments.vendor);

	let mut picture_type = None;
	for (key, value) in comments.items {
		let key = key.to_ascii_uppercase();

		if key == PICTURE_KEY {
			if !parse_options.read_cover_art {
				continue;
			}

			let (picture, pic_type) = Picture::from_flac_bytes(value.as_bytes(), true)?;
			if picture_type == Some(u32::from(FRONT_COVER)) {
				log::debug!("Skipping picture of type {pic_type}, a front cover was already found");
				continue;
			}

			picture_type = Some(pic_type);
			tag.set_picture(picture);
			continue;
		}

		match field_for_key(&key) {
			Some(field) => tag.set(field, value),
			None => {
				if tag.insert_passthrough(&key, value).is_some() {
					log::debug!("Duplicate comment \"{key}\", keeping the last value");
				}
			},
		}
	}

	Ok(tag)
}
