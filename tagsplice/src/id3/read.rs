use super::frame::{
	ATTACHED_PICTURE_ID, COMMENT_ID, ParsedFrame, RawFrame, V2_ATTACHED_PICTURE_ID, V2_COMMENT_ID,
	field_for_id,
};
use super::header::{Id3v2Header, Id3v2Version};
use super::synchsafe::UnsynchronizedStream;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::picture::{FRONT_COVER, MimeType, Picture};
use crate::tag::{Field, Tag};
use crate::util::text::{TextEncoding, decode_terminated, decode_text};

use std::io::Read;

/// A picture candidate, front covers win over any other picture type
struct FoundPicture {
	picture: Picture,
	front_cover: bool,
}

/// A comment candidate, a comment with an empty description wins over described ones
struct FoundComment {
	text: String,
	has_description: bool,
}

#[derive(Default)]
struct FrameCollector {
	comment: Option<FoundComment>,
	picture: Option<FoundPicture>,
}

pub(crate) fn parse_id3v2<R>(
	bytes: &mut R,
	header: Id3v2Header,
	parse_options: ParseOptions,
) -> Result<Tag>
where
	R: Read,
{
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	let mut tag_bytes = bytes.take(u64::from(header.size - header.extended_size));

	// ID3v2.4 moved unsynchronisation to the frame level
	let ret;
	if header.unsynchronisation && header.version != Id3v2Version::V4 {
		// Unsynchronize the entire tag
		let mut unsynchronized_reader = UnsynchronizedStream::new(tag_bytes);
		ret = read_all_frames_into_tag(&mut unsynchronized_reader, header, parse_options)?;

		// Get the `Take` back from the `UnsynchronizedStream`
		tag_bytes = unsynchronized_reader.into_inner();
	} else {
		ret = read_all_frames_into_tag(&mut tag_bytes, header, parse_options)?;
	}

	// Throw away the rest of the tag (padding)
	std::io::copy(&mut tag_bytes, &mut std::io::sink())?;
	Ok(ret)
}

fn read_all_frames_into_tag<R>(
	reader: &mut R,
	header: Id3v2Header,
	parse_options: ParseOptions,
) -> Result<Tag>
where
	R: Read,
{
	let mut tag = Tag::new(FileType::Mpeg);
	let mut collector = FrameCollector::default();

	loop {
		match ParsedFrame::read(reader, header.version, header.unsynchronisation)? {
			ParsedFrame::Next(frame) => {
				handle_frame(&mut tag, &mut collector, frame, header.version, parse_options)?;
			},
			// No frame content found or ignored due to errors, but we can expect more frames
			ParsedFrame::Skip => {},
			// No frame content found, and we can expect there are no more frames
			ParsedFrame::Eof => break,
		}
	}

	if let Some(comment) = collector.comment {
		tag.set(Field::Comment, comment.text);
	}

	if let Some(found) = collector.picture {
		tag.set_picture(found.picture);
	}

	Ok(tag)
}

fn handle_frame(
	tag: &mut Tag,
	collector: &mut FrameCollector,
	frame: RawFrame,
	version: Id3v2Version,
	parse_options: ParseOptions,
) -> Result<()> {
	let RawFrame { id, content } = frame;

	let Some((&encoding_byte, body)) = content.split_first() else {
		return Ok(());
	};

	let Some(encoding) = TextEncoding::from_u8(encoding_byte) else {
		log::warn!("Frame \"{id}\" has an unknown text encoding ({encoding_byte}), skipping");
		return Ok(());
	};

	match id.as_str() {
		COMMENT_ID | V2_COMMENT_ID => {
			// Language (3), description, text
			let Some(body) = body.get(3..) else {
				log::warn!("Comment frame is too short, skipping");
				return Ok(());
			};

			let (description, text) = decode_terminated(body, encoding)?;
			let has_description = !description.is_empty();
			let text = decode_text(text, encoding)?;

			let replace = match &collector.comment {
				None => true,
				Some(existing) => existing.has_description && !has_description,
			};

			if replace {
				collector.comment = Some(FoundComment {
					text,
					has_description,
				});
			}
		},
		ATTACHED_PICTURE_ID | V2_ATTACHED_PICTURE_ID => {
			if !parse_options.read_cover_art {
				return Ok(());
			}

			let Some((picture, pic_ty)) = read_picture(body, encoding, version)? else {
				return Ok(());
			};

			let front_cover = pic_ty == FRONT_COVER;
			let replace = match &collector.picture {
				None => true,
				Some(existing) => !existing.front_cover && front_cover,
			};

			if replace {
				collector.picture = Some(FoundPicture {
					picture,
					front_cover,
				});
			}
		},
		_ => {
			let Some(field) = field_for_id(&id, version) else {
				log::trace!("Ignoring unmapped frame \"{id}\"");
				return Ok(());
			};

			let value = decode_text(body, encoding)?;
			if value.is_empty() {
				return Ok(());
			}

			if let Some(replaced) = tag.remove(field) {
				log::warn!(
					"Replaced frame with ID \"{id}\" (\"{replaced}\") by a frame with the same ID"
				);
			}

			tag.set(field, value);
		},
	}

	Ok(())
}

fn read_picture(
	body: &[u8],
	encoding: TextEncoding,
	version: Id3v2Version,
) -> Result<Option<(Picture, u8)>> {
	let (mime_type, rest) = if version == Id3v2Version::V2 {
		// ID3v2.2 stores a 3 character image format instead of a MIME type
		let Some((format, rest)) = body.split_first_chunk::<3>() else {
			return Ok(None);
		};

		let mime_type = match format {
			b"PNG" => MimeType::Png,
			b"JPG" => MimeType::Jpeg,
			other => MimeType::Unknown(String::from_utf8_lossy(other).into_owned()),
		};

		(mime_type, rest)
	} else {
		let (mime_type, rest) = decode_terminated(body, TextEncoding::Latin1)?;
		(MimeType::from_str(&mime_type), rest)
	};

	let Some((&pic_ty, rest)) = rest.split_first() else {
		return Ok(None);
	};

	let (_description, data) = decode_terminated(rest, encoding)?;
	if data.is_empty() {
		return Ok(None);
	}

	let mime_type = match mime_type {
		MimeType::Unknown(ref unknown) if unknown.is_empty() => {
			MimeType::sniff(data).unwrap_or(mime_type)
		},
		mime_type => mime_type,
	};

	Ok(Some((Picture::new(mime_type, data.to_vec()), pic_ty)))
}
