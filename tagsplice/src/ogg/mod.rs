//! Ogg Vorbis and Ogg Opus
//!
//! The tag lives in the second packet of the first logical stream, as a Vorbis comment block
//! behind a codec specific marker. Unlike FLAC, every comment that doesn't map to a
//! [`Field`] is kept in the [`Tag`]'s passthrough map.
//!
//! The physical layer (pages, segment tables, CRCs) is handled by `tagsplice_ogg`.

pub(crate) mod comments;
mod constants;
mod read;
mod write;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{FileType, OggCodec, TagCodec};
use crate::macros::err;
use crate::tag::{Field, Tag};

use std::io::{Read, Seek, Write};

/// Map a [`Field`] to its Ogg comment key
pub(crate) fn field_key(field: Field) -> Option<&'static str> {
	match field {
		Field::Artist => Some("ARTIST"),
		Field::AlbumArtist => Some("ALBUMARTIST"),
		Field::Album => Some("ALBUM"),
		Field::Title => Some("TITLE"),
		Field::Genre => Some("GENRE"),
		Field::Date => Some("DATE"),
		Field::Comment => Some("COMMENT"),
		Field::Composer => Some("COMPOSER"),
		Field::Copyright => Some("COPYRIGHT"),
		Field::Publisher => Some("PUBLISHER"),
		Field::Year
		| Field::Bpm
		| Field::EncodedBy
		| Field::Lyricist
		| Field::Language
		| Field::Length
		| Field::PartOfSet
		| Field::TrackNumber => None,
	}
}

/// Map an (uppercase) Ogg comment key back to its [`Field`]
pub(crate) fn field_for_key(key: &str) -> Option<Field> {
	Field::ALL
		.iter()
		.copied()
		.find(|field| field_key(*field) == Some(key))
}

impl OggCodec {
	/// The marker the comment packet of this codec starts with
	pub(crate) fn comment_marker(self) -> &'static [u8] {
		match self {
			OggCodec::Vorbis => constants::VORBIS_COMMENT_HEAD,
			OggCodec::Opus => constants::OPUSTAGS,
		}
	}

	/// Identify the codec from the first two packets of a stream
	///
	/// # Errors
	///
	/// The packets are neither a Vorbis nor an Opus header pair
	pub(crate) fn identify(ident: &[u8], comment: &[u8]) -> Result<Self> {
		let codec = if ident.starts_with(constants::VORBIS_IDENT_HEAD) {
			OggCodec::Vorbis
		} else if ident.starts_with(constants::OPUSHEAD) {
			OggCodec::Opus
		} else {
			log::debug!("Unknown identification header in the first Ogg packet");
			err!(UnsupportedCodec);
		};

		if !comment.starts_with(codec.comment_marker()) {
			log::debug!("{codec:?} stream is missing its comment header");
			err!(UnsupportedCodec);
		}

		Ok(codec)
	}
}

/// The Ogg Vorbis/Opus engine
pub struct OggFile;

impl TagCodec for OggFile {
	const FILE_TYPE: FileType = FileType::Ogg;

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
