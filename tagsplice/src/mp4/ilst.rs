//! The `ilst` codec
//!
//! Each item is an atom named after the field (`©nam`, `trkn`, ...) holding one or more `data`
//! atoms:
//!
//! ```text
//! version (1), type class (3), locale (4), payload
//! ```

use super::atom_info::{Atom, children, copy_atom, write_atom};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::macros::err;
use crate::picture::{MimeType, Picture};
use crate::tag::{Field, Tag};
use crate::util::text::{TextEncoding, decode_text};

use byteorder::{BigEndian, ByteOrder};

pub(super) const ILST: [u8; 4] = *b"ilst";
const DATA: [u8; 4] = *b"data";
const COVR: [u8; 4] = *b"covr";
const GNRE: [u8; 4] = *b"gnre";
const ARTIST_ALIAS: [u8; 4] = *b"\xA9art";

// https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/Metadata/Metadata.html#//apple_ref/doc/uid/TP40000939-CH1-SW34
const IMPLICIT: u32 = 0;
const UTF8: u32 = 1;
const UTF16: u32 = 2;
const JPEG: u32 = 13;
const PNG: u32 = 14;
const BE_SIGNED_INTEGER: u32 = 21;
const BE_UNSIGNED_INTEGER: u32 = 22;

/// Map a [`Field`] to its item atom
pub(crate) fn atom_for(field: Field) -> Option<[u8; 4]> {
	match field {
		Field::Artist => Some(*b"\xA9ART"),
		Field::AlbumArtist => Some(*b"aART"),
		Field::Album => Some(*b"\xA9alb"),
		Field::Title => Some(*b"\xA9nam"),
		Field::Genre => Some(*b"\xA9gen"),
		Field::Year => Some(*b"\xA9day"),
		Field::Bpm => Some(*b"tmpo"),
		Field::Comment => Some(*b"\xA9cmt"),
		Field::Composer => Some(*b"\xA9wrt"),
		Field::Copyright => Some(*b"cprt"),
		Field::EncodedBy => Some(*b"\xA9too"),
		Field::PartOfSet => Some(*b"disk"),
		Field::TrackNumber => Some(*b"trkn"),
		Field::Date
		| Field::Lyricist
		| Field::Language
		| Field::Length
		| Field::Publisher => None,
	}
}

fn field_for_atom(ident: [u8; 4]) -> Option<Field> {
	if ident == ARTIST_ALIAS {
		return Some(Field::Artist);
	}

	Field::ALL
		.iter()
		.copied()
		.find(|field| atom_for(*field) == Some(ident))
}

enum ValueKind {
	Text,
	/// A big-endian integer, exposed as decimal text
	Integer,
	/// An index/total pair, exposed as "index" or "index/total"
	Pair,
}

impl ValueKind {
	fn of(field: Field) -> Self {
		match field {
			Field::Bpm => ValueKind::Integer,
			Field::TrackNumber | Field::PartOfSet => ValueKind::Pair,
			_ => ValueKind::Text,
		}
	}
}

struct DataAtom<'a> {
	class: u32,
	payload: &'a [u8],
}

fn data_atoms<'a>(item: &Atom<'a>) -> Result<Vec<DataAtom<'a>>> {
	let mut data_atoms = Vec::new();
	for child in children(item.content())? {
		if child.ident() != DATA {
			continue;
		}

		let content = child.content();
		if content.len() < 8 {
			err!(BadAtom("Found an incomplete \"data\" atom"));
		}

		data_atoms.push(DataAtom {
			// The first byte is the version
			class: BigEndian::read_u32(content) & 0x00FF_FFFF,
			payload: &content[8..],
		});
	}

	Ok(data_atoms)
}

/// Read the items of an `ilst` into `tag`
pub(super) fn parse_ilst(content: &[u8], parse_options: ParseOptions, tag: &mut Tag) -> Result<()> {
	for item in children(content)? {
		let ident = item.ident();

		if ident == COVR {
			if !parse_options.read_cover_art || tag.picture().is_some() {
				continue;
			}

			if let Some(data) = data_atoms(&item)?.first() {
				tag.set_picture(read_picture(data));
			}

			continue;
		}

		let Some(field) = field_for_atom(ident) else {
			log::trace!(
				"Skipping unmapped item \"{}\"",
				String::from_utf8_lossy(&ident)
			);
			continue;
		};

		let data_atoms = data_atoms(&item)?;
		let Some(data) = data_atoms.first() else {
			log::warn!("Item for {field} has no \"data\" atom, skipping");
			continue;
		};

		let value = match ValueKind::of(field) {
			ValueKind::Text => read_text(data)?,
			ValueKind::Integer => read_integer(data)?,
			ValueKind::Pair => read_pair(data)?,
		};

		if let Some(value) = value {
			tag.set(field, value);
		}
	}

	Ok(())
}

fn read_text(data: &DataAtom<'_>) -> Result<Option<String>> {
	match data.class {
		UTF8 => Ok(Some(String::from_utf8(data.payload.to_vec())?)),
		UTF16 => decode_text(data.payload, TextEncoding::UTF16BE).map(Some),
		class => {
			log::warn!("Expected a text item, found type {class}, skipping");
			Ok(None)
		},
	}
}

fn read_integer(data: &DataAtom<'_>) -> Result<Option<String>> {
	if !matches!(data.class, IMPLICIT | BE_SIGNED_INTEGER | BE_UNSIGNED_INTEGER) {
		log::warn!("Expected an integer item, found type {}, skipping", data.class);
		return Ok(None);
	}

	match data.payload.len() {
		1 | 2 | 4 | 8 => Ok(Some(
			BigEndian::read_uint(data.payload, data.payload.len()).to_string(),
		)),
		_ => err!(BadAtom("Found an integer item with an invalid size")),
	}
}

fn read_pair(data: &DataAtom<'_>) -> Result<Option<String>> {
	// reserved (2), index (2), total (2), and optionally reserved (2)
	let payload = data.payload;
	if payload.len() < 6 {
		err!(BadAtom("Found an incomplete index/total pair"));
	}

	let index = BigEndian::read_u16(&payload[2..4]);
	let total = BigEndian::read_u16(&payload[4..6]);

	Ok(match (index, total) {
		(0, 0) => None,
		(index, 0) => Some(index.to_string()),
		(index, total) => Some(format!("{index}/{total}")),
	})
}

fn read_picture(data: &DataAtom<'_>) -> Picture {
	let mime_type = match data.class {
		JPEG => MimeType::Jpeg,
		PNG => MimeType::Png,
		_ => MimeType::sniff(data.payload).unwrap_or(MimeType::Unknown(String::new())),
	};

	Picture::new(mime_type, data.payload.to_vec())
}

/// Parse "index" or "index/total"
fn parse_pair(value: &str) -> Option<(u16, u16)> {
	let (index, total) = value.split_once('/').unwrap_or((value, "0"));
	Some((index.trim().parse().ok()?, total.trim().parse().ok()?))
}

fn write_item(out: &mut Vec<u8>, ident: [u8; 4], class: u32, payload: &[u8]) {
	let mut data = Vec::with_capacity(8 + payload.len());
	// Version 0, the class fits in the flags
	data.extend(class.to_be_bytes());
	// Locale
	data.extend([0; 4]);
	data.extend(payload);

	let mut item = Vec::with_capacity(8 + data.len());
	write_atom(&mut item, DATA, &data);
	write_atom(out, ident, &item);
}

/// Create a new `ilst` atom
///
/// The fields of `tag` come first, followed by the cover. Items of `existing` that aren't mapped
/// to a field are carried over, except for `gnre`, which can't coexist with `©gen`.
pub(super) fn create_ilst(tag: &Tag, existing: Option<&[u8]>) -> Result<Vec<u8>> {
	let mut content = Vec::new();

	for (field, value) in tag.fields() {
		let Some(ident) = atom_for(field) else {
			continue;
		};

		match ValueKind::of(field) {
			ValueKind::Text => write_item(&mut content, ident, UTF8, value.as_bytes()),
			ValueKind::Integer => {
				let Ok(integer) = value.trim().parse::<u16>() else {
					err!(InvalidFieldValue(field, value.to_owned()));
				};

				write_item(&mut content, ident, BE_SIGNED_INTEGER, &integer.to_be_bytes());
			},
			ValueKind::Pair => {
				let Some((index, total)) = parse_pair(value) else {
					err!(InvalidFieldValue(field, value.to_owned()));
				};

				let mut payload = [0; 8];
				payload[2..4].copy_from_slice(&index.to_be_bytes());
				payload[4..6].copy_from_slice(&total.to_be_bytes());
				write_item(&mut content, ident, IMPLICIT, &payload);
			},
		}
	}

	if let Some(picture) = tag.picture() {
		let class = match picture.mime_type() {
			MimeType::Jpeg => JPEG,
			MimeType::Png => PNG,
			MimeType::Unknown(mime) => err!(UnsupportedMime(mime.clone())),
		};

		write_item(&mut content, COVR, class, picture.data());
	}

	if let Some(existing) = existing {
		for item in children(existing)? {
			let ident = item.ident();
			if ident == COVR || field_for_atom(ident).is_some() {
				continue;
			}

			if ident == GNRE {
				log::debug!("Dropping \"gnre\" item");
				continue;
			}

			log::trace!(
				"Keeping unmapped item \"{}\"",
				String::from_utf8_lossy(&ident)
			);
			copy_atom(&mut content, &item);
		}
	}

	let mut ilst = Vec::with_capacity(8 + content.len());
	write_atom(&mut ilst, ILST, &content);
	Ok(ilst)
}
