use super::atom_info::{ATOM_HEADER_LEN, AtomInfo, find_child, meta_is_full};
use super::ilst::{ILST, parse_ilst};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::FileType;
use crate::macros::decode_err;
use crate::tag::Tag;
use crate::util::io::{ReadExt, SeekStreamLen};

use std::io::{Read, Seek, SeekFrom};

/// Check for a leading `ftyp` atom
pub(super) fn verify_mp4<R>(data: &mut R, file_len: u64) -> Result<AtomInfo>
where
	R: Read + Seek,
{
	if file_len < ATOM_HEADER_LEN {
		decode_err!(@BAIL Mp4, "File missing \"ftyp\" atom");
	}

	let atom = match AtomInfo::read(data, file_len) {
		Ok(atom) if atom.ident == *b"ftyp" && atom.len >= atom.header_size() + 4 => atom,
		_ => decode_err!(@BAIL Mp4, "File missing \"ftyp\" atom"),
	};

	let mut major_brand = [0; 4];
	data.read_exact(&mut major_brand)?;
	log::debug!(
		"Verified MP4 file, major brand: {}",
		String::from_utf8_lossy(&major_brand).trim_end()
	);

	data.seek(SeekFrom::Start(atom.start + atom.len))?;
	Ok(atom)
}

/// Walk `moov > udta > meta > ilst`, returning the content of `ilst`
///
/// `None` if any level is missing.
pub(super) fn find_ilst(moov: &[u8]) -> Result<Option<&[u8]>> {
	let Some(udta) = find_child(moov, *b"udta")? else {
		log::debug!("No \"udta\" atom found");
		return Ok(None);
	};

	let Some(meta) = find_child(udta.content(), *b"meta")? else {
		log::debug!("No \"meta\" atom found");
		return Ok(None);
	};

	let mut meta_content = meta.content();
	if meta_is_full(meta_content) {
		meta_content = meta_content.get(4..).unwrap_or_default();
	}

	Ok(find_child(meta_content, ILST)?.map(|ilst| ilst.content()))
}

pub(super) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<Tag>
where
	R: Read + Seek,
{
	data.rewind()?;

	let file_len = data.stream_len_hack()?;
	verify_mp4(data, file_len)?;

	let mut moov = None;
	loop {
		let position = data.stream_position()?;
		let remaining = file_len - position;
		if remaining < ATOM_HEADER_LEN {
			break;
		}

		let atom = AtomInfo::read(data, remaining)?;
		if atom.ident == *b"moov" {
			moov = Some(atom);
			break;
		}

		data.seek(SeekFrom::Start(atom.start + atom.len))?;
	}

	let Some(moov) = moov else {
		decode_err!(@BAIL Mp4, "No \"moov\" atom found");
	};

	let moov_content = data.read_bounded(moov.len - moov.header_size())?;

	let mut tag = Tag::new(FileType::Mp4);
	match find_ilst(&moov_content)? {
		Some(ilst) => parse_ilst(ilst, parse_options, &mut tag)?,
		None => log::debug!("File has no \"ilst\" atom"),
	}

	Ok(tag)
}
