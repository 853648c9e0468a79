use super::atom_info::{Atom, children, copy_atom, meta_is_full, write_atom};
use super::ilst::{ILST, create_ilst};
use super::read::verify_mp4;
use crate::error::Result;
use crate::macros::{decode_err, encode_err, err};
use crate::tag::Tag;

use std::io::{Cursor, Read, Seek, Write};
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

const MOOV: [u8; 4] = *b"moov";
const UDTA: [u8; 4] = *b"udta";
const META: [u8; 4] = *b"meta";
const STCO: [u8; 4] = *b"stco";
const CO64: [u8; 4] = *b"co64";

// version/flags (4), pre_defined (4), handler type (4), reserved (12), empty name (1)
const HDLR: [u8; 25] = *b"\0\0\0\0\0\0\0\0mdirappl\0\0\0\0\0\0\0\0\0";

pub(super) fn write_to<R, W>(original: &mut R, tag: &Tag, writer: &mut W) -> Result<()>
where
	R: Read + Seek,
	W: Write,
{
	original.rewind()?;

	let mut file_bytes = Vec::new();
	original.read_to_end(&mut file_bytes)?;

	verify_mp4(&mut Cursor::new(file_bytes.as_slice()), file_bytes.len() as u64)?;

	let atoms = children(&file_bytes)?;
	let Some(moov) = atoms.iter().find(|atom| atom.ident() == MOOV) else {
		decode_err!(@BAIL Mp4, "No \"moov\" atom found");
	};

	log::debug!("Rebuilding \"moov\" atom");
	let new_moov = rebuild_moov(moov.content(), tag)?;

	let mut output = Vec::with_capacity(file_bytes.len());
	let mut written_moov = None;
	for atom in &atoms {
		match atom.ident() {
			MOOV if written_moov.is_none() => {
				let start = output.len();
				write_atom(&mut output, MOOV, &new_moov);
				written_moov = Some((
					output.len() - start,
					output.len() - new_moov.len()..output.len(),
				));
				log::trace!("Wrote \"moov\" atom at {start}");
			},
			// Top-level atoms are copied verbatim, an atom extending to the end
			// of the file still does
			_ => output.extend(atom.bytes),
		}
	}

	// Anything too small to be an atom
	let atoms_end = atoms
		.last()
		.map_or(0, |atom| (atom.info.start + atom.info.len) as usize);
	output.extend(&file_bytes[atoms_end..]);

	// Only data past the original `moov` moves, anything before it keeps its offset
	if let Some((new_moov_len, moov_content)) = written_moov {
		let delta = new_moov_len as i64 - moov.info.len as i64;
		if delta != 0 {
			let moov_end = moov.info.start + moov.info.len;
			log::debug!(
				"\"moov\" changed size by {delta} bytes, updating chunk offsets past {moov_end}"
			);
			patch_chunk_offsets(&mut output[moov_content], moov_end, delta)?;
		}
	}

	writer.write_all(&output)?;
	Ok(())
}

/// Rebuild the content of `container`, replacing the first child named `ident` with the result
/// of `rebuild` (or appending one if none exists)
fn rebuild_child<F>(container: &[u8], ident: [u8; 4], rebuild: F) -> Result<Vec<u8>>
where
	F: FnOnce(Option<&[u8]>) -> Result<Vec<u8>>,
{
	let mut rebuild = Some(rebuild);
	let mut content = Vec::with_capacity(container.len());

	for child in children(container)? {
		if child.ident() != ident {
			copy_atom(&mut content, &child);
			continue;
		}

		match rebuild.take() {
			Some(rebuild) => write_atom(&mut content, ident, &rebuild(Some(child.content()))?),
			None => log::debug!(
				"Dropping duplicate \"{}\" atom",
				String::from_utf8_lossy(&ident)
			),
		}
	}

	if let Some(rebuild) = rebuild {
		log::debug!(
			"Creating missing \"{}\" atom",
			String::from_utf8_lossy(&ident)
		);
		write_atom(&mut content, ident, &rebuild(None)?);
	}

	Ok(content)
}

fn rebuild_moov(moov: &[u8], tag: &Tag) -> Result<Vec<u8>> {
	rebuild_child(moov, UDTA, |udta| {
		rebuild_child(udta.unwrap_or_default(), META, |meta| rebuild_meta(meta, tag))
	})
}

fn rebuild_meta(meta: Option<&[u8]>, tag: &Tag) -> Result<Vec<u8>> {
	let Some(meta) = meta else {
		// A new full atom, with a handler
		let mut content = vec![0; 4];
		write_atom(&mut content, *b"hdlr", &HDLR);
		content.extend(create_ilst(tag, None)?);
		return Ok(content);
	};

	let (version_and_flags, meta_children) = if meta_is_full(meta) {
		if meta.len() < 4 {
			err!(BadAtom("Found an incomplete \"meta\" atom"));
		}

		meta.split_at(4)
	} else {
		(&[][..], meta)
	};

	let mut content = version_and_flags.to_vec();
	let mut ilst_written = false;
	for child in children(meta_children)? {
		if child.ident() != ILST {
			copy_atom(&mut content, &child);
			continue;
		}

		if ilst_written {
			log::debug!("Dropping duplicate \"ilst\" atom");
			continue;
		}

		content.extend(create_ilst(tag, Some(child.content()))?);
		ilst_written = true;
	}

	if !ilst_written {
		content.extend(create_ilst(tag, None)?);
	}

	Ok(content)
}

/// Collect the content ranges of every `stco` and `co64` atom
fn chunk_offset_tables(
	data: &[u8],
	base: usize,
	tables: &mut Vec<([u8; 4], Range<usize>)>,
) -> Result<()> {
	for atom in children(data)? {
		let Atom { info, .. } = atom;
		let content_start = base + (info.start + info.header_size()) as usize;
		let content_range = content_start..content_start + atom.content().len();

		match &info.ident {
			b"trak" | b"mdia" | b"minf" | b"stbl" => {
				chunk_offset_tables(atom.content(), content_start, tables)?;
			},
			b"stco" | b"co64" => {
				log::trace!("Found \"{}\" atom", String::from_utf8_lossy(&info.ident));
				tables.push((info.ident, content_range));
			},
			_ => {},
		}
	}

	Ok(())
}

/// Add `delta` to every entry of every chunk offset table in `moov` that is at or past `threshold`
pub(super) fn patch_chunk_offsets(moov: &mut [u8], threshold: u64, delta: i64) -> Result<()> {
	let mut tables = Vec::new();
	chunk_offset_tables(moov, 0, &mut tables)?;

	for (ident, range) in tables {
		let table = &mut moov[range];

		// version/flags (4), entry count (4)
		if table.len() < 8 {
			err!(BadAtom("Found an incomplete chunk offset table"));
		}

		let count = BigEndian::read_u32(&table[4..8]) as usize;
		let entry_size = if ident == STCO { 4 } else { 8 };

		let entries = &mut table[8..];
		if entries.len() / entry_size < count {
			err!(BadAtom("Chunk offset table is shorter than its entry count"));
		}

		let mut updated = 0;
		for entry in entries.chunks_exact_mut(entry_size).take(count) {
			match ident {
				CO64 => {
					let offset = BigEndian::read_u64(entry);
					if offset < threshold {
						continue;
					}

					let Some(offset) = offset.checked_add_signed(delta) else {
						encode_err!(@BAIL Mp4, "Chunk offset out of range after update");
					};

					BigEndian::write_u64(entry, offset);
				},
				_ => {
					let offset = BigEndian::read_u32(entry);
					if u64::from(offset) < threshold {
						continue;
					}

					let Ok(offset) = u32::try_from(i64::from(offset) + delta) else {
						encode_err!(@BAIL Mp4, "Chunk offset out of range after update");
					};

					BigEndian::write_u32(entry, offset);
				},
			}

			updated += 1;
		}

		log::trace!("Updated {updated} of {count} chunk offsets");
	}

	Ok(())
}
