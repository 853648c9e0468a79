use crate::error::Result;
use crate::macros::err;

use std::io::{Cursor, Read, Seek};

use byteorder::{BigEndian, ReadBytesExt};

pub(super) const ATOM_HEADER_LEN: u64 = 8;
const EXTENDED_ATOM_HEADER_LEN: u64 = ATOM_HEADER_LEN + 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct AtomInfo {
	pub(crate) start: u64,
	pub(crate) len: u64,
	pub(crate) extended: bool,
	/// The size field was 0, the atom extends to the end of its container
	pub(crate) open_ended: bool,
	pub(crate) ident: [u8; 4],
}

// The spec permits any characters to be used in atom identifiers. This doesn't
// leave us any room for error detection.
//
// TagLib has decided on a character set to consider valid, so we will do the same:
// <https://github.com/taglib/taglib/issues/1077#issuecomment-1440385838>
fn is_valid_identifier_byte(b: u8) -> bool {
	(b' '..=b'~').contains(&b) || b == b'\xA9'
}

impl AtomInfo {
	/// Read an atom header
	///
	/// `reader_size` is the number of bytes left in the container, starting at the atom.
	/// The reader is left at the start of the atom's content.
	pub(crate) fn read<R>(data: &mut R, reader_size: u64) -> Result<Self>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;

		if reader_size < ATOM_HEADER_LEN {
			err!(BadAtom("Found an incomplete atom header"));
		}

		let len_raw = u64::from(data.read_u32::<BigEndian>()?);

		let mut ident = [0; 4];
		data.read_exact(&mut ident)?;

		if !ident.iter().copied().all(is_valid_identifier_byte) {
			err!(BadAtom("Encountered an atom with invalid characters"));
		}

		let (len, extended, open_ended) = match len_raw {
			// The atom extends to the end of its container
			0 => (reader_size, false, true),
			// There's an extended length
			1 => {
				if reader_size < EXTENDED_ATOM_HEADER_LEN {
					err!(BadAtom("Found an incomplete extended atom header"));
				}

				(data.read_u64::<BigEndian>()?, true, false)
			},
			_ => (len_raw, false, false),
		};

		let info = Self {
			start,
			len,
			extended,
			open_ended,
			ident,
		};

		// `len` includes the header
		if len < info.header_size() {
			err!(BadAtom("Found an invalid length (< 8)"));
		}

		if len > reader_size {
			err!(BadAtom("Found an atom extending past its container"));
		}

		log::trace!(
			"Found atom \"{}\", size: {len}",
			String::from_utf8_lossy(&ident)
		);

		Ok(info)
	}

	pub(crate) fn header_size(&self) -> u64 {
		if !self.extended {
			return ATOM_HEADER_LEN;
		}

		EXTENDED_ATOM_HEADER_LEN
	}
}

/// An atom within an in-memory buffer
#[derive(Debug, Copy, Clone)]
pub(crate) struct Atom<'a> {
	pub(crate) info: AtomInfo,
	/// The entire atom, header included
	pub(crate) bytes: &'a [u8],
}

impl<'a> Atom<'a> {
	pub(crate) fn ident(&self) -> [u8; 4] {
		self.info.ident
	}

	pub(crate) fn content(&self) -> &'a [u8] {
		&self.bytes[self.info.header_size() as usize..]
	}
}

/// Split a buffer into its atoms
///
/// Fewer than 8 trailing bytes (some muxers terminate `udta` with 4 zero bytes) are ignored.
pub(crate) fn children(data: &[u8]) -> Result<Vec<Atom<'_>>> {
	let len = data.len() as u64;
	let mut reader = Cursor::new(data);

	let mut atoms = Vec::new();
	loop {
		let remaining = len - reader.position();
		if remaining == 0 {
			break;
		}

		if remaining < ATOM_HEADER_LEN {
			log::warn!("Ignoring {remaining} trailing bytes in a container");
			break;
		}

		let info = AtomInfo::read(&mut reader, remaining)?;

		let end = info.start + info.len;
		atoms.push(Atom {
			info,
			bytes: &data[info.start as usize..end as usize],
		});

		reader.set_position(end);
	}

	Ok(atoms)
}

/// Find the first child atom with the given identifier
pub(crate) fn find_child(data: &[u8], ident: [u8; 4]) -> Result<Option<Atom<'_>>> {
	Ok(children(data)?
		.into_iter()
		.find(|atom| atom.ident() == ident))
}

/// Whether the content of a `meta` atom starts with a version and flags
///
/// A full `meta` atom should have the following:
///
/// Version (1)
/// Flags (3)
///
/// However, it's possible that it is written as a normal atom, meaning its content starts
/// with the size of the first child.
pub(crate) fn meta_is_full(content: &[u8]) -> bool {
	let is_child_ident = matches!(
		content.get(4..8),
		Some(b"hdlr" | b"ilst" | b"mhdr" | b"ctry" | b"lang")
	);

	if is_child_ident {
		log::warn!("File contains a non-full 'meta' atom");
	}

	!is_child_ident
}

/// Write an atom, using a 64-bit extended size if needed
pub(crate) fn write_atom(out: &mut Vec<u8>, ident: [u8; 4], content: &[u8]) {
	let len = content.len() as u64 + ATOM_HEADER_LEN;

	match u32::try_from(len) {
		Ok(len) => {
			out.extend(len.to_be_bytes());
			out.extend(ident);
		},
		Err(_) => {
			out.extend(1_u32.to_be_bytes());
			out.extend(ident);
			out.extend((len + 8).to_be_bytes());
		},
	}

	out.extend(content);
}

/// Copy an atom as-is
///
/// Atoms that extend to the end of their container get an explicit size, since the container
/// may grow.
pub(crate) fn copy_atom(out: &mut Vec<u8>, atom: &Atom<'_>) {
	if atom.info.open_ended {
		write_atom(out, atom.ident(), atom.content());
		return;
	}

	out.extend(atom.bytes);
}
