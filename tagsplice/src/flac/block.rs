use crate::error::Result;
use crate::macros::{err, try_vec};
use crate::util::io::ReadExt;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub(in crate::flac) const BLOCK_ID_STREAMINFO: u8 = 0;
pub(in crate::flac) const BLOCK_ID_PADDING: u8 = 1;
pub(in crate::flac) const BLOCK_ID_VORBIS_COMMENTS: u8 = 4;
pub(in crate::flac) const BLOCK_ID_PICTURE: u8 = 6;

/// The largest block content, the size is stored in 24 bits
const MAX_BLOCK_SIZE: usize = 0xFF_FFFF;

/// A single metadata block
///
/// `content` is empty for blocks whose content was skipped while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
	pub(super) ty: u8,
	pub(super) last: bool,
	pub(crate) content: Vec<u8>,
	pub(super) start: u64,
	pub(super) end: u64,
}

impl Block {
	/// Read a block, keeping its content only if `predicate` accepts the block type
	pub(crate) fn read<R, P>(data: &mut R, mut predicate: P) -> Result<Self>
	where
		R: Read + Seek,
		P: FnMut(u8) -> bool,
	{
		let start = data.stream_position()?;

		let (Ok(byte), Ok(size)) = (data.read_u8(), data.read_u24::<BigEndian>()) else {
			err!(TruncatedInput);
		};

		let last = (byte & 0x80) != 0;
		let ty = byte & 0x7F;

		log::trace!("Reading FLAC block, type: {ty}, size: {size}");

		let content = if predicate(ty) {
			data.read_bounded(u64::from(size))?
		} else {
			data.seek(SeekFrom::Current(i64::from(size)))?;
			Vec::new()
		};

		let end = data.stream_position()?;

		Ok(Self {
			ty,
			last,
			content,
			start,
			end,
		})
	}

	pub(crate) fn new(ty: u8, content: Vec<u8>) -> Self {
		Self {
			ty,
			last: false,
			content,
			start: 0,
			end: 0,
		}
	}

	pub(crate) fn new_padding(size: usize) -> Result<Self> {
		Ok(Self::new(BLOCK_ID_PADDING, try_vec![0; size]))
	}

	/// Write the block header and content
	///
	/// # Errors
	///
	/// The content is larger than 16 MiB
	pub(crate) fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
		if self.content.len() > MAX_BLOCK_SIZE {
			log::error!(
				"FLAC block (type: {}) is too large: {} bytes",
				self.ty,
				self.content.len()
			);
			err!(TooMuchData);
		}

		let mut byte = self.ty & 0x7F;
		if self.last {
			byte |= 0x80;
		}

		out.push(byte);
		out.write_u24::<BigEndian>(self.content.len() as u32)?;
		out.extend(&self.content);

		Ok(())
	}
}
