use crate::{PageError, Result};

use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian};

/// The length of a page header, excluding the segment table
pub const PAGE_HEADER_SIZE: usize = 27;

const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// An Ogg page header
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PageHeader {
	/// The position in the stream the page started at
	pub start: u64,
	pub(crate) header_type_flag: u8,
	/// The page's absolute granule position
	pub abgp: u64,
	/// The page's stream serial number
	pub stream_serial: u32,
	/// The page's sequence number
	pub sequence_number: u32,
	pub(crate) checksum: u32,
}

impl PageHeader {
	/// Create a new `PageHeader`
	///
	/// The checksum is left at 0, see [`Page::gen_crc`](crate::Page::gen_crc).
	pub fn new(header_type_flag: u8, abgp: u64, stream_serial: u32, sequence_number: u32) -> Self {
		Self {
			start: 0,
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			checksum: 0,
		}
	}

	/// Read a page header and its segment table
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * The capture pattern, version, or segment count is invalid
	pub fn read<R>(data: &mut R) -> Result<(Self, Vec<u8>)>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;

		let mut header = [0; PAGE_HEADER_SIZE];
		data.read_exact(&mut header[..4])?;
		if &header[..4] != CAPTURE_PATTERN {
			return Err(PageError::MissingMagic);
		}

		data.read_exact(&mut header[4..])?;

		// Stream structure version
		if header[4] != 0 {
			return Err(PageError::InvalidVersion);
		}

		let segment_count = header[26];
		if segment_count == 0 {
			return Err(PageError::BadSegmentCount);
		}

		let mut segment_table = vec![0; usize::from(segment_count)];
		data.read_exact(&mut segment_table)?;

		let header = Self {
			start,
			header_type_flag: header[5],
			abgp: LittleEndian::read_u64(&header[6..14]),
			stream_serial: LittleEndian::read_u32(&header[14..18]),
			sequence_number: LittleEndian::read_u32(&header[18..22]),
			checksum: LittleEndian::read_u32(&header[22..26]),
		};

		Ok((header, segment_table))
	}

	/// Write the fixed 27 byte header, including the segment count
	pub(crate) fn write_to(&self, bytes: &mut Vec<u8>, segment_count: u8) {
		bytes.extend(CAPTURE_PATTERN);
		bytes.push(0);
		bytes.push(self.header_type_flag);
		bytes.extend(self.abgp.to_le_bytes());
		bytes.extend(self.stream_serial.to_le_bytes());
		bytes.extend(self.sequence_number.to_le_bytes());
		bytes.extend(self.checksum.to_le_bytes());
		bytes.push(segment_count);
	}

	/// The page's header type flags, see [`CONTINUED_PACKET`](crate::CONTINUED_PACKET) and friends
	pub fn header_type_flag(&self) -> u8 {
		self.header_type_flag
	}

	/// The checksum stored in the page
	pub fn checksum(&self) -> u32 {
		self.checksum
	}
}

#[cfg(test)]
mod tests {
	use super::{PAGE_HEADER_SIZE, PageHeader};
	use crate::{CONTAINS_LAST_PAGE_OF_BITSTREAM, PageError};

	use std::io::Cursor;

	fn header_bytes() -> Vec<u8> {
		let mut header = PageHeader::new(CONTAINS_LAST_PAGE_OF_BITSTREAM, 960, 7, 3);
		header.checksum = 0xDEAD_BEEF;

		let mut bytes = Vec::new();
		header.write_to(&mut bytes, 2);
		bytes.extend([255, 10]);
		bytes
	}

	#[test]
	fn fields() {
		let mut reader = Cursor::new(header_bytes());

		let (header, segments) = PageHeader::read(&mut reader).unwrap();
		assert_eq!(header.header_type_flag(), CONTAINS_LAST_PAGE_OF_BITSTREAM);
		assert_eq!(header.abgp, 960);
		assert_eq!(header.stream_serial, 7);
		assert_eq!(header.sequence_number, 3);
		assert_eq!(header.checksum(), 0xDEAD_BEEF);
		assert_eq!(segments, [255, 10]);
		assert_eq!(reader.position() as usize, PAGE_HEADER_SIZE + 2);
	}

	#[test]
	fn rejected_headers() {
		let mut bad_magic = header_bytes();
		bad_magic[0] = b'o';
		assert!(matches!(
			PageHeader::read(&mut Cursor::new(bad_magic)),
			Err(PageError::MissingMagic)
		));

		let mut bad_version = header_bytes();
		bad_version[4] = 1;
		assert!(matches!(
			PageHeader::read(&mut Cursor::new(bad_version)),
			Err(PageError::InvalidVersion)
		));

		let mut no_segments = header_bytes();
		no_segments[26] = 0;
		assert!(matches!(
			PageHeader::read(&mut Cursor::new(no_segments)),
			Err(PageError::BadSegmentCount)
		));

		// Too short to hold the rest of the header
		let truncated = header_bytes()[..12].to_vec();
		assert!(matches!(
			PageHeader::read(&mut Cursor::new(truncated)),
			Err(PageError::Io(_))
		));
	}
}
