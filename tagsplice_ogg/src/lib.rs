//! Ogg page reading, packet demuxing, and re-pagination
//!
//! This crate only knows about the physical Ogg layer. It has no notion of the codecs
//! carried inside the packets.

mod crc;
mod error;
mod header;
mod packets;
mod paginate;

use std::io::{Read, Seek};

pub use crc::crc32;
pub use error::{PageError, Result};
pub use header::{PAGE_HEADER_SIZE, PageHeader};
pub use packets::{Demuxer, Packets};
pub use paginate::{paginate, replace_packet, segment_table};

/// The first packet on the page continues a packet from the previous page
pub const CONTINUED_PACKET: u8 = 0x01;
/// The page is the first page of the logical bitstream
pub const CONTAINS_FIRST_PAGE_OF_BITSTREAM: u8 = 0x02;
/// The page is the last page of the logical bitstream
pub const CONTAINS_LAST_PAGE_OF_BITSTREAM: u8 = 0x04;

/// The maximum number of lacing values in a segment table
pub const MAX_SEGMENT_COUNT: usize = 255;
/// The maximum page content size
pub const MAX_CONTENT_SIZE: usize = MAX_SEGMENT_COUNT * 255;

/// An OGG page
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
	header: PageHeader,
	segments: Vec<u8>,
	content: Vec<u8>,
}

impl Page {
	/// Create a new `Page` from a header and pre-built segment table
	///
	/// # Errors
	///
	/// * The segment table is empty or has more than [`MAX_SEGMENT_COUNT`] entries
	/// * The segment table does not describe exactly `content.len()` bytes
	pub fn new(header: PageHeader, segments: Vec<u8>, content: Vec<u8>) -> Result<Self> {
		if segments.is_empty() || segments.len() > MAX_SEGMENT_COUNT {
			return Err(PageError::BadSegmentCount);
		}

		let described: usize = segments.iter().map(|&s| usize::from(s)).sum();
		if described != content.len() {
			return Err(PageError::BadSegmentCount);
		}

		Ok(Self {
			header,
			segments,
			content,
		})
	}

	/// Attempts to get a Page from a reader
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * [`PageError`]
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		let (header, segments) = PageHeader::read(data)?;

		let content_len: usize = segments.iter().map(|&s| usize::from(s)).sum();

		let mut content = Vec::new();
		let read = data
			.by_ref()
			.take(content_len as u64)
			.read_to_end(&mut content)?;
		if read != content_len {
			return Err(PageError::NotEnoughData);
		}

		Ok(Page {
			header,
			segments,
			content,
		})
	}

	/// Convert the Page to `Vec<u8>` for writing
	///
	/// NOTE: This will write the checksum as is. It is likely [`Page::gen_crc`] will have
	/// to be used prior.
	pub fn as_bytes(&self) -> Vec<u8> {
		let mut bytes =
			Vec::with_capacity(PAGE_HEADER_SIZE + self.segments.len() + self.content.len());

		self.header.write_to(&mut bytes, self.segments.len() as u8);
		bytes.extend(&self.segments);
		bytes.extend(&self.content);

		bytes
	}

	fn compute_crc(&self) -> u32 {
		let mut header = self.header;
		header.checksum = 0;

		let mut bytes =
			Vec::with_capacity(PAGE_HEADER_SIZE + self.segments.len() + self.content.len());
		header.write_to(&mut bytes, self.segments.len() as u8);
		bytes.extend(&self.segments);
		bytes.extend(&self.content);

		crc32(&bytes)
	}

	/// Generates the CRC checksum of the page
	pub fn gen_crc(&mut self) {
		self.header.checksum = self.compute_crc();
	}

	/// Verify the stored checksum against the page contents
	///
	/// # Errors
	///
	/// The stored checksum does not match
	pub fn verify_crc(&self) -> Result<()> {
		let computed = self.compute_crc();
		if computed != self.header.checksum {
			return Err(PageError::ChecksumMismatch {
				stored: self.header.checksum,
				computed,
			});
		}

		Ok(())
	}

	/// Returns a reference to the page's header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// Returns a mutable reference to the page's header
	pub fn header_mut(&mut self) -> &mut PageHeader {
		&mut self.header
	}

	/// Returns the page's segment table
	pub fn segments(&self) -> &[u8] {
		&self.segments
	}

	/// Returns the page's content
	pub fn content(&self) -> &[u8] {
		self.content.as_slice()
	}

	/// Consumes the page and returns its content
	pub fn take_content(self) -> Vec<u8> {
		self.content
	}

	/// The total size of the page once written
	pub fn size(&self) -> usize {
		PAGE_HEADER_SIZE + self.segments.len() + self.content.len()
	}

	/// Pair every lacing value with the bytes it describes
	pub fn lacings(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
		let mut pos = 0;
		self.segments.iter().map(move |&len| {
			let start = pos;
			pos += usize::from(len);
			(len, &self.content[start..pos])
		})
	}
}
