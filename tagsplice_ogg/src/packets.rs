use crate::error::{PageError, Result};
use crate::{CONTINUED_PACKET, Page};

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::io::{Read, Seek, SeekFrom};

/// Reassembles packets from pages, keeping one pending packet per stream serial
///
/// A demuxer is meant to be used for a single pass over a single physical stream.
#[derive(Default, Debug)]
pub struct Demuxer {
	pending: HashMap<u32, Vec<u8>>,
}

impl Demuxer {
	/// Create a new, empty `Demuxer`
	pub fn new() -> Self {
		Self::default()
	}

	/// Feed a page, returning every packet that completes on it
	///
	/// # Errors
	///
	/// * The page continues a packet, but none is pending for its stream ([`PageError::MissingContinuation`])
	/// * The page starts a fresh packet while one is pending for its stream ([`PageError::UnfinishedPacket`])
	pub fn push(&mut self, page: &Page) -> Result<Vec<Vec<u8>>> {
		let serial = page.header().stream_serial;
		let continued = page.header().header_type_flag() & CONTINUED_PACKET != 0;

		let mut current = match (continued, self.pending.remove(&serial)) {
			(true, Some(pending)) => pending,
			(true, None) => return Err(PageError::MissingContinuation),
			(false, Some(_)) => return Err(PageError::UnfinishedPacket),
			(false, None) => Vec::new(),
		};

		let mut completed = Vec::new();
		for (len, bytes) in page.lacings() {
			current.extend_from_slice(bytes);

			if len < 255 {
				completed.push(std::mem::take(&mut current));
			}
		}

		// The last lacing value was 255, the packet continues on a later page
		if page.segments().last() == Some(&255) {
			self.pending.insert(serial, current);
		}

		Ok(completed)
	}

	/// Whether a packet is still pending for the stream `serial`
	pub fn has_pending(&self, serial: u32) -> bool {
		self.pending.contains_key(&serial)
	}
}

/// A container for the packets of a single logical stream
pub struct Packets {
	serial: u32,
	content: Vec<u8>,
	packet_sizes: Vec<usize>,
}

impl Packets {
	/// Read as many packets as possible from a reader
	///
	/// See [`Packets::read_count`]
	///
	/// # Errors
	///
	/// See [`Packets::read_count`]
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		Self::read_count(data, None, false)
	}

	/// Read packets of the first logical stream in the reader
	///
	/// The stream serial is taken from the first page. Pages of other streams are demuxed
	/// alongside it, but their packets are discarded. Reading stops once `count` packets
	/// have completed, or at the end of the reader when `count` is `None`.
	///
	/// # Errors
	///
	/// * Unable to read the specified number of packets
	/// * A page is malformed, see [`Page::read`]
	/// * `verify_crc` is set and a page has an invalid checksum
	pub fn read_count<R>(data: &mut R, count: Option<usize>, verify_crc: bool) -> Result<Self>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;
		let end = data.seek(SeekFrom::End(0))?;
		data.seek(SeekFrom::Start(start))?;

		let mut demuxer = Demuxer::new();
		let mut serial = None;

		let mut content = Vec::new();
		let mut packet_sizes = Vec::new();

		'outer: while data.stream_position()? < end {
			if count == Some(packet_sizes.len()) {
				break;
			}

			let page = Page::read(data)?;
			if verify_crc {
				page.verify_crc()?;
			}

			let page_serial = page.header().stream_serial;
			let target = *serial.get_or_insert(page_serial);

			let completed = demuxer.push(&page)?;
			if page_serial != target {
				continue;
			}

			for packet in completed {
				packet_sizes.push(packet.len());
				content.extend(packet);

				if count == Some(packet_sizes.len()) {
					break 'outer;
				}
			}
		}

		if let Some(count) = count {
			if packet_sizes.len() != count {
				return Err(PageError::NotEnoughData);
			}
		}

		Ok(Self {
			serial: serial.unwrap_or_default(),
			content,
			packet_sizes,
		})
	}

	/// The serial of the logical stream the packets were read from
	pub fn serial(&self) -> u32 {
		self.serial
	}

	/// Returns the number of packets
	pub fn len(&self) -> usize {
		self.packet_sizes.len()
	}

	/// Returns true if there are no packets
	pub fn is_empty(&self) -> bool {
		self.packet_sizes.is_empty()
	}

	/// Gets the packet at a specified index, returning its contents
	///
	/// NOTE: This is zero-indexed. If the index is out of bounds, it will return [`None`].
	pub fn get(&self, idx: usize) -> Option<&[u8]> {
		let size = *self.packet_sizes.get(idx)?;
		let start: usize = self.packet_sizes[..idx].iter().sum();

		Some(&self.content[start..start + size])
	}

	/// Returns an iterator over the packets
	pub fn iter(&self) -> PacketsIter<'_> {
		<&Self as IntoIterator>::into_iter(self)
	}
}

/// An iterator over packets
///
/// This is created by calling `into_iter` on [`Packets`]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PacketsIter<'a> {
	content: &'a [u8],
	packet_sizes: &'a [usize],
}

impl<'a> Iterator for PacketsIter<'a> {
	type Item = &'a [u8];

	fn next(&mut self) -> Option<Self::Item> {
		let (&packet_size, rest) = self.packet_sizes.split_first()?;
		self.packet_sizes = rest;

		let (ret, remaining) = self.content.split_at(packet_size);
		self.content = remaining;

		Some(ret)
	}
}

impl<'a> IntoIterator for &'a Packets {
	type Item = &'a [u8];
	type IntoIter = PacketsIter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		PacketsIter {
			content: &self.content,
			packet_sizes: &self.packet_sizes,
		}
	}
}

impl Debug for Packets {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Packets")
			.field("serial", &self.serial)
			.field("total_bytes", &self.content.len())
			.field("count", &self.packet_sizes.len())
			.finish()
	}
}
