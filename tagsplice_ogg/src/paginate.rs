use crate::error::{PageError, Result};
use crate::{
	CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, CONTINUED_PACKET,
	MAX_SEGMENT_COUNT, Page, PageHeader,
};

/// A single lacing value, the bytes it covers, and the granule position of the page
/// that the lacing originally belonged to
struct Lacing<'a> {
	value: u8,
	bytes: &'a [u8],
	abgp: u64,
}

// A special value of '-1' (in two's complement) indicates that no packets finish on a page
const NO_PACKET_FINISHED: u64 = u64::MAX;

/// Creates the lacing values for a packet of `length` bytes
///
/// A packet is split into runs of 255, followed by a final run < 255. A packet with a length
/// that is a multiple of 255 ends with an explicit 0.
pub fn segment_table(length: usize) -> Vec<u8> {
	let mut segments = vec![255; length / 255];
	segments.push((length % 255) as u8);
	segments
}

fn lace<'a>(packet: &'a [u8], abgp: u64, lacings: &mut Vec<Lacing<'a>>) {
	let mut rest = packet;
	for value in segment_table(packet.len()) {
		let (bytes, remaining) = rest.split_at(usize::from(value));
		rest = remaining;

		lacings.push(Lacing { value, bytes, abgp });
	}
}

fn pages_from_lacings(
	lacings: &[Lacing<'_>],
	stream_serial: u32,
	first_sequence_number: u32,
	first_flags: u8,
	last_flags: u8,
) -> Result<Vec<Page>> {
	let mut pages: Vec<Page> = Vec::new();

	let page_count = lacings.len().div_ceil(MAX_SEGMENT_COUNT);

	let mut sequence_number = first_sequence_number;
	for (idx, chunk) in lacings.chunks(MAX_SEGMENT_COUNT).enumerate() {
		let mut flags = match pages.last() {
			None => first_flags,
			Some(prev) if prev.segments().last() == Some(&255) => CONTINUED_PACKET,
			Some(_) => 0,
		};

		if idx + 1 == page_count {
			flags |= last_flags;
		}

		let abgp = chunk
			.iter()
			.rev()
			.find(|lacing| lacing.value < 255)
			.map_or(NO_PACKET_FINISHED, |lacing| lacing.abgp);

		let segments = chunk.iter().map(|lacing| lacing.value).collect();
		let content = chunk.iter().flat_map(|lacing| lacing.bytes).copied().collect();

		let header = PageHeader::new(flags, abgp, stream_serial, sequence_number);
		pages.push(Page::new(header, segments, content)?);

		sequence_number = sequence_number.wrapping_add(1);
	}

	Ok(pages)
}

/// Create pages from a list of packets
///
/// Pages are filled up to [`MAX_SEGMENT_COUNT`] lacing values. Every page where a packet finishes
/// gets the granule position `abgp`, the others get `-1`. Sequence numbers start at 0.
///
/// `flags` may contain [`CONTAINS_FIRST_PAGE_OF_BITSTREAM`] and [`CONTAINS_LAST_PAGE_OF_BITSTREAM`],
/// which are applied to the first and last page respectively.
///
/// NOTE: The pages are returned without checksums, see [`Page::gen_crc`].
///
/// # Errors
///
/// See [`Page::new`]
pub fn paginate<'a, I>(packets: I, stream_serial: u32, abgp: u64, flags: u8) -> Result<Vec<Page>>
where
	I: IntoIterator<Item = &'a [u8]>,
{
	let mut lacings = Vec::new();
	for packet in packets {
		lace(packet, abgp, &mut lacings);
	}

	pages_from_lacings(
		&lacings,
		stream_serial,
		0,
		flags & CONTAINS_FIRST_PAGE_OF_BITSTREAM,
		flags & CONTAINS_LAST_PAGE_OF_BITSTREAM,
	)
}

#[derive(Copy, Clone)]
struct LacingPosition {
	page: usize,
	lacing: usize,
}

fn locate_packet(
	pages: &[Page],
	stream_serial: u32,
	packet_index: usize,
) -> Option<(LacingPosition, LacingPosition)> {
	let mut current = 0;
	let mut start = None;

	for (page_idx, page) in pages.iter().enumerate() {
		if page.header().stream_serial != stream_serial {
			continue;
		}

		for (lacing_idx, &value) in page.segments().iter().enumerate() {
			let position = LacingPosition {
				page: page_idx,
				lacing: lacing_idx,
			};

			if current == packet_index && start.is_none() {
				start = Some(position);
			}

			if value < 255 {
				if current == packet_index {
					return start.map(|start| (start, position));
				}

				current += 1;
			}
		}
	}

	None
}

/// Replace a single packet of a logical stream, re-paginating only the pages it touches
///
/// The pages that carry the packet at `packet_index` of the stream `stream_serial` are rebuilt
/// at lacing granularity: the lacing values preceding the packet on its first page and the lacing
/// values following it on its last page are kept, with the new packet's lacing values in between.
/// The rebuilt pages keep the granule positions of the pages their finishing packets came from,
/// along with the first/continued flags of the first touched page and the last flag of the last.
///
/// Later pages of the stream are renumbered to account for any change in page count. Pages of
/// other streams are kept. Every returned page has a freshly computed checksum.
///
/// # Errors
///
/// * The stream does not contain a packet at `packet_index` ([`PageError::NotEnoughData`])
/// * See [`Page::new`]
pub fn replace_packet(
	pages: &[Page],
	stream_serial: u32,
	packet_index: usize,
	packet: &[u8],
) -> Result<Vec<Page>> {
	let Some((start, end)) = locate_packet(pages, stream_serial, packet_index) else {
		return Err(PageError::NotEnoughData);
	};

	let first_page = &pages[start.page];
	let last_page = &pages[end.page];

	let mut lacings = Vec::new();
	for (value, bytes) in first_page.lacings().take(start.lacing) {
		lacings.push(Lacing {
			value,
			bytes,
			abgp: first_page.header().abgp,
		});
	}

	lace(packet, last_page.header().abgp, &mut lacings);

	for (value, bytes) in last_page.lacings().skip(end.lacing + 1) {
		lacings.push(Lacing {
			value,
			bytes,
			abgp: last_page.header().abgp,
		});
	}

	let first_flags = first_page.header().header_type_flag()
		& (CONTAINS_FIRST_PAGE_OF_BITSTREAM | CONTINUED_PACKET);
	let last_flags = last_page.header().header_type_flag() & CONTAINS_LAST_PAGE_OF_BITSTREAM;

	let new_pages = pages_from_lacings(
		&lacings,
		stream_serial,
		first_page.header().sequence_number,
		first_flags,
		last_flags,
	)?;

	let touched = pages[start.page..=end.page]
		.iter()
		.filter(|page| page.header().stream_serial == stream_serial)
		.count();
	let shift = (new_pages.len() as u32).wrapping_sub(touched as u32);

	let mut new_pages = Some(new_pages);
	let mut out = Vec::with_capacity(pages.len() + 1);
	for (idx, page) in pages.iter().enumerate() {
		let ours = page.header().stream_serial == stream_serial;

		if idx == start.page {
			out.extend(new_pages.take().into_iter().flatten());
			continue;
		}

		if ours && (start.page..=end.page).contains(&idx) {
			continue;
		}

		let mut page = page.clone();
		if ours && idx > end.page {
			let header = page.header_mut();
			header.sequence_number = header.sequence_number.wrapping_add(shift);
		}

		out.push(page);
	}

	for page in &mut out {
		page.header_mut().start = 0;
		page.gen_crc();
	}

	Ok(out)
}
