use super::header::Id3v2Version;
use super::synchsafe::{SynchsafeInteger, UnsynchronizedStream};
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::decode_err;
use crate::tag::Field;
use crate::util::io::ReadExt;

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

/// The attached picture frame ID
pub(crate) const ATTACHED_PICTURE_ID: &str = "APIC";
/// The attached picture frame ID, in ID3v2.2
pub(crate) const V2_ATTACHED_PICTURE_ID: &str = "PIC";
/// The comment frame ID
pub(crate) const COMMENT_ID: &str = "COMM";
/// The comment frame ID, in ID3v2.2
pub(crate) const V2_COMMENT_ID: &str = "COM";

/// Map a [`Field`] to its frame ID
///
/// Every field has an ID3v2.3/2.4 frame, [`Field::Date`] has no ID3v2.2 equivalent.
pub(crate) fn frame_id(field: Field, version: Id3v2Version) -> Option<&'static str> {
	let (id, v2_id) = match field {
		Field::Artist => ("TPE1", Some("TP1")),
		Field::AlbumArtist => ("TPE2", Some("TP2")),
		Field::Album => ("TALB", Some("TAL")),
		Field::Title => ("TIT2", Some("TT2")),
		Field::Genre => ("TCON", Some("TCO")),
		Field::Year => ("TYER", Some("TYE")),
		Field::Date => ("TDRC", None),
		Field::Bpm => ("TBPM", Some("TBP")),
		Field::Comment => (COMMENT_ID, Some(V2_COMMENT_ID)),
		Field::Composer => ("TCOM", Some("TCM")),
		Field::Copyright => ("TCOP", Some("TCR")),
		Field::EncodedBy => ("TENC", Some("TEN")),
		Field::Lyricist => ("TEXT", Some("TXT")),
		Field::Language => ("TLAN", Some("TLA")),
		Field::Length => ("TLEN", Some("TLE")),
		Field::PartOfSet => ("TPOS", Some("TPA")),
		Field::Publisher => ("TPUB", Some("TPB")),
		Field::TrackNumber => ("TRCK", Some("TRK")),
	};

	match version {
		Id3v2Version::V2 => v2_id,
		Id3v2Version::V3 | Id3v2Version::V4 => Some(id),
	}
}

/// Map a frame ID back to its [`Field`]
pub(crate) fn field_for_id(id: &str, version: Id3v2Version) -> Option<Field> {
	Field::ALL
		.iter()
		.copied()
		.find(|field| frame_id(*field, version) == Some(id))
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct FrameFlags {
	pub unsynchronisation: bool,
	pub compression: bool,
	pub encryption: bool,
	pub grouping_identity: bool,
	pub data_length_indicator: bool,
}

impl FrameFlags {
	/// Parse the flags from an ID3v2.4 frame
	pub(crate) fn parse_id3v24(flags: u16) -> Self {
		FrameFlags {
			grouping_identity: flags & 0x0040 == 0x0040,
			compression: flags & 0x0008 == 0x0008,
			encryption: flags & 0x0004 == 0x0004,
			unsynchronisation: flags & 0x0002 == 0x0002,
			data_length_indicator: flags & 0x0001 == 0x0001,
		}
	}

	/// Parse the flags from an ID3v2.3 frame
	pub(crate) fn parse_id3v23(flags: u16) -> Self {
		FrameFlags {
			compression: flags & 0x0080 == 0x0080,
			encryption: flags & 0x0040 == 0x0040,
			grouping_identity: flags & 0x0020 == 0x0020,
			..FrameFlags::default()
		}
	}
}

/// A frame with its content fully decoded from the container
///
/// Any unsynchronisation and compression has been undone at this point.
pub(crate) struct RawFrame {
	pub id: String,
	pub content: Vec<u8>,
}

pub(crate) enum ParsedFrame {
	Next(RawFrame),
	Skip,
	Eof,
}

impl ParsedFrame {
	pub(crate) fn read<R>(
		reader: &mut R,
		version: Id3v2Version,
		tag_unsynchronised: bool,
	) -> Result<Self>
	where
		R: Read,
	{
		let Some((id, mut size, mut flags)) = read_header(reader, version)? else {
			// Stop reading
			return Ok(Self::Eof);
		};

		// ID3v2.4 signals tag-wide unsynchronisation on every frame
		if version == Id3v2Version::V4 && tag_unsynchronised {
			flags.unsynchronisation = true;
		}

		if size == 0 {
			log::debug!("Encountered a zero length frame, skipping");
			return Ok(Self::Skip);
		}

		let mut frame_reader = reader.by_ref().take(u64::from(size));

		// The additional header data comes in the same order as the flags
		if version == Id3v2Version::V3 && flags.compression {
			// The decompressed size, which isn't needed to inflate
			let _decompressed_size = read_extra_u32(&mut frame_reader, &mut size)?;
		}

		if version == Id3v2Version::V4 && flags.grouping_identity {
			let _group = read_extra_u8(&mut frame_reader, &mut size)?;
		}

		if flags.encryption {
			let _method = read_extra_u8(&mut frame_reader, &mut size)?;
		}

		if version == Id3v2Version::V3 && flags.grouping_identity {
			let _group = read_extra_u8(&mut frame_reader, &mut size)?;
		}

		if flags.data_length_indicator {
			let _len = read_extra_u32(&mut frame_reader, &mut size)?.unsynch();
		}

		let content = frame_reader.read_bounded(u64::from(size))?;

		if flags.encryption {
			log::warn!("Skipping encrypted frame \"{id}\"");
			return Ok(Self::Skip);
		}

		// The flags are applied in the order unsynchronisation -> compression
		let content = if flags.unsynchronisation {
			let mut unsynchronised = Vec::with_capacity(content.len());
			UnsynchronizedStream::new(&content[..]).read_to_end(&mut unsynchronised)?;
			unsynchronised
		} else {
			content
		};

		let content = if flags.compression {
			decompress(&content)?
		} else {
			content
		};

		Ok(Self::Next(RawFrame { id, content }))
	}
}

fn read_header<R>(
	reader: &mut R,
	version: Id3v2Version,
) -> Result<Option<(String, u32, FrameFlags)>>
where
	R: Read,
{
	let header_len = match version {
		Id3v2Version::V2 => 6,
		Id3v2Version::V3 | Id3v2Version::V4 => 10,
	};

	let mut header = [0; 10];
	let read = read_remaining(reader, &mut header[..header_len])?;
	if read == 0 {
		return Ok(None);
	}

	// Assume we just started reading padding
	if header[0] == 0 {
		return Ok(None);
	}

	if read < header_len {
		decode_err!(@BAIL Mpeg, "Truncated ID3v2 frame header");
	}

	let (id_bytes, size, flags) = match version {
		Id3v2Version::V2 => (
			&header[..3],
			u32::from_be_bytes([0, header[3], header[4], header[5]]),
			FrameFlags::default(),
		),
		Id3v2Version::V3 => (
			&header[..4],
			u32::from_be_bytes([header[4], header[5], header[6], header[7]]),
			FrameFlags::parse_id3v23(u16::from_be_bytes([header[8], header[9]])),
		),
		Id3v2Version::V4 => (
			&header[..4],
			u32::from_be_bytes([header[4], header[5], header[6], header[7]]).unsynch(),
			FrameFlags::parse_id3v24(u16::from_be_bytes([header[8], header[9]])),
		),
	};

	if !id_bytes
		.iter()
		.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
	{
		log::debug!("Invalid frame ID: {id_bytes:?}");
		decode_err!(@BAIL Mpeg, "Encountered an invalid ID3v2 frame ID");
	}

	let id = String::from_utf8_lossy(id_bytes).into_owned();
	log::trace!("Reading frame \"{id}\", size: {size}");

	Ok(Some((id, size, flags)))
}

/// Fill as much of `buf` as the reader allows, returning the number of bytes read
fn read_remaining<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match reader.read(&mut buf[filled..])? {
			0 => break,
			n => filled += n,
		}
	}

	Ok(filled)
}

fn read_extra_u8<R: Read>(reader: &mut R, size: &mut u32) -> Result<u8> {
	if *size < 1 {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
	}

	*size -= 1;
	Ok(reader.read_u8()?)
}

fn read_extra_u32<R: Read>(reader: &mut R, size: &mut u32) -> Result<u32> {
	if *size < 4 {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadFrameLength).into());
	}

	*size -= 4;
	Ok(reader.read_u32::<BigEndian>()?)
}

#[cfg(feature = "id3v2_compression_support")]
fn decompress(content: &[u8]) -> Result<Vec<u8>> {
	let limit = crate::config::global_options().allocation_limit as u64;

	let mut decompressed = Vec::new();
	flate2::read::ZlibDecoder::new(content)
		.take(limit)
		.read_to_end(&mut decompressed)
		.map_err(|e| Id3v2Error::new(Id3v2ErrorKind::Decompression(e)))?;

	Ok(decompressed)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn decompress(_: &[u8]) -> Result<Vec<u8>> {
	Err(Id3v2Error::new(Id3v2ErrorKind::CompressedFrameEncountered).into())
}

#[cfg(test)]
mod tests {
	use super::{FrameFlags, ParsedFrame, field_for_id, frame_id};
	use crate::id3::header::Id3v2Version;
	use crate::tag::Field;

	#[test_log::test]
	fn every_field_has_a_frame() {
		for field in Field::ALL {
			let id = frame_id(*field, Id3v2Version::V4).unwrap();
			assert_eq!(field_for_id(id, Id3v2Version::V3), Some(*field));

			if let Some(v2_id) = frame_id(*field, Id3v2Version::V2) {
				assert_eq!(v2_id.len(), 3);
				assert_eq!(field_for_id(v2_id, Id3v2Version::V2), Some(*field));
			}
		}

		assert_eq!(frame_id(Field::Date, Id3v2Version::V2), None);
	}

	#[test_log::test]
	fn v24_flags() {
		let flags = FrameFlags::parse_id3v24(0x0003);
		assert!(flags.unsynchronisation);
		assert!(flags.data_length_indicator);
		assert!(!flags.compression);
	}

	#[test_log::test]
	fn unsynchronised_v24_frame() {
		// TIT2, unsynchronisation + data length indicator
		let mut frame = b"TIT2".to_vec();
		frame.extend([0, 0, 0, 9, 0, 0x03]);
		frame.extend([0, 0, 0, 4]);
		frame.extend([0x00, 0xFF, 0x00, b'a', b'b']);

		let mut reader = &frame[..];
		let ParsedFrame::Next(frame) = ParsedFrame::read(&mut reader, Id3v2Version::V4, false).unwrap()
		else {
			panic!("expected a frame");
		};

		assert_eq!(frame.id, "TIT2");
		assert_eq!(frame.content, [0x00, 0xFF, b'a', b'b']);
	}

	#[test_log::test]
	fn padding_ends_frames() {
		let padding = [0_u8; 16];
		assert!(matches!(
			ParsedFrame::read(&mut &padding[..], Id3v2Version::V3, false).unwrap(),
			ParsedFrame::Eof
		));
	}

	#[test_log::test]
	fn invalid_id_is_an_error() {
		let mut frame = b"ab!d".to_vec();
		frame.extend([0, 0, 0, 1, 0, 0, 0]);
		assert!(ParsedFrame::read(&mut &frame[..], Id3v2Version::V4, false).is_err());
	}

	#[test_log::test]
	fn truncated_header_is_an_error() {
		let frame = b"TALB\x00\x00";
		assert!(ParsedFrame::read(&mut &frame[..], Id3v2Version::V3, false).is_err());
	}

	#[test_log::test]
	fn encrypted_frame_skipped() {
		let mut frame = b"TIT2".to_vec();
		frame.extend([0, 0, 0, 3, 0, 0x40]);
		frame.extend([0x80, 1, 2]);
		frame.extend(b"TALB");

		let mut reader = &frame[..];
		assert!(matches!(
			ParsedFrame::read(&mut reader, Id3v2Version::V3, false).unwrap(),
			ParsedFrame::Skip
		));

		// The reader is positioned at the next frame
		assert_eq!(reader, b"TALB");
	}

	#[cfg(feature = "id3v2_compression_support")]
	#[test_log::test]
	fn compressed_v23_frame() {
		use flate2::Compression;
		use flate2::write::ZlibEncoder;
		use std::io::Write;

		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(b"\x03Foo title").unwrap();
		let compressed = encoder.finish().unwrap();

		let mut frame = b"TIT2".to_vec();
		frame.extend((compressed.len() as u32 + 4).to_be_bytes());
		frame.extend([0, 0x80]);
		frame.extend(10_u32.to_be_bytes());
		frame.extend(&compressed);

		let ParsedFrame::Next(frame) =
			ParsedFrame::read(&mut &frame[..], Id3v2Version::V3, false).unwrap()
		else {
			panic!("expected a frame");
		};

		assert_eq!(frame.content, b"\x03Foo title");
	}
}
