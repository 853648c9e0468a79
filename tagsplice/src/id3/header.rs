use super::synchsafe::SynchsafeInteger;
use crate::error::{Id3v2Error, Id3v2ErrorKind, Result};
use crate::macros::decode_err;

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Id3v2Header {
	pub version: Id3v2Version,
	/// Whether the entire tag is unsynchronised
	pub unsynchronisation: bool,
	pub footer: bool,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	///
	/// This includes the extended header, if one exists.
	pub size: u32,
	/// The number of bytes consumed by the extended header
	pub extended_size: u32,
}

impl Id3v2Header {
	pub(crate) fn parse<R>(bytes: &mut R) -> Result<Self>
	where
		R: Read,
	{
		log::debug!("Parsing ID3v2 header");

		let mut header = [0; 10];
		bytes.read_exact(&mut header)?;

		if &header[..3] != b"ID3" {
			decode_err!(@BAIL Mpeg, "Expected an ID3v2 tag");
		}

		// Version is stored as [major, minor], but here we don't care about minor revisions unless there's an error.
		let version = match header[3] {
			2 => Id3v2Version::V2,
			3 => Id3v2Version::V3,
			4 => Id3v2Version::V4,
			major => {
				return Err(
					Id3v2Error::new(Id3v2ErrorKind::BadId3v2Version(major, header[4])).into(),
				);
			},
		};

		let flags = header[5];

		// Compression was a flag only used in ID3v2.2 (bit 2).
		// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
		// The spec recommends just ignoring the tag in this case.
		if version == Id3v2Version::V2 && flags & 0x40 == 0x40 {
			return Err(Id3v2Error::new(Id3v2ErrorKind::V2Compression).into());
		}

		let size = BigEndian::read_u32(&header[6..]).unsynch();

		let mut ret = Id3v2Header {
			version,
			unsynchronisation: flags & 0x80 == 0x80,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
			size,
			extended_size: 0,
		};

		let extended_header = version != Id3v2Version::V2 && flags & 0x40 == 0x40;
		if extended_header {
			ret.extended_size = skip_extended_header(bytes, version)?;

			if ret.extended_size > size {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
			}
		}

		Ok(ret)
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u32 {
		self.size + 10 + if self.footer { 10 } else { 0 }
	}
}

// None of the extended header's contents (CRC, restrictions, update flag) are of use
// when rewriting the tag, so this only returns the number of bytes it took up.
fn skip_extended_header<R>(bytes: &mut R, version: Id3v2Version) -> Result<u32>
where
	R: Read,
{
	let raw_size = bytes.read_u32::<BigEndian>()?;

	// ID3v2.3 stores a plain size which excludes the size field itself,
	// ID3v2.4 stores a synchsafe size which includes it.
	let (total, remaining) = match version {
		Id3v2Version::V3 => {
			if raw_size != 6 && raw_size != 10 {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
			}

			(raw_size + 4, raw_size)
		},
		_ => {
			let size = raw_size.unsynch();
			if size < 6 {
				return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
			}

			(size, size - 4)
		},
	};

	log::trace!("Skipping {total} byte extended header");

	let skipped = std::io::copy(
		&mut bytes.by_ref().take(u64::from(remaining)),
		&mut std::io::sink(),
	)?;
	if skipped != u64::from(remaining) {
		return Err(Id3v2Error::new(Id3v2ErrorKind::BadExtendedHeaderSize).into());
	}

	Ok(total)
}

#[cfg(test)]
mod tests {
	use super::{Id3v2Header, Id3v2Version};
	use crate::error::{ErrorKind, Id3v2ErrorKind};

	#[test_log::test]
	fn plain_header() {
		let header = Id3v2Header::parse(&mut &b"ID3\x04\x00\x00\x00\x00\x02\x01"[..]).unwrap();
		assert_eq!(header.version, Id3v2Version::V4);
		assert_eq!(header.size, 257);
		assert_eq!(header.full_tag_size(), 267);
		assert!(!header.unsynchronisation);
	}

	#[test_log::test]
	fn extended_headers() {
		// ID3v2.3: size 6 excludes the size field
		let mut v3 = b"ID3\x03\x00\x40\x00\x00\x00\x20".to_vec();
		v3.extend([0, 0, 0, 6, 0, 0, 0, 0, 0, 0]);
		let header = Id3v2Header::parse(&mut &v3[..]).unwrap();
		assert_eq!(header.extended_size, 10);

		// ID3v2.4: synchsafe size 6 includes the size field
		let mut v4 = b"ID3\x04\x00\x40\x00\x00\x00\x20".to_vec();
		v4.extend([0, 0, 0, 6, 1, 0]);
		let header = Id3v2Header::parse(&mut &v4[..]).unwrap();
		assert_eq!(header.extended_size, 6);

		let mut bad = b"ID3\x04\x00\x40\x00\x00\x00\x20".to_vec();
		bad.extend([0, 0, 0, 2]);
		let err = Id3v2Header::parse(&mut &bad[..]).unwrap_err();
		assert!(matches!(
			err.kind(),
			ErrorKind::Id3v2(e) if matches!(e.kind(), Id3v2ErrorKind::BadExtendedHeaderSize)
		));
	}

	#[test_log::test]
	fn bad_versions() {
		let err = Id3v2Header::parse(&mut &b"ID3\x05\x00\x00\x00\x00\x00\x00"[..]).unwrap_err();
		assert!(matches!(
			err.kind(),
			ErrorKind::Id3v2(e) if matches!(e.kind(), Id3v2ErrorKind::BadId3v2Version(5, 0))
		));

		let err = Id3v2Header::parse(&mut &b"ID3\x02\x00\x40\x00\x00\x00\x00"[..]).unwrap_err();
		assert!(matches!(
			err.kind(),
			ErrorKind::Id3v2(e) if matches!(e.kind(), Id3v2ErrorKind::V2Compression)
		));
	}
}
