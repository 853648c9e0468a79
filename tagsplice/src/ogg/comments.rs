//! The Vorbis comment codec, shared by FLAC `VORBIS_COMMENT` blocks and Ogg comment packets
//!
//! ```text
//! vendor length (LE32), vendor
//! comment count (LE32)
//! repeated: comment length (LE32), "KEY=value"
//! ```

use crate::error::Result;
use crate::macros::{decode_err, err};
use crate::util::io::{ReadExt, WriteExt};

use byteorder::{LittleEndian, ReadBytesExt};

/// The key holding a base64 encoded FLAC picture block
pub(crate) const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

/// The vendor string written to every comment block
pub(crate) fn vendor_string() -> String {
	format!("tagsplice {}", env!("CARGO_PKG_VERSION"))
}

/// A decoded Vorbis comment block
///
/// Items are kept in their original order, with their original keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VorbisComments {
	pub(crate) vendor: String,
	pub(crate) items: Vec<(String, String)>,
}

impl VorbisComments {
	/// An empty block with our own vendor string
	pub(crate) fn new() -> Self {
		Self {
			vendor: vendor_string(),
			items: Vec::new(),
		}
	}

	pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.items.push((key.into(), value.into()));
	}

	/// Decode a comment block
	///
	/// Any data following the comments (such as the Vorbis framing bit) is ignored.
	///
	/// # Errors
	///
	/// * A length field points past the end of `content` ([`ErrorKind::TruncatedInput`](crate::error::ErrorKind::TruncatedInput))
	/// * The comment count can't possibly fit in `content` ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
	/// * A comment has no `=` separator
	/// * The vendor or a comment is not valid UTF-8
	pub(crate) fn parse(content: &[u8]) -> Result<Self> {
		let reader = &mut &*content;

		let vendor = reader.read_string_prefixed::<LittleEndian>()?;

		let Ok(number_of_items) = reader.read_u32::<LittleEndian>() else {
			err!(TruncatedInput);
		};

		// Every comment needs at least its 4 byte length
		if number_of_items as usize > reader.len() / 4 {
			err!(SizeMismatch);
		}

		log::trace!("Reading {number_of_items} Vorbis comments, vendor: \"{vendor}\"");

		let mut items = Vec::with_capacity(number_of_items as usize);
		for _ in 0..number_of_items {
			let comment = reader.read_len_prefixed::<LittleEndian>()?;

			// KEY=VALUE
			let Some(separator) = comment.iter().position(|b| *b == b'=') else {
				decode_err!(@BAIL "Vorbis comment is missing a \"=\" separator");
			};

			let key = String::from_utf8(comment[..separator].to_vec())?;
			let value = String::from_utf8(comment[separator + 1..].to_vec())?;

			items.push((key, value));
		}

		Ok(Self { vendor, items })
	}

	/// Encode the comment block
	///
	/// # Errors
	///
	/// * A key is invalid, see [`verify_key`]
	/// * A comment is larger than 4 GiB
	pub(crate) fn as_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::new();

		bytes.write_len_prefixed::<LittleEndian>(self.vendor.as_bytes())?;

		let Ok(number_of_items) = u32::try_from(self.items.len()) else {
			err!(TooMuchData);
		};
		bytes.extend(number_of_items.to_le_bytes());

		for (key, value) in &self.items {
			verify_key(key)?;

			let mut comment = Vec::with_capacity(key.len() + 1 + value.len());
			comment.extend(key.as_bytes());
			comment.push(b'=');
			comment.extend(value.as_bytes());

			bytes.write_len_prefixed::<LittleEndian>(&comment)?;
		}

		Ok(bytes)
	}
}

/// Verify a Vorbis comment key
///
/// A key is made up of at least one printable ASCII character (0x20 through 0x7D), excluding `=`.
///
/// # Errors
///
/// The key is empty, or contains an invalid character ([`ErrorKind::InvalidFieldName`](crate::error::ErrorKind::InvalidFieldName))
pub(crate) fn verify_key(key: &str) -> Result<()> {
	if key.is_empty() || !key.bytes().all(|b| (0x20..=0x7D).contains(&b) && b != b'=') {
		err!(InvalidFieldName(key.to_owned()));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{VorbisComments, verify_key};
	use crate::error::ErrorKind;

	#[test_log::test]
	fn comment_block() {
		let mut comments = VorbisComments::new();
		comments.push("TITLE", "Foo title");
		comments.push("ARTIST", "Bår artist");
		comments.push("EMPTY", "");
		comments.push("EQUALS", "a=b");

		let bytes = comments.as_bytes().unwrap();
		assert_eq!(VorbisComments::parse(&bytes).unwrap(), comments);

		// Trailing data, such as a framing bit, is ignored
		let mut framed = bytes;
		framed.push(1);
		assert_eq!(VorbisComments::parse(&framed).unwrap(), comments);
	}

	#[test_log::test]
	fn truncated_block() {
		let mut comments = VorbisComments::new();
		comments.push("TITLE", "Foo title");
		let bytes = comments.as_bytes().unwrap();

		let err = VorbisComments::parse(&bytes[..bytes.len() - 1]).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::TruncatedInput));

		let err = VorbisComments::parse(&bytes[..2]).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::TruncatedInput));
	}

	#[test_log::test]
	fn hostile_count() {
		let mut bytes = 0_u32.to_le_bytes().to_vec();
		bytes.extend(u32::MAX.to_le_bytes());

		let err = VorbisComments::parse(&bytes).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::SizeMismatch));
	}

	#[test_log::test]
	fn missing_separator() {
		let mut bytes = 0_u32.to_le_bytes().to_vec();
		bytes.extend(1_u32.to_le_bytes());
		bytes.extend(5_u32.to_le_bytes());
		bytes.extend(b"TITLE");

		assert!(matches!(
			VorbisComments::parse(&bytes).unwrap_err().kind(),
			ErrorKind::FileDecoding(_)
		));
	}

	#[test_log::test]
	fn keys() {
		assert!(verify_key("REPLAYGAIN_TRACK_GAIN").is_ok());
		assert!(verify_key("with space").is_ok());

		for bad in ["", "A=B", "TAB\t", "TILDE~", "ÜMLAUT"] {
			let err = verify_key(bad).unwrap_err();
			assert!(matches!(err.kind(), ErrorKind::InvalidFieldName(key) if key == bad));
		}

		let mut comments = VorbisComments::new();
		comments.push("BAD=KEY", "value");
		assert!(comments.as_bytes().is_err());
	}
}
