use crate::error::{ErrorKind, Result, TagspliceError};
use crate::macros::err;

/// The text encoding for use in ID3v2 frames
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub(crate) enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub(crate) fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	fn terminator_len(self) -> usize {
		match self {
			Self::Latin1 | Self::UTF8 => 1,
			Self::UTF16 | Self::UTF16BE => 2,
		}
	}

	pub(crate) fn encode(self, text: &str, terminated: bool) -> Vec<u8> {
		let mut out = match self {
			TextEncoding::Latin1 => text
				.chars()
				.map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
				.collect(),
			TextEncoding::UTF16 => utf16_encode(text, u16::to_le_bytes, true),
			TextEncoding::UTF16BE => utf16_encode(text, u16::to_be_bytes, false),
			TextEncoding::UTF8 => text.as_bytes().to_vec(),
		};

		if terminated {
			out.resize(out.len() + self.terminator_len(), 0);
		}

		out
	}
}

/// Decode an entire text frame body
///
/// ID3v2.4 allows multiple null separated values in a single frame, these are joined with `/`.
pub(crate) fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
	let decoded = decode_raw(bytes, encoding)?;

	let values: Vec<&str> = decoded.split('\0').filter(|v| !v.is_empty()).collect();
	Ok(values.join("/"))
}

/// Split off a null-terminated string, returning the decoded string and the remaining bytes
///
/// If no terminator is found, the entire input is treated as the string.
pub(crate) fn decode_terminated(bytes: &[u8], encoding: TextEncoding) -> Result<(String, &[u8])> {
	let terminator_pos = match encoding {
		TextEncoding::Latin1 | TextEncoding::UTF8 => bytes.iter().position(|&b| b == 0),
		TextEncoding::UTF16 | TextEncoding::UTF16BE => bytes
			.chunks_exact(2)
			.position(|c| c == [0, 0])
			.map(|p| p * 2),
	};

	let (text, rest) = match terminator_pos {
		Some(pos) => (&bytes[..pos], &bytes[pos + encoding.terminator_len()..]),
		None => (bytes, &[][..]),
	};

	Ok((decode_raw(text, encoding)?, rest))
}

fn decode_raw(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
	if bytes.is_empty() {
		return Ok(String::new());
	}

	match encoding {
		TextEncoding::Latin1 => Ok(bytes.iter().map(|&c| char::from(c)).collect()),
		TextEncoding::UTF8 => Ok(String::from_utf8(bytes.to_vec())?),
		TextEncoding::UTF16BE => utf16_decode_bytes(bytes, u16::from_be_bytes),
		TextEncoding::UTF16 => {
			if bytes.len() < 2 {
				err!(TextDecode("UTF-16 string has an invalid length (< 2)"));
			}

			match [bytes[0], bytes[1]] {
				[0xFE, 0xFF] => utf16_decode_bytes(&bytes[2..], u16::from_be_bytes),
				[0xFF, 0xFE] => utf16_decode_bytes(&bytes[2..], u16::from_le_bytes),
				_ => err!(TextDecode("UTF-16 string has an invalid byte order mark")),
			}
		},
	}
}

fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	if bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an odd length"));
	}

	let words: Vec<u16> = bytes
		.chunks_exact(2)
		// Multiple strings in one frame may each carry their own BOM
		.filter_map(|c| match c {
			[0xFF, 0xFE] | [0xFE, 0xFF] => None,
			[a, b] => Some(endianness([*a, *b])),
			_ => None,
		})
		.collect();

	String::from_utf16(&words)
		.map_err(|_| TagspliceError::new(ErrorKind::TextDecode("Given an invalid UTF-16 string")))
}

fn utf16_encode(text: &str, endianness: fn(u16) -> [u8; 2], bom: bool) -> Vec<u8> {
	let mut encoded = Vec::<u8>::new();

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	encoded
}
