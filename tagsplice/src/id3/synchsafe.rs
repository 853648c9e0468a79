//! Utilities for working with synchsafe integers and unsynchronized ID3v2 content
//!
//! ID3v2 stores sizes with the most significant bit of every byte cleared, so a size can never
//! contain an MPEG frame sync (`0xFF 0xE?`). Frame content can be protected the same way by
//! inserting a `0x00` after every `0xFF`, which readers have to strip again.

use crate::error::Result;

use std::io::Read;

/// A reader for unsynchronized content
///
/// Every `0x00` directly following a `0xFF` is dropped.
pub(crate) struct UnsynchronizedStream<R> {
	reader: R,
	// Same buffer size as `BufReader`
	buf: [u8; 8 * 1024],
	bytes_available: usize,
	pos: usize,
	encountered_ff: bool,
}

impl<R> UnsynchronizedStream<R> {
	pub(crate) fn new(reader: R) -> Self {
		Self {
			reader,
			buf: [0; 8 * 1024],
			bytes_available: 0,
			pos: 0,
			encountered_ff: false,
		}
	}

	pub(crate) fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: Read> Read for UnsynchronizedStream<R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let dest_len = buf.len();
		if dest_len == 0 {
			return Ok(0);
		}

		let mut dest_pos = 0;
		while dest_pos < dest_len {
			if self.pos >= self.bytes_available {
				self.bytes_available = self.reader.read(&mut self.buf)?;
				self.pos = 0;
			}

			// Exhausted the reader
			if self.bytes_available == 0 {
				break;
			}

			if self.encountered_ff {
				self.encountered_ff = false;

				// Only skip the next byte if this is valid unsynchronization
				if self.buf[self.pos] == 0 {
					self.pos += 1;
					continue;
				}
			}

			let current_byte = self.buf[self.pos];
			buf[dest_pos] = current_byte;
			dest_pos += 1;
			self.pos += 1;

			if current_byte == 0xFF {
				self.encountered_ff = true;
			}
		}

		Ok(dest_pos)
	}
}

/// An integer that can be converted to and from its synchsafe form
pub(crate) trait SynchsafeInteger: Sized {
	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in 7 bits per byte
	fn synch(self) -> Result<Self>;

	/// Decode a synchsafe integer
	fn unsynch(self) -> Self;
}

impl SynchsafeInteger for u32 {
	fn synch(self) -> Result<Self> {
		// 7 bits are available per byte, so 28 bits in total
		const MAXIMUM_INTEGER: u32 = 0x0FFF_FFFF;

		if self > MAXIMUM_INTEGER {
			crate::macros::err!(TooMuchData);
		}

		Ok((self & 0x7F)
			| ((self & (0x7F << 7)) << 1)
			| ((self & (0x7F << 14)) << 2)
			| ((self & (0x7F << 21)) << 3))
	}

	fn unsynch(self) -> Self {
		((self & 0x7F00_0000) >> 3)
			| ((self & 0x7F_0000) >> 2)
			| ((self & 0x7F00) >> 1)
			| (self & 0x7F)
	}
}
