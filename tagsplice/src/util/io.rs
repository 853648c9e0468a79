//! Various traits for reading and writing to file-like objects

use crate::config::global_options;
use crate::error::{Result, TagspliceError};
use crate::macros::err;
use crate::util::alloc::VecFallibleCapacity;

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

// TODO: https://github.com/rust-lang/rust/issues/59359
pub(crate) trait SeekStreamLen: Seek {
	fn stream_len_hack(&mut self) -> Result<u64> {
		use std::io::SeekFrom;

		let current_pos = self.stream_position()?;
		let len = self.seek(SeekFrom::End(0))?;

		self.seek(SeekFrom::Start(current_pos))?;

		Ok(len)
	}
}

impl<T> SeekStreamLen for T where T: Seek {}

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to any
/// file saving methods such as [`save_to`](crate::save::save_to).
///
/// Take great care in implementing this for downstream types, as tagsplice will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
///
/// # Examples
///
/// ```rust
/// use tagsplice::io::Truncate;
///
/// let mut data = vec![1, 2, 3, 4, 5];
/// data.truncate(3);
///
/// assert_eq!(data, vec![1, 2, 3]);
/// ```
pub trait Truncate {
	/// The error type of the truncation operation
	type Error: Into<TagspliceError>;

	/// Truncate a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being truncated, which may not always be fallible.
	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error>;
}

impl Truncate for File {
	type Error = std::io::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.set_len(new_len)
	}
}

impl Truncate for Vec<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for Cursor<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.get_mut().truncate(new_len)
	}
}

impl<T> Truncate for Box<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.as_mut().truncate(new_len)
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		(**self).truncate(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to any
/// file saving methods such as [`save_to`](crate::save::save_to).
///
/// Take great care in implementing this for downstream types, as tagsplice will assume that the
/// container has the exact length specified. If this assumption were to be broken, files **may** become corrupted.
///
/// # Examples
///
/// ```rust
/// use tagsplice::io::Length;
///
/// let data = vec![1, 2, 3, 4, 5];
/// assert_eq!(data.len(), 5);
/// ```
pub trait Length {
	/// The error type of the length operation
	type Error: Into<TagspliceError>;

	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::result::Result<u64, Self::Error>;
}

impl Length for File {
	type Error = std::io::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for Box<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.as_ref())
	}
}

impl<T> Length for &T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

impl<T> Length for &mut T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Truncate`], and [`Length`] traits.
/// It is used to provide implementors access to any file saving methods such as [`save_to`](crate::save::save_to).
///
/// Take great care in implementing this for downstream types, as tagsplice will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Truncate + Length
where
	<Self as Truncate>::Error: Into<TagspliceError>,
	<Self as Length>::Error: Into<TagspliceError>,
{
}

impl<T> FileLike for T
where
	T: Read + Write + Seek + Truncate + Length,
	<T as Truncate>::Error: Into<TagspliceError>,
	<T as Length>::Error: Into<TagspliceError>,
{
}

pub(crate) trait ReadExt: Read {
	/// Read exactly `len` bytes of untrusted length
	///
	/// Lengths up to the allocation limit are allocated up front. Anything larger is read
	/// incrementally, so the allocation only grows with the data actually present.
	fn read_bounded(&mut self, len: u64) -> Result<Vec<u8>>;

	/// Read a string prefixed with a 32-bit length in the byte order `B`
	fn read_len_prefixed<B: ByteOrder>(&mut self) -> Result<Vec<u8>>;

	/// Read a UTF-8 string prefixed with a 32-bit length in the byte order `B`
	fn read_string_prefixed<B: ByteOrder>(&mut self) -> Result<String> {
		let bytes = self.read_len_prefixed::<B>()?;
		Ok(String::from_utf8(bytes)?)
	}
}

impl<R> ReadExt for R
where
	R: Read,
{
	fn read_bounded(&mut self, len: u64) -> Result<Vec<u8>> {
		let limit = global_options().allocation_limit as u64;

		let mut content = if len <= limit {
			Vec::try_with_capacity_stable(len as usize)?
		} else {
			log::trace!("Declared length {len} exceeds the allocation limit, reading incrementally");
			Vec::new()
		};

		let read = self.by_ref().take(len).read_to_end(&mut content)?;
		if read as u64 != len {
			log::debug!("Expected {len} bytes, only {read} were available");
			err!(TruncatedInput);
		}

		Ok(content)
	}

	fn read_len_prefixed<B: ByteOrder>(&mut self) -> Result<Vec<u8>> {
		let len = match self.read_u32::<B>() {
			Ok(len) => len,
			Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => err!(TruncatedInput),
			Err(e) => return Err(e.into()),
		};

		self.read_bounded(u64::from(len))
	}
}

pub(crate) trait WriteExt: Write {
	/// Write `bytes` prefixed with their 32-bit length in the byte order `B`
	fn write_len_prefixed<B: ByteOrder>(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<W> WriteExt for W
where
	W: Write,
{
	fn write_len_prefixed<B: ByteOrder>(&mut self, bytes: &[u8]) -> Result<()> {
		let Ok(len) = u32::try_from(bytes.len()) else {
			err!(TooMuchData);
		};

		self.write_u32::<B>(len)?;
		self.write_all(bytes)?;

		Ok(())
	}
}
