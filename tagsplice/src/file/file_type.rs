use crate::id3::synchsafe::SynchsafeInteger;

use std::ffi::OsStr;
use std::path::Path;

/// Every extension that maps to a [`FileType`]
pub const EXTENSIONS: &[&str] = &[
	// Also update `FileType::from_ext()` below
	"mp3", "mp2", "mp1", "flac", "ogg", "oga", "opus", "mp4", "m4a", "m4b", "m4p", "m4r", "m4v",
	"3gp",
];

/// The container formats tagsplice can rewrite
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum FileType {
	/// MPEG audio with an ID3v2 tag
	Mpeg,
	/// MP4 family (M4A, M4B, ...) with an `ilst` atom
	Mp4,
	/// FLAC metadata blocks
	Flac,
	/// Ogg Vorbis or Ogg Opus comment packets
	Ogg,
}

/// The codec carried in an Ogg stream
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum OggCodec {
	/// Vorbis, the comment packet starts with `\x03vorbis` and ends with a framing bit
	Vorbis,
	/// Opus, the comment packet starts with `OpusTags`
	Opus,
}

impl FileType {
	/// Attempts to determine a [`FileType`] from an extension
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	///
	/// let extension = "M4A";
	/// assert_eq!(FileType::from_ext(extension), Some(FileType::Mp4));
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		// Also update `EXTENSIONS` above
		match ext.as_str() {
			"mp3" | "mp2" | "mp1" => Some(Self::Mpeg),
			"flac" => Some(Self::Flac),
			"ogg" | "oga" | "opus" => Some(Self::Ogg),
			"mp4" | "m4a" | "m4b" | "m4p" | "m4r" | "m4v" | "3gp" => Some(Self::Mp4),
			_ => None,
		}
	}

	/// Attempts to extract a [`FileType`] from a path
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension();
		ext.and_then(Self::from_ext)
	}

	/// Attempts to extract a [`FileType`] from a buffer
	///
	/// NOTE: This makes no attempt to search past an ID3v2 tag, since only a fixed-size
	/// buffer is provided. A buffer starting with an ID3v2 tag is reported as [`FileType::Mpeg`].
	/// Use [`probe`](crate::probe) to look behind the tag.
	pub fn from_buffer(buf: &[u8]) -> Option<Self> {
		match Self::from_buffer_inner(buf) {
			Some(FileTypeGuessResult::Determined(file_ty)) => Some(file_ty),
			Some(FileTypeGuessResult::MaybePrecededById3(_)) => Some(Self::Mpeg),
			None => None,
		}
	}

	pub(crate) fn from_buffer_inner(buf: &[u8]) -> Option<FileTypeGuessResult> {
		if buf.is_empty() {
			return None;
		}

		if let Some(f_ty) = Self::quick_type_guess(buf) {
			return Some(FileTypeGuessResult::Determined(f_ty));
		}

		// The bare minimum size for an ID3v2 header is 10 bytes
		if buf.len() >= 10 && &buf[..3] == b"ID3" {
			let size = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]).unsynch();
			let footer = buf[5] & 0x10 == 0x10;

			// Header, content, and optional footer
			let full_size = 10 + size + if footer { 10 } else { 0 };
			return Some(FileTypeGuessResult::MaybePrecededById3(full_size));
		}

		None
	}

	fn quick_type_guess(buf: &[u8]) -> Option<Self> {
		match buf[0] {
			// MPEG frame sync, 11 set bits
			0xFF if buf.len() >= 2 && buf[1] & 0xE0 == 0xE0 => Some(Self::Mpeg),
			b'O' if buf.starts_with(b"OggS") => Some(Self::Ogg),
			b'f' if buf.starts_with(b"fLaC") => Some(Self::Flac),
			_ if buf.len() >= 8 && &buf[4..8] == b"ftyp" => Some(Self::Mp4),
			_ => None,
		}
	}
}

/// The result of a buffer guess
pub(crate) enum FileTypeGuessResult {
	/// The file type was determined
	Determined(FileType),
	/// The stream starts with an ID3v2 tag of the given full size, the real format follows it
	MaybePrecededById3(u32),
}
