//! Errors produced while reading or rewriting a tag
//!
//! Every fallible operation returns a [`TagspliceError`], which wraps an [`ErrorKind`].

use crate::file::FileType;
use crate::tag::Field;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

use tagsplice_ogg::PageError;

/// Alias for `Result<T, TagspliceError>`
pub type Result<T> = std::result::Result<T, TagspliceError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// File format related errors
	/// No engine is available for the file's extension or content
	UnknownFormat,
	/// An Ogg stream carries neither Vorbis nor Opus
	UnsupportedCodec,

	// File data related errors
	/// Fewer bytes were available than a length field announced
	TruncatedInput,
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Errors that occur while decoding a file
	FileDecoding(FileDecodingError),
	/// Errors that occur while encoding a file
	FileEncoding(FileEncodingError),

	// Picture related errors
	/// The dimensions of a picture could not be read from its header
	NotAPicture,
	/// Attempted to embed a picture with a MIME type other than JPEG or PNG
	UnsupportedMime(String),

	// Tag related errors
	/// A block handed to the Vorbis comment decoder was not a Vorbis comment
	NotVorbisComment,
	/// A Vorbis comment key contains `=` or bytes outside of printable ASCII
	InvalidFieldName(String),
	/// A field value cannot be represented in the target format (ex. non-numeric MP4 tempo)
	InvalidFieldValue(Field, String),
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while reading ID3v2 tags
	Id3v2(Id3v2Error),

	/// Arises when an atom contains invalid data
	BadAtom(&'static str),

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(PageError),
	/// Unable to convert bytes to a String
	StringFromUtf8(std::string::FromUtf8Error),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
}

/// The types of errors that can occur while reading ID3v2 tags
#[derive(Debug)]
#[non_exhaustive]
pub enum Id3v2ErrorKind {
	/// Arises when an invalid ID3v2 version is found
	BadId3v2Version(u8, u8),
	/// Arises when a compressed ID3v2.2 tag is encountered
	///
	/// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
	/// As such, the tag is rejected.
	V2Compression,
	/// Arises when an extended header has an invalid size
	BadExtendedHeaderSize,
	/// Arises when a frame header announces more data than the tag holds
	BadFrameLength,
	#[cfg(feature = "id3v2_compression_support")]
	/// Arises when a compressed frame is unable to be decompressed
	Decompression(std::io::Error),
	#[cfg(not(feature = "id3v2_compression_support"))]
	/// Arises when a compressed frame is encountered, but support is disabled
	CompressedFrameEncountered,
}

impl Display for Id3v2ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::BadId3v2Version(major, minor) => write!(
				f,
				"Found an invalid version (v{major}.{minor}), expected any major revision in: (2, \
				 3, 4)"
			),
			Self::V2Compression => write!(f, "Encountered a compressed ID3v2.2 tag"),
			Self::BadExtendedHeaderSize => {
				write!(f, "Found an extended header with an invalid size")
			},
			Self::BadFrameLength => write!(
				f,
				"Frame isn't long enough to extract the necessary information"
			),
			#[cfg(feature = "id3v2_compression_support")]
			Self::Decompression(err) => write!(f, "Failed to decompress frame: {err}"),
			#[cfg(not(feature = "id3v2_compression_support"))]
			Self::CompressedFrameEncountered => write!(
				f,
				"Encountered a compressed ID3v2 frame, support is disabled"
			),
		}
	}
}

/// An error that arises while reading an ID3v2 tag
pub struct Id3v2Error {
	kind: Id3v2ErrorKind,
}

impl Id3v2Error {
	/// Create a new `Id3v2Error` from an [`Id3v2ErrorKind`]
	#[must_use]
	pub const fn new(kind: Id3v2ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`Id3v2ErrorKind`]
	pub fn kind(&self) -> &Id3v2ErrorKind {
		&self.kind
	}
}

impl Debug for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {:?}", self.kind)
	}
}

impl Display for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {}", self.kind)
	}
}

/// An error that arises while decoding a file
pub struct FileDecodingError {
	format: Option<FileType>,
	description: &'static str,
}

impl FileDecodingError {
	/// Create a `FileDecodingError` from a [`FileType`] and description
	#[must_use]
	pub const fn new(format: FileType, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileDecodingError` without binding it to a [`FileType`]
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`FileType`], if one exists
	pub fn format(&self) -> Option<FileType> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {:?}", format, self.description)
		} else {
			write!(f, "{:?}", self.description)
		}
	}
}

impl Display for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {}", format, self.description)
		} else {
			write!(f, "{}", self.description)
		}
	}
}

/// An error that arises while encoding a file
///
/// Unlike [`FileDecodingError`], these always belong to the engine that was writing.
pub struct FileEncodingError {
	format: FileType,
	description: &'static str,
}

impl FileEncodingError {
	/// Create a `FileEncodingError` from a [`FileType`] and description
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::error::FileEncodingError;
	/// use tagsplice::file::FileType;
	///
	/// let err = FileEncodingError::new(FileType::Mp4, "Chunk offset out of range after update");
	/// assert_eq!(err.format(), FileType::Mp4);
	/// ```
	#[must_use]
	pub const fn new(format: FileType, description: &'static str) -> Self {
		Self {
			format,
			description,
		}
	}

	/// Returns the [`FileType`] being written
	pub fn format(&self) -> FileType {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {:?}", self.format, self.description)
	}
}

impl Display for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {}", self.format, self.description)
	}
}

/// Errors that could occur within tagsplice
pub struct TagspliceError {
	pub(crate) kind: ErrorKind,
}

impl TagspliceError {
	/// Create a `TagspliceError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::error::{ErrorKind, TagspliceError};
	///
	/// let unknown_format = TagspliceError::new(ErrorKind::UnknownFormat);
	/// assert!(matches!(unknown_format.kind(), ErrorKind::UnknownFormat));
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for TagspliceError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::OggPage(ref err) => Some(err),
			ErrorKind::StringFromUtf8(ref err) => Some(err),
			ErrorKind::Io(ref err) => Some(err),
			ErrorKind::Alloc(ref err) => Some(err),
			_ => None,
		}
	}
}

impl Debug for TagspliceError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<Id3v2Error> for TagspliceError {
	fn from(input: Id3v2Error) -> Self {
		Self {
			kind: ErrorKind::Id3v2(input),
		}
	}
}

impl From<FileDecodingError> for TagspliceError {
	fn from(input: FileDecodingError) -> Self {
		Self {
			kind: ErrorKind::FileDecoding(input),
		}
	}
}

impl From<FileEncodingError> for TagspliceError {
	fn from(input: FileEncodingError) -> Self {
		Self {
			kind: ErrorKind::FileEncoding(input),
		}
	}
}

impl From<PageError> for TagspliceError {
	fn from(input: PageError) -> Self {
		// Keep I/O errors untouched, no matter which layer hit them
		match input {
			PageError::Io(err) => Self {
				kind: ErrorKind::Io(err),
			},
			other => Self {
				kind: ErrorKind::OggPage(other),
			},
		}
	}
}

impl From<std::io::Error> for TagspliceError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<std::string::FromUtf8Error> for TagspliceError {
	fn from(input: std::string::FromUtf8Error) -> Self {
		Self {
			kind: ErrorKind::StringFromUtf8(input),
		}
	}
}

impl From<TryReserveError> for TagspliceError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

// `Vec<u8>` and friends can't fail to report their length or truncate
impl From<std::convert::Infallible> for TagspliceError {
	fn from(input: std::convert::Infallible) -> Self {
		match input {}
	}
}

impl Display for TagspliceError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::StringFromUtf8(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::UnknownFormat => write!(f, "No method available for this file"),
			ErrorKind::UnsupportedCodec => write!(
				f,
				"Ogg: Stream does not contain a Vorbis or Opus comment header"
			),
			ErrorKind::TruncatedInput => write!(
				f,
				"Reading: Fewer bytes are available than the stream declared"
			),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::FileDecoding(ref file_decode_err) => write!(f, "{file_decode_err}"),
			ErrorKind::FileEncoding(ref file_encode_err) => write!(f, "{file_encode_err}"),
			ErrorKind::NotAPicture => {
				write!(f, "Picture: Unable to read the image dimensions")
			},
			ErrorKind::UnsupportedMime(ref mime) => {
				write!(f, "Picture: Unsupported MIME type \"{mime}\"")
			},
			ErrorKind::NotVorbisComment => {
				write!(f, "Vorbis comments: Block is not a Vorbis comment")
			},
			ErrorKind::InvalidFieldName(ref key) => {
				write!(f, "Invalid field name \"{key}\"")
			},
			ErrorKind::InvalidFieldValue(field, ref value) => {
				write!(f, "Invalid value for {field}: \"{value}\"")
			},
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::Id3v2(ref id3v2_err) => write!(f, "{id3v2_err}"),
			ErrorKind::BadAtom(message) => write!(f, "MP4 Atom: {message}"),
		}
	}
}
