//! Format-agnostic file parsing and writing

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{FileType, FileTypeGuessResult, TagCodec};
use crate::flac::FlacFile;
use crate::id3::MpegFile;
use crate::macros::err;
use crate::mp4::Mp4File;
use crate::ogg::OggFile;
use crate::tag::Tag;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A format agnostic reader
///
/// This provides a way to determine the [`FileType`] of a reader, for when a concrete
/// type is not known.
///
/// ## Usage
///
/// When reading from a path, the [`FileType`] will be inferred from the path, rather than the
/// open file.
///
/// ```rust,no_run
/// # fn main() -> tagsplice::error::Result<()> {
/// use tagsplice::file::FileType;
/// use tagsplice::probe::Probe;
///
/// let probe = Probe::open("path/to/my.flac")?;
///
/// // Inferred from the `flac` extension
/// assert_eq!(probe.file_type(), Some(FileType::Flac));
/// # Ok(())
/// # }
/// ```
///
/// When a path isn't available, or is unreliable, content-based detection is also possible.
///
/// ```rust
/// # fn main() -> tagsplice::error::Result<()> {
/// use tagsplice::file::FileType;
/// use tagsplice::probe::Probe;
/// use std::io::Cursor;
///
/// static OGG_CAPTURE_PATTERN: &[u8; 4] = b"OggS";
///
/// let probe = Probe::new(Cursor::new(OGG_CAPTURE_PATTERN)).guess_file_type()?;
///
/// // Inferred from the capture pattern
/// assert_eq!(probe.file_type(), Some(FileType::Ogg));
/// # Ok(())
/// # }
/// ```
pub struct Probe<R: Read> {
	inner: R,
	options: Option<ParseOptions>,
	f_ty: Option<FileType>,
}

impl<R: Read> Probe<R> {
	/// Create a new `Probe`
	///
	/// Before creating a `Probe`, consider wrapping it in a [`BufReader`] for better
	/// performance.
	#[must_use]
	pub const fn new(reader: R) -> Self {
		Self {
			inner: reader,
			options: None,
			f_ty: None,
		}
	}

	/// Create a new `Probe` with a specified [`FileType`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	/// use tagsplice::probe::Probe;
	/// use std::io::Cursor;
	///
	/// // We know the stream is FLAC, so we can skip the format detection
	/// let probe = Probe::with_file_type(Cursor::new(b"fLaC"), FileType::Flac);
	/// assert_eq!(probe.file_type(), Some(FileType::Flac));
	/// ```
	pub fn with_file_type(reader: R, file_type: FileType) -> Self {
		Self {
			inner: reader,
			options: None,
			f_ty: Some(file_type),
		}
	}

	/// Returns the current [`FileType`]
	pub fn file_type(&self) -> Option<FileType> {
		self.f_ty
	}

	/// Set the [`FileType`] with which to read the file
	pub fn set_file_type(mut self, file_type: FileType) -> Self {
		self.f_ty = Some(file_type);
		self
	}

	/// Set the [`ParseOptions`] for the Probe
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::ParseOptions;
	/// use tagsplice::probe::Probe;
	///
	/// # let reader = std::io::Cursor::new(&[]);
	/// // Cover art is read by default, skip it
	/// let options = ParseOptions::new().read_cover_art(false);
	///
	/// let probe = Probe::new(reader).options(options);
	/// ```
	#[must_use]
	pub fn options(mut self, options: ParseOptions) -> Self {
		self.options = Some(options);
		self
	}

	/// Extract the reader
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl Probe<BufReader<File>> {
	/// Opens a file for reading
	///
	/// This will initially guess the [`FileType`] from the path, but
	/// this can be overwritten with [`Probe::guess_file_type`] or [`Probe::set_file_type`]
	///
	/// # Errors
	///
	/// * `path` does not exist
	pub fn open<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		log::debug!("Probe: Opening `{}` for reading", path.display());

		let file_type = FileType::from_path(path);
		log::debug!("Probe: Guessed file type `{:?}` from extension", file_type);

		Ok(Self {
			inner: BufReader::new(File::open(path)?),
			options: None,
			f_ty: file_type,
		})
	}
}

impl<R: Read + Seek> Probe<R> {
	/// Attempts to get the [`FileType`] based on the data in the reader
	///
	/// On success, the file type will be replaced. If the content is not recognized, the
	/// current file type (from an extension, for example) is kept.
	///
	/// # Errors
	///
	/// All errors that occur within this function are [`std::io::Error`].
	/// If an error does occur, there is likely an issue with the provided
	/// reader, and the entire `Probe` should be discarded.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	/// use tagsplice::probe::Probe;
	/// use std::io::Cursor;
	///
	/// # fn main() -> tagsplice::error::Result<()> {
	/// // An ID3v2 tag with no frames, followed by a FLAC stream
	/// let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
	/// data.extend(b"fLaC");
	///
	/// let probe = Probe::new(Cursor::new(data)).guess_file_type()?;
	/// assert_eq!(probe.file_type(), Some(FileType::Flac));
	/// # Ok(()) }
	/// ```
	pub fn guess_file_type(mut self) -> std::io::Result<Self> {
		let f_ty = self.guess_inner()?;
		self.f_ty = f_ty.or(self.f_ty);

		log::debug!("Probe: Guessed file type: {:?}", self.f_ty);

		Ok(self)
	}

	fn guess_inner(&mut self) -> std::io::Result<Option<FileType>> {
		// 12 bytes covers every magic we know of (`ftyp` at offset 4, and the ID3v2 header)
		let mut buf = [0; 12];

		let starting_position = self.inner.stream_position()?;
		let buf_len = std::io::copy(
			&mut self.inner.by_ref().take(buf.len() as u64),
			&mut Cursor::new(&mut buf[..]),
		)? as usize;

		self.inner.seek(SeekFrom::Start(starting_position))?;

		let Some(file_type_guess) = FileType::from_buffer_inner(&buf[..buf_len]) else {
			return Ok(None);
		};

		match file_type_guess {
			FileTypeGuessResult::Determined(file_ty) => Ok(Some(file_ty)),
			// The file starts with an ID3v2 tag, this is either MPEG or FLAC
			FileTypeGuessResult::MaybePrecededById3(id3_len) => {
				log::debug!("Probe: ID3v2 tag detected, skipping {id3_len} bytes");
				self.inner
					.seek(SeekFrom::Start(starting_position + u64::from(id3_len)))?;

				let mut ident = [0; 4];
				let ident_len = std::io::copy(
					&mut self.inner.by_ref().take(ident.len() as u64),
					&mut Cursor::new(&mut ident[..]),
				)?;

				// before returning any result for a file type, seek back to the front
				self.inner.seek(SeekFrom::Start(starting_position))?;

				if ident_len == 4 && &ident == b"fLaC" {
					return Ok(Some(FileType::Flac));
				}

				Ok(Some(FileType::Mpeg))
			},
		}
	}

	/// Attempts to read a [`Tag`] from the reader
	///
	/// # Errors
	///
	/// * No file type
	///     - This expects the file type to have been set already, either with
	///       [`Probe::guess_file_type`] or [`Probe::set_file_type`]. When reading from
	///       paths, this is not necessary.
	/// * The reader contains invalid data
	pub fn read(mut self) -> Result<Tag> {
		let reader = &mut self.inner;
		let options = self.options.unwrap_or_default();

		match self.f_ty {
			Some(FileType::Mpeg) => MpegFile::read_from(reader, options),
			Some(FileType::Mp4) => Mp4File::read_from(reader, options),
			Some(FileType::Flac) => FlacFile::read_from(reader, options),
			Some(FileType::Ogg) => OggFile::read_from(reader, options),
			None => err!(UnknownFormat),
		}
	}

	/// Write the reader's content, with its tag replaced by `tag`, to `writer`
	///
	/// # Errors
	///
	/// * No file type, see [`Probe::read`]
	/// * The reader contains invalid data
	/// * `tag` holds values that can't be encoded in this format
	pub fn write_to<W>(
		mut self,
		tag: &Tag,
		writer: &mut W,
		write_options: WriteOptions,
	) -> Result<()>
	where
		W: Write,
	{
		let original = &mut self.inner;

		if self.f_ty.is_some_and(|f_ty| f_ty != tag.file_type()) {
			log::debug!(
				"Probe: Writing a tag read from {:?} to a {:?} file",
				tag.file_type(),
				self.f_ty
			);
		}

		match self.f_ty {
			Some(FileType::Mpeg) => MpegFile::write_to(original, tag, writer, write_options),
			Some(FileType::Mp4) => Mp4File::write_to(original, tag, writer, write_options),
			Some(FileType::Flac) => FlacFile::write_to(original, tag, writer, write_options),
			Some(FileType::Ogg) => OggFile::write_to(original, tag, writer, write_options),
			None => err!(UnknownFormat),
		}
	}
}

/// Read a [`Tag`] from a [File]
///
/// # Errors
///
/// See:
///
/// * [`Probe::guess_file_type`]
/// * [`Probe::read`]
pub fn read_from(file: &mut File) -> Result<Tag> {
	Probe::new(BufReader::new(file)).guess_file_type()?.read()
}

/// Read a [`Tag`] from a path
///
/// The [`FileType`] is guessed from the content, falling back to the extension.
///
/// # Errors
///
/// See:
///
/// * [`Probe::open`]
/// * [`Probe::read`]
pub fn read_from_path<P>(path: P) -> Result<Tag>
where
	P: AsRef<Path>,
{
	Probe::open(path)?.guess_file_type()?.read()
}
