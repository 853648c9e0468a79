//! Format-agnostic picture handling

use crate::error::{ErrorKind, Result, TagspliceError};
use crate::macros::err;
use crate::util::io::{ReadExt, WriteExt};

use std::fmt::{Debug, Display, Formatter};

use byteorder::{BigEndian, ReadBytesExt};
use data_encoding::BASE64;

/// The APIC/FLAC picture type for a front cover
pub const FRONT_COVER: u8 = 3;

/// The description written alongside every embedded cover
pub(crate) const COVER_DESCRIPTION: &str = "Front cover";

/// MIME types for pictures.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MimeType {
	/// PNG image
	Png,
	/// JPEG image
	Jpeg,
	/// Some other MIME type, these can be read but not written
	Unknown(String),
}

impl MimeType {
	/// Get a `MimeType` from a string
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::picture::MimeType;
	///
	/// let jpeg_mimetype_str = "image/jpeg";
	/// assert_eq!(MimeType::from_str(jpeg_mimetype_str), MimeType::Jpeg);
	/// ```
	#[must_use]
	#[allow(clippy::should_implement_trait)] // Infallible in contrast to FromStr
	pub fn from_str(mime_type: &str) -> Self {
		match &*mime_type.to_lowercase() {
			"image/jpeg" | "image/jpg" => Self::Jpeg,
			"image/png" => Self::Png,
			_ => Self::Unknown(mime_type.to_owned()),
		}
	}

	/// Get a &str from a `MimeType`
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			MimeType::Jpeg => "image/jpeg",
			MimeType::Png => "image/png",
			MimeType::Unknown(unknown) => unknown,
		}
	}

	/// Guess the `MimeType` from the image's magic signature
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::picture::MimeType;
	///
	/// assert_eq!(MimeType::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MimeType::Jpeg));
	/// assert_eq!(MimeType::sniff(b"GIF89a"), None);
	/// ```
	pub fn sniff(data: &[u8]) -> Option<Self> {
		match data {
			[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(MimeType::Png),
			[0xFF, 0xD8, 0xFF, ..] => Some(MimeType::Jpeg),
			_ => None,
		}
	}
}

impl Display for MimeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Information about a [`Picture`]
///
/// This information is necessary for FLAC's `METADATA_BLOCK_PICTURE`.
/// See [`Picture::as_flac_bytes`] for more information.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PictureInformation {
	/// The picture's width in pixels
	pub width: u32,
	/// The picture's height in pixels
	pub height: u32,
	/// The picture's color depth in bits per pixel
	pub color_depth: u32,
	/// The number of colors used
	pub num_colors: u32,
}

impl PictureInformation {
	/// Color depth stored for every embedded JPEG
	pub const JPEG_COLOR_DEPTH: u32 = 24;
	/// Color depth stored for every embedded PNG
	pub const PNG_COLOR_DEPTH: u32 = 32;

	/// Extract the [`PictureInformation`] to embed a [`Picture`] in a FLAC picture block
	///
	/// The dimensions (and palette size for indexed PNGs) are read from the image's own header.
	/// The color depth is fixed per format: [`Self::JPEG_COLOR_DEPTH`] or [`Self::PNG_COLOR_DEPTH`].
	///
	/// # Errors
	///
	/// * The picture is neither a JPEG nor a PNG ([`ErrorKind::UnsupportedMime`])
	/// * The dimensions can't be read ([`ErrorKind::NotAPicture`])
	pub fn from_picture(picture: &Picture) -> Result<Self> {
		match picture.mime_type() {
			MimeType::Jpeg => Ok(Self {
				color_depth: Self::JPEG_COLOR_DEPTH,
				..Self::from_jpeg(picture.data())?
			}),
			MimeType::Png => Ok(Self {
				color_depth: Self::PNG_COLOR_DEPTH,
				..Self::from_png(picture.data())?
			}),
			MimeType::Unknown(mime) => err!(UnsupportedMime(mime.clone())),
		}
	}

	/// Attempt to extract [`PictureInformation`] from a PNG
	///
	/// # Errors
	///
	/// * `data` is not a valid PNG
	pub fn from_png(data: &[u8]) -> Result<Self> {
		Self::probe_png(data).ok_or_else(|| TagspliceError::new(ErrorKind::NotAPicture))
	}

	fn probe_png(data: &[u8]) -> Option<Self> {
		let reader = &mut &*data;

		let mut sig = [0; 8];
		std::io::Read::read_exact(reader, &mut sig).ok()?;

		if sig != [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
			return None;
		}

		// The signature is immediately followed by the IHDR chunk
		let _ihdr_len = reader.read_u32::<BigEndian>().ok()?;
		if reader.get(..4)? != b"IHDR" {
			return None;
		}
		*reader = &reader[4..];

		let width = reader.read_u32::<BigEndian>().ok()?;
		let height = reader.read_u32::<BigEndian>().ok()?;
		let mut color_depth = u32::from(reader.read_u8().ok()?);
		let color_type = reader.read_u8().ok()?;

		match color_type {
			2 => color_depth *= 3,
			4 | 6 => color_depth *= 4,
			_ => {},
		}

		let mut ret = Self {
			width,
			height,
			color_depth,
			num_colors: 0,
		};

		// The color type 3 (indexed-color) means there should be
		// a "PLTE" chunk, whose data can be used in the `num_colors`
		// field. It isn't really applicable to other color types.
		if color_type != 3 {
			return Some(ret);
		}

		// Compression method (1), filter method (1), interlace method (1), CRC (4)
		*reader = reader.get(7..)?;

		while let Ok(size) = reader.read_u32::<BigEndian>() {
			let Some(chunk_type) = reader.get(..4) else {
				break;
			};

			if chunk_type == b"PLTE" {
				// The PLTE chunk contains 1-256 3-byte entries
				ret.num_colors = size / 3;
				break;
			}

			// Skip the chunk's type (4), data (size), and CRC (4 bytes)
			let Some(skip) = (size as usize).checked_add(8) else {
				break;
			};
			let Some(rest) = reader.get(skip..) else {
				break;
			};
			*reader = rest;
		}

		Some(ret)
	}

	/// Attempt to extract [`PictureInformation`] from a JPEG
	///
	/// # Errors
	///
	/// * `data` is not a JPEG image
	/// * `data` does not contain a `SOFn` frame
	pub fn from_jpeg(data: &[u8]) -> Result<Self> {
		Self::probe_jpeg(data).ok_or_else(|| TagspliceError::new(ErrorKind::NotAPicture))
	}

	fn probe_jpeg(data: &[u8]) -> Option<Self> {
		if !data.starts_with(&[0xFF, 0xD8]) {
			return None;
		}

		let reader = &mut &data[2..];
		while let Ok(0xFF) = reader.read_u8() {
			let marker = reader.read_u8().ok()?;

			// Fill bytes
			if marker == 0xFF {
				*reader = &data[data.len() - reader.len() - 1..];
				continue;
			}

			let section_len = reader.read_u16::<BigEndian>().ok()?;

			// This marks the SOS (Start of Scan), which is
			// the end of the header
			if marker == 0xDA {
				break;
			}

			// We are looking for a frame with a "SOFn" marker,
			// with `n` either being 0 or 2. Since there isn't a
			// header like PNG, we actually need to search for this
			// frame
			if marker == 0xC0 || marker == 0xC2 {
				let precision = reader.read_u8().ok()?;
				let height = u32::from(reader.read_u16::<BigEndian>().ok()?);
				let width = u32::from(reader.read_u16::<BigEndian>().ok()?);
				let components = reader.read_u8().ok()?;

				return Some(Self {
					width,
					height,
					color_depth: u32::from(precision) * u32::from(components),
					num_colors: 0,
				});
			}

			// The length contains itself, so anything < 2 is invalid
			let content_len = section_len.checked_sub(2)?;
			*reader = reader.get(usize::from(content_len)..)?;
		}

		None
	}
}

/// A cover picture
///
/// This is an opaque encoded image, it is never decoded or re-encoded.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Picture {
	mime_type: MimeType,
	data: Vec<u8>,
}

impl Debug for Picture {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Picture")
			.field("mime_type", &self.mime_type)
			.field("data", &format!("<{} bytes>", self.data.len()))
			.finish()
	}
}

impl Picture {
	/// Create a new `Picture`
	pub fn new(mime_type: MimeType, data: Vec<u8>) -> Self {
		Self { mime_type, data }
	}

	/// Create a new `Picture`, guessing the [`MimeType`] from the data
	///
	/// # Errors
	///
	/// `data` is neither a JPEG nor a PNG
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::picture::{MimeType, Picture};
	///
	/// # fn main() -> tagsplice::error::Result<()> {
	/// let picture = Picture::from_data(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0])?;
	/// assert_eq!(picture.mime_type(), &MimeType::Jpeg);
	/// # Ok(()) }
	/// ```
	pub fn from_data(data: Vec<u8>) -> Result<Self> {
		let Some(mime_type) = MimeType::sniff(&data) else {
			err!(NotAPicture);
		};

		Ok(Self { mime_type, data })
	}

	/// Returns the [`MimeType`]
	pub fn mime_type(&self) -> &MimeType {
		&self.mime_type
	}

	/// Returns the picture data
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Consumes a [`Picture`], returning the data as [`Vec`] without clones or allocation.
	pub fn into_data(self) -> Vec<u8> {
		self.data
	}

	/// Convert a [`Picture`] to FLAC `METADATA_BLOCK_PICTURE` bytes
	///
	/// The picture is always written as a front cover. Use `encode` to base64 encode the
	/// block, as required by Vorbis comments.
	///
	/// NOTE: This does not include a key (Vorbis comments) or METADATA_BLOCK_HEADER (FLAC blocks)
	///
	/// # Errors
	///
	/// The picture data is larger than 4 GiB
	pub fn as_flac_bytes(
		&self,
		picture_information: PictureInformation,
		encode: bool,
	) -> Result<Vec<u8>> {
		let mut data = Vec::<u8>::new();

		data.extend(u32::from(FRONT_COVER).to_be_bytes());
		data.write_len_prefixed::<BigEndian>(self.mime_type.as_str().as_bytes())?;
		data.write_len_prefixed::<BigEndian>(COVER_DESCRIPTION.as_bytes())?;

		data.extend(picture_information.width.to_be_bytes());
		data.extend(picture_information.height.to_be_bytes());
		data.extend(picture_information.color_depth.to_be_bytes());
		data.extend(picture_information.num_colors.to_be_bytes());

		data.write_len_prefixed::<BigEndian>(&self.data)?;

		if encode {
			return Ok(BASE64.encode(&data).into_bytes());
		}

		Ok(data)
	}

	/// Get a [`Picture`] from FLAC `METADATA_BLOCK_PICTURE` bytes
	///
	/// This takes both the base64 encoded string from Vorbis comments, and
	/// the raw data from a FLAC block, specified with `encoded`. The picture type
	/// is returned alongside the picture.
	///
	/// # Errors
	///
	/// * The base64 encoding is invalid ([`ErrorKind::NotAPicture`])
	/// * The block is truncated ([`ErrorKind::TruncatedInput`])
	/// * The MIME type or description isn't valid UTF-8
	pub fn from_flac_bytes(bytes: &[u8], encoded: bool) -> Result<(Self, u32)> {
		if encoded {
			let data = BASE64
				.decode(bytes)
				.map_err(|_| TagspliceError::new(ErrorKind::NotAPicture))?;
			return Self::from_flac_bytes_inner(&data);
		}

		Self::from_flac_bytes_inner(bytes)
	}

	fn from_flac_bytes_inner(content: &[u8]) -> Result<(Self, u32)> {
		let reader = &mut &*content;

		let Ok(pic_ty) = reader.read_u32::<BigEndian>() else {
			err!(TruncatedInput);
		};

		let mime_type = reader.read_string_prefixed::<BigEndian>()?;
		let _description = reader.read_len_prefixed::<BigEndian>()?;

		// Width, height, color depth, and number of colors are recomputed on write
		if reader.len() < 16 {
			err!(TruncatedInput);
		}
		*reader = &reader[16..];

		let data = reader.read_len_prefixed::<BigEndian>()?;

		let mime_type = if mime_type.is_empty() {
			MimeType::sniff(&data).unwrap_or(MimeType::Unknown(mime_type))
		} else {
			MimeType::from_str(&mime_type)
		};

		Ok((Self { mime_type, data }, pic_ty))
	}
}
