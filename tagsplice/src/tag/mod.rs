//! The format-agnostic tag record
//!
//! A [`Tag`] is produced by parsing any supported file, mutated by the caller, and handed back
//! to the matching engine alongside the original stream to produce the rewritten file.
//!
//! # Empty values
//!
//! An unset field and a field set to the empty string are the same thing. Getters return `""`
//! for both, and setting a field to `""` removes it, so the next write deletes it from the file.

mod field;

pub use field::Field;

use crate::file::{FileType, OggCodec};
use crate::picture::Picture;

use std::collections::BTreeMap;

/// A format-agnostic set of tag fields
///
/// This holds:
///
/// * The fixed [`Field`]s
/// * A single optional cover [`Picture`]
/// * A passthrough map of uppercase keys to values, which only Ogg Vorbis/Opus round-trips
/// * The [`FileType`] (and [`OggCodec`]) the tag was read from, which never change after parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
	file_type: FileType,
	ogg_codec: Option<OggCodec>,
	vendor: Option<String>,
	fields: BTreeMap<Field, String>,
	passthrough: BTreeMap<String, String>,
	picture: Option<Picture>,
}

impl Tag {
	/// Create an empty `Tag` bound to a [`FileType`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	/// use tagsplice::tag::Tag;
	///
	/// let tag = Tag::new(FileType::Flac);
	/// assert!(tag.is_empty());
	/// ```
	pub fn new(file_type: FileType) -> Self {
		Self {
			file_type,
			ogg_codec: None,
			vendor: None,
			fields: BTreeMap::new(),
			passthrough: BTreeMap::new(),
			picture: None,
		}
	}

	pub(crate) fn new_ogg(codec: OggCodec) -> Self {
		let mut tag = Self::new(FileType::Ogg);
		tag.ogg_codec = Some(codec);
		tag
	}

	/// The [`FileType`] this tag was read from
	pub fn file_type(&self) -> FileType {
		self.file_type
	}

	/// The codec of the Ogg stream this tag was read from
	///
	/// This is `None` for every other [`FileType`].
	pub fn ogg_codec(&self) -> Option<OggCodec> {
		self.ogg_codec
	}

	/// The vendor string of a Vorbis comment block, if one was read
	///
	/// Writing always replaces it with tagsplice's own vendor string.
	pub fn vendor(&self) -> Option<&str> {
		self.vendor.as_deref()
	}

	pub(crate) fn set_vendor(&mut self, vendor: String) {
		self.vendor = Some(vendor);
	}

	/// Get a field, returning an empty string if it is unset
	pub fn get(&self, field: Field) -> &str {
		self.fields.get(&field).map_or("", String::as_str)
	}

	/// Set a field
	///
	/// An empty `value` removes the field.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	/// use tagsplice::tag::{Field, Tag};
	///
	/// let mut tag = Tag::new(FileType::Mpeg);
	///
	/// tag.set(Field::Title, "Foo title");
	/// assert_eq!(tag.get(Field::Title), "Foo title");
	///
	/// tag.set(Field::Title, "");
	/// assert!(tag.is_empty());
	/// ```
	pub fn set(&mut self, field: Field, value: impl Into<String>) {
		let value = value.into();
		if value.is_empty() {
			self.fields.remove(&field);
			return;
		}

		self.fields.insert(field, value);
	}

	/// Remove a field, returning its previous value
	pub fn remove(&mut self, field: Field) -> Option<String> {
		self.fields.remove(&field)
	}

	/// Returns an iterator over the set fields, in [`Field::ALL`] order
	pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
		self.fields.iter().map(|(field, value)| (*field, value.as_str()))
	}

	/// Returns the cover picture, if one is set
	pub fn picture(&self) -> Option<&Picture> {
		self.picture.as_ref()
	}

	/// Set the cover picture, replacing any existing one
	pub fn set_picture(&mut self, picture: Picture) {
		self.picture = Some(picture);
	}

	/// Remove the cover picture, returning it
	pub fn remove_picture(&mut self) -> Option<Picture> {
		self.picture.take()
	}

	/// Returns the passthrough map
	///
	/// This holds every Vorbis comment that doesn't map to a [`Field`]. It is only written
	/// back to Ogg files.
	pub fn passthrough(&self) -> &BTreeMap<String, String> {
		&self.passthrough
	}

	/// Get a passthrough value, the key is matched case-insensitively
	pub fn get_passthrough(&self, key: &str) -> Option<&str> {
		self.passthrough
			.get(&key.to_ascii_uppercase())
			.map(String::as_str)
	}

	/// Insert a passthrough value, replacing any value with the same key
	///
	/// The key is normalized to uppercase. Returns the previous value.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::file::FileType;
	/// use tagsplice::tag::Tag;
	///
	/// let mut tag = Tag::new(FileType::Ogg);
	///
	/// tag.insert_passthrough("mood", "Calm");
	/// tag.insert_passthrough("MOOD", "Upbeat");
	///
	/// assert_eq!(tag.passthrough().len(), 1);
	/// assert_eq!(tag.get_passthrough("Mood"), Some("Upbeat"));
	/// ```
	pub fn insert_passthrough(
		&mut self,
		key: impl AsRef<str>,
		value: impl Into<String>,
	) -> Option<String> {
		self.passthrough
			.insert(key.as_ref().to_ascii_uppercase(), value.into())
	}

	/// Remove a passthrough value, the key is matched case-insensitively
	pub fn remove_passthrough(&mut self, key: &str) -> Option<String> {
		self.passthrough.remove(&key.to_ascii_uppercase())
	}

	/// Remove every field, the picture, and the passthrough map
	///
	/// The [`FileType`] and [`OggCodec`] are kept.
	pub fn clear(&mut self) {
		self.fields.clear();
		self.passthrough.clear();
		self.picture = None;
	}

	/// Whether the tag has no fields, picture, or passthrough values
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.passthrough.is_empty() && self.picture.is_none()
	}
}
