/// Options to control how tagsplice writes to a file
///
/// Only the MPEG and FLAC engines read these, MP4 and Ogg rewrites ignore them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preferred_padding: Option<u32>,
	pub(crate) use_id3v23: bool,
}

impl WriteOptions {
	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preferred_padding: None,
			use_id3v23: false,
		}
	}

	/// Set the preferred padding size in bytes
	///
	/// ID3v2 tags are followed by this many zero bytes. FLAC files without a `PADDING` block
	/// get one of this size, placed ahead of the comment block. A value of `0` disables padding.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::WriteOptions;
	///
	/// // Leave some room for future edits
	/// let options = WriteOptions::new().preferred_padding(1024);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.preferred_padding = None,
			_ => self.preferred_padding = Some(preferred_padding),
		}
		self
	}

	/// Whether to write ID3v2.3 tags instead of ID3v2.4
	///
	/// ID3v2.3 tags are written with UTF-16 text, ID3v2.4 tags with UTF-8.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::WriteOptions;
	///
	/// // My old car stereo only understands ID3v2.3
	/// let options = WriteOptions::new().use_id3v23(true);
	/// ```
	pub fn use_id3v23(mut self, use_id3v23: bool) -> Self {
		self.use_id3v23 = use_id3v23;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	preferred_padding: None,
	/// 	use_id3v23: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
