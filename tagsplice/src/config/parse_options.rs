/// Options to control how tagsplice parses a file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) verify_ogg_crc: bool,
	pub(crate) read_cover_art: bool,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	verify_ogg_crc: false,
	/// 	read_cover_art: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	#[must_use]
	pub const fn new() -> Self {
		Self {
			verify_ogg_crc: false,
			read_cover_art: true,
		}
	}

	/// Whether or not to verify the checksum of every Ogg page that is read
	///
	/// Some historical encoders wrote bad checksums, so this is disabled by default.
	/// A mismatch fails the parse with [`PageError::ChecksumMismatch`](tagsplice_ogg::PageError::ChecksumMismatch).
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new().verify_ogg_crc(true);
	/// ```
	pub fn verify_ogg_crc(&mut self, verify_ogg_crc: bool) -> Self {
		self.verify_ogg_crc = verify_ogg_crc;
		*self
	}

	/// Whether or not to read the cover art
	///
	/// When disabled, cover art is skipped over instead of being loaded into the [`Tag`](crate::tag::Tag).
	/// Writing a tag read this way drops the file's cover art.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::config::ParseOptions;
	///
	/// // I only want to list titles
	/// let parsing_options = ParseOptions::new().read_cover_art(false);
	/// ```
	pub fn read_cover_art(&mut self, read_cover_art: bool) -> Self {
		self.read_cover_art = read_cover_art;
		*self
	}
}
