use std::error::Error;
use std::fmt;

/// Alias for `Result<T, PageError>`
pub type Result<T> = std::result::Result<T, PageError>;

/// Errors that can occur while performing `Page` operations
#[derive(Debug)]
pub enum PageError {
	/// The reader contains a page with a nonzero version
	InvalidVersion,
	/// The reader contains a page with a segment count < 1, or a segment table
	/// that disagrees with the page content
	BadSegmentCount,
	/// The reader contains a page without a magic signature (OggS)
	MissingMagic,
	/// A page is flagged as continuing a packet, but no packet is pending for its stream
	MissingContinuation,
	/// A page starts a fresh packet while the previous packet of its stream is unfinished
	UnfinishedPacket,
	/// The stored page checksum does not match the computed one
	ChecksumMismatch {
		/// The checksum stored in the page header
		stored: u32,
		/// The checksum computed over the page
		computed: u32,
	},
	/// The reader contains too little data to extract the expected information
	NotEnoughData,
	/// Any std::io::Error
	Io(std::io::Error),
}

impl fmt::Display for PageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PageError::InvalidVersion => {
				write!(f, "Invalid stream structure version (Should always be 0)")
			},
			PageError::BadSegmentCount => write!(f, "Page has an invalid segment table size"),
			PageError::MissingMagic => write!(f, "Page is missing a magic signature"),
			PageError::MissingContinuation => {
				write!(f, "Page continues a packet that was never started")
			},
			PageError::UnfinishedPacket => {
				write!(f, "Page starts a new packet before the previous one finished")
			},
			PageError::ChecksumMismatch { stored, computed } => write!(
				f,
				"Page checksum mismatch (stored: {stored:#010X}, computed: {computed:#010X})"
			),
			PageError::NotEnoughData => {
				write!(f, "Too little data is available for the expected read")
			},
			PageError::Io(err) => write!(f, "{}", err),
		}
	}
}

impl Error for PageError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match *self {
			PageError::Io(ref e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for PageError {
	fn from(err: std::io::Error) -> PageError {
		PageError::Io(err)
	}
}
