//! Rewrite the metadata of audio files without touching the audio.
//!
//! tagsplice reads the tag of an MP3 (ID3v2), MP4 (`ilst`), FLAC (Vorbis comments), or Ogg
//! Vorbis/Opus file into a format-agnostic [`Tag`](tag::Tag), and writes a modified `Tag` back
//! by re-framing the container around the new metadata:
//!
//! * MP3: the ID3v2 tag is regenerated and spliced onto the audio frames
//! * MP4: the `ilst` atom is rebuilt, and the chunk offset tables are shifted to follow `mdat`
//! * FLAC: the metadata block list is rebuilt, keeping every unrelated block
//! * Ogg: the comment packet is re-paginated, with every following page renumbered and its CRC
//!   recomputed
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> tagsplice::error::Result<()> {
//! use tagsplice::read_from_path;
//!
//! // The format is guessed from the content, falling back to the extension
//! let tag = read_from_path("test.flac")?;
//! println!("Title: {}", tag.title());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using concrete file types
//!
//! ```rust
//! # fn main() -> tagsplice::error::Result<()> {
//! use tagsplice::config::{ParseOptions, WriteOptions};
//! use tagsplice::file::{FileType, TagCodec};
//! use tagsplice::id3::MpegFile;
//! use tagsplice::tag::Tag;
//! use std::io::Cursor;
//!
//! // A single MPEG frame header, with no tag
//! let original = [0xFF, 0xFB, 0x90, 0x64];
//!
//! let mut tag = MpegFile::read_from(&mut Cursor::new(&original), ParseOptions::new())?;
//! assert!(tag.is_empty());
//!
//! tag.set_artist("Foo artist");
//!
//! let mut rewritten = Vec::new();
//! MpegFile::write_to(
//! 	&mut Cursor::new(&original),
//! 	&tag,
//! 	&mut rewritten,
//! 	WriteOptions::new(),
//! )?;
//!
//! // The audio is kept as-is
//! assert!(rewritten.ends_with(&original));
//!
//! let tag = MpegFile::read_from(&mut Cursor::new(&rewritten), ParseOptions::new())?;
//! assert_eq!(tag.artist(), "Foo artist");
//! # Ok(())
//! # }
//! ```
//!
//! ## Saving
//!
//! ```rust,no_run
//! # fn main() -> tagsplice::error::Result<()> {
//! use tagsplice::config::WriteOptions;
//! use tagsplice::read_from_path;
//! use tagsplice::save::save_to_path;
//!
//! let mut tag = read_from_path("test.ogg")?;
//! tag.clear();
//! tag.set_title("Bar title");
//!
//! // Written to a temporary file, which then replaces the original
//! save_to_path("test.ogg", &tag, WriteOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Important format-specific notes
//!
//! Not every format carries every [`Field`](tag::Field), and only Ogg keeps keys outside of
//! the fixed fields. Be sure to read the module documentation of each format.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod error;
pub mod file;
pub(crate) mod macros;
pub mod picture;
pub mod probe;
pub mod save;
pub mod tag;
mod util;

pub mod flac;
pub mod id3;
pub mod mp4;
pub mod ogg;

pub use crate::probe::{read_from, read_from_path};

pub use util::io;
