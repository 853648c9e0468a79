//! Generic file handling utilities

mod file_type;
mod tag_codec;

pub use file_type::{EXTENSIONS, FileType, OggCodec};
pub use tag_codec::TagCodec;

pub(crate) use file_type::FileTypeGuessResult;
