#![allow(missing_docs)]

mod flac;
mod mp4;
mod mpeg;
mod ogg;
pub(crate) mod util;
