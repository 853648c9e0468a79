#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use tagsplice::config::ParseOptions;
use tagsplice::file::TagCodec;

fuzz_target!(|data: Vec<u8>| {
	let _ = tagsplice::ogg::OggFile::read_from(
		&mut Cursor::new(data),
		ParseOptions::new().verify_ogg_crc(true),
	);
});
