#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use tagsplice::config::WriteOptions;
use tagsplice::probe::Probe;

fuzz_target!(|data: Vec<u8>| {
	let Ok(probe) = Probe::new(Cursor::new(&data)).guess_file_type() else {
		return;
	};

	let Ok(tag) = probe.read() else {
		return;
	};

	// Anything that parses must also be writable
	let _ = Probe::new(Cursor::new(&data))
		.guess_file_type()
		.map(|probe| probe.write_to(&tag, &mut Vec::new(), WriteOptions::new()));
});
