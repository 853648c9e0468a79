use tagsplice::config::{ParseOptions, WriteOptions};
use tagsplice::probe::Probe;
use tagsplice::tag::Tag;

use std::io::{Cursor, Write as _};

use tagsplice_ogg::{
	CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, Page, paginate,
};
use tempfile::NamedTempFile;

/// A single MPEG frame header followed by some payload
pub const MPEG_AUDIO: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x0F, 0xF0, 0x00, 0x11, 0x22];

/// Some FLAC frame bytes
pub const FLAC_FRAMES: &[u8] = &[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x0F, 0xAB, 0xCD, 0xEF];

pub const OGG_SERIAL: u32 = 0x1234_5678;

/// Create a new temporary file with the given extension, holding `content`
pub fn temp_file(content: &[u8], extension: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new()
		.suffix(&format!(".{extension}"))
		.tempfile()
		.unwrap();

	file.write_all(content).unwrap();
	file.flush().unwrap();

	file
}

/// Parse `content` via [`Probe`], guessing its format from the content alone
pub fn read(content: &[u8]) -> Tag {
	Probe::new(Cursor::new(content))
		.options(ParseOptions::new().verify_ogg_crc(true))
		.guess_file_type()
		.unwrap()
		.read()
		.unwrap()
}

/// Write `tag` to `content` via [`Probe`]
pub fn write(content: &[u8], tag: &Tag) -> Vec<u8> {
	let mut out = Vec::new();
	Probe::new(Cursor::new(content))
		.guess_file_type()
		.unwrap()
		.write_to(tag, &mut out, WriteOptions::new())
		.unwrap();

	out
}

pub fn flac_block(ty: u8, last: bool, content: &[u8]) -> Vec<u8> {
	let mut block = vec![if last { ty | 0x80 } else { ty }];
	block.extend(&(content.len() as u32).to_be_bytes()[1..]);
	block.extend(content);
	block
}

/// `fLaC`, `STREAMINFO`, a `SEEKTABLE`, an `APPLICATION` block, and [`FLAC_FRAMES`]
pub fn flac() -> Vec<u8> {
	let mut file = b"fLaC".to_vec();
	file.extend(flac_block(0, false, &[0x10; 34]));
	file.extend(flac_block(3, false, &[0x20; 18]));
	file.extend(flac_block(2, true, b"tsplsome application data"));
	file.extend(FLAC_FRAMES);
	file
}

/// Every metadata block of a FLAC stream, as `(type, content)`
pub fn flac_blocks(file: &[u8]) -> Vec<(u8, Vec<u8>)> {
	assert!(file.starts_with(b"fLaC"));

	let mut blocks = Vec::new();
	let mut pos = 4;
	loop {
		let header = file[pos];
		let len = u32::from_be_bytes([0, file[pos + 1], file[pos + 2], file[pos + 3]]) as usize;
		blocks.push((header & 0x7F, file[pos + 4..pos + 4 + len].to_vec()));

		pos += 4 + len;
		if header & 0x80 != 0 {
			return blocks;
		}
	}
}

pub fn atom(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
	let mut atom = ((content.len() + 8) as u32).to_be_bytes().to_vec();
	atom.extend(ident);
	atom.extend(content);
	atom
}

pub const MP4_CHUNKS: [&[u8]; 2] = [b"first audio chunk", b"second audio chunk"];

/// `ftyp`, a `moov` with a single track and no `udta`, then `mdat` holding [`MP4_CHUNKS`]
pub fn mp4() -> Vec<u8> {
	let ftyp = atom(b"ftyp", b"M4A \0\0\0\0M4A mp42isom");

	let moov = |offsets: &[u32]| {
		let mut stco = vec![0; 4];
		stco.extend((offsets.len() as u32).to_be_bytes());
		for offset in offsets {
			stco.extend(offset.to_be_bytes());
		}

		let mut stbl = atom(b"stsd", &[0; 8]);
		stbl.extend(atom(b"stco", &stco));

		let mut content = atom(b"mvhd", &[0; 100]);
		content.extend(atom(
			b"trak",
			&atom(b"mdia", &atom(b"minf", &atom(b"stbl", &stbl))),
		));
		atom(b"moov", &content)
	};

	let mdat_content_start = (ftyp.len() + moov(&[0; 2]).len() + 8) as u32;
	let offsets = [
		mdat_content_start,
		mdat_content_start + MP4_CHUNKS[0].len() as u32,
	];

	[ftyp, moov(&offsets), atom(b"mdat", &MP4_CHUNKS.concat())].concat()
}

/// The entries of the first `stco` table in `file`
pub fn mp4_chunk_offsets(file: &[u8]) -> Vec<u32> {
	let pos = file
		.windows(4)
		.position(|window| window == b"stco")
		.unwrap();

	let count = u32::from_be_bytes(file[pos + 8..pos + 12].try_into().unwrap()) as usize;
	file[pos + 12..pos + 12 + count * 4]
		.chunks_exact(4)
		.map(|entry| u32::from_be_bytes(entry.try_into().unwrap()))
		.collect()
}

pub const OGG_AUDIO: [&[u8]; 2] = [&[0xAA; 600], &[0xBB; 90]];

/// A Vorbis stream: the identification header on its own page, then an empty comment
/// packet, the setup header, and [`OGG_AUDIO`]
pub fn ogg_vorbis() -> Vec<u8> {
	let mut ident = b"\x01vorbis".to_vec();
	ident.extend([0; 23]);

	let mut comment = b"\x03vorbis".to_vec();
	comment.extend(7_u32.to_le_bytes());
	comment.extend(b"Unknown");
	comment.extend(0_u32.to_le_bytes());
	comment.push(1);

	let setup = b"\x05vorbis\x00\x01\x02\x03".to_vec();

	let mut pages = paginate(
		[ident.as_slice()],
		OGG_SERIAL,
		0,
		CONTAINS_FIRST_PAGE_OF_BITSTREAM,
	)
	.unwrap();

	let rest = [comment.as_slice(), setup.as_slice()]
		.into_iter()
		.chain(OGG_AUDIO);
	for mut page in paginate(rest, OGG_SERIAL, 2048, CONTAINS_LAST_PAGE_OF_BITSTREAM).unwrap() {
		page.header_mut().sequence_number += 1;
		pages.push(page);
	}

	let mut file = Vec::new();
	for mut page in pages {
		page.gen_crc();
		file.extend(page.as_bytes());
	}

	file
}

/// An Opus stream: `OpusHead` and an empty `OpusTags` packet each on their own page, then
/// [`OGG_AUDIO`] starting on a fresh page
pub fn ogg_opus() -> Vec<u8> {
	// Version 1, stereo, pre-skip 312, 48 kHz, 0 dB gain, mapping family 0
	let mut head = b"OpusHead\x01\x02".to_vec();
	head.extend(312_u16.to_le_bytes());
	head.extend(48_000_u32.to_le_bytes());
	head.extend([0, 0, 0]);

	// No framing bit
	let mut tags = b"OpusTags".to_vec();
	tags.extend(7_u32.to_le_bytes());
	tags.extend(b"Unknown");
	tags.extend(0_u32.to_le_bytes());

	let mut pages = paginate(
		[head.as_slice()],
		OGG_SERIAL,
		0,
		CONTAINS_FIRST_PAGE_OF_BITSTREAM,
	)
	.unwrap();
	pages.extend(paginate([tags.as_slice()], OGG_SERIAL, 0, 0).unwrap());

	for mut page in paginate(OGG_AUDIO, OGG_SERIAL, 960, CONTAINS_LAST_PAGE_OF_BITSTREAM).unwrap() {
		page.header_mut().sequence_number += 2;
		pages.push(page);
	}

	let mut file = Vec::new();
	for mut page in pages {
		page.gen_crc();
		file.extend(page.as_bytes());
	}

	file
}

pub fn ogg_pages(file: &[u8]) -> Vec<Page> {
	let mut reader = Cursor::new(file);
	let mut pages = Vec::new();
	while (reader.position() as usize) < file.len() {
		pages.push(Page::read(&mut reader).unwrap());
	}

	pages
}

/// The signature and `IHDR` of a 4x2 RGB PNG, with a zeroed CRC
pub fn png() -> Vec<u8> {
	let mut png = b"\x89PNG\r\n\x1a\n".to_vec();

	let mut ihdr = 4_u32.to_be_bytes().to_vec();
	ihdr.extend(2_u32.to_be_bytes());
	ihdr.extend([8, 2, 0, 0, 0]);

	png.extend(13_u32.to_be_bytes());
	png.extend(b"IHDR");
	png.extend(&ihdr);
	png.extend([0; 4]);

	png.extend(0_u32.to_be_bytes());
	png.extend(b"IEND");
	png.extend([0xAE, 0x42, 0x60, 0x82]);
	png
}
