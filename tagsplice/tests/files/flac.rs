use crate::util::{self, FLAC_FRAMES};

use tagsplice::config::WriteOptions;
use tagsplice::file::FileType;
use tagsplice::picture::{MimeType, Picture};
use tagsplice::save::{save_to, write_to_path};
use tagsplice::tag::Tag;

const STREAMINFO: u8 = 0;
const PADDING: u8 = 1;
const APPLICATION: u8 = 2;
const SEEKTABLE: u8 = 3;
const VORBIS_COMMENT: u8 = 4;
const PICTURE: u8 = 6;

#[test_log::test]
fn unrelated_blocks_kept() {
	let file = util::flac();
	let original_blocks = util::flac_blocks(&file);

	let mut tag = util::read(&file);
	assert!(tag.is_empty());

	tag.set_title("Foo title");
	tag.set_artist("Bar artist");
	tag.set_picture(Picture::new(MimeType::Png, util::png()));

	let out = util::write(&file, &tag);
	assert!(out.ends_with(FLAC_FRAMES));

	let blocks = util::flac_blocks(&out);
	let types: Vec<u8> = blocks.iter().map(|(ty, _)| *ty).collect();
	assert_eq!(
		types,
		[STREAMINFO, SEEKTABLE, APPLICATION, VORBIS_COMMENT, PICTURE]
	);

	// Byte-identical
	for (original, new) in original_blocks.iter().zip(&blocks) {
		assert_eq!(original, new);
	}

	let reread = util::read(&out);
	assert_eq!(reread.title(), "Foo title");
	assert_eq!(reread.artist(), "Bar artist");
	assert_eq!(reread.picture(), tag.picture());
}

#[test_log::test]
fn rewrite_is_stable() {
	let mut tag = Tag::new(FileType::Flac);
	tag.set_album("Ælbum ☃");
	tag.set_date("1999-12-31");

	let once = util::write(&util::flac(), &tag);
	let twice = util::write(&once, &util::read(&once));
	assert_eq!(once, twice);

	let reread = util::read(&twice);
	assert_eq!(reread.album(), "Ælbum ☃");
	assert_eq!(reread.date(), "1999-12-31");
}

#[test_log::test]
fn padding_block() {
	let dir = tempfile::tempdir().unwrap();
	let original = dir.path().join("original.flac");
	let padded = dir.path().join("padded.flac");
	std::fs::write(&original, util::flac()).unwrap();

	let mut tag = Tag::new(FileType::Flac);
	tag.set_genre("Foo genre");

	write_to_path(
		&original,
		&tag,
		&padded,
		WriteOptions::new().preferred_padding(1024),
	)
	.unwrap();

	let blocks = util::flac_blocks(&std::fs::read(&padded).unwrap());
	let types = blocks.iter().map(|(ty, _)| *ty).collect::<Vec<_>>();
	assert_eq!(
		types,
		[STREAMINFO, SEEKTABLE, APPLICATION, PADDING, VORBIS_COMMENT]
	);
	assert_eq!(blocks[3].1.len(), 1024);

	// The existing padding is reused rather than stacked
	let mut file = std::fs::OpenOptions::new()
		.read(true)
		.write(true)
		.open(&padded)
		.unwrap();
	save_to(
		&mut file,
		&tag,
		WriteOptions::new().preferred_padding(1024),
	)
	.unwrap();
	drop(file);

	let blocks = util::flac_blocks(&std::fs::read(&padded).unwrap());
	let paddings = blocks.iter().filter(|(ty, _)| *ty == PADDING).count();
	assert_eq!(paddings, 1);
}
