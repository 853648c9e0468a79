use crate::util::{self, MPEG_AUDIO};

use std::io::Cursor;

use tagsplice::config::{ParseOptions, WriteOptions};
use tagsplice::error::ErrorKind;
use tagsplice::file::{FileType, TagCodec};
use tagsplice::id3::MpegFile;
use tagsplice::picture::{MimeType, Picture};
use tagsplice::probe::Probe;
use tagsplice::save::save_to_path;
use tagsplice::tag::{Field, Tag};

fn tagged(artist: &str, album: &str) -> Vec<u8> {
	let mut tag = Tag::new(FileType::Mpeg);
	tag.set_artist(artist);
	tag.set_album(album);

	util::write(MPEG_AUDIO, &tag)
}

#[test_log::test]
fn clear_then_set() {
	let file = util::temp_file(&tagged("OldArtist", "OldAlbum"), "mp3");

	let mut tag = tagsplice::read_from_path(file.path()).unwrap();
	assert_eq!(tag.artist(), "OldArtist");
	assert_eq!(tag.album(), "OldAlbum");

	tag.clear();
	save_to_path(file.path(), &tag, WriteOptions::default()).unwrap();

	let mut tag = tagsplice::read_from_path(file.path()).unwrap();
	assert_eq!(tag.artist(), "");
	assert_eq!(tag.album(), "");
	assert_eq!(tag.title(), "");

	// A cleared tag leaves nothing but the audio
	assert_eq!(std::fs::read(file.path()).unwrap(), MPEG_AUDIO);

	tag.set_artist("TestArtist1");
	tag.set_title("TestTitle1");
	tag.set_album("TestAlbum1");
	save_to_path(file.path(), &tag, WriteOptions::default()).unwrap();

	let tag = tagsplice::read_from_path(file.path()).unwrap();
	assert_eq!(tag.artist(), "TestArtist1");
	assert_eq!(tag.title(), "TestTitle1");
	assert_eq!(tag.album(), "TestAlbum1");
}

#[test_log::test]
fn every_field_round_trips() {
	let mut tag = Tag::new(FileType::Mpeg);
	for field in Field::ALL {
		let value = match field {
			Field::TrackNumber | Field::PartOfSet => String::from("3/12"),
			Field::Bpm | Field::Year | Field::Length => String::from("120"),
			_ => format!("{field} ✓ Ünïcödé"),
		};

		tag.set(*field, value);
	}

	for use_id3v23 in [false, true] {
		let mut out = Vec::new();
		MpegFile::write_to(
			&mut Cursor::new(MPEG_AUDIO),
			&tag,
			&mut out,
			WriteOptions::new().use_id3v23(use_id3v23),
		)
		.unwrap();

		assert!(out.ends_with(MPEG_AUDIO));

		let reread = MpegFile::read_from(&mut Cursor::new(&out), ParseOptions::new()).unwrap();
		for field in Field::ALL {
			assert_eq!(reread.get(*field), tag.get(*field), "{field}, v2.3: {use_id3v23}");
		}
	}
}

#[test_log::test]
fn cover_art() {
	let mut tag = Tag::new(FileType::Mpeg);
	tag.set_title("Foo title");
	tag.set_picture(Picture::new(MimeType::Png, util::png()));

	let out = util::write(MPEG_AUDIO, &tag);
	let reread = util::read(&out);
	assert_eq!(reread.picture(), tag.picture());

	let reread = MpegFile::read_from(
		&mut Cursor::new(&out),
		ParseOptions::new().read_cover_art(false),
	)
	.unwrap();
	assert!(reread.picture().is_none());
	assert_eq!(reread.title(), "Foo title");
}

#[test_log::test]
fn padding_is_skipped() {
	let mut tag = Tag::new(FileType::Mpeg);
	tag.set_genre("Foo genre");

	let mut out = Vec::new();
	MpegFile::write_to(
		&mut Cursor::new(MPEG_AUDIO),
		&tag,
		&mut out,
		WriteOptions::new().preferred_padding(512),
	)
	.unwrap();

	assert!(out.ends_with(MPEG_AUDIO));
	assert!(out.windows(512).any(|window| window.iter().all(|b| *b == 0)));
	assert_eq!(util::read(&out).genre(), "Foo genre");

	// Rewriting drops the old padding along with the old tag
	let rewritten = util::write(&out, &tag);
	assert!(rewritten.len() < out.len());
	assert!(rewritten.ends_with(MPEG_AUDIO));
}

fn v24_frame(id: &[u8; 4], content: &[u8]) -> Vec<u8> {
	let len = content.len() as u32;
	let mut frame = id.to_vec();
	frame.extend([
		(len >> 21) as u8 & 0x7F,
		(len >> 14) as u8 & 0x7F,
		(len >> 7) as u8 & 0x7F,
		len as u8 & 0x7F,
	]);
	frame.extend([0, 0]);
	frame.extend(content);
	frame
}

fn v24_tag(frames: &[u8]) -> Vec<u8> {
	let len = frames.len() as u32;
	let mut file = b"ID3\x04\x00\x00".to_vec();
	file.extend([
		(len >> 21) as u8 & 0x7F,
		(len >> 14) as u8 & 0x7F,
		(len >> 7) as u8 & 0x7F,
		len as u8 & 0x7F,
	]);
	file.extend(frames);
	file.extend(MPEG_AUDIO);
	file
}

fn assert_decoding_error(file: &[u8]) {
	let err = Probe::new(Cursor::new(file))
		.guess_file_type()
		.unwrap()
		.read()
		.unwrap_err();
	assert!(
		matches!(err.kind(), ErrorKind::FileDecoding(e) if e.format() == Some(FileType::Mpeg)),
		"{err}"
	);
}

#[test_log::test]
fn well_formed_frames_are_read() {
	let frames = [
		v24_frame(b"TIT2", b"\x03Title"),
		v24_frame(b"TALB", b"\x03Album"),
	]
	.concat();

	let tag = util::read(&v24_tag(&frames));
	assert_eq!(tag.title(), "Title");
	assert_eq!(tag.album(), "Album");
}

#[test_log::test]
fn invalid_frame_id_fails_the_read() {
	let frames = [
		v24_frame(b"TIT2", b"\x03Title"),
		v24_frame(b"ab!d", b"\x03junk"),
		v24_frame(b"TALB", b"\x03Album"),
	]
	.concat();

	assert_decoding_error(&v24_tag(&frames));
}

#[test_log::test]
fn truncated_frame_header_fails_the_read() {
	let mut frames = v24_frame(b"TIT2", b"\x03Title");
	// Half of a frame header, cut off by the end of the tag
	frames.extend(b"TALB\x00");

	assert_decoding_error(&v24_tag(&frames));
}
