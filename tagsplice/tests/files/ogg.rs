use crate::util::{self, OGG_AUDIO, OGG_SERIAL};

use std::io::Cursor;

use tagsplice::config::ParseOptions;
use tagsplice::error::ErrorKind;
use tagsplice::file::{OggCodec, TagCodec};
use tagsplice::ogg::OggFile;
use tagsplice::picture::{MimeType, Picture};
use tagsplice_ogg::Packets;

fn assert_valid_pages(file: &[u8]) {
	for (idx, page) in util::ogg_pages(file).iter().enumerate() {
		page.verify_crc().unwrap();
		assert_eq!(page.header().stream_serial, OGG_SERIAL);
		assert_eq!(page.header().sequence_number as usize, idx);
	}
}

fn assert_audio_kept(file: &[u8]) {
	let packets = Packets::read(&mut Cursor::new(file)).unwrap();
	assert_eq!(packets.len(), 5);
	assert_eq!(packets.get(3), Some(OGG_AUDIO[0]));
	assert_eq!(packets.get(4), Some(OGG_AUDIO[1]));
}

#[test_log::test]
fn comments_and_passthrough() {
	let file = util::ogg_vorbis();
	assert_valid_pages(&file);

	let mut tag = util::read(&file);
	assert!(tag.is_empty());
	assert_eq!(tag.vendor(), Some("Unknown"));

	tag.set_title("Foo title");
	tag.set_artist("Émile ☕");
	tag.insert_passthrough("REPLAYGAIN_TRACK_GAIN", "-3.10 dB");
	tag.insert_passthrough("mood", "Calm");

	let out = util::write(&file, &tag);
	assert_valid_pages(&out);
	assert_audio_kept(&out);

	let mut reread = util::read(&out);
	assert_eq!(reread.title(), "Foo title");
	assert_eq!(reread.artist(), "Émile ☕");
	assert_eq!(reread.get_passthrough("MOOD"), Some("Calm"));
	assert_eq!(
		reread.get_passthrough("replaygain_track_gain"),
		Some("-3.10 dB")
	);

	// Overwriting a passthrough key replaces it, removing one drops it
	reread.insert_passthrough("MOOD", "Upbeat");
	reread.remove_passthrough("REPLAYGAIN_TRACK_GAIN");

	let out = util::write(&out, &reread);
	assert_valid_pages(&out);

	let reread = util::read(&out);
	assert_eq!(reread.get_passthrough("MOOD"), Some("Upbeat"));
	assert_eq!(reread.get_passthrough("REPLAYGAIN_TRACK_GAIN"), None);
	assert_eq!(reread.passthrough().len(), 1);
}

#[test_log::test]
fn opus_round_trip() {
	let file = util::ogg_opus();
	assert_valid_pages(&file);

	let original_pages = util::ogg_pages(&file);
	assert_eq!(original_pages.len(), 3);

	let mut tag = util::read(&file);
	assert!(tag.is_empty());
	assert_eq!(tag.ogg_codec(), Some(OggCodec::Opus));
	assert_eq!(tag.vendor(), Some("Unknown"));

	tag.set_title("Foo title");
	tag.set_album("Baz album");
	tag.set_comment("Ünïcödé ☕");
	tag.insert_passthrough("R128_TRACK_GAIN", "-512");

	let out = util::write(&file, &tag);
	assert_valid_pages(&out);

	let pages = util::ogg_pages(&out);
	assert_eq!(pages.len(), original_pages.len());

	// The identification header and the audio pages are untouched
	assert_eq!(pages[0].as_bytes(), original_pages[0].as_bytes());
	assert_eq!(pages[2].as_bytes(), original_pages[2].as_bytes());
	assert!(out.ends_with(&original_pages[2].as_bytes()));

	let packets = Packets::read(&mut Cursor::new(&out)).unwrap();
	assert_eq!(packets.len(), 4);
	assert!(packets.get(1).unwrap().starts_with(b"OpusTags"));
	assert_eq!(packets.get(2), Some(OGG_AUDIO[0]));
	assert_eq!(packets.get(3), Some(OGG_AUDIO[1]));

	// No framing bit after the last comment
	assert!(packets.get(1).unwrap().ends_with(b"R128_TRACK_GAIN=-512"));

	let reread = util::read(&out);
	assert_eq!(reread.ogg_codec(), Some(OggCodec::Opus));
	assert_eq!(reread.title(), "Foo title");
	assert_eq!(reread.album(), "Baz album");
	assert_eq!(reread.comment(), "Ünïcödé ☕");
	assert_eq!(reread.get_passthrough("R128_TRACK_GAIN"), Some("-512"));

	// A comment spilling onto more pages only renumbers the audio pages
	let mut large = reread.clone();
	large.set_comment("Lorem ipsum ".repeat(10_000));

	let out = util::write(&out, &large);
	assert_valid_pages(&out);

	let pages = util::ogg_pages(&out);
	assert!(pages.len() > original_pages.len());

	let audio = pages.last().unwrap();
	assert_eq!(audio.segments(), original_pages[2].segments());
	assert_eq!(audio.content(), original_pages[2].content());
	assert_eq!(audio.header().abgp, original_pages[2].header().abgp);

	assert_eq!(util::read(&out).comment(), large.comment());
}

#[test_log::test]
fn large_comment_packet() {
	let file = util::ogg_vorbis();

	let mut tag = util::read(&file);
	tag.set_comment("Lorem ipsum ".repeat(20_000));
	tag.set_picture(Picture::new(MimeType::Png, util::png()));

	let out = util::write(&file, &tag);
	assert!(util::ogg_pages(&out).len() > util::ogg_pages(&file).len());
	assert_valid_pages(&out);
	assert_audio_kept(&out);

	let reread = util::read(&out);
	assert_eq!(reread.comment(), tag.comment());
	assert_eq!(reread.picture(), tag.picture());

	// And back down again
	let shrunk = util::write(&out, &util::read(&file));
	assert!(shrunk.len() < out.len());
	assert_valid_pages(&shrunk);
	assert_audio_kept(&shrunk);
}

#[test_log::test]
fn corrupt_crc() {
	let mut file = util::ogg_vorbis();

	// Somewhere in the identification header
	file[40] ^= 0xFF;

	let err = OggFile::read_from(
		&mut Cursor::new(&file),
		ParseOptions::new().verify_ogg_crc(true),
	)
	.unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::OggPage(_)), "{err}");

	assert!(OggFile::read_from(&mut Cursor::new(&file), ParseOptions::new()).is_ok());
}
