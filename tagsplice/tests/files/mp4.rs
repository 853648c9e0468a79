use crate::util::{self, MP4_CHUNKS};

use tagsplice::file::FileType;
use tagsplice::picture::{MimeType, Picture};
use tagsplice::tag::Tag;

fn assert_chunks(file: &[u8]) {
	for (offset, chunk) in util::mp4_chunk_offsets(file).into_iter().zip(MP4_CHUNKS) {
		let offset = offset as usize;
		assert_eq!(&file[offset..offset + chunk.len()], chunk);
	}
}

#[test_log::test]
fn chunk_offsets_follow_mdat() {
	let file = util::mp4();
	assert_chunks(&file);

	let mut tag = util::read(&file);
	assert!(tag.is_empty());

	tag.set_title("Foo title");
	tag.set_album_artist("Bar album artist");
	tag.set_track("4/10");
	tag.set_part_of_set("1/2");
	tag.set_bpm("128");

	let out = util::write(&file, &tag);
	assert!(out.ends_with(&MP4_CHUNKS.concat()));

	let delta = (out.len() - file.len()) as u32;
	let expected: Vec<u32> = util::mp4_chunk_offsets(&file)
		.into_iter()
		.map(|offset| offset + delta)
		.collect();
	assert_eq!(util::mp4_chunk_offsets(&out), expected);
	assert_chunks(&out);

	let reread = util::read(&out);
	assert_eq!(reread.title(), "Foo title");
	assert_eq!(reread.album_artist(), "Bar album artist");
	assert_eq!(reread.track(), "4/10");
	assert_eq!(reread.part_of_set(), "1/2");
	assert_eq!(reread.bpm(), "128");

	// Back to no items, the offsets follow again
	let stripped = util::write(&out, &Tag::new(FileType::Mp4));
	assert_chunks(&stripped);
	assert!(util::read(&stripped).is_empty());
}

#[test_log::test]
fn non_ascii_and_cover() {
	let mut tag = Tag::new(FileType::Mp4);
	tag.set_artist("Sigur Rós");
	tag.set_comment("日本語のコメント");
	tag.set_picture(Picture::new(MimeType::Png, util::png()));

	let out = util::write(&util::mp4(), &tag);
	assert_chunks(&out);

	let reread = util::read(&out);
	assert_eq!(reread.artist(), "Sigur Rós");
	assert_eq!(reread.comment(), "日本語のコメント");
	assert_eq!(reread.picture(), tag.picture());
}

#[test_log::test]
fn saved_through_path() {
	let file = util::temp_file(&util::mp4(), "m4a");

	let mut tag = tagsplice::read_from_path(file.path()).unwrap();
	assert_eq!(tag.file_type(), FileType::Mp4);
	tag.set_genre("Foo genre");

	tagsplice::save::save_to_path(file.path(), &tag, Default::default()).unwrap();

	let content = std::fs::read(file.path()).unwrap();
	assert_chunks(&content);
	assert_eq!(util::read(&content).genre(), "Foo genre");
}
