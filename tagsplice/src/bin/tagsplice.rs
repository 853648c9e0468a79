//! A thin command line wrapper around tagsplice
//!
//! Set `RUST_LOG=tagsplice=trace` to see what the engines are doing.

use tagsplice::config::WriteOptions;
use tagsplice::error::{ErrorKind, Result, TagspliceError};
use tagsplice::file::FileType;
use tagsplice::picture::Picture;
use tagsplice::probe::read_from_path;
use tagsplice::save::save_to_path;
use tagsplice::tag::{Field, Tag};

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tagsplice")]
#[command(about = "Read and rewrite the tags of MP3, MP4, FLAC, and Ogg files", long_about = None)]
#[command(version)]
struct Config {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print every field, passthrough comment, and the cover art of a file
	Read {
		/// Audio file path
		path: PathBuf,
	},
	/// Set fields and save the file in place
	///
	/// A field is one of the fixed field names (`artist`, `album_artist`, `track`, ...), or any
	/// other comment key for Ogg files. `cover` takes the path of a JPEG or PNG image. An empty
	/// value removes the field.
	Write {
		/// Audio file path
		path: PathBuf,

		/// `<field> <value>` pairs
		#[arg(required = true, allow_hyphen_values = true, value_names = ["FIELD", "VALUE"])]
		pairs: Vec<String>,
	},
	/// Remove every field, the cover art, and all passthrough comments
	Clear {
		/// Audio file path
		path: PathBuf,
	},
}

fn main() {
	env_logger::init();

	let config = Config::parse();

	let result = match config.command {
		Command::Read { path } => command_read(&path),
		Command::Write { path, pairs } => command_write(&path, &pairs),
		Command::Clear { path } => command_clear(&path),
	};

	if let Err(e) = result {
		eprintln!("Error: {e}");
		process::exit(1);
	}
}

fn command_read(path: &Path) -> Result<()> {
	let tag = read_from_path(path)?;

	println!("File: {}", path.display());
	for (field, value) in tag.fields() {
		println!("{field}: {value}");
	}

	for (key, value) in tag.passthrough() {
		println!("{key}: {value}");
	}

	if let Some(picture) = tag.picture() {
		println!(
			"cover: {} ({} bytes)",
			picture.mime_type(),
			picture.data().len()
		);
	}

	Ok(())
}

fn command_write(path: &Path, pairs: &[String]) -> Result<()> {
	if pairs.len() % 2 != 0 {
		eprintln!(
			"Error: Expected <field> <value> pairs, got {} arguments",
			pairs.len()
		);
		process::exit(1);
	}

	let mut tag = read_from_path(path)?;
	for pair in pairs.chunks_exact(2) {
		apply(&mut tag, &pair[0], &pair[1])?;
	}

	save_to_path(path, &tag, WriteOptions::default())
}

fn apply(tag: &mut Tag, name: &str, value: &str) -> Result<()> {
	if name.eq_ignore_ascii_case("cover") {
		if value.is_empty() {
			tag.remove_picture();
			return Ok(());
		}

		let picture = Picture::from_data(std::fs::read(value)?)?;
		tag.set_picture(picture);
		return Ok(());
	}

	if let Some(field) = Field::from_name(name) {
		tag.set(field, value);
		return Ok(());
	}

	if tag.file_type() != FileType::Ogg {
		return Err(TagspliceError::new(ErrorKind::InvalidFieldName(
			name.to_owned(),
		)));
	}

	if value.is_empty() {
		tag.remove_passthrough(name);
	} else {
		tag.insert_passthrough(name, value);
	}

	Ok(())
}

fn command_clear(path: &Path) -> Result<()> {
	let mut tag = read_from_path(path)?;
	tag.clear();

	save_to_path(path, &tag, WriteOptions::default())
}
