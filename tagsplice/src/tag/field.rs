use std::fmt::{Display, Formatter};

// This defines the `Field` enum and the matching getters/setters on `Tag`.
//
// Usage:
//
// fields! {
//     [field name] => Variant,
// }
//
// * `field name` is the name of the accessor methods. Multiple segments are separated by spaces,
// and joined with underscores: [album artist] => `album_artist()`, `set_album_artist()`.
macro_rules! fields {
	($([$name:tt $($other:tt)*] => $variant:ident),+ $(,)?) => {
		/// The fixed set of text fields a [`Tag`](crate::tag::Tag) carries
		///
		/// Every engine maps each field to its own frame ID, atom, or comment key with an
		/// exhaustive `match`, so a field can't silently go unmapped.
		#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub enum Field {
			$(
				#[allow(missing_docs)]
				$variant,
			)+
		}

		impl Field {
			/// Every field, in display order
			pub const ALL: &'static [Field] = &[$(Field::$variant),+];

			/// The field's name, as used by the accessors and the command line
			pub fn name(self) -> &'static str {
				match self {
					$(
						Field::$variant => paste::paste! { stringify!([<$name $(_ $other)*>]) },
					)+
				}
			}
		}

		impl crate::tag::Tag {
			$(
				paste::paste! {
					#[doc = "Returns the " $name $(" " $other)* ", or an empty string if it is unset"]
					pub fn [<$name $(_ $other)*>](&self) -> &str {
						self.get(Field::$variant)
					}

					#[doc = "Sets the " $name $(" " $other)* ", an empty value removes it"]
					pub fn [<set_ $name $(_ $other)*>](&mut self, value: impl Into<String>) {
						self.set(Field::$variant, value)
					}
				}
			)+
		}
	};
}

fields! {
	[artist]       => Artist,
	[album artist] => AlbumArtist,
	[album]        => Album,
	[title]        => Title,
	[genre]        => Genre,
	[year]         => Year,
	[date]         => Date,
	[bpm]          => Bpm,
	[comment]      => Comment,
	[composer]     => Composer,
	[copyright]    => Copyright,
	[encoded by]   => EncodedBy,
	[lyricist]     => Lyricist,
	[language]     => Language,
	[length]       => Length,
	[part of set]  => PartOfSet,
	[publisher]    => Publisher,
	[track]        => TrackNumber,
}

impl Field {
	/// Look up a field by name
	///
	/// This is case-insensitive, and underscores are optional.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagsplice::tag::Field;
	///
	/// assert_eq!(Field::from_name("AlbumArtist"), Some(Field::AlbumArtist));
	/// assert_eq!(Field::from_name("album_artist"), Some(Field::AlbumArtist));
	/// assert_eq!(Field::from_name("mood"), None);
	/// ```
	pub fn from_name(name: &str) -> Option<Self> {
		let normalized: String = name
			.chars()
			.filter(|c| *c != '_')
			.map(|c| c.to_ascii_lowercase())
			.collect();

		Self::ALL
			.iter()
			.copied()
			.find(|field| field.name().replace('_', "") == normalized)
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
