macro_rules! try_vec {
	($elem:expr; $size:expr) => {{ $crate::util::alloc::fallible_vec_from_element($elem, $size)? }};
}

// Return early with an `ErrorKind`
//
// - err!(TruncatedInput)
// - err!(BadAtom("Found an incomplete chunk offset table"))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::TagspliceError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($($reason:expr),+)) => {
		return Err(crate::error::TagspliceError::new(
			crate::error::ErrorKind::$variant($($reason),+),
		))
	};
}

// Build a `FileDecodingError`, optionally tied to a `FileType`
//
// - decode_err!(Mp4, "No \"moov\" atom found")
// - decode_err!(@BAIL Mpeg, "Truncated ID3v2 frame header")
// - decode_err!(@BAIL "Vorbis comment is missing a \"=\" separator")
macro_rules! decode_err {
	($file_ty:ident, $reason:literal) => {
		Into::<crate::error::TagspliceError>::into(crate::error::FileDecodingError::new(
			crate::file::FileType::$file_ty,
			$reason,
		))
	};
	($reason:literal) => {
		Into::<crate::error::TagspliceError>::into(
			crate::error::FileDecodingError::from_description($reason),
		)
	};
	(@BAIL $($file_ty:ident,)? $reason:literal) => {
		return Err(decode_err!($($file_ty,)? $reason))
	};
}

// Same as `decode_err!` for writes, which always know their `FileType`
macro_rules! encode_err {
	($file_ty:ident, $reason:literal) => {
		Into::<crate::error::TagspliceError>::into(crate::error::FileEncodingError::new(
			crate::file::FileType::$file_ty,
			$reason,
		))
	};
	(@BAIL $file_ty:ident, $reason:literal) => {
		return Err(encode_err!($file_ty, $reason))
	};
}

pub(crate) use {decode_err, encode_err, err, try_vec};
