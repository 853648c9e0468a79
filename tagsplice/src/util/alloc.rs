use crate::config::global_options;
use crate::error::Result;
use crate::macros::err;

/// A zero-filled (or `element`-filled) buffer of `len` items, see [`try_vec!`](crate::macros::try_vec)
pub(crate) fn fallible_vec_from_element<T>(element: T, len: usize) -> Result<Vec<T>>
where
	T: Clone,
{
	let mut v = Vec::try_with_capacity_stable(len)?;
	v.resize(len, element);

	Ok(v)
}

pub(crate) trait VecFallibleCapacity<T>: Sized {
	/// `Vec::with_capacity`, failing with `TooMuchData` above the thread's allocation limit
	/// and with `Alloc` when the allocator refuses
	fn try_with_capacity_stable(capacity: usize) -> Result<Self>;
}

impl<T> VecFallibleCapacity<T> for Vec<T> {
	fn try_with_capacity_stable(capacity: usize) -> Result<Self> {
		if capacity > global_options().allocation_limit {
			log::debug!("Refusing to allocate {capacity} items up front");
			err!(TooMuchData);
		}

		let mut v = Vec::new();
		v.try_reserve(capacity)?;

		Ok(v)
	}
}
