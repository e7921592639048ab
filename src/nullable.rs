//! Operations tolerating absent arrays.
//!
//! Host code that keeps arrays in optional fields (for instance a handle that may
//! not have been created yet) can call these functions without unwrapping first.
//! A missing array behaves as a neutral value: a zero count, no reference,
//! or [`Error::Null`] for operations that would have to modify it.
use crate::{
	generic::{
		Meta,
		RefArray
	},
	slot::Opaque,
	error::{
		Error,
		Result,
		TransferError
	}
};

fn require<T>(array: Option<T>, operation: &str) -> Result<T> {
	match array {
		Some(array) => Ok(array),
		None => {
			log::warn!("cannot {}: no array given", operation);
			Err(Error::Null)
		}
	}
}

/// Shallow copy. See [`RefArray::try_copy`].
pub fn copy<M: Meta, R: Opaque>(array: Option<&RefArray<M, R>>) -> Result<RefArray<M, R>> {
	require(array, "copy")?.try_copy()
}

/// Releases the array's storage, never the referenced data.
///
/// Does nothing if no array is given.
#[inline]
pub fn destroy<M: Meta, R: Opaque>(array: Option<RefArray<M, R>>) {
	drop(array)
}

pub fn clear<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>) {
	if let Some(array) = array {
		array.clear()
	}
}

/// Returns the number of references, `0` if no array is given.
#[inline]
pub fn count<M: Meta, R: Opaque>(array: Option<&RefArray<M, R>>) -> usize {
	array.map_or(0, RefArray::count)
}

pub fn get<M: Meta, R: Opaque>(array: Option<&RefArray<M, R>>, index: usize) -> Option<R> {
	require(array, "get").ok()?.get(index)
}

pub fn set<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, index: usize, value: R) -> Result<()> {
	require(array, "set")?.set(index, value)
}

pub fn index_of<M: Meta, R: Opaque>(array: Option<&RefArray<M, R>>, value: R) -> Option<usize> {
	array?.index_of(value)
}

pub fn append<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, value: R) -> Result<()> {
	require(array, "append")?.append(value)
}

pub fn prepend<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, value: R) -> Result<()> {
	require(array, "prepend")?.prepend(value)
}

pub fn insert_at<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, value: R, index: usize) -> Result<()> {
	require(array, "insert")?.insert_at(value, index)
}

pub fn delete_at<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, index: usize) -> Result<()> {
	require(array, "delete")?.delete_at(index)
}

pub fn delete_last<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>) -> Result<()> {
	require(array, "delete")?.delete_last()
}

pub fn delete_by_value<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, value: R) -> Result<()> {
	require(array, "delete")?.delete_by_value(value)
}

pub fn swap<M: Meta, R: Opaque>(array: Option<&mut RefArray<M, R>>, a: usize, b: usize) -> Result<()> {
	require(array, "swap")?.swap(a, b)
}

pub fn for_each<M: Meta, R: Opaque, F>(array: Option<&RefArray<M, R>>, f: F) where F: FnMut(R) {
	if let Some(array) = array {
		array.for_each(f)
	}
}

pub fn for_each_with_context<M: Meta, R: Opaque, C: ?Sized, F>(array: Option<&RefArray<M, R>>, f: F, context: &mut C) where F: FnMut(R, &mut C) {
	if let Some(array) = array {
		array.for_each_with_context(f, context)
	}
}

/// See [`RefArray::concat`]. Both arrays are required.
pub fn concat<M: Meta, N: Meta, R: Opaque>(a: Option<&mut RefArray<M, R>>, b: Option<&RefArray<N, R>>) -> Result<()> {
	let b = require(b, "concat")?;
	require(a, "concat")?.concat(b)
}

/// See [`RefArray::concat_and_free`].
///
/// When `a` is missing, `b` is handed back untouched through the error.
pub fn concat_and_free<M: Meta, N: Meta, R: Opaque>(
	a: Option<&mut RefArray<M, R>>,
	b: Option<RefArray<N, R>>
) -> std::result::Result<(), TransferError<Option<RefArray<N, R>>>> {
	let a = match require(a, "concat") {
		Ok(a) => a,
		Err(e) => return Err(TransferError::new(e, b))
	};

	let b = match require(b, "concat") {
		Ok(b) => b,
		Err(e) => return Err(TransferError::new(e, None))
	};

	a.concat_and_free(b).map_err(|e| {
		let error = e.error().clone();
		TransferError::new(error, Some(e.into_inner()))
	})
}
