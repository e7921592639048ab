use core::{
	iter::FusedIterator,
	ptr,
	slice,
	fmt
};
use std::alloc::handle_alloc_error;
use crate::{
	raw::RawRefArray,
	slot::{
		Opaque,
		Slot
	},
	error::{
		Error,
		Result,
		TransferError
	}
};

/// Capacity of arrays created with [`RefArray::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Metadata representing the count and size (capacity) of the array.
///
/// This crate provides two implementation of this trait:
/// [`wide::Meta`](crate::wide::Meta) stores the count and size with two `usize`.
/// Then the maximum size depends on the bit-depth of the plateform.
/// For 64-bit plateforms, this crate also provides [`lean::Meta`](crate::lean::Meta) that stores both
/// on a single `usize`. As a result, the maximum size is [`std::u32::MAX`].
pub trait Meta: Copy {
	/// Maximum count/size of the array using this metadata format.
	const MAX_LENGTH: usize;

	/// Create a new metadata from an array's count and size.
	fn new(count: usize, size: usize) -> Self;

	/// Number of occupied slots.
	fn count(&self) -> usize;

	/// Number of allocated slots.
	fn size(&self) -> usize;

	fn set_count(&mut self, count: usize);

	fn set_size(&mut self, size: usize);
}

/// Contiguous growable array of opaque references.
///
/// The array owns its slot buffer but never the data its references designate:
/// removing, overwriting or clearing slots never releases anything,
/// and dropping the array only frees the buffer.
/// Releasing the referents is the caller's business, before or after removing them.
///
/// Occupied slots always form the prefix `[0, count)` of the buffer.
/// Insertions grow the buffer when it is full; removals shift the following
/// slots down and never shrink it.
///
/// Invalid indexes are not fatal: the operation does nothing, logs a warning
/// and reports an [`Error`].
///
/// # Examples
///
/// ```
/// # use ref_array::RefArray;
/// let (a, b, c) = (1, 2, 3);
/// let mut array: RefArray<&i32> = RefArray::new()?;
/// array.append(&a)?;
/// array.append(&c)?;
/// array.insert_at(&b, 1)?;
///
/// assert_eq!(array.count(), 3);
/// assert!(std::ptr::eq(array.get(1).unwrap(), &b));
/// # Ok::<(), ref_array::Error>(())
/// ```
pub struct RefArray<M: Meta, R> {
	buf: RawRefArray<M, R>
}

impl<M: Meta, R: Opaque> RefArray<M, R> {
	/// Creates a new empty array with [`DEFAULT_CAPACITY`] slots.
	#[inline]
	pub fn new() -> Result<Self> {
		Self::with_capacity(DEFAULT_CAPACITY)
	}

	/// Creates a new empty array with room for at least `capacity` references.
	///
	/// A zero capacity creates an array that allocates on its first insertion.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Result<Self> {
		Ok(RefArray {
			buf: RawRefArray::with_capacity(capacity)?
		})
	}

	/// Makes a shallow copy of the array.
	///
	/// The copy holds the same references in the same order, with the same capacity.
	/// Referenced data is neither duplicated nor inspected.
	///
	/// Fails with [`Error::Empty`] if there is nothing to copy.
	/// Use `clone` to copy possibly empty arrays.
	pub fn try_copy(&self) -> Result<Self> {
		if self.is_empty() {
			log::warn!("no references to copy");
			return Err(Error::Empty)
		}

		let mut copy = Self::with_capacity(self.capacity())?;
		copy.append_slots(self.slots())?;
		Ok(copy)
	}

	/// Returns the number of references in the array.
	#[inline]
	pub fn count(&self) -> usize {
		self.buf.count()
	}

	/// Returns the number of allocated slots.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buf.capacity()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Returns the occupied slots.
	#[inline]
	pub fn slots(&self) -> &[Slot<R>] {
		self.buf.slots()
	}

	/// Returns a raw pointer to the slot buffer.
	///
	/// Any insertion may reallocate the buffer, which makes the pointer invalid.
	#[inline]
	pub fn as_ptr(&self) -> *const Slot<R> {
		self.buf.as_ptr()
	}

	/// Returns the reference stored at `index`, or `None` if `index` is not below the count.
	pub fn get(&self, index: usize) -> Option<R> {
		match self.slots().get(index) {
			Some(slot) => Some(slot.get()),
			None => {
				log::warn!("cannot get index {}: array holds {} references", index, self.count());
				None
			}
		}
	}

	#[inline]
	pub fn first(&self) -> Option<R> {
		self.slots().first().map(Slot::get)
	}

	#[inline]
	pub fn last(&self) -> Option<R> {
		self.slots().last().map(Slot::get)
	}

	/// Overwrites the reference stored at `index`.
	///
	/// The previous reference is simply forgotten.
	pub fn set(&mut self, index: usize, value: R) -> Result<()> {
		let count = self.count();
		match self.buf.slots_mut().get_mut(index) {
			Some(slot) => {
				slot.set(value);
				Ok(())
			},
			None => Err(out_of_bounds("set", index, count))
		}
	}

	/// Returns the index of the first slot holding `value`.
	#[inline]
	pub fn index_of(&self, value: R) -> Option<usize> {
		self.slots().iter().position(|slot| slot.holds(&value))
	}

	#[inline]
	pub fn contains(&self, value: R) -> bool {
		self.index_of(value).is_some()
	}

	/// Returns an iterator over the stored references, in index order.
	#[inline]
	pub fn iter(&self) -> Iter<'_, R> {
		Iter {
			slots: self.slots().iter()
		}
	}

	/// Reserves room for at least `additional` more references.
	///
	/// This is the growth step performed by insertions when the array is full:
	/// the capacity at least doubles.
	#[inline]
	pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
		self.buf.try_reserve(additional)
	}

	/// Forgets every reference, keeping the allocated capacity.
	#[inline]
	pub fn clear(&mut self) {
		// SAFETY: an empty prefix is always initialized.
		unsafe { self.buf.set_count(0) }
	}

	/// Appends a reference to the end of the array.
	///
	/// If the array is full, its buffer grows first.
	/// If this allocation fails, the array is left unchanged.
	#[inline]
	pub fn append(&mut self, value: R) -> Result<()> {
		let count = self.count();
		if count == self.capacity() {
			self.buf.try_reserve(1)?;
		}

		unsafe {
			ptr::write(self.buf.as_mut_ptr().add(count), Slot::new(value));
			self.buf.set_count(count + 1);
		}

		Ok(())
	}

	/// Inserts a reference at the beginning of the array,
	/// shifting every other reference up by one.
	#[inline]
	pub fn prepend(&mut self, value: R) -> Result<()> {
		self.insert_at(value, 0)
	}

	/// Inserts a reference at position `index`,
	/// shifting all references after it up by one.
	///
	/// If `index` is not below the count, the reference is appended.
	pub fn insert_at(&mut self, value: R, index: usize) -> Result<()> {
		let count = self.count();
		if index >= count {
			return self.append(value)
		}

		if count == self.capacity() {
			self.buf.try_reserve(1)?;
		}

		unsafe {
			// The spot to put the new value
			let p = self.buf.as_mut_ptr().add(index);
			// Shift everything over to make space. (Duplicating the
			// `index`th slot into two consecutive places.)
			ptr::copy(p, p.add(1), count - index);
			// Write it in, overwriting the first copy of the `index`th slot.
			ptr::write(p, Slot::new(value));
			self.buf.set_count(count + 1);
		}

		Ok(())
	}

	/// Removes the reference at position `index`,
	/// shifting all references after it down by one.
	///
	/// The referenced data is not released.
	pub fn delete_at(&mut self, index: usize) -> Result<()> {
		let count = self.count();
		if index >= count {
			return Err(out_of_bounds("delete", index, count))
		}

		unsafe {
			let p = self.buf.as_mut_ptr().add(index);
			// Shift everything down to fill in that spot.
			ptr::copy(p.add(1), p, count - index - 1);
			self.buf.set_count(count - 1);
		}

		Ok(())
	}

	/// Removes the last reference.
	pub fn delete_last(&mut self) -> Result<()> {
		match self.count() {
			0 => {
				log::warn!("cannot delete the last reference of an empty array");
				Err(Error::Empty)
			},
			count => {
				unsafe { self.buf.set_count(count - 1) }
				Ok(())
			}
		}
	}

	/// Removes the first slot holding `value`.
	///
	/// Further slots holding the same reference are kept.
	pub fn delete_by_value(&mut self, value: R) -> Result<()> {
		match self.index_of(value) {
			Some(index) => self.delete_at(index),
			None => {
				log::warn!("cannot delete reference: not in the array");
				Err(Error::NotFound)
			}
		}
	}

	/// Exchanges the references stored at `a` and `b`.
	///
	/// Does nothing if `a == b`.
	pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
		if a == b {
			return Ok(())
		}

		let count = self.count();
		for index in [a, b] {
			if index >= count {
				return Err(out_of_bounds("swap", index, count))
			}
		}

		self.buf.slots_mut().swap(a, b);
		Ok(())
	}

	/// Calls `f` on every reference, in index order.
	#[inline]
	pub fn for_each<F>(&self, mut f: F) where F: FnMut(R) {
		for slot in self.slots() {
			f(slot.get())
		}
	}

	/// Calls `f` on every reference, in index order, along with `context`.
	#[inline]
	pub fn for_each_with_context<C: ?Sized, F>(&self, mut f: F, context: &mut C) where F: FnMut(R, &mut C) {
		for slot in self.slots() {
			f(slot.get(), context)
		}
	}

	/// Appends every reference of `other`, in order.
	///
	/// `other` is left untouched: its references are now reachable from both arrays.
	/// Room is reserved before anything is copied, so on failure `self` is unchanged.
	#[inline]
	pub fn concat<N: Meta>(&mut self, other: &RefArray<N, R>) -> Result<()> {
		self.append_slots(other.slots())
	}

	/// Same as [`concat`](RefArray::concat), but `other` is consumed and its buffer
	/// released afterward.
	///
	/// The references themselves are not released: they are now only held by `self`.
	/// On failure `self` is unchanged and `other` is given back through the error.
	pub fn concat_and_free<N: Meta>(&mut self, other: RefArray<N, R>) -> std::result::Result<(), TransferError<RefArray<N, R>>> {
		match self.concat(&other) {
			Ok(()) => {
				log::debug!("{} references transferred, source array released", other.count());
				Ok(())
			},
			Err(e) => Err(TransferError::new(e, other))
		}
	}

	/// Appends slots from another buffer.
	fn append_slots(&mut self, other: &[Slot<R>]) -> Result<()> {
		let additional = other.len();
		if additional == 0 {
			return Ok(())
		}

		self.buf.try_reserve(additional)?;

		let count = self.count();
		unsafe {
			ptr::copy_nonoverlapping(other.as_ptr(), self.buf.as_mut_ptr().add(count), additional);
			self.buf.set_count(count + additional);
		}

		Ok(())
	}
}

fn out_of_bounds(operation: &str, index: usize, count: usize) -> Error {
	log::warn!("cannot {} index {}: array holds {} references", operation, index, count);
	Error::OutOfBounds { index, count }
}

// Central function for allocation error handling in infallible contexts.
#[inline]
fn handle_reserve<T>(result: Result<T>) -> T {
	match result {
		Err(Error::AllocError { layout }) => handle_alloc_error(layout),
		Err(_) => capacity_overflow(),
		Ok(t) => t
	}
}

fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}

impl<M: Meta, R: Opaque> Clone for RefArray<M, R> {
	/// Shallow copy, possibly empty.
	///
	/// # Panics
	///
	/// Panics or aborts if the allocation fails.
	fn clone(&self) -> Self {
		let mut copy = handle_reserve(Self::with_capacity(self.capacity()));
		handle_reserve(copy.append_slots(self.slots()));
		copy
	}
}

impl<M: Meta, R: Opaque> fmt::Debug for RefArray<M, R> where R: fmt::Debug {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

/// Iterator over the references of a [`RefArray`].
pub struct Iter<'a, R> {
	slots: slice::Iter<'a, Slot<R>>
}

impl<'a, R: Opaque> Iterator for Iter<'a, R> {
	type Item = R;

	#[inline]
	fn next(&mut self) -> Option<R> {
		self.slots.next().map(Slot::get)
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		self.slots.size_hint()
	}
}

impl<'a, R: Opaque> DoubleEndedIterator for Iter<'a, R> {
	#[inline]
	fn next_back(&mut self) -> Option<R> {
		self.slots.next_back().map(Slot::get)
	}
}

impl<'a, R: Opaque> ExactSizeIterator for Iter<'a, R> {}

impl<'a, R: Opaque> FusedIterator for Iter<'a, R> {}

impl<'a, M: Meta, R: Opaque> IntoIterator for &'a RefArray<M, R> {
	type Item = R;
	type IntoIter = Iter<'a, R>;

	#[inline]
	fn into_iter(self) -> Iter<'a, R> {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		Error,
		RefArray
	};

	fn array_of(values: &[usize]) -> RefArray<usize> {
		let mut array = RefArray::with_capacity(values.len()).unwrap();
		for &v in values {
			array.append(v).unwrap();
		}
		array
	}

	fn contents(array: &RefArray<usize>) -> Vec<usize> {
		array.iter().collect()
	}

	#[test]
	fn new_uses_default_capacity() {
		let array: RefArray<usize> = RefArray::new().unwrap();
		assert_eq!(array.count(), 0);
		assert_eq!(array.capacity(), super::DEFAULT_CAPACITY);
	}

	#[test]
	fn zero_capacity_allocates_on_append() {
		let mut array: RefArray<usize> = RefArray::with_capacity(0).unwrap();
		assert_eq!(array.capacity(), 0);
		array.append(1).unwrap();
		assert_eq!(contents(&array), [1]);
		assert!(array.capacity() >= 1);
	}

	#[test]
	fn get_out_of_range_is_none() {
		let array = array_of(&[1, 2]);
		assert_eq!(array.get(1), Some(2));
		assert_eq!(array.get(2), None);
		assert_eq!(array.first(), Some(1));
		assert_eq!(array.last(), Some(2));
	}

	#[test]
	fn set_overwrites_in_range_only() {
		let mut array = array_of(&[1, 2]);
		array.set(0, 9).unwrap();
		assert_eq!(array.set(2, 9), Err(Error::OutOfBounds { index: 2, count: 2 }));
		assert_eq!(contents(&array), [9, 2]);
	}

	#[test]
	fn insert_past_the_end_appends() {
		let mut array = array_of(&[1, 2]);
		array.insert_at(3, 42).unwrap();
		assert_eq!(contents(&array), [1, 2, 3]);
	}

	#[test]
	fn insert_in_the_middle_shifts_up() {
		let mut array = array_of(&[1, 3]);
		array.insert_at(2, 1).unwrap();
		assert_eq!(contents(&array), [1, 2, 3]);
	}

	#[test]
	fn prepend_grows_full_array() {
		let mut array = array_of(&[2, 3]);
		assert_eq!(array.capacity(), 2);
		array.prepend(1).unwrap();
		assert_eq!(contents(&array), [1, 2, 3]);
		assert!(array.capacity() > 2);
	}

	#[test]
	fn delete_at_shifts_down() {
		let mut array = array_of(&[1, 2, 3, 4]);
		array.delete_at(3).unwrap();
		array.delete_at(0).unwrap();
		assert_eq!(contents(&array), [2, 3]);
		assert_eq!(array.delete_at(2), Err(Error::OutOfBounds { index: 2, count: 2 }));
		assert_eq!(contents(&array), [2, 3]);
	}

	#[test]
	fn delete_last_on_empty_array_fails() {
		let mut array = array_of(&[1]);
		array.delete_last().unwrap();
		assert!(array.is_empty());
		assert_eq!(array.delete_last(), Err(Error::Empty));
	}

	#[test]
	fn delete_by_value_reports_missing_values() {
		let mut array = array_of(&[1, 2]);
		assert_eq!(array.delete_by_value(3), Err(Error::NotFound));
		array.delete_by_value(1).unwrap();
		assert_eq!(contents(&array), [2]);
	}

	#[test]
	fn swap_checks_both_indexes() {
		let mut array = array_of(&[1, 2, 3]);
		array.swap(0, 2).unwrap();
		assert_eq!(contents(&array), [3, 2, 1]);
		array.swap(1, 1).unwrap();
		assert_eq!(array.swap(0, 3), Err(Error::OutOfBounds { index: 3, count: 3 }));
		assert_eq!(array.swap(5, 0), Err(Error::OutOfBounds { index: 5, count: 3 }));
		assert_eq!(contents(&array), [3, 2, 1]);
	}

	#[test]
	fn swap_same_index_out_of_range_is_noop() {
		let mut array = array_of(&[1]);
		assert_eq!(array.swap(4, 4), Ok(()));
	}

	#[test]
	fn clear_keeps_capacity() {
		let mut array = array_of(&[1, 2, 3]);
		let capacity = array.capacity();
		array.clear();
		assert!(array.is_empty());
		assert_eq!(array.capacity(), capacity);
		assert_eq!(array.get(0), None);
	}

	#[test]
	fn copy_of_empty_array_fails() {
		let array: RefArray<usize> = RefArray::new().unwrap();
		assert_eq!(array.try_copy().err(), Some(Error::Empty));
		assert!(array.clone().is_empty());
	}

	#[test]
	fn copy_keeps_capacity() {
		let mut array = array_of(&[1, 2]);
		array.try_reserve(10).unwrap();
		let copy = array.try_copy().unwrap();
		assert_eq!(copy.capacity(), array.capacity());
		assert_eq!(contents(&copy), [1, 2]);
	}

	#[test]
	fn for_each_with_context_threads_the_context() {
		let array = array_of(&[1, 2, 3]);
		let mut seen = Vec::new();
		array.for_each_with_context(|r, seen: &mut Vec<usize>| seen.push(r), &mut seen);
		assert_eq!(seen, [1, 2, 3]);
	}

	#[test]
	fn iterates_both_ways() {
		let array = array_of(&[1, 2, 3]);
		assert_eq!(array.iter().len(), 3);
		assert_eq!(array.iter().rev().collect::<Vec<_>>(), [3, 2, 1]);
		assert_eq!((&array).into_iter().sum::<usize>(), 6);
	}

	#[test]
	fn debug_lists_references() {
		let array = array_of(&[1, 2]);
		assert_eq!(format!("{:?}", array), "[1, 2]");
	}
}
