use core::{
	alloc::Layout,
	mem,
	ptr::NonNull,
	slice,
	cmp
};
use std::alloc;
use crate::{
	generic::Meta,
	slot::Slot,
	error::{
		Error,
		Result
	}
};

/// A low-level utility for managing the slot buffer of a reference array.
///
/// This type does not in anyway inspect the memory that it manages. When dropped it *will*
/// free its memory, but it has nothing else to release: slots only hold `Copy` references
/// whose referents are owned by someone else.
///
/// Every allocating method is fallible. On failure the buffer is left untouched.
pub struct RawRefArray<M: Meta, R> {
	/// Metadata storing the count and size of the array.
	meta: M,

	/// Pointer to the slots, dangling while nothing is allocated.
	ptr: NonNull<Slot<R>>
}

// SAFETY: the buffer is uniquely owned, access goes through `&`/`&mut`.
unsafe impl<M: Meta + Send, R: Send> Send for RawRefArray<M, R> {}
unsafe impl<M: Meta + Sync, R: Sync> Sync for RawRefArray<M, R> {}

impl<M: Meta, R> Drop for RawRefArray<M, R> {
	fn drop(&mut self) {
		if let Some((ptr, layout)) = self.current_memory() {
			// SAFETY: `ptr` was allocated by the global allocator with `layout`.
			unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
		}
	}
}

impl<M: Meta, R> RawRefArray<M, R> {
	/// Creates an empty buffer without allocating.
	#[inline]
	pub fn new() -> Self {
		RawRefArray {
			meta: M::new(0, 0),
			ptr: NonNull::dangling()
		}
	}

	/// Creates a buffer able to hold exactly `capacity` slots.
	pub fn with_capacity(capacity: usize) -> Result<Self> {
		let mut raw = Self::new();
		if capacity > 0 {
			raw.grow_to(capacity)?;
		}

		Ok(raw)
	}

	/// Number of allocated slots.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.meta.size()
	}

	/// Number of occupied slots.
	#[inline]
	pub fn count(&self) -> usize {
		self.meta.count()
	}

	/// Sets the number of occupied slots.
	///
	/// ## Safety
	///
	/// `count` must not exceed the capacity and every slot in `[0, count)` must be initialized.
	#[inline]
	pub unsafe fn set_count(&mut self, count: usize) {
		debug_assert!(count <= self.capacity());
		self.meta.set_count(count)
	}

	/// Returns a raw pointer to the first slot.
	///
	/// Growing the buffer may reallocate it, which makes any previously returned pointer invalid.
	#[inline]
	pub fn as_ptr(&self) -> *const Slot<R> {
		self.ptr.as_ptr()
	}

	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut Slot<R> {
		self.ptr.as_ptr()
	}

	/// The occupied slots.
	#[inline]
	pub fn slots(&self) -> &[Slot<R>] {
		// SAFETY: slots `[0, count)` are initialized, `ptr` is aligned and non-null even when dangling.
		unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.count()) }
	}

	#[inline]
	pub fn slots_mut(&mut self) -> &mut [Slot<R>] {
		// SAFETY: see `slots`.
		unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.count()) }
	}

	/// Returns the current allocated memory and layout.
	///
	/// Returns `None` if nothing is allocated or if slots are zero-sized.
	fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
		let capacity = self.capacity();
		if capacity == 0 || mem::size_of::<Slot<R>>() == 0 {
			None
		} else {
			// We have an allocated chunk of memory, so we can bypass runtime
			// checks to get our current layout.
			unsafe {
				let align = mem::align_of::<Slot<R>>();
				let size = mem::size_of::<Slot<R>>() * capacity;
				let layout = Layout::from_size_align_unchecked(size, align);
				Some((self.ptr.cast(), layout))
			}
		}
	}

	/// Returns if the buffer needs to grow to fulfill the needed extra capacity.
	#[inline]
	pub fn needs_to_grow(&self, additional: usize) -> bool {
		additional > self.capacity().wrapping_sub(self.count())
	}

	/// Reserves capacity for at least `additional` more slots.
	///
	/// The capacity at least doubles so that repeated insertions are amortized.
	/// Does nothing if the capacity is already sufficient.
	pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
		if self.needs_to_grow(additional) {
			self.grow_amortized(additional)
		} else {
			Ok(())
		}
	}

	fn grow_amortized(&mut self, additional: usize) -> Result<()> {
		debug_assert!(additional > 0);

		let required_cap = self.count().checked_add(additional).ok_or(Error::CapacityOverflow)?;
		if required_cap > M::MAX_LENGTH {
			return Err(Error::CapacityOverflow)
		}

		// This guarantees exponential growth.
		let cap = cmp::max(self.capacity().saturating_mul(2), required_cap);

		// Tiny arrays are dumb. Skip to:
		// - 8 if the slot size is 1, because any heap allocators is likely
		//   to round up a request of less than 8 bytes to at least 8 bytes.
		// - 4 if slots are moderate-sized (<= 1 KiB).
		// - 1 otherwise, to avoid wasting too much space for very short arrays.
		let slot_size = mem::size_of::<Slot<R>>();
		let min_non_zero_cap = if slot_size == 1 {
			8
		} else if slot_size <= 1024 {
			4
		} else {
			1
		};
		let cap = cmp::min(cmp::max(min_non_zero_cap, cap), M::MAX_LENGTH);

		self.grow_to(cap)
	}

	/// Reallocates the buffer so that it holds exactly `capacity` slots.
	#[cold]
	fn grow_to(&mut self, capacity: usize) -> Result<()> {
		debug_assert!(capacity >= self.count());

		if capacity > M::MAX_LENGTH {
			return Err(Error::CapacityOverflow)
		}

		if mem::size_of::<Slot<R>>() == 0 {
			self.meta.set_size(capacity);
			return Ok(())
		}

		let new_layout = Layout::array::<Slot<R>>(capacity).map_err(|_| Error::CapacityOverflow)?;

		// `finish_grow` is non-generic over `R`.
		let ptr = finish_grow(new_layout, self.current_memory())?;

		log::debug!("slot buffer grown from {} to {} slots", self.capacity(), capacity);
		self.ptr = ptr.cast();
		self.meta.set_size(capacity);
		Ok(())
	}
}

// This function is outside `RawRefArray` to minimize compile times.
#[inline(never)]
fn finish_grow(new_layout: Layout, current_memory: Option<(NonNull<u8>, Layout)>) -> Result<NonNull<u8>> {
	alloc_guard(new_layout.size())?;

	let memory = if let Some((ptr, old_layout)) = current_memory {
		debug_assert_eq!(old_layout.align(), new_layout.align());
		// SAFETY: `ptr` was allocated with `old_layout`, the alignment is unchanged
		// and the new size is non-zero.
		unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) }
	} else {
		// SAFETY: callers never request a zero-sized layout.
		unsafe { alloc::alloc(new_layout) }
	};

	NonNull::new(memory).ok_or(Error::AllocError { layout: new_layout })
}

// We need to guarantee the following:
// * We don't ever allocate `> isize::MAX` byte-size objects.
// * We don't overflow `usize::MAX` and actually allocate too little.
//
// On 64-bit we just need to check for overflow since trying to allocate
// `> isize::MAX` bytes will surely fail. On 32-bit and 16-bit we need to add
// an extra guard for this in case we're running on a platform which can use
// all 4GB in user-space, e.g., PAE or x32.
#[inline]
fn alloc_guard(alloc_size: usize) -> Result<()> {
	if usize::BITS < 64 && alloc_size > isize::MAX as usize {
		Err(Error::CapacityOverflow)
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		lean,
		wide
	};

	type Raw = RawRefArray<wide::Meta, usize>;

	#[test]
	fn new_does_not_allocate() {
		let raw = Raw::new();
		assert_eq!(raw.capacity(), 0);
		assert_eq!(raw.count(), 0);
		assert!(raw.current_memory().is_none());
		assert!(raw.slots().is_empty());
	}

	#[test]
	fn with_capacity_is_exact() {
		let raw = Raw::with_capacity(5).unwrap();
		assert_eq!(raw.capacity(), 5);
		assert_eq!(raw.count(), 0);
	}

	#[test]
	fn reserve_doubles() {
		let mut raw = Raw::with_capacity(5).unwrap();
		unsafe { raw.set_count(5) };
		raw.try_reserve(1).unwrap();
		assert_eq!(raw.capacity(), 10);
	}

	#[test]
	fn reserve_starts_at_four_slots() {
		let mut raw = Raw::new();
		raw.try_reserve(1).unwrap();
		assert_eq!(raw.capacity(), 4);
	}

	#[test]
	fn reserve_honors_large_requests() {
		let mut raw = Raw::with_capacity(2).unwrap();
		raw.try_reserve(9).unwrap();
		assert_eq!(raw.capacity(), 9);
	}

	#[test]
	fn reserve_is_noop_with_room_left() {
		let mut raw = Raw::with_capacity(8).unwrap();
		let ptr = raw.as_ptr();
		raw.try_reserve(8).unwrap();
		assert_eq!(raw.capacity(), 8);
		assert_eq!(raw.as_ptr(), ptr);
	}

	#[test]
	fn growth_preserves_slots() {
		let mut raw = Raw::with_capacity(3).unwrap();
		unsafe {
			for i in 0..3 {
				raw.as_mut_ptr().add(i).write(Slot::new(i * 10));
			}
			raw.set_count(3);
		}

		raw.try_reserve(100).unwrap();
		let values: Vec<usize> = raw.slots().iter().map(|slot| slot.get()).collect();
		assert_eq!(values, [0, 10, 20]);
	}

	#[test]
	fn overflowing_count_is_rejected() {
		let mut raw = Raw::with_capacity(1).unwrap();
		unsafe { raw.set_count(1) };
		assert_eq!(raw.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
		assert_eq!(raw.capacity(), 1);
	}

	#[test]
	fn oversized_layout_is_rejected() {
		assert_eq!(Raw::with_capacity(usize::MAX / 2).err(), Some(Error::CapacityOverflow));
	}

	#[test]
	#[cfg(target_pointer_width = "64")]
	fn lean_capacity_is_bounded() {
		let result = RawRefArray::<lean::Meta, usize>::with_capacity(std::u32::MAX as usize + 1);
		assert_eq!(result.err(), Some(Error::CapacityOverflow));
	}
}
