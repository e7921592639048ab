use core::{
	fmt,
	ptr::{
		self,
		NonNull
	}
};

/// Opaque reference stored by a [`RefArray`](crate::generic::RefArray).
///
/// The array never dereferences the values it stores, it only copies them around
/// and compares them by identity when searching.
/// Pointer-like handles compare by address, integer handles (for instance indexes
/// into an external arena) compare by value.
pub trait Opaque: Copy {
	/// Returns `true` if `self` and `other` designate the same referent.
	fn same(&self, other: &Self) -> bool;
}

impl<'a, T: ?Sized> Opaque for &'a T {
	#[inline]
	fn same(&self, other: &Self) -> bool {
		ptr::eq(*self, *other)
	}
}

impl<T: ?Sized> Opaque for *const T {
	#[inline]
	fn same(&self, other: &Self) -> bool {
		ptr::eq(*self, *other)
	}
}

impl<T: ?Sized> Opaque for *mut T {
	#[inline]
	fn same(&self, other: &Self) -> bool {
		ptr::eq(*self, *other)
	}
}

impl<T: ?Sized> Opaque for NonNull<T> {
	#[inline]
	fn same(&self, other: &Self) -> bool {
		ptr::eq(self.as_ptr(), other.as_ptr())
	}
}

impl<R: Opaque> Opaque for Option<R> {
	#[inline]
	fn same(&self, other: &Self) -> bool {
		match (self, other) {
			(Some(a), Some(b)) => a.same(b),
			(None, None) => true,
			_ => false
		}
	}
}

macro_rules! impl_opaque_for_integers {
	($($ty:ty),*) => {
		$(
			impl Opaque for $ty {
				#[inline]
				fn same(&self, other: &Self) -> bool {
					*self == *other
				}
			}
		)*
	};
}

impl_opaque_for_integers!(usize, u32, u64);

/// One storage position of the array.
///
/// Only holds the reference for now.
/// Being `repr(transparent)`, a buffer of slots has the same layout as a buffer of `R`.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Slot<R> {
	data: R
}

impl<R: Opaque> Slot<R> {
	#[inline]
	pub fn new(data: R) -> Self {
		Slot { data }
	}

	/// Returns the stored reference.
	#[inline]
	pub fn get(&self) -> R {
		self.data
	}

	#[inline]
	pub fn set(&mut self, data: R) {
		self.data = data
	}

	/// Returns `true` if this slot holds the given reference.
	#[inline]
	pub fn holds(&self, data: &R) -> bool {
		self.data.same(data)
	}
}

impl<R: Opaque> fmt::Debug for Slot<R> where R: fmt::Debug {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.data.fmt(f)
	}
}
