use core::{
	alloc::Layout,
	fmt
};
use thiserror::Error;

/// Errors reported by reference arrays.
///
/// Every operation that can fail reports through this type.
/// Nothing is retried internally and the array is left as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// The allocator could not provide the requested memory.
	#[error("memory allocation of {} bytes failed", .layout.size())]
	AllocError {
		layout: Layout
	},

	/// The requested capacity exceeds what the metadata format (or the address space) can hold.
	#[error("capacity overflow")]
	CapacityOverflow,

	/// Index out of the occupied range `[0, count)`.
	#[error("index {index} out of bounds for count {count}")]
	OutOfBounds {
		index: usize,
		count: usize
	},

	/// No slot holds the searched reference.
	#[error("reference not found")]
	NotFound,

	/// The array holds no element.
	#[error("array is empty")]
	Empty,

	/// No array was given.
	#[error("no array")]
	Null
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by [`RefArray::concat_and_free`](crate::generic::RefArray::concat_and_free).
///
/// The consumed array is handed back so that the caller keeps ownership of it.
#[derive(Error)]
#[error("array concatenation failed")]
pub struct TransferError<A> {
	#[source]
	error: Error,
	array: A
}

impl<A> TransferError<A> {
	pub(crate) fn new(error: Error, array: A) -> Self {
		TransferError { error, array }
	}

	/// Returns the cause of the failure.
	pub fn error(&self) -> &Error {
		&self.error
	}

	/// Gives back the array that was not consumed.
	pub fn into_inner(self) -> A {
		self.array
	}
}

impl<A> fmt::Debug for TransferError<A> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("TransferError").field("error", &self.error).finish_non_exhaustive()
	}
}
