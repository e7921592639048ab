//! This crate provides the
//! [`RefArray`](crate::generic::RefArray)
//! data structure: an automatically growing array of opaque references.
//! The array owns the contiguous buffer holding its references,
//! but never the data they designate.
//! It is meant as a low-level building block for larger programs that keep
//! track of objects owned elsewhere (entities in an arena, nodes of a scene, etc.).
//!
//! ## Basic usage
//!
//! Any `Copy` handle implementing [`Opaque`] can be stored:
//! references, raw pointers, or integer indexes into an external arena.
//! ```rust
//! use ref_array::RefArray;
//!
//! let entities = ["x", "y", "z"];
//! let mut array: RefArray<&&str> = RefArray::with_capacity(2)?;
//! array.append(&entities[0])?;
//! array.append(&entities[2])?; // capacity reached.
//! array.insert_at(&entities[1], 1)?; // the buffer grows here, transparently.
//! assert_eq!(array.iter().copied().collect::<Vec<_>>(), ["x", "y", "z"]);
//!
//! array.delete_by_value(&entities[0])?; // `entities` is not affected.
//! assert_eq!(array.count(), 2);
//! # Ok::<(), ref_array::Error>(())
//! ```
//!
//! References are compared by identity, never by value:
//! ```rust
//! # use ref_array::RefArray;
//! let (a, b) = (String::from("same"), String::from("same"));
//! let mut array: RefArray<&String> = RefArray::new()?;
//! array.append(&a)?;
//! assert_eq!(array.index_of(&a), Some(0));
//! assert_eq!(array.index_of(&b), None);
//! # Ok::<(), ref_array::Error>(())
//! ```
//!
//! ## Ownership transfers
//!
//! [`concat`](crate::generic::RefArray::concat) copies the references of another array,
//! which keeps them.
//! [`concat_and_free`](crate::generic::RefArray::concat_and_free) consumes the other array
//! and releases its buffer; the references it held now only live in the first array.
//! ```rust
//! # use ref_array::RefArray;
//! let mut a: RefArray<usize> = RefArray::new()?;
//! let mut b: RefArray<usize> = RefArray::new()?;
//! a.append(1)?;
//! b.append(2)?;
//! a.concat(&b)?;
//! a.concat_and_free(b).map_err(|e| e.error().clone())?;
//! assert_eq!(a.iter().collect::<Vec<_>>(), [1, 2, 2]);
//! # Ok::<(), ref_array::Error>(())
//! ```
//!
//! ## Diagnostics
//!
//! Invalid indexes and missing values are not fatal:
//! the operation does nothing, reports an [`Error`] and emits a warning through the
//! [`log`](https://crates.io/crates/log) facade.

pub mod error;
pub mod slot;
pub mod raw;
pub mod generic;
pub mod nullable;
pub mod wide;
#[cfg(target_pointer_width = "64")]
pub mod lean;
#[cfg(not(target_pointer_width = "64"))]
pub mod lean {
	/// Re-exports `wide` for non-64-bit targets
	pub use super::wide::*;
}

pub use error::{
	Error,
	Result,
	TransferError
};
pub use slot::{
	Opaque,
	Slot
};
pub use generic::DEFAULT_CAPACITY;
pub use wide::RefArray;
