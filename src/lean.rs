/// Metadata packing the count and size of the array in a single `usize`.
///
/// The count is stored in the upper 32 bits, the size in the lower 32 bits.
#[derive(Clone, Copy, Debug)]
pub struct Meta {
	data: usize
}

const SIZE_MASK: usize = std::u32::MAX as usize;
const COUNT_MASK: usize = (std::u32::MAX as usize) << 32;

impl crate::generic::Meta for Meta {
	const MAX_LENGTH: usize = std::u32::MAX as usize;

	fn new(count: usize, size: usize) -> Self {
		assert!(count <= Self::MAX_LENGTH);
		assert!(size <= Self::MAX_LENGTH);

		Meta {
			data: count << 32 | size
		}
	}

	fn count(&self) -> usize {
		self.data >> 32
	}

	fn size(&self) -> usize {
		self.data & SIZE_MASK
	}

	fn set_count(&mut self, count: usize) {
		assert!(count <= Self::MAX_LENGTH);
		self.data = (count << 32) | (self.data & SIZE_MASK)
	}

	fn set_size(&mut self, size: usize) {
		assert!(size <= Self::MAX_LENGTH);
		self.data = (self.data & COUNT_MASK) | size
	}
}

pub type RefArray<R> = crate::generic::RefArray<Meta, R>;

#[cfg(test)]
mod tests {
	use crate::generic::Meta as _;
	use super::Meta;

	#[test]
	fn count_and_size_are_independent() {
		let mut meta = Meta::new(3, 8);
		assert_eq!(meta.count(), 3);
		assert_eq!(meta.size(), 8);

		meta.set_size(std::u32::MAX as usize);
		assert_eq!(meta.count(), 3);
		assert_eq!(meta.size(), std::u32::MAX as usize);

		meta.set_count(7);
		assert_eq!(meta.count(), 7);
		assert_eq!(meta.size(), std::u32::MAX as usize);
	}

	#[test]
	#[should_panic]
	fn rejects_oversized_count() {
		Meta::new(std::u32::MAX as usize + 1, 0);
	}

	#[test]
	fn lean_array_behaves_like_wide() {
		let mut array: super::RefArray<usize> = super::RefArray::with_capacity(2).unwrap();
		for i in 0..10 {
			array.append(i).unwrap();
		}
		assert_eq!(array.count(), 10);
		assert!(array.capacity() >= 10);
		assert_eq!(array.iter().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
	}
}
