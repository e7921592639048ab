/// Metadata storing the count and size of the array with two `usize`.
#[derive(Clone, Copy, Debug)]
pub struct Meta {
	count: usize,
	size: usize
}

impl crate::generic::Meta for Meta {
	const MAX_LENGTH: usize = std::usize::MAX;

	fn new(count: usize, size: usize) -> Self {
		Meta {
			count,
			size
		}
	}

	fn count(&self) -> usize {
		self.count
	}

	fn size(&self) -> usize {
		self.size
	}

	fn set_count(&mut self, count: usize) {
		self.count = count
	}

	fn set_size(&mut self, size: usize) {
		self.size = size
	}
}

pub type RefArray<R> = crate::generic::RefArray<Meta, R>;
