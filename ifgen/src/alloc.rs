use portmap::{Address, Direction, CHUNK_WIDTH};

/// Assigns byte-register addresses to port chunks
///
/// Two independent monotonically increasing counters, one per bus
/// namespace. Output ports draw from the output counter; everything else,
/// clock and inout ports included, draws from the input counter. The
/// namespaces overlap numerically and are told apart by which mux array the
/// consuming side addresses.
#[derive(Clone, Debug, Default)]
pub struct AddressAllocator {
	next_input: u32,
	next_output: u32,
}

impl AddressAllocator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assigns one address per 8-bit chunk of a port, in ascending order.
	/// The first (lowest) address holds the least significant byte.
	pub fn allocate(&mut self, direction: Direction, bit_width: u32) -> Vec<Address> {
		let chunks = bit_width.div_ceil(CHUNK_WIDTH);
		let counter = match direction {
			Direction::Output => &mut self.next_output,
			_ => &mut self.next_input,
		};
		(0..chunks)
			.map(|_| {
				let address = Address(*counter);
				*counter += 1;
				address
			})
			.collect()
	}
}
