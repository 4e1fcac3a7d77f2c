use crate::port::Address;
use log::warn;
use thiserror::Error;

/// A failed register-bus round trip, reported by the device link
///
/// The engine never retries; callers decide what a failed transaction means.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("register bus transaction failed: {reason}")]
pub struct LinkError {
	pub reason: String,
}

impl LinkError {
	pub fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
		}
	}
}

/// Byte-register transport to the programmed device
///
/// Every call is one blocking round trip over a single-owner link. Writes
/// land in the wrapper's input mux, reads come from its output mux; the two
/// address namespaces are disambiguated by the transaction type. Multi-byte
/// values are composed from single-byte transactions by the caller.
pub trait RegisterBus {
	fn read(&mut self, address: Address) -> Result<u8, LinkError>;
	fn write(&mut self, address: Address, value: u8) -> Result<(), LinkError>;
}

/// Stand-in link used when no device interface is configured
///
/// Accepts every transaction and returns zeroes, so host-side code can be
/// exercised without hardware attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBus;

impl RegisterBus for NullBus {
	fn read(&mut self, address: Address) -> Result<u8, LinkError> {
		warn!("null register bus: read from {} returns 0", address);
		Ok(0)
	}

	fn write(&mut self, address: Address, value: u8) -> Result<(), LinkError> {
		warn!("null register bus: write of {:#04x} to {} discarded", value, address);
		Ok(())
	}
}
