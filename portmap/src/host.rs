use crate::bus::{LinkError, RegisterBus};
use crate::document::PortDocument;
use crate::map::{PortMap, PortMapError};
use crate::port::Address;
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
	#[error(transparent)]
	PortMapError(#[from] PortMapError),

	#[error(transparent)]
	LinkError(#[from] LinkError),

	#[error("port '{0}' is not a clock port")]
	NotAClockPort(String),
}

/// Host-side view of a generated interface
///
/// Combines the loaded port registry with a register-bus link and translates
/// symbolic port accesses into byte transactions.
pub struct HostInterface {
	map: PortMap,
	bus: Box<dyn RegisterBus>,
}

impl HostInterface {
	pub fn new(document: &PortDocument, bus: Box<dyn RegisterBus>) -> Result<Self, PortMapError> {
		Ok(Self {
			map: document.port_map()?,
			bus,
		})
	}

	pub fn ports(&self) -> &PortMap {
		&self.map
	}

	/// Reads the first chunk of the named port
	///
	/// Only the lowest address is read here; composing a multi-chunk value
	/// out of several transactions is up to the caller.
	pub fn read(&mut self, name: &str) -> Result<u8, HostError> {
		let address = self.first_address(name)?;
		debug!("host read: port '{}' at address {}", name, address);
		self.transact(|bus| bus.read(address))
	}

	/// Writes one byte to the first chunk of the named port
	pub fn write(&mut self, name: &str, value: u8) -> Result<(), HostError> {
		let address = self.first_address(name)?;
		debug!("host write: {:#04x} to port '{}' at address {}", value, name, address);
		self.transact(|bus| bus.write(address, value))
	}

	/// Requests `cycles` synthesized clock edges on a clock port
	///
	/// The pulse generator in the wrapper produces exactly that many edges
	/// and then returns the clock line to idle.
	pub fn write_clock_cycles(&mut self, name: &str, cycles: u8) -> Result<(), HostError> {
		let port = self.map.lookup(name)?;
		if !port.is_clock {
			return Err(HostError::NotAClockPort(name.into()));
		}
		let address = port
			.first_address()
			.ok_or_else(|| PortMapError::AddressCountMismatch {
				name: name.into(),
				expected: 1,
				actual: 0,
			})?;
		debug!("host clock request: {} cycles on '{}' at address {}", cycles, name, address);
		self.transact(|bus| bus.write(address, cycles))
	}

	fn first_address(&self, name: &str) -> Result<Address, HostError> {
		let port = self.map.lookup(name)?;
		Ok(port
			.first_address()
			.ok_or_else(|| PortMapError::AddressCountMismatch {
				name: name.into(),
				expected: port.chunk_count(),
				actual: 0,
			})?)
	}

	fn transact<T>(
		&mut self,
		op: impl FnOnce(&mut dyn RegisterBus) -> Result<T, LinkError>,
	) -> Result<T, HostError> {
		match op(self.bus.as_mut()) {
			Ok(value) => Ok(value),
			Err(err) => {
				warn!("register bus failure: {}", err);
				Err(err.into())
			},
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::port::{Direction, Port};

	use std::cell::RefCell;
	use std::rc::Rc;

	/// Records transactions and fails on demand
	struct ScriptedBus {
		writes: Rc<RefCell<Vec<(Address, u8)>>>,
		fail: bool,
	}

	impl ScriptedBus {
		fn new(fail: bool) -> (Self, Rc<RefCell<Vec<(Address, u8)>>>) {
			let writes = Rc::new(RefCell::new(Vec::new()));
			(
				Self {
					writes: writes.clone(),
					fail,
				},
				writes,
			)
		}
	}

	impl RegisterBus for ScriptedBus {
		fn read(&mut self, address: Address) -> Result<u8, LinkError> {
			if self.fail {
				return Err(LinkError::new("device detached"));
			}
			Ok(address.0 as u8)
		}

		fn write(&mut self, address: Address, value: u8) -> Result<(), LinkError> {
			if self.fail {
				return Err(LinkError::new("device detached"));
			}
			self.writes.borrow_mut().push((address, value));
			Ok(())
		}
	}

	fn sample_document() -> PortDocument {
		PortDocument::new(
			vec![
				Port {
					name: "CLK".into(),
					is_clock: true,
					bit_width: 1,
					direction: Direction::Input,
					enable_signal: None,
					enable_signal_active: None,
					addresses: vec![Address(0)],
				},
				Port {
					name: "DATA_IN".into(),
					is_clock: false,
					bit_width: 8,
					direction: Direction::Input,
					enable_signal: None,
					enable_signal_active: None,
					addresses: vec![Address(1)],
				},
			],
			Some("atlys".into()),
		)
	}

	#[test]
	fn write_targets_first_chunk_address() {
		let (bus, writes) = ScriptedBus::new(false);
		let mut host = HostInterface::new(&sample_document(), Box::new(bus)).unwrap();
		host.write("DATA_IN", 0x42).unwrap();
		host.write_clock_cycles("CLK", 3).unwrap();
		assert_eq!(*writes.borrow(), [(Address(1), 0x42), (Address(0), 3)]);
	}

	#[test]
	fn clock_request_rejects_data_ports() {
		let (bus, _) = ScriptedBus::new(false);
		let mut host = HostInterface::new(&sample_document(), Box::new(bus)).unwrap();
		assert!(matches!(
			host.write_clock_cycles("DATA_IN", 1),
			Err(HostError::NotAClockPort(_))
		));
	}

	#[test]
	fn unknown_port_is_a_lookup_error() {
		let (bus, _) = ScriptedBus::new(false);
		let mut host = HostInterface::new(&sample_document(), Box::new(bus)).unwrap();
		assert!(matches!(
			host.read("NOT_A_PORT"),
			Err(HostError::PortMapError(PortMapError::UnknownPort(_)))
		));
	}

	#[test]
	fn link_failure_surfaces_as_error_not_panic() {
		let (bus, _) = ScriptedBus::new(true);
		let mut host = HostInterface::new(&sample_document(), Box::new(bus)).unwrap();
		assert!(matches!(host.read("DATA_IN"), Err(HostError::LinkError(_))));
		assert!(matches!(
			host.write("DATA_IN", 1),
			Err(HostError::LinkError(_))
		));
	}
}
