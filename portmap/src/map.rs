use crate::port::Port;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when building or querying a port map
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PortMapError {
	#[error("port '{0}' is not defined in this port map")]
	UnknownPort(String),

	#[error("port '{0}' is defined more than once")]
	DuplicatePort(String),

	#[error("port has no name")]
	MissingName,

	#[error("port '{name}' declares {actual} addresses, expected {expected}")]
	AddressCountMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},
}

/// Ordered, name-addressable collection of port descriptors
///
/// Iteration order is declaration order; lookups by name fail explicitly
/// instead of yielding a default descriptor.
#[derive(Clone, Debug, Default)]
pub struct PortMap {
	ports: Vec<Port>,
	by_name: HashMap<String, usize>,
}

impl PortMap {
	/// Builds a map from an ordered descriptor list, validating the
	/// per-port invariants of the canonical document
	pub fn new(ports: Vec<Port>) -> Result<Self, PortMapError> {
		let mut by_name = HashMap::with_capacity(ports.len());
		for (index, port) in ports.iter().enumerate() {
			if port.name.is_empty() {
				return Err(PortMapError::MissingName);
			}
			if port.addresses.len() != port.chunk_count() {
				return Err(PortMapError::AddressCountMismatch {
					name: port.name.clone(),
					expected: port.chunk_count(),
					actual: port.addresses.len(),
				});
			}
			if by_name.insert(port.name.clone(), index).is_some() {
				return Err(PortMapError::DuplicatePort(port.name.clone()));
			}
		}
		Ok(Self { ports, by_name })
	}

	/// Resolves a symbolic port name to its descriptor
	pub fn lookup(&self, name: &str) -> Result<&Port, PortMapError> {
		self.get(name)
			.ok_or_else(|| PortMapError::UnknownPort(name.into()))
	}

	pub fn get(&self, name: &str) -> Option<&Port> {
		self.by_name.get(name).map(|index| &self.ports[*index])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Ports in declaration order
	pub fn iter(&self) -> impl Iterator<Item = &Port> {
		self.ports.iter()
	}

	pub fn len(&self) -> usize {
		self.ports.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ports.is_empty()
	}
}

impl<'a> IntoIterator for &'a PortMap {
	type Item = &'a Port;
	type IntoIter = std::slice::Iter<'a, Port>;

	fn into_iter(self) -> Self::IntoIter {
		self.ports.iter()
	}
}
