use crate::map::{PortMap, PortMapError};
use crate::port::Port;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error(transparent)]
	IoError(#[from] std::io::Error),

	#[error(transparent)]
	JsonError(#[from] serde_json::Error),

	#[error(transparent)]
	PortMapError(#[from] PortMapError),
}

/// Canonical interchange document tying a port list to an interface schema
///
/// This is what the generator persists next to the synthesized wrapper and
/// what the host driver loads at run time. Port order in the document equals
/// declaration order in the parsed module source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortDocument {
	/// Interface schema the wrapper was generated against
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fpga_interface: Option<String>,

	/// Optional programming image for the host-side shell
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bitfile_path: Option<PathBuf>,

	pub ports: Vec<Port>,
}

impl PortDocument {
	pub fn new(ports: Vec<Port>, fpga_interface: Option<String>) -> Self {
		Self {
			fpga_interface,
			bitfile_path: None,
			ports,
		}
	}

	pub fn from_json(json: &str) -> Result<Self, DocumentError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn to_json(&self) -> Result<String, DocumentError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	pub fn load(path: &Path) -> Result<Self, DocumentError> {
		Self::from_json(&std::fs::read_to_string(path)?)
	}

	pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
		std::fs::write(path, self.to_json()?)?;
		Ok(())
	}

	/// Builds the name-addressable registry over this document's ports
	pub fn port_map(&self) -> Result<PortMap, PortMapError> {
		PortMap::new(self.ports.clone())
	}
}
