use crate::parser::{self, ParseError, PortParser};
use log::debug;
use portmap::Port;
use thiserror::Error;

/// Interface identifiers with an embedded schema source
pub const SUPPORTED_INTERFACES: &[&str] = &["atlys"];

/// Well-known clock signal name shared by all interface schemas
pub const INTERFACE_CLK_SIGNAL: &str = "CLK";

/// Bus signal names reserved by every schema; these become internal wires
/// of the generated wrapper instead of wrapper ports
pub const DATA_INPUT_PORT_NAME: &str = "DATA_RX";
pub const DATA_OUTPUT_PORT_NAME: &str = "DATA_TX";
pub const ADDRESS_PORT_NAME: &str = "ADDR";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
	#[error("unknown interface schema '{0}'")]
	UnknownInterface(String),

	#[error("interface schema '{0}' does not define a clock port")]
	MissingClock(String),

	#[error("interface schema '{0}' has no module declaration")]
	MissingModuleName(String),

	#[error(transparent)]
	ParseError(#[from] ParseError),
}

/// Fixed definition of the generic host-facing bus
///
/// Loaded from a source embedded in the crate, never from the output
/// directory, so an unknown identifier fails before any file is touched.
#[derive(Clone, Debug)]
pub struct InterfaceSchema {
	name: String,
	module_name: String,
	source: &'static str,
	ports: Vec<Port>,
}

impl InterfaceSchema {
	pub fn is_supported(name: &str) -> bool {
		SUPPORTED_INTERFACES.contains(&name)
	}

	pub fn load(name: &str) -> Result<Self, SchemaError> {
		let source = match name {
			"atlys" => include_str!("../hdl/interfaces/atlys/interface_atlys.v"),
			_ => return Err(SchemaError::UnknownInterface(name.to_string())),
		};
		let module_name = parser::module_name(source)
			.ok_or_else(|| SchemaError::MissingModuleName(name.to_string()))?;
		let clock_ports = vec![INTERFACE_CLK_SIGNAL.to_string()];
		let parsed = PortParser::new(&clock_ports).parse(source)?;
		let schema = Self {
			name: name.to_string(),
			module_name,
			source,
			ports: parsed.ports,
		};
		schema.clock_port()?;
		debug!("loaded interface schema '{}' with {} ports", name, schema.ports.len());
		Ok(schema)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Name of the interface's Verilog module
	pub fn module_name(&self) -> &str {
		&self.module_name
	}

	/// Full Verilog source of the interface module
	pub fn source(&self) -> &'static str {
		self.source
	}

	/// File name the interface source is copied under
	pub fn file_name(&self) -> String {
		format!("interface_{}.v", self.name)
	}

	/// Ports of the interface module, in declaration order
	pub fn ports(&self) -> &[Port] {
		&self.ports
	}

	/// The single port marking the bus's driving clock
	pub fn clock_port(&self) -> Result<&Port, SchemaError> {
		self.ports
			.iter()
			.find(|port| port.is_clock)
			.ok_or_else(|| SchemaError::MissingClock(self.name.clone()))
	}

	pub fn is_reserved_bus_signal(name: &str) -> bool {
		name == DATA_INPUT_PORT_NAME || name == DATA_OUTPUT_PORT_NAME || name == ADDRESS_PORT_NAME
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn unknown_identifier_is_rejected() {
		assert_eq!(
			InterfaceSchema::load("nexys").map(|_| ()),
			Err(SchemaError::UnknownInterface("nexys".into()))
		);
		assert!(!InterfaceSchema::is_supported("nexys"));
	}

	#[test]
	fn atlys_schema_has_the_reserved_bus_signals() {
		let schema = InterfaceSchema::load("atlys").unwrap();
		assert_eq!(schema.module_name(), "interface_atlys");
		let names: Vec<&str> = schema.ports().iter().map(|p| p.name.as_str()).collect();
		assert!(names.contains(&DATA_INPUT_PORT_NAME));
		assert!(names.contains(&DATA_OUTPUT_PORT_NAME));
		assert!(names.contains(&ADDRESS_PORT_NAME));
	}

	#[test]
	fn atlys_schema_has_exactly_one_clock() {
		let schema = InterfaceSchema::load("atlys").unwrap();
		assert_eq!(schema.clock_port().unwrap().name, INTERFACE_CLK_SIGNAL);
		assert_eq!(schema.ports().iter().filter(|p| p.is_clock).count(), 1);
	}
}
