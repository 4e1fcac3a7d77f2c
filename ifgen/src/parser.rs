use crate::alloc::AddressAllocator;
use lazy_static::lazy_static;
use log::debug;
use portmap::{Direction, Port, PortDocument};
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

pub const PARAMETER_KEYWORD: &str = "parameter";
const REG_KEYWORD: &str = "reg";
const COMMENT_MARKER: &str = "//";

lazy_static! {
	static ref PARAM_VALUE_REGEX: Regex = Regex::new(r"([0-9]+)[;,]*").unwrap();
	static ref SIGNAL_NAME_REGEX: Regex = Regex::new(r"[^;,\s]+").unwrap();
	static ref MODULE_NAME_REGEX: Regex = Regex::new(r"^\s*module\s+([a-zA-Z0-9_-]+)").unwrap();
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
	#[error("cannot resolve vector range bound '{0}' to a literal or parameter")]
	UnresolvedRangeBound(String),

	#[error("vector range [{msb}:{lsb}] has its bounds reversed")]
	InvalidRange { msb: u32, lsb: u32 },

	#[error("malformed parameter declaration '{0}'")]
	MalformedParameter(String),

	#[error("unrecognized port direction '{0}'")]
	UnknownDirection(String),

	#[error("{enables} inout enable signals given for {levels} active levels")]
	EnableListMismatch { enables: usize, levels: usize },
}

/// Finds the first `module <name>` declaration in a source text
pub fn module_name(source: &str) -> Option<String> {
	source
		.lines()
		.find_map(|line| MODULE_NAME_REGEX.captures(line).map(|c| c[1].to_string()))
}

/// Result of one parse pass over one module's text
#[derive(Clone, Debug)]
pub struct ParsedModule {
	pub ports: Vec<Port>,
	pub parameters: HashMap<String, u32>,
}

impl ParsedModule {
	pub fn into_document(self, fpga_interface: Option<String>) -> PortDocument {
		PortDocument::new(self.ports, fpga_interface)
	}

	pub fn has_inout_ports(&self) -> bool {
		self.ports.iter().any(|p| p.direction == Direction::Inout)
	}
}

/// Line-oriented scanner for port declarations of one hardware module
///
/// Single pass, single module: the parameter table, the inout enable queue
/// and the address counters all live for exactly one `parse` call. Port
/// order equals declaration order, and that order drives address
/// allocation, so no reordering is permitted anywhere downstream.
pub struct PortParser {
	clock_ports: Vec<String>,
	inout_enables: VecDeque<(String, u8)>,
	parameters: HashMap<String, u32>,
	allocator: AddressAllocator,
	ports: Vec<Port>,
}

impl PortParser {
	pub fn new(clock_ports: &[String]) -> Self {
		Self {
			clock_ports: clock_ports.to_vec(),
			inout_enables: VecDeque::new(),
			parameters: HashMap::new(),
			allocator: AddressAllocator::new(),
			ports: Vec::new(),
		}
	}

	/// Attaches tri-state enable pairs for inout ports. Both lists are
	/// ordered and consumed against inout declarations as they appear in
	/// the source, not by name.
	pub fn with_inout_enables(
		clock_ports: &[String],
		enable_signals: &[String],
		active_levels: &[u8],
	) -> Result<Self, ParseError> {
		if enable_signals.len() != active_levels.len() {
			return Err(ParseError::EnableListMismatch {
				enables: enable_signals.len(),
				levels: active_levels.len(),
			});
		}
		let mut parser = Self::new(clock_ports);
		parser.inout_enables = enable_signals
			.iter()
			.cloned()
			.zip(active_levels.iter().copied())
			.collect();
		Ok(parser)
	}

	/// Scans the source text line by line and returns the ordered
	/// descriptor list together with the resolved parameter table.
	///
	/// Any failure aborts the whole pass; a partially parsed module is
	/// never returned.
	pub fn parse(mut self, source: &str) -> Result<ParsedModule, ParseError> {
		for line in source.lines() {
			let tokens: Vec<&str> = line.split_whitespace().collect();
			let first = match tokens.first() {
				Some(first) => *first,
				None => continue,
			};
			if first.contains(COMMENT_MARKER) {
				continue;
			}
			if first == PARAMETER_KEYWORD {
				self.parse_parameter(&tokens)?;
			}
			else if is_port_declaration(first) {
				self.parse_port_definition(&tokens)?;
			}
		}
		debug!(
			"parsed {} ports, {} parameters",
			self.ports.len(),
			self.parameters.len()
		);
		Ok(ParsedModule {
			ports: self.ports,
			parameters: self.parameters,
		})
	}

	fn parse_parameter(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
		let joined = tokens.join(" ");
		if tokens.len() < 2 {
			return Err(ParseError::MalformedParameter(joined));
		}
		let value: u32 = PARAM_VALUE_REGEX
			.captures(&joined)
			.and_then(|c| c[1].parse().ok())
			.ok_or_else(|| ParseError::MalformedParameter(joined.clone()))?;
		self.parameters.insert(tokens[1].to_string(), value);
		Ok(())
	}

	fn parse_port_definition(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
		// outputs may carry a storage qualifier
		let mut tokens: Vec<&str> = tokens.to_vec();
		if let Some(position) = tokens.iter().position(|t| *t == REG_KEYWORD) {
			tokens.remove(position);
		}

		let direction: Direction = tokens[0]
			.parse()
			.map_err(|_| ParseError::UnknownDirection(tokens[0].to_string()))?;

		let (bit_width, name_tokens) = match tokens.get(1) {
			Some(range) if range.starts_with('[') && range.contains(']') => {
				(self.resolve_range(range)?, &tokens[2..])
			},
			_ => (1, &tokens[1..]),
		};

		for name in extract_signal_names(name_tokens) {
			let is_clock = self.clock_ports.iter().any(|clock| *clock == name);
			let (enable_signal, enable_signal_active) = if direction == Direction::Inout {
				match self.inout_enables.pop_front() {
					Some((signal, level)) => (Some(signal), Some(level)),
					None => (None, None),
				}
			}
			else {
				(None, None)
			};
			let addresses = self.allocator.allocate(direction, bit_width);
			self.ports.push(Port {
				name,
				is_clock,
				bit_width,
				direction,
				enable_signal,
				enable_signal_active,
				addresses,
			});
		}
		Ok(())
	}

	/// Resolves a `[msb:lsb]` range to a bit width. Bounds may be integer
	/// literals or previously declared parameter identifiers.
	fn resolve_range(&self, token: &str) -> Result<u32, ParseError> {
		let inner: String = token.chars().filter(|c| *c != '[' && *c != ']').collect();
		let mut bounds = inner.split(':');
		let msb = self.resolve_bound(bounds.next().unwrap_or(""))?;
		let lsb = self.resolve_bound(bounds.next().unwrap_or(""))?;
		match msb.checked_sub(lsb) {
			Some(delta) => Ok(delta + 1),
			None => Err(ParseError::InvalidRange { msb, lsb }),
		}
	}

	fn resolve_bound(&self, token: &str) -> Result<u32, ParseError> {
		if let Some(value) = self.parameters.get(token) {
			return Ok(*value);
		}
		token
			.parse()
			.map_err(|_| ParseError::UnresolvedRangeBound(token.to_string()))
	}
}

fn is_port_declaration(token: &str) -> bool {
	[Direction::Input, Direction::Output, Direction::Inout]
		.iter()
		.any(|direction| token.contains(direction.keyword()))
}

/// One or more comma-terminated signal names may share a declaration line
fn extract_signal_names(tokens: &[&str]) -> Vec<String> {
	let joined = tokens.join(" ");
	SIGNAL_NAME_REGEX
		.find_iter(&joined)
		.map(|m| m.as_str().to_string())
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;
	use portmap::Address;

	#[test]
	fn scalar_and_vector_ports_are_sized() {
		let clock = vec!["CLK".to_string()];
		let parsed = PortParser::new(&clock)
			.parse("input CLK;\ninput [7:0] DATA_IN;\noutput [7:0] DATA_OUT;\n")
			.unwrap();
		assert_eq!(parsed.ports.len(), 3);
		assert!(parsed.ports[0].is_clock);
		assert_eq!(parsed.ports[0].addresses, [Address(0)]);
		assert_eq!(parsed.ports[1].bit_width, 8);
		assert_eq!(parsed.ports[1].addresses, [Address(1)]);
		assert_eq!(parsed.ports[2].bit_width, 8);
		assert_eq!(parsed.ports[2].addresses, [Address(0)]);
	}

	#[test]
	fn parameters_resolve_range_bounds() {
		let parsed = PortParser::new(&[])
			.parse("parameter WIDTH = 16;\ninput [WIDTH:1] BUS;\n")
			.unwrap();
		assert_eq!(parsed.parameters["WIDTH"], 16);
		assert_eq!(parsed.ports[0].bit_width, 16);
		assert_eq!(parsed.ports[0].addresses.len(), 2);
	}

	#[test]
	fn unresolved_bound_aborts_the_pass() {
		let result = PortParser::new(&[]).parse("input [BOGUS:0] BUS;\n");
		assert_eq!(
			result.map(|_| ()),
			Err(ParseError::UnresolvedRangeBound("BOGUS".into()))
		);
	}

	#[test]
	fn comment_lines_are_skipped() {
		let parsed = PortParser::new(&[])
			.parse("// input NOT_A_PORT;\ninput REAL_PORT;\n")
			.unwrap();
		assert_eq!(parsed.ports.len(), 1);
		assert_eq!(parsed.ports[0].name, "REAL_PORT");
	}

	#[test]
	fn several_names_share_one_declaration() {
		let parsed = PortParser::new(&[]).parse("input A, B, C;\n").unwrap();
		let names: Vec<&str> = parsed.ports.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["A", "B", "C"]);
		assert_eq!(parsed.ports[2].addresses, [Address(2)]);
	}

	#[test]
	fn reg_qualifier_is_stripped() {
		let parsed = PortParser::new(&[]).parse("output reg [3:0] STATE;\n").unwrap();
		assert_eq!(parsed.ports[0].name, "STATE");
		assert_eq!(parsed.ports[0].bit_width, 4);
	}

	#[test]
	fn enable_pairs_are_consumed_in_declaration_order() {
		let enables = vec!["EN_A".to_string(), "EN_B".to_string()];
		let parser =
			PortParser::with_inout_enables(&[], &enables, &[0, 1]).unwrap();
		let parsed = parser
			.parse("inout [7:0] PORT_A;\ninout [7:0] PORT_B;\noutput EN_A;\noutput EN_B;\n")
			.unwrap();
		assert_eq!(parsed.ports[0].enable_signal.as_deref(), Some("EN_A"));
		assert_eq!(parsed.ports[0].enable_signal_active, Some(0));
		assert_eq!(parsed.ports[1].enable_signal.as_deref(), Some("EN_B"));
		assert_eq!(parsed.ports[1].enable_signal_active, Some(1));
	}

	#[test]
	fn mismatched_enable_lists_are_rejected() {
		let enables = vec!["EN_A".to_string()];
		assert_eq!(
			PortParser::with_inout_enables(&[], &enables, &[0, 1]).map(|_| ()),
			Err(ParseError::EnableListMismatch {
				enables: 1,
				levels: 2
			})
		);
	}

	#[test]
	fn module_name_is_found_in_source() {
		assert_eq!(
			module_name("// header\nmodule counter (\n"),
			Some("counter".to_string())
		);
		assert_eq!(module_name("wire x;\n"), None);
	}
}
