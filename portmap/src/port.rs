use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of one register chunk on the host-facing bus (in bits)
pub const CHUNK_WIDTH: u32 = 8;

/// Byte address of one register chunk
///
/// Serialized as a lowercase hex string with no prefix and no padding
/// (decimal 10 becomes "a"). Input and output addresses live in separate
/// namespaces, so the numeric value alone does not identify a register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Address(pub u32);

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:x}", self.0)
	}
}

impl FromStr for Address {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		u32::from_str_radix(s, 16).map(Address)
	}
}

impl From<u32> for Address {
	fn from(value: u32) -> Self {
		Address(value)
	}
}

impl Serialize for Address {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse()
			.map_err(|_| serde::de::Error::custom(format!("invalid hex register address '{}'", s)))
	}
}

/// Electrical direction of a port as seen from the wrapped module
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Input,
	Output,
	Inout,
}

impl Direction {
	pub fn keyword(&self) -> &'static str {
		use Direction::*;
		match self {
			Input => "input",
			Output => "output",
			Inout => "inout",
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.keyword())
	}
}

impl FromStr for Direction {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		use Direction::*;
		match s {
			"input" => Ok(Input),
			"output" => Ok(Output),
			"inout" => Ok(Inout),
			_ => Err(()),
		}
	}
}

/// Identity and electrical shape of one signal of the wrapped module
///
/// Field names follow the canonical JSON document, which is shared with the
/// host-side tooling and must not change shape silently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
	pub name: String,

	/// True if this signal is driven by a synthesized pulse train rather
	/// than latched host data
	#[serde(rename = "clock_port", default)]
	pub is_clock: bool,

	pub bit_width: u32,

	pub direction: Direction,

	/// Name of the tri-state enable signal (inout ports only)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enable_signal: Option<String>,

	/// Level of the enable signal at which the buffer drives the bus
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enable_signal_active: Option<u8>,

	/// One address per 8-bit chunk; lowest address holds the least
	/// significant byte
	#[serde(rename = "address")]
	pub addresses: Vec<Address>,
}

impl Port {
	/// Number of 8-bit register chunks this port occupies
	pub fn chunk_count(&self) -> usize {
		self.bit_width.div_ceil(CHUNK_WIDTH) as usize
	}

	/// Address of the least significant chunk
	pub fn first_address(&self) -> Option<Address> {
		self.addresses.first().copied()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rstest::*;

	#[rstest]
	#[case(10, "a")]
	#[case(0, "0")]
	#[case(255, "ff")]
	fn address_formats_as_bare_hex(#[case] value: u32, #[case] expected: &str) {
		assert_eq!(Address(value).to_string(), expected);
		assert_eq!(expected.parse::<Address>().unwrap(), Address(value));
	}

	#[rstest]
	#[case(1, 1)]
	#[case(8, 1)]
	#[case(9, 2)]
	#[case(16, 2)]
	#[case(17, 3)]
	fn chunk_count_covers_partial_bytes(#[case] width: u32, #[case] chunks: usize) {
		let port = Port {
			name: "SIG".into(),
			is_clock: false,
			bit_width: width,
			direction: Direction::Input,
			enable_signal: None,
			enable_signal_active: None,
			addresses: vec![],
		};
		assert_eq!(port.chunk_count(), chunks);
	}

	#[test]
	fn direction_round_trips_through_keyword() {
		for dir in [Direction::Input, Direction::Output, Direction::Inout] {
			assert_eq!(dir.keyword().parse::<Direction>(), Ok(dir));
		}
	}
}
