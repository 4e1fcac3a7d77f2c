use super::{Codegen, CodegenError};
use crate::schema::{
	InterfaceSchema, ADDRESS_PORT_NAME, DATA_INPUT_PORT_NAME, DATA_OUTPUT_PORT_NAME,
};
use log::debug;
use portmap::{Address, Direction, Port, PortMap};
use std::fmt;
use std::fmt::Write;

const INPUT_MUX_NAME: &str = "inputs";
const OUTPUT_MUX_NAME: &str = "outputs";
const PULSE_GEN_MODULE_NAME: &str = "cnt_pulsegen";
const INOUT_WRITER_MODULE_NAME: &str = "inout_writer";
const DATA_WIDTH: u32 = portmap::CHUNK_WIDTH;

macro_rules! emitln {
	($self:ident, $($arg:tt)*) => {
		writeln!($self.output_stream, "{}{}", "\t".repeat($self.indent_level as usize), format!($($arg)*))
	}
}

/// Emits the self-contained wrapper module gluing one target module to one
/// host interface schema
///
/// The wrapper decodes the shared address bus into per-signal mux slots,
/// instantiates a pulse generator per clock port and a tri-state writer per
/// inout port, and wires multi-chunk ports through concatenation support
/// wires.
pub struct SvTopCodegen<'a> {
	ports: &'a PortMap,
	schema: &'a InterfaceSchema,
	indent_level: u32,
	output_stream: &'a mut dyn fmt::Write,
}

impl<'a> SvTopCodegen<'a> {
	pub fn new(
		ports: &'a PortMap,
		schema: &'a InterfaceSchema,
		output_stream: &'a mut dyn fmt::Write,
	) -> Self {
		Self {
			ports,
			schema,
			indent_level: 0,
			output_stream,
		}
	}

	fn begin_indent(&mut self) {
		self.indent_level += 1;
	}

	fn end_indent(&mut self) {
		assert!(self.indent_level > 0);
		self.indent_level -= 1;
	}

	/// Wrapper ports are the schema's ports minus the reserved bus signals,
	/// which stay internal
	fn emit_wrapper_port_declarations(&mut self) -> Result<(), CodegenError> {
		let declared: Vec<&Port> = self
			.schema
			.ports()
			.iter()
			.filter(|port| !InterfaceSchema::is_reserved_bus_signal(&port.name))
			.collect();
		for (index, port) in declared.iter().enumerate() {
			let range_str = match port.bit_width {
				0 | 1 => String::new(),
				width => format!("[{}:0] ", width - 1),
			};
			emitln!(
				self,
				"{} {}{}{}",
				port.direction,
				range_str,
				port.name,
				if index == declared.len() - 1 { "" } else { "," }
			)?;
		}
		Ok(())
	}

	fn emit_interface_instance(&mut self) -> Result<(), CodegenError> {
		let ports = self.schema.ports();
		emitln!(self, "{} INTERFACE (", self.schema.module_name())?;
		self.begin_indent();
		for (index, port) in ports.iter().enumerate() {
			emitln!(
				self,
				".{}({}){}",
				port.name,
				port.name,
				if index == ports.len() - 1 { "" } else { "," }
			)?;
		}
		self.end_indent();
		emitln!(self, ");")?;
		Ok(())
	}

	fn emit_mux_arrays(&mut self) -> Result<(), CodegenError> {
		let mut input_count = 0usize;
		let mut output_count = 0usize;
		for port in self.ports.iter() {
			if port.is_clock {
				input_count += 1;
			}
			else {
				match port.direction {
					Direction::Input => input_count += 1,
					Direction::Output => output_count += 1,
					Direction::Inout => {},
				}
			}
		}
		// TODO: size the mux arrays per chunk; a port wider than 8 bits
		// overflows its single per-port slot
		emitln!(
			self,
			"reg [{}:0] {} [0:{}];",
			DATA_WIDTH - 1,
			INPUT_MUX_NAME,
			input_count.saturating_sub(1)
		)?;
		emitln!(
			self,
			"wire [{}:0] {} [0:{}];",
			DATA_WIDTH - 1,
			OUTPUT_MUX_NAME,
			output_count.saturating_sub(1)
		)?;
		Ok(())
	}

	/// One pulse generator per clock port: the host writes the requested
	/// edge count to the clock's address and the generator plays it out
	fn emit_clock_generator(&mut self, port: &Port, top_clk: &str) -> Result<(), CodegenError> {
		let address = port.addresses[0];
		emitln!(self, "wire {0}_GEN_TRG, {0}_WIRE;", port.name)?;
		emitln!(
			self,
			"assign {}_GEN_TRG = {} == {}'h{};",
			port.name,
			ADDRESS_PORT_NAME,
			DATA_WIDTH,
			address
		)?;
		emitln!(self, "{} {}_GEN (", PULSE_GEN_MODULE_NAME, port.name)?;
		self.begin_indent();
		emitln!(self, ".MAIN_CLK({}),", top_clk)?;
		emitln!(self, ".CNT({}),", mux_slot(INPUT_MUX_NAME, address))?;
		emitln!(self, ".TRG({}_GEN_TRG),", port.name)?;
		emitln!(self, ".CLK({}_WIRE)", port.name)?;
		self.end_indent();
		emitln!(self, ");")?;
		Ok(())
	}

	/// Tri-state writer for one inout port. The written value comes from
	/// the output mux chunks at the port's own addresses; the write enable
	/// is the output mux slot at the enable signal's address, negated when
	/// the enable is active low.
	fn emit_inout_writer(&mut self, port: &Port) -> Result<(), CodegenError> {
		let enable_name = port
			.enable_signal
			.as_deref()
			.ok_or_else(|| CodegenError::MissingEnableSignal(port.name.clone()))?;
		let enable_port = self
			.ports
			.get(enable_name)
			.ok_or_else(|| CodegenError::UnknownEnableSignal(enable_name.to_string()))?;
		let enable_address = enable_port.addresses[0];
		let negation = match port.enable_signal_active {
			Some(0) => "~",
			_ => "",
		};

		emitln!(self, "wire [{0}:0] {1}_WIRE;", port.bit_width - 1, port.name)?;
		emitln!(self, "wire [{0}:0] {1}_INOUT;", port.bit_width - 1, port.name)?;
		emitln!(
			self,
			"assign {}_INOUT = {};",
			port.name,
			concat_expression(OUTPUT_MUX_NAME, &port.addresses)
		)?;
		emitln!(self, "{} #(", INOUT_WRITER_MODULE_NAME)?;
		self.begin_indent();
		emitln!(self, ".data_size({})", port.bit_width)?;
		self.end_indent();
		emitln!(self, ") {}_WRITER (", port.name)?;
		self.begin_indent();
		emitln!(self, ".INOUT({}_WIRE),", port.name)?;
		emitln!(self, ".IN({}_INOUT),", port.name)?;
		emitln!(
			self,
			".WR_EN({}{})",
			negation,
			mux_slot(OUTPUT_MUX_NAME, enable_address)
		)?;
		self.end_indent();
		emitln!(self, ");")?;
		Ok(())
	}

	/// Emits the support declarations for one target-module port and
	/// returns the expression to place in its connection list entry
	fn emit_support_declarations(&mut self, port: &Port) -> Result<String, CodegenError> {
		if port.is_clock {
			// declared alongside its pulse generator
			return Ok(format!("{}_WIRE", port.name));
		}
		if port.direction == Direction::Inout {
			self.emit_inout_writer(port)?;
			return Ok(format!("{}_WIRE", port.name));
		}

		let mux_name = match port.direction {
			Direction::Output => OUTPUT_MUX_NAME,
			_ => INPUT_MUX_NAME,
		};
		if port.addresses.len() == 1 {
			return Ok(mux_slot(mux_name, port.addresses[0]));
		}

		// Multi-chunk ports go through a named support wire; the highest
		// address always carries the most significant byte. The assignment
		// direction depends on who drives the wire.
		let concat = concat_expression(mux_name, &port.addresses);
		emitln!(self, "wire [{0}:0] {1}_WIRE;", port.bit_width - 1, port.name)?;
		match port.direction {
			Direction::Output => emitln!(self, "assign {} = {}_WIRE;", concat, port.name)?,
			_ => emitln!(self, "assign {}_WIRE = {};", port.name, concat)?,
		}
		Ok(format!("{}_WIRE", port.name))
	}

	fn emit_target_instance(
		&mut self,
		module_name: &str,
		connections: &[(String, String)],
	) -> Result<(), CodegenError> {
		emitln!(self, "{} DUT (", module_name)?;
		self.begin_indent();
		for (index, (port_name, expression)) in connections.iter().enumerate() {
			emitln!(
				self,
				".{}({}){}",
				port_name,
				expression,
				if index == connections.len() - 1 { "" } else { "," }
			)?;
		}
		self.end_indent();
		emitln!(self, ");")?;
		Ok(())
	}

	fn emit_bus_plumbing(&mut self, top_clk: &str) -> Result<(), CodegenError> {
		emitln!(self, "always @(posedge {})", top_clk)?;
		self.begin_indent();
		emitln!(
			self,
			"{}[{}] <= {};",
			INPUT_MUX_NAME,
			ADDRESS_PORT_NAME,
			DATA_INPUT_PORT_NAME
		)?;
		self.end_indent();
		emitln!(self, "")?;
		emitln!(
			self,
			"assign {} = {}[{}];",
			DATA_OUTPUT_PORT_NAME,
			OUTPUT_MUX_NAME,
			ADDRESS_PORT_NAME
		)?;
		Ok(())
	}
}

impl<'a> Codegen for SvTopCodegen<'a> {
	fn emit_top(&mut self, module_name: &str) -> Result<(), CodegenError> {
		debug!("emitting wrapper for module '{}'", module_name);
		let top_clk = self.schema.clock_port()?.name.clone();

		emitln!(
			self,
			"// Host interface wrapper for '{}', generated for the '{}' interface.",
			module_name,
			self.schema.name()
		)?;
		emitln!(self, "module top_{} (", module_name)?;
		self.begin_indent();
		self.emit_wrapper_port_declarations()?;
		self.end_indent();
		emitln!(self, ");")?;
		emitln!(self, "")?;

		emitln!(
			self,
			"wire [{}:0] {}, {}, {};",
			DATA_WIDTH - 1,
			DATA_INPUT_PORT_NAME,
			DATA_OUTPUT_PORT_NAME,
			ADDRESS_PORT_NAME
		)?;
		emitln!(self, "")?;
		self.emit_mux_arrays()?;
		emitln!(self, "")?;
		self.emit_interface_instance()?;
		emitln!(self, "")?;

		for port in self.ports.iter() {
			if port.is_clock {
				self.emit_clock_generator(port, &top_clk)?;
				emitln!(self, "")?;
			}
		}

		let mut connections = Vec::with_capacity(self.ports.len());
		let mut emitted_any_support = false;
		for port in self.ports.iter() {
			let expression = self.emit_support_declarations(port)?;
			if expression.ends_with("_WIRE") && !port.is_clock {
				emitted_any_support = true;
			}
			connections.push((port.name.clone(), expression));
		}
		if emitted_any_support {
			emitln!(self, "")?;
		}

		self.emit_target_instance(module_name, &connections)?;
		emitln!(self, "")?;
		self.emit_bus_plumbing(&top_clk)?;
		emitln!(self, "")?;
		emitln!(self, "endmodule")?;
		Ok(())
	}
}

fn mux_slot(mux_name: &str, address: Address) -> String {
	format!("{}[{}]", mux_name, address.0)
}

/// Concatenation with the highest-address chunk as the most significant
/// byte; collapses to a plain slot reference for single-chunk ports
fn concat_expression(mux_name: &str, addresses: &[Address]) -> String {
	if addresses.len() == 1 {
		return mux_slot(mux_name, addresses[0]);
	}
	let slots: Vec<String> = addresses
		.iter()
		.rev()
		.map(|address| mux_slot(mux_name, *address))
		.collect();
	format!("{{{}}}", slots.join(", "))
}
