extern crate ifgen;
extern crate portmap;

use ifgen::{generate_interface, GenerateRequest};
use portmap::{Address, HostInterface, LinkError, PortDocument, RegisterBus};
use std::fs;

const DUT_SOURCE: &str = "\
module shifter (
input CLK,
input LOAD,
input [15:0] PATTERN,
output DONE
);
endmodule
";

/// In-memory stand-in for the device link. Writes land in the input
/// namespace, reads come from the output namespace, mirroring the wrapper's
/// two mux arrays.
#[derive(Default)]
struct LoopbackBus {
	input_registers: std::collections::HashMap<u32, u8>,
	output_registers: std::collections::HashMap<u32, u8>,
}

impl RegisterBus for LoopbackBus {
	fn read(&mut self, address: Address) -> Result<u8, LinkError> {
		Ok(*self.output_registers.get(&address.0).unwrap_or(&0))
	}

	fn write(&mut self, address: Address, value: u8) -> Result<(), LinkError> {
		self.input_registers.insert(address.0, value);
		Ok(())
	}
}

fn generate(dir: &std::path::Path) -> std::path::PathBuf {
	let source_path = dir.join("shifter.v");
	fs::write(&source_path, DUT_SOURCE).unwrap();
	generate_interface(&GenerateRequest {
		source_path,
		output_path: dir.to_path_buf(),
		interface: "atlys".to_string(),
		clock_ports: vec!["CLK".to_string()],
		inout_enables: vec![],
		inout_active: vec![],
	})
	.unwrap()
}

#[test]
fn generated_document_drives_the_host_interface() {
	let dir = tempfile::tempdir().unwrap();
	let output_dir = generate(dir.path());

	let document = PortDocument::load(&output_dir.join("shifter_config.json")).unwrap();
	let mut host = HostInterface::new(&document, Box::<LoopbackBus>::default()).unwrap();

	// LOAD sits at input address 1, PATTERN spans 2 and 3
	host.write("LOAD", 1).unwrap();
	assert_eq!(host.read("LOAD").unwrap(), 0);
	host.write_clock_cycles("CLK", 8).unwrap();
	assert!(host.read("MISSING").is_err());
}

#[test]
fn document_survives_an_external_rewrite() {
	let dir = tempfile::tempdir().unwrap();
	let output_dir = generate(dir.path());
	let config_path = output_dir.join("shifter_config.json");

	let document = PortDocument::load(&config_path).unwrap();
	document.save(&config_path).unwrap();
	let reloaded = PortDocument::load(&config_path).unwrap();
	assert_eq!(document, reloaded);

	let map = reloaded.port_map().unwrap();
	let pattern = map.lookup("PATTERN").unwrap();
	assert_eq!(pattern.bit_width, 16);
	assert_eq!(pattern.addresses, [Address(2), Address(3)]);
}

#[test]
fn wrapper_and_config_agree_on_addresses() {
	let dir = tempfile::tempdir().unwrap();
	let output_dir = generate(dir.path());

	let document = PortDocument::load(&output_dir.join("shifter_config.json")).unwrap();
	let wrapper = fs::read_to_string(output_dir.join("top_shifter.v")).unwrap();

	let map = document.port_map().unwrap();
	let clk = map.lookup("CLK").unwrap();
	assert!(wrapper.contains(&format!("ADDR == 8'h{}", clk.addresses[0])));

	let pattern = map.lookup("PATTERN").unwrap();
	let concat = format!(
		"assign PATTERN_WIRE = {{inputs[{}], inputs[{}]}};",
		pattern.addresses[1].0, pattern.addresses[0].0
	);
	assert!(wrapper.contains(&concat));
}
