extern crate ifgen;
use clap::{command, Arg, ArgAction};
use log::info;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
	#[error(transparent)]
	#[diagnostic(code(fpgaif::generate))]
	GenerateError(#[from] ifgen::GenerateError),
}

fn main() -> miette::Result<()> {
	env_logger::init();

	let matches = command!()
		.about("Generator for the JSON port config and the top-level Verilog interface wrapper")
		.arg(
			Arg::new("source")
				.short('s')
				.long("source-path")
				.required(true)
				.help("Path to Verilog source file (top module)"),
		)
		.arg(
			Arg::new("interface")
				.short('i')
				.long("interface")
				.required(true)
				.help(format!(
					"Interface schema to use when generating Verilog files (supported: {})",
					ifgen::SUPPORTED_INTERFACES.join(" ")
				)),
		)
		.arg(
			Arg::new("output")
				.short('o')
				.long("output-path")
				.default_value(".")
				.help("Path where generated files should be saved"),
		)
		.arg(
			Arg::new("clock_signals")
				.action(ArgAction::Append)
				.num_args(0..)
				.help("Names of clock signals present in source file"),
		)
		.arg(
			Arg::new("inout_enables")
				.long("inout-enables")
				.action(ArgAction::Append)
				.num_args(0..)
				.help("Signal names driving tri-state buffers of inout signals (in order as defined in Verilog source)"),
		)
		.arg(
			Arg::new("inout_active")
				.long("inout-active")
				.action(ArgAction::Append)
				.num_args(0..)
				.value_parser(["0", "1"])
				.help("Levels at which inout enable signals allow driving the tri-state buffer (in order as defined for --inout-enables)"),
		)
		.get_matches();

	let collect_strings = |id: &str| -> Vec<String> {
		matches
			.get_many::<String>(id)
			.unwrap_or_default()
			.cloned()
			.collect()
	};

	let inout_active: Vec<u8> = matches
		.get_many::<String>("inout_active")
		.unwrap_or_default()
		.map(|level| if level == "1" { 1 } else { 0 })
		.collect();

	let request = ifgen::GenerateRequest {
		source_path: matches
			.get_one::<String>("source")
			.expect("source path is a required argument")
			.into(),
		output_path: matches
			.get_one::<String>("output")
			.expect("output path has a default value")
			.into(),
		interface: matches
			.get_one::<String>("interface")
			.expect("interface is a required argument")
			.clone(),
		clock_ports: collect_strings("clock_signals"),
		inout_enables: collect_strings("inout_enables"),
		inout_active,
	};

	let output_dir = ifgen::generate_interface(&request).map_err(CliError::from)?;
	info!("interface files written to {}", output_dir.display());
	Ok(())
}
