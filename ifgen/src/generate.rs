use crate::codegen::sv_top::SvTopCodegen;
use crate::codegen::{Codegen, CodegenError};
use crate::parser::{self, ParseError, PortParser};
use crate::schema::{InterfaceSchema, SchemaError};
use log::info;
use portmap::{DocumentError, PortMapError};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PULSE_GEN_FILE_NAME: &str = "pulsegen_with_counter.v";
pub const INOUT_WRITER_FILE_NAME: &str = "inout_writer.v";

const PULSE_GEN_SOURCE: &str = include_str!("../hdl/pulsegen_with_counter.v");
const INOUT_WRITER_SOURCE: &str = include_str!("../hdl/inout_writer.v");

#[derive(Debug, Error)]
pub enum GenerateError {
	#[error(transparent)]
	IoError(#[from] std::io::Error),

	#[error(transparent)]
	SchemaError(#[from] SchemaError),

	#[error(transparent)]
	ParseError(#[from] ParseError),

	#[error(transparent)]
	CodegenError(#[from] CodegenError),

	#[error(transparent)]
	DocumentError(#[from] DocumentError),

	#[error(transparent)]
	PortMapError(#[from] PortMapError),

	#[error("no module declaration found in {0}")]
	NoModuleName(PathBuf),

	#[error("source path {0} has no usable file stem")]
	BadSourcePath(PathBuf),
}

/// One full generation run over one target module source
#[derive(Clone, Debug)]
pub struct GenerateRequest {
	/// Verilog source of the module to wrap
	pub source_path: PathBuf,
	/// Directory under which the `<stem>_gen` output directory is created
	pub output_path: PathBuf,
	/// Interface schema identifier, e.g. "atlys"
	pub interface: String,
	/// Names of clock-driven signals in the target module
	pub clock_ports: Vec<String>,
	/// Tri-state enable signal names, in inout declaration order
	pub inout_enables: Vec<String>,
	/// Active levels for the enable signals, parallel to `inout_enables`
	pub inout_active: Vec<u8>,
}

/// Parses the target module, persists its port document and emits the
/// wrapper plus the static support modules. Returns the output directory.
///
/// The schema identifier is resolved before anything is written, so an
/// unsupported interface leaves the filesystem untouched.
pub fn generate_interface(request: &GenerateRequest) -> Result<PathBuf, GenerateError> {
	let schema = InterfaceSchema::load(&request.interface)?;

	let source = fs::read_to_string(&request.source_path)?;
	let module = parser::module_name(&source)
		.ok_or_else(|| GenerateError::NoModuleName(request.source_path.clone()))?;
	let stem = file_stem(&request.source_path)?;

	let port_parser = PortParser::with_inout_enables(
		&request.clock_ports,
		&request.inout_enables,
		&request.inout_active,
	)?;
	let parsed = port_parser.parse(&source)?;
	let has_inout_ports = parsed.has_inout_ports();
	let document = parsed.into_document(Some(request.interface.clone()));
	let map = document.port_map()?;

	let output_dir = request.output_path.join(format!("{}_gen", stem));
	fs::create_dir_all(&output_dir)?;
	document.save(&output_dir.join(format!("{}_config.json", stem)))?;

	let mut wrapper = String::new();
	SvTopCodegen::new(&map, &schema, &mut wrapper).emit_top(&module)?;
	fs::write(output_dir.join(format!("top_{}.v", stem)), wrapper)?;

	fs::write(output_dir.join(PULSE_GEN_FILE_NAME), PULSE_GEN_SOURCE)?;
	if has_inout_ports {
		fs::write(output_dir.join(INOUT_WRITER_FILE_NAME), INOUT_WRITER_SOURCE)?;
	}
	fs::write(output_dir.join(schema.file_name()), schema.source())?;

	info!(
		"generated interface files for module '{}' in {}",
		module,
		output_dir.display()
	);
	Ok(output_dir)
}

fn file_stem(path: &Path) -> Result<&str, GenerateError> {
	path.file_stem()
		.and_then(OsStr::to_str)
		.ok_or_else(|| GenerateError::BadSourcePath(path.to_path_buf()))
}
