pub mod sv_top;

use crate::schema::SchemaError;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum CodegenError {
	#[error(transparent)]
	FormatError(#[from] fmt::Error),

	#[error(transparent)]
	SchemaError(#[from] SchemaError),

	#[error("inout port '{0}' has no tri-state enable signal")]
	MissingEnableSignal(String),

	#[error("tri-state enable signal '{0}' is not a port of the target module")]
	UnknownEnableSignal(String),
}

pub trait Codegen {
	fn emit_top(&mut self, module_name: &str) -> Result<(), CodegenError>;
}
