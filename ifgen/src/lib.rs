pub mod alloc;
pub mod codegen;
pub mod generate;
pub mod parser;
pub mod schema;

pub use alloc::AddressAllocator;
pub use codegen::sv_top::SvTopCodegen;
pub use codegen::{Codegen, CodegenError};
pub use generate::{generate_interface, GenerateError, GenerateRequest};
pub use parser::{ParseError, ParsedModule, PortParser};
pub use schema::{InterfaceSchema, SchemaError, SUPPORTED_INTERFACES};
