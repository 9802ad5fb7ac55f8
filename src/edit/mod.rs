//! Natural-language PDF edit instructions.
//!
//! - [`instruction`]: pure interpretation of an instruction string
//! - [`target`]: page specifier parsing and validation

pub mod instruction;
pub mod target;

pub use instruction::{interpret, EditKind, InstructionInterpreter, ParsedEdit, TITLE_PLACEHOLDER};
pub use target::PageTarget;
