//! Build-time tooling: key-variable identification (C2) and the instrumentation
//! decision logic (C3) a compiler pass would drive.

pub mod callgraph;
pub mod error;
pub mod identifier;
pub mod instrument;
pub mod manifest;
pub mod program;
pub mod types;

pub use error::KeyVarError;
pub use identifier::{identify, KeyVarIdentifierOptions, KeyVariableRecord};
pub use program::parse_program_description;
