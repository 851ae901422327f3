//! Code generators for tscribe declaration models

pub mod error;
pub mod typescript;

use tscribe_core::{ResolvedSymbols, SortedModel};

pub use error::CodegenError;
pub use typescript::{EmitOptions, TypeScriptCodegen};

/// Common trait for all code generators
pub trait Codegen {
    fn generate(
        &mut self,
        model: &SortedModel,
        symbols: &ResolvedSymbols,
    ) -> Result<String, CodegenError>;
}
