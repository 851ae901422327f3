//! Compiles a reflected class/enum/REST source graph into a TypeScript
//! declaration model.
//!
//! The input is a [`SourceGraph`] handed over by an introspection layer.
//! [`compile`] maps its types, builds declarations and runs the transform
//! passes; the resulting [`SortedModel`] is rendered by an emitter such as
//! `tscribe-codegen`.

pub mod builder;
pub mod code;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod mapper;
pub mod naming;
pub mod passes;
pub mod pipeline;
pub mod settings;
pub mod source;
pub mod symbols;
pub mod types;

pub use diagnostics::{Diagnostics, Warning, WarningCategory};
pub use error::CompileError;
pub use ir::{Declaration, Helper, SortedModel, TargetModel};
pub use mapper::TypeMapper;
pub use pipeline::{compile, compile_with, CompileOutput};
pub use settings::Settings;
pub use source::SourceGraph;
pub use symbols::{ResolvedSymbols, Symbol, SymbolTable};
pub use types::TypeExpr;
