//! The compile pipeline: source graph in, sorted declaration model out

use crate::builder::DeclarationBuilder;
use crate::diagnostics::Diagnostics;
use crate::error::CompileError;
use crate::ir::SortedModel;
use crate::mapper::TypeMapper;
use crate::passes;
use crate::settings::Settings;
use crate::source::SourceGraph;
use crate::symbols::{ResolvedSymbols, SymbolTable};

/// Result of one compilation
#[derive(Debug)]
pub struct CompileOutput {
    pub model: SortedModel,
    pub symbols: ResolvedSymbols,
    /// Recoverable problems met on the way; never fatal
    pub diagnostics: Diagnostics,
}

/// Compile `graph` with the built-in type mapper chain
pub fn compile(graph: &SourceGraph, settings: &Settings) -> Result<CompileOutput, CompileError> {
    let mapper = TypeMapper::new(settings, graph);
    compile_with(graph, settings, &mapper)
}

/// Compile `graph` with a caller-supplied type mapper
#[tracing::instrument(skip_all, fields(classes = graph.classes.len(), enums = graph.enums.len()))]
pub fn compile_with(
    graph: &SourceGraph,
    settings: &Settings,
    mapper: &TypeMapper,
) -> Result<CompileOutput, CompileError> {
    settings.validate()?;

    let mut symbols = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();

    let (model, _) = DeclarationBuilder::new(graph, settings, mapper)
        .build(&mut symbols, &mut diagnostics)?;

    let model = passes::remove_inherited_properties(model);
    let model = passes::add_implemented_properties(model);
    tracing::debug!("inheritance passes done");

    let model = passes::transform_dates(&mut symbols, model, settings.date_mapping);
    let model = passes::transform_enums(model, settings.enum_mapping);
    tracing::debug!(
        "representations chosen: dates {:?}, enums {:?}",
        settings.date_mapping,
        settings.enum_mapping
    );

    let model = if settings.tagged_unions {
        passes::create_tagged_unions(&mut symbols, model)
    } else {
        model
    };
    let model = if settings.deserialization_functions {
        passes::create_revive_functions(model)
    } else {
        model
    };

    let model = match &graph.rest {
        Some(application) => passes::create_rest_declarations(
            &mut symbols,
            model,
            application,
            settings,
            mapper,
            &mut diagnostics,
        )?,
        None => model,
    };
    tracing::debug!(
        "model has {} data, {} alias and {} enum declarations",
        model.data.len(),
        model.aliases.len(),
        model.enums.len()
    );

    let model = passes::declare_optional_properties(model, settings.optional_properties);

    let symbols = symbols.resolve_names(&settings.naming)?;
    let model = passes::sort_declarations(model, &symbols, settings.sort_mode);
    symbols.check_unique(model.declarations.iter().map(|d| d.symbol()))?;

    if !diagnostics.is_empty() {
        tracing::info!("compiled with {} warning(s)", diagnostics.count());
    }
    Ok(CompileOutput {
        model,
        symbols,
        diagnostics,
    })
}
