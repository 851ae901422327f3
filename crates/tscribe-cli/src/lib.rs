//! Library interface for the tscribe command line

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tscribe_codegen::{Codegen, EmitOptions, TypeScriptCodegen};
use tscribe_core::{compile, Diagnostics, Settings, SourceGraph};

/// Contents of a `tscribe.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Compiler settings, the `[compiler]` table
    pub compiler: Settings,
    /// Emitter options, the `[output]` table
    pub output: EmitOptions,
}

impl CliConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content).context("Failed to parse config")?;
        config
            .compiler
            .validate()
            .context("Invalid [compiler] settings")?;
        Ok(config)
    }
}

/// Load the config at `path`, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        debug!("No config file given, using defaults");
        return Ok(CliConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    CliConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// What a `generate` run produced
#[derive(Debug)]
pub struct GenerateReport {
    pub declarations: usize,
    pub diagnostics: Diagnostics,
}

/// Compile the JSON source graph at `input` and write TypeScript to `output`
pub fn generate(input: &Path, output: &Path, config: &CliConfig) -> Result<GenerateReport> {
    info!("Generating TypeScript from {:?}", input);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read source graph: {:?}", input))?;
    let graph: SourceGraph =
        serde_json::from_str(&content).with_context(|| "Failed to parse source graph JSON")?;

    let compiled = compile(&graph, &config.compiler)
        .with_context(|| format!("Failed to compile {:?}", input))?;

    let mut codegen = TypeScriptCodegen::with_options(config.output.clone());
    let code = codegen
        .generate(&compiled.model, &compiled.symbols)
        .context("Failed to emit TypeScript")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(output, code).with_context(|| format!("Failed to write output: {:?}", output))?;

    info!("Generated code written to {:?}", output);
    Ok(GenerateReport {
        declarations: compiled.model.declarations.len(),
        diagnostics: compiled.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscribe_core::settings::{ClassMapping, EnumMapping};

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(CliConfig::from_toml_str("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_config_tables() {
        let config = CliConfig::from_toml_str(
            r#"
            [compiler]
            enum_mapping = "numeric_placeholder"
            class_mapping = "as_classes"

            [output]
            indent = "  "
            file_comment = "generated"
            "#,
        )
        .unwrap();
        assert_eq!(config.compiler.enum_mapping, EnumMapping::NumericPlaceholder);
        assert_eq!(config.compiler.class_mapping, ClassMapping::AsClasses);
        assert_eq!(config.output.indent, "  ");
        assert!(config.output.export_declarations);
        assert_eq!(config.output.file_comment.as_deref(), Some("generated"));
    }

    #[test]
    fn test_invalid_combination_rejected() {
        let err = CliConfig::from_toml_str(
            r#"
            [compiler]
            deserialization_functions = true
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("Invalid [compiler] settings"));
    }

    #[test]
    fn test_missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), CliConfig::default());
    }
}
