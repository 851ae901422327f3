use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(
        "Cyclic pull-properties configuration: '{declaration}.{property}' pulls in a cycle ({})",
        cycle.join(" -> ")
    )]
    PullPropertiesCycle {
        declaration: String,
        property: String,
        cycle: Vec<String>,
    },

    #[error(
        "Name conflict: multiple declarations map to the same name '{name}': {}",
        entities.join(", ")
    )]
    NameConflict { name: String, entities: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid path template pattern: {0}")]
    PathPattern(#[from] regex::Error),

    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
