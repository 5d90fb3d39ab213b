use thiserror::Error;

/// Errors raised by the schema registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown kind tag: {tag}")]
    UnknownKind { tag: String },
}
