//! Error types for the container and its registration loader.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by resolution and registration.
#[derive(Debug, Error)]
pub enum Error {
  /// The target type named by a definition, or the identifier itself when no
  /// definition exists, could not be located in the type catalog.
  #[error("no type named `{0}` is registered in the type catalog")]
  ClassNotFound(String),

  /// Instantiation failed: wrong argument arity, an argument of an unexpected
  /// shape, or a field setter that rejected its dependency.
  #[error("failed to construct `{type_name}`: {reason}")]
  Construction { type_name: String, reason: String },

  /// A resolved service could not be downcast to the requested type.
  #[error("service `{id}` is not of the requested type")]
  TypeMismatch { id: String },

  /// The configuration document is structurally malformed.
  #[error("invalid container configuration: {0}")]
  InvalidConfiguration(String),

  /// The configuration file could not be read.
  #[error("failed to read configuration file")]
  Io(#[from] std::io::Error),

  /// The configuration file is not valid YAML.
  #[error("failed to parse configuration document")]
  Parse(#[from] serde_yaml::Error),
}
