//! Non-public definition storage for the container.

use once_cell::sync::OnceCell;
use serde_yaml::Value;

use crate::args::ArgSpec;
use crate::container::Instance;

/// Instantiation scope of a class definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
  /// A new instance per resolution.
  Transient,
  /// One lazily-created instance per definition.
  Singleton,
}

/// One registered construction recipe.
pub(crate) enum Definition {
  Class {
    /// Key into the type catalog.
    target_type: String,
    scope: Scope,
    args: Vec<ArgSpec>,
    /// Set on first resolution of a singleton, untouched for transients.
    instance: OnceCell<Instance>,
  },
  /// A literal value, injectable into fields and resolvable as-is.
  Value(Value),
}

impl Definition {
  pub(crate) fn class(target_type: &str, scope: Scope, args: Vec<ArgSpec>) -> Self {
    Definition::Class {
      target_type: target_type.to_owned(),
      scope,
      args,
      instance: OnceCell::new(),
    }
  }
}
