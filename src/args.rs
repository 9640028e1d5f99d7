//! Constructor-argument specifications and their materialized forms.
//!
//! A service definition carries an ordered list of [`ArgSpec`]s. At resolution
//! time the container turns each spec into a [`Resolved`] value: literals pass
//! through, reference tokens are replaced by the service they name, and nested
//! lists are resolved element-wise in place.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_yaml::Value;

use crate::container::Instance;
use crate::error::{Error, Result};

/// The sigil that marks a string argument as a reference to another
/// registered identifier, e.g. `"@config"`.
pub const REF_SIGIL: char = '@';

/// One constructor argument as written in a service definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSpec {
  /// A plain value, passed through to the constructor unchanged.
  Literal(Value),
  /// A reference to another identifier, resolved through the container.
  Ref(String),
  /// A nested argument list, resolved element-wise in place.
  List(Vec<ArgSpec>),
}

impl ArgSpec {
  /// Parses a YAML value into an argument spec.
  ///
  /// Strings prefixed with [`REF_SIGIL`] become references (sigil stripped),
  /// sequences become nested lists, everything else is a literal.
  pub fn from_value(value: &Value) -> Self {
    match value {
      Value::String(s) => match s.strip_prefix(REF_SIGIL) {
        Some(id) => ArgSpec::Ref(id.to_owned()),
        None => ArgSpec::Literal(value.clone()),
      },
      Value::Sequence(seq) => ArgSpec::List(seq.iter().map(ArgSpec::from_value).collect()),
      other => ArgSpec::Literal(other.clone()),
    }
  }

  /// Parses a YAML `arguments` node into an ordered argument list.
  ///
  /// A sequence contributes one spec per element; any other value is treated
  /// as a single argument.
  pub fn list_from_value(value: &Value) -> Vec<ArgSpec> {
    match value {
      Value::Sequence(seq) => seq.iter().map(ArgSpec::from_value).collect(),
      other => vec![ArgSpec::from_value(other)],
    }
  }
}

/// A materialized constructor argument or injected dependency.
#[derive(Clone)]
pub enum Resolved {
  /// A literal value, passed through from the definition.
  Value(Value),
  /// A resolved service instance.
  Service(Instance),
  /// A nested list, resolved element-wise.
  List(Vec<Resolved>),
}

impl Resolved {
  /// The literal value, if this is one.
  pub fn as_value(&self) -> Option<&Value> {
    match self {
      Resolved::Value(value) => Some(value),
      _ => None,
    }
  }

  /// The literal string value, if this is one.
  pub fn as_str(&self) -> Option<&str> {
    self.as_value().and_then(Value::as_str)
  }

  /// The nested list, if this is one.
  pub fn as_list(&self) -> Option<&[Resolved]> {
    match self {
      Resolved::List(items) => Some(items),
      _ => None,
    }
  }

  /// The resolved service downcast to `T`.
  ///
  /// Fails if this is not a service, or if it is a service of another type.
  pub fn service<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
    let instance = match self {
      Resolved::Service(instance) => instance.clone(),
      _ => {
        return Err(Error::Construction {
          type_name: std::any::type_name::<T>().to_owned(),
          reason: "dependency is not a service".to_owned(),
        })
      }
    };
    instance.downcast::<T>().map_err(|_| Error::Construction {
      type_name: std::any::type_name::<T>().to_owned(),
      reason: "dependency is a service of another type".to_owned(),
    })
  }

  /// The literal string value, or a construction error.
  pub fn str_value(&self) -> Result<&str> {
    self.as_str().ok_or_else(|| Error::Construction {
      type_name: "injected value".to_owned(),
      reason: "dependency is not a string literal".to_owned(),
    })
  }
}

impl fmt::Debug for Resolved {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Resolved::Value(value) => f.debug_tuple("Value").field(value).finish(),
      Resolved::Service(_) => f.write_str("Service(..)"),
      Resolved::List(items) => f.debug_tuple("List").field(items).finish(),
    }
  }
}

/// The resolved argument list handed to a catalog constructor.
///
/// The accessors are arity- and shape-checked: a missing index or a value of
/// the wrong shape surfaces as a construction error naming the type being
/// built.
pub struct ResolvedArgs<'a> {
  type_name: &'a str,
  args: &'a [Resolved],
}

impl<'a> ResolvedArgs<'a> {
  pub(crate) fn new(type_name: &'a str, args: &'a [Resolved]) -> Self {
    ResolvedArgs { type_name, args }
  }

  pub fn len(&self) -> usize {
    self.args.len()
  }

  pub fn is_empty(&self) -> bool {
    self.args.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Resolved> {
    self.args.get(index)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Resolved> {
    self.args.iter()
  }

  fn arg(&self, index: usize) -> Result<&Resolved> {
    self.args.get(index).ok_or_else(|| Error::Construction {
      type_name: self.type_name.to_owned(),
      reason: format!("missing argument {index} (got {} arguments)", self.args.len()),
    })
  }

  fn mismatch(&self, index: usize, expected: &str) -> Error {
    Error::Construction {
      type_name: self.type_name.to_owned(),
      reason: format!("argument {index} is not {expected}"),
    }
  }

  /// The argument at `index` as a string literal.
  pub fn str_at(&self, index: usize) -> Result<&str> {
    self
      .arg(index)?
      .as_str()
      .ok_or_else(|| self.mismatch(index, "a string literal"))
  }

  /// The argument at `index` as a raw literal value.
  pub fn value_at(&self, index: usize) -> Result<&Value> {
    self
      .arg(index)?
      .as_value()
      .ok_or_else(|| self.mismatch(index, "a literal value"))
  }

  /// The argument at `index` as a resolved service of type `T`.
  pub fn service_at<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    match self.arg(index)? {
      Resolved::Service(instance) => instance
        .clone()
        .downcast::<T>()
        .map_err(|_| self.mismatch(index, "a service of the expected type")),
      _ => Err(self.mismatch(index, "a resolved service")),
    }
  }

  /// The argument at `index` as a nested list.
  pub fn list_at(&self, index: usize) -> Result<&[Resolved]> {
    self
      .arg(index)?
      .as_list()
      .ok_or_else(|| self.mismatch(index, "a nested list"))
  }
}
