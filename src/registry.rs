//! The registration loader: turns an external YAML configuration document
//! into container definitions.
//!
//! The document maps category names to a `classPath` prefix and an ordered
//! `objects` mapping, each object naming a type suffix, an optional
//! `singleton` flag and an optional `arguments` list:
//!
//! ```yaml
//! helpers:
//!   classPath: "app::helpers::"
//!   objects:
//!     config:
//!       class: Config
//!       singleton: true
//!     session:
//!       class: Session
//!       arguments:
//!         - "@config"
//! ```
//!
//! The parsed document is memoized through a [`ConfigCache`] collaborator
//! under a fixed key, so repeated loads skip the file entirely.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::args::ArgSpec;
use crate::container::Container;
use crate::error::{Error, Result};

/// Cache key under which the parsed configuration document is memoized.
pub const CONFIG_CACHE_KEY: &str = "ioc_objects";

/// The cache collaborator used to memoize the parsed configuration document.
pub trait ConfigCache {
  fn exists(&self, key: &str) -> bool;
  fn load(&self, key: &str) -> Option<Value>;
  fn save(&self, key: &str, value: &Value);
}

impl<C: ConfigCache + ?Sized> ConfigCache for &C {
  fn exists(&self, key: &str) -> bool {
    (**self).exists(key)
  }
  fn load(&self, key: &str) -> Option<Value> {
    (**self).load(key)
  }
  fn save(&self, key: &str, value: &Value) {
    (**self).save(key, value)
  }
}

impl<C: ConfigCache + ?Sized> ConfigCache for std::sync::Arc<C> {
  fn exists(&self, key: &str) -> bool {
    (**self).exists(key)
  }
  fn load(&self, key: &str) -> Option<Value> {
    (**self).load(key)
  }
  fn save(&self, key: &str, value: &Value) {
    (**self).save(key, value)
  }
}

/// A trivial in-memory [`ConfigCache`] for tests and embedders without a
/// process-wide cache.
#[derive(Default)]
pub struct MemoryCache {
  entries: Mutex<HashMap<String, Value>>,
}

impl MemoryCache {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ConfigCache for MemoryCache {
  fn exists(&self, key: &str) -> bool {
    self.entries.lock().contains_key(key)
  }

  fn load(&self, key: &str) -> Option<Value> {
    self.entries.lock().get(key).cloned()
  }

  fn save(&self, key: &str, value: &Value) {
    self.entries.lock().insert(key.to_owned(), value.clone());
  }
}

#[derive(Debug, Deserialize)]
struct CategoryConfig {
  #[serde(rename = "classPath")]
  class_path: String,
  objects: Mapping,
}

#[derive(Debug, Deserialize)]
struct ObjectConfig {
  class: String,
  #[serde(default)]
  singleton: bool,
  arguments: Option<Value>,
}

struct ParsedObject {
  id: String,
  target_type: String,
  singleton: bool,
  args: Vec<ArgSpec>,
}

struct ParsedCategory {
  name: String,
  objects: Vec<ParsedObject>,
}

/// Reads the external configuration document and populates a [`Container`]
/// with the definitions and categories it describes.
pub struct Registry<C: ConfigCache> {
  cache: C,
  config_path: PathBuf,
}

impl<C: ConfigCache> Registry<C> {
  /// Creates a loader reading from `config_path` and memoizing the parsed
  /// document through `cache`.
  pub fn new(cache: C, config_path: impl Into<PathBuf>) -> Self {
    Registry {
      cache,
      config_path: config_path.into(),
    }
  }

  /// Registers every definition and category from the configuration document
  /// into `container`.
  ///
  /// The whole document is validated before anything is registered, so a
  /// malformed document leaves the container untouched. Re-invocation is
  /// idempotent: it re-derives the same definitions (last write wins).
  pub fn register_all(&self, container: &mut Container) -> Result<()> {
    let document = self.document()?;
    let categories = parse_document(&document)?;
    for category in categories {
      let mut ids = Vec::with_capacity(category.objects.len());
      for object in category.objects {
        if object.singleton {
          container.map_singleton(&object.id, &object.target_type, object.args);
        } else {
          container.map_transient(&object.id, &object.target_type, object.args);
        }
        ids.push(object.id);
      }
      debug!(category = %category.name, objects = ids.len(), "registered category");
      container.map_category(&category.name, ids);
    }
    Ok(())
  }

  /// The parsed configuration document, from the cache when present, from
  /// the file otherwise (saving it back for subsequent loads).
  fn document(&self) -> Result<Mapping> {
    if self.cache.exists(CONFIG_CACHE_KEY) {
      if let Some(Value::Mapping(document)) = self.cache.load(CONFIG_CACHE_KEY) {
        debug!("loaded configuration document from cache");
        return Ok(document);
      }
    }

    let raw = fs::read_to_string(&self.config_path)?;
    let parsed: Value = serde_yaml::from_str(&raw)?;
    let Value::Mapping(document) = parsed else {
      return Err(Error::InvalidConfiguration(
        "configuration document must be a mapping".to_owned(),
      ));
    };
    self.cache.save(CONFIG_CACHE_KEY, &Value::Mapping(document.clone()));
    Ok(document)
  }
}

fn parse_document(document: &Mapping) -> Result<Vec<ParsedCategory>> {
  let mut categories = Vec::with_capacity(document.len());
  for (name, value) in document {
    let name = name.as_str().ok_or_else(|| {
      Error::InvalidConfiguration("category names must be strings".to_owned())
    })?;
    let config: CategoryConfig = serde_yaml::from_value(value.clone())
      .map_err(|err| Error::InvalidConfiguration(format!("category `{name}`: {err}")))?;

    let mut objects = Vec::with_capacity(config.objects.len());
    for (id, object_value) in &config.objects {
      let id = id.as_str().ok_or_else(|| {
        Error::InvalidConfiguration(format!("category `{name}`: object identifiers must be strings"))
      })?;
      let object: ObjectConfig = serde_yaml::from_value(object_value.clone()).map_err(|err| {
        Error::InvalidConfiguration(format!("object `{id}` in category `{name}`: {err}"))
      })?;
      objects.push(ParsedObject {
        id: id.to_owned(),
        target_type: format!("{}{}", config.class_path, object.class),
        singleton: object.singleton,
        args: object
          .arguments
          .as_ref()
          .map(ArgSpec::list_from_value)
          .unwrap_or_default(),
      });
    }
    categories.push(ParsedCategory {
      name: name.to_owned(),
      objects,
    });
  }
  Ok(categories)
}
