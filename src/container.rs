//! The main `Container` struct and its associated methods.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde_yaml::Value;
use tracing::{debug, trace};

use crate::args::{ArgSpec, Resolved, ResolvedArgs};
use crate::catalog::{TypeCatalog, TypeEntry};
use crate::core::{Definition, Scope};
use crate::error::{Error, Result};

/// A resolved service instance, shared between the container and its callers.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A string-keyed dependency injection container.
///
/// The container holds service definitions and named categories, and resolves
/// identifiers into live instances through a [`TypeCatalog`]. One container
/// serves one logical execution (e.g. a single request): registration takes
/// `&mut self`, resolution takes `&self`.
pub struct Container {
  catalog: TypeCatalog,
  definitions: HashMap<String, Definition>,
  categories: HashMap<String, Vec<String>>,
}

impl Container {
  /// Creates a container that resolves target types through `catalog`.
  pub fn new(catalog: TypeCatalog) -> Self {
    Container {
      catalog,
      definitions: HashMap::new(),
      categories: HashMap::new(),
    }
  }

  // --- Registration ---

  /// Registers (or overwrites) a transient definition: every `get(id)`
  /// constructs a fresh instance.
  pub fn map_transient(&mut self, id: &str, target_type: &str, args: Vec<ArgSpec>) {
    self
      .definitions
      .insert(id.to_owned(), Definition::class(target_type, Scope::Transient, args));
  }

  /// Registers (or overwrites) a singleton definition: the first `get(id)`
  /// constructs and caches the instance, later calls return the cached one.
  pub fn map_singleton(&mut self, id: &str, target_type: &str, args: Vec<ArgSpec>) {
    self
      .definitions
      .insert(id.to_owned(), Definition::class(target_type, Scope::Singleton, args));
  }

  /// Registers (or overwrites) a literal-value definition. The value is
  /// injectable into fields and resolvable via `get` as an
  /// `Arc<serde_yaml::Value>`.
  pub fn map_value(&mut self, id: &str, value: Value) {
    self.definitions.insert(id.to_owned(), Definition::Value(value));
  }

  /// Registers (or overwrites) a category's ordered identifier list.
  pub fn map_category(&mut self, name: &str, ids: Vec<String>) {
    self.categories.insert(name.to_owned(), ids);
  }

  // --- Lookup ---

  /// Read-only view of the full category table.
  pub fn categories(&self) -> &HashMap<String, Vec<String>> {
    &self.categories
  }

  /// The ordered identifier list of category `name`, empty for unknown names.
  pub fn ids_in_category(&self, name: &str) -> &[String] {
    self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Whether `id` is registered and its target type is constructible.
  ///
  /// Unregistered identifiers report `false`; literal-value definitions
  /// report `true`.
  pub fn has(&self, id: &str) -> bool {
    match self.definitions.get(id) {
      Some(Definition::Class { target_type, .. }) => self.catalog.contains(target_type),
      Some(Definition::Value(_)) => true,
      None => false,
    }
  }

  // --- Resolution ---

  /// Resolves `id` into an instance.
  ///
  /// Singleton definitions are constructed on first resolution and return the
  /// same instance thereafter; transient definitions construct a fresh
  /// instance on every call. Constructor arguments are resolved recursively,
  /// and declared fields are injected before the instance is returned.
  pub fn get(&self, id: &str) -> Result<Instance> {
    trace!(%id, "resolving service");
    let definition = self
      .definitions
      .get(id)
      .ok_or_else(|| Error::ClassNotFound(id.to_owned()))?;

    let (target_type, scope, args, cell) = match definition {
      Definition::Value(value) => return Ok(Arc::new(value.clone())),
      Definition::Class {
        target_type,
        scope,
        args,
        instance,
      } => (target_type.as_str(), *scope, args.as_slice(), instance),
    };

    if !self.catalog.contains(target_type) {
      return Err(Error::ClassNotFound(target_type.to_owned()));
    }

    if scope == Scope::Singleton {
      if let Some(cached) = cell.get() {
        return Ok(cached.clone());
      }
    }

    let instance = self.construct(target_type, args)?;

    if scope == Scope::Singleton {
      debug!(%id, %target_type, "caching singleton instance");
      // A recursive resolution may have filled the cell in the meantime; the
      // first stored instance wins.
      return Ok(cell.get_or_init(|| instance).clone());
    }
    Ok(instance)
  }

  /// Resolves `id` and downcasts the instance to a concrete type.
  pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    self
      .get(id)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch { id: id.to_owned() })
  }

  /// Resolves every identifier in category `name`, in category order.
  pub fn get_from_category(&self, name: &str) -> Result<Vec<Instance>> {
    self.ids_in_category(name).iter().map(|id| self.get(id)).collect()
  }

  // --- Private helpers ---

  fn construct(&self, target_type: &str, args: &[ArgSpec]) -> Result<Instance> {
    let entry = self
      .catalog
      .entry(target_type)
      .ok_or_else(|| Error::ClassNotFound(target_type.to_owned()))?;

    let resolved = self.resolve_args(args)?;
    let mut boxed = (entry.construct)(&ResolvedArgs::new(target_type, &resolved))?;
    self.inject_fields(entry, target_type, boxed.as_mut())?;
    Ok(Arc::from(boxed))
  }

  /// Resolves each argument spec independently and in place; nested lists
  /// recurse element-wise.
  fn resolve_args(&self, args: &[ArgSpec]) -> Result<Vec<Resolved>> {
    args.iter().map(|spec| self.resolve_arg(spec)).collect()
  }

  fn resolve_arg(&self, spec: &ArgSpec) -> Result<Resolved> {
    match spec {
      ArgSpec::Literal(value) => Ok(Resolved::Value(value.clone())),
      ArgSpec::Ref(id) => Ok(Resolved::Service(self.get(id)?)),
      ArgSpec::List(items) => Ok(Resolved::List(self.resolve_args(items)?)),
    }
  }

  fn inject_fields(&self, entry: &TypeEntry, target_type: &str, obj: &mut dyn Any) -> Result<()> {
    for injection in &entry.injections {
      let Some(definition) = self.definitions.get(&injection.source_id) else {
        // Declared fields without a matching definition are skipped silently.
        continue;
      };
      let dep = match definition {
        Definition::Value(value) => Resolved::Value(value.clone()),
        Definition::Class {
          scope: Scope::Transient,
          ..
        } => Resolved::Service(self.get(&injection.source_id)?),
        Definition::Class {
          scope: Scope::Singleton,
          instance,
          ..
        } => {
          // First use resolves and caches, the same lazy-singleton rule as
          // `get`.
          let cached = match instance.get() {
            Some(cached) => cached.clone(),
            None => self.get(&injection.source_id)?,
          };
          Resolved::Service(cached)
        }
      };
      trace!(
        %target_type,
        field = %injection.field,
        source = %injection.source_id,
        "injecting field"
      );
      (injection.setter)(obj, dep)?;
    }
    Ok(())
  }
}
