//! The type catalog: the registry of constructible types.
//!
//! The container never reflects over live types. Application code registers
//! each constructible type here under its fully-qualified name, together with
//! a constructor closure and any declaratively injectable fields.
//! [`Container::get`](crate::Container::get) looks target-type names up in
//! this catalog; a name that is absent is the "class not found" condition.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::args::{Resolved, ResolvedArgs};
use crate::error::{Error, Result};

type AnyInstance = Box<dyn Any + Send + Sync>;
type ConstructFn = Box<dyn Fn(&ResolvedArgs) -> Result<AnyInstance> + Send + Sync>;
type SetterFn = Box<dyn Fn(&mut dyn Any, Resolved) -> Result<()> + Send + Sync>;

/// One declared injectable field on a catalog entry.
pub(crate) struct Injection {
  pub(crate) field: String,
  pub(crate) source_id: String,
  pub(crate) setter: SetterFn,
}

pub(crate) struct TypeEntry {
  pub(crate) construct: ConstructFn,
  pub(crate) injections: Vec<Injection>,
}

/// Maps fully-qualified type-name strings to construction recipes.
#[derive(Default)]
pub struct TypeCatalog {
  entries: HashMap<String, TypeEntry>,
}

impl TypeCatalog {
  /// Creates a new, empty catalog.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a constructible type under `name`, overwriting any previous
  /// registration for that name.
  ///
  /// The constructor receives the resolved argument list of whichever
  /// definition names this type; an empty list means zero-argument
  /// construction. Returns a handle for declaring injectable fields.
  ///
  /// # Examples
  ///
  /// ```
  /// use weft_ioc::TypeCatalog;
  ///
  /// struct Greeter {
  ///   name: String,
  /// }
  ///
  /// let mut catalog = TypeCatalog::new();
  /// catalog.register("app::Greeter", |args| {
  ///   Ok(Greeter { name: args.str_at(0)?.to_owned() })
  /// });
  /// assert!(catalog.contains("app::Greeter"));
  /// ```
  pub fn register<T, F>(&mut self, name: &str, construct: F) -> TypeHandle<'_, T>
  where
    T: Any + Send + Sync,
    F: Fn(&ResolvedArgs) -> Result<T> + Send + Sync + 'static,
  {
    let entry = TypeEntry {
      construct: Box::new(move |args| construct(args).map(|value| Box::new(value) as AnyInstance)),
      injections: Vec::new(),
    };
    self.entries.insert(name.to_owned(), entry);
    TypeHandle {
      catalog: self,
      name: name.to_owned(),
      _marker: PhantomData,
    }
  }

  /// Whether a type with this name can be constructed.
  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  pub(crate) fn entry(&self, name: &str) -> Option<&TypeEntry> {
    self.entries.get(name)
  }
}

/// Typed handle returned by [`TypeCatalog::register`] for follow-up
/// declarations on one catalog entry.
pub struct TypeHandle<'a, T> {
  catalog: &'a mut TypeCatalog,
  name: String,
  _marker: PhantomData<fn(T)>,
}

impl<'a, T: Any + Send + Sync> TypeHandle<'a, T> {
  /// Declares `field` injectable from the definition registered under the
  /// same identifier: after construction, the container resolves the service
  /// named `field` and hands it to `setter` for assignment.
  ///
  /// If no definition with that identifier exists at resolution time, the
  /// field is skipped silently.
  pub fn inject<F>(self, field: &str, setter: F) -> Self
  where
    F: Fn(&mut T, Resolved) -> Result<()> + Send + Sync + 'static,
  {
    self.inject_from(field, field, setter)
  }

  /// Declares `field` injectable from the definition registered under
  /// `source_id` instead of the field's own name.
  pub fn inject_from<F>(self, field: &str, source_id: &str, setter: F) -> Self
  where
    F: Fn(&mut T, Resolved) -> Result<()> + Send + Sync + 'static,
  {
    let type_name = self.name.clone();
    let erased: SetterFn = Box::new(move |obj, dep| {
      let obj = obj.downcast_mut::<T>().ok_or_else(|| Error::Construction {
        type_name: type_name.clone(),
        reason: "field setter applied to an instance of another type".to_owned(),
      })?;
      setter(obj, dep)
    });
    if let Some(entry) = self.catalog.entries.get_mut(&self.name) {
      // Redeclaring a field replaces its previous injection.
      entry.injections.retain(|injection| injection.field != field);
      entry.injections.push(Injection {
        field: field.to_owned(),
        source_id: source_id.to_owned(),
        setter: erased,
      });
    }
    self
  }
}
