//! # Weft IoC
//!
//! A configuration-driven, string-keyed dependency injection container.
//!
//! Services are registered under symbolic identifiers, either directly through
//! the [`Container`] API or in bulk from a YAML configuration document via the
//! [`Registry`] loader, and resolved into live instances on demand.
//!
//! ## Core Concepts
//!
//! - **Type catalog**: the registry of constructible types. Every type a
//!   definition can name is registered in a [`TypeCatalog`] under its
//!   fully-qualified name, with a constructor closure and any declaratively
//!   injectable fields.
//! - **Scopes**: transient definitions construct a fresh instance per
//!   resolution; singleton definitions construct once, lazily, and return the
//!   same instance for the container's lifetime.
//! - **Reference tokens**: a constructor argument written as `"@other"`
//!   resolves the service registered under `other` and substitutes the result.
//!   Nested argument lists are resolved element-wise in place.
//! - **Field injection**: fields declared injectable at catalog registration
//!   are populated after construction, without constructor wiring.
//! - **Categories**: named, ordered groups of identifiers for bulk resolution.
//!
//! ## Quick Start
//!
//! ```
//! use weft_ioc::{ArgSpec, Container, TypeCatalog};
//!
//! struct Config {
//!   site_name: String,
//! }
//!
//! struct Mailer {
//!   sender: String,
//!   config: Option<std::sync::Arc<Config>>,
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register("app::Config", |_| {
//!   Ok(Config { site_name: "example.org".to_owned() })
//! });
//! catalog
//!   .register("app::Mailer", |args| {
//!     Ok(Mailer { sender: args.str_at(0)?.to_owned(), config: None })
//!   })
//!   .inject("config", |mailer: &mut Mailer, dep| {
//!     mailer.config = Some(dep.service::<Config>()?);
//!     Ok(())
//!   });
//!
//! let mut container = Container::new(catalog);
//! container.map_singleton("config", "app::Config", Vec::new());
//! container.map_transient("mailer", "app::Mailer", vec![
//!   ArgSpec::Literal("noreply".into()),
//! ]);
//!
//! let mailer = container.get_as::<Mailer>("mailer").unwrap();
//! assert_eq!(mailer.sender, "noreply");
//! assert_eq!(mailer.config.as_ref().unwrap().site_name, "example.org");
//! ```

mod args;
mod catalog;
mod container;
mod core;
mod error;
mod registry;

pub use args::{ArgSpec, Resolved, ResolvedArgs, REF_SIGIL};
pub use catalog::{TypeCatalog, TypeHandle};
pub use container::{Container, Instance};
pub use error::{Error, Result};
pub use registry::{ConfigCache, MemoryCache, Registry, CONFIG_CACHE_KEY};
