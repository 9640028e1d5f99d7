use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use weft_ioc::{
  ConfigCache, Container, Error, MemoryCache, Registry, TypeCatalog, CONFIG_CACHE_KEY,
};

// --- Test Fixtures ---

struct Config {
  site_name: String,
}

struct ValueHolder {
  value: String,
}

struct MultiArg {
  first: String,
  second: String,
  config: Arc<Config>,
}

fn catalog() -> TypeCatalog {
  let mut catalog = TypeCatalog::new();
  catalog.register("app::Config", |_| {
    Ok(Config {
      site_name: "example.org".to_owned(),
    })
  });
  catalog.register("app::ValueHolder", |args| {
    Ok(ValueHolder {
      value: args.str_at(0)?.to_owned(),
    })
  });
  catalog.register("app::MultiArg", |args| {
    Ok(MultiArg {
      first: args.str_at(0)?.to_owned(),
      second: args.str_at(1)?.to_owned(),
      config: args.service_at::<Config>(2)?,
    })
  });
  catalog
}

const IOC_YAML: &str = r#"
config:
  classPath: "app::"
  objects:
    config:
      class: Config
      singleton: true
services:
  classPath: "app::"
  objects:
    testvalueconstructor:
      class: ValueHolder
      arguments:
        - asd
    testmultiplearguments:
      class: MultiArg
      arguments:
        - asd
        - qwe
        - "@config"
"#;

// Writes `contents` as the ioc file of a fresh temp dir, returning both so
// the dir outlives the test body.
fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ioc.yml");
  fs::write(&path, contents).unwrap();
  (dir, path)
}

// --- Loader Tests ---

#[test]
fn register_all_populates_definitions_and_categories() {
  // Arrange
  let (_dir, path) = write_config(IOC_YAML);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());

  // Act
  registry.register_all(&mut container).unwrap();

  // Assert
  assert_eq!(container.categories().len(), 2);
  assert_eq!(container.ids_in_category("config"), ["config".to_owned()].as_slice());
  assert!(container.has("config"));

  let config = container.get_as::<Config>("config").unwrap();
  assert_eq!(config.site_name, "example.org");

  // Singleton per the flag.
  let again = container.get_as::<Config>("config").unwrap();
  assert!(Arc::ptr_eq(&config, &again));

  // Arguments pass through, references resolve against the singleton.
  let multi = container.get_as::<MultiArg>("testmultiplearguments").unwrap();
  assert_eq!(multi.first, "asd");
  assert_eq!(multi.second, "qwe");
  assert!(Arc::ptr_eq(&multi.config, &config));
}

#[test]
fn objects_default_to_transient_scope() {
  // Arrange
  let (_dir, path) = write_config(IOC_YAML);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());
  registry.register_all(&mut container).unwrap();

  // Act: no `singleton` flag on this object.
  let first = container.get_as::<ValueHolder>("testvalueconstructor").unwrap();
  let second = container.get_as::<ValueHolder>("testvalueconstructor").unwrap();

  // Assert
  assert_eq!(first.value, "asd");
  assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn register_all_twice_is_idempotent() {
  // Arrange
  let (_dir, path) = write_config(IOC_YAML);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());

  // Act
  registry.register_all(&mut container).unwrap();
  registry.register_all(&mut container).unwrap();

  // Assert: same observable state as a single invocation.
  assert_eq!(container.categories().len(), 2);
  assert_eq!(container.ids_in_category("config"), ["config".to_owned()].as_slice());
  assert_eq!(
    container.ids_in_category("services"),
    ["testvalueconstructor".to_owned(), "testmultiplearguments".to_owned()].as_slice()
  );
  assert!(container.get("testmultiplearguments").is_ok());
}

#[test]
fn category_order_follows_the_document() {
  // Arrange
  let (_dir, path) = write_config(IOC_YAML);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());
  registry.register_all(&mut container).unwrap();

  // Act
  let resolved = container.get_from_category("services").unwrap();

  // Assert: resolution order matches the document's object order.
  assert_eq!(resolved.len(), 2);
  assert!(resolved[0].clone().downcast::<ValueHolder>().is_ok());
  assert!(resolved[1].clone().downcast::<MultiArg>().is_ok());
}

#[test]
fn scalar_arguments_value_becomes_a_single_argument() {
  // Arrange: `arguments` is a bare scalar instead of a sequence.
  let yaml = r#"
services:
  classPath: "app::"
  objects:
    holder:
      class: ValueHolder
      arguments: asd
"#;
  let (_dir, path) = write_config(yaml);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());
  registry.register_all(&mut container).unwrap();

  // Act
  let holder = container.get_as::<ValueHolder>("holder").unwrap();

  // Assert
  assert_eq!(holder.value, "asd");
}

// --- Cache Collaboration Tests ---

#[test]
fn cache_hit_skips_the_configuration_file() {
  // Arrange: seed the cache, point the registry at a path that does not
  // exist. A file read would fail loudly.
  let cache = Arc::new(MemoryCache::new());
  let document: serde_yaml::Value = serde_yaml::from_str(IOC_YAML).unwrap();
  cache.save(CONFIG_CACHE_KEY, &document);

  let registry = Registry::new(cache.clone(), "/nonexistent/ioc.yml");
  let mut container = Container::new(catalog());

  // Act
  registry.register_all(&mut container).unwrap();

  // Assert
  assert!(container.has("config"));
}

#[test]
fn cache_miss_parses_the_file_and_saves_the_document() {
  // Arrange
  let (_dir, path) = write_config(IOC_YAML);
  let cache = Arc::new(MemoryCache::new());
  let registry = Registry::new(cache.clone(), path);
  let mut container = Container::new(catalog());

  assert!(!cache.exists(CONFIG_CACHE_KEY));

  // Act
  registry.register_all(&mut container).unwrap();

  // Assert: the parsed document was saved back for subsequent loads.
  assert!(cache.exists(CONFIG_CACHE_KEY));
  assert!(cache.load(CONFIG_CACHE_KEY).is_some());
}

// --- Malformed Document Tests ---

#[test]
fn missing_class_path_is_invalid_configuration() {
  // Arrange
  let yaml = r#"
services:
  objects:
    holder:
      class: ValueHolder
"#;
  let (_dir, path) = write_config(yaml);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());

  // Act
  let result = registry.register_all(&mut container);

  // Assert: the failure surfaces before anything is registered.
  assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
  assert!(container.categories().is_empty());
  assert!(!container.has("holder"));
}

#[test]
fn missing_class_key_is_invalid_configuration() {
  // Arrange
  let yaml = r#"
services:
  classPath: "app::"
  objects:
    holder:
      singleton: true
"#;
  let (_dir, path) = write_config(yaml);
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());

  // Act
  let result = registry.register_all(&mut container);

  // Assert
  assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn non_mapping_document_is_invalid_configuration() {
  // Arrange
  let (_dir, path) = write_config("- just\n- a\n- sequence\n");
  let registry = Registry::new(MemoryCache::new(), path);
  let mut container = Container::new(catalog());

  // Act
  let result = registry.register_all(&mut container);

  // Assert
  assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn missing_file_is_an_io_error() {
  // Arrange
  let registry = Registry::new(MemoryCache::new(), "/nonexistent/ioc.yml");
  let mut container = Container::new(catalog());

  // Act
  let result = registry.register_all(&mut container);

  // Assert
  assert!(matches!(result, Err(Error::Io(_))));
}
