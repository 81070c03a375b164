//! Integration tests for plugin options parsing
//!
//! Tests `PluginOptions` with realistic TOML files.

use compress_plugin::config::claimed_extensions;
use compress_plugin::{
    BuildHooks, CompressPlugin, ConfigError, LoadArgs, PluginError, PluginOptions,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_empty_options() {
    let options = PluginOptions::from_str("").unwrap();
    assert_eq!(options.namespace, "compress");
    assert_eq!(options.install_root, None);
    assert!(options.runtime_modules.is_empty());
    assert!(options.compressors.is_empty());
}

#[test]
fn test_full_options() {
    let toml = r#"
namespace = "assets"
install-root = "/opt/compress-plugin"

[runtime-modules]
lz-string = "/opt/vendor/lz-string.js"

[[compressors]]
filter = "\\.txt$"
loader = "text"
lazy = true

[[compressors]]
filter = "\\.json$"
loader = "json"
namespace = "file"
on-end = true
"#;

    let options = PluginOptions::from_str(toml).unwrap();
    assert_eq!(options.namespace, "assets");
    assert_eq!(options.install_root, Some(PathBuf::from("/opt/compress-plugin")));
    assert_eq!(
        options.runtime_modules.get("lz-string"),
        Some(&PathBuf::from("/opt/vendor/lz-string.js"))
    );

    assert_eq!(options.compressors.len(), 2);
    let text = &options.compressors[0];
    assert_eq!(text.filter, r"\.txt$");
    assert_eq!(text.loader, "text");
    assert!(text.lazy);
    assert!(!text.on_end);
    assert_eq!(text.namespace, None);

    let json = &options.compressors[1];
    assert_eq!(json.loader, "json");
    assert_eq!(json.namespace.as_deref(), Some("file"));
    assert!(json.on_end);
    assert!(!json.lazy);
}

#[test]
fn test_unknown_loader_parses_but_fails_setup() {
    let toml = r#"
[[compressors]]
filter = "."
loader = "yaml"
"#;

    let options = PluginOptions::from_str(toml).unwrap();
    let result = BuildHooks::setup(&CompressPlugin::new(options));
    assert!(matches!(result, Err(PluginError::UnknownLoader(name)) if name == "yaml"));
}

#[test]
fn test_missing_filter_is_parse_error() {
    let toml = r#"
[[compressors]]
loader = "text"
"#;

    assert!(matches!(
        PluginOptions::from_str(toml),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_invalid_namespace() {
    let result = PluginOptions::from_str("namespace = \"not valid\"");
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_setup_validates_namespace() {
    let options = PluginOptions {
        namespace: "a:b".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        BuildHooks::setup(&CompressPlugin::new(options)),
        Err(PluginError::Config(ConfigError::ValidationError(_)))
    ));
}

#[test]
fn test_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compress.toml");
    fs::write(
        &path,
        "[[compressors]]\nfilter = \"\\\\.md$\"\nloader = \"text\"\n",
    )
    .unwrap();

    let options = PluginOptions::from_file(&path).unwrap();
    assert_eq!(options.compressors[0].filter, r"\.md$");

    assert!(matches!(
        PluginOptions::from_file(&temp.path().join("missing.toml")),
        Err(ConfigError::IoError(_))
    ));
}

#[test]
fn test_options_round_trip_through_toml() {
    let toml = r#"
namespace = "compress"

[[compressors]]
filter = "\\.txt$"
loader = "text"
lazy = true
on-end = false
"#;
    let options = PluginOptions::from_str(toml).unwrap();
    let serialized = toml::to_string(&options).unwrap();
    assert_eq!(PluginOptions::from_str(&serialized).unwrap(), options);
}

#[test]
fn test_loader_map_drives_plugin() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("strings.txt");
    fs::write(&data, "a lot of repeated text, a lot of repeated text").unwrap();

    let mut loaders = BTreeMap::new();
    loaders.insert(".txt".to_string(), "compressed-text".to_string());
    loaders.insert(".css".to_string(), "css".to_string());

    let options = PluginOptions::default().with_loader_map(&loaders, false);
    assert_eq!(claimed_extensions(&loaders), vec![".txt"]);

    let hooks = BuildHooks::setup(&CompressPlugin::new(options)).unwrap();
    assert_eq!(hooks.load_options().count(), 1);
    assert!(hooks.load(&LoadArgs::file(&data)).unwrap().is_some());
    assert!(hooks
        .load(&LoadArgs::file(temp.path().join("style.css")))
        .unwrap()
        .is_none());
}
