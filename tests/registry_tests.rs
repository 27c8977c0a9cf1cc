// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Integration tests for loading sources through the registry

use cfgtree::error::{ConfigError, SyntaxError};
use cfgtree::{CfgError, ConfigHandle, Format, Node, ParserRegistry, RegistryOptions};
use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn cause_chain(err: &CfgError) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages
}

#[test]
fn test_yaml_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "app.yml",
        "yml:\n  string: Evil_Wizard\n  array:\n    - 1\n    - 2\n    - 3\n",
    );
    let registry = ParserRegistry::new();
    let config = registry.load(Format::Yaml, Some(&path)).unwrap();

    assert_eq!(config.get("yml.string", false), Node::from("Evil_Wizard"));
    assert_eq!(config.get("yml.array", false).len(), 3);
    assert_eq!(config.get("yml.array.2", false), Node::Integer(3));
    assert!(!config.has("yml.array.3"));
    assert_eq!(config.get("yml.missing", "dflt"), Node::from("dflt"));
    assert_eq!(config.format(), Format::Yaml);
}

#[test]
fn test_same_source_returns_same_instance() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "app.json", r#"{"a": {"b": true}}"#);
    let registry = ParserRegistry::new();

    let first = registry.load(Format::Json, Some(&path)).unwrap();
    let second = registry.load_named("json", Some(&path)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // a different format is a different record
    let as_yaml = registry.load(Format::Yaml, Some(&path)).unwrap();
    assert!(!Arc::ptr_eq(&first, &as_yaml));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_malformed_yaml_is_parse_failure() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "bad.yml", "key: [unclosed\n  other: {\n");
    let registry = ParserRegistry::new();

    let err = registry.load(Format::Yaml, Some(&path)).unwrap_err();
    assert!(matches!(
        err,
        CfgError::Config(ConfigError::FailedToParseConfigSource { format: Format::Yaml, .. })
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_missing_and_empty_files_are_load_failures() {
    let dir = TempDir::new().unwrap();
    let registry = ParserRegistry::new();

    let missing = dir.path().join("nope.yml");
    let err = registry.load(Format::Yaml, Some(&missing)).unwrap_err();
    assert!(matches!(
        err,
        CfgError::Config(ConfigError::FailedToLoadConfigSource { .. })
    ));
    assert!(err.to_string().contains("nope.yml"));

    let empty = write(dir.path(), "empty.json", "   \n");
    let err = registry.load(Format::Json, Some(&empty)).unwrap_err();
    assert!(matches!(
        err,
        CfgError::Config(ConfigError::FailedToLoadConfigSource { .. })
    ));
}

#[test]
fn test_unknown_parser_type() {
    let registry = ParserRegistry::new();
    let err = registry.load_named("XML", Some(Path::new("a.xml"))).unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Unknown parser type [XML].");
}

#[test]
fn test_conf_with_groups_and_includes() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "cfg/child.json",
        r#"{"json": {"string": "Evil_Wizard"}, "tags": ["a"]}"#,
    );
    write(dir.path(), "cfg/extra.yml", "tags:\n  - b\n");
    let parent = write(
        dir.path(),
        "cfg/parent.conf",
        "# main settings\n\
         ServerName example.org\n\
         port = 8080\n\
         IncludeConfig JSON ./child.json\n\
         IncludeConfig YAML ./extra.yml\n\
         <ifModule dbgroup>\n\
         \x20   DatabaseSlave primary 10.0.0.1\n\
         \x20   IncludeConfig JSON ./child.json\n\
         </ifModule>\n",
    );
    let registry = ParserRegistry::new();
    let config = registry.load(Format::Conf, Some(&parent)).unwrap();

    assert_eq!(config.get("ServerName", false), Node::from("example.org"));
    assert_eq!(config.get("port", false), Node::Integer(8080));
    assert_eq!(config.get("json.string", false), Node::from("Evil_Wizard"));
    assert_eq!(
        config.get("tags", false),
        Node::Sequence(vec![Node::from("a"), Node::from("b")])
    );
    assert_eq!(config.get("dbgroup.json.string", false), Node::from("Evil_Wizard"));

    // the host key contains dots, so read it with another separator
    let slashed = ConfigHandle::clone(&config).with_path_separator("/");
    assert_eq!(
        slashed.get("dbgroup/database_slaves/10.0.0.1", false),
        Node::from("primary")
    );

    // included sources are cached like any other load
    let child = registry
        .load(Format::Json, Some(&dir.path().join("cfg/child.json")))
        .unwrap();
    assert_eq!(child.get_keys(), vec!["json", "tags"]);
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_broken_include_names_the_target() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.json", "{ not json");
    let parent = write(dir.path(), "main.conf", "IncludeConfig JSON ./broken.json\n");
    let registry = ParserRegistry::new();

    let err = registry.load(Format::Conf, Some(&parent)).unwrap_err();
    assert!(matches!(
        err,
        CfgError::Config(ConfigError::FailedToParseConfigSource { format: Format::Conf, .. })
    ));
    let chain = cause_chain(&err);
    assert!(chain.iter().any(|m| m.contains("broken.json")));
    assert!(chain.iter().any(|m| m.contains("Invalid JSON")));
}

#[test]
fn test_include_cycle_is_detected() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.conf", "from_a = 1\nIncludeConfig CONF ./b.conf\n");
    write(dir.path(), "b.conf", "from_b = 2\nIncludeConfig CONF ./a.conf\n");
    let registry = ParserRegistry::new();

    let err = registry.load(Format::Conf, Some(&a)).unwrap_err();
    let chain = cause_chain(&err);
    assert!(chain.iter().any(|m| m.contains("Include cycle detected")));
    assert!(chain.iter().any(|m| m.contains("a.conf -> ") && m.contains("b.conf")));
    assert!(registry.is_empty());
}

#[test]
fn test_unclosed_group_policy() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "open.conf", "<ifModule cache\nttl = 60\n");

    let strict = ParserRegistry::new();
    match strict.load(Format::Conf, Some(&path)).unwrap_err() {
        CfgError::Config(ConfigError::FailedToParseConfigSource { cause, .. }) => {
            assert!(matches!(
                *cause,
                CfgError::Syntax(SyntaxError::UnclosedScope { ref group }) if group == "cache"
            ));
        }
        other => panic!("unexpected error: {}", other),
    }

    let lenient = ParserRegistry::with_options(RegistryOptions::default().with_strict_scopes(false));
    let config = lenient.load(Format::Conf, Some(&path)).unwrap();
    assert_eq!(config.get("cache.ttl", 0), Node::Integer(60));
}

#[test]
fn test_php_array_and_toml_sources() {
    let dir = TempDir::new().unwrap();
    let php = write(
        dir.path(),
        "settings.php",
        "<?php\nreturn [\n    'db' => ['host' => 'localhost', 'port' => 3306],\n    'features' => ['a', 'b'],\n];\n",
    );
    let toml = write(dir.path(), "settings.toml", "[db]\nport = 5432\nuser = \"app\"\n");
    let registry = ParserRegistry::new();

    let from_php = registry.load_file(&php).unwrap();
    assert_eq!(from_php.get("db.port", 0), Node::Integer(3306));
    assert_eq!(from_php.get("features.1", false), Node::from("b"));

    let from_toml = registry.load_file(&toml).unwrap();
    let merged = from_php.import_config(&from_toml);
    assert_eq!(merged.get("db.port", 0), Node::Integer(5432));
    assert_eq!(merged.get("db.host", false), Node::from("localhost"));
    assert_eq!(merged.get("db.user", false), Node::from("app"));
    assert_eq!(from_php.get("db.port", 0), Node::Integer(3306));
}

#[test]
fn test_sub_section_matches_parent_value() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "app.yml", "db:\n  host: h\n  pool:\n    size: 5\n");
    let registry = ParserRegistry::new();
    let config = registry.load(Format::Yaml, Some(&path)).unwrap();

    let section = config.get_sub_section("db").unwrap();
    assert_eq!(Node::Mapping(section.to_mapping()), config.get("db", false));
    assert_eq!(section.get_numeric("size", Some("pool")).unwrap().as_i64(), 5);

    let edited = section.with_value("pool.size", 10).unwrap();
    assert_eq!(edited.get("pool.size", 0), Node::Integer(10));
    assert_eq!(config.get("db.pool.size", 0), Node::Integer(5));
}

#[test]
fn test_import_is_associative() {
    let make = |json: &str| ConfigHandle::create(json, "inline", Format::Json).unwrap();
    let a = make(r#"{"a": 1, "l": [1], "m": {"x": 1}}"#);
    let b = make(r#"{"a": 2, "l": [2], "m": {"y": 2}}"#);
    let c = make(r#"{"l": [3], "m": {"x": 3}}"#);

    let left = a.import_config(&b).import_config(&c);
    let right = a.import_config(&b.import_config(&c));
    assert_eq!(left.to_mapping(), right.to_mapping());
    assert_eq!(left.get("a", 0), Node::Integer(2));
    assert_eq!(left.get("l", false).len(), 3);
    assert_eq!(left.get("m.x", 0), Node::Integer(3));
}
