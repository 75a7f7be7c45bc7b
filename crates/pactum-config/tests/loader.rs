//! Loading configuration files from disk.

use std::io::Write;

use pactum_config::{ConfigError, ConfigLoader, LogFormat};
use tempfile::NamedTempFile;

fn file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_complete_toml_file() {
    let file = file_with(
        ".toml",
        r#"
            [binding]
            max_body_size = 1048576
            max_field_size = 65536
            max_fields = 10

            [contract]
            title = "Orders"
            version = "1.2.0"
            description = "Order management"
            content_types = ["application/json", "application/x-www-form-urlencoded"]

            [[contract.servers]]
            url = "https://orders.example.com"
            description = "Production"

            [logging]
            level = "pactum_extract=debug,info"
            format = "pretty"
            service_name = "orders"
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    let limits = config.binding.multipart_config();
    assert_eq!(limits.max_body_size, 1_048_576);
    assert_eq!(limits.max_field_size, 65_536);
    assert_eq!(limits.max_fields, 10);

    let spec = config.contract.generator().generate().unwrap();
    assert_eq!(spec.info.title, "Orders");
    assert_eq!(spec.servers[0].description.as_deref(), Some("Production"));

    assert_eq!(config.logging.format, LogFormat::Pretty);
    let log = config.logging.log_config();
    assert!(!log.json_format);
    assert_eq!(log.service_name, "orders");
}

#[test]
fn test_json_file_with_partial_sections() {
    let file = file_with(".json", r#"{"contract": {"title": "Billing"}}"#);

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.contract.title, "Billing");
    assert_eq!(config.contract.version, "0.1.0");
    assert_eq!(config.binding.max_fields, 100);
}

#[test]
fn test_unknown_key_in_file() {
    let file = file_with(".toml", "[binding]\nmax_files = 10\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unsupported_extension() {
    let file = file_with(".yaml", "binding: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::UnsupportedFormat { ref format }) if format == "yaml"
    ));
}

#[test]
fn test_file_that_fails_validation() {
    let file = file_with(".toml", "[binding]\nmax_body_size = 10\nmax_field_size = 20\n");
    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "binding.max_field_size"
    ));
}
