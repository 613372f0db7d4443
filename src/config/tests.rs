//! Tests for the configuration facade.

use crate::config::{Config, ConfigConsumer};
use crate::devices::DeviceKind;
use crate::document::Node;
use crate::error::{BoxError, ConfigError};
use crate::test_support::{numbered_lines, write_file};
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

const BRIDGE_CONFIG: &str = "\
# Insteon bridge
insteon:
  port: /dev/insteon  # PLM
  storage: data

mqtt:
  broker: 127.0.0.1
  port: 1883
  switch: &switch
    state_topic: insteon/{{address}}/state
    retain: true
  dimmer:
    <<: *switch
    level_topic: 'insteon/{{address}}/level'
";

#[test]
fn test_open_and_save_without_changes_keeps_file_and_drops_backup() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", BRIDGE_CONFIG);

    let mut config = Config::open(&path).unwrap();
    let report = config.save().unwrap();

    assert_eq!(report.removed_lines, 0);
    assert_eq!(report.backup, None);
    assert_eq!(config.backup(), None);
    assert_eq!(fs::read_to_string(&path).unwrap(), BRIDGE_CONFIG);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

const DEVICE_CONFIG: &str = "\
# Insteon bridge
insteon:
  port: /dev/insteon  # PLM
  storage: data

devices:
  switch:
    - aa.bb.cc: hall  # by the door
    # - dd.ee.ff: porch
    - 11.22.33: den
  dimmer:
    - 44.55.66  # kitchen
    # - 77.88.99

mqtt:
  broker: 127.0.0.1
  switch:
    state_topic: insteon/{{address}}/state
    template: |  # sent as is
      {\"cmd\": \"{{value}}\"}
      # raw json above
    description: >
      folded into one line
  retain: true
";

#[test]
fn test_save_without_changes_keeps_commented_devices_and_templates() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", DEVICE_CONFIG);

    let mut config = Config::open(&path).unwrap();
    let before = config.document().to_value().unwrap();
    let report = config.save().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), DEVICE_CONFIG);
    assert_eq!(report.removed_lines, 0);
    assert_eq!(report.backup, None);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);

    let reopened = Config::open(&path).unwrap();
    assert_eq!(reopened.document().to_value().unwrap(), before);
    assert_eq!(
        before["mqtt"]["switch"]["template"],
        serde_yaml::Value::from("{\"cmd\": \"{{value}}\"}\n# raw json above\n")
    );
}

#[test]
fn test_save_flattens_includes_into_root_file() {
    let temp = TempDir::new().unwrap();
    let path = write_file(
        temp.path(),
        "config.yaml",
        "insteon: !include insteon.yaml\ndevices: !include [a.yaml, b.yaml]\n",
    );
    write_file(temp.path(), "insteon.yaml", "port: /dev/insteon\n");
    write_file(temp.path(), "a.yaml", "- dimmer: aa.bb.cc\n");
    write_file(temp.path(), "b.yaml", "- switch: dd.ee.ff\n");

    let mut config = Config::open(&path).unwrap();
    config.save().unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert_eq!(
        saved,
        "insteon:\n  port: /dev/insteon\ndevices:\n  - dimmer: aa.bb.cc\n  - switch: dd.ee.ff\n"
    );
    // Included files are left alone.
    assert_eq!(
        fs::read_to_string(temp.path().join("insteon.yaml")).unwrap(),
        "port: /dev/insteon\n"
    );
}

#[test]
fn test_large_edit_keeps_backup_and_records_it() {
    let temp = TempDir::new().unwrap();
    let original = numbered_lines(20);
    let path = write_file(temp.path(), "config.yaml", &original);

    let mut config = Config::open(&path).unwrap();
    let root = config.document_mut().root_mut().unwrap().as_mapping_mut().unwrap();
    for i in 0..5 {
        root.remove(&format!("key_{i}"));
    }
    let report = config.save().unwrap();

    assert_eq!(report.removed_lines, 5);
    let backup = config.backup().unwrap().to_path_buf();
    assert_eq!(report.backup.as_deref(), Some(backup.as_path()));
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);
}

#[test]
fn test_small_edit_clears_recorded_backup() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", &numbered_lines(20));

    let mut config = Config::open(&path).unwrap();
    config
        .document_mut()
        .root_mut()
        .unwrap()
        .as_mapping_mut()
        .unwrap()
        .insert("key_0", Node::from("changed"));
    let report = config.save().unwrap();

    assert_eq!(report.removed_lines, 1);
    assert_eq!(config.backup(), None);
    assert!(
        fs::read_to_string(&path)
            .unwrap()
            .starts_with("key_0: changed\nkey_1: value_1\n")
    );
}

#[test]
fn test_failed_load_leaves_previous_document() {
    let temp = TempDir::new().unwrap();
    let good = write_file(temp.path(), "good.yaml", "a: 1\n");
    let bad = write_file(temp.path(), "bad.yaml", "modem: !include {file: x.yaml}\n");

    let mut config = Config::open(&good).unwrap();
    let before = config.document().clone();

    let err = config.load(&bad).unwrap_err();

    assert!(matches!(err, ConfigError::MalformedDirective { .. }));
    assert_eq!(config.document(), &before);
    assert_eq!(config.path(), good.as_path());
}

#[test]
fn test_load_replaces_document_and_path() {
    let temp = TempDir::new().unwrap();
    let first = write_file(temp.path(), "first.yaml", "a: 1\n");
    let second = write_file(temp.path(), "second.yaml", "b: 2\n");

    let mut config = Config::open(&first).unwrap();
    config.load(&second).unwrap();

    assert_eq!(config.path(), second.as_path());
    assert!(config.document().get("a").is_none());
    assert!(config.document().get("b").is_some());
}

#[test]
fn test_reload_discards_changes() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", "a: 1\n");

    let mut config = Config::open(&path).unwrap();
    config
        .document_mut()
        .root_mut()
        .unwrap()
        .as_mapping_mut()
        .unwrap()
        .insert("b", Node::from(2));
    config.reload().unwrap();

    assert!(config.document().get("b").is_none());
}

#[test]
fn test_save_of_deleted_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", "a: 1\n");
    let mut config = Config::open(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let err = config.save().unwrap_err();

    assert!(matches!(err, ConfigError::BackupSourceMissing { .. }));
    assert!(!path.exists());
}

#[test]
fn test_find_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", "a: 1\n");
    let config = Config::open(&path).unwrap();

    assert_eq!(config.find("DIMMER").unwrap(), config.find("dimmer").unwrap());
    assert_eq!(config.find("Thermostat").unwrap().kind, DeviceKind::Thermostat);
    assert!(matches!(
        config.find("unknown_type"),
        Err(ConfigError::UnknownDeviceType { .. })
    ));
}

#[derive(Debug, Deserialize, PartialEq)]
struct MqttSettings {
    broker: String,
    port: u16,
}

#[derive(Debug, Deserialize)]
struct TopicSettings {
    state_topic: String,
    level_topic: String,
    retain: bool,
}

#[test]
fn test_section_deserializes_typed_view() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", BRIDGE_CONFIG);
    let config = Config::open(&path).unwrap();

    #[derive(Deserialize)]
    struct Mqtt {
        broker: String,
        port: u16,
        dimmer: TopicSettings,
    }
    let mqtt: Mqtt = config.section("mqtt").unwrap().unwrap();

    assert_eq!(mqtt.broker, "127.0.0.1");
    assert_eq!(mqtt.port, 1883);
    assert_eq!(mqtt.dimmer.state_topic, "insteon/{{address}}/state");
    assert_eq!(mqtt.dimmer.level_topic, "insteon/{{address}}/level");
    assert!(mqtt.dimmer.retain);
}

#[test]
fn test_section_missing_and_invalid() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", "mqtt:\n  broker: host\n  port: not-a-port\n");
    let config = Config::open(&path).unwrap();

    let missing: Option<MqttSettings> = config.section("insteon").unwrap();
    assert!(missing.is_none());

    let err = config.section::<MqttSettings>("mqtt").unwrap_err();
    assert!(matches!(err, ConfigError::Value { ref key, .. } if key == "mqtt"));
}

/// Records the order consumers are called in and what they saw.
struct Recorder<'a> {
    name: &'static str,
    calls: &'a RefCell<Vec<String>>,
    fail: bool,
}

impl ConfigConsumer for Recorder<'_> {
    fn load_config(&mut self, config: &Config) -> Result<(), BoxError> {
        let port = config
            .document()
            .get(self.name)
            .and_then(|s| s.get("port"))
            .and_then(Node::as_str)
            .unwrap_or("-")
            .to_string();
        self.calls.borrow_mut().push(format!("{}:{}", self.name, port));
        if self.fail {
            return Err(format!("{} rejected the configuration", self.name).into());
        }
        Ok(())
    }
}

#[test]
fn test_apply_calls_mqtt_then_modem() {
    let temp = TempDir::new().unwrap();
    let path = write_file(
        temp.path(),
        "config.yaml",
        "mqtt:\n  port: 1883\ninsteon:\n  port: /dev/insteon\n",
    );
    let config = Config::open(&path).unwrap();
    let calls = RefCell::new(Vec::new());

    let mut mqtt = Recorder {
        name: "mqtt",
        calls: &calls,
        fail: false,
    };
    let mut modem = Recorder {
        name: "insteon",
        calls: &calls,
        fail: false,
    };
    config.apply(&mut mqtt, &mut modem).unwrap();

    assert_eq!(*calls.borrow(), vec!["mqtt:1883", "insteon:/dev/insteon"]);
}

#[test]
fn test_apply_stops_at_first_failure() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "config.yaml", "a: 1\n");
    let config = Config::open(&path).unwrap();
    let calls = RefCell::new(Vec::new());

    let mut mqtt = Recorder {
        name: "mqtt",
        calls: &calls,
        fail: true,
    };
    let mut modem = Recorder {
        name: "insteon",
        calls: &calls,
        fail: false,
    };
    let err = config.apply(&mut mqtt, &mut modem).unwrap_err();

    assert!(matches!(err, ConfigError::Apply { target: "mqtt", .. }));
    assert_eq!(calls.borrow().len(), 1);
}
