//! Integration Tests for Config and History Persistence
//!
//! Aliases and the port survive a `/save`; typed lines survive a restart
//! through the history file.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use serialterm::serial::MockSerialDevice;
use serialterm::{ConfigLoader, Error, Precedence, SessionConfig, SessionOptions};
use std::fs;
use tempfile::TempDir;
use test_utils::{TestSession, TEST_PORT};

#[test]
fn test_save_then_reload_restores_aliases() {
    let mut session = TestSession::new();
    session.type_lines(&["/alias p = ping", "/alias r = reboot", "/save"]);

    let config_path = session.dispatcher.session().options().config_path();
    let saved = ConfigLoader::new(&config_path).load().unwrap();
    assert_eq!(saved.general.port.as_deref(), Some(TEST_PORT));
    assert_eq!(saved.aliases.get("p").map(String::as_str), Some("ping"));

    let TestSession { dir, .. } = session;
    let mut restarted = TestSession::in_dir(dir, MockSerialDevice::new(), saved);
    restarted.type_lines(&["r"]);
    assert_eq!(restarted.transmitted(), "reboot\n");
}

#[test]
fn test_config_is_not_written_without_save() {
    let mut session = TestSession::new();
    session.type_lines(&["/alias p = ping"]);
    assert!(!session.dispatcher.session().options().config_path().exists());
}

#[test]
fn test_precedence_from_config_applies() {
    let mut config = SessionConfig::default();
    config.general.precedence = Some(Precedence::IgnoreFirst);
    let session = TestSession::with_config(config);

    let state = session.dispatcher.session().state();
    assert_eq!(state.filter().precedence(), Precedence::IgnoreFirst);
}

#[test]
fn test_history_survives_restart() {
    let mut session = TestSession::new();
    session.type_lines(&["/filter ^OK", "ps"]);
    session.dispatcher.session().persist_history();

    let TestSession { dir, .. } = session;
    let restarted = TestSession::in_dir(dir, MockSerialDevice::new(), SessionConfig::default());
    let entries: Vec<_> = restarted
        .dispatcher
        .session()
        .history()
        .entries()
        .iter()
        .cloned()
        .collect();
    assert_eq!(entries, vec!["/filter ^OK", "ps"]);
}

#[test]
fn test_show_config_includes_passthrough_keys() {
    let config: SessionConfig = toml::from_str(
        r#"
        [general]
        port = "/dev/ttyUSB0"
        board = "msba2"
        "#,
    )
    .unwrap();

    let mut session = TestSession::with_config(config);
    session.type_lines(&["/show_config"]);
    assert!(session.printed().contains("general.board: msba2"));
}

#[test]
fn test_unparsable_config_is_rejected_and_left_alone() {
    let dir = TempDir::new().unwrap();
    let options = SessionOptions::in_dir(dir.path());
    let original = "[general]\nport = \"/dev/ttyACM3\"\nprecedence = \"filter_first\"\n\n[aliases]\np = \"ping\"\nr = \"reboot\"\n";
    fs::write(options.config_path(), original).unwrap();

    let err = options.load_config().unwrap_err();
    assert!(matches!(err, Error::ConfigLoadFailed { .. }));
    assert!(err.to_string().contains("serialterm.toml"));
    assert_eq!(fs::read_to_string(options.config_path()).unwrap(), original);
}

#[test]
fn test_non_string_alias_is_rejected() {
    let dir = TempDir::new().unwrap();
    let options = SessionOptions::in_dir(dir.path());
    fs::write(options.config_path(), "[aliases]\np = 3\n").unwrap();

    assert!(matches!(
        options.load_config(),
        Err(Error::ConfigLoadFailed { .. })
    ));
}

#[test]
fn test_missing_config_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let options = SessionOptions::in_dir(dir.path());

    assert_eq!(options.load_config().unwrap(), SessionConfig::default());
    assert!(!options.config_path().exists());
}

#[test]
fn test_configured_port_and_aliases_survive_load_and_save() {
    let dir = TempDir::new().unwrap();
    let options = SessionOptions::in_dir(dir.path());
    fs::write(
        options.config_path(),
        "[general]\nport = \"/dev/ttyACM3\"\nprecedence = \"ignore-first\"\n\n[aliases]\np = \"ping\"\n",
    )
    .unwrap();

    let config = options.load_config().unwrap();
    assert_eq!(options.resolve_port(&config), "/dev/ttyACM3");

    let mut session = TestSession::in_dir(dir, MockSerialDevice::new(), config);
    session.type_lines(&["/alias r = reboot", "/save"]);

    let saved = session.dispatcher.session().options().load_config().unwrap();
    assert_eq!(saved.aliases.get("p").map(String::as_str), Some("ping"));
    assert_eq!(saved.aliases.get("r").map(String::as_str), Some("reboot"));
    assert_eq!(saved.general.precedence, Some(Precedence::IgnoreFirst));
}
