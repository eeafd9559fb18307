use assert_cmd::Command;
use openpeon::config::Config;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn openpeon(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("openpeon").unwrap();
    cmd.env_remove("OPENPEON_DEBUG")
        .env_remove("OPENCODE_PEON_DEBUG")
        .env_remove("OPENPEON_HOME")
        .arg("--root")
        .arg(root);
    cmd
}

#[test]
fn presets_lists_preset_files() {
    let dir = tempfile::tempdir().unwrap();
    let presets = dir.path().join("presets");
    fs::create_dir_all(&presets).unwrap();
    fs::write(presets.join("peasant.json"), "{}").unwrap();
    fs::write(presets.join("peon.json"), "{}").unwrap();

    openpeon(dir.path())
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("peasant\npeon"));
}

#[test]
fn volume_is_clamped_and_saved() {
    let dir = tempfile::tempdir().unwrap();

    openpeon(dir.path())
        .args(["volume", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Volume set to 10"));

    let saved = Config::load_from_path(&dir.path().join("openpeon.json")).unwrap();
    assert_eq!(saved.volume, 10);
}

#[test]
fn missing_preset_fails_with_reason() {
    let dir = tempfile::tempdir().unwrap();

    openpeon(dir.path())
        .args(["preset", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_validate_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.mappings.push(config.mappings[0].clone());
    config.save(&dir.path().join("openpeon.json")).unwrap();

    openpeon(dir.path())
        .args(["config", "--validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate mapping name"));
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();

    openpeon(dir.path()).args(["config", "--init"]).assert().success();
    let saved = Config::load_from_path(&dir.path().join("openpeon.json")).unwrap();
    assert_eq!(saved, Config::default());

    openpeon(dir.path()).args(["config", "--init"]).assert().failure();
}

#[test]
fn meta_json_lists_trigger_types() {
    let dir = tempfile::tempdir().unwrap();

    openpeon(dir.path())
        .args(["meta", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tool.before"))
        .stdout(predicate::str::contains("session.idle"));
}

#[test]
fn listen_answers_admin_commands_between_events() {
    let dir = tempfile::tempdir().unwrap();
    let presets = dir.path().join("presets");
    fs::create_dir_all(&presets).unwrap();
    fs::write(presets.join("retro.json"), r#"{"volume": 4, "mappings": []}"#).unwrap();

    let lines: [&[u8]; 7] = [
        br#"{"type":"session.idle"}"#,
        b"\xff\xfe",
        b"not json",
        br#"{"hook":"command","command":"presets"}"#,
        br#"{"hook":"command","command":"preset","arguments":"retro"}"#,
        br#"{"hook":"command","command":"preset","arguments":"ghost"}"#,
        br#"{"hook":"command","command":"config"}"#,
    ];
    let mut input = Vec::new();
    for line in lines {
        input.extend_from_slice(line);
        input.push(b'\n');
    }

    openpeon(dir.path())
        .args(["listen", "--quiet-start"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("- retro"))
        .stdout(predicate::str::contains("Switched to preset \"retro\""))
        .stdout(predicate::str::contains("Failed to switch preset"))
        .stdout(predicate::str::contains("Volume: 4"));
}

#[test]
fn listen_skips_undecodable_lines() {
    let dir = tempfile::tempdir().unwrap();

    let mut input = br#"{"type":"session.idle"}"#.to_vec();
    input.extend_from_slice(b"\n\xff\xfe\n");
    input.extend_from_slice(br#"{"hook":"command","command":"config"}"#);
    input.push(b'\n');

    openpeon(dir.path())
        .args(["listen", "--quiet-start"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Volume: 5"))
        .stderr(predicate::str::contains("malformed host message"));
}

#[test]
fn missing_config_is_not_a_warning() {
    let dir = tempfile::tempdir().unwrap();

    openpeon(dir.path())
        .args(["dispatch", r#"{"type":"session.idle"}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("using default config").not());
}

#[test]
fn malformed_config_warns_once_without_chain_dump() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("openpeon.json"), "{ volume: ").unwrap();

    openpeon(dir.path())
        .args(["dispatch", r#"{"type":"session.idle"}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("using default config"))
        .stderr(predicate::str::contains("Caused by").not());
}

#[cfg(target_os = "linux")]
fn debug_log_lines(config_home: &Path) -> usize {
    fs::read_to_string(config_home.join("opencode").join("peon-debug.log"))
        .map(|raw| raw.lines().count())
        .unwrap_or(0)
}

#[cfg(target_os = "linux")]
#[test]
fn debug_env_appends_to_debug_log() {
    let dir = tempfile::tempdir().unwrap();
    let config_home = tempfile::tempdir().unwrap();

    for (run, var) in ["OPENPEON_DEBUG", "OPENCODE_PEON_DEBUG"].iter().enumerate() {
        let before = debug_log_lines(config_home.path());
        openpeon(dir.path())
            .env(var, "1")
            .env("XDG_CONFIG_HOME", config_home.path())
            .args(["dispatch", r#"{"type":"session.idle"}"#])
            .assert()
            .success();
        let after = debug_log_lines(config_home.path());
        assert!(after > before, "run {run} via {var} added no lines");
    }
}

#[cfg(target_os = "linux")]
#[test]
fn debug_log_stays_off_without_env() {
    let dir = tempfile::tempdir().unwrap();
    let config_home = tempfile::tempdir().unwrap();

    openpeon(dir.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["dispatch", r#"{"type":"session.idle"}"#])
        .assert()
        .success();

    assert!(!config_home.path().join("opencode").join("peon-debug.log").exists());
}
