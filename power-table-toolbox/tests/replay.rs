use power_table_lib::{Delegation, Params};
use power_table_toolbox::replay::{replay, BlockScript, PowerRecord};
use power_table_toolbox::utils::{csv, load_from_file};
use power_table_toolbox::Error;
use proptest::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use test_strategy::proptest;

const BLOCKS: &str = r#"
- height: 10
  btc_tip: 200
  validators:
    - "0x1111111111111111111111111111111111111111111111111111111111111111"
    - "2222222222222222222222222222222222222222222222222222222222222222"
    - "3333333333333333333333333333333333333333333333333333333333333333"
    - "4444444444444444444444444444444444444444444444444444444444444444"
  delegations:
    - validator: "1111111111111111111111111111111111111111111111111111111111111111"
      delegator: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
      total_sat: 100
      start_height: 150
      end_height: 5000
      covenant_sigs: 2
    - validator: "3333333333333333333333333333333333333333333333333333333333333333"
      delegator: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
      total_sat: 80
      start_height: 150
      end_height: 5000
      covenant_sigs: 2
    - validator: "2222222222222222222222222222222222222222222222222222222222222222"
      delegator: "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
      total_sat: 80
      start_height: 150
      end_height: 5000
      covenant_sigs: 2
    - validator: "4444444444444444444444444444444444444444444444444444444444444444"
      delegator: "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
      total_sat: 500
      start_height: 150
      end_height: 5000
      covenant_sigs: 2
  slash:
    - "4444444444444444444444444444444444444444444444444444444444444444"
- height: 11
- height: 12
  btc_tip: 201
"#;

const PARAMS: &str = r#"{"covenant_quorum": 2, "max_active_validators": 2}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn record(height: u64, byte: &str, voting_power: u64) -> PowerRecord {
    PowerRecord {
        height,
        validator: byte.repeat(32),
        voting_power,
    }
}

fn expected() -> Vec<PowerRecord> {
    vec![
        record(10, "11", 100),
        record(10, "22", 80),
        record(12, "11", 100),
        record(12, "22", 80),
    ]
}

#[test]
fn replay_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let blocks: Vec<BlockScript> =
        load_from_file(&write_file(&dir, "blocks.yaml", BLOCKS)).unwrap();
    let params: Params = load_from_file(&write_file(&dir, "params.json", PARAMS)).unwrap();
    assert_eq!(params.finalization_timeout, Params::default().finalization_timeout);

    let report = replay(&blocks, &params).unwrap();
    assert_eq!(report.entries, expected());
    assert_eq!(report.activation_height, Some(10));
    assert!(!report.outcomes[1].is_recorded());

    let output = dir.path().join("out.csv");
    csv::dump_data_to_csv(&report.entries, &output).unwrap();
    let reloaded: Vec<PowerRecord> = csv::load_data_from_csv::<_, b','>(&output).unwrap();
    assert_eq!(reloaded, expected());
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "blocks.toml", BLOCKS);
    assert!(matches!(
        load_from_file::<Vec<BlockScript>>(&path),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn malformed_key_halts_the_replay() {
    let blocks: Vec<BlockScript> = serde_yaml::from_str(
        r#"
- height: 1
  btc_tip: 10
  validators: ["0x0102"]
"#,
    )
    .unwrap();
    match replay(&blocks, &Params::default()) {
        Err(Error::PowerTable(e)) => assert!(e.is_fatal()),
        other => panic!("unexpected replay result: {:?}", other.map(|r| r.entries)),
    }
}

fn run_cli(args: &[&PathBuf]) -> std::process::Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_power-table"));
    command.arg("replay");
    for (flag, path) in ["--blocks", "--params", "--output"].iter().zip(args) {
        command.arg(flag).arg(path);
    }
    command.output().unwrap()
}

#[test]
fn cli_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let blocks = write_file(&dir, "blocks.yml", BLOCKS);
    let params = write_file(&dir, "params.json", PARAMS);

    let stdout = run_cli(&[&blocks, &params]);
    assert!(stdout.status.success());
    let text = String::from_utf8(stdout.stdout).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("height,validator,voting_power"));
    assert_eq!(lines.next(), Some(format!("10,{},100", "11".repeat(32)).as_str()));
    assert_eq!(lines.count(), 3);

    let output = dir.path().join("tables.csv");
    assert!(run_cli(&[&blocks, &params, &output]).status.success());
    let reloaded: Vec<PowerRecord> = csv::load_data_from_csv::<_, b','>(&output).unwrap();
    assert_eq!(reloaded, expected());
}

#[test]
fn cli_fails_on_invalid_params() {
    let dir = tempfile::tempdir().unwrap();
    let blocks = write_file(&dir, "blocks.yaml", BLOCKS);
    let params = write_file(&dir, "params.yaml", "covenant_quorum: 0\n");
    assert!(!run_cli(&[&blocks, &params]).status.success());
}

#[proptest]
fn replayed_tables_respect_the_cap(
    #[strategy(proptest::collection::vec((any::<[u8; 32]>(), any::<Delegation>()), 0..10))]
    stakes: Vec<([u8; 32], Delegation)>,
    params: Params,
) {
    let script = stakes
        .iter()
        .enumerate()
        .map(|(i, (validator, delegation))| {
            serde_json::json!({
                "height": i + 1,
                "btc_tip": 500,
                "validators": [hex::encode(validator)],
                "delegations": [{
                    "validator": hex::encode(validator),
                    "delegator": hex::encode([0u8; 32]),
                    "total_sat": delegation.total_sat,
                    "start_height": delegation.start_height,
                    "end_height": delegation.end_height,
                    "covenant_sigs": delegation.covenant_sigs,
                    "unbonded": delegation.unbonded,
                }],
            })
        })
        .collect::<Vec<_>>();
    let blocks: Vec<BlockScript> =
        serde_json::from_value(serde_json::Value::Array(script)).unwrap();

    let report = replay(&blocks, &params).unwrap();
    for height in 1..=blocks.len() as u64 {
        let at_height = report.entries.iter().filter(|r| r.height == height).count();
        prop_assert!(at_height <= params.max_active_validators as usize);
    }
    prop_assert!(report.entries.iter().all(|r| r.voting_power > 0));
    prop_assert_eq!(
        report.activation_height,
        report.entries.first().map(|r| r.height)
    );
}
