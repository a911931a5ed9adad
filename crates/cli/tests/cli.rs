use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn islevo() -> Command {
    Command::cargo_bin("islevo").unwrap()
}

fn small_config(path: &Path) {
    let json = r#"{
        "execution": { "subpopulation_size": 6, "seed": 7 },
        "topology": { "kind": "ring", "islands": 3 },
        "islands": [{
            "objective": "sphere",
            "dimension": 3,
            "lower": -2.0,
            "upper": 2.0,
            "mutation_sigma": 0.2,
            "mutation_rate": 0.5,
            "selection": { "kind": "tournament", "size": 2 },
            "elitism": 1
        }],
        "migration": { "kind": "neighbor", "interval": 2 },
        "stopping": { "kind": "fixed_steps", "steps": 4 }
    }"#;
    fs::write(path, json).unwrap();
}

#[test]
fn test_init_writes_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("islevo.json");

    islevo()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"subpopulation_size\": 50"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("islevo.json");
    fs::write(&path, "{}").unwrap();

    islevo()
        .arg("init")
        .arg("-o")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_validate_accepts_default_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("islevo.json");
    islevo().arg("init").arg("-o").arg(&path).assert().success();

    islevo()
        .arg("validate")
        .arg("-c")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_rejects_island_count_mismatch() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("bad.json");
    small_config(&path);
    let json = fs::read_to_string(&path).unwrap();
    // Two explicit islands for a three-island ring
    let island = r#"{"objective":"sphere","dimension":3,"lower":-2.0,"upper":2.0,"mutation_sigma":0.2,"mutation_rate":0.5,"selection":{"kind":"random"}}"#;
    let start = json.find("\"islands\": [").unwrap();
    let end = json[start..].find(']').unwrap() + start + 1;
    let patched = format!("{}\"islands\": [{island},{island}]{}", &json[..start], &json[end..]);
    fs::write(&path, patched).unwrap();

    islevo()
        .arg("validate")
        .arg("-c")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("topology has 3 islands"));
}

#[test]
fn test_validate_missing_file() {
    let temp = tempdir().unwrap();
    islevo()
        .arg("validate")
        .arg("-c")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read configuration"));
}

#[test]
fn test_run_prints_results_and_summary() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("islevo.json");
    let summary = temp.path().join("summary.json");
    let log = temp.path().join("migration.csv");
    small_config(&config);

    islevo()
        .arg("run")
        .arg("-c")
        .arg(&config)
        .arg("--runs")
        .arg("2")
        .arg("--migration-log")
        .arg(&log)
        .arg("--output")
        .arg(&summary)
        .arg("-t")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run 0: 4 generations"))
        .stdout(predicate::str::contains("Run 1: 4 generations"))
        .stdout(predicate::str::contains("island 2: best"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    let runs = json.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["generations"], 4);
    assert_eq!(runs[0]["migration_rounds"], 2);

    let log = fs::read_to_string(&log).unwrap();
    // Header plus 3 events per round, 2 rounds per run, 2 runs
    assert_eq!(log.lines().count(), 1 + 3 * 2 * 2);
    let runs: std::collections::BTreeSet<&str> = log
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(runs, std::collections::BTreeSet::from(["0", "1"]));
}

#[test]
fn test_run_is_reproducible_with_seed() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("islevo.json");
    small_config(&config);

    let first = islevo()
        .args(["run", "-c"])
        .arg(&config)
        .args(["--seed", "11", "-t", "1"])
        .output()
        .unwrap();
    let second = islevo()
        .args(["run", "-c"])
        .arg(&config)
        .args(["--seed", "11", "-t", "3"])
        .output()
        .unwrap();
    assert!(first.status.success());

    let best = |stdout: &[u8]| -> Vec<String> {
        String::from_utf8_lossy(stdout)
            .lines()
            .filter(|line| line.contains("best"))
            .map(str::to_owned)
            .collect()
    };
    assert_eq!(best(&first.stdout), best(&second.stdout));
}
