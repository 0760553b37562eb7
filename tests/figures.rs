use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs

#[test]
fn three_images_without_max_flow_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let fig_dir = dir.path().join("figures");

    let mut cmd = Command::cargo_bin("benchviz")?;
    cmd.arg("figures")
        .arg("tests/test_files/master_small.csv")
        .arg("--results-dir")
        .arg(dir.path())
        .arg("--figures-dir")
        .arg(&fig_dir);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("3 figure(s) saved"));

    assert!(fig_dir.join("runtime_vs_nodes.png").exists());
    assert!(fig_dir.join("runtime_vs_density.png").exists());
    assert!(fig_dir.join("memory_vs_runtime.png").exists());
    assert!(!fig_dir.join("maxflow_flow_vs_runtime.png").exists());
    Ok(())
}

#[test]
fn four_images_with_enrichable_max_flow_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let fig_dir = dir.path().join("figures");

    let mut cmd = Command::cargo_bin("benchviz")?;
    cmd.arg("figures")
        .arg("tests/test_files/master_maxflow.csv")
        .arg("--results-dir")
        .arg("tests/test_files/results")
        .arg("--figures-dir")
        .arg(&fig_dir);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("4 figure(s) saved"));

    assert!(fig_dir.join("maxflow_flow_vs_runtime.png").exists());
    Ok(())
}

#[test]
fn chart_selection_limits_the_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let fig_dir = dir.path().join("figures");

    let mut cmd = Command::cargo_bin("benchviz")?;
    cmd.arg("figures")
        .arg("tests/test_files/master_small.csv")
        .arg("--results-dir")
        .arg(dir.path())
        .arg("--figures-dir")
        .arg(&fig_dir)
        .arg("--charts")
        .arg("memory-vs-runtime");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 figure(s) saved"));

    assert!(fig_dir.join("memory_vs_runtime.png").exists());
    assert!(!fig_dir.join("runtime_vs_nodes.png").exists());
    Ok(())
}

#[test]
fn missing_master_csv_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("benchviz")?;

    cmd.arg("figures").arg("tests/test_files/does_not_exist.csv");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("master CSV not found"));
    Ok(())
}
