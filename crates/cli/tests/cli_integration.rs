// End-to-end runs of the occgraph binary over generated workbooks.
//
// Run with: cargo test -p occgraph-cli --test cli_integration -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;

fn occgraph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_occgraph"))
}

fn run(args: &[&str]) -> Output {
    occgraph().args(args).output().expect("occgraph runs")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Source workbook, reference workbook (inside the input folder), mapping
/// CSV and config, laid out under `dir`.
fn fixture(dir: &Path, extra_config: &str) -> PathBuf {
    let input = dir.join("input");
    std::fs::create_dir_all(&input).unwrap();

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet().set_name("Tabelle1").unwrap();
    for (col, h) in ["Berufs", "Fach", "Jahr"].iter().enumerate() {
        ws.write_string(0, col as u16, *h).unwrap();
    }
    let rows: [(&str, &str, f64); 5] = [
        ("Tischlerin", "", 1880.0),
        ("Dreher", "Holz", 1880.0),
        ("Dreher", "Metall", 1881.0),
        ("Kutscher", "", 1880.0),
        ("nan", "", 1880.0),
    ];
    for (i, (label, fach, jahr)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        ws.write_string(r, 0, *label).unwrap();
        if !fach.is_empty() {
            ws.write_string(r, 1, *fach).unwrap();
        }
        ws.write_number(r, 2, *jahr).unwrap();
    }
    let ws = wb.add_worksheet().set_name("Notizen").unwrap();
    ws.write_string(0, 0, "Text").unwrap();
    ws.write_string(1, 0, "Zaehlung unvollstaendig").unwrap();
    wb.save(input.join("gewerbe_1880.xlsx")).unwrap();

    let mut gdr = Workbook::new();
    let ws = gdr.add_worksheet().set_name("GDR").unwrap();
    ws.write_string(0, 0, "Berufs").unwrap();
    ws.write_string(0, 1, "Code").unwrap();
    for (i, (label, code)) in [("Tischler", 1110.0), ("Dreher", 2210.0), ("Elektriker", 3110.0)]
        .iter()
        .enumerate()
    {
        ws.write_string(i as u32 + 1, 0, *label).unwrap();
        ws.write_number(i as u32 + 1, 1, *code).unwrap();
    }
    gdr.save(input.join("GDR.xlsx")).unwrap();

    std::fs::write(
        dir.join("kldb.csv"),
        "Beruf;KldB\nDreher;Zerspanungsmechaniker / Drehtechniker\n",
    )
    .unwrap();

    let config = dir.join("occgraph.toml");
    std::fs::write(
        &config,
        format!(
            r#"
name = "gewerbe"

[paths]
input_folder = "input"
reference_file = "input/GDR.xlsx"
mapper_output = "comparison"
ontology_output = "graph"

[columns]
reference_code = "Code"
specialization = "Fach"

[mapping]
file = "kldb.csv"
source_column = "Beruf"
target_column = "KldB"
{extra_config}
"#
        ),
    )
    .unwrap();
    config
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_writes_comparison_graph_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");

    let output = run(&["run", config.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON value");
    assert_eq!(summary["meta"]["config_name"], "gewerbe");
    assert_eq!(summary["meta"]["threshold"], 85.0);
    assert_eq!(summary["meta"]["reference_labels"], 3);
    assert_eq!(summary["totals"]["matched"], 3);
    assert_eq!(summary["totals"]["unmatched"], 1);
    assert_eq!(summary["totals"]["dropped"], 1);
    let sources = summary["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1, "reference workbook is not a source");
    assert_eq!(sources[0]["source"], "gewerbe_1880.xlsx");
    assert_eq!(sources[0]["skipped_sheets"][0]["sheet"], "Notizen");
    assert_eq!(summary["graphs"][0]["entities"], 4);

    assert!(dir.path().join("comparison/comparison_gewerbe_1880_vs_GDR.xlsx").is_file());

    let ttl = std::fs::read_to_string(dir.path().join("graph/gewerbe_1880.ttl")).unwrap();
    assert!(ttl.starts_with("@prefix glmo: <http://example.com/glmo/> ."));
    assert!(ttl.contains("skos:closeMatch"));
    assert!(ttl.contains("skos:related kldb:modern-"));
    assert!(ttl.contains("\"Zerspanungsmechaniker\""));
    assert!(ttl.contains("skos:notation \"2210\""));
    assert!(ttl.contains("glmop:Jahr \"1880\""));
}

#[test]
fn run_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    let ttl = dir.path().join("graph/gewerbe_1880.ttl");

    assert!(run(&["run", config.to_str().unwrap()]).status.success());
    let first = std::fs::read(&ttl).unwrap();
    assert!(run(&["run", config.to_str().unwrap()]).status.success());
    assert_eq!(first, std::fs::read(&ttl).unwrap());
}

#[test]
fn combined_ntriples_partition() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");

    let output = run(&[
        "run",
        config.to_str().unwrap(),
        "--partition",
        "combined",
        "--format",
        "n-triples",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let nt = std::fs::read_to_string(dir.path().join("graph/occupations.nt")).unwrap();
    assert!(nt.lines().all(|l| l.starts_with('<') && l.ends_with(" .")));
    assert!(!dir.path().join("graph/gewerbe_1880.ttl").exists());
}

#[test]
fn fail_on_unmatched_exits_62() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    let summary = dir.path().join("run.json");

    let output = run(&[
        "run",
        config.to_str().unwrap(),
        "--fail-on-unmatched",
        "--summary",
        summary.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("1 records left unmatched"));
    assert!(summary.is_file(), "summary is written before the exit");
}

#[test]
fn low_threshold_matches_everything() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");

    let output = run(&["run", config.to_str().unwrap(), "--threshold", "0", "--fail-on-unmatched"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

// ===========================================================================
// map + graph
// ===========================================================================

#[test]
fn graph_stage_reproduces_run_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    let ttl = dir.path().join("graph/gewerbe_1880.ttl");

    assert!(run(&["run", config.to_str().unwrap()]).status.success());
    let from_run = std::fs::read_to_string(&ttl).unwrap();
    std::fs::remove_dir_all(dir.path().join("graph")).unwrap();

    let output = run(&["graph", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(from_run, std::fs::read_to_string(&ttl).unwrap());
}

#[test]
fn map_writes_no_graph() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");

    let output = run(&["map", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("comparison/comparison_gewerbe_1880_vs_GDR.xlsx").is_file());
    assert!(!dir.path().join("graph").exists());
}

#[test]
fn graph_without_comparisons_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    std::fs::create_dir_all(dir.path().join("comparison")).unwrap();

    let output = run(&["graph", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("occgraph map"));
}

// ===========================================================================
// reference / validate
// ===========================================================================

#[test]
fn reference_prints_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");

    let output = run(&["reference", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 unique labels in 'Berufs'"));
    assert!(stdout.contains("3 unique codes"));
    assert!(stdout.contains("  2210: Dreher"));
}

#[test]
fn validate_accepts_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    let output = run(&["validate", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("gewerbe: ok"));
}

#[test]
fn invalid_threshold_in_config_exits_60() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "[matching]\nthreshold = 150\n");
    let output = run(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("threshold"));
}

#[test]
fn unknown_key_exits_60() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "[matching]\ncutoff = 80\n");
    let output = run(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn out_of_range_threshold_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    let output = run(&["run", config.to_str().unwrap(), "--threshold", "150"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_reference_is_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path(), "");
    std::fs::remove_file(dir.path().join("input/GDR.xlsx")).unwrap();
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(61));
}
