use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_badgebot"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn output_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create output directory")
}

fn run(args: &[&str]) -> Output {
    cargo_bin().args(args).output().expect("Failed to execute command")
}

fn assert_pdf(path: &Path) {
    assert!(path.exists(), "PDF file was not created");
    let bytes = fs::read(path).expect("Failed to read PDF");
    assert!(bytes.starts_with(b"%PDF"), "Not a PDF file");
    assert!(bytes.len() > 1000, "PDF file is too small, likely empty or corrupt");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_single_badges() {
    let dir = output_dir();
    let pdf = dir.path().join("single.pdf");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-o", pdf.to_str().unwrap(),
        "--seed", "7",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
    let out = stdout(&output);
    assert!(out.contains("✓ Generated:"));
    assert!(out.contains("Badges: 7"));
    assert!(out.contains("Pages: 7"));
}

#[test]
fn test_sheets_duplicate_every_badge() {
    let dir = output_dir();
    let pdf = dir.path().join("sheets.pdf");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-f", "sheets",
        "-o", pdf.to_str().unwrap(),
        "--seed", "7",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
    let out = stdout(&output);
    assert!(out.contains("Badges: 14"));
    assert!(out.contains("Pages: 3"));
}

#[test]
fn test_screen_with_fixed_palette() {
    let dir = output_dir();
    let pdf = dir.path().join("screen.pdf");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-f", "screen",
        "-p", "taffy",
        "--no-company",
        "-o", pdf.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
}

#[test]
fn test_config_file_palette_and_multiple() {
    let dir = output_dir();
    let pdf = dir.path().join("night.pdf");
    let input = fixture("attendees.csv");
    let config = fixture("night.toml");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-f", "sheets",
        "-c", config.to_str().unwrap(),
        "-o", pdf.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
    assert!(stdout(&output).contains("Badges: 7"));
}

#[test]
fn test_output_directories_are_created() {
    let dir = output_dir();
    let pdf = dir.path().join("nested/deeper/badges.pdf");
    let input = fixture("attendees.csv");

    let output = run(&["-i", input.to_str().unwrap(), "-o", pdf.to_str().unwrap()]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
}

#[test]
fn test_exceptions_json() {
    let dir = output_dir();
    let pdf = dir.path().join("badges.pdf");
    let json = dir.path().join("exceptions.json");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-o", pdf.to_str().unwrap(),
        "--exceptions", json.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).expect("Failed to read report")).unwrap();
    assert_eq!(report["format"], "single");

    let exceptions: Vec<&str> = report["exceptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        exceptions,
        vec![
            "JO LI",
            "JEAN\nPAUL\nDUBOIS",
            "DAVID\nJONATHAN\nROSS",
            "MARIA\nELENA\nCASTELLANOS\nVEGA",
        ]
    );
    assert!(stdout(&output).contains("JEAN / PAUL / DUBOIS"));
}

#[test]
fn test_list_palettes() {
    let output = run(&["--list-palettes"]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    for name in ["cinammon", "watermelon", "juicy", "taffy", "bubblegum", "sherbet", "primary"] {
        assert!(out.lines().any(|l| l == name), "missing palette {}", name);
    }
}

#[test]
fn test_missing_column_fails() {
    let dir = output_dir();
    let pdf = dir.path().join("never.pdf");
    let input = fixture("missing_column.csv");

    let output = run(&["-i", input.to_str().unwrap(), "-o", pdf.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error:"));
    assert!(stderr(&output).contains("Last Name"));
    assert!(!pdf.exists());
}

#[test]
fn test_missing_input_file_fails() {
    let dir = output_dir();
    let pdf = dir.path().join("never.pdf");

    let output = run(&["-i", "tests/fixtures/nope.csv", "-o", pdf.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!pdf.exists());
}

#[test]
fn test_unknown_palette_fails() {
    let dir = output_dir();
    let pdf = dir.path().join("never.pdf");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-p", "plaid",
        "-o", pdf.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("plaid"));
    assert!(!pdf.exists());
}

#[test]
fn test_layer_fonts_from_config() {
    let dir = output_dir();
    let pdf = dir.path().join("fonts.pdf");
    let input = fixture("attendees.csv");
    let config = fixture("fonts.toml");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "-f", "sheets",
        "-c", config.to_str().unwrap(),
        "-o", pdf.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_pdf(&pdf);
    assert!(stdout(&output).contains("Badges: 14"));
}

#[test]
fn test_missing_font_fails() {
    let dir = output_dir();
    let pdf = dir.path().join("never.pdf");
    let input = fixture("attendees.csv");

    let output = run(&[
        "-i", input.to_str().unwrap(),
        "--shine-font", "tests/fixtures/fonts/missing.otf",
        "-o", pdf.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load font"));
    assert!(!pdf.exists());
}
