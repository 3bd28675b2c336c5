//! Test runner that compares rewrite output against .expected.go and .expected.err files
//!
//! Each fixture names its interface and file in its own `go:generate` directive.
//!
//! Run with: cargo test --test expected_tests

use mockable::{rewrite, Options, Outcome};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect all Go fixture inputs
fn collect_test_files() -> Vec<PathBuf> {
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|s| s == "go").unwrap_or(false))
        .filter(|e| !e.file_name().to_string_lossy().ends_with(".expected.go"))
    {
        files.push(entry.path().to_path_buf());
    }

    files.sort();
    files
}

fn options_from_directive(source: &str) -> Option<Options> {
    let directive = Regex::new(r"//go:generate mockable -interface=(\S+) -filename=(\S+)").unwrap();
    let caps = directive.captures(source)?;
    Some(Options::new(&caps[1], &caps[2]))
}

fn is_error_test(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "errors")
}

#[test]
fn test_fixtures_exist() {
    let files = collect_test_files();
    assert!(files.len() >= 3, "no fixtures found");
    assert!(files.iter().any(|p| is_error_test(p)));
}

#[test]
fn test_all_expected_output() {
    let mut failures = Vec::new();

    for path in collect_test_files() {
        if is_error_test(&path) {
            continue;
        }

        let expected_go = path.with_extension("expected.go");
        if !expected_go.exists() {
            failures.push(format!("Missing expected file: {}", expected_go.display()));
            continue;
        }

        let source = fs::read_to_string(&path).unwrap();
        let expected = fs::read_to_string(&expected_go).unwrap();
        let Some(options) = options_from_directive(&source) else {
            failures.push(format!("No mockable directive in {}", path.display()));
            continue;
        };

        match rewrite(&source, &options) {
            Ok(Outcome::Rewritten(result)) => {
                if result.code != expected {
                    failures.push(format!(
                        "Output mismatch: {}\n--- expected ---\n{}\n--- actual ---\n{}",
                        path.display(),
                        expected,
                        result.code
                    ));
                }
            }
            Ok(Outcome::AlreadyPresent { .. }) => {
                if source != expected {
                    failures.push(format!(
                        "{} was left alone but its expected file differs from the input",
                        path.display()
                    ));
                }
            }
            Err(e) => {
                failures.push(format!("Rewrite error for {}: {}", path.display(), e));
            }
        }
    }

    if !failures.is_empty() {
        panic!("\n{} test(s) failed:\n\n{}", failures.len(), failures.join("\n\n"));
    }
}

#[test]
fn test_expected_output_is_a_fixed_point() {
    for path in collect_test_files() {
        if is_error_test(&path) {
            continue;
        }
        let source = fs::read_to_string(&path).unwrap();
        let options = options_from_directive(&source).unwrap();
        let expected = fs::read_to_string(path.with_extension("expected.go")).unwrap();

        let again = rewrite(&expected, &options).unwrap();
        assert!(
            matches!(again, Outcome::AlreadyPresent { .. }),
            "second run on {} did not stop",
            path.display()
        );
    }
}

#[test]
fn test_all_expected_errors() {
    let mut failures = Vec::new();

    for path in collect_test_files() {
        if !is_error_test(&path) {
            continue;
        }

        let expected_err = path.with_extension("expected.err");
        let source = fs::read_to_string(&path).unwrap();
        let expected = fs::read_to_string(&expected_err).unwrap_or_default();
        let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
        let options = options_from_directive(&source).unwrap();

        match rewrite(&source, &options) {
            Ok(_) => failures.push(format!("{} rewrote without an error", path.display())),
            Err(e) => {
                let rendered = e.render(&source, filename);
                if rendered != expected {
                    failures.push(format!(
                        "Error mismatch: {}\n--- expected ---\n{}\n--- actual ---\n{}",
                        path.display(),
                        expected,
                        rendered
                    ));
                }
            }
        }
    }

    if !failures.is_empty() {
        panic!("\n{} test(s) failed:\n\n{}", failures.len(), failures.join("\n\n"));
    }
}
