//! Binary to generate/update .expected.go and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- mixed   # Update only fixtures matching "mixed"

use mockable::{rewrite, Options, Outcome};
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let directive = Regex::new(r"//go:generate mockable -interface=(\S+) -filename=(\S+)").unwrap();

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|s| s == "go").unwrap_or(false))
        .filter(|e| !e.file_name().to_string_lossy().ends_with(".expected.go"))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        // Apply filter if provided
        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path, &directive);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path, directive: &Regex) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let Some(caps) = directive.captures(&source) else {
        eprintln!("ERROR: {:?} has no mockable directive", path);
        return;
    };
    let options = Options::new(&caps[1], &caps[2]);
    let is_error_test = path.components().any(|c| c.as_os_str() == "errors");

    match rewrite(&source, &options) {
        Ok(outcome) => {
            let code = match outcome {
                Outcome::Rewritten(result) => result.code,
                Outcome::AlreadyPresent { .. } => source.clone(),
            };
            let expected_go = path.with_extension("expected.go");
            if let Err(e) = fs::write(&expected_go, &code) {
                eprintln!("Failed to write {:?}: {}", expected_go, e);
            } else {
                println!("  wrote {}", expected_go.display());
            }

            // Remove any stale .expected.err if this now rewrites
            let expected_err = path.with_extension("expected.err");
            if expected_err.exists() {
                let _ = fs::remove_file(&expected_err);
            }
        }
        Err(e) => {
            if is_error_test {
                let expected_err = path.with_extension("expected.err");
                let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
                if let Err(err) = fs::write(&expected_err, e.render(&source, filename)) {
                    eprintln!("Failed to write {:?}: {}", expected_err, err);
                } else {
                    println!("  wrote {}", expected_err.display());
                }
            } else {
                eprintln!("ERROR: {:?} failed to rewrite but is not in errors/: {}", path, e);
            }
        }
    }
}
