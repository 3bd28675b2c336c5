//! File discovery and in-place writing against a scratch package directory

use mockable::discovery::locate;
use mockable::{rewrite, MockableError, Options, Outcome, RewriteDriver};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CALC: &str = "package calc\n\n//go:generate mockable -interface=Calculator -filename=calc.go\n\nfunc Add(a, b int) int { return a + b }\n";

fn package(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_locates_the_named_file() {
    let dir = package(&[("calc.go", CALC), ("util.go", "package calc\n\nfunc helper() {}\n")]);
    let target = locate(dir.path(), "calc.go").unwrap();
    assert_eq!(target.path, dir.path().join("calc.go"));
    assert_eq!(target.package, "calc");
    assert_eq!(target.source, CALC);
    assert_eq!(target.file_name(), "calc.go");
}

#[test]
fn test_missing_file() {
    let dir = package(&[("util.go", "package calc\n")]);
    let err = locate(dir.path(), "calc.go").unwrap_err();
    assert!(matches!(err, MockableError::FileNotFound { ref name, .. } if name == "calc.go"));
}

#[test]
fn test_multiple_packages() {
    let dir = package(&[("calc.go", CALC), ("other.go", "package other\n")]);
    let err = locate(dir.path(), "calc.go").unwrap_err();
    match err {
        MockableError::MultiplePackages { packages } => assert_eq!(packages, vec!["calc", "other"]),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_test_and_ignored_files_are_not_part_of_the_package() {
    let dir = package(&[
        ("calc.go", CALC),
        ("calc_test.go", "package calc_test\n"),
        ("gen.go", "//go:build ignore\n\npackage main\n"),
        ("notes.txt", "package nonsense\n"),
    ]);
    let target = locate(dir.path(), "calc.go").unwrap();
    assert_eq!(target.package, "calc");
}

#[test]
fn test_subdirectories_are_not_scanned() {
    let dir = package(&[("calc.go", CALC)]);
    fs::create_dir(dir.path().join("internal")).unwrap();
    fs::write(dir.path().join("internal").join("x.go"), "package internal\n").unwrap();
    assert!(locate(dir.path(), "calc.go").is_ok());
    assert!(locate(dir.path(), "x.go").is_err());
}

#[test]
fn test_write_replaces_the_file_without_leftovers() {
    let dir = package(&[("calc.go", CALC)]);
    let target = locate(dir.path(), "calc.go").unwrap();
    let Outcome::Rewritten(result) =
        rewrite(&target.source, &Options::new("Calculator", "calc.go")).unwrap()
    else {
        panic!("expected a rewrite");
    };

    target.write(&result.code).unwrap();

    let written = fs::read_to_string(dir.path().join("calc.go")).unwrap();
    assert_eq!(written, result.code);
    assert_eq!(entries(dir.path()), vec!["calc.go"]);

    // The rewritten file is now left alone
    let again = locate(dir.path(), "calc.go").unwrap();
    let outcome = rewrite(&again.source, &Options::new("Calculator", "calc.go")).unwrap();
    assert!(matches!(outcome, Outcome::AlreadyPresent { .. }));
}

#[test]
fn test_existing_interface_leaves_the_file_untouched() {
    let source = "package calc\n\n//go:generate mockable -interface=Calculator -filename=calc.go\n\ntype Calculator interface {\n\tAdd(a, b int) int\n}\n\nfunc Add(a, b int) int { return a + b }\n";
    let dir = package(&[("calc.go", source)]);
    let path = dir.path().join("calc.go");
    let before = fs::read(&path).unwrap();
    let modified = fs::metadata(&path).unwrap().modified().unwrap();

    let options = Options::new("Calculator", "calc.go");
    let target = locate(dir.path(), "calc.go").unwrap();
    let outcome = RewriteDriver::new(&options).unwrap().run(&target.source).unwrap();
    assert!(matches!(outcome, Outcome::AlreadyPresent { .. }));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    assert_eq!(entries(dir.path()), vec!["calc.go"]);
}

#[cfg(unix)]
#[test]
fn test_write_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = package(&[("calc.go", CALC)]);
    let path = dir.path().join("calc.go");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    let target = locate(dir.path(), "calc.go").unwrap();
    target.write("package calc\n").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
