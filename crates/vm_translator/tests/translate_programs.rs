//! End-to-end tests translating small VM programs, covering the
//! directory-vs-single-file bootstrap distinction and cross-file statics.

use std::fs;
use tempfile::tempdir;

#[test]
fn single_file_mode_never_bootstraps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Main.vm");
    fs::write(&path, "function Main.main 0\npush constant 42\nreturn\n").unwrap();

    let asm = vmc::translate_file(&path).unwrap();
    assert!(!asm.contains("@Sys.init"));
    assert!(asm.contains("(Main.main)"));
}

#[test]
fn directory_mode_bootstraps_and_namespaces_statics_per_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("Sys.vm"),
        "function Sys.init 0\ncall Main.run 0\npop temp 0\nreturn\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Main.vm"),
        "function Main.run 0\npush constant 1\npop static 0\npush constant 2\npop static 0\nreturn\n",
    )
    .unwrap();

    let inputs = n2t_support::discover_inputs(dir.path(), "vm").unwrap();
    let asm = vmc::translate_directory(&inputs).unwrap();

    assert!(asm.starts_with("@256\nD=A\n@SP\nM=D\n"));
    assert!(asm.contains("@Sys.init"));
    assert!(asm.contains("@Main.0"));
}

#[test]
fn comparison_on_boundary_values_does_not_overflow() {
    // (32767 > -32768) must be true; a naive x - y would overflow and flip
    // the sign of the comparison.
    let vm = "push constant 32767\npush constant 32767\nsub\npush constant 1\nadd\n\
              push constant 32767\ngt\n";
    let path_dir = tempdir().unwrap();
    let path = path_dir.path().join("t.vm");
    fs::write(&path, vm).unwrap();
    let asm = vmc::translate_file(&path).unwrap();
    // the overflow-safe comparison path must appear, not a bare subtraction
    assert!(asm.contains("COMPARE_X_NEG_Y_POS0"));
    assert!(asm.contains("COMPARE_Y_NEG_X_POS0"));
}

#[test]
fn unknown_command_surfaces_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.vm");
    fs::write(&path, "frobnicate\n").unwrap();
    let err = vmc::translate_file(&path).unwrap_err();
    assert!(matches!(err, vmc::TranslateError::Parse(_)));
}
