//! End-to-end tests compiling small complete classes and a small project
//! directory, checking the shape of the generated VM code.

use std::fs;
use tempfile::tempdir;

#[test]
fn compiles_a_class_with_a_method_and_a_function() {
    let src = "\
        class Point {\n\
            field int x, y;\n\
            constructor Point new(int ax, int ay) {\n\
                let x = ax;\n\
                let y = ay;\n\
                return this;\n\
            }\n\
            method int getX() {\n\
                return x;\n\
            }\n\
            function int distance(Point a, Point b) {\n\
                return 0;\n\
            }\n\
        }";
    let vm = jackc::compile_source(src).unwrap();

    assert!(vm.contains("function Point.new 0"));
    assert!(vm.contains("call Memory.alloc 1"));
    assert!(vm.contains("function Point.getX 0"));
    // a method's implicit `this` occupies argument 0
    assert!(vm.contains("push argument 0\npop pointer 0"));
    assert!(vm.contains("function Point.distance 0"));
}

#[test]
fn compiles_every_jack_file_in_a_directory() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("Main.jack"),
        "class Main { function void main() { do Output.println(); return; } }",
    )
    .unwrap();
    fs::write(
        dir.path().join("Helper.jack"),
        "class Helper { function int id(int n) { return n; } }",
    )
    .unwrap();

    let inputs = n2t_support::discover_inputs(dir.path(), "jack").unwrap();
    assert_eq!(inputs.len(), 2);

    for path in &inputs {
        let vm = jackc::compile_file(path).unwrap();
        let out = n2t_support::sibling_with_extension(path, "vm");
        fs::write(&out, vm).unwrap();
        assert!(out.exists());
    }
}

#[test]
fn reports_a_parse_error_with_a_line_number() {
    let err = jackc::compile_source("class Main { function void main( }").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line"));
}
