//! Translator from Hack VM code to Hack symbolic assembly.

pub mod code_writer;
pub mod command;
pub mod error;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

pub use code_writer::CodeWriter;
pub use command::{ArithOp, Command, Segment};
pub use error::{ParseError, TranslateError};

fn basename_without_extension(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

fn translate_into(writer: &mut CodeWriter, path: &Path) -> Result<(), TranslateError> {
    writer.set_current_file(&basename_without_extension(path));
    let source = fs::read_to_string(path)?;
    for command in parser::parse(&source)? {
        writer.write_command(&command)?;
    }
    Ok(())
}

/// Translate a single `.vm` file. No bootstrap is emitted -- see spec §9 on
/// why single-file mode and directory mode diverge here.
pub fn translate_file(path: &Path) -> Result<String, TranslateError> {
    let mut writer = CodeWriter::new();
    translate_into(&mut writer, path)?;
    Ok(writer.finish())
}

/// Translate every `.vm` file in `paths` into one assembly unit, prefixed
/// with the bootstrap sequence (`SP = 256; call Sys.init 0`).
pub fn translate_directory(paths: &[PathBuf]) -> Result<String, TranslateError> {
    let mut writer = CodeWriter::new();
    writer.write_bootstrap();
    for path in paths {
        translate_into(&mut writer, path)?;
    }
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn single_file_translation_has_no_bootstrap() {
        let mut file = Builder::new().suffix(".vm").tempfile().unwrap();
        writeln!(file, "function Main.main 0\npush constant 0\nreturn").unwrap();
        let asm = translate_file(file.path()).unwrap();
        assert!(!asm.contains("@256"));
        assert!(asm.contains("(Main.main)"));
    }
}
