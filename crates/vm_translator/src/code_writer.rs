//! Translates VM [`Command`]s into Hack symbolic assembly.
//!
//! `eq`/`gt`/`lt` cannot simply compute `x - y` and test its sign: for
//! opposite-sign 16-bit operands that subtraction can overflow and flip the
//! sign of the true result. Each comparison instead branches on the sign of
//! each operand first, only subtracting when both share a sign (see
//! `write_compare`).

use crate::command::{ArithOp, Command, Segment};
use crate::error::TranslateError;

pub struct CodeWriter {
    buf: String,
    current_file: String,
    current_function: String,
    compare_counter: u32,
    call_counter: u32,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            buf: String::new(),
            current_file: String::new(),
            current_function: "Sys.init".to_string(),
            compare_counter: 0,
            call_counter: 0,
        }
    }

    pub fn set_current_file(&mut self, name: &str) {
        self.current_file = name.to_string();
    }

    /// `SP = 256; call Sys.init 0`. Directory-mode translation units only --
    /// see spec §9 on why single-file mode does not bootstrap.
    pub fn write_bootstrap(&mut self) {
        self.write_line("@256");
        self.write_line("D=A");
        self.write_line("@SP");
        self.write_line("M=D");
        self.write_call("Sys.init", 0);
    }

    pub fn write_command(&mut self, cmd: &Command) -> Result<(), TranslateError> {
        match cmd {
            Command::Push(seg, idx) => self.write_push(*seg, *idx),
            Command::Pop(seg, idx) => self.write_pop(*seg, *idx)?,
            Command::Arith(op) => self.write_arith(*op),
            Command::Label(l) => self.write_label(l),
            Command::Goto(l) => self.write_goto(l),
            Command::IfGoto(l) => self.write_if_goto(l),
            Command::Function(name, n) => self.write_function(name, *n),
            Command::Call(name, n) => self.write_call(name, *n),
            Command::Return => self.write_return(),
        }
        Ok(())
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn write_line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn push_d(&mut self) {
        self.write_line("@SP");
        self.write_line("A=M");
        self.write_line("M=D");
        self.write_line("@SP");
        self.write_line("M=M+1");
    }

    fn pop_d(&mut self) {
        self.write_line("@SP");
        self.write_line("M=M-1");
        self.write_line("A=M");
        self.write_line("D=M");
    }

    fn base_register(segment: Segment) -> &'static str {
        match segment {
            Segment::Local => "LCL",
            Segment::Argument => "ARG",
            Segment::This => "THIS",
            Segment::That => "THAT",
            _ => unreachable!("only called for the four pointer-backed segments"),
        }
    }

    fn write_push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.write_line(&format!("@{index}"));
                self.write_line("D=A");
            }
            Segment::Static => {
                self.write_line(&format!("@{}.{}", self.current_file, index));
                self.write_line("D=M");
            }
            Segment::Temp => {
                self.write_line(&format!("@R{}", 5 + index));
                self.write_line("D=M");
            }
            Segment::Pointer => {
                self.write_line(&format!("@R{}", 3 + index));
                self.write_line("D=M");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                self.write_line(&format!("@{}", Self::base_register(segment)));
                self.write_line("D=M");
                self.write_line(&format!("@{index}"));
                self.write_line("A=D+A");
                self.write_line("D=M");
            }
        }
        self.push_d();
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), TranslateError> {
        match segment {
            Segment::Constant => return Err(TranslateError::InvalidPopTarget),
            Segment::Static => {
                self.pop_d();
                self.write_line(&format!("@{}.{}", self.current_file, index));
                self.write_line("M=D");
            }
            Segment::Temp => {
                self.pop_d();
                self.write_line(&format!("@R{}", 5 + index));
                self.write_line("M=D");
            }
            Segment::Pointer => {
                self.pop_d();
                self.write_line(&format!("@R{}", 3 + index));
                self.write_line("M=D");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                self.write_line(&format!("@{}", Self::base_register(segment)));
                self.write_line("D=M");
                self.write_line(&format!("@{index}"));
                self.write_line("D=D+A");
                self.write_line("@R13");
                self.write_line("M=D");
                self.pop_d();
                self.write_line("@R13");
                self.write_line("A=M");
                self.write_line("M=D");
            }
        }
        Ok(())
    }

    fn write_arith(&mut self, op: ArithOp) {
        match op {
            ArithOp::Add => self.write_binary("+"),
            ArithOp::Sub => self.write_binary("-"),
            ArithOp::And => self.write_binary("&"),
            ArithOp::Or => self.write_binary("|"),
            ArithOp::Neg => self.write_unary("-"),
            ArithOp::Not => self.write_unary("!"),
            ArithOp::Eq => self.write_compare("JEQ"),
            ArithOp::Gt => self.write_compare("JGT"),
            ArithOp::Lt => self.write_compare("JLT"),
        }
    }

    fn write_binary(&mut self, op: &str) {
        self.pop_d();
        self.write_line("@SP");
        self.write_line("M=M-1");
        self.write_line("A=M");
        self.write_line(&format!("M=M{op}D"));
        self.write_line("@SP");
        self.write_line("M=M+1");
    }

    fn write_unary(&mut self, op: &str) {
        self.write_line("@SP");
        self.write_line("M=M-1");
        self.write_line("A=M");
        self.write_line(&format!("M={op}M"));
        self.write_line("@SP");
        self.write_line("M=M+1");
    }

    fn write_compare(&mut self, jump: &str) {
        let n = self.compare_counter;
        self.compare_counter += 1;
        let y_neg = format!("COMPARE_Y_NEG{n}");
        let x_neg_y_pos = format!("COMPARE_X_NEG_Y_POS{n}");
        let y_neg_x_pos = format!("COMPARE_Y_NEG_X_POS{n}");
        let check = format!("COMPARE_CHECK{n}");
        let correct = format!("COMPARE_CORRECT{n}");
        let end = format!("COMPARE_END{n}");

        // y in D and stashed in R13.
        self.pop_d();
        self.write_line("@R13");
        self.write_line("M=D");
        self.write_line(&format!("@{y_neg}"));
        self.write_line("D;JLT");

        // y >= 0: pull x into D.
        self.pop_d();
        self.write_line(&format!("@{x_neg_y_pos}"));
        self.write_line("D;JLT");
        // x >= 0 and y >= 0: x - y cannot overflow.
        self.write_line("@R13");
        self.write_line("D=D-M");
        self.write_line(&format!("@{check}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({y_neg})"));
        self.pop_d();
        self.write_line(&format!("@{y_neg_x_pos}"));
        self.write_line("D;JGT");
        // x <= 0 and y < 0: x - y cannot overflow.
        self.write_line("@R13");
        self.write_line("D=D-M");
        self.write_line(&format!("@{check}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({x_neg_y_pos})"));
        self.write_line("D=-1"); // x < 0 <= y, so x < y
        self.write_line(&format!("@{check}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({y_neg_x_pos})"));
        self.write_line("D=1"); // y < 0 < x, so x > y
        self.write_line(&format!("@{check}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({check})"));
        self.write_line(&format!("@{correct}"));
        self.write_line(&format!("D;{jump}"));
        self.write_line("D=0");
        self.write_line(&format!("@{end}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({correct})"));
        self.write_line("D=-1");
        self.write_line(&format!("@{end}"));
        self.write_line("0;JMP");

        self.write_line(&format!("({end})"));
        self.push_d();
    }

    fn write_label(&mut self, label: &str) {
        self.write_line(&format!("({}${})", self.current_function, label));
    }

    fn write_goto(&mut self, label: &str) {
        self.write_line(&format!("@{}${}", self.current_function, label));
        self.write_line("0;JMP");
    }

    fn write_if_goto(&mut self, label: &str) {
        self.pop_d();
        self.write_line(&format!("@{}${}", self.current_function, label));
        self.write_line("D;JNE");
    }

    fn write_function(&mut self, name: &str, n_locals: u16) {
        self.current_function = name.to_string();
        self.write_line(&format!("({name})"));
        for _ in 0..n_locals {
            self.write_line("@SP");
            self.write_line("A=M");
            self.write_line("M=0");
            self.write_line("@SP");
            self.write_line("M=M+1");
        }
    }

    fn write_call(&mut self, name: &str, n_args: u16) {
        let return_label = format!("{name}$ret.{}", self.call_counter);
        self.call_counter += 1;

        self.write_line(&format!("@{return_label}"));
        self.write_line("D=A");
        self.push_d();

        for seg in ["LCL", "ARG", "THIS", "THAT"] {
            self.write_line(&format!("@{seg}"));
            self.write_line("D=M");
            self.push_d();
        }

        self.write_line("@SP");
        self.write_line("D=M");
        self.write_line(&format!("@{}", 5 + n_args));
        self.write_line("D=D-A");
        self.write_line("@ARG");
        self.write_line("M=D");

        self.write_line("@SP");
        self.write_line("D=M");
        self.write_line("@LCL");
        self.write_line("M=D");

        self.write_line(&format!("@{name}"));
        self.write_line("0;JMP");
        self.write_line(&format!("({return_label})"));
    }

    fn write_return(&mut self) {
        self.write_line("@LCL");
        self.write_line("D=M");
        self.write_line("@R14"); // endFrame = LCL
        self.write_line("M=D");

        self.write_line("@5");
        self.write_line("A=D-A");
        self.write_line("D=M"); // retAddr = *(endFrame - 5)
        self.write_line("@R15");
        self.write_line("M=D");

        self.pop_d();
        self.write_line("@ARG");
        self.write_line("A=M");
        self.write_line("M=D"); // *ARG = pop()

        self.write_line("@ARG");
        self.write_line("D=M");
        self.write_line("@SP");
        self.write_line("M=D+1"); // SP = ARG + 1

        for seg in ["THAT", "THIS", "ARG", "LCL"] {
            self.write_line("@R14");
            self.write_line("M=M-1");
            self.write_line("A=M");
            self.write_line("D=M");
            self.write_line(&format!("@{seg}"));
            self.write_line("M=D");
        }

        self.write_line("@R15");
        self.write_line("A=M");
        self.write_line("0;JMP");
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        CodeWriter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ArithOp, Command, Segment};

    fn run(commands: &[Command]) -> String {
        let mut writer = CodeWriter::new();
        writer.set_current_file("Foo");
        for cmd in commands {
            writer.write_command(cmd).unwrap();
        }
        writer.finish()
    }

    #[test]
    fn push_constant_then_add() {
        let asm = run(&[
            Command::Push(Segment::Constant, 2),
            Command::Push(Segment::Constant, 3),
            Command::Arith(ArithOp::Add),
        ]);
        assert!(asm.contains("@2\nD=A\n"));
        assert!(asm.contains("M=M+D\n"));
    }

    #[test]
    fn static_segment_is_namespaced_by_current_file() {
        let asm = run(&[Command::Push(Segment::Static, 3)]);
        assert!(asm.contains("@Foo.3\n"));
    }

    #[test]
    fn pop_constant_is_rejected() {
        let mut writer = CodeWriter::new();
        let err = writer.write_command(&Command::Pop(Segment::Constant, 0)).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidPopTarget));
    }

    #[test]
    fn labels_are_namespaced_by_the_enclosing_function() {
        let asm = run(&[
            Command::Function("Foo.bar".to_string(), 0),
            Command::Label("LOOP".to_string()),
            Command::Goto("LOOP".to_string()),
        ]);
        assert!(asm.contains("(Foo.bar$LOOP)\n"));
        assert!(asm.contains("@Foo.bar$LOOP\n"));
    }

    #[test]
    fn call_uses_a_unique_return_label_per_call_site() {
        let asm = run(&[
            Command::Call("Foo.bar".to_string(), 2),
            Command::Call("Foo.bar".to_string(), 2),
        ]);
        assert!(asm.contains("(Foo.bar$ret.0)\n"));
        assert!(asm.contains("(Foo.bar$ret.1)\n"));
    }

    #[test]
    fn bootstrap_sets_sp_and_calls_sys_init() {
        let mut writer = CodeWriter::new();
        writer.write_bootstrap();
        let asm = writer.finish();
        assert!(asm.starts_with("@256\nD=A\n@SP\nM=D\n"));
        assert!(asm.contains("@Sys.init\n"));
    }
}
