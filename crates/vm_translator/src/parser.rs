//! Parses VM text into a stream of [`Command`]s.
//!
//! One pass: strip `//` comments and blank lines, then tokenize each
//! remaining line by whitespace. There is no multi-line state -- every VM
//! command fits on one line.

use crate::command::{ArithOp, Command, Segment};
use crate::error::ParseError;

pub fn parse(source: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let code = match raw_line.find("//") {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        commands.push(parse_command(code, line_no)?);
    }
    Ok(commands)
}

fn parse_command(line: &str, line_no: usize) -> Result<Command, ParseError> {
    let mut parts = line.split_whitespace();
    let op = parts.next().expect("line is non-empty after trim");

    if let Some(arith) = ArithOp::parse(op) {
        return Ok(Command::Arith(arith));
    }

    match op {
        "push" | "pop" => {
            let segment_text = parts
                .next()
                .ok_or_else(|| ParseError::MissingArgument { line: line_no, text: line.to_string() })?;
            let index_text = parts
                .next()
                .ok_or_else(|| ParseError::MissingArgument { line: line_no, text: line.to_string() })?;
            let segment = Segment::parse(segment_text).ok_or_else(|| ParseError::UnknownSegment {
                line: line_no,
                text: segment_text.to_string(),
            })?;
            let index = parse_index(index_text, line_no)?;
            Ok(if op == "push" { Command::Push(segment, index) } else { Command::Pop(segment, index) })
        }
        "label" => Ok(Command::Label(expect_name(&mut parts, line, line_no)?)),
        "goto" => Ok(Command::Goto(expect_name(&mut parts, line, line_no)?)),
        "if-goto" => Ok(Command::IfGoto(expect_name(&mut parts, line, line_no)?)),
        "function" => {
            let name = expect_name(&mut parts, line, line_no)?;
            let n_locals = parts
                .next()
                .ok_or_else(|| ParseError::MissingArgument { line: line_no, text: line.to_string() })?;
            Ok(Command::Function(name, parse_index(n_locals, line_no)?))
        }
        "call" => {
            let name = expect_name(&mut parts, line, line_no)?;
            let n_args = parts
                .next()
                .ok_or_else(|| ParseError::MissingArgument { line: line_no, text: line.to_string() })?;
            Ok(Command::Call(name, parse_index(n_args, line_no)?))
        }
        "return" => Ok(Command::Return),
        other => Err(ParseError::UnknownCommand { line: line_no, text: other.to_string() }),
    }
}

fn expect_name(
    parts: &mut std::str::SplitWhitespace<'_>,
    line: &str,
    line_no: usize,
) -> Result<String, ParseError> {
    parts
        .next()
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingArgument { line: line_no, text: line.to_string() })
}

fn parse_index(text: &str, line_no: usize) -> Result<u16, ParseError> {
    text.parse()
        .map_err(|_| ParseError::MalformedIndex { line: line_no, text: text.to_string() })
}
