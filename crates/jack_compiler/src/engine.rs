//! Recursive-descent compilation engine: Jack source to VM text, with no
//! intermediate AST. Parsing and code generation are interleaved one
//! production at a time, following the grammar directly (see spec §4.3).

use crate::error::{CompileError, ParseError, SemanticError};
use crate::symbol_table::{Kind, SymbolInfo, SymbolTable};
use crate::token::{Keyword, Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::vm_writer::{ArithCommand, Segment, VmWriter};

/// Compile one Jack class's source text into VM text.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let mut tokenizer = Tokenizer::new(source)?;
    let lookahead = tokenizer.advance().cloned();
    let mut engine = CompilationEngine {
        tokenizer,
        lookahead,
        symbols: SymbolTable::new(),
        class_name: String::new(),
        writer: VmWriter::new(),
        if_count: 0,
        while_count: 0,
    };
    engine.compile_class()?;
    Ok(engine.writer.finish())
}

struct CompilationEngine {
    tokenizer: Tokenizer,
    lookahead: Option<Token>,
    symbols: SymbolTable,
    class_name: String,
    writer: VmWriter,
    if_count: u32,
    while_count: u32,
}

fn segment_for(kind: Kind) -> Segment {
    match kind {
        Kind::Static => Segment::Static,
        Kind::Field => Segment::This,
        Kind::Arg => Segment::Argument,
        Kind::Local => Segment::Local,
    }
}

impl CompilationEngine {
    // -- token-stream plumbing -------------------------------------------

    fn cur(&self) -> Result<&Token, ParseError> {
        self.lookahead.as_ref().ok_or_else(|| ParseError::eof("more input"))
    }

    /// Consume the current token, advancing the lookahead by one.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let tok = self.lookahead.take().ok_or_else(|| ParseError::eof("more input"))?;
        self.lookahead = self.tokenizer.advance().cloned();
        Ok(tok)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokenizer.peek_next()
    }

    fn cur_is_symbol(&self, c: char) -> bool {
        self.lookahead.as_ref().and_then(|t| t.symbol()) == Some(c)
    }

    fn cur_is_keyword(&self, kw: Keyword) -> bool {
        self.lookahead.as_ref().and_then(|t| t.keyword()) == Some(kw)
    }

    fn cur_is_class_var_kind(&self) -> bool {
        self.lookahead
            .as_ref()
            .and_then(|t| t.keyword())
            .map_or(false, |k| k.is_class_var_kind())
    }

    fn cur_is_subroutine_kind(&self) -> bool {
        self.lookahead
            .as_ref()
            .and_then(|t| t.keyword())
            .map_or(false, |k| k.is_subroutine_kind())
    }

    fn expect_symbol(&mut self, c: char) -> Result<(), CompileError> {
        let tok = self.cur()?.clone();
        if tok.symbol() != Some(c) {
            return Err(ParseError::unexpected(&tok, format!("'{c}'")).into());
        }
        self.bump()?;
        Ok(())
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), CompileError> {
        let tok = self.cur()?.clone();
        if tok.keyword() != Some(kw) {
            return Err(ParseError::unexpected(&tok, format!("'{kw}'")).into());
        }
        self.bump()?;
        Ok(())
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        let tok = self.cur()?.clone();
        let name = tok
            .identifier()
            .ok_or_else(|| ParseError::unexpected(&tok, "an identifier"))?
            .to_string();
        self.bump()?;
        Ok(name)
    }

    /// A primitive type keyword or a class-name identifier.
    fn expect_type(&mut self) -> Result<String, CompileError> {
        let tok = self.cur()?.clone();
        if let Some(kw) = tok.keyword() {
            if kw.is_primitive_type() {
                self.bump()?;
                return Ok(kw.as_str().to_string());
            }
        }
        self.expect_identifier()
    }

    fn expect_return_type(&mut self) -> Result<String, CompileError> {
        if self.cur_is_keyword(Keyword::Void) {
            self.bump()?;
            return Ok("void".to_string());
        }
        self.expect_type()
    }

    fn lookup_required(&self, name: &str) -> Result<SymbolInfo, CompileError> {
        self.symbols.lookup(name).cloned().ok_or_else(|| {
            let line = self.lookahead.as_ref().map(|t| t.line).unwrap_or(0);
            SemanticError::UndeclaredIdentifier { line, name: name.to_string() }.into()
        })
    }

    // -- class-level productions ------------------------------------------

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while self.cur_is_class_var_kind() {
            self.compile_class_var_dec()?;
        }
        while self.cur_is_subroutine_kind() {
            self.compile_subroutine_dec()?;
        }
        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = match self.cur()?.keyword() {
            Some(Keyword::Static) => Kind::Static,
            Some(Keyword::Field) => Kind::Field,
            _ => unreachable!("caller checked cur_is_class_var_kind"),
        };
        self.bump()?;
        let type_name = self.expect_type()?;

        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, kind);
        while self.cur_is_symbol(',') {
            self.bump()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, kind);
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    fn compile_subroutine_dec(&mut self) -> Result<(), CompileError> {
        self.symbols.start_subroutine();
        let subroutine_kind = match self.cur()?.keyword() {
            Some(kw) => kw,
            None => unreachable!("caller checked cur_is_subroutine_kind"),
        };
        self.bump()?;
        self.expect_return_type()?;
        let name = self.expect_identifier()?;

        if subroutine_kind == Keyword::Method {
            let class_name = self.class_name.clone();
            self.symbols.define("this", &class_name, Kind::Arg);
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        let subroutine_path = format!("{}.{}", self.class_name, name);
        self.compile_subroutine_body(&subroutine_path, subroutine_kind)
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.cur_is_symbol(')') {
            return Ok(());
        }
        let type_name = self.expect_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, Kind::Arg);
        while self.cur_is_symbol(',') {
            self.bump()?;
            let type_name = self.expect_type()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Arg);
        }
        Ok(())
    }

    fn compile_subroutine_body(
        &mut self,
        subroutine_name: &str,
        subroutine_kind: Keyword,
    ) -> Result<(), CompileError> {
        self.expect_symbol('{')?;
        while self.cur_is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let n_locals = self.symbols.var_count(Kind::Local);
        self.writer.write_function(subroutine_name, n_locals);

        match subroutine_kind {
            Keyword::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            Keyword::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            Keyword::Function => {}
            _ => unreachable!("subroutine_kind is always one of the three above"),
        }

        self.compile_statements()?;
        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let type_name = self.expect_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &type_name, Kind::Local);
        while self.cur_is_symbol(',') {
            self.bump()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Local);
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    // -- statements --------------------------------------------------------

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            let kw = self.lookahead.as_ref().and_then(|t| t.keyword());
            match kw {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        // every subroutine call leaves a value on the stack; `do` discards it.
        self.writer.write_pop(Segment::Temp, 0);
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let info = self.lookup_required(&name)?;
        let mut segment = segment_for(info.kind);
        let mut index = info.index;

        let is_array = self.cur_is_symbol('[');
        if is_array {
            self.writer.write_push(segment, index);
            self.expect_symbol('[')?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(ArithCommand::Add);
        }

        self.expect_symbol('=')?;
        self.compile_expression()?;

        if is_array {
            // stash the rvalue, point THAT at the target cell, restore it
            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            segment = Segment::That;
            index = 0;
        }
        self.writer.write_pop(segment, index);
        self.expect_symbol(';')?;
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;
        let false_label = self.next_if_label();
        let end_label = self.next_if_label();

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithCommand::Not);
        self.writer.write_if_goto(&false_label);

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&end_label);
        self.writer.write_label(&false_label);

        if self.cur_is_keyword(Keyword::Else) {
            self.bump()?;
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn next_if_label(&mut self) -> String {
        let label = format!("IF{}", self.if_count);
        self.if_count += 1;
        label
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;
        let start_label = format!("WHILE{}", self.while_count);
        let end_label = format!("WHILE_END{}", self.while_count);
        self.while_count += 1;

        self.writer.write_label(&start_label);
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithCommand::Not);
        self.writer.write_if_goto(&end_label);

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&start_label);
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.cur_is_symbol(';') {
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return();
        Ok(())
    }

    fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let first_name = self.expect_identifier()?;
        let mut num_args: u16 = 0;

        let call_name = if self.cur_is_symbol('.') {
            self.bump()?;
            let method_name = self.expect_identifier()?;
            match self.symbols.lookup(&first_name).cloned() {
                Some(info) => {
                    num_args += 1;
                    self.writer.write_push(segment_for(info.kind), info.index);
                    format!("{}.{}", info.type_name, method_name)
                }
                None => format!("{first_name}.{method_name}"),
            }
        } else {
            num_args += 1;
            self.writer.write_push(Segment::Pointer, 0);
            format!("{}.{}", self.class_name, first_name)
        };

        self.expect_symbol('(')?;
        num_args += self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.write_call(&call_name, num_args);
        Ok(())
    }

    // -- expressions ---------------------------------------------------------

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;
        while let Some(op) = self.cur_binary_op() {
            self.bump()?;
            self.compile_term()?;
            self.emit_binary_op(op);
        }
        Ok(())
    }

    fn cur_binary_op(&self) -> Option<char> {
        self.lookahead
            .as_ref()
            .and_then(|t| t.symbol())
            .filter(|c| "+-*/&|<>=".contains(*c))
    }

    fn emit_binary_op(&mut self, op: char) {
        match op {
            '+' => self.writer.write_arithmetic(ArithCommand::Add),
            '-' => self.writer.write_arithmetic(ArithCommand::Sub),
            '=' => self.writer.write_arithmetic(ArithCommand::Eq),
            '>' => self.writer.write_arithmetic(ArithCommand::Gt),
            '<' => self.writer.write_arithmetic(ArithCommand::Lt),
            '&' => self.writer.write_arithmetic(ArithCommand::And),
            '|' => self.writer.write_arithmetic(ArithCommand::Or),
            '*' => self.writer.write_call("Math.multiply", 2),
            '/' => self.writer.write_call("Math.divide", 2),
            _ => unreachable!("cur_binary_op only yields the operators matched above"),
        }
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        let tok = self.cur()?.clone();
        match &tok.kind {
            TokenKind::IntConst(n) => {
                self.writer.write_push(Segment::Constant, *n);
                self.bump()?;
            }
            TokenKind::StringConst(s) => {
                let s = s.clone();
                self.compile_string_constant(&s);
                self.bump()?;
            }
            TokenKind::Keyword(kw) if kw.is_keyword_constant() => {
                self.compile_keyword_constant(*kw);
                self.bump()?;
            }
            TokenKind::Symbol('(') => {
                self.bump()?;
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            // unary minus and boolean/bitwise not -- the only two unary
            // operators in Jack (a type-checked Jack front end would reject
            // `+x` or `*x` as terms; this compiler does the same by simply
            // not recognizing them as unary-op starts).
            TokenKind::Symbol(c) if *c == '-' || *c == '~' => {
                let op = *c;
                self.bump()?;
                self.compile_term()?;
                match op {
                    '-' => self.writer.write_arithmetic(ArithCommand::Neg),
                    '~' => self.writer.write_arithmetic(ArithCommand::Not),
                    _ => unreachable!(),
                }
            }
            TokenKind::Identifier(_) => self.compile_term_identifier()?,
            _ => return Err(ParseError::unexpected(&tok, "a term").into()),
        }
        Ok(())
    }

    fn compile_string_constant(&mut self, s: &str) {
        self.writer.write_push(Segment::Constant, s.chars().count() as u16);
        self.writer.write_call("String.new", 1);
        for c in s.chars() {
            self.writer.write_push(Segment::Constant, c as u16);
            self.writer.write_call("String.appendChar", 2);
        }
    }

    fn compile_keyword_constant(&mut self, kw: Keyword) {
        match kw {
            Keyword::This => self.writer.write_push(Segment::Pointer, 0),
            Keyword::True => {
                self.writer.write_push(Segment::Constant, 0);
                self.writer.write_arithmetic(ArithCommand::Not);
            }
            // false and null are both represented as 0
            _ => self.writer.write_push(Segment::Constant, 0),
        }
    }

    /// An identifier term: a bare variable, an array element, or a
    /// subroutine call, disambiguated by one token of lookahead.
    fn compile_term_identifier(&mut self) -> Result<(), CompileError> {
        let next_symbol = self.peek().and_then(|t| t.symbol());
        match next_symbol {
            Some('[') => {
                let name = self.expect_identifier()?;
                let info = self.lookup_required(&name)?;
                self.writer.write_push(segment_for(info.kind), info.index);
                self.expect_symbol('[')?;
                self.compile_expression()?;
                self.expect_symbol(']')?;
                self.writer.write_arithmetic(ArithCommand::Add);
                self.writer.write_pop(Segment::Pointer, 1);
                self.writer.write_push(Segment::That, 0);
                Ok(())
            }
            Some('.') | Some('(') => self.compile_subroutine_call(),
            _ => {
                let name = self.expect_identifier()?;
                let info = self.lookup_required(&name)?;
                self.writer.write_push(segment_for(info.kind), info.index);
                Ok(())
            }
        }
    }

    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        if self.cur_is_symbol(')') {
            return Ok(0);
        }
        let mut count: u16 = 1;
        self.compile_expression()?;
        while self.cur_is_symbol(',') {
            self.bump()?;
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }
}
