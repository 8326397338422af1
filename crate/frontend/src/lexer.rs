use std::sync::Arc;

use ziv_error::DiagnosticKind;
use ziv_ir::SourceLocation;
use ziv_shared::DiagnosticEmitter;

use crate::source_buffer::SourceBuffer;
use crate::token::Token;
use crate::token_buffer::TokenBuffer;
use crate::token_kind::TokenKind;

const DEFAULT_INDENT_WIDTH: usize = 4;
const TAB_STOP: usize = 4;

/// Scans a source buffer's bytes into a token buffer, tracking indentation
/// and synthesizing implicit semicolons as it goes.
///
/// Operates on raw bytes rather than `char`s: only ASCII bytes are treated
/// as letters/digits for identifier and number recognition. Non-ASCII
/// bytes outside string/char literals are simply unrecognised.
pub struct Lexer<'a> {
    bytes: &'a [u8],
    file: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    indent_level: usize,
    indent_width: usize,
    buffer: TokenBuffer,
    last_terminating: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Lexer::with_indent_width(source, DEFAULT_INDENT_WIDTH)
    }

    pub fn with_indent_width(source: &'a SourceBuffer, indent_width: usize) -> Self {
        Lexer {
            bytes: source.contents(),
            file: source.filename(),
            pos: 0,
            line: 1,
            column: 1,
            indent_stack: Vec::new(),
            indent_level: 0,
            indent_width,
            buffer: TokenBuffer::new(),
            last_terminating: false,
        }
    }

    /// Runs the full lexer, returning the accumulated token buffer. Always
    /// begins with `Sof` and ends with `Eof`, with any outstanding
    /// `Dedent`s flushed first.
    pub fn tokenize(mut self, emitter: &mut DiagnosticEmitter) -> TokenBuffer {
        let start = self.location(0);
        self.push_fixed(TokenKind::Sof, start);

        let mut at_start_of_line = true;
        while self.pos < self.bytes.len() {
            if at_start_of_line {
                self.begin_line(emitter);
                at_start_of_line = false;
                continue;
            }
            match self.peek() {
                Some(b'\n') | Some(b'\r') => {
                    self.consume_newline();
                    at_start_of_line = true;
                }
                Some(b) if b.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'#') => self.handle_comment(emitter),
                Some(b'"') => self.handle_string(emitter),
                Some(b'\'') => self.handle_char(emitter),
                Some(b) if b.is_ascii_digit() => self.handle_number(emitter),
                Some(b) if is_identifier_start(b) => self.handle_identifier(),
                Some(b'-') => self.handle_minus(),
                Some(b'+') => self.handle_plus(),
                Some(b'*') => self.handle_star(),
                Some(b'/') => self.handle_slash(),
                Some(b'=') => self.handle_equals(),
                Some(b'<') => self.handle_less(),
                Some(b'>') => self.handle_greater(),
                Some(b'!') => self.handle_bang(emitter),
                Some(b'.') => self.handle_dot(emitter),
                Some(b';') => self.simple(TokenKind::Semicolon),
                Some(b'{') => self.simple(TokenKind::LBrace),
                Some(b'}') => self.simple(TokenKind::RBrace),
                Some(b'[') => self.simple(TokenKind::LBracket),
                Some(b']') => self.simple(TokenKind::RBracket),
                Some(b'(') => self.simple(TokenKind::LParen),
                Some(b')') => self.simple(TokenKind::RParen),
                Some(b',') => self.simple(TokenKind::Comma),
                Some(b':') => self.simple(TokenKind::Colon),
                Some(b'%') => self.simple(TokenKind::Percent),
                Some(b'|') => self.simple(TokenKind::Pipe),
                Some(b'&') => self.simple(TokenKind::Amp),
                Some(b'^') => self.simple(TokenKind::Caret),
                Some(b'~') => self.simple(TokenKind::Tilde),
                Some(_) => self.handle_invalid(emitter),
                None => unreachable!("loop condition guards against end of input"),
            }
        }

        self.finish();
        self.buffer
    }

    fn finish(&mut self) {
        self.maybe_insert_implicit_semicolon();
        while self.indent_stack.pop().is_some() {
            let at = self.location(0);
            self.push_fixed(TokenKind::Dedent, at);
        }
        let at = self.location(0);
        self.push_fixed(TokenKind::Eof, at);
    }

    // -- cursor primitives --

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        self.column += 1;
        Some(b)
    }

    /// Consumes a single line terminator (`\n`, `\r`, or `\r\n`), resetting
    /// column to 1 and incrementing the line number exactly once.
    fn consume_newline(&mut self) {
        if self.peek() == Some(b'\r') {
            self.pos += 1;
            if self.peek() == Some(b'\n') {
                self.pos += 1;
            }
        } else if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
        self.line += 1;
        self.column = 1;
    }

    fn location(&self, length: usize) -> SourceLocation {
        SourceLocation::new(Arc::clone(&self.file), self.line, self.column, self.pos, length)
    }

    fn push_token(&mut self, kind: TokenKind, spelling: impl Into<String>, location: SourceLocation) {
        self.last_terminating = kind.is_expression_terminating();
        self.buffer.push(Token::new(kind, spelling, location));
    }

    fn push_fixed(&mut self, kind: TokenKind, location: SourceLocation) {
        self.last_terminating = kind.is_expression_terminating();
        self.buffer.push(Token::fixed(kind, location));
    }

    fn simple(&mut self, kind: TokenKind) {
        let start = self.location(1);
        self.advance();
        self.push_fixed(kind, start);
    }

    fn maybe_insert_implicit_semicolon(&mut self) {
        if self.last_terminating {
            let at = self.location(0);
            self.push_fixed(TokenKind::Semicolon, at);
        }
    }

    // -- indentation / newlines --

    fn begin_line(&mut self, emitter: &mut DiagnosticEmitter) {
        let mut spaces = 0usize;
        let mut saw_tab = false;
        let mut first_tab_location = None;

        loop {
            match self.peek() {
                Some(b' ') => {
                    spaces += 1;
                    self.advance();
                }
                Some(b'\t') => {
                    if first_tab_location.is_none() {
                        first_tab_location = Some(self.location(1));
                    }
                    saw_tab = true;
                    spaces = (spaces / TAB_STOP + 1) * TAB_STOP;
                    self.advance();
                }
                _ => break,
            }
        }

        // A blank line (only whitespace before EOF or a newline) carries no
        // indentation information and is skipped entirely, the same way a
        // Python-style tokenizer ignores blank lines.
        if matches!(self.peek(), None | Some(b'\n') | Some(b'\r')) {
            if self.pos < self.bytes.len() {
                self.consume_newline();
                self.begin_line(emitter);
            }
            return;
        }

        if saw_tab {
            emitter.emit(DiagnosticKind::TabInIndentation, first_tab_location.unwrap(), &[]);
        }

        self.maybe_insert_implicit_semicolon();

        if spaces % self.indent_width != 0 {
            emitter.emit(DiagnosticKind::InvalidIndentation, self.location(0), &[]);
            return;
        }
        let level = spaces / self.indent_width;

        use std::cmp::Ordering;
        match level.cmp(&self.indent_level) {
            Ordering::Equal => {}
            Ordering::Greater if level == self.indent_level + 1 => {
                self.indent_stack.push(self.indent_level);
                self.indent_level = level;
                let at = self.location(0);
                self.push_fixed(TokenKind::Indent, at);
            }
            Ordering::Greater => {
                emitter.emit(DiagnosticKind::InvalidIndentation, self.location(0), &[]);
            }
            Ordering::Less => {
                while level < self.indent_level {
                    match self.indent_stack.pop() {
                        Some(previous) => {
                            self.indent_level = previous;
                            let at = self.location(0);
                            self.push_fixed(TokenKind::Dedent, at);
                        }
                        None => {
                            emitter.emit(DiagnosticKind::InvalidIndentation, self.location(0), &[]);
                            break;
                        }
                    }
                }
            }
        }
    }

    // -- comments --

    fn handle_comment(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(0);
        self.advance(); // '#'
        if self.peek() == Some(b'-') && self.peek_at(1) == Some(b'-') {
            self.advance();
            self.advance();
            self.handle_block_comment(emitter, start);
        } else {
            while !matches!(self.peek(), None | Some(b'\n') | Some(b'\r')) {
                self.advance();
            }
        }
    }

    /// Block comments nest: every `#--` increases depth, every `--#`
    /// decreases it, and the comment ends when depth returns to zero.
    fn handle_block_comment(&mut self, emitter: &mut DiagnosticEmitter, start: SourceLocation) {
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    emitter.emit(DiagnosticKind::UnterminatedComment, start, &[]);
                    return;
                }
                Some(b'\n') | Some(b'\r') => self.consume_newline(),
                Some(b'-') if self.peek_at(1) == Some(b'-') && self.peek_at(2) == Some(b'#') => {
                    self.advance();
                    self.advance();
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Some(b'#') if self.peek_at(1) == Some(b'-') && self.peek_at(2) == Some(b'-') => {
                    self.advance();
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    // -- string / char literals --

    fn handle_string(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(0);
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    emitter.emit(DiagnosticKind::UnterminatedString, start, &[]);
                    return;
                }
                Some(b'\n') | Some(b'\r') => {
                    emitter.emit(DiagnosticKind::UnterminatedString, start, &[]);
                    return;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    let escape_start = self.location(0);
                    self.advance();
                    match self.escape_char(escape_start, emitter) {
                        Some(c) => value.push(c),
                        None => {}
                    }
                }
                Some(_) => {
                    value.push(self.advance_utf8_char());
                }
            }
        }
        let length = self.pos - start.offset;
        self.push_token(TokenKind::StringLiteral, value, self.location_with_len(start, length));
    }

    fn handle_char(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(0);
        self.advance(); // opening quote
        let content = match self.peek() {
            None => {
                emitter.emit(DiagnosticKind::UnterminatedCharacter, start, &[]);
                return;
            }
            Some(b'\\') => {
                let escape_start = self.location(0);
                self.advance();
                self.escape_char(escape_start, emitter).unwrap_or('\0')
            }
            Some(_) => self.advance_utf8_char(),
        };
        if self.peek() != Some(b'\'') {
            emitter.emit(DiagnosticKind::UnterminatedCharacter, start, &[]);
            return;
        }
        self.advance(); // closing quote
        let length = self.pos - start.offset;
        self.push_token(TokenKind::CharLiteral, content.to_string(), self.location_with_len(start, length));
    }

    /// Consumes the character after a `\`, returning the decoded character
    /// for recognised escapes. Unrecognised escapes are reported but still
    /// consumed and passed through literally (`\` followed by the raw
    /// character).
    fn escape_char(&mut self, escape_start: SourceLocation, emitter: &mut DiagnosticEmitter) -> Option<char> {
        match self.peek() {
            Some(b'n') => {
                self.advance();
                Some('\n')
            }
            Some(b't') => {
                self.advance();
                Some('\t')
            }
            Some(b'r') => {
                self.advance();
                Some('\r')
            }
            Some(b'\\') => {
                self.advance();
                Some('\\')
            }
            Some(b'"') => {
                self.advance();
                Some('"')
            }
            Some(b'\'') => {
                self.advance();
                Some('\'')
            }
            Some(_) => {
                let c = self.advance_utf8_char();
                emitter.emit(DiagnosticKind::InvalidEscapeSequence, escape_start, &[&format!("\\{c}")]);
                None
            }
            None => None,
        }
    }

    /// Advances past one UTF-8 scalar value starting at the cursor and
    /// returns it. Falls back to the replacement character for invalid
    /// encodings so the lexer never panics on malformed input.
    fn advance_utf8_char(&mut self) -> char {
        let remaining = &self.bytes[self.pos..];
        match std::str::from_utf8(remaining).ok().and_then(|s| s.chars().next()) {
            Some(c) => {
                for _ in 0..c.len_utf8() {
                    self.advance();
                }
                c
            }
            None => {
                self.advance();
                '\u{FFFD}'
            }
        }
    }

    fn location_with_len(&self, start: SourceLocation, length: usize) -> SourceLocation {
        SourceLocation::new(start.file, start.line, start.column, start.offset, length)
    }

    // -- numbers --

    fn handle_number(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(0);
        let mut text = String::new();
        let mut is_float = false;

        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            text.push('0');
            text.push('x');
            self.advance();
            self.advance();
            let mut digits = 0;
            while let Some(b) = self.peek() {
                if b.is_ascii_hexdigit() {
                    text.push(b as char);
                    self.advance();
                    digits += 1;
                } else {
                    break;
                }
            }
            if digits == 0 {
                emitter.emit(DiagnosticKind::InvalidNumber, start.clone(), &[&text]);
            }
            self.finish_number(emitter, start, text, false);
            return;
        }
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'b') | Some(b'B')) {
            text.push('0');
            text.push('b');
            self.advance();
            self.advance();
            let mut digits = 0;
            while let Some(b) = self.peek() {
                if b == b'0' || b == b'1' {
                    text.push(b as char);
                    self.advance();
                    digits += 1;
                } else {
                    break;
                }
            }
            if digits == 0 {
                emitter.emit(DiagnosticKind::InvalidNumber, start.clone(), &[&text]);
            }
            self.finish_number(emitter, start, text, false);
            return;
        }

        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                text.push(b as char);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(b) = self.peek() {
                if b.is_ascii_digit() {
                    text.push(b as char);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let exponent_start = self.location(0);
            let mut exponent = String::new();
            exponent.push(self.peek().unwrap() as char);
            self.advance();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                exponent.push(self.peek().unwrap() as char);
                self.advance();
            }
            let mut digits = 0;
            while let Some(b) = self.peek() {
                if b.is_ascii_digit() {
                    exponent.push(b as char);
                    self.advance();
                    digits += 1;
                } else {
                    break;
                }
            }
            if digits == 0 {
                let length = exponent.len();
                emitter.emit(DiagnosticKind::InvalidNumber, self.location_with_len(exponent_start, length), &[&exponent]);
            } else {
                is_float = true;
                text.push_str(&exponent);
            }
        }

        self.finish_number(emitter, start, text, is_float);
    }

    fn finish_number(&mut self, emitter: &mut DiagnosticEmitter, start: SourceLocation, text: String, is_float: bool) {
        if let Some(b) = self.peek() {
            if b.is_ascii_alphabetic() || b == b'_' {
                emitter.emit(DiagnosticKind::InvalidNumber, start.clone(), &[&(b as char).to_string()]);
            }
        }
        let length = self.pos - start.offset;
        let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral };
        self.push_token(kind, text, self.location_with_len(start, length));
    }

    // -- identifiers / keywords --

    fn handle_identifier(&mut self) {
        let start = self.location(0);
        let mut text = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                text.push(b as char);
                self.advance();
            } else {
                break;
            }
        }
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        let length = self.pos - start.offset;
        self.push_token(kind, text, self.location_with_len(start, length));
    }

    // -- operators --

    fn handle_minus(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = match self.peek() {
            Some(b'=') => {
                self.advance();
                TokenKind::MinusEq
            }
            Some(b'-') => {
                self.advance();
                TokenKind::MinusMinus
            }
            Some(b'>') => {
                self.advance();
                TokenKind::Arrow
            }
            _ => TokenKind::Minus,
        };
        self.push_fixed(kind, start);
    }

    fn handle_plus(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = match self.peek() {
            Some(b'=') => {
                self.advance();
                TokenKind::PlusEq
            }
            Some(b'+') => {
                self.advance();
                TokenKind::PlusPlus
            }
            _ => TokenKind::Plus,
        };
        self.push_fixed(kind, start);
    }

    fn handle_star(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::StarEq
        } else {
            TokenKind::Star
        };
        self.push_fixed(kind, start);
    }

    fn handle_slash(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        };
        self.push_fixed(kind, start);
    }

    fn handle_equals(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::EqEq
        } else {
            TokenKind::Eq
        };
        self.push_fixed(kind, start);
    }

    fn handle_less(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::Le
        } else {
            TokenKind::Lt
        };
        self.push_fixed(kind, start);
    }

    fn handle_greater(&mut self) {
        let start = self.location(1);
        self.advance();
        let kind = if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::Ge
        } else {
            TokenKind::Gt
        };
        self.push_fixed(kind, start);
    }

    fn handle_bang(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(1);
        self.advance();
        if self.peek() == Some(b'=') {
            self.advance();
            self.push_fixed(TokenKind::NotEq, start);
        } else {
            emitter.emit(DiagnosticKind::InvalidCharacter, start, &["!"]);
            self.push_token(TokenKind::Unknown, "!", self.location_with_len(start, 1));
        }
    }

    fn handle_dot(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(2);
        self.advance();
        if self.peek() == Some(b'.') {
            self.advance();
            self.push_fixed(TokenKind::DotDot, start);
        } else {
            emitter.emit(DiagnosticKind::InvalidCharacter, start.clone(), &["."]);
            self.push_token(TokenKind::Unknown, ".", self.location_with_len(start, 1));
        }
    }

    fn handle_invalid(&mut self, emitter: &mut DiagnosticEmitter) {
        let start = self.location(1);
        let c = self.advance_utf8_char();
        emitter.emit(DiagnosticKind::InvalidCharacter, start.clone(), &[&c.to_string()]);
        self.push_token(TokenKind::Unknown, c.to_string(), self.location_with_len(start, 1));
    }
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziv_shared::AccumulatingDiagnosticConsumer;

    fn tokenize(source: &str) -> (TokenBuffer, AccumulatingDiagnosticConsumer) {
        let buffer = SourceBuffer::from_stdin(source.as_bytes().to_vec()).unwrap();
        let mut consumer = AccumulatingDiagnosticConsumer::new();
        let tokens = {
            let mut emitter = DiagnosticEmitter::new(&buffer, &mut consumer);
            let lexer = Lexer::new(&buffer);
            lexer.tokenize(&mut emitter)
        };
        (tokens, consumer)
    }

    fn kinds(tokens: &TokenBuffer) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn simple_function_produces_expected_token_stream() {
        let (tokens, consumer) = tokenize("fn add(a: int, b: int) -> int:\n    return a + b\n");
        assert_eq!(consumer.messages().len(), 0);
        use TokenKind::*;
        assert_eq!(
            kinds(&tokens),
            vec![
                Sof, Fn, Identifier, LParen, Identifier, Colon, KwInt, Comma, Identifier, Colon, KwInt, RParen, Arrow,
                KwInt, Colon, Indent, Return, Identifier, Plus, Identifier, Semicolon, Dedent, Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_and_produces_no_literal() {
        let (tokens, consumer) = tokenize("let s: string = \"hi\n");
        assert!(tokens.iter().all(|t| t.kind != TokenKind::StringLiteral));
        assert_eq!(consumer.messages()[0].code, "ZIV-1002");
    }

    #[test]
    fn inconsistent_indentation_is_reported() {
        let (_, consumer) = tokenize("if a:\n    b\n   c\n");
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-1007"));
    }

    #[test]
    fn blank_lines_do_not_affect_indentation() {
        let (tokens, consumer) = tokenize("if a:\n    b\n\n    c\n");
        assert_eq!(consumer.messages().len(), 0);
        assert_eq!(kinds(&tokens).iter().filter(|k| **k == TokenKind::Indent).count(), 1);
    }

    #[test]
    fn hex_and_binary_literals_are_recognized() {
        let (tokens, _) = tokenize("0xFF 0b101\n");
        let literals: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::IntLiteral)
            .map(|t| t.spelling.as_str())
            .collect();
        assert_eq!(literals, vec!["0xFF", "0b101"]);
    }

    #[test]
    fn nested_block_comments_are_supported() {
        let (tokens, consumer) = tokenize("#-- outer #-- inner --# still outer --#\nx\n");
        assert_eq!(consumer.messages().len(), 0);
        assert_eq!(kinds(&tokens), vec![TokenKind::Sof, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]);
    }
}
