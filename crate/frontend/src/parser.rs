use std::sync::Arc;

use ziv_error::DiagnosticKind;
use ziv_ir::{NodeId, NodeToken, NodeKind, SourceLocation, Tree};
use ziv_shared::DiagnosticEmitter;

use crate::token::Token;
use crate::token_buffer::TokenBuffer;
use crate::token_kind::TokenKind as Tk;

/// Recursive-descent parser with a lookahead index over a scanned token
/// buffer, building nodes into a [`Tree`] arena.
pub struct Parser<'a> {
    tokens: &'a TokenBuffer,
    pos: usize,
    tree: Tree,
    parenthesized: std::collections::HashSet<NodeId>,
}

const RECOVERY_ANCHORS: &[Tk] = &[Tk::Fn, Tk::Let, Tk::Mut, Tk::Const, Tk::If, Tk::While, Tk::Return];

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenBuffer, file: Arc<str>) -> Self {
        Parser {
            tokens,
            pos: 0,
            tree: Tree::new(file),
            parenthesized: std::collections::HashSet::new(),
        }
    }

    /// Parses the whole token buffer and returns the built tree.
    pub fn parse(mut self, emitter: &mut DiagnosticEmitter) -> Tree {
        let file_start = self.add_fixed(NodeId::SENTINEL, NodeKind::FileStart, self.current().location.clone());
        self.advance_past_sof();

        while !self.at(Tk::Eof) {
            if self.consume_match(Tk::Semicolon) {
                continue;
            }
            let node = self.parse_top_level(emitter);
            self.tree.add_child(file_start, node);
        }

        let eof_location = self.current().location.clone();
        let file_end = self.add_fixed(file_start, NodeKind::FileEnd, eof_location);
        self.tree.add_child(file_start, file_end);

        self.tree
    }

    // -- cursor primitives --

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).expect("lexer always appends a trailing Eof")
    }

    fn at(&self, kind: Tk) -> bool {
        self.current().kind == kind
    }

    fn advance_past_sof(&mut self) {
        if self.at(Tk::Sof) {
            self.pos += 1;
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at(Tk::Eof) {
            self.pos += 1;
        }
        token
    }

    fn consume_match(&mut self, kind: Tk) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// If the next token matches `kind`, consumes and returns it.
    /// Otherwise emits `UnexpectedToken` with `message` and the observed
    /// token's spelling, and does not consume.
    fn expect(&mut self, kind: Tk, message: &str, emitter: &mut DiagnosticEmitter) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            let observed = self.current().clone();
            emitter.emit(DiagnosticKind::UnexpectedToken, observed.location.clone(), &[message, observed.spelling.as_str()]);
            None
        }
    }

    fn add_node(&mut self, kind: NodeKind, token: NodeToken) -> NodeId {
        self.tree.add_node(kind, token)
    }

    fn add_fixed(&mut self, _parent: NodeId, kind: NodeKind, location: SourceLocation) -> NodeId {
        self.add_node(kind, NodeToken { spelling: Arc::from(""), location })
    }

    fn node_from_token(&mut self, kind: NodeKind, token: &Token) -> NodeId {
        self.add_node(
            kind,
            NodeToken {
                spelling: Arc::from(token.spelling.as_str()),
                location: token.location.clone(),
            },
        )
    }

    /// Builds an `Error` node at the current token's location, marks it
    /// (propagating `has_error` to ancestors once attached), and
    /// synchronizes to a recovery point.
    fn error_node(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let observed = self.current().clone();
        emitter.emit(DiagnosticKind::UnexpectedToken, observed.location.clone(), &["a statement", observed.spelling.as_str()]);
        let node = self.node_from_token(NodeKind::Error, &observed);
        self.tree.mark_error(node);
        self.synchronize();
        node
    }

    /// Consumes tokens until the last one consumed is `;` or `}`, or the
    /// next token begins a recovery anchor keyword.
    fn synchronize(&mut self) {
        loop {
            if self.at(Tk::Eof) {
                return;
            }
            let consumed = self.advance();
            if matches!(consumed.kind, Tk::Semicolon | Tk::RBrace | Tk::Dedent) {
                return;
            }
            if RECOVERY_ANCHORS.contains(&self.current().kind) {
                return;
            }
        }
    }

    // -- top level --

    fn parse_top_level(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        match self.current().kind {
            Tk::Module => self.parse_module_decl(emitter),
            Tk::Import => self.parse_import(emitter),
            Tk::Fn => self.parse_function_decl(emitter),
            Tk::Let | Tk::Mut | Tk::Const => self.parse_variable_decl(emitter),
            Tk::If => self.parse_if(emitter),
            _ => self.parse_statement(emitter),
        }
    }

    fn parse_module_decl(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::ModuleDecl, &keyword);
        self.expect(Tk::Identifier, "module name", emitter);

        while !self.at(Tk::End) && !self.at(Tk::Eof) {
            if self.consume_match(Tk::Semicolon) {
                continue;
            }
            let child = self.parse_top_level(emitter);
            self.tree.add_child(node, child);
        }
        self.expect(Tk::End, "'end'", emitter);
        self.expect(Tk::Module, "'module'", emitter);
        node
    }

    fn parse_import(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::Import, &keyword);
        self.expect(Tk::Identifier, "module path", emitter);

        if self.consume_match(Tk::As) {
            self.expect(Tk::Identifier, "import alias", emitter);
        }
        if self.consume_match(Tk::LBrace) {
            loop {
                self.expect(Tk::Identifier, "imported name", emitter);
                if !self.consume_match(Tk::Comma) {
                    break;
                }
            }
            self.expect(Tk::RBrace, "'}'", emitter);
        }
        node
    }

    fn parse_function_decl(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::FunctionDecl, &keyword);

        if let Some(name) = self.expect(Tk::Identifier, "function name", emitter) {
            let name_node = self.node_from_token(NodeKind::FunctionName, &name);
            self.tree.add_child(node, name_node);
        } else {
            emitter.emit(DiagnosticKind::FunctionMissingName, keyword.location.clone(), &[]);
        }

        if self.at(Tk::LBracket) {
            let generics = self.parse_generic_params(emitter);
            self.tree.add_child(node, generics);
        }

        let params = self.parse_parameter_list(emitter);
        self.tree.add_child(node, params);

        if self.consume_match(Tk::Arrow) {
            let ty = self.parse_type_spec(emitter);
            self.tree.add_child(node, ty);
        }

        self.expect(Tk::Colon, "':'", emitter);
        let body = self.parse_block(emitter);
        self.tree.add_child(node, body);
        node
    }

    fn parse_generic_params(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let open = self.advance();
        let node = self.node_from_token(NodeKind::GenericParams, &open);
        loop {
            if self.at(Tk::RBracket) || self.at(Tk::Eof) {
                break;
            }
            if let Some(name) = self.expect(Tk::Identifier, "generic parameter", emitter) {
                let param = self.node_from_token(NodeKind::GenericParam, &name);
                if self.consume_match(Tk::Colon) {
                    self.expect(Tk::Identifier, "trait bound", emitter);
                }
                self.tree.add_child(node, param);
            } else {
                break;
            }
            if !self.consume_match(Tk::Comma) {
                break;
            }
        }
        self.expect(Tk::RBracket, "']'", emitter);
        node
    }

    fn parse_parameter_list(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let open_location = self.current().location.clone();
        self.expect(Tk::LParen, "'('", emitter);
        let node = self.add_fixed(NodeId::SENTINEL, NodeKind::ParameterList, open_location);

        while !self.at(Tk::RParen) && !self.at(Tk::Eof) {
            let param = self.parse_parameter(emitter);
            self.tree.add_child(node, param);
            if !self.consume_match(Tk::Comma) {
                break;
            }
        }
        self.expect(Tk::RParen, "')'", emitter);
        node
    }

    fn parse_parameter(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        if self.at(Tk::Take) {
            self.advance();
        } else if self.at(Tk::Mut) {
            self.advance();
            self.consume_match(Tk::Ref);
        } else {
            self.consume_match(Tk::Ref);
        }

        let name = self.expect(Tk::Identifier, "parameter name", emitter);
        let node = match name {
            Some(name) => self.node_from_token(NodeKind::Parameter, &name),
            None => return self.error_node(emitter),
        };
        self.expect(Tk::Colon, "':'", emitter);
        let ty = self.parse_type_spec(emitter);
        self.tree.add_child(node, ty);
        node
    }

    fn parse_type_spec(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        if !self.current().kind.is_type_keyword() {
            let observed = self.current().clone();
            emitter.emit(DiagnosticKind::UnexpectedToken, observed.location.clone(), &["a type", observed.spelling.as_str()]);
            return self.node_from_token(NodeKind::Error, &observed);
        }
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::TypeSpec, &keyword);

        if self.consume_match(Tk::Lt) {
            loop {
                let arg = self.parse_type_spec(emitter);
                self.tree.add_child(node, arg);
                if !self.consume_match(Tk::Comma) {
                    break;
                }
            }
            self.expect(Tk::Gt, "'>'", emitter);
        }
        node
    }

    fn parse_variable_decl(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::VariableDecl, &keyword);

        let name = self.expect(Tk::Identifier, "variable name", emitter);
        if let Some(name) = name {
            let name_node = self.node_from_token(NodeKind::IdentifierExpr, &name);
            self.tree.add_child(node, name_node);
        }

        if self.consume_match(Tk::Colon) {
            let ty = self.parse_type_spec(emitter);
            self.tree.add_child(node, ty);
        } else {
            emitter.emit(DiagnosticKind::VariableMissingType, keyword.location.clone(), &[]);
        }

        if self.consume_match(Tk::Eq) {
            let init_location = self.current().location.clone();
            let value = self.parse_expression(emitter);
            let init = self.add_fixed(NodeId::SENTINEL, NodeKind::VariableInit, init_location);
            self.tree.add_child(init, value);
            self.tree.add_child(node, init);
        }
        self.expect(Tk::Semicolon, "';'", emitter);
        node
    }

    // -- statements --

    fn parse_statement(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        match self.current().kind {
            Tk::Let | Tk::Mut | Tk::Const => self.parse_variable_decl(emitter),
            Tk::If => self.parse_if(emitter),
            Tk::While => self.parse_while(emitter),
            Tk::Do => self.parse_do_while(emitter),
            Tk::For => self.parse_for(emitter),
            Tk::Match => self.parse_match(emitter),
            Tk::Return => self.parse_return(emitter),
            Tk::Break => {
                let token = self.advance();
                let node = self.node_from_token(NodeKind::BreakStmt, &token);
                self.expect(Tk::Semicolon, "';'", emitter);
                node
            }
            Tk::Continue => {
                let token = self.advance();
                let node = self.node_from_token(NodeKind::ContinueStmt, &token);
                self.expect(Tk::Semicolon, "';'", emitter);
                node
            }
            Tk::LBrace | Tk::Indent => self.parse_block(emitter),
            _ => self.parse_expression_statement(emitter),
        }
    }

    /// A block is primarily indentation-delimited: `Indent` opens it and
    /// the matching `Dedent` the lexer emits on dedent closes it. A
    /// brace-delimited `{ stmts }` form is also accepted, since nothing
    /// forces every block in a file to sit at its own indentation level
    /// (e.g. a block nested on the same line as its header).
    fn parse_block(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        if self.at(Tk::Indent) {
            let open = self.advance();
            let node = self.node_from_token(NodeKind::CodeBlock, &open);
            while !self.at(Tk::Dedent) && !self.at(Tk::Eof) {
                if self.consume_match(Tk::Semicolon) {
                    continue;
                }
                let stmt = self.parse_statement(emitter);
                self.tree.add_child(node, stmt);
            }
            self.expect(Tk::Dedent, "dedent", emitter);
            return node;
        }
        if !self.at(Tk::LBrace) {
            let observed = self.current().clone();
            emitter.emit(DiagnosticKind::UnexpectedToken, observed.location.clone(), &["a block", observed.spelling.as_str()]);
            return self.node_from_token(NodeKind::Error, &observed);
        }
        let open = self.advance();
        let node = self.node_from_token(NodeKind::CodeBlock, &open);
        while !self.at(Tk::RBrace) && !self.at(Tk::Eof) {
            if self.consume_match(Tk::Semicolon) {
                continue;
            }
            let stmt = self.parse_statement(emitter);
            self.tree.add_child(node, stmt);
        }
        self.expect(Tk::RBrace, "'}'", emitter);
        node
    }

    fn parse_if(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::IfStmt, &keyword);

        let parenthesised = self.consume_match(Tk::LParen);
        let cond = self.parse_expression(emitter);
        self.tree.add_child(node, cond);
        if parenthesised {
            self.expect(Tk::RParen, "')'", emitter);
        }

        // A trailing ':' introduces an indentation-delimited body, as for
        // function and match bodies; absent for the brace-delimited form.
        self.consume_match(Tk::Colon);
        let body = self.parse_block(emitter);
        self.tree.add_child(node, body);

        if self.at(Tk::Else) {
            let else_keyword = self.advance();
            let else_node = self.node_from_token(NodeKind::ElseBranch, &else_keyword);
            let branch = if self.at(Tk::If) {
                self.parse_if(emitter)
            } else {
                self.consume_match(Tk::Colon);
                self.parse_block(emitter)
            };
            self.tree.add_child(else_node, branch);
            self.tree.add_child(node, else_node);
        }
        node
    }

    fn parse_while(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::WhileLoop, &keyword);
        let parenthesised = self.consume_match(Tk::LParen);
        let cond = self.parse_expression(emitter);
        self.tree.add_child(node, cond);
        if parenthesised {
            self.expect(Tk::RParen, "')'", emitter);
        }
        self.consume_match(Tk::Colon);
        let body = self.parse_block(emitter);
        self.tree.add_child(node, body);
        node
    }

    fn parse_do_while(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::DoWhileLoop, &keyword);
        self.consume_match(Tk::Colon);
        let body = self.parse_block(emitter);
        self.tree.add_child(node, body);
        self.expect(Tk::While, "'while'", emitter);
        let parenthesised = self.consume_match(Tk::LParen);
        let cond = self.parse_expression(emitter);
        self.tree.add_child(node, cond);
        if parenthesised {
            self.expect(Tk::RParen, "')'", emitter);
        }
        self.expect(Tk::Semicolon, "';'", emitter);
        node
    }

    fn parse_for(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::ForLoop, &keyword);

        let init = self.parse_statement(emitter);
        self.tree.add_child(node, init);

        let cond = self.parse_expression(emitter);
        self.tree.add_child(node, cond);
        self.expect(Tk::Semicolon, "';'", emitter);

        let step = self.parse_expression(emitter);
        self.tree.add_child(node, step);

        self.consume_match(Tk::Colon);
        let body = self.parse_block(emitter);
        self.tree.add_child(node, body);
        node
    }

    fn parse_match(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::MatchStmt, &keyword);
        let subject = self.parse_expression(emitter);
        self.tree.add_child(node, subject);
        self.expect(Tk::Colon, "':'", emitter);

        while self.at(Tk::Case) {
            let case_keyword = self.advance();
            let case = self.node_from_token(NodeKind::MatchCase, &case_keyword);
            let pattern = self.parse_expression(emitter);
            self.tree.add_child(case, pattern);
            self.expect(Tk::Colon, "':'", emitter);
            let body = self.parse_block(emitter);
            self.tree.add_child(case, body);
            self.tree.add_child(node, case);
        }
        self.expect(Tk::End, "'end'", emitter);
        node
    }

    fn parse_return(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let keyword = self.advance();
        let node = self.node_from_token(NodeKind::ReturnStmt, &keyword);
        if !self.at(Tk::Semicolon) {
            let value = self.parse_expression(emitter);
            self.tree.add_child(node, value);
        }
        self.expect(Tk::Semicolon, "';'", emitter);
        node
    }

    fn parse_expression_statement(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let start_location = self.current().location.clone();
        let expr = self.parse_expression(emitter);
        let node = self.add_fixed(NodeId::SENTINEL, NodeKind::ExpressionStmt, start_location);
        self.tree.add_child(node, expr);
        self.expect(Tk::Semicolon, "';'", emitter);
        node
    }

    // -- expressions --

    fn parse_expression(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        self.parse_assignment(emitter)
    }

    fn parse_assignment(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let lhs = self.parse_logical_or(emitter);
        if self.at(Tk::Eq) {
            let op = self.advance();
            let rhs = self.parse_assignment(emitter);
            let node = self.node_from_token(NodeKind::AssignmentExpr, &op);
            self.tree.add_child(node, lhs);
            self.tree.add_child(node, rhs);
            node
        } else {
            lhs
        }
    }

    fn parse_logical_or(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_logical_and(emitter);
        while self.at(Tk::Or) {
            let op = self.advance();
            let rhs = self.parse_logical_and(emitter);
            lhs = self.binary_node(&op, lhs, rhs);
        }
        lhs
    }

    fn parse_logical_and(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_equality(emitter);
        while self.at(Tk::And) {
            let op = self.advance();
            let rhs = self.parse_equality(emitter);
            lhs = self.binary_node(&op, lhs, rhs);
        }
        lhs
    }

    /// Non-associative: a second equality operator in the same chain is
    /// reported as an ambiguous comparison and wrapped in an `Error` node
    /// rather than silently left/right associating.
    fn parse_equality(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_comparison(emitter);
        if matches!(self.current().kind, Tk::EqEq | Tk::NotEq) {
            self.reject_unparenthesized_bitwise(emitter, lhs);
            let op = self.advance();
            let rhs = self.parse_comparison(emitter);
            self.reject_unparenthesized_bitwise(emitter, rhs);
            lhs = self.binary_node(&op, lhs, rhs);
            if matches!(self.current().kind, Tk::EqEq | Tk::NotEq) {
                lhs = self.ambiguous_chain(emitter, lhs);
            }
        }
        lhs
    }

    /// Non-associative: `a < b < c` is ambiguous and reported as such.
    fn parse_comparison(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_additive(emitter);
        if matches!(self.current().kind, Tk::Lt | Tk::Le | Tk::Gt | Tk::Ge) {
            self.reject_unparenthesized_bitwise(emitter, lhs);
            let op = self.advance();
            let rhs = self.parse_additive(emitter);
            self.reject_unparenthesized_bitwise(emitter, rhs);
            lhs = self.binary_node(&op, lhs, rhs);
            if matches!(self.current().kind, Tk::Lt | Tk::Le | Tk::Gt | Tk::Ge) {
                lhs = self.ambiguous_chain(emitter, lhs);
            }
        }
        lhs
    }

    fn ambiguous_chain(&mut self, emitter: &mut DiagnosticEmitter, built_so_far: NodeId) -> NodeId {
        let location = self.current().location.clone();
        emitter.emit(DiagnosticKind::AmbiguousComparison, location.clone(), &[]);
        let node = self.add_fixed(NodeId::SENTINEL, NodeKind::Error, location);
        self.tree.add_child(node, built_so_far);
        self.tree.mark_error(node);
        // Keep consuming the rest of the chain so a single diagnostic
        // covers it instead of one per extra comparison.
        while matches!(self.current().kind, Tk::EqEq | Tk::NotEq | Tk::Lt | Tk::Le | Tk::Gt | Tk::Ge) {
            self.advance();
            let operand = self.parse_additive(emitter);
            self.tree.add_child(node, operand);
        }
        node
    }

    fn parse_additive(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_multiplicative(emitter);
        while matches!(self.current().kind, Tk::Plus | Tk::Minus) {
            self.reject_unparenthesized_bitwise(emitter, lhs);
            let op = self.advance();
            let rhs = self.parse_multiplicative(emitter);
            self.reject_unparenthesized_bitwise(emitter, rhs);
            lhs = self.binary_node(&op, lhs, rhs);
        }
        lhs
    }

    fn parse_multiplicative(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_bitwise(emitter);
        while matches!(self.current().kind, Tk::Star | Tk::Slash | Tk::Percent) {
            self.reject_unparenthesized_bitwise(emitter, lhs);
            let op = self.advance();
            let rhs = self.parse_bitwise(emitter);
            self.reject_unparenthesized_bitwise(emitter, rhs);
            lhs = self.binary_node(&op, lhs, rhs);
        }
        lhs
    }

    /// Bitwise operators bind tighter than `*`/`/`/`%` in this grammar but
    /// mixing them with arithmetic or comparison without parentheses is
    /// flagged as ambiguous rather than silently resolved by precedence.
    /// `self.parenthesized` records which nodes came from an explicit
    /// `( … )`, so a parenthesized bitwise expression used as an operand
    /// of `+`/`*`/`<` and friends is never flagged.
    fn parse_bitwise(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut lhs = self.parse_unary(emitter);
        while matches!(self.current().kind, Tk::Pipe | Tk::Amp | Tk::Caret) {
            let op = self.advance();
            let rhs = self.parse_unary(emitter);
            lhs = self.binary_node(&op, lhs, rhs);
        }
        lhs
    }

    /// Emits `AmbiguousComparison` if `node` is an un-parenthesized bitwise
    /// expression about to be combined with an arithmetic or comparison
    /// operator.
    fn reject_unparenthesized_bitwise(&mut self, emitter: &mut DiagnosticEmitter, node: NodeId) {
        if self.parenthesized.contains(&node) {
            return;
        }
        if self.tree.kind(node) != NodeKind::BinaryExpr {
            return;
        }
        if matches!(self.tree.spelling(node), "|" | "&" | "^") {
            if let Some(location) = self.tree.location(node).cloned() {
                emitter.emit(DiagnosticKind::AmbiguousComparison, location, &[]);
            }
            self.tree.mark_error(node);
        }
    }

    fn parse_unary(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        if matches!(self.current().kind, Tk::Minus | Tk::Not | Tk::Tilde) {
            let op = self.advance();
            let operand = self.parse_unary(emitter);
            let node = self.node_from_token(NodeKind::UnaryExpr, &op);
            self.tree.add_child(node, operand);
            node
        } else {
            self.parse_postfix(emitter)
        }
    }

    fn parse_postfix(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        let mut node = self.parse_primary(emitter);
        loop {
            if self.at(Tk::LBracket) {
                let open = self.advance();
                let index_node = self.node_from_token(NodeKind::IndexExpr, &open);
                let index = self.parse_expression(emitter);
                self.tree.add_child(index_node, node);
                self.tree.add_child(index_node, index);
                self.expect(Tk::RBracket, "']'", emitter);
                node = index_node;
            } else {
                break;
            }
        }
        node
    }

    fn parse_primary(&mut self, emitter: &mut DiagnosticEmitter) -> NodeId {
        match self.current().kind {
            Tk::IntLiteral | Tk::FloatLiteral | Tk::StringLiteral | Tk::CharLiteral | Tk::True | Tk::False => {
                let token = self.advance();
                self.node_from_token(NodeKind::LiteralExpr, &token)
            }
            Tk::Identifier => {
                let token = self.advance();
                if self.at(Tk::LParen) {
                    self.parse_function_call(emitter, token)
                } else {
                    self.node_from_token(NodeKind::IdentifierExpr, &token)
                }
            }
            Tk::LParen => {
                self.advance();
                let expr = self.parse_expression(emitter);
                self.expect(Tk::RParen, "')'", emitter);
                self.parenthesized.insert(expr);
                expr
            }
            _ => {
                let observed = self.current().clone();
                emitter.emit(DiagnosticKind::UnexpectedToken, observed.location.clone(), &["an expression", observed.spelling.as_str()]);
                let node = self.node_from_token(NodeKind::Error, &observed);
                self.tree.mark_error(node);
                if !self.at(Tk::Eof) {
                    self.advance();
                }
                node
            }
        }
    }

    fn parse_function_call(&mut self, emitter: &mut DiagnosticEmitter, callee: Token) -> NodeId {
        let callee_node = self.node_from_token(NodeKind::IdentifierExpr, &callee);
        let open = self.advance(); // '('
        let call_node = self.node_from_token(NodeKind::FunctionCall, &open);
        self.tree.add_child(call_node, callee_node);

        let args = self.add_fixed(NodeId::SENTINEL, NodeKind::ArgumentList, open.location.clone());
        while !self.at(Tk::RParen) && !self.at(Tk::Eof) {
            let arg = self.parse_expression(emitter);
            self.tree.add_child(args, arg);
            if !self.consume_match(Tk::Comma) {
                break;
            }
        }
        self.expect(Tk::RParen, "')'", emitter);
        self.tree.add_child(call_node, args);
        call_node
    }

    fn binary_node(&mut self, op: &Token, lhs: NodeId, rhs: NodeId) -> NodeId {
        let node = self.node_from_token(NodeKind::BinaryExpr, op);
        self.tree.add_child(node, lhs);
        self.tree.add_child(node, rhs);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::source_buffer::SourceBuffer;
    use ziv_shared::AccumulatingDiagnosticConsumer;

    fn parse(source: &str) -> (Tree, AccumulatingDiagnosticConsumer) {
        let buffer = SourceBuffer::from_stdin(source.as_bytes().to_vec()).unwrap();
        let mut consumer = AccumulatingDiagnosticConsumer::new();
        let tree = {
            let mut emitter = DiagnosticEmitter::new(&buffer, &mut consumer);
            let tokens = Lexer::new(&buffer).tokenize(&mut emitter);
            Parser::new(&tokens, buffer.filename()).parse(&mut emitter)
        };
        (tree, consumer)
    }

    #[test]
    fn parses_function_with_return() {
        let (tree, consumer) = parse("fn add(a: int, b: int) -> int:\n    return a + b;\n");
        assert_eq!(consumer.messages().len(), 0);
        let root = tree.root().unwrap();
        assert_eq!(tree.kind(root), NodeKind::FileStart);
        let func = tree.children(root)[0];
        assert_eq!(tree.kind(func), NodeKind::FunctionDecl);
    }

    #[test]
    fn indentation_delimited_body_builds_a_code_block() {
        let (tree, consumer) = parse("fn add(a: int, b: int) -> int:\n    return a + b\n");
        assert_eq!(consumer.messages().len(), 0);
        let root = tree.root().unwrap();
        let func = tree.children(root)[0];
        let body = *tree.children(func).last().unwrap();
        assert_eq!(tree.kind(body), NodeKind::CodeBlock);
        assert_eq!(tree.children(body).len(), 1);
        assert_eq!(tree.kind(tree.children(body)[0]), NodeKind::ReturnStmt);
    }

    #[test]
    fn brace_delimited_body_is_still_accepted() {
        let (tree, consumer) = parse("fn add(a: int, b: int) -> int: { return a + b; }\n");
        assert_eq!(consumer.messages().len(), 0);
        let root = tree.root().unwrap();
        let func = tree.children(root)[0];
        let body = *tree.children(func).last().unwrap();
        assert_eq!(tree.kind(body), NodeKind::CodeBlock);
    }

    #[test]
    fn if_with_indented_then_and_else_branches() {
        let source = "fn f(a: int) -> int:\n    if a:\n        return a;\n    else:\n        return 0;\n";
        let (tree, consumer) = parse(source);
        assert_eq!(consumer.messages().len(), 0);
        let root = tree.root().unwrap();
        let func = tree.children(root)[0];
        let body = *tree.children(func).last().unwrap();
        let if_stmt = tree.children(body)[0];
        assert_eq!(tree.kind(if_stmt), NodeKind::IfStmt);
    }

    #[test]
    fn variable_declaration_without_type_is_reported() {
        let (_, consumer) = parse("let x = 1;\n");
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-2000"));
    }

    #[test]
    fn chained_comparison_is_ambiguous() {
        let (_, consumer) = parse("let x: bool = a < b < c;\n");
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-1101"));
    }

    #[test]
    fn missing_semicolon_recovers_at_next_statement() {
        let (tree, consumer) = parse("let x: int = 1\nlet y: int = 2;\n");
        assert!(!consumer.messages().is_empty());
        let root = tree.root().unwrap();
        assert_eq!(tree.children(root).len(), 2);
    }
}
