use ziv_error::DiagnosticKind;
use ziv_ir::{NodeId, NodeKind, Tree};
use ziv_shared::{DiagnosticEmitter, Symbol, SymbolKind, SymbolTable};
use ziv_types::PrimitiveType;

/// Walks a built AST checking declaration and scoping rules.
///
/// Resolves names and flags redeclarations, but does not type-check
/// expressions or resolve calls against function signatures.
pub struct SemanticAnalyzer<'a> {
    tree: &'a Tree,
    symbols: SymbolTable,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        SemanticAnalyzer {
            tree,
            symbols: SymbolTable::new(),
        }
    }

    /// Checks the whole tree from its root. Returns `false` on the first
    /// error, to keep the (currently untyped) downstream invariants simple:
    /// callers are not expected to run further stages over a tree this
    /// checker already rejected.
    pub fn check(mut self, emitter: &mut DiagnosticEmitter) -> bool {
        let Some(root) = self.tree.root() else {
            return true;
        };
        self.check_children(root, emitter)
    }

    fn check_node(&mut self, node: NodeId, emitter: &mut DiagnosticEmitter) -> bool {
        if self.tree.has_error(node) {
            return true;
        }
        match self.tree.kind(node) {
            NodeKind::VariableDecl => self.check_variable_decl(node, emitter),
            NodeKind::FunctionDecl => self.check_function_decl(node, emitter),
            _ => self.check_children(node, emitter),
        }
    }

    fn check_children(&mut self, node: NodeId, emitter: &mut DiagnosticEmitter) -> bool {
        for child in self.tree.children(node).to_vec() {
            if !self.check_node(child, emitter) {
                return false;
            }
        }
        true
    }

    /// Extracts the declared name and type, rejecting malformed nodes
    /// (missing name or type child) without crashing. A name already bound
    /// in the current scope is `VariableRedeclaration`.
    fn check_variable_decl(&mut self, node: NodeId, emitter: &mut DiagnosticEmitter) -> bool {
        let children = self.tree.children(node).to_vec();
        let Some(&name_node) = children.first() else {
            return true;
        };
        if self.tree.kind(name_node) != NodeKind::IdentifierExpr {
            return true;
        }
        let name = self.tree.spelling(name_node).to_string();

        let declared_type = children
            .get(1)
            .filter(|&&n| self.tree.kind(n) == NodeKind::TypeSpec)
            .and_then(|&n| PrimitiveType::from_keyword(self.tree.spelling(n)))
            .unwrap_or(PrimitiveType::None);

        if self.symbols.is_declared_in_current_scope(&name) {
            let Some(location) = self.tree.location(node).cloned() else {
                return true;
            };
            emitter.emit(DiagnosticKind::VariableRedeclaration, location, &[&name]);
            return false;
        }
        self.symbols.define(Symbol::new(name, SymbolKind::Variable, declared_type));

        for &child in children.iter().skip(2) {
            if self.tree.kind(child) == NodeKind::VariableInit && !self.check_children(child, emitter) {
                return false;
            }
        }
        true
    }

    /// Registers the function in the *outer* scope, then enters a nested
    /// scope for parameters and the body.
    fn check_function_decl(&mut self, node: NodeId, emitter: &mut DiagnosticEmitter) -> bool {
        let children = self.tree.children(node).to_vec();
        let name = children
            .iter()
            .find(|&&n| self.tree.kind(n) == NodeKind::FunctionName)
            .map(|&n| self.tree.spelling(n).to_string());

        if let Some(name) = &name {
            if self.symbols.is_declared_in_current_scope(name) {
                let Some(location) = self.tree.location(node).cloned() else {
                    return true;
                };
                emitter.emit(DiagnosticKind::VariableRedeclaration, location, &[name]);
                return false;
            }
            self.symbols.define(Symbol::new(name.clone(), SymbolKind::Function, PrimitiveType::None));
        }

        self.symbols.push_scope();
        let ok = self.check_function_body(&children, emitter);
        self.symbols.pop_scope();
        ok
    }

    fn check_function_body(&mut self, children: &[NodeId], emitter: &mut DiagnosticEmitter) -> bool {
        for &child in children {
            match self.tree.kind(child) {
                NodeKind::ParameterList => {
                    for &param in self.tree.children(child).to_vec().iter() {
                        if self.tree.kind(param) != NodeKind::Parameter {
                            continue;
                        }
                        let param_name = self.tree.spelling(param).to_string();
                        let param_type = self
                            .tree
                            .children(param)
                            .first()
                            .and_then(|&n| PrimitiveType::from_keyword(self.tree.spelling(n)))
                            .unwrap_or(PrimitiveType::None);
                        if self.symbols.is_declared_in_current_scope(&param_name) {
                            let Some(location) = self.tree.location(param).cloned() else {
                                continue;
                            };
                            emitter.emit(DiagnosticKind::VariableRedeclaration, location, &[&param_name]);
                            return false;
                        }
                        self.symbols.define(Symbol::new(param_name, SymbolKind::Parameter, param_type));
                    }
                }
                NodeKind::CodeBlock => {
                    if !self.check_children(child, emitter) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::source_buffer::SourceBuffer;
    use ziv_shared::AccumulatingDiagnosticConsumer;

    fn check(source: &str) -> (bool, AccumulatingDiagnosticConsumer) {
        let buffer = SourceBuffer::from_stdin(source.as_bytes().to_vec()).unwrap();
        let mut consumer = AccumulatingDiagnosticConsumer::new();
        let ok = {
            let mut emitter = DiagnosticEmitter::new(&buffer, &mut consumer);
            let tokens = Lexer::new(&buffer).tokenize(&mut emitter);
            let tree = Parser::new(&tokens, buffer.filename()).parse(&mut emitter);
            SemanticAnalyzer::new(&tree).check(&mut emitter)
        };
        (ok, consumer)
    }

    #[test]
    fn duplicate_top_level_variable_is_rejected() {
        let (ok, consumer) = check("let x: int = 1;\nlet x: int = 2;\n");
        assert!(!ok);
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-2001"));
    }

    #[test]
    fn shadowing_a_parameter_inside_the_body_is_allowed() {
        let (ok, _) = check("fn f(x: int) -> int:\n    let y: int = x;\n    return y;\n");
        assert!(ok);
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let (ok, consumer) = check("fn f(x: int, x: int) -> int:\n    return x;\n");
        assert!(!ok);
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-2001"));
    }

    #[test]
    fn duplicate_function_names_are_rejected() {
        let (ok, consumer) = check("fn f() -> int:\n    return 1;\nfn f() -> int:\n    return 2;\n");
        assert!(!ok);
        assert!(consumer.messages().iter().any(|m| m.code == "ZIV-2001"));
    }
}
