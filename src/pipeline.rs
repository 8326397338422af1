use ziv_frontend::{Lexer, Parser, SemanticAnalyzer, SourceBuffer, TokenBuffer};
use ziv_ir::Tree;
use ziv_shared::{CompilationPhase, DiagnosticEmitter, PhaseGuard};

/// The small configuration surface threaded through the pipeline.
pub struct PipelineOptions {
    pub indent_width: usize,
    pub check_semantics: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            indent_width: 4,
            check_semantics: true,
        }
    }
}

/// Everything the toolchain sub-command needs to honor `--source`,
/// `--lexer`, and `--dump-tree` after running the pipeline once.
pub struct PipelineOutput {
    pub tokens: TokenBuffer,
    pub tree: Tree,
    pub semantic_ok: bool,
}

/// Runs the lexer, then the parser, then (optionally) the semantic
/// checker over `buffer`, entering a [`PhaseGuard`] for each stage.
///
/// A guard's `Drop` terminates the process if its stage recorded errors
/// and the stage isn't `Parsing`, so a lexer failure never reaches the
/// parser and a semantic failure never reaches the caller.
pub fn run(buffer: &SourceBuffer, options: &PipelineOptions, emitter: &mut DiagnosticEmitter) -> PipelineOutput {
    let tokens = {
        let _guard = PhaseGuard::enter(CompilationPhase::Lexing);
        Lexer::with_indent_width(buffer, options.indent_width).tokenize(emitter)
    };

    let tree = {
        let _guard = PhaseGuard::enter(CompilationPhase::Parsing);
        Parser::new(&tokens, buffer.filename()).parse(emitter)
    };

    let semantic_ok = if options.check_semantics {
        let _guard = PhaseGuard::enter(CompilationPhase::Semantic);
        SemanticAnalyzer::new(&tree).check(emitter)
    } else {
        true
    };

    PipelineOutput { tokens, tree, semantic_ok }
}
