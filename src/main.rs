mod ast_printer;
mod cli;
mod error;
mod exit;
mod pipeline;

use std::path::Path;

use clap::Parser as ClapParser;
use ziv_shared::{ConsoleDiagnosticConsumer, DiagnosticEmitter, PhaseContext};

use cli::{Cli, Commands};
use error::{CliError, CliResult};
use pipeline::PipelineOptions;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Toolchain {
            file,
            source,
            lexer,
            dump_tree,
        }) => run_toolchain(&file, source, lexer, dump_tree),
        None => exit::with_code(exit::Code::Usage, "Error: No command specified"),
    };

    if let Err(err) = result {
        exit::with_code(err.exit_code(), &err.to_string());
    }

    PhaseContext::print_summary();
}

fn run_toolchain(file: &str, dump_source: bool, dump_lexer: bool, dump_tree: bool) -> CliResult<()> {
    let buffer = ziv_frontend::SourceBuffer::from_file(Path::new(file)).ok_or_else(|| CliError::Generic {
        message: format!(
            "error: no buffer for '{}' (expected a non-empty file with extension .z or .ziv)",
            file
        ),
        code: exit::Code::NoInput,
    })?;

    if dump_source {
        println!("file: {}", buffer.filename());
        println!("lines: {}", buffer.line_count());
        println!("--- contents ---");
        println!("{}", String::from_utf8_lossy(buffer.contents()));
    }

    let mut consumer = ConsoleDiagnosticConsumer::new();
    let output = {
        let mut emitter = DiagnosticEmitter::new(&buffer, &mut consumer);
        pipeline::run(&buffer, &PipelineOptions::default(), &mut emitter)
    };

    if dump_lexer {
        for token in output.tokens.iter() {
            println!("{}", token);
        }
    }

    if dump_tree {
        ast_printer::print_tree(&output.tree);
    }

    if !output.semantic_ok {
        return Err(CliError::Generic {
            message: format!("error: semantic analysis failed for '{}'", file),
            code: exit::Code::Software,
        });
    }

    Ok(())
}
