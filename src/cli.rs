use clap::{Parser as ClapParser, Subcommand};

/// Command line interface for the ziv front-end toolchain.
#[derive(ClapParser)]
#[command(version, about = "ziv front-end toolchain", arg_required_else_help = false)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands: just `toolchain`.
#[derive(Subcommand)]
pub enum Commands {
    /// Lex, parse, and (by default) semantically check a ziv source file.
    Toolchain {
        /// The `.z`/`.ziv` source file to process.
        file: String,

        /// Dump the source buffer's metadata and contents.
        #[arg(long)]
        source: bool,

        /// Dump the lexed token stream.
        #[arg(long)]
        lexer: bool,

        /// Lex and parse, then print the resulting AST.
        #[arg(long = "dump-tree")]
        dump_tree: bool,
    },
}
