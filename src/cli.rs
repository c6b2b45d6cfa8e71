use std::path::PathBuf;

use palc::Parser;

/// CLI arguments
#[derive(Parser)]
#[command(name = "zlox", after_long_help = "This is zooeywm's lox bytecode compiler implementation.")]
pub struct Cli {
	/// Lox source file to compile and run
	pub path: Option<PathBuf>,

	/// Dump tokens and bytecode to stderr, and the stack on interpreter bugs
	#[arg(long)]
	pub debug: bool,
}
