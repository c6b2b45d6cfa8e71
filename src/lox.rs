use std::{fs::read_to_string, io::Write, path::Path};

use anyhow::Context;

use crate::{compiler::Compiler, context::GlobalContext, debug, scanner::Scanner, vm::Vm};

/// The whole pipeline: source text in, printed values out.
pub struct Lox {
	/// Dump tokens and bytecode to stderr, plus the stack on interpreter bugs
	pub debug: bool,
}

impl Lox {
	pub fn run_file(&self, path: &Path) -> crate::Result<()> {
		let source = read_to_string(path).context("Failed open source file")?;
		self.run(&source, &mut std::io::stdout())
	}

	/// Scan, compile and execute `source`, writing `print` output to `out`.
	pub fn run(&self, source: &str, out: &mut impl Write) -> crate::Result<()> {
		let mut context = GlobalContext::new(self.debug);

		let tokens = Scanner::new(source).scan_tokens()?;
		if self.debug {
			debug::dump_tokens(&tokens);
		}

		let chunk = Compiler::new(tokens, &mut context).compile()?;
		if self.debug {
			debug::disassemble_chunk(&chunk, "main");
		}

		Vm::new(&chunk).run(&mut context, out)?;
		Ok(())
	}
}
