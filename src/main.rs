use palc::Parser;
use zlox::{Lox, cli::Cli};

fn main() {
	let cli = Cli::parse();
	let Some(path) = cli.path else {
		eprintln!("Usage: zlox <filename.lox>");
		std::process::exit(1);
	};

	let lox = Lox { debug: cli.debug };
	if let Err(e) = lox.run_file(&path) {
		eprintln!("Failed run file: {e}");
		std::process::exit(1);
	}
}
