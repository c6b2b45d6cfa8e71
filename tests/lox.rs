use std::path::PathBuf;

use zlox::Lox;

fn run(source: &str) -> zlox::Result<String> {
	let mut out = Vec::new();
	Lox { debug: false }.run(source, &mut out)?;
	Ok(String::from_utf8(out).expect("print output is UTF-8"))
}

fn output(source: &str) -> String { run(source).expect("program failed") }

#[test]
fn test_lox_file() {
	let lox = Lox { debug: false };
	let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("test.lox");
	let result = lox.run_file(&path);
	assert!(result.is_ok());
}

#[test]
fn precedence_chains() {
	assert_eq!(output("print -1.2 + 3 * 5 < 3 == false;"), "true\n");
	assert_eq!(output(r#"print -1.2 + 3 * 5 < 3 == "foobar";"#), "false\n");
	assert_eq!(output("print 1 + 2 * 3;"), "7\n");
	assert_eq!(output("print 10 - 2 - 3;"), "5\n");
	assert_eq!(output("print 16 / 4 / 2;"), "2\n");
}

#[test]
fn string_interning_across_concatenation() {
	assert_eq!(output(r#"print "foo" + "bar" == "foobar";"#), "true\n");
	assert_eq!(output(r#"print "foo" + "bar" == "foo" + "bar";"#), "true\n");
	assert_eq!(output(r#"print "x" == "x";"#), "true\n");
	assert_eq!(output(r#"print "x" == "y";"#), "false\n");
}

#[test]
fn globals_and_locals() {
	assert_eq!(output("var x = 10; { var x = 20; print x; } print x;"), "20\n10\n");
	assert_eq!(output("var a = 1; a = a + 2; print a;"), "3\n");
	assert_eq!(output("var s = \"a\"; { var s = s + \"b\"; print s; } print s;"), "ab\na\n");
	assert_eq!(output("{ var a = 1; var b = 2; { var c = a + b; print c; } }"), "3\n");
}

#[test]
fn every_print_gets_its_own_newline() {
	assert_eq!(output("print 1; print 2; print 3;"), "1\n2\n3\n");
	assert_eq!(output("print nil;"), "nil\n");
}

#[test]
fn compile_errors_abort_before_any_output() {
	assert!(run("print 1; print ;").is_err());
	assert!(run("a + b = c;").is_err());
	assert!(run("{ print 1;").is_err());
	assert!(run("var x;").is_err());
}

#[test]
fn runtime_errors_surface_through_the_driver() {
	assert!(run("print undeclared;").is_err());
	assert!(run(r#"print 1 + "one";"#).is_err());
	assert!(run("print -nil;").is_err());
}
