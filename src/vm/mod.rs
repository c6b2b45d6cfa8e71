//! The stack-based virtual machine.
//!
//! Execution is the classic fetch/decode/dispatch loop: read the byte at
//! `ip`, advance, switch on the opcode. Operands are read by the same
//! one-byte fetch. Values flow through a single operand stack; locals are
//! plain stack slots the compiler addressed ahead of time, globals live in
//! a hash table keyed by the chunk's interned varnames.
//!
//! Type errors are caught by peeking before popping, so the stack is never
//! left half-consumed when an instruction fails. A well-formed chunk leaves
//! the stack empty at `Exit`; anything else is reported as a compiler bug
//! rather than papered over.

use std::{io::Write, rc::Rc};

use anyhow::{Context, anyhow};

use crate::{chunk::{Chunk, OpCode}, context::GlobalContext, debug, error::vm::VmError, table::Table, value::{HeapObject, Value}};

pub(crate) struct Vm<'c> {
	/// The compiled unit being executed
	chunk:   &'c Chunk,
	/// Index of the next byte to fetch from `chunk.code`
	ip:      usize,
	/// Operand stack; locals live at their compile-time slots
	stack:   Vec<Value>,
	/// Global bindings, keyed by storage shared with `chunk.varnames`
	globals: Table,
}

impl<'c> Vm<'c> {
	pub fn new(chunk: &'c Chunk) -> Self { Self { chunk, ip: 0, stack: Vec::new(), globals: Table::new() } }

	/// Run the chunk to `Exit`, writing `print` output to `out`.
	pub fn run(&mut self, context: &mut GlobalContext, out: &mut impl Write) -> Result<(), VmError> {
		loop {
			let byte = self.read_byte()?;
			let op = OpCode::decode(byte).ok_or_else(|| anyhow!("Unknown opcode 0x{byte:02x}"))?;
			match op {
				OpCode::Exit => {
					if self.stack.is_empty() {
						return Ok(());
					}
					if context.debug {
						debug::dump_stack(&self.stack);
					}
					return Err(VmError::StackNotEmpty(self.stack.len()));
				}
				OpCode::Pop => {
					self.pop()?;
				}
				OpCode::Print => {
					let value = self.pop()?;
					writeln!(out, "{value}").context("Failed write print output")?;
				}
				OpCode::GetConst => {
					let index = usize::from(self.read_byte()?);
					let value = self
						.chunk
						.constants
						.get(index)
						.cloned()
						.ok_or_else(|| anyhow!("Constant index {index} out of bounds"))?;
					self.stack.push(value);
				}
				OpCode::DeclareGlobal => {
					let name = self.read_varname()?;
					let value = self.pop()?;
					self.globals.insert(name, value);
				}
				OpCode::SetGlobal => {
					let name = self.read_varname()?;
					if !self.globals.has_key(&name) {
						return Err(VmError::UndeclaredVariable(name.to_string()));
					}
					// Assignment is an expression; its value stays put.
					let value = self.peek(0)?.clone();
					self.globals.insert(name, value);
				}
				OpCode::GetGlobal => {
					let name = self.read_varname()?;
					let value = self
						.globals
						.find(&name)
						.ok_or_else(|| VmError::UndeclaredVariable(name.to_string()))?
						.clone();
					self.stack.push(value);
				}
				OpCode::SetLocal => {
					let slot = usize::from(self.read_byte()?);
					let value = self.peek(0)?.clone();
					*self
						.stack
						.get_mut(slot)
						.ok_or_else(|| anyhow!("Local slot {slot} out of bounds"))? = value;
				}
				OpCode::GetLocal => {
					let slot = usize::from(self.read_byte()?);
					let value = self
						.stack
						.get(slot)
						.cloned()
						.ok_or_else(|| anyhow!("Local slot {slot} out of bounds"))?;
					self.stack.push(value);
				}
				OpCode::Add => self.add(context)?,
				OpCode::Subtract => self.binary_number("-", |a, b| Value::Number(a - b))?,
				OpCode::Multiply => self.binary_number("*", |a, b| Value::Number(a * b))?,
				OpCode::Divide => self.binary_number("/", |a, b| Value::Number(a / b))?,
				OpCode::Negate => {
					let Value::Number(n) = self.peek(0)? else {
						return Err(VmError::UnaryOperationError(format!("- {}", self.peek(0)?)));
					};
					let value = Value::Number(-n);
					self.pop()?;
					self.stack.push(value);
				}
				OpCode::LessThan => self.binary_number("<", |a, b| Value::Boolean(a < b))?,
				OpCode::GreaterThan => self.binary_number(">", |a, b| Value::Boolean(a > b))?,
				OpCode::Equals => {
					let b = self.pop()?;
					let a = self.pop()?;
					self.stack.push(Value::Boolean(a.equals(&b)));
				}
			}
		}
	}

	/// `Add` is the one polymorphic operator: numbers add, strings
	/// concatenate. The concatenation result is interned so the identity
	/// comparison in `Equals` keeps working for computed strings.
	fn add(&mut self, context: &mut GlobalContext) -> Result<(), VmError> {
		match (self.peek(1)?, self.peek(0)?) {
			(Value::Number(a), Value::Number(b)) => {
				let value = Value::Number(a + b);
				self.pop()?;
				self.pop()?;
				self.stack.push(value);
			}
			(Value::Object(a), Value::Object(b)) => {
				let (HeapObject::String(a), HeapObject::String(b)) = (a.as_ref(), b.as_ref());
				let combined = format!("{a}{b}");
				self.pop()?;
				self.pop()?;
				self.stack.push(context.new_string(&combined));
			}
			(a, b) => return Err(VmError::BinaryOperationError(format!("{a} + {b}"))),
		}
		Ok(())
	}

	/// Shared path for the numbers-only binary operators.
	fn binary_number(&mut self, operator: &str, apply: fn(f32, f32) -> Value) -> Result<(), VmError> {
		let (Value::Number(a), Value::Number(b)) = (self.peek(1)?, self.peek(0)?) else {
			let message = format!("{} {operator} {}", self.peek(1)?, self.peek(0)?);
			return Err(VmError::BinaryOperationError(message));
		};
		let value = apply(*a, *b);
		self.pop()?;
		self.pop()?;
		self.stack.push(value);
		Ok(())
	}

	/// Fetch the byte at `ip` and advance.
	fn read_byte(&mut self) -> Result<u8, VmError> {
		let byte = self
			.chunk
			.code
			.get(self.ip)
			.copied()
			.ok_or_else(|| anyhow!("Instruction pointer ran past the end of the chunk"))?;
		self.ip += 1;
		Ok(byte)
	}

	/// Fetch an operand byte and resolve it in the varname pool.
	fn read_varname(&mut self) -> Result<Rc<str>, VmError> {
		let index = usize::from(self.read_byte()?);
		Ok(self
			.chunk
			.varnames
			.get(index)
			.cloned()
			.ok_or_else(|| anyhow!("Variable name index {index} out of bounds"))?)
	}

	/// Read `distance` values below the top without popping.
	fn peek(&self, distance: usize) -> Result<&Value, VmError> {
		let index = self
			.stack
			.len()
			.checked_sub(distance + 1)
			.ok_or_else(|| anyhow!("Operand stack underflow"))?;
		Ok(&self.stack[index])
	}

	fn pop(&mut self) -> Result<Value, VmError> {
		Ok(self.stack.pop().ok_or_else(|| anyhow!("Operand stack underflow"))?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{compiler::Compiler, scanner::Scanner};

	fn run(source: &str) -> Result<String, VmError> {
		let mut context = GlobalContext::new(false);
		let tokens = Scanner::new(source).scan_tokens().expect("scan failure");
		let chunk = Compiler::new(tokens, &mut context).compile().expect("compile failure");
		let mut out = Vec::new();
		Vm::new(&chunk).run(&mut context, &mut out)?;
		Ok(String::from_utf8(out).expect("print output is UTF-8"))
	}

	fn output(source: &str) -> String { run(source).expect("runtime failure") }

	#[test]
	fn arithmetic_and_formatting() {
		assert_eq!(output("print 1 + 2;"), "3\n");
		assert_eq!(output("print 7 / 2;"), "3.5\n");
		assert_eq!(output("print -1.2 + 3 * 5;"), "13.8\n");
		assert_eq!(output("print nil;"), "nil\n");
		assert_eq!(output("print true;"), "true\n");
		assert_eq!(output(r#"print "raw text";"#), "raw text\n");
	}

	#[test]
	fn comparison_and_equality() {
		assert_eq!(output("print 1 < 2;"), "true\n");
		assert_eq!(output("print 1 > 2;"), "false\n");
		assert_eq!(output("print 1 == 1;"), "true\n");
		assert_eq!(output("print nil == nil;"), "true\n");
		// Different tags are unequal, never an error.
		assert_eq!(output("print 1 == true;"), "false\n");
		assert_eq!(output(r#"print 1 == "1";"#), "false\n");
	}

	#[test]
	fn string_concat_reinterns() {
		assert_eq!(output(r#"print "foo" + "bar";"#), "foobar\n");
		assert_eq!(output(r#"print "foo" + "bar" == "foobar";"#), "true\n");
		assert_eq!(output(r#"print "foo" + "bar" == "foo" + "bar";"#), "true\n");
		assert_eq!(output(r#"print "" + "x" == "x";"#), "true\n");
	}

	#[test]
	fn globals_declare_assign_read() {
		assert_eq!(output("var a = 1; a = a + 2; print a;"), "3\n");
		assert_eq!(output("var a = 1; var b = 2; print a + b;"), "3\n");
		// Redeclaration overwrites.
		assert_eq!(output("var a = 1; var a = 2; print a;"), "2\n");
		// Assignment is an expression statement; its value gets popped.
		assert_eq!(output("var a = 1; a = 5; print a;"), "5\n");
	}

	#[test]
	fn locals_shadow_and_unwind() {
		assert_eq!(output("var x = 10; { var x = 20; print x; } print x;"), "20\n10\n");
		assert_eq!(output("{ var a = 1; { var b = a + 1; print b; } print a; }"), "2\n1\n");
		assert_eq!(output("{ var a = 1; a = 9; print a; }"), "9\n");
	}

	#[test]
	fn type_mismatches_are_runtime_errors() {
		assert!(matches!(run(r#"print 1 + "x";"#), Err(VmError::BinaryOperationError(_))));
		assert!(matches!(run(r#"print "a" - "b";"#), Err(VmError::BinaryOperationError(_))));
		assert!(matches!(run(r#"print "a" < "b";"#), Err(VmError::BinaryOperationError(_))));
		assert!(matches!(run("print -true;"), Err(VmError::UnaryOperationError(_))));
		assert!(matches!(run("print nil + nil;"), Err(VmError::BinaryOperationError(_))));
	}

	#[test]
	fn undeclared_globals_fail_at_runtime() {
		assert!(matches!(run("print missing;"), Err(VmError::UndeclaredVariable(name)) if name == "missing"));
		assert!(matches!(run("missing = 1;"), Err(VmError::UndeclaredVariable(name)) if name == "missing"));
		// Declared afterwards does not help; execution is strictly linear.
		assert!(run("print a; var a = 1;").is_err());
	}

	#[test]
	fn exit_requires_an_empty_stack() {
		let mut chunk = Chunk::default();
		let index = chunk.add_constant(Value::Number(1.0)).expect("pool has room");
		chunk.emit_with_operand(OpCode::GetConst, index);
		chunk.emit(OpCode::Exit);
		let mut context = GlobalContext::new(false);
		let mut out = Vec::new();
		let result = Vm::new(&chunk).run(&mut context, &mut out);
		assert!(matches!(result, Err(VmError::StackNotEmpty(1))));
	}

	#[test]
	fn statements_leave_the_stack_balanced() {
		// Expression statements, prints and whole blocks all net to zero,
		// so any program that compiles runs to a clean Exit.
		assert_eq!(output("1 + 2; { var a = 3; a; } print 4;"), "4\n");
		assert_eq!(run("").unwrap(), "");
	}
}
