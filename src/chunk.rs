//! The compilation unit: bytecode plus the pools its operands index.
//!
//! Instructions are one opcode byte optionally followed by a single operand
//! byte, so both pools are capped at 256 entries. Exceeding a cap is a
//! compile error, not a chunk panic; the `add_*` methods report it as `None`.

use std::rc::Rc;

use OpCode::*;

use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct Chunk {
	/// Emitted bytecode
	pub code:      Vec<u8>,
	/// Literal pool, indexed by a one-byte operand
	pub constants: Vec<Value>,
	/// Variable-name pool, indexed by a one-byte operand; entries are
	/// interned so the globals table can share their storage
	pub varnames:  Vec<Rc<str>>,
}

impl Chunk {
	pub fn emit(&mut self, op: OpCode) { self.code.push(op as u8); }

	pub fn emit_with_operand(&mut self, op: OpCode, operand: u8) {
		self.code.push(op as u8);
		self.code.push(operand);
	}

	/// Append a constant and return its index, `None` once the pool is full.
	pub fn add_constant(&mut self, value: Value) -> Option<u8> {
		let index = u8::try_from(self.constants.len()).ok()?;
		self.constants.push(value);
		Some(index)
	}

	/// Append a variable name and return its index, `None` once full.
	pub fn add_varname(&mut self, name: Rc<str>) -> Option<u8> {
		let index = u8::try_from(self.varnames.len()).ok()?;
		self.varnames.push(name);
		Some(index)
	}
}

/// One bytecode instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum OpCode {
	/// Halt; the operand stack must be empty
	Exit,
	/// Discard the top of the stack
	Pop,
	/// Pop and write the value plus a newline to the output writer
	Print,
	/// Push `constants[operand]`
	GetConst,
	/// Pop into a fresh `varnames[operand]` global binding
	DeclareGlobal,
	/// Overwrite an existing global; keeps the value on the stack
	SetGlobal,
	/// Push the value of `varnames[operand]`
	GetGlobal,
	/// Copy the top of the stack into slot `operand`; does not pop
	SetLocal,
	/// Push a copy of slot `operand`
	GetLocal,
	Add,
	Subtract,
	Multiply,
	Divide,
	Negate,
	LessThan,
	GreaterThan,
	Equals,
}

impl OpCode {
	const ALL: [OpCode; 17] = [
		Exit,
		Pop,
		Print,
		GetConst,
		DeclareGlobal,
		SetGlobal,
		GetGlobal,
		SetLocal,
		GetLocal,
		Add,
		Subtract,
		Multiply,
		Divide,
		Negate,
		LessThan,
		GreaterThan,
		Equals,
	];

	/// Decode a fetched byte; `None` for bytes outside the instruction set.
	pub fn decode(byte: u8) -> Option<Self> { Self::ALL.get(usize::from(byte)).copied() }

	/// Number of operand bytes following the opcode byte.
	pub fn operand_width(self) -> usize {
		match self {
			GetConst | DeclareGlobal | SetGlobal | GetGlobal | SetLocal | GetLocal => 1,
			_ => 0,
		}
	}
}
