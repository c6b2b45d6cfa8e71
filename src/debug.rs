//! `--debug` dumps: the token stream, a chunk disassembly and, when the VM
//! finds values stranded on the stack, the stack itself. Everything goes to
//! stderr so redirected program output stays clean.

use crate::{chunk::{Chunk, OpCode}, scanner::Token, value::Value};

pub(crate) fn dump_tokens(tokens: &[Token]) {
	eprintln!("== tokens ==");
	for token in tokens {
		eprintln!("{:>4} {:?} '{}'", token.line, token.r#type, token.lexeme);
	}
}

pub(crate) fn disassemble_chunk(chunk: &Chunk, name: &str) {
	eprintln!("== {name} ==");
	let mut offset = 0;
	while offset < chunk.code.len() {
		offset = disassemble_instruction(chunk, offset);
	}
}

/// Print one instruction and return the offset of the next.
fn disassemble_instruction(chunk: &Chunk, offset: usize) -> usize {
	let byte = chunk.code[offset];
	let Some(op) = OpCode::decode(byte) else {
		eprintln!("{offset:04} Unknown opcode 0x{byte:02x}");
		return offset + 1;
	};
	if op.operand_width() == 0 {
		eprintln!("{offset:04} {op:?}");
		return offset + 1;
	}

	let Some(operand) = chunk.code.get(offset + 1).copied() else {
		eprintln!("{offset:04} {op:?} <missing operand>");
		return chunk.code.len();
	};
	let index = usize::from(operand);
	match op {
		OpCode::GetConst => match chunk.constants.get(index) {
			Some(value) => eprintln!("{offset:04} {op:?} {operand} ({value})"),
			None => eprintln!("{offset:04} {op:?} {operand} (out of bounds)"),
		},
		OpCode::DeclareGlobal | OpCode::SetGlobal | OpCode::GetGlobal => match chunk.varnames.get(index) {
			Some(name) => eprintln!("{offset:04} {op:?} {operand} ({name})"),
			None => eprintln!("{offset:04} {op:?} {operand} (out of bounds)"),
		},
		_ => eprintln!("{offset:04} {op:?} {operand}"),
	}
	offset + 1 + op.operand_width()
}

pub(crate) fn dump_stack(stack: &[Value]) {
	eprintln!("== stack ==");
	for (slot, value) in stack.iter().enumerate() {
		eprintln!("{slot:>4}: {value}");
	}
}
