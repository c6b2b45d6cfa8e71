//! Single-pass Pratt compiler: tokens in, bytecode out.
//!
//! There is no syntax tree. Each handler emits instructions the moment it
//! recognizes its input, so precedence has to be settled by the
//! `parse_precedence` climb, assignability has to be decided while the
//! target is being read, and scoping has to be resolved while the runtime
//! stack layout is still known. Locals never exist at runtime by name: a
//! local's slot index equals the operand-stack position its initializer
//! leaves its value at, because statements are stack-neutral and blocks pop
//! their locals in reverse declaration order on exit.
//!
//! |Name|Operators|Associates
//! --|--|--
//! Equality|==|Left
//! Comparison|< >|Left
//! Term|+ -|Left
//! Factor|* /|Left
//! Unary|-|Right
//!
//! Statement grammar:
//!
//! ``` BNF
//! program     -> declaration* EOF ;
//! declaration -> block | statement ;
//! block       -> "{" declaration* "}" ;
//! statement   -> printStmt | varDecl | exprStmt ;
//! printStmt   -> "print" expression ";" ;
//! varDecl     -> "var" IDENTIFIER "=" expression ";" ;
//! exprStmt    -> expression ";" ;
//! ```

mod rules;

use std::{iter::Peekable, vec::IntoIter};

use TokenType::*;
use anyhow::{Context, anyhow};
use rules::{ParseRule, Precedence};

use crate::{chunk::{Chunk, OpCode}, context::GlobalContext, error::compiler::{CompileError, CompileErrorType, CompilerError}, scanner::{Token, TokenType}, value::Value};

/// A block-scoped variable. Its index in `Compiler::locals` is the operand
/// stack slot holding its value at runtime.
struct Local<'s> {
	/// Identifier slice from the source
	name:  &'s str,
	/// Nesting depth of the declaring block, 1-based
	depth: u8,
}

pub(crate) struct Compiler<'s, 'ctx> {
	/// The tokens to compile
	tokens:      Peekable<IntoIter<Token<'s>>>,
	/// Interning and object registry shared with the VM
	context:     &'ctx mut GlobalContext,
	/// The chunk being built
	chunk:       Chunk,
	/// Active locals, newest last
	locals:      Vec<Local<'s>>,
	/// Current block nesting depth; 0 means top level
	scope_depth: u8,
}

impl<'s, 'ctx> Compiler<'s, 'ctx> {
	pub fn new(tokens: Vec<Token<'s>>, context: &'ctx mut GlobalContext) -> Self {
		Self {
			tokens: tokens.into_iter().peekable(),
			context,
			chunk: Chunk::default(),
			locals: Vec::new(),
			scope_depth: 0,
		}
	}

	/// Compile the whole token stream into a chunk terminated by `Exit`.
	pub fn compile(mut self) -> Result<Chunk, CompilerError> {
		while !matches!(self.peek()?.r#type, Eof) {
			self.declaration()?;
		}
		self.advance()?; // consume EOF
		if let Some(stray) = self.tokens.next() {
			return Err(CompileError::new(stray.line, CompileErrorType::UnexpectedEof).into());
		}
		self.chunk.emit(OpCode::Exit);
		Ok(self.chunk)
	}

	fn declaration(&mut self) -> Result<(), CompilerError> {
		match self.peek()?.r#type {
			LeftBrace => self.block(),
			_ => self.statement(),
		}
	}

	fn statement(&mut self) -> Result<(), CompilerError> {
		match self.peek()?.r#type {
			Print => self.print_statement(),
			Var => self.var_declaration(),
			_ => self.expression_statement(),
		}
	}

	fn block(&mut self) -> Result<(), CompilerError> {
		self.advance()?; // consume '{'
		self.scope_depth = self.scope_depth.checked_add(1).context("Block nesting exceeds 255 levels")?;
		loop {
			match self.peek()?.r#type {
				RightBrace => break,
				Eof => {
					let line = self.peek()?.line;
					return Err(CompileError::new(line, CompileErrorType::UnterminatedBlock).into());
				}
				_ => self.declaration()?,
			}
		}
		self.advance()?; // consume '}'

		// The block's locals sit on top of the operand stack; popping them
		// here keeps every statement stack-neutral.
		while self.locals.last().is_some_and(|local| local.depth == self.scope_depth) {
			self.locals.pop();
			self.chunk.emit(OpCode::Pop);
		}
		self.scope_depth -= 1;
		Ok(())
	}

	fn print_statement(&mut self) -> Result<(), CompilerError> {
		self.advance()?; // consume 'print'
		self.expression()?;
		self.expect_semicolon()?;
		self.chunk.emit(OpCode::Print);
		Ok(())
	}

	fn var_declaration(&mut self) -> Result<(), CompilerError> {
		self.advance()?; // consume 'var'
		let name = self.advance()?;
		if !matches!(name.r#type, Identifier) {
			return Err(CompileError::new(name.line, CompileErrorType::ExpectVariableName).into());
		}
		let equal = self.advance()?;
		if !matches!(equal.r#type, Equal) {
			return Err(CompileError::new(equal.line, CompileErrorType::ExpectInitializer).into());
		}
		self.expression()?;
		self.expect_semicolon()?;

		if self.scope_depth == 0 {
			let index = self.add_varname(&name)?;
			self.chunk.emit_with_operand(OpCode::DeclareGlobal, index);
		} else {
			self.declare_local(&name)?;
		}
		Ok(())
	}

	fn expression_statement(&mut self) -> Result<(), CompilerError> {
		self.expression()?;
		self.expect_semicolon()?;
		self.chunk.emit(OpCode::Pop);
		Ok(())
	}

	fn expression(&mut self) -> Result<(), CompilerError> { self.parse_precedence(Precedence::Assignment) }

	/// The Pratt climb. Consumes one token as a prefix, then folds infix
	/// operators while their binding strength is at least `precedence`.
	fn parse_precedence(&mut self, precedence: Precedence) -> Result<(), CompilerError> {
		let token = self.advance()?;
		let can_assign = precedence <= Precedence::Assignment;
		match Self::rule(token.r#type).prefix {
			Some(prefix) => prefix(self, &token, can_assign)?,
			None => {
				let found = token.lexeme.to_string();
				return Err(CompileError::new(token.line, CompileErrorType::ExpressionExpected(found)).into());
			}
		}

		while Self::rule(self.peek()?.r#type).precedence >= precedence {
			let operator = self.advance()?;
			let infix = Self::rule(operator.r#type)
				.infix
				.ok_or_else(|| anyhow!("Missing infix rule for {:?}", operator.r#type))?;
			infix(self, &operator)?;
		}

		// An `=` still pending here could not bind to anything assignable.
		if !can_assign && matches!(self.peek()?.r#type, Equal) {
			let line = self.peek()?.line;
			return Err(CompileError::new(line, CompileErrorType::InvalidAssignmentTarget).into());
		}
		Ok(())
	}

	/// How `r#type` behaves mid-expression.
	fn rule(r#type: TokenType) -> ParseRule<'s, 'ctx> {
		match r#type {
			Minus => ParseRule::new(Some(Self::unary), Some(Self::binary), Precedence::Term),
			Plus => ParseRule::new(None, Some(Self::binary), Precedence::Term),
			Star | Slash => ParseRule::new(None, Some(Self::binary), Precedence::Factor),
			EqualEqual => ParseRule::new(None, Some(Self::binary), Precedence::Equality),
			Less | Greater => ParseRule::new(None, Some(Self::binary), Precedence::Comparison),
			Number => ParseRule::new(Some(Self::number), None, Precedence::None),
			StringLiteral => ParseRule::new(Some(Self::string), None, Precedence::None),
			True | False | TokenType::Nil => ParseRule::new(Some(Self::literal), None, Precedence::None),
			Identifier => ParseRule::new(Some(Self::variable), None, Precedence::None),
			_ => ParseRule::new(None, None, Precedence::None),
		}
	}

	/// Prefix handler for number literals.
	fn number(&mut self, token: &Token<'s>, _can_assign: bool) -> Result<(), CompilerError> {
		let value: f32 = token.lexeme.parse().map_err(|_| {
			CompileError::new(token.line, CompileErrorType::InvalidNumber(token.lexeme.to_string()))
		})?;
		self.emit_constant(Value::Number(value), token.line)
	}

	/// Prefix handler for string literals: strip the quotes, intern, wrap.
	fn string(&mut self, token: &Token<'s>, _can_assign: bool) -> Result<(), CompilerError> {
		let text = token
			.lexeme
			.get(1..token.lexeme.len().saturating_sub(1))
			.context("String lexeme lost its quotes")?;
		let value = self.context.new_string(text);
		self.emit_constant(value, token.line)
	}

	/// Prefix handler for `true`, `false` and `nil`.
	fn literal(&mut self, token: &Token<'s>, _can_assign: bool) -> Result<(), CompilerError> {
		let value = match token.r#type {
			True => Value::Boolean(true),
			False => Value::Boolean(false),
			TokenType::Nil => Value::Nil,
			_ => return Err(anyhow!("Literal rule on token {:?}", token.r#type).into()),
		};
		self.emit_constant(value, token.line)
	}

	/// Prefix handler for unary minus.
	fn unary(&mut self, _token: &Token<'s>, _can_assign: bool) -> Result<(), CompilerError> {
		self.parse_precedence(Precedence::Unary)?;
		self.chunk.emit(OpCode::Negate);
		Ok(())
	}

	/// Infix handler for the binary operators.
	fn binary(&mut self, operator: &Token<'s>) -> Result<(), CompilerError> {
		self.parse_precedence(Self::rule(operator.r#type).precedence.next())?;
		let op = match operator.r#type {
			Plus => OpCode::Add,
			Minus => OpCode::Subtract,
			Star => OpCode::Multiply,
			Slash => OpCode::Divide,
			EqualEqual => OpCode::Equals,
			Less => OpCode::LessThan,
			Greater => OpCode::GreaterThan,
			_ => return Err(anyhow!("Binary rule on token {:?}", operator.r#type).into()),
		};
		self.chunk.emit(op);
		Ok(())
	}

	/// Prefix handler for identifiers: a read, or the target of an `=` when
	/// one may still bind. Locals win over globals in both directions.
	fn variable(&mut self, token: &Token<'s>, can_assign: bool) -> Result<(), CompilerError> {
		if can_assign && matches!(self.peek()?.r#type, Equal) {
			self.advance()?; // consume '='
			self.expression()?;
			match self.find_local(token.lexeme, false) {
				Some(slot) => self.chunk.emit_with_operand(OpCode::SetLocal, slot),
				None => {
					let index = self.add_varname(token)?;
					self.chunk.emit_with_operand(OpCode::SetGlobal, index);
				}
			}
		} else {
			match self.find_local(token.lexeme, false) {
				Some(slot) => self.chunk.emit_with_operand(OpCode::GetLocal, slot),
				None => {
					let index = self.add_varname(token)?;
					self.chunk.emit_with_operand(OpCode::GetGlobal, index);
				}
			}
		}
		Ok(())
	}

	/// Record a new local for the value the initializer just left on the
	/// stack. The store targets the slot that value already occupies; it
	/// simply becomes addressable from now on.
	fn declare_local(&mut self, name: &Token<'s>) -> Result<(), CompilerError> {
		if self.find_local(name.lexeme, true).is_some() {
			let lexeme = name.lexeme.to_string();
			return Err(CompileError::new(name.line, CompileErrorType::RedeclaredLocal(lexeme)).into());
		}
		let slot = u8::try_from(self.locals.len())
			.map_err(|_| CompileError::new(name.line, CompileErrorType::TooManyLocals))?;
		self.locals.push(Local { name: name.lexeme, depth: self.scope_depth });
		self.chunk.emit_with_operand(OpCode::SetLocal, slot);
		Ok(())
	}

	/// Newest matching local, optionally restricted to the current block.
	fn find_local(&self, name: &str, same_scope_only: bool) -> Option<u8> {
		self.locals
			.iter()
			.enumerate()
			.rev()
			.filter(|(_, local)| !same_scope_only || local.depth == self.scope_depth)
			.find(|(_, local)| local.name == name)
			.map(|(slot, _)| slot as u8)
	}

	fn add_varname(&mut self, token: &Token<'s>) -> Result<u8, CompilerError> {
		let name = self.context.intern(token.lexeme);
		self.chunk
			.add_varname(name)
			.ok_or_else(|| CompileError::new(token.line, CompileErrorType::TooManyGlobals).into())
	}

	fn emit_constant(&mut self, value: Value, line: usize) -> Result<(), CompilerError> {
		let index = self
			.chunk
			.add_constant(value)
			.ok_or_else(|| CompileError::new(line, CompileErrorType::TooManyConstants))?;
		self.chunk.emit_with_operand(OpCode::GetConst, index);
		Ok(())
	}

	fn expect_semicolon(&mut self) -> Result<(), CompilerError> {
		let token = self.advance()?;
		if !matches!(token.r#type, Semicolon) {
			return Err(CompileError::new(token.line, CompileErrorType::ExpectSemicolon).into());
		}
		Ok(())
	}

	/// Advance to the next token.
	fn advance(&mut self) -> Result<Token<'s>, CompilerError> {
		Ok(self.tokens.next().context("Ran past the end of the token stream")?)
	}

	/// Peek at the current token.
	fn peek(&mut self) -> Result<&Token<'s>, CompilerError> {
		Ok(self.tokens.peek().context("Ran past the end of the token stream")?)
	}
}
