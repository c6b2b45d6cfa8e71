/// Errors that can occur while compiling tokens to bytecode.
#[derive(thiserror::Error, Debug)]
pub enum CompilerError {
	/// Internal compiler error, should never happen
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Error produced by invalid source
	#[error(transparent)]
	CompileError(#[from] CompileError),
}

/// A specific compile error with line number and type.
#[derive(thiserror::Error, Debug)]
#[error("line {line}: {type}")]
pub struct CompileError {
	line:   usize,
	r#type: CompileErrorType,
}

impl CompileError {
	pub fn new(line: usize, r#type: CompileErrorType) -> Self { Self { line, r#type } }
}

/// Types of compile errors.
#[derive(Debug)]
pub enum CompileErrorType {
	/// A token with no prefix rule opened an expression.
	ExpressionExpected(String),
	/// A number lexeme that does not parse as a 32-bit float.
	InvalidNumber(String),
	/// The expression left of `=` is not assignable.
	InvalidAssignmentTarget,
	/// End of input inside an open block.
	UnterminatedBlock,
	/// Tokens left over after the last statement.
	UnexpectedEof,
	/// Error for missing semicolon at the end of a statement.
	ExpectSemicolon,
	/// Error for missing variable name in variable declaration.
	ExpectVariableName,
	/// Error for missing `=` in variable declaration.
	ExpectInitializer,
	/// A local declared twice in the same block.
	RedeclaredLocal(String),
	/// Constant pool exhausted.
	TooManyConstants,
	/// Variable-name pool exhausted.
	TooManyGlobals,
	/// Local slots exhausted.
	TooManyLocals,
}

impl std::fmt::Display for CompileErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use CompileErrorType::*;
		match self {
			ExpressionExpected(found) => write!(f, "Expect expression, got '{found}'"),
			InvalidNumber(lexeme) => write!(f, "Invalid number literal '{lexeme}'"),
			InvalidAssignmentTarget => write!(f, "Invalid assignment target."),
			UnterminatedBlock => write!(f, "Expect '}}' to close the block."),
			UnexpectedEof => write!(f, "Expect end of input after the last statement."),
			ExpectSemicolon => write!(f, "Expect ';' at the end of statement."),
			ExpectVariableName => write!(f, "Expect variable name in declaration."),
			ExpectInitializer => write!(f, "Expect '=' after variable name."),
			RedeclaredLocal(name) => write!(f, "Redeclared local variable '{name}'"),
			TooManyConstants => write!(f, "Cannot have more than 256 constants in one chunk."),
			TooManyGlobals => write!(f, "Cannot have more than 256 variable names in one chunk."),
			TooManyLocals => write!(f, "Cannot have more than 256 local variables in scope."),
		}
	}
}
