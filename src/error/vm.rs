/// Errors that can occur during bytecode execution.
#[derive(thiserror::Error, Debug)]
pub enum VmError {
	/// Internal interpreter error, should never happen with compiler-produced
	/// bytecode
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Error for invalid unary operations
	#[error("Invalid unary operation: {0}")]
	UnaryOperationError(String),
	/// Error for invalid binary operations
	#[error("Invalid binary operation: {0}")]
	BinaryOperationError(String),
	/// A global read or written before being declared
	#[error("Undeclared variable '{0}'")]
	UndeclaredVariable(String),
	/// The stack was not empty on `Exit`; a statement failed to balance its
	/// pushes and pops
	#[error("{0} values left on the stack at exit")]
	StackNotEmpty(usize),
}
