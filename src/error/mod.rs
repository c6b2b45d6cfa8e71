pub mod compiler;
pub mod scanner;
pub mod vm;

use crate::error::{compiler::CompilerError, scanner::ScannerError, vm::VmError};

/// LoxError is the top-level error type for the whole pipeline. Any phase
/// error aborts the run and surfaces here unchanged; the CLI reports it and
/// exits non-zero.
#[derive(thiserror::Error, Debug)]
pub enum LoxError {
	/// Internal error, should never happen
	#[error("InternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	#[error(transparent)]
	ScannerError(#[from] ScannerError),
	#[error(transparent)]
	CompilerError(#[from] CompilerError),
	#[error(transparent)]
	VmError(#[from] VmError),
}
