#[derive(thiserror::Error, Debug)]
pub enum ScannerError {
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	#[error(transparent)]
	ScanError(#[from] ScanError),
}

#[derive(thiserror::Error, Debug)]
#[error("line {line}: {type}")]
pub struct ScanError {
	line:   usize,
	r#type: ScanErrorType,
}

impl ScanError {
	pub fn new(line: usize, r#type: ScanErrorType) -> Self { Self { line, r#type } }
}

#[derive(Debug)]
pub enum ScanErrorType {
	UnterminatedString,
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ScanErrorType::UnterminatedString => write!(f, "Unterminated string"),
		}
	}
}
