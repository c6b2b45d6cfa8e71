//! The scanner walks the source bytes once and hands the compiler a flat
//! token stream terminated by a single `Eof`.
//!
//! Each token is a `{type, lexeme, line}` slice over the source; no text is
//! copied and no literal is converted here. Whitespace and `//` comments
//! are dropped. A character the dialect has no token for still produces a
//! token (`Unknown`) and is left for the compiler to reject; the only error
//! the scanner itself can report is a string literal that never closes.

mod token;

use std::{iter::Peekable, str::CharIndices};

use TokenType::*;
use anyhow::Context;
pub(crate) use token::*;

use crate::error::scanner::{ScanError, ScanErrorType, ScannerError};

/// A scanner for Lox source code
pub(crate) struct Scanner<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current lexeme
	start:       usize,
	/// Points at the character currently being considered
	cursor:      usize,
	/// Tracks what source line `cursor` is on so we can produce tokens that
	/// know their location.
	line:        usize,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, line: 1 }
	}

	/// Scan all tokens from the source code
	pub fn scan_tokens(mut self) -> Result<Vec<Token<'a>>, ScannerError> {
		let mut tokens = Vec::new();
		while let Some(&(index, _)) = self.source_iter.peek() {
			// We are at the beginning of the next lexeme.
			self.start = index;
			self.cursor = index;
			if let Some(r#type) = self.scan_token()? {
				let lexeme = &self.source[self.start..self.cursor];
				tokens.push(Token::new(r#type, lexeme, self.line));
			}
		}
		tokens.push(Token::new(Eof, "", self.line));
		Ok(tokens)
	}

	/// Scan a single token; `None` for skipped whitespace and comments
	fn scan_token(&mut self) -> Result<Option<TokenType>, ScannerError> {
		let next_char = self.advance().context("Unexpected end of input")?;
		#[rustfmt::skip]
		let r#type = match next_char {
			'{' => LeftBrace,
			'}' => RightBrace,
			';' => Semicolon,
			'+' => Plus,
			'-' => Minus,
			'*' => Star,
			'<' => Less,
			'>' => Greater,
			'=' => if self.match_next('=') { EqualEqual } else { Equal },
			'/' => if self.match_next('/') {
				while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
				return Ok(None);
			} else { Slash },
			' ' | '\r' | '\t' => return Ok(None),
			'\n' => { self.line += 1; return Ok(None); }
			'"' => self.string()?,
			c if c.is_ascii_digit() => self.number(),
			c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
			_ => Unknown,
		};

		Ok(Some(r#type))
	}

	/// Match the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Peek the second character ahead
	fn peek_second(&mut self) -> Option<char> {
		let mut it = self.source_iter.clone();
		it.next()?;
		it.peek().map(|&(_, c)| c)
	}

	/// Scan a string literal; the quotes stay inside the lexeme
	fn string(&mut self) -> Result<TokenType, ScannerError> {
		while let Some(c) = self.peek() {
			if c == '"' {
				break;
			}
			if c == '\n' {
				self.line += 1;
			}
			self.advance();
		}

		self.peek().ok_or_else(|| ScanError::new(self.line, ScanErrorType::UnterminatedString))?;
		self.advance(); // The closing "
		Ok(StringLiteral)
	}

	/// Scan a number literal
	fn number(&mut self) -> TokenType {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}

		// Look for a fractional part.
		if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
			self.advance(); // consume '.'
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}

		Number
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		TokenType::keyword_or_identifier(&self.source[self.start..self.cursor])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scan(input: &str, ok: bool) {
		let result = Scanner::new(input).scan_tokens();
		assert_eq!(result.is_ok(), ok, "scanning {input:?}");
	}

	fn types(input: &str) -> Vec<TokenType> {
		Scanner::new(input).scan_tokens().unwrap().iter().map(|token| token.r#type).collect()
	}

	#[test]
	fn scan_tokens() {
		scan("", true);
		scan("{", true);
		scan("{};", true);
		scan(" { } ", true);
		scan("var x = 42;", true);
		scan("print 1 + 2 * 3;", true);
		scan(r#"print "hello";"#, true);
		scan("// only a comment", true);
		scan(r#""unterminated"#, false);
		scan(
			r#""multi
line
string""#,
			true,
		);
	}

	#[test]
	fn scan_operators() {
		assert_eq!(types("+ - * / = == < > ;"), [
			Plus, Minus, Star, Slash, Equal, EqualEqual, Less, Greater, Semicolon, Eof
		]);
	}

	#[test]
	fn scan_numbers() {
		assert_eq!(types("0 42 3.14 0.5"), [Number, Number, Number, Number, Eof]);
		// A trailing dot is not part of the number and has no token of its own.
		assert_eq!(types("1."), [Number, Unknown, Eof]);
	}

	#[test]
	fn scan_keywords_and_identifiers() {
		assert_eq!(types("true false nil print var"), [True, False, Nil, Print, Var, Eof]);
		assert_eq!(types("x _name my_var123 printer variant"), [
			Identifier, Identifier, Identifier, Identifier, Identifier, Eof
		]);
	}

	#[test]
	fn unknown_characters_become_tokens() {
		assert_eq!(types("@"), [Unknown, Eof]);
		assert_eq!(types("1 ! 2"), [Number, Unknown, Number, Eof]);
	}

	#[test]
	fn string_lexeme_keeps_quotes() {
		let tokens = Scanner::new(r#""hello""#).scan_tokens().unwrap();
		assert_eq!(tokens[0].r#type, StringLiteral);
		assert_eq!(tokens[0].lexeme, r#""hello""#);
	}

	#[test]
	fn tokens_carry_lines() {
		let tokens = Scanner::new("1 +\n2;\n").scan_tokens().unwrap();
		let lines: Vec<usize> = tokens.iter().map(|token| token.line).collect();
		assert_eq!(lines, [1, 1, 2, 2, 3]);
	}

	#[test]
	fn comments_run_to_end_of_line() {
		assert_eq!(types("1 // 2 + 3\n4"), [Number, Number, Eof]);
		assert_eq!(types("// nothing else"), [Eof]);
	}
}
