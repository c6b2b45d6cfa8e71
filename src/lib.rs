//! # How bare text becomes bytecode and runs
//!
//! User's source code: `var average = min + max / 2;`

//! ## Scanning
//!
//! The scanner takes in characters and groups them into tokens: operators
//! `+`, braces, numbers `123`, string literals `"hi!"`, identifiers `min`.
//! Whitespace and comments are dropped on the floor. Each token remembers
//! the slice of source it came from and the line it sits on.

//! ## Single-pass compilation
//!
//! Most compilers parse into a syntax tree, analyze it, and only then
//! generate code. A single-pass compiler interleaves all three: the moment
//! a token is recognized, the instructions it implies are appended to the
//! output. Nothing is ever revisited, so everything the later stages would
//! have needed (operator precedence, whether a name is a local or a global,
//! which stack slot a local occupies) has to be decided right where the
//! token is consumed.
//!
//! Precedence without a tree is the job of Pratt parsing: every token type
//! carries an optional prefix handler, an optional infix handler, and a
//! binding strength. Parsing an expression means consuming one prefix and
//! then folding infix operators for as long as they bind at least as
//! tightly as the caller demands.

//! ## Bytecode
//!
//! The compiler's output is a `Chunk`: a flat byte vector of instructions
//! for an imaginary, very small CPU, plus the pools its one-byte operands
//! index, literal constants and variable names. Since there is no chip
//! that speaks this instruction set, a virtual machine simulates one: a
//! fetch/decode/dispatch loop over an operand stack. Slower than native
//! code, but simple and portable.

//! ## Runtime
//!
//! The dialect has no garbage collector and no escaping references, so the
//! runtime model stays small: every string allocated while compiling or
//! running is registered in one global context and canonicalized through an
//! interning table, which makes string equality a pointer comparison.
//! Everything is freed together when the context goes away.

pub mod cli;

mod chunk;
mod compiler;
mod context;
mod debug;
mod error;
mod lox;
mod scanner;
mod table;
mod value;
mod vm;

pub use error::{LoxError, compiler::{CompileError, CompilerError}, scanner::{ScanError, ScannerError}, vm::VmError};
pub use lox::Lox;

pub type Result<T, E = LoxError> = std::result::Result<T, E>;
