//! Runtime values and heap objects.
//!
//! A [`Value`] is a small tagged variant that lives on the VM's operand
//! stack and in chunk constant pools. Strings are the only heap-allocated
//! case: the value holds a reference to a [`HeapObject`] whose backing
//! bytes are canonicalized through the context's interning table, so two
//! byte-equal strings always share storage and equality can be decided by
//! comparing that storage's identity.

use std::rc::Rc;

use Value::*;

/// A runtime value of the language.
#[derive(Debug, Clone)]
pub(crate) enum Value {
	Number(f32),
	Boolean(bool),
	Nil,
	Object(Rc<HeapObject>),
}

/// A heap-allocated object, registered in the global context for the
/// lifetime of a run.
#[derive(Debug)]
pub(crate) enum HeapObject {
	/// Interned string storage; byte-equal strings share one allocation.
	String(Rc<str>),
}

impl Value {
	/// Language equality. Values of different tags are never equal; strings
	/// compare by identity of their interned storage.
	pub fn equals(&self, other: &Self) -> bool {
		match (self, other) {
			(Number(a), Number(b)) => a == b,
			(Boolean(a), Boolean(b)) => a == b,
			(Nil, Nil) => true,
			(Object(a), Object(b)) => {
				let (HeapObject::String(a), HeapObject::String(b)) = (a.as_ref(), b.as_ref());
				Rc::ptr_eq(a, b)
			}
			_ => false,
		}
	}
}

/// The `print` format: numbers in their shortest round-trip form, strings
/// as raw bytes without quotes.
impl std::fmt::Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Number(n) => write!(f, "{n}"),
			Boolean(b) => write!(f, "{b}"),
			Nil => write!(f, "nil"),
			Object(object) => write!(f, "{object}"),
		}
	}
}

impl std::fmt::Display for HeapObject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			HeapObject::String(s) => write!(f, "{s}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn string_over(storage: &Rc<str>) -> Value { Object(Rc::new(HeapObject::String(storage.clone()))) }

	#[test]
	fn display_formats() {
		assert_eq!(Number(3.0).to_string(), "3");
		assert_eq!(Number(13.8).to_string(), "13.8");
		assert_eq!(Number(-0.5).to_string(), "-0.5");
		assert_eq!(Boolean(true).to_string(), "true");
		assert_eq!(Boolean(false).to_string(), "false");
		assert_eq!(Nil.to_string(), "nil");
		assert_eq!(string_over(&Rc::from("hi")).to_string(), "hi");
	}

	#[test]
	fn equality_by_tag_and_value() {
		assert!(Number(1.5).equals(&Number(1.5)));
		assert!(!Number(1.5).equals(&Number(2.5)));
		assert!(Boolean(true).equals(&Boolean(true)));
		assert!(!Boolean(true).equals(&Boolean(false)));
		assert!(Nil.equals(&Nil));
		assert!(!Nil.equals(&Boolean(false)));
		assert!(!Number(0.0).equals(&Nil));
	}

	#[test]
	fn string_equality_is_storage_identity() {
		let canonical: Rc<str> = Rc::from("foo");
		// Two distinct objects over the same interned storage are equal.
		assert!(string_over(&canonical).equals(&string_over(&canonical)));
		// Byte-equal but separately allocated storage is not; this is why
		// every string must pass through the interning table.
		let separate: Rc<str> = Rc::from("foo");
		assert!(!string_over(&canonical).equals(&string_over(&separate)));
	}
}
