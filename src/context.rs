//! The ownership root shared by the compiler and the VM.
//!
//! Both phases allocate strings (literals while compiling, concatenation
//! results while running) and both need them canonicalized so that string
//! equality can compare storage identity. The context owns the interning
//! table and every heap object ever allocated; there is no collector, all
//! of it is released together when the context drops.

use std::rc::Rc;

use crate::{table::Table, value::{HeapObject, Value}};

pub(crate) struct GlobalContext {
	/// Every heap object allocated during the run
	objects: Vec<Rc<HeapObject>>,
	/// Canonical storage for every distinct byte string
	strings: Table,
	/// Dump tokens and bytecode to stderr, plus the stack on interpreter bugs
	pub debug: bool,
}

impl GlobalContext {
	pub fn new(debug: bool) -> Self { Self { objects: Vec::new(), strings: Table::new(), debug } }

	/// Canonicalize `text`: byte-equal inputs always return the same storage.
	pub fn intern(&mut self, text: &str) -> Rc<str> {
		if let Some(canonical) = self.strings.find_key(text) {
			return canonical.clone();
		}
		let canonical: Rc<str> = Rc::from(text);
		// The stored value is a presence marker, never read back.
		self.strings.insert(canonical.clone(), Value::Boolean(true));
		canonical
	}

	/// Allocate a string object over interned storage and register it.
	pub fn new_string(&mut self, text: &str) -> Value {
		let object = Rc::new(HeapObject::String(self.intern(text)));
		self.objects.push(object.clone());
		Value::Object(object)
	}

	#[cfg(test)]
	pub fn object_count(&self) -> usize { self.objects.len() }
}
