//! Open-addressing hash table used for string interning and for globals.
//!
//! Keys are interned string storage, values are [`Value`]s. Collisions are
//! resolved by linear probing and the table grows by doubling once the load
//! factor reaches 3/4, which keeps every probe sequence finite. Deletion is
//! never needed (neither interning nor globals remove entries), so there
//! are no tombstones.

use std::rc::Rc;

use crate::value::Value;

const INITIAL_CAPACITY: usize = 32;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV1a-32 over raw bytes.
fn fnv1a(bytes: &[u8]) -> u32 {
	bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME))
}

/// An occupied slot. `value` stays `None` between [`Table::find_or_reserve`]
/// and the first store, which is distinct from the slot being vacant.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
	hash:      u32,
	key:       Rc<str>,
	pub value: Option<Value>,
}

#[derive(Debug)]
pub(crate) struct Table {
	entries: Vec<Option<Entry>>,
	/// Occupied slots, reserved ones included; they extend probe chains too
	live:    usize,
}

/// Index of the slot holding `key`, or of the first vacant slot on its
/// probe chain. Requires at least one vacant slot, which the growth policy
/// guarantees.
fn probe(entries: &[Option<Entry>], hash: u32, key: &str) -> usize {
	let mut index = hash as usize % entries.len();
	loop {
		match &entries[index] {
			None => return index,
			Some(entry) if entry.hash == hash && &*entry.key == key => return index,
			Some(_) => index = (index + 1) % entries.len(),
		}
	}
}

impl Table {
	pub fn new() -> Self { Self { entries: vec![None; INITIAL_CAPACITY], live: 0 } }

	/// The entry for `key`, reserving an uninitialized one if absent.
	pub fn find_or_reserve(&mut self, key: &Rc<str>) -> &mut Entry {
		let hash = fnv1a(key.as_bytes());
		let index = probe(&self.entries, hash, key);
		let slot = &mut self.entries[index];
		if slot.is_none() {
			self.live += 1;
		}
		slot.get_or_insert_with(|| Entry { hash, key: key.clone(), value: None })
	}

	pub fn insert(&mut self, key: Rc<str>, value: Value) {
		self.find_or_reserve(&key).value = Some(value);
		if self.live * 4 >= self.entries.len() * 3 {
			self.grow();
		}
	}

	pub fn find(&self, key: &str) -> Option<&Value> { self.lookup(key)?.value.as_ref() }

	/// The canonical stored key equal to `key`. Interning relies on this to
	/// hand out the already-canonicalized storage.
	pub fn find_key(&self, key: &str) -> Option<&Rc<str>> { self.lookup(key).map(|entry| &entry.key) }

	pub fn has_key(&self, key: &str) -> bool { self.lookup(key).is_some() }

	/// Initialized entries only; a reserved entry is not observable here.
	fn lookup(&self, key: &str) -> Option<&Entry> {
		let index = probe(&self.entries, fnv1a(key.as_bytes()), key);
		self.entries[index].as_ref().filter(|entry| entry.value.is_some())
	}

	/// Double the capacity and reinsert every entry through the raw probe.
	/// Reinsertion bypasses `insert`, so growth can never recurse.
	fn grow(&mut self) {
		let mut grown = vec![None; self.entries.len() * 2];
		for entry in self.entries.drain(..).flatten() {
			let index = probe(&grown, entry.hash, &entry.key);
			grown[index] = Some(entry);
		}
		self.entries = grown;
	}

	#[cfg(test)]
	pub fn capacity(&self) -> usize { self.entries.len() }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(text: &str) -> Rc<str> { Rc::from(text) }

	#[test]
	fn insert_then_find() {
		let mut table = Table::new();
		assert!(table.find("a").is_none());
		table.insert(key("a"), Value::Number(1.0));
		table.insert(key("b"), Value::Boolean(true));
		assert!(matches!(table.find("a"), Some(Value::Number(n)) if *n == 1.0));
		assert!(matches!(table.find("b"), Some(Value::Boolean(true))));
		assert!(table.find("c").is_none());
	}

	#[test]
	fn insert_overwrites() {
		let mut table = Table::new();
		table.insert(key("a"), Value::Number(1.0));
		table.insert(key("a"), Value::Number(2.0));
		assert!(matches!(table.find("a"), Some(Value::Number(n)) if *n == 2.0));
	}

	#[test]
	fn reserved_entries_are_invisible() {
		let mut table = Table::new();
		let name = key("pending");
		table.find_or_reserve(&name);
		assert!(table.find("pending").is_none());
		assert!(!table.has_key("pending"));
		assert!(table.find_key("pending").is_none());

		table.find_or_reserve(&name).value = Some(Value::Nil);
		assert!(table.has_key("pending"));
	}

	#[test]
	fn find_key_returns_canonical_storage() {
		let mut table = Table::new();
		let canonical = key("foo");
		table.insert(canonical.clone(), Value::Boolean(true));
		let found = table.find_key("foo").expect("key present");
		assert!(Rc::ptr_eq(found, &canonical));
	}

	#[test]
	fn survives_rehash() {
		let mut table = Table::new();
		for i in 0..1000 {
			table.insert(key(&format!("key-{i}")), Value::Number(i as f32));
		}
		assert!(table.capacity() > INITIAL_CAPACITY);
		for i in 0..1000 {
			let found = table.find(&format!("key-{i}"));
			assert!(matches!(found, Some(Value::Number(n)) if *n == i as f32), "lost key-{i}");
		}
	}
}
