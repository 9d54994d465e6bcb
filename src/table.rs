// File: src/table.rs
//
// Open-addressed hash table keyed by interned strings, and the string
// intern table built on top of it. Linear probing with tombstones; the
// globals table and the interner are the two instantiations.

use std::rc::Rc;

use crate::value::{hash_string, ObjString};

const TABLE_MAX_LOAD: f64 = 0.75;
const MIN_CAPACITY: usize = 8;

#[derive(Debug)]
enum Entry<V> {
    Empty,
    /// A deleted slot. Kept in place so probe chains stay intact.
    Tombstone,
    Full { key: Rc<ObjString>, value: V },
}

/// Hash table from interned strings to `V`. Keys compare by pointer
/// identity; the interner guarantees that equal contents share a pointer.
#[derive(Debug)]
pub struct Table<V> {
    /// Live entries plus tombstones. Only an empty-to-full transition
    /// increments it.
    count: usize,
    entries: Vec<Entry<V>>,
}

impl<V> Table<V> {
    pub fn new() -> Self {
        Table { count: 0, entries: Vec::new() }
    }

    pub fn get(&self, key: &Rc<ObjString>) -> Option<&V> {
        if self.count == 0 {
            return None;
        }
        match &self.entries[self.find_entry(key)] {
            Entry::Full { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &Rc<ObjString>) -> Option<&mut V> {
        if self.count == 0 {
            return None;
        }
        let index = self.find_entry(key);
        match &mut self.entries[index] {
            Entry::Full { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, key: &Rc<ObjString>) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces. Returns true when the key was not present.
    pub fn set(&mut self, key: Rc<ObjString>, value: V) -> bool {
        if (self.count + 1) as f64 > self.entries.len() as f64 * TABLE_MAX_LOAD {
            self.grow();
        }
        let index = self.find_entry(&key);
        let is_new = !matches!(self.entries[index], Entry::Full { .. });
        if matches!(self.entries[index], Entry::Empty) {
            self.count += 1;
        }
        self.entries[index] = Entry::Full { key, value };
        is_new
    }

    /// Replaces the entry with a tombstone. Returns false when absent.
    pub fn delete(&mut self, key: &Rc<ObjString>) -> bool {
        if self.count == 0 {
            return false;
        }
        let index = self.find_entry(key);
        if matches!(self.entries[index], Entry::Full { .. }) {
            self.entries[index] = Entry::Tombstone;
            true
        } else {
            false
        }
    }

    /// Content-based probe used by the interner: finds an existing key with
    /// the given bytes and hash, bypassing pointer identity.
    pub fn find_string(&self, chars: &str, hash: u32) -> Option<Rc<ObjString>> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.entries.len();
        let mut index = hash as usize % capacity;
        loop {
            match &self.entries[index] {
                Entry::Empty => return None,
                Entry::Tombstone => {}
                Entry::Full { key, .. } => {
                    if key.len() == chars.len()
                        && key.hash() == hash
                        && key.as_str() == chars
                    {
                        return Some(Rc::clone(key));
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<ObjString>, &V)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Full { key, value } => Some((key, value)),
            _ => None,
        })
    }

    /// Index of the matching entry or, failing that, of the slot an insert
    /// should use: the first tombstone on the probe chain if any, else the
    /// terminating empty bucket.
    fn find_entry(&self, key: &Rc<ObjString>) -> usize {
        let capacity = self.entries.len();
        let mut index = key.hash() as usize % capacity;
        let mut tombstone = None;
        loop {
            match &self.entries[index] {
                Entry::Empty => return tombstone.unwrap_or(index),
                Entry::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Entry::Full { key: existing, .. } => {
                    if Rc::ptr_eq(existing, key) {
                        return index;
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    /// Doubles capacity and rehashes. Tombstones are not carried over, so
    /// count is recomputed from the live entries.
    fn grow(&mut self) {
        let capacity = (self.entries.len() * 2).max(MIN_CAPACITY);
        let old = std::mem::replace(
            &mut self.entries,
            (0..capacity).map(|_| Entry::Empty).collect(),
        );
        self.count = 0;
        for entry in old {
            if let Entry::Full { key, value } = entry {
                let index = self.find_entry(&key);
                self.entries[index] = Entry::Full { key, value };
                self.count += 1;
            }
        }
    }
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Table::new()
    }
}

/// The string intern table. Construction of every `ObjString` funnels
/// through here, making content equality and pointer identity coincide.
#[derive(Debug, Default)]
pub struct Strings {
    table: Table<()>,
}

impl Strings {
    pub fn new() -> Self {
        Strings { table: Table::new() }
    }

    /// Interns a borrowed string, copying only when it is new.
    pub fn intern(&mut self, chars: &str) -> Rc<ObjString> {
        let hash = hash_string(chars);
        if let Some(existing) = self.table.find_string(chars, hash) {
            return existing;
        }
        self.insert(chars.into(), hash)
    }

    /// Interns an owned string, reusing its allocation when it is new.
    /// Used for runtime-built strings such as concatenation results.
    pub fn intern_owned(&mut self, chars: String) -> Rc<ObjString> {
        let hash = hash_string(&chars);
        if let Some(existing) = self.table.find_string(&chars, hash) {
            return existing;
        }
        self.insert(chars.into_boxed_str(), hash)
    }

    fn insert(&mut self, chars: Box<str>, hash: u32) -> Rc<ObjString> {
        let string = Rc::new(ObjString::new(chars, hash));
        self.table.set(Rc::clone(&string), ());
        string
    }
}
