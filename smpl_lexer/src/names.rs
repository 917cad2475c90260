//! Identifier interning
//!
//! Every distinct identifier name gets one dense integer id for the whole
//! compilation; the SSA layer only ever sees the id.

use hashbrown::HashMap;
use smpl_common::IdentId;

/// Two-way mapping between identifier names and their ids
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    ids: HashMap<String, IdentId>,
    names: Vec<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing id if it was seen before
    pub fn add_name(&mut self, name: &str) -> IdentId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = IdentId(self.names.len() as u32);
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    pub fn lookup(&self, name: &str) -> Option<IdentId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: IdentId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = NameTable::new();
        let a = table.add_name("a");
        let b = table.add_name("b");
        assert_ne!(a, b);
        assert_eq!(table.add_name("a"), a);
        assert_eq!(table.name(b), "b");
        assert_eq!(table.lookup("c"), None);
    }

    #[test]
    fn ids_are_dense_from_zero() {
        let mut table = NameTable::new();
        for (i, name) in ["x", "y", "z"].iter().enumerate() {
            assert_eq!(table.add_name(name), IdentId(i as u32));
        }
    }
}
