//! # Symbol Table
//!
//! Dense ``ID <-> surface`` storage shared by the vocabulary codecs.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    NmtError,
    NmtResult,
    WordId,
    types::{NmtHashMap, hash_map_with_capacity},
};

/// One serialized symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SymbolRecord {
    surface: CompactString,
    frequency: u64,
}

/// The serialized form of a [`SymbolTable`]; the reverse index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct SymbolRecords(Vec<SymbolRecord>);

/// Dense symbol storage.
///
/// IDs are assigned in insertion order; the `ids` index is the inverse of `surfaces`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SymbolRecords", into = "SymbolRecords")]
pub struct SymbolTable {
    surfaces: Vec<CompactString>,
    frequencies: Vec<u64>,
    ids: NmtHashMap<CompactString, WordId>,
}

impl PartialEq for SymbolTable {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.surfaces == other.surfaces && self.frequencies == other.frequencies
    }
}

impl TryFrom<SymbolRecords> for SymbolTable {
    type Error = NmtError;

    /// Rebuild the table; a repeated surface would shift every later ID.
    fn try_from(records: SymbolRecords) -> NmtResult<Self> {
        let mut table = Self::with_capacity(records.0.len());
        for (expected, SymbolRecord { surface, frequency }) in records.0.into_iter().enumerate() {
            let id = table.push(surface, frequency);
            if id as usize != expected {
                return Err(NmtError::config(format!(
                    "symbol {expected} repeats the surface of symbol {id}: {:?}",
                    table.surfaces[id as usize]
                )));
            }
        }
        Ok(table)
    }
}

impl From<SymbolTable> for SymbolRecords {
    fn from(table: SymbolTable) -> Self {
        SymbolRecords(
            table
                .surfaces
                .into_iter()
                .zip(table.frequencies)
                .map(|(surface, frequency)| SymbolRecord { surface, frequency })
                .collect(),
        )
    }
}

impl SymbolTable {
    /// Create an empty table with room for `capacity` symbols.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            surfaces: Vec::with_capacity(capacity),
            frequencies: Vec::with_capacity(capacity),
            ids: hash_map_with_capacity(capacity),
        }
    }

    /// Create a table holding the given reserved symbols, each with frequency 0.
    pub fn with_reserved(reserved: &[&str]) -> Self {
        let mut table = Self::with_capacity(reserved.len());
        for &surface in reserved {
            table.push(surface, 0);
        }
        table
    }

    /// Check that the table starts with exactly the `reserved` surfaces.
    ///
    /// ## Errors
    /// [`NmtError::Config`] naming the first missing or misplaced symbol.
    pub fn check_reserved(
        &self,
        reserved: &[&str],
    ) -> NmtResult<()> {
        for (id, &expected) in reserved.iter().enumerate() {
            let found = self.surfaces.get(id).map(|s| s.as_str());
            if found != Some(expected) {
                return Err(NmtError::config(format!(
                    "reserved ID {id} must be {expected:?}, found {found:?}"
                )));
            }
        }
        Ok(())
    }

    /// The number of symbols.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Insert a surface, or return the ID it already has.
    ///
    /// The frequency is only recorded for newly inserted surfaces.
    pub fn push<S: Into<CompactString>>(
        &mut self,
        surface: S,
        frequency: u64,
    ) -> WordId {
        let surface = surface.into();
        if let Some(&id) = self.ids.get(surface.as_str()) {
            return id;
        }
        let id = self.surfaces.len() as WordId;
        self.ids.insert(surface.clone(), id);
        self.surfaces.push(surface);
        self.frequencies.push(frequency);
        id
    }

    /// Look up a surface.
    pub fn id(
        &self,
        surface: &str,
    ) -> Option<WordId> {
        self.ids.get(surface).copied()
    }

    /// Look up an ID.
    pub fn surface(
        &self,
        id: WordId,
    ) -> Option<&str> {
        self.surfaces.get(id as usize).map(|s| s.as_str())
    }

    /// The frequency of an ID; 0 when out of range.
    pub fn frequency(
        &self,
        id: WordId,
    ) -> u64 {
        self.frequencies.get(id as usize).copied().unwrap_or(0)
    }

    /// Overwrite the frequency of an existing ID.
    ///
    /// ## Panics
    /// If `id` is out of range.
    pub fn set_frequency(
        &mut self,
        id: WordId,
        frequency: u64,
    ) {
        self.frequencies[id as usize] = frequency;
    }

    /// Iterate over ``(id, surface)`` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &str)> {
        self.surfaces
            .iter()
            .enumerate()
            .map(|(id, s)| (id as WordId, s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_lookup() {
        let mut table = SymbolTable::with_reserved(&["<unk>", "<s>", "</s>"]);
        assert_eq!(table.len(), 3);

        assert_eq!(table.push("cat", 7), 3);
        assert_eq!(table.push("dog", 2), 4);
        assert_eq!(table.push("cat", 100), 3);
        assert_eq!(table.len(), 5);

        assert_eq!(table.id("dog"), Some(4));
        assert_eq!(table.id("cow"), None);
        assert_eq!(table.surface(3), Some("cat"));
        assert_eq!(table.surface(5), None);
        assert_eq!(table.frequency(3), 7);
        assert_eq!(table.frequency(99), 0);

        table.set_frequency(0, 11);
        assert_eq!(table.frequency(0), 11);

        assert_eq!(
            table.iter().map(|(_, s)| s).collect::<Vec<_>>(),
            vec!["<unk>", "<s>", "</s>", "cat", "dog"]
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let mut table = SymbolTable::with_reserved(&["<unk>"]);
        table.push("a", 3);
        table.push("b", 1);

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"surface":"<unk>","frequency":0},{"surface":"a","frequency":3},{"surface":"b","frequency":1}]"#
        );

        let loaded: SymbolTable = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.id("b"), Some(2));
    }

    #[test]
    fn test_load_rejects_repeated_surface() {
        let json = r#"[{"surface":"<unk>","frequency":0},{"surface":"a","frequency":3},{"surface":"a","frequency":1},{"surface":"b","frequency":1}]"#;
        let err = serde_json::from_str::<SymbolTable>(json).unwrap_err();
        assert!(err.to_string().contains("repeats"), "{err}");
    }

    #[test]
    fn test_check_reserved() {
        let mut table = SymbolTable::with_reserved(&["<unk>", "<s>", "</s>"]);
        table.push("x", 1);
        assert!(table.check_reserved(&["<unk>", "<s>", "</s>"]).is_ok());

        let err = table.check_reserved(&["<unk>", "<s>", "</s>", "<sp>"]).unwrap_err();
        assert!(matches!(err, NmtError::Config(_)));

        let mut plain = SymbolTable::default();
        plain.push("x", 1);
        assert!(plain.check_reserved(&["<unk>"]).is_err());
        assert!(SymbolTable::default().check_reserved(&["<unk>"]).is_err());
    }
}
