//! Cross-file merge of record sets into one ordered key map
//!
//! Record sets are folded in order. The first set that contains a key owns
//! it (`origin_index`); every later set that contains the key again appends
//! a provenance note citing that first set.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info};

use super::error::Result;
use super::status::{ProvenanceNote, Status};
use crate::scanner::record_reader::{read_record_set, RecordSet};

/// One deduplicated key and what is known about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    key: String,
    origin_index: usize,
    status: Status,
}

impl MergedEntry {
    fn new(key: String, origin_index: usize) -> Self {
        Self { key, origin_index, status: Status::new() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 0-based index of the record set the key was first seen in
    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub(crate) fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

/// Insertion-ordered map from key to [`MergedEntry`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedMap {
    entries: Vec<MergedEntry>,
    positions: HashMap<String, usize>,
}

impl MergedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MergedEntry> {
        self.positions.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Entries in the order their keys were first seen
    pub fn iter(&self) -> impl Iterator<Item = &MergedEntry> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut MergedEntry> {
        self.entries.iter_mut()
    }

    /// Rendered status of `key`, `"Unknown"` if the key was never merged
    pub fn status_text(&self, key: &str) -> String {
        self.get(key)
            .map(|entry| entry.status.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Record that `key` occurs in record set `set_index`
    pub fn observe(&mut self, key: &str, set_index: usize) {
        match self.positions.get(key) {
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push(MergedEntry::new(key.to_string(), set_index));
            }
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                if entry.origin_index < set_index {
                    entry.status.push_note(ProvenanceNote { origin_index: entry.origin_index });
                }
            }
        }
    }
}

/// Rows of `set` with exact duplicate rows removed, first occurrence kept
pub fn dedup_rows(set: &RecordSet) -> Vec<&[String]> {
    let mut seen: HashSet<&[String]> = HashSet::new();
    set.rows
        .iter()
        .map(Vec::as_slice)
        .filter(|row| seen.insert(*row))
        .collect()
}

/// Merge record sets into one map, in slice order
pub fn merge(record_sets: &[RecordSet]) -> MergedMap {
    let mut map = MergedMap::new();

    for (set_index, set) in record_sets.iter().enumerate() {
        let rows = dedup_rows(set);
        debug!(
            source = %set.source.display(),
            rows = set.rows.len(),
            unique_rows = rows.len(),
            "merging record set"
        );

        for key in rows.iter().filter_map(|row| RecordSet::key_of(row)) {
            map.observe(key, set_index);
        }
    }

    map
}

/// Read every source in order, failing on the first one that is missing
pub fn load_record_sets(paths: &[PathBuf]) -> Result<Vec<RecordSet>> {
    paths.iter().map(|path| read_record_set(path)).collect()
}

/// Load and merge; nothing is returned if any source is missing
pub fn merge_files(paths: &[PathBuf]) -> Result<(Vec<RecordSet>, MergedMap)> {
    let record_sets = load_record_sets(paths)?;
    let map = merge(&record_sets);
    info!(files = record_sets.len(), keys = map.len(), "merged record sets");
    Ok((record_sets, map))
}
