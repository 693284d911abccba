use crate::error::{IndexError, Result};
use crate::table::{OpenTable, Usage};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Returned by [`LocalTable::get`] for terms that are not in the table.
pub const MISSING: i32 = -1;

/// Per-document term counter. Created (or reset) for each document, filled from its
/// token stream, then drained into the global table.
#[derive(Debug, Clone)]
pub struct LocalTable {
    table: OpenTable<i32>,
}

impl LocalTable {
    /// Table with room for `expected_keys` distinct terms at a one-third load factor.
    ///
    /// # Panics
    /// If `expected_keys` is zero.
    pub fn new(expected_keys: usize) -> Self {
        Self { table: OpenTable::with_expected_keys(expected_keys) }
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of distinct terms held.
    pub fn len(&self) -> usize {
        self.table.used()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count one occurrence of `term`.
    pub fn insert(&mut self, term: &str) -> Result<()> {
        let (count, _) = self.table.get_or_insert_with(term, || 0).map_err(report_full)?;
        *count += 1;
        Ok(())
    }

    /// Store `value` for `term` unless the term is already present.
    pub fn insert_value(&mut self, term: &str, value: i32) -> Result<()> {
        self.table.get_or_insert_with(term, || value).map_err(report_full)?;
        Ok(())
    }

    /// Count stored for `term`, or [`MISSING`].
    pub fn get(&mut self, term: &str) -> i32 {
        self.table.get(term).copied().unwrap_or(MISSING)
    }

    /// Slot index holding `term`, or the empty slot it would be placed in.
    /// `None` only when the table is full and the term is absent.
    pub fn find(&mut self, term: &str) -> Option<usize> {
        self.table.find(term)
    }

    pub fn reset(&mut self) {
        self.table.reset();
    }

    pub fn usage(&self) -> Usage {
        self.table.usage()
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.table.entries().map(|(term, count)| (term, *count))
    }

    /// Dump occupied entries as `<term> <count>` lines in slot order.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (term, count) in self.iter() {
            writeln!(out, "{term} {count}")?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        let Usage { used, collisions, lookups } = self.usage();
        tracing::info!(used, collisions, lookups, "local table written");
        Ok(())
    }
}

fn report_full(err: IndexError) -> IndexError {
    tracing::warn!(%err, "local table is full; term dropped");
    err
}
