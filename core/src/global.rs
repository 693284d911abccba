use crate::error::Result;
use crate::posting::{Posting, PostingList};
use crate::table::{OpenTable, Usage};
use crate::DocId;

/// Corpus-wide record for one term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermEntry {
    /// Number of postings appended for the term. One per insert call, so a caller that
    /// inserts a term twice for the same document counts that document twice.
    pub doc_freq: i32,
    /// Postings in transfer order.
    pub postings: PostingList,
}

/// Term dictionary accumulated across all documents, written out once at the end.
#[derive(Debug, Clone)]
pub struct GlobalTable {
    table: OpenTable<TermEntry>,
}

impl GlobalTable {
    /// # Panics
    /// If `expected_terms` is zero.
    pub fn new(expected_terms: usize) -> Self {
        Self { table: OpenTable::with_expected_keys(expected_terms) }
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

    /// Record that `term` occurs in `doc_id` with normalized frequency `rtf`.
    pub fn insert(&mut self, term: &str, doc_id: DocId, rtf: f32) -> Result<()> {
        let (entry, _) = self
            .table
            .get_or_insert_with(term, TermEntry::default)
            .map_err(|err| {
                tracing::warn!(%err, term, doc_id, "global table is full; posting dropped");
                err
            })?;
        entry.doc_freq += 1;
        entry.postings.add_to_end(Posting::new(doc_id, rtf));
        Ok(())
    }

    pub fn get(&mut self, term: &str) -> Option<&TermEntry> {
        self.table.get(term)
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

    /// Every slot in physical order, `None` for empty ones.
    pub fn slots(&self) -> impl Iterator<Item = Option<(&str, &TermEntry)>> + '_ {
        self.table.slots()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermEntry)> + '_ {
        self.table.entries()
    }

    /// Total postings across all terms; equals the sum of document frequencies.
    pub fn total_postings(&self) -> u64 {
        self.iter().map(|(_, e)| e.postings.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_creates_entry() {
        let mut g = GlobalTable::new(4);
        g.insert("cat", 7, 2.5).unwrap();
        let e = g.get("cat").unwrap();
        assert_eq!(e.doc_freq, 1);
        assert_eq!(e.postings.len(), 1);
        assert_eq!(e.postings.get(0), Some(&Posting::new(7, 2.5)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn later_inserts_append_in_order() {
        let mut g = GlobalTable::new(4);
        g.insert("cat", 3, 1.0).unwrap();
        g.insert("cat", 1, 0.5).unwrap();
        g.insert("cat", 2, 0.25).unwrap();
        let e = g.get("cat").unwrap();
        assert_eq!(e.doc_freq, 3);
        let ids: Vec<DocId> = e.postings.iter().map(|p| p.doc_id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn same_document_twice_counts_twice() {
        let mut g = GlobalTable::new(4);
        g.insert("cat", 1, 1.0).unwrap();
        g.insert("cat", 1, 1.0).unwrap();
        assert_eq!(g.get("cat").unwrap().doc_freq, 2);
        assert_eq!(g.total_postings(), 2);
    }

    #[test]
    fn full_table_drops_postings() {
        let mut g = GlobalTable::new(1);
        for (i, term) in ["a", "b", "c"].iter().enumerate() {
            g.insert(term, i as DocId, 1.0).unwrap();
        }
        assert!(g.insert("d", 9, 1.0).is_err());
        assert!(g.insert("a", 9, 1.0).is_err());
        assert_eq!(g.get("a").unwrap().doc_freq, 1);
        assert!(g.get("d").is_none());
        assert_eq!(g.total_postings(), 3);
    }

    #[test]
    fn slots_cover_whole_capacity() {
        let mut g = GlobalTable::new(2);
        g.insert("cat", 0, 1.0).unwrap();
        g.insert("dog", 0, 1.0).unwrap();
        let slots: Vec<Option<&str>> = g.slots().map(|s| s.map(|(t, _)| t)).collect();
        assert_eq!(slots, vec![Some("cat"), None, Some("dog"), None, None, None]);
    }
}
