use std::collections::VecDeque;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Owned sequence with cheap insertion at both ends, plus ordered insertion and
/// removal by value. Posting lists only ever append, but the other operations are kept
/// for general use.
#[derive(Debug, Clone, PartialEq)]
pub struct TailList<T> {
    items: VecDeque<T>,
}

impl<T> Default for TailList<T> {
    fn default() -> Self {
        Self { items: VecDeque::new() }
    }
}

impl<T> TailList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    pub fn add_to_end(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Item at `index` counting from the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}

impl<T: PartialOrd> TailList<T> {
    /// Insert before the first item that `item` is not greater than, so a new item
    /// lands ahead of any equal ones already present.
    pub fn add_sorted(&mut self, item: T) {
        let at = self
            .items
            .iter()
            .position(|cur| !(item > *cur))
            .unwrap_or(self.items.len());
        self.items.insert(at, item);
    }
}

impl<T: PartialEq> TailList<T> {
    /// Remove the first item equal to `item`. Returns whether anything was removed.
    pub fn delete(&mut self, item: &T) -> bool {
        match self.items.iter().position(|cur| cur == item) {
            Some(at) => {
                self.items.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T: Display> TailList<T> {
    /// One line per item, front to back.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for item in &self.items {
            writeln!(out, "{item}")?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()
    }
}

impl<T> FromIterator<T> for TailList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<'a, T> IntoIterator for &'a TailList<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for TailList<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(l: &TailList<i32>) -> Vec<i32> {
        l.iter().copied().collect()
    }

    #[test]
    fn front_and_back() {
        let mut l = TailList::new();
        assert!(l.is_empty());
        l.add_to_end(2);
        l.add_to_front(1);
        l.add_to_end(3);
        assert_eq!(collect(&l), vec![1, 2, 3]);
        assert_eq!(l.len(), 3);
        assert_eq!(l.first(), Some(&1));
        assert_eq!(l.last(), Some(&3));
    }

    #[test]
    fn sorted_insertion() {
        let mut l = TailList::new();
        for x in [5, 1, 4, 1, 9, 0] {
            l.add_sorted(x);
        }
        assert_eq!(collect(&l), vec![0, 1, 1, 4, 5, 9]);
        assert_eq!(l.last(), Some(&9));
    }

    #[test]
    fn delete_head_middle_tail_and_missing() {
        let mut l: TailList<i32> = (1..=5).collect();
        assert!(l.delete(&1));
        assert!(l.delete(&3));
        assert!(l.delete(&5));
        assert!(!l.delete(&42));
        assert_eq!(collect(&l), vec![2, 4]);
        assert_eq!(l.last(), Some(&4));
        l.add_to_end(6);
        assert_eq!(collect(&l), vec![2, 4, 6]);
    }

    #[test]
    fn delete_in_unsorted_list() {
        let mut l: TailList<i32> = vec![3, 1, 2].into_iter().collect();
        assert!(l.delete(&2));
        assert_eq!(collect(&l), vec![3, 1]);
    }

    #[test]
    fn positional_get() {
        let l: TailList<&str> = ["a", "b", "c"].into_iter().collect();
        assert_eq!(l.get(0), Some(&"a"));
        assert_eq!(l.get(2), Some(&"c"));
        assert_eq!(l.get(3), None);
    }

    #[test]
    fn clone_is_independent() {
        let mut a: TailList<i32> = (1..=3).collect();
        let b = a.clone();
        a.add_to_end(4);
        assert_eq!(b.len(), 3);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn write_one_line_per_item() {
        let l: TailList<i32> = (1..=3).collect();
        let mut buf = Vec::new();
        l.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1\n2\n3\n");
    }
}
