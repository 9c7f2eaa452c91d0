//! Bounded working memory.
//!
//! [`WorkingMemory`] keeps the most recent entries up to a fixed budget.
//! Appending never fails: once the budget is reached the oldest entry is
//! evicted (strict FIFO).

use crate::memory::entry::MemoryEntry;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct WorkingMemory {
    budget: usize,
    entries: VecDeque<MemoryEntry>,
}

impl WorkingMemory {
    /// Create a buffer holding at most `budget` entries. A budget of zero is
    /// raised to one so that the latest entry is always visible.
    pub fn new(budget: usize) -> Self {
        let budget = budget.max(1);
        Self {
            budget,
            entries: VecDeque::with_capacity(budget),
        }
    }

    /// Append an entry, returning the evicted oldest entry if the buffer was full.
    pub fn append(&mut self, entry: MemoryEntry) -> Option<MemoryEntry> {
        let evicted = if self.entries.len() >= self.budget {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// The last `n` entries, oldest first.
    ///
    /// The iterator is lazy, finite and `Clone`, so it can be restarted from a
    /// saved copy.
    pub fn recent(
        &self,
        n: usize,
    ) -> impl DoubleEndedIterator<Item = &MemoryEntry> + ExactSizeIterator + Clone + '_ {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// Render the last `n` entries as prompt context, one block per entry.
    pub fn render_recent(&self, n: usize) -> String {
        self.recent(n)
            .map(|e| format!("[{}] {}", e.kind, e.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.budget
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::entry::MemoryKind;

    fn contents(memory: &WorkingMemory) -> Vec<String> {
        memory.recent(memory.len()).map(|e| e.content.clone()).collect()
    }

    #[test]
    fn test_fifo_eviction_at_budget() {
        let mut memory = WorkingMemory::new(3);
        assert!(memory.append(MemoryEntry::note("A")).is_none());
        assert!(memory.append(MemoryEntry::note("B")).is_none());
        assert!(memory.append(MemoryEntry::note("C")).is_none());
        let evicted = memory.append(MemoryEntry::note("D")).unwrap();

        assert_eq!(evicted.content, "A");
        assert_eq!(contents(&memory), vec!["B", "C", "D"]);
        assert_eq!(memory.len(), 3);
        assert!(memory.is_full());
    }

    #[test]
    fn test_never_exceeds_budget() {
        let mut memory = WorkingMemory::new(5);
        for i in 0..100 {
            memory.append(MemoryEntry::note(format!("entry {}", i)));
            assert!(memory.len() <= 5);
        }
        assert_eq!(contents(&memory).first().unwrap(), "entry 95");
    }

    #[test]
    fn test_recent_is_restartable() {
        let mut memory = WorkingMemory::new(10);
        for c in ["a", "b", "c", "d"] {
            memory.append(MemoryEntry::note(c));
        }
        let recent = memory.recent(2);
        assert_eq!(recent.len(), 2);

        let first: Vec<_> = recent.clone().map(|e| e.content.as_str()).collect();
        let second: Vec<_> = recent.map(|e| e.content.as_str()).collect();
        assert_eq!(first, vec!["c", "d"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_recent_more_than_len() {
        let mut memory = WorkingMemory::new(10);
        memory.append(MemoryEntry::note("only"));
        assert_eq!(memory.recent(50).count(), 1);
        assert_eq!(memory.recent(0).count(), 0);
    }

    #[test]
    fn test_zero_budget_raised_to_one() {
        let mut memory = WorkingMemory::new(0);
        memory.append(MemoryEntry::note("x"));
        memory.append(MemoryEntry::note("y"));
        assert_eq!(memory.budget(), 1);
        assert_eq!(contents(&memory), vec!["y"]);
    }

    #[test]
    fn test_render_recent() {
        let mut memory = WorkingMemory::new(4);
        memory.append(MemoryEntry::new(MemoryKind::WorkerResult, "found Milvus"));
        memory.append(MemoryEntry::note("remember latency"));
        let rendered = memory.render_recent(2);
        assert_eq!(rendered, "[worker_result] found Milvus\n[note] remember latency");
    }

    #[test]
    fn test_clear() {
        let mut memory = WorkingMemory::new(2);
        memory.append(MemoryEntry::note("x"));
        memory.clear();
        assert!(memory.is_empty());
    }
}
