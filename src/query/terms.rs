use crate::memory::arena::{Arena, ArenaRef};

/// A parsed query term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTerm<'a> {
    pub text: &'a str,
    pub frequency: u32,    // Occurrences in the query
}

#[derive(Debug, Clone, Copy)]
struct TermEntry {
    text: ArenaRef,
    frequency: u32,
}

/// Ordered, de-duplicated query terms whose text lives in an arena.
///
/// Only handles are kept here, so the list is valid for one arena
/// generation: after the arena rewinds, `clear` must be called before reuse.
#[derive(Debug, Default)]
pub struct TermList {
    entries: Vec<TermEntry>,
}

impl TermList {
    pub fn new() -> Self {
        TermList { entries: Vec::new() }
    }

    /// Add a term, counting repeats instead of storing them twice.
    pub fn push(&mut self, arena: &Arena, text: &str) {
        for entry in &mut self.entries {
            if arena.get(&entry.text) == Some(text.as_bytes()) {
                entry.frequency += 1;
                return;
            }
        }
        self.entries.push(TermEntry {
            text: arena.store(text.as_bytes()),
            frequency: 1,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter<'a>(&'a self, arena: &'a Arena) -> impl Iterator<Item = QueryTerm<'a>> + 'a {
        self.entries.iter().filter_map(move |entry| {
            let bytes = arena.get(&entry.text)?;
            let text = std::str::from_utf8(bytes).ok()?;
            Some(QueryTerm { text, frequency: entry.frequency })
        })
    }
}

/// Borrowed view of the current query's terms
#[derive(Clone, Copy)]
pub struct Terms<'a> {
    list: &'a TermList,
    arena: &'a Arena,
}

impl<'a> Terms<'a> {
    pub fn new(list: &'a TermList, arena: &'a Arena) -> Self {
        Terms { list, arena }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = QueryTerm<'a>> + use<'a> {
        self.list.iter(self.arena)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|term| term.text.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_counted() {
        let arena = Arena::new();
        let mut terms = TermList::new();
        terms.push(&arena, "rust");
        terms.push(&arena, "heap");
        terms.push(&arena, "rust");

        let view = Terms::new(&terms, &arena);
        let collected: Vec<_> = view.iter().collect();
        assert_eq!(collected, vec![
            QueryTerm { text: "rust", frequency: 2 },
            QueryTerm { text: "heap", frequency: 1 },
        ]);
    }

    #[test]
    fn test_stale_terms_hidden_after_rewind() {
        let mut arena = Arena::new();
        let mut terms = TermList::new();
        terms.push(&arena, "stale");

        arena.rewind();
        assert_eq!(terms.iter(&arena).count(), 0);

        terms.clear();
        terms.push(&arena, "fresh");
        assert_eq!(Terms::new(&terms, &arena).to_strings(), vec!["fresh".to_string()]);
    }
}
