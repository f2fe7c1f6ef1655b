//! Interned multicast delegate lists.

use std::sync::Arc;

use parking_lot::RwLock;

/// The id of the empty (null) delegate list.
pub const NO_HANDLERS: u32 = 0;

/// Append-only table of immutable handler lists.
///
/// Combining or removing never mutates an existing list — it interns a new
/// one and returns its id, mirroring how multicast delegates are immutable
/// and updates swap references. Ids are what event backing fields store and
/// compare-exchange on.
#[derive(Debug, Default)]
pub struct DelegateTable {
    lists: RwLock<Vec<Arc<Vec<u64>>>>,
}

impl DelegateTable {
    /// Create a table containing only the empty list.
    pub fn new() -> Self {
        DelegateTable {
            lists: RwLock::new(vec![Arc::new(Vec::new())]),
        }
    }

    fn intern(&self, list: Vec<u64>) -> u32 {
        if list.is_empty() {
            return NO_HANDLERS;
        }
        let mut lists = self.lists.write();
        lists.push(Arc::new(list));
        (lists.len() - 1) as u32
    }

    /// The handler tokens of list `id` (empty for unknown ids).
    pub fn handlers(&self, id: u32) -> Vec<u64> {
        self.lists
            .read()
            .get(id as usize)
            .map(|list| list.as_ref().clone())
            .unwrap_or_default()
    }

    /// Intern a single-handler list for a fresh subscriber token.
    pub fn singleton(&self, token: u64) -> u32 {
        self.intern(vec![token])
    }

    /// `Combine(a, b)`: concatenation; either empty side yields the other.
    pub fn combine(&self, a: u32, b: u32) -> u32 {
        if a == NO_HANDLERS {
            return b;
        }
        if b == NO_HANDLERS {
            return a;
        }
        let mut list = self.handlers(a);
        list.extend(self.handlers(b));
        self.intern(list)
    }

    /// `Remove(source, value)`: drop the last occurrence of `value`'s
    /// invocation list from `source`; no occurrence leaves `source` as is.
    pub fn remove(&self, source: u32, value: u32) -> u32 {
        if value == NO_HANDLERS || source == NO_HANDLERS {
            return source;
        }
        let haystack = self.handlers(source);
        let needle = self.handlers(value);
        if needle.len() > haystack.len() {
            return source;
        }
        let last_match = (0..=haystack.len() - needle.len())
            .rev()
            .find(|&start| haystack[start..start + needle.len()] == needle[..]);
        match last_match {
            Some(start) => {
                let mut list = haystack;
                list.drain(start..start + needle.len());
                self.intern(list)
            }
            None => source,
        }
    }
}
