//! Recency ordering for cache keys.
//!
//! An arena of slots holds the nodes of an index-linked doubly linked list.
//! The front is the most recently used key, the back the least recently
//! used one. Freed slots are recycled through a free list, and each slot
//! carries a generation counter so a [`NodeId`] handed out for a node that
//! has since been removed can never address its successor.

use std::borrow::Borrow;
use std::fmt;

/// Handle to a node inside a [`RecencyList`].
///
/// Valid until the node is removed; stale handles are rejected by
/// [`RecencyList::remove_node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot<K> {
    generation: u64,
    node: Option<Node<K>>,
}

/// Ordered sequence of keys, front = most recent.
///
/// `add`, `pop` and `remove_node` are O(1). Key-based `remove`,
/// `contains` and `index_of` walk from the front and are O(n).
pub struct RecencyList<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K> RecencyList<K> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key` as the new front element.
    ///
    /// Equal keys are not deduplicated; callers that need one node per key
    /// must remove the old node first.
    pub fn add(&mut self, key: K) -> NodeId {
        let node = Node {
            key,
            prev: None,
            next: self.head,
        };
        let index = self.allocate(node);

        if let Some(old_head) = self.head {
            if let Some(n) = self.node_mut(old_head) {
                n.prev = Some(index);
            }
        }
        self.head = Some(index);
        if self.tail.is_none() {
            self.tail = Some(index);
        }
        self.len += 1;

        NodeId {
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Removes the first occurrence of `key`, scanning from the front.
    ///
    /// Returns false (and changes nothing) if the key is absent.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        match self.position(key) {
            Some((index, _)) => {
                self.unlink(index);
                true
            }
            None => false,
        }
    }

    /// Removes the node addressed by `id`, returning its key.
    ///
    /// Returns `None` if the handle is stale or out of range.
    pub fn remove_node(&mut self, id: NodeId) -> Option<K> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation || slot.node.is_none() {
            return None;
        }
        self.unlink(id.index)
    }

    /// Returns true if some node holds `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).is_some()
    }

    /// Zero-based position of `key` from the front.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.position(key).map(|(_, position)| position)
    }

    /// Removes and returns the back (least recently used) key.
    pub fn pop(&mut self) -> Option<K> {
        let tail = self.tail?;
        self.unlink(tail)
    }

    /// The back (least recently used) key, without removing it.
    pub fn peek_back(&self) -> Option<&K> {
        self.tail.and_then(|i| self.node(i)).map(|n| &n.key)
    }

    /// The front (most recently used) key, without removing it.
    pub fn peek_front(&self) -> Option<&K> {
        self.head.and_then(|i| self.node(i)).map(|n| &n.key)
    }

    /// Front-to-back iterator over the keys.
    ///
    /// The shared borrow keeps the list frozen for the whole walk.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Owned front-to-back copy of the keys.
    pub fn snapshot(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Removes every key. Slots are kept for reuse and their generations
    /// bumped, so handles issued before the clear stay stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn node(&self, index: usize) -> Option<&Node<K>> {
        self.slots.get(index).and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<K>> {
        self.slots.get_mut(index).and_then(|s| s.node.as_mut())
    }

    fn position<Q>(&self, key: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let mut cursor = self.head;
        let mut position = 0;
        while let Some(index) = cursor {
            let node = self.node(index)?;
            if node.key.borrow() == key {
                return Some((index, position));
            }
            cursor = node.next;
            position += 1;
        }
        None
    }

    fn allocate(&mut self, node: Node<K>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Detaches the node at `index`, frees its slot and returns its key.
    fn unlink(&mut self, index: usize) -> Option<K> {
        let slot = self.slots.get_mut(index)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);

        match node.prev {
            Some(prev) => {
                if let Some(n) = self.node_mut(prev) {
                    n.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(n) = self.node_mut(next) {
                    n.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        self.len -= 1;

        Some(node.key)
    }
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for RecencyList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Front-to-back iterator returned by [`RecencyList::iter`].
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, K> IntoIterator for &'a RecencyList<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
