//! Node store for the cache's three recency regions.
//!
//! One slab holds every live cache entry; three doubly-linked chains
//! (window, probation, protected) are threaded through the slab by stable
//! [`NodeId`] handles. A node carries its key, its value, its region tag,
//! and its linkage, so the key map outside only needs the handle: moving a
//! node between regions retags it in place and never invalidates the
//! handle the map holds.
//!
//! ## Layout
//!
//! ```text
//!   slots: Vec<Option<Node>>          chains: one (head, tail, len) per region
//!   ┌────┬──────────────────────────────────────┐
//!   │ id │ Node { key, value, region, prev/next }│
//!   ├────┼──────────────────────────────────────┤
//!   │ 0  │ { "a", .., Window,    ⟨1⟩ }          │◄─ window head
//!   │ 1  │ { "b", .., Window,    ⟨0⟩ }          │◄─ window tail
//!   │ 2  │ { "c", .., Probation, ⟨⟩  }          │◄─ probation head+tail
//!   │ 3  │ (free)                               │
//!   └────┴──────────────────────────────────────┘
//! ```
//!
//! Chain heads are the most recent position, tails the eviction end. Freed
//! slots are recycled through a free list; a `NodeId` stays valid until its
//! node is removed.
//!
//! ## Operations
//!
//! Linking (`push_front`, `push_back`, `insert_before`, `insert_after`),
//! repositioning (`move_to_front`, `move_to_back`), region transfer
//! (`detach`, `attach_front`, `attach_back`), and `remove` are all O(1).
//! `iter` walks one region front-to-back. Detaching always clears the
//! node's links.
//!
//! `debug_validate_invariants()` (debug/test builds) asserts that every
//! chained node's region tag matches the chain it is on, that chain
//! lengths are in sync, and that every allocated node is on exactly one
//! chain.

/// Recency region a node occupies.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    /// Freshly inserted entries awaiting their first overflow.
    Window,
    /// Entries admitted to the main area, still unproven.
    Probation,
    /// Reserved hot part of the main area.
    Protected,
}

/// Stable handle to a node in a [`RegionArena`].
///
/// A `NodeId` stays valid until the node is removed; after removal the
/// slot may be handed out again by a later push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One live cache entry: payload plus its region tag and chain linkage.
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    region: Region,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Ends and occupancy of one region's chain.
#[derive(Debug, Clone, Copy, Default)]
struct Chain {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

/// Slab of cache entry nodes threaded by the three region chains.
#[derive(Debug)]
pub struct RegionArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    chains: [Chain; 3],
}

impl<K, V> RegionArena<K, V> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            chains: [Chain::default(); 3],
        }
    }

    /// Creates an empty arena with slot capacity reserved for `capacity`
    /// nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            chains: [Chain::default(); 3],
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn allocate(&mut self, region: Region, key: K, value: V) -> NodeId {
        let node = Node {
            key,
            value,
            region,
            prev: None,
            next: None,
        };
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        NodeId(idx)
    }

    /// Returns the number of live nodes across all regions.
    pub fn len(&self) -> usize {
        self.chains.iter().map(|chain| chain.len).sum()
    }

    /// Returns `true` if no region holds any node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the occupancy of one region.
    pub fn region_len(&self, region: Region) -> usize {
        self.chains[region as usize].len
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Returns the region tag of a node, if it is live.
    pub fn region(&self, id: NodeId) -> Option<Region> {
        self.node(id).map(|node| node.region)
    }

    /// Returns the key of a node, if it is live.
    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    /// Returns the value of a node, if it is live.
    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.node(id).map(|node| &node.value)
    }

    /// Returns a mutable reference to the value of a node, if it is live.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    /// Returns the key/value at a region's front.
    pub fn front(&self, region: Region) -> Option<(&K, &V)> {
        self.chains[region as usize]
            .head
            .and_then(|id| self.node(id))
            .map(|node| (&node.key, &node.value))
    }

    /// Returns the key/value at a region's back (the eviction end).
    pub fn back(&self, region: Region) -> Option<(&K, &V)> {
        self.chains[region as usize]
            .tail
            .and_then(|id| self.node(id))
            .map(|node| (&node.key, &node.value))
    }

    /// Returns the id of a region's front node, if any.
    pub fn front_id(&self, region: Region) -> Option<NodeId> {
        self.chains[region as usize].head
    }

    /// Returns the id of a region's back node, if any.
    pub fn back_id(&self, region: Region) -> Option<NodeId> {
        self.chains[region as usize].tail
    }

    /// Allocates a node at the front of `region` and returns its id.
    pub fn push_front(&mut self, region: Region, key: K, value: V) -> NodeId {
        let id = self.allocate(region, key, value);
        self.attach_front(id, region);
        id
    }

    /// Allocates a node at the back of `region` and returns its id.
    pub fn push_back(&mut self, region: Region, key: K, value: V) -> NodeId {
        let id = self.allocate(region, key, value);
        self.attach_back(id, region);
        id
    }

    /// Allocates a node immediately before `mark`, in `mark`'s region.
    /// Returns `None` if `mark` is not live (the payload is dropped).
    pub fn insert_before(&mut self, mark: NodeId, key: K, value: V) -> Option<NodeId> {
        let (region, prev) = {
            let mark_node = self.node(mark)?;
            (mark_node.region, mark_node.prev)
        };
        match prev {
            Some(prev_id) => self.insert_after(prev_id, key, value),
            None => {
                let id = self.allocate(region, key, value);
                self.attach_front(id, region);
                Some(id)
            }
        }
    }

    /// Allocates a node immediately after `mark`, in `mark`'s region.
    /// Returns `None` if `mark` is not live (the payload is dropped).
    pub fn insert_after(&mut self, mark: NodeId, key: K, value: V) -> Option<NodeId> {
        let (region, next) = {
            let mark_node = self.node(mark)?;
            (mark_node.region, mark_node.next)
        };
        let id = self.allocate(region, key, value);
        if let Some(node) = self.node_mut(id) {
            node.prev = Some(mark);
            node.next = next;
        }
        if let Some(mark_node) = self.node_mut(mark) {
            mark_node.next = Some(id);
        }
        match next {
            Some(next_id) => {
                if let Some(next_node) = self.node_mut(next_id) {
                    next_node.prev = Some(id);
                }
            }
            None => self.chains[region as usize].tail = Some(id),
        }
        self.chains[region as usize].len += 1;
        Some(id)
    }

    /// Moves a node to the front of its own region; returns `false` if it
    /// is not live.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        match self.region(id) {
            Some(region) => self.attach_front(id, region),
            None => false,
        }
    }

    /// Moves a node to the back of its own region; returns `false` if it
    /// is not live.
    pub fn move_to_back(&mut self, id: NodeId) -> bool {
        match self.region(id) {
            Some(region) => self.attach_back(id, region),
            None => false,
        }
    }

    /// Unlinks a node from its region's chain, clearing its links. The
    /// node stays allocated (and keeps its stale tag) until it is either
    /// re-attached or removed. Returns `false` if the node is not live or
    /// already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let (region, prev, next) = match self.node(id) {
            Some(node) => (node.region, node.prev, node.next),
            None => return false,
        };
        let is_head = self.chains[region as usize].head == Some(id);
        if prev.is_none() && next.is_none() && !is_head {
            return false;
        }

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.node_mut(prev_id) {
                    prev_node.next = next;
                }
            }
            None => self.chains[region as usize].head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(next_node) = self.node_mut(next_id) {
                    next_node.prev = prev;
                }
            }
            None => self.chains[region as usize].tail = prev,
        }
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
        self.chains[region as usize].len -= 1;
        true
    }

    /// Links a node at the front of `region`, retagging it. Detaches it
    /// first if it is still chained elsewhere; a no-op if it is already
    /// that region's front. Returns `false` if the node is not live.
    pub fn attach_front(&mut self, id: NodeId, region: Region) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.chains[region as usize].head == Some(id) {
            return true;
        }
        self.detach(id);

        let old_head = self.chains[region as usize].head;
        if let Some(node) = self.node_mut(id) {
            node.region = region;
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head_id) => {
                if let Some(head_node) = self.node_mut(head_id) {
                    head_node.prev = Some(id);
                }
            }
            None => self.chains[region as usize].tail = Some(id),
        }
        self.chains[region as usize].head = Some(id);
        self.chains[region as usize].len += 1;
        true
    }

    /// Links a node at the back of `region`, retagging it. Detaches it
    /// first if it is still chained elsewhere; a no-op if it is already
    /// that region's back. Returns `false` if the node is not live.
    pub fn attach_back(&mut self, id: NodeId, region: Region) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.chains[region as usize].tail == Some(id) {
            return true;
        }
        self.detach(id);

        let old_tail = self.chains[region as usize].tail;
        if let Some(node) = self.node_mut(id) {
            node.region = region;
            node.next = None;
            node.prev = old_tail;
        }
        match old_tail {
            Some(tail_id) => {
                if let Some(tail_node) = self.node_mut(tail_id) {
                    tail_node.next = Some(id);
                }
            }
            None => self.chains[region as usize].head = Some(id),
        }
        self.chains[region as usize].tail = Some(id);
        self.chains[region as usize].len += 1;
        true
    }

    /// Removes a node entirely, returning its key and value. Works on
    /// chained and detached nodes alike; the slot is recycled.
    pub fn remove(&mut self, id: NodeId) -> Option<(K, V)> {
        if self.contains(id) {
            self.detach(id);
        }
        let slot = self.slots.get_mut(id.0)?;
        let node = slot.take()?;
        self.free.push(id.0);
        Some((node.key, node.value))
    }

    /// Drops every node and resets all chains.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.chains = [Chain::default(); 3];
    }

    /// Iterates one region's nodes front-to-back.
    pub fn iter(&self, region: Region) -> RegionIter<'_, K, V> {
        RegionIter {
            arena: self,
            current: self.chains[region as usize].head,
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut chained = 0usize;
        for region in [Region::Window, Region::Probation, Region::Protected] {
            let chain = &self.chains[region as usize];
            if chain.head.is_none() || chain.tail.is_none() {
                assert!(chain.head.is_none());
                assert!(chain.tail.is_none());
                assert_eq!(chain.len, 0, "{region:?} length out of sync");
                continue;
            }

            let mut seen = std::collections::HashSet::new();
            let mut prev = None;
            let mut current = chain.head;
            let mut count = 0usize;
            while let Some(id) = current {
                assert!(seen.insert(id), "cycle in {region:?} chain");
                let node = self.node(id).expect("chained node missing");
                assert_eq!(
                    node.region, region,
                    "node tag disagrees with the chain it is on"
                );
                assert_eq!(node.prev, prev);
                if node.next.is_none() {
                    assert_eq!(chain.tail, Some(id));
                }
                prev = Some(id);
                current = node.next;
                count += 1;
                assert!(count <= chain.len);
            }
            assert_eq!(count, chain.len, "{region:?} length out of sync");
            chained += count;
        }

        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, chained, "allocated node not on any region chain");

        let mut seen_free = std::collections::HashSet::new();
        for &idx in &self.free {
            assert!(idx < self.slots.len());
            assert!(self.slots[idx].is_none());
            assert!(seen_free.insert(idx));
        }
        assert_eq!(self.slots.len(), self.free.len() + live);
    }
}

impl<K, V> Default for RegionArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RegionIter<'a, K, V> {
    arena: &'a RegionArena<K, V>,
    current: Option<NodeId>,
}

impl<'a, K, V> Iterator for RegionIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.arena.node(id)?;
        self.current = node.next;
        Some((&node.key, &node.value))
    }
}
