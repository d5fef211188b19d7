mod balance;
mod iter;

#[cfg(test)]
mod test;

use compare::Compare;
use std::cmp::Ordering::*;
use std::collections::TryReserveError;
use std::mem;
use std::ops;

pub use self::iter::{Indices, IntoIter, IterMut};

/// The arena index of a node, or `None` for an absent child (a black null leaf).
pub type Link = Option<usize>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Clone)]
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub color: Color,
    pub parent: Link,
    pub left: Link,
    pub right: Link,
}

#[derive(Clone)]
struct Slot<K, V> {
    // Bumped whenever the slot is freed or its payload is relocated.
    generation: u64,
    node: Option<Node<K, V>>,
}

/// A red-black tree whose nodes live in a slot arena.
///
/// Children are owned structurally through the arena; `parent` is a plain back-reference.
#[derive(Clone)]
pub struct Tree<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    // Generation given to newly pushed slots: above every generation a trimmed slot ever had.
    floor: u64,
    root: Link,
    len: usize,
}

/// The outcome of an ordered descent.
pub enum Search {
    /// A node holds a key equal to the query.
    Found(usize),
    /// No node holds the key; a new node would attach below `parent` on the given side.
    Vacant { parent: Link, left: bool },
}

impl<K, V> Tree<K, V> {
    pub fn new() -> Self { Tree::with_capacity(0) }

    pub fn with_capacity(capacity: usize) -> Self {
        Tree { slots: Vec::with_capacity(capacity), free: vec![], floor: 0, root: None, len: 0 }
    }

    pub fn len(&self) -> usize { self.len }

    pub fn root(&self) -> Link { self.root }

    pub fn capacity(&self) -> usize { self.slots.capacity() }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional.saturating_sub(self.free.len()));
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional.saturating_sub(self.free.len()))
    }

    /// Drops trailing vacant slots and releases spare capacity.
    ///
    /// Vacant slots below the last occupied one stay in place. Slots pushed later start above
    /// every generation the dropped slots reached, so stale handles keep failing to resolve.
    pub fn shrink_to_fit(&mut self) {
        while let Some(slot) = self.slots.last() {
            if slot.node.is_some() { break; }
            self.floor = self.floor.max(slot.generation);
            self.slots.pop();
        }

        let end = self.slots.len();
        self.free.retain(|&index| index < end);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    pub fn color(&self, link: Link) -> Color {
        link.map_or(Color::Black, |index| self[index].color)
    }

    pub fn generation(&self, index: usize) -> u64 { self.slots[index].generation }

    /// Returns the node at `index` if the slot is occupied and still at `generation`.
    pub fn get(&self, index: usize, generation: u64) -> Option<&Node<K, V>> {
        self.slots.get(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, index: usize, generation: u64) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn first(&self) -> Link { self.root.map(|root| Left::extremum(self, root)) }

    pub fn last(&self) -> Link { self.root.map(|root| Right::extremum(self, root)) }

    /// Drops every node. Slots are kept for reuse and their generations advance, so handles
    /// into the old contents never match a later entry. Reuse starts from the lowest slot.
    pub fn clear(&mut self) {
        self.free.clear();

        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() { slot.generation += 1; }
            self.free.push(index);
        }

        self.root = None;
        self.len = 0;
    }

    pub fn search<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> Search where C: Compare<Q, K> {
        let mut link = self.root;
        let mut parent = None;
        let mut left = false;

        while let Some(index) = link {
            let node = &self[index];

            match cmp.compare(key, &node.key) {
                Equal => return Search::Found(index),
                Less => { left = true; link = node.left; }
                Greater => { left = false; link = node.right; }
            }

            parent = Some(index);
        }

        Search::Vacant { parent: parent, left: left }
    }

    /// Links a new red node into a vacant position found by `search` and rebalances.
    pub fn attach(&mut self, parent: Link, left: bool, key: K, value: V) -> usize {
        let node = Node {
            key: key,
            value: value,
            color: Color::Red,
            parent: parent,
            left: None,
            right: None,
        };

        let index = self.alloc(node);

        match parent {
            None => self.root = Some(index),
            Some(parent) if left => self[parent].left = Some(index),
            Some(parent) => self[parent].right = Some(index),
        }

        self.len += 1;
        balance::insert_fixup(self, index);
        index
    }

    /// Removes the entry stored at `index`, returning its key and value together with the node
    /// that now holds the entry's in-order successor.
    ///
    /// A node with children is not unlinked itself: the payload of its in-order neighbour
    /// (the maximum of the left subtree, else the minimum of the right subtree) is moved into it
    /// and the neighbour's node is removed instead.
    pub fn remove(&mut self, index: usize) -> ((K, V), Link) {
        let (left, right) = (self[index].left, self[index].right);

        let (removed, next) = match (left, right) {
            (Some(left), _) => (Right::extremum(self, left), None),
            (None, Some(right)) => (Left::extremum(self, right), Some(index)),
            (None, None) => (index, Right::step(self, index)),
        };

        if removed != index {
            self.swap_payload(index, removed);
            self.slots[index].generation += 1;
        }

        self.unlink(removed);
        let node = self.dealloc(removed);

        let next = match left {
            Some(_) => Right::step(self, index),
            None => next,
        };

        ((node.key, node.value), next)
    }

    /// Rotates the node at `index` down in direction `D`; its child on the opposite side takes its
    /// place. Does nothing if that child is absent.
    pub fn rotate<D: Dir>(&mut self, index: usize) {
        let pivot = match D::Opposite::link(&self[index]) {
            Some(pivot) => pivot,
            None => return,
        };

        let inner = D::link(&self[pivot]);
        *D::Opposite::link_mut(&mut self[index]) = inner;
        if let Some(inner) = inner { self[inner].parent = Some(index); }

        let parent = self[index].parent;
        self[pivot].parent = parent;
        self.replace_child(parent, index, Some(pivot));

        *D::link_mut(&mut self[pivot]) = Some(index);
        self[index].parent = Some(pivot);
    }

    fn replace_child(&mut self, parent: Link, old: usize, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self[parent];
                if node.left == Some(old) { node.left = new; } else { node.right = new; }
            }
        }
    }

    // Splices out a node with at most one child.
    fn unlink(&mut self, index: usize) {
        let (child, parent, color) = {
            let node = &self[index];
            (node.left.or(node.right), node.parent, node.color)
        };

        if let Some(child) = child { self[child].parent = parent; }
        self.replace_child(parent, index, child);

        if color == Color::Black { balance::remove_fixup(self, child, parent); }
    }

    fn swap_payload(&mut self, a: usize, b: usize) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi);

        if let (Some(x), Some(y)) = (head[lo].node.as_mut(), tail[0].node.as_mut()) {
            mem::swap(&mut x.key, &mut y.key);
            mem::swap(&mut x.value, &mut y.value);
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot { generation: self.floor, node: Some(node) });
                self.slots.len() - 1
            }
        }
    }

    fn dealloc(&mut self, index: usize) -> Node<K, V> {
        let slot = &mut self.slots[index];
        let node = slot.node.take().unwrap_or_else(|| panic!("freeing vacant slot {}", index));
        slot.generation += 1;
        self.free.push(index);
        self.len -= 1;
        node
    }
}

impl<K, V> ops::Index<usize> for Tree<K, V> {
    type Output = Node<K, V>;

    fn index(&self, index: usize) -> &Node<K, V> {
        match self.slots[index].node {
            Some(ref node) => node,
            None => panic!("link to vacant slot {}", index),
        }
    }
}

impl<K, V> ops::IndexMut<usize> for Tree<K, V> {
    fn index_mut(&mut self, index: usize) -> &mut Node<K, V> {
        match self.slots[index].node {
            Some(ref mut node) => node,
            None => panic!("link to vacant slot {}", index),
        }
    }
}

/// A side of a node, used to write each rebalancing case once for both mirror images.
pub trait Dir: Sized {
    type Opposite: Dir<Opposite = Self>;

    fn link<K, V>(node: &Node<K, V>) -> Link;
    fn link_mut<K, V>(node: &mut Node<K, V>) -> &mut Link;

    /// Follows `Self` links from `index` as far as they go.
    fn extremum<K, V>(tree: &Tree<K, V>, mut index: usize) -> usize {
        while let Some(child) = Self::link(&tree[index]) { index = child; }
        index
    }

    /// Returns the in-order neighbour of `index` on the `Self` side: the successor for `Right`,
    /// the predecessor for `Left`.
    fn step<K, V>(tree: &Tree<K, V>, mut index: usize) -> Link {
        if let Some(child) = Self::link(&tree[index]) {
            return Some(Self::Opposite::extremum(tree, child));
        }

        while let Some(parent) = tree[index].parent {
            if Self::Opposite::link(&tree[parent]) == Some(index) { return Some(parent); }
            index = parent;
        }

        None
    }
}

pub enum Left {}

impl Dir for Left {
    type Opposite = Right;

    fn link<K, V>(node: &Node<K, V>) -> Link { node.left }
    fn link_mut<K, V>(node: &mut Node<K, V>) -> &mut Link { &mut node.left }
}

pub enum Right {}

impl Dir for Right {
    type Opposite = Left;

    fn link<K, V>(node: &Node<K, V>) -> Link { node.right }
    fn link_mut<K, V>(node: &mut Node<K, V>) -> &mut Link { &mut node.right }
}
