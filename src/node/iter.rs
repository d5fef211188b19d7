use std::mem;
use std::vec;
use super::{Dir, Left, Link, Right, Slot, Tree};

/// Walks node indices in key order by following parent links, from both ends.
pub struct Indices<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    front: Link,
    back: Link,
    size: usize,
}

impl<'a, K, V> Indices<'a, K, V> {
    pub fn new(tree: &'a Tree<K, V>) -> Self {
        Indices { tree: tree, front: tree.first(), back: tree.last(), size: tree.len() }
    }

    pub fn tree(&self) -> &'a Tree<K, V> { self.tree }
}

impl<'a, K, V> Clone for Indices<'a, K, V> {
    fn clone(&self) -> Self {
        Indices { tree: self.tree, front: self.front, back: self.back, size: self.size }
    }
}

impl<'a, K, V> Iterator for Indices<'a, K, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.size == 0 { return None; }
        let index = self.front?;
        self.front = Right::step(self.tree, index);
        self.size -= 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<'a, K, V> DoubleEndedIterator for Indices<'a, K, V> {
    fn next_back(&mut self) -> Option<usize> {
        if self.size == 0 { return None; }
        let index = self.back?;
        self.back = Left::step(self.tree, index);
        self.size -= 1;
        Some(index)
    }
}

impl<'a, K, V> ExactSizeIterator for Indices<'a, K, V> {}

/// Yields mutable references to the values in key order.
///
/// The entries are borrowed up front, one disjoint borrow per occupied slot, so the work done is
/// proportional to the number of entries rather than to the size of the arena.
pub struct IterMut<'a, K: 'a, V: 'a> {
    entries: vec::IntoIter<Option<(&'a K, &'a mut V)>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub fn new(tree: &'a mut Tree<K, V>) -> Self {
        // (slot, position in key order), sorted by slot so the arena can be split front to back.
        let mut order: Vec<(usize, usize)> =
            Indices::new(tree).enumerate().map(|(position, index)| (index, position)).collect();
        order.sort_unstable();

        let mut entries = Vec::with_capacity(order.len());
        entries.resize_with(order.len(), || None);

        let mut rest: &'a mut [Slot<K, V>] = &mut tree.slots;
        let mut offset = 0;

        for (index, position) in order {
            let slots = mem::take(&mut rest);
            let tail = slots.split_at_mut(index - offset).1;

            if let Some((slot, tail)) = tail.split_first_mut() {
                entries[position] = slot.node.as_mut().map(|node| (&node.key, &mut node.value));
                rest = tail;
                offset = index + 1;
            }
        }

        IterMut { entries: entries.into_iter() }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> { self.entries.next().flatten() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.entries.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> { self.entries.next_back().flatten() }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

/// Consumes a tree, yielding its entries in key order.
#[derive(Clone)]
pub struct IntoIter<K, V> {
    tree: Tree<K, V>,
    order: vec::IntoIter<usize>,
}

impl<K, V> IntoIter<K, V> {
    pub fn new(tree: Tree<K, V>) -> Self {
        let order: Vec<usize> = Indices::new(&tree).collect();
        IntoIter { tree: tree, order: order.into_iter() }
    }

    fn take(&mut self, index: usize) -> Option<(K, V)> {
        self.tree.slots[index].node.take().map(|node| (node.key, node.value))
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let index = self.order.next()?;
        self.take(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.order.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let index = self.order.next_back()?;
        self.take(index)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
