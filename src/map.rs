//! An ordered map based on a red-black tree.

use compare::{Compare, Natural};
use std::cmp::Ordering::{self, *};
use std::fmt::{self, Debug};
use std::hash::{self, Hash};
use std::mem;
use std::ops;
use tracing::warn;
use super::node::{self, Dir, Indices, Left, Link, Right, Search, Tree};
use super::Error;

/// An ordered map based on a red-black tree.
///
/// Keys are unique under the map's comparator. Inserting a key that is already present leaves
/// the stored entry untouched, so the first write wins.
///
/// The behavior of this map is unspecified if a key's ordering relative to any other key changes
/// while the key is in the map. This is normally only possible through `Cell`, `RefCell`, or
/// unsafe code.
#[derive(Clone)]
pub struct Map<K, V, C = Natural<K>> where C: Compare<K> {
    tree: Tree<K, V>,
    cmp: C,
}

/// A detached position in a map: an entry or the end sentinel one past the last entry.
///
/// A handle stays valid across every mutation that does not remove its entry. Erasing an entry
/// invalidates its handle and, if the entry had children, the handle of the in-order neighbour
/// whose storage took its place. Invalid handles resolve to `None`; they never alias another
/// entry of the same map. Using a handle with a map other than the one that produced it is a
/// logic error.
///
/// # Examples
///
/// ```
/// let mut map = rbtree::Map::new();
///
/// let (two, _) = map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// assert_eq!(map.get_at(two), Some((&2, &"b")));
/// assert!(map.end().is_end());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(Option<(usize, u64)>);

impl Handle {
    /// The end sentinel.
    pub const END: Handle = Handle(None);

    /// Checks if this is the end sentinel.
    pub fn is_end(&self) -> bool { self.0.is_none() }

    fn new<K, V>(tree: &Tree<K, V>, link: Link) -> Self {
        Handle(link.map(|index| (index, tree.generation(index))))
    }
}

impl<K, V> Map<K, V> where K: Ord {
    /// Creates an empty map ordered according to the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn new() -> Self { Map::with_cmp(compare::natural()) }

    /// Creates an empty map ordered according to the natural order of its keys, with room for at
    /// least `capacity` entries before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Map::with_capacity_and_cmp(capacity, compare::natural())
    }
}

impl<K, V, C> Map<K, V, C> where C: Compare<K> {
    /// Creates an empty map ordered according to the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let mut map = rbtree::Map::with_cmp(natural().rev());
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Map { tree: Tree::new(), cmp: cmp }
    }

    /// Creates an empty map ordered according to the given comparator, with room for at least
    /// `capacity` entries before reallocating.
    pub fn with_capacity_and_cmp(capacity: usize, cmp: C) -> Self {
        Map { tree: Tree::with_capacity(capacity), cmp: cmp }
    }

    /// Builds a map from a sequence of entries, keeping the first entry for each key.
    ///
    /// Every node is allocated fallibly. If an allocation fails, the entries inserted so far are
    /// discarded and the error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: rbtree::Map<_, _> =
    ///     rbtree::Map::try_from_iter(vec![(5, "a"), (3, "b"), (5, "c")]).unwrap();
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map[&5], "a");
    /// assert_eq!(map[&3], "b");
    /// ```
    pub fn try_from_iter<I>(it: I) -> Result<Self, Error>
        where I: IntoIterator<Item=(K, V)>, C: Default {

        Map::try_from_iter_with_cmp(it, C::default())
    }

    /// Builds a map ordered according to the given comparator from a sequence of entries,
    /// keeping the first entry for each key.
    ///
    /// Fails the same way as [`Map::try_from_iter`](#method.try_from_iter).
    pub fn try_from_iter_with_cmp<I>(it: I, cmp: C) -> Result<Self, Error>
        where I: IntoIterator<Item=(K, V)> {

        let mut map = Map::with_cmp(cmp);

        for (key, value) in it {
            if let Err(err) = map.try_insert(key, value) {
                warn!(discarded = map.len(), error = %err, "discarding partially built map");
                return Err(err);
            }
        }

        Ok(map)
    }

    /// Checks if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert!(map.is_empty());
    ///
    /// map.insert(2, "b");
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool { self.tree.root().is_none() }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.len(), 0);
    ///
    /// map.insert(2, "b");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize { self.tree.len() }

    /// Returns the number of entries the map can hold without reallocating.
    pub fn capacity(&self) -> usize { self.tree.capacity() }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) { self.tree.reserve(additional) }

    /// Tries to reserve room for at least `additional` more entries, leaving the map unchanged on
    /// failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional).map_err(Error::from)
    }

    /// Releases storage left behind by removed entries.
    ///
    /// Storage is reclaimed from the top of the map's node arena down to its highest live entry;
    /// holes below it are kept for reuse by later insertions. After [`Map::clear`](#method.clear)
    /// all storage can be released. Handles stay exactly as valid as they were.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map: rbtree::Map<_, _> = (0..1000).map(|i| (i, i)).collect();
    ///
    /// map.clear();
    /// map.insert(1, 1);
    /// map.shrink_to_fit();
    ///
    /// assert!(map.capacity() < 1000);
    /// assert_eq!(map[&1], 1);
    /// ```
    pub fn shrink_to_fit(&mut self) { self.tree.shrink_to_fit() }

    /// Returns a reference to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let map: rbtree::Map<i32, &str> = rbtree::Map::new();
    /// assert!(map.cmp().compares_lt(&1, &2));
    ///
    /// let map: rbtree::Map<i32, &str, _> = rbtree::Map::with_cmp(natural().rev());
    /// assert!(map.cmp().compares_gt(&1, &2));
    /// ```
    pub fn cmp(&self) -> &C { &self.cmp }

    /// Removes all entries from the map.
    ///
    /// Handles into the map's old contents become invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.iter().next(), Some((&1, &"a")));
    ///
    /// map.clear();
    ///
    /// assert_eq!(map.len(), 0);
    /// assert_eq!(map.iter().next(), None);
    /// ```
    pub fn clear(&mut self) { self.tree.clear() }

    /// Exchanges the contents and comparators of two maps.
    ///
    /// Handles keep referring to the entries they were created for, which now live in the other
    /// map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut a = rbtree::Map::new();
    /// let mut b = rbtree::Map::new();
    ///
    /// a.insert(1, "a");
    /// b.insert(2, "b");
    /// b.insert(3, "c");
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a.len(), 2);
    /// assert_eq!(b.get(&1), Some(&"a"));
    /// ```
    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    /// Inserts an entry into the map unless the map already contains the key.
    ///
    /// Returns a handle to the entry stored under the key and whether the entry was newly
    /// inserted. Inserting a key that is already present does not modify the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// let (handle, inserted) = map.insert(1, "a");
    /// assert!(inserted);
    /// assert_eq!(map.get_at(handle), Some((&1, &"a")));
    ///
    /// let (again, inserted) = map.insert(1, "b");
    /// assert!(!inserted);
    /// assert_eq!(again, handle);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        match self.tree.search(&self.cmp, &key) {
            Search::Found(index) => (Handle::new(&self.tree, Some(index)), false),
            Search::Vacant { parent, left } => {
                let index = self.tree.attach(parent, left, key, value);
                (Handle::new(&self.tree, Some(index)), true)
            }
        }
    }

    /// Like [`Map::insert`](#method.insert), but allocates the new node fallibly.
    ///
    /// If the allocation fails, the map is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// assert_eq!(map.try_insert(1, "a").map(|(_, inserted)| inserted), Ok(true));
    /// assert_eq!(map.try_insert(1, "b").map(|(_, inserted)| inserted), Ok(false));
    /// assert_eq!(map[&1], "a");
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(Handle, bool), Error> {
        match self.tree.search(&self.cmp, &key) {
            Search::Found(index) => Ok((Handle::new(&self.tree, Some(index)), false)),
            Search::Vacant { parent, left } => {
                self.tree.try_reserve(1)?;
                let index = self.tree.attach(parent, left, key, value);
                Ok((Handle::new(&self.tree, Some(index)), true))
            }
        }
    }

    /// Removes the entry whose key is equal to the given key.
    ///
    /// Returns a handle to the entry that followed the removed one and whether an entry was
    /// removed. The handle is the end sentinel if the removed entry was the last one or if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let (next, removed) = map.erase(&2);
    /// assert!(removed);
    /// assert_eq!(map.get_at(next), Some((&3, &"c")));
    ///
    /// let (next, removed) = map.erase(&2);
    /// assert!(!removed);
    /// assert!(next.is_end());
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn erase<Q: ?Sized>(&mut self, key: &Q) -> (Handle, bool) where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Search::Found(index) => {
                let (_, next) = self.tree.remove(index);
                (Handle::new(&self.tree, next), true)
            }
            Search::Vacant { .. } => (Handle::END, false),
        }
    }

    /// Removes and returns the entry whose key is equal to the given key, returning
    /// `None` if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.remove(&1), Some((1, "a")));
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), None);
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)> where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Search::Found(index) => Some(self.tree.remove(index).0),
            Search::Vacant { .. } => None,
        }
    }

    /// Returns a handle to the entry whose key is equal to the given key, or the end sentinel if
    /// the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.find(&1), map.end());
    ///
    /// map.insert(1, "a");
    /// assert_eq!(map.get_at(map.find(&1)), Some((&1, &"a")));
    /// ```
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Handle where C: Compare<Q, K> {
        Handle::new(&self.tree, self.index_of(key))
    }

    /// Checks if the map contains the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert!(!map.contains_key(&1));
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool where C: Compare<Q, K> {
        self.index_of(key).is_some()
    }

    /// Returns a reference to the value associated with the given key, or `None` if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V> where C: Compare<Q, K> {
        self.index_of(key).map(|index| &self.tree[index].value)
    }

    /// Returns a mutable reference to the value associated with the given key, or `None`
    /// if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    ///
    /// {
    ///     let value = map.get_mut(&1).unwrap();
    ///     assert_eq!(*value, "a");
    ///     *value = "b";
    /// }
    ///
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V> where C: Compare<Q, K> {
        match self.index_of(key) {
            Some(index) => Some(&mut self.tree[index].value),
            None => None,
        }
    }

    /// Returns the entry the given handle refers to, or `None` if the handle is the end sentinel
    /// or no longer valid.
    pub fn get_at(&self, handle: Handle) -> Option<(&K, &V)> {
        let (index, generation) = handle.0?;
        self.tree.get(index, generation).map(|node| (&node.key, &node.value))
    }

    /// Returns the entry the given handle refers to with a mutable reference to its value, or
    /// `None` if the handle is the end sentinel or no longer valid.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// let (handle, _) = map.insert(1, 10);
    ///
    /// for i in 2..100 { map.insert(i, i * 10); }
    ///
    /// *map.get_at_mut(handle).unwrap().1 += 1;
    /// assert_eq!(map[&1], 11);
    /// ```
    pub fn get_at_mut(&mut self, handle: Handle) -> Option<(&K, &mut V)> {
        let (index, generation) = handle.0?;
        self.tree.get_mut(index, generation).map(|node| (&node.key, &mut node.value))
    }

    /// Returns a reference to the map's minimum key and a reference to its associated
    /// value, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.first(), Some((&1, &"a")));
    /// ```
    pub fn first(&self) -> Option<(&K, &V)> { self.entry(self.tree.first()) }

    /// Returns a reference to the map's maximum key and a reference to its associated
    /// value, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    /// assert_eq!(map.last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.last(), Some((&3, &"c")));
    /// ```
    pub fn last(&self) -> Option<(&K, &V)> { self.entry(self.tree.last()) }

    /// Returns a handle to the entry with the minimum key, or the end sentinel if the map is
    /// empty.
    pub fn begin(&self) -> Handle { Handle::new(&self.tree, self.tree.first()) }

    /// Returns the end sentinel, the position one past the entry with the maximum key.
    pub fn end(&self) -> Handle { Handle::END }

    /// Returns a cursor positioned at the given handle.
    ///
    /// A handle that is no longer valid yields a cursor at the end sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut cursor = map.cursor(map.find(&2));
    /// cursor.move_next();
    /// assert_eq!(cursor.entry(), Some((&3, &"c")));
    /// cursor.move_next();
    /// assert!(cursor.is_end());
    /// cursor.move_prev();
    /// assert_eq!(cursor.key(), Some(&3));
    /// ```
    pub fn cursor(&self, handle: Handle) -> Cursor<'_, K, V> {
        let current = handle.0.and_then(|(index, generation)| {
            self.tree.get(index, generation).map(|_| index)
        });

        Cursor { tree: &self.tree, current: current }
    }

    /// Returns a cursor positioned at the entry with the minimum key, or at the end sentinel if
    /// the map is empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor { tree: &self.tree, current: self.tree.first() }
    }

    /// Returns a cursor positioned at the entry with the maximum key, or at the end sentinel if
    /// the map is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor { tree: &self.tree, current: self.tree.last() }
    }

    /// Returns an iterator that consumes the map.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.into_iter();
    /// assert_eq!(it.next(), Some((1, "a")));
    /// assert_eq!(it.next(), Some((2, "b")));
    /// assert_eq!(it.next(), Some((3, "c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn into_iter(self) -> IntoIter<K, V> { IntoIter(node::IntoIter::new(self.tree)) }

    /// Returns an iterator over the map's entries with immutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next_back(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> { Iter(Indices::new(&self.tree)) }

    /// Returns an iterator over the map's entries with mutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = rbtree::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// let mut i = 1;
    ///
    /// for (_, value) in map.iter_mut() {
    ///     assert_eq!(i, *value);
    ///     *value *= 2;
    ///     i += 1;
    /// }
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 4);
    /// assert_eq!(map[&"c"], 6);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut(node::IterMut::new(&mut self.tree))
    }

    /// Returns an iterator over the map's keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> { Keys(self.iter()) }

    /// Returns an iterator over the map's values in ascending order of their keys.
    pub fn values(&self) -> Values<'_, K, V> { Values(self.iter()) }

    /// Returns an iterator over mutable references to the map's values in ascending order of
    /// their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> { ValuesMut(self.iter_mut()) }

    fn index_of<Q: ?Sized>(&self, key: &Q) -> Link where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Search::Found(index) => Some(index),
            Search::Vacant { .. } => None,
        }
    }

    fn entry(&self, link: Link) -> Option<(&K, &V)> {
        link.map(|index| {
            let node = &self.tree[index];
            (&node.key, &node.value)
        })
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &Tree<K, V> { &self.tree }
}

impl<K, V, C> Debug for Map<K, V, C> where K: Debug, V: Debug, C: Compare<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> Default for Map<K, V, C> where C: Compare<K> + Default {
    fn default() -> Self { Map::with_cmp(Default::default()) }
}

/// Inserts each entry whose key is not yet present; later duplicates are ignored.
impl<K, V, C> Extend<(K, V)> for Map<K, V, C> where C: Compare<K> {
    fn extend<I: IntoIterator<Item=(K, V)>>(&mut self, it: I) {
        for (k, v) in it { self.insert(k, v); }
    }
}

/// Builds a map keeping the first entry for each key.
///
/// ```
/// let map: rbtree::Map<_, _> = vec![(5, "a"), (3, "b"), (5, "c")].into_iter().collect();
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map[&5], "a");
/// assert_eq!(map[&3], "b");
/// ```
impl<K, V, C> FromIterator<(K, V)> for Map<K, V, C> where C: Compare<K> + Default {
    fn from_iter<I: IntoIterator<Item=(K, V)>>(it: I) -> Self {
        let mut map: Self = Default::default();
        map.extend(it);
        map
    }
}

impl<K, V, C> Hash for Map<K, V, C> where K: Hash, V: Hash, C: Compare<K> {
    fn hash<H: hash::Hasher>(&self, h: &mut H) {
        for e in self.iter() { e.hash(h); }
    }
}

impl<'a, K, V, C, Q: ?Sized> ops::Index<&'a Q> for Map<K, V, C>
    where C: Compare<K> + Compare<Q, K> {

    type Output = V;
    fn index(&self, key: &Q) -> &V { self.get(key).expect("key not found") }
}

impl<'a, K, V, C> IntoIterator for &'a Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

impl<'a, K, V, C> IntoIterator for &'a mut Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> IterMut<'a, K, V> { self.iter_mut() }
}

impl<K, V, C> IntoIterator for Map<K, V, C> where C: Compare<K> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> IntoIter<K, V> { self.into_iter() }
}

impl<K, V, C> PartialEq for Map<K, V, C> where V: PartialEq, C: Compare<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(l, r)| {
            self.cmp.compares_eq(l.0, r.0) && l.1 == r.1
        })
    }
}

impl<K, V, C> Eq for Map<K, V, C> where V: Eq, C: Compare<K> {}

impl<K, V, C> PartialOrd for Map<K, V, C> where V: PartialOrd, C: Compare<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Some(Equal),
                (None, Some(_)) => return Some(Less),
                (Some(_), None) => return Some(Greater),
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.partial_cmp(r.1) {
                        Some(Equal) => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return Some(non_eq),
                },
            }
        }
    }
}

impl<K, V, C> Ord for Map<K, V, C> where V: Ord, C: Compare<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Equal,
                (None, Some(_)) => return Less,
                (Some(_), None) => return Greater,
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.cmp(r.1) {
                        Equal => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return non_eq,
                },
            }
        }
    }
}

/// A bidirectional cursor over a map's entries.
///
/// A cursor rests either on an entry or on the end sentinel. Moving past the last entry lands on
/// the end sentinel, and moving on from the end sentinel wraps around to the other end of the map.
///
/// Acquire through [`Map::cursor`](struct.Map.html#method.cursor),
/// [`Map::cursor_front`](struct.Map.html#method.cursor_front) or
/// [`Map::cursor_back`](struct.Map.html#method.cursor_back).
///
/// # Examples
///
/// ```
/// let map: rbtree::Map<_, _> = vec![(1, "a"), (2, "b")].into_iter().collect();
///
/// let mut cursor = map.cursor_back();
/// assert_eq!(cursor.key(), Some(&2));
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&1));
/// cursor.move_prev();
/// assert!(cursor.is_end());
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&2));
/// ```
pub struct Cursor<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    current: Link,
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self { Cursor { tree: self.tree, current: self.current } }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Checks if the cursor is at the end sentinel.
    pub fn is_end(&self) -> bool { self.current.is_none() }

    /// Returns a handle to the cursor's position.
    pub fn handle(&self) -> Handle { Handle::new(self.tree, self.current) }

    /// Returns the key at the cursor, or `None` at the end sentinel.
    pub fn key(&self) -> Option<&'a K> { self.entry().map(|e| e.0) }

    /// Returns the value at the cursor, or `None` at the end sentinel.
    pub fn value(&self) -> Option<&'a V> { self.entry().map(|e| e.1) }

    /// Returns the entry at the cursor, or `None` at the end sentinel.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.current.map(|index| (&tree[index].key, &tree[index].value))
    }

    /// Moves the cursor to the next entry in key order.
    ///
    /// From the last entry the cursor moves to the end sentinel; from the end sentinel it moves
    /// to the first entry.
    pub fn move_next(&mut self) { self.current = self.neighbor::<Right>(); }

    /// Moves the cursor to the previous entry in key order.
    ///
    /// From the first entry the cursor moves to the end sentinel; from the end sentinel it moves
    /// to the last entry.
    pub fn move_prev(&mut self) { self.current = self.neighbor::<Left>(); }

    /// Returns the entry `move_next` would move to.
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let mut cursor = self.clone();
        cursor.move_next();
        cursor.entry()
    }

    /// Returns the entry `move_prev` would move to.
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let mut cursor = self.clone();
        cursor.move_prev();
        cursor.entry()
    }

    fn neighbor<D: Dir>(&self) -> Link {
        match self.current {
            Some(index) => D::step(self.tree, index),
            None => self.tree.root().map(|root| D::Opposite::extremum(self.tree, root)),
        }
    }
}

/// An iterator that consumes the map.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::into_iter`](struct.Map.html#method.into_iter) or the
/// `IntoIterator` trait:
///
/// ```
/// let mut map = rbtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
#[derive(Clone)]
pub struct IntoIter<K, V>(node::IntoIter<K, V>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> { self.0.next_back() }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// An iterator over the map's entries with immutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter`](struct.Map.html#method.iter) or the `IntoIterator` trait:
///
/// ```
/// let mut map = rbtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct Iter<'a, K: 'a, V: 'a>(Indices<'a, K, V>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Iter<'a, K, V> { Iter(self.0.clone()) }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn entry(&self, index: usize) -> (&'a K, &'a V) {
        let node = &self.0.tree()[index];
        (&node.key, &node.value)
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.0.next()?;
        Some(self.entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.0.next_back()?;
        Some(self.entry(index))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// An iterator over the map's entries with mutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter_mut`](struct.Map.html#method.iter_mut) or the
/// `IntoIterator` trait:
///
/// ```
/// let mut map = rbtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &mut map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct IterMut<'a, K: 'a, V: 'a>(node::IterMut<'a, K, V>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next_back() }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

/// An iterator over the map's keys in ascending order.
///
/// Acquire through [`Map::keys`](struct.Map.html#method.keys).
pub struct Keys<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Keys<'a, K, V> { Keys(self.0.clone()) }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<&'a K> { self.0.next().map(|e| e.0) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> { self.0.next_back().map(|e| e.0) }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// An iterator over the map's values in ascending order of their keys.
///
/// Acquire through [`Map::values`](struct.Map.html#method.values).
pub struct Values<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Values<'a, K, V> {
    fn clone(&self) -> Values<'a, K, V> { Values(self.0.clone()) }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<&'a V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// An iterator over mutable references to the map's values in ascending order of their keys.
///
/// Acquire through [`Map::values_mut`](struct.Map.html#method.values_mut).
pub struct ValuesMut<'a, K: 'a, V: 'a>(IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<&'a mut V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}
