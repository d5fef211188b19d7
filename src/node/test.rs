use ::quickcheck::{quickcheck, Arbitrary, Gen, TestResult};
use super::Color::{Black, Red};
use super::{Indices, Link, Tree};
use crate::Map;

/// An operation on a `Map`.
#[derive(Clone, Debug)]
enum Op<K> {
    /// Insert a key into the map.
    Insert(K),
    /// Remove the key at index `n % map.len()` from the map.
    Remove(usize),
    /// Erase a key that may or may not be present.
    Erase(K),
}

impl<K> Arbitrary for Op<K> where K: Arbitrary {
    fn arbitrary(gen: &mut Gen) -> Self {
        match u8::arbitrary(gen) % 3 {
            0 => Op::Remove(Arbitrary::arbitrary(gen)),
            1 => Op::Erase(Arbitrary::arbitrary(gen)),
            _ => Op::Insert(Arbitrary::arbitrary(gen)),
        }
    }
}

impl<K> Op<K> where K: Clone + Ord {
    /// Perform the operation on the given map.
    fn exec(self, map: &mut Map<K, ()>) {
        match self {
            Op::Insert(key) => { map.insert(key, ()); }
            Op::Remove(index) => if !map.is_empty() {
                let key = map.iter().nth(index % map.len()).unwrap().0.clone();
                assert!(map.remove(&key).is_some());
            },
            Op::Erase(key) => { map.erase(&key); }
        }
    }
}

fn check_subtree<K, V>(tree: &Tree<K, V>, link: Link, parent: Link) -> (usize, usize)
    where K: Ord {

    match link {
        None => (0, 0),
        Some(index) => {
            let node = &tree[index];
            assert_eq!(node.parent, parent, "child does not point back at its parent");

            if node.color == Red {
                assert_eq!(tree.color(node.left), Black, "red node with red left child");
                assert_eq!(tree.color(node.right), Black, "red node with red right child");
            }

            if let Some(left) = node.left { assert!(tree[left].key < node.key); }
            if let Some(right) = node.right { assert!(tree[right].key > node.key); }

            let (left_height, left_count) = check_subtree(tree, node.left, link);
            let (right_height, right_count) = check_subtree(tree, node.right, link);
            assert_eq!(left_height, right_height, "unequal black height");

            let own = if node.color == Black { 1 } else { 0 };
            (left_height + own, left_count + right_count + 1)
        }
    }
}

/// Asserts every red-black invariant and returns the tree's black height.
pub fn assert_red_black<K, V>(tree: &Tree<K, V>) -> usize where K: Ord {
    assert_eq!(tree.color(tree.root), Black, "red root");

    let (height, count) = check_subtree(tree, tree.root, None);
    assert_eq!(count, tree.len);

    let occupied = tree.slots.iter().filter(|slot| slot.node.is_some()).count();
    assert_eq!(occupied, tree.len);
    assert_eq!(occupied + tree.free.len(), tree.slots.len());

    let keys: Vec<&K> = Indices::new(tree).map(|index| &tree[index].key).collect();
    assert_eq!(keys.len(), tree.len);
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "in-order keys not strictly increasing");

    height
}

#[test]
fn test_red_black() {
    fn check(ops: Vec<Op<u8>>) -> TestResult {
        let mut map = Map::new();

        for op in ops {
            op.exec(&mut map);
            assert_red_black(map.tree());
        }

        TestResult::passed()
    }

    quickcheck(check as fn(_) -> _);
}

#[test]
fn test_ascending_insert_rotates_left() {
    let mut map = Map::new();
    map.insert(10, ());
    map.insert(20, ());
    map.insert(30, ());

    let tree = map.tree();
    let root = tree.root.unwrap();
    assert_eq!(tree[root].key, 20);
    assert_eq!(tree[root].color, Black);

    let left = tree[root].left.unwrap();
    let right = tree[root].right.unwrap();
    assert_eq!((tree[left].key, tree[left].color), (10, Red));
    assert_eq!((tree[right].key, tree[right].color), (30, Red));

    assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [10, 20, 30]);
}

#[test]
fn test_zig_zag_insert() {
    let mut map = Map::new();
    map.insert(30, ());
    map.insert(10, ());
    map.insert(20, ());

    let tree = map.tree();
    let root = tree.root.unwrap();
    assert_eq!(tree[root].key, 20);
    assert_red_black(tree);
}

#[test]
fn test_black_height_grows_logarithmically() {
    let mut map = Map::new();
    for i in 0..1024 { map.insert(i, i); }

    let height = assert_red_black(map.tree());
    assert!(height >= 5 && height <= 11, "black height {}", height);
}

#[test]
fn test_remove_every_shape() {
    let mut map = Map::new();
    for i in 0..200 { map.insert((i * 37) % 200, i); }
    assert_red_black(map.tree());

    for i in (0..200).filter(|i| i % 3 == 0) {
        assert!(map.remove(&i).is_some());
        assert_red_black(map.tree());
    }

    for i in (0..200).rev() {
        map.remove(&i);
        assert_red_black(map.tree());
    }

    assert!(map.is_empty());
    assert_eq!(map.tree().root, None);
}

#[test]
fn test_slots_are_reused() {
    let mut map = Map::new();
    for i in 0..16 { map.insert(i, ()); }
    let slots = map.tree().slots.len();

    for i in 0..8 { map.remove(&i); }
    for i in 100..108 { map.insert(i, ()); }

    assert_eq!(map.tree().slots.len(), slots);
    assert_red_black(map.tree());
}

#[test]
fn test_clear_advances_generations() {
    let mut map = Map::new();
    let (handle, _) = map.insert(1, "a");
    map.clear();
    assert_red_black(map.tree());

    let (fresh, _) = map.insert(1, "b");
    assert_eq!(map.get_at(handle), None);
    assert_eq!(map.get_at(fresh), Some((&1, &"b")));
}

#[test]
fn test_iter_mut_after_mass_erase() {
    let mut map = Map::new();
    for i in 0..10_000 { map.insert(i, i); }
    for i in 1..10_000 { map.erase(&i); }

    assert_eq!(map.len(), 1);
    assert_eq!(map.tree().slots.len(), 10_000);

    // The entry buffer holds exactly the live entries, whatever the arena's size.
    let mut it = map.iter_mut();
    assert_eq!(it.size_hint(), (1, Some(1)));

    let (key, value) = it.next().unwrap();
    assert_eq!(*key, 0);
    *value = 42;
    assert!(it.next().is_none());

    assert_eq!(map.values_mut().len(), 1);
    assert_eq!(map.get(&0), Some(&42));
}

#[test]
fn test_iter_mut_over_scattered_slots() {
    let mut map = Map::new();
    for i in 0..500 { map.insert((i * 173) % 500, i); }
    for i in (0..500).filter(|i| i % 7 != 0) { map.erase(&i); }
    for i in 1000..1020 { map.insert(i, i); }

    let expected: Vec<_> = map.iter().map(|(k, v)| (*k, *v + 1)).collect();

    let mut seen = 0;
    for (_, value) in map.iter_mut() {
        *value += 1;
        seen += 1;
    }
    assert_eq!(seen, map.len());

    let reversed: Vec<_> = map.iter_mut().rev().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(reversed.into_iter().rev().collect::<Vec<_>>(), expected);
    assert_red_black(map.tree());
}

#[test]
fn test_shrink_to_fit_trims_vacant_tail() {
    let mut map = Map::new();
    let handles: Vec<_> = (0..100).map(|i| map.insert(i, i).0).collect();

    map.clear();
    let (kept, _) = map.insert(7, 7);
    map.shrink_to_fit();

    assert_eq!(map.tree().slots.len(), 1);
    assert!(map.tree().free.is_empty());
    assert_red_black(map.tree());

    for i in 0..100 { map.insert(1000 + i, i); }
    assert_red_black(map.tree());

    for handle in &handles { assert_eq!(map.get_at(*handle), None); }
    assert_eq!(map.get_at(kept), Some((&7, &7)));
}

#[test]
fn test_shrink_to_fit_keeps_inner_holes() {
    let mut map = Map::new();
    for i in 0..64 { map.insert(i, ()); }
    let last = map.tree().slots.len();

    // Removing leaves frees slots throughout the arena; only a vacant tail can be dropped.
    for i in (0..64).filter(|i| i % 2 == 0) { map.remove(&i); }
    map.shrink_to_fit();

    let tree = map.tree();
    assert!(tree.slots.len() <= last);
    assert!(tree.slots.last().map_or(true, |slot| slot.node.is_some()));
    assert!(tree.free.iter().all(|&index| index < tree.slots.len()));
    assert_red_black(tree);

    for i in (0..64).filter(|i| i % 2 == 0) { map.insert(i, ()); }
    assert_eq!(map.len(), 64);
    assert_red_black(map.tree());
}
