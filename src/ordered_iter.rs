use ::ordered_iter::OrderedMapIterator;
use super::map;

impl<K, V> OrderedMapIterator for map::IntoIter<K, V> where K: Ord {
    type Key = K;
    type Val = V;
}

impl<'a, K, V> OrderedMapIterator for map::Iter<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a V;
}

impl<'a, K, V> OrderedMapIterator for map::IterMut<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a mut V;
}
