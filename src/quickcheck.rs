use ::quickcheck::{Arbitrary, Gen};
use compare::Compare;
use super::Map;

impl<K, V, C> Arbitrary for Map<K, V, C>
    where K: Arbitrary, V: Arbitrary, C: 'static + Clone + Compare<K> + Default {

    fn arbitrary(gen: &mut Gen) -> Self {
        Vec::<(K, V)>::arbitrary(gen).into_iter().collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item=Self>> {
        let vec: Vec<(K, V)> = self.clone().into_iter().collect();
        Box::new(vec.shrink().map(|vec| vec.into_iter().collect()))
    }
}
