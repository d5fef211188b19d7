//! Red-black rebalancing after a node is attached or spliced out.

use tracing::trace;
use super::Color::{Black, Red};
use super::{Dir, Left, Link, Right, Tree};

/// Restores the red-black invariants after the red node at `index` was attached.
pub fn insert_fixup<K, V>(tree: &mut Tree<K, V>, mut index: usize) {
    loop {
        let parent = match tree[index].parent {
            None => {
                tree[index].color = Black;
                return;
            }
            Some(parent) => parent,
        };

        if tree[parent].color == Black { return; }

        let grandparent = match tree[parent].parent {
            None => {
                tree[parent].color = Black;
                return;
            }
            Some(grandparent) => grandparent,
        };

        let next = if tree[grandparent].left == Some(parent) {
            insert_case::<Left, _, _>(tree, index, parent, grandparent)
        } else {
            insert_case::<Right, _, _>(tree, index, parent, grandparent)
        };

        match next {
            Some(grandparent) => index = grandparent,
            None => return,
        }
    }
}

// `parent` is red and is the `D` child of `grandparent`. Returns the node the red-red violation
// moved up to, if any.
fn insert_case<D: Dir, K, V>(tree: &mut Tree<K, V>, index: usize, mut parent: usize,
                             grandparent: usize) -> Link {
    let uncle = D::Opposite::link(&tree[grandparent]);

    if let (Red, Some(uncle)) = (tree.color(uncle), uncle) {
        trace!(index, grandparent, "insert: red uncle, recoloring");
        tree[parent].color = Black;
        tree[uncle].color = Black;
        tree[grandparent].color = Red;
        return Some(grandparent);
    }

    if D::Opposite::link(&tree[parent]) == Some(index) {
        trace!(index, parent, "insert: inner grandchild, rotating parent");
        tree.rotate::<D>(parent);
        parent = index;
    }

    trace!(parent, grandparent, "insert: outer grandchild, rotating grandparent");
    tree[parent].color = Black;
    tree[grandparent].color = Red;
    tree.rotate::<D::Opposite>(grandparent);
    None
}

/// Restores the red-black invariants after a black node was spliced out from below `parent`,
/// leaving `link` (possibly a null leaf) one black node short.
pub fn remove_fixup<K, V>(tree: &mut Tree<K, V>, mut link: Link, mut parent: Link) {
    while tree.color(link) == Black {
        let index = match parent {
            None => break,
            Some(index) => index,
        };

        let next = if tree[index].left == link {
            remove_case::<Left, _, _>(tree, index)
        } else {
            remove_case::<Right, _, _>(tree, index)
        };

        match next {
            Some(up) => {
                link = Some(up);
                parent = tree[up].parent;
            }
            None => {
                link = tree.root();
                break;
            }
        }
    }

    if let Some(index) = link { tree[index].color = Black; }
}

// The `D` child of `parent` is short one black node. Returns the node the deficit moved up to,
// or `None` once it has been absorbed.
fn remove_case<D: Dir, K, V>(tree: &mut Tree<K, V>, parent: usize) -> Link {
    let mut sibling = D::Opposite::link(&tree[parent]);

    if let (Red, Some(red)) = (tree.color(sibling), sibling) {
        trace!(parent, "remove: red sibling, rotating parent");
        tree[red].color = Black;
        tree[parent].color = Red;
        tree.rotate::<D>(parent);
        sibling = D::Opposite::link(&tree[parent]);
    }

    // The short side has black height at least one less than this side, so a sibling exists.
    let mut sibling = match sibling {
        Some(sibling) => sibling,
        None => return Some(parent),
    };

    let near = D::link(&tree[sibling]);
    let far = D::Opposite::link(&tree[sibling]);

    if tree.color(near) == Black && tree.color(far) == Black {
        trace!(parent, sibling, "remove: black nephews, pushing deficit up");
        tree[sibling].color = Red;
        return Some(parent);
    }

    if tree.color(far) == Black {
        trace!(parent, sibling, "remove: red near nephew, rotating sibling");
        if let Some(near) = near { tree[near].color = Black; }
        tree[sibling].color = Red;
        tree.rotate::<D::Opposite>(sibling);

        sibling = match D::Opposite::link(&tree[parent]) {
            Some(sibling) => sibling,
            None => return Some(parent),
        };
    }

    trace!(parent, sibling, "remove: red far nephew, rotating parent");
    tree[sibling].color = tree[parent].color;
    tree[parent].color = Black;
    if let Some(far) = D::Opposite::link(&tree[sibling]) { tree[far].color = Black; }
    tree.rotate::<D>(parent);
    None
}
