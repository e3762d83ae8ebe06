use super::celltree::{Celltree, Node, TRAVERSAL_STACK_SIZE};
use crate::debug_invariants::inv_assert;

/// Iterator over the leaves of a [`Celltree`] whose region contains a point.
///
/// Uses a fixed stack; the builder guarantees the tree is shallow enough
/// for it.
pub struct PointTraversal<'a, const D: usize> {
    tree: &'a Celltree,
    stack: [u32; TRAVERSAL_STACK_SIZE],
    sp: usize,
    pos: [f64; D],
}

impl<'a, const D: usize> PointTraversal<'a, D> {
    pub fn new(tree: &'a Celltree, pos: &[f64; D]) -> Self {
        inv_assert!(
            tree.dimension() == D,
            "celltree of dimension {} queried with a {}-dimensional point",
            tree.dimension(),
            D
        );
        let stack = [0; TRAVERSAL_STACK_SIZE];
        Self {
            tree,
            stack,
            sp: usize::from(!tree.nodes().is_empty()),
            pos: *pos,
        }
    }

    #[inline]
    fn push(&mut self, node: usize) {
        inv_assert!(self.sp < TRAVERSAL_STACK_SIZE, "celltree traversal stack overflow");
        self.stack[self.sp] = node as u32;
        self.sp += 1;
    }
}

impl<'a, const D: usize> Iterator for PointTraversal<'a, D> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let nodes = self.tree.nodes();
        while self.sp > 0 {
            self.sp -= 1;
            let node = &nodes[self.stack[self.sp] as usize];
            if node.is_leaf() {
                return Some(node);
            }
            let p = self.pos[node.dim()];
            let lmax = f64::from(node.lmax());
            let rmin = f64::from(node.rmin());
            let left = p <= lmax;
            let right = p >= rmin;
            match (left, right) {
                // the side whose plane is farther from p is visited first
                (true, true) if lmax - p < p - rmin => {
                    self.push(node.left());
                    self.push(node.right());
                }
                (true, true) => {
                    self.push(node.right());
                    self.push(node.left());
                }
                (true, false) => self.push(node.left()),
                (false, true) => self.push(node.right()),
                (false, false) => {}
            }
        }
        None
    }
}
