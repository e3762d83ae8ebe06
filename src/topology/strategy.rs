//! Strategy arena shared by every cell of a complex.
//!
//! A strategy describes where the values of one cell shape live relative to
//! the cell's `base`: value `i` sits at slot `base + offsets[i]`. Whether a
//! slot is a point index (structured complexes) or a position in the index
//! array (unstructured complexes) is decided by the complex.
//!
//! Each strategy also owns the strategies of its faces. Faces share their
//! parent's `base` and compose the offsets through the static face tables,
//! so a face view costs nothing to create.

use super::cell_type::CellType;

/// Index of a strategy inside a complex's arena.
pub type StrategyId = u32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Strategy {
    pub cell_type: CellType,
    pub offsets: Box<[usize]>,
    pub faces: Box<[StrategyId]>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct StrategyArena {
    nodes: Vec<Strategy>,
}

impl StrategyArena {
    /// Adds a strategy for `cell_type` with the given value offsets, together
    /// with the strategies of all its faces, and returns its id.
    pub fn insert(&mut self, cell_type: CellType, offsets: Vec<usize>) -> StrategyId {
        debug_assert_eq!(offsets.len(), cell_type.num_values());
        let faces = cell_type
            .faces()
            .iter()
            .map(|f| {
                let composed = f.local.iter().map(|&l| offsets[l]).collect();
                self.insert(f.cell_type, composed)
            })
            .collect();
        let id = self.nodes.len() as StrategyId;
        self.nodes.push(Strategy {
            cell_type,
            offsets: offsets.into_boxed_slice(),
            faces,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: StrategyId) -> &Strategy {
        &self.nodes[id as usize]
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_compose_offsets() {
        let mut arena = StrategyArena::default();
        let tet = arena.insert(CellType::Tetrahedron, vec![10, 11, 12, 13]);
        let node = arena.get(tet);
        assert_eq!(node.faces.len(), 4);
        let face0 = arena.get(node.faces[0]);
        assert_eq!(face0.cell_type, CellType::Triangle);
        assert_eq!(&*face0.offsets, &[11, 12, 13]);
        let edge = arena.get(face0.faces[2]);
        assert_eq!(&*edge.offsets, &[13, 11]);
    }

    #[test]
    fn arena_holds_the_whole_face_hierarchy() {
        let mut arena = StrategyArena::default();
        arena.insert(CellType::Hexahedron, (0..8).collect());
        // hexahedron, 6 quads, 24 edges, 48 end points
        assert_eq!(arena.len(), 1 + 6 + 24 + 48);
    }
}
