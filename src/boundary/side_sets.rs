//! Side-set boundary policies resolved to faces and nodes.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::BcConfig;
use crate::mesh::{FaceData, TetMesh};
use crate::types::FaceIndex;

use super::BcKind;

/// Boundary policies of one system, resolved once per partition.
///
/// Lookups by boundary face or node are O(1); faces of side sets without a
/// configured policy, and partition-boundary faces outside every side set,
/// resolve to `None`.
#[derive(Clone, Debug)]
pub struct SideSetBcs {
    by_side_set: BTreeMap<i32, BcKind>,
    face_kind: Vec<Option<BcKind>>,
    node_kinds: Vec<u8>,
    nodes: BTreeMap<BcKind, Vec<usize>>,
    outlet_pressure: Option<f64>,
}

impl BcKind {
    const fn bit(self) -> u8 {
        match self {
            BcKind::Dirichlet => 1,
            BcKind::Symmetry => 2,
            BcKind::Extrapolate => 4,
            BcKind::Outlet => 8,
        }
    }
}

impl SideSetBcs {
    pub fn new(config: &BcConfig, mesh: &TetMesh, faces: &FaceData) -> Self {
        let mut by_side_set = BTreeMap::new();
        for (kind, ids) in [
            (BcKind::Dirichlet, &config.dirichlet),
            (BcKind::Symmetry, &config.symmetry),
            (BcKind::Extrapolate, &config.extrapolate),
            (BcKind::Outlet, &config.outlet),
        ] {
            for &id in ids {
                by_side_set.insert(id, kind);
            }
        }

        let mut face_kind = vec![None; faces.nbfac()];
        let mut untagged = 0;
        for (f, kind) in face_kind.iter_mut().enumerate() {
            *kind = faces
                .side_set_of(FaceIndex::new(f))
                .and_then(|id| by_side_set.get(&id).copied());
            if kind.is_none() {
                untagged += 1;
            }
        }
        if untagged > 0 {
            log::warn!("{untagged} boundary faces have no boundary condition, extrapolating");
        }

        let mut node_kinds = vec![0u8; mesh.n_nodes()];
        let mut nodes: BTreeMap<BcKind, BTreeSet<usize>> = BTreeMap::new();
        for (id, kind) in &by_side_set {
            for p in mesh.side_set_nodes(*id) {
                node_kinds[p] |= kind.bit();
                nodes.entry(*kind).or_default().insert(p);
            }
        }

        Self {
            by_side_set,
            face_kind,
            node_kinds,
            nodes: nodes.into_iter().map(|(k, s)| (k, s.into_iter().collect())).collect(),
            outlet_pressure: config.outlet_pressure,
        }
    }

    /// Policy of a side set.
    pub fn side_set_kind(&self, id: i32) -> Option<BcKind> {
        self.by_side_set.get(&id).copied()
    }

    /// Policy of boundary face `f`.
    #[inline]
    pub fn face_kind(&self, f: FaceIndex) -> Option<BcKind> {
        self.face_kind.get(f.get()).copied().flatten()
    }

    /// Whether node `p` lies on a side set with the given policy.
    #[inline]
    pub fn node_has(&self, p: usize, kind: BcKind) -> bool {
        self.node_kinds[p] & kind.bit() != 0
    }

    /// Sorted nodes on side sets with the given policy.
    pub fn nodes(&self, kind: BcKind) -> &[usize] {
        self.nodes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Side-set ids with the given policy.
    pub fn side_sets(&self, kind: BcKind) -> impl Iterator<Item = i32> + '_ {
        self.by_side_set
            .iter()
            .filter(move |&(_, k)| *k == kind)
            .map(|(id, _)| *id)
    }

    pub fn outlet_pressure(&self) -> Option<f64> {
        self.outlet_pressure
    }
}
