//! Shared-node bookkeeping between partitions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::mesh::TetMesh;

/// Global ids of the nodes a partition shares with each neighbour.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCommMap {
    rank: usize,
    shared: BTreeMap<usize, Vec<usize>>,
}

impl NodeCommMap {
    /// Communication maps of every partition, indexed by rank.
    pub fn build(meshes: &[&TetMesh]) -> Vec<NodeCommMap> {
        let mut holders: HashMap<usize, BTreeSet<usize>> = HashMap::new();
        for (rank, mesh) in meshes.iter().enumerate() {
            for &g in mesh.gid() {
                holders.entry(g).or_default().insert(rank);
            }
        }

        let mut maps: Vec<NodeCommMap> = (0..meshes.len())
            .map(|rank| NodeCommMap {
                rank,
                shared: BTreeMap::new(),
            })
            .collect();
        for (g, ranks) in holders.into_iter().filter(|(_, r)| r.len() > 1) {
            for &a in &ranks {
                for &b in ranks.iter().filter(|&&b| b != a) {
                    maps[a].shared.entry(b).or_default().push(g);
                }
            }
        }
        for map in &mut maps {
            for gids in map.shared.values_mut() {
                gids.sort_unstable();
            }
            log::info!(
                "partition {}: {} neighbours, {} shared node slots",
                map.rank,
                map.shared.len(),
                map.shared.values().map(Vec::len).sum::<usize>()
            );
        }
        maps
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Neighbouring partitions in increasing order.
    pub fn neighbours(&self) -> impl Iterator<Item = usize> + '_ {
        self.shared.keys().copied()
    }

    /// Sorted global ids shared with `neighbour` (empty if not adjacent).
    pub fn shared_with(&self, neighbour: usize) -> &[usize] {
        self.shared.get(&neighbour).map_or(&[], Vec::as_slice)
    }

    pub fn is_shared(&self, gid: usize) -> bool {
        self.shared.values().any(|g| g.binary_search(&gid).is_ok())
    }

    /// Whether `gid` is also held by a lower-ranked partition.
    pub fn is_slave(&self, gid: usize) -> bool {
        self.shared
            .range(..self.rank)
            .any(|(_, g)| g.binary_search(&gid).is_ok())
    }

    /// Per local node: `true` unless the node is shared with a
    /// lower-ranked partition.
    pub fn ownership_mask(&self, mesh: &TetMesh) -> Vec<bool> {
        mesh.gid().iter().map(|&g| !self.is_slave(g)).collect()
    }
}
