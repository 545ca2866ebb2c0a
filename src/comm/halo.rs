//! Channel-based halo exchange between partition workers.
//!
//! Every worker owns one [`HaloExchange`]: a receiver for its inbox and a
//! sender to the inbox of every other worker. Collective operations are
//! numbered; each message carries the number of the operation it belongs
//! to, so a message that arrives early (a fast neighbour already in the
//! next operation) is stashed until it is asked for. All workers must call
//! the same collective operations in the same order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::NodeCommMap;
use crate::mesh::TetMesh;
use crate::operators::Vec3;
use crate::solver::{Fields, SolverError};

/// Default time a worker waits for a neighbour before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Message content.
#[derive(Clone, Debug, PartialEq)]
pub enum HaloPayload {
    /// Partial values of shared nodes, keyed by global id
    Rows(Vec<(usize, Vec<f64>)>),
    /// Partial dual-face normals of shared edges, keyed by (low, high) gid
    Edges(Vec<([usize; 2], Vec3)>),
    /// Row-major table of fixed shape
    Table(Vec<Vec<f64>>),
    Scalar(f64),
}

#[derive(Debug)]
struct HaloMessage {
    from: usize,
    tag: u64,
    payload: HaloPayload,
}

/// One worker's end of the halo channel mesh.
#[derive(Debug)]
pub struct HaloExchange {
    rank: usize,
    peers: BTreeMap<usize, Sender<HaloMessage>>,
    inbox: Receiver<HaloMessage>,
    stash: Vec<HaloMessage>,
    tag: u64,
    timeout: Duration,
}

impl HaloExchange {
    /// Fully connected endpoints for `n` workers, indexed by rank.
    pub fn mesh(n: usize) -> Vec<HaloExchange> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..n).map(|_| crossbeam_channel::unbounded()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| HaloExchange {
                rank,
                peers: senders
                    .iter()
                    .enumerate()
                    .filter(|&(r, _)| r != rank)
                    .map(|(r, s)| (r, s.clone()))
                    .collect(),
                inbox,
                stash: Vec::new(),
                tag: 0,
                timeout: DEFAULT_TIMEOUT,
            })
            .collect()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of workers in the group.
    pub fn size(&self) -> usize {
        self.peers.len() + 1
    }

    fn next_tag(&mut self) -> u64 {
        self.tag += 1;
        self.tag
    }

    fn send(&self, to: usize, tag: u64, payload: HaloPayload) -> Result<(), SolverError> {
        let peer = self
            .peers
            .get(&to)
            .ok_or_else(|| SolverError::Halo(format!("rank {} has no peer {to}", self.rank)))?;
        peer.send(HaloMessage {
            from: self.rank,
            tag,
            payload,
        })
        .map_err(|_| SolverError::Halo(format!("rank {to} hung up on rank {}", self.rank)))
    }

    fn recv(&mut self, from: usize, tag: u64) -> Result<HaloPayload, SolverError> {
        if let Some(i) = self.stash.iter().position(|m| m.from == from && m.tag == tag) {
            return Ok(self.stash.swap_remove(i).payload);
        }
        loop {
            let msg = self.inbox.recv_timeout(self.timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => SolverError::Halo(format!(
                    "rank {} timed out waiting for rank {from} (operation {tag})",
                    self.rank
                )),
                RecvTimeoutError::Disconnected => {
                    SolverError::Halo(format!("rank {} lost all peers", self.rank))
                }
            })?;
            if msg.from == from && msg.tag == tag {
                return Ok(msg.payload);
            }
            if msg.tag < tag {
                return Err(SolverError::Halo(format!(
                    "rank {} got stale operation {} from rank {} while in {tag}",
                    self.rank, msg.tag, msg.from
                )));
            }
            self.stash.push(msg);
        }
    }

    /// Add the partial rows of shared nodes from every neighbour into `f`.
    ///
    /// Rows sent are this partition's own partial values, so each shared
    /// node ends up with the sum over all partitions holding it.
    pub fn exchange_sum(
        &mut self,
        comm: &NodeCommMap,
        mesh: &TetMesh,
        f: &mut Fields,
    ) -> Result<(), SolverError> {
        let tag = self.next_tag();
        let neighbours: Vec<usize> = comm.neighbours().collect();
        for &n in &neighbours {
            let rows = comm
                .shared_with(n)
                .iter()
                .filter_map(|&g| mesh.lid(g).map(|p| (g, f.row(p).to_vec())))
                .collect();
            self.send(n, tag, HaloPayload::Rows(rows))?;
        }
        for &n in &neighbours {
            let HaloPayload::Rows(rows) = self.recv(n, tag)? else {
                return Err(SolverError::Halo(format!("expected node rows from rank {n}")));
            };
            log::trace!("rank {} <- rank {n}: {} rows (op {tag})", self.rank, rows.len());
            for (g, values) in rows {
                let p = mesh.lid(g).ok_or_else(|| {
                    SolverError::Halo(format!("rank {n} sent unknown node {g} to rank {}", self.rank))
                })?;
                if values.len() != f.nprop() {
                    return Err(SolverError::Halo(format!(
                        "row width {} from rank {n}, expected {}",
                        values.len(),
                        f.nprop()
                    )));
                }
                for (x, v) in f.row_mut(p).iter_mut().zip(values) {
                    *x += v;
                }
            }
        }
        Ok(())
    }

    /// Send every neighbour the partial dual normals of the edges it also
    /// holds, returning what each neighbour sent back.
    pub fn exchange_edges(
        &mut self,
        comm: &NodeCommMap,
        normals: &HashMap<[usize; 2], Vec3>,
    ) -> Result<BTreeMap<usize, HashMap<[usize; 2], Vec3>>, SolverError> {
        let tag = self.next_tag();
        let neighbours: Vec<usize> = comm.neighbours().collect();
        for &n in &neighbours {
            let shared = comm.shared_with(n);
            let held = |g: &usize| shared.binary_search(g).is_ok();
            let mut edges: Vec<([usize; 2], Vec3)> = normals
                .iter()
                .filter(|(k, _)| held(&k[0]) && held(&k[1]))
                .map(|(k, v)| (*k, *v))
                .collect();
            edges.sort_unstable_by_key(|(k, _)| *k);
            self.send(n, tag, HaloPayload::Edges(edges))?;
        }
        let mut received = BTreeMap::new();
        for &n in &neighbours {
            let HaloPayload::Edges(edges) = self.recv(n, tag)? else {
                return Err(SolverError::Halo(format!("expected edges from rank {n}")));
            };
            log::trace!("rank {} <- rank {n}: {} edges (op {tag})", self.rank, edges.len());
            received.insert(n, edges.into_iter().collect());
        }
        Ok(received)
    }

    /// Global minimum over all workers.
    pub fn reduce_min(&mut self, value: f64) -> Result<f64, SolverError> {
        let all = self.all_gather_scalar(value)?;
        Ok(all.into_iter().fold(f64::INFINITY, f64::min))
    }

    /// Global sum over all workers.
    pub fn reduce_sum(&mut self, value: f64) -> Result<f64, SolverError> {
        let all = self.all_gather_scalar(value)?;
        Ok(all.into_iter().sum())
    }

    fn all_gather_scalar(&mut self, value: f64) -> Result<Vec<f64>, SolverError> {
        let tag = self.next_tag();
        let peers: Vec<usize> = self.peers.keys().copied().collect();
        for &r in &peers {
            self.send(r, tag, HaloPayload::Scalar(value))?;
        }
        let mut all = Vec::with_capacity(peers.len() + 1);
        all.push(value);
        for &r in &peers {
            let HaloPayload::Scalar(v) = self.recv(r, tag)? else {
                return Err(SolverError::Halo(format!("expected a scalar from rank {r}")));
            };
            all.push(v);
        }
        Ok(all)
    }

    /// Tables of every worker, indexed by rank.
    pub fn all_gather_table(&mut self, table: Vec<Vec<f64>>) -> Result<Vec<Vec<Vec<f64>>>, SolverError> {
        let tag = self.next_tag();
        let peers: Vec<usize> = self.peers.keys().copied().collect();
        for &r in &peers {
            self.send(r, tag, HaloPayload::Table(table.clone()))?;
        }
        let mut all = vec![Vec::new(); self.size()];
        all[self.rank] = table;
        for &r in &peers {
            let HaloPayload::Table(t) = self.recv(r, tag)? else {
                return Err(SolverError::Halo(format!("expected a table from rank {r}")));
            };
            all[r] = t;
        }
        Ok(all)
    }
}
