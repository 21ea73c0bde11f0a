//! Multi-version in-memory keyspace.

use crate::types::SequenceNumber;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct Version {
    seq: SequenceNumber,
    /// `None` is a tombstone.
    value: Option<Vec<u8>>,
}

/// Committed state of the database, kept as a version chain per key.
///
/// A read at snapshot `s` sees, for each key, the newest version with
/// `seq <= s`. Chains are ordered by sequence number. Keys whose chain holds
/// more than one version, or a tombstone, are tracked so pruning does not
/// have to walk the whole map.
#[derive(Debug, Default)]
pub(crate) struct Keyspace {
    entries: BTreeMap<Vec<u8>, Vec<Version>>,
    stale: BTreeSet<Vec<u8>>,
}

impl Keyspace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &[u8], snapshot: SequenceNumber) -> Option<&[u8]> {
        visible(self.entries.get(key)?, snapshot)
    }

    /// All live pairs at `snapshot`, in key order.
    pub(crate) fn scan(&self, snapshot: SequenceNumber) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
            .iter()
            .filter_map(|(key, chain)| visible(chain, snapshot).map(|v| (key.clone(), v.to_vec())))
            .collect()
    }

    pub(crate) fn live_count(&self, snapshot: SequenceNumber) -> usize {
        self.entries
            .values()
            .filter(|chain| visible(chain, snapshot).is_some())
            .count()
    }

    /// Installs the writes of the commit `seq`. `seq` must exceed every
    /// sequence already present.
    pub(crate) fn apply<I>(&mut self, seq: SequenceNumber, writes: I)
    where
        I: IntoIterator<Item = (Vec<u8>, Option<Vec<u8>>)>,
    {
        for (key, value) in writes {
            let chain = self.entries.entry(key.clone()).or_default();
            let is_tombstone = value.is_none();
            chain.push(Version { seq, value });
            if chain.len() > 1 || is_tombstone {
                self.stale.insert(key);
            }
        }
    }

    /// Drops versions no snapshot at or after `horizon` can observe.
    pub(crate) fn prune(&mut self, horizon: SequenceNumber) {
        let mut still_stale = BTreeSet::new();

        for key in std::mem::take(&mut self.stale) {
            let Some(chain) = self.entries.get_mut(&key) else {
                continue;
            };

            if let Some(base) = chain.iter().rposition(|v| v.seq <= horizon) {
                chain.drain(..base);
                if chain[0].value.is_none() {
                    chain.remove(0);
                }
            }

            if chain.is_empty() {
                self.entries.remove(&key);
            } else if chain.len() > 1 || chain[0].value.is_none() {
                still_stale.insert(key);
            }
        }

        self.stale = still_stale;
    }

    #[cfg(test)]
    fn version_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

fn visible(chain: &[Version], snapshot: SequenceNumber) -> Option<&[u8]> {
    chain
        .iter()
        .rev()
        .find(|v| v.seq <= snapshot)
        .and_then(|v| v.value.as_deref())
}
