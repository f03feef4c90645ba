use fxhash::FxHashMap;

use crate::LabelId;

/// An explicit canonicalization table from raw input labels to dense
/// `0..K-1` integers.
///
/// The reference implementation this crate is built from canonicalizes
/// labels via a process-wide static populated as a side effect of loading
/// the *first* graph, which couples the data-graph load to whichever graph
/// happens to be loaded first. `LabelMap` replaces that: it is built once
/// from the data graph's raw labels and then threaded by value into the
/// query graph's loader, so both loads stay pure functions of their inputs.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    raw_to_canonical: FxHashMap<i32, LabelId>,
}

impl LabelMap {
    /// Builds a canonicalization table from the raw labels observed in a
    /// data graph. Distinct raw labels are collected, sorted ascending, and
    /// assigned consecutive ids starting at 0.
    pub fn build(raw_labels: impl IntoIterator<Item = i32>) -> Self {
        let mut distinct: Vec<i32> = raw_labels.into_iter().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let raw_to_canonical = distinct
            .into_iter()
            .enumerate()
            .map(|(canonical, raw)| (raw, canonical as LabelId))
            .collect();

        Self { raw_to_canonical }
    }

    /// Maps a raw label to its canonical id, or `-1` if the label never
    /// appeared in the data graph this map was built from.
    pub fn canonicalize(&self, raw_label: i32) -> LabelId {
        self.raw_to_canonical
            .get(&raw_label)
            .copied()
            .unwrap_or(-1)
    }

    /// Number of distinct labels known to this map.
    pub fn num_labels(&self) -> usize {
        self.raw_to_canonical.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_to_dense_ascending_ids() {
        let map = LabelMap::build([7, 3, 3, 9]);
        assert_eq!(map.num_labels(), 3);
        assert_eq!(map.canonicalize(3), 0);
        assert_eq!(map.canonicalize(7), 1);
        assert_eq!(map.canonicalize(9), 2);
    }

    #[test]
    fn unknown_label_maps_to_sentinel() {
        let map = LabelMap::build([1, 2]);
        assert_eq!(map.canonicalize(99), -1);
    }

    #[test]
    fn empty_map_sends_everything_to_sentinel() {
        let map = LabelMap::build([]);
        assert_eq!(map.canonicalize(0), -1);
    }
}
