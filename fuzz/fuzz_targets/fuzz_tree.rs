//! Fuzz testing for the tree operations.
//!
//! Drives an arbitrary operation sequence against a tree and a
//! `std::collections::BTreeSet` model in lockstep, then checks the
//! structural invariants and the full ordered contents.

#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use recordtree::{BTree, TreeOptions};

#[derive(Debug, Arbitrary)]
struct TreeInput {
    geometry: FuzzGeometry,
    small_cache: bool,
    operations: Vec<TreeOperation>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzGeometry {
    /// 28-byte pages, branch factor 5.
    Tiny,
    /// 32-byte pages with 3-byte records, branch factor 4.
    Narrow,
    /// 128-byte pages with 8-byte records, branch factor 11.
    Wide,
}

impl FuzzGeometry {
    fn sizes(self) -> (u32, u32) {
        match self {
            FuzzGeometry::Tiny => (28, 1),
            FuzzGeometry::Narrow => (32, 3),
            FuzzGeometry::Wide => (128, 8),
        }
    }
}

#[derive(Debug, Arbitrary)]
enum TreeOperation {
    Insert(u16),
    Remove(u16),
    Get(u16),
    IterateAll,
    IterateRange(u16, u16),
    Clear,
    Sync,
}

fn record(k: u16, value_size: usize) -> Vec<u8> {
    let bytes = k.to_be_bytes();
    (0..value_size).map(|i| bytes[i % 2]).collect()
}

fuzz_target!(|input: TreeInput| {
    if input.operations.len() > 1000 {
        return;
    }

    let (block_size, value_size) = input.geometry.sizes();
    let cache = if input.small_cache { 0 } else { 8 };

    let dir = tempfile::tempdir().unwrap();
    let options = TreeOptions::new(block_size, value_size).node_cache_size(cache);
    let mut tree = BTree::open(dir.path().join("fuzz.dat"), options).unwrap();
    let mut model: BTreeSet<Vec<u8>> = BTreeSet::new();

    let value_size = value_size as usize;
    for op in &input.operations {
        match op {
            TreeOperation::Insert(k) => {
                let v = record(*k, value_size);
                let old = tree.insert(&v).unwrap();
                let fresh = model.insert(v);
                assert_eq!(old.is_none(), fresh);
            }
            TreeOperation::Remove(k) => {
                let v = record(*k, value_size);
                let removed = tree.remove(&v).unwrap();
                assert_eq!(removed.is_some(), model.remove(&v));
            }
            TreeOperation::Get(k) => {
                let v = record(*k, value_size);
                let got = tree.get(&v).unwrap();
                assert_eq!(got.is_some(), model.contains(&v));
                if let Some(got) = got {
                    assert_eq!(got, v);
                }
            }
            TreeOperation::IterateAll => {
                let found: Vec<Vec<u8>> = tree.iterate_all().map(|r| r.unwrap()).collect();
                let expected: Vec<Vec<u8>> = model.iter().cloned().collect();
                assert_eq!(found, expected);
            }
            TreeOperation::IterateRange(a, b) => {
                let lo = record(*a, value_size);
                let hi = record(*b, value_size);
                let found: Vec<Vec<u8>> = tree
                    .iterate_range(&lo, &hi)
                    .map(|r| r.unwrap())
                    .collect();
                let expected: Vec<Vec<u8>> = if lo <= hi {
                    model.range(lo..=hi).cloned().collect()
                } else {
                    Vec::new()
                };
                assert_eq!(found, expected);
            }
            TreeOperation::Clear => {
                tree.clear().unwrap();
                model.clear();
            }
            TreeOperation::Sync => {
                tree.sync().unwrap();
            }
        }
    }

    let stats = tree.verify().unwrap();
    assert_eq!(stats.values as usize, model.len());

    let found: Vec<Vec<u8>> = tree.iterate_all().map(|r| r.unwrap()).collect();
    let expected: Vec<Vec<u8>> = model.iter().cloned().collect();
    assert_eq!(found, expected);
});
