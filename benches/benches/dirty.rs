// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for ancestor path propagation and viewport math.

use std::sync::Arc;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use arbor_dirty::{
    LayoutFlags, PathFlags, PathTree, UnidimensionalViewport, compute_bring_into_view_distance,
    compute_effective_viewport, propagate_on_path,
};
use arbor_object::ObjectGraph;
use arbor_property::{ObjectId, PropertyTableBuilder, TypeIndex};

/// Parent-array tree.
#[derive(Clone)]
struct Chain {
    parents: Vec<Option<usize>>,
    flags: Vec<LayoutFlags>,
}

impl Chain {
    fn line(n: usize) -> Self {
        Self {
            parents: (0..n).map(|i| i.checked_sub(1)).collect(),
            flags: vec![LayoutFlags::empty(); n],
        }
    }
}

impl PathTree for Chain {
    type Key = usize;

    fn parent(&self, key: usize) -> Option<usize> {
        self.parents[key]
    }

    fn layout_flags(&self, key: usize) -> LayoutFlags {
        self.flags[key]
    }

    fn set_layout_flags(&mut self, key: usize, flags: LayoutFlags) {
        self.flags[key] = flags;
    }
}

fn deep_graph(depth: usize) -> (ObjectGraph, ObjectId) {
    let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
    let root = graph.create(TypeIndex::UI_ELEMENT);
    graph.attach_root(root).unwrap();
    let mut leaf = root;
    for _ in 1..depth {
        let child = graph.create(TypeIndex::UI_ELEMENT);
        graph.add_child(leaf, child).unwrap();
        leaf = child;
    }
    (graph, leaf)
}

fn bench_dirty(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirty");

    for depth in [16_usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("chain/first_walk", depth), &depth, |b, &n| {
            b.iter_batched(
                || Chain::line(n),
                |mut tree| black_box(propagate_on_path(&mut tree, n - 1, PathFlags::MEASURE, false)),
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("chain/repeat_walk", depth), &depth, |b, &n| {
            let mut tree = Chain::line(n);
            propagate_on_path(&mut tree, n - 1, PathFlags::MEASURE, false);
            b.iter(|| black_box(propagate_on_path(&mut tree, n - 1, PathFlags::MEASURE, false)));
        });
    }

    for depth in [16_usize, 256] {
        group.bench_with_input(BenchmarkId::new("graph/invalidate_measure", depth), &depth, |b, &n| {
            b.iter_batched(
                || deep_graph(n),
                |(mut graph, leaf)| {
                    black_box(graph.invalidate_measure(leaf).unwrap());
                    black_box(graph);
                },
                BatchSize::SmallInput,
            );
        });
    }

    let viewports: Vec<_> = (0..32)
        .map(|i| UnidimensionalViewport::new(i as f32 * 4.0, 800.0 - i as f32 * 8.0))
        .collect();
    group.bench_function("viewport/effective", |b| {
        b.iter(|| black_box(compute_effective_viewport(black_box(&viewports))));
    });
    group.bench_function("viewport/bring_into_view", |b| {
        b.iter(|| black_box(compute_bring_into_view_distance(900.0, 40.0, black_box(&viewports))));
    });

    group.finish();
}

criterion_group!(benches, bench_dirty);
criterion_main!(benches);
