// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for property get/set on the object graph.

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use arbor_object::ObjectGraph;
use arbor_property::{
    PropertyBuilder, PropertyIndex, PropertyTableBuilder, StorageKind, TypeIndex, Value, ValueKind,
};

struct Props {
    width: PropertyIndex,
    tag: PropertyIndex,
    padding: PropertyIndex,
    text: PropertyIndex,
}

fn build_graph() -> (ObjectGraph, Props) {
    let mut builder = PropertyTableBuilder::new();
    let layout = builder.register_group("Layout");
    let props = Props {
        width: builder.register_property(
            PropertyBuilder::new("Width", TypeIndex::UI_ELEMENT, ValueKind::Double)
                .default_value(Value::Double(f64::NAN))
                .inline(),
        ),
        tag: builder.register_property(PropertyBuilder::new(
            "Tag",
            TypeIndex::UI_ELEMENT,
            ValueKind::Int32,
        )),
        padding: builder.register_property(
            PropertyBuilder::new("Padding", TypeIndex::UI_ELEMENT, ValueKind::Double)
                .default_value(Value::Double(0.0))
                .storage(StorageKind::Group(layout)),
        ),
        text: builder.register_property(PropertyBuilder::new(
            "Text",
            TypeIndex::UI_ELEMENT,
            ValueKind::String,
        )),
    };
    (ObjectGraph::new(Arc::new(builder.build())), props)
}

fn bench_property(c: &mut Criterion) {
    let (mut graph, props) = build_graph();
    let element = graph.create(TypeIndex::UI_ELEMENT);
    graph.set_value(element, props.width, Value::Double(120.0)).unwrap();
    graph.set_value(element, props.tag, Value::Int32(7)).unwrap();
    graph.set_value(element, props.padding, Value::Double(4.0)).unwrap();
    let untouched = graph.create(TypeIndex::UI_ELEMENT);

    let mut group = c.benchmark_group("property");

    group.bench_function("get/inline", |b| {
        b.iter(|| black_box(graph.get_value(black_box(element), props.width)));
    });
    group.bench_function("get/sparse", |b| {
        b.iter(|| black_box(graph.get_value(black_box(element), props.tag)));
    });
    group.bench_function("get/group", |b| {
        b.iter(|| black_box(graph.get_value(black_box(element), props.padding)));
    });
    group.bench_function("get/default", |b| {
        b.iter(|| black_box(graph.get_value(black_box(untouched), props.tag)));
    });

    group.bench_function("set/inline", |b| {
        let mut v = 0.0;
        b.iter(|| {
            v += 1.0;
            graph.set_value(element, props.width, Value::Double(v)).unwrap();
        });
    });
    group.bench_function("set/sparse", |b| {
        let mut v = 0;
        b.iter(|| {
            v += 1;
            graph.set_value(element, props.tag, Value::Int32(v)).unwrap();
        });
    });

    group.bench_function("set/first_write_allocates", |b| {
        b.iter_batched(
            || {
                let (mut graph, props) = build_graph();
                let element = graph.create(TypeIndex::UI_ELEMENT);
                (graph, props, element)
            },
            |(mut graph, props, element)| {
                graph.set_value(element, props.padding, Value::Double(2.0)).unwrap();
                graph.set_value(element, props.text, Value::string("hello world")).unwrap();
                black_box(graph);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
