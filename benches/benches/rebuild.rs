// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_linear_layout::{
    Axis, AxisConstraints, Element, LayoutTree, LinearLayout, NodeId, PlacementLog,
};

/// A column of `rows` rows, each holding `cols` leaves.
fn build_grid(rows: usize, cols: usize) -> (LayoutTree, NodeId, Vec<NodeId>) {
    let mut tree = LayoutTree::with_capacity(rows * cols + rows + 1, cols.max(rows));
    let root = tree.insert_container(LinearLayout::vertical().with_spacing(2.0));
    tree.set_measured_size(root, Size::new(1024.0, 4096.0))
        .expect("root is live");
    let mut leaves = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        let row = tree.insert_container(LinearLayout::horizontal().with_spacing(1.0));
        tree.attach(root, row, None).expect("fresh row");
        for c in 0..cols {
            let flexible = if c % 3 == 0 { 1.0 } else { 0.0 };
            let leaf = tree.insert_element(
                Element::new()
                    .with_constraints(
                        Axis::Horizontal,
                        AxisConstraints::new(4.0, 8.0 + (r + c) as f64 % 7.0, flexible),
                    )
                    .with_constraints(Axis::Vertical, AxisConstraints::fixed(12.0)),
            );
            tree.attach(row, leaf, None).expect("fresh leaf");
            leaves.push(leaf);
        }
    }
    tree.rebuild(&mut ());
    (tree, root, leaves)
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_linear_layout");
    group.sample_size(50);

    for &(rows, cols) in &[(16_usize, 16_usize), (64, 64), (8, 512)] {
        group.bench_function(format!("full_rebuild(rows={rows},cols={cols})"), |b| {
            b.iter_batched(
                || build_grid(rows, cols),
                |(mut tree, root, _)| {
                    tree.request_full_rebuild(root).expect("root is live");
                    black_box(tree.rebuild(&mut ()));
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("edit_last_leaf(rows={rows},cols={cols})"), |b| {
            b.iter_batched(
                || build_grid(rows, cols),
                |(mut tree, _, leaves)| {
                    let last = *leaves.last().expect("non-empty grid");
                    tree.set_constraints(last, Axis::Horizontal, AxisConstraints::fixed(20.0))
                        .expect("leaf is live");
                    let mut log = PlacementLog::new();
                    tree.rebuild(&mut log);
                    black_box(log.len());
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("edit_first_leaf(rows={rows},cols={cols})"), |b| {
            b.iter_batched(
                || build_grid(rows, cols),
                |(mut tree, _, leaves)| {
                    tree.set_constraints(leaves[0], Axis::Horizontal, AxisConstraints::fixed(20.0))
                        .expect("leaf is live");
                    let mut log = PlacementLog::new();
                    tree.rebuild(&mut log);
                    black_box(log.len());
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("coalesced_marks(rows={rows},cols={cols})"), |b| {
            b.iter_batched(
                || build_grid(rows, cols),
                |(mut tree, _, leaves)| {
                    for (i, leaf) in leaves.iter().enumerate().step_by(7) {
                        tree.set_constraints(
                            *leaf,
                            Axis::Horizontal,
                            AxisConstraints::fixed(5.0 + (i % 11) as f64),
                        )
                        .expect("leaf is live");
                    }
                    black_box(tree.rebuild(&mut ()));
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rebuild);
criterion_main!(benches);
