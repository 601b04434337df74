// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host feedback across rebuild cycles.
//!
//! A column stretches wrapped text labels to its width and lets each label
//! choose its own height. The host "wraps" a label when it receives the
//! label's width and reports the resulting height back; that report lands in
//! the next rebuild. The loop runs until no more rebuilds are scheduled.
//!
//! Run with logging:
//! - `RUST_LOG=understory_linear_layout=trace cargo run -p understory_linear_layout_demos --example feedback_cycles`

use kurbo::{Insets, Size};
use tracing_subscriber::EnvFilter;
use understory_linear_layout::{
    Axis, AxisConstraints, Element, FeedbackQueue, LayoutHost, LayoutTree, LinearLayout, NodeId,
    Placement,
};

const CHAR_WIDTH: f64 = 7.0;
const LINE_HEIGHT: f64 = 14.0;

/// A host that wraps monospace text to whatever width it is given.
struct TextHost {
    labels: Vec<(NodeId, &'static str)>,
    writes: usize,
}

impl TextHost {
    fn wrapped_height(text: &str, width: f64) -> f64 {
        let per_line = (width / CHAR_WIDTH).floor().max(1.0);
        let lines = (text.len() as f64 / per_line).ceil().max(1.0);
        lines * LINE_HEIGHT
    }
}

impl LayoutHost for TextHost {
    fn write_placement(
        &mut self,
        node: NodeId,
        axis: Axis,
        placement: Placement,
        feedback: &mut FeedbackQueue,
    ) {
        self.writes += 1;
        if axis != Axis::Horizontal {
            return;
        }
        if let Some((_, text)) = self.labels.iter().find(|(id, _)| *id == node) {
            let height = Self::wrapped_height(text, placement.size);
            feedback.set_measured_size(node, Size::new(placement.size, height));
        }
    }
}

fn settle(tree: &mut LayoutTree, host: &mut TextHost) -> usize {
    let mut cycles = 0;
    while tree.rebuild(host) {
        cycles += 1;
    }
    cycles
}

fn report(tree: &LayoutTree, host: &TextHost) {
    for (id, text) in &host.labels {
        if let Some(rect) = tree.local_rect(*id) {
            println!(
                "  y={:>5.1} h={:>5.1} w={:>5.1}  {text}",
                rect.y0,
                rect.height(),
                rect.width()
            );
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = LayoutTree::new();
    let column = tree.insert_container(
        LinearLayout::vertical()
            .with_padding(Insets::uniform(4.0))
            .with_spacing(6.0)
            .with_control_size(Axis::Vertical, false),
    );
    tree.set_measured_size(column, Size::new(240.0, 400.0))
        .expect("column is live");

    let texts = [
        "Layout runs in cycles.",
        "Each cycle measures children before parents and places parents before children.",
        "Changes made while placing are replayed afterwards and schedule the next cycle.",
    ];
    let mut labels = Vec::new();
    for text in texts {
        let label = tree.insert_element(
            Element::new().with_constraints(Axis::Horizontal, AxisConstraints::new(0.0, 0.0, 1.0)),
        );
        tree.attach(column, label, None).expect("fresh label");
        labels.push((label, text));
    }
    let mut host = TextHost { labels, writes: 0 };

    let cycles = settle(&mut tree, &mut host);
    tracing::info!(cycles, writes = host.writes, "settled at 240 wide");
    println!("== 240 wide, {cycles} cycles");
    report(&tree, &host);

    host.writes = 0;
    tree.set_measured_size(column, Size::new(120.0, 400.0))
        .expect("column is live");
    let cycles = settle(&mut tree, &mut host);
    tracing::info!(cycles, writes = host.writes, "settled at 120 wide");
    println!("== 120 wide, {cycles} cycles");
    report(&tree, &host);
}
