// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear layout basics.
//!
//! Build a small window: a toolbar row above a body row that holds a fixed
//! sidebar and a flexible content pane. Print every rectangle, then resize
//! the window and print them again.
//!
//! Run:
//! - `cargo run -p understory_linear_layout_demos --example linear_basics`

use kurbo::{Insets, Size};
use understory_linear_layout::{
    Alignment, Axis, AxisConstraints, Element, LayoutTree, LinearLayout, NodeId, PlacementLog,
};

fn fixed(tree: &mut LayoutTree, width: f64, height: f64) -> NodeId {
    tree.insert_element(
        Element::new()
            .with_constraints(Axis::Horizontal, AxisConstraints::fixed(width))
            .with_constraints(Axis::Vertical, AxisConstraints::fixed(height)),
    )
}

fn print_tree(tree: &LayoutTree, names: &[(NodeId, &str)], id: NodeId, depth: usize) {
    let name = names
        .iter()
        .find(|(n, _)| *n == id)
        .map_or("?", |(_, name)| *name);
    match tree.local_rect(id) {
        Some(rect) => println!(
            "{:indent$}{name}: ({:.1}, {:.1}) {:.1}x{:.1}",
            "",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            indent = depth * 2
        ),
        None => {
            let size = tree.size(id).unwrap_or_default();
            println!(
                "{:indent$}{name}: {:.1}x{:.1}",
                "",
                size.width,
                size.height,
                indent = depth * 2
            );
        }
    }
    for &child in tree.children(id) {
        print_tree(tree, names, child, depth + 1);
    }
}

fn main() {
    let mut tree = LayoutTree::new();
    let window = tree.insert_container(
        LinearLayout::vertical()
            .with_padding(Insets::uniform(8.0))
            .with_spacing(4.0),
    );
    tree.set_measured_size(window, Size::new(320.0, 200.0))
        .expect("window is live");

    let toolbar = tree.insert_container(
        LinearLayout::horizontal()
            .with_spacing(4.0)
            .with_child_alignment(Alignment::MIDDLE_RIGHT),
    );
    let buttons = [
        fixed(&mut tree, 60.0, 24.0),
        fixed(&mut tree, 60.0, 24.0),
        fixed(&mut tree, 40.0, 24.0),
    ];

    let body = tree.insert_container(LinearLayout::horizontal().with_spacing(4.0));
    let sidebar = tree.insert_element(
        Element::new()
            .with_constraints(Axis::Horizontal, AxisConstraints::fixed(80.0))
            .with_constraints(Axis::Vertical, AxisConstraints::new(0.0, 0.0, 1.0)),
    );
    let content = tree.insert_element(
        Element::new()
            .with_constraints(Axis::Horizontal, AxisConstraints::new(100.0, 160.0, 1.0))
            .with_constraints(Axis::Vertical, AxisConstraints::new(40.0, 100.0, 1.0)),
    );

    tree.attach(window, toolbar, None).expect("fresh toolbar");
    tree.attach(window, body, None).expect("fresh body");
    for button in buttons {
        tree.attach(toolbar, button, None).expect("fresh button");
    }
    tree.attach(body, sidebar, None).expect("fresh sidebar");
    tree.attach(body, content, None).expect("fresh content");

    let names = [
        (window, "window"),
        (toolbar, "toolbar"),
        (buttons[0], "open"),
        (buttons[1], "save"),
        (buttons[2], "help"),
        (body, "body"),
        (sidebar, "sidebar"),
        (content, "content"),
    ];

    let mut log = PlacementLog::new();
    tree.rebuild(&mut log);
    println!("== 320x200 ({} placements)", log.len());
    print_tree(&tree, &names, window, 0);

    log.clear();
    tree.set_measured_size(window, Size::new(480.0, 120.0))
        .expect("window is live");
    tree.rebuild(&mut log);
    println!("== 480x120 ({} placements)", log.len());
    print_tree(&tree, &names, window, 0);

    log.clear();
    tree.set_constraints(buttons[2], Axis::Horizontal, AxisConstraints::fixed(90.0))
        .expect("button is live");
    tree.rebuild(&mut log);
    println!("== wider help button ({} placements)", log.len());
    print_tree(&tree, &names, window, 0);
}
