// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end layout scenarios driven through `LayoutTree`.

use kurbo::{Insets, Size, Vec2};
use understory_linear_layout::{
    Alignment, Axis, AxisConstraints, AxisMask, Element, FeedbackQueue, HostEvent, LayoutHost,
    LayoutTree, LinearLayout, NodeId, Placement, PlacementLog,
};

fn fixed(tree: &mut LayoutTree, width: f64, height: f64) -> NodeId {
    tree.insert_element(
        Element::new()
            .with_constraints(Axis::Horizontal, AxisConstraints::fixed(width))
            .with_constraints(Axis::Vertical, AxisConstraints::fixed(height)),
    )
}

fn container(tree: &mut LayoutTree, layout: LinearLayout, size: Size) -> NodeId {
    let id = tree.insert_container(layout);
    tree.set_measured_size(id, size).unwrap();
    id
}

fn offset(tree: &LayoutTree, id: NodeId, axis: Axis) -> f64 {
    tree.placement(id, axis).unwrap().offset
}

fn width(tree: &LayoutTree, id: NodeId) -> f64 {
    tree.size(id).unwrap().width
}

#[test]
fn total_preferred_includes_spacing() {
    let mut tree = LayoutTree::new();
    let row = container(
        &mut tree,
        LinearLayout::horizontal().with_spacing(10.0),
        Size::new(300.0, 10.0),
    );
    for w in [20.0, 30.0, 40.0] {
        let c = fixed(&mut tree, w, 10.0);
        tree.attach(row, c, None).unwrap();
    }
    tree.rebuild(&mut ());
    let agg = tree.aggregate(row, Axis::Horizontal);
    assert_eq!(agg.preferred, 110.0);
    assert_eq!(agg.min, 110.0);
}

#[test]
fn capped_child_passes_surplus_to_siblings() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = tree.insert_element(
        Element::new().with_constraints(Axis::Horizontal, AxisConstraints::new(0.0, 0.0, 1.0)),
    );
    let b = tree.insert_element(Element::new().with_constraints(
        Axis::Horizontal,
        AxisConstraints::new(0.0, 20.0, 1.0).with_max(50.0),
    ));
    tree.attach(row, a, None).unwrap();
    tree.attach(row, b, None).unwrap();
    tree.rebuild(&mut ());

    assert_eq!(width(&tree, a), 50.0);
    assert_eq!(width(&tree, b), 50.0);
    assert_eq!(offset(&tree, b, Axis::Horizontal), 50.0);
}

#[test]
fn center_alignment_shifts_main_axis_only() {
    let mut tree = LayoutTree::new();
    let row = container(
        &mut tree,
        LinearLayout::horizontal()
            .with_spacing(10.0)
            .with_child_alignment(Alignment::UPPER_CENTER),
        Size::new(200.0, 40.0),
    );
    let kids: Vec<_> = [20.0, 30.0, 40.0]
        .into_iter()
        .map(|w| {
            let c = fixed(&mut tree, w, 10.0);
            tree.attach(row, c, None).unwrap();
            c
        })
        .collect();
    tree.rebuild(&mut ());

    let xs: Vec<_> = kids
        .iter()
        .map(|c| offset(&tree, *c, Axis::Horizontal))
        .collect();
    assert_eq!(xs, [45.0, 75.0, 115.0]);
    for c in &kids {
        assert_eq!(offset(&tree, *c, Axis::Vertical), 0.0);
    }
}

#[test]
fn padding_and_lower_right_alignment() {
    let mut tree = LayoutTree::new();
    let col = container(
        &mut tree,
        LinearLayout::vertical()
            .with_padding(Insets::new(5.0, 10.0, 15.0, 20.0))
            .with_child_alignment(Alignment::LOWER_RIGHT),
        Size::new(100.0, 100.0),
    );
    let c = fixed(&mut tree, 30.0, 20.0);
    tree.attach(col, c, None).unwrap();
    tree.rebuild(&mut ());

    // Vertical surplus: 100 - (20 + 30) = 50, all of it before the child.
    assert_eq!(offset(&tree, c, Axis::Vertical), 60.0);
    // Horizontal inner space is 80; the child sits at its right edge.
    assert_eq!(offset(&tree, c, Axis::Horizontal), 55.0);
    assert_eq!(tree.aggregate(col, Axis::Vertical).preferred, 50.0);
    assert_eq!(tree.aggregate(col, Axis::Horizontal).preferred, 50.0);
}

#[test]
fn nested_change_settles_in_one_rebuild() {
    let mut tree = LayoutTree::new();
    let outer = container(&mut tree, LinearLayout::vertical(), Size::new(100.0, 200.0));
    let inner = tree.insert_container(LinearLayout::horizontal());
    tree.attach(outer, inner, None).unwrap();
    let a = fixed(&mut tree, 30.0, 20.0);
    let b = fixed(&mut tree, 40.0, 20.0);
    tree.attach(inner, a, None).unwrap();
    tree.attach(inner, b, None).unwrap();
    tree.rebuild(&mut ());

    assert_eq!(tree.size(inner), Some(Size::new(70.0, 20.0)));
    assert_eq!(offset(&tree, b, Axis::Horizontal), 30.0);

    tree.set_constraints(b, Axis::Horizontal, AxisConstraints::fixed(50.0))
        .unwrap();
    assert!(tree.rebuild(&mut ()));
    assert!(!tree.is_rebuild_scheduled());
    assert_eq!(tree.aggregate(inner, Axis::Horizontal).preferred, 80.0);
    assert_eq!(tree.size(inner), Some(Size::new(80.0, 20.0)));
    assert_eq!(width(&tree, b), 50.0);
}

#[test]
fn flexible_nested_container_fills_parent() {
    let mut tree = LayoutTree::new();
    let outer = container(&mut tree, LinearLayout::horizontal(), Size::new(300.0, 50.0));
    let sidebar = fixed(&mut tree, 100.0, 50.0);
    let body = tree.insert_container(LinearLayout::vertical());
    tree.attach(outer, sidebar, None).unwrap();
    tree.attach(outer, body, None).unwrap();
    let item = tree.insert_element(
        Element::new().with_constraints(Axis::Horizontal, AxisConstraints::new(0.0, 10.0, 1.0)),
    );
    tree.attach(body, item, None).unwrap();
    tree.rebuild(&mut ());

    // The body inherits the item's flexible weight and takes the remaining 200.
    assert_eq!(width(&tree, body), 200.0);
    assert_eq!(offset(&tree, body, Axis::Horizontal), 100.0);
    // The item stretches across the body's cross axis.
    assert_eq!(width(&tree, item), 200.0);
}

#[test]
fn resizing_root_relayouts_everything() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = tree.insert_element(
        Element::new().with_constraints(Axis::Horizontal, AxisConstraints::new(0.0, 0.0, 1.0)),
    );
    tree.attach(row, a, None).unwrap();
    tree.rebuild(&mut ());
    assert_eq!(width(&tree, a), 100.0);

    tree.handle_event(HostEvent::SizeChanged {
        node: row,
        size: Size::new(250.0, 10.0),
    })
    .unwrap();
    tree.rebuild(&mut ());
    assert_eq!(width(&tree, a), 250.0);
}

#[test]
fn reverse_order_stacks_last_first() {
    let mut tree = LayoutTree::new();
    let row = container(
        &mut tree,
        LinearLayout::horizontal().with_reverse_order(true),
        Size::new(100.0, 10.0),
    );
    let a = fixed(&mut tree, 10.0, 10.0);
    let b = fixed(&mut tree, 20.0, 10.0);
    tree.attach(row, a, None).unwrap();
    tree.attach(row, b, None).unwrap();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, b, Axis::Horizontal), 0.0);
    assert_eq!(offset(&tree, a, Axis::Horizontal), 20.0);

    // Incremental update on the first-laid-out child still moves the other.
    tree.set_constraints(b, Axis::Horizontal, AxisConstraints::fixed(30.0))
        .unwrap();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, a, Axis::Horizontal), 30.0);
}

#[test]
fn self_scale_advances_by_scaled_extent() {
    let mut tree = LayoutTree::new();
    let row = container(
        &mut tree,
        LinearLayout::horizontal().with_scale_by_self_scale(Axis::Horizontal, true),
        Size::new(100.0, 10.0),
    );
    let a = fixed(&mut tree, 10.0, 10.0);
    let b = fixed(&mut tree, 10.0, 10.0);
    tree.attach(row, a, None).unwrap();
    tree.attach(row, b, None).unwrap();
    tree.set_scale(a, Vec2::new(2.0, 1.0)).unwrap();
    tree.rebuild(&mut ());

    let pa = tree.placement(a, Axis::Horizontal).unwrap();
    assert_eq!(pa.size, 10.0);
    assert_eq!(pa.scale, 2.0);
    assert_eq!(pa.extent(), 20.0);
    assert_eq!(offset(&tree, b, Axis::Horizontal), 20.0);
    assert_eq!(tree.aggregate(row, Axis::Horizontal).preferred, 30.0);
}

#[test]
fn disabled_children_are_skipped() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let kids: Vec<_> = (0..3)
        .map(|_| {
            let c = fixed(&mut tree, 10.0, 10.0);
            tree.attach(row, c, None).unwrap();
            c
        })
        .collect();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, kids[2], Axis::Horizontal), 20.0);

    tree.set_enabled(kids[1], false).unwrap();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, kids[2], Axis::Horizontal), 10.0);

    tree.handle_event(HostEvent::EnabledStateChanged {
        node: kids[1],
        enabled: true,
    })
    .unwrap();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, kids[2], Axis::Horizontal), 20.0);
}

#[test]
fn disabled_container_drops_feedback_until_enabled() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    tree.attach(row, a, None).unwrap();
    tree.rebuild(&mut ());

    tree.set_enabled(row, false).unwrap();
    tree.set_constraints(a, Axis::Horizontal, AxisConstraints::fixed(40.0))
        .unwrap();
    assert!(!tree.is_rebuild_scheduled());
    assert!(!tree.rebuild(&mut ()));
    assert_eq!(width(&tree, a), 10.0);

    tree.set_enabled(row, true).unwrap();
    assert!(tree.is_rebuild_scheduled());
    tree.rebuild(&mut ());
    assert_eq!(width(&tree, a), 40.0);
}

#[test]
fn ignored_children_leave_the_flow() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    let b = fixed(&mut tree, 10.0, 10.0);
    let c = fixed(&mut tree, 10.0, 10.0);
    for id in [a, b, c] {
        tree.attach(row, id, None).unwrap();
    }
    tree.rebuild(&mut ());

    tree.set_ignored(b, true).unwrap();
    assert!(tree.is_rebuild_scheduled());
    let mut log = PlacementLog::new();
    tree.rebuild(&mut log);
    assert_eq!(offset(&tree, c, Axis::Horizontal), 10.0);
    assert!(!log.wrote(b));
    assert_eq!(tree.aggregate(row, Axis::Horizontal).preferred, 20.0);
}

#[test]
fn reorder_and_detach() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    let b = fixed(&mut tree, 20.0, 10.0);
    let c = fixed(&mut tree, 30.0, 10.0);
    for id in [a, b, c] {
        tree.handle_event(HostEvent::ChildAttached {
            container: row,
            child: id,
            index: None,
        })
        .unwrap();
    }
    tree.handle_event(HostEvent::ChildReordered {
        container: row,
        from: 0,
        to: 2,
    })
    .unwrap();
    tree.rebuild(&mut ());
    assert_eq!(tree.children(row), [b, c, a]);
    assert_eq!(offset(&tree, a, Axis::Horizontal), 50.0);

    tree.handle_event(HostEvent::ChildDetached { child: b }).unwrap();
    tree.rebuild(&mut ());
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.placement(b, Axis::Horizontal), None);
    assert_eq!(offset(&tree, c, Axis::Horizontal), 0.0);
    assert_eq!(offset(&tree, a, Axis::Horizontal), 30.0);
}

#[test]
fn removing_container_releases_children() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    tree.attach(row, a, None).unwrap();
    tree.remove(row).unwrap();
    assert!(!tree.is_alive(row));
    assert!(tree.is_alive(a));
    assert_eq!(tree.parent(a), None);
    // Later edits on the released child go nowhere.
    tree.set_constraints(a, Axis::Horizontal, AxisConstraints::fixed(5.0))
        .unwrap();
    assert!(!tree.rebuild(&mut ()));
}

#[test]
fn uncontrolled_content_size_change_moves_siblings() {
    let mut tree = LayoutTree::new();
    let row = container(
        &mut tree,
        LinearLayout::horizontal().with_control_size(Axis::Horizontal, false),
        Size::new(200.0, 10.0),
    );
    let a = tree.insert_element(Element::new().with_measured_size(Size::new(30.0, 10.0)));
    let b = tree.insert_element(Element::new().with_measured_size(Size::new(20.0, 10.0)));
    tree.attach(row, a, None).unwrap();
    tree.attach(row, b, None).unwrap();
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, b, Axis::Horizontal), 30.0);

    tree.set_measured_size(a, Size::new(50.0, 10.0)).unwrap();
    assert!(tree.is_rebuild_scheduled());
    tree.rebuild(&mut ());
    assert_eq!(offset(&tree, b, Axis::Horizontal), 50.0);
    assert_eq!(width(&tree, a), 50.0);
}

#[test]
fn controlled_size_writes_are_restored_by_parent() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    tree.attach(row, a, None).unwrap();
    tree.rebuild(&mut ());

    tree.handle_event(HostEvent::SizeChanged {
        node: a,
        size: Size::new(999.0, 20.0),
    })
    .unwrap();
    assert!(tree.is_rebuild_scheduled());
    assert!(tree.rebuild(&mut ()));
    assert!(!tree.is_rebuild_scheduled());
    assert_eq!(tree.size(a), Some(Size::new(10.0, 10.0)));
    assert_eq!(offset(&tree, a, Axis::Horizontal), 0.0);
}

#[test]
fn resized_nested_container_is_placed_again() {
    let mut tree = LayoutTree::new();
    let outer = container(&mut tree, LinearLayout::horizontal(), Size::new(300.0, 50.0));
    let sidebar = fixed(&mut tree, 100.0, 50.0);
    let body = tree.insert_container(LinearLayout::vertical());
    tree.attach(outer, sidebar, None).unwrap();
    tree.attach(outer, body, None).unwrap();
    let item = tree.insert_element(
        Element::new().with_constraints(Axis::Horizontal, AxisConstraints::new(0.0, 10.0, 1.0)),
    );
    tree.attach(body, item, None).unwrap();
    tree.rebuild(&mut ());
    let settled = tree.size(body);
    assert_eq!(width(&tree, item), 200.0);

    tree.handle_event(HostEvent::SizeChanged {
        node: body,
        size: Size::ZERO,
    })
    .unwrap();
    assert!(tree.rebuild(&mut ()));
    assert!(!tree.is_rebuild_scheduled());
    assert_eq!(tree.size(body), settled);
    assert_eq!(width(&tree, body), 200.0);
    assert_eq!(width(&tree, item), 200.0);
}

#[test]
fn container_constraints_only_take_max() {
    let mut tree = LayoutTree::new();
    let outer = container(&mut tree, LinearLayout::vertical(), Size::new(100.0, 200.0));
    let inner = tree.insert_container(LinearLayout::horizontal());
    tree.attach(outer, inner, None).unwrap();
    let a = fixed(&mut tree, 30.0, 20.0);
    let b = fixed(&mut tree, 40.0, 20.0);
    tree.attach(inner, a, None).unwrap();
    tree.attach(inner, b, None).unwrap();
    tree.rebuild(&mut ());
    let published = tree.element(inner).unwrap().constraints(Axis::Horizontal);
    assert_eq!(published, AxisConstraints::fixed(70.0));

    tree.set_constraints(inner, Axis::Horizontal, AxisConstraints::new(0.0, 0.0, 0.0))
        .unwrap();
    assert!(!tree.is_rebuild_scheduled());
    assert_eq!(
        tree.element(inner).unwrap().constraints(Axis::Horizontal),
        published
    );

    tree.set_constraints(
        inner,
        Axis::Horizontal,
        AxisConstraints::fixed(5.0).with_max(50.0),
    )
    .unwrap();
    assert!(tree.rebuild(&mut ()));
    assert_eq!(width(&tree, inner), 50.0);
    assert_eq!(
        tree.element(inner).unwrap().constraints(Axis::Horizontal),
        AxisConstraints::fixed(70.0).with_max(50.0)
    );

    let incremental = [a, b, inner].map(|id| tree.local_rect(id));
    tree.request_full_rebuild(outer).unwrap();
    tree.request_full_rebuild(inner).unwrap();
    tree.rebuild(&mut ());
    assert_eq!([a, b, inner].map(|id| tree.local_rect(id)), incremental);
}

struct Reflow {
    target: NodeId,
    fired: bool,
}

impl LayoutHost for Reflow {
    fn write_placement(
        &mut self,
        node: NodeId,
        axis: Axis,
        _: Placement,
        feedback: &mut FeedbackQueue,
    ) {
        if node == self.target && axis == Axis::Horizontal && !self.fired {
            self.fired = true;
            feedback.report_dirty(node, AxisMask::HORIZONTAL);
        }
    }
}

#[test]
fn host_feedback_lands_in_next_cycle() {
    let mut tree = LayoutTree::new();
    let row = container(&mut tree, LinearLayout::horizontal(), Size::new(100.0, 10.0));
    let a = fixed(&mut tree, 10.0, 10.0);
    tree.attach(row, a, None).unwrap();

    let mut host = Reflow {
        target: a,
        fired: false,
    };
    assert!(tree.rebuild(&mut host));
    assert_eq!(tree.scheduler().rebuild_count(), 1);
    assert!(tree.is_rebuild_scheduled());
    assert!(tree.rebuild(&mut host));
    assert!(!tree.rebuild(&mut host));
    assert_eq!(tree.scheduler().rebuild_count(), 2);
}

#[test]
fn full_rebuilds_are_idempotent() {
    let mut tree = LayoutTree::new();
    let outer = container(
        &mut tree,
        LinearLayout::vertical()
            .with_spacing(3.0)
            .with_padding(Insets::uniform(4.0)),
        Size::new(120.0, 300.0),
    );
    let inner = tree.insert_container(
        LinearLayout::horizontal()
            .with_child_alignment(Alignment::MIDDLE_CENTER)
            .with_force_expand(Axis::Horizontal, true),
    );
    tree.attach(outer, inner, None).unwrap();
    for w in [10.0, 25.0] {
        let c = fixed(&mut tree, w, 15.0);
        tree.attach(inner, c, None).unwrap();
    }
    let tail = tree.insert_element(Element::new().with_constraints(
        Axis::Vertical,
        AxisConstraints::new(5.0, 40.0, 2.0).with_max(90.0),
    ));
    tree.attach(outer, tail, None).unwrap();
    while tree.rebuild(&mut ()) {}

    let mut first = PlacementLog::new();
    tree.request_full_rebuild(outer).unwrap();
    tree.rebuild(&mut first);
    let mut second = PlacementLog::new();
    tree.request_full_rebuild(outer).unwrap();
    tree.rebuild(&mut second);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn empty_container_reports_padding() {
    let mut tree = LayoutTree::new();
    let col = container(
        &mut tree,
        LinearLayout::vertical().with_padding(Insets::new(1.0, 2.0, 3.0, 4.0)),
        Size::new(10.0, 10.0),
    );
    assert!(tree.rebuild(&mut ()));
    assert_eq!(tree.aggregate(col, Axis::Vertical).preferred, 6.0);
    assert_eq!(tree.aggregate(col, Axis::Horizontal).min, 4.0);
    assert!(!tree.is_rebuild_scheduled());
}
