// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout tree: node storage, edits, feedback routing, and rebuilds.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::axis::{Axis, AxisMask, PerAxis};
use crate::config::LinearLayout;
use crate::container::LayoutContainer;
use crate::element::{AxisConstraints, Element};
use crate::error::LayoutError;
use crate::feedback::{self, DeferredFeedback, FeedbackLink, FeedbackQueue};
use crate::host::{HostEvent, LayoutHost};
use crate::measure::{self, Aggregate, ChildSample};
use crate::place::{self, Placement, Writes};
use crate::scheduler::RebuildScheduler;
use crate::scratch::LayoutScratch;

/// Identifier for a node in a [`LayoutTree`].
///
/// A slot index plus a generation counter.
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any `NodeId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `NodeId`.
///
/// Stale ids never alias a different live node. Use
/// [`LayoutTree::is_alive`] to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Node {
    element: Element,
    container: Option<LayoutContainer>,
    enabled: bool,
    placement: PerAxis<Option<Placement>>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owns elements and containers and keeps their layout up to date.
///
/// Edits mark state dirty and schedule a rebuild; nothing is computed until
/// [`LayoutTree::rebuild`] runs. A rebuild measures every pending container on
/// the horizontal then the vertical axis (children before parents), then
/// places them on the horizontal then the vertical axis (parents before
/// children).
#[derive(Debug, Default)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    scheduler: RebuildScheduler,
    scratch: LayoutScratch,
    requested: Vec<NodeId>,
}

impl LayoutTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty tree whose scratch buffers are sized for about `children`
    /// children per container.
    pub fn with_capacity(nodes: usize, children: usize) -> Self {
        Self {
            slots: Vec::with_capacity(nodes),
            scratch: LayoutScratch::with_capacity(children),
            ..Self::default()
        }
    }

    // --- storage ---

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_mut()
    }

    fn live(&self, id: NodeId) -> Result<&Node, LayoutError> {
        self.node(id).ok_or(LayoutError::StaleNode(id))
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut Node, LayoutError> {
        self.node_mut(id).ok_or(LayoutError::StaleNode(id))
    }

    fn container_ref(&self, id: NodeId) -> Result<&LayoutContainer, LayoutError> {
        self.live(id)?
            .container
            .as_ref()
            .ok_or(LayoutError::NotAContainer(id))
    }

    fn container_mut(&mut self, id: NodeId) -> Result<&mut LayoutContainer, LayoutError> {
        self.live_mut(id)?
            .container
            .as_mut()
            .ok_or(LayoutError::NotAContainer(id))
    }

    fn insert_node(&mut self, node: Node) -> NodeId {
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).expect("layout tree exceeded u32::MAX slots");
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new(idx, 1)
        }
    }

    /// Insert a leaf element. It takes part in layout once attached.
    pub fn insert_element(&mut self, element: Element) -> NodeId {
        let mut element = element;
        element.set_link(None);
        element.clear_dirty();
        self.insert_node(Node {
            element,
            container: None,
            enabled: true,
            placement: PerAxis::splat(None),
        })
    }

    /// Insert a container with a default element.
    pub fn insert_container(&mut self, layout: LinearLayout) -> NodeId {
        self.insert_container_with(Element::new(), layout)
    }

    /// Insert a container whose own element starts as `element`.
    ///
    /// The element's `max` constraints are honored when the container is
    /// nested; `min`, `preferred`, and `flexible` are replaced by the
    /// container's aggregate on every measurement.
    pub fn insert_container_with(&mut self, element: Element, layout: LinearLayout) -> NodeId {
        let id = self.insert_element(element);
        if let Some(node) = self.node_mut(id) {
            node.container = Some(LayoutContainer::new(layout));
        }
        self.request(id);
        id
    }

    /// Remove a node.
    ///
    /// The node is detached from its container first. If it is a container,
    /// its children are released: they stay alive but no longer report to
    /// anything.
    pub fn remove(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.detach(id)?;
        let container = self.live_mut(id)?.container.take();
        if let Some(container) = container {
            for child in container.children {
                if let Some(node) = self.node_mut(child) {
                    node.element.set_link(None);
                    node.element.clear_dirty();
                    node.placement = PerAxis::splat(None);
                }
            }
            self.scheduler.cancel(id);
        }
        self.slots[id.idx()].node = None;
        self.free.push(id.0);
        Ok(())
    }

    // --- queries ---

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The element of `id`.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).map(|n| &n.element)
    }

    /// The container state of `id`, if it is a container.
    pub fn container(&self, id: NodeId) -> Option<&LayoutContainer> {
        self.node(id)?.container.as_ref()
    }

    /// The container `id` reports to.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.element.link().map(FeedbackLink::container)
    }

    /// Children of `id`, empty for leaves and stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.container(id)
            .map(LayoutContainer::children)
            .unwrap_or_default()
    }

    /// Returns `true` if `id` is alive and enabled.
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.enabled)
    }

    /// Current size of `id`.
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.node(id).map(|n| n.element.measured_size())
    }

    /// Last placement written for `id` on `axis`.
    pub fn placement(&self, id: NodeId, axis: Axis) -> Option<Placement> {
        self.node(id)?.placement[axis]
    }

    /// Rectangle of `id` in its container's coordinate space, once placed on
    /// both axes.
    pub fn local_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        let x = node.placement.horizontal?;
        let y = node.placement.vertical?;
        Some(Rect::new(x.offset, y.offset, x.end(), y.end()))
    }

    /// Aggregate of container `id` on `axis`.
    pub fn try_aggregate(&self, id: NodeId, axis: Axis) -> Result<Aggregate, LayoutError> {
        self.container_ref(id)?
            .aggregate(axis)
            .ok_or(LayoutError::NotMeasured(id, axis))
    }

    /// Aggregate of container `id` on `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale, not a container, or not yet measured on
    /// `axis`. Use [`LayoutTree::try_aggregate`] to handle those cases.
    pub fn aggregate(&self, id: NodeId, axis: Axis) -> Aggregate {
        match self.try_aggregate(id, axis) {
            Ok(aggregate) => aggregate,
            Err(err) => panic!("{err}"),
        }
    }

    /// The rebuild scheduler.
    pub fn scheduler(&self) -> &RebuildScheduler {
        &self.scheduler
    }

    /// Returns `true` if a rebuild is waiting to run.
    pub fn is_rebuild_scheduled(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    // --- structure ---

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Attach `child` to `container` at `index`, or at the end for `None`.
    pub fn attach(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), LayoutError> {
        let len = self.container_ref(container)?.children.len();
        if let Some(link) = self.live(child)?.element.link() {
            return Err(LayoutError::AlreadyAttached {
                child,
                container: link.container(),
            });
        }
        if self.is_ancestor_or_self(child, container) {
            return Err(LayoutError::WouldCycle { container, child });
        }
        let index = index.unwrap_or(len);
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }

        let node = self.live_mut(child)?;
        node.element.set_link(Some(FeedbackLink::new(container)));
        node.element.clear_dirty();

        let c = self.container_mut(container)?;
        let displaced = c.children.get(index).copied();
        c.children.insert(index, child);
        c.tracker.mark_structural();
        c.tracker.mark_child(child, AxisMask::all());
        if let Some(displaced) = displaced {
            c.tracker.mark_child(displaced, AxisMask::IGNORE);
        }
        self.request(container);
        Ok(())
    }

    /// Detach `child` from its container. Detaching an unattached node is a
    /// no-op.
    pub fn detach(&mut self, child: NodeId) -> Result<(), LayoutError> {
        let Some(link) = self.live(child)?.element.link() else {
            return Ok(());
        };
        let container = link.container();
        if let Ok(c) = self.container_mut(container) {
            let position = c.children.iter().position(|c| *c == child);
            if let Some(position) = position {
                c.children.remove(position);
                if let Some(&displaced) = c.children.get(position) {
                    c.tracker.mark_child(displaced, AxisMask::IGNORE);
                }
            }
            c.tracker.forget_child(child);
            c.tracker.mark_structural();
            self.request(container);
        }
        let node = self.live_mut(child)?;
        node.element.set_link(None);
        node.element.clear_dirty();
        node.placement = PerAxis::splat(None);
        Ok(())
    }

    /// Move the child at `from` to `to` within `container`.
    pub fn reorder(&mut self, container: NodeId, from: usize, to: usize) -> Result<(), LayoutError> {
        let c = self.container_mut(container)?;
        let len = c.children.len();
        for index in [from, to] {
            if index >= len {
                return Err(LayoutError::IndexOutOfBounds { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let child = c.children.remove(from);
        c.children.insert(to, child);
        c.tracker.mark_structural();
        c.tracker.mark_child(child, AxisMask::IGNORE);
        if let Some(&displaced) = c.children.get(from) {
            c.tracker.mark_child(displaced, AxisMask::IGNORE);
        }
        self.request(container);
        Ok(())
    }

    // --- element edits ---

    /// Replace the constraints of `id` on `axis`.
    ///
    /// For a container only `max` is taken; `min`, `preferred`, and
    /// `flexible` always come from its aggregate.
    pub fn set_constraints(
        &mut self,
        id: NodeId,
        axis: Axis,
        constraints: AxisConstraints,
    ) -> Result<(), LayoutError> {
        let node = self.live_mut(id)?;
        let constraints = if node.container.is_some() {
            AxisConstraints {
                max: constraints.max,
                ..node.element.constraints(axis)
            }
        } else {
            constraints
        };
        if node.element.set_constraints(axis, constraints) {
            self.flush_feedback(id, true);
        }
        Ok(())
    }

    /// Set the size of `id`.
    ///
    /// For a container this is its available space, and a change dirties the
    /// affected axes. For a child of a container that does not control the
    /// changed axis it is a content size change and is reported as a
    /// structural change. On controlled axes the change is reported to the
    /// container, whose next placement writes the placed extent back.
    pub fn set_measured_size(&mut self, id: NodeId, size: Size) -> Result<(), LayoutError> {
        let node = self.live_mut(id)?;
        let changed = node.element.set_measured_size(size);
        if changed.is_empty() {
            return Ok(());
        }
        if let Some(c) = node.container.as_mut() {
            c.tracker.mark_axes(changed);
            self.request(id);
        }
        let (controlled, uncontrolled) = self.parent_controlled_split(id, changed);
        if !controlled.is_empty() {
            self.live_mut(id)?.element.mark_dirty(controlled);
            self.flush_feedback(id, true);
        }
        if !uncontrolled.is_empty() {
            self.report_content_change(id, uncontrolled);
        }
        Ok(())
    }

    /// Set the self scale of `id`.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) -> Result<(), LayoutError> {
        let changed = self.live_mut(id)?.element.set_scale(scale);
        if changed.is_empty() {
            return Ok(());
        }
        let (controlled, uncontrolled) = self.parent_controlled_split(id, changed);
        if !controlled.is_empty() {
            self.live_mut(id)?.element.mark_dirty(controlled);
            self.flush_feedback(id, true);
        }
        if !uncontrolled.is_empty() {
            self.report_content_change(id, uncontrolled);
        }
        Ok(())
    }

    /// Set the anchor of `id`. The next placement carries the new anchor.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Point) -> Result<(), LayoutError> {
        self.live_mut(id)?.element.set_anchor(anchor);
        self.report_content_change(id, AxisMask::AXES);
        Ok(())
    }

    /// Exclude `id` from, or return it to, its container's layout.
    pub fn set_ignored(&mut self, id: NodeId, ignored: bool) -> Result<(), LayoutError> {
        if !self.live_mut(id)?.element.set_ignored(ignored) {
            return Ok(());
        }
        if let Some(parent) = self.parent(id) {
            self.flush_feedback(id, true);
            if let Ok(c) = self.container_mut(parent) {
                c.tracker.mark_structural();
            }
        } else {
            self.live_mut(id)?.element.clear_dirty();
        }
        Ok(())
    }

    /// Enable or disable `id`.
    ///
    /// A disabled node is skipped by its container. Disabling a container
    /// discards all pending dirty state in its subtree and cancels its
    /// scheduled rebuild; feedback addressed to it is dropped. Re-enabling
    /// a container forces a full rebuild of its subtree.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), LayoutError> {
        let node = self.live_mut(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        node.element.clear_dirty();

        if node.container.is_some() {
            self.for_each_subtree_container(id, |tree, container| {
                let Some(node) = tree.node_mut(container) else {
                    return;
                };
                let Some(c) = node.container.as_mut() else {
                    return;
                };
                if enabled {
                    c.tracker.mark_all();
                    c.invalidate_plans();
                } else {
                    c.tracker.clear();
                    let children = c.children.clone();
                    for child in children {
                        if let Some(n) = tree.node_mut(child) {
                            n.element.clear_dirty();
                        }
                    }
                    tree.scheduler.cancel(container);
                }
            });
            if enabled {
                self.request(id);
            }
        }

        if let Some(parent) = self.parent(id)
            && let Ok(c) = self.container_mut(parent)
        {
            c.tracker.mark_structural();
            c.tracker.mark_child(id, AxisMask::IGNORE);
            self.request(parent);
        }
        Ok(())
    }

    /// Replace the configuration of `container` and schedule a full rebuild.
    pub fn set_layout(&mut self, container: NodeId, layout: LinearLayout) -> Result<(), LayoutError> {
        let c = self.container_mut(container)?;
        if c.layout == layout {
            return Ok(());
        }
        c.layout = layout;
        c.tracker.mark_all();
        c.invalidate_plans();
        let children = c.children.clone();
        for child in children {
            if let Some(n) = self.node_mut(child) {
                n.element.clear_dirty();
            }
        }
        self.request(container);
        Ok(())
    }

    /// Record raw dirty bits on `id` and deliver them to its container.
    ///
    /// Bits on axes the container does not control stay on the element
    /// unless `IGNORE` is included.
    pub fn report_dirty(&mut self, id: NodeId, mask: AxisMask) -> Result<(), LayoutError> {
        self.live_mut(id)?.element.mark_dirty(mask);
        self.flush_feedback(id, true);
        Ok(())
    }

    /// Mark every axis of `container` dirty and schedule a rebuild.
    pub fn request_full_rebuild(&mut self, container: NodeId) -> Result<(), LayoutError> {
        let c = self.container_mut(container)?;
        c.tracker.mark_all();
        c.invalidate_plans();
        self.request(container);
        Ok(())
    }

    /// Apply a host notification.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), LayoutError> {
        match event {
            HostEvent::ChildAttached {
                container,
                child,
                index,
            } => self.attach(container, child, index),
            HostEvent::ChildDetached { child } => self.detach(child),
            HostEvent::ChildReordered {
                container,
                from,
                to,
            } => self.reorder(container, from, to),
            HostEvent::SizeChanged { node, size } => self.set_measured_size(node, size),
            HostEvent::EnabledStateChanged { node, enabled } => self.set_enabled(node, enabled),
            HostEvent::FullRebuildRequested { container } => self.request_full_rebuild(container),
        }
    }

    // --- feedback ---

    /// Schedule a rebuild covering `container`, unless it is disabled.
    fn request(&mut self, container: NodeId) {
        if !self.is_enabled(container) {
            return;
        }
        if self.scheduler.schedule(container) {
            trace!(?container, "rebuild scheduled");
        }
    }

    /// Split `axes` into those the parent of `id` controls and those it does not.
    fn parent_controlled_split(&self, id: NodeId, axes: AxisMask) -> (AxisMask, AxisMask) {
        let axes = axes.axes();
        match self.parent(id).and_then(|p| self.container(p)) {
            Some(c) => {
                let controlled = c.children_controlled_axis();
                (axes & controlled, axes.difference(controlled))
            }
            None => (AxisMask::empty(), AxisMask::empty()),
        }
    }

    /// Report a change the parent must re-place for even on axes it does not
    /// control.
    fn report_content_change(&mut self, id: NodeId, axes: AxisMask) {
        if let Some(node) = self.node_mut(id) {
            node.element.mark_dirty(axes | AxisMask::IGNORE);
        }
        self.flush_feedback(id, true);
    }

    /// Deliver the dirty bits of `id` to its container.
    ///
    /// Returns `true` if the container accepted them. Bits filtered out by
    /// the container's controlled axes stay on the element.
    fn flush_feedback(&mut self, id: NodeId, schedule: bool) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let bits = node.element.dirty();
        if bits.is_empty() || !node.enabled {
            return false;
        }
        let Some(link) = node.element.link() else {
            return false;
        };
        let parent = link.container();
        let Some(parent_node) = self.node_mut(parent) else {
            return false;
        };
        if !parent_node.enabled {
            return false;
        }
        let Some(c) = parent_node.container.as_mut() else {
            return false;
        };
        if !feedback::delivers(c.children_controlled_axis(), bits) {
            trace!(?id, ?bits, "feedback filtered");
            return false;
        }
        c.tracker.mark_child(id, bits);
        if let Some(node) = self.node_mut(id) {
            node.element.clear_dirty();
        }
        if schedule {
            self.request(parent);
        }
        true
    }

    fn apply_deferred(&mut self, item: DeferredFeedback) {
        let result = match item {
            DeferredFeedback::Dirty { node, mask } => self.report_dirty(node, mask),
            DeferredFeedback::MeasuredSize { node, size } => self.set_measured_size(node, size),
        };
        if let Err(err) = result {
            debug!(%err, "dropping deferred feedback");
        }
    }

    // --- traversal ---

    fn for_each_subtree_container(&mut self, root: NodeId, mut f: impl FnMut(&mut Self, NodeId)) {
        let mut stack = core::mem::take(&mut self.scratch.stack);
        stack.clear();
        stack.push(root);
        while let Some(id) = stack.pop() {
            let Some(c) = self.container(id) else {
                continue;
            };
            stack.extend(c.children.iter().copied());
            f(self, id);
        }
        self.scratch.stack = stack;
    }

    /// Topmost enabled container above `id`, or `None` when `id` or one of
    /// its ancestors is disabled.
    fn layout_root(&self, mut id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if !node.enabled || node.container.is_none() {
            return None;
        }
        while let Some(parent) = self.parent(id) {
            let parent_node = self.node(parent)?;
            if !parent_node.enabled {
                return None;
            }
            if parent_node.container.is_none() {
                break;
            }
            id = parent;
        }
        Some(id)
    }

    /// Fill `scratch.order` with every enabled container under the layout
    /// roots of `requested`, parents before children.
    fn collect_scope(&self, requested: &[NodeId], scratch: &mut LayoutScratch) {
        let mut roots: SmallVec<[NodeId; 4]> = SmallVec::new();
        for &container in requested {
            let Some(root) = self.layout_root(container) else {
                continue;
            };
            if roots.contains(&root) {
                continue;
            }
            roots.push(root);
            scratch.stack.push(root);
            while let Some(id) = scratch.stack.pop() {
                let Some(node) = self.node(id) else {
                    continue;
                };
                let Some(c) = node.container.as_ref() else {
                    continue;
                };
                if !node.enabled {
                    continue;
                }
                scratch.order.push(id);
                for &child in c.children.iter().rev() {
                    if self
                        .node(child)
                        .is_some_and(|n| n.enabled && n.container.is_some())
                    {
                        scratch.stack.push(child);
                    }
                }
            }
        }
    }

    // --- passes ---

    /// Read the active children of `id` on `axis` into `scratch.samples`, in
    /// layout order, and record the first dirty index.
    fn sample_children(
        &mut self,
        id: NodeId,
        axis: Axis,
        scratch: &mut LayoutScratch,
    ) -> Result<(), LayoutError> {
        scratch.samples.clear();
        let c = self.container_ref(id)?;
        let layout = &c.layout;
        let control = layout.control_size[axis];
        let len = c.children.len();
        let mut first_dirty = None;
        for k in 0..len {
            let child = c.children[if layout.reverse_order { len - 1 - k } else { k }];
            let sample = match self.node(child) {
                Some(n) if !n.enabled || n.element.is_ignored() => continue,
                Some(n) => {
                    let unmeasured = control
                        && n.container
                            .as_ref()
                            .is_some_and(|nested| nested.aggregate[axis].is_none());
                    let measurement = if unmeasured {
                        None
                    } else {
                        n.element.measure(
                            axis,
                            control,
                            layout.force_expand[axis],
                            layout.force_expand_mode,
                        )
                    };
                    ChildSample {
                        id: child,
                        measurement,
                        scale: layout.scale_factor(axis, axis.component(n.element.scale())),
                        measured_extent: axis.extent(n.element.measured_size()),
                        anchor: n.element.anchor(),
                    }
                }
                None => ChildSample {
                    id: child,
                    measurement: None,
                    scale: 1.0,
                    measured_extent: 0.0,
                    anchor: Point::ORIGIN,
                },
            };
            if first_dirty.is_none() && c.tracker.is_child_dirty(child) {
                first_dirty = Some(scratch.samples.len());
            }
            scratch.samples.push(sample);
        }
        self.container_mut(id)?
            .tracker
            .set_first_dirty_index(first_dirty);
        Ok(())
    }

    fn measure_with(
        &mut self,
        id: NodeId,
        axis: Axis,
        scratch: &mut LayoutScratch,
    ) -> Result<Aggregate, LayoutError> {
        self.sample_children(id, axis, scratch)?;
        let c = self.container_mut(id)?;
        let aggregate = measure::measure_axis(&c.layout, axis, &scratch.samples, &mut scratch.prefilter)
            .map_err(|child| LayoutError::InvalidChildState {
                container: id,
                child,
                axis,
            })?;
        c.prefilter[axis] = SmallVec::from_slice(&scratch.prefilter);
        c.aggregate[axis] = Some(aggregate);
        trace!(
            ?id,
            ?axis,
            min = aggregate.min,
            preferred = aggregate.preferred,
            flexible = aggregate.flexible,
            "measured"
        );
        let changed = self.live_mut(id)?.element.publish_aggregate(
            axis,
            aggregate.min,
            aggregate.preferred,
            aggregate.flexible,
        );
        if changed {
            let schedule = !self.scheduler.is_running();
            self.flush_feedback(id, schedule);
        }
        Ok(aggregate)
    }

    fn place_with<H: LayoutHost + ?Sized>(
        &mut self,
        id: NodeId,
        axis: Axis,
        host: &mut H,
        scratch: &mut LayoutScratch,
        feedback: &mut FeedbackQueue,
    ) -> Result<(), LayoutError> {
        self.sample_children(id, axis, scratch)?;
        let node = self.live_mut(id)?;
        let extent = axis.extent(node.element.measured_size());
        let c = node.container.as_mut().ok_or(LayoutError::NotAContainer(id))?;

        scratch.placements.clear();
        if let Some(aggregate) = c.aggregate[axis] {
            let plan = place::plan_axis(
                &c.layout,
                axis,
                extent,
                aggregate,
                &scratch.samples,
                &c.prefilter[axis],
            );
            let full = c.tracker.needs_full_placement(axis) || c.last_plan[axis] != Some(plan);
            let samples = &scratch.samples;
            let placements = &mut scratch.placements;
            let emit = |index: usize, placement: Placement| {
                placements.push((samples[index].id, placement));
            };
            if full {
                place::place_children::<fn(&ChildSample) -> bool>(
                    &c.layout,
                    axis,
                    &plan,
                    samples,
                    Writes::All,
                    emit,
                );
            } else if c.layout.is_main_axis(axis) {
                let start = c.tracker.first_dirty_index().unwrap_or(samples.len());
                place::place_children::<fn(&ChildSample) -> bool>(
                    &c.layout,
                    axis,
                    &plan,
                    samples,
                    Writes::From(start),
                    emit,
                );
            } else {
                let tracker = &c.tracker;
                let dirty = |s: &ChildSample| tracker.is_child_dirty(s.id);
                place::place_children(&c.layout, axis, &plan, samples, Writes::Only(&dirty), emit);
            }
            c.last_plan[axis] = Some(plan);
            trace!(?id, ?axis, full, written = scratch.placements.len(), "placed");
        } else {
            trace!(?id, ?axis, "no aggregate, nothing to place");
        }

        let control = c.layout.control_size[axis];
        if c.tracker.finish_placement(axis) {
            trace!(?id, "container clean");
        }

        for &(child, placement) in &scratch.placements {
            let Some(n) = self.node_mut(child) else {
                continue;
            };
            n.placement[axis] = Some(placement);
            if control
                && n.element.write_extent(axis, placement.size)
                && let Some(nested) = n.container.as_mut()
            {
                nested.tracker.mark_axes(axis.mask());
            }
            host.write_placement(child, axis, placement, feedback);
        }
        Ok(())
    }

    // --- public passes ---

    /// Measure `container` on `axis` and publish the aggregate.
    ///
    /// This is one step of [`LayoutTree::rebuild`], exposed for hosts that
    /// drive passes themselves. On [`LayoutError::InvalidChildState`] the
    /// previous aggregate is kept.
    pub fn measure_axis(&mut self, container: NodeId, axis: Axis) -> Result<Aggregate, LayoutError> {
        let mut scratch = core::mem::take(&mut self.scratch);
        let result = self.measure_with(container, axis, &mut scratch);
        self.scratch = scratch;
        result
    }

    /// Place the children of `container` on `axis`.
    ///
    /// Feedback pushed by `host` is applied before returning.
    ///
    /// # Panics
    ///
    /// Panics if `container` is not pending placement on `axis`.
    pub fn place_axis<H: LayoutHost + ?Sized>(
        &mut self,
        container: NodeId,
        axis: Axis,
        host: &mut H,
    ) -> Result<(), LayoutError> {
        let pending = self.container_ref(container)?.tracker.is_pending_placement(axis);
        assert!(
            pending,
            "place_axis called for {container:?} on {axis:?}, which is not pending placement"
        );
        let mut scratch = core::mem::take(&mut self.scratch);
        let mut feedback = FeedbackQueue::new();
        let result = self.place_with(container, axis, host, &mut scratch, &mut feedback);
        self.scratch = scratch;
        for item in feedback.drain() {
            self.apply_deferred(item);
        }
        result
    }

    /// Run the scheduled rebuild, if any. Returns `true` if one ran.
    ///
    /// All marks made since the previous rebuild are handled by this one
    /// call. Feedback the host pushes while receiving placements is applied
    /// afterwards and schedules the next rebuild.
    pub fn rebuild<H: LayoutHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.scheduler.is_scheduled() {
            return false;
        }
        let mut scratch = core::mem::take(&mut self.scratch);
        scratch.reset();
        let mut requested = core::mem::take(&mut self.requested);
        self.scheduler.begin(&mut requested);
        self.collect_scope(&requested, &mut scratch);
        let order = core::mem::take(&mut scratch.order);
        debug!(
            requested = requested.len(),
            containers = order.len(),
            "layout rebuild"
        );

        for axis in Axis::ALL {
            for &id in order.iter().rev() {
                if !self.container(id).is_some_and(|c| c.tracker.is_pending()) {
                    continue;
                }
                if let Err(err) = self.measure_with(id, axis, &mut scratch) {
                    warn!(%err, "measurement aborted");
                }
            }
        }

        let mut feedback = FeedbackQueue::new();
        for axis in Axis::ALL {
            for &id in &order {
                if !self
                    .container(id)
                    .is_some_and(|c| c.tracker.is_pending_placement(axis))
                {
                    continue;
                }
                if let Err(err) = self.place_with(id, axis, host, &mut scratch, &mut feedback) {
                    warn!(%err, "placement skipped");
                }
            }
        }
        self.scheduler.defer_all(&mut feedback);

        scratch.order = order;
        self.scratch = scratch;
        self.requested = requested;
        self.scheduler.finish();

        let mut deferred = self.scheduler.take_deferred();
        if !deferred.is_empty() {
            debug!(count = deferred.len(), "replaying deferred feedback");
        }
        for item in deferred.drain() {
            self.apply_deferred(item);
        }
        true
    }
}
