// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rebuild scheduling.
//!
//! Any number of marks between two rebuilds coalesce into one scheduled
//! rebuild. While a rebuild is running, new reports are deferred and replayed
//! after it completes, which schedules the next one.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::feedback::FeedbackQueue;
use crate::tree::NodeId;

/// Scheduler lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// No rebuild requested.
    #[default]
    Idle,
    /// A rebuild will run on the next [`LayoutTree::rebuild`](crate::LayoutTree::rebuild).
    Scheduled,
    /// A rebuild is in progress.
    Running,
}

/// Coalesces rebuild requests and defers re-entrant feedback.
#[derive(Debug, Default)]
pub struct RebuildScheduler {
    state: SchedulerState,
    requested: Vec<NodeId>,
    requested_set: HashSet<NodeId>,
    deferred: FeedbackQueue,
    requests: u64,
    rebuilds: u64,
}

impl RebuildScheduler {
    /// An idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns `true` if a rebuild is waiting to run.
    pub fn is_scheduled(&self) -> bool {
        self.state == SchedulerState::Scheduled
    }

    /// Returns `true` while a rebuild is in progress.
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Containers requested since the last rebuild began.
    pub fn requested(&self) -> &[NodeId] {
        &self.requested
    }

    /// Total schedule requests accepted, coalesced or not.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Completed rebuilds.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Request a rebuild touching `container`.
    ///
    /// Returns `true` if this request moved the scheduler from idle to
    /// scheduled.
    pub(crate) fn schedule(&mut self, container: NodeId) -> bool {
        self.requests += 1;
        if self.requested_set.insert(container) {
            self.requested.push(container);
        }
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Scheduled;
            true
        } else {
            false
        }
    }

    /// Drop a pending request, e.g. for a disabled or removed container.
    pub(crate) fn cancel(&mut self, container: NodeId) {
        if self.requested_set.remove(&container) {
            self.requested.retain(|c| *c != container);
            if self.requested.is_empty() && self.state == SchedulerState::Scheduled {
                self.state = SchedulerState::Idle;
            }
        }
    }

    /// Enter the running state and hand out the requested containers.
    pub(crate) fn begin(&mut self, out: &mut Vec<NodeId>) {
        out.clear();
        out.append(&mut self.requested);
        self.requested_set.clear();
        self.state = SchedulerState::Running;
    }

    /// Leave the running state.
    pub(crate) fn finish(&mut self) {
        self.rebuilds += 1;
        self.state = if self.requested.is_empty() {
            SchedulerState::Idle
        } else {
            SchedulerState::Scheduled
        };
    }

    /// Queue feedback produced during the running rebuild.
    pub(crate) fn defer_all(&mut self, feedback: &mut FeedbackQueue) {
        self.deferred.append(feedback);
    }

    /// Number of deferred feedback items awaiting replay.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub(crate) fn take_deferred(&mut self) -> FeedbackQueue {
        core::mem::take(&mut self.deferred)
    }
}
