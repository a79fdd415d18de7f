//! Job-agnostic display rows.
//!
//! Engine snapshots are generic over the job's skill and resource enums. A
//! renderer only needs names and numbers, so [`SessionView`] flattens them
//! into strings once per query.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use rotation_core::{
    ActionNode, JobId, Marker, Millis, NodeFlags, NodeId, PotencyResult, PotencySummary,
    ResourceKind, SessionSnapshot, SlotSnapshot,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub name: String,
    pub kind: ResourceKind,
    pub amount: u32,
    pub available: u32,
    pub max: u32,
    pub timer: Millis,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub skill: String,
    pub requested_at: Millis,
    /// Resolved start; the requested time while unresolved.
    pub start: Millis,
    pub cast: Millis,
    pub recast: Millis,
    pub lock: Millis,
    pub snapshot_at: Option<Millis>,
    pub targets: u8,
    pub flags: NodeFlags,
    /// Human-readable reasons; empty for valid nodes.
    pub invalid: Vec<String>,
    pub procs: Vec<String>,
    pub potency: Option<PotencyResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRow {
    pub at: Millis,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub index: usize,
    pub now: Millis,
    pub lock_until: Millis,
    pub gcd_ready_in: Millis,
    pub resources: Vec<ResourceRow>,
    pub nodes: Vec<NodeRow>,
    pub warnings: Vec<WarningRow>,
    pub potency: PotencySummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub job: JobId,
    pub cursor: Millis,
    pub start: Millis,
    pub end: Millis,
    pub active_slot: usize,
    pub slots: Vec<SlotView>,
    pub markers: Vec<Marker>,
}

impl SessionView {
    pub fn slot(&self, index: usize) -> Option<&SlotView> {
        self.slots.get(index)
    }
}

impl<S: Display, R: Display> From<SessionSnapshot<S, R>> for SessionView {
    fn from(snapshot: SessionSnapshot<S, R>) -> Self {
        Self {
            job: snapshot.job,
            cursor: snapshot.cursor,
            start: snapshot.start,
            end: snapshot.end,
            active_slot: snapshot.active_slot,
            slots: snapshot.slots.into_iter().map(SlotView::from).collect(),
            markers: snapshot.markers,
        }
    }
}

impl<S: Display, R: Display> From<SlotSnapshot<S, R>> for SlotView {
    fn from(slot: SlotSnapshot<S, R>) -> Self {
        let resources = slot
            .resources
            .into_iter()
            .map(|view| ResourceRow {
                name: view.resource.to_string(),
                kind: view.kind,
                amount: view.value.amount,
                available: view.available,
                max: view.max,
                timer: view.value.timer,
                enabled: view.value.enabled,
            })
            .collect();

        let nodes = slot
            .nodes
            .into_iter()
            .map(|view| node_row(view.node, view.flags, view.potency))
            .collect();

        let warnings = slot
            .warnings
            .into_iter()
            .map(|mark| WarningRow {
                at: mark.at,
                message: mark.kind.to_string(),
            })
            .collect();

        Self {
            index: slot.index,
            now: slot.now,
            lock_until: slot.lock_until,
            gcd_ready_in: slot.gcd_ready_in,
            resources,
            nodes,
            warnings,
            potency: slot.potency,
        }
    }
}

pub(crate) fn node_row<S: Display, R: Display>(
    node: ActionNode<S, R>,
    flags: NodeFlags,
    potency: Option<PotencyResult>,
) -> NodeRow {
    let resolution = node.resolution.as_ref();
    NodeRow {
        id: node.id,
        skill: node.skill.to_string(),
        requested_at: node.requested_at,
        start: node.display_time(),
        cast: resolution.map_or(Millis::ZERO, |r| r.cast),
        recast: resolution.map_or(Millis::ZERO, |r| r.recast),
        lock: resolution.map_or(Millis::ZERO, |r| r.lock),
        snapshot_at: resolution.map(|r| r.snapshot_at),
        targets: node.targets,
        flags,
        invalid: node.invalid.iter().map(ToString::to_string).collect(),
        procs: resolution
            .map(|r| r.procs.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
        potency,
    }
}
