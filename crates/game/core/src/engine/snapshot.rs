//! Owned read models of a session, and its replay digest.

use sha2::{Digest, Sha256};

use super::GameState;
use crate::config::JobId;
use crate::job::Job;
use crate::node::{ActionNode, NodeFlags, NodeStatus};
use crate::potency::{self, PotencyOptions, PotencyResult, PotencySummary};
use crate::resource::{ResourceId, ResourceKind, ResourceValue};
use crate::time::Millis;
use crate::timeline::{Marker, WarningMark};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceView<R> {
    pub resource: R,
    pub kind: ResourceKind,
    pub value: ResourceValue,
    pub max: u32,
    /// Charges for cooldowns, stacks otherwise.
    pub available: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeView<S, R> {
    pub node: ActionNode<S, R>,
    pub flags: NodeFlags,
    pub potency: Option<PotencyResult>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotSnapshot<S, R> {
    pub index: usize,
    pub now: Millis,
    pub lock_until: Millis,
    pub gcd_ready_in: Millis,
    pub proc_draws: u64,
    pub resources: Vec<ResourceView<R>>,
    pub nodes: Vec<NodeView<S, R>>,
    pub warnings: Vec<WarningMark<R>>,
    pub potency: PotencySummary,
}

/// Everything a renderer needs, detached from the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot<S, R> {
    pub job: JobId,
    pub cursor: Millis,
    pub start: Millis,
    pub end: Millis,
    pub active_slot: usize,
    pub slots: Vec<SlotSnapshot<S, R>>,
    pub markers: Vec<Marker>,
}

impl<J: Job> GameState<J> {
    pub fn snapshot(&self, options: &PotencyOptions) -> SessionSnapshot<J::Skill, J::Resource> {
        let slots = self
            .slots
            .iter()
            .zip(self.timeline.slots())
            .enumerate()
            .map(|(index, (state, slot_timeline))| SlotSnapshot {
                index,
                now: state.now,
                lock_until: state.lock_until,
                gcd_ready_in: state.store.ready_in(J::GCD),
                proc_draws: state.roller.draws(),
                resources: state
                    .store
                    .iter()
                    .map(|(resource, value)| {
                        let descriptor = resource.descriptor();
                        ResourceView {
                            resource,
                            kind: descriptor.kind,
                            value,
                            max: descriptor.max,
                            available: state.store.available(resource),
                        }
                    })
                    .collect(),
                nodes: slot_timeline
                    .nodes()
                    .iter()
                    .map(|node| NodeView {
                        node: node.clone(),
                        flags: node.flags(),
                        potency: potency::resolve(node, &self.timeline, options),
                    })
                    .collect(),
                warnings: slot_timeline.warnings().to_vec(),
                potency: potency::summarize(slot_timeline.nodes(), &self.timeline, options, None),
            })
            .collect();

        SessionSnapshot {
            job: J::ID,
            cursor: self.cursor,
            start: self.session_start(),
            end: self.session_end(),
            active_slot: self.timeline.active_slot(),
            slots,
            markers: self.timeline.markers().to_vec(),
        }
    }

    /// SHA-256 over the live resources and every node's outcome.
    ///
    /// Node ids are excluded, so deleting a node and re-adding the same
    /// action yields the same digest.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(J::ID.as_ref().as_bytes());
        hasher.update(self.cursor.as_millis().to_le_bytes());

        for (state, slot_timeline) in self.slots.iter().zip(self.timeline.slots()) {
            hasher.update(state.now.as_millis().to_le_bytes());
            hasher.update(state.lock_until.as_millis().to_le_bytes());
            hasher.update(state.next_mana_tick.as_millis().to_le_bytes());
            hasher.update(state.roller.draws().to_le_bytes());
            for (resource, value) in state.store.iter() {
                hasher.update((resource.index() as u64).to_le_bytes());
                hasher.update(value.amount.to_le_bytes());
                hasher.update(value.timer.as_millis().to_le_bytes());
                hasher.update([u8::from(value.enabled)]);
            }
            for node in slot_timeline.nodes() {
                hash_node(&mut hasher, node);
            }
        }

        hasher.finalize().into()
    }
}

fn hash_node<S: core::fmt::Display, R: ResourceId>(hasher: &mut Sha256, node: &ActionNode<S, R>) {
    hasher.update(node.skill.to_string().as_bytes());
    hasher.update(node.requested_at.as_millis().to_le_bytes());
    hasher.update([node.targets, u8::from(node.wait_for_ready)]);
    hasher.update([match node.status() {
        NodeStatus::Proposed => 0u8,
        NodeStatus::Valid => 1,
        NodeStatus::Invalid => 2,
    }]);
    if let Some(resolution) = &node.resolution {
        hasher.update(resolution.start.as_millis().to_le_bytes());
        hasher.update(resolution.lock.as_millis().to_le_bytes());
        for granted in &resolution.procs {
            hasher.update((granted.index() as u64).to_le_bytes());
        }
    }
}
