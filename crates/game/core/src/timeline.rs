//! Slots, nodes, markers and warning marks.
//!
//! The timeline is the authoritative record of what the user asked for. Each
//! slot holds its nodes ordered by requested time; markers (party buffs,
//! tinctures, untargetable windows, notes) are shared by every slot.

use core::fmt;

use arrayvec::ArrayVec;

use crate::config::MAX_SLOTS;
use crate::error::EngineError;
use crate::node::{ActionNode, NodeId};
use crate::potency::Targetability;
use crate::time::Millis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// An external damage buff shared by the party.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyBuff {
    pub name: String,
    pub bonus_percent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum MarkerKind {
    PartyBuff(PartyBuff),
    Tincture,
    Untargetable,
    Note { text: String },
}

/// A time window annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub start: Millis,
    pub duration: Millis,
}

impl Marker {
    /// Half-open window `[start, start + duration)`.
    pub fn covers(&self, at: Millis) -> bool {
        self.start <= at && at < self.start + self.duration
    }
}

/// Something the user probably did not intend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningKind<R> {
    /// Gain beyond the maximum was lost.
    Overcap(R),
    /// An active effect was re-applied.
    Overwrite(R),
    /// An effect ran out.
    Timeout(R),
    /// A combo skill was used without its marker.
    ComboBreak(R),
    Custom(String),
}

impl<R: fmt::Display> fmt::Display for WarningKind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overcap(resource) => write!(f, "{resource} overcapped"),
            Self::Overwrite(resource) => write!(f, "{resource} overwritten"),
            Self::Timeout(resource) => write!(f, "{resource} timed out"),
            Self::ComboBreak(resource) => write!(f, "combo broken ({resource} missing)"),
            Self::Custom(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarningMark<R> {
    pub at: Millis,
    pub kind: WarningKind<R>,
}

/// Nodes and replay warnings of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotTimeline<S, R> {
    pub(crate) nodes: Vec<ActionNode<S, R>>,
    pub(crate) warnings: Vec<WarningMark<R>>,
}

impl<S, R> Default for SlotTimeline<S, R> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<S, R> SlotTimeline<S, R> {
    pub fn nodes(&self) -> &[ActionNode<S, R>] {
        &self.nodes
    }

    pub fn warnings(&self) -> &[WarningMark<R>] {
        &self.warnings
    }

    pub fn node(&self, id: NodeId) -> Option<&ActionNode<S, R>> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Latest requested time on this slot.
    pub fn last_requested(&self) -> Option<Millis> {
        self.nodes.last().map(|node| node.requested_at)
    }

    /// Start of the last node; resolved starts never decrease along a slot.
    pub fn last_start(&self) -> Option<Millis> {
        self.nodes.last().map(ActionNode::display_time)
    }

    /// Inserts keeping requested-time order; equal times keep insertion order.
    pub(crate) fn insert(&mut self, node: ActionNode<S, R>) -> usize {
        let index = self
            .nodes
            .partition_point(|existing| existing.requested_at <= node.requested_at);
        self.nodes.insert(index, node);
        index
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<ActionNode<S, R>> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        Some(self.nodes.remove(index))
    }
}

/// Every slot plus the shared markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline<S, R> {
    slots: ArrayVec<SlotTimeline<S, R>, MAX_SLOTS>,
    active_slot: usize,
    markers: Vec<Marker>,
    next_node: u64,
    next_marker: u64,
}

impl<S: Clone, R: Clone> Default for Timeline<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone, R: Clone> Timeline<S, R> {
    /// A timeline with one empty slot.
    pub fn new() -> Self {
        let mut slots = ArrayVec::new();
        slots.push(SlotTimeline::default());
        Self {
            slots,
            active_slot: 0,
            markers: Vec::new(),
            next_node: 1,
            next_marker: 1,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[SlotTimeline<S, R>] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Result<&SlotTimeline<S, R>, EngineError> {
        self.slots.get(slot).ok_or(EngineError::SlotOutOfRange {
            slot,
            count: self.slots.len(),
        })
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Result<&mut SlotTimeline<S, R>, EngineError> {
        let count = self.slots.len();
        self.slots
            .get_mut(slot)
            .ok_or(EngineError::SlotOutOfRange { slot, count })
    }

    /// A slot's nodes together with the shared markers, for replay.
    pub(crate) fn slot_with_markers(
        &mut self,
        slot: usize,
    ) -> Result<(&mut SlotTimeline<S, R>, &[Marker]), EngineError> {
        let count = self.slots.len();
        let slot = self
            .slots
            .get_mut(slot)
            .ok_or(EngineError::SlotOutOfRange { slot, count })?;
        Ok((slot, &self.markers))
    }

    /// Every slot together with the shared markers, for full rebuilds.
    pub(crate) fn all_slots_with_markers(&mut self) -> (&mut [SlotTimeline<S, R>], &[Marker]) {
        (&mut self.slots, &self.markers)
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub(crate) fn set_active_slot(&mut self, slot: usize) -> Result<(), EngineError> {
        self.slot(slot)?;
        self.active_slot = slot;
        Ok(())
    }

    pub(crate) fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub(crate) fn add_slot(&mut self) -> Result<usize, EngineError> {
        self.slots
            .try_push(SlotTimeline::default())
            .map_err(|_| EngineError::SlotLimit { max: MAX_SLOTS })?;
        Ok(self.slots.len() - 1)
    }

    /// Copies a slot's nodes into a new slot; the copies get fresh ids.
    pub(crate) fn clone_slot(&mut self, slot: usize) -> Result<usize, EngineError> {
        if self.slots.is_full() {
            return Err(EngineError::SlotLimit { max: MAX_SLOTS });
        }
        let mut copy = self.slot(slot)?.clone();
        for node in &mut copy.nodes {
            node.id = self.allocate_node_id();
        }
        self.slots.push(copy);
        Ok(self.slots.len() - 1)
    }

    pub(crate) fn remove_slot(&mut self, slot: usize) -> Result<(), EngineError> {
        self.slot(slot)?;
        if self.slots.len() == 1 {
            return Err(EngineError::LastSlot);
        }
        self.slots.remove(slot);
        if self.active_slot >= slot && self.active_slot > 0 {
            self.active_slot -= 1;
        }
        Ok(())
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub(crate) fn add_marker(&mut self, kind: MarkerKind, start: Millis, duration: Millis) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.push(Marker {
            id,
            kind,
            start,
            duration: duration.non_negative(),
        });
        id
    }

    pub(crate) fn remove_marker(&mut self, id: MarkerId) -> Result<Marker, EngineError> {
        let index = self
            .markers
            .iter()
            .position(|marker| marker.id == id)
            .ok_or(EngineError::MarkerNotFound(id))?;
        Ok(self.markers.remove(index))
    }
}

/// Party buffs covering `at`.
pub fn party_buffs_at(markers: &[Marker], at: Millis) -> Vec<PartyBuff> {
    markers
        .iter()
        .filter(|marker| marker.covers(at))
        .filter_map(|marker| match &marker.kind {
            MarkerKind::PartyBuff(buff) => Some(buff.clone()),
            _ => None,
        })
        .collect()
}

pub fn tincture_at(markers: &[Marker], at: Millis) -> bool {
    markers
        .iter()
        .any(|marker| marker.kind == MarkerKind::Tincture && marker.covers(at))
}

impl<S, R> Targetability for Timeline<S, R> {
    fn is_untargetable(&self, at: Millis) -> bool {
        self.markers
            .iter()
            .any(|marker| marker.kind == MarkerKind::Untargetable && marker.covers(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::SkillKind;

    type TestTimeline = Timeline<&'static str, u8>;

    fn node(timeline: &mut TestTimeline, skill: &'static str, at: i64) -> ActionNode<&'static str, u8> {
        let id = timeline.allocate_node_id();
        ActionNode::proposed(id, skill, SkillKind::Spell, None, Millis(at))
    }

    #[test]
    fn nodes_stay_ordered_by_request_time() {
        let mut timeline = TestTimeline::new();
        let a = node(&mut timeline, "a", 0);
        let b = node(&mut timeline, "b", 5_000);
        let c = node(&mut timeline, "c", 2_500);
        let d = node(&mut timeline, "d", 2_500);
        let slot = timeline.slot_mut(0).unwrap();
        slot.insert(a);
        slot.insert(b);
        slot.insert(c);
        slot.insert(d);
        let order: Vec<_> = slot.nodes().iter().map(|node| node.skill).collect();
        assert_eq!(order, ["a", "c", "d", "b"]);
    }

    #[test]
    fn slot_count_is_bounded_and_never_empty() {
        let mut timeline = TestTimeline::new();
        assert_eq!(timeline.remove_slot(0), Err(EngineError::LastSlot));
        for expected in 1..MAX_SLOTS {
            assert_eq!(timeline.add_slot(), Ok(expected));
        }
        assert_eq!(timeline.add_slot(), Err(EngineError::SlotLimit { max: MAX_SLOTS }));
        assert_eq!(timeline.clone_slot(0), Err(EngineError::SlotLimit { max: MAX_SLOTS }));
        assert!(matches!(
            timeline.remove_slot(9),
            Err(EngineError::SlotOutOfRange { slot: 9, .. })
        ));
    }

    #[test]
    fn cloned_slots_get_fresh_node_ids() {
        let mut timeline = TestTimeline::new();
        let first = node(&mut timeline, "a", 0);
        timeline.slot_mut(0).unwrap().insert(first);
        let copy = timeline.clone_slot(0).unwrap();
        let original_id = timeline.slot(0).unwrap().nodes()[0].id;
        let copied = &timeline.slot(copy).unwrap().nodes()[0];
        assert_eq!(copied.skill, "a");
        assert_ne!(copied.id, original_id);
    }

    #[test]
    fn removing_a_slot_keeps_active_index_in_range() {
        let mut timeline = TestTimeline::new();
        timeline.add_slot().unwrap();
        timeline.set_active_slot(1).unwrap();
        timeline.remove_slot(1).unwrap();
        assert_eq!(timeline.active_slot(), 0);
    }

    #[test]
    fn markers_cover_half_open_windows() {
        let mut timeline = TestTimeline::new();
        timeline.add_marker(MarkerKind::Untargetable, Millis(10_000), Millis(5_000));
        let buff = PartyBuff {
            name: "battle hymn".into(),
            bonus_percent: 5,
        };
        let id = timeline.add_marker(MarkerKind::PartyBuff(buff.clone()), Millis(0), Millis(20_000));

        assert!(!timeline.is_untargetable(Millis(9_999)));
        assert!(timeline.is_untargetable(Millis(10_000)));
        assert!(!timeline.is_untargetable(Millis(15_000)));
        assert_eq!(party_buffs_at(timeline.markers(), Millis(19_999)), vec![buff]);

        timeline.remove_marker(id).unwrap();
        assert!(party_buffs_at(timeline.markers(), Millis(0)).is_empty());
        assert_eq!(
            timeline.remove_marker(id),
            Err(EngineError::MarkerNotFound(id))
        );
    }
}
