//! Cross-chart view synchronization.
//!
//! Members queue the view changes they make locally. `SyncGroup::sync`
//! drains every member's queue and replays each change on all *other*
//! members with `Broadcast::Suppress`, so a replayed change is never
//! re-broadcast.

use super::spectrum::SpectrumView;
use super::waterfall::WaterfallView;
use super::{Broadcast, ChartError, ViewChange, ViewSync};

/// Handle to a member of a `SyncGroup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u64);

/// A spectrum or waterfall chart, for groups mixing both.
#[derive(Debug, Clone)]
pub enum ChartView {
    Spectrum(SpectrumView),
    Waterfall(WaterfallView),
}

impl ChartView {
    pub fn as_spectrum_mut(&mut self) -> Option<&mut SpectrumView> {
        match self {
            ChartView::Spectrum(view) => Some(view),
            ChartView::Waterfall(_) => None,
        }
    }

    pub fn as_waterfall_mut(&mut self) -> Option<&mut WaterfallView> {
        match self {
            ChartView::Waterfall(view) => Some(view),
            ChartView::Spectrum(_) => None,
        }
    }

    pub fn as_spectrum(&self) -> Option<&SpectrumView> {
        match self {
            ChartView::Spectrum(view) => Some(view),
            ChartView::Waterfall(_) => None,
        }
    }

    pub fn as_waterfall(&self) -> Option<&WaterfallView> {
        match self {
            ChartView::Waterfall(view) => Some(view),
            ChartView::Spectrum(_) => None,
        }
    }
}

impl From<SpectrumView> for ChartView {
    fn from(view: SpectrumView) -> Self {
        ChartView::Spectrum(view)
    }
}

impl From<WaterfallView> for ChartView {
    fn from(view: WaterfallView) -> Self {
        ChartView::Waterfall(view)
    }
}

impl ViewSync for ChartView {
    fn apply_change(
        &mut self,
        change: &ViewChange,
        broadcast: Broadcast,
    ) -> Result<(), ChartError> {
        match self {
            ChartView::Spectrum(view) => view.apply_change(change, broadcast),
            ChartView::Waterfall(view) => view.apply_change(change, broadcast),
        }
    }

    fn take_changes(&mut self) -> Vec<ViewChange> {
        match self {
            ChartView::Spectrum(view) => view.take_changes(),
            ChartView::Waterfall(view) => view.take_changes(),
        }
    }
}

/// Owns a set of charts and keeps their views aligned.
#[derive(Debug)]
pub struct SyncGroup<C> {
    members: Vec<(MemberId, C)>,
    next_id: u64,
    paused: bool,
}

impl<C> Default for SyncGroup<C> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            next_id: 0,
            paused: false,
        }
    }
}

impl<C: ViewSync> SyncGroup<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chart. Changes it queued before joining are discarded.
    pub fn connect(&mut self, mut member: C) -> MemberId {
        member.take_changes();
        let id = MemberId(self.next_id);
        self.next_id += 1;
        self.members.push((id, member));
        id
    }

    /// Remove a chart and hand it back.
    pub fn disconnect(&mut self, id: MemberId) -> Option<C> {
        let index = self.members.iter().position(|(m, _)| *m == id)?;
        Some(self.members.remove(index).1)
    }

    pub fn member(&self, id: MemberId) -> Option<&C> {
        self.members.iter().find(|(m, _)| *m == id).map(|(_, c)| c)
    }

    /// Mutable access to a chart. Call `sync` afterwards to propagate.
    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut C> {
        self.members
            .iter_mut()
            .find(|(m, _)| *m == id)
            .map(|(_, c)| c)
    }

    /// Run `f` on one chart, then propagate whatever it changed.
    pub fn update<R>(&mut self, id: MemberId, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let result = f(self.member_mut(id)?);
        self.sync();
        Some(result)
    }

    /// Apply `change` to the chart `origin` and propagate it.
    pub fn apply(&mut self, origin: MemberId, change: &ViewChange) -> Result<(), ChartError> {
        if let Some(member) = self.member_mut(origin) {
            member.apply_change(change, Broadcast::Emit)?;
        }
        self.sync();
        Ok(())
    }

    /// Stop propagating. Changes made while paused are dropped.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().map(|(id, _)| *id)
    }

    /// Replay every queued change on the other members. Returns the number
    /// of changes delivered; a peer rejecting a change is logged and skipped.
    pub fn sync(&mut self) -> usize {
        let mut delivered = 0;
        for i in 0..self.members.len() {
            let changes = self.members[i].1.take_changes();
            if self.paused || changes.is_empty() {
                continue;
            }
            let origin = self.members[i].0;
            for change in &changes {
                for (id, peer) in self.members.iter_mut().filter(|(id, _)| *id != origin) {
                    match peer.apply_change(change, Broadcast::Suppress) {
                        Ok(()) => delivered += 1,
                        Err(e) => log::warn!("Member {:?} rejected {:?}: {}", id, change, e),
                    }
                }
            }
        }
        delivered
    }
}
