//! Event types and sinks for observing town generation.
//!
//! [`TownEvent`]s are emitted by [`crate::town::runner::TownGenerator`] and
//! [`crate::town::runner::generate_town_with_events`] as each pipeline stage runs.
use crate::params::{Params, Viewport};
use crate::town::runner::Stage;

/// Describes events emitted while generating a town.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum TownEvent {
    /// Emitted once before the first stage.
    RunStarted {
        /// Parameters of the run.
        params: Params,
        /// Raster viewport used for block extraction.
        viewport: Viewport,
    },

    /// Emitted when a stage starts.
    StageStarted { stage: Stage },

    /// Emitted when a stage finishes.
    StageFinished {
        stage: Stage,
        /// Number of items the stage produced.
        items: usize,
        /// Number of candidates the stage discarded.
        rejected: usize,
    },

    /// Emitted when no block survived extraction and the fallback circle was used.
    FallbackBlock {
        /// Components found by the flood fill.
        components: usize,
    },

    /// Emitted when a civic building was promoted to landmark.
    LandmarkChosen { building_id: String },

    /// Non-fatal warning generated during generation.
    Warning {
        /// Context string (e.g. stage name).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted after the last stage.
    RunFinished { summary: TownSummary },
}

/// Discriminant of [`TownEvent`], used by sinks to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TownEventKind {
    RunStarted,
    StageStarted,
    StageFinished,
    FallbackBlock,
    LandmarkChosen,
    Warning,
    RunFinished,
}

impl TownEvent {
    pub fn kind(&self) -> TownEventKind {
        match self {
            TownEvent::RunStarted { .. } => TownEventKind::RunStarted,
            TownEvent::StageStarted { .. } => TownEventKind::StageStarted,
            TownEvent::StageFinished { .. } => TownEventKind::StageFinished,
            TownEvent::FallbackBlock { .. } => TownEventKind::FallbackBlock,
            TownEvent::LandmarkChosen { .. } => TownEventKind::LandmarkChosen,
            TownEvent::Warning { .. } => TownEventKind::Warning,
            TownEvent::RunFinished { .. } => TownEventKind::RunFinished,
        }
    }
}

/// Item counts of a finished town.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TownSummary {
    pub road_nodes: usize,
    pub road_edges: usize,
    pub polylines: usize,
    pub blocks: usize,
    pub parcels: usize,
    pub buildings: usize,
    pub trees: usize,
}

/// A generic event sink that accepts [`TownEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: TownEvent);

    /// Whether the sink cares about events of `kind`. Emitters skip building events
    /// nobody wants.
    #[inline]
    fn wants(&self, _kind: TownEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = TownEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: TownEvent) {}

    #[inline]
    fn wants(&self, _kind: TownEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(TownEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(TownEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(TownEvent),
{
    #[inline]
    fn send(&mut self, event: TownEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<TownEvent>,
    only: Option<Vec<TownEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only events of the given kinds.
    pub fn filtered(kinds: impl IntoIterator<Item = TownEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<TownEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[TownEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: TownEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: TownEventKind) -> bool {
        self.only.as_ref().is_none_or(|only| only.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: TownEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: TownEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(context: &str) -> TownEvent {
        TownEvent::Warning {
            context: context.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::with_capacity(2);
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(warning("b"));
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn filtered_vec_sink_drops_other_kinds() {
        let mut sink = VecSink::filtered([TownEventKind::StageStarted]);
        assert!(!sink.wants(TownEventKind::Warning));
        sink.send(warning("a"));
        sink.send(TownEvent::StageStarted {
            stage: Stage::Roads,
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.as_slice()[0].kind(), TownEventKind::StageStarted);
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!().wants(TownEventKind::RunFinished));
    }

    #[test]
    fn multi_sink_fans_out_events() {
        let mut multi = MultiSink::with_sinks(vec![
            VecSink::new(),
            VecSink::filtered([TownEventKind::RunFinished]),
        ]);
        multi.send(warning("ctx"));
        assert_eq!(multi.sinks[0].len(), 1);
        assert_eq!(multi.sinks[1].len(), 0);
        assert!(multi.wants(TownEventKind::Warning));
        assert!(!MultiSink::<VecSink>::new().wants(TownEventKind::Warning));
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        assert_eq!(count, 1);
    }
}
