//! Lightweight in-process counters and histograms for the memory core.
//!
//! Not a metrics-export pipeline — just enough bookkeeping to answer "is
//! promotion keeping up" and "how big is the store pool" without pulling
//! in a full metrics stack. Counters and histograms are both named by a
//! small fixed vocabulary ([`events`]) so call sites never invent ad hoc
//! metric names.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

/// Well-known event names, grouped by subsystem. Names match spec §6
/// exactly so a consumer wiring this crate's [`Telemetry`] into a real
/// metrics pipeline can map 1:1 onto the documented event table.
pub mod events {
    use crate::promotion::TriggerKind;

    /// One per [`TriggerKind`] — `memory.promotion.{periodic,pause,close,limit,agent}`.
    #[must_use]
    pub fn promotion_trigger(trigger: TriggerKind) -> &'static str {
        match trigger {
            TriggerKind::Periodic => "memory.promotion.periodic",
            TriggerKind::SessionPause => "memory.promotion.pause",
            TriggerKind::SessionClose => "memory.promotion.close",
            TriggerKind::MemoryLimit => "memory.promotion.limit",
            TriggerKind::AgentDecision => "memory.promotion.agent",
        }
    }

    pub const PROMOTION_CANDIDATE_COUNT: &str = "memory.promotion.candidate_count";
    pub const PROMOTION_PROMOTED_COUNT: &str = "memory.promotion.promoted_count";
    pub const PROMOTION_DURATION_US: &str = "memory.promotion.duration_us";

    pub const STORE_OPENED: &str = "memory.store.opened";
    pub const STORE_CLOSED: &str = "memory.store.closed";
    pub const STORE_EVICTED: &str = "memory.store.evicted";
    pub const STORE_IDLE_CLEANED: &str = "memory.store.idle_cleaned";

    pub const ADAPTER_PERSIST: &str = "memory.adapter.persist";
    pub const ADAPTER_QUERY: &str = "memory.adapter.query";
    pub const ADAPTER_SUPERSEDE: &str = "memory.adapter.supersede";
    pub const ADAPTER_ERROR: &str = "memory.adapter.error";
    pub const ADAPTER_DURATION_US: &str = "memory.adapter.duration_us";
}

#[derive(Debug, Clone, Copy)]
struct HistogramData {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl HistogramData {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl Default for HistogramData {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

/// Summary stats read back out of a histogram.
#[derive(Debug, Clone, Copy)]
pub struct HistogramStats {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Process-wide counters and histograms for the memory core.
#[derive(Default)]
pub struct Telemetry {
    counters: Mutex<HashMap<&'static str, u64>>,
    histograms: Mutex<HashMap<&'static str, HistogramData>>,
}

impl Telemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self, name: &'static str) {
        self.incr_by(name, 1);
    }

    pub fn incr_by(&self, name: &'static str, n: u64) {
        *self.counters.lock().entry(name).or_insert(0) += n;
    }

    pub fn record(&self, name: &'static str, value: f64) {
        self.histograms.lock().entry(name).or_default().record(value);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn histogram(&self, name: &str) -> Option<HistogramStats> {
        let histograms = self.histograms.lock();
        let data = histograms.get(name)?;
        if data.count == 0 {
            return None;
        }
        Some(HistogramStats {
            count: data.count,
            avg: data.sum / data.count as f64,
            min: data.min,
            max: data.max,
        })
    }
}

static GLOBAL: OnceLock<Telemetry> = OnceLock::new();

/// The process-wide telemetry instance, initialized on first use.
pub fn telemetry() -> &'static Telemetry {
    GLOBAL.get_or_init(Telemetry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let telemetry = Telemetry::new();
        telemetry.incr(events::PROMOTION_PROMOTED_COUNT);
        telemetry.incr(events::PROMOTION_PROMOTED_COUNT);
        assert_eq!(telemetry.counter(events::PROMOTION_PROMOTED_COUNT), 2);
    }

    #[test]
    fn promotion_trigger_names_match_spec_table() {
        assert_eq!(events::promotion_trigger(crate::promotion::TriggerKind::Periodic), "memory.promotion.periodic");
        assert_eq!(events::promotion_trigger(crate::promotion::TriggerKind::SessionPause), "memory.promotion.pause");
        assert_eq!(events::promotion_trigger(crate::promotion::TriggerKind::SessionClose), "memory.promotion.close");
        assert_eq!(events::promotion_trigger(crate::promotion::TriggerKind::MemoryLimit), "memory.promotion.limit");
        assert_eq!(events::promotion_trigger(crate::promotion::TriggerKind::AgentDecision), "memory.promotion.agent");
    }

    #[test]
    fn histogram_tracks_min_max_avg() {
        let telemetry = Telemetry::new();
        telemetry.record(events::PROMOTION_DURATION_US, 10.0);
        telemetry.record(events::PROMOTION_DURATION_US, 30.0);
        let stats = telemetry.histogram(events::PROMOTION_DURATION_US).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.avg, 20.0);
    }

    #[test]
    fn empty_histogram_returns_none() {
        let telemetry = Telemetry::new();
        assert!(telemetry.histogram("nonexistent").is_none());
    }

    #[test]
    fn global_instance_is_shared() {
        telemetry().incr(events::STORE_OPENED);
        let before = telemetry().counter(events::STORE_OPENED);
        telemetry().incr(events::STORE_OPENED);
        assert_eq!(telemetry().counter(events::STORE_OPENED), before + 1);
    }
}
