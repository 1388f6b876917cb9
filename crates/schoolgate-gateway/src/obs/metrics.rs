//! Counter and histogram vectors with dynamic labels.
//!
//! Labels are flattened into sorted key vectors for deterministic ordering.
//! Histogram buckets are fixed in microseconds to avoid floating point math.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let _ = writeln!(
                out,
                "{name}{{{}}} {}",
                render_labels(r.key()),
                r.value().load(Ordering::Relaxed)
            );
        }
    }
}

// 100us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s
const BUCKETS_MICROS: [u64; 9] = [
    100, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let micros = duration.as_micros() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);
        for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let labels = render_labels(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{labels},")
            };
            let hist = r.value();
            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let n = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {n}");
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let _ = writeln!(out, "{name}_sum{{{labels}}} {}", hist.sum.load(Ordering::Relaxed));
            let _ = writeln!(out, "{name}_count{{{labels}}} {count}");
        }
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    /// Authorization outcomes by `decision`.
    pub gateway_decisions: CounterVec,
    /// Data fetch time by `dataset` (microseconds).
    pub query_duration: HistogramVec,
    /// Summary responses composed from the raw event table.
    pub query_fallbacks: CounterVec,
    /// Upstream and shape failures by `dataset` and `kind`.
    pub query_errors: CounterVec,
    draining: AtomicBool,
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all metrics plus caller-provided gauges.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.gateway_decisions
            .render("schoolgate_gateway_decisions_total", &mut out);
        self.query_duration
            .render("schoolgate_query_duration_micros", &mut out);
        self.query_fallbacks
            .render("schoolgate_query_fallbacks_total", &mut out);
        self.query_errors
            .render("schoolgate_query_errors_total", &mut out);

        let _ = writeln!(
            out,
            "# TYPE schoolgate_draining gauge\nschoolgate_draining {}",
            u8::from(self.is_draining())
        );
        for (k, v) in extra {
            let _ = writeln!(out, "# TYPE {k} gauge\n{k} {v}");
        }
        out
    }
}
