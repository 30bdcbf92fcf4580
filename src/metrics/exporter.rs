use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::PresenceMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for presence cache snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_metric("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<PresenceMetricsSnapshot>
    for PrometheusTextExporter<W>
{
    fn export(&self, snapshot: &PresenceMetricsSnapshot) {
        self.write_counter("set_calls_total", snapshot.set_calls);
        self.write_counter("set_new_total", snapshot.set_new);
        self.write_counter("set_duplicate_total", snapshot.set_duplicate);
        self.write_counter("exists_calls_total", snapshot.exists_calls);
        self.write_counter("exists_hits_total", snapshot.exists_hits);
        self.write_counter("exists_misses_total", snapshot.exists_misses);
        self.write_counter("encode_errors_total", snapshot.encode_errors);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_counter("free_calls_total", snapshot.free_calls);
        self.write_counter("reallocations_total", snapshot.reallocations);
        self.write_counter("releases_confirmed_total", snapshot.releases_confirmed);
        self.write_counter(
            "releases_unsupported_total",
            snapshot.releases_unsupported,
        );
        self.write_counter("release_timeouts_total", snapshot.release_timeouts);
        self.write_gauge("len", snapshot.len as u64);
        self.write_gauge("retained_capacity", snapshot.retained_capacity as u64);
        self.write_gauge("capacity_hint", snapshot.capacity_hint as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_prefixed_prometheus_text() {
        let exporter = PrometheusTextExporter::new("presence", Vec::new());
        let snapshot = PresenceMetricsSnapshot {
            set_calls: 3,
            len: 2,
            ..Default::default()
        };
        exporter.export(&snapshot);

        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("# TYPE presence_set_calls_total counter\npresence_set_calls_total 3\n"));
        assert!(text.contains("# TYPE presence_len gauge\npresence_len 2\n"));
        assert!(text.contains("presence_release_timeouts_total 0"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&PresenceMetricsSnapshot::default());
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.starts_with("# TYPE set_calls_total counter\n"));
    }
}
