//! The fixed query catalog: stable series names mapped to PromQL templates.
//!
//! The catalog is process-wide constant data. New series are added by
//! extending [`queries`], never by runtime input — the renderer and the tests
//! key off these names.

/// The label values selecting one distributor namespace/operation.
///
/// Immutable once constructed for a run.
#[derive(Debug, Clone)]
pub struct LabelSet {
    pub namespace: String,
    pub namespace_type: String,
    pub operation: String,
}

impl LabelSet {
    pub fn new(
        namespace: impl Into<String>,
        namespace_type: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            namespace_type: namespace_type.into(),
            operation: operation.into(),
        }
    }

    /// Render the PromQL selector fragment, label order fixed.
    pub fn selector(&self) -> String {
        format!(
            "namespace=\"{}\",namespace_type=\"{}\",operation=\"{}\"",
            self.namespace, self.namespace_type, self.operation
        )
    }
}

/// Build the full catalog for one run: `(series_name, promql)` in stable
/// order. `window` is the range-selector duration (e.g. `1m`).
pub fn queries(labels: &LabelSet, window: &str) -> Vec<(&'static str, String)> {
    let l = labels.selector();
    vec![
        (
            "smoothed_max_over_mean",
            format!("shard_distributor_assignment_smoothed_load_max_over_mean{{{l}}}"),
        ),
        (
            "reported_max_over_mean",
            format!("shard_distributor_assignment_load_max_over_mean{{{l}}}"),
        ),
        (
            "smoothed_cv",
            format!("shard_distributor_assignment_smoothed_load_cv{{{l}}}"),
        ),
        (
            "reported_cv",
            format!("shard_distributor_assignment_load_cv{{{l}}}"),
        ),
        (
            "moves_per_window",
            format!("increase(shard_distributor_load_balance_moves{{{l}}}[{window}])"),
        ),
        (
            "cycles_per_window",
            format!("increase(shard_distributor_load_balance_cycles{{{l}}}[{window}])"),
        ),
        (
            "avg_moves_per_cycle",
            format!(
                "increase(shard_distributor_load_balance_moves{{{l}}}[{window}]) \
                 / clamp_min(increase(shard_distributor_load_balance_cycles{{{l}}}[{window}]), 1)"
            ),
        ),
        (
            "sources_any",
            format!(
                "max_over_time(shard_distributor_load_balance_source_executors_initial{{{l}}}[{window}])"
            ),
        ),
        (
            "destinations_any",
            format!(
                "max_over_time(shard_distributor_load_balance_destination_executors_initial{{{l}}}[{window}])"
            ),
        ),
        (
            "stop_no_sources",
            format!(
                "increase(shard_distributor_load_balance_stop_reason{{{l},reason=\"no_sources\"}}[{window}])"
            ),
        ),
        (
            "stop_no_eligible_shard",
            format!(
                "increase(shard_distributor_load_balance_stop_reason{{{l},reason=\"no_eligible_shard\"}}[{window}])"
            ),
        ),
        (
            "stop_no_destinations",
            format!(
                "increase(shard_distributor_load_balance_stop_reason{{{l},reason=\"no_destinations_not_severe\"}}[{window}])"
            ),
        ),
        (
            "missing_ratio",
            format!("shard_distributor_assignment_smoothed_load_missing_ratio{{{l}}}"),
        ),
        (
            "stale_ratio",
            format!("shard_distributor_assignment_smoothed_load_stale_ratio{{{l}}}"),
        ),
        (
            "active_shards",
            format!("shard_distributor_active_shards{{{l}}}"),
        ),
        (
            "active_executors",
            format!("shard_distributor_active_executors{{{l}}}"),
        ),
    ]
}
