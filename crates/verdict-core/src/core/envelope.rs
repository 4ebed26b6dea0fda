// crates/verdict-core/src/core/envelope.rs
// ============================================================================
// Module: Verdict Step Envelope
// Description: Canonical success/error/metadata wrapper around step results.
// Purpose: Give every executor backend one output shape with stable fields.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every step with `save_as` produces exactly one envelope: a success flag,
//! a payload, error fields populated only on failure, a metadata block with
//! at minimum an elapsed-duration measurement, and captured output streams.
//! For `call_n` the payload aggregates N invocations into [`CallStats`]:
//! durations of successful calls only, with percentile fields omitted below
//! the sample counts needed to compute them meaningfully.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Step Envelope
// ============================================================================

/// Canonical output of one step.
///
/// # Invariants
/// - `error_code` and `message` are populated only when `ok` is false.
/// - `meta` always carries `duration_ms` once the orchestrator records it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepEnvelope {
    /// Whether the step succeeded.
    pub ok: bool,
    /// Step payload; `null` for steps without a meaningful value.
    #[serde(default)]
    pub value: Value,
    /// Stable machine-readable failure code.
    #[serde(default)]
    pub error_code: Option<String>,
    /// Human-readable failure description.
    #[serde(default)]
    pub message: Option<String>,
    /// Metadata block; at minimum an elapsed-duration measurement.
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Captured standard output.
    #[serde(default)]
    pub stdout: String,
    /// Captured standard error.
    #[serde(default)]
    pub stderr: String,
    /// Artifact descriptors produced by the step.
    #[serde(default)]
    pub artifacts: Vec<Value>,
}

impl StepEnvelope {
    /// Creates a successful envelope with a payload.
    #[must_use]
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value,
            ..Self::default()
        }
    }

    /// Creates a failed envelope with a stable code and description.
    #[must_use]
    pub fn failure(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(error_code.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Creates the stub envelope returned by unimplemented backends.
    #[must_use]
    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::failure("not_implemented", detail)
    }

    /// Records the elapsed duration unless the backend already set one.
    pub fn record_duration_ms(&mut self, duration_ms: u64) {
        self.meta
            .entry("duration_ms".to_string())
            .or_insert_with(|| Value::from(duration_ms));
    }

    /// Renders the envelope as the JSON object stored in the context.
    ///
    /// The rendered form adds `stdout_int`: the standard output parsed as an
    /// integer when it is one, for convenient numeric assertions.
    #[must_use]
    pub fn to_context_value(&self) -> Value {
        let stdout_int = self
            .stdout
            .trim()
            .parse::<i64>()
            .map_or(Value::Null, Value::from);
        serde_json::json!({
            "ok": self.ok,
            "value": self.value,
            "error_code": self.error_code,
            "message": self.message,
            "meta": self.meta,
            "stdout": self.stdout,
            "stdout_int": stdout_int,
            "stderr": self.stderr,
            "artifacts": self.artifacts,
        })
    }
}

// ============================================================================
// SECTION: Call Statistics
// ============================================================================

/// Minimum sample count before `p95_ms` is reported.
pub const P95_MIN_SAMPLES: usize = 20;

/// Minimum sample count before `p99_ms` is reported.
pub const P99_MIN_SAMPLES: usize = 100;

/// Aggregated timing statistics for a `call_n` step.
///
/// # Invariants
/// - `durations_ms` holds successful calls only, in invocation order.
/// - Percentile fields are omitted below their minimum sample counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallStats {
    /// Requested iteration count.
    pub n: u32,
    /// Per-call durations for successful calls, in invocation order.
    pub durations_ms: Vec<f64>,
    /// Minimum successful-call duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ms: Option<f64>,
    /// Maximum successful-call duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ms: Option<f64>,
    /// Mean successful-call duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_ms: Option<f64>,
    /// Median duration; present whenever any call succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50_ms: Option<f64>,
    /// 95th percentile; requires at least [`P95_MIN_SAMPLES`] samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_ms: Option<f64>,
    /// 99th percentile; requires at least [`P99_MIN_SAMPLES`] samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99_ms: Option<f64>,
}

impl CallStats {
    /// Computes statistics over the successful-call durations.
    #[must_use]
    pub fn from_durations(n: u32, durations_ms: Vec<f64>) -> Self {
        if durations_ms.is_empty() {
            return Self {
                n,
                durations_ms,
                min_ms: None,
                max_ms: None,
                mean_ms: None,
                p50_ms: None,
                p95_ms: None,
                p99_ms: None,
            };
        }
        let mut sorted = durations_ms.clone();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        #[allow(
            clippy::cast_precision_loss,
            reason = "Sample counts are far below the f64 mantissa limit."
        )]
        let mean = sum / count as f64;
        let percentile = |fraction: f64| -> f64 {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "Index arithmetic over small, non-negative sample counts."
            )]
            let index = ((count as f64 * fraction) as usize).min(count - 1);
            sorted[index]
        };
        Self {
            n,
            durations_ms,
            min_ms: sorted.first().copied(),
            max_ms: sorted.last().copied(),
            mean_ms: Some(mean),
            p50_ms: Some(sorted[count / 2]),
            p95_ms: (count >= P95_MIN_SAMPLES).then(|| percentile(0.95)),
            p99_ms: (count >= P99_MIN_SAMPLES).then(|| percentile(0.99)),
        }
    }

    /// Renders the statistics as a JSON payload for the envelope.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
