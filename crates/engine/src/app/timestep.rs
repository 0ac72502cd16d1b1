use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    /// Catch-up tick cap per frame. `None` derives it from `max_frame_delta`
    /// and the tick length so a clamped frame is always fully consumed.
    pub max_ticks_per_frame: Option<u32>,
    /// Frame deltas this close to a whole number of ticks are snapped onto
    /// it. Zero disables snapping.
    pub snap_tolerance: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: None,
            snap_tolerance: Duration::from_micros(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimestepError {
    #[error("target tick rate must be positive")]
    ZeroTickRate,
    #[error("fixed tick length must be positive and finite, got {seconds}s")]
    InvalidFixedDt { seconds: f64 },
}

/// What one call to [`FixedTimestep::advance`] decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub ticks_run: u32,
    /// Unconsumed time carried into the next frame.
    pub remaining: Duration,
    pub dropped_backlog: Duration,
}

/// Accumulator that turns variable frame deltas into whole fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    snap_tolerance: Duration,
    accumulator: Duration,
    total_ticks: u64,
}

impl FixedTimestep {
    pub fn new(config: &LoopConfig) -> Result<Self, TimestepError> {
        if config.target_tps == 0 {
            return Err(TimestepError::ZeroTickRate);
        }
        let fixed_dt = Duration::from_secs_f64(1.0 / f64::from(config.target_tps));
        Ok(Self::build(fixed_dt, config))
    }

    /// Uses an explicit tick length instead of `config.target_tps`.
    pub fn with_fixed_dt_secs(seconds: f64, config: &LoopConfig) -> Result<Self, TimestepError> {
        let fixed_dt = Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|dt| !dt.is_zero())
            .ok_or(TimestepError::InvalidFixedDt { seconds })?;
        Ok(Self::build(fixed_dt, config))
    }

    fn build(fixed_dt: Duration, config: &LoopConfig) -> Self {
        let max_frame_delta =
            normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
        let max_ticks_per_frame = config
            .max_ticks_per_frame
            .unwrap_or_else(|| ticks_to_cover(max_frame_delta, fixed_dt));
        Self {
            fixed_dt,
            max_frame_delta,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            snap_tolerance: config.snap_tolerance,
            accumulator: Duration::ZERO,
            total_ticks: 0,
        }
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn fixed_dt_seconds(&self) -> f32 {
        self.fixed_dt.as_secs_f32()
    }

    pub fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Accumulates `frame_dt` and reports how many ticks are now due.
    /// The caller must run exactly `ticks_run` ticks.
    pub fn advance(&mut self, frame_dt: Duration) -> StepReport {
        let clamped_frame_dt = clamp_frame_delta(frame_dt, self.max_frame_delta);
        if clamped_frame_dt < frame_dt {
            debug!(
                frame_dt_ms = frame_dt.as_millis() as u64,
                max_frame_delta_ms = self.max_frame_delta.as_millis() as u64,
                "frame_delta_clamped"
            );
        }
        let frame_dt = snap_to_ticks(clamped_frame_dt, self.fixed_dt, self.snap_tolerance);
        self.accumulator = self.accumulator.saturating_add(frame_dt);

        let step_plan = plan_sim_steps(self.accumulator, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = step_plan.remaining_accumulator;
        self.total_ticks = self
            .total_ticks
            .saturating_add(u64::from(step_plan.ticks_to_run));

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = self.max_ticks_per_frame,
                "sim_clamp_triggered"
            );
        }

        StepReport {
            ticks_run: step_plan.ticks_to_run,
            remaining: step_plan.remaining_accumulator,
            dropped_backlog: step_plan.dropped_backlog,
        }
    }

    /// Same as [`advance`](Self::advance) for a delta in seconds. Negative
    /// and non-finite deltas count as zero.
    pub fn advance_secs(&mut self, frame_dt_seconds: f64) -> StepReport {
        let frame_dt = Duration::try_from_secs_f64(frame_dt_seconds).unwrap_or(Duration::ZERO);
        self.advance(frame_dt)
    }

    /// Advances and invokes `tick` once per due tick with the fixed step in
    /// seconds.
    pub fn run<F>(&mut self, frame_dt: Duration, mut tick: F) -> StepReport
    where
        F: FnMut(f32),
    {
        let report = self.advance(frame_dt);
        let dt_seconds = self.fixed_dt_seconds();
        for _ in 0..report.ticks_run {
            tick(dt_seconds);
        }
        report
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

/// Ticks needed to drain `span` plus a carried remainder under one tick.
fn ticks_to_cover(span: Duration, fixed_dt: Duration) -> u32 {
    let whole = span.as_nanos() / fixed_dt.as_nanos().max(1);
    u32::try_from(whole).unwrap_or(u32::MAX).saturating_add(1)
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn snap_to_ticks(frame_dt: Duration, fixed_dt: Duration, tolerance: Duration) -> Duration {
    if tolerance.is_zero() || frame_dt.is_zero() {
        return frame_dt;
    }
    let whole_ticks = (frame_dt.as_secs_f64() / fixed_dt.as_secs_f64()).round();
    if !(1.0..=f64::from(u32::MAX)).contains(&whole_ticks) {
        return frame_dt;
    }
    let Some(snapped) = fixed_dt.checked_mul(whole_ticks as u32) else {
        return frame_dt;
    };
    let distance = if frame_dt > snapped {
        frame_dt - snapped
    } else {
        snapped - frame_dt
    };
    if distance <= tolerance {
        snapped
    } else {
        frame_dt
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
