//! Progress aggregation for cooking sessions.
//!
//! Pure functions translating engine state into completion fractions and
//! their text renderings. Safe to call at any frequency.

use crate::types::{SessionSpec, SessionState, SessionStatus};

/// Block used for the filled part of a progress bar.
pub const FILLED_BLOCK: char = '█';

/// Block used for the empty part of a progress bar.
pub const EMPTY_BLOCK: char = '░';

/// Fraction of a single step that has been counted down, in `[0, 1]`.
///
/// A zero planned duration yields 0.
pub fn step_fraction(planned_seconds: u32, remaining_seconds: u32) -> f64 {
    if planned_seconds == 0 {
        return 0.0;
    }
    let done = f64::from(planned_seconds) - f64::from(remaining_seconds);
    (done / f64::from(planned_seconds)).clamp(0.0, 1.0)
}

/// Fraction of the whole session that has been counted down, given the
/// current step position.
///
/// Steps before `step_index` count in full. A zero duration sum yields 0.
pub fn total_fraction(spec: &SessionSpec, step_index: usize, remaining_seconds: u32) -> f64 {
    let total = spec.total_planned_seconds();
    if total == 0 {
        return 0.0;
    }

    let before = spec.planned_seconds_before(step_index) as f64;
    let current = spec
        .step(step_index)
        .map(|step| step.planned_duration_seconds)
        .unwrap_or(0);
    let in_step = step_fraction(current, remaining_seconds) * f64::from(current);

    ((before + in_step) / total as f64).clamp(0.0, 1.0)
}

/// Progress of the current step.
pub fn step_progress(state: &SessionState, spec: &SessionSpec) -> f64 {
    let planned = spec
        .step(state.current_step_index)
        .map(|step| step.planned_duration_seconds)
        .unwrap_or(0);
    step_fraction(planned, state.remaining_seconds)
}

/// Progress of the whole session.
///
/// A completed session reports 1 even when its last step was skipped.
pub fn total_progress(state: &SessionState, spec: &SessionSpec) -> f64 {
    if spec.total_planned_seconds() == 0 {
        return 0.0;
    }
    match state.status {
        SessionStatus::NotStarted => 0.0,
        SessionStatus::SessionComplete => 1.0,
        _ => total_fraction(spec, state.current_step_index, state.remaining_seconds),
    }
}

/// Renders a fixed-width bar of filled and empty blocks.
///
/// The fraction is clamped to `[0, 1]`; NaN renders as empty.
pub fn render_progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);

    let mut bar = String::with_capacity(width * FILLED_BLOCK.len_utf8());
    bar.extend(std::iter::repeat(FILLED_BLOCK).take(filled));
    bar.extend(std::iter::repeat(EMPTY_BLOCK).take(width - filled));
    bar
}

/// Formats seconds as `mm:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a fraction as a whole percentage.
pub fn format_percent(fraction: f64) -> String {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    format!("{}%", (fraction * 100.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Step;

    fn spec(durations: &[u32]) -> SessionSpec {
        SessionSpec {
            session_name: "Test".to_string(),
            steps: durations
                .iter()
                .enumerate()
                .map(|(i, d)| Step::new(i as u32 + 1, format!("Step {}", i + 1), "do it", *d))
                .collect(),
        }
    }

    fn state_at(index: usize, remaining: u32) -> SessionState {
        SessionState {
            current_step_index: index,
            remaining_seconds: remaining,
            status: SessionStatus::Active,
            ..SessionState::default()
        }
    }

    mod fraction_tests {
        use super::*;

        #[test]
        fn test_step_fraction() {
            assert_eq!(step_fraction(100, 100), 0.0);
            assert_eq!(step_fraction(100, 25), 0.75);
            assert_eq!(step_fraction(100, 0), 1.0);
        }

        #[test]
        fn test_step_fraction_clamped() {
            assert_eq!(step_fraction(10, 20), 0.0);
            assert_eq!(step_fraction(0, 0), 0.0);
        }

        #[test]
        fn test_step_progress() {
            let spec = spec(&[60, 120]);
            assert_eq!(step_progress(&state_at(1, 30), &spec), 0.75);
        }

        #[test]
        fn test_total_progress_weights_by_duration() {
            let spec = spec(&[60, 120, 20]);
            // 60 done + half of 120 = 120 of 200
            let progress = total_progress(&state_at(1, 60), &spec);
            assert!((progress - 0.6).abs() < 1e-9);
        }

        #[test]
        fn test_total_progress_not_started_is_zero() {
            let spec = spec(&[60]);
            assert_eq!(total_progress(&SessionState::default(), &spec), 0.0);
        }

        #[test]
        fn test_total_progress_zero_duration_sum() {
            let spec = spec(&[0]);
            assert_eq!(total_progress(&state_at(0, 0), &spec), 0.0);
            let mut complete = state_at(0, 0);
            complete.status = SessionStatus::SessionComplete;
            assert_eq!(total_progress(&complete, &spec), 0.0);
        }

        #[test]
        fn test_total_progress_complete_after_skip() {
            let spec = spec(&[60, 60]);
            let mut state = state_at(1, 45);
            state.status = SessionStatus::SessionComplete;
            assert_eq!(total_progress(&state, &spec), 1.0);
        }

        #[test]
        fn test_sequential_walkthrough_reaches_one() {
            let durations = [7, 13, 1, 29];
            let spec = spec(&durations);
            let mut last = 0.0;

            for (index, duration) in durations.iter().enumerate() {
                for remaining in (0..=*duration).rev() {
                    let progress = total_fraction(&spec, index, remaining);
                    assert!(progress + 1e-9 >= last, "progress went backwards");
                    last = progress;
                }
            }

            assert!((last - 1.0).abs() < 1e-9);
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_half_bar() {
            let bar = render_progress_bar(0.5, 10);
            assert_eq!(bar.chars().count(), 10);
            assert_eq!(bar.chars().filter(|c| *c == FILLED_BLOCK).count(), 5);
            assert_eq!(bar, "█████░░░░░");
        }

        #[test]
        fn test_zero_width() {
            assert_eq!(render_progress_bar(0.0, 0), "");
            assert_eq!(render_progress_bar(1.0, 0), "");
        }

        #[test]
        fn test_extremes() {
            assert_eq!(render_progress_bar(0.0, 4), "░░░░");
            assert_eq!(render_progress_bar(1.0, 4), "████");
        }

        #[test]
        fn test_out_of_range_clamped() {
            assert_eq!(render_progress_bar(-3.0, 4), "░░░░");
            assert_eq!(render_progress_bar(7.5, 4), "████");
            assert_eq!(render_progress_bar(f64::NAN, 4), "░░░░");
        }

        #[test]
        fn test_format_remaining() {
            assert_eq!(format_remaining(0), "00:00");
            assert_eq!(format_remaining(61), "01:01");
            assert_eq!(format_remaining(599), "09:59");
            assert_eq!(format_remaining(3600), "60:00");
        }

        #[test]
        fn test_format_percent() {
            assert_eq!(format_percent(0.0), "0%");
            assert_eq!(format_percent(0.456), "46%");
            assert_eq!(format_percent(2.0), "100%");
        }
    }
}
