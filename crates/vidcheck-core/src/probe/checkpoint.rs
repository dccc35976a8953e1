use serde::Deserialize;
use std::ops::Range;

pub const DEFAULT_CHECKPOINTS: u32 = 20;
pub const DEFAULT_WINDOW: u64 = 5;

/// How densely a video is sampled: `checkpoints` evenly spaced anchors, each
/// probed through a window of up to `window` consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    pub checkpoints: u32,
    pub window: u64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            checkpoints: DEFAULT_CHECKPOINTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Half-open range of frame indices attempted around one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: u64,
    pub end: u64,
}

impl FrameWindow {
    pub fn frames(&self) -> Range<u64> {
        self.start..self.end
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anchor frames at `floor(total * i / count)` for `i in 0..count`.
///
/// The sequence is non-decreasing by construction, so a single `dedup` leaves
/// it strictly ascending. Short videos collapse to fewer checkpoints.
pub fn checkpoints(total_frames: u64, count: u32) -> Vec<u64> {
    if total_frames == 0 || count == 0 {
        return Vec::new();
    }

    let mut points: Vec<u64> = (0..count as u128)
        .map(|i| (total_frames as u128 * i / count as u128) as u64)
        .collect();
    points.dedup();
    points
}

pub fn frame_window(checkpoint: u64, total_frames: u64, window: u64) -> FrameWindow {
    if checkpoint == 0 {
        FrameWindow {
            start: 0,
            end: window.min(total_frames),
        }
    } else if checkpoint + 1 == total_frames {
        FrameWindow {
            start: total_frames.saturating_sub(window),
            end: total_frames,
        }
    } else {
        let before = window / 2;
        let after = window - before;
        FrameWindow {
            start: checkpoint.saturating_sub(before),
            end: checkpoint.saturating_add(after).min(total_frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints_ascending_unique_in_range() {
        for total in 1..=600u64 {
            let points = checkpoints(total, DEFAULT_CHECKPOINTS);
            assert!(!points.is_empty(), "total={}", total);
            assert_eq!(points[0], 0);
            assert!(points.windows(2).all(|w| w[0] < w[1]), "total={}", total);
            assert!(points.iter().all(|&p| p < total), "total={}", total);
        }
    }

    #[test]
    fn test_checkpoints_large_video_has_full_count() {
        let points = checkpoints(1_000, 20);
        assert_eq!(points.len(), 20);
        assert_eq!(points[1], 50);
        assert_eq!(points[19], 950);
    }

    #[test]
    fn test_checkpoints_collapse_for_short_video() {
        assert_eq!(checkpoints(1, 20), vec![0]);
        assert_eq!(checkpoints(3, 20), vec![0, 1, 2]);
        assert_eq!(checkpoints(10, 20), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_checkpoints_no_overflow_on_huge_counts() {
        let total = u64::MAX / 2;
        let points = checkpoints(total, 20);
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|&p| p < total));
    }

    #[test]
    fn test_window_policy_for_ten_frames() {
        assert_eq!(frame_window(0, 10, 5).frames(), 0..5);
        assert_eq!(frame_window(9, 10, 5).frames(), 5..10);
        assert_eq!(frame_window(5, 10, 5).frames(), 3..8);
    }

    #[test]
    fn test_window_clamped_to_video_bounds() {
        assert_eq!(frame_window(0, 3, 5).frames(), 0..3);
        assert_eq!(frame_window(2, 3, 5).frames(), 0..3);
        assert_eq!(frame_window(1, 3, 5).frames(), 0..3);
        assert_eq!(frame_window(1, 100, 5).frames(), 0..4);
        assert_eq!(frame_window(98, 100, 5).frames(), 96..100);
    }

    #[test]
    fn test_single_frame_video() {
        let window = frame_window(0, 1, 5);
        assert_eq!(window.frames(), 0..1);
        assert_eq!(window.len(), 1);
    }
}
