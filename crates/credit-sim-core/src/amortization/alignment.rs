//! Placement of independently dated schedules on a common period axis.
//!
//! Axis index 0 is the reference month. Row `i` (1-based) of a loan starting
//! at offset `o` lands on index `o + i - 1`. Rows that fall before the
//! reference month are elapsed and dropped; the axis ends with the last
//! loan to finish.

use serde::{Deserialize, Serialize};

use super::rounding::Round;
use super::schedule::{Schedule, ScheduleRow};

/// A schedule together with the offset of its first period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub offset: i32,
    pub rows: Schedule,
}

impl DatedSchedule {
    /// Row of this schedule on axis index `index`, which may be negative.
    pub fn row_on_axis(&self, index: i64) -> Option<&ScheduleRow> {
        let position = index - i64::from(self.offset);
        if position < 0 {
            return None;
        }
        self.rows.get(position as usize)
    }

    /// One past the last axis index covered by this schedule.
    pub fn end(&self) -> i64 {
        i64::from(self.offset) + self.rows.len() as i64
    }
}

/// A schedule repositioned on the common axis: one slot per axis period,
/// `None` where the loan has not started or has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub offset: i32,
    pub slots: Vec<Option<ScheduleRow>>,
}

impl AlignedSchedule {
    pub fn row_at(&self, index: usize) -> Option<&ScheduleRow> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of rows still inside the window.
    pub fn active_periods(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Round for AlignedSchedule {
    fn rounded(&self, dp: u32) -> Self {
        AlignedSchedule {
            label: self.label.clone(),
            offset: self.offset,
            slots: self.slots.rounded(dp),
        }
    }
}

/// Length of the common axis: the latest end among `schedules`, never
/// negative.
pub fn axis_length(schedules: &[DatedSchedule]) -> usize {
    schedules
        .iter()
        .map(DatedSchedule::end)
        .max()
        .unwrap_or(0)
        .max(0) as usize
}

/// Align every schedule on a shared axis of [`axis_length`] periods.
pub fn align_schedules(schedules: &[DatedSchedule]) -> Vec<AlignedSchedule> {
    let length = axis_length(schedules);
    schedules
        .iter()
        .map(|dated| {
            let slots: Vec<Option<ScheduleRow>> = (0..length)
                .map(|index| dated.row_on_axis(index as i64).cloned())
                .collect();
            log::trace!(
                "aligned {} at offset {}: {} of {} rows inside window",
                dated.label.as_deref().unwrap_or("loan"),
                dated.offset,
                slots.iter().filter(|s| s.is_some()).count(),
                dated.rows.len()
            );
            AlignedSchedule {
                label: dated.label.clone(),
                offset: dated.offset,
                slots,
            }
        })
        .collect()
}
