use chrono::{DateTime, Duration, Utc};
use skyops_shared::Flight;

/// Closed interval overlap: `[a_start, a_end]` and `[b_start, b_end]` share
/// at least one instant. Touching endpoints count as overlapping.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// The `[departure, arrival]` window a flight occupies its resources for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

impl From<&Flight> for TimeWindow {
    fn from(flight: &Flight) -> Self {
        TimeWindow::new(flight.departure_time, flight.arrival_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn window(from: (u32, u32), to: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(from.0, from.1), at(to.0, to.1))
    }

    #[test]
    fn test_partial_overlap() {
        assert!(window((8, 0), (10, 0)).overlaps(&window((9, 0), (11, 0))));
        assert!(window((9, 0), (11, 0)).overlaps(&window((8, 0), (10, 0))));
    }

    #[test]
    fn test_containment() {
        let outer = window((8, 0), (12, 0));
        let inner = window((9, 0), (10, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_shared_boundary_instant_conflicts() {
        // Back-to-back turnaround at 10:00 counts as a conflict.
        assert!(window((8, 0), (10, 0)).overlaps(&window((10, 0), (12, 0))));
        assert!(overlaps(at(10, 0), at(12, 0), at(8, 0), at(10, 0)));
    }

    #[test]
    fn test_disjoint_windows() {
        assert!(!window((8, 0), (10, 0)).overlaps(&window((10, 1), (12, 0))));
        assert!(!window((13, 0), (14, 0)).overlaps(&window((8, 0), (10, 0))));
    }

    #[test]
    fn test_duration() {
        assert_eq!(window((8, 0), (8, 30)).duration(), Duration::minutes(30));
    }
}
