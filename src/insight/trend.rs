use crate::telemetry::AlertSeverity;
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

const CYCLE: [AlertSeverity; 3] = [AlertSeverity::Low, AlertSeverity::Medium, AlertSeverity::High];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u32,
    pub severity: AlertSeverity,
}

/// Build a `days`-long series ending at `today`, oldest first.
///
/// Offset `i` counts back from today; its severity is `CYCLE[i % 3]`.
pub(crate) fn anomaly_trend<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate, days: usize) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = (0..days)
        .map(|i| TrendPoint {
            date: today
                .checked_sub_days(Days::new(i as u64))
                .unwrap_or(NaiveDate::MIN),
            count: rng.gen_range(1..=20),
            severity: CYCLE[i % CYCLE.len()],
        })
        .collect();
    points.reverse();
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_oldest_first() {
        let today = day(2024, 3, 2);
        let points = anomaly_trend(&mut StdRng::seed_from_u64(1), today, 7);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, day(2024, 2, 25));
        assert_eq!(points[6].date, today);
        for pair in points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_severity_cycles_from_today() {
        let points = anomaly_trend(&mut StdRng::seed_from_u64(1), day(2024, 1, 10), 4);
        let sev: Vec<_> = points.iter().map(|p| p.severity).collect();
        // offsets 3, 2, 1, 0 after reversal
        assert_eq!(
            sev,
            [AlertSeverity::Low, AlertSeverity::High, AlertSeverity::Medium, AlertSeverity::Low]
        );
    }

    #[test]
    fn test_counts_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            for p in anomaly_trend(&mut rng, day(2024, 6, 1), 30) {
                assert!((1..=20).contains(&p.count));
            }
        }
    }

    #[test]
    fn test_zero_days() {
        assert!(anomaly_trend(&mut StdRng::seed_from_u64(1), day(2024, 1, 1), 0).is_empty());
    }

    #[test]
    fn test_wire_date_format() {
        let points = anomaly_trend(&mut StdRng::seed_from_u64(1), day(2024, 1, 1), 1);
        let v = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(v["date"], "2024-01-01");
        assert_eq!(v["severity"], "low");
    }
}
