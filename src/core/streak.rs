use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::record::DailyRecord;
use crate::core::config::Price;

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub streak_days: u32,
    pub money_saved: Price
}

/// Counts consecutive smoke-free days, walking backward from `today`.
///
/// The walk stops at the first day that has no record or whose record
/// is not a success, so a day without a record breaks the streak just
/// like a day on which the user smoked.
pub fn streak_length(records: &HashMap<NaiveDate, DailyRecord>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut cursor = Some(today);

    while let Some(day) = cursor {
        match records.get(&day) {
            Some(record) if record.success => {
                count += 1;
                cursor = day.pred_opt();
            },
            _ => break
        }
    }
    return count;
}

pub fn money_saved(streak_days: u32, price: Price) -> Price {
    return streak_days as Price * price;
}

/// Streak and savings over a snapshot of records, in any order.
pub fn summarize<'a, I>(records: I, today: NaiveDate, price: Price) -> StreakSummary
where
    I: IntoIterator<Item = &'a (NaiveDate, DailyRecord)>
{
    let by_date: HashMap<NaiveDate, DailyRecord> = records.into_iter()
        .map(|(date, record)| (*date, *record))
        .collect();

    let streak_days = streak_length(&by_date, today);
    StreakSummary { streak_days, money_saved: money_saved(streak_days, price) }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordEntries;
    use rstest::{fixture, rstest};

    fn day(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    #[fixture]
    fn january() -> RecordEntries {
        vec![
            (day("2024-01-03"), DailyRecord::smoked()),
            (day("2024-01-02"), DailyRecord::abstained()),
            (day("2024-01-01"), DailyRecord::abstained()),
        ]
    }

    #[rstest]
    fn run_ending_today(january: RecordEntries) {
        let summary = summarize(&january, day("2024-01-02"), 600.0);
        assert_eq!(summary, StreakSummary { streak_days: 2, money_saved: 1200.0 });
    }

    #[rstest]
    fn smoked_today_resets(january: RecordEntries) {
        let summary = summarize(&january, day("2024-01-03"), 600.0);
        assert_eq!(summary, StreakSummary { streak_days: 0, money_saved: 0.0 });
    }

    #[rstest]
    fn missing_today_yields_zero(january: RecordEntries) {
        let summary = summarize(&january, day("2024-01-04"), 600.0);
        assert_eq!(summary.streak_days, 0);
    }

    #[rstest]
    fn no_records() {
        let summary = summarize(&RecordEntries::new(), day("2024-06-15"), 600.0);
        assert_eq!(summary, StreakSummary { streak_days: 0, money_saved: 0.0 });
    }

    #[rstest]
    fn free_cigarettes(january: RecordEntries) {
        let summary = summarize(&january, day("2024-01-02"), 0.0);
        assert_eq!(summary.streak_days, 2);
        assert_eq!(summary.money_saved, 0.0);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(40)]
    fn gap_terminates_run(#[case] length: u32) {
        let today = day("2024-03-10");
        let mut records: RecordEntries = (0..length)
            .map(|offset| (today - chrono::Duration::days(offset as i64), DailyRecord::abstained()))
            .collect();
        // an older run on the far side of the gap must not count
        let gap = today - chrono::Duration::days(length as i64);
        records.push((gap - chrono::Duration::days(1), DailyRecord::abstained()));
        records.push((gap - chrono::Duration::days(2), DailyRecord::abstained()));

        let summary = summarize(&records, today, 550.0);
        assert_eq!(summary.streak_days, length);
        assert_eq!(summary.money_saved, length as Price * 550.0);
    }

    #[test]
    fn stops_at_earliest_date() {
        let mut by_date = HashMap::new();
        by_date.insert(NaiveDate::MIN, DailyRecord::abstained());
        assert_eq!(streak_length(&by_date, NaiveDate::MIN), 1);
    }
}
