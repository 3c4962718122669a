// Context columns joined onto the comparison table: latest price and the
// average strength of opponents faced this period.

use std::collections::HashMap;

use crate::compare::ComparisonRow;
use crate::events::{EventRecord, PriceSnapshot, TeamStrengths};

/// Published prices are in tenths of a million.
pub const PRICE_DIVISOR: f64 = 10.0;

/// Price in millions for every player listed in the most recent gameweek of
/// the snapshot table. Players missing from that gameweek get no entry; if a
/// player is listed twice in it, the last listing wins.
pub fn latest_prices(snapshots: &[PriceSnapshot]) -> HashMap<String, f64> {
    let Some(latest) = snapshots.iter().map(|s| s.gameweek).max() else {
        return HashMap::new();
    };
    snapshots
        .iter()
        .filter(|s| s.gameweek == latest)
        .map(|s| (s.name.clone(), s.value / PRICE_DIVISOR))
        .collect()
}

/// Mean opponent strength over each player's appearances. Fixtures against a
/// team missing from `strengths` are skipped.
pub fn average_opponent_strength(
    events: &[EventRecord],
    strengths: &TeamStrengths,
) -> HashMap<String, f64> {
    let mut totals: HashMap<&str, (f64, u32)> = HashMap::new();
    for e in events.iter().filter(|e| e.is_appearance()) {
        let Some(strength) = e.opponent_team.and_then(|id| strengths.get(&id)) else {
            continue;
        };
        let entry = totals.entry(e.name.as_str()).or_insert((0.0, 0));
        entry.0 += strength;
        entry.1 += 1;
    }
    totals
        .into_iter()
        .map(|(name, (sum, n))| (name.to_string(), sum / f64::from(n)))
        .collect()
}

/// Left-join context onto the rows. Missing context stays `None`.
pub fn enrich(
    rows: &mut [ComparisonRow],
    prices: &HashMap<String, f64>,
    opponent_strength: &HashMap<String, f64>,
) {
    for row in rows {
        row.current_price = prices.get(&row.name).copied();
        row.avg_opponent_strength = opponent_strength.get(&row.name).copied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(name: &str, gw: u32, value: f64) -> PriceSnapshot {
        PriceSnapshot {
            name: name.into(),
            gameweek: gw,
            value,
        }
    }

    fn fixture(name: &str, minutes: u32, opponent: Option<u32>) -> EventRecord {
        EventRecord {
            name: name.into(),
            minutes,
            opponent_team: opponent,
            ..Default::default()
        }
    }

    #[test]
    fn prices_come_from_latest_gameweek() {
        let snaps = vec![
            snap("A", 1, 50.0),
            snap("A", 2, 52.0),
            snap("B", 1, 75.0),
            snap("C", 2, 130.0),
        ];
        let prices = latest_prices(&snaps);
        assert_eq!(prices.len(), 2);
        assert!((prices["A"] - 5.2).abs() < 1e-12);
        assert!((prices["C"] - 13.0).abs() < 1e-12);
        assert!(!prices.contains_key("B"));
    }

    #[test]
    fn no_snapshots_no_prices() {
        assert!(latest_prices(&[]).is_empty());
    }

    #[test]
    fn opponent_strength_averages_mapped_appearances() {
        let strengths: TeamStrengths = [(1, 5.0), (2, 3.0)].into_iter().collect();
        let events = vec![
            fixture("A", 90, Some(1)),
            fixture("A", 90, Some(2)),
            fixture("A", 0, Some(1)),
            fixture("A", 90, Some(99)),
            fixture("B", 90, None),
        ];
        let avg = average_opponent_strength(&events, &strengths);
        assert!((avg["A"] - 4.0).abs() < 1e-12);
        assert!(!avg.contains_key("B"));
    }
}
