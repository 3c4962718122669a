// Per-gameweek event records and the auxiliary reference tables joined onto
// the dashboard.

use std::collections::{BTreeSet, HashMap};

use crate::position::Position;

/// One player's raw statistics for a single scoring period (gameweek).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub name: String,
    /// Normalised position label; `None` when the source row had none or an
    /// unrecognised one.
    pub position: Option<Position>,
    /// Season label (e.g. "2022-23") for historical rows; `None` for the
    /// current season's gameweek table.
    pub season: Option<String>,
    pub gameweek: u32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub saves: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    pub goals_conceded: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub own_goals: u32,
    pub total_points: i32,
    pub bonus: i32,
    pub opponent_team: Option<u32>,
    /// Price in tenths of a million, as published.
    pub value: Option<f64>,
}

impl EventRecord {
    /// Only rows where the player actually took the pitch count as appearances.
    pub fn is_appearance(&self) -> bool {
        self.minutes > 0
    }

    /// Recorded points with the discretionary bonus removed.
    pub fn points_minus_bonus(&self) -> f64 {
        f64::from(self.total_points - self.bonus)
    }
}

/// A player's published price in one gameweek.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub name: String,
    pub gameweek: u32,
    pub value: f64,
}

/// Extract the price snapshot table from current-season rows. Every row is
/// used, appearance or not, since prices are published for benched players too.
pub fn price_snapshots(events: &[EventRecord]) -> Vec<PriceSnapshot> {
    events
        .iter()
        .filter_map(|e| {
            e.value.map(|value| PriceSnapshot {
                name: e.name.clone(),
                gameweek: e.gameweek,
                value,
            })
        })
        .collect()
}

/// Mapping from team id to a scalar strength rating.
pub type TeamStrengths = HashMap<u32, f64>;

/// Players who made at least one appearance at `position` in the given rows.
pub fn roster_for(events: &[EventRecord], position: Position) -> BTreeSet<String> {
    events
        .iter()
        .filter(|e| e.is_appearance() && e.position == Some(position))
        .map(|e| e.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, position: Position, gw: u32, minutes: u32) -> EventRecord {
        EventRecord {
            name: name.into(),
            position: Some(position),
            gameweek: gw,
            minutes,
            total_points: 7,
            bonus: 2,
            value: Some(55.0),
            ..Default::default()
        }
    }

    #[test]
    fn points_minus_bonus_subtracts() {
        let e = row("A", Position::Defender, 1, 90);
        assert_eq!(e.points_minus_bonus(), 5.0);
    }

    #[test]
    fn roster_requires_appearance_at_position() {
        let events = vec![
            row("Benched", Position::Defender, 1, 0),
            row("Starter", Position::Defender, 1, 90),
            row("Mid", Position::Midfielder, 1, 90),
            row("Starter", Position::Defender, 2, 45),
        ];
        let roster = roster_for(&events, Position::Defender);
        assert_eq!(roster.len(), 1);
        assert!(roster.contains("Starter"));
    }

    #[test]
    fn price_snapshots_include_non_appearances() {
        let mut unpriced = row("C", Position::Forward, 3, 90);
        unpriced.value = None;
        let events = vec![
            row("A", Position::Defender, 1, 0),
            row("B", Position::Defender, 2, 90),
            unpriced,
        ];
        let snaps = price_snapshots(&events);
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].name, "A");
        assert_eq!(snaps[1].gameweek, 2);
    }
}
