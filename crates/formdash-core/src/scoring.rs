// Points remapping: converts raw per-appearance counters into
// position-specific fantasy points, one value per scoring category.

use crate::events::EventRecord;
use crate::position::Position;

/// Fantasy points earned in each scoring category for a single event row.
/// Bonus points are never part of a breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointsBreakdown {
    pub minutes: f64,
    pub goals_scored: f64,
    pub assists: f64,
    pub clean_sheets: f64,
    pub saves: f64,
    pub penalties_saved: f64,
    pub penalties_missed: f64,
    pub goals_conceded: f64,
    pub yellow_cards: f64,
    pub red_cards: f64,
    pub own_goals: f64,
}

impl PointsBreakdown {
    /// The single per-row score the ranker and comparator work with.
    pub fn total(&self) -> f64 {
        self.minutes
            + self.goals_scored
            + self.assists
            + self.clean_sheets
            + self.saves
            + self.penalties_saved
            + self.penalties_missed
            + self.goals_conceded
            + self.yellow_cards
            + self.red_cards
            + self.own_goals
    }
}

/// Applies a scoring formula to historical rows so that seasons played under
/// different rules land on a common scale.
pub trait PointsRemapper {
    fn remap(&self, position: Position, event: &EventRecord) -> PointsBreakdown;

    fn score(&self, position: Position, event: &EventRecord) -> f64 {
        self.remap(position, event).total()
    }
}

// ---------------------------------------------------------------------------
// Current-season fantasy rules
// ---------------------------------------------------------------------------

/// Standard fantasy scoring rules (bonus excluded).
#[derive(Debug, Clone, Copy, Default)]
pub struct FplScoring;

impl FplScoring {
    fn goal_points(position: Position) -> f64 {
        match position {
            Position::Goalkeeper | Position::Defender => 6.0,
            Position::Midfielder => 5.0,
            Position::Forward => 4.0,
        }
    }

    fn clean_sheet_points(position: Position) -> f64 {
        match position {
            Position::Goalkeeper | Position::Defender => 4.0,
            Position::Midfielder => 1.0,
            Position::Forward => 0.0,
        }
    }
}

impl PointsRemapper for FplScoring {
    fn remap(&self, position: Position, e: &EventRecord) -> PointsBreakdown {
        let minutes = match e.minutes {
            0 => 0.0,
            1..=59 => 1.0,
            _ => 2.0,
        };
        let saves = if position == Position::Goalkeeper {
            f64::from(e.saves / 3)
        } else {
            0.0
        };
        let goals_conceded = if position.is_defensive() {
            -f64::from(e.goals_conceded / 2)
        } else {
            0.0
        };

        PointsBreakdown {
            minutes,
            goals_scored: f64::from(e.goals_scored) * Self::goal_points(position),
            assists: f64::from(e.assists) * 3.0,
            clean_sheets: f64::from(e.clean_sheets) * Self::clean_sheet_points(position),
            saves,
            penalties_saved: f64::from(e.penalties_saved) * 5.0,
            penalties_missed: f64::from(e.penalties_missed) * -2.0,
            goals_conceded,
            yellow_cards: -f64::from(e.yellow_cards),
            red_cards: f64::from(e.red_cards) * -3.0,
            own_goals: f64::from(e.own_goals) * -2.0,
        }
    }
}
