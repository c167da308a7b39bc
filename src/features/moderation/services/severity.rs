use crate::core::config::ModerationConfig;
use crate::features::moderation::models::{
    ModerationScore, Priority, ReportType, ReportTypeBreakdown, TargetKind,
};

/// Severity weight for one report type.
///
/// Total over the enum, strictly positive, ordered by how harmful the
/// reported behavior is: harassment > copyright > inappropriate >
/// fake = misleading > spam = other.
pub fn severity_weight(report_type: ReportType) -> u32 {
    match report_type {
        ReportType::Harassment => 5,
        ReportType::Copyright => 4,
        ReportType::Inappropriate => 3,
        ReportType::Fake => 2,
        ReportType::Misleading => 2,
        ReportType::Spam => 1,
        ReportType::Other => 1,
    }
}

/// Turns a per-type breakdown of pending reports into a weighted score,
/// threshold comparison and display priority.
///
/// Thresholds come from configuration: unpublishing a recipe is reversible
/// and cheap, so recipes cross at a lower score than accounts.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    user_threshold: f64,
    recipe_threshold: f64,
    mass_report_floor: i64,
}

impl ScoreCalculator {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            user_threshold: config.user_score_threshold,
            recipe_threshold: config.recipe_score_threshold,
            mass_report_floor: config.mass_report_floor,
        }
    }

    /// Sum over count x weight for every type present; empty breakdown is 0
    pub fn weighted_score(&self, breakdown: &ReportTypeBreakdown) -> f64 {
        breakdown
            .iter()
            .map(|(t, count)| *count as f64 * severity_weight(*t) as f64)
            .sum()
    }

    /// The present type with the highest weight; ties broken by highest
    /// count, then by declaration order. None iff the breakdown is empty.
    pub fn most_severe_type(&self, breakdown: &ReportTypeBreakdown) -> Option<ReportType> {
        let mut best: Option<(ReportType, u32, i64)> = None;

        for report_type in ReportType::ALL {
            let count = match breakdown.get(&report_type) {
                Some(count) if *count > 0 => *count,
                _ => continue,
            };
            let weight = severity_weight(report_type);

            match best {
                Some((_, best_weight, best_count))
                    if (weight, count) <= (best_weight, best_count) => {}
                _ => best = Some((report_type, weight, count)),
            }
        }

        best.map(|(t, _, _)| t)
    }

    /// Full derived score for one target's pending breakdown
    pub fn score(&self, breakdown: &ReportTypeBreakdown) -> ModerationScore {
        ModerationScore {
            weighted_score: self.weighted_score(breakdown),
            most_severe_type: self.most_severe_type(breakdown),
            total_count: breakdown.values().sum(),
        }
    }

    /// Auto-enforcement threshold for a target kind
    pub fn threshold(&self, kind: TargetKind) -> f64 {
        match kind {
            TargetKind::User => self.user_threshold,
            TargetKind::Recipe => self.recipe_threshold,
        }
    }

    pub fn exceeds_threshold(&self, score: f64, kind: TargetKind) -> bool {
        score >= self.threshold(kind)
    }

    /// Display priority: a monotone step function of score relative to the
    /// kind's threshold, with a floor so that a pile of low-weight duplicate
    /// reports never ranks below medium.
    pub fn priority(&self, score: f64, kind: TargetKind, report_count: i64) -> Priority {
        let threshold = self.threshold(kind);

        let banded = if score >= threshold * 2.0 {
            Priority::Critical
        } else if score >= threshold {
            Priority::High
        } else if score >= threshold / 2.0 {
            Priority::Medium
        } else {
            Priority::Low
        };

        if report_count >= self.mass_report_floor && banded.order() < Priority::Medium.order() {
            Priority::Medium
        } else {
            banded
        }
    }
}
