//! Risk classification and the fixed action plans rendered with a result.

use serde::Serialize;

/// Score at or above which a result classifies as insomnia.
pub const INSOMNIA_SCORE_THRESHOLD: u32 = 90;

/// Score at or above which a result classifies as sleep apnea.
pub const APNEA_SCORE_THRESHOLD: u32 = 40;

/// Risk categories a completed assessment can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    LowRisk,
    Apnea,
    Insomnia,
}

impl RiskCategory {
    /// Wire/storage label for the category; this is the value persisted in
    /// the `symptoms` field of a created assessment.
    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::LowRisk => "low risk",
            RiskCategory::Apnea => "apnea",
            RiskCategory::Insomnia => "insomnia",
        }
    }
}

/// Recommended next steps for a category: one primary, one secondary, and
/// one or more optional follow-ups. Data, not behavior.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ActionPlan {
    pub should: &'static str,
    pub recommended: &'static str,
    pub optional: &'static [&'static str],
}

/// Derived display profile for a resolved result. Recomputed on every
/// resolution, never cached or persisted.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RiskProfile {
    pub category: RiskCategory,
    pub severity_color: &'static str,
    pub status: &'static str,
    pub plan: &'static ActionPlan,
}

static INSOMNIA_PLAN: ActionPlan = ActionPlan {
    should: "Book a consultation with a sleep specialist",
    recommended: "Start the guided insomnia therapy program",
    optional: &[
        "Join the weekly sleep-health webinar",
        "Read the insomnia self-care guide",
    ],
};

static APNEA_PLAN: ActionPlan = ActionPlan {
    should: "Schedule a sleep apnea screening call",
    recommended: "Order the at-home sleep test kit",
    optional: &[
        "Browse the breathing-health article series",
        "Track your sleep for the next two weeks",
    ],
};

static LOW_RISK_PLAN: ActionPlan = ActionPlan {
    should: "Keep up your current sleep routine",
    recommended: "Explore the sleep hygiene library",
    optional: &["Retake the assessment in three months"],
};

/// Classifies a result for display.
///
/// Precedence: a stored symptom label of "insomnia", or a score of at least
/// 90, is insomnia; otherwise a label of "apnea", or a score of at least 40,
/// is apnea; everything else is low risk. The label is checked with a
/// logical OR against the threshold, so a stored label can force a higher
/// category than the score alone would reach. That happens when the catalog
/// changed between taking and viewing, and is intentional.
pub fn classify(score: u32, symptom_label: Option<&str>) -> RiskProfile {
    if label_matches(symptom_label, "insomnia") || score >= INSOMNIA_SCORE_THRESHOLD {
        return RiskProfile {
            category: RiskCategory::Insomnia,
            severity_color: "red",
            status: "High risk of insomnia",
            plan: &INSOMNIA_PLAN,
        };
    }

    if label_matches(symptom_label, "apnea") || score >= APNEA_SCORE_THRESHOLD {
        return RiskProfile {
            category: RiskCategory::Apnea,
            severity_color: "orange",
            status: "Elevated risk of sleep apnea",
            plan: &APNEA_PLAN,
        };
    }

    RiskProfile {
        category: RiskCategory::LowRisk,
        severity_color: "green",
        status: "No elevated risk detected",
        plan: &LOW_RISK_PLAN,
    }
}

/// Submission-time label derivation. Applied once when an assessment is
/// created, so the stored label is always consistent with the stored score.
pub fn derive_symptom_label(score: u32) -> RiskCategory {
    if score >= INSOMNIA_SCORE_THRESHOLD {
        RiskCategory::Insomnia
    } else if score >= APNEA_SCORE_THRESHOLD {
        RiskCategory::Apnea
    } else {
        RiskCategory::LowRisk
    }
}

fn label_matches(label: Option<&str>, expected: &str) -> bool {
    label
        .map(|value| value.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
