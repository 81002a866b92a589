use crate::assessment::risk::{classify, derive_symptom_label, RiskCategory};

#[test]
fn classification_is_monotonic_in_score_without_a_label() {
    assert_eq!(classify(0, None).category, RiskCategory::LowRisk);
    assert_eq!(classify(45, None).category, RiskCategory::Apnea);
    assert_eq!(classify(95, None).category, RiskCategory::Insomnia);
}

#[test]
fn thresholds_are_inclusive() {
    assert_eq!(classify(39, None).category, RiskCategory::LowRisk);
    assert_eq!(classify(40, None).category, RiskCategory::Apnea);
    assert_eq!(classify(89, None).category, RiskCategory::Apnea);
    assert_eq!(classify(90, None).category, RiskCategory::Insomnia);
}

#[test]
fn stored_label_can_force_a_higher_category() {
    assert_eq!(
        classify(10, Some("insomnia")).category,
        RiskCategory::Insomnia
    );
    assert_eq!(classify(5, Some("apnea")).category, RiskCategory::Apnea);
}

#[test]
fn label_matching_ignores_case_and_padding() {
    assert_eq!(
        classify(0, Some("  Insomnia ")).category,
        RiskCategory::Insomnia
    );
    assert_eq!(classify(0, Some("APNEA")).category, RiskCategory::Apnea);
}

#[test]
fn score_can_outrank_a_lower_label() {
    // The label is OR-ed with the threshold, not an override gate.
    assert_eq!(
        classify(95, Some("apnea")).category,
        RiskCategory::Insomnia
    );
    assert_eq!(
        classify(50, Some("low risk")).category,
        RiskCategory::Apnea
    );
}

#[test]
fn unknown_labels_fall_back_to_the_thresholds() {
    assert_eq!(classify(10, Some("restless")).category, RiskCategory::LowRisk);
    assert_eq!(classify(45, Some("restless")).category, RiskCategory::Apnea);
}

#[test]
fn submission_labels_follow_the_two_threshold_rule() {
    assert_eq!(derive_symptom_label(95), RiskCategory::Insomnia);
    assert_eq!(derive_symptom_label(90), RiskCategory::Insomnia);
    assert_eq!(derive_symptom_label(50), RiskCategory::Apnea);
    assert_eq!(derive_symptom_label(40), RiskCategory::Apnea);
    assert_eq!(derive_symptom_label(39), RiskCategory::LowRisk);
    assert_eq!(derive_symptom_label(0), RiskCategory::LowRisk);
}

#[test]
fn storage_labels_round_trip_through_classification() {
    for score in [0, 40, 90, 150] {
        let label = derive_symptom_label(score).label();
        assert_eq!(classify(score, Some(label)).category, derive_symptom_label(score));
    }
}

#[test]
fn every_category_carries_a_full_action_plan() {
    for (score, color) in [(0, "green"), (45, "orange"), (95, "red")] {
        let profile = classify(score, None);
        assert_eq!(profile.severity_color, color);
        assert!(!profile.status.is_empty());
        assert!(!profile.plan.should.is_empty());
        assert!(!profile.plan.recommended.is_empty());
        assert!(!profile.plan.optional.is_empty());
    }
}

#[test]
fn action_plans_differ_by_category() {
    let low = classify(0, None);
    let apnea = classify(45, None);
    let insomnia = classify(95, None);
    assert_ne!(low.plan.should, apnea.plan.should);
    assert_ne!(apnea.plan.should, insomnia.plan.should);
}
