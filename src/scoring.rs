use crate::models::{
    Annotation, BudgetLevel, CompanySize, IntentLevel, RawCandidate, TimelineBucket,
};

/// Compute the lead score from the candidate's fields and its annotation.
///
/// Deterministic weighted sum with fixed weights, clamped to 100. The
/// AI-suggested `ScoreFactor` weights are never consulted; they are stored
/// on the lead as an advisory breakdown only. Unknown categories contribute
/// zero, so a fully degraded annotation scores purely on company size and
/// contact completeness.
pub fn score_lead(candidate: &RawCandidate, analysis: &Annotation) -> u8 {
    let mut score: u32 = 0;

    score += match analysis.intent {
        IntentLevel::High => 30,
        IntentLevel::Medium => 20,
        IntentLevel::Low => 10,
        IntentLevel::Unknown => 0,
    };

    score += match analysis.budget {
        BudgetLevel::High => 25,
        BudgetLevel::Medium => 15,
        BudgetLevel::Low => 5,
        BudgetLevel::Unknown => 0,
    };

    score += match analysis.timeline {
        TimelineBucket::Immediate => 20,
        TimelineBucket::OneToThreeMonths => 15,
        TimelineBucket::ThreeToSixMonths => 10,
        TimelineBucket::SixMonthsPlus | TimelineBucket::Unknown => 0,
    };

    if analysis.decision_maker {
        score += 15;
    }

    score += match candidate.company_size {
        Some(CompanySize::Size1000Plus) => 10,
        Some(CompanySize::Size501To1000) => 8,
        Some(CompanySize::Size201To500) => 6,
        _ => 0,
    };

    // Contact information completeness
    let has_email = candidate.email.as_deref().is_some_and(|e| !e.is_empty());
    let has_phone = candidate.phone.as_deref().is_some_and(|p| !p.is_empty());
    if has_email && has_phone {
        score += 5;
    } else if has_email {
        score += 3;
    }

    score.min(100) as u8
}
