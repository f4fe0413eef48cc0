use ragline_agent::classify::{analyze, QueryComplexity};
use ragline_agent::strategy::StrategyKind;

#[test]
fn analysis_is_pure() {
    let query = "analyze the statistics and compare the data sets";
    let first = analyze(query);
    let second = analyze(query);
    assert_eq!(first, second);
}

#[test]
fn complexity_families_match_in_priority_order() {
    // "what" (simple) wins over "analyze" (complex) because the simple
    // family is checked first.
    assert_eq!(analyze("what should we analyze first").complexity, QueryComplexity::Simple);
    assert_eq!(analyze("compare the two approaches").complexity, QueryComplexity::Moderate);
    assert_eq!(analyze("evaluate the trade-offs involved").complexity, QueryComplexity::Complex);
    assert_eq!(analyze("architect a resilient platform").complexity, QueryComplexity::Expert);
}

#[test]
fn unmatched_queries_default_to_simple() {
    let analysis = analyze("machine learning");
    assert_eq!(analysis.complexity, QueryComplexity::Simple);
}

#[test]
fn strategy_follows_the_family_with_the_most_hits() {
    assert_eq!(
        analyze("calculate the statistics from this data").strategy,
        StrategyKind::Analytical
    );
    assert_eq!(
        analyze("brainstorm innovative ideas for the concept").strategy,
        StrategyKind::Creative
    );
    assert_eq!(
        analyze("review the code and the system architecture").strategy,
        StrategyKind::Technical
    );
    assert_eq!(
        analyze("a comprehensive and thorough research study").strategy,
        StrategyKind::Research
    );
    assert_eq!(
        analyze("give me a brief executive summary").strategy,
        StrategyKind::Summary
    );
}

#[test]
fn zero_hits_fall_back_to_general_with_base_confidence() {
    let analysis = analyze("machine learning");
    assert_eq!(analysis.strategy, StrategyKind::General);
    assert!((analysis.confidence - 0.3).abs() < 1e-6);
}

#[test]
fn confidence_is_capped() {
    let analysis = analyze("analyze compare evaluate calculate statistics data");
    assert!((analysis.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn token_estimate_scales_with_word_count() {
    let analysis = analyze("one two three four");
    assert_eq!(analysis.estimated_tokens, 6);
}

#[test]
fn complexity_ordering_flags_coordination_candidates() {
    assert!(QueryComplexity::Simple < QueryComplexity::Expert);
    assert!(!QueryComplexity::Moderate.warrants_coordination());
    assert!(QueryComplexity::Complex.warrants_coordination());
    assert!(QueryComplexity::VeryComplex.warrants_coordination());
    assert!(QueryComplexity::Expert.warrants_coordination());
}
