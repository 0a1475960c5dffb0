//! Coin analysis parsing tests: plain and fenced model replies.

use crypto_portfolio::assistant::gemini::parse_analysis;

const ANALYSIS_JSON: &str = r#"{
  "summary": "Bitcoin is the largest cryptocurrency by market cap.",
  "market_context": {
    "current_trend": "bullish",
    "volatility": "high",
    "market_sentiment": "Optimistic after recent inflows"
  },
  "pros": ["Deep liquidity", "Wide adoption", "Capped supply"],
  "cons": ["High volatility", "Regulatory risk", "Energy usage"],
  "recommendation": {
    "decision": "buy",
    "confidence": 72,
    "risk_level": "medium"
  }
}"#;

#[test]
fn parses_plain_json_reply() {
    let analysis = parse_analysis(ANALYSIS_JSON).unwrap();
    assert_eq!(analysis.market_context.current_trend, "bullish");
    assert_eq!(analysis.pros.len(), 3);
    assert_eq!(analysis.recommendation.decision, "buy");
    assert_eq!(analysis.recommendation.confidence, 72.0);
}

#[test]
fn parses_fenced_json_reply() {
    let fenced = format!("```json\n{ANALYSIS_JSON}\n```");
    let analysis = parse_analysis(&fenced).unwrap();
    assert_eq!(analysis.recommendation.risk_level, "medium");

    let fenced_plain = format!("```\n{ANALYSIS_JSON}\n```");
    let analysis = parse_analysis(&fenced_plain).unwrap();
    assert!(analysis.summary.starts_with("Bitcoin"));
}

#[test]
fn rejects_non_json_reply() {
    assert!(parse_analysis("I cannot provide an analysis right now.").is_err());
}
