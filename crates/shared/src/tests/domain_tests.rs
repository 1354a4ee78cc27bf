use super::*;

#[test]
fn confidence_parses_high_and_medium_tokens() {
    assert_eq!(Confidence::from_token("HIGH"), Confidence::High);
    assert_eq!(Confidence::from_token("high confidence"), Confidence::High);
    assert_eq!(Confidence::from_token("Medium"), Confidence::Medium);
    assert_eq!(Confidence::from_token("MED"), Confidence::Medium);
    assert_eq!(Confidence::from_token("low"), Confidence::Low);
}

#[test]
fn unrecognized_confidence_tokens_render_low() {
    assert_eq!(Confidence::from_token("certain"), Confidence::Low);
    assert_eq!(Confidence::from_token(""), Confidence::Low);
    assert_eq!(Confidence::default(), Confidence::Low);
}

#[test]
fn side_uses_snake_case_wire_tokens() {
    assert_eq!(
        serde_json::to_value(Side::Plaintiff).expect("serialize"),
        serde_json::json!("plaintiff")
    );
    assert_eq!(
        serde_json::to_value(Side::Defendant).expect("serialize"),
        serde_json::json!("defendant")
    );

    let side: Side = serde_json::from_str("\"defendant\"").expect("deserialize");
    assert_eq!(side, Side::Defendant);
}

#[test]
fn per_side_lookup_tracks_each_party_independently() {
    let mut staged = PerSide::<Vec<String>>::default();
    staged
        .side_mut(Side::Plaintiff)
        .push("contract.pdf".to_string());

    assert_eq!(staged.side(Side::Plaintiff).len(), 1);
    assert!(staged.side(Side::Defendant).is_empty());
    assert_eq!(staged.plaintiff, vec!["contract.pdf".to_string()]);
}
