//! Tests for keystroke filtering.

use formwire::{CaseTransform, Control, InputFilter, Value};
use proptest::prelude::*;

#[test]
fn test_scenario_negative_decimal_clamp() {
    let filter = InputFilter::number().with_decimal_places(2).with_max(50.0);
    assert_eq!(filter.apply(" -12.999"), "12.99");
}

#[test]
fn test_partial_entries_survive_typing() {
    let filter = InputFilter::number().with_decimal_places(2).allow_negative();
    let mut typed = String::new();
    for c in "-12.5".chars() {
        typed.push(c);
        typed = filter.apply(&typed);
    }
    assert_eq!(typed, "-12.5");
}

#[test]
fn test_control_commits_filtered_text() {
    let control = Control::new("");
    let filter = InputFilter::text()
        .with_case(CaseTransform::Uppercase)
        .with_max_length(4);
    assert_eq!(control.set_input("abcdef", &filter), "ABCD");
    assert_eq!(control.value(), Value::from("ABCD"));
}

fn number_filter() -> impl Strategy<Value = InputFilter> {
    let max = prop_oneof![Just(-1.0), (1u32..1000).prop_map(f64::from)];
    (0u32..4, any::<bool>(), -1i64..8, max).prop_map(|(places, negative, max_length, max)| {
        let mut filter = InputFilter::number()
            .with_decimal_places(places)
            .with_max_length(max_length)
            .with_max(max);
        if negative {
            filter = filter.allow_negative();
        }
        filter
    })
}

proptest! {
    #[test]
    fn number_output_is_numeric(filter in number_filter(), raw in "[ -~]{0,16}") {
        let out = filter.apply(&raw);
        prop_assert!(out.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-'));
        prop_assert!(out.matches('.').count() <= 1);
        if !filter.negative {
            prop_assert!(!out.contains('-'));
        }
    }

    #[test]
    fn number_output_respects_max(filter in number_filter(), raw in "[0-9.]{0,12}") {
        let out = filter.apply(&raw);
        if filter.max > 0.0 && let Ok(n) = out.parse::<f64>() {
            prop_assert!(n <= filter.max);
        }
    }

    #[test]
    fn max_length_is_respected(max_length in 1i64..10, raw in "\\PC{0,20}") {
        let filter = InputFilter::text().with_max_length(max_length);
        prop_assert!(filter.apply(&raw).chars().count() as i64 <= max_length);
    }

    #[test]
    fn number_filter_is_idempotent(filter in number_filter(), raw in "[ -~]{0,16}") {
        let once = filter.apply(&raw);
        prop_assert_eq!(filter.apply(&once), once.clone());
    }
}
