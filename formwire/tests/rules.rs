//! Tests for rule evaluation against live forms.

use std::sync::{Arc, Mutex};

use formwire::rules::{FieldRule, RuleEngine, RuleSet};
use formwire::validation::Validator;
use formwire::{Control, Emit, Form, FormSnapshot, RuleError, VisibilityStore};

const VARIABLE: [&str; 4] = [
    "minInsuredAmount",
    "maxInsuredAmount",
    "minPremiumAmount",
    "maxPremiumAmount",
];
const FIXED: [&str; 2] = ["fixedAmount", "fixedPremium"];

fn insurance_form() -> Form {
    let mut builder = Form::builder()
        .field(
            "coverName",
            Control::with_validators("", vec![Validator::Required]),
        )
        .value("isFixedPremium", false);
    for key in VARIABLE.iter().chain(FIXED.iter()) {
        builder = builder.value(*key, None::<f64>);
    }
    builder.build().unwrap()
}

fn insurance_rules() -> RuleSet {
    let variable = |v: &FormSnapshot| v["isFixedPremium"] == false;
    let fixed = |v: &FormSnapshot| v["isFixedPremium"] == true;
    RuleSet::new([
        FieldRule::visible(VARIABLE, variable),
        FieldRule::required(VARIABLE, variable),
        FieldRule::visible(FIXED, fixed),
        FieldRule::required(FIXED, fixed),
    ])
    .unwrap()
}

#[test]
fn test_visible_rule_follows_flag() {
    let form = Form::builder()
        .value("flag", false)
        .value("a", "")
        .value("b", "")
        .build()
        .unwrap();
    let store = VisibilityStore::new();
    let engine = RuleEngine::new(store.clone());
    let rules = RuleSet::new([FieldRule::visible(["a", "b"], |v| v["flag"] == false)]).unwrap();

    let _binding = engine.attach(&form, rules);
    assert_eq!(store.state().get("a"), Some(&true));
    assert_eq!(store.state().get("b"), Some(&true));

    form.get("flag").unwrap().set_value(true, Emit::Notify);
    assert_eq!(store.state().get("a"), Some(&false));
    assert_eq!(store.state().get("b"), Some(&false));
    assert!(form.get("a").unwrap().is_disabled());
    assert!(form.get("b").unwrap().is_disabled());
}

#[test]
fn test_insurance_premium_switch() {
    let form = insurance_form();
    let store = VisibilityStore::new();
    let engine = RuleEngine::new(store.clone());
    let _binding = engine.attach(&form, insurance_rules());

    for key in VARIABLE {
        assert!(store.visible(key), "{key} should be visible");
        assert!(form.get(key).unwrap().has_validator(&Validator::Required));
    }
    for key in FIXED {
        assert!(!store.visible(key), "{key} should be hidden");
        assert!(form.get(key).unwrap().is_disabled());
        assert!(!form.value().contains_key(key));
    }
    assert!(form.is_invalid());

    form.get("isFixedPremium").unwrap().set_value(true, Emit::Notify);

    for key in VARIABLE {
        assert!(!store.visible(key));
        assert!(form.get(key).unwrap().is_disabled());
        assert!(form.get(key).unwrap().errors().is_none());
    }
    for key in FIXED {
        assert!(store.visible(key));
        assert!(form.get(key).unwrap().is_invalid());
    }

    form.get("coverName").unwrap().set_value("Family", Emit::Notify);
    form.get("fixedAmount").unwrap().set_value("100", Emit::Notify);
    form.get("fixedPremium").unwrap().set_value("12.5", Emit::Notify);
    assert!(form.is_valid());
}

#[test]
fn test_one_visibility_update_per_pass() {
    let form = insurance_form();
    let store = VisibilityStore::new();
    let deltas = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deltas);
    let _sub = store.on_update(move |delta| sink.lock().unwrap().push(delta.len()));
    let engine = RuleEngine::new(store.clone());
    let _binding = engine.attach(&form, insurance_rules());

    form.get("isFixedPremium").unwrap().set_value(true, Emit::Notify);
    form.get("coverName").unwrap().set_value("x", Emit::Notify);

    assert_eq!(engine.passes(), 3);
    assert_eq!(store.revision(), 3);
    assert_eq!(*deltas.lock().unwrap(), vec![6, 6, 6]);
}

#[test]
fn test_repeated_passes_change_nothing() {
    let form = insurance_form();
    let store = VisibilityStore::new();
    let engine = RuleEngine::new(store.clone());
    let rules = insurance_rules();
    let snapshot = form.value();

    engine.evaluate(&snapshot, &rules, &form);
    let state = store.state();
    let validators: Vec<_> = form.controls().map(|(_, c)| c.validators()).collect();
    let enabled: Vec<_> = form.controls().map(|(_, c)| c.is_enabled()).collect();

    for _ in 0..3 {
        engine.evaluate(&snapshot, &rules, &form);
    }

    assert_eq!(store.state(), state);
    assert_eq!(
        form.controls().map(|(_, c)| c.validators()).collect::<Vec<_>>(),
        validators
    );
    assert_eq!(
        form.controls().map(|(_, c)| c.is_enabled()).collect::<Vec<_>>(),
        enabled
    );
}

#[test]
fn test_hidden_field_value_does_not_feed_conditions() {
    let form = Form::builder()
        .value("flag", true)
        .value("child", "set")
        .value("grandchild", "")
        .build()
        .unwrap();
    let store = VisibilityStore::new();
    let engine = RuleEngine::new(store.clone());
    let rules = RuleSet::new([
        FieldRule::visible(["child"], |v| v["flag"] == true),
        FieldRule::visible(["grandchild"], |v| v["child"] == "set"),
    ])
    .unwrap();
    let _binding = engine.attach(&form, rules);
    assert!(store.visible("grandchild"));

    form.get("flag").unwrap().set_value(false, Emit::Notify);
    assert!(!store.visible("child"));
    // The pass saw the old snapshot; the hidden child drops out on the next one.
    form.get("flag").unwrap().set_value(false, Emit::Notify);
    assert!(!store.visible("grandchild"));
}

#[test]
fn test_stores_are_per_form() {
    let first = insurance_form();
    let second = insurance_form();
    let first_store = VisibilityStore::new();
    let second_store = VisibilityStore::new();
    let first_engine = RuleEngine::new(first_store.clone());
    let second_engine = RuleEngine::new(second_store.clone());
    let _a = first_engine.attach(&first, insurance_rules());
    let _b = second_engine.attach(&second, insurance_rules());

    first.get("isFixedPremium").unwrap().set_value(true, Emit::Notify);

    assert!(first_store.visible("fixedAmount"));
    assert!(!second_store.visible("fixedAmount"));
}

#[test]
fn test_dropping_form_stops_binding() {
    let control = Control::new(false);
    let form = Form::builder().field("flag", control.clone()).build().unwrap();
    let engine = RuleEngine::new(VisibilityStore::new());
    let binding = engine.attach(
        &form,
        RuleSet::new([FieldRule::enable(["flag"], |_| true)]).unwrap(),
    );

    drop(form);
    control.set_value(true, Emit::Notify);
    assert_eq!(engine.passes(), 1);
    drop(binding);
}

#[test]
fn test_empty_rule_rejected() {
    let result = RuleSet::new([FieldRule::visible(Vec::<&str>::new(), |_| true)]);
    assert!(matches!(result, Err(RuleError::EmptyFields { index: 0, .. })));
}
