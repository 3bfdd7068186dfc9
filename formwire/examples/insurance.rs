//! Insurance Cover Example
//!
//! Builds the insurance cover form from a schema, attaches the premium rules
//! and walks through a short editing session:
//! - switching "Is Fixed Premium?" shows one group of amount fields and hides
//!   the other
//! - shown amounts become required, hidden ones drop out of the form value
//! - keystrokes go through the number filter
//!
//! Rule passes are logged to `insurance.log`.

use std::fs::File;

use formwire::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

// ============================================================================
// Form
// ============================================================================

const VARIABLE: [&str; 4] = [
    "minInsuredAmount",
    "maxInsuredAmount",
    "minPremiumAmount",
    "maxPremiumAmount",
];
const FIXED: [&str; 2] = ["fixedAmount", "fixedPremium"];

fn schema() -> FormSchema {
    let amount = |key: &str, label: &str| {
        FieldSchema::new(key)
            .with_label(label)
            .with_config(FieldConfig::integer().decimal_places(2))
            .with_filter(InputFilter::number().with_decimal_places(2))
    };
    let count = |key: &str, label: &str| {
        FieldSchema::new(key)
            .with_label(label)
            .with_config(FieldConfig::integer())
            .with_filter(InputFilter::number().with_max_length(3))
    };

    FormSchema::new(vec![
        FieldSchema::new("coverName")
            .with_label("Cover Name")
            .with_value("")
            .with_config(FieldConfig::text().required().max_length(60))
            .with_filter(InputFilter::text().with_case(CaseTransform::Capitalize)),
        FieldSchema::new("coverTypeValue")
            .with_label("Cover Type")
            .with_value("")
            .with_config(FieldConfig::text().required())
            .with_options(vec![
                SelectOption::new("Basic", "BASIC"),
                SelectOption::new("Premium", "PREMIUM"),
                SelectOption::new("Gold", "GOLD"),
            ]),
        FieldSchema::new("isFixedPremium")
            .with_label("Is Fixed Premium?")
            .with_value(false)
            .with_config(FieldConfig::text().required()),
        amount("minInsuredAmount", "Min Insured Amount"),
        amount("maxInsuredAmount", "Max Insured Amount"),
        amount("minPremiumAmount", "Min Premium Amount"),
        amount("maxPremiumAmount", "Max Premium Amount"),
        amount("fixedAmount", "Fixed Amount"),
        amount("fixedPremium", "Fixed Premium"),
        count("minAgeLimit", "Min Age Limit"),
        count("maxAgeLimit", "Max Age Limit"),
        FieldSchema::new("isAddonCover")
            .with_label("Is Addon Cover")
            .with_value(false),
    ])
}

fn rules() -> Result<RuleSet, RuleError> {
    let variable = |v: &FormSnapshot| v["isFixedPremium"] == false;
    let fixed = |v: &FormSnapshot| v["isFixedPremium"] == true;
    RuleSet::new([
        FieldRule::visible(VARIABLE, variable),
        FieldRule::required(VARIABLE, variable),
        FieldRule::visible(FIXED, fixed),
        FieldRule::required(FIXED, fixed),
    ])
}

// ============================================================================
// Session
// ============================================================================

fn report(bound: &BoundForm, store: &VisibilityStore) {
    let messages = ErrorMessages::default();
    bound.sync();
    for (key, _) in bound.form().controls() {
        let Some(adapter) = bound.adapter(key) else {
            continue;
        };
        let state = adapter.state();
        let mark = if !store.visible(key) {
            "hidden"
        } else if state.required {
            "required"
        } else {
            ""
        };
        println!(
            "  {:<20} {:<10} {:<8} {}",
            key,
            state.value.to_string(),
            mark,
            adapter.error_message(&messages)
        );
    }
    println!("  status: {:?}", bound.form().status());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize file logging
    if let Ok(log_file) = File::create("insurance.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let bound = schema().build()?;
    let store = VisibilityStore::new();
    let engine = RuleEngine::new(store.clone());
    let _binding = engine.attach(bound.form(), rules()?);

    let _watch = store
        .is_visible("fixedAmount")
        .subscribe(|visible| println!("  > fixedAmount visible: {}", visible));

    println!("Initial (variable premium):");
    bound.form().mark_all_as_touched();
    report(&bound, &store);

    println!("Typing amounts:");
    for (key, raw) in [("minInsuredAmount", "1o00.505"), ("maxInsuredAmount", "-250")] {
        let committed = bound.input(key, raw).unwrap_or_default();
        println!("  {:?} -> {:?}", raw, committed);
    }

    println!("Switching to fixed premium:");
    if let Some(flag) = bound.form().get("isFixedPremium") {
        flag.set_value(true, Emit::Notify);
    }
    report(&bound, &store);

    println!("Form value: {:?}", bound.form().value());
    println!("Rule passes: {}", engine.passes());
    Ok(())
}
