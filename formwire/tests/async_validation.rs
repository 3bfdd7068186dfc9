//! Tests for async validators and the pending status.

use std::sync::{Arc, Mutex};

use formwire::validation::{AsyncValidator, FieldConfig, Validator};
use formwire::{Control, ControlEvent, ControlStatus, Emit, FieldStateAdapter, Form, Value};

fn taken_names() -> AsyncValidator {
    AsyncValidator::new("taken", |value: Value| async move {
        tokio::task::yield_now().await;
        value != "admin"
    })
}

#[tokio::test]
async fn test_async_failure_marks_invalid() {
    let control = Control::new("admin");
    control.set_async_validators(vec![taken_names()]);

    let status = control.validate_async().await;

    assert_eq!(status, ControlStatus::Invalid);
    assert!(control.errors().is_some_and(|errors| errors.contains("taken")));
    assert!(!control.is_pending());
}

#[tokio::test]
async fn test_pending_is_reported_while_running() {
    let control = Control::new("ada");
    control.set_async_validators(vec![taken_names()]);
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let _sub = control.subscribe(move |event| {
        if let ControlEvent::StatusChanged(status) = event {
            sink.lock().unwrap().push(*status);
        }
    });

    assert_eq!(control.validate_async().await, ControlStatus::Valid);
    assert_eq!(
        *statuses.lock().unwrap(),
        vec![ControlStatus::Pending, ControlStatus::Valid]
    );
}

#[tokio::test]
async fn test_sync_failure_skips_async_validators() {
    let control = Control::with_validators("", vec![Validator::Required]);
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    control.set_async_validators(vec![AsyncValidator::new("remote", move |_: Value| {
        *counter.lock().unwrap() += 1;
        async { true }
    })]);

    assert_eq!(control.validate_async().await, ControlStatus::Invalid);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_disabled_control_is_not_validated() {
    let control = Control::new("admin");
    control.set_async_validators(vec![taken_names()]);
    control.disable(Emit::Quiet);

    assert_eq!(control.validate_async().await, ControlStatus::Disabled);
    assert!(control.errors().is_none());
}

#[tokio::test]
async fn test_adapter_mirrors_pending_and_form_status() {
    let control = Control::new("admin");
    let form = Form::builder().field("user", control.clone()).build().unwrap();
    let mut adapter = FieldStateAdapter::new(FieldConfig::text().required());
    adapter.bind(control.clone());
    control.set_async_validators(vec![taken_names()]);

    let pending_seen = Arc::new(Mutex::new(false));
    let sink = Arc::clone(&pending_seen);
    let _sub = adapter.subscribe(move |state| {
        if state.pending {
            *sink.lock().unwrap() = true;
        }
    });

    control.validate_async().await;

    assert!(*pending_seen.lock().unwrap());
    assert!(!adapter.state().pending);
    assert!(adapter.state().invalid);
    assert_eq!(form.status(), ControlStatus::Invalid);
}
