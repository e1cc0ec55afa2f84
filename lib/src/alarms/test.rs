/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use ordered_float::NotNan;
use serde_json::json;

use crate::duration::Duration;
use crate::ids::{ActionRef, MetricField, TopicRef};

use super::{
    combine_actions, AlarmAction, AlarmCategory, AlarmFacade, AlarmFacadeSet, AlarmsCategoryOptions,
    AlarmsOptions, Threshold,
};

#[derive(Default)]
struct TestOptions {
    max_size: Option<NotNan<f64>>,
    max_age: Option<Duration>,
    notify_topics: Vec<TopicRef>,
    notify_actions: Vec<ActionRef>,
}

impl AlarmsCategoryOptions for TestOptions {
    fn notify_topics(&self) -> &[TopicRef] {
        &self.notify_topics
    }

    fn notify_actions(&self) -> &[ActionRef] {
        &self.notify_actions
    }
}

fn count(value: f64) -> Threshold {
    Threshold::count(value).unwrap()
}

#[test]
fn explicit_threshold_wins_over_default() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxMessageCount"),
        Some(count(1.0)),
        Some(count(10.0)),
        &[],
        &[],
    );
    let resolved = facade.resolve().unwrap();
    assert_eq!(resolved.value, count(1.0));
    assert!(resolved.actions_enabled);
}

#[test]
fn default_threshold_applies_without_explicit_value() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxMessageCount"),
        None,
        Some(count(0.0)),
        &[],
        &[],
    );
    assert_eq!(facade.resolve().unwrap().value, count(0.0));
}

#[test]
fn default_time_threshold_applies_without_explicit_value() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxTimeToDrain"),
        None,
        Some(Threshold::time(Duration::hours(1))),
        &[],
        &[],
    );
    assert_eq!(
        facade.resolve().unwrap().value,
        Threshold::time(Duration::hours(1))
    );
}

#[test]
fn negative_count_disables_the_alarm() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxMessageCount"),
        Some(count(-1.0)),
        Some(count(0.0)),
        &[],
        &[],
    );
    assert!(facade.resolve().is_none());
}

#[test]
fn zero_time_disables_the_alarm() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxTimeToDrain"),
        Some(Threshold::time(Duration::hours(0))),
        Some(Threshold::time(Duration::hours(1))),
        &[],
        &[],
    );
    assert!(facade.resolve().is_none());
}

#[test]
fn missing_thresholds_resolve_to_nothing() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxMessageCount"),
        None,
        None,
        &[],
        &[],
    );
    assert!(facade.resolve().is_none());
}

#[test]
fn actions_come_before_topics_in_input_order() {
    let actions = [
        ActionRef::new("action-a".to_string()),
        ActionRef::new("action-b".to_string()),
    ];
    let topics = [TopicRef::new("topic-a".to_string())];
    let combined = combine_actions(&actions, &topics);
    assert_eq!(
        combined,
        vec![
            AlarmAction::Action(ActionRef::new("action-a".to_string())),
            AlarmAction::Action(ActionRef::new("action-b".to_string())),
            AlarmAction::Notify(TopicRef::new("topic-a".to_string())),
        ]
    );
}

#[test]
fn facade_carries_combined_actions() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxMessageCount"),
        Some(count(1.0)),
        None,
        &[ActionRef::new("action-a".to_string())],
        &[TopicRef::new("topic-a".to_string())],
    );
    assert_eq!(facade.actions().len(), 2);
    let resolved = facade.resolve().unwrap();
    assert_eq!(resolved.action_override.len(), 2);
}

#[test]
fn threshold_descriptor_wire_shape() {
    let facade = AlarmFacade::new(
        MetricField::new_static("maxAgeInSeconds"),
        None,
        Some(count(15.0)),
        &[],
        &[TopicRef::new("topic-a".to_string())],
    );
    let resolved = facade.resolve().unwrap();
    assert_eq!(
        serde_json::to_value(&resolved).unwrap(),
        json!({
            "maxAgeInSeconds": 15.0,
            "actionsEnabled": true,
            "actionOverride": [{ "notify": "topic-a" }],
        })
    );
}

#[test]
fn empty_set_yields_no_record() {
    let options = AlarmsOptions::<TestOptions>::default();
    let record = AlarmFacadeSet::new(&options)
        .add_alarms(
            MetricField::new_static("maxMessageCount"),
            |o| o.max_size.map(Threshold::from),
            None,
            None,
        )
        .to_record();
    assert!(record.is_none());
}

#[test]
fn category_keys_appear_only_when_resolved() {
    let options = AlarmsOptions {
        critical: Some(TestOptions {
            max_size: Some(NotNan::new(100.0).unwrap()),
            ..TestOptions::default()
        }),
        warning: None,
        ..AlarmsOptions::default()
    };
    let record = AlarmFacadeSet::new(&options)
        .add_alarms(
            MetricField::new_static("maxMessageCount"),
            |o| o.max_size.map(Threshold::from),
            None,
            None,
        )
        .to_record()
        .unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(
        record.get(&AlarmCategory::Critical).unwrap().value,
        count(100.0)
    );
    assert!(!record.contains_key(&AlarmCategory::Warning));
}

#[test]
fn per_category_defaults_are_independent() {
    let options = AlarmsOptions::<TestOptions>::default();
    let record = AlarmFacadeSet::new(&options)
        .add_alarms(
            MetricField::new_static("maxAgeInSeconds"),
            |o| o.max_age.map(Threshold::from),
            Some(count(15.0)),
            None,
        )
        .to_record()
        .unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(
        record.get(&AlarmCategory::Critical).unwrap().value,
        count(15.0)
    );
}

#[test]
fn explicit_disable_suppresses_the_category_default() {
    let options = AlarmsOptions {
        critical: Some(TestOptions {
            max_size: Some(NotNan::new(-1.0).unwrap()),
            ..TestOptions::default()
        }),
        warning: None,
        ..AlarmsOptions::default()
    };
    let record = AlarmFacadeSet::new(&options)
        .add_alarms(
            MetricField::new_static("maxMessageCount"),
            |o| o.max_size.map(Threshold::from),
            Some(count(0.0)),
            None,
        )
        .to_record();
    assert!(record.is_none());
}

#[test]
fn options_to_record_resolves_both_categories() {
    let options = AlarmsOptions {
        critical: Some(TestOptions {
            max_size: Some(NotNan::new(100.0).unwrap()),
            ..TestOptions::default()
        }),
        warning: Some(TestOptions {
            max_size: Some(NotNan::new(50.0).unwrap()),
            ..TestOptions::default()
        }),
        ..AlarmsOptions::default()
    };
    let record = options
        .to_record(
            MetricField::new_static("maxMessageCount"),
            |o| o.max_size.map(Threshold::from),
            None,
            None,
        )
        .unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(
        record.get(&AlarmCategory::Warning).unwrap().value,
        count(50.0)
    );
}

#[test]
fn alarm_category_round_trip() {
    for category in AlarmCategory::categories() {
        assert_eq!(
            category.to_string().parse::<AlarmCategory>().unwrap(),
            category
        );
    }
}

#[test]
fn threshold_serializes_untagged() {
    assert_eq!(serde_json::to_value(count(3.0)).unwrap(), json!(3.0));
    assert_eq!(
        serde_json::to_value(Threshold::time(Duration::minutes(15))).unwrap(),
        json!("15m")
    );
    assert_eq!(
        serde_json::from_value::<Threshold>(json!("15m")).unwrap(),
        Threshold::time(Duration::minutes(15))
    );
    assert_eq!(
        serde_json::from_value::<Threshold>(json!(3.0)).unwrap(),
        count(3.0)
    );
}
