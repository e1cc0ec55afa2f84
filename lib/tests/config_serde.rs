/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use ordered_float::NotNan;

use groundwork::alarms::AlarmsOptions;
use groundwork::{Duration, QueueAlarmCategoryOptions, StandardQueueProps};

#[test]
fn queue_props_deserialize_from_yaml() {
    let props: StandardQueueProps = serde_yaml::from_str(
        r#"
        retention_period: 7d
        visibility_timeout: 45s
        max_receive_count: 5
        alarms:
          critical:
            max_age_in_seconds: 60
            dead_letter_queue_max_size: 10
            notify_topics: ["arn:aws:sns:eu-west-1:111122223333:oncall"]
        "#,
    )
    .unwrap();
    assert_eq!(props.retention_period, Some(Duration::days(7)));
    assert_eq!(props.visibility_timeout, Some(Duration::seconds(45)));
    assert_eq!(props.max_receive_count, Some(5));
    let critical = props.alarms.critical.unwrap();
    assert_eq!(
        critical.max_age_in_seconds,
        Some(NotNan::new(60.0).unwrap())
    );
    assert_eq!(critical.notify_topics.len(), 1);
    assert!(critical.max_size.is_none());
}

#[test]
fn duration_display_round_trip() {
    for (duration, rendered) in [
        (Duration::seconds(30), "30s"),
        (Duration::minutes(15), "15m"),
        (Duration::hours(1), "1h"),
        (Duration::days(14), "14d"),
        (Duration::seconds(90), "90s"),
        (Duration::seconds(0), "0s"),
    ] {
        assert_eq!(duration.to_string(), rendered);
        assert_eq!(rendered.parse::<Duration>().unwrap(), duration);
    }
    assert!("14".parse::<Duration>().is_err());
    assert!("d".parse::<Duration>().is_err());
    assert!("".parse::<Duration>().is_err());
}

#[test]
fn missing_category_bags_default_to_none() {
    let options: AlarmsOptions<QueueAlarmCategoryOptions> = serde_yaml::from_str("{}").unwrap();
    assert!(options.critical.is_none());
    assert!(options.warning.is_none());
    assert!(options.placement().any());
}

#[test]
fn nan_thresholds_are_rejected_at_the_boundary() {
    let result =
        serde_yaml::from_str::<QueueAlarmCategoryOptions>("max_size: .nan");
    assert!(result.is_err());
}
