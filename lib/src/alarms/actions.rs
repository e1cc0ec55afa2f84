/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::ids::{ActionRef, TopicRef};

/// A notification target attached to an alarm: either a pre-built action
/// reference or a topic wrapped into a notify action.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AlarmAction {
    Action(ActionRef),
    Notify(TopicRef),
}

impl AlarmAction {
    pub fn target(&self) -> String {
        match self {
            Self::Action(action) => action.to_string(),
            Self::Notify(topic) => topic.to_string(),
        }
    }
}

impl Display for AlarmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(action) => write!(f, "{action}"),
            Self::Notify(topic) => write!(f, "{topic}"),
        }
    }
}

/// Combine explicit actions and topics into a single action list. Explicit
/// actions come first, then one notify action per topic, in input order.
/// Duplicates are kept as given.
pub fn combine_actions(actions: &[ActionRef], topics: &[TopicRef]) -> Vec<AlarmAction> {
    actions
        .iter()
        .cloned()
        .map(AlarmAction::Action)
        .chain(topics.iter().cloned().map(AlarmAction::Notify))
        .collect()
}
