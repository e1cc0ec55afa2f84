/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use serde::{Deserialize, Serialize};

use groundwork::{
    LogicalId, Stack, StackProps, StandardBucket, StandardBucketProps, StandardDeadLetterQueue,
    StandardDeadLetterQueueProps, StandardFunction, StandardFunctionProps, StandardHttpApi,
    StandardHttpApiProps, StandardQueue, StandardQueueProps, StandardTable, StandardTableProps,
};

/// A declarative stack definition: stack-level settings and the
/// constructs to synthesize into it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StackManifest {
    #[serde(flatten)]
    pub stack: StackProps,
    #[serde(default)]
    pub constructs: Vec<ConstructSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConstructSpec {
    Queue {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardQueueProps,
    },
    DeadLetterQueue {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardDeadLetterQueueProps,
    },
    Table {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardTableProps,
    },
    Function {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardFunctionProps,
    },
    Bucket {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardBucketProps,
    },
    HttpApi {
        id: LogicalId,
        #[serde(flatten)]
        props: StandardHttpApiProps,
    },
}

impl StackManifest {
    /// Instantiate every declared construct into a fresh stack.
    pub fn build(self) -> groundwork::Result<Stack> {
        let mut stack = Stack::new(self.stack);
        for construct in self.constructs {
            match construct {
                ConstructSpec::Queue { id, props } => {
                    StandardQueue::new(&mut stack, &id, props)?;
                }
                ConstructSpec::DeadLetterQueue { id, props } => {
                    StandardDeadLetterQueue::new(&mut stack, &id, props)?;
                }
                ConstructSpec::Table { id, props } => {
                    StandardTable::new(&mut stack, &id, props)?;
                }
                ConstructSpec::Function { id, props } => {
                    StandardFunction::new(&mut stack, &id, props)?;
                }
                ConstructSpec::Bucket { id, props } => {
                    StandardBucket::new(&mut stack, &id, props)?;
                }
                ConstructSpec::HttpApi { id, props } => {
                    StandardHttpApi::new(&mut stack, &id, props)?;
                }
            }
        }
        Ok(stack)
    }
}
