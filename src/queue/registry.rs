// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::errors::ConfigurationError;
use crate::queue::Queue;

/// Owns every queue of a pipeline, keyed by name.
///
/// Built once from the queue section of the configuration and never resized.
/// Queues are kept in name order so progress output is stable.
#[derive(Debug, Clone, Default)]
pub struct QueueRegistry(BTreeMap<String, Queue>);

impl QueueRegistry {
    /// Allocates one queue per name. Fails on the first repeated name.
    pub fn create<I, S>(names: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queues = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            if queues.contains_key(name) {
                return Err(ConfigurationError::DuplicateQueueName(name.to_string()));
            }
            queues.insert(name.to_string(), Queue::new(name));
        }
        Ok(Self(queues))
    }

    /// Returns a handle to the named queue.
    pub fn get(&self, name: &str) -> Result<Queue, ConfigurationError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownQueue(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Queue)> {
        self.0.iter()
    }

    /// Current depth of every queue. Point-in-time estimate.
    pub fn depths(&self) -> BTreeMap<String, usize> {
        self.0
            .iter()
            .map(|(name, queue)| (name.clone(), queue.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
