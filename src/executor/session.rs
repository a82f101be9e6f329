//! Named executor sessions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::agent::AgentExecutor;
use super::factory::ExecutorFactory;
use crate::error::Result;
use crate::types::Turn;

/// Keeps one executor per session id.
#[derive(Debug)]
pub struct SessionManager {
    factory: ExecutorFactory,
    sessions: HashMap<String, AgentExecutor>,
}

impl SessionManager {
    pub fn new(factory: ExecutorFactory) -> Self {
        Self {
            factory,
            sessions: HashMap::new(),
        }
    }

    /// Get or create a session by ID.
    pub fn get_or_create(&mut self, session_id: &str) -> &mut AgentExecutor {
        let factory = &self.factory;
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| factory.create())
    }

    /// Replace (or create) a session from an exported turn log.
    pub fn resume(&mut self, session_id: &str, turns: Vec<Turn>) -> Result<&mut AgentExecutor> {
        let executor = self.factory.resume(turns)?;
        Ok(match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(executor);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(executor),
        })
    }

    /// Get an existing session.
    pub fn get(&self, session_id: &str) -> Option<&AgentExecutor> {
        self.sessions.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut AgentExecutor> {
        self.sessions.get_mut(session_id)
    }

    /// Remove a session.
    pub fn remove(&mut self, session_id: &str) -> Option<AgentExecutor> {
        self.sessions.remove(session_id)
    }

    /// List session IDs.
    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn factory(&self) -> &ExecutorFactory {
        &self.factory
    }
}
