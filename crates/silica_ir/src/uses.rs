//! Explicit use tracking: value → consuming operations.
//!
//! The IR does not thread intrusive use-lists through values. Instead the
//! module owns a [`UseTable`] and updates it on every mutation, exposing
//! it to passes as a query capability. Each table entry corresponds to
//! one operand occurrence, so an op using the same value twice appears
//! twice.

use crate::ids::{OpId, ValueId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps each value to the operations consuming it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UseTable {
    users: HashMap<ValueId, Vec<OpId>>,
}

impl UseTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one operand occurrence of `value` in `user`.
    pub fn record(&mut self, value: ValueId, user: OpId) {
        self.users.entry(value).or_default().push(user);
    }

    /// Removes one operand occurrence of `value` in `user`, if present.
    pub fn forget(&mut self, value: ValueId, user: OpId) {
        if let Some(users) = self.users.get_mut(&value) {
            if let Some(pos) = users.iter().position(|&u| u == user) {
                users.remove(pos);
            }
            if users.is_empty() {
                self.users.remove(&value);
            }
        }
    }

    /// Removes and returns all recorded users of `value`.
    pub fn take_users(&mut self, value: ValueId) -> Vec<OpId> {
        self.users.remove(&value).unwrap_or_default()
    }

    /// Appends pre-collected users to `value`'s list.
    pub fn extend(&mut self, value: ValueId, users: Vec<OpId>) {
        if !users.is_empty() {
            self.users.entry(value).or_default().extend(users);
        }
    }

    /// Returns the recorded users of `value`, one entry per occurrence.
    pub fn users(&self, value: ValueId) -> &[OpId] {
        self.users.get(&value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if `value` has no recorded users.
    pub fn is_unused(&self, value: ValueId) -> bool {
        self.users(value).is_empty()
    }

    /// Returns the total number of recorded operand occurrences.
    pub fn entry_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }
}
