// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tokens the bot has already acted on.

use alloy::primitives::Address;
use std::collections::HashSet;
use std::sync::Mutex;

/// Append-only set of seen tokens, shared for the life of the process.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    seen: Mutex<HashSet<Address>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically record `token`. Returns `true` only the first time.
    pub fn mark_seen(&self, token: Address) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token)
    }

    #[cfg(test)]
    pub fn contains(&self, token: &Address) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(token)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
