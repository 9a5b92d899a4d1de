// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event listeners for detecting new pairs.

pub mod pair_created;
pub mod processed;

pub use pair_created::{spawn_listener, NewPair, PairCreatedListener};
pub use processed::ProcessedSet;
