// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position management module.

pub mod monitor;
pub mod tracker;

pub use monitor::{spawn_monitor, PositionMonitor, SellPolicy};
pub use tracker::{now_millis, CheckSchedule, Position, PositionTracker};
