// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gas strategy for transaction priority.

/// Gas strategy determines how far above the network gas price we bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasStrategy {
    /// Network price as quoted. Used for sells.
    Normal,

    /// network price * 1.5 - for sniping a fresh pool.
    Aggressive,

    /// network price * 2.0 - when being first matters more than cost.
    Frontrun,
}

impl GasStrategy {
    /// Gas price to bid given the current network gas price, in wei.
    pub fn bid(&self, network_gas_price: u128) -> u128 {
        match self {
            Self::Normal => network_gas_price,
            Self::Aggressive => network_gas_price * 150 / 100,
            Self::Frontrun => network_gas_price * 2,
        }
    }

    /// Get strategy from config multiplier.
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier >= 2.0 {
            Self::Frontrun
        } else if multiplier >= 1.5 {
            Self::Aggressive
        } else {
            Self::Normal
        }
    }
}

impl Default for GasStrategy {
    fn default() -> Self {
        Self::Normal
    }
}
