// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::fmt::{self, Display};

use serde::Deserialize;
use serde_aco::Help;

/// System-wide power states, from fully running to soft off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize, Help)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum PowerState {
    /// Fully running.
    #[default]
    Active = 0,
    /// CPU idle that leaves devices untouched.
    RuntimeIdle = 1,
    /// Devices suspended, CPU in its deepest idle state.
    SuspendToIdle = 2,
    /// Non-boot CPUs off, system context retained.
    Standby = 3,
    /// Only RAM self-refresh powered.
    SuspendToRam = 4,
    /// Memory image saved to storage, power removed.
    SuspendToDisk = 5,
    /// Everything off except the wake logic.
    SoftOff = 6,
}

impl PowerState {
    pub const COUNT: usize = PowerState::SoftOff as usize + 1;

    pub const ALL: [PowerState; PowerState::COUNT] = [
        PowerState::Active,
        PowerState::RuntimeIdle,
        PowerState::SuspendToIdle,
        PowerState::Standby,
        PowerState::SuspendToRam,
        PowerState::SuspendToDisk,
        PowerState::SoftOff,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerState::Active => "active",
            PowerState::RuntimeIdle => "runtime-idle",
            PowerState::SuspendToIdle => "suspend-to-idle",
            PowerState::Standby => "standby",
            PowerState::SuspendToRam => "suspend-to-ram",
            PowerState::SuspendToDisk => "suspend-to-disk",
            PowerState::SoftOff => "soft-off",
        }
    }
}

impl Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A power state together with its timing characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Help)]
pub struct PowerStateInfo {
    /// The power state.
    pub state: PowerState,
    /// Minimum time in microseconds the system must stay in the state for
    /// entering it to pay off. [default: 0]
    #[serde(default)]
    pub min_residency_us: u32,
    /// Worst-case time in microseconds to get back to active. [default: 0]
    #[serde(default)]
    pub exit_latency_us: u32,
}

impl PowerStateInfo {
    pub const ACTIVE: PowerStateInfo = PowerStateInfo {
        state: PowerState::Active,
        min_residency_us: 0,
        exit_latency_us: 0,
    };

    pub const fn new(state: PowerState, min_residency_us: u32, exit_latency_us: u32) -> Self {
        PowerStateInfo {
            state,
            min_residency_us,
            exit_latency_us,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == PowerState::Active
    }
}

/// Time until the next scheduled kernel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Nothing is scheduled.
    Forever,
    /// The next event fires in this many system ticks.
    Ticks(u32),
}

impl Deadline {
    pub fn ticks(self) -> Option<u32> {
        match self {
            Deadline::Forever => None,
            Deadline::Ticks(ticks) => Some(ticks),
        }
    }
}

/// Converts microseconds to system ticks, rounding up.
pub fn us_to_ticks_ceil(us: u32, tick_rate: u32) -> u32 {
    let ticks = (u64::from(us) * u64::from(tick_rate)).div_ceil(1_000_000);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}
