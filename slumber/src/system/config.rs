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

use serde::Deserialize;
use serde_aco::Help;

fn default_cpus() -> u16 {
    1
}

fn default_tick_rate() -> u32 {
    10_000
}

fn default_stats() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Help)]
pub struct PmConfig {
    /// Number of CPUs. [default: 1]
    #[serde(default = "default_cpus")]
    pub cpus: u16,
    /// System timer ticks per second. [default: 10000]
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Record per-CPU residency statistics. [default: true]
    #[serde(default = "default_stats")]
    pub stats: bool,
}

impl Default for PmConfig {
    fn default() -> Self {
        PmConfig {
            cpus: default_cpus(),
            tick_rate: default_tick_rate(),
            stats: default_stats(),
        }
    }
}
