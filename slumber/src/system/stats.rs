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
#[path = "stats_test.rs"]
mod tests;

use parking_lot::Mutex;

use crate::state::PowerState;

/// Residency counters of one power state on one CPU, in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateStats {
    pub count: u32,
    pub last_cycles: u32,
    pub total_cycles: u32,
}

#[derive(Debug, Default)]
struct CpuStats {
    timer_start: u32,
    timer_end: u32,
    states: [StateStats; PowerState::COUNT],
}

#[derive(Debug)]
pub struct PmStats {
    cpus: Box<[Mutex<CpuStats>]>,
}

impl PmStats {
    pub fn new(num_cpus: usize) -> Self {
        let cpus = (0..num_cpus).map(|_| Mutex::default()).collect();
        PmStats { cpus }
    }

    pub fn num_cpus(&self) -> usize {
        self.cpus.len()
    }

    /// Export name of the counters of `state` on `cpu`.
    pub fn name(cpu: usize, state: PowerState) -> String {
        format!("pm_cpu_{cpu:03}_state_{}_stats", state.index())
    }

    pub(crate) fn start_timer(&self, cpu: usize, cycles: u32) {
        if let Some(stats) = self.cpus.get(cpu) {
            stats.lock().timer_start = cycles;
        }
    }

    pub(crate) fn stop_timer(&self, cpu: usize, cycles: u32) {
        if let Some(stats) = self.cpus.get(cpu) {
            stats.lock().timer_end = cycles;
        }
    }

    /// Accounts the last timed interval to `state`.
    pub(crate) fn update(&self, cpu: usize, state: PowerState) {
        let Some(stats) = self.cpus.get(cpu) else {
            log::warn!("cpu {cpu}: no statistics slot");
            return;
        };
        let stats = &mut *stats.lock();
        let elapsed = stats.timer_end.wrapping_sub(stats.timer_start);
        let entry = &mut stats.states[state.index()];
        entry.count = entry.count.wrapping_add(1);
        entry.last_cycles = elapsed;
        entry.total_cycles = entry.total_cycles.wrapping_add(elapsed);
    }

    pub fn get(&self, cpu: usize, state: PowerState) -> Option<StateStats> {
        let stats = self.cpus.get(cpu)?;
        Some(stats.lock().states[state.index()])
    }

    /// Snapshot of every counter set with its export name.
    pub fn snapshot(&self) -> Vec<(String, StateStats)> {
        let mut all = Vec::with_capacity(self.cpus.len() * PowerState::COUNT);
        for (cpu, stats) in self.cpus.iter().enumerate() {
            let stats = stats.lock();
            for state in PowerState::ALL {
                all.push((Self::name(cpu, state), stats.states[state.index()]));
            }
        }
        all
    }
}
