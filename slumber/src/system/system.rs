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

pub mod config;
pub mod stats;
#[cfg(test)]
pub(crate) mod test;

#[cfg(test)]
#[path = "system_test.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::device::{self, DeviceTable, Devices};
use crate::hal::{IrqKey, Kernel, PlatformHooks, Policy};
use crate::notifier::Notifiers;
use crate::state::{Deadline, PowerState, PowerStateInfo, us_to_ticks_ceil};

use self::config::PmConfig;
use self::stats::PmStats;

/// Where the controller is in a suspend/resume cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Active = 0,
    EnteringSleep = 1,
    Asleep = 2,
    ExitingSleep = 3,
}

impl Phase {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Phase::EnteringSleep,
            2 => Phase::Asleep,
            3 => Phase::ExitingSleep,
            _ => Phase::Active,
        }
    }
}

/// Drives the system in and out of low power states.
///
/// One instance lives for the whole lifetime of the system. The idle loop
/// of every CPU calls [`PowerManager::system_suspend`]; the interrupt that
/// wakes a CPU up may call [`PowerManager::system_resume`] before the idle
/// loop gets control back.
pub struct PowerManager<K, P> {
    config: PmConfig,
    kernel: K,
    policy: P,
    hooks: PlatformHooks,
    devices: Devices,
    notifiers: Notifiers,
    state: Mutex<PowerStateInfo>,
    phase: AtomicU8,
    post_ops_done: AtomicBool,
    devices_suspended: AtomicBool,
    stats: Option<PmStats>,
}

impl<K, P> PowerManager<K, P>
where
    K: Kernel,
    P: Policy,
{
    pub fn new(
        config: PmConfig,
        kernel: K,
        policy: P,
        hooks: PlatformHooks,
        devices: DeviceTable,
    ) -> Self {
        let stats = config.stats.then(|| PmStats::new(usize::from(config.cpus)));
        PowerManager {
            config,
            kernel,
            policy,
            hooks,
            devices: Devices::new(devices),
            notifiers: Notifiers::default(),
            state: Mutex::new(PowerStateInfo::ACTIVE),
            phase: AtomicU8::new(Phase::Active as u8),
            post_ops_done: AtomicBool::new(true),
            devices_suspended: AtomicBool::new(false),
            stats,
        }
    }

    pub fn config(&self) -> &PmConfig {
        &self.config
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn notifiers(&self) -> &Notifiers {
        &self.notifiers
    }

    pub fn stats(&self) -> Option<&PmStats> {
        self.stats.as_ref()
    }

    /// The state being entered, or the last one entered.
    pub fn current_state(&self) -> PowerStateInfo {
        *self.state.lock()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_raw(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn start_timer(&self, cpu: usize) {
        if let Some(stats) = &self.stats {
            stats.start_timer(cpu, self.kernel.cycle_get_32());
        }
    }

    fn stop_timer(&self, cpu: usize) {
        if let Some(stats) = &self.stats {
            stats.stop_timer(cpu, self.kernel.cycle_get_32());
        }
    }

    fn power_state_set(&self, info: &PowerStateInfo) {
        if let Some(entry) = &self.hooks.entry {
            entry.power_state_set(info);
        }
    }

    fn exit_post_ops(&self, info: &PowerStateInfo) {
        match &self.hooks.exit {
            Some(exit) => exit.exit_post_ops(info),
            None => self.kernel.irq_unlock(IrqKey(0)),
        }
    }

    fn arm_wakeup(&self, info: &PowerStateInfo, deadline: Deadline) {
        let Some(ticks) = deadline.ticks() else {
            return;
        };
        if info.min_residency_us < info.exit_latency_us {
            log::warn!(
                "{}: min residency {}us is below exit latency {}us",
                info.state,
                info.min_residency_us,
                info.exit_latency_us
            );
        }
        let latency = us_to_ticks_ceil(info.exit_latency_us, self.config.tick_rate);
        self.kernel.set_timeout_expiry(ticks.saturating_sub(latency), true);
    }

    fn handle_device_abort(
        &self,
        info: &PowerStateInfo,
        key: IrqKey,
        err: device::Error,
    ) -> PowerState {
        log::debug!("Some devices did not enter suspend state: {err}");
        self.devices.resume_all();
        self.notifiers.notify(false, info.state);
        *self.state.lock() = PowerStateInfo::ACTIVE;
        self.post_ops_done.store(true, Ordering::Release);
        self.set_phase(Phase::Active);
        self.kernel.sched_unlock();
        self.kernel.irq_unlock(key);
        PowerState::Active
    }

    /// Puts the system into the state the policy picks for `deadline` and
    /// returns once the system is active again.
    ///
    /// Returns the state that was entered. [`PowerState::Active`] means
    /// nothing was entered, either by policy choice or because a device
    /// refused to suspend.
    pub fn system_suspend(&self, deadline: Deadline) -> PowerState {
        log::trace!("system suspend: {deadline:?}");
        let info = self.policy.next_state(deadline);
        if info.is_active() {
            log::debug!("No PM operations done.");
            return PowerState::Active;
        }
        *self.state.lock() = info;
        self.post_ops_done.store(false, Ordering::Release);
        self.set_phase(Phase::EnteringSleep);
        self.arm_wakeup(&info, deadline);

        // Interrupts stay locked until the exit hook, the scheduler until
        // the exit notifications went out.
        let key = self.kernel.irq_lock();
        self.kernel.sched_lock();
        self.notifiers.notify(true, info.state);

        if info.state != PowerState::RuntimeIdle {
            if let Err(err) = self.devices.suspend_all() {
                return self.handle_device_abort(&info, key, err);
            }
            self.devices_suspended.store(true, Ordering::Release);
        }

        let cpu = self.kernel.current_cpu();
        self.set_phase(Phase::Asleep);
        self.start_timer(cpu);
        self.power_state_set(&info);
        self.stop_timer(cpu);

        self.system_resume();
        if let Some(stats) = &self.stats {
            stats.update(cpu, info.state);
        }
        self.kernel.sched_unlock();
        log::trace!("system suspend: left {}", info.state);
        info.state
    }

    /// Runs the exit sequence of the current power state.
    ///
    /// Called by the interrupt that ended the sleep and again by the
    /// suspend path once the platform entry hook returns; only the first
    /// call does anything.
    pub fn system_resume(&self) {
        if self.post_ops_done.swap(true, Ordering::AcqRel) {
            return;
        }
        self.set_phase(Phase::ExitingSleep);
        let info = self.current_state();
        self.exit_post_ops(&info);
        if self.devices_suspended.swap(false, Ordering::AcqRel) {
            self.devices.resume_all();
        }
        self.notifiers.notify(false, info.state);
        self.set_phase(Phase::Active);
    }

    /// Enters `info` without consulting the policy and without touching
    /// devices.
    pub fn force_state(&self, info: PowerStateInfo) {
        if info.is_active() {
            return;
        }
        // Unlocked by the exit hook.
        let _ = self.kernel.irq_lock();
        *self.state.lock() = info;
        self.post_ops_done.store(false, Ordering::Release);
        self.set_phase(Phase::EnteringSleep);
        self.notifiers.notify(true, info.state);

        self.kernel.sched_lock();
        let cpu = self.kernel.current_cpu();
        self.set_phase(Phase::Asleep);
        self.start_timer(cpu);
        self.power_state_set(&info);
        self.stop_timer(cpu);

        self.system_resume();
        self.kernel.sched_unlock();
    }
}
