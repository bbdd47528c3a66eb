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

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;
use slumber::device::{
    Action, ActionResult, Device, DevicePm, DeviceState, DeviceTable, PmAction,
};
use slumber::hal::{IrqKey, Kernel, PlatformHooks, Policy};
use slumber::notifier::Notifier;
use slumber::state::{Deadline, PowerState, PowerStateInfo};
use slumber::system::PowerManager;
use slumber::system::config::PmConfig;
use slumber::system::stats::StateStats;
use snafu::ResultExt;

use super::config::DeviceParam;
use super::{Result, error};

/// Ticks slept when no wake timer is armed.
pub const IDLE_TICKS: u32 = 1000;

/// Simulated CPU clock, interrupt mask and scheduler lock.
#[derive(Debug, Default)]
pub struct SimClock {
    cycles: AtomicU32,
    cycles_per_tick: u32,
    irq_depth: AtomicU32,
    sched_depth: AtomicU32,
    timeout: Mutex<Option<u32>>,
}

impl SimClock {
    pub fn new(cycles_per_tick: u32) -> Self {
        SimClock {
            cycles_per_tick,
            ..Default::default()
        }
    }

    /// Sleeps until the armed timer fires.
    fn sleep(&self) -> u32 {
        let ticks = self.timeout.lock().take().unwrap_or(IDLE_TICKS);
        let cycles = ticks.wrapping_mul(self.cycles_per_tick);
        self.cycles.fetch_add(cycles, Ordering::AcqRel);
        ticks
    }

    pub fn irq_depth(&self) -> u32 {
        self.irq_depth.load(Ordering::Acquire)
    }

    pub fn sched_depth(&self) -> u32 {
        self.sched_depth.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub struct SimKernel(Arc<SimClock>);

impl Kernel for SimKernel {
    fn irq_lock(&self) -> IrqKey {
        IrqKey(self.0.irq_depth.fetch_add(1, Ordering::AcqRel))
    }

    fn irq_unlock(&self, key: IrqKey) {
        self.0.irq_depth.store(key.0, Ordering::Release);
    }

    fn sched_lock(&self) {
        self.0.sched_depth.fetch_add(1, Ordering::AcqRel);
    }

    fn sched_unlock(&self) {
        self.0.sched_depth.fetch_sub(1, Ordering::AcqRel);
    }

    fn set_timeout_expiry(&self, ticks: u32, idle: bool) {
        log::trace!("timer armed in {ticks} ticks, idle: {idle}");
        *self.0.timeout.lock() = Some(ticks);
    }

    fn cycle_get_32(&self) -> u32 {
        self.0.cycles.load(Ordering::Acquire)
    }

    fn current_cpu(&self) -> usize {
        0
    }
}

/// Hands out the configured states in turn.
#[derive(Debug)]
pub struct ScriptedPolicy {
    states: Vec<PowerStateInfo>,
    next: AtomicUsize,
}

impl ScriptedPolicy {
    pub fn new(states: Vec<PowerStateInfo>) -> Self {
        ScriptedPolicy {
            states,
            next: AtomicUsize::new(0),
        }
    }
}

impl Policy for ScriptedPolicy {
    fn next_state(&self, _deadline: Deadline) -> PowerStateInfo {
        if self.states.is_empty() {
            return PowerStateInfo::ACTIVE;
        }
        let index = self.next.fetch_add(1, Ordering::AcqRel) % self.states.len();
        self.states[index]
    }
}

#[derive(Debug)]
struct SimDriver {
    name: String,
    fail_suspend: Option<u32>,
    fail_resume: Option<u32>,
}

fn errno(code: u32) -> i32 {
    -i32::try_from(code).unwrap_or(i32::MAX)
}

impl PmAction for SimDriver {
    fn action(&self, action: Action) -> ActionResult {
        let failure = match action {
            Action::Suspend => self.fail_suspend,
            Action::Resume => self.fail_resume,
            Action::TurnOff => None,
        };
        match failure {
            Some(code) => {
                log::info!("{}: refusing {action:?}", self.name);
                Err(errno(code))
            }
            None => {
                log::info!("{}: {action:?}", self.name);
                Ok(())
            }
        }
    }
}

pub fn build_device(param: &DeviceParam) -> Result<Device> {
    let pm = if param.unmanaged {
        DevicePm::unmanaged()
    } else {
        DevicePm::new(SimDriver {
            name: param.name.clone(),
            fail_suspend: param.fail_suspend,
            fail_resume: param.fail_resume,
        })
    };
    let pm = if param.wakeup_capable || param.wakeup {
        pm.wakeup_capable()
    } else {
        pm
    };
    let dev = Device::new(param.name.as_str(), pm);
    if param.wakeup && !dev.wakeup_enable(true) {
        log::warn!("{}: cannot enable wakeup", param.name);
    }
    if param.busy {
        dev.busy_set();
    }
    if param.off {
        dev.set_state(DeviceState::Off)
            .context(error::TurnOff { name: &param.name })?;
    }
    Ok(dev)
}

struct LogNotifier;

impl Notifier for LogNotifier {
    fn state_entry(&self, state: PowerState) {
        log::info!("entering {state}");
    }

    fn state_exit(&self, state: PowerState) {
        log::info!("leaving {state}");
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// State entered by every cycle.
    pub entered: Vec<PowerState>,
    /// Non-zero statistics with their export names.
    pub stats: Vec<(String, StateStats)>,
}

pub struct Simulation {
    clock: Arc<SimClock>,
    pm: PowerManager<SimKernel, ScriptedPolicy>,
}

impl Simulation {
    pub fn new(
        config: PmConfig,
        states: Vec<PowerStateInfo>,
        devices: &[DeviceParam],
        cycles_per_tick: u32,
    ) -> Result<Self> {
        let clock = Arc::new(SimClock::new(cycles_per_tick));
        let entry = {
            let clock = clock.clone();
            move |info: &PowerStateInfo| {
                let ticks = clock.sleep();
                log::info!("slept {ticks} ticks in {}", info.state);
            }
        };
        let hooks = PlatformHooks {
            entry: Some(Box::new(entry)),
            exit: None,
        };
        let table = devices
            .iter()
            .map(build_device)
            .collect::<Result<DeviceTable>>()?;
        let pm = PowerManager::new(
            config,
            SimKernel(clock.clone()),
            ScriptedPolicy::new(states),
            hooks,
            table,
        );
        pm.notifiers().register(Arc::new(LogNotifier));
        Ok(Simulation { clock, pm })
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn run(&self, cycles: u32, deadline: Deadline, force: Option<PowerStateInfo>) -> Report {
        let mut report = Report::default();
        for cycle in 0..cycles {
            let state = self.pm.system_suspend(deadline);
            log::debug!("cycle {cycle}: {state}");
            report.entered.push(state);
        }
        if let Some(info) = force {
            self.pm.force_state(info);
        }
        if let Some(stats) = self.pm.stats() {
            report.stats = stats
                .snapshot()
                .into_iter()
                .filter(|(_, s)| s.count > 0)
                .collect();
        }
        report
    }
}
