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
use std::sync::atomic::{AtomicU32, Ordering};

use crate::device::test::EventLog;
use crate::hal::{IrqKey, Kernel, Policy};
use crate::state::{Deadline, PowerStateInfo};

pub const FAKE_IRQ_KEY: IrqKey = IrqKey(0x5a);

#[derive(Debug, Clone)]
pub struct FakeKernel {
    pub log: EventLog,
    pub cycles: Arc<AtomicU32>,
    pub cpu: usize,
}

impl FakeKernel {
    pub fn new(log: &EventLog) -> Self {
        FakeKernel {
            log: log.clone(),
            cycles: Arc::default(),
            cpu: 0,
        }
    }

    pub fn advance(&self, cycles: u32) {
        self.cycles.fetch_add(cycles, Ordering::AcqRel);
    }
}

impl Kernel for FakeKernel {
    fn irq_lock(&self) -> IrqKey {
        self.log.push("irq_lock");
        FAKE_IRQ_KEY
    }

    fn irq_unlock(&self, key: IrqKey) {
        self.log.push(format!("irq_unlock:{:#x}", key.0));
    }

    fn sched_lock(&self) {
        self.log.push("sched_lock");
    }

    fn sched_unlock(&self) {
        self.log.push("sched_unlock");
    }

    fn set_timeout_expiry(&self, ticks: u32, idle: bool) {
        self.log.push(format!("timeout:{ticks}:{idle}"));
    }

    fn cycle_get_32(&self) -> u32 {
        self.cycles.load(Ordering::Acquire)
    }

    fn current_cpu(&self) -> usize {
        self.cpu
    }
}

/// Always answers with the same state.
#[derive(Debug)]
pub struct FixedPolicy {
    pub info: PowerStateInfo,
    pub log: EventLog,
}

impl Policy for FixedPolicy {
    fn next_state(&self, deadline: Deadline) -> PowerStateInfo {
        self.log.push(format!("policy:{deadline:?}"));
        self.info
    }
}
