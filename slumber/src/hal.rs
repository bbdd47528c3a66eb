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

//! Services this crate consumes from the surrounding kernel and platform.

use crate::state::{Deadline, PowerStateInfo};

/// Opaque value returned by [`Kernel::irq_lock`], restoring the previous
/// interrupt state when handed back to [`Kernel::irq_unlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqKey(pub u32);

/// Kernel primitives used around a power state transition.
pub trait Kernel: Send + Sync {
    fn irq_lock(&self) -> IrqKey;
    fn irq_unlock(&self, key: IrqKey);
    fn sched_lock(&self);
    fn sched_unlock(&self);
    /// Programs the system timer to fire `ticks` from now. `idle` is set
    /// when the CPU is about to go to sleep.
    fn set_timeout_expiry(&self, ticks: u32, idle: bool);
    /// Free-running 32-bit cycle counter.
    fn cycle_get_32(&self) -> u32;
    /// Index of the CPU executing the caller.
    fn current_cpu(&self) -> usize;
}

/// Picks the power state to enter given the time until the next event.
pub trait Policy: Send + Sync {
    fn next_state(&self, deadline: Deadline) -> PowerStateInfo;
}

impl<F> Policy for F
where
    F: Fn(Deadline) -> PowerStateInfo + Send + Sync,
{
    fn next_state(&self, deadline: Deadline) -> PowerStateInfo {
        self(deadline)
    }
}

/// Puts the SoC into a power state. Usually returns only once an interrupt
/// wakes the CPU up.
pub trait SleepEntry: Send + Sync {
    fn power_state_set(&self, info: &PowerStateInfo);
}

impl<F> SleepEntry for F
where
    F: Fn(&PowerStateInfo) + Send + Sync,
{
    fn power_state_set(&self, info: &PowerStateInfo) {
        self(info)
    }
}

/// SoC clean-up after leaving a power state. Must leave interrupts
/// unlocked.
pub trait SleepExit: Send + Sync {
    fn exit_post_ops(&self, info: &PowerStateInfo);
}

impl<F> SleepExit for F
where
    F: Fn(&PowerStateInfo) + Send + Sync,
{
    fn exit_post_ops(&self, info: &PowerStateInfo) {
        self(info)
    }
}

/// Optional platform hooks.
///
/// Without `entry`, entering a state does nothing and returns right away.
/// Without `exit`, leaving a state unconditionally unlocks interrupts.
#[derive(Default)]
pub struct PlatformHooks {
    pub entry: Option<Box<dyn SleepEntry>>,
    pub exit: Option<Box<dyn SleepExit>>,
}
