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

pub mod flags;
pub mod suspend;
pub mod table;
#[cfg(test)]
pub(crate) mod test;

#[cfg(test)]
#[path = "device_test.rs"]
mod tests;

use std::fmt::{self, Display};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use snafu::Snafu;

use crate::errors::{DebugTrace, trace_error};

use self::flags::{AtomicPmFlags, PmFlags};

pub use self::suspend::Devices;
pub use self::table::DeviceTable;

#[trace_error]
#[derive(Snafu, DebugTrace)]
#[snafu(module, visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    #[snafu(display("Device power management is not supported"))]
    Unsupported,
    #[snafu(display("Device is in the middle of a transition"))]
    Busy,
    #[snafu(display("Device is already {state}"))]
    AlreadyInState { state: DeviceState },
    #[snafu(display("Device cannot go from {from} to {to}"))]
    NotSupportedTransition { from: DeviceState, to: DeviceState },
    #[snafu(display("Driver failed with code {code}"))]
    Driver { code: i32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceState {
    Active = 0,
    Suspended = 1,
    Off = 2,
}

impl DeviceState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => DeviceState::Active,
            1 => DeviceState::Suspended,
            _ => DeviceState::Off,
        }
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceState::Active => "active",
            DeviceState::Suspended => "suspended",
            DeviceState::Off => "off",
        };
        f.write_str(s)
    }
}

/// What a driver is asked to do with its hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Suspend,
    Resume,
    TurnOff,
}

impl Action {
    /// Derives the action moving a device from `current` to `target`.
    pub fn for_transition(current: DeviceState, target: DeviceState) -> Result<Action> {
        match (current, target) {
            (current, target) if current == target => {
                error::AlreadyInState { state: current }.fail()
            }
            (DeviceState::Off, DeviceState::Suspended) => error::NotSupportedTransition {
                from: current,
                to: target,
            }
            .fail(),
            (_, DeviceState::Suspended) => Ok(Action::Suspend),
            (_, DeviceState::Active) => Ok(Action::Resume),
            (_, DeviceState::Off) => Ok(Action::TurnOff),
        }
    }
}

/// An errno-like code reported by a driver.
pub type ActionResult = std::result::Result<(), i32>;

/// Driver side of device power management.
pub trait PmAction: Send + Sync {
    fn action(&self, action: Action) -> ActionResult;
}

impl<F> PmAction for F
where
    F: Fn(Action) -> ActionResult + Send + Sync,
{
    fn action(&self, action: Action) -> ActionResult {
        self(action)
    }
}

/// Power management state embedded in every device.
///
/// A device without an action callback is not managed: every state
/// operation reports [`Error::Unsupported`] and every flag reads false.
pub struct DevicePm {
    state: AtomicU8,
    flags: AtomicPmFlags,
    action: Option<Box<dyn PmAction>>,
}

impl DevicePm {
    pub fn new(action: impl PmAction + 'static) -> Self {
        DevicePm {
            state: AtomicU8::new(DeviceState::Active as u8),
            flags: AtomicPmFlags::new(PmFlags::empty()),
            action: Some(Box::new(action)),
        }
    }

    pub fn unmanaged() -> Self {
        DevicePm {
            state: AtomicU8::new(DeviceState::Active as u8),
            flags: AtomicPmFlags::new(PmFlags::empty()),
            action: None,
        }
    }

    /// Marks the device as able to wake the system up.
    pub fn wakeup_capable(self) -> Self {
        self.flags.set(PmFlags::WAKEUP_CAPABLE);
        self
    }

    fn is_managed(&self) -> bool {
        self.action.is_some()
    }
}

/// Clears `TRANSITIONING` when a state change finishes, whatever the
/// outcome.
struct Transition<'a>(&'a AtomicPmFlags);

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        self.0.clear(PmFlags::TRANSITIONING);
    }
}

pub struct Device {
    name: Arc<str>,
    pm: DevicePm,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("state", &DeviceState::from_raw(self.pm.state.load(Ordering::Acquire)))
            .field("flags", &self.pm.flags.get())
            .field("managed", &self.pm.is_managed())
            .finish()
    }
}

impl Device {
    pub fn new(name: impl Into<Arc<str>>, pm: DevicePm) -> Self {
        Device {
            name: name.into(),
            pm,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Result<DeviceState> {
        if !self.pm.is_managed() {
            return error::Unsupported.fail();
        }
        Ok(DeviceState::from_raw(self.pm.state.load(Ordering::Acquire)))
    }

    /// Moves the device to `target` through its driver.
    ///
    /// The new state is committed only if the driver succeeds. A concurrent
    /// caller observes [`Error::Busy`] and is expected to retry on its own.
    pub fn set_state(&self, target: DeviceState) -> Result<()> {
        let Some(driver) = &self.pm.action else {
            return error::Unsupported.fail();
        };
        let prev = self.pm.flags.set(PmFlags::TRANSITIONING);
        if prev.contains(PmFlags::TRANSITIONING) {
            return error::Busy.fail();
        }
        let _transition = Transition(&self.pm.flags);

        let current = DeviceState::from_raw(self.pm.state.load(Ordering::Acquire));
        let action = Action::for_transition(current, target)?;
        log::trace!("{}: {current} -> {target}", self.name);
        if let Err(code) = driver.action(action) {
            return error::Driver { code }.fail();
        }
        self.pm.state.store(target as u8, Ordering::Release);
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        self.pm.is_managed() && self.pm.flags.test(PmFlags::BUSY)
    }

    pub fn busy_set(&self) {
        if self.pm.is_managed() {
            self.pm.flags.set(PmFlags::BUSY);
        }
    }

    pub fn busy_clear(&self) {
        if self.pm.is_managed() {
            self.pm.flags.clear(PmFlags::BUSY);
        }
    }

    /// Enables or disables the device as a wakeup source.
    ///
    /// Fails if the device is not wakeup capable, or if the flag word
    /// changed under a concurrent update, in which case the caller may
    /// retry.
    pub fn wakeup_enable(&self, enable: bool) -> bool {
        if !self.pm.is_managed() {
            return false;
        }
        let flags = self.pm.flags.get();
        if !flags.contains(PmFlags::WAKEUP_CAPABLE) {
            return false;
        }
        let mut new_flags = flags;
        new_flags.set(PmFlags::WAKEUP_ENABLED, enable);
        self.pm.flags.compare_exchange(flags, new_flags).is_ok()
    }

    pub fn is_wakeup_enabled(&self) -> bool {
        self.pm.is_managed() && self.pm.flags.test(PmFlags::WAKEUP_ENABLED)
    }

    pub fn is_wakeup_capable(&self) -> bool {
        self.pm.is_managed() && self.pm.flags.test(PmFlags::WAKEUP_CAPABLE)
    }
}
