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
#[path = "suspend_test.rs"]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::{Device, DeviceState, DeviceTable, Error, Result};

/// Suspends and resumes every device of a [`DeviceTable`] in dependency
/// order.
#[derive(Debug)]
pub struct Devices {
    table: DeviceTable,
    suspended: Mutex<Vec<Arc<Device>>>,
}

impl Devices {
    pub fn new(table: DeviceTable) -> Self {
        let suspended = Vec::with_capacity(table.len());
        Devices {
            table,
            suspended: Mutex::new(suspended),
        }
    }

    pub fn table(&self) -> &DeviceTable {
        &self.table
    }

    /// Number of devices suspended by the last pass and not resumed yet.
    pub fn num_suspended(&self) -> usize {
        self.suspended.lock().len()
    }

    /// Suspends all devices, last registered first.
    ///
    /// Busy and wakeup-enabled devices are left alone, so are devices that
    /// have nothing to do. The first other failure stops the pass. Devices
    /// suspended before the failure stay suspended; the caller unwinds them
    /// with [`Devices::resume_all`]. Devices left over from a pass that was
    /// never resumed stay recorded and get resumed after this pass.
    pub fn suspend_all(&self) -> Result<()> {
        let suspended = &mut *self.suspended.lock();
        if !suspended.is_empty() {
            log::warn!(
                "{} device(s) from a previous pass are still suspended",
                suspended.len()
            );
        }
        let target = DeviceState::Suspended;
        for dev in self.table.iter().rev() {
            if dev.is_busy() || dev.is_wakeup_enabled() {
                continue;
            }
            match dev.set_state(target) {
                Ok(()) => suspended.push(dev.clone()),
                Err(
                    Error::Unsupported { .. }
                    | Error::NotSupportedTransition { .. }
                    | Error::AlreadyInState { .. },
                ) => continue,
                Err(e) => {
                    log::error!("{}: did not enter {target} state: {e}", dev.name());
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Resumes the devices of the last suspend pass in reverse order.
    ///
    /// A device failing to resume does not stop the others.
    pub fn resume_all(&self) {
        let suspended = &mut *self.suspended.lock();
        for dev in suspended.drain(..).rev() {
            if let Err(e) = dev.set_state(DeviceState::Active) {
                log::error!("{}: did not enter {} state: {e}", dev.name(), DeviceState::Active);
            }
        }
    }
}
