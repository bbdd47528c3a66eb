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

use std::ops::Deref;
use std::sync::Arc;

use crate::device::Device;

/// All devices known to the system, in registration order.
///
/// Index 0 is the first registered device. A suspend pass walks the table
/// from the end, so index 0 is suspended last and resumed first. Devices
/// are registered parents before children, which makes children suspend
/// before the devices they depend on.
#[derive(Debug, Default)]
pub struct DeviceTable {
    devices: Box<[Arc<Device>]>,
}

impl DeviceTable {
    pub fn new(devices: Vec<Arc<Device>>) -> Self {
        DeviceTable {
            devices: devices.into_boxed_slice(),
        }
    }

    /// Whether any managed device has asked not to be suspended.
    pub fn is_any_busy(&self) -> bool {
        self.devices.iter().any(|dev| dev.is_busy())
    }

    pub fn find(&self, name: &str) -> Option<&Arc<Device>> {
        self.devices.iter().find(|dev| dev.name() == name)
    }
}

impl Deref for DeviceTable {
    type Target = [Arc<Device>];

    fn deref(&self) -> &Self::Target {
        &self.devices
    }
}

impl FromIterator<Arc<Device>> for DeviceTable {
    fn from_iter<T: IntoIterator<Item = Arc<Device>>>(iter: T) -> Self {
        DeviceTable::new(iter.into_iter().collect())
    }
}

impl FromIterator<Device> for DeviceTable {
    fn from_iter<T: IntoIterator<Item = Device>>(iter: T) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}
