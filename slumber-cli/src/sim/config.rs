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

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Help)]
pub struct DeviceParam {
    /// Name of the device.
    pub name: String,
    /// The driver has no power management support. [default: false]
    #[serde(default)]
    pub unmanaged: bool,
    /// The device can wake the system up. [default: false]
    #[serde(default)]
    pub wakeup_capable: bool,
    /// Enable the device as a wakeup source. Implies wakeup_capable.
    /// [default: false]
    #[serde(default)]
    pub wakeup: bool,
    /// Keep the device busy so that it is never suspended. [default: false]
    #[serde(default)]
    pub busy: bool,
    /// Turn the device off before the first cycle. [default: false]
    #[serde(default)]
    pub off: bool,
    /// Error number the driver reports when asked to suspend.
    pub fail_suspend: Option<u32>,
    /// Error number the driver reports when asked to resume.
    pub fail_resume: Option<u32>,
}
