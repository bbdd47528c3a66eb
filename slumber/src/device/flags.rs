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
#[path = "flags_test.rs"]
mod tests;

use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;

bitflags! {
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PmFlags: u32 {
        /// The device asked not to be suspended.
        const BUSY = 1 << 0;
        /// A state change is in progress.
        const TRANSITIONING = 1 << 1;
        /// The device can wake the system up.
        const WAKEUP_CAPABLE = 1 << 2;
        /// The device is configured to wake the system up.
        const WAKEUP_ENABLED = 1 << 3;
    }
}

/// A [`PmFlags`] word that can be updated from any context without a lock.
#[derive(Debug, Default)]
pub struct AtomicPmFlags(AtomicU32);

impl AtomicPmFlags {
    pub const fn new(flags: PmFlags) -> Self {
        AtomicPmFlags(AtomicU32::new(flags.bits()))
    }

    pub fn get(&self) -> PmFlags {
        PmFlags::from_bits_retain(self.0.load(Ordering::Acquire))
    }

    pub fn test(&self, flags: PmFlags) -> bool {
        self.get().contains(flags)
    }

    /// Sets `flags` and returns the previous word.
    pub fn set(&self, flags: PmFlags) -> PmFlags {
        PmFlags::from_bits_retain(self.0.fetch_or(flags.bits(), Ordering::AcqRel))
    }

    /// Clears `flags` and returns the previous word.
    pub fn clear(&self, flags: PmFlags) -> PmFlags {
        PmFlags::from_bits_retain(self.0.fetch_and(!flags.bits(), Ordering::AcqRel))
    }

    /// Replaces the whole word with `new` if it still equals `current`.
    ///
    /// On failure returns the value actually found.
    pub fn compare_exchange(&self, current: PmFlags, new: PmFlags) -> Result<PmFlags, PmFlags> {
        self.0
            .compare_exchange(
                current.bits(),
                new.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(PmFlags::from_bits_retain)
            .map_err(PmFlags::from_bits_retain)
    }
}
