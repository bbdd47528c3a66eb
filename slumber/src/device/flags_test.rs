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

use assert_matches::assert_matches;

use crate::device::flags::{AtomicPmFlags, PmFlags};

#[test]
fn test_set_clear() {
    let flags = AtomicPmFlags::new(PmFlags::WAKEUP_CAPABLE);

    assert_eq!(flags.set(PmFlags::BUSY), PmFlags::WAKEUP_CAPABLE);
    assert!(flags.test(PmFlags::BUSY | PmFlags::WAKEUP_CAPABLE));

    assert_eq!(
        flags.clear(PmFlags::BUSY),
        PmFlags::BUSY | PmFlags::WAKEUP_CAPABLE
    );
    assert!(!flags.test(PmFlags::BUSY));
    assert_eq!(flags.get(), PmFlags::WAKEUP_CAPABLE);
}

#[test]
fn test_compare_exchange() {
    let flags = AtomicPmFlags::default();
    let enabled = PmFlags::WAKEUP_CAPABLE | PmFlags::WAKEUP_ENABLED;

    assert_matches!(
        flags.compare_exchange(PmFlags::WAKEUP_CAPABLE, enabled),
        Err(f) if f.is_empty()
    );

    flags.set(PmFlags::WAKEUP_CAPABLE);
    assert_matches!(
        flags.compare_exchange(PmFlags::WAKEUP_CAPABLE, enabled),
        Ok(f) if f == PmFlags::WAKEUP_CAPABLE
    );
    assert_eq!(flags.get(), enabled);
}
