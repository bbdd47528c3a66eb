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
#[path = "notifier_test.rs"]
mod tests;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use snafu::Snafu;

use crate::errors::{DebugTrace, trace_error};
use crate::state::PowerState;

#[trace_error]
#[derive(Snafu, DebugTrace)]
#[snafu(module, context(suffix(false)))]
pub enum Error {
    #[snafu(display("Notifier is not registered"))]
    NotFound,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Observer of system power state transitions.
///
/// Callbacks run with the registry lock held and must not register or
/// unregister notifiers.
pub trait Notifier: Send + Sync {
    fn state_entry(&self, _state: PowerState) {}
    fn state_exit(&self, _state: PowerState) {}
}

#[derive(Default)]
pub struct Notifiers {
    list: Mutex<Vec<Arc<dyn Notifier>>>,
}

impl fmt::Debug for Notifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifiers")
            .field("len", &self.list.lock().len())
            .finish()
    }
}

fn same_notifier(a: &Arc<dyn Notifier>, b: &Arc<dyn Notifier>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

impl Notifiers {
    /// Appends `notifier`. Registering the same notifier twice makes it run
    /// twice.
    pub fn register(&self, notifier: Arc<dyn Notifier>) {
        self.list.lock().push(notifier);
    }

    /// Removes the first registration of `notifier`.
    pub fn unregister(&self, notifier: &Arc<dyn Notifier>) -> Result<()> {
        let mut list = self.list.lock();
        let Some(index) = list.iter().position(|n| same_notifier(n, notifier)) else {
            return error::NotFound.fail();
        };
        list.remove(index);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the entry or exit callback of every notifier in registration
    /// order.
    pub fn notify(&self, entering: bool, state: PowerState) {
        let list = self.list.lock();
        for notifier in list.iter() {
            if entering {
                notifier.state_entry(state);
            } else {
                notifier.state_exit(state);
            }
        }
    }
}
