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

mod errors;

use proc_macro::TokenStream;

/// Adds an implicit `_location: snafu::Location` field to every variant of a
/// snafu error enum and marks fields named `source` as the error source.
///
/// A `source: Box<T>` field is converted from `T` automatically.
#[proc_macro_attribute]
pub fn trace_error(attr: TokenStream, item: TokenStream) -> TokenStream {
    errors::trace_error(attr, item)
}

/// Implements `DebugTrace` and a `Debug` that prints the numbered chain of
/// causes together with their source locations.
///
/// The `DebugTrace` trait must be in scope at the derive site.
#[proc_macro_derive(DebugTrace)]
pub fn derive_debug_trace(input: TokenStream) -> TokenStream {
    errors::derive_debug_trace(input)
}
