// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Config handles and the access helpers built on them.
//!
//! A [`ConfigHandle`] wraps one loaded tree plus its provenance. Handles
//! are immutable; merging or editing produces a new handle.

mod handle;
mod scoped;
mod sections;

pub use handle::{ConfigHandle, RawSource};
pub use scoped::{ConfigExposure, ScopedConfig};
pub use sections::{ConfigSections, SectionScope};
