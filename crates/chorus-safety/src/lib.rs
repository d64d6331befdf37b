// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safety override layer for the Chorus orchestration engine.
//!
//! Two independent checks may force grounding mode: a synchronous
//! crisis-language screen that runs on every pause, and a periodic
//! distress classification gated by a cooldown.

pub mod distress;
pub mod grounding;
pub mod patterns;

pub use distress::{DistressMonitor, DistressPolicy};
pub use grounding::{GroundingController, GroundingTrigger};
pub use patterns::{detect_crisis_language, normalize};
