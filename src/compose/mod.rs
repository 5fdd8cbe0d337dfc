//! Porter-Duff compositing rule algebra and coverage masks.

pub mod rule;
