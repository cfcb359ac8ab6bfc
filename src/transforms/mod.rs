//! Built-in difference transforms.
//!
//! Transforms rewrite or drop differences between the checks and the
//! reporters: [`IgnoreTransform`] drops differences whose code matches
//! configured patterns, [`ReclassifyTransform`] overrides classifications
//! per code. Both are driven purely by configuration and do nothing when
//! their keys are absent.

mod ignore;
mod reclassify;

pub use ignore::{IgnoreTransform, IGNORE_CODES_KEY};
pub use reclassify::{ReclassifyTransform, RECLASSIFY_KEY_PREFIX};
