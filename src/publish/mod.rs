//! Release publishing: resolve the target, find the release, upload staged files.

mod publisher;

pub use publisher::{ProjectPaths, Publisher, publish};
