//! Filesystem primitives shared by the mirror passes and the manifest.

pub mod atomic;
pub mod content;
pub mod diff;
pub mod listing;

pub use content::{ContentDigest, files_identical, hash_file};
pub use diff::{Obstruction, TreeDiff, diff_listings};
pub use listing::{Listing, ListingEntry};
