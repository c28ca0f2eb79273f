//! Bounded on-disk photo retention.
//!
//! Uploaded photos are written to a flat directory of `.jpg` files and
//! tracked newest-first in a [`PhotoBuffer`]. Once the buffer reaches its
//! capacity, every new photo evicts the oldest one, both from memory and
//! from disk.
//!
//! ```text
//!   upload ──► store() ──► write file ──► rotate()
//!                                           │
//!                    ┌──────────────────────┘
//!                    ▼
//!   [0] newest  [1]  [2]  [3]  [4] oldest ──► evicted + deleted
//! ```

mod buffer;

pub use buffer::{PhotoBuffer, PhotoEntry, DEFAULT_PHOTO_CAPACITY, PHOTO_EXTENSION};
