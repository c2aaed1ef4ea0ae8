//! Linguistic processing utilities.
//!
//! This crate splits narration text into sentence spans and word spans whose
//! offsets point back into the original string, so highlighting and playback
//! agree on where every sentence and word lives.

pub mod segmenter;
pub mod words;

pub use crate::segmenter::*;
pub use crate::words::*;
