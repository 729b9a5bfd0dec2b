//! Subtrans - SubRip Subtitle Translation
//!
//! Rewrites the text lines of an `.srt` file into another language with the
//! translate-shell utility, leaving cue numbers and timings untouched and
//! keeping the original file as a backup.

pub mod cli;
pub mod config;
pub mod error;
pub mod progress;
pub mod subtitle;
pub mod translate;
pub mod workflow;
