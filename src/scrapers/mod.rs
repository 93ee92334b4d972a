//! Archive scrapers.
//!
//! | Module | Source pages | Method |
//! |--------|--------------|--------|
//! | [`issues`] | yearly issue index pages | regex scan over raw HTML |
//!
//! Scrapers take their fetcher and collector as arguments and keep no state
//! of their own between runs.

pub mod issues;
