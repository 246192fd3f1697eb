//! Slot grid extractor orchestrating the whole inference for one photograph.
//!
//! Overview
//! - Picks a highlight threshold (explicit, or estimated from the value
//!   histogram minus a bias) and asks the region detector for candidates,
//!   stepping the threshold down when fewer than two are found.
//! - Consolidates candidates into button strips and assigns slot heights.
//! - Analyses every strip's profile in parallel to locate its separators.
//! - Resolves the machine-wide column layout and builds drink and price
//!   rectangles for every accepted row, optionally trimming drink
//!   rectangles to their containers.
//!
//! Modules
//! - [`params`] – configuration types used by the extractor and CLI.
//! - `pipeline` – the main [`SlotGridExtractor`] implementation.

pub mod params;
mod pipeline;

pub use params::{
    ConsensusOptions, ConsolidationOptions, DetectionOptions, ExtractorParams, RectOptions,
    SeparatorOptions,
};
pub use pipeline::SlotGridExtractor;
