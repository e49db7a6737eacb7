// =============================================================================
// Signals Module
// =============================================================================
//
// Threshold classification of the latest observation against its volatility
// envelope. The buy and sell axes are evaluated independently; with a
// consistent band convention (upper >= lower) they can never fire together.

pub mod bands;

pub use bands::{evaluate_bands, BandSignals, SignalKind};
