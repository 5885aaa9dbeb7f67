//! The tools module provides several helper functions for the codec.
//!
//! The tools are:
//! - cli: Command line interface.
//! - freq_count: Frequency models, counted from data or read from a frequency list.
//! - report: Code table printout for the table command.
//!
pub mod cli;
pub mod freq_count;
pub mod report;
