//! Hematology report viewer: decodes the histogram payload embedded in
//! instrument text, reconstructs the volume curve, and derives the
//! closed-form curves and differential shown next to it.

pub mod config;
pub mod data;
pub mod histogram;
