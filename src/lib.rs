//! heartcheck - heart health risk checker
//!
//! Turns plain-language lifestyle answers into the 13 clinical features a
//! heart disease classifier expects, scores them with a tree ensemble, and
//! trains that ensemble from a labeled CSV.

pub mod answers;
pub mod classifier;
pub mod clinical;
pub mod config;
pub mod reporters;
