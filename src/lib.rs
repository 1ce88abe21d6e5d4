pub mod analysis;
pub mod charts;
pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod process;
pub mod report;
