pub mod combo;
pub mod delta;
pub mod diagnostics;
pub mod engine;
pub mod event;
pub mod judgment;
pub mod replay;
pub mod session;
pub mod summary;
pub mod timing_stats;
