//! Trade decisions from forecast direction and news sentiment, plus the
//! async service that wires every engine together.

pub mod config;
pub mod rules;
pub mod service;


pub use config::DsfmConfig;
pub use rules::{signal_for, DecisionEngine, DecisionSignal, Signal, HISTORY_WINDOW};
pub use service::DsfmService;
