pub mod escalation;

pub use escalation::*;
