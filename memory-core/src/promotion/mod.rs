//! Promotion pipeline: scoring pending candidates and persisting the ones
//! that clear the bar, on a timer and on events (C6, C7).

pub mod engine;
pub mod triggers;

pub use engine::{Failed, Promoted, PromotionEngine, PromotionRunReport};
pub use triggers::{memory_limit_reached, PeriodicPromotion, TriggerKind};
