pub use engine::{EloChange, RatingConfig, RatingEngine, Rounding, SUB_MATCH_COUNT};
pub use outcome::{FanFactionSetting, GameOutcome, PlayerResult};

mod engine;
mod outcome;
