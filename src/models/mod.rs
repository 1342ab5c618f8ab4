pub mod battler;
pub mod content;
