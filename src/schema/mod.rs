pub mod axis;
pub mod condition;
pub mod exclusion;
