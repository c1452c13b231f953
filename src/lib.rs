//! Condition Engine — deterministic sampling of weighted attribute conditions.
//!
//! Generates coherent combinations of categorical attributes (physique,
//! wealth, facial signal, ...) from weighted axis domains under
//! mandatory/optional policies and pairwise exclusion rules, and renders
//! them as prompt fragments. The same seed and tables always produce the
//! same conditions.

pub mod catalog;
pub mod core;
pub mod schema;

pub use crate::catalog::ConditionKind;
pub use crate::core::generator::{generate, GenerationError, GenerationOptions};
pub use crate::core::pipeline::{ConditionEngine, EngineError};
pub use crate::core::render::{render, render_canonical, RenderError};
pub use crate::schema::axis::{Axis, AxisError, AxisRegistry, MergeOrder, Placement};
pub use crate::schema::condition::{ConditionSet, Overrides};
pub use crate::schema::exclusion::{ExclusionError, ExclusionRule, ExclusionTable};
