/// Condition generator — one seeded, single-pass resolution of every axis.
///
/// Axes are visited in canonical order. Earlier commitments restrict later
/// axes through the exclusion table; nothing is ever revisited, so a
/// configuration that needs backtracking reports as unsatisfiable.
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::sampler::{self, SamplerError};
use crate::schema::axis::{Axis, AxisError, AxisRegistry};
use crate::schema::condition::{ConditionSet, Overrides};
use crate::schema::exclusion::ExclusionTable;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error("override value '{value}' is not in the domain of axis '{axis}'")]
    UnknownValue { axis: String, value: String },
    #[error("optional inclusion probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error(
        "mandatory axis '{axis}' is unsatisfiable for seed {seed}: \
         {forbidden:?} excluded by {triggers:?}"
    )]
    UnsatisfiableConstraints {
        axis: String,
        seed: u64,
        forbidden: Vec<String>,
        triggers: Vec<(String, String)>,
    },
}

/// Knobs for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Chance that each optional axis is considered at all.
    pub optional_inclusion_probability: f64,
    /// Cap on optional axes included per set, counted separately for each
    /// axis group. Once a group reaches it, its remaining optional axes are
    /// skipped without consuming a draw.
    pub max_optional: Option<usize>,
    pub overrides: Overrides,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            optional_inclusion_probability: 0.5,
            max_optional: None,
            overrides: Overrides::new(),
        }
    }
}

impl GenerationOptions {
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.optional_inclusion_probability = probability;
        self
    }

    pub fn with_max_optional(mut self, max_optional: usize) -> Self {
        self.max_optional = Some(max_optional);
        self
    }

    pub fn with_override(mut self, axis: &str, value: &str) -> Self {
        self.overrides.insert(axis.to_string(), value.to_string());
        self
    }
}

/// Per-call state: the random stream and the accumulating commitments.
/// Lives for exactly one `generate` call.
struct GenerationContext {
    seed: u64,
    rng: StdRng,
    inclusion: Bernoulli,
    chosen: ConditionSet,
    /// Optional axes included so far, keyed by axis group.
    optional_included: FxHashMap<String, usize>,
}

impl GenerationContext {
    fn new(seed: u64, options: &GenerationOptions) -> Result<Self, GenerationError> {
        let probability = options.optional_inclusion_probability;
        let inclusion = Bernoulli::new(probability)
            .map_err(|_| GenerationError::InvalidProbability(probability))?;
        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            inclusion,
            chosen: ConditionSet::default(),
            optional_included: FxHashMap::default(),
        })
    }
}

/// Resolve every axis of `axes` for `seed`.
///
/// Identical seed, axes, exclusions and options always produce the same
/// set. Overrides must name a registered axis and one of its values; they
/// are committed before the pass so they restrict every sampled axis.
pub fn generate(
    seed: u64,
    axes: &AxisRegistry,
    exclusions: &ExclusionTable,
    options: &GenerationOptions,
) -> Result<ConditionSet, GenerationError> {
    let mut ctx = GenerationContext::new(seed, options)?;

    for (axis_name, value) in &options.overrides {
        let axis = axes.get(axis_name)?;
        if !axis.contains(value) {
            return Err(GenerationError::UnknownValue {
                axis: axis_name.clone(),
                value: value.clone(),
            });
        }
        ctx.chosen.insert(axis_name, value);
    }

    let mut resolved = ConditionSet::default();

    for axis in axes.get_axes() {
        if let Some(pinned) = options.overrides.get(axis.name()) {
            tracing::debug!(axis = axis.name(), value = %pinned, "pinned by override");
            resolved.insert(axis.name(), pinned);
            continue;
        }

        if !axis.is_mandatory() && !include_optional(&mut ctx, axis, options) {
            continue;
        }

        let forbidden = exclusions.blocked_values_for(&ctx.chosen, axis);
        match sampler::choose(axis, &forbidden, &mut ctx.rng) {
            Ok(value) => {
                tracing::debug!(axis = axis.name(), value, "resolved");
                ctx.chosen.insert(axis.name(), value);
                resolved.insert(axis.name(), value);
                if !axis.is_mandatory() {
                    *ctx.optional_included.entry(group_of(axis).to_string()).or_default() += 1;
                }
            }
            Err(SamplerError::DomainExhausted { .. }) if !axis.is_mandatory() => {
                tracing::debug!(
                    axis = axis.name(),
                    ?forbidden,
                    "optional axis exhausted, skipped"
                );
            }
            Err(SamplerError::DomainExhausted { forbidden, .. }) => {
                return Err(unsatisfiable(&ctx, exclusions, axis, forbidden));
            }
        }
    }

    Ok(resolved)
}

fn group_of(axis: &Axis) -> &str {
    axis.group().unwrap_or_default()
}

fn include_optional(
    ctx: &mut GenerationContext,
    axis: &Axis,
    options: &GenerationOptions,
) -> bool {
    let included = ctx
        .optional_included
        .get(group_of(axis))
        .copied()
        .unwrap_or(0);
    if options.max_optional.is_some_and(|max| included >= max) {
        tracing::debug!(
            axis = axis.name(),
            group = group_of(axis),
            "optional cap reached, skipped"
        );
        return false;
    }

    let include = ctx.inclusion.sample(&mut ctx.rng);
    if !include {
        tracing::debug!(axis = axis.name(), "optional axis left out");
    }
    include
}

fn unsatisfiable(
    ctx: &GenerationContext,
    exclusions: &ExclusionTable,
    axis: &Axis,
    forbidden: Vec<String>,
) -> GenerationError {
    let triggers = exclusions.triggers_for(&ctx.chosen, axis);
    tracing::debug!(
        axis = axis.name(),
        seed = ctx.seed,
        ?triggers,
        "mandatory axis exhausted"
    );
    GenerationError::UnsatisfiableConstraints {
        axis: axis.name().to_string(),
        seed: ctx.seed,
        forbidden,
        triggers,
    }
}
