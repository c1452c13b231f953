/// The condition engine: tables + options, built once and shared.
///
/// Wires together table loading and merging, exclusion validation,
/// generation and rendering.
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{self, ConditionKind};
use crate::core::generator::{self, GenerationError, GenerationOptions};
use crate::core::render;
use crate::schema::axis::{AxisError, AxisRegistry, MergeOrder};
use crate::schema::condition::{ConditionSet, Overrides};
use crate::schema::exclusion::{ExclusionError, ExclusionTable};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("axis error: {0}")]
    Axis(#[from] AxisError),
    #[error("exclusion error: {0}")]
    Exclusion(#[from] ExclusionError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Read-only after `build()`; every call owns its own random stream, so
/// one engine can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct ConditionEngine {
    registry: AxisRegistry,
    exclusions: ExclusionTable,
    options: GenerationOptions,
}

/// Builder for constructing a `ConditionEngine`.
#[derive(Debug, Default)]
pub struct ConditionEngineBuilder {
    kind: Option<ConditionKind>,
    axes_files: Vec<PathBuf>,
    exclusions_files: Vec<PathBuf>,
    merge_order: MergeOrder,
    optional_probability: Option<f64>,
    max_optional: Option<usize>,
    /// Directly provided registry (for testing without files).
    registry: Option<AxisRegistry>,
    /// Directly provided exclusions (for testing without files).
    exclusions: Option<ExclusionTable>,
}

impl ConditionEngine {
    pub fn builder() -> ConditionEngineBuilder {
        ConditionEngineBuilder::default()
    }

    pub fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    pub fn exclusions(&self) -> &ExclusionTable {
        &self.exclusions
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Generate a condition set for `seed`.
    pub fn generate(&self, seed: u64) -> Result<ConditionSet, EngineError> {
        Ok(generator::generate(
            seed,
            &self.registry,
            &self.exclusions,
            &self.options,
        )?)
    }

    /// Generate with some axes pinned by the caller.
    pub fn generate_with(
        &self,
        seed: u64,
        overrides: &Overrides,
    ) -> Result<ConditionSet, EngineError> {
        let mut options = self.options.clone();
        options
            .overrides
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(generator::generate(
            seed,
            &self.registry,
            &self.exclusions,
            &options,
        )?)
    }

    /// Generate multiple sets from consecutive seeds starting at `seed`.
    pub fn generate_variants(
        &self,
        seed: u64,
        count: usize,
    ) -> Result<Vec<ConditionSet>, EngineError> {
        (0..count as u64)
            .map(|offset| self.generate(seed.wrapping_add(offset)))
            .collect()
    }

    /// Render `set` in canonical axis order.
    pub fn render(&self, set: &ConditionSet) -> String {
        render::render_canonical(set, &self.registry)
    }

    /// Generate and render in one step.
    pub fn prompt(&self, seed: u64) -> Result<String, EngineError> {
        Ok(self.render(&self.generate(seed)?))
    }

    pub fn prompt_with(&self, seed: u64, overrides: &Overrides) -> Result<String, EngineError> {
        Ok(self.render(&self.generate_with(seed, overrides)?))
    }
}

impl ConditionEngineBuilder {
    /// Start from a built-in catalog. Character tables also cap optional
    /// axes at `catalog::MAX_OPTIONAL` per table unless `max_optional` says
    /// otherwise.
    pub fn kind(mut self, kind: ConditionKind) -> Self {
        self.kind = Some(kind);
        if matches!(kind, ConditionKind::Character | ConditionKind::Both) {
            self.max_optional = self.max_optional.or(Some(catalog::MAX_OPTIONAL));
        }
        self
    }

    /// Append axes from a RON file after the current ones.
    pub fn axes_file(mut self, path: impl AsRef<Path>) -> Self {
        self.axes_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Union exclusion rules from a RON file into the table.
    pub fn exclusions_file(mut self, path: impl AsRef<Path>) -> Self {
        self.exclusions_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn merge_order(mut self, order: MergeOrder) -> Self {
        self.merge_order = order;
        self
    }

    pub fn optional_probability(mut self, probability: f64) -> Self {
        self.optional_probability = Some(probability);
        self
    }

    pub fn max_optional(mut self, max_optional: usize) -> Self {
        self.max_optional = Some(max_optional);
        self
    }

    /// Provide a registry directly (for testing without files).
    pub fn with_registry(mut self, registry: AxisRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Provide exclusions directly (for testing without files).
    pub fn with_exclusions(mut self, exclusions: ExclusionTable) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    pub fn build(self) -> Result<ConditionEngine, EngineError> {
        let (catalog_axes, catalog_exclusions) = match self.kind {
            Some(kind) => catalog::tables(kind)?,
            None => (AxisRegistry::default(), ExclusionTable::default()),
        };

        let mut registry = match self.registry {
            Some(registry) => AxisRegistry::merge(&catalog_axes, &registry, &MergeOrder::new())?,
            None => catalog_axes,
        };
        let mut exclusions = match self.exclusions {
            Some(exclusions) => {
                ExclusionTable::merge(&catalog_exclusions, &exclusions, &ExclusionTable::default())
            }
            None => catalog_exclusions,
        };

        for path in &self.axes_files {
            let loaded = AxisRegistry::load_from_ron(path)?;
            tracing::debug!(path = %path.display(), axes = loaded.len(), "loaded axes");
            registry = AxisRegistry::merge(&registry, &loaded, &MergeOrder::new())?;
        }

        if !self.merge_order.placements.is_empty() {
            registry = AxisRegistry::merge(&registry, &AxisRegistry::default(), &self.merge_order)?;
        }

        for path in &self.exclusions_files {
            let loaded = ExclusionTable::load_from_ron(path)?;
            tracing::debug!(path = %path.display(), rules = loaded.len(), "loaded exclusions");
            exclusions = ExclusionTable::merge(&exclusions, &loaded, &ExclusionTable::default());
        }

        exclusions.validate(&registry)?;

        let mut options = GenerationOptions::default();
        if let Some(probability) = self.optional_probability {
            if !(0.0..=1.0).contains(&probability) {
                return Err(GenerationError::InvalidProbability(probability).into());
            }
            options.optional_inclusion_probability = probability;
        }
        options.max_optional = self.max_optional;

        tracing::info!(
            axes = registry.len(),
            rules = exclusions.len(),
            probability = options.optional_inclusion_probability,
            max_optional = ?options.max_optional,
            "condition engine ready"
        );

        Ok(ConditionEngine {
            registry,
            exclusions,
            options,
        })
    }
}
