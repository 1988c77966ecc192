//! Entity-scoped and full-model generator invocation.
//!
//! [`EntityRegenerator`] drives the registered generators over either a
//! reduced single-entity project model (incremental) or the whole snapshot
//! (full). It contains no emission logic of its own: the same generators
//! serve both scopes, fed different models.

use std::sync::Arc;

use ag_core::{EntityKey, EntityKind, GeneratorConfig};

use crate::activity::{ActivityEvent, ActivityLog};
use crate::error::RegenError;
use crate::state::CachedModel;
use crate::traits::{GeneratorKind, GeneratorSet};

/// The generator kinds an incremental change to one entity requires.
///
/// Version tokens drive two artifacts (wrapper type and JSON converter);
/// regenerating only the wrapper would leave a stale converter behind.
const fn kinds_for(kind: EntityKind) -> &'static [GeneratorKind] {
    match kind {
        EntityKind::Aggregate => &[GeneratorKind::Aggregates],
        EntityKind::Projection => &[GeneratorKind::Projections],
        EntityKind::InheritedAggregate => &[GeneratorKind::InheritedAggregates],
        EntityKind::VersionToken => {
            &[GeneratorKind::TokenWrappers, GeneratorKind::TokenConverters]
        }
    }
}

/// Runs registered generators against cached models.
#[derive(Debug, Clone)]
pub struct EntityRegenerator {
    generators: Arc<GeneratorSet>,
    config: GeneratorConfig,
}

impl EntityRegenerator {
    /// Creates a regenerator over the given generator set.
    #[must_use]
    pub fn new(generators: Arc<GeneratorSet>, config: GeneratorConfig) -> Self {
        Self { generators, config }
    }

    /// Regenerates one entity in isolation.
    ///
    /// The entity's project is reduced to a model containing only that
    /// entity ([`ag_core::Project::isolated`]) and passed through the
    /// generator(s) for its kind. Returns `Ok(false)` when nothing ran:
    /// the entity vanished from the snapshot, no generator is registered
    /// for its kind, or a non-partial aggregate was skipped (precondition,
    /// not an error).
    ///
    /// # Errors
    ///
    /// Propagates generator failures.
    pub fn regenerate(
        &self,
        model: &CachedModel,
        key: &EntityKey,
        log: &dyn ActivityLog,
    ) -> Result<bool, RegenError> {
        let Some(project) = model.snapshot.project_of(key) else {
            tracing::debug!(entity = %key, "Entity no longer in snapshot, skipping");
            return Ok(false);
        };

        if key.kind == EntityKind::Aggregate {
            let partial = project
                .aggregates
                .iter()
                .find(|a| a.name == key.name)
                .is_some_and(|a| a.flags.partial_class);
            if !partial {
                tracing::trace!(entity = %key, "Non-partial aggregate, skipping");
                return Ok(false);
            }
        }

        let Some(reduced) = project.isolated(key) else {
            return Ok(false);
        };

        let mut ran = false;
        for kind in kinds_for(key.kind) {
            let Some(generator) = self.generators.get(*kind) else {
                continue;
            };
            generator.generate(&reduced, &self.config, &model.solution_dir)?;
            ran = true;
        }

        if ran {
            log.record(ActivityEvent::EntityRegenerated { key: key.clone() });
        }
        Ok(ran)
    }

    /// Regenerates a sorted batch of affected entities.
    ///
    /// After the per-entity passes, one extensions pass runs for every
    /// project containing an affected aggregate or projection: adding or
    /// removing those changes shared registration wiring, inherited
    /// aggregates and version tokens do not. The extensions generator sees
    /// the full project model, not a reduced one.
    ///
    /// # Errors
    ///
    /// A generator failure aborts the remainder of the batch.
    pub fn regenerate_batch(
        &self,
        model: &CachedModel,
        keys: &[EntityKey],
        log: &dyn ActivityLog,
    ) -> Result<usize, RegenError> {
        let mut regenerated = 0;
        for key in keys {
            if self.regenerate(model, key, log)? {
                regenerated += 1;
            }
        }

        if keys.iter().any(|k| k.kind.affects_extensions()) {
            if let Some(generator) = self.generators.get(GeneratorKind::Extensions) {
                for project in &model.snapshot.projects {
                    let affected = keys
                        .iter()
                        .any(|k| k.kind.affects_extensions() && project.contains(k));
                    if affected {
                        generator.generate(project, &self.config, &model.solution_dir)?;
                    }
                }
            }
        }

        Ok(regenerated)
    }

    /// Runs every registered generator kind for every project, in the
    /// fixed full-regeneration order.
    ///
    /// # Errors
    ///
    /// A generator failure aborts the pass.
    pub fn full_pass(&self, model: &CachedModel) -> Result<usize, RegenError> {
        for kind in GeneratorKind::ORDER {
            let Some(generator) = self.generators.get(kind) else {
                continue;
            };
            for project in &model.snapshot.projects {
                generator.generate(project, &self.config, &model.solution_dir)?;
            }
        }
        Ok(model.snapshot.entity_keys().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::NullLog;
    use crate::error::GenerateError;
    use crate::traits::Generator;
    use ag_core::{Aggregate, InheritedAggregate, Project, Projection, Snapshot, VersionToken};
    use camino::{Utf8Path, Utf8PathBuf};
    use parking_lot::Mutex;

    /// Records every invocation: (kind, project name, entity counts).
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct GenCall {
        kind: GeneratorKind,
        project: String,
        aggregates: usize,
        projections: usize,
        inherited: usize,
        tokens: usize,
    }

    struct RecordingGenerator {
        kind: GeneratorKind,
        calls: Arc<Mutex<Vec<GenCall>>>,
    }

    impl Generator for RecordingGenerator {
        fn generate(
            &self,
            project: &Project,
            _config: &GeneratorConfig,
            _solution_dir: &Utf8Path,
        ) -> Result<(), GenerateError> {
            self.calls.lock().push(GenCall {
                kind: self.kind,
                project: project.name.clone(),
                aggregates: project.aggregates.len(),
                projections: project.projections.len(),
                inherited: project.inherited_aggregates.len(),
                tokens: project.version_tokens.len(),
            });
            Ok(())
        }
    }

    fn recording_set() -> (Arc<GeneratorSet>, Arc<Mutex<Vec<GenCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut set = GeneratorSet::new();
        for kind in GeneratorKind::ORDER {
            set = set.with(
                kind,
                Arc::new(RecordingGenerator {
                    kind,
                    calls: Arc::clone(&calls),
                }),
            );
        }
        (Arc::new(set), calls)
    }

    fn shop_model() -> CachedModel {
        CachedModel::new(
            Snapshot::from_projects([Project::new("Shop")
                .with_aggregate(Aggregate::new("Order").with_file("Order.cs").partial())
                .with_aggregate(Aggregate::new("Invoice").with_file("Invoice.cs").partial())
                .with_projection(Projection::new("OrderSummary").with_file("OrderSummary.cs"))
                .with_inherited(InheritedAggregate::new("ArchivedOrder", "Order"))
                .with_version_token(VersionToken::new("OrderV2", "Order"))]),
            Utf8PathBuf::from("/src/Shop"),
        )
    }

    #[test]
    fn test_isolated_regeneration_reduces_model() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let ran = regen
            .regenerate(&model, &EntityKey::aggregate("Order"), &NullLog)
            .unwrap();
        assert!(ran);

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.kind, GeneratorKind::Aggregates);
        assert_eq!(call.aggregates, 1);
        assert_eq!(call.projections, 0);
        assert_eq!(call.inherited, 0);
        assert_eq!(call.tokens, 0);
    }

    #[test]
    fn test_non_partial_aggregate_skipped() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = CachedModel::new(
            Snapshot::from_projects([
                Project::new("Shop").with_aggregate(Aggregate::new("Order"))
            ]),
            Utf8PathBuf::from("/src/Shop"),
        );

        let ran = regen
            .regenerate(&model, &EntityKey::aggregate("Order"), &NullLog)
            .unwrap();

        assert!(!ran);
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_vanished_entity_skipped() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let ran = regen
            .regenerate(&model, &EntityKey::aggregate("Shipment"), &NullLog)
            .unwrap();

        assert!(!ran);
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_version_token_runs_wrapper_and_converter() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let ran = regen
            .regenerate(&model, &EntityKey::version_token("OrderV2"), &NullLog)
            .unwrap();
        assert!(ran);

        let kinds: Vec<GeneratorKind> = calls.lock().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![GeneratorKind::TokenWrappers, GeneratorKind::TokenConverters]
        );
    }

    #[test]
    fn test_batch_with_aggregate_triggers_extensions() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let regenerated = regen
            .regenerate_batch(&model, &[EntityKey::aggregate("Order")], &NullLog)
            .unwrap();
        assert_eq!(regenerated, 1);

        let calls = calls.lock();
        let extension_calls: Vec<&GenCall> = calls
            .iter()
            .filter(|c| c.kind == GeneratorKind::Extensions)
            .collect();
        assert_eq!(extension_calls.len(), 1);
        // Extensions see the full project model, not the reduced one
        assert_eq!(extension_calls[0].aggregates, 2);
    }

    #[test]
    fn test_inherited_only_batch_skips_extensions() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        regen
            .regenerate_batch(&model, &[EntityKey::inherited("ArchivedOrder")], &NullLog)
            .unwrap();

        assert!(calls
            .lock()
            .iter()
            .all(|c| c.kind != GeneratorKind::Extensions));
    }

    #[test]
    fn test_full_pass_runs_all_kinds_in_order() {
        let (set, calls) = recording_set();
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let regenerated = regen.full_pass(&model).unwrap();
        assert_eq!(regenerated, 5);

        let kinds: Vec<GeneratorKind> = calls.lock().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, GeneratorKind::ORDER.to_vec());
    }

    #[test]
    fn test_missing_generator_kind_is_skipped() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let set = Arc::new(GeneratorSet::new().with(
            GeneratorKind::Projections,
            Arc::new(RecordingGenerator {
                kind: GeneratorKind::Projections,
                calls: Arc::clone(&calls),
            }),
        ));
        let regen = EntityRegenerator::new(set, GeneratorConfig::default());
        let model = shop_model();

        let ran = regen
            .regenerate(&model, &EntityKey::aggregate("Order"), &NullLog)
            .unwrap();
        assert!(!ran);

        let ran = regen
            .regenerate(&model, &EntityKey::projection("OrderSummary"), &NullLog)
            .unwrap();
        assert!(ran);
    }
}
