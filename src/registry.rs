//! Registry of correlation models keyed by their stable identifiers

use crate::error::ModelError;
use crate::model::{ModelDefinition, ModelId};
use crate::models::BUILTIN_MODELS;

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Lookup table of model definitions
///
/// Models are kept in registration order, which is the order used by [ModelRegistry::iter] and
/// [ModelRegistry::list_by_category]. A registry is populated once and only read afterwards, so
/// it can be shared between threads by reference.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDefinition>,
    index: HashMap<ModelId, usize>,
}

impl ModelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding [BUILTIN_MODELS]
    pub fn builtin() -> Result<Self, ModelError> {
        let mut registry = Self::new();
        for definition in BUILTIN_MODELS {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Adds a definition, the registry is left unchanged on error
    pub fn register(&mut self, definition: ModelDefinition) -> Result<(), ModelError> {
        let id = definition.id();
        if self.index.contains_key(&id) {
            return Err(ModelError::DuplicateIdentifier { id });
        }
        definition.validate()?;
        log::debug!(
            "registering model {} \"{}\" in category \"{}\"",
            id,
            definition.name(),
            definition.category()
        );
        self.index.insert(id, self.models.len());
        self.models.push(definition);
        Ok(())
    }

    pub fn get(&self, id: ModelId) -> Result<&ModelDefinition, ModelError> {
        self.index
            .get(&id)
            .map(|&i| &self.models[i])
            .ok_or(ModelError::UnknownModel { id })
    }

    pub fn contains(&self, id: ModelId) -> bool {
        self.index.contains_key(&id)
    }

    /// Definitions in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, ModelDefinition> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models grouped by category
    ///
    /// Categories come in the order of their first registered model, models inside a group keep
    /// their registration order. The iterator is lazy and can be cloned to restart it.
    pub fn list_by_category(&self) -> CategoryGroups<'_> {
        CategoryGroups {
            models: &self.models,
            position: 0,
        }
    }
}

impl<'a> IntoIterator for &'a ModelRegistry {
    type Item = &'a ModelDefinition;
    type IntoIter = std::slice::Iter<'a, ModelDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over category groups, see [ModelRegistry::list_by_category]
#[derive(Clone, Debug)]
pub struct CategoryGroups<'a> {
    models: &'a [ModelDefinition],
    position: usize,
}

impl<'a> Iterator for CategoryGroups<'a> {
    type Item = CategoryGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // A category is yielded at its first occurrence, later occurrences are skipped
        while let Some(model) = self.models.get(self.position) {
            self.position += 1;
            let category = model.category();
            let seen = self.models[..self.position - 1]
                .iter()
                .any(|m| m.category() == category);
            if !seen {
                return Some(CategoryGroup {
                    category,
                    models: CategoryModels {
                        category,
                        rest: &self.models[self.position - 1..],
                    },
                });
            }
        }
        None
    }
}

/// Single category with its models
#[derive(Clone, Debug)]
pub struct CategoryGroup<'a> {
    pub category: &'static str,
    pub models: CategoryModels<'a>,
}

/// Models of a single category in registration order
#[derive(Clone, Debug)]
pub struct CategoryModels<'a> {
    category: &'static str,
    rest: &'a [ModelDefinition],
}

impl<'a> Iterator for CategoryModels<'a> {
    type Item = &'a ModelDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        let category = self.category;
        let offset = self.rest.iter().position(|m| m.category() == category)?;
        let model = &self.rest[offset];
        self.rest = &self.rest[offset + 1..];
        Some(model)
    }
}

lazy_static! {
    static ref REGISTRY: ModelRegistry =
        ModelRegistry::builtin().expect("built-in models must have unique valid identifiers");
}

/// Process-wide registry of the built-in models, built on first access
pub fn registry() -> &'static ModelRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LagTimes;
    use crate::model::{ParameterDescriptor, ParameterDomain};

    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rayon::prelude::*;

    const PARAMETERS: [ParameterDescriptor; 1] = [ParameterDescriptor::plain(
        "n",
        1.0,
        true,
        ParameterDomain::positive(),
    )];

    fn inverse(p: &[f64], _tau: f64) -> f64 {
        p[0].recip()
    }

    fn model(id: u32, category: &'static str, name: &'static str) -> ModelDefinition {
        ModelDefinition::new(id, category, name, "", &PARAMETERS, inverse)
    }

    fn names<'a>(models: impl Iterator<Item = &'a ModelDefinition>) -> Vec<&'static str> {
        models.map(|m| m.name()).collect()
    }

    #[test]
    fn register_then_get() {
        let mut registry = ModelRegistry::new();
        assert!(registry.is_empty());
        registry.register(model(1, "A", "first")).unwrap();
        let found = registry.get(ModelId(1)).unwrap();
        assert_eq!(found.id(), ModelId(1));
        assert_eq!(found.name(), "first");
        assert!(std::ptr::eq(found.parameters(), &PARAMETERS[..]));
        assert!(registry.contains(ModelId(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_unknown() {
        let registry = ModelRegistry::new();
        assert_eq!(
            registry.get(ModelId(6013)).unwrap_err(),
            ModelError::UnknownModel { id: ModelId(6013) }
        );
        assert!(!registry.contains(ModelId(6013)));
    }

    #[test]
    fn duplicate_keeps_first() {
        let mut registry = ModelRegistry::new();
        registry.register(model(7, "A", "first")).unwrap();
        assert_eq!(
            registry.register(model(7, "B", "second")),
            Err(ModelError::DuplicateIdentifier { id: ModelId(7) })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(ModelId(7)).unwrap().name(), "first");
        assert_eq!(registry.list_by_category().count(), 1);
    }

    #[test]
    fn invalid_definition_is_rejected() {
        const EMPTY: [ParameterDescriptor; 0] = [];
        let mut registry = ModelRegistry::new();
        let empty = ModelDefinition::new(3, "A", "empty", "", &EMPTY, inverse);
        assert!(matches!(
            registry.register(empty),
            Err(ModelError::InvalidDefinition { id: ModelId(3), .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn categories_in_first_registration_order() {
        let mut registry = ModelRegistry::new();
        for (id, category, name) in [
            (1, "B", "b1"),
            (2, "A", "a1"),
            (3, "B", "b2"),
            (4, "C", "c1"),
            (5, "A", "a2"),
        ] {
            registry.register(model(id, category, name)).unwrap();
        }

        let groups = registry.list_by_category();
        let collected: Vec<_> = groups
            .clone()
            .map(|group| (group.category, names(group.models)))
            .collect();
        assert_eq!(
            collected,
            vec![
                ("B", vec!["b1", "b2"]),
                ("A", vec!["a1", "a2"]),
                ("C", vec!["c1"]),
            ]
        );

        // Restarting gives the same sequence
        let again: Vec<_> = groups
            .map(|group| (group.category, names(group.models)))
            .collect();
        assert_eq!(collected, again);
        assert_eq!(names(registry.iter()), ["b1", "a1", "b2", "c1", "a2"]);
    }

    #[test]
    fn builtin_registry() {
        let registry = registry();
        assert_eq!(registry.len(), BUILTIN_MODELS.len());
        let categories: Vec<_> = registry.list_by_category().map(|g| g.category).collect();
        assert_eq!(
            categories,
            ["Confocal (Gaussian)", "TIR (Gaussian/Exp.)", "TIR (□xσ/Exp.)"]
        );
        let grouped: usize = registry.list_by_category().map(|g| g.models.count()).sum();
        assert_eq!(grouped, registry.len());
        for id in [6000, 6001, 6002, 6010, 6011, 6012, 6013, 6014, 6030, 6032] {
            assert_eq!(registry.get(ModelId(id)).unwrap().id(), ModelId(id));
        }
    }

    #[test]
    fn builtin_registry_rejects_second_registration() {
        let mut registry = ModelRegistry::builtin().unwrap();
        assert_eq!(
            registry.register(BUILTIN_MODELS[0]),
            Err(ModelError::DuplicateIdentifier {
                id: BUILTIN_MODELS[0].id()
            })
        );
    }

    #[test]
    fn tir_3d_scenario() {
        let model = registry().get(ModelId(6013)).unwrap();
        let params = [0.0005420, 9.44, 1.0, 0.03011];
        let tau = LagTimes::new(vec![0.0]).unwrap();
        let g0 = model.evaluate(&params, &tau).unwrap()[0];
        assert!(g0.is_finite() && g0 > 0.0);

        let info = model.supplements(&params, Some(100.0)).unwrap();
        let value = |label: &str| info.iter().find(|s| s.label == label).unwrap().value;
        assert_eq!(value("G(0)"), g0);
        assert_relative_eq!(value("cpp [kHz]"), 100.0 / value("N_eff"));
    }

    #[test]
    fn concurrent_evaluation_matches_sequential() {
        let tau = LagTimes::logspace(1e-4, 1e4, 64).unwrap();
        let sequential: Vec<_> = registry()
            .iter()
            .map(|m| m.evaluate(&m.default_values(), &tau).unwrap())
            .collect();
        let parallel: Vec<_> = (0..16)
            .into_par_iter()
            .flat_map_iter(|_| registry().iter())
            .map(|m| m.evaluate(&m.default_values(), &tau).unwrap())
            .collect();
        for (i, curve) in parallel.iter().enumerate() {
            assert_eq!(curve, &sequential[i % sequential.len()]);
        }
    }

    fn trial_vector(n: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(
            prop_oneof![
                Just(0.0),
                Just(1.0),
                Just(f64::MAX),
                Just(-f64::MAX),
                -1e4..1e4_f64,
                (-300.0..300.0_f64).prop_map(|e| 10f64.powf(e)),
                (-300.0..300.0_f64).prop_map(|e| -(10f64.powf(e))),
            ],
            n,
        )
    }

    fn model_with_trial() -> impl Strategy<Value = (usize, Vec<f64>)> {
        (0..BUILTIN_MODELS.len()).prop_flat_map(|i| {
            let n = BUILTIN_MODELS[i].parameter_count();
            (Just(i), trial_vector(n))
        })
    }

    proptest! {
        #[test]
        fn verify_is_idempotent((i, trial) in model_with_trial()) {
            let model = &BUILTIN_MODELS[i];
            let verified = model.verify(&trial).unwrap();
            prop_assert_eq!(model.verify(&verified).unwrap(), verified);
        }

        #[test]
        fn verified_parameters_give_finite_curve(
            (i, trial) in model_with_trial(),
            lags in prop::collection::vec(
                prop_oneof![
                    Just(0.0),
                    0.0..1e7_f64,
                    (-300.0..300.0_f64).prop_map(|e| 10f64.powf(e)),
                ],
                1..32,
            ),
        ) {
            let model = &BUILTIN_MODELS[i];
            let params = model.verify(&trial).unwrap();
            let mut lags = lags;
            lags.sort_by(f64::total_cmp);
            let tau = LagTimes::new(lags).unwrap();
            let curve = model.evaluate(&params, &tau).unwrap();
            prop_assert_eq!(curve.len(), tau.len());
            prop_assert!(curve.iter().all(|g| g.is_finite()), "{:?} -> {:?}", params, curve);
        }
    }
}
