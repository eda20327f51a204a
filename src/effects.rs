//! Effect name / wire id mapping.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::config::EffectMapping;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Bidirectional mapping between effect names and the ids the lamp uses.
///
/// A registry is never edited. Reconfiguring a lamp builds a fresh one.
///
/// # Example
///
/// ```
/// use gyverlamp_rs::{EffectMapping, EffectRegistry};
///
/// let effects = vec!["Огонь".to_string(), "Радуга".to_string()];
/// let overrides = vec![EffectMapping::new("Лава", 7, true)];
/// let registry = EffectRegistry::build(&effects, &overrides, false, &[], true);
///
/// assert_eq!(registry.resolve("Лава").unwrap(), 7);
/// assert_eq!(registry.name(1), Some("Радуга"));
/// assert_eq!(registry.effect_list(), vec!["Огонь", "Радуга", "Лава"]);
/// assert_eq!(registry.pick_random(), Some(7));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectRegistry {
    // Insertion order is part of the contract: it decides duplicate names.
    by_id: Vec<(u32, String)>,
    by_name: HashMap<String, u32>,
    random_ids: BTreeSet<u32>,
}

impl EffectRegistry {
    /// Build a registry.
    ///
    /// `effects` get ids `0..n` in order, then `overrides` are applied in
    /// order. When two ids share a name, the one inserted last wins the name
    /// lookup. Unknown names in `random_names` are ignored, and nothing is
    /// eligible for random selection unless `use_random` is set.
    pub fn build(
        effects: &[String],
        overrides: &[EffectMapping],
        include_all_random: bool,
        random_names: &[String],
        use_random: bool,
    ) -> Self {
        let mut by_id: Vec<(u32, String)> = Vec::with_capacity(effects.len() + overrides.len());
        for (id, name) in (0u32..).zip(effects) {
            by_id.push((id, name.clone()));
        }

        let mut random_ids = BTreeSet::new();
        if include_all_random {
            random_ids.extend(by_id.iter().map(|(id, _)| *id));
        }

        for mapping in overrides {
            match by_id.iter_mut().find(|(id, _)| *id == mapping.id) {
                Some(entry) => entry.1.clone_from(&mapping.name),
                None => by_id.push((mapping.id, mapping.name.clone())),
            }
            if mapping.random {
                random_ids.insert(mapping.id);
            }
        }

        let by_name: HashMap<String, u32> = by_id
            .iter()
            .map(|(id, name)| (name.clone(), *id))
            .collect();

        random_ids.extend(random_names.iter().filter_map(|name| by_name.get(name).copied()));

        if !use_random {
            random_ids.clear();
        }

        EffectRegistry {
            by_id,
            by_name,
            random_ids,
        }
    }

    /// Look up the wire id for an effect name.
    pub fn resolve(&self, name: &str) -> Result<u32> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownEffect(name.to_string()))
    }

    /// Look up the name for a wire id.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.by_id
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, name)| name.as_str())
    }

    /// Effect names in id insertion order, as shown to the user.
    pub fn effect_list(&self) -> Vec<&str> {
        self.by_id.iter().map(|(_, name)| name.as_str()).collect()
    }

    /// Ids eligible for random selection.
    pub fn random_ids(&self) -> &BTreeSet<u32> {
        &self.random_ids
    }

    /// Number of known ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Pick a random eligible id, or `None` if nothing is eligible.
    pub fn pick_random(&self) -> Option<u32> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Like [`pick_random`](Self::pick_random), drawing from `rng`.
    pub fn pick_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.random_ids.iter().copied().choose(rng)
    }
}
