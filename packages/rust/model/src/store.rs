//! In-memory entity and term stores.
//!
//! Durable persistence belongs to the embedding application; these stores
//! back the import phase and tests. Writes happen in a single-writer import
//! phase; render-time access is read-only.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;
use tracing::{debug, warn};

use funcref_shared::{Entity, EntityId, FuncRefError, NewEntity, Result};

use crate::registry::SchemaRegistry;

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// Holds every imported entity, keyed by identifier.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<EntityId, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity from import metadata.
    ///
    /// The kind must be registered; an unknown kind is a recoverable error
    /// the importer should log and skip, never ignore silently.
    pub fn create(&mut self, registry: &SchemaRegistry, new: NewEntity) -> Result<EntityId> {
        if !registry.is_registered_kind(&new.kind) {
            warn!(kind = %new.kind, title = %new.title, "rejecting entity of unregistered kind");
            return Err(FuncRefError::unknown_kind(&new.kind));
        }

        let now = Utc::now();
        let id = EntityId::new();
        let entity = Entity {
            id,
            kind: new.kind,
            title: new.title,
            excerpt: new.excerpt,
            body: new.body,
            arguments: new.arguments,
            return_type: new.return_type,
            source_ref: new.source_ref,
            prototype: new.prototype,
            parent: new.parent,
            created_at: now,
            updated_at: now,
        };

        debug!(%id, kind = %entity.kind, title = %entity.title, "created entity");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Replace a stored entity, bumping its `updated_at`.
    pub fn update(&mut self, mut entity: Entity) -> Result<()> {
        if !self.entities.contains_key(&entity.id) {
            return Err(FuncRefError::validation(format!(
                "cannot update unknown entity {}",
                entity.id
            )));
        }
        entity.updated_at = Utc::now();
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Find an entity by kind and title.
    pub fn find(&self, kind: &str, title: &str) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.kind == kind && e.title == title)
    }

    /// All entities of a kind, sorted by title.
    pub fn by_kind(&self, kind: &str) -> Vec<&Entity> {
        let mut result: Vec<&Entity> = self.entities.values().filter(|e| e.kind == kind).collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        result
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TermStore
// ---------------------------------------------------------------------------

/// A term within a relationship category.
///
/// `key` is the full hierarchical path joined with `/`, unique per category;
/// the same literal leaf name under different parents is two terms, and the
/// same literal in two categories is likewise two terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Full hierarchical key, e.g. `includes/functions.php`.
    pub key: String,
    /// Leaf name, e.g. `functions.php`.
    pub name: String,
    /// Key of the parent term, for hierarchical categories.
    pub parent: Option<String>,
    /// Number of entities directly assigned. Stale until [`TermStore::recount`].
    pub count: usize,
}

#[derive(Debug, Default)]
struct CategoryTerms {
    terms: BTreeMap<String, Term>,
    /// entity → set of term keys the entity is assigned to.
    assignments: BTreeMap<EntityId, BTreeSet<String>>,
}

/// Per-category term sets and entity↔term assignments.
///
/// Term counts are not maintained incrementally: assignment happens in bulk
/// and out of order during import, so counts stay stale until an explicit
/// [`TermStore::recount`].
#[derive(Debug, Default)]
pub struct TermStore {
    categories: BTreeMap<String, CategoryTerms>,
}

impl TermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an entity to the term named by `path` within a category,
    /// creating the term and any missing ancestors.
    ///
    /// For non-hierarchical categories the path must be a single segment.
    pub fn assign(
        &mut self,
        registry: &SchemaRegistry,
        category: &str,
        entity: &Entity,
        path: &[&str],
    ) -> Result<()> {
        let config = registry.relationship_category(category).ok_or_else(|| {
            FuncRefError::validation(format!("unknown relationship category {category:?}"))
        })?;

        if !config.applies_to.contains(&entity.kind) {
            return Err(FuncRefError::validation(format!(
                "category {category:?} does not apply to kind {:?}",
                entity.kind
            )));
        }

        if path.is_empty() {
            return Err(FuncRefError::validation("empty term path"));
        }

        if !config.hierarchical && path.len() > 1 {
            return Err(FuncRefError::validation(format!(
                "category {category:?} is not hierarchical"
            )));
        }

        let bucket = self.categories.entry(category.to_string()).or_default();

        // Create the term chain, parents first.
        let mut parent_key: Option<String> = None;
        for segment in path {
            let key = match &parent_key {
                Some(p) => format!("{p}/{segment}"),
                None => (*segment).to_string(),
            };
            bucket.terms.entry(key.clone()).or_insert_with(|| Term {
                key: key.clone(),
                name: (*segment).to_string(),
                parent: parent_key.clone(),
                count: 0,
            });
            parent_key = Some(key);
        }

        let leaf = parent_key.unwrap_or_default();
        debug!(category, entity = %entity.id, term = %leaf, "assigned term");
        bucket.assignments.entry(entity.id).or_default().insert(leaf);
        Ok(())
    }

    /// Terms directly assigned to an entity within a category, sorted by key.
    pub fn terms_of(&self, category: &str, entity: EntityId) -> Vec<&Term> {
        let Some(bucket) = self.categories.get(category) else {
            return Vec::new();
        };
        bucket
            .assignments
            .get(&entity)
            .map(|keys| keys.iter().filter_map(|k| bucket.terms.get(k)).collect())
            .unwrap_or_default()
    }

    /// Entities directly assigned to a term, sorted by identifier.
    pub fn entities_with(&self, category: &str, term_key: &str) -> Vec<EntityId> {
        let Some(bucket) = self.categories.get(category) else {
            return Vec::new();
        };
        bucket
            .assignments
            .iter()
            .filter(|(_, keys)| keys.contains(term_key))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Look up a term by its full key.
    pub fn term(&self, category: &str, term_key: &str) -> Option<&Term> {
        self.categories.get(category)?.terms.get(term_key)
    }

    /// Recompute every term count in a category from the assignment set.
    ///
    /// Counts are intentionally not maintained incrementally — bulk import
    /// assigns out of order, so callers recount once afterwards.
    pub fn recount(&mut self, category: &str) {
        let Some(bucket) = self.categories.get_mut(category) else {
            return;
        };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for keys in bucket.assignments.values() {
            for key in keys {
                *counts.entry(key.as_str()).or_default() += 1;
            }
        }

        let counts: BTreeMap<String, usize> = counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        for term in bucket.terms.values_mut() {
            term.count = counts.get(&term.key).copied().unwrap_or(0);
        }
        debug!(category, terms = bucket.terms.len(), "recounted terms");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CATEGORY_SINCE, CATEGORY_SOURCE_FILE, register_builtin_schema};
    use funcref_shared::types::KIND_FUNCTION;

    fn setup() -> (SchemaRegistry, EntityStore) {
        let mut registry = SchemaRegistry::new();
        register_builtin_schema(&mut registry).expect("builtins");
        (registry, EntityStore::new())
    }

    fn new_function(title: &str) -> NewEntity {
        NewEntity {
            kind: KIND_FUNCTION.into(),
            title: title.into(),
            ..NewEntity::default()
        }
    }

    #[test]
    fn create_requires_registered_kind() {
        let (registry, mut store) = setup();

        let id = store
            .create(&registry, new_function("do_thing"))
            .expect("create function");
        assert_eq!(store.get(id).map(|e| e.title.as_str()), Some("do_thing"));

        let err = store
            .create(
                &registry,
                NewEntity {
                    kind: "widget".into(),
                    title: "x".into(),
                    ..NewEntity::default()
                },
            )
            .expect_err("unknown kind");
        assert!(matches!(err, FuncRefError::UnknownEntityKind { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_unknown_entity_fails() {
        let (registry, mut store) = setup();
        let id = store
            .create(&registry, new_function("do_thing"))
            .expect("create");
        let mut entity = store.get(id).cloned().expect("get");

        entity.body = "New body.".into();
        store.update(entity.clone()).expect("update");
        assert_eq!(store.get(id).map(|e| e.body.as_str()), Some("New body."));

        entity.id = EntityId::new();
        assert!(store.update(entity).is_err());
    }

    #[test]
    fn by_kind_sorted_by_title() {
        let (registry, mut store) = setup();
        store.create(&registry, new_function("zeta")).expect("create");
        store.create(&registry, new_function("alpha")).expect("create");

        let titles: Vec<&str> = store
            .by_kind(KIND_FUNCTION)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["alpha", "zeta"]);
    }

    #[test]
    fn assign_creates_term_hierarchy() {
        let (registry, mut store) = setup();
        let id = store.create(&registry, new_function("f")).expect("create");
        let entity = store.get(id).cloned().expect("get");

        let mut terms = TermStore::new();
        terms
            .assign(&registry, CATEGORY_SOURCE_FILE, &entity, &["includes", "functions.php"])
            .expect("assign");

        let leaf = terms
            .term(CATEGORY_SOURCE_FILE, "includes/functions.php")
            .expect("leaf term");
        assert_eq!(leaf.name, "functions.php");
        assert_eq!(leaf.parent.as_deref(), Some("includes"));
        assert!(terms.term(CATEGORY_SOURCE_FILE, "includes").is_some());

        let assigned = terms.terms_of(CATEGORY_SOURCE_FILE, id);
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].key, "includes/functions.php");
    }

    #[test]
    fn same_name_in_two_categories_is_two_terms() {
        let (registry, mut store) = setup();
        let id = store.create(&registry, new_function("f")).expect("create");
        let entity = store.get(id).cloned().expect("get");

        let mut terms = TermStore::new();
        terms
            .assign(&registry, CATEGORY_SINCE, &entity, &["4.2"])
            .expect("assign since");
        terms
            .assign(&registry, CATEGORY_SOURCE_FILE, &entity, &["4.2"])
            .expect("assign file");

        terms.recount(CATEGORY_SINCE);
        assert_eq!(terms.term(CATEGORY_SINCE, "4.2").map(|t| t.count), Some(1));
        // The file-category twin was not recounted and stays at zero.
        assert_eq!(terms.term(CATEGORY_SOURCE_FILE, "4.2").map(|t| t.count), Some(0));
    }

    #[test]
    fn counts_stale_until_recount() {
        let (registry, mut store) = setup();
        let a = store.create(&registry, new_function("a")).expect("create");
        let b = store.create(&registry, new_function("b")).expect("create");
        let ea = store.get(a).cloned().expect("get");
        let eb = store.get(b).cloned().expect("get");

        let mut terms = TermStore::new();
        terms
            .assign(&registry, CATEGORY_SINCE, &ea, &["4.2", "4.2.1"])
            .expect("assign");
        terms
            .assign(&registry, CATEGORY_SINCE, &eb, &["4.2", "4.2.1"])
            .expect("assign");

        assert_eq!(terms.term(CATEGORY_SINCE, "4.2/4.2.1").map(|t| t.count), Some(0));

        terms.recount(CATEGORY_SINCE);
        assert_eq!(terms.term(CATEGORY_SINCE, "4.2/4.2.1").map(|t| t.count), Some(2));
        // Only direct assignments count; the parent version has none.
        assert_eq!(terms.term(CATEGORY_SINCE, "4.2").map(|t| t.count), Some(0));

        let assigned = terms.entities_with(CATEGORY_SINCE, "4.2/4.2.1");
        assert_eq!(assigned.len(), 2);
    }

    #[test]
    fn assign_rejects_unknown_category_and_wrong_kind() {
        let (registry, mut store) = setup();
        let id = store.create(&registry, new_function("f")).expect("create");
        let entity = store.get(id).cloned().expect("get");

        let mut terms = TermStore::new();
        assert!(terms
            .assign(&registry, "nonexistent", &entity, &["x"])
            .is_err());
        assert!(terms
            .assign(&registry, CATEGORY_SINCE, &entity, &[])
            .is_err());
    }
}
