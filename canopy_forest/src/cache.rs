// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-company forest cache and the data-source contract it loads through.

use std::error::Error;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::entity::{Asset, CompanyId, Location};
use crate::error::Result;
use crate::forest::{BuildOptions, Forest};

/// Supplier of the flat record lists for a company.
///
/// Retry and backoff belong to the implementation; [`ForestCache::load`]
/// treats any failure as "no data".
pub trait CompanyDataSource {
    /// Error reported when a list cannot be retrieved.
    type Error: Error;

    /// Lists every asset of `company`.
    fn assets(&self, company: &CompanyId) -> core::result::Result<Vec<Asset>, Self::Error>;

    /// Lists every location of `company`.
    fn locations(&self, company: &CompanyId) -> core::result::Result<Vec<Location>, Self::Error>;
}

#[derive(Debug)]
struct CacheEntry {
    forest: Arc<Forest>,
    fingerprint: u64,
    built_at: Instant,
}

/// Built forests keyed by company.
///
/// An entry is reused while the input lists hash to the same fingerprint and
/// rebuilt as soon as they change.
///
/// ```rust
/// use std::sync::Arc;
/// use canopy_forest::{CompanyId, ForestCache, Location};
///
/// let mut cache = ForestCache::new();
/// let company = CompanyId::new("acme");
/// let locations = vec![Location::new("plant", "Plant")];
///
/// let first = cache.get_or_build(&company, &[], &locations).unwrap();
/// let second = cache.get_or_build(&company, &[], &locations).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug, Default)]
pub struct ForestCache {
    options: BuildOptions,
    entries: HashMap<CompanyId, CacheEntry>,
}

impl ForestCache {
    /// Creates an empty cache using default build options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache whose forests are built with `options`.
    #[must_use]
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Returns the forest for `company`, building it if the inputs changed.
    pub fn get_or_build(
        &mut self,
        company: &CompanyId,
        assets: &[Asset],
        locations: &[Location],
    ) -> Result<Arc<Forest>> {
        let fingerprint = fingerprint(assets, locations);
        if let Some(entry) = self.entries.get(company)
            && entry.fingerprint == fingerprint
        {
            debug!(%company, "forest cache hit");
            return Ok(entry.forest.clone());
        }

        debug!(%company, "forest cache miss");
        let forest = Arc::new(Forest::build(
            assets.iter().cloned(),
            locations.iter().cloned(),
            self.options,
        )?);
        self.entries.insert(
            company.clone(),
            CacheEntry {
                forest: forest.clone(),
                fingerprint,
                built_at: Instant::now(),
            },
        );
        Ok(forest)
    }

    /// Fetches both lists from `source` and returns the company's forest.
    ///
    /// A failed fetch or an unbuildable input yields an empty forest, which is
    /// not cached so the next load tries again.
    pub fn load<S: CompanyDataSource>(&mut self, company: &CompanyId, source: &S) -> Arc<Forest> {
        let lists = source
            .assets(company)
            .and_then(|assets| Ok((assets, source.locations(company)?)));
        let (assets, locations) = match lists {
            Ok(lists) => lists,
            Err(err) => {
                warn!(%company, error = %err, "company data unavailable; showing an empty tree");
                return Arc::new(Forest::empty());
            }
        };
        match self.get_or_build(company, &assets, &locations) {
            Ok(forest) => forest,
            Err(err) => {
                warn!(%company, error = %err, "cannot build company tree; showing an empty tree");
                Arc::new(Forest::empty())
            }
        }
    }

    /// Drops the entry for `company`. Returns `true` if one was present.
    pub fn invalidate(&mut self, company: &CompanyId) -> bool {
        self.entries.remove(company).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// When the cached forest for `company` was built, if any.
    #[must_use]
    pub fn built_at(&self, company: &CompanyId) -> Option<Instant> {
        self.entries.get(company).map(|e| e.built_at)
    }

    /// Number of cached companies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fingerprint(assets: &[Asset], locations: &[Location]) -> u64 {
    let mut hasher = DefaultHasher::new();
    assets.hash(&mut hasher);
    locations.hash(&mut hasher);
    hasher.finish()
}
