//! Domain decomposition of a scene
//!
//! This module builds the arena of [`Domain`]s from configuration, links each
//! domain to the domains bordering it, and runs per-domain work in parallel
//! using Rayon. Domains refer to each other by [`DomainId`] only.

use crate::config::{DomainConfig, Settings};
use crate::domain::{Domain, NeighbourLink};
use crate::error::{PstdError, Result};
use crate::geometry::{CalcDirection, Direction, GridPoint};
use crate::spectral::WaveNumberDiscretizer;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Stable index of a domain in its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub usize);

/// Arena of domains sharing one settings block and one discretizer
#[derive(Debug)]
pub struct Scene {
    domains: Vec<Domain>,
    by_name: HashMap<String, DomainId>,
    settings: Arc<Settings>,
}

impl Scene {
    /// Build the arena and resolve neighbours
    ///
    /// Fails when two domains overlap.
    pub fn new(configs: &[DomainConfig], settings: Arc<Settings>) -> Result<Self> {
        let discretizer = Arc::new(WaveNumberDiscretizer::new());
        let mut domains: Vec<Domain> = configs
            .iter()
            .enumerate()
            .map(|(i, config)| {
                Domain::new(
                    DomainId(i),
                    config,
                    Arc::clone(&settings),
                    Arc::clone(&discretizer),
                )
            })
            .collect();

        for a in 0..domains.len() {
            for b in (a + 1)..domains.len() {
                if overlap_area(&domains[a], &domains[b]) > 0 {
                    return Err(PstdError::InvalidConfiguration(format!(
                        "domains '{}' and '{}' overlap",
                        domains[a].id, domains[b].id
                    )));
                }
            }
        }

        let links = Self::find_neighbours(&domains);
        for (owner, direction, link) in links {
            domains[owner.0].neighbours.side_mut(direction).push(link);
        }
        domains.par_iter_mut().for_each(Domain::build_damping);

        let by_name = domains
            .iter()
            .map(|d| (d.id.clone(), d.index))
            .collect();

        debug!(domains = domains.len(), "scene built");

        Ok(Self {
            domains,
            by_name,
            settings,
        })
    }

    /// Every shared edge, reported once from each side
    fn find_neighbours(domains: &[Domain]) -> Vec<(DomainId, Direction, NeighbourLink)> {
        let mut links = Vec::new();

        for a in domains {
            for b in domains {
                if a.index == b.index {
                    continue;
                }
                // b borders a on the right / bottom when a's far edge meets b's near edge
                for axis in [CalcDirection::X, CalcDirection::Y] {
                    if a.span(axis).1 != b.span(axis).0 {
                        continue;
                    }
                    let (a0, a1) = a.span(axis.other());
                    let (b0, b1) = b.span(axis.other());
                    let span = (a0.max(b0), a1.min(b1));
                    if span.0 >= span.1 {
                        continue;
                    }
                    let (_, far) = axis.sides();
                    links.push((a.index, far, NeighbourLink { id: b.index, span }));
                    links.push((b.index, far.opposite(), NeighbourLink { id: a.index, span }));
                }
            }
        }

        links
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn domain(&self, id: DomainId) -> &Domain {
        &self.domains[id.0]
    }

    pub fn domain_mut(&mut self, id: DomainId) -> &mut Domain {
        &mut self.domains[id.0]
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domains_mut(&mut self) -> &mut [Domain] {
        &mut self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Resolve a domain by its configured id
    pub fn id_of(&self, name: &str) -> Result<DomainId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PstdError::UnknownDomain(name.to_string()))
    }

    /// Domain containing a grid cell
    pub fn locate(&self, cell: GridPoint) -> Option<DomainId> {
        self.domains
            .iter()
            .find(|d| d.contains(cell))
            .map(|d| d.index)
    }

    /// Compute something for every domain in parallel from a settled scene
    pub fn par_map<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Domain) -> T + Send + Sync,
    {
        self.domains.par_iter().map(f).collect()
    }

    /// Damp the absorbing layers of every domain
    pub fn apply_damping(&mut self) {
        self.domains.par_iter_mut().for_each(Domain::apply_damping);
    }

    /// Update every domain in parallel with its matching input
    pub fn par_update<T, F>(&mut self, inputs: &[T], update_fn: F)
    where
        T: Sync,
        F: Fn(&mut Domain, &T) + Send + Sync,
    {
        debug_assert_eq!(inputs.len(), self.domains.len());
        self.domains
            .par_iter_mut()
            .zip(inputs.par_iter())
            .for_each(|(domain, input)| update_fn(domain, input));
    }
}

fn overlap_area(a: &Domain, b: &Domain) -> i64 {
    let extent = |axis| {
        let (a0, a1) = a.span(axis);
        let (b0, b1) = b.span(axis);
        (a1.min(b1) - a0.max(b0)).max(0)
    };
    extent(CalcDirection::X) * extent(CalcDirection::Y)
}
