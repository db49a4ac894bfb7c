// ── Target registry ──
//
// Owns the validated target list and one lazily created `TargetClient` per
// target. A client, and the session inside it, lives for the rest of the
// process once created.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;
use unimux_api::{ControllerFlavor, Target, TargetClient};

use crate::error::CoreError;

/// Public view of a target. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub id: String,
    pub base_url: String,
    pub controller_type: ControllerFlavor,
    pub default_site: String,
}

impl From<&Target> for TargetSummary {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id.clone(),
            base_url: t.base_url.to_string(),
            controller_type: t.flavor,
            default_site: t.default_site.clone(),
        }
    }
}

pub struct TargetRegistry {
    targets: Vec<Arc<Target>>,
    index: HashMap<String, usize>,
    clients: DashMap<String, Arc<TargetClient>>,
}

impl TargetRegistry {
    /// Build from an ordered, non-empty list with unique ids.
    pub fn new(targets: Vec<Target>) -> Result<Self, CoreError> {
        if targets.is_empty() {
            return Err(CoreError::NoTargets);
        }
        let mut index = HashMap::with_capacity(targets.len());
        for (i, t) in targets.iter().enumerate() {
            if index.insert(t.id.clone(), i).is_some() {
                return Err(CoreError::DuplicateTarget { id: t.id.clone() });
            }
        }
        Ok(Self {
            targets: targets.into_iter().map(Arc::new).collect(),
            index,
            clients: DashMap::new(),
        })
    }

    pub fn targets(&self) -> &[Arc<Target>] {
        &self.targets
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Target>> {
        self.index.get(id).and_then(|&i| self.targets.get(i))
    }

    pub fn summaries(&self) -> Vec<TargetSummary> {
        self.targets.iter().map(|t| TargetSummary::from(t.as_ref())).collect()
    }

    /// Resolve an optional target id. Omitting it (or passing `""`) is
    /// allowed only when exactly one target is configured.
    pub fn resolve(&self, requested: Option<&str>) -> Result<&Arc<Target>, CoreError> {
        match requested.filter(|id| !id.is_empty()) {
            Some(id) => self.get(id).ok_or_else(|| CoreError::UnknownTarget { id: id.to_owned() }),
            None => match self.targets.as_slice() {
                [only] => Ok(only),
                all => Err(CoreError::TargetRequired { count: all.len() }),
            },
        }
    }

    /// The target's client, created on first use and cached thereafter.
    pub fn client(&self, requested: Option<&str>) -> Result<Arc<TargetClient>, CoreError> {
        let target = self.resolve(requested)?;
        let entry = self
            .clients
            .entry(target.id.clone())
            .or_try_insert_with(|| {
                debug!(target = %target.id, "creating target client");
                TargetClient::new(Arc::clone(target)).map(Arc::new)
            })?;
        Ok(Arc::clone(entry.value()))
    }
}
