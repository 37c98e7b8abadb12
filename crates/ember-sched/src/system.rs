//! Per-stage system registration.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use ember_core::SystemStage;

use crate::context::TaskContext;
use crate::error::SchedError;

/// What a system invocation returns. An `Err` fails the frame.
pub type SystemResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A shareable task callable. Stage registration and graph building both
/// traffic in this shape.
pub type SystemFn = Arc<dyn Fn(&TaskContext) -> SystemResult + Send + Sync>;

pub(crate) struct SystemNode {
    pub(crate) name: String,
    pub(crate) run: SystemFn,
    /// Indices of systems in this stage that must run after this one.
    pub(crate) children: SmallVec<[usize; 4]>,
}

/// The systems registered into one pipeline stage.
///
/// Systems in a stage run concurrently unless ordered by
/// [`add_dependency`](Self::add_dependency); ordering across stages comes
/// from the coordinator topology, never from registration order.
pub struct SystemRegistry {
    stage: SystemStage,
    systems: Vec<SystemNode>,
    by_name: IndexMap<String, usize>,
}

impl SystemRegistry {
    /// An empty registry for `stage`.
    pub fn new(stage: SystemStage) -> Self {
        Self {
            stage,
            systems: Vec::new(),
            by_name: IndexMap::new(),
        }
    }

    /// The stage this registry feeds.
    pub fn stage(&self) -> SystemStage {
        self.stage
    }

    /// Register a system under a stage-unique name.
    pub fn add(
        &mut self,
        name: &str,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) -> Result<(), SchedError> {
        if self.by_name.contains_key(name) {
            return Err(SchedError::DuplicateSystem {
                name: name.to_owned(),
            });
        }
        self.by_name.insert(name.to_owned(), self.systems.len());
        self.systems.push(SystemNode {
            name: name.to_owned(),
            run: Arc::new(run),
            children: SmallVec::new(),
        });
        Ok(())
    }

    /// Declare that `before` must finish before `after` starts.
    pub fn add_dependency(&mut self, before: &str, after: &str) -> Result<(), SchedError> {
        let parent = self.resolve(before)?;
        let child = self.resolve(after)?;
        if !self.systems[parent].children.contains(&child) {
            self.systems[parent].children.push(child);
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<usize, SchedError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchedError::UnknownSystem {
                name: name.to_owned(),
            })
    }

    /// Remove every registered system (scene teardown).
    pub fn clear(&mut self) {
        self.systems.clear();
        self.by_name.clear();
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the stage has no systems.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|node| node.name.as_str())
    }

    pub(crate) fn nodes(&self) -> &[SystemNode] {
        &self.systems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = SystemRegistry::new(SystemStage::GameLogic);
        registry.add("movement", |_| Ok(())).unwrap();
        assert!(matches!(
            registry.add("movement", |_| Ok(())),
            Err(SchedError::DuplicateSystem { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dependencies_resolve_by_name() {
        let mut registry = SystemRegistry::new(SystemStage::Update);
        registry.add("integrate", |_| Ok(())).unwrap();
        registry.add("interpolate", |_| Ok(())).unwrap();
        registry.add_dependency("integrate", "interpolate").unwrap();
        assert!(matches!(
            registry.add_dependency("integrate", "missing"),
            Err(SchedError::UnknownSystem { .. })
        ));
        assert_eq!(registry.nodes()[0].children.as_slice(), &[1]);
    }

    #[test]
    fn clear_empties_the_stage() {
        let mut registry = SystemRegistry::new(SystemStage::Actions);
        registry.add("apply", |_| Ok(())).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        // The name is reusable after a clear.
        registry.add("apply", |_| Ok(())).unwrap();
    }
}
