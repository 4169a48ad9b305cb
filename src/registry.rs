use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::{
    builtins,
    error::{SynthError, SynthResult},
    pipeline::{ArgValue, PipelineNode, TransformApplication},
    transform::{TransformDef, TransformDescriptor, TransformKind},
};

/// Notification fired on every successful registration, so a scripting
/// namespace can keep its name→operation mapping current without
/// recreating bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryChange {
    Added { name: String },
    Replaced { name: String },
}

type ChangeListener = Arc<dyn Fn(&RegistryChange) + Send + Sync>;

/// Process-wide transform store. Registrations are serialized behind a
/// write lock; one compile reads a single [`RegistrySnapshot`] for its
/// whole duration, so it never mixes descriptor versions.
pub struct TransformRegistry {
    descriptors: RwLock<BTreeMap<String, Arc<TransformDescriptor>>>,
    listeners: RwLock<Vec<ChangeListener>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// A registry seeded with the built-in transform catalog.
    pub fn with_builtins() -> SynthResult<Self> {
        let registry = Self::new();
        registry.extend(builtins::catalog())?;
        Ok(registry)
    }

    /// Register one transform. The kind string is validated against the
    /// closed set before anything is stored, so a bad registration has no
    /// partial effect. Re-registering an existing name overwrites it
    /// (last write wins) and fires [`RegistryChange::Replaced`].
    pub fn register(&self, def: &TransformDef) -> SynthResult<()> {
        let descriptor = def.validate()?;
        let name = descriptor.name.clone();
        let replaced = {
            let mut descriptors = self.descriptors.write().expect("registry lock poisoned");
            descriptors
                .insert(name.clone(), Arc::new(descriptor))
                .is_some()
        };
        tracing::debug!(%name, replaced, "registered transform");

        let change = if replaced {
            RegistryChange::Replaced { name }
        } else {
            RegistryChange::Added { name }
        };
        // Clone the listener list out of the guard before invoking, so a
        // listener may subscribe or register without deadlocking.
        let listeners: Vec<ChangeListener> = self
            .listeners
            .read()
            .expect("registry lock poisoned")
            .clone();
        for listener in &listeners {
            listener(&change);
        }
        Ok(())
    }

    /// Bulk registration. All definitions are validated before any is
    /// stored, so one bad kind rejects the whole batch without effect.
    pub fn extend(&self, defs: impl IntoIterator<Item = TransformDef>) -> SynthResult<()> {
        let defs: Vec<TransformDef> = defs.into_iter().collect();
        for def in &defs {
            def.validate()?;
        }
        for def in &defs {
            self.register(def)?;
        }
        Ok(())
    }

    pub fn subscribe(&self, listener: impl Fn(&RegistryChange) + Send + Sync + 'static) {
        self.listeners
            .write()
            .expect("registry lock poisoned")
            .push(Arc::new(listener));
    }

    /// Registered names, sorted. A scripting collaborator iterates this
    /// mapping instead of relying on per-name attribute lookup.
    pub fn names(&self) -> Vec<String> {
        self.descriptors
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<TransformKind> {
        self.descriptors
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .map(|d| d.kind)
    }

    /// Consistent read snapshot of every descriptor, shared by one whole
    /// compile.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            descriptors: self
                .descriptors
                .read()
                .expect("registry lock poisoned")
                .clone(),
        }
    }

    /// Start a new pipeline from a transform that needs no upstream
    /// stream. Starting from a color or combine transform is an error:
    /// those kinds consume the previous step's output, and there is none.
    pub fn start(&self, name: &str, args: Vec<ArgValue>) -> SynthResult<PipelineNode> {
        let kind = self
            .kind_of(name)
            .ok_or_else(|| SynthError::UnknownTransform(name.to_string()))?;
        if !kind.starts_pipeline() {
            return Err(SynthError::chain(format!(
                "cannot start a pipeline from '{name}' ({} transform consumes an upstream stream)",
                kind.name()
            )));
        }
        Ok(PipelineNode::begin(TransformApplication {
            name: name.to_string(),
            args,
        }))
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of the registry taken at the start of a compile.
#[derive(Clone)]
pub struct RegistrySnapshot {
    descriptors: BTreeMap<String, Arc<TransformDescriptor>>,
}

impl RegistrySnapshot {
    pub fn get(&self, name: &str) -> Option<&TransformDescriptor> {
        self.descriptors.get(name).map(Arc::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}
