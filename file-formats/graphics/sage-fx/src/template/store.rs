//! Template lookup by name

use std::collections::HashMap;
use std::sync::Arc;

use super::FxParticleSystemTemplate;

/// Resolves template names, as stored in saved particle systems
pub trait TemplateStore {
    fn get(&self, name: &str) -> Option<Arc<FxParticleSystemTemplate>>;
}

/// In-memory template collection
#[derive(Debug, Clone, Default)]
pub struct ParticleTemplateSet {
    templates: HashMap<String, Arc<FxParticleSystemTemplate>>,
}

impl ParticleTemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing any previous one with the same name
    pub fn insert(&mut self, template: FxParticleSystemTemplate) -> Arc<FxParticleSystemTemplate> {
        let template = Arc::new(template);
        self.templates
            .insert(template.name.clone(), Arc::clone(&template));
        template
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl FromIterator<FxParticleSystemTemplate> for ParticleTemplateSet {
    fn from_iter<I: IntoIterator<Item = FxParticleSystemTemplate>>(iter: I) -> Self {
        let mut set = Self::new();
        for template in iter {
            set.insert(template);
        }
        set
    }
}

impl TemplateStore for ParticleTemplateSet {
    fn get(&self, name: &str) -> Option<Arc<FxParticleSystemTemplate>> {
        self.templates.get(name).cloned()
    }
}
