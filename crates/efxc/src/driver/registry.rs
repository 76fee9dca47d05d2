//! Versioned component selection
//!
//! Each SDK generation needs its own renderer, label rules, codelist model
//! and way of reading field values. The registry maps (capability, version) to the component once,
//! and a translation asks for the whole bundle by version string.

use std::collections::HashMap;
use std::sync::Arc;

use efx_sdk::SdkVersion;

use crate::backend::{
    CodelistModel, LabelRules, LegacyLabelRules, LegacyRenderer, ScriptRenderer, V1LabelRules,
    V1Renderer, ValueAccess,
};
use crate::common::{TranslateError, TranslateResult};

/// What a component is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Renderer,
    LabelRules,
    Codelists,
    ValueAccess,
}

/// Versions a component is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionKey {
    /// One `major.minor` release
    Exact(u16, u16),
    /// Every release of a major version
    Major(u16),
}

#[derive(Clone)]
enum Component {
    Renderer(Arc<dyn ScriptRenderer>),
    LabelRules(Arc<dyn LabelRules>),
    Codelists(CodelistModel),
    ValueAccess(ValueAccess),
}

/// The components used to translate for one SDK version
#[derive(Clone)]
pub struct ComponentBundle {
    pub version: SdkVersion,
    pub renderer: Arc<dyn ScriptRenderer>,
    pub label_rules: Arc<dyn LabelRules>,
    pub codelists: CodelistModel,
    pub value_access: ValueAccess,
}

impl std::fmt::Debug for ComponentBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBundle")
            .field("version", &self.version)
            .field("renderer", &self.renderer.name())
            .field("codelists", &self.codelists)
            .field("value_access", &self.value_access)
            .finish_non_exhaustive()
    }
}

/// Registry of versioned components
pub struct ComponentRegistry {
    components: HashMap<(Capability, VersionKey), Component>,
}

impl ComponentRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// SDK 0.7 and every 1.x release
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let legacy = VersionKey::Exact(0, 7);
        registry.register_renderer(legacy, Arc::new(LegacyRenderer::new()));
        registry.register_label_rules(legacy, Arc::new(LegacyLabelRules));
        registry.register_codelists(legacy, CodelistModel::legacy());
        registry.register_value_access(legacy, ValueAccess::Bare);

        let v1 = VersionKey::Major(1);
        registry.register_renderer(v1, Arc::new(V1Renderer::new()));
        registry.register_label_rules(v1, Arc::new(V1LabelRules));
        registry.register_codelists(v1, CodelistModel::v1());
        registry.register_value_access(v1, ValueAccess::Typed);

        registry
    }

    pub fn register_renderer(&mut self, key: VersionKey, renderer: Arc<dyn ScriptRenderer>) {
        self.components
            .insert((Capability::Renderer, key), Component::Renderer(renderer));
    }

    pub fn register_label_rules(&mut self, key: VersionKey, rules: Arc<dyn LabelRules>) {
        self.components
            .insert((Capability::LabelRules, key), Component::LabelRules(rules));
    }

    pub fn register_codelists(&mut self, key: VersionKey, model: CodelistModel) {
        self.components
            .insert((Capability::Codelists, key), Component::Codelists(model));
    }

    pub fn register_value_access(&mut self, key: VersionKey, access: ValueAccess) {
        self.components
            .insert((Capability::ValueAccess, key), Component::ValueAccess(access));
    }

    /// Whether every capability is available for `version`
    pub fn supports(&self, version: SdkVersion) -> bool {
        [
            Capability::Renderer,
            Capability::LabelRules,
            Capability::Codelists,
            Capability::ValueAccess,
        ]
        .into_iter()
            .all(|capability| self.find(capability, version).is_some())
    }

    /// Components for a version string such as `eforms-sdk-1.0` or `0.7`
    pub fn bundle(&self, version: &str) -> TranslateResult<ComponentBundle> {
        let unsupported = || TranslateError::UnsupportedSdkVersion {
            version: version.to_string(),
        };
        let parsed = SdkVersion::parse(version).map_err(|_| unsupported())?;

        let renderer = match self.find(Capability::Renderer, parsed) {
            Some(Component::Renderer(renderer)) => Arc::clone(renderer),
            _ => return Err(unsupported()),
        };
        let label_rules = match self.find(Capability::LabelRules, parsed) {
            Some(Component::LabelRules(rules)) => Arc::clone(rules),
            _ => return Err(unsupported()),
        };
        let codelists = match self.find(Capability::Codelists, parsed) {
            Some(Component::Codelists(model)) => *model,
            _ => return Err(unsupported()),
        };
        let value_access = match self.find(Capability::ValueAccess, parsed) {
            Some(Component::ValueAccess(access)) => *access,
            _ => return Err(unsupported()),
        };

        Ok(ComponentBundle {
            version: parsed.without_patch(),
            renderer,
            label_rules,
            codelists,
            value_access,
        })
    }

    /// An exact registration wins over a major-version one
    fn find(&self, capability: Capability, version: SdkVersion) -> Option<&Component> {
        self.components
            .get(&(capability, VersionKey::Exact(version.major, version.minor)))
            .or_else(|| self.components.get(&(capability, VersionKey::Major(version.major))))
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_spellings() {
        let registry = ComponentRegistry::with_defaults();
        for version in ["eforms-sdk-1.0", "1.3", "1.10.2", "eforms-sdk-1.8.0"] {
            let bundle = registry.bundle(version).unwrap();
            assert_eq!(bundle.renderer.name(), "v1");
            assert_eq!(bundle.codelists.sdk_major, 1);
            assert_eq!(bundle.value_access, ValueAccess::Typed);
        }
        let bundle = registry.bundle("eforms-sdk-0.7").unwrap();
        assert_eq!(bundle.renderer.name(), "legacy");
        assert!(!bundle.label_rules.supports_asset_id_iteration());
        assert_eq!(bundle.value_access, ValueAccess::Bare);
        assert_eq!(bundle.version, SdkVersion::new(0, 7));
    }

    #[test]
    fn test_unsupported_versions() {
        let registry = ComponentRegistry::with_defaults();
        for version in ["0.6", "2.0", "eforms-sdk-", "one.two"] {
            assert!(matches!(
                registry.bundle(version),
                Err(TranslateError::UnsupportedSdkVersion { .. })
            ));
        }
        assert!(!registry.supports(SdkVersion::new(0, 8)));
        assert!(registry.supports(SdkVersion::new(1, 12)));
    }

    #[test]
    fn test_exact_registration_overrides_major() {
        let mut registry = ComponentRegistry::with_defaults();
        registry.register_renderer(VersionKey::Exact(1, 5), Arc::new(LegacyRenderer::new()));
        assert_eq!(registry.bundle("1.5").unwrap().renderer.name(), "legacy");
        assert_eq!(registry.bundle("1.4").unwrap().renderer.name(), "v1");
    }

    #[test]
    fn test_incomplete_registration() {
        let mut registry = ComponentRegistry::new();
        registry.register_renderer(VersionKey::Major(1), Arc::new(V1Renderer::new()));
        registry.register_label_rules(VersionKey::Major(1), Arc::new(V1LabelRules));
        registry.register_codelists(VersionKey::Major(1), CodelistModel::v1());
        assert!(matches!(
            registry.bundle("1.0"),
            Err(TranslateError::UnsupportedSdkVersion { .. })
        ));
        assert!(!registry.supports(SdkVersion::new(1, 0)));

        registry.register_value_access(VersionKey::Major(1), ValueAccess::Typed);
        assert!(registry.supports(SdkVersion::new(1, 0)));
    }
}
