//! Material Loader
//!
//! Entry point of the compiler. Loads `MaterialDef` files into shared
//! [`MaterialDefinition`]s and `Material` files into [`MaterialInstance`]s.
//!
//! # Usage
//!
//! ```rust,ignore
//! let repository = Arc::new(DefinitionRepository::default());
//! let loader = MaterialLoader::new(Arc::new(assets), repository);
//!
//! match loader.load("Materials/Rock.j3m")? {
//!     MaterialAsset::Instance(material) => { /* ... */ }
//!     MaterialAsset::Definition(definition) => { /* ... */ }
//! }
//! ```
//!
//! Definitions are cached per key: every instance extending the same
//! definition shares one `Arc<MaterialDefinition>`.

use std::sync::Arc;

use crate::assets::io::AssetProvider;
use crate::assets::loaders::render_state::read_render_state;
use crate::assets::loaders::technique::TechniqueContext;
use crate::assets::loaders::values::{read_param, read_value};
use crate::assets::loaders::{parse_toggle, root_statement};
use crate::assets::storage::AssetStorage;
use crate::errors::{MaterialError, Result};
use crate::resources::material::{MaterialDefinition, MaterialInstance};
use crate::shader_nodes::repository::DefinitionRepository;
use crate::statement::{Statement, keyword_table};

keyword_table! {
    enum InstanceKeyword {
        MaterialParameters => "MaterialParameters",
        AdditionalRenderState => "AdditionalRenderState",
        Transparent => "Transparent",
    }
}

/// Result of [`MaterialLoader::load`].
#[derive(Debug, Clone)]
pub enum MaterialAsset {
    Definition(Arc<MaterialDefinition>),
    Instance(MaterialInstance),
}

pub struct MaterialLoader {
    assets: Arc<dyn AssetProvider>,
    repository: Arc<DefinitionRepository>,
    definitions: AssetStorage<MaterialDefinition>,
}

impl std::fmt::Debug for MaterialLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialLoader")
            .field("repository", &self.repository)
            .field("definitions", &self.definitions)
            .finish_non_exhaustive()
    }
}

impl MaterialLoader {
    #[must_use]
    pub fn new(assets: Arc<dyn AssetProvider>, repository: Arc<DefinitionRepository>) -> Self {
        Self {
            assets,
            repository,
            definitions: AssetStorage::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn assets(&self) -> &dyn AssetProvider {
        &*self.assets
    }

    #[inline]
    #[must_use]
    pub fn repository(&self) -> &Arc<DefinitionRepository> {
        &self.repository
    }

    /// Loads a `MaterialDef` or `Material` file.
    pub fn load(&self, key: &str) -> Result<MaterialAsset> {
        if let Some(definition) = self.definitions.get(key) {
            return Ok(MaterialAsset::Definition(definition));
        }
        let roots = self.assets.load_statements(key)?;
        let root = root_statement(key, &roots)?;
        match root.keyword() {
            "MaterialDef" => {
                let definition = self
                    .definitions
                    .get_or_try_insert_with(key, || self.read_definition(key, root))?;
                Ok(MaterialAsset::Definition(definition))
            }
            "Material" => Ok(MaterialAsset::Instance(self.read_instance(key, root)?)),
            _ => Err(MaterialError::unexpected(key, root, "MaterialDef or Material")),
        }
    }

    /// Loads a `MaterialDef` file, reusing the cached definition if any.
    pub fn load_definition(&self, key: &str) -> Result<Arc<MaterialDefinition>> {
        self.definitions.get_or_try_insert_with(key, || {
            let roots = self.assets.load_statements(key)?;
            let root = root_statement(key, &roots)?;
            match root.keyword() {
                "MaterialDef" => self.read_definition(key, root),
                "Material" => Err(MaterialError::WrongAssetKind {
                    key: key.to_string(),
                    expected: "MaterialDef",
                }),
                _ => Err(MaterialError::unexpected(key, root, "MaterialDef")),
            }
        })
    }

    /// Loads a `Material` file.
    pub fn load_instance(&self, key: &str) -> Result<MaterialInstance> {
        match self.load(key)? {
            MaterialAsset::Instance(instance) => Ok(instance),
            MaterialAsset::Definition(_) => Err(MaterialError::WrongAssetKind {
                key: key.to_string(),
                expected: "Material",
            }),
        }
    }

    // ========================================================================
    // MaterialDef
    // ========================================================================

    fn read_definition(&self, key: &str, root: &Statement) -> Result<MaterialDefinition> {
        let name = root.argument();
        if name.is_empty() {
            return Err(MaterialError::syntax(key, root, "Expected 'MaterialDef <name>'"));
        }
        let mut definition = MaterialDefinition::new(name, key);

        for statement in root.contents() {
            match statement.keyword() {
                "MaterialParameters" => {
                    for line in statement.contents() {
                        definition.add_param(read_param(key, line, &*self.assets)?);
                    }
                }
                "Technique" => {
                    let techniques = TechniqueContext::read(
                        key,
                        &*self.assets,
                        &self.repository,
                        &definition,
                        statement,
                    )?;
                    for technique in techniques {
                        definition.add_technique(technique);
                    }
                }
                _ => {
                    return Err(MaterialError::unexpected(
                        key,
                        statement,
                        "Technique or MaterialParameters",
                    ));
                }
            }
        }

        log::debug!(
            "Loaded material definition {} from {key}: {} parameters, {} techniques",
            definition.name(),
            definition.params().len(),
            definition.techniques().len()
        );
        Ok(definition)
    }

    // ========================================================================
    // Material
    // ========================================================================

    /// `Material <name> : <definition>`
    fn read_instance(&self, key: &str, root: &Statement) -> Result<MaterialInstance> {
        let Some((name, extended)) = root.argument().split_once(':') else {
            return Err(MaterialError::syntax(
                key,
                root,
                "Expected 'Material <name> : <definition>'",
            ));
        };
        let (name, extended) = (name.trim(), extended.trim());
        if extended.is_empty() {
            return Err(MaterialError::syntax(key, root, "Missing material definition"));
        }

        let definition = self.load_definition(extended)?;
        let mut instance = MaterialInstance::new(name, key, Arc::clone(&definition));

        for statement in root.contents() {
            let Some(keyword) = InstanceKeyword::from_keyword(statement.keyword()) else {
                return Err(MaterialError::unexpected(
                    key,
                    statement,
                    &InstanceKeyword::expected(),
                ));
            };
            match keyword {
                InstanceKeyword::MaterialParameters => {
                    for line in statement.contents() {
                        self.read_instance_param(key, &definition, &mut instance, line)?;
                    }
                }
                InstanceKeyword::AdditionalRenderState => {
                    let state = read_render_state(key, statement.contents())?;
                    let merged = instance.additional_render_state().merged_with(&state);
                    *instance.additional_render_state_mut() = merged;
                }
                InstanceKeyword::Transparent => {
                    instance.set_transparent(parse_toggle(key, statement, statement.argument())?);
                }
            }
        }
        Ok(instance)
    }

    /// `<param> : <value>`
    fn read_instance_param(
        &self,
        key: &str,
        definition: &MaterialDefinition,
        instance: &mut MaterialInstance,
        statement: &Statement,
    ) -> Result<()> {
        let Some((name, value)) = statement.line().split_once(':') else {
            return Err(MaterialError::syntax(key, statement, "Expected '<param> : <value>'"));
        };
        let (name, value) = (name.trim(), value.trim());
        if value.is_empty() {
            return Err(MaterialError::syntax(
                key,
                statement,
                format!("Missing value for {name}"),
            ));
        }
        let Some(param) = definition.param(name) else {
            return Err(MaterialError::semantic(
                key,
                statement,
                format!("The material parameter {name} is undefined in {}", definition.name()),
            ));
        };
        let value = read_value(key, statement, param.var_type, value, &*self.assets)?;
        instance.set_param(name, value);
        Ok(())
    }
}
