use std::sync::Arc;

use crate::assets::io::AssetProvider;
use crate::assets::loaders::shader_node::{LoaderSettings, ShaderNodeDefinitionLoader};
use crate::assets::storage::AssetStorage;
use crate::errors::Result;
use crate::shader_nodes::definition::ShaderNodeDefinition;

/// Definitions parsed from one `ShaderNodeDefinitions` file.
#[derive(Debug)]
pub struct DefinitionFile {
    pub path: String,
    pub definitions: Vec<Arc<ShaderNodeDefinition>>,
}

impl DefinitionFile {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<ShaderNodeDefinition>> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// Shared cache of node definitions keyed by defining file.
///
/// Injected into every [`MaterialLoader`](crate::assets::MaterialLoader) that
/// should share parsed definitions. Safe to use from several loaders at once.
#[derive(Debug, Default)]
pub struct DefinitionRepository {
    files: AssetStorage<DefinitionFile>,
    loader: ShaderNodeDefinitionLoader,
}

impl DefinitionRepository {
    #[must_use]
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            files: AssetStorage::new(),
            loader: ShaderNodeDefinitionLoader::new(settings),
        }
    }

    /// Parses `path` on first use and returns every definition it holds.
    pub fn load_file(&self, assets: &dyn AssetProvider, path: &str) -> Result<Arc<DefinitionFile>> {
        self.files.get_or_try_insert_with(path, || {
            let roots = assets.load_statements(path)?;
            let definitions = self
                .loader
                .load(path, &roots)?
                .into_iter()
                .map(Arc::new)
                .collect();
            Ok(DefinitionFile {
                path: path.to_string(),
                definitions,
            })
        })
    }

    /// Looks `name` up in `path`, loading the file if needed.
    pub fn definition(
        &self,
        assets: &dyn AssetProvider,
        path: &str,
        name: &str,
    ) -> Result<Option<Arc<ShaderNodeDefinition>>> {
        Ok(self.load_file(assets, path)?.find(name).cloned())
    }

    /// Already parsed definition, without touching the asset provider.
    #[must_use]
    pub fn cached(&self, path: &str, name: &str) -> Option<Arc<ShaderNodeDefinition>> {
        self.files.get(path).and_then(|file| file.find(name).cloned())
    }

    /// Number of parsed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
