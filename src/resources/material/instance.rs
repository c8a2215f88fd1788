use std::sync::Arc;

use crate::errors::Result;
use crate::resources::define_table::DefineTable;
use crate::resources::render_state::RenderState;
use crate::resources::technique::TechniqueDefinition;

use super::{MaterialDefinition, ParamValue};

/// A material: a definition plus concrete parameter values.
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    name: String,
    asset_name: String,
    definition: Arc<MaterialDefinition>,
    params: Vec<(String, ParamValue)>,
    additional_render_state: RenderState,
    transparent: bool,
}

impl MaterialInstance {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        asset_name: impl Into<String>,
        definition: Arc<MaterialDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            asset_name: asset_name.into(),
            definition,
            params: Vec::new(),
            additional_render_state: RenderState::default(),
            transparent: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    #[inline]
    #[must_use]
    pub fn definition(&self) -> &Arc<MaterialDefinition> {
        &self.definition
    }

    /// Assigns a parameter value. Returns `false` if the definition does not
    /// declare `name`; the value is then dropped.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> bool {
        if self.definition.param(name).is_none() {
            return false;
        }
        if let Some(slot) = self.params.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.params.push((name.to_string(), value));
        }
        true
    }

    /// Value set on this instance, ignoring definition defaults.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value set on this instance, falling back to the definition default.
    #[must_use]
    pub fn effective_param(&self, name: &str) -> Option<&ParamValue> {
        self.param(name)
            .or_else(|| self.definition.param(name).and_then(|p| p.value.as_ref()))
    }

    /// Instance values in assignment order.
    #[must_use]
    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    #[must_use]
    pub fn additional_render_state(&self) -> &RenderState {
        &self.additional_render_state
    }

    pub fn additional_render_state_mut(&mut self) -> &mut RenderState {
        &mut self.additional_render_state
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Render state for `technique` with this instance's overrides applied.
    #[must_use]
    pub fn render_state_for(&self, technique: &TechniqueDefinition) -> RenderState {
        let base = technique.render_state().cloned().unwrap_or_default();
        let merged = base.merged_with(&self.additional_render_state);
        match technique.forced_render_state() {
            Some(forced) => merged.merged_with(forced),
            None => merged,
        }
    }

    /// Evaluates the parameter-bound defines of `technique` for this material.
    #[must_use]
    pub fn define_table(&self, technique: &TechniqueDefinition) -> DefineTable {
        let mut table = DefineTable::new(technique.define_names().len());
        for (param, slot) in technique.param_defines() {
            if let Some(payload) = self.effective_param(param).and_then(ParamValue::define_payload) {
                table.set(slot, payload);
            }
        }
        table
    }

    /// `#define` block of `technique` for this material.
    pub fn define_source(&self, technique: &TechniqueDefinition) -> Result<String> {
        self.define_table(technique)
            .generate_source(technique.define_names(), technique.define_types())
    }
}
