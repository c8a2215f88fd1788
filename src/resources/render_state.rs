//! Fixed-function render state of a technique.
//!
//! Every setter records the field it touched in [`RenderStateFields`], so a
//! material instance's `AdditionalRenderState` can be layered over the
//! technique's state without resetting fields it never mentioned.

use bitflags::bitflags;
use serde::Serialize;

use crate::statement::keyword_table;

keyword_table! {
    #[derive(Default)]
    pub enum FaceCullMode {
        Off => "Off",
        Front => "Front",
        #[default]
        Back => "Back",
        FrontAndBack => "FrontAndBack",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum BlendMode {
        #[default]
        Off => "Off",
        Additive => "Additive",
        PremultAlpha => "PremultAlpha",
        AlphaAdditive => "AlphaAdditive",
        Color => "Color",
        Alpha => "Alpha",
        AlphaSumA => "AlphaSumA",
        Modulate => "Modulate",
        ModulateX2 => "ModulateX2",
        Screen => "Screen",
        Exclusion => "Exclusion",
        Custom => "Custom",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum BlendEquation {
        #[default]
        Add => "Add",
        Subtract => "Subtract",
        ReverseSubtract => "ReverseSubtract",
        Min => "Min",
        Max => "Max",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum BlendEquationAlpha {
        #[default]
        InheritColor => "InheritColor",
        Add => "Add",
        Subtract => "Subtract",
        ReverseSubtract => "ReverseSubtract",
        Min => "Min",
        Max => "Max",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum TestFunction {
        Never => "Never",
        Equal => "Equal",
        Less => "Less",
        #[default]
        LessOrEqual => "LessOrEqual",
        Greater => "Greater",
        GreaterOrEqual => "GreaterOrEqual",
        NotEqual => "NotEqual",
        Always => "Always",
    }
}

bitflags! {
    /// Fields explicitly assigned on a [`RenderState`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderStateFields: u16 {
        const WIREFRAME            = 1 << 0;
        const FACE_CULL            = 1 << 1;
        const DEPTH_WRITE          = 1 << 2;
        const DEPTH_TEST           = 1 << 3;
        const COLOR_WRITE          = 1 << 4;
        const BLEND_MODE           = 1 << 5;
        const BLEND_EQUATION       = 1 << 6;
        const BLEND_EQUATION_ALPHA = 1 << 7;
        const POLY_OFFSET          = 1 << 8;
        const DEPTH_FUNC           = 1 << 9;
        const LINE_WIDTH           = 1 << 10;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    wireframe: bool,
    face_cull: FaceCullMode,
    depth_write: bool,
    depth_test: bool,
    color_write: bool,
    blend_mode: BlendMode,
    blend_equation: BlendEquation,
    blend_equation_alpha: BlendEquationAlpha,
    /// `(factor, units)` when polygon offset is enabled.
    poly_offset: Option<(f32, f32)>,
    depth_func: TestFunction,
    line_width: f32,
    #[serde(skip)]
    applied: RenderStateFields,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            wireframe: false,
            face_cull: FaceCullMode::Back,
            depth_write: true,
            depth_test: true,
            color_write: true,
            blend_mode: BlendMode::Off,
            blend_equation: BlendEquation::Add,
            blend_equation_alpha: BlendEquationAlpha::InheritColor,
            poly_offset: None,
            depth_func: TestFunction::LessOrEqual,
            line_width: 1.0,
            applied: RenderStateFields::empty(),
        }
    }
}

macro_rules! state_accessors {
    ($($field:ident : $ty:ty => $setter:ident, $flag:ident;)*) => {
        $(
            #[inline]
            #[must_use]
            pub fn $field(&self) -> $ty {
                self.$field
            }

            pub fn $setter(&mut self, value: $ty) {
                self.$field = value;
                self.applied |= RenderStateFields::$flag;
            }
        )*
    };
}

impl RenderState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    state_accessors! {
        wireframe: bool => set_wireframe, WIREFRAME;
        face_cull: FaceCullMode => set_face_cull, FACE_CULL;
        depth_write: bool => set_depth_write, DEPTH_WRITE;
        depth_test: bool => set_depth_test, DEPTH_TEST;
        color_write: bool => set_color_write, COLOR_WRITE;
        blend_mode: BlendMode => set_blend_mode, BLEND_MODE;
        blend_equation: BlendEquation => set_blend_equation, BLEND_EQUATION;
        blend_equation_alpha: BlendEquationAlpha => set_blend_equation_alpha, BLEND_EQUATION_ALPHA;
        poly_offset: Option<(f32, f32)> => set_poly_offset, POLY_OFFSET;
        depth_func: TestFunction => set_depth_func, DEPTH_FUNC;
        line_width: f32 => set_line_width, LINE_WIDTH;
    }

    /// Fields assigned through a setter since construction.
    #[inline]
    #[must_use]
    pub fn applied(&self) -> RenderStateFields {
        self.applied
    }

    /// Returns `self` with every field explicitly set on `additional`
    /// replaced by the value from `additional`.
    #[must_use]
    pub fn merged_with(&self, additional: &RenderState) -> RenderState {
        let mut merged = self.clone();
        let fields = additional.applied;
        if fields.contains(RenderStateFields::WIREFRAME) {
            merged.set_wireframe(additional.wireframe);
        }
        if fields.contains(RenderStateFields::FACE_CULL) {
            merged.set_face_cull(additional.face_cull);
        }
        if fields.contains(RenderStateFields::DEPTH_WRITE) {
            merged.set_depth_write(additional.depth_write);
        }
        if fields.contains(RenderStateFields::DEPTH_TEST) {
            merged.set_depth_test(additional.depth_test);
        }
        if fields.contains(RenderStateFields::COLOR_WRITE) {
            merged.set_color_write(additional.color_write);
        }
        if fields.contains(RenderStateFields::BLEND_MODE) {
            merged.set_blend_mode(additional.blend_mode);
        }
        if fields.contains(RenderStateFields::BLEND_EQUATION) {
            merged.set_blend_equation(additional.blend_equation);
        }
        if fields.contains(RenderStateFields::BLEND_EQUATION_ALPHA) {
            merged.set_blend_equation_alpha(additional.blend_equation_alpha);
        }
        if fields.contains(RenderStateFields::POLY_OFFSET) {
            merged.set_poly_offset(additional.poly_offset);
        }
        if fields.contains(RenderStateFields::DEPTH_FUNC) {
            merged.set_depth_func(additional.depth_func);
        }
        if fields.contains(RenderStateFields::LINE_WIDTH) {
            merged.set_line_width(additional.line_width);
        }
        merged
    }
}
