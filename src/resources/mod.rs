//! Material Model
//!
//! Data structures produced by the loaders and consumed by the generator.
//! Nothing here parses text or touches a GPU:
//! - [`VarType`]: material parameter value types and their GLSL spelling
//! - [`DefineTable`]: fixed-capacity `#define` slot table
//! - [`RenderState`]: fixed-function state of a technique
//! - [`TextureKey`]: texture reference with sampling options
//! - [`WorldBinding`]: engine-provided uniforms
//! - [`TechniqueDefinition`], [`MaterialDefinition`], [`MaterialInstance`]

pub mod define_table;
pub mod material;
pub mod render_state;
pub mod technique;
pub mod texture;
pub mod var_type;
pub mod world_params;

pub use define_table::{DefineTable, MAX_DEFINES};
pub use material::{
    ColorSpace, MaterialDefinition, MaterialInstance, MaterialParameter, ParamValue,
};
pub use render_state::{
    BlendEquation, BlendEquationAlpha, BlendMode, FaceCullMode, RenderState, RenderStateFields,
    TestFunction,
};
pub use technique::{
    LightMode, LightSpace, NodeProgram, ShaderStage, ShadowMode, TechniqueDefinition,
    TechniqueProgram,
};
pub use texture::{MagFilter, MinFilter, TextureKey, TextureKind, WrapAxis, WrapMode};
pub use var_type::VarType;
pub use world_params::WorldBinding;
