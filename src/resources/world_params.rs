//! Engine-provided uniforms.
//!
//! A technique lists the world bindings it needs in `WorldParameters`; shader
//! nodes read them through the `WorldParam` namespace. The renderer updates
//! them every frame, materials never set them.

use crate::statement::keyword_table;

/// Prefix of world binding uniforms in generated source.
pub const WORLD_UNIFORM_PREFIX: &str = "g_";

keyword_table! {
    pub enum WorldBinding {
        WorldMatrix => "WorldMatrix",
        ViewMatrix => "ViewMatrix",
        ProjectionMatrix => "ProjectionMatrix",
        WorldViewMatrix => "WorldViewMatrix",
        NormalMatrix => "NormalMatrix",
        WorldViewProjectionMatrix => "WorldViewProjectionMatrix",
        ViewProjectionMatrix => "ViewProjectionMatrix",
        WorldNormalMatrix => "WorldNormalMatrix",
        WorldMatrixInverseTranspose => "WorldMatrixInverseTranspose",
        WorldMatrixInverse => "WorldMatrixInverse",
        ViewMatrixInverse => "ViewMatrixInverse",
        ProjectionMatrixInverse => "ProjectionMatrixInverse",
        ViewProjectionMatrixInverse => "ViewProjectionMatrixInverse",
        WorldViewMatrixInverse => "WorldViewMatrixInverse",
        NormalMatrixInverse => "NormalMatrixInverse",
        WorldViewProjectionMatrixInverse => "WorldViewProjectionMatrixInverse",
        ViewPort => "ViewPort",
        FrustumNearFar => "FrustumNearFar",
        Resolution => "Resolution",
        ResolutionInverse => "ResolutionInverse",
        Aspect => "Aspect",
        CameraPosition => "CameraPosition",
        CameraDirection => "CameraDirection",
        CameraLeft => "CameraLeft",
        CameraUp => "CameraUp",
        Time => "Time",
        Tpf => "Tpf",
        FrameRate => "FrameRate",
        LightDirection => "LightDirection",
        LightPosition => "LightPosition",
        AmbientLightColor => "AmbientLightColor",
        LightColor => "LightColor",
    }
}

impl WorldBinding {
    #[must_use]
    pub fn glsl_type(self) -> &'static str {
        match self {
            Self::NormalMatrix
            | Self::WorldNormalMatrix
            | Self::WorldMatrixInverseTranspose
            | Self::NormalMatrixInverse => "mat3",
            Self::WorldMatrix
            | Self::ViewMatrix
            | Self::ProjectionMatrix
            | Self::WorldViewMatrix
            | Self::WorldViewProjectionMatrix
            | Self::ViewProjectionMatrix
            | Self::WorldMatrixInverse
            | Self::ViewMatrixInverse
            | Self::ProjectionMatrixInverse
            | Self::ViewProjectionMatrixInverse
            | Self::WorldViewMatrixInverse
            | Self::WorldViewProjectionMatrixInverse => "mat4",
            Self::ViewPort
            | Self::LightDirection
            | Self::LightPosition
            | Self::AmbientLightColor
            | Self::LightColor => "vec4",
            Self::CameraPosition | Self::CameraDirection | Self::CameraLeft | Self::CameraUp => {
                "vec3"
            }
            Self::FrustumNearFar | Self::Resolution | Self::ResolutionInverse => "vec2",
            Self::Aspect | Self::Time | Self::Tpf | Self::FrameRate => "float",
        }
    }

    /// Uniform name in generated source, e.g. `g_WorldViewProjectionMatrix`.
    #[must_use]
    pub fn uniform_name(self) -> String {
        format!("{WORLD_UNIFORM_PREFIX}{}", self.as_str())
    }
}
