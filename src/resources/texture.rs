//! Texture references held by material parameters.
//!
//! Materials never own image data; a texture-typed parameter stores a
//! [`TextureKey`] describing where the image lives and how it is sampled.
//! Decoding happens in the renderer.

use serde::Serialize;

use crate::resources::var_type::VarType;
use crate::statement::keyword_table;

keyword_table! {
    #[derive(Default)]
    pub enum MinFilter {
        NearestNoMipMaps => "NearestNoMipMaps",
        BilinearNoMipMaps => "BilinearNoMipMaps",
        NearestNearestMipMap => "NearestNearestMipMap",
        BilinearNearestMipMap => "BilinearNearestMipMap",
        NearestLinearMipMap => "NearestLinearMipMap",
        #[default]
        Trilinear => "Trilinear",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum MagFilter {
        Nearest => "Nearest",
        #[default]
        Bilinear => "Bilinear",
    }
}

keyword_table! {
    #[derive(Default)]
    pub enum WrapMode {
        Repeat => "Repeat",
        MirroredRepeat => "MirroredRepeat",
        #[default]
        EdgeClamp => "EdgeClamp",
    }
}

keyword_table! {
    pub enum WrapAxis {
        S => "S",
        T => "T",
        R => "R",
    }
}

/// Dimensionality hint passed to the image loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TextureKind {
    #[default]
    TwoDimensional,
    ThreeDimensional,
    Array,
    CubeMap,
}

impl TextureKind {
    /// Hint implied by the parameter type declaring the texture.
    #[must_use]
    pub fn for_var_type(var_type: VarType) -> Self {
        match var_type {
            VarType::Texture3D => Self::ThreeDimensional,
            VarType::TextureArray => Self::Array,
            VarType::TextureCubeMap => Self::CubeMap,
            _ => Self::TwoDimensional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextureKey {
    pub path: String,
    pub flip_y: bool,
    pub generate_mips: bool,
    pub kind: TextureKind,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    /// `true` when the image was not found and the renderer should bind its
    /// placeholder image instead.
    pub placeholder: bool,
}

impl TextureKey {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            flip_y: false,
            generate_mips: true,
            kind: TextureKind::default(),
            min_filter: MinFilter::default(),
            mag_filter: MagFilter::default(),
            wrap_s: WrapMode::default(),
            wrap_t: WrapMode::default(),
            wrap_r: WrapMode::default(),
            placeholder: false,
        }
    }

    /// Applies a wrap mode to one axis, or to all axes when `axis` is `None`.
    pub fn set_wrap(&mut self, axis: Option<WrapAxis>, mode: WrapMode) {
        match axis {
            Some(WrapAxis::S) => self.wrap_s = mode,
            Some(WrapAxis::T) => self.wrap_t = mode,
            Some(WrapAxis::R) => self.wrap_r = mode,
            None => {
                self.wrap_s = mode;
                self.wrap_t = mode;
                self.wrap_r = mode;
            }
        }
    }
}
