//! Parameter declarations and typed literals.
//!
//! ```text
//! MaterialParameters {
//!     Texture2D DiffuseMap -LINEAR
//!     Color Diffuse (MaterialDiffuse) : 1.0 1.0 1.0 1.0
//!     Texture2D NormalMap : MinTrilinear WrapRepeat_S "Textures/Normal Map.png"
//! }
//! ```

use glam::{Vec2, Vec3, Vec4};

use crate::assets::io::AssetProvider;
use crate::errors::{MaterialError, Result};
use crate::resources::material::{ColorSpace, MaterialParameter, ParamValue};
use crate::resources::texture::{MagFilter, MinFilter, TextureKey, TextureKind, WrapAxis, WrapMode};
use crate::resources::var_type::VarType;
use crate::statement::Statement;

/// Parses `<Type> <Name> [(ffbinding)] [-LINEAR] [: <default>]`.
pub(crate) fn read_param(
    file: &str,
    statement: &Statement,
    assets: &dyn AssetProvider,
) -> Result<MaterialParameter> {
    let line = statement.line().trim();
    let (declaration, default) = match line.split_once(':') {
        Some((declaration, default)) => (declaration.trim(), Some(default.trim())),
        None => (line, None),
    };

    let mut color_space = None;
    let mut ff_binding = None;
    let mut words: Vec<&str> = Vec::with_capacity(2);
    for token in declaration.split_whitespace() {
        if token == "-LINEAR" {
            color_space = Some(ColorSpace::Linear);
        } else if let Some(binding) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            ff_binding = Some(binding.to_string());
        } else {
            words.push(token);
        }
    }

    let [type_token, name] = words.as_slice() else {
        return Err(MaterialError::syntax(
            file,
            statement,
            "Expected '<Type> <Name> [(binding)] [-LINEAR] [: <default>]'",
        ));
    };
    let Some(var_type) = VarType::from_declaration(type_token) else {
        return Err(MaterialError::syntax(
            file,
            statement,
            format!("Unknown parameter type '{type_token}'"),
        ));
    };

    let mut param = MaterialParameter::new(*name, var_type);
    param.color_space = color_space;
    param.ff_binding = ff_binding;
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        param.value = Some(read_value(file, statement, var_type, default, assets)?);
    }
    Ok(param)
}

/// Parses a literal of `var_type`.
pub(crate) fn read_value(
    file: &str,
    statement: &Statement,
    var_type: VarType,
    text: &str,
    assets: &dyn AssetProvider,
) -> Result<ParamValue> {
    if var_type.is_texture() {
        return Ok(ParamValue::Texture(read_texture(file, statement, var_type, text, assets)));
    }

    let Some(expected) = var_type.literal_token_count() else {
        return Err(MaterialError::syntax(
            file,
            statement,
            format!("{var_type} parameters have no literal form"),
        ));
    };
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != expected {
        let entries = if expected == 1 { "entry" } else { "entries" };
        return Err(MaterialError::syntax(
            file,
            statement,
            format!("{var_type} value must have {expected} {entries}, got '{text}'"),
        ));
    }

    let float = |index: usize| -> Result<f32> {
        tokens[index].parse::<f32>().map_err(|_| {
            MaterialError::syntax(
                file,
                statement,
                format!("Invalid float '{}' in {var_type} value", tokens[index]),
            )
        })
    };

    Ok(match var_type {
        VarType::Float => ParamValue::Float(float(0)?),
        VarType::Int => ParamValue::Int(tokens[0].parse::<i32>().map_err(|_| {
            MaterialError::syntax(file, statement, format!("Invalid int '{}'", tokens[0]))
        })?),
        VarType::Boolean => ParamValue::Boolean(match tokens[0].to_ascii_lowercase().as_str() {
            "true" | "on" => true,
            "false" | "off" => false,
            other => {
                return Err(MaterialError::syntax(
                    file,
                    statement,
                    format!("Invalid boolean '{other}'"),
                ));
            }
        }),
        VarType::Vector2 => ParamValue::Vector2(Vec2::new(float(0)?, float(1)?)),
        VarType::Vector3 => ParamValue::Vector3(Vec3::new(float(0)?, float(1)?, float(2)?)),
        VarType::Vector4 => {
            ParamValue::Vector4(Vec4::new(float(0)?, float(1)?, float(2)?, float(3)?))
        }
        _ => {
            return Err(MaterialError::syntax(
                file,
                statement,
                format!("{var_type} parameters have no literal form"),
            ));
        }
    })
}

// ============================================================================
// Textures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureOption {
    Flip,
    Repeat,
    Min(MinFilter),
    Mag(MagFilter),
    Wrap(Option<WrapAxis>, WrapMode),
}

impl TextureOption {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "Flip" => return Some(Self::Flip),
            "Repeat" => return Some(Self::Repeat),
            _ => {}
        }
        if let Some(filter) = token.strip_prefix("Min") {
            return MinFilter::from_keyword(filter).map(Self::Min);
        }
        if let Some(filter) = token.strip_prefix("Mag") {
            return MagFilter::from_keyword(filter).map(Self::Mag);
        }
        let wrap = token.strip_prefix("Wrap")?;
        match wrap.split_once('_') {
            Some((mode, axis)) => Some(Self::Wrap(
                Some(WrapAxis::from_keyword(axis)?),
                WrapMode::from_keyword(mode)?,
            )),
            None => WrapMode::from_keyword(wrap).map(|mode| Self::Wrap(None, mode)),
        }
    }

    fn is_legacy(self) -> bool {
        matches!(self, Self::Flip | Self::Repeat)
    }

    fn apply(self, key: &mut TextureKey) {
        match self {
            Self::Flip => key.flip_y = true,
            Self::Repeat => key.set_wrap(None, WrapMode::Repeat),
            Self::Min(filter) => key.min_filter = filter,
            Self::Mag(filter) => key.mag_filter = filter,
            Self::Wrap(axis, mode) => key.set_wrap(axis, mode),
        }
    }
}

/// Splits on whitespace, keeping `"..."` and `'...'` runs as one token
/// without their quotes.
fn tokenize_texture_value(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = value.trim().chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' || c == '\'' {
            chars.next();
            for c2 in chars.by_ref() {
                if c2 == c {
                    break;
                }
                token.push(c2);
            }
        } else {
            while let Some(&c2) = chars.peek() {
                if c2.is_whitespace() {
                    break;
                }
                token.push(c2);
                chars.next();
            }
        }
        tokens.push(token);
    }
    tokens
}

/// Parses `[options...] <path>` into a [`TextureKey`].
///
/// A missing image is not an error: the key is flagged as a placeholder and a
/// warning is logged.
pub(crate) fn read_texture(
    file: &str,
    statement: &Statement,
    var_type: VarType,
    value: &str,
    assets: &dyn AssetProvider,
) -> TextureKey {
    let tokens = tokenize_texture_value(value);
    let mut options = Vec::new();
    let legacy_prefix = tokens.len() > 1
        && matches!(tokens.first().map(String::as_str), Some("Flip" | "Repeat"));

    if let Some((_, leading)) = tokens.split_last() {
        for token in leading {
            match TextureOption::parse(token) {
                Some(option) => options.push(option),
                None if token.contains('/') || token.contains('\\') || legacy_prefix => {}
                None => log::warn!(
                    "Unknown texture option \"{token}\" encountered for \"{value}\" in material {file} (line {})",
                    statement.line_number()
                ),
            }
        }
    }

    let path = if legacy_prefix && options.iter().all(|o| o.is_legacy()) {
        legacy_texture_path(value)
    } else {
        tokens.last().cloned().unwrap_or_default()
    };

    let mut key = TextureKey::new(path);
    for option in options {
        option.apply(&mut key);
    }
    key.kind = TextureKind::for_var_type(var_type);
    key.generate_mips = true;

    if !assets.contains(&key.path) {
        log::warn!("Cannot locate {} for material {file}", key.path);
        key.placeholder = true;
    }
    key
}

/// Legacy form: the path is everything after the `Flip`/`Repeat` prefix, so
/// unquoted paths may contain spaces.
fn legacy_texture_path(value: &str) -> String {
    let mut path = value.trim();
    for prefix in ["Flip Repeat ", "Repeat Flip ", "Flip ", "Repeat "] {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.trim();
            break;
        }
    }
    let path = path.strip_prefix(['"', '\'']).unwrap_or(path);
    let path = path.strip_suffix(['"', '\'']).unwrap_or(path);
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::io::MemoryAssets;

    fn assets() -> MemoryAssets {
        MemoryAssets::new()
            .with_file("Textures/a.png")
            .with_file("Textures/My Image.png")
    }

    fn param(line: &str) -> Result<MaterialParameter> {
        read_param("m.j3md", &Statement::new(4, line), &assets())
    }

    fn texture(value: &str) -> TextureKey {
        read_texture("m.j3m", &Statement::new(1, value), VarType::Texture2D, value, &assets())
    }

    #[test]
    fn declaration_forms() {
        let p = param("Color Diffuse (MaterialDiffuse) : 1 0.5 0 1").unwrap();
        assert_eq!(p.var_type, VarType::Vector4);
        assert_eq!(p.ff_binding.as_deref(), Some("MaterialDiffuse"));
        assert_eq!(p.value, Some(ParamValue::Vector4(Vec4::new(1.0, 0.5, 0.0, 1.0))));

        let p = param("Texture2D LightMap -LINEAR").unwrap();
        assert_eq!(p.color_space, Some(ColorSpace::Linear));
        assert!(p.value.is_none());

        let p = param("Matrix4Array BoneMatrices").unwrap();
        assert!(p.var_type.is_array());

        assert!(param("Float").is_err());
        assert!(param("Quaternion Rotation").is_err());
    }

    #[test]
    fn literal_token_counts_are_exact() {
        let err = param("Vector3 Offset : 1 2").unwrap_err();
        assert!(err.to_string().contains("must have 3 entries"));
        assert!(param("Float Shininess : 1 2").is_err());
        assert!(param("Int Count : 2.5").is_err());
        assert!(param("Matrix3 M : 1").is_err());
        assert_eq!(param("Boolean UseFog : true").unwrap().value, Some(ParamValue::Boolean(true)));
        assert_eq!(param("Int Count : -3").unwrap().value, Some(ParamValue::Int(-3)));
    }

    #[test]
    fn texture_options() {
        let key = texture("MinNearestNoMipMaps MagNearest WrapRepeat_T \"Textures/a.png\"");
        assert_eq!(key.path, "Textures/a.png");
        assert_eq!(key.min_filter, MinFilter::NearestNoMipMaps);
        assert_eq!(key.mag_filter, MagFilter::Nearest);
        assert_eq!(key.wrap_t, WrapMode::Repeat);
        assert_eq!(key.wrap_s, WrapMode::EdgeClamp);
        assert!(!key.placeholder);

        let key = texture("WrapMirroredRepeat Textures/a.png");
        assert_eq!((key.wrap_s, key.wrap_t, key.wrap_r), (WrapMode::MirroredRepeat, WrapMode::MirroredRepeat, WrapMode::MirroredRepeat));
    }

    #[test]
    fn legacy_texture_forms() {
        let key = texture("Flip Repeat Textures/My Image.png");
        assert_eq!(key.path, "Textures/My Image.png");
        assert!(key.flip_y);
        assert_eq!(key.wrap_s, WrapMode::Repeat);
        assert!(!key.placeholder);

        let key = texture("Flip 'Textures/a.png'");
        assert_eq!(key.path, "Textures/a.png");
        assert!(key.flip_y);
    }

    #[test]
    fn missing_texture_gets_placeholder() {
        let key = texture("Bogus Textures/missing.png");
        assert_eq!(key.path, "Textures/missing.png");
        assert!(key.placeholder);
        assert!(key.generate_mips);

        let cube = read_texture(
            "m",
            &Statement::new(1, "x"),
            VarType::TextureCubeMap,
            "Textures/Sky.dds",
            &assets(),
        );
        assert_eq!(cube.kind, TextureKind::CubeMap);
    }
}
