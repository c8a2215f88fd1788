//! `RenderState`, `ForcedRenderState` and `AdditionalRenderState` blocks.

use crate::assets::loaders::{parse_float, parse_keyword, parse_toggle};
use crate::errors::{MaterialError, Result};
use crate::resources::render_state::{
    BlendEquation, BlendEquationAlpha, BlendMode, FaceCullMode, RenderState, TestFunction,
};
use crate::statement::{Statement, keyword_table};

keyword_table! {
    enum StateKeyword {
        Wireframe => "Wireframe",
        FaceCull => "FaceCull",
        DepthWrite => "DepthWrite",
        DepthTest => "DepthTest",
        Blend => "Blend",
        BlendEquation => "BlendEquation",
        BlendEquationAlpha => "BlendEquationAlpha",
        PolyOffset => "PolyOffset",
        ColorWrite => "ColorWrite",
        DepthFunc => "DepthFunc",
        LineWidth => "LineWidth",
        // Accepted and ignored.
        AlphaTestFalloff => "AlphaTestFalloff",
        PointSprite => "PointSprite",
    }
}

/// Parses the `<Key> <value...>` lines of a render state block. Only the
/// listed fields are marked as applied on the result.
pub(crate) fn read_render_state(file: &str, statements: &[Statement]) -> Result<RenderState> {
    let mut state = RenderState::new();
    for statement in statements {
        let tokens: Vec<&str> = statement.tokens().collect();
        let Some(keyword) = StateKeyword::from_keyword(statement.keyword()) else {
            return Err(MaterialError::unexpected(file, statement, "a render state key"));
        };
        if matches!(keyword, StateKeyword::AlphaTestFalloff | StateKeyword::PointSprite) {
            continue;
        }

        let expected = if keyword == StateKeyword::PolyOffset { 3 } else { 2 };
        if tokens.len() != expected {
            return Err(MaterialError::syntax(
                file,
                statement,
                format!("{keyword} expects {} value(s), got {}", expected - 1, tokens.len() - 1),
            ));
        }
        let value = tokens[1];

        match keyword {
            StateKeyword::Wireframe => state.set_wireframe(parse_toggle(file, statement, value)?),
            StateKeyword::FaceCull => {
                state.set_face_cull(parse_keyword::<FaceCullMode>(file, statement, value)?);
            }
            StateKeyword::DepthWrite => {
                state.set_depth_write(parse_toggle(file, statement, value)?);
            }
            StateKeyword::DepthTest => state.set_depth_test(parse_toggle(file, statement, value)?),
            StateKeyword::Blend => {
                state.set_blend_mode(parse_keyword::<BlendMode>(file, statement, value)?);
            }
            StateKeyword::BlendEquation => {
                state.set_blend_equation(parse_keyword::<BlendEquation>(file, statement, value)?);
            }
            StateKeyword::BlendEquationAlpha => state.set_blend_equation_alpha(
                parse_keyword::<BlendEquationAlpha>(file, statement, value)?,
            ),
            StateKeyword::PolyOffset => {
                let factor = parse_float(file, statement, value)?;
                let units = parse_float(file, statement, tokens[2])?;
                state.set_poly_offset(Some((factor, units)));
            }
            StateKeyword::ColorWrite => {
                state.set_color_write(parse_toggle(file, statement, value)?);
            }
            StateKeyword::DepthFunc => {
                state.set_depth_func(parse_keyword::<TestFunction>(file, statement, value)?);
            }
            StateKeyword::LineWidth => state.set_line_width(parse_float(file, statement, value)?),
            StateKeyword::AlphaTestFalloff | StateKeyword::PointSprite => {}
        }
    }
    Ok(state)
}
