//! Shader Node Graph Tests
//!
//! Tests for:
//! - Namespace resolution of input and output mappings
//! - Type and multiplicity checks on every mapping
//! - Node conditions and the defines they register
//! - Varyings between the vertex and fragment stage
//! - Unused node tracking
//! - Graph errors (stage mismatch, samplers, attributes, globals)

mod common;

use myth_shadernodes::prelude::*;
use myth_shadernodes::shader_nodes::Namespace;
use myth_shadernodes::{ShaderGenerationInfo, ShaderNode, WorldBinding};

use common::{PASS_VERTEX, load_definition, material_def};

const PARAMS: &str = r"
        Vector4 Color
        Vector3 Tint
        Texture2D ColorMap
        Boolean UseFog
        Int NumberOfBones
        Matrix4Array BoneMatrices
        Matrix4 Single";

fn fragment_technique(nodes: &str) -> String {
    material_def(
        PARAMS,
        &format!("{PASS_VERTEX}\n        FragmentShaderNodes {{\n{nodes}\n        }}"),
    )
}

/// Loads a node technique and returns its graph.
fn graph(text: &str) -> Result<(ShaderGenerationInfo, Vec<ShaderNode>, TechniqueDefinition)> {
    let definition = load_definition(text)?;
    let technique = definition.default_technique().unwrap().clone();
    let program = technique.node_program().expect("node technique").clone();
    Ok((program.info, program.nodes, technique))
}

const COLOR_NODE: &str = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Color
                }
                OutputMappings {
                    Global.color = outColor
                }
            }";

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_attribute_and_global_resolution() {
    let (info, nodes, technique) = graph(&fragment_technique(COLOR_NODE)).unwrap();
    assert!(technique.uses_shader_nodes());

    assert_eq!(info.attributes.len(), 1);
    assert_eq!(info.attributes[0].name, "inPosition");
    assert_eq!(info.attributes[0].var_type, "vec4");

    let global = info.vertex_global.as_ref().unwrap();
    assert_eq!(global.glsl_name(), "Global_position");
    assert_eq!(info.fragment_globals.len(), 1);
    assert_eq!(info.fragment_globals[0].glsl_name(), "Global_color");

    assert_eq!(nodes.len(), 2);
    assert!(info.unused_nodes.is_empty());
}

#[test]
fn test_material_param_becomes_prefixed_uniform() {
    let (info, nodes, _) = graph(&fragment_technique(COLOR_NODE)).unwrap();

    assert!(info.vertex_uniforms.is_empty());
    assert_eq!(info.fragment_uniforms.len(), 1);
    let uniform = &info.fragment_uniforms[0];
    assert_eq!(uniform.glsl_name(), "m_Color");
    assert_eq!(uniform.var_type, "vec4");
    assert!(uniform.condition.is_none());

    let paint = &nodes[1];
    let mapping = paint.input_mapping("color1").unwrap();
    assert_eq!(mapping.left.namespace, Namespace::Node("Paint".to_string()));
    assert_eq!(mapping.right.namespace, Namespace::MaterialParam);
}

#[test]
fn test_world_param_is_registered_on_technique() {
    let text = material_def(
        PARAMS,
        r"
        VertexShaderNodes {
            ShaderNode Transform {
                Definition : Transform : Nodes/Basic.j3sn
                InputMappings {
                    worldViewProjectionMatrix = WorldParam.WorldViewProjectionMatrix
                    modelPosition = Global.position.xyz
                }
                OutputMappings {
                    Global.position = projPosition
                }
            }
        }",
    );
    let (info, _, technique) = graph(&text).unwrap();
    assert_eq!(technique.world_params(), [WorldBinding::WorldViewProjectionMatrix]);
    assert_eq!(info.vertex_uniforms[0].glsl_name(), "g_WorldViewProjectionMatrix");
    assert_eq!(info.vertex_uniforms[0].var_type, "mat4");
}

#[test]
fn test_shared_uniform_declared_once() {
    let nodes = r"
            ShaderNode A {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Color
                }
            }
            ShaderNode B {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = A.outColor
                    color2 = MatParam.Color
                }
                OutputMappings {
                    Global.color = outColor
                }
            }";
    let (info, _, _) = graph(&fragment_technique(nodes)).unwrap();
    assert_eq!(info.fragment_uniforms.len(), 1);
    assert!(info.unused_nodes.is_empty());
}

#[test]
fn test_inline_definitions() {
    let text = material_def(
        PARAMS,
        &format!(
            r"
        ShaderNodesDefinitions {{
            ShaderNodeDefinition Inline {{
                Type: Fragment
                Shader GLSL100: Nodes/FlatColor.frag
                Output {{
                    vec4 color
                }}
            }}
        }}
{PASS_VERTEX}
        FragmentShaderNodes {{
            ShaderNode Flat {{
                Definition : Inline
                OutputMappings {{
                    Global.color = color
                }}
            }}
        }}"
        ),
    );
    let (_, nodes, _) = graph(&text).unwrap();
    assert_eq!(nodes[1].definition.name, "Inline");
}

// ============================================================================
// Type Check Tests
// ============================================================================

#[test]
fn test_type_mismatch_is_rejected() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Tint
                }
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("Type mismatch, cannot convert vec3 to vec4"));
}

#[test]
fn test_swizzle_makes_types_compatible() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1.xyz = MatParam.Tint
                    color2 = MatParam.Color.wzyx
                }
                OutputMappings {
                    Global.color = outColor
                }
            }";
    let (_, nodes, _) = graph(&fragment_technique(nodes)).unwrap();
    let mapping = nodes[1].input_mapping("color1").unwrap();
    assert_eq!(mapping.left_swizzle, "xyz");
}

#[test]
fn test_array_multiplicity_from_int_param() {
    let text = material_def(
        PARAMS,
        r"
        VertexShaderNodes {
            ShaderNode Skin {
                Definition : Skinning : Nodes/Basic.j3sn
                InputMappings {
                    position = Global.position
                    boneMatrices = MatParam.BoneMatrices
                }
                OutputMappings {
                    Global.position = position
                }
            }
        }",
    );
    let (info, nodes, technique) = graph(&text).unwrap();

    let mapping = nodes[0].input_mapping("boneMatrices").unwrap();
    assert_eq!(mapping.left.multiplicity.as_deref(), Some("NUMBEROFBONES"));
    assert_eq!(mapping.right.multiplicity.as_deref(), Some("NUMBEROFBONES"));
    assert_eq!(mapping.left.condition.as_deref(), Some("defined(NUMBEROFBONES)"));
    assert_eq!(technique.define_names(), ["NUMBEROFBONES"]);
    assert_eq!(info.vertex_uniforms[0].glsl_name(), "m_BoneMatrices");
}

#[test]
fn test_array_input_needs_array_param() {
    let text = material_def(
        PARAMS,
        r"
        VertexShaderNodes {
            ShaderNode Skin {
                Definition : Skinning : Nodes/Basic.j3sn
                InputMappings {
                    boneMatrices = MatParam.Single
                }
            }
        }",
    );
    let err = graph(&text).unwrap_err();
    assert!(err.to_string().contains("Single is not of Array type"));
}

// ============================================================================
// Condition Tests
// ============================================================================

#[test]
fn test_node_condition_registers_define() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                Condition : UseFog && ColorMap
                InputMappings {
                    color1 = MatParam.Color
                }
                OutputMappings {
                    Global.color = outColor
                }
            }";
    let (_, nodes, technique) = graph(&fragment_technique(nodes)).unwrap();
    assert_eq!(
        nodes[1].condition.as_deref(),
        Some("defined(USEFOG) && defined(COLORMAP)")
    );
    assert_eq!(technique.define_names(), ["USEFOG", "COLORMAP"]);
}

#[test]
fn test_condition_on_unknown_param() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                Condition : UseSnow
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("UseSnow is not a declared material parameter"));
}

#[test]
fn test_conditional_mapping_guards_uniform() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Color : UseFog
                }
                OutputMappings {
                    Global.color = outColor
                }
            }";
    let (info, nodes, _) = graph(&fragment_technique(nodes)).unwrap();
    let mapping = nodes[1].input_mapping("color1").unwrap();
    assert_eq!(mapping.condition.as_deref(), Some("defined(USEFOG)"));
    assert_eq!(
        info.fragment_uniforms[0].condition.as_deref(),
        Some("(defined(USEFOG))")
    );
}

#[test]
fn test_shared_uniform_guard_keeps_every_user() {
    let params = format!("{PARAMS}\n        Boolean Other");
    let node = |name: &str, condition: &str| {
        format!(
            r"
            ShaderNode {name} {{
                Definition : ColorMult : Nodes/Basic.j3sn
                Condition : {condition}
                InputMappings {{
                    color1 = MatParam.Color
                }}
                OutputMappings {{
                    Global.color = outColor
                }}
            }}"
        )
    };
    let technique = |nodes: String| {
        material_def(
            &params,
            &format!("{PASS_VERTEX}\n        FragmentShaderNodes {{\n{nodes}\n        }}"),
        )
    };

    // Stronger condition first: the weaker one must still widen the guard.
    let nested = format!("{}{}", node("A", "UseFog && Other"), node("B", "UseFog"));
    let (info, _, _) = graph(&technique(nested)).unwrap();
    assert_eq!(
        info.fragment_uniforms[0].condition.as_deref(),
        Some("(defined(USEFOG) && defined(OTHER)) || (defined(USEFOG))")
    );

    // Identical conditions collapse.
    let same = format!("{}{}", node("A", "UseFog"), node("B", "UseFog"));
    let (info, _, _) = graph(&technique(same)).unwrap();
    assert_eq!(
        info.fragment_uniforms[0].condition.as_deref(),
        Some("defined(USEFOG)")
    );
}

// ============================================================================
// Varying Tests
// ============================================================================

const VARYING_TECHNIQUE: &str = r"
        VertexShaderNodes {
            ShaderNode Transform {
                Definition : Transform : Nodes/Basic.j3sn
                InputMappings {
                    worldViewProjectionMatrix = WorldParam.WorldViewProjectionMatrix
                    modelPosition = Global.position.xyz
                    texCoord1 = Attr.inTexCoord
                }
                OutputMappings {
                    Global.position = projPosition
                }
            }
        }
        FragmentShaderNodes {
            ShaderNode Tex {
                Definition : TextureFetch : Nodes/Basic.j3sn
                InputMappings {
                    textureMap = MatParam.ColorMap
                    texCoord = Transform.texCoord1
                }
                OutputMappings {
                    Global.color = outColor
                }
            }
        }";

#[test]
fn test_vertex_output_read_in_fragment_becomes_varying() {
    let (info, nodes, _) = graph(&material_def(PARAMS, VARYING_TECHNIQUE)).unwrap();

    assert_eq!(info.varyings.len(), 1);
    let varying = &info.varyings[0];
    assert_eq!(varying.glsl_name(), "Transform_texCoord1");
    assert_eq!(varying.var_type, "vec2");

    // The pass-through input now writes the varying directly.
    let input = nodes[0].input_mapping("texCoord1").unwrap();
    assert!(input.left.shader_output);

    assert!(info.is_varying(&Namespace::Node("Transform".to_string()), "texCoord1"));
    assert_eq!(info.attributes.len(), 1);
    assert_eq!(info.attributes[0].var_type, "vec2");
}

#[test]
fn test_conditional_input_aliasing_varying_is_narrowed() {
    let params = format!("{PARAMS}\n        Boolean Other");
    let technique = r"
        VertexShaderNodes {
            ShaderNode Transform {
                Definition : Transform : Nodes/Basic.j3sn
                Condition : UseFog
                InputMappings {
                    worldViewProjectionMatrix = WorldParam.WorldViewProjectionMatrix
                    modelPosition = Global.position.xyz
                    texCoord1 = Attr.inTexCoord : Other
                }
                OutputMappings {
                    Global.position = projPosition
                }
            }
        }
        FragmentShaderNodes {
            ShaderNode Tex {
                Definition : TextureFetch : Nodes/Basic.j3sn
                Condition : UseFog
                InputMappings {
                    textureMap = MatParam.ColorMap
                    texCoord = Transform.texCoord1
                }
                OutputMappings {
                    Global.color = outColor
                }
            }
        }";
    let (info, nodes, _) = graph(&material_def(&params, technique)).unwrap();

    // Producer and consumer share one guard.
    assert_eq!(info.varyings[0].condition.as_deref(), Some("defined(USEFOG)"));
    // The write keeps its own condition and gains the varying's.
    let input = nodes[0].input_mapping("texCoord1").unwrap();
    assert_eq!(
        input.condition.as_deref(),
        Some("(defined(OTHER))&&(defined(USEFOG))")
    );
    assert_eq!(
        info.attributes[0].condition.as_deref(),
        Some("(defined(USEFOG)) && ((defined(OTHER)))")
    );
}

#[test]
fn test_conditional_input_aliasing_unguarded_varying() {
    let technique = VARYING_TECHNIQUE.replace(
        "texCoord1 = Attr.inTexCoord",
        "texCoord1 = Attr.inTexCoord : UseFog",
    );
    let (info, nodes, _) = graph(&material_def(PARAMS, &technique)).unwrap();

    assert!(info.varyings[0].condition.is_none());
    let input = nodes[0].input_mapping("texCoord1").unwrap();
    assert_eq!(input.condition.as_deref(), Some("defined(USEFOG)"));
}

#[test]
fn test_sampler_uniform_picks_requested_type() {
    let (info, _, _) = graph(&material_def(PARAMS, VARYING_TECHNIQUE)).unwrap();
    let sampler = &info.fragment_uniforms[0];
    assert_eq!(sampler.glsl_name(), "m_ColorMap");
    assert_eq!(sampler.var_type, "sampler2D");
}

// ============================================================================
// Unused Node Tests
// ============================================================================

#[test]
fn test_unconsumed_node_stays_unused() {
    let nodes = r"
            ShaderNode Dead {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Color
                }
            }
            ShaderNode Flat {
                Definition : FlatColor : Nodes/Basic.j3sn
                OutputMappings {
                    Global.color = color
                }
            }";
    let (info, _, _) = graph(&fragment_technique(nodes)).unwrap();
    assert!(info.is_unused("Dead"));
    assert!(!info.is_unused("Flat"));
    assert!(!info.is_unused("PassPosition"));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_sampler_needs_uniform_source() {
    let nodes = r"
            ShaderNode Flat {
                Definition : FlatColor : Nodes/Basic.j3sn
            }
            ShaderNode Tex {
                Definition : TextureFetch : Nodes/Basic.j3sn
                InputMappings {
                    textureMap = Flat.color
                }
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.to_string().contains("Samplers can only be assigned from MatParam or WorldParam"));
}

#[test]
fn test_attribute_in_fragment_stage() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = Attr.inColor
                }
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("Cannot have an attribute as input in a fragment shader"));
}

#[test]
fn test_single_vertex_global() {
    let text = material_def(
        PARAMS,
        r"
        VertexShaderNodes {
            ShaderNode First {
                Definition : PassPosition : Nodes/Basic.j3sn
                InputMappings {
                    ModelSpacePosition = Attr.inPosition
                }
                OutputMappings {
                    Global.position = ModelSpacePosition
                }
            }
            ShaderNode Second {
                Definition : PassPosition : Nodes/Basic.j3sn
                InputMappings {
                    ModelSpacePosition = Attr.inPosition
                }
                OutputMappings {
                    Global.normal = ModelSpacePosition
                }
            }
        }",
    );
    let err = graph(&text).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("A vertex shader can only have one global output"));
}

#[test]
fn test_definition_stage_must_match_block() {
    let text = material_def(
        PARAMS,
        r"
        VertexShaderNodes {
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
            }
        }",
    );
    let err = graph(&text).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("ColorMult is a Fragment definition"));
}

#[test]
fn test_node_must_be_declared_before_use() {
    let nodes = r"
            ShaderNode Early {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = Late.outColor
                }
            }
            ShaderNode Late {
                Definition : FlatColor : Nodes/Basic.j3sn
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.to_string().contains("Undeclared node Late"));
}

#[test]
fn test_duplicate_node_names() {
    let nodes = r"
            ShaderNode PassPosition {
                Definition : FlatColor : Nodes/Basic.j3sn
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.to_string().contains("A ShaderNode with the name PassPosition already exists"));
}

#[test]
fn test_unknown_definition_in_file() {
    let nodes = r"
            ShaderNode Paint {
                Definition : Blur : Nodes/Basic.j3sn
            }";
    let err = graph(&fragment_technique(nodes)).unwrap_err();
    assert!(err.to_string().contains("Could not find definition Blur in Nodes/Basic.j3sn"));
}

#[test]
fn test_unknown_input_and_output_names() {
    let input = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color3 = MatParam.Color
                }
            }";
    let err = graph(&fragment_technique(input)).unwrap_err();
    assert!(err.to_string().contains("Could not find input variable color3"));

    let output = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                OutputMappings {
                    Global.color = result
                }
            }";
    let err = graph(&fragment_technique(output)).unwrap_err();
    assert!(err.to_string().contains("result is not an output variable of ColorMult"));
}

#[test]
fn test_files_and_nodes_do_not_mix() {
    let text = material_def(
        PARAMS,
        &format!("        VertexShader GLSL100 : Shaders/a.vert\n{PASS_VERTEX}"),
    );
    let err = load_definition(&text).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("Cannot mix shader files and shader nodes"));
}

#[test]
fn test_error_reports_line() {
    let nodes = r"
            ShaderNode Paint {
                Definition : ColorMult : Nodes/Basic.j3sn
                InputMappings {
                    color1 = MatParam.Tint
                }
            }";
    let text = fragment_technique(nodes);
    let expected_line = text
        .lines()
        .position(|l| l.contains("color1 = MatParam.Tint"))
        .unwrap()
        + 1;
    let err = load_definition(&text).unwrap_err();
    assert_eq!(err.line(), Some(expected_line));
}
