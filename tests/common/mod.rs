//! Shared fixtures for the integration tests.
//!
//! Files are written as brace-delimited text and turned into statement trees
//! the way the external block parser would: one statement per line, blocks
//! opened by a trailing `{` and closed by a lone `}`.

#![allow(dead_code)]

use std::sync::Arc;

use myth_shadernodes::prelude::*;

pub const NODES_FILE: &str = "Nodes/Basic.j3sn";

pub const NODE_DEFINITIONS: &str = r"
ShaderNodeDefinitions {
    ShaderNodeDefinition PassPosition {
        Type: Vertex
        Shader GLSL100: Nodes/PassPosition.vert
        Input {
            vec4 ModelSpacePosition
        }
        Output {
            vec4 ModelSpacePosition
        }
    }
    ShaderNodeDefinition Transform {
        Type: Vertex
        Shader GLSL100: Nodes/Transform.vert
        Input {
            mat4 worldViewProjectionMatrix
            vec3 modelPosition
            vec2 texCoord1
        }
        Output {
            vec4 projPosition
            vec2 texCoord1
        }
    }
    ShaderNodeDefinition ColorMult {
        Type: Fragment
        Shader GLSL100: Nodes/ColorMult.frag
        Shader GLSL150: Nodes/ColorMult150.frag
        Documentation {
            Multiplies two colors
        }
        Input {
            vec4 color1
            vec4 color2 : vec4(1.0)
        }
        Output {
            vec4 outColor
        }
    }
    ShaderNodeDefinition TextureFetch {
        Type: Fragment
        Shader GLSL100: Nodes/TextureFetch.frag
        Input {
            sampler2D textureMap
            vec2 texCoord
        }
        Output {
            vec4 outColor
        }
    }
    ShaderNodeDefinition FlatColor {
        Type: Fragment
        Shader GLSL100: Nodes/FlatColor.frag
        Output {
            vec4 color
        }
    }
    ShaderNodeDefinition Skinning {
        Type: Vertex
        Shader GLSL100: Nodes/Skinning.vert
        Input {
            vec4 position
            mat4 boneMatrices[NumberOfBones]
        }
        Output {
            vec4 position
        }
    }
}
";

pub const PASS_POSITION_SOURCE: &str = "void main(){\n}\n";

pub const TRANSFORM_SOURCE: &str = "\
void main(){
    projPosition = worldViewProjectionMatrix * vec4(modelPosition, 1.0);
}
";

pub const COLOR_MULT_SOURCE: &str = "\
void main(){
    outColor = color1 * color2;
}
";

pub const COLOR_MULT_150_SOURCE: &str = "\
#extension GL_ARB_shader_texture_lod : enable
const float SCALE = 1.0;

void main(){
    outColor = color1 * color2 * SCALE;
}
";

pub const TEXTURE_FETCH_SOURCE: &str = "\
void main(){
    outColor = texture2D(textureMap, texCoord);
}
";

pub const FLAT_COLOR_SOURCE: &str = "\
void main(){
    color = vec4(1.0, 0.0, 0.0, 1.0);
}
";

pub const SKINNING_SOURCE: &str = "\
void main(){
    position = boneMatrices[0] * position;
}
";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parses brace-delimited text into root statements. Line numbers are
/// 1-based positions in `text`.
pub fn parse_statements(text: &str) -> Vec<Statement> {
    let mut stack: Vec<Statement> = vec![Statement::new(0, "")];
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line == "}" {
            let block = stack.pop().expect("unbalanced '}'");
            stack.last_mut().expect("unbalanced '}'").push(block);
        } else if let Some(head) = line.strip_suffix('{') {
            stack.push(Statement::new(index + 1, head.trim_end()));
        } else {
            stack
                .last_mut()
                .expect("statement outside of root")
                .push(Statement::new(index + 1, line));
        }
    }
    assert_eq!(stack.len(), 1, "unclosed block");
    stack.pop().unwrap().contents().to_vec()
}

/// Assets holding the shared node definitions file and every node source.
pub fn node_assets() -> MemoryAssets {
    MemoryAssets::new()
        .with_statements(NODES_FILE, parse_statements(NODE_DEFINITIONS))
        .with_source("Nodes/PassPosition.vert", PASS_POSITION_SOURCE)
        .with_source("Nodes/Transform.vert", TRANSFORM_SOURCE)
        .with_source("Nodes/ColorMult.frag", COLOR_MULT_SOURCE)
        .with_source("Nodes/ColorMult150.frag", COLOR_MULT_150_SOURCE)
        .with_source("Nodes/TextureFetch.frag", TEXTURE_FETCH_SOURCE)
        .with_source("Nodes/FlatColor.frag", FLAT_COLOR_SOURCE)
        .with_source("Nodes/Skinning.vert", SKINNING_SOURCE)
}

/// `MaterialDef Test` with the given parameter lines and technique body.
pub fn material_def(params: &str, technique: &str) -> String {
    format!(
        "MaterialDef Test {{\n    MaterialParameters {{\n{params}\n    }}\n    Technique {{\n{technique}\n    }}\n}}\n"
    )
}

pub fn loader(assets: MemoryAssets) -> MaterialLoader {
    init_logger();
    MaterialLoader::new(Arc::new(assets), Arc::new(DefinitionRepository::default()))
}

/// Loads `text` as `Materials/Test.j3md` next to the node fixtures.
pub fn load_definition(text: &str) -> Result<Arc<MaterialDefinition>> {
    let assets = node_assets().with_statements("Materials/Test.j3md", parse_statements(text));
    loader(assets).load_definition("Materials/Test.j3md")
}

/// Loads a definition and generates its default technique.
pub fn generate(text: &str, caps: GlslCaps) -> Result<GeneratedShader> {
    let assets = node_assets().with_statements("Materials/Test.j3md", parse_statements(text));
    let loader = loader(assets);
    let definition = loader.load_definition("Materials/Test.j3md")?;
    let technique = definition
        .default_technique()
        .expect("definition has a Default technique");
    ShaderGenerator::new(caps).generate(loader.assets(), technique)
}

/// Vertex stage used by fragment-focused tests: position straight through.
pub const PASS_VERTEX: &str = r"
        VertexShaderNodes {
            ShaderNode PassPosition {
                Definition : PassPosition : Nodes/Basic.j3sn
                InputMappings {
                    ModelSpacePosition = Attr.inPosition
                }
                OutputMappings {
                    Global.position = ModelSpacePosition
                }
            }
        }
";
