use crate::error::{SynthError, SynthResult};

/// Structural kind of a transform. The kind fixes the generated GLSL
/// function's result type and its leading stream parameters, and how many
/// upstream streams an application consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransformKind {
    #[serde(rename = "src")]
    Source,
    #[serde(rename = "coord")]
    Coordinate,
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "combine")]
    Combine,
    #[serde(rename = "combineCoord")]
    CombineCoord,
}

impl TransformKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "src" => Some(Self::Source),
            "coord" => Some(Self::Coordinate),
            "color" => Some(Self::Color),
            "combine" => Some(Self::Combine),
            "combineCoord" => Some(Self::CombineCoord),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Source => "src",
            Self::Coordinate => "coord",
            Self::Color => "color",
            Self::Combine => "combine",
            Self::CombineCoord => "combineCoord",
        }
    }

    pub fn result_type(&self) -> GlslType {
        match self {
            Self::Source | Self::Color | Self::Combine => GlslType::Vec4,
            Self::Coordinate | Self::CombineCoord => GlslType::Vec2,
        }
    }

    /// Fixed leading parameters of the generated function, ahead of the
    /// declared inputs.
    pub fn base_params(&self) -> &'static str {
        match self {
            Self::Source | Self::Coordinate => "vec2 _st",
            Self::Color => "vec4 _c0",
            Self::Combine => "vec4 _c0, vec4 _c1",
            Self::CombineCoord => "vec2 _st, vec4 _c0",
        }
    }

    /// Kinds with no upstream stream; only these may begin a pipeline.
    pub fn starts_pipeline(&self) -> bool {
        matches!(self, Self::Source | Self::Coordinate)
    }

    /// Kinds that consume the previous step's output; only these may
    /// appear after the first step.
    pub fn consumes_stream(&self) -> bool {
        !matches!(self, Self::Source)
    }

    /// Combinators consume a second full stream as an argument.
    pub fn is_combinator(&self) -> bool {
        matches!(self, Self::Combine | Self::CombineCoord)
    }
}

/// Value types an input can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Texture,
}

impl GlslType {
    /// Spelling inside generated GLSL. Texture inputs are sampler2D both
    /// as function parameters and as uniform declarations.
    pub fn glsl(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Texture => "sampler2D",
        }
    }
}

/// A default an input may declare. Untagged so catalogs can write plain
/// numbers for float inputs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Float(f64),
    Vec(Vec<f64>),
    Texture(String),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: GlslType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<LiteralValue>,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, value_type: GlslType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: None,
        }
    }

    pub fn with_default(mut self, default: LiteralValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Authoring form of a transform, as written in catalogs (the kind is a
/// free string here; validation turns it into a [`TransformDescriptor`]).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransformDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    pub glsl: String,
}

impl TransformDef {
    pub fn new(name: impl Into<String>, kind: &str, glsl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.to_string(),
            inputs: Vec::new(),
            glsl: glsl.into(),
        }
    }

    pub fn input(mut self, spec: InputSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    pub fn validate(&self) -> SynthResult<TransformDescriptor> {
        let kind = TransformKind::from_name(&self.kind)
            .ok_or_else(|| SynthError::UnknownKind(self.kind.clone()))?;

        // The second stream of a combinator is an ordinary positional
        // argument at the call site, inserted ahead of the declared
        // inputs. It is not part of the generated function signature;
        // the base params already carry it.
        let mut call_inputs = Vec::with_capacity(self.inputs.len() + 1);
        if kind.is_combinator() {
            call_inputs.push(InputSpec::new("other", GlslType::Vec4));
        }
        call_inputs.extend(self.inputs.iter().cloned());

        Ok(TransformDescriptor {
            name: self.name.clone(),
            kind,
            inputs: self.inputs.clone(),
            call_inputs,
            body: self.glsl.clone(),
        })
    }
}

/// Validated transform, as stored by the registry.
#[derive(Clone, Debug)]
pub struct TransformDescriptor {
    pub name: String,
    pub kind: TransformKind,
    /// Declared inputs, in signature order.
    pub inputs: Vec<InputSpec>,
    /// Call-argument view: for combinators the implicit `other` stream
    /// input followed by the declared inputs, otherwise the declared
    /// inputs alone.
    pub call_inputs: Vec<InputSpec>,
    pub body: String,
}

impl TransformDescriptor {
    /// Full parameter list of the generated function.
    pub fn signature(&self) -> String {
        let base = self.kind.base_params();
        let custom = self
            .inputs
            .iter()
            .map(|input| format!("{} {}", input.value_type.glsl(), input.name))
            .collect::<Vec<_>>()
            .join(", ");
        if custom.is_empty() {
            base.to_string()
        } else {
            format!("{base}, {custom}")
        }
    }

    /// Synthesize the complete GLSL function definition.
    pub fn glsl_definition(&self) -> String {
        format!(
            "{} {}({}) {{\n{}\n}}",
            self.kind.result_type().glsl(),
            self.name,
            self.signature(),
            indent_body(&self.body, 1)
        )
    }
}

/// Re-indent a body under the function braces: the common leading margin
/// is stripped and replaced, so nesting inside the body survives.
fn indent_body(source: &str, levels: usize) -> String {
    let indent = "  ".repeat(levels);
    let source = source.replace("\r\n", "\n");
    let source = source.trim_matches('\n');
    let margin = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .min()
        .unwrap_or(0);
    source
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                let body: String = line.chars().skip(margin).collect();
                format!("{indent}{}", body.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osc_def() -> TransformDef {
        TransformDef::new("osc", "src", "return vec4(vec3(sin(_st.x * freq)), 1.0);").input(
            InputSpec::new("freq", GlslType::Float).with_default(LiteralValue::Float(60.0)),
        )
    }

    #[test]
    fn kind_table_matches_base_signatures() {
        assert_eq!(TransformKind::Source.base_params(), "vec2 _st");
        assert_eq!(TransformKind::Coordinate.base_params(), "vec2 _st");
        assert_eq!(TransformKind::Color.base_params(), "vec4 _c0");
        assert_eq!(TransformKind::Combine.base_params(), "vec4 _c0, vec4 _c1");
        assert_eq!(
            TransformKind::CombineCoord.base_params(),
            "vec2 _st, vec4 _c0"
        );
        assert_eq!(TransformKind::Combine.result_type(), GlslType::Vec4);
        assert_eq!(TransformKind::CombineCoord.result_type(), GlslType::Vec2);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let def = TransformDef::new("warp", "renderpass", "return _c0;");
        match def.validate() {
            Err(SynthError::UnknownKind(k)) => assert_eq!(k, "renderpass"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn signature_appends_declared_inputs() {
        let d = osc_def().validate().unwrap();
        assert_eq!(d.signature(), "vec2 _st, float freq");
        assert!(d.glsl_definition().starts_with("vec4 osc(vec2 _st, float freq) {"));
    }

    #[test]
    fn combinator_gains_implicit_stream_input() {
        let def = TransformDef::new("blend", "combine", "return mix(_c0, _c1, amount);").input(
            InputSpec::new("amount", GlslType::Float).with_default(LiteralValue::Float(0.5)),
        );
        let d = def.validate().unwrap();
        // Signature carries only declared inputs; the call view gains the
        // second stream ahead of them.
        assert_eq!(d.signature(), "vec4 _c0, vec4 _c1, float amount");
        assert_eq!(d.call_inputs.len(), 2);
        assert_eq!(d.call_inputs[0].name, "other");
        assert_eq!(d.call_inputs[0].value_type, GlslType::Vec4);
    }

    #[test]
    fn multi_line_bodies_keep_relative_indentation() {
        let def = TransformDef::new(
            "cells",
            "src",
            "vec3 c = vec3(0.0);\nfor (int i = 0; i < 3; i++) {\n  c += vec3(0.1);\n}\nreturn vec4(c, 1.0);",
        );
        let text = def.validate().unwrap().glsl_definition();
        assert!(text.contains("\n  for (int i = 0; i < 3; i++) {\n    c += vec3(0.1);\n  }\n"));
    }

    #[test]
    fn indented_bodies_lose_their_common_margin() {
        let body = "    float a = 1.0;\n    if (a > 0.0) {\n      a = 0.0;\n    }\n    return vec4(a);";
        assert_eq!(
            indent_body(body, 1),
            "  float a = 1.0;\n  if (a > 0.0) {\n    a = 0.0;\n  }\n  return vec4(a);"
        );
    }

    #[test]
    fn defs_round_trip_through_json() {
        let json = r#"{
            "name": "osc",
            "type": "src",
            "inputs": [
                { "name": "freq", "type": "float", "default": 60.0 },
                { "name": "sync", "type": "float", "default": 0.1 }
            ],
            "glsl": "return vec4(1.0);"
        }"#;
        let def: TransformDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.kind, "src");
        assert_eq!(def.inputs[0].default, Some(LiteralValue::Float(60.0)));
        let d = def.validate().unwrap();
        assert_eq!(d.kind, TransformKind::Source);
    }
}
