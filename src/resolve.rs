use std::collections::HashMap;

use crate::{
    codegen::{UniformBinding, UniformSource},
    error::{SynthError, SynthResult},
    pipeline::{ArgValue, PipelineNode},
    transform::{GlslType, InputSpec, LiteralValue, TransformDescriptor},
};

/// One resolved call argument, ready for text generation.
#[derive(Debug)]
pub(crate) enum ResolvedArg<'a> {
    Literal(String),
    Dynamic(UniformBinding),
    Nested(&'a PipelineNode),
}

/// Deterministic uniform-name synthesis: `<transform>_<input>_<occurrence>`,
/// with the occurrence counter keyed per (transform, input) across one
/// whole compile. Collisions are impossible by construction.
#[derive(Default)]
pub(crate) struct UniformNamer {
    counts: HashMap<(String, String), usize>,
}

impl UniformNamer {
    pub(crate) fn next(&mut self, transform: &str, input: &str) -> String {
        let n = self
            .counts
            .entry((transform.to_string(), input.to_string()))
            .or_insert(0);
        let name = format!("{transform}_{input}_{n}");
        *n += 1;
        name
    }
}

/// Resolve the supplied arguments of one application against the
/// descriptor's call inputs, in order: positional value, else declared
/// default, else [`SynthError::MissingArgument`].
///
/// Surplus positional arguments beyond the declared inputs are ignored
/// deterministically.
pub(crate) fn resolve_arguments<'a>(
    descriptor: &TransformDescriptor,
    supplied: &'a [ArgValue],
    namer: &mut UniformNamer,
) -> SynthResult<Vec<ResolvedArg<'a>>> {
    let mut resolved = Vec::with_capacity(descriptor.call_inputs.len());

    for (i, input) in descriptor.call_inputs.iter().enumerate() {
        let arg = match supplied.get(i) {
            Some(ArgValue::Pipeline(p)) => {
                // A second full stream is only meaningful where the
                // signature has a second stream parameter.
                if !descriptor.kind.is_combinator() {
                    return Err(SynthError::invalid_argument_position(
                        &descriptor.name,
                        &input.name,
                    ));
                }
                ResolvedArg::Nested(p)
            }
            Some(ArgValue::Dynamic(tv)) => ResolvedArg::Dynamic(UniformBinding {
                name: namer.next(&descriptor.name, &input.name),
                glsl_type: input.value_type,
                source: UniformSource::TimeVarying(tv.clone()),
            }),
            Some(ArgValue::Float(v)) => ResolvedArg::Literal(format_scalar(input.value_type, *v)),
            Some(ArgValue::Vec(components)) => {
                ResolvedArg::Literal(format_vector(input.value_type, components))
            }
            Some(ArgValue::Texture(handle)) => sampler_binding(handle),
            None => match &input.default {
                Some(lit) => default_arg(input, lit),
                None => {
                    return Err(SynthError::missing_argument(
                        &descriptor.name,
                        &input.name,
                    ));
                }
            },
        };
        resolved.push(arg);
    }

    Ok(resolved)
}

fn default_arg<'a>(input: &InputSpec, lit: &LiteralValue) -> ResolvedArg<'a> {
    match lit {
        LiteralValue::Float(v) => ResolvedArg::Literal(format_scalar(input.value_type, *v)),
        LiteralValue::Vec(components) => {
            ResolvedArg::Literal(format_vector(input.value_type, components))
        }
        LiteralValue::Texture(handle) => sampler_binding(handle),
    }
}

/// Texture values keep their handle name as the uniform name, so every
/// use of the same handle shares one sampler declaration; the renderer
/// resolves the handle to a real texture at bind time.
fn sampler_binding<'a>(handle: &str) -> ResolvedArg<'a> {
    ResolvedArg::Dynamic(UniformBinding {
        name: handle.to_string(),
        glsl_type: GlslType::Texture,
        source: UniformSource::Texture(handle.to_string()),
    })
}

fn format_scalar(value_type: GlslType, v: f64) -> String {
    match value_type {
        GlslType::Vec2 | GlslType::Vec3 | GlslType::Vec4 => format_vector(value_type, &[v]),
        _ => format_float(v),
    }
}

/// Component-wise constructor call sized by the declared type. Missing
/// components default to 0.0, except a vec4 w which defaults to 1.0; a
/// single component splats across the whole vector.
fn format_vector(value_type: GlslType, components: &[f64]) -> String {
    let n = match value_type {
        GlslType::Vec2 => 2,
        GlslType::Vec3 => 3,
        GlslType::Vec4 => 4,
        _ => return format_float(components.first().copied().unwrap_or(0.0)),
    };
    let parts: Vec<String> = (0..n)
        .map(|i| {
            let v = components.get(i).copied().unwrap_or_else(|| {
                if components.len() == 1 {
                    components[0]
                } else if value_type == GlslType::Vec4 && i == 3 {
                    1.0
                } else {
                    0.0
                }
            });
            format_float(v)
        })
        .collect();
    format!("{}({})", value_type.glsl(), parts.join(", "))
}

/// Decimal text with a fractional part, so `60` renders as `60.0` and
/// stays a GLSL float literal.
fn format_float(v: f64) -> String {
    if v.is_finite() && v == v.trunc() && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TimeVarying;
    use crate::registry::TransformRegistry;
    use crate::transform::TransformDef;

    fn descriptor(def: TransformDef) -> TransformDescriptor {
        def.validate().unwrap()
    }

    fn osc() -> TransformDescriptor {
        descriptor(
            TransformDef::new("osc", "src", "return vec4(1.0);")
                .input(InputSpec::new("freq", GlslType::Float).with_default(LiteralValue::Float(60.0)))
                .input(InputSpec::new("sync", GlslType::Float).with_default(LiteralValue::Float(0.1))),
        )
    }

    fn literal_texts<'a>(args: &'a [ResolvedArg<'a>]) -> Vec<&'a str> {
        args.iter()
            .map(|a| match a {
                ResolvedArg::Literal(s) => s.as_str(),
                ResolvedArg::Dynamic(b) => b.name.as_str(),
                ResolvedArg::Nested(_) => "<nested>",
            })
            .collect()
    }

    #[test]
    fn defaults_fill_missing_positions() {
        let d = osc();
        let mut namer = UniformNamer::default();
        let supplied = [ArgValue::Float(30.0)];
        let args = resolve_arguments(&d, &supplied, &mut namer).unwrap();
        assert_eq!(literal_texts(&args), vec!["30.0", "0.1"]);
    }

    #[test]
    fn missing_argument_without_default_is_fatal() {
        let d = descriptor(
            TransformDef::new("luma", "color", "return _c0;")
                .input(InputSpec::new("threshold", GlslType::Float)),
        );
        let mut namer = UniformNamer::default();
        match resolve_arguments(&d, &[], &mut namer) {
            Err(SynthError::MissingArgument { transform, input }) => {
                assert_eq!(transform, "luma");
                assert_eq!(input, "threshold");
            }
            other => panic!("expected MissingArgument, got {:?}", other.err()),
        }
    }

    #[test]
    fn surplus_arguments_are_ignored() {
        let d = osc();
        let mut namer = UniformNamer::default();
        let supplied = [
            ArgValue::Float(1.0),
            ArgValue::Float(2.0),
            ArgValue::Float(3.0),
            ArgValue::Float(4.0),
        ];
        let args = resolve_arguments(&d, &supplied, &mut namer).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(literal_texts(&args), vec!["1.0", "2.0"]);
    }

    #[test]
    fn nested_pipeline_outside_combinator_is_rejected() {
        let registry = TransformRegistry::with_builtins().unwrap();
        let nested = registry.start("osc", vec![]).unwrap();
        let d = descriptor(
            TransformDef::new("invert", "color", "return _c0;")
                .input(InputSpec::new("amount", GlslType::Float).with_default(LiteralValue::Float(1.0))),
        );
        let mut namer = UniformNamer::default();
        let err = resolve_arguments(&d, &[ArgValue::Pipeline(nested)], &mut namer).unwrap_err();
        assert!(matches!(err, SynthError::InvalidArgumentPosition { .. }));
    }

    #[test]
    fn dynamic_names_count_occurrences() {
        let d = osc();
        let mut namer = UniformNamer::default();
        let tv = TimeVarying::scalar(|ctx| ctx.time);
        let twice = [ArgValue::Dynamic(tv.clone()), ArgValue::Dynamic(tv.clone())];
        let once = [ArgValue::Dynamic(tv)];
        let first = resolve_arguments(&d, &twice, &mut namer).unwrap();
        let second = resolve_arguments(&d, &once, &mut namer).unwrap();
        assert_eq!(literal_texts(&first), vec!["osc_freq_0", "osc_sync_0"]);
        assert_eq!(literal_texts(&second)[0], "osc_freq_1");
    }

    #[test]
    fn vector_literals_pad_and_splat() {
        assert_eq!(format_vector(GlslType::Vec2, &[0.5]), "vec2(0.5, 0.5)");
        assert_eq!(
            format_vector(GlslType::Vec4, &[0.1, 0.2, 0.3]),
            "vec4(0.1, 0.2, 0.3, 1.0)"
        );
        assert_eq!(format_float(60.0), "60.0");
        assert_eq!(format_float(0.25), "0.25");
    }
}
