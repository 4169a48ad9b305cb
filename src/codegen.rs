use std::collections::{BTreeMap, HashSet};

use crate::{
    assemble::{self, Precision},
    error::{SynthError, SynthResult},
    pipeline::{FrameContext, PipelineNode, TimeVarying, UniformValue},
    registry::{RegistrySnapshot, TransformRegistry},
    resolve::{ResolvedArg, UniformNamer, resolve_arguments},
    transform::GlslType,
};

/// The threading variable seeded into the running expression; the entry
/// point declares it from the fragment coordinate.
pub(crate) const EVAL_VAR: &str = "st";

/// Where a uniform's per-frame value comes from.
#[derive(Clone, Debug)]
pub enum UniformSource {
    /// Resampled every frame by the renderer.
    TimeVarying(TimeVarying),
    /// Reserved sampler handle, resolved to a texture by the renderer.
    Texture(String),
}

/// An external parameter the renderer must bind before each draw.
#[derive(Clone, Debug)]
pub struct UniformBinding {
    pub name: String,
    pub glsl_type: GlslType,
    pub source: UniformSource,
}

impl UniformBinding {
    /// Current value for this frame; `None` for texture handles, which
    /// the renderer binds itself.
    pub fn sample(&self, ctx: &FrameContext) -> Option<UniformValue> {
        match &self.source {
            UniformSource::TimeVarying(tv) => Some(tv.sample(ctx)),
            UniformSource::Texture(_) => None,
        }
    }
}

/// A self-contained compiled program: one fragment shader plus the
/// uniforms to bind and refresh every frame. Holds no reference back into
/// the registry.
#[derive(Clone, Debug)]
pub struct CompiledProgram {
    pub source: String,
    pub uniforms: BTreeMap<String, UniformBinding>,
    /// Emitted transform function names, in first-seen order.
    pub functions: Vec<String>,
}

struct GenCtx<'a> {
    snapshot: &'a RegistrySnapshot,
    functions: Vec<(String, String)>,
    emitted: HashSet<String>,
    uniforms: Vec<UniformBinding>,
    uniform_names: HashSet<String>,
    namer: UniformNamer,
}

impl<'a> GenCtx<'a> {
    fn new(snapshot: &'a RegistrySnapshot) -> Self {
        Self {
            snapshot,
            functions: Vec::new(),
            emitted: HashSet::new(),
            uniforms: Vec::new(),
            uniform_names: HashSet::new(),
            namer: UniformNamer::default(),
        }
    }

    fn add_uniform(&mut self, binding: UniformBinding) {
        // Deduped by name; texture handles repeat, generated names don't.
        if self.uniform_names.insert(binding.name.clone()) {
            self.uniforms.push(binding);
        }
    }
}

/// Lower one pipeline into a nested call expression, threading the
/// running value and collecting function definitions and uniforms into
/// the shared compile state. Nested pipelines recurse here with the same
/// state, so their functions and uniforms land in the same program.
fn generate(ctx: &mut GenCtx<'_>, pipeline: &PipelineNode, eval_var: &str) -> SynthResult<String> {
    let mut expr = eval_var.to_string();

    for step in pipeline.steps() {
        let descriptor = ctx
            .snapshot
            .get(&step.name)
            .ok_or_else(|| SynthError::UnknownTransform(step.name.clone()))?
            .clone();

        if ctx.emitted.insert(descriptor.name.clone()) {
            ctx.functions
                .push((descriptor.name.clone(), descriptor.glsl_definition()));
        }

        let resolved = resolve_arguments(&descriptor, &step.args, &mut ctx.namer)?;
        let mut call_args = Vec::with_capacity(resolved.len() + 1);
        call_args.push(expr);
        for arg in resolved {
            match arg {
                ResolvedArg::Literal(text) => call_args.push(text),
                ResolvedArg::Dynamic(binding) => {
                    call_args.push(binding.name.clone());
                    ctx.add_uniform(binding);
                }
                ResolvedArg::Nested(nested) => {
                    call_args.push(generate(ctx, nested, EVAL_VAR)?);
                }
            }
        }
        expr = format!("{}({})", descriptor.name, call_args.join(", "));
    }

    Ok(expr)
}

/// Compile a pipeline into a [`CompiledProgram`] with the default
/// precision.
pub fn compile(
    registry: &TransformRegistry,
    pipeline: &PipelineNode,
) -> SynthResult<CompiledProgram> {
    compile_with_precision(registry, pipeline, Precision::default())
}

/// Compile a pipeline against one consistent registry snapshot. Identical
/// inputs always produce byte-identical program text and uniform names.
#[tracing::instrument(skip(registry, pipeline))]
pub fn compile_with_precision(
    registry: &TransformRegistry,
    pipeline: &PipelineNode,
    precision: Precision,
) -> SynthResult<CompiledProgram> {
    let snapshot = registry.snapshot();
    let mut ctx = GenCtx::new(&snapshot);
    let expr = generate(&mut ctx, pipeline, EVAL_VAR)?;

    let source = assemble::assemble(&expr, &ctx.functions, &ctx.uniforms, precision);
    let functions = ctx.functions.into_iter().map(|(name, _)| name).collect();
    let uniforms = ctx
        .uniforms
        .into_iter()
        .map(|binding| (binding.name.clone(), binding))
        .collect();

    Ok(CompiledProgram {
        source,
        uniforms,
        functions,
    })
}
