use std::fmt;
use std::sync::Arc;

use crate::{
    error::{SynthError, SynthResult},
    registry::TransformRegistry,
};

/// Per-frame sampling context handed to dynamic arguments and uniform
/// bindings by the renderer.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    /// Elapsed time in seconds.
    pub time: f64,
    pub bpm: f64,
    /// Viewport resolution in pixels.
    pub resolution: [f64; 2],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
}

/// A nullary time-sampling function. Arguments wrapped in one of these
/// become uniforms resampled every frame instead of compile-time
/// literals.
#[derive(Clone)]
pub struct TimeVarying {
    f: Arc<dyn Fn(&FrameContext) -> UniformValue + Send + Sync>,
}

impl TimeVarying {
    pub fn new(f: impl Fn(&FrameContext) -> UniformValue + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn scalar(f: impl Fn(&FrameContext) -> f64 + Send + Sync + 'static) -> Self {
        Self::new(move |ctx| UniformValue::Float(f(ctx)))
    }

    pub fn sample(&self, ctx: &FrameContext) -> UniformValue {
        (self.f)(ctx)
    }
}

impl fmt::Debug for TimeVarying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimeVarying(..)")
    }
}

/// An argument supplied to a transform application. Resolution into a
/// literal, a uniform binding or an inlined nested pipeline happens at
/// compile time.
#[derive(Clone, Debug)]
pub enum ArgValue {
    Float(f64),
    Vec(Vec<f64>),
    /// Sampler handle name, resolved to a real texture by the renderer.
    Texture(String),
    Dynamic(TimeVarying),
    Pipeline(PipelineNode),
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<TimeVarying> for ArgValue {
    fn from(v: TimeVarying) -> Self {
        Self::Dynamic(v)
    }
}

impl From<PipelineNode> for ArgValue {
    fn from(p: PipelineNode) -> Self {
        Self::Pipeline(p)
    }
}

/// One transform application in a chain. Only the transform name and the
/// supplied arguments are stored; the descriptor is looked up at compile
/// time against the compile's registry snapshot, so re-registering a name
/// affects every pipeline on its next compile.
#[derive(Clone, Debug)]
pub struct TransformApplication {
    pub name: String,
    pub args: Vec<ArgValue>,
}

/// An ordered, non-empty chain of transform applications. The first step
/// has a kind that needs no upstream stream (source or coordinate); every
/// later step consumes the previous step's output as its first stream
/// argument. Both invariants are enforced at construction, through
/// [`TransformRegistry::start`] and [`PipelineNode::chain`].
#[derive(Clone, Debug)]
pub struct PipelineNode {
    steps: Vec<TransformApplication>,
}

impl PipelineNode {
    pub(crate) fn begin(step: TransformApplication) -> Self {
        Self { steps: vec![step] }
    }

    pub fn steps(&self) -> &[TransformApplication] {
        &self.steps
    }

    /// Append a transform by name. The registry is only consulted for the
    /// chain invariant (the name must exist and must not be a source);
    /// argument resolution happens at compile time.
    pub fn chain(
        mut self,
        registry: &TransformRegistry,
        name: &str,
        args: Vec<ArgValue>,
    ) -> SynthResult<Self> {
        let kind = registry
            .kind_of(name)
            .ok_or_else(|| SynthError::UnknownTransform(name.to_string()))?;
        if !kind.consumes_stream() {
            return Err(SynthError::chain(format!(
                "source transform '{name}' cannot be appended mid-chain; it starts a new pipeline"
            )));
        }
        self.steps.push(TransformApplication {
            name: name.to_string(),
            args,
        });
        Ok(self)
    }
}
