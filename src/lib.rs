#![forbid(unsafe_code)]

pub mod assemble;
pub mod builtins;
pub mod codegen;
pub mod error;
pub mod pipeline;
pub mod registry;
mod resolve;
pub mod transform;

pub use assemble::Precision;
pub use codegen::{CompiledProgram, UniformBinding, UniformSource, compile, compile_with_precision};
pub use error::{SynthError, SynthResult};
pub use pipeline::{
    ArgValue, FrameContext, PipelineNode, TimeVarying, TransformApplication, UniformValue,
};
pub use registry::{RegistryChange, RegistrySnapshot, TransformRegistry};
pub use transform::{
    GlslType, InputSpec, LiteralValue, TransformDef, TransformDescriptor, TransformKind,
};
