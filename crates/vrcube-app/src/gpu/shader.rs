//! Shader sources, per-stage validation and the vertex/fragment link check.

use std::collections::BTreeSet;
use std::fmt;

use wgpu::naga;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::RenderError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY,
            ShaderStage::Fragment => FRAGMENT_ENTRY,
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// WGSL source for one shader stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub label: String,
    pub wgsl: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, label: impl Into<String>, wgsl: impl Into<String>) -> Self {
        Self {
            stage,
            label: label.into(),
            wgsl: wgsl.into(),
        }
    }

    pub fn cube_vertex() -> Self {
        Self::new(
            ShaderStage::Vertex,
            "cube vertex",
            include_str!("shaders/cube.vert.wgsl"),
        )
    }

    pub fn cube_fragment() -> Self {
        Self::new(
            ShaderStage::Fragment,
            "cube fragment",
            include_str!("shaders/cube.frag.wgsl"),
        )
    }
}

/// A stage that parsed and validated.
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub module: naga::Module,
}

/// Parses and validates one stage.
///
/// Failures carry the full diagnostic, rendered against the source.
pub fn compile(source: &ShaderSource) -> Result<CompiledStage, RenderError> {
    let fail = |log: String| RenderError::ShaderCompile {
        stage: source.stage,
        log,
    };

    let module = naga::front::wgsl::parse_str(&source.wgsl)
        .map_err(|e| fail(e.emit_to_string(&source.wgsl)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(&source.wgsl)))?;

    let entry = source.stage.entry_point();
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == source.stage.naga_stage());
    if !found {
        return Err(fail(format!(
            "{}: missing @{} entry point `{entry}`",
            source.label, source.stage
        )));
    }

    Ok(CompiledStage {
        stage: source.stage,
        module,
    })
}

/// Checks that every fragment input location is written by the vertex stage.
pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<(), RenderError> {
    let (Some(outputs), Some(inputs)) = (
        stage_locations(vertex, Interface::Outputs),
        stage_locations(fragment, Interface::Inputs),
    ) else {
        return Err(RenderError::ProgramLink {
            log: "program needs one vertex and one fragment stage".to_string(),
        });
    };

    let missing: Vec<String> = inputs
        .difference(&outputs)
        .map(|loc| format!("fragment input @location({loc}) is not written by the vertex stage"))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RenderError::ProgramLink {
            log: missing.join("\n"),
        })
    }
}

enum Interface {
    Inputs,
    Outputs,
}

fn stage_locations(compiled: &CompiledStage, side: Interface) -> Option<BTreeSet<u32>> {
    let module = &compiled.module;
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == compiled.stage.naga_stage())?;

    let mut out = BTreeSet::new();
    match side {
        Interface::Inputs => {
            for arg in &entry.function.arguments {
                collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
            }
        }
        Interface::Outputs => {
            if let Some(result) = &entry.function.result {
                collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
            }
        }
    }
    Some(out)
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}
