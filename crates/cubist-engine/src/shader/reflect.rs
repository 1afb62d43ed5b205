//! Per-stage compilation and interface reflection on top of naga.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::{ShaderError, Stage};

/// Shape of a location-bound value (vertex input or inter-stage varying).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueType {
    /// `f32` or `vecN<f32>`.
    Float(u32),
    /// Anything else, kept as a printable description.
    Other(String),
}

impl ValueType {
    fn of(inner: &naga::TypeInner) -> Self {
        match *inner {
            naga::TypeInner::Scalar(scalar) if scalar.kind == naga::ScalarKind::Float => {
                ValueType::Float(1)
            }
            naga::TypeInner::Vector { size, scalar } if scalar.kind == naga::ScalarKind::Float => {
                ValueType::Float(size as u32)
            }
            ref other => ValueType::Other(format!("{other:?}")),
        }
    }
}

/// A location-bound input or output of an entry point.
#[derive(Debug, Clone)]
pub(crate) struct LocationSlot {
    pub name: String,
    pub location: u32,
    pub ty: ValueType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Matrix4,
    Texture2d,
    Sampler,
    Unsupported(String),
}

/// A global declared with `@group/@binding`.
#[derive(Debug, Clone)]
pub(crate) struct ResourceSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// Everything the linker needs to know about one compiled stage.
#[derive(Debug, Clone)]
pub(crate) struct StageInterface {
    pub entry_point: String,
    pub inputs: Vec<LocationSlot>,
    pub outputs: Vec<LocationSlot>,
    pub resources: Vec<ResourceSlot>,
}

/// Parses and validates one WGSL stage, then reflects its interface.
pub(crate) fn compile_stage(stage: Stage, source: &str) -> Result<StageInterface, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        diagnostic: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            diagnostic: error_chain(&e),
        })?;

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga())
        .ok_or(ShaderError::MissingEntryPoint { stage })?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let resources = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            Some(ResourceSlot {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                kind: resource_kind(&module.types[var.ty].inner),
            })
        })
        .collect();

    Ok(StageInterface {
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

fn collect_locations(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<LocationSlot>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(LocationSlot {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty: ValueType::of(inner),
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn resource_kind(inner: &naga::TypeInner) -> ResourceKind {
    match *inner {
        naga::TypeInner::Matrix {
            columns: naga::VectorSize::Quad,
            rows: naga::VectorSize::Quad,
            scalar,
        } if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 => ResourceKind::Matrix4,
        naga::TypeInner::Image {
            dim: naga::ImageDimension::D2,
            arrayed: false,
            class: naga::ImageClass::Sampled { multi: false, .. },
        } => ResourceKind::Texture2d,
        naga::TypeInner::Sampler { comparison: false } => ResourceKind::Sampler,
        ref other => ResourceKind::Unsupported(format!("{other:?}")),
    }
}

/// Flattens an error and its sources into one diagnostic string.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
