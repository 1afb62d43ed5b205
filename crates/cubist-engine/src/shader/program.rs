use std::collections::BTreeMap;

use super::error::{ShaderError, Stage};
use super::reflect::{self, LocationSlot, ResourceKind, ResourceSlot, StageInterface, ValueType};

/// Location of a vertex attribute in the vertex stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeLocation(pub u32);

/// Group/binding pair of a uniform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

impl UniformLocation {
    pub const fn new(group: u32, binding: u32) -> Self {
        Self { group, binding }
    }
}

/// Which stages read a uniform.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StageSet {
    pub vertex: bool,
    pub fragment: bool,
}

impl StageSet {
    fn with(mut self, stage: Stage) -> Self {
        match stage {
            Stage::Vertex => self.vertex = true,
            Stage::Fragment => self.fragment = true,
        }
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformKind {
    /// `mat4x4<f32>` in the uniform address space.
    Matrix4,
    /// `texture_2d<f32>`, sampled through the sampler at `sampler`.
    Texture2d { sampler: UniformLocation },
}

impl UniformKind {
    pub fn describe(self) -> &'static str {
        match self {
            UniformKind::Matrix4 => "4x4 matrix",
            UniformKind::Texture2d { .. } => "2D texture",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: String,
    pub location: AttributeLocation,
    pub components: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub location: UniformLocation,
    pub kind: UniformKind,
    pub visibility: StageSet,
}

/// Reflected inputs of a linked program.
///
/// Attributes are sorted by location and uniforms by group/binding, so
/// backends can derive vertex-buffer slots and bind-group entries in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramLayout {
    pub attributes: Vec<AttributeSlot>,
    pub uniforms: Vec<UniformSlot>,
}

impl ProgramLayout {
    /// Resolves an attribute by exact name.
    pub fn attribute(&self, name: &str) -> Result<&AttributeSlot, ShaderError> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ShaderError::UnknownAttribute(name.to_string()))
    }

    /// Resolves a uniform by exact name.
    pub fn uniform(&self, name: &str) -> Result<&UniformSlot, ShaderError> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| ShaderError::UnknownUniform(name.to_string()))
    }

    /// Resolves an attribute that the caller will feed with `components` floats.
    pub fn bind_attribute(
        &self,
        name: &str,
        components: u32,
    ) -> Result<AttributeLocation, ShaderError> {
        let slot = self.attribute(name)?;
        if slot.components != components {
            return Err(ShaderError::AttributeMismatch {
                name: name.to_string(),
                declared: slot.components,
                bound: components,
            });
        }
        Ok(slot.location)
    }

    pub fn bind_matrix(&self, name: &str) -> Result<UniformLocation, ShaderError> {
        let slot = self.uniform(name)?;
        match slot.kind {
            UniformKind::Matrix4 => Ok(slot.location),
            other => Err(ShaderError::UniformMismatch {
                name: name.to_string(),
                declared: other.describe(),
                expected: UniformKind::Matrix4.describe(),
            }),
        }
    }

    pub fn bind_texture(&self, name: &str) -> Result<UniformLocation, ShaderError> {
        let slot = self.uniform(name)?;
        match slot.kind {
            UniformKind::Texture2d { .. } => Ok(slot.location),
            other => Err(ShaderError::UniformMismatch {
                name: name.to_string(),
                declared: other.describe(),
                expected: "2D texture",
            }),
        }
    }
}

/// Source and entry point of one compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSource {
    pub source: String,
    pub entry_point: String,
}

/// A compiled and linked vertex + fragment pair.
///
/// Built once at startup and never mutated; backends turn it into a device
/// pipeline with [`GraphicsContext::link_program`](crate::graphics::GraphicsContext::link_program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    vertex: StageSource,
    fragment: StageSource,
    layout: ProgramLayout,
}

impl ShaderProgram {
    /// Compiles both stages, checks their interface and reflects the layout.
    ///
    /// Stages are compiled vertex first; the first failing stage is reported.
    pub fn build(vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex = reflect::compile_stage(Stage::Vertex, vertex_source)?;
        let fragment = reflect::compile_stage(Stage::Fragment, fragment_source)?;

        check_varyings(&vertex.outputs, &fragment.inputs)?;
        let attributes = attribute_slots(&vertex.inputs)?;
        let uniforms = uniform_slots(&vertex, &fragment)?;

        log::debug!(
            "linked program: {} attribute(s), {} uniform(s)",
            attributes.len(),
            uniforms.len()
        );

        Ok(Self {
            vertex: StageSource {
                source: vertex_source.to_string(),
                entry_point: vertex.entry_point,
            },
            fragment: StageSource {
                source: fragment_source.to_string(),
                entry_point: fragment.entry_point,
            },
            layout: ProgramLayout {
                attributes,
                uniforms,
            },
        })
    }

    pub fn vertex(&self) -> &StageSource {
        &self.vertex
    }

    pub fn fragment(&self) -> &StageSource {
        &self.fragment
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }
}

fn check_varyings(outputs: &[LocationSlot], inputs: &[LocationSlot]) -> Result<(), ShaderError> {
    for input in inputs {
        let Some(output) = outputs.iter().find(|o| o.location == input.location) else {
            return Err(ShaderError::Link(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )));
        };
        if output.ty != input.ty {
            return Err(ShaderError::Link(format!(
                "varying at location {}: vertex writes {:?}, fragment reads {:?}",
                input.location, output.ty, input.ty
            )));
        }
    }
    Ok(())
}

fn attribute_slots(inputs: &[LocationSlot]) -> Result<Vec<AttributeSlot>, ShaderError> {
    let mut slots = inputs
        .iter()
        .map(|input| match input.ty {
            ValueType::Float(components) => Ok(AttributeSlot {
                name: input.name.clone(),
                location: AttributeLocation(input.location),
                components,
            }),
            ValueType::Other(ref ty) => Err(ShaderError::Link(format!(
                "attribute `{}` must be a float vector, found {ty}",
                input.name
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    slots.sort_by_key(|s| s.location);
    Ok(slots)
}

fn uniform_slots(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<Vec<UniformSlot>, ShaderError> {
    // Merge both stages' declarations by binding.
    let mut merged: BTreeMap<UniformLocation, (ResourceSlot, StageSet)> = BTreeMap::new();
    let tagged = vertex
        .resources
        .iter()
        .map(|r| (Stage::Vertex, r))
        .chain(fragment.resources.iter().map(|r| (Stage::Fragment, r)));

    for (stage, res) in tagged {
        let location = UniformLocation::new(res.group, res.binding);
        match merged.get_mut(&location) {
            Some((existing, stages)) => {
                if existing.name != res.name || existing.kind != res.kind {
                    return Err(ShaderError::Link(format!(
                        "group {} binding {} is `{}` in one stage and `{}` in the other",
                        res.group, res.binding, existing.name, res.name
                    )));
                }
                *stages = stages.with(stage);
            }
            None => {
                merged.insert(location, (res.clone(), StageSet::default().with(stage)));
            }
        }
    }

    let mut slots = Vec::new();
    for (location, (res, visibility)) in &merged {
        let kind = match &res.kind {
            ResourceKind::Matrix4 => UniformKind::Matrix4,
            ResourceKind::Texture2d => {
                let sampler = UniformLocation::new(location.group, location.binding + 1);
                match merged.get(&sampler) {
                    Some((s, _)) if s.kind == ResourceKind::Sampler => {
                        UniformKind::Texture2d { sampler }
                    }
                    _ => {
                        return Err(ShaderError::Link(format!(
                            "texture `{}` needs a sampler at group {} binding {}",
                            res.name, sampler.group, sampler.binding
                        )));
                    }
                }
            }
            // Samplers are reached through their texture.
            ResourceKind::Sampler => continue,
            ResourceKind::Unsupported(ty) => {
                return Err(ShaderError::Link(format!(
                    "uniform `{}` has an unsupported type: {ty}",
                    res.name
                )));
            }
        };

        if slots.iter().any(|s: &UniformSlot| s.name == res.name) {
            return Err(ShaderError::Link(format!(
                "uniform `{}` is declared at two bindings",
                res.name
            )));
        }

        slots.push(UniformSlot {
            name: res.name.clone(),
            location: *location,
            kind,
            visibility: *visibility,
        });
    }

    Ok(slots)
}
