use glam::Mat4;

use crate::coords::{Color, SurfaceSize};
use crate::shader::{AttributeLocation, ProgramLayout, UniformKind, UniformLocation};

use super::{BufferHandle, GraphicsError, ProgramHandle, TextureHandle};

/// Values the color and depth attachments are cleared to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearState {
    pub color: Color,
    pub depth: f32,
}

impl Default for ClearState {
    /// Opaque black, farthest depth.
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            depth: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    /// Texture unit whose texture (and sampler) feeds a texture uniform.
    TextureUnit(u32),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformBinding {
    pub location: UniformLocation,
    pub value: UniformValue,
}

/// A buffer of tightly packed `f32` vectors feeding one attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexBinding {
    pub location: AttributeLocation,
    pub buffer: BufferHandle,
    pub components: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    pub unit: u32,
    pub texture: TextureHandle,
}

/// `u16` index buffer drawn as a triangle list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexBinding {
    pub buffer: BufferHandle,
    pub count: u32,
}

/// One indexed draw with everything it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub uniforms: Vec<UniformBinding>,
    pub attributes: Vec<VertexBinding>,
    pub textures: Vec<TextureBinding>,
    pub indices: IndexBinding,
}

impl DrawCall {
    pub fn uniform(&self, location: UniformLocation) -> Option<UniformValue> {
        self.uniforms
            .iter()
            .find(|u| u.location == location)
            .map(|u| u.value)
    }

    pub fn attribute(&self, location: AttributeLocation) -> Option<&VertexBinding> {
        self.attributes.iter().find(|a| a.location == location)
    }

    pub fn texture_at(&self, unit: u32) -> Option<TextureHandle> {
        self.textures
            .iter()
            .find(|t| t.unit == unit)
            .map(|t| t.texture)
    }

    /// Checks that the draw feeds every input `layout` declares.
    pub fn validate(&self, layout: &ProgramLayout) -> Result<(), GraphicsError> {
        for slot in &layout.attributes {
            let binding = self
                .attribute(slot.location)
                .ok_or_else(|| GraphicsError::UnboundAttribute(slot.name.clone()))?;
            if binding.components != slot.components {
                return Err(GraphicsError::AttributeComponents {
                    name: slot.name.clone(),
                    declared: slot.components,
                    bound: binding.components,
                });
            }
        }

        for slot in &layout.uniforms {
            let value = self
                .uniform(slot.location)
                .ok_or_else(|| GraphicsError::UnboundUniform(slot.name.clone()))?;
            match (slot.kind, value) {
                (UniformKind::Matrix4, UniformValue::Mat4(_)) => {}
                (UniformKind::Texture2d { .. }, UniformValue::TextureUnit(unit)) => {
                    if self.texture_at(unit).is_none() {
                        return Err(GraphicsError::EmptyTextureUnit(unit));
                    }
                }
                _ => return Err(GraphicsError::UniformValue(slot.name.clone())),
            }
        }

        Ok(())
    }
}

/// Everything submitted for one presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub viewport: SurfaceSize,
    pub clear: ClearState,
    pub draws: Vec<DrawCall>,
}
