use std::mem::offset_of;

use id_arena::Id;
use wgpu::util::DeviceExt;

use crate::{
    geometry::{LineVertex, MeshVertex},
    rendering::instance::{InstanceBuffer, Instances},
    scene_graph::{ModelKind, SceneModel},
};

pub type RenderModelId = Id<RenderModel>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Shaded,
    Lines,
    Points,
}

pub struct RenderModel {
    pub name: String,
    pub kind: DrawKind,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    pub instances: Instances,
    pub instance_buffer: InstanceBuffer,
}

impl RenderModel {
    pub fn from_scene_model(device: &wgpu::Device, model: &SceneModel) -> Self {
        let (kind, contents): (DrawKind, &[u8]) = match &model.kind {
            ModelKind::Shaded(vertices) => (DrawKind::Shaded, bytemuck::cast_slice(vertices)),
            ModelKind::Lines(vertices) => (DrawKind::Lines, bytemuck::cast_slice(vertices)),
            ModelKind::Points(vertices) => (DrawKind::Points, bytemuck::cast_slice(vertices)),
        };

        let vertex_buffer_name = format!("Vertex buffer ({})", model.name);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_buffer_name),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            name: model.name.clone(),
            kind,
            vertex_buffer,
            vertex_count: model.vertex_count() as u32,
            instances: Instances::new(),
            instance_buffer: InstanceBuffer::new(device, &model.name),
        }
    }

    pub fn upload_instances(&self, queue: &wgpu::Queue) {
        self.instances.write_to_buffer(queue, &self.instance_buffer);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if !self.instances.should_render() || self.vertex_count == 0 {
            return;
        }

        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        self.instance_buffer.bind(render_pass);
        render_pass.draw(0..self.vertex_count, 0..self.instances.len() as u32);
    }
}

pub const MESH_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(MeshVertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(MeshVertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(MeshVertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
    ],
};

pub const LINE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(LineVertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(LineVertex, color) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};
