//! wgpu renderer for the scene model.
//!
//! Geometry and textures are uploaded once, on the first frame after the
//! model attaches. Every frame then writes the camera/light uniform and one
//! transform uniform per mesh, clears the surface to the configured color
//! and draws each mesh with its material bind group.

use std::sync::Arc;

use glam::Mat4;
use log::{info, warn};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::{RenderFailure, SceneRenderer};
use crate::assets::{ColorSpace, TextureData};
use crate::camera::CameraUniform;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::{self, DepthTarget, DEPTH_FORMAT};
use crate::scene::{Light, Material, MeshNode, Model, Scene};
use crate::viewport::SurfaceSize;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    camera: CameraUniform,
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
}

impl FrameUniform {
    fn from_scene(scene: &Scene) -> Self {
        let mut uniform = Self {
            camera: CameraUniform::from_camera(scene.camera()),
            ambient: [0.0; 4],
            light_dir: [0.0, 1.0, 0.0, 0.0],
            light_color: [0.0; 4],
        };
        for light in scene.lights() {
            let radiance = light.radiance().extend(0.0).to_array();
            match light {
                Light::Ambient { .. } => uniform.ambient = radiance,
                Light::Directional { .. } => {
                    uniform.light_color = radiance;
                    if let Some(dir) = light.direction() {
                        uniform.light_dir = dir.extend(0.0).to_array();
                    }
                }
            }
        }
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
    params: [f32; 4],
}

impl MeshUniform {
    fn new(root: Mat4, mesh: &MeshNode) -> Self {
        let model = root * mesh.local;
        let (base_color, params) = match &mesh.material {
            Material::Standard(m) => (
                m.base_color,
                [
                    m.roughness,
                    m.metalness,
                    0.0,
                    if m.normal_map.is_some() { 1.0 } else { 0.0 },
                ],
            ),
            Material::Unlit { base_color, .. } => (*base_color, [1.0, 0.0, 1.0, 0.0]),
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            base_color,
            params,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the scene model to a window surface with wgpu.
pub struct GpuRenderer {
    context: RenderContext,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    flat_normal: wgpu::TextureView,
    depth: DepthTarget,
    meshes: Vec<GpuMesh>,
    uploaded: bool,
    clear_color: wgpu::Color,
}

impl GpuRenderer {
    /// Build the mesh pipeline on an initialized context. `clear_color` is
    /// RGBA, premultiplied.
    #[must_use]
    pub fn new(context: RenderContext, clear_color: [f32; 4]) -> Self {
        let device = &context.device;
        let shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/mesh.wgsl"
        ));

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Layout"),
                entries: &[pipeline_helpers::uniform_buffer(0)],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Layout"),
                entries: &[
                    pipeline_helpers::uniform_buffer(0),
                    pipeline_helpers::texture_2d(1),
                    pipeline_helpers::texture_2d(2),
                    pipeline_helpers::filtering_sampler(3),
                ],
            });

        let pipeline = pipeline_helpers::create_mesh_pipeline(
            device,
            "Mesh",
            &shader,
            context.format(),
            DEPTH_FORMAT,
            &[MeshVertex::layout()],
            &[&frame_layout, &material_layout],
        );

        let frame_buffer =
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Frame Uniform"),
                size: size_of::<FrameUniform>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        let frame_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &frame_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                }],
            });

        let sampler = pipeline_helpers::repeat_sampler(device, "Material Sampler");
        let white = texture::upload(
            device,
            &context.queue,
            &TextureData::solid("White", [255; 4], ColorSpace::Srgb),
        );
        let flat_normal = texture::upload(
            device,
            &context.queue,
            &TextureData::solid("Flat Normal", [128, 128, 255, 255], ColorSpace::Linear),
        );
        let depth = DepthTarget::new(device, context.config.width, context.config.height);

        info!("Mesh renderer ready ({:?})", context.format());
        Self {
            context,
            pipeline,
            frame_buffer,
            frame_bind_group,
            material_layout,
            sampler,
            white,
            flat_normal,
            depth,
            meshes: Vec::new(),
            uploaded: false,
            clear_color: wgpu::Color {
                r: f64::from(clear_color[0]),
                g: f64::from(clear_color[1]),
                b: f64::from(clear_color[2]),
                a: f64::from(clear_color[3]),
            },
        }
    }

    fn upload_model(&mut self, model: &Model) {
        let device = &self.context.device;
        let mut views: FxHashMap<*const TextureData, wgpu::TextureView> =
            FxHashMap::default();
        let mut view_for = |data: &Arc<TextureData>| {
            views
                .entry(Arc::as_ptr(data))
                .or_insert_with(|| texture::upload(device, &self.context.queue, data))
                .clone()
        };

        let root = model.transform().matrix();
        for mesh in model.meshes() {
            let geometry = &mesh.geometry;
            let vertices: Vec<MeshVertex> = geometry
                .positions
                .iter()
                .enumerate()
                .map(|(i, &position)| MeshVertex {
                    position,
                    normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();
            let label = mesh.name.as_deref().unwrap_or("Mesh");
            let vertex_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Vertices")),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Indices")),
                    contents: bytemuck::cast_slice(&geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            let uniform_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Uniform")),
                    contents: bytemuck::bytes_of(&MeshUniform::new(root, mesh)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

            let (map, normal_map) = match &mesh.material {
                Material::Standard(m) => (m.map.as_ref(), m.normal_map.as_ref()),
                Material::Unlit { map, .. } => (map.as_ref(), None),
            };
            let color_view = map.map_or_else(|| self.white.clone(), &mut view_for);
            let normal_view =
                normal_map.map_or_else(|| self.flat_normal.clone(), &mut view_for);

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label} Material")),
                layout: &self.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&color_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&normal_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: geometry.indices.len() as u32,
                uniform_buffer,
                bind_group,
            });
        }
        info!("Uploaded {} meshes", self.meshes.len());
    }

    fn write_uniforms(&self, scene: &Scene) {
        let queue = &self.context.queue;
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniform::from_scene(scene)),
        );
        if let Some(model) = scene.model() {
            let root = model.transform().matrix();
            for (gpu, mesh) in self.meshes.iter().zip(model.meshes()) {
                queue.write_buffer(
                    &gpu.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&MeshUniform::new(root, mesh)),
                );
            }
        }
    }
}

impl SceneRenderer for GpuRenderer {
    fn resize(&mut self, size: SurfaceSize) {
        let (width, height) = (size.physical_width(), size.physical_height());
        self.context.resize(width, height);
        if !self.depth.matches(width, height) {
            self.depth = DepthTarget::new(&self.context.device, width, height);
        }
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderFailure> {
        if !self.uploaded {
            if let Some(model) = scene.model() {
                self.upload_model(model);
                self.uploaded = true;
            }
        }
        self.write_uniforms(scene);

        let frame = match self.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timed out; skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::Lost) => return Err(RenderFailure::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderFailure::OutOfMemory)
            }
            Err(e) => return Err(RenderFailure::Device(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.context.create_encoder();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for mesh in &self.meshes {
                if mesh.index_count == 0 {
                    continue;
                }
                pass.set_bind_group(1, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.context.submit(encoder);
        frame.present();
        Ok(())
    }
}
