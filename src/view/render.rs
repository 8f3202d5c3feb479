use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use tracing::debug;
use wgpu::*;

use crate::model::{ObjectId, OrbitCamera, World};
use crate::utils::{MeshBuffer, Vertex};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const CLEAR_COLOR: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &OrbitCamera) -> Self {
        Self { view_proj: camera.view_proj().to_cols_array_2d() }
    }
}

pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub camera_bind_group: BindGroup,
}

pub struct PipelineResources {
    pub solid_pipeline: RenderPipeline,
    pub line_pipeline: RenderPipeline,
}

/// GPU copies of one object's meshes.
pub struct ObjectBuffers {
    pub solid: MeshBuffer,
    pub contour: Option<MeshBuffer>,
    pub revision: u64,
}

/// Which cached objects need uploading and which must be released.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub upload: Vec<ObjectId>,
    pub release: Vec<ObjectId>,
}

/// Compares cached revisions with the world. Anything cached but no longer
/// in the world is released, which covers cascaded deletions too.
pub fn plan_sync(cached: &HashMap<ObjectId, u64>, world: &World) -> SyncPlan {
    let upload = world
        .objects()
        .filter(|o| cached.get(&o.id()) != Some(&o.revision()))
        .map(|o| o.id())
        .collect();
    let mut release: Vec<ObjectId> = cached.keys().copied().filter(|id| !world.contains(*id)).collect();
    release.sort();
    SyncPlan { upload, release }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    format: TextureFormat,
    label: &str,
    topology: PrimitiveTopology,
    depth_compare: CompareFunction,
    bias: DepthBiasState,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x4 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::ALPHA_BLENDING), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            // stair and box meshes are not consistently wound
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare,
            stencil: StencilState::default(),
            bias,
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

pub fn create_pipelines(device: &Device, format: TextureFormat, bind_group_layout: &BindGroupLayout) -> PipelineResources {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("editor_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/editor.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    // solids are pushed back so contour lines on their faces win the depth test
    let solid_bias = DepthBiasState { constant: 2, slope_scale: 2.0, clamp: 0.0 };
    let solid_pipeline = create_pipeline(
        device,
        &pipeline_layout,
        &shader,
        format,
        "solid_pipeline",
        PrimitiveTopology::TriangleList,
        CompareFunction::Less,
        solid_bias,
    );
    let line_pipeline = create_pipeline(
        device,
        &pipeline_layout,
        &shader,
        format,
        "contour_pipeline",
        PrimitiveTopology::LineList,
        CompareFunction::LessEqual,
        DepthBiasState::default(),
    );

    PipelineResources { solid_pipeline, line_pipeline }
}

/// Everything needed to draw the world each frame.
pub struct RenderState {
    pub camera: CameraResources,
    pub pipelines: PipelineResources,
    depth_texture: Texture,
    depth_view: TextureView,
    objects: HashMap<ObjectId, ObjectBuffers>,
}

impl RenderState {
    pub fn new(device: &Device, format: TextureFormat, width: u32, height: u32) -> Self {
        let camera = create_camera_resources(device);
        let pipelines = create_pipelines(device, format, &camera.bind_group_layout);
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        Self { camera, pipelines, depth_texture, depth_view, objects: HashMap::new() }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    pub fn depth_size(&self) -> (u32, u32) {
        (self.depth_texture.width(), self.depth_texture.height())
    }

    pub fn update_camera(&self, queue: &Queue, camera: &OrbitCamera) {
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));
    }

    /// Uploads new or changed objects and drops buffers of removed ones.
    pub fn sync(&mut self, device: &Device, world: &World) {
        let cached: HashMap<ObjectId, u64> = self.objects.iter().map(|(id, b)| (*id, b.revision)).collect();
        let plan = plan_sync(&cached, world);

        for id in &plan.release {
            if let Some(buffers) = self.objects.remove(id) {
                buffers.solid.vertex_buffer.destroy();
                buffers.solid.index_buffer.destroy();
                if let Some(contour) = buffers.contour {
                    contour.vertex_buffer.destroy();
                    contour.index_buffer.destroy();
                }
            }
        }
        for id in &plan.upload {
            let Some(object) = world.get(*id) else { continue };
            let buffers = ObjectBuffers {
                solid: object.solid_mesh().upload(device),
                contour: object.contour_mesh().map(|m| m.upload(device)),
                revision: object.revision(),
            };
            self.objects.insert(*id, buffers);
        }
        if !plan.upload.is_empty() || !plan.release.is_empty() {
            debug!("gpu sync: {} uploaded, {} released", plan.upload.len(), plan.release.len());
        }
    }

    /// Clears the target and draws every object, solids first, then contours.
    pub fn draw_world(&self, encoder: &mut CommandEncoder, view: &TextureView) {
        let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("world_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: Operations { load: LoadOp::Clear(CLEAR_COLOR), store: StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);

        rp.set_pipeline(&self.pipelines.solid_pipeline);
        for buffers in self.objects.values() {
            draw_mesh(&mut rp, &buffers.solid);
        }

        rp.set_pipeline(&self.pipelines.line_pipeline);
        for contour in self.objects.values().filter_map(|b| b.contour.as_ref()) {
            draw_mesh(&mut rp, contour);
        }
    }

    /// Draws egui output on top of the world.
    pub fn draw_ui(
        &self,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        egui_renderer: &mut egui_wgpu::Renderer,
        device: &Device,
        queue: &Queue,
        full_output: &egui::FullOutput,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        egui_renderer.update_buffers(device, queue, encoder, primitives, screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            egui_renderer.render(&mut egui_pass.forget_lifetime(), primitives, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
    }
}

fn draw_mesh(rp: &mut RenderPass<'_>, mesh: &MeshBuffer) {
    if mesh.index_count == 0 {
        return;
    }
    rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
    rp.draw_indexed(0..mesh.index_count, 0, 0..1);
}
