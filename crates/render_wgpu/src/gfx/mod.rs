//! Renderer: device/surface setup and the per-frame present pass.

pub mod camera;
pub mod dome;
pub mod media;
pub mod pipeline;
pub mod types;

use anyhow::Context;
use wgpu::{
    SurfaceTargetUnsafe,
    rwh::{HasDisplayHandle, HasWindowHandle},
    util::DeviceExt,
};
use winit::window::Window;

use crate::gfx::camera::Camera;
use crate::gfx::dome::DomeScene;
use crate::gfx::types::{Globals, MeshCpu, Model};

struct GpuMesh {
    vbuf: wgpu::Buffer,
    ibuf: wgpu::Buffer,
    index_count: u32,
    model_bg: wgpu::BindGroup,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pipeline: wgpu::RenderPipeline,
    globals: Globals,
    globals_buf: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,

    media_bgl: wgpu::BindGroupLayout,
    media_bg: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    depth_view: wgpu::TextureView,
    dome: GpuMesh,
    floor: GpuMesh,
}

fn backend_from_env() -> Option<wgpu::Backends> {
    match std::env::var("DOME_BACKEND").ok().as_deref() {
        Some("vulkan" | "vk") => Some(wgpu::Backends::VULKAN),
        Some("gl" | "opengl") => Some(wgpu::Backends::GL),
        Some("primary" | "all") => Some(wgpu::Backends::PRIMARY),
        _ => None,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: pipeline::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Renderer {
    /// Create a renderer bound to a window surface and upload the dome scene.
    pub async fn new(window: &Window, scene: &DomeScene, vsync: bool) -> anyhow::Result<Self> {
        let candidates: &[wgpu::Backends] = if let Some(b) = backend_from_env() {
            &[b, wgpu::Backends::PRIMARY]
        } else if cfg!(target_os = "linux") {
            &[wgpu::Backends::VULKAN, wgpu::Backends::GL, wgpu::Backends::PRIMARY]
        } else {
            &[wgpu::Backends::PRIMARY, wgpu::Backends::GL]
        };

        let raw_display = window.display_handle()?.as_raw();
        let raw_window = window.window_handle()?.as_raw();
        let (_instance, surface, adapter) = {
            let mut picked: Option<(wgpu::Instance, wgpu::Surface<'static>, wgpu::Adapter)> = None;
            for &bmask in candidates {
                let inst = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                    backends: bmask,
                    flags: wgpu::InstanceFlags::empty(),
                    ..Default::default()
                });
                let surf = unsafe {
                    inst.create_surface_unsafe(SurfaceTargetUnsafe::RawHandle {
                        raw_display_handle: raw_display,
                        raw_window_handle: raw_window,
                    })
                }
                .context("create wgpu surface (unsafe)")?;
                match inst
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        compatible_surface: Some(&surf),
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        force_fallback_adapter: false,
                    })
                    .await
                {
                    Ok(a) => {
                        picked = Some((inst, surf, a));
                        break;
                    }
                    Err(_) => {}
                }
            }
            picked.ok_or_else(|| {
                anyhow::anyhow!("no suitable GPU adapter across backends {candidates:?}")
            })?
        };

        let info = adapter.get_info();
        log::info!("Adapter: {:?} ({:?})", info.name, info.backend);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wgpu-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .context("request device")?;
        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("wgpu uncaptured error: {e:?}");
        }));

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let shader = pipeline::create_shader(&device);
        let globals_bgl = pipeline::create_globals_bgl(&device);
        let model_bgl = pipeline::create_model_bgl(&device);
        let media_bgl = pipeline::create_media_bgl(&device);
        let render_pipeline = pipeline::create_dome_pipeline(
            &device,
            &shader,
            &globals_bgl,
            &model_bgl,
            &media_bgl,
            config.format,
        );

        let globals = Globals {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            grade: [0.0, 1.0, 1.0, 0.0],
        };
        let globals_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals-bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("media-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let dome = upload_mesh(
            &device,
            &model_bgl,
            &scene.dome,
            Model {
                tint: [0.0, 0.0, 0.0, 1.0],
                flags: [1.0, 0.0, 0.0, 0.0],
            },
            "dome",
        )?;
        let floor = upload_mesh(
            &device,
            &model_bgl,
            &scene.floor,
            Model {
                tint: [0.05, 0.05, 0.06, 1.0],
                flags: [0.0, 0.0, 0.0, 0.0],
            },
            "floor",
        )?;

        // 1x1 placeholder; replaced right below by the startup pattern.
        let media_bg = {
            let tex = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("media-bootstrap"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("media-bg"),
                layout: &media_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };

        let mut r = Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline: render_pipeline,
            globals,
            globals_buf,
            globals_bg,
            media_bgl,
            media_bg,
            sampler,
            depth_view,
            dome,
            floor,
        };
        r.set_media(&media::test_pattern(1024));
        Ok(r)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
    }

    #[must_use]
    pub fn max_media_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Replace the media texture. Oversized images are downscaled to the
    /// device limit; the previous texture is dropped with its bind group.
    pub fn set_media(&mut self, img: &image::RgbaImage) {
        let max_dim = self.max_media_dimension();
        let img = media::clamp_to_device_limit(img.clone(), max_dim);
        let (width, height) = img.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let tex = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("media-texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &img,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        self.media_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("media-bg"),
            layout: &self.media_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        log::info!("media texture: {width}x{height}");
    }

    /// Push this frame's camera pose and color grade.
    pub fn update_globals(
        &mut self,
        eye: glam::Vec3,
        rotation: glam::Quat,
        fovy_deg: f32,
        grade: [f32; 3],
    ) {
        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let cam = Camera::first_person(eye, rotation, aspect, fovy_deg.to_radians());
        self.globals.view_proj = cam.view_proj().to_cols_array_2d();
        self.globals.grade = [grade[0], grade[1], grade[2], 0.0];
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&self.globals));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dome-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.01,
                            g: 0.01,
                            b: 0.015,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bg, &[]);
            pass.set_bind_group(2, &self.media_bg, &[]);
            for mesh in [&self.dome, &self.floor] {
                pass.set_bind_group(1, &mesh.model_bg, &[]);
                pass.set_vertex_buffer(0, mesh.vbuf.slice(..));
                pass.set_index_buffer(mesh.ibuf.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn upload_mesh(
    device: &wgpu::Device,
    model_bgl: &wgpu::BindGroupLayout,
    mesh: &MeshCpu,
    model: Model,
    label: &str,
) -> anyhow::Result<GpuMesh> {
    mesh.validate()
        .with_context(|| format!("{label} mesh invalid"))?;
    let vertices = mesh.vertices();
    let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let model_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(&model),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let model_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: model_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: model_buf.as_entire_binding(),
        }],
    });
    let index_count = u32::try_from(mesh.indices.len()).context("index count")?;
    Ok(GpuMesh {
        vbuf,
        ibuf,
        index_count,
        model_bg,
    })
}
