use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, KeyCode, ModifiersState, NamedKey, PhysicalKey},
    window::Window,
};

use crate::config::ViewerConfig;
use crate::download;
use crate::error::ViewerResult;
use crate::gpu::quad::{scissor_rect, Color, QuadBatch, TextureSlot, Vertex};
use crate::gpu::{texture::Texture, GpuContext};
use crate::pdf::loader::{DocumentLoader, LoadJob, LoaderEvent};
use crate::pdf::render::PageBitmap;
use crate::ui::text::{TextRasterizer, TextRun};
use crate::ui::{assets::IconGenerator, UiAction};
use crate::viewer::{ViewerModel, BODY_BACKGROUND, LINE_SCROLL};

const ICON_TEXTURE_SIZE: u32 = 64;

struct Icons {
    white: Texture,
    download: Texture,
    loading: Texture,
    error: Texture,
}

pub struct State {
    window: Arc<Window>,
    gpu: GpuContext,
    render_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    icons: Icons,

    // Una textura por página, en el mismo orden que los slots del modelo
    page_textures: Vec<Option<Texture>>,

    // Líneas de texto por (contenido, tamaño físico). `None`: no se pudo rasterizar
    text: TextRasterizer,
    text_textures: HashMap<(String, u32), Option<Texture>>,

    // Lógica App
    model: ViewerModel,
    loader: Option<DocumentLoader>,
    modifiers: ModifiersState,
    current_title: String,
}

impl State {
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> ViewerResult<Self> {
        let gpu = GpuContext::new(window.clone()).await?;
        let texture_layout = Texture::bind_group_layout(&gpu.device);

        // 1. Iconos y textura blanca
        let icon = |image: image::RgbaImage, label: &str| {
            Texture::from_image(&gpu.device, &gpu.queue, &texture_layout, &image, Some(label))
        };
        let icons = Icons {
            white: icon(IconGenerator::white_pixel(), "White")?,
            download: icon(IconGenerator::generate_download_icon(ICON_TEXTURE_SIZE), "Icon Download")?,
            loading: icon(IconGenerator::generate_loading_icon(ICON_TEXTURE_SIZE), "Icon Loading")?,
            error: icon(IconGenerator::generate_error_icon(ICON_TEXTURE_SIZE), "Icon Error")?,
        };

        let text = TextRasterizer::discover();

        // 2. Pipeline
        let shader = gpu
            .device
            .create_shader_module(wgpu::include_wgsl!("../assets/shaders/quad.wgsl"));
        let render_pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pipeline Layout"),
            bind_group_layouts: &[&texture_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // 3. Carga del documento en segundo plano
        let job = LoadJob {
            path: config.document_path.clone(),
            scale_factor: config.render_scale,
            max_texture_side: gpu.max_texture_side(),
        };
        let loader = DocumentLoader::spawn(job)?;

        let model = ViewerModel::new(config);
        let current_title = model.title().to_string();
        window.set_title(&current_title);

        Ok(Self {
            window,
            gpu,
            render_pipeline,
            texture_layout,
            icons,
            page_textures: Vec::new(),
            text,
            text_textures: HashMap::new(),
            model,
            loader: Some(loader),
            modifiers: ModifiersState::empty(),
            current_title,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.gpu.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        let (w, h) = self.logical_size();
        self.model.clamp_scroll(w, h);
    }

    fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    /// Tamaño de la ventana en píxeles lógicos (los del layout).
    fn logical_size(&self) -> (f32, f32) {
        let scale = self.scale_factor();
        (
            self.gpu.size.width as f32 / scale,
            self.gpu.size.height as f32 / scale,
        )
    }

    // --- LÓGICA CORE ---

    fn handle_loader_event(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::Document(outcome) => {
                if self.model.on_document(outcome) {
                    self.page_textures = self.model.pages().iter().map(|_| None).collect();
                    self.refresh_hover();
                }
            }
            LoaderEvent::PageRendered { request, bitmap } => {
                let Some(index) = self.model.on_page_rendered(request, bitmap.width, bitmap.height) else {
                    return;
                };
                match self.upload_page(&bitmap, request.page_number) {
                    Ok(texture) => {
                        if let Some(slot) = self.page_textures.get_mut(index) {
                            *slot = Some(texture);
                        }
                    }
                    Err(e) => self.model.on_page_failed(request, &e.to_string()),
                }
            }
            LoaderEvent::PageFailed { request, message } => {
                self.model.on_page_failed(request, &message);
            }
        }
    }

    fn upload_page(&self, bitmap: &PageBitmap, page_number: u16) -> ViewerResult<Texture> {
        let label = format!("Page {}", page_number);
        Texture::from_bytes(
            &self.gpu.device,
            &self.gpu.queue,
            &self.texture_layout,
            &bitmap.data,
            bitmap.width,
            bitmap.height,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            Some(&label),
        )
    }

    fn refresh_hover(&mut self) {
        let (w, h) = self.logical_size();
        let button = self.model.layout(w, h).download_button;
        self.model.ui.refresh_hover(button);
    }

    fn download(&self) {
        if !self.model.load.is_loaded() {
            return;
        }
        let target = download::default_download_dir();
        if let Err(e) = download::save_copy(&self.model.config.document_path, &target) {
            log::error!("{} falló: {}", self.model.config.download_label, e);
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        let (w, h) = self.logical_size();
        self.model.scroll_by(delta, w, h);
    }

    fn viewport_height(&self) -> f32 {
        let (w, h) = self.logical_size();
        self.model.layout(w, h).viewport.h
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.scale_factor();
                let (w, h) = self.logical_size();
                let button = self.model.layout(w, h).download_button;
                self.model
                    .ui
                    .cursor_moved(position.x as f32 / scale, position.y as f32 / scale, button);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.model.ui.cursor_left();
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                let (w, h) = self.logical_size();
                let button = self.model.layout(w, h).download_button;
                if let Some(UiAction::Download) = self.model.ui.hit_test(button) {
                    self.download();
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y * LINE_SCROLL,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / self.scale_factor(),
                };
                self.scroll_by(scroll);
                true
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { state: ElementState::Pressed, physical_key, logical_key, .. },
                ..
            } => {
                if self.modifiers.control_key() {
                    if let Key::Character(c) = logical_key {
                        if c.eq_ignore_ascii_case("s") {
                            self.download();
                            return true;
                        }
                    }
                }
                match (physical_key, logical_key) {
                    (_, Key::Named(NamedKey::ArrowDown)) => self.scroll_by(LINE_SCROLL),
                    (_, Key::Named(NamedKey::ArrowUp)) => self.scroll_by(-LINE_SCROLL),
                    (_, Key::Named(NamedKey::PageDown)) | (PhysicalKey::Code(KeyCode::Space), _) => {
                        let page = self.viewport_height();
                        self.scroll_by(page);
                    }
                    (_, Key::Named(NamedKey::PageUp)) => {
                        let page = self.viewport_height();
                        self.scroll_by(-page);
                    }
                    (_, Key::Named(NamedKey::Home)) => {
                        let (w, h) = self.logical_size();
                        self.model.scroll_to(0.0, w, h);
                    }
                    (_, Key::Named(NamedKey::End)) => {
                        let (w, h) = self.logical_size();
                        self.model.scroll_to(f32::MAX, w, h);
                    }
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self) {
        // Drenar resultados del hilo de carga
        if let Some(loader) = &self.loader {
            let (events, finished) = loader.poll();
            for event in events {
                self.handle_loader_event(event);
            }
            if finished {
                log::debug!("Hilo de carga terminado");
                self.loader = None;
            }
        }

        let title = self.model.title();
        if title != self.current_title {
            self.current_title = title.to_string();
            self.window.set_title(&self.current_title);
        }
    }

    fn text_key(run: &TextRun, scale: f32) -> (String, u32) {
        (run.text.clone(), (run.size * scale).round().max(1.0) as u32)
    }

    /// Rasteriza (una sola vez) cada línea encolada y la añade al lote como quad.
    fn place_text(&mut self, batch: &mut QuadBatch) {
        let scale = self.scale_factor();
        let runs = std::mem::take(&mut batch.texts);

        for (index, run) in runs.iter().enumerate() {
            let key = Self::text_key(run, scale);
            if !self.text_textures.contains_key(&key) {
                let texture = self.text.rasterize(&run.text, key.1 as f32).and_then(|image| {
                    Texture::from_image(&self.gpu.device, &self.gpu.queue, &self.texture_layout, &image, Some("Text"))
                        .map_err(|e| log::warn!("No se pudo subir el texto {:?}: {}", run.text, e))
                        .ok()
                });
                self.text_textures.insert(key.clone(), texture);
            }

            let Some(texture) = self.text_textures.get(&key).and_then(Option::as_ref) else {
                continue;
            };
            let rect = run.placed(texture.width as f32 / scale, texture.height as f32 / scale);
            batch.textured(rect, TextureSlot::Text(index), Color::hex(run.color), run.clip);
        }

        batch.texts = runs;
    }

    fn texture_for<'a>(&'a self, slot: TextureSlot, texts: &[TextRun]) -> Option<&'a Texture> {
        match slot {
            TextureSlot::White => Some(&self.icons.white),
            TextureSlot::DownloadIcon => Some(&self.icons.download),
            TextureSlot::LoadingIcon => Some(&self.icons.loading),
            TextureSlot::ErrorIcon => Some(&self.icons.error),
            TextureSlot::Page(index) => self.page_textures.get(index).and_then(Option::as_ref),
            TextureSlot::Text(index) => {
                let key = Self::text_key(texts.get(index)?, self.scale_factor());
                self.text_textures.get(&key).and_then(Option::as_ref)
            }
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = self.logical_size();
        let layout = self.model.layout(w, h);
        let mut batch = QuadBatch::new(w, h);
        self.model.draw(&layout, &mut batch);
        self.place_text(&mut batch);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });

        let buffers = (!batch.is_empty()).then(|| {
            let vertex_buffer = self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&batch.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&batch.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Color::hex(BODY_BACKGROUND).to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some((vertex_buffer, index_buffer)) = &buffers {
                let target = (self.gpu.config.width, self.gpu.config.height);
                let scale = self.scale_factor();

                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for call in &batch.calls {
                    let Some(texture) = self.texture_for(call.texture, &batch.texts) else {
                        continue;
                    };
                    let scissor = match call.clip {
                        Some(clip) => scissor_rect(clip, scale, target),
                        None => Some((0, 0, target.0, target.1)),
                    };
                    let Some((x, y, sw, sh)) = scissor else {
                        continue;
                    };
                    render_pass.set_scissor_rect(x, y, sw, sh);
                    render_pass.set_bind_group(0, &texture.bind_group, &[]);
                    render_pass.draw_indexed(call.first_index..call.first_index + call.index_count, 0, 0..1);
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
