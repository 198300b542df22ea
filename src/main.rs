use std::sync::Arc;

use anyhow::Context;
use portfolio_viewer::config::ViewerConfig;
use portfolio_viewer::state::State;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Ruta fija, o la del primer argumento ("Abrir con...")
    let config = ViewerConfig::from_args(std::env::args());
    log::info!("Documento: {:?}", config.document_path);

    let event_loop = EventLoop::new().context("no se pudo crear el bucle de eventos")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.loading_message)
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)
            .context("no se pudo crear la ventana")?,
    );

    // 2. GPU + arranque de la carga en segundo plano
    let mut state = pollster::block_on(State::new(window.clone(), config))
        .context("no se pudo inicializar el visor")?;

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == window.id() => {
                if !state.input(event) {
                    match event {
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    ..
                                },
                            ..
                        } => elwt.exit(),

                        WindowEvent::Resized(physical_size) => {
                            state.resize(*physical_size);
                        }

                        WindowEvent::RedrawRequested => {
                            state.update();
                            match state.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => state.resize(state.size()),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => log::warn!("{:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                state.window().request_redraw();
            }
            _ => {}
        })
        .context("el bucle de eventos terminó con error")?;

    Ok(())
}
