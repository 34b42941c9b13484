mod audio;
mod ui;
mod utils;

use std::env;
use std::time::Instant;

use bloom_viz_core::{Pattern, Session, SessionEvent, SharedSamples};
use nannou::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use audio::CapturePipe;
use ui::{parse_key, Action, HelpOverlay, Hud, Notification};
use utils::Config;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

struct Args {
    windowed: bool,
    list_devices: bool,
    /// 1-based, like the number keys
    pattern: Option<usize>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let pattern = args
        .iter()
        .position(|a| a == "--pattern")
        .and_then(|i| args.get(i + 1))
        .and_then(|n| n.parse::<usize>().ok());

    Args {
        windowed: args.iter().any(|a| a == "--windowed" || a == "-w"),
        list_devices: args.iter().any(|a| a == "--list-devices"),
        pattern,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if parse_args().list_devices {
        CapturePipe::list_devices();
        return;
    }

    nannou::app(model).update(update).run();
}

struct Model {
    session: Session,
    capture: CapturePipe,
    config: Config,
    texture: wgpu::Texture,
    hud: Hud,
    help: HelpOverlay,
    notification: Notification,
    frozen: bool,
    start: Instant,
}

fn model(app: &App) -> Model {
    let args = parse_args();
    let config = Config::load();

    let mut win = app
        .new_window()
        .view(view)
        .key_pressed(key_pressed)
        .resized(resized)
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .min_size(400, 400);

    if !args.windowed {
        win = win.fullscreen();
    }

    win.build().unwrap();
    app.set_exit_on_escape(false);

    let mut session_config = config.session_config();
    if let Some(pattern) = args.pattern.and_then(|n| n.checked_sub(1)).and_then(Pattern::from_index) {
        session_config.pattern = pattern;
    }

    let bounds = app.window_rect();
    let mut session = Session::new(session_config, bounds.w(), bounds.h()).unwrap_or_else(|e| {
        error!("Invalid analysis settings ({}), using defaults", e);
        Session::new(Default::default(), bounds.w(), bounds.h()).unwrap()
    });

    let samples = SharedSamples::default();
    let capture = CapturePipe::new(&config, samples.clone());
    if let Err(e) = session.handle(SessionEvent::AudioReady(Box::new(samples))) {
        warn!("Audio not connected: {}", e);
    }

    let texture = frame_texture(app, &session);
    let mut notification = Notification::default();
    notification.show(format!("{} - press h for help", session.pattern().name()));
    info!("Started with pattern {}", session.pattern().name());

    Model {
        session,
        capture,
        config,
        texture,
        hud: Hud::new(),
        help: HelpOverlay::new(),
        notification,
        frozen: false,
        start: Instant::now(),
    }
}

/// Texture the composited frame is uploaded into each refresh
fn frame_texture(app: &App, session: &Session) -> wgpu::Texture {
    let frame = session.frame();
    let window = app.main_window();
    wgpu::TextureBuilder::new()
        .size([frame.width() as u32, frame.height() as u32])
        .format(wgpu::TextureFormat::Rgba8UnormSrgb)
        .usage(wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING)
        .build(window.device())
}

fn update(app: &App, model: &mut Model, _update: Update) {
    model.notification.update();

    if model.frozen {
        return;
    }

    let now_ms = model.start.elapsed().as_secs_f64() * 1000.0;
    let frame = model.session.tick(now_ms, &mut model.hud);

    let size = [frame.width() as u32, frame.height() as u32];
    if model.texture.size() != size {
        model.texture = frame_texture(app, &model.session);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    {
        let window = app.main_window();
        let mut encoder = frame.command_encoder();
        model
            .texture
            .upload_data(window.device(), &mut encoder, model.session.frame().as_bytes());
    }

    let draw = app.draw();
    let bounds = app.window_rect();

    draw.texture(&model.texture).w_h(bounds.w(), bounds.h());
    model.hud.draw(&draw, bounds, Instant::now());
    model.notification.draw(&draw, bounds);
    model.help.draw(&draw, model.session.pattern(), model.frozen);

    draw.to_frame(app, &frame).unwrap();
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    let event = SessionEvent::Resize {
        width: size.x,
        height: size.y,
    };
    if let Err(e) = model.session.handle(event) {
        warn!("Resize rejected: {}", e);
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    match parse_key(key) {
        Some(Action::Quit) => app.quit(),
        Some(Action::ToggleHelp) => model.help.toggle(),
        Some(Action::ToggleBars) => model.hud.toggle_bars(),
        Some(Action::ToggleFullscreen) => {
            let window = app.main_window();
            window.set_fullscreen(!window.is_fullscreen());
        }
        Some(Action::Freeze) => {
            model.frozen = !model.frozen;
            let msg = if model.frozen { "Frozen" } else { "Resumed" };
            model.notification.show(msg.to_string());
        }
        Some(Action::NextDevice) => {
            if model.capture.device_count() == 0 {
                model.notification.show("No audio devices".to_string());
                return;
            }
            if let Some((name, success)) = model.capture.next_device(&mut model.config) {
                let msg = if success { name } else { format!("{} (FAILED)", name) };
                model.notification.show(msg);
            }
        }
        Some(Action::SelectPattern(index)) => {
            if let Some(pattern) = Pattern::from_index(index) {
                if let Err(e) = model.session.handle(SessionEvent::SetPattern(pattern)) {
                    warn!("Pattern switch failed: {}", e);
                    return;
                }
                model.notification.show(pattern.name().to_string());
            }
        }
        None => {}
    }
}
