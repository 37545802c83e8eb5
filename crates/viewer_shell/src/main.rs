mod input;
mod links;

use anyhow::{Context, Result};
use input::ShellInput;
use scene_api::{load_scene_file, SceneGraph};
use settings::{CmsConfig, SettingsStore, ViewerSettings};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, warn};
use viewer_core::{CursorStyle, ViewerContext};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorIcon, Window, WindowAttributes, WindowId},
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let scene_path = args.next();
    let cms_path = args.next();

    let settings_store = SettingsStore::new().context("settings store init failed")?;
    let settings = match settings_store.load() {
        Ok(settings) => settings,
        Err(err) => {
            warn!(path = %settings_store.path().display(), "using default settings (failed to load): {err}");
            ViewerSettings::default()
        }
    };

    let cms = match cms_path {
        Some(path) => CmsConfig::load(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "ignoring CMS config (failed to load): {err}");
            CmsConfig::default()
        }),
        None => CmsConfig::default(),
    };

    let graph = match scene_path {
        Some(path) => load_scene_file(&path).unwrap_or_else(|err| {
            error!(path = %path.display(), "failed to load scene: {err}");
            SceneGraph::new()
        }),
        None => {
            warn!("no scene file given; usage: viewer_shell <scene.json> [cms.json]");
            SceneGraph::new()
        }
    };

    let fps_cap = settings.fps_cap;
    let mut viewer = ViewerContext::new(settings, (1, 1));
    viewer.install_scene(graph, &cms);
    let orbit_list = cms.names().map(str::to_owned).collect();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = SceneViewerApp::new(viewer, ShellInput::new(orbit_list), fps_cap);
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}

struct SceneViewerApp {
    viewer: ViewerContext,
    input: ShellInput,
    window: Option<Window>,
    window_id: Option<WindowId>,
    started: Instant,
    last_frame_time: Option<Instant>,
    fps_cap: f32,
    cursor: CursorStyle,
}

impl SceneViewerApp {
    fn new(viewer: ViewerContext, input: ShellInput, fps_cap: f32) -> Self {
        Self {
            viewer,
            input,
            window: None,
            window_id: None,
            started: Instant::now(),
            last_frame_time: None,
            fps_cap,
            cursor: CursorStyle::Default,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn sync_cursor(&mut self) {
        let wanted = self.viewer.cursor();
        if wanted == self.cursor {
            return;
        }
        self.cursor = wanted;
        if let Some(window) = self.window.as_ref() {
            window.set_cursor(match wanted {
                CursorStyle::Default => CursorIcon::Default,
                CursorStyle::Pointer => CursorIcon::Pointer,
            });
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.viewer.drain_events() {
            links::follow(&event, |link| open::that_detached(link));
        }
    }
}

impl ApplicationHandler for SceneViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop
            .create_window(WindowAttributes::default().with_title("Scene labels".to_string()))
        {
            Ok(window) => window,
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.viewer
            .set_viewport(size.width.max(1), size.height.max(1));
        self.window_id = Some(window.id());
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if Some(window_id) != self.window_id {
            return;
        }

        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        let now = self.elapsed();
        if self.input.handle_event(&mut self.viewer, &event, now) {
            self.sync_cursor();
            self.dispatch_events();
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        // Optional FPS cap from settings (0 = uncapped).
        let fps_cap = self.fps_cap.max(0.0);
        if fps_cap > 0.0 {
            let target = Duration::from_secs_f32(1.0 / fps_cap);
            if let Some(last) = self.last_frame_time {
                if now - last < target {
                    event_loop.set_control_flow(ControlFlow::WaitUntil(last + target));
                    return;
                }
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(now + target));
        } else {
            event_loop.set_control_flow(ControlFlow::Poll);
        }
        self.last_frame_time = Some(now);

        let Some(window) = self.window.as_ref() else {
            return;
        };

        let report = self.viewer.frame(now - self.started);
        if report.camera_moved {
            window.request_redraw();
        }
        self.dispatch_events();
    }
}
