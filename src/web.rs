use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Matrix4, Point3, Vector3};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, Request, RequestInit, RequestMode, Response, WebGlRenderingContext};

use crate::engine::geometry;
use crate::engine::mesh::Mesh;
use crate::engine::renderer::Renderer;
use crate::game::clock::FrameClock;
use crate::game::config::GameConfig;
use crate::game::lanes::LaneDirection;
use crate::game::scene::{DisplayList, Renderable};
use crate::game::{Game, GameEvents};

const CONFIG_PATH: &str = "/assets/config.json";
const TRAIN_MODEL_PATH: &str = "/assets/models/train.glb";
const SKY: [f32; 3] = [0.53, 0.81, 0.92];

struct App {
    game: Game,
    scene: DisplayList,
    renderer: Renderer,
    clock: FrameClock,
    ui: DomUi,
    train_mesh: Option<Mesh>,
    aspect: f32,
}

impl App {
    fn start(&mut self) {
        self.clock.reset();
        self.game.start(&mut self.scene, &mut self.ui);
    }

    fn frame(&mut self, now_ms: f64) {
        let delta = self.clock.delta(now_ms);
        self.game.tick(delta, &mut self.scene, &mut self.ui);
        self.render();
    }

    fn render(&self) {
        self.renderer.clear(SKY);
        let view_projection = self.camera();
        let config = self.game.config();

        for (_, item) in self.scene.items() {
            if !item.visible {
                continue;
            }
            match (&item.renderable, &self.train_mesh) {
                (Renderable::Train { length, .. }, Some(mesh)) => {
                    let scale = model_scale(mesh, *length);
                    self.renderer.draw_mesh(mesh, &item.position, scale, &view_projection);
                }
                (renderable, _) => {
                    for part in geometry::build(renderable, config) {
                        self.renderer.draw_box(&part, &item.position, &view_projection);
                    }
                }
            }
        }
    }

    /// Chase camera behind and above the character. Pulled back further
    /// while riding a roof so the track ahead stays in view.
    fn camera(&self) -> Matrix4<f32> {
        let character = self.game.character();
        let p = character.position;
        let back = if character.is_riding(self.game.config()) { 14.0 } else { 10.0 };
        let eye = Point3::new(p.x * 0.5, p.y + 5.0, p.z + back);
        let target = Point3::new(p.x, p.y + 1.0, p.z - 10.0);
        let view = Matrix4::look_at_rh(&eye, &target, &Vector3::y());
        let projection = Matrix4::new_perspective(self.aspect, std::f32::consts::FRAC_PI_3, 0.1, 1000.0);
        projection * view
    }
}

/// Scales the loaded model so its z extent matches the train length.
fn model_scale(mesh: &Mesh, length: f32) -> f32 {
    match mesh.bounds() {
        Some((min, max)) if max.z - min.z > f32::EPSILON => length / (max.z - min.z),
        _ => 1.0,
    }
}

/// Writes run events into the page's overlay elements.
struct DomUi {
    document: Document,
}

impl DomUi {
    fn set_display(&self, id: &str, shown: bool) {
        if let Some(el) = self.document.get_element_by_id(id) {
            let style = if shown { "display: block;" } else { "display: none;" };
            el.set_attribute("style", style).ok();
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }
}

impl GameEvents for DomUi {
    fn on_game_start(&mut self) {
        self.set_display("menu", false);
        self.set_display("gameover", false);
    }

    fn on_score_changed(&mut self, count: u32) {
        self.set_text("coin-count", &count.to_string());
    }

    fn on_game_over(&mut self, final_score: u32) {
        self.set_text("final-score", &final_score.to_string());
        self.set_display("gameover", true);
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app(f: impl FnOnce(&mut App)) {
    APP.with(|app| {
        if let Some(app) = app.borrow_mut().as_mut() {
            f(app);
        }
    });
}

#[wasm_bindgen]
pub async fn init_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let canvas = document.get_element_by_id("canvas")
        .ok_or("No canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    let gl = canvas
        .get_context("webgl")?
        .ok_or("No WebGL")?
        .dyn_into::<WebGlRenderingContext>()?;

    let renderer = Renderer::new(gl)?;
    renderer.enable_depth_test();
    renderer.resize(canvas.width() as i32, canvas.height() as i32);
    let aspect = canvas.width().max(1) as f32 / canvas.height().max(1) as f32;

    let config = match load_config().await {
        Ok(config) => config,
        Err(err) => {
            log::warn!("using default config: {:?}", err);
            GameConfig::default()
        }
    };

    let clock = FrameClock::new(config.max_frame_delta);
    let game = Game::new(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let app = App {
        clock,
        game,
        scene: DisplayList::pending_assets(),
        renderer,
        ui: DomUi { document: document.clone() },
        train_mesh: None,
        aspect,
    };
    APP.with(|a| *a.borrow_mut() = Some(app));

    wasm_bindgen_futures::spawn_local(async {
        let mesh = match load_train_model().await {
            Ok(mesh) => Some(mesh),
            Err(err) => {
                log::warn!("train model unavailable, drawing boxes: {:?}", err);
                None
            }
        };
        with_app(|app| {
            app.train_mesh = mesh;
            app.scene.mark_train_model_ready();
        });
    });

    // Input handling
    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let handled = match event.key().as_str() {
            "ArrowLeft" | "a" | "A" => { switch_lane(LaneDirection::Left); true },
            "ArrowRight" | "d" | "D" => { switch_lane(LaneDirection::Right); true },
            "Enter" | " " => { start_game(); true },
            _ => false,
        };
        if handled {
            event.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();

    if let Some(button) = document.get_element_by_id("play-button") {
        let closure = Closure::wrap(Box::new(move || start_game()) as Box<dyn FnMut()>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Game loop
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = now_ms();
        with_app(|app| app.frame(now));
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    }

    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

async fn fetch(path: &str) -> Result<Response, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(path, &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;
    if resp.ok() {
        Ok(resp)
    } else {
        Err(JsValue::from_str(&format!("{} returned {}", path, resp.status())))
    }
}

async fn load_config() -> Result<GameConfig, JsValue> {
    let resp = fetch(CONFIG_PATH).await?;
    let json = JsFuture::from(resp.json()?).await?;
    let config: GameConfig = serde_wasm_bindgen::from_value(json)?;
    config.validate().map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(config)
}

async fn load_train_model() -> Result<Mesh, JsValue> {
    let resp = fetch(TRAIN_MODEL_PATH).await?;
    let buffer = JsFuture::from(resp.array_buffer()?).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Mesh::from_gltf(&bytes).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn switch_lane(direction: LaneDirection) {
    with_app(|app| {
        app.game.switch_lane(direction);
    });
}

#[wasm_bindgen]
pub fn touch_left() {
    switch_lane(LaneDirection::Left);
}

#[wasm_bindgen]
pub fn touch_right() {
    switch_lane(LaneDirection::Right);
}

/// Starts a run from the menu or the game-over screen.
#[wasm_bindgen]
pub fn start_game() {
    with_app(|app| {
        if !app.game.is_playing() {
            app.start();
        }
    });
}
