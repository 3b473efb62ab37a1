use nalgebra::Vector3;
use std::collections::BTreeMap;

/// Opaque handle for something placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(pub u32);

/// Parameters of one house in a chunk's street frontage.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseLot {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Index into the configured house palette.
    pub color: usize,
}

/// What the core asks the geometry factory to build. Slabs and tracks extend
/// from their position towards -z for `length` units.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    Ground { length: f32 },
    Road { length: f32 },
    Track { length: f32 },
    House(HouseLot),
    Coin,
    /// Front of the locomotive sits at the position; cars trail towards -z.
    Train { cars: u32, length: f32 },
    Character,
}

/// The scene graph the simulation positions content in. It never inspects
/// what the factory built for a `Renderable`.
pub trait SceneGraph {
    fn insert(&mut self, renderable: Renderable, position: Vector3<f32>) -> RenderId;
    fn set_position(&mut self, id: RenderId, position: Vector3<f32>);
    fn set_visible(&mut self, id: RenderId, visible: bool);
    fn remove(&mut self, id: RenderId);

    /// Whether the train model has finished loading. Train spawns wait for it.
    fn train_model_ready(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub renderable: Renderable,
    pub position: Vector3<f32>,
    pub visible: bool,
}

/// In-memory scene: a flat list of placed renderables. The browser host draws
/// from it every frame.
#[derive(Debug)]
pub struct DisplayList {
    items: BTreeMap<RenderId, SceneItem>,
    next_id: u32,
    train_model_ready: bool,
}

impl DisplayList {
    pub fn new() -> Self {
        DisplayList { items: BTreeMap::new(), next_id: 0, train_model_ready: true }
    }

    /// A list whose train model is still loading.
    pub fn pending_assets() -> Self {
        DisplayList { train_model_ready: false, ..DisplayList::new() }
    }

    pub fn mark_train_model_ready(&mut self) {
        self.train_model_ready = true;
    }

    pub fn get(&self, id: RenderId) -> Option<&SceneItem> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = (&RenderId, &SceneItem)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_where(&self, pred: impl Fn(&Renderable) -> bool) -> usize {
        self.items.values().filter(|item| pred(&item.renderable)).count()
    }
}

impl Default for DisplayList {
    fn default() -> Self {
        DisplayList::new()
    }
}

impl SceneGraph for DisplayList {
    fn insert(&mut self, renderable: Renderable, position: Vector3<f32>) -> RenderId {
        let id = RenderId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, SceneItem { renderable, position, visible: true });
        id
    }

    fn set_position(&mut self, id: RenderId, position: Vector3<f32>) {
        if let Some(item) = self.items.get_mut(&id) {
            item.position = position;
        }
    }

    fn set_visible(&mut self, id: RenderId, visible: bool) {
        if let Some(item) = self.items.get_mut(&id) {
            item.visible = visible;
        }
    }

    fn remove(&mut self, id: RenderId) {
        self.items.remove(&id);
    }

    fn train_model_ready(&self) -> bool {
        self.train_model_ready
    }
}
