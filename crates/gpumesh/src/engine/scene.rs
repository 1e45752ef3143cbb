use crate::engine::core::device::RenderDevice;
use crate::engine::core::model::Model;
use crate::engine::light::Light;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

/// The models and lights to render, in insertion order.
pub struct Scene<D: RenderDevice> {
    models: Vec<(ModelId, Model<D>)>,
    lights: Vec<Light>,
    next_id: u64,
}

impl<D: RenderDevice> Scene<D> {
    pub fn new() -> Self {
        Scene {
            models: vec![],
            lights: vec![],
            next_id: 0,
        }
    }

    pub fn add_model(&mut self, model: Model<D>) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        self.models.push((id, model));
        id
    }

    /// Takes the model out of the scene. The caller becomes responsible for releasing it.
    pub fn remove_model(&mut self, id: ModelId) -> Option<Model<D>> {
        let position = self.models.iter().position(|(model_id, _)| *model_id == id)?;
        Some(self.models.remove(position).1)
    }

    pub fn model(&self, id: ModelId) -> Option<&Model<D>> {
        self.models.iter().find(|(model_id, _)| *model_id == id).map(|(_, model)| model)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model<D>> {
        self.models.iter().map(|(_, model)| model)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Draws all models with whatever program the caller activated.
    pub fn draw(&self, device: &D, pass: &mut D::Pass<'_>) {
        for model in self.models() {
            model.draw(device, pass);
        }
    }

    pub fn release(self, device: &D) {
        for (_, model) in self.models {
            model.release(device);
        }
    }
}

impl<D: RenderDevice> Default for Scene<D> {
    fn default() -> Self {
        Self::new()
    }
}
