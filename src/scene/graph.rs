use glam::Vec3;

/// Things the renderer can draw. Water surfaces are addressed by stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneObject {
    Axes,
    Labels,
    DirectionalLight,
    AmbientLight,
    Land,
    Water(usize),
    SelectionMarker,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lights {
    pub directional_position: Vec3,
    pub directional_color: u32,
    pub ambient_color: u32,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            directional_position: Vec3::new(0.0, 200.0, -200.0),
            directional_color: 0xffffff,
            ambient_color: 0x404040,
        }
    }
}

/// Attached-object set, in attach order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    pub lights: Lights,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the object was already attached.
    pub fn add(&mut self, object: SceneObject) -> bool {
        if self.contains(object) {
            return false;
        }
        self.objects.push(object);
        true
    }

    pub fn remove(&mut self, object: SceneObject) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| *o != object);
        self.objects.len() != before
    }

    pub fn contains(&self, object: SceneObject) -> bool {
        self.objects.contains(&object)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stages whose water surface is currently attached.
    pub fn attached_water(&self) -> impl Iterator<Item = usize> + '_ {
        self.objects.iter().filter_map(|o| match o {
            SceneObject::Water(stage) => Some(*stage),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut scene = Scene::new();
        assert!(scene.add(SceneObject::Land));
        assert!(!scene.add(SceneObject::Land));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn water_is_tracked_by_stage() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Water(2));
        scene.add(SceneObject::Axes);
        assert_eq!(scene.attached_water().collect::<Vec<_>>(), vec![2]);
        assert!(scene.remove(SceneObject::Water(2)));
        assert!(!scene.remove(SceneObject::Water(2)));
        assert_eq!(scene.attached_water().count(), 0);
    }
}
