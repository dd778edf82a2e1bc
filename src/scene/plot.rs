use crossbeam::channel::{self, Receiver, Sender};
use glam::{Vec2, Vec3};

use crate::colormap::value_color;
use crate::config::PlotConfig;
use crate::data::{PointRecord, TerrainDataset};
use crate::error::{PlotError, PlotResult};
use crate::math::axes::{AxisLabel, SceneScales};
use crate::math::engine::{BuiltScene, TerrainEngine};
use crate::math::mesh::TriangleMesh;
use crate::renderer::camera::Camera;
use crate::scene::graph::{Scene, SceneObject};
use crate::scene::selection::{PlotEvent, PointerTracker, SelectionMarker, pick_nearest};
use crate::scene::stage::StageSet;

/// Everything that belongs to the dataset currently on display.
struct PlotContent {
    dataset: TerrainDataset,
    scales: SceneScales,
    land: TriangleMesh,
    stages: StageSet,
    axes: Vec<Vec3>,
    labels: Vec<AxisLabel>,
}

impl PlotContent {
    fn from_built(built: BuiltScene) -> PlotResult<Self> {
        let stages = StageSet::new(built.meshes.water)
            .ok_or_else(|| PlotError::dataset("dataset has no stages"))?;
        Ok(Self {
            dataset: built.dataset,
            scales: built.scales,
            land: built.meshes.land,
            stages,
            axes: built.axes,
            labels: built.labels,
        })
    }
}

/// Terrain widget: one land surface, a water surface per stage, stage
/// navigation and point selection.
pub struct TerrainPlot {
    config: PlotConfig,
    engine: TerrainEngine,
    pending: Option<u64>,

    scene: Scene,
    content: Option<PlotContent>,
    generation: u64,

    camera: Camera,
    viewport: Vec2,

    pointer: PointerTracker,
    marker: Option<SelectionMarker>,
    selected: Option<usize>,

    tx_event: Sender<PlotEvent>,
    rx_event: Receiver<PlotEvent>,

    needs_redraw: bool,
}

impl TerrainPlot {
    pub fn new(config: PlotConfig) -> Self {
        let (tx_event, rx_event) = channel::unbounded();
        let viewport = Vec2::new(1280.0, 720.0);
        let mut camera = Camera::default();
        camera.set_aspect(viewport.x, viewport.y);

        Self {
            config,
            engine: TerrainEngine::new(),
            pending: None,

            scene: Scene::new(),
            content: None,
            generation: 0,

            camera,
            viewport,

            pointer: PointerTracker::default(),
            marker: None,
            selected: None,

            tx_event,
            rx_event,

            needs_redraw: true,
        }
    }

    /// Builds and shows `dataset`, blocking until the scene is ready.
    ///
    /// `None` or an empty dataset clears the plot. On error the previous
    /// scene is left as it was.
    pub fn plot(&mut self, dataset: Option<TerrainDataset>) -> PlotResult<()> {
        let Some(dataset) = dataset.filter(|d| !d.is_empty()) else {
            self.pending = None;
            self.clear_plot();
            return Ok(());
        };

        let built = self.engine.build_blocking(dataset, self.config.clone())?;
        self.pending = None;
        self.install(built)
    }

    /// Queues `dataset` for a background build; see [`TerrainPlot::poll`].
    pub fn submit(&mut self, dataset: Option<TerrainDataset>) -> PlotResult<()> {
        let Some(dataset) = dataset.filter(|d| !d.is_empty()) else {
            self.pending = None;
            self.clear_plot();
            return Ok(());
        };

        let id = self.engine.submit(dataset, self.config.clone())?;
        log::debug!("submitted terrain build {}", id);
        self.pending = Some(id);
        Ok(())
    }

    /// Installs the latest submitted build if it has finished.
    ///
    /// Returns `None` while nothing new has arrived.
    pub fn poll(&mut self) -> Option<PlotResult<()>> {
        while let Some(result) = self.engine.try_recv_result() {
            if Some(result.id) != self.pending {
                log::debug!("dropping stale terrain build {}", result.id);
                continue;
            }
            self.pending = None;
            return Some(result.outcome.and_then(|built| self.install(built)));
        }
        None
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<String> {
        self.engine.last_error()
    }

    fn install(&mut self, built: BuiltScene) -> PlotResult<()> {
        let content = PlotContent::from_built(built)?;

        self.clear_plot();
        self.content = Some(content);
        self.generation += 1;

        for object in [
            SceneObject::Axes,
            SceneObject::Labels,
            SceneObject::DirectionalLight,
            SceneObject::AmbientLight,
            SceneObject::Land,
        ] {
            self.scene.add(object);
        }
        self.view_stage(0);

        if let Some(content) = &self.content {
            log::info!(
                "plotted {} points over {} stages",
                content.dataset.points.len(),
                content.stages.len()
            );
        }
        Ok(())
    }

    /// Removes everything from the scene and forgets the dataset.
    ///
    /// A dropped selection is reported as `Deselect`, so replotting does too.
    pub fn clear_plot(&mut self) {
        self.scene.clear();
        self.content = None;
        if self.selected.take().is_some() {
            let _ = self.tx_event.send(PlotEvent::Deselect);
        }
        self.pointer = PointerTracker::default();
        self.needs_redraw = true;
    }

    /// Shows stage `n`. Out-of-range stages are ignored and return `false`.
    pub fn goto(&mut self, n: i64) -> bool {
        self.view_stage(n)
    }

    pub fn try_goto(&mut self, n: i64) -> PlotResult<()> {
        if self.view_stage(n) {
            Ok(())
        } else {
            Err(PlotError::StageOutOfRange {
                requested: n,
                stages: self.number_of_stages(),
            })
        }
    }

    pub fn first_stage(&mut self) -> bool {
        self.goto(0)
    }

    pub fn previous_stage(&mut self) -> bool {
        match self.current_stage() {
            Some(stage) => self.goto(stage as i64 - 1),
            None => false,
        }
    }

    pub fn next_stage(&mut self) -> bool {
        match self.current_stage() {
            Some(stage) => self.goto(stage as i64 + 1),
            None => false,
        }
    }

    pub fn last_stage(&mut self) -> bool {
        let stages = self.number_of_stages();
        stages > 0 && self.goto(stages as i64 - 1)
    }

    fn view_stage(&mut self, n: i64) -> bool {
        let Some(content) = &mut self.content else {
            return false;
        };
        let Some((old, new)) = content.stages.goto(n) else {
            log::debug!("ignoring stage {} ({} stages)", n, content.stages.len());
            return false;
        };

        self.scene.remove(SceneObject::Water(old));
        self.scene.add(SceneObject::Water(new));
        self.needs_redraw = true;
        log::debug!("{}", content.stages.label());
        true
    }

    pub fn current_stage(&self) -> Option<usize> {
        self.content.as_ref().map(|c| c.stages.current())
    }

    pub fn number_of_stages(&self) -> usize {
        self.content.as_ref().map_or(0, |c| c.stages.len())
    }

    pub fn stage_label(&self) -> Option<String> {
        self.content.as_ref().map(|c| c.stages.label())
    }

    pub fn pointer_down(&mut self, px: Vec2) {
        if self.config.allow_selection {
            self.pointer.press(px);
        }
    }

    pub fn pointer_up(&mut self, px: Vec2) {
        if !self.config.allow_selection {
            return;
        }
        if self.pointer.release(px) {
            self.pick(px);
        }
    }

    fn pick(&mut self, px: Vec2) {
        let hit = self.content.as_ref().and_then(|content| {
            let ray = self.camera.ray_through(px, self.viewport);
            pick_nearest(&ray, &content.land, self.config.pick_threshold() as f32)
        });

        match hit {
            Some(index) => {
                self.select_point(index);
            }
            None => self.clear_selection(),
        }
    }

    /// Marks point `index` and raises a `Select` event. Returns false if
    /// there is no such point.
    pub fn select_point(&mut self, index: usize) -> bool {
        let Some(content) = &self.content else {
            return false;
        };
        let Some(point) = content.dataset.points.get(index) else {
            return false;
        };

        let position = content.land.position(index);
        let color = value_color(&self.config, &content.scales.value, point);
        let point = point.clone();

        let point_size = self.config.point_size as f32;
        let marker = self
            .marker
            .get_or_insert_with(|| SelectionMarker::new(point_size));
        marker.position = position;
        marker.color = color;

        self.scene.add(SceneObject::SelectionMarker);
        self.selected = Some(index);
        self.needs_redraw = true;

        log::debug!("selected point {} at {:?}", index, position);
        let _ = self.tx_event.send(PlotEvent::Select { index, point });
        true
    }

    /// Hides the marker and raises a `Deselect` event.
    pub fn clear_selection(&mut self) {
        if self.scene.remove(SceneObject::SelectionMarker) {
            self.needs_redraw = true;
        }
        self.selected = None;
        let _ = self.tx_event.send(PlotEvent::Deselect);
    }

    pub fn poll_event(&self) -> Option<PlotEvent> {
        self.rx_event.try_recv().ok()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera.set_aspect(self.viewport.x, self.viewport.y);
        self.needs_redraw = true;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera changes mark the plot for redraw.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.needs_redraw = true;
        &mut self.camera
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns and resets the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Bumped every time a new dataset is installed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dataset(&self) -> Option<&TerrainDataset> {
        self.content.as_ref().map(|c| &c.dataset)
    }

    pub fn scales(&self) -> Option<&SceneScales> {
        self.content.as_ref().map(|c| &c.scales)
    }

    pub fn land_mesh(&self) -> Option<&TriangleMesh> {
        self.content.as_ref().map(|c| &c.land)
    }

    pub fn water_mesh(&self, stage: usize) -> Option<&TriangleMesh> {
        self.content.as_ref().and_then(|c| c.stages.mesh(stage))
    }

    pub fn stages(&self) -> Option<&StageSet> {
        self.content.as_ref().map(|c| &c.stages)
    }

    pub fn axes_lines(&self) -> &[Vec3] {
        self.content
            .as_ref()
            .map(|c| c.axes.as_slice())
            .unwrap_or_default()
    }

    pub fn labels(&self) -> &[AxisLabel] {
        self.content
            .as_ref()
            .map(|c| c.labels.as_slice())
            .unwrap_or_default()
    }

    /// The marker, when it is attached to the scene.
    pub fn selection_marker(&self) -> Option<&SelectionMarker> {
        if self.scene.contains(SceneObject::SelectionMarker) {
            self.marker.as_ref()
        } else {
            None
        }
    }

    pub fn selected_point(&self) -> Option<(usize, &PointRecord)> {
        let index = self.selected?;
        let point = self.content.as_ref()?.dataset.points.get(index)?;
        Some((index, point))
    }

    /// Axis labels for the west-east and north-south axes, preferring the dataset's own.
    pub fn axis_names(&self) -> (&str, &str) {
        let dataset = self.dataset();
        (
            dataset
                .and_then(|d| d.x_label.as_deref())
                .unwrap_or(&self.config.x_label),
            dataset
                .and_then(|d| d.y_label.as_deref())
                .unwrap_or(&self.config.y_label),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FaceRecord;

    fn dataset(stages: usize) -> TerrainDataset {
        let p = |x: f64, y: f64| PointRecord {
            x,
            y,
            e: x * 0.1,
            w: (0..stages).map(|s| 1.0 + s as f64).collect(),
        };
        TerrainDataset::new(
            vec![p(0.0, 0.0), p(10.0, 0.0), p(0.0, 10.0), p(10.0, 10.0)],
            vec![FaceRecord([0, 2, 1]), FaceRecord([1, 2, 3])],
        )
    }

    #[test]
    fn plot_attaches_first_water_stage() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.plot(Some(dataset(3))).unwrap();

        assert_eq!(plot.current_stage(), Some(0));
        assert_eq!(plot.scene().attached_water().collect::<Vec<_>>(), vec![0]);
        assert_eq!(plot.stage_label().as_deref(), Some("Stage 1 of 3"));
        assert!(plot.scene().contains(SceneObject::Land));
    }

    #[test]
    fn stage_buttons_stop_at_the_ends() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.plot(Some(dataset(3))).unwrap();

        assert!(!plot.previous_stage());
        assert!(plot.last_stage());
        assert_eq!(plot.current_stage(), Some(2));
        assert!(!plot.next_stage());
        assert!(plot.previous_stage());
        assert_eq!(plot.current_stage(), Some(1));
        assert!(plot.first_stage());
        assert_eq!(plot.scene().attached_water().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn try_goto_reports_range() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.plot(Some(dataset(2))).unwrap();
        match plot.try_goto(7) {
            Err(PlotError::StageOutOfRange { requested, stages }) => {
                assert_eq!(requested, 7);
                assert_eq!(stages, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nothing_plotted_has_no_stage() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        assert_eq!(plot.current_stage(), None);
        assert!(!plot.goto(0));
        assert!(!plot.last_stage());
        assert!(plot.stage_label().is_none());
    }

    #[test]
    fn submit_then_poll_installs() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.submit(Some(dataset(4))).unwrap();
        assert!(plot.is_busy());

        let outcome = loop {
            if let Some(outcome) = plot.poll() {
                break outcome;
            }
            std::thread::yield_now();
        };
        outcome.unwrap();
        assert!(!plot.is_busy());
        assert_eq!(plot.number_of_stages(), 4);
        assert_eq!(plot.generation(), 1);
    }

    #[test]
    fn select_point_fires_event_and_attaches_marker() {
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.plot(Some(dataset(1))).unwrap();

        assert!(plot.select_point(3));
        let marker = plot.selection_marker().unwrap();
        assert_eq!(marker.position, plot.land_mesh().unwrap().position(3));
        // single-valued stage maps to the middle of the ramp
        assert_eq!(marker.color, 0x00ff00);

        match plot.poll_event() {
            Some(PlotEvent::Select { index, point }) => {
                assert_eq!(index, 3);
                assert_eq!(point.x, 10.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        plot.clear_selection();
        assert!(plot.selection_marker().is_none());
        assert_eq!(plot.poll_event(), Some(PlotEvent::Deselect));
    }

    #[test]
    fn axis_names_prefer_payload() {
        let mut ds = dataset(1);
        ds.x_label = Some("Easting".to_string());
        let mut plot = TerrainPlot::new(PlotConfig::default());
        plot.plot(Some(ds)).unwrap();
        assert_eq!(plot.axis_names(), ("Easting", "Y"));
    }
}
