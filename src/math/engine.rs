use crossbeam::channel::{self, Receiver, Sender};
use glam::Vec3;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::PlotConfig;
use crate::data::TerrainDataset;
use crate::error::{PlotError, PlotResult};
use crate::math::axes::{AxisLabel, SceneScales, axes_cube_lines, axis_labels};
use crate::math::mesh::TerrainMeshes;

/// Everything the widget needs to show one dataset, built off the UI thread.
pub struct BuiltScene {
    pub dataset: TerrainDataset,
    pub scales: SceneScales,
    pub meshes: TerrainMeshes,
    pub axes: Vec<Vec3>,
    pub labels: Vec<AxisLabel>,
}

pub enum EngineCommand {
    Build {
        id: u64,
        dataset: TerrainDataset,
        config: PlotConfig,
    },
    Stop,
}

pub struct BuildResult {
    pub id: u64,
    pub outcome: PlotResult<BuiltScene>,
}

pub struct TerrainEngine {
    tx_cmd: Sender<EngineCommand>,
    rx_result: Receiver<BuildResult>,
    last_error: Arc<Mutex<Option<String>>>,
    next_id: u64,
    thread_handle: Option<JoinHandle<()>>,
}

impl TerrainEngine {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<EngineCommand>();
        let (tx_result, rx_result) = channel::bounded::<BuildResult>(2);
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);

        let thread_handle = thread::spawn(move || {
            engine_thread(rx_cmd, tx_result, last_error_clone);
        });

        Self {
            tx_cmd,
            rx_result,
            last_error,
            next_id: 0,
            thread_handle: Some(thread_handle),
        }
    }

    /// Queues a build and returns its request id.
    pub fn submit(&mut self, dataset: TerrainDataset, config: PlotConfig) -> PlotResult<u64> {
        self.next_id += 1;
        let id = self.next_id;
        self.tx_cmd
            .send(EngineCommand::Build {
                id,
                dataset,
                config,
            })
            .map_err(|_| PlotError::EngineStopped)?;
        Ok(id)
    }

    pub fn try_recv_result(&self) -> Option<BuildResult> {
        self.rx_result.try_recv().ok()
    }

    /// Blocks until the result for `id` arrives, discarding older results.
    ///
    /// Returns `Superseded` if the worker skipped `id` in favour of a newer request.
    pub fn wait_for(&self, id: u64) -> PlotResult<BuiltScene> {
        loop {
            let result = self
                .rx_result
                .recv()
                .map_err(|_| PlotError::EngineStopped)?;
            if result.id == id {
                return result.outcome;
            }
            if result.id > id {
                return Err(PlotError::Superseded(id));
            }
            log::debug!("discarding stale build result {} (waiting for {})", result.id, id);
        }
    }

    pub fn build_blocking(
        &mut self,
        dataset: TerrainDataset,
        config: PlotConfig,
    ) -> PlotResult<BuiltScene> {
        let id = self.submit(dataset, config)?;
        self.wait_for(id)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl Default for TerrainEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerrainEngine {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(EngineCommand::Stop);
        // unblocks a worker stuck sending into a full result channel
        drop(std::mem::replace(&mut self.rx_result, channel::never()));
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn engine_thread(
    rx_cmd: Receiver<EngineCommand>,
    tx_result: Sender<BuildResult>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    while let Ok(cmd) = rx_cmd.recv() {
        let EngineCommand::Build {
            mut id,
            mut dataset,
            mut config,
        } = cmd
        else {
            return;
        };

        // collapse queued builds onto the newest
        for queued in rx_cmd.try_iter() {
            match queued {
                EngineCommand::Build {
                    id: newer,
                    dataset: newer_dataset,
                    config: newer_config,
                } => {
                    log::debug!("skipping build {} (superseded by {})", id, newer);
                    id = newer;
                    dataset = newer_dataset;
                    config = newer_config;
                }
                EngineCommand::Stop => return,
            }
        }

        *last_error.lock() = None;

        let outcome = build_scene(dataset, &config);
        if let Err(e) = &outcome {
            log::warn!("terrain build {} failed: {}", id, e);
            *last_error.lock() = Some(e.to_string());
        }

        if tx_result.send(BuildResult { id, outcome }).is_err() {
            return;
        }
    }
}

/// Validates `dataset` and builds its scales, meshes, axes and labels.
pub fn build_scene(dataset: TerrainDataset, config: &PlotConfig) -> PlotResult<BuiltScene> {
    let start = Instant::now();

    config.validate()?;
    dataset.validate()?;

    let scales = SceneScales::compute(&dataset, config)?;

    if let Some(clockwise) = dataset.face_is_clockwise(0) {
        let winding = if clockwise {
            "clockwise"
        } else {
            "counter-clockwise"
        };
        log::debug!("first face winding: {}", winding);
    }

    let meshes = TerrainMeshes::build(&dataset, &scales);
    let axes = axes_cube_lines(&scales);

    let title = dataset.z_label.as_deref().unwrap_or(&config.z_label);
    let labels = axis_labels(&scales, title);

    log::info!(
        "built terrain scene: {} vertices, {} triangles, {} stages in {:.1} ms",
        meshes.land.vertex_count(),
        meshes.land.triangle_count(),
        meshes.water.len(),
        start.elapsed().as_secs_f32() * 1000.0
    );

    Ok(BuiltScene {
        dataset,
        scales,
        meshes,
        axes,
        labels,
    })
}
