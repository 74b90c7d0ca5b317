//! # Robosim Python Bindings
//!
//! PyO3 bindings exposing the Robosim arena engine to Python.
//!
//! ## Usage
//!
//! ```python
//! import _robosim as robosim
//! from _robosim import RobotKind
//!
//! robosim.setup_logging("info")
//!
//! sim = robosim.PySimulation(seed=42)
//! sim.spawn_robot(RobotKind.Echo)
//! sim.spawn_robot(RobotKind.Swarm, position=(400.0, 300.0))
//!
//! sim.step(ticks=100)
//! xy = sim.positions().reshape(-1, 2)
//!
//! for info in sim.robot_info():
//!     print(info.summary())
//!
//! saved = sim.save_json()
//! sim.load_json(saved)
//! ```

use glam::DVec2;
use numpy::{PyArray1, ToPyArray};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use robosim_core::entity::{EntityId, RobotKind};
use robosim_core::{EntitySnapshot, RobotInfo, SimConfig, SimError, Simulation, TickMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn to_py_err(err: SimError) -> PyErr {
    match err {
        SimError::Placement(_) => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_tick_mode(mode: &str) -> PyResult<TickMode> {
    match mode {
        "sequential" => Ok(TickMode::Sequential),
        "snapshot" => Ok(TickMode::Snapshot),
        other => Err(PyValueError::new_err(format!(
            "unknown tick mode '{other}', expected 'sequential' or 'snapshot'"
        ))),
    }
}

/// Installs a `tracing` subscriber that prints engine logs to stderr.
///
/// `level` accepts an env-filter directive such as `"info"` or
/// `"robosim_core=debug"`. Calling it twice is a no-op.
#[pyfunction]
#[pyo3(signature = (level="info"))]
fn setup_logging(level: &str) -> PyResult<()> {
    let filter = EnvFilter::try_new(level).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

// =============================================================================
// Simulation
// =============================================================================

/// Simulation wrapper for Python.
#[pyclass]
pub struct PySimulation {
    inner: Simulation,
    default_layout: bool,
}

impl PySimulation {
    fn build(config: SimConfig, default_layout: bool) -> PyResult<Simulation> {
        if default_layout {
            Simulation::with_default_layout(config).map_err(to_py_err)
        } else {
            Simulation::new(config).map_err(to_py_err)
        }
    }
}

#[pymethods]
impl PySimulation {
    /// Create a new simulation.
    ///
    /// With `default_layout`, the arena starts with the stock obstacles and
    /// metal walls.
    #[new]
    #[pyo3(signature = (seed=0, width=800.0, height=600.0, tick_mode="sequential", default_layout=true))]
    fn new(
        seed: u64,
        width: f64,
        height: f64,
        tick_mode: &str,
        default_layout: bool,
    ) -> PyResult<Self> {
        let config = SimConfig {
            width,
            height,
            tick_mode: parse_tick_mode(tick_mode)?,
            ..SimConfig::with_seed(seed)
        };
        Ok(Self {
            inner: Self::build(config, default_layout)?,
            default_layout,
        })
    }

    /// Create a simulation from a JSON config document.
    #[staticmethod]
    #[pyo3(signature = (json, default_layout=true))]
    fn from_config_json(json: &str, default_layout: bool) -> PyResult<Self> {
        let config = SimConfig::from_json(json).map_err(to_py_err)?;
        Ok(Self {
            inner: Self::build(config, default_layout)?,
            default_layout,
        })
    }

    /// Get current tick.
    #[getter]
    fn tick(&self) -> u64 {
        self.inner.tick()
    }

    /// Get the master seed.
    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed()
    }

    /// Whether stepping is paused.
    #[getter]
    fn paused(&self) -> bool {
        self.inner.is_paused()
    }

    /// Number of entities in the arena.
    fn __len__(&self) -> usize {
        self.inner.arena().len()
    }

    /// Advance the simulation by `ticks` ticks.
    ///
    /// Releases the GIL during computation. Returns per-robot faults as
    /// `(entity_id, message)` pairs; a paused simulation does nothing.
    #[pyo3(signature = (ticks=1))]
    fn step(&mut self, py: Python, ticks: u64) -> Vec<(PyEntityId, String)> {
        py.allow_threads(|| {
            let mut faults = Vec::new();
            for _ in 0..ticks {
                let Some(report) = self.inner.step() else {
                    break;
                };
                faults.extend(
                    report
                        .faults
                        .into_iter()
                        .map(|f| (PyEntityId(f.id), f.error.to_string())),
                );
            }
            faults
        })
    }

    /// Stop `step` from advancing the world.
    fn pause(&mut self) {
        self.inner.pause();
    }

    /// Let `step` advance the world again.
    fn resume(&mut self) {
        self.inner.resume();
    }

    /// Flip the pause state and return the new one.
    fn toggle_pause(&mut self) -> bool {
        self.inner.toggle_pause()
    }

    /// Rebuild the simulation, optionally with a new seed.
    ///
    /// Keeps bounds, placement rules, tick mode and layout choice.
    #[pyo3(signature = (seed=None))]
    fn reset(&mut self, seed: Option<u64>) -> PyResult<()> {
        let mut config = self.inner.config().clone();
        if let Some(seed) = seed {
            config.seed = seed;
        }
        self.inner = Self::build(config, self.default_layout)?;
        info!(seed = self.inner.seed(), "simulation reset");
        Ok(())
    }

    /// Spawn a robot at `position`, or at a random clear spot if omitted.
    #[pyo3(signature = (kind, position=None))]
    fn spawn_robot(&mut self, kind: PyRobotKind, position: Option<(f64, f64)>) -> PyResult<PyEntityId> {
        let kind = kind.into();
        let id = match position {
            Some((x, y)) => self.inner.spawn_robot_at(kind, DVec2::new(x, y)),
            None => self.inner.spawn_robot(kind).map_err(to_py_err)?,
        };
        Ok(id.into())
    }

    /// Add an obstacle.
    fn add_obstacle(&mut self, position: (f64, f64)) -> PyEntityId {
        self.inner.add_obstacle(DVec2::new(position.0, position.1)).into()
    }

    /// Add a metal wall.
    fn add_metal_wall(&mut self, position: (f64, f64)) -> PyEntityId {
        self.inner.add_metal_wall(DVec2::new(position.0, position.1)).into()
    }

    /// Add a light.
    fn add_light(&mut self, position: (f64, f64)) -> PyEntityId {
        self.inner.add_light(DVec2::new(position.0, position.1)).into()
    }

    /// Remove the oldest robot. Returns its ID, or `None` if there are no robots.
    fn remove_robot(&mut self) -> Option<PyEntityId> {
        self.inner.remove_robot().map(|e| e.id().into())
    }

    /// Remove any entity. Returns whether it existed.
    fn remove(&mut self, id: PyEntityId) -> bool {
        self.inner.remove(id.into()).is_some()
    }

    /// Render snapshot of every entity, in registry order.
    fn snapshot(&self) -> Vec<PyEntitySnapshot> {
        self.inner.frame().into_iter().map(PyEntitySnapshot::from).collect()
    }

    /// Render snapshot serialized as JSON.
    fn snapshot_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.frame()).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Info-panel data for every robot.
    fn robot_info(&self) -> Vec<PyRobotInfo> {
        self.inner.robot_info().into_iter().map(PyRobotInfo).collect()
    }

    /// Info-panel data for one robot, or `None` if `id` is not a robot.
    fn info(&self, id: PyEntityId) -> Option<PyRobotInfo> {
        self.inner.info(id.into()).map(PyRobotInfo)
    }

    /// Entity centers as a flat `[x0, y0, x1, y1, ...]` array.
    fn positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        let flat: Vec<f64> = self
            .inner
            .arena()
            .entities()
            .iter()
            .flat_map(|e| {
                let p = e.position();
                [p.x, p.y]
            })
            .collect();
        flat.to_pyarray(py)
    }

    /// Serialize every entity as a JSON array.
    fn save_json(&self) -> PyResult<String> {
        self.inner.save_json().map_err(to_py_err)
    }

    /// Replace every entity with those in `json`. Returns how many were loaded.
    ///
    /// On error the arena is left untouched.
    fn load_json(&mut self, json: &str) -> PyResult<usize> {
        self.inner.load_json(json).map_err(to_py_err)
    }
}

// =============================================================================
// Value Types
// =============================================================================

/// Unique entity identifier exposed to Python.
#[pyclass(frozen, eq, hash)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PyEntityId(EntityId);

#[pymethods]
impl PyEntityId {
    /// Get the raw u64 value.
    #[getter]
    fn value(&self) -> u64 {
        self.0.as_u64()
    }

    fn __repr__(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl From<EntityId> for PyEntityId {
    fn from(id: EntityId) -> Self {
        Self(id)
    }
}

impl From<PyEntityId> for EntityId {
    fn from(id: PyEntityId) -> Self {
        id.0
    }
}

/// Robot kinds for Python.
#[pyclass(name = "RobotKind", eq, eq_int, hash, frozen)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyRobotKind {
    Simple,
    Whisker,
    Echo,
    LightDetector,
    Magnet,
    Pathfinder,
    Swarm,
    Explorer,
}

#[pymethods]
impl PyRobotKind {
    /// Persisted type name, e.g. `"EchoRobot"`.
    #[getter]
    fn type_name(&self) -> &'static str {
        RobotKind::from(*self).type_name()
    }
}

impl From<RobotKind> for PyRobotKind {
    fn from(kind: RobotKind) -> Self {
        match kind {
            RobotKind::Simple => PyRobotKind::Simple,
            RobotKind::Whisker => PyRobotKind::Whisker,
            RobotKind::Echo => PyRobotKind::Echo,
            RobotKind::LightDetector => PyRobotKind::LightDetector,
            RobotKind::Magnet => PyRobotKind::Magnet,
            RobotKind::Pathfinder => PyRobotKind::Pathfinder,
            RobotKind::Swarm => PyRobotKind::Swarm,
            RobotKind::Explorer => PyRobotKind::Explorer,
        }
    }
}

impl From<PyRobotKind> for RobotKind {
    fn from(kind: PyRobotKind) -> Self {
        match kind {
            PyRobotKind::Simple => RobotKind::Simple,
            PyRobotKind::Whisker => RobotKind::Whisker,
            PyRobotKind::Echo => RobotKind::Echo,
            PyRobotKind::LightDetector => RobotKind::LightDetector,
            PyRobotKind::Magnet => RobotKind::Magnet,
            PyRobotKind::Pathfinder => RobotKind::Pathfinder,
            PyRobotKind::Swarm => RobotKind::Swarm,
            PyRobotKind::Explorer => RobotKind::Explorer,
        }
    }
}

/// Render snapshot of one entity.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct PyEntitySnapshot {
    /// Entity ID.
    #[pyo3(get)]
    pub id: PyEntityId,
    /// Type name, e.g. `"Obstacle"` or `"MagnetRobot"`.
    #[pyo3(get)]
    pub type_name: String,
    /// Robot kind, or `None` for static items.
    #[pyo3(get)]
    pub kind: Option<PyRobotKind>,
    /// X position.
    #[pyo3(get)]
    pub x: f64,
    /// Y position.
    #[pyo3(get)]
    pub y: f64,
    /// Radius.
    #[pyo3(get)]
    pub radius: f64,
    /// Heading in radians (robots only).
    #[pyo3(get)]
    pub direction: Option<f64>,
    /// Magnet polarity (magnet robots only).
    #[pyo3(get)]
    pub attract: Option<bool>,
    /// Patrol route (pathfinder robots only).
    #[pyo3(get)]
    pub waypoints: Vec<(f64, f64)>,
    /// Waypoint being approached (pathfinder robots only).
    #[pyo3(get)]
    pub current_waypoint: Option<usize>,
}

impl From<EntitySnapshot> for PyEntitySnapshot {
    fn from(s: EntitySnapshot) -> Self {
        Self {
            id: s.id.into(),
            type_name: s.tag.type_name().to_owned(),
            kind: s.tag.robot_kind().map(PyRobotKind::from),
            x: s.x,
            y: s.y,
            radius: s.radius,
            direction: s.direction,
            attract: s.attract,
            waypoints: s.waypoints.iter().map(|w| (w.x, w.y)).collect(),
            current_waypoint: s.current_waypoint,
        }
    }
}

#[pymethods]
impl PyEntitySnapshot {
    /// Get position as tuple.
    #[getter]
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Whether this is a robot.
    #[getter]
    fn is_robot(&self) -> bool {
        self.kind.is_some()
    }

    fn __repr__(&self) -> String {
        format!(
            "EntitySnapshot({}, pos=({:.1}, {:.1}), r={:.1})",
            self.type_name, self.x, self.y, self.radius
        )
    }
}

/// Info-panel data for one robot.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct PyRobotInfo(RobotInfo);

#[pymethods]
impl PyRobotInfo {
    /// Entity ID.
    #[getter]
    fn id(&self) -> PyEntityId {
        self.0.id.into()
    }

    /// `"<TypeName> <ordinal>"`.
    #[getter]
    fn label(&self) -> &str {
        &self.0.label
    }

    /// Cruising speed.
    #[getter]
    fn speed(&self) -> f64 {
        self.0.current_speed
    }

    /// Heading in degrees, unwrapped.
    #[getter]
    fn direction_degrees(&self) -> f64 {
        self.0.direction_degrees
    }

    /// Heading wrapped into `[0, 360)` degrees.
    #[getter]
    fn bearing_degrees(&self) -> f64 {
        self.0.bearing_degrees()
    }

    /// Get position as tuple.
    #[getter]
    fn position(&self) -> (f64, f64) {
        (self.0.x, self.0.y)
    }

    /// Multi-line panel text.
    fn summary(&self) -> String {
        self.0.summary()
    }

    fn __repr__(&self) -> String {
        format!("RobotInfo({:?})", self.0.label)
    }
}

/// Python module definition.
#[pymodule]
fn _robosim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(setup_logging, m)?)?;
    m.add_class::<PySimulation>()?;
    m.add_class::<PyEntityId>()?;
    m.add_class::<PyRobotKind>()?;
    m.add_class::<PyEntitySnapshot>()?;
    m.add_class::<PyRobotInfo>()?;
    Ok(())
}
