//! Rectangular simulation domain
//!
//! A [`Domain`] owns the field of one rectangle of the scene, knows where it sits
//! on the grid and which domains border it, and performs the neighbour-coupled
//! spectral transforms that the time stepping and the receivers are built on.

use crate::config::{DomainConfig, EdgesConfig, Settings};
use crate::domain::field::FieldValues;
use crate::domain::pml::{damping_profile, EdgeDamping};
use crate::domain_decomposition::{DomainId, Scene};
use crate::engine::array::{Complex64, FieldArray, FieldArrayExt};
use crate::engine::operations::mix;
use crate::geometry::{world_to_grid, CalcDirection, CalculationType, Direction, GridPoint};
use crate::spectral::{spatderp3, Coupling, Discretization, WaveNumberDiscretizer, Window};
use crate::utilities::fft_length;
use ndarray::{ArrayView1, Axis};
use std::sync::Arc;

/// A bordering domain and the half-open grid range the shared edge covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighbourLink {
    pub id: DomainId,
    pub span: (i64, i64),
}

/// Neighbour links per side
#[derive(Debug, Clone, Default)]
pub struct Neighbours {
    pub top: Vec<NeighbourLink>,
    pub bottom: Vec<NeighbourLink>,
    pub left: Vec<NeighbourLink>,
    pub right: Vec<NeighbourLink>,
}

impl Neighbours {
    pub fn side(&self, direction: Direction) -> &[NeighbourLink] {
        match direction {
            Direction::Top => &self.top,
            Direction::Bottom => &self.bottom,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, direction: Direction) -> &mut Vec<NeighbourLink> {
        match direction {
            Direction::Top => &mut self.top,
            Direction::Bottom => &mut self.bottom,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// Spatial derivatives needed by one Runge-Kutta stage
#[derive(Debug, Clone)]
pub struct Derivatives {
    pub dp_dx: FieldArray,
    pub dp_dy: FieldArray,
    pub dvx_dx: FieldArray,
    pub dvy_dy: FieldArray,
}

#[derive(Debug)]
pub struct Domain {
    pub id: String,
    pub index: DomainId,
    pub top_left: GridPoint,
    /// `(width, height, 1)` in cells
    pub size: GridPoint,
    pub density: f64,
    pub edges: EdgesConfig,
    pub neighbours: Neighbours,
    current: FieldValues,
    previous: FieldValues,
    window: Window,
    damping: Vec<EdgeDamping>,
    settings: Arc<Settings>,
    discretizer: Arc<WaveNumberDiscretizer>,
}

impl Domain {
    /// Build a domain from its configuration; fields start at zero
    pub fn new(
        index: DomainId,
        config: &DomainConfig,
        settings: Arc<Settings>,
        discretizer: Arc<WaveNumberDiscretizer>,
    ) -> Self {
        let ([x0, y0], [width, height]) = config.grid_extent(settings.grid_spacing);
        let top_left = GridPoint::new(x0, y0, 0);
        let size = GridPoint::new(width, height, 1);
        let extent = (size.x as usize, size.y as usize);

        Self {
            id: config.id.clone(),
            index,
            top_left,
            size,
            density: config.density.unwrap_or(settings.density),
            edges: config.edges,
            neighbours: Neighbours::default(),
            current: FieldValues::zeros(extent),
            previous: FieldValues::zeros(extent),
            window: Window::gaussian(settings.window_size, settings.patch_error),
            damping: Vec::new(),
            settings,
            discretizer,
        }
    }

    pub fn width(&self) -> usize {
        self.size.x as usize
    }

    pub fn height(&self) -> usize {
        self.size.y as usize
    }

    /// `(width, height)`
    pub fn extent(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// One past the last cell on each axis
    pub fn bottom_right(&self) -> GridPoint {
        self.top_left + GridPoint::new(self.size.x, self.size.y, 0)
    }

    /// Half-open grid range along `axis`
    pub fn span(&self, axis: CalcDirection) -> (i64, i64) {
        let start = self.top_left.along(axis);
        (start, start + self.size.along(axis))
    }

    pub fn contains(&self, cell: GridPoint) -> bool {
        let (x0, x1) = self.span(CalcDirection::X);
        let (y0, y1) = self.span(CalcDirection::Y);
        (x0..x1).contains(&cell.x) && (y0..y1).contains(&cell.y)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn values(&self) -> &FieldValues {
        debug_assert!(self.current.has_extent(self.extent()));
        &self.current
    }

    /// Pressure at a cell given relative to the top-left corner
    pub fn pressure_at(&self, local: GridPoint) -> Option<f64> {
        if local.x < 0 || local.y < 0 {
            return None;
        }
        self.values()
            .p0
            .get([local.x as usize, local.y as usize])
            .copied()
    }

    /// Add `source(cell) -> (p, px, py)` to every cell; `cell` is a global grid point
    pub fn inject<F>(&mut self, source: F)
    where
        F: Fn(GridPoint) -> (f64, f64, f64),
    {
        debug_assert!(self.current.has_extent(self.extent()));
        for x in 0..self.width() {
            for y in 0..self.height() {
                let cell = self.top_left + GridPoint::new(x as i64, y as i64, 0);
                let (p, px, py) = source(cell);
                self.current.p0[[x, y]] += p;
                self.current.px0[[x, y]] += px;
                self.current.py0[[x, y]] += py;
            }
        }
    }

    /// Neighbour across `direction` covering `grid` on the perpendicular axis
    pub fn neighbour_at_grid(&self, direction: Direction, grid: i64) -> Option<DomainId> {
        self.neighbours
            .side(direction)
            .iter()
            .find(|link| (link.span.0..link.span.1).contains(&grid))
            .map(|link| link.id)
    }

    /// Neighbour across `direction` covering the world location, or `None` at a
    /// simulation boundary
    pub fn neighbour_at(&self, direction: Direction, location: [f64; 3]) -> Option<DomainId> {
        let perpendicular = direction.axis().other();
        let world = location[perpendicular.index()];
        let grid = world_to_grid(world, self.settings.grid_spacing).floor() as i64;
        self.neighbour_at_grid(direction, grid)
    }

    /// Coupling weights on `direction`; `neighbour` is the domain across it, if any
    ///
    /// An edge backed by a damping layer is rigid itself.
    pub fn coupling(
        &self,
        direction: Direction,
        quantity: CalculationType,
        neighbour: Option<&Domain>,
    ) -> Coupling {
        match neighbour {
            Some(other) => Coupling::interface(quantity, self.density, other.density),
            None => {
                let edge = self.edges.side(direction);
                let absorption = if edge.locally_reacting {
                    edge.absorption
                } else {
                    0.0
                };
                Coupling::edge(quantity, absorption)
            }
        }
    }

    /// Build the damping layers of absorbing edges; call once neighbours are linked
    pub fn build_damping(&mut self) {
        let settings = &self.settings;
        let mut layers = Vec::new();

        for direction in Direction::ALL {
            let edge = self.edges.side(direction);
            if !edge.has_pml() {
                continue;
            }
            let across = direction.axis().other();
            let start = self.top_left.along(across);
            let open: Vec<bool> = (0..self.size.along(across))
                .map(|j| self.neighbour_at_grid(direction, start + j).is_none())
                .collect();
            if !open.contains(&true) {
                continue;
            }
            let depth = settings
                .pml_cells
                .min(self.size.along(direction.axis()) as usize);
            layers.push(EdgeDamping {
                direction,
                profile: damping_profile(
                    edge.absorption,
                    settings.pml_attenuation,
                    depth,
                    settings.time_step,
                ),
                open,
            });
        }

        self.damping = layers;
    }

    pub fn damping(&self) -> &[EdgeDamping] {
        &self.damping
    }

    /// Damp the absorbing layers once; a no-op for domains without any
    pub fn apply_damping(&mut self) {
        if self.damping.is_empty() {
            return;
        }
        for layer in &self.damping {
            layer.apply(&mut self.current);
        }
        self.current.sum_pressure();
    }

    /// FFT length for lines along `axis`
    pub fn fft_length(&self, axis: CalcDirection) -> usize {
        fft_length(self.settings.wave_length, self.size.along(axis) as usize)
    }

    /// Memoized discretization for lines along `axis`
    pub fn discretization(&self, axis: CalcDirection) -> Arc<Discretization> {
        self.discretizer
            .get_discretization(self.settings.grid_spacing, self.fft_length(axis))
    }

    /// Apply per-wavenumber `factors` to `quantity` along `axis`, line by line,
    /// with each line extended into the neighbours it touches
    pub fn compute_field(
        &self,
        scene: &Scene,
        axis: CalcDirection,
        quantity: CalculationType,
        factors: &[Complex64],
    ) -> FieldArray {
        let own = self.values().get(quantity, axis);
        let (lower, upper) = axis.sides();
        let across = axis.other();
        let lines = self.size.along(across) as usize;
        let mut result = FieldArray::zeros(self.extent());

        for j in 0..lines {
            let grid = self.top_left.along(across) + j as i64;
            let before = self.neighbour_at_grid(lower, grid).map(|id| scene.domain(id));
            let after = self.neighbour_at_grid(upper, grid).map(|id| scene.domain(id));

            let transformed = spatderp3(
                before.map(|d| d.line_at(axis, quantity, grid)),
                own.line(axis.index(), j),
                after.map(|d| d.line_at(axis, quantity, grid)),
                [
                    self.coupling(lower, quantity, before),
                    self.coupling(upper, quantity, after),
                ],
                factors,
                &self.window,
            );

            let mut target = result.index_axis_mut(Axis(across.index()), j);
            target.assign(&transformed);
        }

        result
    }

    /// The line along `axis` at global grid coordinate `grid` on the other axis
    fn line_at(
        &self,
        axis: CalcDirection,
        quantity: CalculationType,
        grid: i64,
    ) -> ArrayView1<'_, f64> {
        let local = (grid - self.top_left.along(axis.other())) as usize;
        self.values().get(quantity, axis).line(axis.index(), local)
    }

    /// Neighbour-coupled spatial derivatives of the current state
    pub fn spatial_derivatives(&self, scene: &Scene) -> Derivatives {
        let dx_factors = self.discretization(CalcDirection::X).derivative_factors();
        let dy_factors = self.discretization(CalcDirection::Y).derivative_factors();
        let along = |axis, quantity, factors: &[Complex64]| {
            self.compute_field(scene, axis, quantity, factors)
        };
        Derivatives {
            dp_dx: along(CalcDirection::X, CalculationType::Pressure, &dx_factors),
            dp_dy: along(CalcDirection::Y, CalculationType::Pressure, &dy_factors),
            dvx_dx: along(CalcDirection::X, CalculationType::Velocity, &dx_factors),
            dvy_dy: along(CalcDirection::Y, CalculationType::Velocity, &dy_factors),
        }
    }

    /// Keep a copy of the current state as the base of the next Runge-Kutta stages
    pub fn push_values(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// One low-storage Runge-Kutta stage with step `dt_alpha`
    pub fn apply_stage(&mut self, derivatives: &Derivatives, dt_alpha: f64) {
        let rho = self.density;
        let c = self.settings.sound_speed;
        let stiffness = rho * c * c;

        let (old, new) = (&self.previous, &mut self.current);
        mix(&old.vx0, -dt_alpha / rho, &derivatives.dp_dx, &mut new.vx0);
        mix(&old.vy0, -dt_alpha / rho, &derivatives.dp_dy, &mut new.vy0);
        mix(&old.px0, -dt_alpha * stiffness, &derivatives.dvx_dx, &mut new.px0);
        mix(&old.py0, -dt_alpha * stiffness, &derivatives.dvy_dy, &mut new.py0);
        self.current.sum_pressure();
    }

    /// True when the pressure field holds only finite values
    pub fn is_finite(&self) -> bool {
        self.current.p0.all_finite()
    }

    #[cfg(test)]
    pub(crate) fn values_mut(&mut self) -> &mut FieldValues {
        &mut self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainConfig;
    use approx::assert_abs_diff_eq;

    fn settings() -> Arc<Settings> {
        Arc::new(Settings {
            grid_spacing: 0.1,
            time_step: 0.001,
            render_time: 0.01,
            wave_length: 16,
            window_size: 16,
            ..Settings::default()
        })
    }

    fn config(id: &str, top_left: [f64; 2], size: [f64; 2]) -> DomainConfig {
        DomainConfig {
            id: id.into(),
            top_left,
            size,
            edges: EdgesConfig::default(),
            density: None,
        }
    }

    #[test]
    fn test_geometry_from_world_units() {
        let domain = Domain::new(
            DomainId(0),
            &config("a", [0.5, 1.0], [1.0, 0.3]),
            settings(),
            Default::default(),
        );
        assert_eq!(domain.top_left, GridPoint::new(5, 10, 0));
        assert_eq!(domain.size, GridPoint::new(10, 3, 1));
        assert_eq!(domain.bottom_right(), GridPoint::new(15, 13, 0));
        assert!(domain.contains(GridPoint::new(5, 12, 0)));
        assert!(!domain.contains(GridPoint::new(15, 12, 0)));
        assert!(domain.values().has_extent((10, 3)));
        assert_abs_diff_eq!(domain.density, 1.2);
    }

    #[test]
    fn test_pressure_at_bounds() {
        let mut domain = Domain::new(
            DomainId(0),
            &config("a", [0.0, 0.0], [1.0, 1.0]),
            settings(),
            Default::default(),
        );
        domain.values_mut().p0[[3, 4]] = 2.5;
        assert_eq!(domain.pressure_at(GridPoint::new(3, 4, 0)), Some(2.5));
        assert_eq!(domain.pressure_at(GridPoint::new(10, 0, 0)), None);
        assert_eq!(domain.pressure_at(GridPoint::new(-1, 0, 0)), None);
    }

    #[test]
    fn test_inject_adds_components() {
        let mut domain = Domain::new(
            DomainId(0),
            &config("a", [0.2, 0.0], [0.3, 0.2]),
            settings(),
            Default::default(),
        );
        domain.inject(|cell| (cell.x as f64, 1.0, 0.5));
        domain.inject(|cell| (cell.x as f64, 1.0, 0.5));
        assert_eq!(domain.values().p0[[0, 0]], 4.0);
        assert_eq!(domain.values().p0[[2, 1]], 8.0);
        assert_eq!(domain.values().px0[[1, 1]], 2.0);
        assert_eq!(domain.values().py0[[1, 1]], 1.0);
    }

    #[test]
    fn test_edge_coupling_uses_absorption() {
        let mut cfg = config("a", [0.0, 0.0], [1.0, 1.0]);
        cfg.edges.left.absorption = 0.75;
        cfg.edges.left.locally_reacting = true;
        cfg.edges.top.absorption = 0.75;
        let domain = Domain::new(DomainId(0), &cfg, settings(), Default::default());
        let left = domain.coupling(Direction::Left, CalculationType::Pressure, None);
        assert_abs_diff_eq!(left.reflection, 0.5);
        let right = domain.coupling(Direction::Right, CalculationType::Velocity, None);
        assert_abs_diff_eq!(right.reflection, -1.0);
        // absorbed in the layer behind it instead
        let top = domain.coupling(Direction::Top, CalculationType::Pressure, None);
        assert_abs_diff_eq!(top.reflection, 1.0);
    }

    #[test]
    fn test_damping_layers_follow_edge_flags() {
        let mut cfg = config("a", [0.0, 0.0], [1.0, 0.5]);
        cfg.edges.left.absorption = 1.0;
        cfg.edges.right.absorption = 1.0;
        cfg.edges.right.locally_reacting = true;
        let mut domain = Domain::new(DomainId(0), &cfg, settings(), Default::default());
        domain.build_damping();

        assert_eq!(domain.damping().len(), 1);
        let layer = &domain.damping()[0];
        assert_eq!(layer.direction, Direction::Left);
        assert_eq!(layer.profile.len(), 10);
        assert_eq!(layer.open, vec![true; 5]);

        domain.inject(|_| (1.0, 1.0, 1.0));
        domain.apply_damping();
        let values = domain.values();
        assert!(values.px0[[0, 2]] < 1.0);
        assert_eq!(values.py0[[0, 2]], 1.0);
        assert_eq!(values.p0[[0, 2]], values.px0[[0, 2]] + 1.0);
    }
}
