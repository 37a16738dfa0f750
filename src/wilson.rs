//! Wilson B-matrix engine: redundant coordinate sets, generalized inverse
//! and the iterative back-transformation.
//!
//! The B-matrix is the Jacobian of all primitive internal-coordinate values
//! with respect to the Cartesian coordinates, with one row per primitive
//! (bonds, then bends, then dihedrals) and 3N columns. Because a redundant
//! coordinate set carries more coordinates than Cartesian degrees of
//! freedom, the B-matrix is rectangular and rank-deficient; all inversions
//! go through a singular value decomposition that truncates the redundant
//! null space.
//!
//! Internal displacements are curvilinear, so mapping an internal step back
//! to Cartesians cannot be done in one shot: the B-matrix is only a local
//! linearization. [`RedundantCoords::transform`] therefore iterates Newton
//! corrections until the achieved internal values match the requested ones,
//! with a hard iteration bound. Non-convergence is reported via a flag and
//! never as a hard failure, so a caller can retry with a smaller step.

use crate::connectivity::{bond_matrix, DEFAULT_BOND_FACTOR};
use crate::elements::ElementError;
use crate::geometry::Geometry;
use crate::primitives::{detect_primitives, Primitive};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Relative singular-value cutoff of the generalized inverse.
///
/// Singular values below this fraction of the largest one belong to the
/// redundant-coordinate null space and are discarded. Truncation here is
/// expected behavior for a redundant set, not an error condition.
pub const SVD_RELATIVE_CUTOFF: f64 = 1e-10;

/// Error type for coordinate-system operations.
///
/// Only true input errors surface here; numerical edge cases (near-linear
/// angles, non-convergence of the back-transformation) degrade gracefully
/// and are signalled through return values and logs instead.
#[derive(Error, Debug)]
pub enum CoordError {
    /// An internal step vector does not match the primitive count.
    #[error("internal step has {got} components, expected {expected}")]
    StepLength {
        /// Number of primitive coordinates of the set
        expected: usize,
        /// Length of the offending step vector
        got: usize,
    },
    /// An element symbol could not be resolved to a covalent radius.
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Settings for the iterative back-transformation.
///
/// The iteration count is a hard bound; it guarantees termination whether
/// or not the residual converges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Convergence threshold on the internal-coordinate residual norm
    pub tolerance: f64,
    /// Maximum number of Newton iterations
    pub max_iterations: usize,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 25,
        }
    }
}

/// Outcome of an iterative back-transformation.
///
/// When `converged` is false the geometry is the best one achieved within
/// the iteration budget; the caller decides how to proceed (typically by
/// shrinking the step).
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Cartesian geometry realizing (or approximating) the requested step
    pub geometry: Geometry,
    /// Whether the residual norm fell below the tolerance
    pub converged: bool,
    /// Number of Newton iterations performed
    pub iterations: usize,
    /// Final internal-coordinate residual norm
    pub residual_norm: f64,
}

/// Moore-Penrose generalized inverse of a B-matrix via SVD.
///
/// For an M x 3N input the result is 3N x M. Singular values below
/// [`SVD_RELATIVE_CUTOFF`] relative to the largest one are truncated.
pub fn pseudo_inverse(b: &DMatrix<f64>) -> DMatrix<f64> {
    let svd = b.clone().svd(true, true);
    // Both factors were requested above; nalgebra always returns them then.
    let u = svd.u.expect("SVD computed with U");
    let v_t = svd.v_t.expect("SVD computed with V^T");

    let max_sv = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    let cutoff = SVD_RELATIVE_CUTOFF * max_sv;

    let mut sigma_inv = DMatrix::zeros(svd.singular_values.len(), svd.singular_values.len());
    for (i, &sv) in svd.singular_values.iter().enumerate() {
        if sv > cutoff {
            sigma_inv[(i, i)] = 1.0 / sv;
        }
    }
    v_t.transpose() * sigma_inv * u.transpose()
}

/// Forward transform: maps a Cartesian displacement or gradient into
/// internal-coordinate space, `B * x`.
pub fn forward(b: &DMatrix<f64>, cartesian: &DVector<f64>) -> DVector<f64> {
    b * cartesian
}

/// Backward transform: maps an internal displacement or gradient into
/// Cartesian space through the generalized inverse, `B_inv * y`.
pub fn backward(b_inv: &DMatrix<f64>, internal: &DVector<f64>) -> DVector<f64> {
    b_inv * internal
}

/// Wraps an angle difference into (-pi, pi].
fn wrap_to_pi(x: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut r = x % two_pi;
    if r > PI {
        r -= two_pi;
    } else if r <= -PI {
        r += two_pi;
    }
    r
}

/// A redundant internal-coordinate system over one molecular connectivity.
///
/// Holds the primitive coordinate set derived from a geometry's bond
/// matrix; all matrix operations are pure functions of a geometry snapshot
/// passed in per call, so one `RedundantCoords` can serve every iteration
/// of an optimization as long as the connectivity is meant to stay fixed.
///
/// # Examples
///
/// ```
/// use redint::geometry::Geometry;
/// use redint::wilson::RedundantCoords;
///
/// let geom = Geometry::new(
///     vec!["O".to_string(), "H".to_string(), "H".to_string()],
///     vec![0.0, 0.0, 0.0, 1.43, 1.11, 0.0, -1.43, 1.11, 0.0],
/// );
/// let coords = RedundantCoords::new(&geom).unwrap();
/// assert_eq!(coords.len(), 3); // two bonds and one bend
/// let b = coords.build_b(&geom);
/// assert_eq!((b.nrows(), b.ncols()), (3, 9));
/// ```
#[derive(Debug, Clone)]
pub struct RedundantCoords {
    bond_factor: f64,
    primitives: Vec<Primitive>,
}

impl RedundantCoords {
    /// Builds the redundant coordinate set with the default bond factor.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::UnknownElement`] for element symbols missing
    /// from the covalent radius table.
    pub fn new(geom: &Geometry) -> Result<Self, ElementError> {
        Self::with_bond_factor(geom, DEFAULT_BOND_FACTOR)
    }

    /// Builds the redundant coordinate set with an explicit bond factor.
    pub fn with_bond_factor(geom: &Geometry, bond_factor: f64) -> Result<Self, ElementError> {
        let mat = bond_matrix(geom, bond_factor)?;
        let primitives = detect_primitives(geom, &mat);
        Ok(Self {
            bond_factor,
            primitives,
        })
    }

    /// The primitive coordinates, in B-matrix row order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The bond factor this coordinate set was built with.
    pub fn bond_factor(&self) -> f64 {
        self.bond_factor
    }

    /// Number of primitive coordinates.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the coordinate set is empty (single-atom geometry).
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Evaluates all primitive values for a geometry snapshot.
    pub fn values(&self, geom: &Geometry) -> DVector<f64> {
        DVector::from_iterator(
            self.primitives.len(),
            self.primitives.iter().map(|p| p.value(geom)),
        )
    }

    /// Assembles the Wilson B-matrix (M x 3N) for a geometry snapshot.
    ///
    /// Row m is the Cartesian gradient of primitive m; rows follow the
    /// bonds, bends, dihedrals ordering of [`detect_primitives`].
    pub fn build_b(&self, geom: &Geometry) -> DMatrix<f64> {
        let mut b = DMatrix::zeros(self.primitives.len(), geom.num_atoms * 3);
        for (m, prim) in self.primitives.iter().enumerate() {
            b.set_row(m, &prim.gradient(geom).transpose());
        }
        b
    }

    /// Generalized inverse of the B-matrix for a geometry snapshot (3N x M).
    pub fn b_inv(&self, geom: &Geometry) -> DMatrix<f64> {
        pseudo_inverse(&self.build_b(geom))
    }

    /// Residual between target and achieved internal values, with dihedral
    /// components wrapped into (-pi, pi].
    fn residual(&self, target: &DVector<f64>, achieved: &DVector<f64>) -> DVector<f64> {
        let mut r = target - achieved;
        for (m, prim) in self.primitives.iter().enumerate() {
            if matches!(prim, Primitive::Dihedral { .. }) {
                r[m] = wrap_to_pi(r[m]);
            }
        }
        r
    }

    /// Applies an internal-coordinate displacement by iterative Newton
    /// back-transformation.
    ///
    /// Each cycle converts the remaining internal displacement to a
    /// Cartesian one through the generalized inverse, applies it,
    /// re-evaluates the B-matrix and internal values, and feeds the residual
    /// back as the next displacement. On convergence the returned geometry
    /// reproduces `values(geom) + step` to within the tolerance; if the
    /// iteration budget runs out, the best-achieved geometry is returned
    /// with `converged == false`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::StepLength`] if `step` does not have one entry
    /// per primitive coordinate.
    pub fn transform(
        &self,
        geom: &Geometry,
        step: &DVector<f64>,
        settings: &TransformSettings,
    ) -> Result<Transformed, CoordError> {
        if step.len() != self.primitives.len() {
            return Err(CoordError::StepLength {
                expected: self.primitives.len(),
                got: step.len(),
            });
        }

        let target = self.values(geom) + step;
        let mut current = geom.clone();
        let mut remaining = step.clone();
        let mut best_geometry = geom.clone();
        let mut best_norm = remaining.norm();
        let mut iterations = 0;

        for it in 1..=settings.max_iterations {
            iterations = it;
            let b_inv = self.b_inv(&current);
            let dx = backward(&b_inv, &remaining);
            let new_coords = &current.coords + &dx;
            if new_coords.iter().any(|v| !v.is_finite()) {
                warn!("back-transformation produced non-finite coordinates at iteration {}", it);
                break;
            }
            current = current.with_coords(new_coords);

            let achieved = self.values(&current);
            remaining = self.residual(&target, &achieved);
            let norm = remaining.norm();
            debug!("back-transformation iteration {}: residual {:.3e}", it, norm);

            if norm < best_norm {
                best_norm = norm;
                best_geometry = current.clone();
            }
            if norm <= settings.tolerance {
                return Ok(Transformed {
                    geometry: current,
                    converged: true,
                    iterations: it,
                    residual_norm: norm,
                });
            }
        }

        warn!(
            "back-transformation not converged after {} iterations, residual {:.3e}",
            iterations, best_norm
        );
        Ok(Transformed {
            geometry: best_geometry,
            converged: false,
            iterations,
            residual_norm: best_norm,
        })
    }
}
