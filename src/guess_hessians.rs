//! Empirical diagonal guess Hessians in internal-coordinate space.
//!
//! This module implements four published models that estimate a force
//! constant per primitive coordinate from interatomic distances and
//! covalent radii. Seeded this way, a quasi-Newton optimizer needs
//! markedly fewer iterations than with a unit matrix.
//!
//! # Available Models
//!
//! - **Simple**: fixed constants per coordinate kind
//! - **Fischer**: distance-dependent exponentials, Fischer/Almlöf
//! - **Lindh**: chained pair decay factors, Lindh et al.
//! - **Swart**: Lindh-style chain with a simpler decay, Swart/Bickelhaupt
//!
//! All models are pure functions of a geometry snapshot: calling one twice
//! yields bit-identical matrices. Geometries with no bends or no dihedrals
//! are handled naturally (those kinds simply contribute nothing).
//!
//! # References
//!
//! - Lindh, R. et al. Chem. Phys. Lett. 1995, 241, 423-428.
//! - Fischer, T. H.; Almlöf, J. J. Phys. Chem. 1992, 96, 9768-9774.
//! - Swart, M.; Bickelhaupt, F. M. Int. J. Quantum Chem. 2006, 106, 2536-2544.

use crate::connectivity::{bond_matrix, condensed_distances, pair_covalent_radii, pair_index};
use crate::elements::{is_first_period, ElementError};
use crate::geometry::Geometry;
use crate::primitives::{torsion_bond_sum, Primitive};
use crate::wilson::RedundantCoords;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Selects one of the empirical guess-Hessian models.
///
/// All four are interchangeable: each produces a diagonal matrix indexed
/// identically to the primitive coordinate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessModel {
    /// Fixed 0.5 / 0.2 / 0.1 constants
    Simple,
    /// Fischer/Almlöf distance-dependent model
    Fischer,
    /// Lindh model with period-dependent decay exponents
    Lindh,
    /// Swart/Bickelhaupt variant of the Lindh chain product
    Swart,
}

/// Computes the diagonal guess Hessian for a geometry snapshot.
///
/// Entry k of the result is the estimated force constant of primitive k of
/// `coords`, so the matrix is aligned with the B-matrix row order.
///
/// # Errors
///
/// Returns [`ElementError::UnknownElement`] for element symbols missing
/// from the covalent radius table.
///
/// # Examples
///
/// ```
/// use redint::geometry::Geometry;
/// use redint::wilson::RedundantCoords;
/// use redint::guess_hessians::{guess_hessian, GuessModel};
///
/// let geom = Geometry::new(
///     vec!["O".to_string(), "H".to_string(), "H".to_string()],
///     vec![0.0, 0.0, 0.0, 1.43, 1.11, 0.0, -1.43, 1.11, 0.0],
/// );
/// let coords = RedundantCoords::new(&geom).unwrap();
/// let h = guess_hessian(&geom, &coords, GuessModel::Simple).unwrap();
/// assert_eq!(h[(0, 0)], 0.5);
/// assert_eq!(h[(2, 2)], 0.2);
/// ```
pub fn guess_hessian(
    geom: &Geometry,
    coords: &RedundantCoords,
    model: GuessModel,
) -> Result<DMatrix<f64>, ElementError> {
    match model {
        GuessModel::Simple => Ok(simple_guess(coords.primitives())),
        GuessModel::Fischer => fischer_guess(geom, coords),
        GuessModel::Lindh => lindh_guess(geom, coords.primitives()),
        GuessModel::Swart => swart_guess(geom, coords.primitives()),
    }
}

/// Fixed force constants: 0.5 per bond, 0.2 per bend, 0.1 per dihedral.
pub fn simple_guess(primitives: &[Primitive]) -> DMatrix<f64> {
    let diag = DVector::from_iterator(
        primitives.len(),
        primitives.iter().map(|prim| match prim {
            Primitive::Bond { .. } => 0.5,
            Primitive::Bend { .. } => 0.2,
            Primitive::Dihedral { .. } => 0.1,
        }),
    );
    DMatrix::from_diagonal(&diag)
}

/// Fischer/Almlöf distance-dependent force constants.
///
/// Bond: `0.3601 * exp(-1.944 * (r - r_cov))`. Bend, for terminals b, c
/// around central atom a: `0.089 + 0.11 / (r_ab_cov * r_ac_cov)^-0.42 *
/// exp(-0.44 * (r_ab + r_ac - r_ab_cov - r_ac_cov))`. The sign of the
/// -0.42 exponent is ambiguous in the published reference; the literal
/// published form is kept here and should be verified against Fischer &
/// Almlöf 1992 before being relied on elsewhere. Dihedral, about central
/// bond a-b: `0.0015 + 14.0 * b^0.57 / (r_ab * r_ab_cov)^4 *
/// exp(-2.85 * (r_ab - r_ab_cov))` with `b` the number of bonds formed by
/// the two central atoms besides the central bond itself.
pub fn fischer_guess(
    geom: &Geometry,
    coords: &RedundantCoords,
) -> Result<DMatrix<f64>, ElementError> {
    let n = geom.num_atoms;
    let dists = condensed_distances(geom);
    let cov = pair_covalent_radii(geom)?;
    let bond_mat = bond_matrix(geom, coords.bond_factor())?;

    let dist = |a: usize, b: usize| dists[pair_index(n, a, b)];
    let cov_sum = |a: usize, b: usize| cov[pair_index(n, a, b)];

    let diag = DVector::from_iterator(
        coords.len(),
        coords.primitives().iter().map(|prim| match *prim {
            Primitive::Bond { i, j } => {
                0.3601 * (-1.944 * (dist(i, j) - cov_sum(i, j))).exp()
            }
            Primitive::Bend { i, j, k } => {
                let r_ab = dist(j, i);
                let r_ac = dist(j, k);
                let r_ab_cov = cov_sum(j, i);
                let r_ac_cov = cov_sum(j, k);
                0.089
                    + 0.11 / (r_ab_cov * r_ac_cov).powf(-0.42)
                        * (-0.44 * (r_ab + r_ac - r_ab_cov - r_ac_cov)).exp()
            }
            Primitive::Dihedral { j, k, .. } => {
                let r_ab = dist(j, k);
                let r_ab_cov = cov_sum(j, k);
                let bond_sum = torsion_bond_sum(&bond_mat, j, k) as f64;
                0.0015
                    + 14.0 * bond_sum.powf(0.57) / (r_ab * r_ab_cov).powf(4.0)
                        * (-2.85 * (r_ab - r_ab_cov)).exp()
            }
        }),
    );
    Ok(DMatrix::from_diagonal(&diag))
}

/// Decay exponent of the Lindh pair factor.
///
/// 1.0 when both atoms are first-period (H, He), 0.3949 when exactly one
/// is, 0.28 otherwise. Heavier periods reuse the third-period value.
fn lindh_alpha(sym_a: &str, sym_b: &str) -> f64 {
    match (is_first_period(sym_a), is_first_period(sym_b)) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.3949,
        (false, false) => 0.28,
    }
}

/// Chain product of pair factors rho over consecutive atoms of a primitive.
fn rho_chain<F>(prim: &Primitive, rho: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let inds = prim.indices();
    inds.windows(2).map(|pair| rho(pair[0], pair[1])).product()
}

/// Lindh model force constants.
///
/// Uses `rho(i, j) = exp(alpha_ij * (r_cov,ij^2 - r_ij^2))` with the true
/// covalent radius sums in place of the tabulated reference distances of
/// the paper; the tabulated value for a carbon pair (2.87 Bohr) agrees
/// with twice the covalent radius (2.88 Bohr) to one percent.
pub fn lindh_guess(geom: &Geometry, primitives: &[Primitive]) -> Result<DMatrix<f64>, ElementError> {
    let n = geom.num_atoms;
    let dists = condensed_distances(geom);
    let cov = pair_covalent_radii(geom)?;

    let rho = |a: usize, b: usize| {
        let k = pair_index(n, a, b);
        let alpha = lindh_alpha(&geom.elements[a], &geom.elements[b]);
        (alpha * (cov[k] * cov[k] - dists[k] * dists[k])).exp()
    };

    let diag = DVector::from_iterator(
        primitives.len(),
        primitives.iter().map(|prim| {
            let k = match prim {
                Primitive::Bond { .. } => 0.45,
                Primitive::Bend { .. } => 0.15,
                Primitive::Dihedral { .. } => 0.005,
            };
            k * rho_chain(prim, &rho)
        }),
    );
    Ok(DMatrix::from_diagonal(&diag))
}

/// Swart/Bickelhaupt force constants.
///
/// Same chain-product structure as the Lindh model with the simpler pair
/// factor `rho(i, j) = exp(1 - r_ij / r_cov,ij)`.
pub fn swart_guess(geom: &Geometry, primitives: &[Primitive]) -> Result<DMatrix<f64>, ElementError> {
    let n = geom.num_atoms;
    let dists = condensed_distances(geom);
    let cov = pair_covalent_radii(geom)?;

    let rho = |a: usize, b: usize| {
        let k = pair_index(n, a, b);
        (1.0 - dists[k] / cov[k]).exp()
    };

    let diag = DVector::from_iterator(
        primitives.len(),
        primitives.iter().map(|prim| {
            let k = match prim {
                Primitive::Bond { .. } => 0.35,
                Primitive::Bend { .. } => 0.15,
                Primitive::Dihedral { .. } => 0.005,
            };
            k * rho_chain(prim, &rho)
        }),
    );
    Ok(DMatrix::from_diagonal(&diag))
}
