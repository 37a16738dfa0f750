//! Primitive internal coordinates: bonds, bends and dihedrals.
//!
//! Each primitive is a typed variant carrying the indices of its atoms plus
//! a scalar value function and an analytic Cartesian-gradient function (one
//! row of the Wilson B-matrix). Dispatch is by pattern match on the variant,
//! never by the length of an index tuple.
//!
//! Conventions:
//!
//! - [`Primitive::Bond`]: bond length in Bohr.
//! - [`Primitive::Bend`]: angle in radians in [0, pi]; the central atom is
//!   the middle index.
//! - [`Primitive::Dihedral`]: torsion in radians in (-pi, pi], right-hand
//!   rule about the central bond (the middle two indices).
//!
//! The analytic gradients of bends are singular as the angle approaches 0
//! or pi, and dihedral gradients are singular when three of the four atoms
//! become collinear. Rather than propagating NaN, a degenerate primitive
//! yields an all-zero gradient row (its row drops out of the B-matrix for
//! that snapshot) and a warning is logged.

use crate::connectivity::bond_count;
use crate::geometry::Geometry;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Vector3};

/// Bends whose |cos| exceeds this are treated as (near-)linear.
///
/// Near-linear bends are suppressed at detection time and dihedrals are
/// never built across a near-linear flanking angle, since both gradients
/// are ill-conditioned there.
pub const LINEAR_COS_THRESHOLD: f64 = 0.95;

/// Threshold below which squared norms count as numerically zero.
const SINGULAR_EPS: f64 = 1e-10;

/// A primitive internal coordinate over atom indices of one geometry.
///
/// Index tuples never repeat an atom. The variant fixes the meaning of each
/// position: a bend's central atom is `j`; a dihedral is measured about the
/// `j`-`k` bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Bond length between atoms `i` and `j`.
    Bond {
        /// First atom
        i: usize,
        /// Second atom
        j: usize,
    },
    /// Bend angle `i`-`j`-`k` with central atom `j`.
    Bend {
        /// First terminal atom
        i: usize,
        /// Central atom
        j: usize,
        /// Second terminal atom
        k: usize,
    },
    /// Dihedral angle of the planes `i`-`j`-`k` and `j`-`k`-`l`.
    Dihedral {
        /// Terminal atom bonded to `j`
        i: usize,
        /// First central atom
        j: usize,
        /// Second central atom
        k: usize,
        /// Terminal atom bonded to `k`
        l: usize,
    },
}

impl Primitive {
    /// The atom indices of this primitive, in tuple order.
    pub fn indices(&self) -> Vec<usize> {
        match *self {
            Primitive::Bond { i, j } => vec![i, j],
            Primitive::Bend { i, j, k } => vec![i, j, k],
            Primitive::Dihedral { i, j, k, l } => vec![i, j, k, l],
        }
    }

    /// Evaluates the scalar value of this coordinate for a geometry snapshot.
    pub fn value(&self, geom: &Geometry) -> f64 {
        match *self {
            Primitive::Bond { i, j } => geom.distance(i, j),
            Primitive::Bend { i, j, k } => bend_value(geom, i, j, k),
            Primitive::Dihedral { i, j, k, l } => dihedral_value(geom, i, j, k, l),
        }
    }

    /// Evaluates the Cartesian gradient of this coordinate's value.
    ///
    /// The returned vector has length 3N and is nonzero only in the entries
    /// of the primitive's own atoms; it is one row of the Wilson B-matrix.
    /// Degenerate configurations yield an all-zero row (see module docs).
    pub fn gradient(&self, geom: &Geometry) -> DVector<f64> {
        let mut grad = DVector::zeros(geom.num_atoms * 3);
        match *self {
            Primitive::Bond { i, j } => bond_gradient(geom, i, j, &mut grad),
            Primitive::Bend { i, j, k } => bend_gradient(geom, i, j, k, &mut grad),
            Primitive::Dihedral { i, j, k, l } => dihedral_gradient(geom, i, j, k, l, &mut grad),
        }
        grad
    }
}

fn set_atom(grad: &mut DVector<f64>, atom: usize, v: Vector3<f64>) {
    let off = atom * 3;
    grad[off] = v[0];
    grad[off + 1] = v[1];
    grad[off + 2] = v[2];
}

fn bond_gradient(geom: &Geometry, i: usize, j: usize, grad: &mut DVector<f64>) {
    let diff = geom.atom_vector(i) - geom.atom_vector(j);
    let r = diff.norm();
    if r * r < SINGULAR_EPS {
        warn!("degenerate bond {}-{}: coincident atoms, zero gradient row", i, j);
        return;
    }
    let u = diff / r;
    set_atom(grad, i, u);
    set_atom(grad, j, -u);
}

fn bend_value(geom: &Geometry, i: usize, j: usize, k: usize) -> f64 {
    let u = geom.atom_vector(i) - geom.atom_vector(j);
    let v = geom.atom_vector(k) - geom.atom_vector(j);
    let cos = u.dot(&v) / (u.norm() * v.norm());
    cos.clamp(-1.0, 1.0).acos()
}

fn bend_gradient(geom: &Geometry, i: usize, j: usize, k: usize, grad: &mut DVector<f64>) {
    let u = geom.atom_vector(i) - geom.atom_vector(j);
    let v = geom.atom_vector(k) - geom.atom_vector(j);
    let ru = u.norm();
    let rv = v.norm();
    if ru * ru < SINGULAR_EPS || rv * rv < SINGULAR_EPS {
        warn!("degenerate bend {}-{}-{}: coincident atoms, zero gradient row", i, j, k);
        return;
    }
    let u_hat = u / ru;
    let v_hat = v / rv;
    let cos = u_hat.dot(&v_hat).clamp(-1.0, 1.0);
    let sin = (1.0 - cos * cos).sqrt();
    if sin < SINGULAR_EPS {
        warn!("bend {}-{}-{} is (near-)linear, zero gradient row", i, j, k);
        return;
    }

    let g_i = (u_hat * cos - v_hat) / (ru * sin);
    let g_k = (v_hat * cos - u_hat) / (rv * sin);
    set_atom(grad, i, g_i);
    set_atom(grad, k, g_k);
    set_atom(grad, j, -(g_i + g_k));
}

fn dihedral_value(geom: &Geometry, i: usize, j: usize, k: usize, l: usize) -> f64 {
    let b1 = geom.atom_vector(j) - geom.atom_vector(i);
    let b2 = geom.atom_vector(k) - geom.atom_vector(j);
    let b3 = geom.atom_vector(l) - geom.atom_vector(k);
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    // atan2 keeps the value well-defined over the full (-pi, pi] range and
    // encodes the right-hand-rule sign about b2.
    (b2.norm() * b1.dot(&n2)).atan2(n1.dot(&n2))
}

fn dihedral_gradient(geom: &Geometry, i: usize, j: usize, k: usize, l: usize, grad: &mut DVector<f64>) {
    let b1 = geom.atom_vector(j) - geom.atom_vector(i);
    let b2 = geom.atom_vector(k) - geom.atom_vector(j);
    let b3 = geom.atom_vector(l) - geom.atom_vector(k);
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let n1_sq = n1.norm_squared();
    let n2_sq = n2.norm_squared();
    let rb2 = b2.norm();
    if n1_sq < SINGULAR_EPS || n2_sq < SINGULAR_EPS || rb2 * rb2 < SINGULAR_EPS {
        warn!(
            "dihedral {}-{}-{}-{} has collinear atoms, zero gradient row",
            i, j, k, l
        );
        return;
    }

    let g_i = -n1 * (rb2 / n1_sq);
    let g_l = n2 * (rb2 / n2_sq);
    let p = b1.dot(&b2) / (rb2 * rb2);
    let q = b3.dot(&b2) / (rb2 * rb2);
    let g_j = g_i * (p - 1.0) - g_l * q;
    let g_k = g_l * (q - 1.0) - g_i * p;
    set_atom(grad, i, g_i);
    set_atom(grad, j, g_j);
    set_atom(grad, k, g_k);
    set_atom(grad, l, g_l);
}

fn is_near_linear(geom: &Geometry, i: usize, j: usize, k: usize) -> bool {
    bend_value(geom, i, j, k).cos().abs() > LINEAR_COS_THRESHOLD
}

/// Derives the primitive coordinate set from a bond matrix.
///
/// Bonds come from the upper triangle of the bond matrix, bends from pairs
/// of bonds sharing a central atom, and dihedrals from chains i-j-k-l where
/// j-k is a bond and i, l are further neighbors of j and k. The returned
/// vector is ordered bonds, then bends, then dihedrals, each group in
/// discovery order; this ordering fixes the row order of the B-matrix and
/// the diagonal order of every guess Hessian.
///
/// Near-linear bends are skipped, and no dihedral is built across a
/// near-linear flanking angle, because their gradients are ill-conditioned
/// (see [`LINEAR_COS_THRESHOLD`]).
pub fn detect_primitives(geom: &Geometry, bond_mat: &DMatrix<bool>) -> Vec<Primitive> {
    let n = geom.num_atoms;
    let mut prims = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if bond_mat[(i, j)] {
                prims.push(Primitive::Bond { i, j });
            }
        }
    }

    for j in 0..n {
        let neighbors: Vec<usize> = (0..n).filter(|&x| bond_mat[(j, x)]).collect();
        for (a, &i) in neighbors.iter().enumerate() {
            for &k in &neighbors[a + 1..] {
                if is_near_linear(geom, i, j, k) {
                    debug!("skipping near-linear bend {}-{}-{}", i, j, k);
                    continue;
                }
                prims.push(Primitive::Bend { i, j, k });
            }
        }
    }

    for j in 0..n {
        for k in (j + 1)..n {
            if !bond_mat[(j, k)] {
                continue;
            }
            for i in (0..n).filter(|&x| bond_mat[(j, x)] && x != k) {
                for l in (0..n).filter(|&x| bond_mat[(k, x)] && x != j && x != i) {
                    if is_near_linear(geom, i, j, k) || is_near_linear(geom, j, k, l) {
                        debug!("skipping dihedral {}-{}-{}-{} over near-linear bend", i, j, k, l);
                        continue;
                    }
                    prims.push(Primitive::Dihedral { i, j, k, l });
                }
            }
        }
    }

    let num_bonds = prims
        .iter()
        .filter(|p| matches!(p, Primitive::Bond { .. }))
        .count();
    debug!(
        "detected {} primitives ({} bonds) for {} atoms",
        prims.len(),
        num_bonds,
        n
    );
    prims
}

/// Bond counts at the two central atoms of each dihedral, for the Fischer
/// torsion force constant.
///
/// Each central atom's bond-matrix row counts the central bond once, so two
/// is subtracted to count only the peripheral bonds.
pub fn torsion_bond_sum(bond_mat: &DMatrix<bool>, j: usize, k: usize) -> usize {
    (bond_count(bond_mat, j) + bond_count(bond_mat, k)).saturating_sub(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{bond_matrix, DEFAULT_BOND_FACTOR};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn h2o() -> Geometry {
        Geometry::new(
            vec!["O".to_string(), "H".to_string(), "H".to_string()],
            vec![0.0, 0.0, 0.0, 1.43, 1.11, 0.0, -1.43, 1.11, 0.0],
        )
    }

    /// H-C-C-H chain with a 90 degree torsion.
    fn twisted_chain() -> Geometry {
        Geometry::new(
            vec![
                "H".to_string(),
                "C".to_string(),
                "C".to_string(),
                "H".to_string(),
            ],
            vec![
                0.0, 2.0, 0.0, // H
                0.0, 0.0, 0.0, // C
                2.8, 0.0, 0.0, // C
                2.8, 0.0, 2.0, // H
            ],
        )
    }

    #[test]
    fn test_water_primitive_set() {
        let geom = h2o();
        let mat = bond_matrix(&geom, DEFAULT_BOND_FACTOR).unwrap();
        let prims = detect_primitives(&geom, &mat);
        assert_eq!(
            prims,
            vec![
                Primitive::Bond { i: 0, j: 1 },
                Primitive::Bond { i: 0, j: 2 },
                Primitive::Bend { i: 1, j: 0, k: 2 },
            ]
        );
    }

    #[test]
    fn test_bond_value_and_gradient() {
        let geom = Geometry::new(
            vec!["H".to_string(), "H".to_string()],
            vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0],
        );
        let bond = Primitive::Bond { i: 0, j: 1 };
        assert!(approx_eq(bond.value(&geom), 1.5, 1e-14));

        let grad = bond.gradient(&geom);
        assert!(approx_eq(grad[0], -1.0, 1e-14));
        assert!(approx_eq(grad[3], 1.0, 1e-14));
        assert!(approx_eq(grad[1], 0.0, 1e-14));
    }

    #[test]
    fn test_bend_value_right_angle() {
        let geom = Geometry::new(
            vec!["H".to_string(), "O".to_string(), "H".to_string()],
            vec![1.8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.8, 0.0],
        );
        let bend = Primitive::Bend { i: 0, j: 1, k: 2 };
        assert!(approx_eq(bend.value(&geom), std::f64::consts::FRAC_PI_2, 1e-12));
    }

    #[test]
    fn test_dihedral_value_sign_convention() {
        let geom = twisted_chain();
        let dihedral = Primitive::Dihedral { i: 0, j: 1, k: 2, l: 3 };
        let phi = dihedral.value(&geom);
        assert!(approx_eq(phi.abs(), std::f64::consts::FRAC_PI_2, 1e-12));

        // Mirroring the last atom through the j-k-i plane flips the sign.
        let mut coords: Vec<f64> = geom.coords.iter().copied().collect();
        coords[11] = -coords[11];
        let mirrored = Geometry::new(geom.elements.clone(), coords);
        assert!(approx_eq(dihedral.value(&mirrored), -phi, 1e-12));
    }

    #[test]
    fn test_gradients_are_translationally_invariant() {
        let geom = twisted_chain();
        for prim in [
            Primitive::Bond { i: 1, j: 2 },
            Primitive::Bend { i: 0, j: 1, k: 2 },
            Primitive::Dihedral { i: 0, j: 1, k: 2, l: 3 },
        ] {
            let grad = prim.gradient(&geom);
            for axis in 0..3 {
                let total: f64 = (0..geom.num_atoms).map(|a| grad[a * 3 + axis]).sum();
                assert!(
                    approx_eq(total, 0.0, 1e-10),
                    "{:?} axis {} drift {}",
                    prim,
                    axis,
                    total
                );
            }
        }
    }

    #[test]
    fn test_linear_bend_gives_zero_row() {
        let geom = Geometry::new(
            vec!["C".to_string(), "C".to_string(), "C".to_string()],
            vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 3.0, 0.0, 0.0],
        );
        let bend = Primitive::Bend { i: 0, j: 1, k: 2 };
        let grad = bend.gradient(&geom);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_collinear_dihedral_gives_zero_row() {
        let geom = Geometry::new(
            vec!["H".to_string(), "C".to_string(), "C".to_string(), "H".to_string()],
            vec![
                -1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 3.0, 0.0, 1.0,
            ],
        );
        let dihedral = Primitive::Dihedral { i: 0, j: 1, k: 2, l: 3 };
        let grad = dihedral.gradient(&geom);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_torsion_bond_sum() {
        let geom = twisted_chain();
        let mat = bond_matrix(&geom, DEFAULT_BOND_FACTOR).unwrap();
        // Each carbon carries one H plus the central bond: (2 + 2) - 2 = 2.
        assert_eq!(torsion_bond_sum(&mat, 1, 2), 2);
    }
}
