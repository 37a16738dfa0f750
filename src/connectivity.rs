//! Bond connectivity derived from interatomic distances and covalent radii.
//!
//! Two atoms are considered bonded when their distance does not exceed the
//! sum of their covalent radii scaled by a bond factor:
//!
//! ```text
//! bonded(i, j)  <=>  r_ij <= bond_factor * (r_cov,i + r_cov,j)
//! ```
//!
//! The boundary is inclusive. This single threshold drives primitive
//! coordinate detection and the Fischer torsion bond counts; no other
//! connectivity criterion exists in the crate.
//!
//! Pairwise quantities are exposed both as condensed vectors over all
//! unordered pairs in lexicographic order ((0,1), (0,2), ..., (1,2), ...)
//! and as square matrices, mirroring how the force-constant models consume
//! them.

use crate::elements::{covalent_radius, ElementError};
use crate::geometry::Geometry;
use nalgebra::{DMatrix, DVector};

/// Default scaling applied to covalent radius sums when deciding bonds.
pub const DEFAULT_BOND_FACTOR: f64 = 1.3;

/// Index of the unordered pair (i, j) in a condensed pair vector.
///
/// `n` is the atom count. The order is lexicographic over pairs with
/// `i < j`; passing the indices swapped is allowed.
pub fn pair_index(n: usize, i: usize, j: usize) -> usize {
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    i * n - i * (i + 1) / 2 + (j - i - 1)
}

/// The bond decision for a single pair.
///
/// Kept as a separate function so the inclusive boundary is testable in
/// isolation from floating-point distance computation.
pub fn bonded(dist: f64, cov_radius_sum: f64, bond_factor: f64) -> bool {
    dist <= bond_factor * cov_radius_sum
}

/// Condensed vector of all pairwise interatomic distances in Bohr.
pub fn condensed_distances(geom: &Geometry) -> DVector<f64> {
    let n = geom.num_atoms;
    let mut dists = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            dists.push(geom.distance(i, j));
        }
    }
    DVector::from_vec(dists)
}

/// Condensed vector of covalent radius sums r_cov,i + r_cov,j in Bohr.
///
/// Recomputed for every geometry; never cached across different atom sets.
/// Fails fast on the first unknown element symbol.
pub fn pair_covalent_radii(geom: &Geometry) -> Result<DVector<f64>, ElementError> {
    let radii = geom
        .elements
        .iter()
        .map(|sym| covalent_radius(sym))
        .collect::<Result<Vec<f64>, ElementError>>()?;

    let n = geom.num_atoms;
    let mut sums = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            sums.push(radii[i] + radii[j]);
        }
    }
    Ok(DVector::from_vec(sums))
}

/// Symmetric boolean bond matrix with a false diagonal.
///
/// Entry (i, j) is true iff the atoms are within `bond_factor` times their
/// covalent radius sum of each other.
///
/// # Errors
///
/// Returns [`ElementError::UnknownElement`] if any element symbol is absent
/// from the radius table.
pub fn bond_matrix(geom: &Geometry, bond_factor: f64) -> Result<DMatrix<bool>, ElementError> {
    let n = geom.num_atoms;
    let dists = condensed_distances(geom);
    let cov_sums = pair_covalent_radii(geom)?;

    let mut mat = DMatrix::from_element(n, n, false);
    for i in 0..n {
        for j in (i + 1)..n {
            let k = pair_index(n, i, j);
            if bonded(dists[k], cov_sums[k], bond_factor) {
                mat[(i, j)] = true;
                mat[(j, i)] = true;
            }
        }
    }
    Ok(mat)
}

/// Number of bonds formed by one atom, i.e. one row sum of the bond matrix.
pub fn bond_count(bond_mat: &DMatrix<bool>, atom: usize) -> usize {
    bond_mat.row(atom).iter().filter(|&&b| b).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h2o() -> Geometry {
        Geometry::new(
            vec!["O".to_string(), "H".to_string(), "H".to_string()],
            vec![0.0, 0.0, 0.0, 1.43, 1.11, 0.0, -1.43, 1.11, 0.0],
        )
    }

    #[test]
    fn test_pair_index_lexicographic() {
        // 4 atoms: (0,1)=0 (0,2)=1 (0,3)=2 (1,2)=3 (1,3)=4 (2,3)=5
        assert_eq!(pair_index(4, 0, 1), 0);
        assert_eq!(pair_index(4, 0, 3), 2);
        assert_eq!(pair_index(4, 1, 2), 3);
        assert_eq!(pair_index(4, 2, 3), 5);
        // order of arguments must not matter
        assert_eq!(pair_index(4, 3, 1), pair_index(4, 1, 3));
    }

    #[test]
    fn test_condensed_distances_order() {
        let geom = h2o();
        let dists = condensed_distances(&geom);
        assert_eq!(dists.len(), 3);
        assert!((dists[0] - geom.distance(0, 1)).abs() < 1e-15);
        assert!((dists[1] - geom.distance(0, 2)).abs() < 1e-15);
        assert!((dists[2] - geom.distance(1, 2)).abs() < 1e-15);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // Distance exactly at bond_factor * radius sum counts as bonded.
        let cov_sum = 1.833;
        let factor = 1.3;
        assert!(bonded(factor * cov_sum, cov_sum, factor));
        assert!(!bonded(factor * cov_sum + 1e-12, cov_sum, factor));
    }

    #[test]
    fn test_water_connectivity() {
        let geom = h2o();
        let mat = bond_matrix(&geom, DEFAULT_BOND_FACTOR).unwrap();
        assert!(mat[(0, 1)]);
        assert!(mat[(0, 2)]);
        assert!(mat[(1, 0)]);
        // the hydrogens are not bonded to each other
        assert!(!mat[(1, 2)]);
        // diagonal stays false
        for i in 0..3 {
            assert!(!mat[(i, i)]);
        }
        assert_eq!(bond_count(&mat, 0), 2);
        assert_eq!(bond_count(&mat, 1), 1);
    }

    #[test]
    fn test_unknown_element_fails_fast() {
        let geom = Geometry::new(
            vec!["O".to_string(), "Xx".to_string()],
            vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0],
        );
        assert!(pair_covalent_radii(&geom).is_err());
        assert!(bond_matrix(&geom, DEFAULT_BOND_FACTOR).is_err());
    }

    #[test]
    fn test_coincident_atoms_do_not_crash() {
        // Degenerate geometry; distance is zero and the pair is trivially
        // classified as bonded.
        let geom = Geometry::new(
            vec!["H".to_string(), "H".to_string()],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        let dists = condensed_distances(&geom);
        assert_eq!(dists[0], 0.0);
        let mat = bond_matrix(&geom, DEFAULT_BOND_FACTOR).unwrap();
        assert!(mat[(0, 1)]);
    }
}
