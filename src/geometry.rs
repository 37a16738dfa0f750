//! Core geometry data structures for molecular representations.
//!
//! This module provides the fundamental data type consumed by every other
//! component of the crate:
//!
//! - [`Geometry`]: Molecular structure with element symbols and Cartesian
//!   coordinates
//!
//! All coordinates are in Bohr. The internal-coordinate machinery and the
//! empirical force-constant models are calibrated to atomic units, so
//! geometries read from Angstrom-valued sources must be converted first.

use nalgebra::{DVector, Vector3};

/// Unit conversion constants for coordinate systems
const BOHR_TO_ANGSTROM: f64 = 0.529177210903;
const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

/// Convert coordinates from Angstroms to Bohrs
pub fn angstrom_to_bohr(coords: &DVector<f64>) -> DVector<f64> {
    coords * ANGSTROM_TO_BOHR
}

/// Convert coordinates from Bohrs to Angstroms
pub fn bohr_to_angstrom(coords: &DVector<f64>) -> DVector<f64> {
    coords * BOHR_TO_ANGSTROM
}

/// Represents a molecular geometry with atomic elements and Cartesian coordinates.
///
/// The `Geometry` struct stores the chemical elements of each atom and their
/// 3D positions in a flat representation where coordinates are stored as a
/// single-dimensional vector in the order [x1, y1, z1, x2, y2, z2, ...].
///
/// # Coordinate System
///
/// - Units: Bohr (a0)
/// - Coordinate frame: Cartesian (x, y, z)
/// - Origin: Arbitrary
///
/// The flat `DVector<f64>` storage enables direct use with nalgebra for the
/// matrix operations of the Wilson B-matrix engine. A `Geometry` is treated
/// as an immutable snapshot by all components of this crate; coordinate
/// updates produce a fresh `Geometry`.
///
/// # Examples
///
/// ```
/// use redint::geometry::Geometry;
///
/// // Water-like geometry (coordinates in Bohr)
/// let elements = vec!["O".to_string(), "H".to_string(), "H".to_string()];
/// let coords = vec![
///     0.0, 0.0, 0.0,      // O at origin
///     1.43, 1.11, 0.0,    // H1
///     -1.43, 1.11, 0.0,   // H2
/// ];
///
/// let geometry = Geometry::new(elements, coords);
/// assert_eq!(geometry.num_atoms, 3);
/// assert_eq!(geometry.get_atom_coords(0), [0.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Chemical element symbols for each atom in order
    pub elements: Vec<String>,
    /// Flattened Cartesian coordinates [x1, y1, z1, x2, y2, z2, ...] in Bohr
    pub coords: DVector<f64>,
    /// Number of atoms in the molecule
    pub num_atoms: usize,
}

impl Geometry {
    /// Create a new `Geometry` from element list and coordinate vector.
    ///
    /// # Panics
    ///
    /// Panics if `coords.len() != elements.len() * 3`, ensuring data consistency.
    pub fn new(elements: Vec<String>, coords: Vec<f64>) -> Self {
        let num_atoms = elements.len();
        assert_eq!(coords.len(), num_atoms * 3);
        Self {
            elements,
            coords: DVector::from_vec(coords),
            num_atoms,
        }
    }

    /// Create a `Geometry` sharing this one's elements but carrying new coordinates.
    ///
    /// Used by the iterative back-transformation, which repeatedly displaces
    /// the Cartesian coordinates while the atom set stays fixed.
    ///
    /// # Panics
    ///
    /// Panics if `coords.len() != 3 * num_atoms`.
    pub fn with_coords(&self, coords: DVector<f64>) -> Self {
        assert_eq!(coords.len(), self.num_atoms * 3);
        Self {
            elements: self.elements.clone(),
            coords,
            num_atoms: self.num_atoms,
        }
    }

    /// Get the Cartesian coordinates of a specific atom as a plain array.
    pub fn get_atom_coords(&self, atom_idx: usize) -> [f64; 3] {
        let i = atom_idx * 3;
        [self.coords[i], self.coords[i + 1], self.coords[i + 2]]
    }

    /// Get the position of a specific atom as a nalgebra vector.
    ///
    /// Convenient for the bond/bend/dihedral value and gradient functions,
    /// which work with differences and cross products of atom positions.
    pub fn atom_vector(&self, atom_idx: usize) -> Vector3<f64> {
        let i = atom_idx * 3;
        Vector3::new(self.coords[i], self.coords[i + 1], self.coords[i + 2])
    }

    /// Euclidean distance between two atoms in Bohr.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.atom_vector(a) - self.atom_vector(b)).norm()
    }
}
