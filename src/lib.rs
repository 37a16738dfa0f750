#![deny(missing_docs)]

//! redint - Redundant internal coordinates and guess Hessians
//!
//! This crate computes and maintains an internal-coordinate representation
//! of a molecular geometry (bonds, bends, dihedrals derived from Cartesian
//! positions and covalent-radius connectivity) and builds on it the two
//! capabilities a geometry optimizer needs from its coordinate system:
//!
//! 1. **Wilson B-matrix transforms** between Cartesian and internal
//!    coordinate spaces, including the SVD-based generalized inverse for
//!    the redundant null space and the iterative Newton back-transformation
//!    that maps a curvilinear internal step onto Cartesian displacements.
//! 2. **Empirical guess Hessians**: four interchangeable diagonal
//!    force-constant models (simple, Fischer, Lindh, Swart) that seed a
//!    quasi-Newton optimizer far better than a unit matrix.
//!
//! Step-taking optimization algorithms, quantum-chemistry calculators and
//! structure file I/O are deliberately outside this crate; they consume the
//! interfaces here.
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::DVector;
//! use redint::geometry::Geometry;
//! use redint::wilson::{RedundantCoords, TransformSettings};
//! use redint::guess_hessians::{guess_hessian, GuessModel};
//!
//! // Water, coordinates in Bohr.
//! let geom = Geometry::new(
//!     vec!["O".to_string(), "H".to_string(), "H".to_string()],
//!     vec![0.0, 0.0, 0.0, 1.43, 1.11, 0.0, -1.43, 1.11, 0.0],
//! );
//!
//! let coords = RedundantCoords::new(&geom).unwrap();
//! let hessian = guess_hessian(&geom, &coords, GuessModel::Lindh).unwrap();
//! assert_eq!(hessian.nrows(), coords.len());
//!
//! // Displace each internal coordinate a little and back-transform.
//! let step = DVector::from_element(coords.len(), 0.01);
//! let result = coords.transform(&geom, &step, &TransformSettings::default()).unwrap();
//! assert!(result.converged);
//! ```
//!
//! # Units
//!
//! Lengths are in Bohr and angles in radians throughout. The force-constant
//! models are calibrated against Bohr-scale covalent radii; feeding
//! Angstrom-valued coordinates silently miscalibrates every empirical
//! formula, so convert first (see [`geometry::angstrom_to_bohr`]).
//!
//! # Diagnostics
//!
//! Library code reports numerical edge cases (near-linear bends, collinear
//! dihedrals, non-converged back-transformations) through the [`log`]
//! facade. Install any logger implementation to capture them; none is
//! required.
//!
//! # Modules
//!
//! - [`elements`] - covalent radius table (Bohr)
//! - [`geometry`] - molecular geometry snapshot type
//! - [`connectivity`] - distances, radius sums and the bond matrix
//! - [`primitives`] - bond/bend/dihedral values and gradients
//! - [`wilson`] - B-matrix assembly, pseudoinverse, back-transformation
//! - [`guess_hessians`] - the four empirical force-constant models

pub mod connectivity;
pub mod elements;
pub mod geometry;
pub mod guess_hessians;
pub mod primitives;
pub mod wilson;

pub use elements::ElementError;
pub use geometry::Geometry;
pub use guess_hessians::GuessModel;
pub use primitives::Primitive;
pub use wilson::{CoordError, RedundantCoords, TransformSettings, Transformed};
