// Integration tests for the empirical guess-Hessian models.
use redint::geometry::Geometry;
use redint::guess_hessians::{guess_hessian, GuessModel};
use redint::primitives::Primitive;
use redint::wilson::RedundantCoords;

const ALL_MODELS: [GuessModel; 4] = [
    GuessModel::Simple,
    GuessModel::Fischer,
    GuessModel::Lindh,
    GuessModel::Swart,
];

fn h2() -> Geometry {
    Geometry::new(
        vec!["H".to_string(), "H".to_string()],
        vec![0.0, 0.0, 0.0, 1.4, 0.0, 0.0],
    )
}

fn twisted_chain() -> Geometry {
    Geometry::new(
        vec![
            "H".to_string(),
            "C".to_string(),
            "C".to_string(),
            "H".to_string(),
        ],
        vec![
            0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 2.8, 0.0, 0.0, 2.8, 0.0, 2.0,
        ],
    )
}

#[test]
fn test_models_tolerate_missing_coordinate_kinds() {
    // A diatomic has no bends and no dihedrals; every model must still
    // return its 1 x 1 diagonal without complaint.
    let geom = h2();
    let coords = RedundantCoords::new(&geom).unwrap();
    for model in ALL_MODELS {
        let h = guess_hessian(&geom, &coords, model).unwrap();
        assert_eq!((h.nrows(), h.ncols()), (1, 1));
        assert!(h[(0, 0)] > 0.0);
    }
}

#[test]
fn test_diagonal_matches_primitive_order() {
    let geom = twisted_chain();
    let coords = RedundantCoords::new(&geom).unwrap();
    let h = guess_hessian(&geom, &coords, GuessModel::Simple).unwrap();
    for (m, prim) in coords.primitives().iter().enumerate() {
        let expected = match prim {
            Primitive::Bond { .. } => 0.5,
            Primitive::Bend { .. } => 0.2,
            Primitive::Dihedral { .. } => 0.1,
        };
        assert_eq!(h[(m, m)], expected);
    }
}

#[test]
fn test_matrices_are_diagonal_and_positive() {
    let geom = twisted_chain();
    let coords = RedundantCoords::new(&geom).unwrap();
    for model in ALL_MODELS {
        let h = guess_hessian(&geom, &coords, model).unwrap();
        assert_eq!(h.nrows(), coords.len());
        assert_eq!(h.ncols(), coords.len());
        for r in 0..h.nrows() {
            for c in 0..h.ncols() {
                if r == c {
                    assert!(h[(r, c)] > 0.0, "{:?} diagonal {} not positive", model, r);
                } else {
                    assert_eq!(h[(r, c)], 0.0, "{:?} off-diagonal ({}, {})", model, r, c);
                }
            }
        }
    }
}

#[test]
fn test_fischer_torsion_counts_peripheral_bonds() {
    // Each chain carbon carries one hydrogen besides the central bond, so
    // the torsion bond count is 2 and the 14 * b^0.57 / ... term is live.
    let geom = twisted_chain();
    let coords = RedundantCoords::new(&geom).unwrap();
    let h = guess_hessian(&geom, &coords, GuessModel::Fischer).unwrap();

    let m = coords
        .primitives()
        .iter()
        .position(|p| matches!(p, Primitive::Dihedral { .. }))
        .unwrap();
    // The floor of the formula is 0.0015; a bonded environment must add to it.
    assert!(h[(m, m)] > 0.0015);
}

#[test]
fn test_stretched_bond_softens_distance_models() {
    // Moving atoms apart must lower the distance-dependent force constants
    // while leaving the simple model untouched.
    let geom = h2();
    let stretched = Geometry::new(
        geom.elements.clone(),
        vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0],
    );
    let coords = RedundantCoords::new(&geom).unwrap();

    for model in [GuessModel::Fischer, GuessModel::Lindh, GuessModel::Swart] {
        let h_eq = guess_hessian(&geom, &coords, model).unwrap();
        let h_far = guess_hessian(&stretched, &coords, model).unwrap();
        assert!(
            h_far[(0, 0)] < h_eq[(0, 0)],
            "{:?}: {} not softer than {}",
            model,
            h_far[(0, 0)],
            h_eq[(0, 0)]
        );
    }

    let h_eq = guess_hessian(&geom, &coords, GuessModel::Simple).unwrap();
    let h_far = guess_hessian(&stretched, &coords, GuessModel::Simple).unwrap();
    assert_eq!(h_eq[(0, 0)], h_far[(0, 0)]);
}

#[test]
fn test_repeated_calls_are_bit_identical() {
    let geom = twisted_chain();
    let coords = RedundantCoords::new(&geom).unwrap();
    for model in ALL_MODELS {
        let first = guess_hessian(&geom, &coords, model).unwrap();
        let second = guess_hessian(&geom, &coords, model).unwrap();
        assert_eq!(first, second);
    }
}
