mod common;

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};

use calval_core::resample::{linspace, GridInterpolator};
use calval_core::{
    resample_correction_layer, resample_to_shape, CalvalError, CorrectionGrid,
    InterpolationMethod,
};

use common::field_on_mesh;

const ALL_METHODS: [InterpolationMethod; 3] = [
    InterpolationMethod::Nearest,
    InterpolationMethod::Linear,
    InterpolationMethod::Cubic,
];

fn grid(x: &[f64], y: &[f64], f: impl Fn(f64, f64) -> f64) -> CorrectionGrid {
    CorrectionGrid::new(
        Array1::from(x.to_vec()),
        Array1::from(y.to_vec()),
        field_on_mesh(x, y, f),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Shape and orientation
// ---------------------------------------------------------------------------

#[test]
fn test_output_has_requested_shape() {
    let g = grid(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 10.0, 20.0, 30.0], |x, y| x + y);
    for method in ALL_METHODS {
        let out = resample_to_shape(&g, (7, 9), method).unwrap();
        assert_eq!(out.dim(), (7, 9), "{method}");
    }
}

#[test]
fn test_constant_layer_round_trip() {
    let g = grid(&[0.0, 0.5, 1.5, 3.0], &[100.0, 90.0, 80.0], |_, _| 2.5);
    for method in ALL_METHODS {
        let out = resample_to_shape(&g, (11, 13), method).unwrap();
        for v in out.iter() {
            assert_abs_diff_eq!(*v, 2.5, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_row_zero_holds_maximum_y() {
    let g = grid(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], |_, y| y);
    for method in ALL_METHODS {
        let out = resample_to_shape(&g, (3, 4), method).unwrap();
        for c in 0..4 {
            assert_abs_diff_eq!(out[[0, c]], 2.0, epsilon = 1e-12);
            assert_abs_diff_eq!(out[[2, c]], 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_same_shape_resample_flips_ascending_layer() {
    let x = [0.0, 1.0, 2.0];
    let y = [0.0, 1.0, 2.0, 3.0];
    let data = field_on_mesh(&x, &y, |x, y| 3.0 * x - y * y);
    let out =
        resample_correction_layer(&x, &y, data.view(), InterpolationMethod::Linear).unwrap();
    let rows = y.len();
    for r in 0..rows {
        for c in 0..x.len() {
            assert_abs_diff_eq!(out[[r, c]], data[[rows - 1 - r, c]], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_descending_y_matches_ascending() {
    let x = [0.0, 1.0, 2.0, 3.0];
    let f = |x: f64, y: f64| (0.3 * x).sin() + 0.2 * y * x;
    let up = grid(&x, &[0.0, 1.0, 2.0, 3.0, 4.0], f);
    let down = grid(&x, &[4.0, 3.0, 2.0, 1.0, 0.0], f);
    for method in ALL_METHODS {
        let a = resample_to_shape(&up, (9, 7), method).unwrap();
        let b = resample_to_shape(&down, (9, 7), method).unwrap();
        for (va, vb) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*va, *vb, epsilon = 1e-12);
        }
    }
}

// ---------------------------------------------------------------------------
// Interpolation accuracy
// ---------------------------------------------------------------------------

#[test]
fn test_linear_and_cubic_exact_on_linear_field() {
    let f = |x: f64, y: f64| 2.0 * x - 3.0 * y + 1.0;
    let x = [0.0, 1.0, 2.5, 4.0];
    let y = [-2.0, -1.0, 0.5, 2.0, 3.0];
    let g = grid(&x, &y, f);
    let (rows, cols) = (8, 6);
    let xx = linspace(0.0, 4.0, cols);
    let yy = linspace(-2.0, 3.0, rows);
    for method in [InterpolationMethod::Linear, InterpolationMethod::Cubic] {
        let out = resample_to_shape(&g, (rows, cols), method).unwrap();
        for r in 0..rows {
            for c in 0..cols {
                let expected = f(xx[c], yy[rows - 1 - r]);
                assert_abs_diff_eq!(out[[r, c]], expected, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn test_cubic_tracks_smooth_field_closer_than_linear() {
    let f = |x: f64, y: f64| (0.8 * x).sin() * (0.5 * y).cos();
    let nodes: Vec<f64> = (0..9).map(|k| k as f64 * 0.5).collect();
    let g = grid(&nodes, &nodes, f);
    let linear = GridInterpolator::new(&g, InterpolationMethod::Linear).unwrap();
    let cubic = GridInterpolator::new(&g, InterpolationMethod::Cubic).unwrap();

    let mut err_linear = 0.0f64;
    let mut err_cubic = 0.0f64;
    for i in 0..20 {
        for j in 0..20 {
            let (px, py) = (0.5 + 0.15 * i as f64, 0.5 + 0.15 * j as f64);
            err_linear = err_linear.max((linear.sample(px, py) - f(px, py)).abs());
            err_cubic = err_cubic.max((cubic.sample(px, py) - f(px, py)).abs());
        }
    }
    assert!(err_cubic < err_linear, "cubic {err_cubic} vs linear {err_linear}");
}

#[test]
fn test_nearest_picks_closest_node() {
    let g = grid(&[0.0, 1.0, 2.0], &[0.0, 1.0], |x, y| 10.0 * y + x);
    let nearest = GridInterpolator::new(&g, InterpolationMethod::Nearest).unwrap();
    assert_eq!(nearest.sample(0.4, 0.2), 0.0);
    assert_eq!(nearest.sample(1.6, 0.9), 12.0);
    // Defined outside the mesh as well.
    assert_eq!(nearest.sample(-5.0, 7.0), 10.0);
    assert_eq!(nearest.sample(9.0, -3.0), 2.0);
}

#[test]
fn test_linear_and_cubic_nan_outside_hull() {
    let g = grid(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], |x, y| x * y);
    for method in [InterpolationMethod::Linear, InterpolationMethod::Cubic] {
        let interp = GridInterpolator::new(&g, method).unwrap();
        assert!(interp.sample(-0.1, 1.0).is_nan(), "{method}");
        assert!(interp.sample(1.0, 2.5).is_nan(), "{method}");
        assert!(interp.sample(1.0, 1.0).is_finite(), "{method}");
        assert_abs_diff_eq!(interp.sample(2.0, 2.0), 4.0, epsilon = 1e-12);
    }
}

#[test]
fn test_nearest_never_nan_in_resampled_output() {
    let g = grid(&[0.0, 3.0, 7.0], &[5.0, 2.0, 1.0, 0.0], |x, y| x - y);
    let out = resample_to_shape(&g, (10, 10), InterpolationMethod::Nearest).unwrap();
    assert!(out.iter().all(|v| v.is_finite()));
}

#[test]
fn test_large_output_parallel_path() {
    let g = grid(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], |x, y| x + 2.0 * y);
    let out = resample_to_shape(&g, (300, 300), InterpolationMethod::Linear).unwrap();
    assert_abs_diff_eq!(out[[0, 0]], 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(out[[299, 299]], 2.0, epsilon = 1e-12);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_single_row_rejected_for_triangulating_methods() {
    let g = grid(&[0.0, 1.0, 2.0, 3.0], &[5.0], |x, _| x);
    for method in [InterpolationMethod::Linear, InterpolationMethod::Cubic] {
        match resample_to_shape(&g, (4, 4), method) {
            Err(CalvalError::InsufficientData { method: name, required, available }) => {
                assert_eq!(name, method.name());
                assert_eq!(required, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    let out = resample_to_shape(&g, (2, 4), InterpolationMethod::Nearest).unwrap();
    assert_abs_diff_eq!(out[[1, 3]], 3.0, epsilon = 1e-12);
}

#[test]
fn test_non_monotonic_axis_rejected() {
    let data = Array2::<f64>::zeros((3, 3));
    assert!(matches!(
        resample_correction_layer(
            &[0.0, 2.0, 1.0],
            &[0.0, 1.0, 2.0],
            data.view(),
            InterpolationMethod::Linear
        ),
        Err(CalvalError::NonMonotonicAxis("x"))
    ));
}

#[test]
fn test_coordinate_length_mismatch_rejected() {
    let data = Array2::<f64>::zeros((3, 4));
    assert!(matches!(
        resample_correction_layer(
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 1.0],
            data.view(),
            InterpolationMethod::Cubic
        ),
        Err(CalvalError::AxisLengthMismatch { axis: "y", expected: 3, actual: 2 })
    ));
}

#[test]
fn test_empty_target_shape_rejected() {
    let g = grid(&[0.0, 1.0], &[0.0, 1.0], |x, y| x + y);
    assert!(matches!(
        resample_to_shape(&g, (0, 5), InterpolationMethod::Linear),
        Err(CalvalError::InvalidShape(_))
    ));
}

#[test]
fn test_method_names_parse() {
    assert_eq!(
        "Cubic".parse::<InterpolationMethod>().unwrap(),
        InterpolationMethod::Cubic
    );
    assert!(matches!(
        "spline".parse::<InterpolationMethod>(),
        Err(CalvalError::UnknownMethod(_))
    ));
}
