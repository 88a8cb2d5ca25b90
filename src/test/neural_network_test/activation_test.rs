use super::*;

#[test]
fn test_relu_forward() {
    let z = array![[-1.0_f32, 0.0, 2.5], [3.0, -0.5, 0.1]];
    let a = Activation::apply_activation(&z, &Activation::ReLU);
    assert_eq!(a, array![[0.0, 0.0, 2.5], [3.0, 0.0, 0.1]]);
}

#[test]
fn test_relu_keeps_nan() {
    let z = array![[f32::NAN, -1.0]];
    let a = Activation::apply_activation(&z, &Activation::ReLU);
    assert!(a[[0, 0]].is_nan());
    assert_eq!(a[[0, 1]], 0.0);
}

#[test]
fn test_relu_large_input_uses_same_rule() {
    // above the parallel threshold
    let z = Array2::from_shape_fn((200, 100), |(i, j)| i as f32 - j as f32);
    let a = Activation::apply_activation(&z, &Activation::ReLU);
    for ((i, j), &value) in a.indexed_iter() {
        assert_eq!(value, (i as f32 - j as f32).max(0.0));
    }
}

#[test]
fn test_linear_is_identity() {
    let z = array![[-1.0_f32, 2.0]];
    assert_eq!(Activation::apply_activation(&z, &Activation::Linear), z);
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let z = Array2::from_shape_fn((16, 5), |(i, j)| (i * j) as f32 * 0.3 - 2.0);
    let a = Activation::apply_activation(&z, &Activation::Softmax);
    for row in a.axis_iter(Axis(0)) {
        assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-6);
        assert!(row.iter().all(|&p| p > 0.0));
    }
}

#[test]
fn test_softmax_is_shift_invariant() {
    let z = array![[1000.0_f32, 1001.0], [0.0, 1.0]];
    let a = Activation::apply_activation(&z, &Activation::Softmax);
    assert_relative_eq!(a[[0, 0]], a[[1, 0]], epsilon = 1e-6);
    assert_relative_eq!(a[[0, 1]], 0.7310586, epsilon = 1e-6);
}

#[test]
fn test_relu_derivative() {
    let a = array![[0.0_f32, 2.0, 0.5]];
    let d = Activation::activation_derivative(&a, &Activation::ReLU);
    assert_eq!(d, array![[0.0, 1.0, 1.0]]);
}

#[test]
fn test_softmax_backward_of_constant_upstream_is_zero() {
    // softmax outputs always sum to one, so a uniform upstream gradient vanishes
    let a = array![[0.7_f32, 0.2, 0.1], [0.25, 0.25, 0.5]];
    let upstream = Array2::from_elem((2, 3), 3.0_f32);
    let grad = Activation::softmax_backward(&a, &upstream);
    for &g in grad.iter() {
        assert_relative_eq!(g, 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_activation_display() {
    assert_eq!(Activation::ReLU.to_string(), "relu");
    assert_eq!(Activation::Softmax.name(), "softmax");
    assert_eq!(format!("{}", Activation::Linear), "linear");
}
