use super::*;

#[test]
fn test_flatten_forward_and_backward() {
    let mut flatten = Flatten::new(vec![2, 3]).unwrap();
    let x = Array::from_shape_fn((4, 2, 3), |(b, i, j)| (b * 6 + i * 3 + j) as f32).into_dyn();

    let out = flatten.forward(&x).unwrap();
    assert_eq!(out.shape(), &[4, 6]);
    // row-major order within each sample
    assert_eq!(out[[1, 0]], 6.0);
    assert_eq!(out[[1, 5]], 11.0);

    let grad = flatten.backward(&out).unwrap();
    assert_eq!(grad.shape(), &[4, 2, 3]);
    assert_eq!(grad, x);
}

#[test]
fn test_flatten_output_shape() {
    let flatten = Flatten::new(vec![28, 28]).unwrap();
    assert_eq!(flatten.output_shape(), vec![784]);
    assert_eq!(flatten.input_shape(), &[28, 28]);
    assert_eq!(flatten.param_count(), TrainingParameters::NoTrainable);
    assert!(matches!(flatten.get_weights(), LayerWeight::Empty));
}

#[test]
fn test_flatten_rejects_wrong_shape() {
    let mut flatten = Flatten::new(vec![2, 2]).unwrap();
    let x = Array::zeros((3, 2, 3)).into_dyn();
    assert!(matches!(flatten.forward(&x), Err(ModelError::ShapeError(_))));
}

#[test]
fn test_flatten_invalid_construction() {
    assert!(Flatten::new(vec![]).is_err());
    assert!(Flatten::new(vec![3, 0]).is_err());
}

#[test]
fn test_flatten_backward_before_forward() {
    let mut flatten = Flatten::new(vec![2]).unwrap();
    let result = flatten.backward(&Array::zeros((1, 2)).into_dyn());
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}
