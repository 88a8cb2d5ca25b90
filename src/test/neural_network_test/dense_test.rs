use super::*;

#[test]
fn test_dense_forward_pass_dimensions() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut dense = Dense::new(4, 3, Activation::ReLU, &mut rng).unwrap();
    let input = Array::ones((2, 4)).into_dyn(); // batch_size=2, input_dim=4

    let output = dense.forward(&input).unwrap();
    assert_eq!(output.shape(), &[2, 3]);
}

#[test]
fn test_dense_forward_values() {
    let dense = dense_from(
        array![[1.0, 2.0], [3.0, 4.0]],
        array![[0.5, -0.5]],
        Activation::Linear,
    );
    let x = array![[1.0_f32, 1.0], [0.0, -1.0]].into_dyn();

    let y = dense.predict(&x).unwrap();
    assert_eq!(y, array![[4.5, 5.5], [-2.5, -4.5]].into_dyn());
}

#[test]
fn test_dense_backward_gradients() {
    let mut dense = dense_from(array![[1.0], [1.0]], array![[0.0]], Activation::Linear);
    let x = array![[1.0_f32, 2.0]].into_dyn();

    dense.forward(&x).unwrap();
    let grad_input = dense.backward(&array![[1.0_f32]].into_dyn()).unwrap();

    assert_eq!(grad_input, array![[1.0, 1.0]].into_dyn());
    assert_eq!(dense.get_grad_weights().unwrap(), &array![[1.0], [2.0]]);
    assert_eq!(dense.get_grad_bias().unwrap(), &array![[1.0]]);
}

#[test]
fn test_dense_relu_backward_masks_inactive_units() {
    let mut dense = dense_from(
        array![[1.0, -1.0]],
        array![[0.0, 0.0]],
        Activation::ReLU,
    );
    dense.forward(&array![[2.0_f32]].into_dyn()).unwrap();

    let grad_input = dense.backward(&array![[1.0_f32, 1.0]].into_dyn()).unwrap();

    // second unit is inactive, only the first contributes
    assert_eq!(grad_input, array![[1.0]].into_dyn());
    assert_eq!(dense.get_grad_weights().unwrap(), &array![[2.0, 0.0]]);
}

#[test]
fn test_dense_backward_before_forward() {
    let mut dense = dense_from(array![[1.0]], array![[0.0]], Activation::Linear);
    let result = dense.backward(&array![[1.0_f32]].into_dyn());
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}

#[test]
fn test_dense_predict_does_not_cache() {
    let mut dense = dense_from(array![[1.0]], array![[0.0]], Activation::Linear);
    dense.predict(&array![[1.0_f32]].into_dyn()).unwrap();
    let result = dense.backward(&array![[1.0_f32]].into_dyn());
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}

#[test]
fn test_dense_rejects_wrong_input() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut dense = Dense::new(4, 2, Activation::Linear, &mut rng).unwrap();

    let wrong_features = Array::ones((3, 5)).into_dyn();
    assert!(matches!(
        dense.forward(&wrong_features),
        Err(ModelError::ShapeError(_))
    ));

    let wrong_rank = Array::ones((3, 2, 2)).into_dyn();
    assert!(matches!(
        dense.predict(&wrong_rank),
        Err(ModelError::ShapeError(_))
    ));
}

#[test]
fn test_dense_wrong_gradient_shape() {
    let mut dense = dense_from(array![[1.0, 1.0]], array![[0.0, 0.0]], Activation::Linear);
    dense.forward(&array![[1.0_f32], [2.0]].into_dyn()).unwrap();
    let result = dense.backward(&array![[1.0_f32, 1.0]].into_dyn());
    assert!(matches!(result, Err(ModelError::ShapeError(_))));
}

#[test]
fn test_dense_constructor_validation() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        Dense::new(0, 3, Activation::ReLU, &mut rng),
        Err(ModelError::ConfigError(_))
    ));
    assert!(matches!(
        Dense::with_initializer(
            2,
            2,
            Activation::ReLU,
            Initializer::Uniform {
                low: 1.0,
                high: -1.0
            },
            &mut rng
        ),
        Err(ModelError::ConfigError(_))
    ));
    assert!(matches!(
        Dense::from_parameters(Array2::zeros((3, 2)), Array2::zeros((1, 3)), Activation::Linear),
        Err(ModelError::ShapeError(_))
    ));
}

#[test]
fn test_dense_glorot_initialisation() {
    let mut rng = StdRng::seed_from_u64(42);
    let dense = Dense::new(4, 3, Activation::ReLU, &mut rng).unwrap();
    let limit = (6.0_f32 / 7.0).sqrt();

    assert!(dense.get_kernel().iter().all(|w| w.abs() <= limit));
    assert!(dense.get_bias().iter().all(|&b| b == 0.0));
    assert_eq!(dense.param_count(), TrainingParameters::Trainable(15));
}

#[test]
fn test_dense_same_seed_same_weights() {
    let mut rng_a = StdRng::seed_from_u64(7);
    let mut rng_b = StdRng::seed_from_u64(7);
    let a = Dense::new(8, 4, Activation::ReLU, &mut rng_a).unwrap();
    let b = Dense::new(8, 4, Activation::ReLU, &mut rng_b).unwrap();
    assert_eq!(a.get_kernel(), b.get_kernel());
}

#[test]
fn test_dense_zero_initializer() {
    let mut rng = StdRng::seed_from_u64(1);
    let dense =
        Dense::with_initializer(3, 2, Activation::Softmax, Initializer::Zeros, &mut rng).unwrap();
    assert!(dense.get_kernel().iter().all(|&w| w == 0.0));
}

#[test]
fn test_dense_parameters_order() {
    let mut dense = dense_from(array![[1.0, 2.0]], array![[3.0, 4.0]], Activation::Linear);
    let params = dense.parameters();

    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "kernel");
    assert_eq!(params[1].name, "bias");
    assert!(params.iter().all(|p| p.grad.is_none()));
}

#[test]
fn test_dense_backward_from_logits_requires_softmax() {
    let mut dense = dense_from(array![[1.0]], array![[0.0]], Activation::ReLU);
    dense.forward(&array![[1.0_f32]].into_dyn()).unwrap();
    let result = dense.backward_from_logits(&array![[1.0_f32]].into_dyn());
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}
