use super::*;

fn mlp(rng: &mut StdRng) -> Sequential {
    let mut model = Sequential::new();
    model
        .add(Flatten::new(vec![4, 4]).unwrap())
        .unwrap()
        .add(Dense::new(16, 8, Activation::ReLU, rng).unwrap())
        .unwrap()
        .add(Dense::new(8, 3, Activation::Softmax, rng).unwrap())
        .unwrap();
    model
}

#[test]
fn test_add_rejects_mismatched_dimension() {
    let mut model = Sequential::new();
    model.add(Flatten::new(vec![2, 2]).unwrap()).unwrap();

    let result = model.add(dense_from(
        Array2::zeros((3, 2)),
        Array2::zeros((1, 2)),
        Activation::Softmax,
    ));
    assert!(matches!(result, Err(ModelError::ShapeError(_))));
    assert_eq!(model.len(), 1);
}

#[test]
fn test_add_rejects_mismatched_rank() {
    let mut model = Sequential::new();
    model
        .add(dense_from(Array2::zeros((4, 2)), Array2::zeros((1, 2)), Activation::ReLU))
        .unwrap();

    let result = model.add(Flatten::new(vec![2, 1]).unwrap());
    assert!(matches!(result, Err(ModelError::ShapeError(_))));
}

#[test]
fn test_output_shape_independent_of_batch_size() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut model = mlp(&mut rng);

    for batch_size in [1, 5, 33] {
        let x = Array::zeros((batch_size, 4, 4)).into_dyn();
        assert_eq!(model.forward(&x).unwrap().shape(), &[batch_size, 3]);
        assert_eq!(model.predict(&x).unwrap().shape(), &[batch_size, 3]);
    }
}

#[test]
fn test_zero_initialised_network_is_uniform() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut model = Sequential::new();
    model
        .add(Flatten::new(vec![28, 28]).unwrap())
        .unwrap()
        .add(
            Dense::with_initializer(784, 10, Activation::Softmax, Initializer::Zeros, &mut rng)
                .unwrap(),
        )
        .unwrap();

    let x = Array::from_shape_fn((3, 28, 28), |(b, i, j)| ((b + i * j) % 7) as f32 / 7.0).into_dyn();
    let probabilities = model.predict(&x).unwrap();
    for &p in probabilities.iter() {
        assert_relative_eq!(p, 0.1, epsilon = 1e-6);
    }
}

#[test]
fn test_predict_rejects_wrong_sample_shape() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = mlp(&mut rng);
    let x = Array::zeros((2, 5, 4)).into_dyn();
    assert!(matches!(model.predict(&x), Err(ModelError::ShapeError(_))));
}

#[test]
fn test_predict_single_and_classes() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = mlp(&mut rng);
    let images = Array::from_shape_fn((4, 4, 4), |(b, i, j)| (b + i + j) as f32 / 10.0).into_dyn();

    let batch = model.predict(&images).unwrap();
    let classes = model.predict_classes(&images).unwrap();
    assert_eq!(classes.len(), 4);

    let single = model.predict_single(images.index_axis(Axis(0), 2)).unwrap();
    assert_eq!(single.len(), 3);
    for (s, b) in single.iter().zip(batch.index_axis(Axis(0), 2).iter()) {
        assert_relative_eq!(s, b, epsilon = 1e-6);
    }
    assert_relative_eq!(single.sum(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_empty_model() {
    let mut model = Sequential::new();
    assert!(model.is_empty());
    assert!(model.num_classes().is_none());
    let x = Array::zeros((1, 2)).into_dyn();
    assert!(matches!(model.forward(&x), Err(ModelError::ProcessingError(_))));
}

#[test]
fn test_apply_gradients_rejects_non_finite_gradient() {
    let mut model = Sequential::new();
    model
        .add(dense_from(array![[1.0, 0.0]], array![[0.0, 0.0]], Activation::Linear))
        .unwrap();

    model.forward(&array![[f32::NAN]].into_dyn()).unwrap();
    model.backward(&array![[1.0_f32, 1.0]].into_dyn()).unwrap();
    assert!(!model.gradients_finite());

    let mut sgd = SGD::new();
    let err = model.apply_gradients(&mut sgd, 0.1).unwrap_err();
    assert!(err.is_numeric());

    // nothing was updated
    match &model.get_weights()[0] {
        LayerWeight::Dense(weights) => {
            assert_eq!(weights.weight, &array![[1.0, 0.0]]);
            assert_eq!(weights.bias, &array![[0.0, 0.0]]);
        }
        LayerWeight::Empty => panic!("expected dense weights"),
    }
}

#[test]
fn test_apply_gradients_updates_every_layer() {
    let mut model = Sequential::new();
    model
        .add(dense_from(array![[1.0]], array![[0.0]], Activation::Linear))
        .unwrap()
        .add(dense_from(array![[2.0]], array![[0.0]], Activation::Linear))
        .unwrap();

    model.forward(&array![[1.0_f32]].into_dyn()).unwrap();
    model.backward(&array![[1.0_f32]].into_dyn()).unwrap();
    assert!(model.gradients_finite());

    let mut sgd = SGD::new();
    model.apply_gradients(&mut sgd, 0.5).unwrap();

    // layer 0: dW = x * W1 = 2, layer 1: dW = h = 1
    let weights = model.get_weights();
    match (&weights[0], &weights[1]) {
        (LayerWeight::Dense(first), LayerWeight::Dense(second)) => {
            assert_relative_eq!(first.weight[[0, 0]], 0.0);
            assert_relative_eq!(first.bias[[0, 0]], -1.0);
            assert_relative_eq!(second.weight[[0, 0]], 1.5);
            assert_relative_eq!(second.bias[[0, 0]], -0.5);
        }
        _ => panic!("expected dense weights"),
    }
}

#[test]
fn test_backward_from_logits_needs_softmax_output() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut model = Sequential::new();
    model
        .add(Dense::new(2, 2, Activation::ReLU, &mut rng).unwrap())
        .unwrap();

    model.forward(&array![[1.0_f32, 1.0]].into_dyn()).unwrap();
    let result = model.backward_from_logits(&array![[0.1_f32, -0.1]].into_dyn());
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}

#[test]
fn test_summary_and_param_count() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = mlp(&mut rng);

    assert_eq!(model.param_count(), (16 * 8 + 8 + 8 * 3 + 3, 0));
    assert_eq!(model.num_classes(), Some(3));
    assert_eq!(model.output_activation(), Some(Activation::Softmax));

    let summary = model.summary_string();
    println!("{}", summary);
    assert!(summary.contains("Layer (Flatten)"));
    assert!(summary.contains("Layer_2 (Dense)"));
    assert!(summary.contains("(None, 16)"));
    assert!(summary.contains("Total params: 163"));
}
