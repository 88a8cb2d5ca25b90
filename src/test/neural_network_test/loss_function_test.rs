use super::*;

#[test]
fn test_sparse_categorical_cross_entropy_loss() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[0.9_f32, 0.1], [0.2, 0.8]].into_dyn();
    let labels = array![0, 1];

    let loss = loss_fn.compute_loss(&labels, &probs).unwrap();
    // -(ln 0.9 + ln 0.8) / 2
    assert_relative_eq!(loss, 0.164252, epsilon = 1e-5);
}

#[test]
fn test_loss_clamps_zero_probability() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[1.0_f32, 0.0]].into_dyn();

    let loss = loss_fn.compute_loss(&array![1], &probs).unwrap();
    assert!(loss.is_finite());
    assert_relative_eq!(loss, -(1e-7_f32).ln(), epsilon = 1e-3);

    let perfect = loss_fn.compute_loss(&array![0], &probs).unwrap();
    assert!(perfect >= 0.0);
}

#[test]
fn test_loss_rejects_nan_predictions() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[f32::NAN, 0.5]].into_dyn();

    let err = loss_fn.compute_loss(&array![0], &probs).unwrap_err();
    assert!(err.is_numeric());
}

#[test]
fn test_loss_shape_errors() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[0.5_f32, 0.5], [0.5, 0.5]].into_dyn();

    // batch size mismatch
    assert!(matches!(
        loss_fn.compute_loss(&array![0], &probs),
        Err(ModelError::ShapeError(_))
    ));
    // label out of range
    assert!(matches!(
        loss_fn.compute_loss(&array![0, 2], &probs),
        Err(ModelError::ShapeError(_))
    ));
    // not a 2D tensor
    assert!(matches!(
        loss_fn.compute_loss(&array![0, 1], &array![0.5_f32, 0.5].into_dyn()),
        Err(ModelError::ShapeError(_))
    ));
}

#[test]
fn test_probability_gradient() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[0.5_f32, 0.5], [0.25, 0.75]].into_dyn();

    let grad = loss_fn.compute_grad(&array![1, 0], &probs).unwrap();
    // -1 / (p * batch_size) at the label, zero elsewhere
    assert_relative_eq!(grad[[0, 0]], 0.0);
    assert_relative_eq!(grad[[0, 1]], -1.0, epsilon = 1e-6);
    assert_relative_eq!(grad[[1, 0]], -2.0, epsilon = 1e-6);
    assert_relative_eq!(grad[[1, 1]], 0.0);
}

#[test]
fn test_softmax_logits_gradient() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let probs = array![[0.7_f32, 0.3], [0.4, 0.6]].into_dyn();

    let grad = loss_fn
        .softmax_logits_grad(&array![0, 0], &probs)
        .unwrap()
        .unwrap();
    let expected = array![[-0.15_f32, 0.15], [-0.3, 0.3]].into_dyn();
    for (g, e) in grad.iter().zip(expected.iter()) {
        assert_relative_eq!(g, e, epsilon = 1e-6);
    }
}

#[test]
fn test_fused_gradient_matches_chain_rule() {
    let loss_fn = SparseCategoricalCrossEntropy::new();
    let a = array![[0.7_f32, 0.2, 0.1]];
    let labels = array![1];

    let upstream = loss_fn
        .compute_grad(&labels, &a.clone().into_dyn())
        .unwrap()
        .into_dimensionality::<Ix2>()
        .unwrap();
    let chained = Activation::softmax_backward(&a, &upstream);
    let fused = loss_fn
        .softmax_logits_grad(&labels, &a.into_dyn())
        .unwrap()
        .unwrap();

    for (c, f) in chained.iter().zip(fused.iter()) {
        assert_relative_eq!(c, f, epsilon = 1e-5);
    }
}

#[test]
fn test_cross_entropy_expects_probabilities() {
    assert!(SparseCategoricalCrossEntropy::new().expects_probabilities());
}
