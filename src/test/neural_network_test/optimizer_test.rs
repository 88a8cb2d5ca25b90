use super::*;

const KEY: ParameterKey = ParameterKey { layer: 0, slot: 0 };

#[test]
fn test_sgd_update() {
    let mut sgd = SGD::new();
    let mut w = array![[1.0_f32, -1.0], [0.5, 2.0]];
    let g = array![[0.2_f32, -0.4], [0.0, 1.0]];

    sgd.update(KEY, &mut w, &g, 0.5).unwrap();

    let expected = array![[0.9_f32, -0.8], [0.5, 1.5]];
    for (a, e) in w.iter().zip(expected.iter()) {
        assert_relative_eq!(a, e, epsilon = 1e-6);
    }
}

#[test]
fn test_sgd_large_parameter() {
    // above the parallel threshold
    let mut sgd = SGD::new();
    let mut w = Array2::from_elem((64, 64), 1.0_f32);
    let g = Array2::from_elem((64, 64), 2.0_f32);

    sgd.update(KEY, &mut w, &g, 0.25).unwrap();
    assert!(w.iter().all(|&v| v == 0.5));
}

#[test]
fn test_sgd_dimension_mismatch() {
    let mut sgd = SGD::new();
    let mut w = Array2::<f32>::zeros((2, 3));
    let g = Array2::<f32>::zeros((3, 2));

    let result = sgd.update(KEY, &mut w, &g, 0.1);
    assert!(matches!(result, Err(ModelError::DimensionError(_))));
    assert!(w.iter().all(|&v| v == 0.0));
}

#[test]
fn test_sgd_momentum() {
    let mut sgd = SGD::with_momentum(0.5).unwrap();
    let mut w = array![[0.0_f32]];
    let g = array![[1.0_f32]];

    sgd.update(KEY, &mut w, &g, 1.0).unwrap();
    assert_relative_eq!(w[[0, 0]], -1.0);

    // v = 0.5 * -1 - 1 = -1.5
    sgd.update(KEY, &mut w, &g, 1.0).unwrap();
    assert_relative_eq!(w[[0, 0]], -2.5);
}

#[test]
fn test_sgd_momentum_state_is_per_parameter() {
    let mut sgd = SGD::with_momentum(0.9).unwrap();
    let mut a = array![[0.0_f32]];
    let mut b = array![[0.0_f32]];
    let g = array![[1.0_f32]];

    sgd.update(ParameterKey::new(0, 0), &mut a, &g, 1.0).unwrap();
    sgd.update(ParameterKey::new(0, 0), &mut a, &g, 1.0).unwrap();
    sgd.update(ParameterKey::new(1, 0), &mut b, &g, 1.0).unwrap();

    // b starts with a fresh velocity
    assert_relative_eq!(b[[0, 0]], -1.0);
    assert_relative_eq!(a[[0, 0]], -2.9, epsilon = 1e-6);
}

#[test]
fn test_sgd_invalid_momentum() {
    assert!(matches!(SGD::with_momentum(1.0), Err(ModelError::ConfigError(_))));
    assert!(matches!(SGD::with_momentum(-0.1), Err(ModelError::ConfigError(_))));
    assert_eq!(SGD::with_momentum(0.9).unwrap().get_momentum(), 0.9);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::default();
    let mut w = array![[1.0_f32, -1.0]];
    let g = array![[0.5_f32, -2.0]];

    adam.update(KEY, &mut w, &g, 0.1).unwrap();

    // bias-corrected moments make the first step lr * sign(g)
    assert_relative_eq!(w[[0, 0]], 0.9, epsilon = 1e-4);
    assert_relative_eq!(w[[0, 1]], -0.9, epsilon = 1e-4);

    let state = adam.get_state(KEY).unwrap();
    assert_eq!(state.t, 1);
    assert_relative_eq!(state.m[[0, 0]], 0.05, epsilon = 1e-6);
}

#[test]
fn test_adam_keeps_separate_state() {
    let mut adam = Adam::new(0.9, 0.999, 1e-8).unwrap();
    let mut w = array![[0.0_f32]];
    let mut b = array![[0.0_f32]];
    let g = array![[1.0_f32]];

    adam.update(ParameterKey::new(0, 0), &mut w, &g, 0.01).unwrap();
    adam.update(ParameterKey::new(0, 0), &mut w, &g, 0.01).unwrap();
    adam.update(ParameterKey::new(0, 1), &mut b, &g, 0.01).unwrap();

    assert_eq!(adam.get_state(ParameterKey::new(0, 0)).unwrap().t, 2);
    assert_eq!(adam.get_state(ParameterKey::new(0, 1)).unwrap().t, 1);
    assert!(adam.get_state(ParameterKey::new(1, 0)).is_none());
}

#[test]
fn test_adam_invalid_parameters() {
    assert!(Adam::new(0.9, 0.999, 1e-8).is_ok());
    assert!(matches!(Adam::new(1.1, 0.999, 1e-8), Err(ModelError::ConfigError(_))));
    assert!(matches!(Adam::new(0.9, -0.1, 1e-8), Err(ModelError::ConfigError(_))));
    assert!(matches!(Adam::new(0.9, 0.999, 0.0), Err(ModelError::ConfigError(_))));
}

#[test]
fn test_rmsprop_first_step() {
    let mut rmsprop = RMSprop::new(0.9, 1e-8).unwrap();
    let mut w = array![[1.0_f32]];
    let g = array![[1.0_f32]];

    rmsprop.update(KEY, &mut w, &g, 0.1).unwrap();

    // cache = 0.1, step = 0.1 / sqrt(0.1)
    assert_relative_eq!(w[[0, 0]], 1.0 - 0.316_227_8, epsilon = 1e-5);
    assert!(RMSprop::new(1.0, 1e-8).is_err());
}

#[test]
fn test_ada_grad_first_step() {
    let mut ada_grad = AdaGrad::new(1e-8).unwrap();
    let mut w = array![[1.0_f32]];
    let g = array![[2.0_f32]];

    ada_grad.update(KEY, &mut w, &g, 0.5).unwrap();
    assert_relative_eq!(w[[0, 0]], 0.5, epsilon = 1e-6);

    // accumulated squares shrink the next step: 0.5 * 2 / sqrt(8)
    ada_grad.update(KEY, &mut w, &g, 0.5).unwrap();
    assert_relative_eq!(w[[0, 0]], 0.5 - 0.353_553_4, epsilon = 1e-5);
    assert!(AdaGrad::new(-1.0).is_err());
}

#[test]
fn test_optimizer_names() {
    assert_eq!(SGD::new().name(), "SGD");
    assert_eq!(Adam::default().name(), "Adam");
    assert_eq!(RMSprop::new(0.9, 1e-7).unwrap().name(), "RMSprop");
    assert_eq!(AdaGrad::new(1e-7).unwrap().name(), "AdaGrad");
}
