use mea_core::errors::MeaError;
use mea_moments::{
    derive_central_moment_odes, derive_central_with, derive_mean_odes, models, Counter, DeriveOpts,
    ModelConfig, Moment, MomentSystem, MultiIndex,
};
use mea_sym::{parse_expr, ExprMatrix, Symbol};

fn species() -> Vec<Symbol> {
    vec![Symbol::new("y_0")]
}

#[test]
fn stoichiometry_shape_is_checked_first() {
    let central = Counter::central(1, 2);
    let raw = Counter::raw(&species(), 2);
    let err = derive_central_moment_odes(
        &central,
        &raw,
        &ExprMatrix::zeros(1, 2),
        &species(),
        &[parse_expr("k_0").unwrap()],
        &[vec![1, 0]],
    )
    .unwrap_err();
    assert!(matches!(err, MeaError::Shape(_)));
    assert_eq!(err.info().code, "stoichiometry-cols");
}

#[test]
fn first_order_central_moments_are_rejected() {
    let network = models::birth().unwrap();
    let central = Counter::from_moments(
        1,
        vec![
            Moment::new(MultiIndex::new(vec![0]), "yx0"),
            Moment::new(MultiIndex::new(vec![1]), "yx1"),
        ],
    )
    .unwrap();
    let raw = Counter::raw(network.species(), 2);
    let means = derive_mean_odes(&network, &central).unwrap();
    let err = derive_central_with(&central, &raw, &means, &network, &DeriveOpts::default())
        .unwrap_err();
    assert!(matches!(err, MeaError::DegenerateMoment(_)));
    assert_eq!(err.info().context["central"], "[1]");
}

#[test]
fn missing_raw_moments_name_the_sub_index() {
    let network = models::birth().unwrap();
    let central = Counter::central(1, 3);
    let raw = Counter::raw(network.species(), 2);
    let means = derive_mean_odes(&network, &central).unwrap();
    let err = derive_central_with(&central, &raw, &means, &network, &DeriveOpts::default())
        .unwrap_err();
    assert!(matches!(err, MeaError::Configuration(_)));
    assert_eq!(err.info().code, "missing-raw-moment");
    assert_eq!(err.info().context["central"], "[3]");
    assert_eq!(err.info().context["sub_index"], "[3]");
}

#[test]
fn mean_matrix_shape_is_checked() {
    let network = models::birth().unwrap();
    let central = Counter::central(1, 2);
    let raw = Counter::raw(network.species(), 2);
    let err = derive_central_with(
        &central,
        &raw,
        &ExprMatrix::zeros(2, 2),
        &network,
        &DeriveOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "raw-derivative-rows");
    let err = derive_central_with(
        &central,
        &raw,
        &ExprMatrix::zeros(1, 3),
        &network,
        &DeriveOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "raw-derivative-cols");
}

#[test]
fn order_guard_limits_derivations() {
    let network = models::birth().unwrap();
    let opts = DeriveOpts {
        max_order_guard: 2,
        ..DeriveOpts::default()
    };
    let err = MomentSystem::build(&network, 3, &opts).unwrap_err();
    assert_eq!(err.info().code, "order-guard");
    let err = MomentSystem::build(&network, 0, &DeriveOpts::default()).unwrap_err();
    assert_eq!(err.info().code, "max-order");
}

#[test]
fn central_symbols_in_propensities_break_closure() {
    let config = ModelConfig {
        name: None,
        description: None,
        species: vec!["y_0".into()],
        propensities: vec!["k_0*yx1".into()],
        stoichiometry: vec![vec![1]],
    };
    let network = config.to_network().unwrap();
    let err = MomentSystem::build(&network, 2, &DeriveOpts::default()).unwrap_err();
    assert!(matches!(err, MeaError::Symbolic(_)));
    assert_eq!(err.info().code, "closure-violated");
    assert_eq!(err.info().context["symbol"], "yx1");

    let unchecked = DeriveOpts {
        validate_closure: false,
        ..DeriveOpts::default()
    };
    assert!(MomentSystem::build(&network, 2, &unchecked).is_ok());
}

#[test]
fn model_files_report_the_failing_reaction() {
    let config = ModelConfig {
        name: Some("broken".into()),
        description: None,
        species: vec!["y_0".into(), "y_0".into()],
        propensities: vec!["k_0".into(), "k_1*(y_0 + ".into()],
        stoichiometry: vec![vec![1, 0], vec![0, 1]],
    };
    let err = config.to_network().unwrap_err();
    assert!(matches!(err, MeaError::Parse(_)));
    assert_eq!(err.info().context["reaction"], "1");

    let duplicate = ModelConfig {
        propensities: vec!["k_0".into(), "k_1".into()],
        ..config
    };
    let err = duplicate.to_network().unwrap_err();
    assert_eq!(err.info().code, "duplicate-species");
}

#[test]
fn unknown_models_list_alternatives() {
    let err = models::builtin("lotka").unwrap_err();
    assert_eq!(err.info().code, "unknown-model");
    assert!(err.info().hint.as_deref().unwrap_or("").contains("p53"));
}

#[test]
fn counters_reject_mixed_dimensions_and_duplicates() {
    let err = Counter::from_moments(
        2,
        vec![
            Moment::new(MultiIndex::new(vec![0, 0]), "a"),
            Moment::new(MultiIndex::new(vec![1]), "b"),
        ],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "moment-dimension");
    let err = Counter::from_moments(
        1,
        vec![
            Moment::new(MultiIndex::new(vec![1]), "a"),
            Moment::new(MultiIndex::new(vec![1]), "b"),
        ],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "duplicate-moment");
}

#[test]
fn zero_denominators_in_propensities_are_reported() {
    let config = ModelConfig {
        name: None,
        description: None,
        species: vec!["y_0".into(), "y_1".into()],
        propensities: vec!["c_0/(y_0 - y_0)".into(), "c_1".into()],
        stoichiometry: vec![vec![1, 0], vec![0, 1]],
    };
    let network = config.to_network().unwrap();
    let err = MomentSystem::build(&network, 2, &DeriveOpts::default()).unwrap_err();
    assert!(matches!(err, MeaError::Symbolic(_)));
    assert_eq!(err.info().code, "division-by-zero");
    assert_eq!(err.info().context["species"], "y_0");
}

#[test]
fn zero_denominators_in_mean_rows_name_the_sub_term() {
    let network = models::birth().unwrap();
    let central = Counter::central(1, 2);
    let raw = Counter::raw(network.species(), 2);
    let means = ExprMatrix::parse_rows(vec![vec!["k_0/(y_0 - y_0)", "0"]]).unwrap();
    let err = derive_central_with(&central, &raw, &means, &network, &DeriveOpts::default())
        .unwrap_err();
    assert!(matches!(err, MeaError::Symbolic(_)));
    assert_eq!(err.info().code, "division-by-zero");
    assert_eq!(err.info().context["central"], "[2]");
    assert_eq!(err.info().context["sub_index"], "[0]");
}
