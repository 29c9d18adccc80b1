use mea_moments::{
    derive_central_moment_odes, derive_mean_odes, models, Counter, Moment, MultiIndex,
};
use mea_sym::{parse_expr, EquivalenceOpts, Expr, ExprMatrix, Symbol};

fn counter(dim: usize, nvecs: &[[u32; 3]], prefix: &str) -> Counter {
    let moments = nvecs
        .iter()
        .enumerate()
        .map(|(idx, nvec)| Moment::new(MultiIndex::new(nvec.to_vec()), format!("{prefix}{idx}")))
        .collect();
    Counter::from_moments(dim, moments).unwrap()
}

fn central_counter() -> Counter {
    counter(
        3,
        &[[0, 0, 0], [0, 0, 2], [0, 1, 1], [0, 2, 0], [1, 0, 1], [1, 1, 0], [2, 0, 0]],
        "YU",
    )
}

fn raw_counter() -> Counter {
    counter(
        3,
        &[
            [0, 0, 0],
            [0, 0, 1],
            [0, 1, 0],
            [1, 0, 0],
            [0, 0, 2],
            [0, 1, 1],
            [0, 2, 0],
            [1, 0, 1],
            [1, 1, 0],
            [2, 0, 0],
        ],
        "y_",
    )
}

fn mean_matrix() -> ExprMatrix {
    ExprMatrix::parse_rows(vec![
        vec![
            "c_0 - c_1*y_0 - c_2*y_0*y_2/(c_6 + y_0)",
            "0",
            "0",
            "0",
            "c_2*y_0/(c_6 + y_0)**2 - c_2/(c_6 + y_0)",
            "0",
            "-c_2*y_0*y_2/(c_6 + y_0)**3 + c_2*y_2/(c_6 + y_0)**2",
        ],
        vec!["c_3*y_0 - c_4*y_1", "0", "0", "0", "0", "0", "0"],
        vec!["c_4*y_1 - c_5*y_2", "0", "0", "0", "0", "0", "0"],
    ])
    .unwrap()
}

fn expected() -> ExprMatrix {
    ExprMatrix::parse_rows(vec![
        vec![
            " 2*c_4*y_1*y_2 + c_4*y_1 - 2*c_5*y_2**2 + c_5*y_2 - 2*y_1*(c_4*y_1 - c_5*y_2)",
            "-2*c_5",
            "2*c_4",
            "0",
            "0",
            "0",
            "0",
        ],
        vec![
            "c_3*y_0*y_2 + c_4*y_1**2 - c_4*y_1*y_2 - c_4*y_1 - c_5*y_1*y_2 - y_1*(c_3*y_0 - c_4*y_1) - y_2*(c_4*y_1 - c_5*y_2)",
            "0",
            "-c_4 - c_5",
            "c_4",
            "c_3",
            "0",
            "0",
        ],
        vec![
            "2*c_3*y_0*y_1 + c_3*y_0 - 2*c_4*y_1**2 + c_4*y_1 - 2*y_2*(c_3*y_0 - c_4*y_1)",
            "0",
            "0",
            "-2*c_4",
            "0",
            "2*c_3",
            "0",
        ],
        vec![
            "c_0*y_2 - c_1*y_0*y_2 - c_2*y_0*y_2**2/(c_6 + y_0) + c_4*y_0*y_1 - c_5*y_0*y_2 - y_1*(c_0 - c_1*y_0 - c_2*y_0*y_2/(c_6 + y_0)) - y_3*(c_4*y_1 - c_5*y_2)",
            "-c_2*y_0/(c_6 + y_0)",
            "0",
            "0",
            "-c_1 + 2*c_2*y_0*y_2/(c_6 + y_0)**2 - 2*c_2*y_2/(c_6 + y_0) - c_5 - y_1*(c_2*y_0/(c_6 + y_0)**2 - c_2/(c_6 + y_0))",
            "c_4",
            "-c_2*y_0*y_2**2/(c_6 + y_0)**3 + c_2*y_2**2/(c_6 + y_0)**2 - y_1*(-c_2*y_0*y_2/(c_6 + y_0)**3 + c_2*y_2/(c_6 + y_0)**2)",
        ],
        vec![
            "c_0*y_1 - c_1*y_0*y_1 - c_2*y_0*y_1*y_2/(c_6 + y_0) + c_3*y_0**2 - c_4*y_0*y_1 - y_2*(c_0 - c_1*y_0 - c_2*y_0*y_2/(c_6 + y_0)) - y_3*(c_3*y_0 - c_4*y_1)",
            "0",
            "-c_2*y_0/(c_6 + y_0)",
            "0",
            "c_2*y_0*y_1/(c_6 + y_0)**2 - c_2*y_1/(c_6 + y_0) - y_2*(c_2*y_0/(c_6 + y_0)**2 - c_2/(c_6 + y_0))",
            "-c_1 + c_2*y_0*y_2/(c_6 + y_0)**2 - c_2*y_2/(c_6 + y_0) - c_4",
            "-c_2*y_0*y_1*y_2/(c_6 + y_0)**3 + c_2*y_1*y_2/(c_6 + y_0)**2 + c_3 - y_2*(-c_2*y_0*y_2/(c_6 + y_0)**3 + c_2*y_2/(c_6 + y_0)**2)",
        ],
        vec![
            "2*c_0*y_0 + c_0 - 2*c_1*y_0**2 + c_1*y_0 - 2*c_2*y_0**2*y_2/(c_6 + y_0) + c_2*y_0*y_2/(c_6 + y_0) - 2*y_3*(c_0 - c_1*y_0 - c_2*y_0*y_2/(c_6 + y_0))",
            "0",
            "0",
            "0",
            "2*c_2*y_0**2/(c_6 + y_0)**2 - 4*c_2*y_0/(c_6 + y_0) - c_2*y_0/(c_6 + y_0)**2 + c_2/(c_6 + y_0) - 2*y_3*(c_2*y_0/(c_6 + y_0)**2 - c_2/(c_6 + y_0))",
            "0",
            "-2*c_1 - 2*c_2*y_0**2*y_2/(c_6 + y_0)**3 + 4*c_2*y_0*y_2/(c_6 + y_0)**2 + c_2*y_0*y_2/(c_6 + y_0)**3 - 2*c_2*y_2/(c_6 + y_0) - c_2*y_2/(c_6 + y_0)**2 - 2*y_3*(-c_2*y_0*y_2/(c_6 + y_0)**3 + c_2*y_2/(c_6 + y_0)**2)",
        ],
    ])
    .unwrap()
}

fn species() -> Vec<Symbol> {
    ["y_0", "y_1", "y_2"].into_iter().map(Symbol::new).collect()
}

fn propensities() -> Vec<Expr> {
    [
        "c_0",
        "c_1 * y_0",
        "c_2*y_0*y_2/(c_6 + y_0)",
        "c_3*y_0",
        "c_4*y_1",
        "c_5*y_2",
    ]
    .into_iter()
    .map(|text| parse_expr(text).unwrap())
    .collect()
}

fn stoichiometry() -> Vec<Vec<i64>> {
    vec![
        vec![1, -1, -1, 0, 0, 0],
        vec![0, 0, 0, 1, -1, 0],
        vec![0, 0, 0, 0, 1, -1],
    ]
}

#[test]
fn p53_central_moments_match_reference() {
    let answer = derive_central_moment_odes(
        &central_counter(),
        &raw_counter(),
        &mean_matrix(),
        &species(),
        &propensities(),
        &stoichiometry(),
    )
    .unwrap();
    let expected = expected();
    assert_eq!(answer.shape(), (6, 7));
    let opts = EquivalenceOpts::default();
    assert_eq!(answer.mismatches(&expected, &opts), Vec::<(usize, usize)>::new());
    assert!(answer.equivalent(&expected, &opts));
}

#[test]
fn p53_mean_matrix_is_reproduced_from_the_network() {
    let network = models::p53().unwrap();
    let derived = derive_mean_odes(&network, &central_counter()).unwrap();
    assert!(derived.equivalent(&mean_matrix(), &EquivalenceOpts::default()));
}

#[test]
fn p53_output_never_mentions_central_symbols() {
    let answer = derive_central_moment_odes(
        &central_counter(),
        &raw_counter(),
        &mean_matrix(),
        &species(),
        &propensities(),
        &stoichiometry(),
    )
    .unwrap();
    let central_symbols = central_counter().symbols();
    for row in answer.iter_rows() {
        for entry in row {
            let free = entry.free_symbols();
            assert!(central_symbols.iter().all(|symbol| !free.contains(symbol)));
        }
    }
}
