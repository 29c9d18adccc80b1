use mea_moments::{derive_central_moment_odes, Counter, Moment, MultiIndex};
use mea_sym::{parse_expr, parse_simplified, EquivalenceOpts, Expr, ExprMatrix, Symbol};

fn counter(nvecs: &[[u32; 2]], prefix: &str) -> Counter {
    let moments = nvecs
        .iter()
        .enumerate()
        .map(|(idx, nvec)| Moment::new(MultiIndex::new(nvec.to_vec()), format!("{prefix}{idx}")))
        .collect();
    Counter::from_moments(2, moments).unwrap()
}

const CANONICAL_CENTRAL: [[u32; 2]; 4] = [[0, 0], [0, 2], [1, 1], [2, 0]];

fn mean_entry(column: [u32; 2], species: usize) -> &'static str {
    match (species, column) {
        (0, [0, 0]) => "-c_0*y_0*(y_0 + y_1 - 181) + c_1*(-y_0 - y_1 + 301)",
        (0, [1, 1]) | (0, [2, 0]) => "-c_0",
        (1, [0, 0]) => "c_2*(-y_0 - y_1 + 301)",
        _ => "0",
    }
}

fn derive_with(central_layout: &[[u32; 2]]) -> ExprMatrix {
    let central = counter(central_layout, "YU");
    let raw = counter(&[[0, 0], [0, 1], [1, 0], [0, 2], [1, 1], [2, 0]], "y_");
    let means = ExprMatrix::parse_rows((0..2).map(|species| {
        central_layout
            .iter()
            .map(|column| mean_entry(*column, species))
            .collect::<Vec<_>>()
    }))
    .unwrap();
    let species = vec![Symbol::new("y_0"), Symbol::new("y_1")];
    let propensities: Vec<Expr> = [
        "c_0*y_0*(y_0 + y_1 - 181)",
        "c_1*(-y_0 - y_1 + 301)",
        "c_2*(-y_0 - y_1 + 301)",
    ]
    .into_iter()
    .map(|text| parse_expr(text).unwrap())
    .collect();
    let stoichiometry = vec![vec![-1, 1, 0], vec![0, 0, 1]];
    derive_central_moment_odes(&central, &raw, &means, &species, &propensities, &stoichiometry)
        .unwrap()
}

fn derive() -> ExprMatrix {
    derive_with(&CANONICAL_CENTRAL)
}

fn reference() -> ExprMatrix {
    ExprMatrix::parse_rows(vec![
        vec!["c_2*(-y_0 - y_1 + 301)", " -2*c_2", " -2*c_2", " 0"],
        vec![
            "-c_0*y_0*y_1*(y_0 + y_1 - 181) + c_1*y_1*(-y_0 - y_1 + 301) + c_2*y_0*(-y_0 - y_1 + 301) - c_2*y_2*(-y_0 - y_1 + 301) - y_1*(-c_0*y_0*(y_0 + y_1 - 181) + c_1*(-y_0 - y_1 + 301))",
            " -c_0*y_0 - c_1",
            " -c_0*y_0 - c_0*(y_0 + y_1 - 181) - c_1 - c_2",
            " -c_2",
        ],
        vec![
            "-2*c_0*y_0**2*(y_0 + y_1 - 181) + c_0*y_0*(y_0 + y_1 - 181) + 2*c_1*y_0*(-y_0 - y_1 + 301) + c_1*(-y_0 - y_1 + 301) - 2*y_2*(-c_0*y_0*(y_0 + y_1 - 181) + c_1*(-y_0 - y_1 + 301))",
            " 0",
            " -4*c_0*y_0 + 2*c_0*y_2 + c_0 - 2*c_1",
            " -4*c_0*y_0 + 2*c_0*y_2 - 2*c_0*(y_0 + y_1 - 181) + c_0 - 2*c_1",
        ],
    ])
    .unwrap()
}

#[test]
fn michaelis_menten_central_moments_match_reference() {
    let expected = reference();
    let answer = derive();
    assert_eq!(answer.shape(), (3, 4));
    let opts = EquivalenceOpts::default();
    assert_eq!(answer.mismatches(&expected, &opts), Vec::<(usize, usize)>::new());
}

#[test]
fn polynomial_models_need_no_sampling() {
    // Without denominators the canonical forms coincide exactly.
    let answer = derive();
    let first = parse_simplified("c_2*(-y_0 - y_1 + 301)").unwrap();
    assert_eq!(answer.get(0, 0), Some(&first));
    assert_eq!(answer.get(0, 1), Some(&(Expr::int(-2) * Expr::symbol("c_2"))));
}

#[test]
fn caller_ordered_counters_keep_rows_and_columns_aligned() {
    let layout = [[0, 0], [2, 0], [1, 1], [0, 2]];
    let answer = derive_with(&layout);
    let expected = reference();
    assert_eq!(answer.shape(), (3, 4));

    let canonical_rows: Vec<[u32; 2]> = CANONICAL_CENTRAL[1..].to_vec();
    let position = |table: &[[u32; 2]], index: &[u32; 2]| {
        table.iter().position(|entry| entry == index).unwrap()
    };
    let opts = EquivalenceOpts::default();
    for (row, row_index) in layout[1..].iter().enumerate() {
        for (col, col_index) in layout.iter().enumerate() {
            let reference_entry = expected
                .get(
                    position(&canonical_rows, row_index),
                    position(&CANONICAL_CENTRAL, col_index),
                )
                .unwrap();
            assert!(
                answer.get(row, col).unwrap().equivalent(reference_entry, &opts),
                "row {row_index:?} col {col_index:?}"
            );
        }
    }
}
