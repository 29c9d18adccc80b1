use mea_moments::multi_index::{binomial, multinomial, sign};
use mea_moments::{Counter, MultiIndex};
use mea_sym::Symbol;
use num_bigint::BigInt;
use proptest::prelude::*;

fn multi_index(max_dim: usize, max_exponent: u32) -> impl Strategy<Value = MultiIndex> {
    prop::collection::vec(0..=max_exponent, 1..=max_dim).prop_map(MultiIndex::new)
}

proptest! {
    #[test]
    fn sub_indices_form_the_full_box(k in multi_index(4, 3)) {
        let subs = k.sub_indices();
        let expected: usize = k.as_slice().iter().map(|e| *e as usize + 1).product();
        prop_assert_eq!(subs.len(), expected);
        prop_assert!(subs.iter().all(|j| k.dominates(j)));
        prop_assert!(subs.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(subs.first(), Some(&MultiIndex::zeros(k.dim())));
        prop_assert_eq!(subs.last(), Some(&k));
    }

    #[test]
    fn multinomial_weights_sum_to_powers_of_two(k in multi_index(4, 3)) {
        let total: BigInt = k.sub_indices().iter().map(|j| multinomial(&k, j)).sum();
        prop_assert_eq!(total, BigInt::from(2u32).pow(k.order()));
    }

    #[test]
    fn signed_weights_cancel(k in multi_index(4, 3)) {
        let total: BigInt = k
            .sub_indices()
            .iter()
            .map(|j| multinomial(&k, j) * sign(&k, j))
            .sum();
        let expected = if k.order() == 0 { 1 } else { 0 };
        prop_assert_eq!(total, BigInt::from(expected));
        prop_assert_eq!(sign(&k, &k), 1);
        prop_assert_eq!(multinomial(&k, &k), BigInt::from(1));
    }

    #[test]
    fn generated_counters_are_canonical(dim in 1usize..4, max_order in 0u32..4) {
        let species: Vec<Symbol> = (0..dim).map(|idx| Symbol::new(format!("y_{idx}"))).collect();
        let counter = Counter::raw(&species, max_order);
        let expected = binomial(max_order + dim as u32, dim as u32);
        prop_assert_eq!(BigInt::from(counter.len()), expected);
        let indices: Vec<&MultiIndex> = counter.iter().map(|m| &m.n_vector).collect();
        prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        for (position, moment) in counter.iter().enumerate() {
            prop_assert_eq!(counter.position(&moment.n_vector), Some(position));
        }

        let mut shuffled: Vec<_> = counter.moments().to_vec();
        shuffled.reverse();
        let rebuilt = Counter::canonical(dim, shuffled.clone()).unwrap();
        prop_assert_eq!(&rebuilt, &counter);

        let kept = Counter::from_moments(dim, shuffled).unwrap();
        prop_assert_eq!(kept.is_canonical(), counter.len() < 2);
        for (position, moment) in kept.iter().enumerate() {
            prop_assert_eq!(kept.position(&moment.n_vector), Some(position));
            prop_assert_eq!(position, counter.len() - 1 - counter.position(&moment.n_vector).unwrap());
        }
    }
}

#[test]
fn p53_counter_order_matches_the_reference_layout() {
    let central = Counter::central(3, 2);
    let layout: Vec<String> = central.iter().map(|m| m.n_vector.to_string()).collect();
    assert_eq!(
        layout,
        [
            "[0, 0, 0]",
            "[0, 0, 2]",
            "[0, 1, 1]",
            "[0, 2, 0]",
            "[1, 0, 1]",
            "[1, 1, 0]",
            "[2, 0, 0]"
        ]
    );
}
