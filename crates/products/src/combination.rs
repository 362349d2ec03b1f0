//! Cartesian expansion of option lists into combinations.
//!
//! Combinations are produced in lexicographic order over the declared option
//! order: the last option's values vary fastest, exactly as nested loops over
//! `options[0]..options[n-1]` would produce them. Index `i` of the expansion is
//! the mixed-radix decomposition of `i` against the per-option value counts.

use core::iter::FusedIterator;

use catalog_core::{DomainError, DomainResult, ValueObject};

use crate::option::{ProductOption, combination_count};
use crate::product::Attributes;

/// One chosen value per option, kept in the product's option order.
///
/// Never persisted directly; variants store it as [`Attributes`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Combination {
    entries: Vec<(String, String)>,
}

impl Combination {
    /// The combination of a product without options.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, option_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == option_name)
            .map(|(_, value)| value.as_str())
    }

    /// `(option name, value)` pairs in option order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Chosen values in option order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn to_attributes(&self) -> Attributes {
        self.entries.iter().cloned().collect()
    }
}

impl ValueObject for Combination {}

impl FromIterator<(String, String)> for Combination {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Lazy, exact-size iterator over every combination of a list of options.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    options: &'a [ProductOption],
    cursor: Vec<usize>,
    remaining: usize,
}

impl<'a> Combinations<'a> {
    fn new(options: &'a [ProductOption], total: usize) -> Self {
        Self {
            options,
            cursor: vec![0; options.len()],
            remaining: total,
        }
    }

    fn advance(&mut self) {
        for (position, option) in self.options.iter().enumerate().rev() {
            self.cursor[position] += 1;
            if self.cursor[position] < option.values.len() {
                return;
            }
            self.cursor[position] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let combination = self
            .options
            .iter()
            .zip(&self.cursor)
            .map(|(option, &idx)| (option.name.clone(), option.values[idx].clone()))
            .collect();

        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl FusedIterator for Combinations<'_> {}

/// Iterate all combinations without materializing them.
///
/// Fails only when the combination count overflows `usize`; callers that
/// want a policy ceiling should run [`crate::VariantLimits::check`] first.
pub fn iter_combinations(options: &[ProductOption]) -> DomainResult<Combinations<'_>> {
    let total = combination_count(options)
        .ok_or_else(|| DomainError::validation("too many variant combinations"))?;
    Ok(Combinations::new(options, total))
}

/// Expand options into the full Cartesian product.
///
/// An empty option list yields exactly one empty combination. An option with
/// no values yields no combinations at all, which is why callers must treat
/// "no options" separately.
pub fn expand(options: &[ProductOption]) -> DomainResult<Vec<Combination>> {
    Ok(iter_combinations(options)?.collect())
}

/// The combination at position `index` of [`expand`]'s output, if any.
pub fn combination_at(options: &[ProductOption], index: usize) -> Option<Combination> {
    let total = combination_count(options)?;
    if index >= total {
        return None;
    }

    let mut remainder = index;
    let mut picks = Vec::with_capacity(options.len());
    for option in options.iter().rev() {
        let radix = option.values.len();
        picks.push((option.name.clone(), option.values[remainder % radix].clone()));
        remainder /= radix;
    }
    picks.reverse();
    Some(picks.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn option(name: &str, values: &[&str]) -> ProductOption {
        ProductOption::new(name, values.iter().copied()).unwrap()
    }

    fn size_color() -> Vec<ProductOption> {
        vec![option("Size", &["S", "M"]), option("Color", &["Red", "Blue"])]
    }

    #[test]
    fn no_options_yield_one_empty_combination() {
        let combos = expand(&[]).unwrap();
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn option_without_values_yields_nothing() {
        let options = vec![ProductOption {
            name: "Size".to_string(),
            values: vec![],
        }];
        assert!(expand(&options).unwrap().is_empty());
    }

    #[test]
    fn last_option_varies_fastest() {
        let combos = expand(&size_color()).unwrap();
        let rendered: Vec<Vec<&str>> = combos.iter().map(|c| c.values().collect()).collect();
        assert_eq!(
            rendered,
            vec![
                vec!["S", "Red"],
                vec!["S", "Blue"],
                vec!["M", "Red"],
                vec!["M", "Blue"],
            ]
        );
    }

    #[test]
    fn combination_keeps_option_order() {
        let combos = expand(&size_color()).unwrap();
        let names: Vec<&str> = combos[0].iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Size", "Color"]);
        assert_eq!(combos[3].get("Color"), Some("Blue"));
        assert_eq!(combos[3].get("Material"), None);
    }

    #[test]
    fn iterator_reports_exact_size() {
        let options = vec![
            option("Size", &["S", "M", "L"]),
            option("Color", &["Red", "Blue"]),
            option("Fit", &["Slim", "Regular"]),
        ];
        let mut iter = iter_combinations(&options).unwrap();
        assert_eq!(iter.len(), 12);
        iter.next();
        assert_eq!(iter.len(), 11);
        assert_eq!(iter.by_ref().count(), 11);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn combination_at_out_of_range_is_none() {
        assert_eq!(combination_at(&size_color(), 4), None);
        assert_eq!(combination_at(&[], 0), Some(Combination::empty()));
    }

    #[test]
    fn to_attributes_maps_names_to_values() {
        let combo = combination_at(&size_color(), 1).unwrap();
        let attrs = combo.to_attributes();
        assert_eq!(attrs.get("Size").map(String::as_str), Some("S"));
        assert_eq!(attrs.get("Color").map(String::as_str), Some("Blue"));
    }

    fn arb_options() -> impl Strategy<Value = Vec<ProductOption>> {
        prop::collection::vec(
            prop::collection::hash_set("[a-z]{1,4}", 1..5),
            0..4,
        )
        .prop_map(|value_sets| {
            value_sets
                .into_iter()
                .enumerate()
                .map(|(i, values)| ProductOption {
                    name: format!("opt{i}"),
                    values: values.into_iter().collect(),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: expansion has exactly the product of the value counts,
        /// every combination is unique and covers every option.
        #[test]
        fn expansion_is_complete_and_unique(options in arb_options()) {
            let combos = expand(&options).unwrap();
            let expected: usize = options.iter().map(|o| o.values.len()).product();
            prop_assert_eq!(combos.len(), expected);

            let distinct: HashSet<_> = combos.iter().collect();
            prop_assert_eq!(distinct.len(), combos.len());

            for combo in &combos {
                prop_assert_eq!(combo.len(), options.len());
                for option in &options {
                    let value = combo.get(&option.name);
                    prop_assert!(value.is_some_and(|v| option.contains(v)));
                }
            }
        }

        /// Property: position `i` of the expansion is the mixed-radix decomposition of `i`.
        #[test]
        fn expansion_matches_mixed_radix_indexing(options in arb_options()) {
            for (i, combo) in expand(&options).unwrap().into_iter().enumerate() {
                prop_assert_eq!(Some(combo), combination_at(&options, i));
            }
        }

        /// Property: expansion is deterministic.
        #[test]
        fn expansion_is_deterministic(options in arb_options()) {
            prop_assert_eq!(expand(&options).unwrap(), expand(&options).unwrap());
        }
    }
}
