//! Property-based tests for sequence alignment, locator patterns and
//! document comparison.

use std::collections::HashSet;

use proptest::prelude::*;
use xmlcmp::compare::{ArrayComparator, DiffKind, PathPattern, PlainValueModel};
use xmlcmp::tree::XmlComparator;
use xmlcmp::xml::parse_str;

fn count(diffs: &[xmlcmp::DiffDetail<u16>], kind: DiffKind) -> usize {
    diffs.iter().filter(|d| *d.kind() == kind).count()
}

fn child_element() -> impl Strategy<Value = String> {
    ("[abc]", prop::option::of("[0-9]{1,3}"), "[a-z ]{0,6}").prop_map(|(name, attr, text)| {
        match attr {
            Some(value) => format!(r#"<{name} id="{value}">{text}</{name}>"#),
            None => format!("<{name}>{text}</{name}>"),
        }
    })
}

fn document(children: &[String]) -> String {
    format!("<root>{}</root>", children.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn sequence_equals_itself(items in prop::collection::vec(0u16..20, 0..30)) {
        let model = PlainValueModel::<u16>::new();
        let result = ArrayComparator::compare(&items, &items, &model);
        prop_assert!(result.identical());
    }

    #[test]
    fn distinct_values_are_accounted_for(
        a in prop::collection::hash_set(0u16..40, 0..20),
        b in prop::collection::hash_set(0u16..40, 0..20),
    ) {
        let items1: Vec<u16> = a.iter().copied().collect();
        let items2: Vec<u16> = b.iter().copied().collect();
        let model = PlainValueModel::<u16>::new();
        let diffs = ArrayComparator::compare(&items1, &items2, &model).into_diffs();

        let common: HashSet<u16> = a.intersection(&b).copied().collect();
        prop_assert_eq!(count(&diffs, DiffKind::Missing), a.len() - common.len());
        prop_assert_eq!(count(&diffs, DiffKind::Unexpected), b.len() - common.len());
        prop_assert_eq!(count(&diffs, DiffKind::Different), 0);
        prop_assert!(count(&diffs, DiffKind::Moved) <= common.len());
        for diff in &diffs {
            prop_assert!(diff.locators().next().is_some());
        }
    }

    #[test]
    fn appended_value_is_unexpected(
        items in prop::collection::vec(0u16..20, 0..30),
        extra in 100u16..200,
    ) {
        let mut extended = items.clone();
        extended.push(extra);
        let model = PlainValueModel::<u16>::new();
        let diffs = ArrayComparator::compare(&items, &extended, &model).into_diffs();

        prop_assert_eq!(diffs.len(), 1);
        prop_assert_eq!(diffs[0].kind(), &DiffKind::Unexpected);
        prop_assert_eq!(diffs[0].actual(), Some(&extra));
        let locator = format!("[{}]", items.len());
        prop_assert_eq!(diffs[0].locator_of_actual(), Some(locator.as_str()));
    }

    #[test]
    fn removed_last_value_is_missing(items in prop::collection::vec(0u16..20, 1..30)) {
        let shortened = &items[..items.len() - 1];
        let model = PlainValueModel::<u16>::new();
        let diffs = ArrayComparator::compare(&items, shortened, &model).into_diffs();

        prop_assert_eq!(diffs.len(), 1);
        prop_assert_eq!(diffs[0].kind(), &DiffKind::Missing);
        let locator = format!("[{}]", items.len() - 1);
        prop_assert_eq!(diffs[0].locator_of_expected(), Some(locator.as_str()));
    }

    #[test]
    fn locator_matches_itself_as_pattern(
        steps in prop::collection::vec(("[a-z]{1,6}", prop::option::of(1usize..5)), 1..5),
        attribute in prop::option::of("[a-z]{1,4}"),
    ) {
        let mut locator = String::new();
        for (name, ordinal) in &steps {
            locator.push('/');
            locator.push_str(name);
            if let Some(k) = ordinal {
                locator.push_str(&format!("[{}]", k));
            }
        }
        if let Some(name) = &attribute {
            locator.push_str("/@");
            locator.push_str(name);
        }

        let pattern = PathPattern::parse(&locator).unwrap();
        prop_assert!(pattern.matches(&locator));
        let last = &steps[steps.len() - 1].0;
        let descendant = match &attribute {
            Some(name) => format!("//{}/@{}", last, name),
            None => format!("//{}", last),
        };
        prop_assert!(PathPattern::parse(&descendant).unwrap().matches(&locator));
    }

    #[test]
    fn document_equals_itself(children in prop::collection::vec(child_element(), 0..8)) {
        let xml = document(&children);
        let expected = parse_str(&xml).unwrap();
        let actual = parse_str(&xml).unwrap();
        let comparator = XmlComparator::default();
        prop_assert!(comparator.compare(&expected, &actual).is_empty());
    }

    #[test]
    fn dropped_last_child_is_missing(children in prop::collection::vec(child_element(), 1..8)) {
        let expected = parse_str(&document(&children)).unwrap();
        let actual = parse_str(&document(&children[..children.len() - 1])).unwrap();
        let comparator = XmlComparator::default();
        let diff = comparator.compare(&expected, &actual);

        prop_assert_eq!(diff.detail_count(), 1);
        prop_assert_eq!(diff.details()[0].kind(), &DiffKind::Missing);
        prop_assert_eq!(diff.details()[0].object_classifier(), "list element");
    }
}
