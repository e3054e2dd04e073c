//! Property-based tests for values, ordering and the variable store.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use hierstate::container::{ContainerState, ElementKind, State};
use hierstate::core::{natural_cmp, DataType, Value};
use hierstate::variables::{GlobalVariableManager, VariableError};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

prop_compose! {
    fn arbitrary_scalar()(variant in 0..4u8, i in any::<i64>(), x in -1.0e9..1.0e9f64, b in any::<bool>(), s in "[a-z ]{0,12}") -> Value {
        match variant {
            0 => Value::Int(i),
            1 => Value::Float(x),
            2 => Value::Bool(b),
            _ => Value::Str(s),
        }
    }
}

proptest! {
    #[test]
    fn natural_order_is_antisymmetric(a in "[a-z_0-9]{0,10}", b in "[a-z_0-9]{0,10}") {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
    }

    #[test]
    fn natural_order_equal_only_for_equal_names(a in "[a-z_0-9]{0,10}", b in "[a-z_0-9]{0,10}") {
        prop_assert_eq!(natural_cmp(&a, &b).is_eq(), a == b);
    }

    #[test]
    fn numbered_names_sort_numerically(m in 0u32..10_000, n in 0u32..10_000) {
        let left = format!("var_{m}");
        let right = format!("var_{n}");
        prop_assert_eq!(natural_cmp(&left, &right), m.cmp(&n));
    }

    #[test]
    fn scalar_literal_parses_back(value in arbitrary_scalar()) {
        let data_type = value.data_type();
        let parsed = data_type.parse_literal(&value.to_literal()).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn object_accepts_every_scalar(value in arbitrary_scalar()) {
        prop_assert!(DataType::Object.accepts(&value));
        prop_assert!(DataType::Object.coerce(&value).is_ok());
    }

    #[test]
    fn stored_values_are_copies(key in "[a-z]{1,8}", items in prop::collection::vec(any::<i64>(), 0..8)) {
        let globals = GlobalVariableManager::new();
        let original = Value::List(items.into_iter().map(Value::Int).collect());
        globals.set_variable(key.clone(), original.clone());

        let mut copy = globals.get_variable(&key).unwrap();
        if let Value::List(list) = &mut copy {
            list.push(Value::Int(0));
        }
        prop_assert_eq!(globals.get_variable(&key).unwrap(), original);
    }

    #[test]
    fn unknown_keys_are_not_found(key in "[a-z]{1,8}") {
        let globals = GlobalVariableManager::new();
        prop_assert_eq!(
            globals.get_variable(&key),
            Err(VariableError::KeyNotFound { key: key.clone() })
        );
        prop_assert!(globals.lock_variable(&key).is_none());
    }

    #[test]
    fn element_ids_are_never_reused(ops in prop::collection::vec(any::<bool>(), 1..30)) {
        let state = ContainerState::new("c");
        let mut seen = HashSet::new();
        let mut live = Vec::new();

        for (i, add) in ops.into_iter().enumerate() {
            if add || live.is_empty() {
                let id = state.add_scoped_variable(&format!("v{i}"), "int", None).unwrap();
                prop_assert!(seen.insert(id));
                live.push(id);
            } else {
                let id = live.remove(0);
                prop_assert!(state.remove(id).is_ok());
            }
        }
        prop_assert_eq!(state.sorted_by_name(ElementKind::ScopedVariable).len(), live.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn concurrent_sets_keep_one_value(v1 in any::<i64>(), v2 in any::<i64>()) {
        let globals = Arc::new(GlobalVariableManager::new());

        thread::scope(|scope| {
            for value in [v1, v2] {
                let globals = Arc::clone(&globals);
                scope.spawn(move || globals.set_variable("shared", value));
            }
        });

        let stored = globals.get_variable("shared").unwrap();
        prop_assert!(stored == Value::Int(v1) || stored == Value::Int(v2));
        prop_assert_eq!(globals.keys(), vec!["shared".to_string()]);
    }
}
