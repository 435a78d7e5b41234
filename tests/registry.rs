use proptest::prelude::*;
use std::{collections::HashMap, thread};
use tagmap::prelude::*;

fn leak(s: String) -> &'static str { Box::leak(s.into_boxed_str()) }

fn named(name: &'static str) -> TypeHandle {
    TypeHandle::Dynamic(TypeDescriptor::new(name, || unreachable!()))
}

fn catalog_for(names: &[&'static str]) -> DescriptorTable {
    let mut table = DescriptorTable::new();
    for name in names {
        table.insert(TypeDescriptor::new(*name, || unreachable!())).unwrap();
    }
    table
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

    #[test]
    fn tags_follow_observation_order(seq in prop::collection::vec(0u8..40, 0..120)) {
        let registry = TagRegistry::new();
        let mut seen: HashMap<u8, TypeTag> = HashMap::new();

        for n in seq {
            let name = leak(format!("t{}", n));
            let tag = registry.register_dynamic(named(name)).unwrap();

            let next = TypeTag::new(seen.len() as i8 + 1);
            let expected = *seen.entry(n).or_insert(next);
            prop_assert_eq!(tag, expected);
            prop_assert_eq!(registry.resolve(tag).map(|h| h.name()), Some(name));
        }
        prop_assert_eq!(registry.dynamic_count() as usize, seen.len());
    }

    #[test]
    fn tables_survive_the_wire(count in 0usize..=127) {
        let names: Vec<&'static str> = (0..count).map(|i| leak(format!("wire::T{}", i))).collect();
        let source = TagRegistry::new();
        for name in names.iter() {
            source.register_dynamic(named(*name)).unwrap();
        }

        let out: &mut Vec<u8> = &mut Vec::new();
        source.write_table(out).unwrap();

        let target = TagRegistry::new();
        target.read_table(&mut Input::from(out.clone()), &catalog_for(&names)).unwrap();

        prop_assert_eq!(target.dynamic_entries(), source.dynamic_entries());
        for name in names.iter() {
            prop_assert_eq!(target.tag_of(name), source.tag_of(name));
        }
    }

    #[test]
    fn short_tables_fail_cleanly(count in 1usize..20, claimed in 1u8..=127) {
        prop_assume!(claimed as usize > count);
        let names: Vec<&'static str> = (0..count).map(|i| leak(format!("short::T{}", i))).collect();
        let source = TagRegistry::new();
        for name in names.iter() {
            source.register_dynamic(named(*name)).unwrap();
        }

        let out: &mut Vec<u8> = &mut Vec::new();
        source.write_table(out).unwrap();
        out[0] = claimed;

        let target = TagRegistry::new();
        let err = target
            .read_table(&mut Input::from(out.clone()), &catalog_for(&names))
            .unwrap_err();
        prop_assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Decode(_))
        ));
        prop_assert_eq!(target.dynamic_count(), 0);
    }
}

#[test]
fn the_128th_type_overflows() {
    let registry = TagRegistry::new();
    for i in 0..127 {
        let tag = registry.register_dynamic(named(leak(format!("full::T{}", i)))).unwrap();
        assert_eq!(tag, TypeTag::new(i as i8 + 1));
    }
    assert_eq!(registry.dynamic_count(), MAX_DYNAMIC_TAGS);

    let err = registry.register_dynamic(named("full::T127")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::Overflow(_))
    ));
    // known types still resolve
    assert_eq!(registry.register_dynamic(named("full::T0")).unwrap(), TypeTag::new(1));
}

#[test]
fn abac_scenario() {
    let registry = TagRegistry::new();
    let tags: Vec<i8> = vec!["A", "B", "A", "C"]
        .into_iter()
        .map(|n| registry.register_dynamic(named(n)).unwrap().get())
        .collect();
    assert_eq!(tags, vec![1, 2, 1, 3]);

    let out: &mut Vec<u8> = &mut Vec::new();
    registry.write_table(out).unwrap();
    assert_eq!(*out, vec![3, 1, 0, 1, b'A', 2, 0, 1, b'B', 3, 0, 1, b'C']);

    let fresh = TagRegistry::new();
    fresh
        .read_table(&mut Input::from(out.clone()), &catalog_for(&["A", "B", "C"]))
        .unwrap();
    assert_eq!(fresh.dynamic_entries(), registry.dynamic_entries());
}

#[test]
fn concurrent_maps_of_registrations_agree() {
    let registry = Arc::new(TagRegistry::new());
    let names: Vec<&'static str> = (0..100).map(|i| leak(format!("conc::T{}", i))).collect();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let registry = registry.clone();
            let names = names.clone();
            thread::spawn(move || {
                let mut seen = Vec::new();
                for (i, name) in names.iter().enumerate() {
                    if i % 4 == t || i % 3 == 0 {
                        seen.push((*name, registry.register_dynamic(named(*name)).unwrap()));
                    }
                }
                seen
            })
        })
        .collect();

    for handle in handles {
        for (name, tag) in handle.join().unwrap() {
            assert_eq!(registry.tag_of(name), Some(tag));
            assert_eq!(registry.resolve(tag).map(|h| h.name()), Some(name));
        }
    }
    assert_eq!(registry.dynamic_count(), 100);
    let mut tags: Vec<i8> = registry.dynamic_entries().iter().map(|(t, _)| t.get()).collect();
    tags.dedup();
    assert_eq!(tags, (1..=100).collect::<Vec<i8>>());
}
