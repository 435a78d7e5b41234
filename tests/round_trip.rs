use proptest::prelude::*;
use tagmap::prelude::*;
use tagmap_strategy::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

    #[test]
    fn map_round_trip(m in arb_map()) {
        let enc = encode_full(&m).unwrap();

        let mut dec = MapWritable::with_catalog(sample_catalog());
        decode_full(&mut dec, enc.clone()).unwrap();

        if dec != m {
            panic!("Tried encoding\n {:?}\n as \n{:x?}\n got \n{:?}\n", m, enc, dec)
        }
        prop_assert_eq!(dec.registry().dynamic_entries(), m.registry().dynamic_entries());
    }

    #[test]
    fn sorted_map_round_trip(m in arb_sorted_map()) {
        let enc = encode_full(&m).unwrap();

        let mut dec = SortedMapWritable::with_catalog(sample_catalog());
        decode_full(&mut dec, enc.clone()).unwrap();

        prop_assert_eq!(&dec, &m);
        // nested unordered maps may come out in another order, never another size
        prop_assert_eq!(encode_full(&dec).unwrap().len(), enc.len());
    }

    #[test]
    fn truncated_streams_never_half_decode(m in arb_sorted_map(), cut in any::<prop::sample::Index>()) {
        let enc = encode_full(&m).unwrap();
        let short = enc[..cut.index(enc.len())].to_vec();

        let mut dec = SortedMapWritable::with_catalog(sample_catalog());
        dec.put("sentinel", true).unwrap();

        prop_assert!(decode_full(&mut dec, short).is_err());
        prop_assert_eq!(dec.len(), 1);
        prop_assert_eq!(dec.get(&Value::from("sentinel")), Some(&Value::from(true)));
    }

    #[test]
    fn values_clone_to_equals(v in arb_value()) {
        prop_assert_eq!(v.try_clone().unwrap(), v);
    }
}

#[test]
fn ext_values_need_the_catalog_on_both_sides() {
    let mut m = MapWritable::with_catalog(sample_catalog());
    m.put(Value::ext(Point { x: 1, y: -2 }), Value::ext(Label("é".to_string())))
        .unwrap();

    assert_eq!(m.registry().tag_of("strategy::Point"), Some(TypeTag::new(1)));
    assert_eq!(m.registry().tag_of("strategy::Étiquette"), Some(TypeTag::new(2)));

    let enc = encode_full(&m).unwrap();
    // count, then the first entry
    assert_eq!(&enc[..4], &[2, 1, 0, 15]);
    assert_eq!(&enc[4..19], b"strategy::Point");

    let err = decode_full(&mut MapWritable::new(), enc.clone()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::Lookup(_))
    ));

    let mut dec = MapWritable::with_catalog(sample_catalog());
    decode_full(&mut dec, enc).unwrap();
    assert_eq!(dec, m);
}
