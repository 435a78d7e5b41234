use proptest::prelude::*;
use tagmap::prelude::*;
use tagmap_strategy::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..ProptestConfig::default() })]

    #[test]
    fn copies_equal_their_source(m in arb_map()) {
        let mut copy = MapWritable::with_catalog(sample_catalog());
        copy.copy_from(Some(&m)).unwrap();
        prop_assert_eq!(&copy, &m);
    }

    #[test]
    fn copies_are_independent(m in arb_sorted_map(), k in arb_value(), v in arb_value()) {
        let before = encode_full(&m).unwrap();

        let mut copy = m.try_clone().unwrap();
        copy.put(k, v).unwrap();
        copy.put(Value::ext(Point { x: 0, y: 0 }), ()).unwrap();
        copy.clear();

        prop_assert_eq!(encode_full(&m).unwrap(), before);
    }
}

#[test]
fn copy_without_source_is_rejected_up_front() {
    let mut target = sorted_map_of(vec![(Value::from(1), Value::from("one"))]);
    let err = target.copy_from(None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::InvalidArgument(_))
    ));
    assert_eq!(target.len(), 1);
}

#[test]
fn copy_keeps_the_target_conf_and_catalog() {
    let conf = Arc::new(Configuration::new().with("odps.sql.timezone", "UTC"));
    let mut target = MapWritable::with_catalog(sample_catalog());
    target.set_conf(Some(conf.clone()));

    let source = map_of(vec![(Value::from("p"), Value::ext(Point { x: 3, y: 4 }))]);
    target.copy_from(Some(&source)).unwrap();

    assert_eq!(target, source);
    assert_eq!(target.conf(), Some(conf.clone()));

    let clone = target.try_clone().unwrap();
    assert_eq!(clone.conf(), Some(conf));
    assert_eq!(clone, source);
}

#[test]
fn failed_copies_carry_their_cause() {
    let source = map_of(vec![(Value::from(1), Value::ext(Label("x".to_string())))]);
    let mut target = MapWritable::new();
    target.put("kept", 1).unwrap();

    let err = target.copy_from(Some(&source)).unwrap_err();
    let copy_err = err.downcast_ref::<CopyError>().unwrap();
    assert!(copy_err.to_string().contains("strategy::Étiquette"));
    assert_eq!(target.len(), 1);
}
