use bytes::Bytes;
use proptest::prelude::*;
use std::sync::Arc;
use tagmap::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
/// A two-field extension type.
pub struct Point {
    pub x: i32,
    pub y: i64,
}

impl Streamable for Point {
    fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> {
        out.put_i32(self.x);
        out.put_vlong(self.y);
        Ok(())
    }

    fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
        self.x = input.read_i32()?;
        self.y = input.read_vlong()?;
        Ok(())
    }
}

impl Writable for Point {
    fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Point>("strategy::Point") }
}

#[derive(Debug, Default, Clone, PartialEq)]
/// An extension type whose name needs more than one byte per character.
pub struct Label(pub String);

impl Streamable for Label {
    fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error> { out.put_utf(&self.0) }

    fn read_from(&mut self, input: &mut Input) -> Result<(), Error> {
        self.0 = input.read_utf()?;
        Ok(())
    }
}

impl Writable for Label {
    fn descriptor(&self) -> TypeDescriptor { TypeDescriptor::of::<Label>("strategy::Étiquette") }
}

/// A catalog knowing [`Point`] and [`Label`].
pub fn sample_catalog() -> Arc<dyn TypeCatalog> {
    DescriptorTable::new()
        .with::<Point>()
        .and_then(|t| t.with::<Label>())
        .unwrap()
        .into_shared()
}

/// arbitrary Bytes for use with proptest
pub fn arb_bs() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..64).prop_map(Bytes::from)
}

/// arbitrary extension value for use with proptest
pub fn arb_ext() -> impl Strategy<Value = Value> {
    prop_oneof![
        (any::<i32>(), any::<i64>()).prop_map(|(x, y)| Value::ext(Point { x, y })),
        ".{0,20}".prop_map(|s| Value::ext(Label(s))),
    ]
}

/// arbitrary built-in scalar for use with proptest
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<()>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<i64>().prop_map(Value::Datetime),
        any::<f64>().prop_map(Value::from),
        any::<String>().prop_map(Value::from),
        arb_bs().prop_map(Value::from),
    ]
}

/// Builds a map holding `entries`, resolving extension types through [`sample_catalog`].
pub fn map_of(entries: Vec<(Value, Value)>) -> MapWritable {
    let mut map = MapWritable::with_catalog(sample_catalog());
    for (k, v) in entries {
        map.put(k, v).unwrap();
    }
    map
}

/// Builds a sorted map holding `entries`, resolving extension types through
/// [`sample_catalog`].
pub fn sorted_map_of(entries: Vec<(Value, Value)>) -> SortedMapWritable {
    let mut map = SortedMapWritable::with_catalog(sample_catalog());
    for (k, v) in entries {
        map.put(k, v).unwrap();
    }
    map
}

/// arbitrary Value for use with proptest
pub fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![4 => arb_scalar(), 1 => arb_ext()];
    leaf.prop_recursive(
        4,  // max depth
        32, // max nodes
        8,  // max items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec((inner.clone(), inner.clone()), 0..8)
                    .prop_map(|es| Value::from(map_of(es))),
                prop::collection::vec((inner.clone(), inner.clone()), 0..8)
                    .prop_map(|es| Value::from(sorted_map_of(es))),
                prop::collection::vec(arb_scalar(), 0..6)
                    .prop_map(|fs| Value::from(Tuple::from_values(fs).unwrap())),
            ]
        },
    )
}

/// arbitrary MapWritable for use with proptest
pub fn arb_map() -> impl Strategy<Value = MapWritable> {
    prop::collection::vec((arb_value(), arb_value()), 0..16).prop_map(map_of)
}

/// arbitrary SortedMapWritable for use with proptest
pub fn arb_sorted_map() -> impl Strategy<Value = SortedMapWritable> {
    prop::collection::vec((arb_value(), arb_value()), 0..16).prop_map(sorted_map_of)
}
