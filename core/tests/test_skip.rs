// Skip correctness: for an encoded value V followed by a marker M,
// `skip()` then a normal read must yield exactly M.
// Covers primitives, nullable wrappers, known/unknown lists and maps,
// composites, and generated trees nested at least five deep.

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use objcodec_core::prelude::*;
    use proptest::prelude::*;

    const MARKER: i32 = 0x5eed_f00d;

    /// `[V, MARKER]` inside an unknown-length list, written by `emit`.
    fn framed(emit: impl FnOnce(&mut Encoder<'_>)) -> Vec<u8> {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Unknown).unwrap();
        emit(&mut enc);
        enc.write(&MARKER).unwrap();
        enc.end().unwrap();
        enc.finish().unwrap()
    }

    fn skip_then_marker(bytes: &[u8]) -> CodecCounters {
        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(bytes, &mut meter);
        dec.begin_list().unwrap();
        dec.skip().unwrap();
        assert_eq!(dec.read::<i32>().unwrap(), MARKER);
        assert!(!dec.has_next().unwrap());
        dec.end().unwrap();
        dec.finish().unwrap()
    }

    fn encoded_len(v: &Value) -> u64 {
        let mut meter = Unmetered::default();
        encode_value(v, &mut meter).unwrap().len() as u64
    }

    // # 1. Fixed shapes

    #[test]
    fn skip_primitives() {
        let values = [
            Value::Bool(false),
            Value::Char(0x263a),
            Value::Double(-2.5),
            Value::BigInt(BigInt::from(-1) << 70),
            Value::from("skipped"),
            Value::Bytes(vec![0xaa; 300]),
            Value::Address(Address::new([7; Address::LEN])),
            Value::Null,
        ];
        for v in values {
            let counters = skip_then_marker(&framed(|enc| enc.write_value(&v).unwrap()));
            assert_eq!(counters.bytes_skipped, encoded_len(&v), "value {:?}", v);
        }
    }

    #[test]
    fn skip_nullable_wrappers() {
        skip_then_marker(&framed(|enc| enc.write_nullable(Some("here")).unwrap()));
        skip_then_marker(&framed(|enc| enc.write_nullable::<String>(None).unwrap()));
        skip_then_marker(&framed(|enc| {
            enc.begin_nullable_map(Length::Unknown).unwrap();
            enc.write(&1u16).unwrap();
            enc.write_nullable(Some(&2u16)).unwrap();
            enc.end().unwrap();
        }));
    }

    #[test]
    fn skip_unknown_containers_nested_five_deep() {
        let bytes = framed(|enc| {
            for _ in 0..5 {
                enc.begin_list(Length::Unknown).unwrap();
                enc.write(&1i8).unwrap();
            }
            enc.begin_map(Length::Known(1)).unwrap();
            enc.write("k").unwrap();
            enc.write_null().unwrap();
            enc.end().unwrap();
            for _ in 0..5 {
                enc.end().unwrap();
            }
        });
        let counters = skip_then_marker(&bytes);
        assert_eq!(counters.frames_opened, 1);
    }

    #[test]
    fn skip_many_and_skip_remaining() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Known(5)).unwrap();
        enc.write_all(&[10i32, 20, 30, 40, 50]).unwrap();
        enc.end().unwrap();
        let bytes = enc.finish().unwrap();

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        dec.skip_many(2).unwrap();
        assert_eq!(dec.read::<i32>().unwrap(), 30);
        dec.skip_remaining().unwrap();
        dec.end().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn skip_remaining_in_unknown_frame() {
        let bytes = framed(|enc| enc.write(&1i32).unwrap());

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        dec.skip_remaining().unwrap();
        dec.end().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn skip_past_terminator_is_imbalance() {
        let bytes = framed(|_| {});

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        dec.skip().unwrap();
        assert!(matches!(dec.skip(), Err(CodecError::FrameImbalance(_))));
    }

    #[test]
    fn skip_composites_by_schema() {
        let inner = RecordSchema::new(vec![
            FieldType::Scalar(ValueKind::Int),
            FieldType::nullable(FieldType::Scalar(ValueKind::String)),
        ]);
        let outer = RecordSchema::new(vec![
            FieldType::Record(inner.clone()),
            FieldType::nullable(FieldType::Record(inner)),
            FieldType::list(FieldType::Any),
        ]);
        let value = vec![
            Value::Composite(vec![Value::Int(1), Value::Null]),
            Value::Composite(vec![Value::Int(2), Value::from("two")]),
            Value::List(vec![Value::Bool(true), Value::Null]),
        ];

        let bytes = framed(|enc| enc.write_object(&outer, &value).unwrap());

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        dec.skip_object(&outer).unwrap();
        assert_eq!(dec.read::<i32>().unwrap(), MARKER);
        assert!(!dec.has_next().unwrap());
        dec.end().unwrap();
        dec.finish().unwrap();
    }

    // # 2. Generated trees

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(|v| Value::BigInt(BigInt::from(v))),
            "[a-z]{0,8}".prop_map(Value::String),
            proptest::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
            Just(Value::Null),
        ]
    }

    fn arb_tree() -> impl Strategy<Value = Value> {
        arb_leaf().prop_recursive(8, 48, 3, |inner| {
            // List items may be composites spanning several wire values.
            let item = prop_oneof![
                3 => inner.clone(),
                1 => proptest::collection::vec(inner.clone(), 1..3).prop_map(Value::Composite),
            ];
            prop_oneof![
                proptest::collection::vec(item, 0..3).prop_map(Value::List),
                proptest::collection::vec((inner.clone(), inner), 0..2).prop_map(Value::Map),
            ]
        })
    }

    /// Wrap `v` in five single-element lists so every case is at least five deep.
    fn deepen(mut v: Value) -> Value {
        for _ in 0..5 {
            v = Value::List(vec![v]);
        }
        v
    }

    proptest! {
        #[test]
        fn skip_generated_tree_then_marker(v in arb_tree()) {
            let v = deepen(v);
            let bytes = framed(|enc| enc.write_value(&v).unwrap());
            let counters = skip_then_marker(&bytes);
            prop_assert_eq!(counters.bytes_skipped, encoded_len(&v));
        }

        #[test]
        fn skip_nullable_generated_tree(v in arb_tree()) {
            let bytes = framed(|enc| enc.write_nullable(Some(&v)).unwrap());
            skip_then_marker(&bytes);
        }

        #[test]
        fn skip_costs_per_byte_only(v in arb_tree()) {
            let bytes = framed(|enc| enc.write_value(&v).unwrap());
            let fees = FeeSchedule::default();

            let mut meter = Unmetered::default();
            let mut dec = Decoder::new(&bytes, &mut meter);
            dec.begin_list().unwrap();
            let before = dec.counters().energy_charged;
            dec.skip().unwrap();
            let spent = dec.counters().energy_charged - before;
            prop_assert_eq!(spent, fees.skip_per_byte * encoded_len(&v));
        }
    }
}
