// Round-trip coverage for every value kind:
// * typed writes and reads at integer/float boundaries
// * empty payloads and zero-length containers
// * nulls nested three frames deep
// * composites occupying their field count inside lists and maps
// * generated value trees through encode_value/decode_value

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use objcodec_core::prelude::*;
    use proptest::prelude::*;

    fn round_trip(v: &Value) -> Value {
        let mut meter = Unmetered::default();
        let bytes = encode_value(v, &mut meter).unwrap();
        decode_value(&bytes, &mut meter).unwrap()
    }

    fn typed_round_trip<T>(v: T) -> T
    where
        T: Writable + Readable,
    {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.write(&v).unwrap();
        let bytes = enc.finish().unwrap();

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        let out = dec.read::<T>().unwrap();
        dec.finish().unwrap();
        out
    }

    // # 1. Boundaries

    #[test]
    fn integer_boundaries() {
        for v in [i8::MIN, -1, 0, i8::MAX] {
            assert_eq!(typed_round_trip(v), v);
        }
        for v in [i16::MIN, 0, i16::MAX] {
            assert_eq!(typed_round_trip(v), v);
        }
        for v in [u16::MIN, 0xD800, u16::MAX] {
            assert_eq!(typed_round_trip(v), v);
        }
        for v in [i32::MIN, -1, 0, i32::MAX] {
            assert_eq!(typed_round_trip(v), v);
        }
        for v in [i64::MIN, -1, 0, i64::MAX] {
            assert_eq!(typed_round_trip(v), v);
        }
    }

    #[test]
    fn float_bit_patterns_survive() {
        for v in [0.0f32, -0.0, f32::MIN_POSITIVE, f32::MAX, f32::INFINITY] {
            assert_eq!(typed_round_trip(v).to_bits(), v.to_bits());
        }
        for v in [0.0f64, -0.0, f64::MIN, f64::EPSILON, f64::NEG_INFINITY] {
            assert_eq!(typed_round_trip(v).to_bits(), v.to_bits());
        }
        let nan = f64::from_bits(0x7ff8_0000_dead_beef);
        assert_eq!(typed_round_trip(nan).to_bits(), nan.to_bits());
    }

    #[test]
    fn bigint_boundaries() {
        let big: BigInt = BigInt::from(1u8) << 200;
        for v in [
            BigInt::from(0),
            BigInt::from(-1),
            BigInt::from(127),
            BigInt::from(128),
            BigInt::from(-128),
            BigInt::from(-129),
            big.clone(),
            -big,
        ] {
            assert_eq!(typed_round_trip(v.clone()), v);
        }
    }

    #[test]
    fn zero_bigint_is_empty_payload() {
        let mut meter = Unmetered::default();
        let bytes = encode_value(&Value::BigInt(BigInt::from(0)), &mut meter).unwrap();
        assert_eq!(hex::encode(bytes), "0900");
    }

    #[test]
    fn empty_payloads() {
        assert_eq!(typed_round_trip(String::new()), "");
        assert_eq!(typed_round_trip(Vec::<u8>::new()), Vec::<u8>::new());
        assert_eq!(round_trip(&Value::List(vec![])), Value::List(vec![]));
        assert_eq!(round_trip(&Value::Map(vec![])), Value::Map(vec![]));
    }

    #[test]
    fn zero_length_known_list_layout() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Known(0)).unwrap();
        enc.end().unwrap();
        assert_eq!(hex::encode(enc.finish().unwrap()), "10001e");
    }

    #[test]
    fn address_round_trip() {
        let mut raw = [0u8; Address::LEN];
        raw[0] = 0x01;
        raw[20] = 0xff;
        let addr = Address::new(raw);
        assert_eq!(typed_round_trip(addr), addr);
        assert!(Address::from_slice(&raw[..20]).is_err());
    }

    #[test]
    fn unicode_string_round_trip() {
        let s = String::from("grüße, 世界 🚀");
        assert_eq!(typed_round_trip(s.clone()), s);
    }

    // # 2. Nesting

    #[test]
    fn null_nested_three_deep() {
        let v = Value::List(vec![Value::Map(vec![(
            Value::from("k"),
            Value::List(vec![Value::Null, Value::Int(3), Value::Null]),
        )])]);
        assert_eq!(round_trip(&v), v);
    }

    #[test]
    fn map_keeps_wire_order_and_duplicates() {
        let v = Value::Map(vec![
            (Value::Int(2), Value::from("b")),
            (Value::Int(1), Value::from("a")),
            (Value::Int(2), Value::Null),
        ]);
        assert_eq!(round_trip(&v), v);
    }

    #[test]
    fn nullable_values_read_back_as_values() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Known(3)).unwrap();
        enc.write_nullable(Some(&7i64)).unwrap();
        enc.write_nullable::<i64>(None).unwrap();
        enc.write_nullable(Some("x")).unwrap();
        enc.end().unwrap();
        let bytes = enc.finish().unwrap();

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        assert_eq!(dec.read_nullable::<Value>().unwrap(), Some(Value::Long(7)));
        assert_eq!(dec.read_nullable::<Value>().unwrap(), None);
        assert_eq!(dec.read_nullable::<Value>().unwrap(), Some(Value::from("x")));
        dec.end().unwrap();
        dec.finish().unwrap();

        // The plain dynamic path does not accept presence markers.
        let mut meter = Unmetered::default();
        assert_eq!(
            decode_value(&bytes, &mut meter),
            Err(CodecError::NullabilityViolation { found: Tag::Present })
        );
    }

    #[test]
    fn list_helpers_round_trip() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Known(2)).unwrap();
        enc.write_list_of(&[1i32, 2, 3]).unwrap();
        enc.write_list_of_nullable(&[Some(true), None]).unwrap();
        enc.end().unwrap();
        let bytes = enc.finish().unwrap();

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();

        assert_eq!(dec.begin_list().unwrap(), Length::Known(3));
        let mut ints = Vec::new();
        while dec.has_next().unwrap() {
            ints.push(dec.read::<i32>().unwrap());
        }
        dec.end().unwrap();
        assert_eq!(ints, [1, 2, 3]);

        dec.begin_list().unwrap();
        assert_eq!(dec.read_nullable::<bool>().unwrap(), Some(true));
        assert_eq!(dec.read_nullable::<bool>().unwrap(), None);
        dec.end().unwrap();

        dec.end().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn write_all_fills_an_open_frame() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.begin_list(Length::Known(4)).unwrap();
        enc.write_all(&["a", "b"]).unwrap();
        enc.write_all_nullable(&[None, Some(9i16)]).unwrap();
        enc.end().unwrap();
        let bytes = enc.finish().unwrap();

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        assert_eq!(dec.begin_list().unwrap(), Length::Known(4));
        assert_eq!(dec.read::<String>().unwrap(), "a");
        assert_eq!(dec.read::<String>().unwrap(), "b");
        assert_eq!(dec.read_nullable::<i16>().unwrap(), None);
        assert_eq!(dec.read_nullable::<i16>().unwrap(), Some(9));
        dec.end().unwrap();
        dec.finish().unwrap();
    }

    // # 3. Composites inside containers

    fn pair_schema() -> RecordSchema {
        RecordSchema::new(vec![FieldType::Scalar(ValueKind::Int); 2])
    }

    fn pair(a: i32, b: i32) -> Value {
        Value::Composite(vec![Value::Int(a), Value::Int(b)])
    }

    #[test]
    fn list_of_composites_counts_wire_values() {
        let v = Value::List(vec![pair(1, 2), pair(3, 4)]);
        assert_eq!(v.wire_width(), 1);
        assert_eq!(pair(1, 2).wire_width(), 2);

        let mut meter = Unmetered::default();
        let bytes = encode_value(&v, &mut meter).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "100405000000010500000002050000000305000000041e"
        );

        // Through the schema the composites come back whole.
        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        assert_eq!(dec.begin_list().unwrap(), Length::Known(4));
        let mut out = Vec::new();
        while dec.has_next().unwrap() {
            out.push(Value::Composite(dec.read_object(&pair_schema()).unwrap()));
        }
        dec.end().unwrap();
        dec.finish().unwrap();
        assert_eq!(Value::List(out), v);

        // Without one the fields are spliced into the list.
        assert_eq!(round_trip(&v), Value::List((1..=4).map(Value::Int).collect()));

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.skip().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn list_helper_takes_composite_values() {
        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.write_list_of(&[pair(1, 2), Value::Int(5)]).unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(bytes[..2], [Tag::List.to_u8(), 3]);

        let mut meter = Unmetered::default();
        let mut enc = Encoder::new(&mut meter);
        enc.write_list_of_nullable(&[Some(pair(1, 2)), None]).unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(bytes[..3], [Tag::List.to_u8(), 3, Tag::Present.to_u8()]);

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.begin_list().unwrap();
        assert_eq!(
            dec.read_nullable_object(&pair_schema()).unwrap(),
            Some(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(dec.read_nullable_object(&pair_schema()).unwrap(), None);
        dec.end().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn map_with_composite_entries() {
        // Key plus a three-field composite is four wire values, two declared pairs.
        let v = Value::Map(vec![(
            Value::from("k"),
            Value::Composite(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        )]);
        let mut meter = Unmetered::default();
        let bytes = encode_value(&v, &mut meter).unwrap();
        assert_eq!(bytes[..2], [Tag::Map.to_u8(), 2]);

        let mut meter = Unmetered::default();
        let mut dec = Decoder::new(&bytes, &mut meter);
        dec.skip().unwrap();
        dec.finish().unwrap();

        let odd = Value::Map(vec![(Value::Int(0), pair(1, 2))]);
        let mut meter = Unmetered::default();
        assert!(matches!(encode_value(&odd, &mut meter), Err(CodecError::FrameImbalance(_))));
    }

    // # 4. Generated trees

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i8>().prop_map(Value::Byte),
            any::<i16>().prop_map(Value::Short),
            any::<u16>().prop_map(Value::Char),
            any::<i32>().prop_map(Value::Int),
            (-1.0e6f32..1.0e6f32).prop_map(Value::Float),
            any::<i64>().prop_map(Value::Long),
            (-1.0e12f64..1.0e12f64).prop_map(Value::Double),
            any::<i128>().prop_map(|v| Value::BigInt(BigInt::from(v))),
            ".{0,12}".prop_map(Value::String),
            proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            proptest::array::uniform21(any::<u8>()).prop_map(|a| Value::Address(Address::new(a))),
            Just(Value::Null),
        ]
    }

    // Composites only appear as list items, so map entries stay one wire value each.
    fn arb_value() -> impl Strategy<Value = Value> {
        arb_scalar().prop_recursive(6, 64, 4, |inner| {
            let item = prop_oneof![
                3 => inner.clone(),
                1 => proptest::collection::vec(inner.clone(), 1..4).prop_map(Value::Composite),
            ];
            prop_oneof![
                proptest::collection::vec(item, 0..4).prop_map(Value::List),
                proptest::collection::vec((inner.clone(), inner), 0..3).prop_map(Value::Map),
            ]
        })
    }

    /// What a schema-less read yields: composite fields spliced into their list.
    fn spliced(v: &Value) -> Value {
        fn push(v: &Value, out: &mut Vec<Value>) {
            match v {
                Value::Composite(fields) => fields.iter().for_each(|f| push(f, out)),
                other => out.push(spliced(other)),
            }
        }
        match v {
            Value::List(items) => {
                let mut out = Vec::new();
                items.iter().for_each(|item| push(item, &mut out));
                Value::List(out)
            }
            Value::Map(entries) => Value::Map(entries.iter().map(|(k, v)| (spliced(k), spliced(v))).collect()),
            other => other.clone(),
        }
    }

    proptest! {
        #[test]
        fn generated_values_round_trip(v in arb_value()) {
            prop_assert_eq!(round_trip(&v), spliced(&v));
        }

        #[test]
        fn generated_values_skip_whole(v in arb_value()) {
            let mut meter = Unmetered::default();
            let bytes = encode_value(&v, &mut meter).unwrap();
            let mut dec = Decoder::new(&bytes, &mut meter);
            dec.skip().unwrap();
            prop_assert_eq!(dec.finish().unwrap().bytes_skipped, bytes.len() as u64);
        }

        #[test]
        fn encoding_is_canonical(v in arb_value()) {
            let mut meter = Unmetered::default();
            let first = encode_value(&v, &mut meter).unwrap();
            let decoded = decode_value(&first, &mut meter).unwrap();
            let second = encode_value(&decoded, &mut meter).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
