use uuid::Uuid;

use super::*;
use crate::ValueError;

#[test]
fn scalar_round_trips_through_clone() {
    let cases: Vec<Variant> = vec![
        true.into(),
        (-3i8).into(),
        7u8.into(),
        (-300i16).into(),
        300u16.into(),
        42i32.into(),
        42u32.into(),
        (-1i64).into(),
        u64::MAX.into(),
        1.5f32.into(),
        2.25f64.into(),
        "text".into(),
        DateTime::from_ticks(1234).into(),
        Uuid::new_v4().into(),
        Variant::from(&b"bytes"[..]),
        NodeId::string(1, "n").into(),
        StatusCode::BAD_NO_MATCH.into(),
        QualifiedName::new(1, "q").into(),
        LocalizedText::new("en", "hello").into(),
    ];

    for v in cases {
        let copy = v.clone();
        assert_eq!(copy, v);
        assert_eq!(copy.kind(), v.kind());
        assert_eq!(copy.value_rank(), -1);
    }
}

#[test]
fn typed_get_matches_kind() {
    let v = Variant::from(42i32);
    assert_eq!(v.get::<i32>().unwrap(), 42);
    assert_eq!(v.data_type_id(), Some(ids::INT32));
    assert_eq!(v.to_i64().unwrap(), 42);
    assert_eq!(v.to_f64().unwrap(), 42.0);
}

#[test]
fn typed_get_mismatch_is_an_error() {
    let v = Variant::from(42i32);
    match v.get::<String>() {
        Err(ValueError::TypeMismatch { expected, actual }) => {
            assert_eq!(expected, "String");
            assert_eq!(actual, "Int32");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(v.get::<u32>().is_err());
    assert!(v.get_array::<i32>().is_err());
    assert!(Variant::Empty.get::<bool>().is_err());
    assert!(Variant::from("x").to_i64().is_err());
}

#[test]
fn arrays_keep_kind_and_dimensions() {
    let v = Variant::from(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(v.is_array());
    assert_eq!(v.array_dimensions(), vec![6]);
    assert_eq!(v.value_rank(), 1);
    assert_eq!(v.get_array::<f64>().unwrap().len(), 6);

    let matrix = Array::new(DataKind::Double, v.as_array().unwrap().values().to_vec())
        .unwrap()
        .with_dimensions(vec![2, 3])
        .unwrap();
    let m: Variant = matrix.into();
    assert_eq!(m.array_dimensions(), vec![2, 3]);
    assert_eq!(m.value_rank(), 2);
    assert_eq!(m.clone(), m);
}

#[test]
fn arrays_must_be_homogeneous() {
    let result = Array::new(DataKind::Int32, vec![Scalar::Int32(1), Scalar::Double(2.0)]);
    assert!(matches!(result, Err(ValueError::NotHomogeneous { .. })));
}

#[test]
fn dimensions_must_cover_elements() {
    let array = Array::new(DataKind::Int32, vec![Scalar::Int32(1), Scalar::Int32(2)]).unwrap();
    assert!(matches!(
        array.clone().with_dimensions(vec![3]),
        Err(ValueError::DimensionMismatch { .. })
    ));
    assert!(array.with_dimensions(vec![]).is_err());
}

#[test]
fn byte_string_and_byte_array_are_distinct() {
    let bytes = Variant::from(&b"ab"[..]);
    let array = Variant::from(vec![1u8, 2u8]);
    assert_eq!(bytes.kind(), Some(DataKind::ByteString));
    assert_eq!(array.kind(), Some(DataKind::Byte));
    assert_eq!(bytes.get::<Vec<u8>>().unwrap(), b"ab".to_vec());
}

#[test]
fn empty_variant_has_no_type() {
    let v = Variant::default();
    assert!(v.is_empty());
    assert_eq!(v.kind(), None);
    assert_eq!(v.data_type_id(), None);
    assert_eq!(v.type_name(), "Null");
}

#[test]
fn data_kind_ids_are_unique() {
    for kind in DataKind::ALL {
        assert_eq!(DataKind::from_data_type_id(&kind.data_type_id()), Some(kind));
    }
    assert_eq!(DataKind::from_data_type_id(&ids::BASE_DATA_TYPE), None);
}
