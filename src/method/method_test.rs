use super::*;
use crate::ids;
use crate::value_rank;
use crate::Array;
use crate::DataKind;
use crate::Scalar;
use crate::ValueError;
use crate::Variant;

#[test]
fn scalar_argument_checks_type_and_rank() {
    let arg = Argument::new("count", ids::INT32);

    assert!(arg.check(&Variant::from(3)).is_ok());
    assert!(matches!(
        arg.check(&Variant::from("3")),
        Err(ValueError::TypeMismatch { .. })
    ));
    assert!(arg.check(&Variant::from(vec![1, 2])).is_err());
}

#[test]
fn any_argument_accepts_everything() {
    let arg = Argument::any("blob");

    assert!(arg.check(&Variant::from("text")).is_ok());
    assert!(arg.check(&Variant::from(vec![1.0f64, 2.0])).is_ok());
    assert!(arg.check(&Variant::Empty).is_ok());
}

#[test]
fn array_argument_requires_one_dimension() {
    let arg = Argument::new("samples", ids::DOUBLE).with_value_rank(value_rank::ONE_DIMENSION);

    assert!(arg.check(&Variant::from(vec![1.0f64, 2.0])).is_ok());
    assert!(arg.check(&Variant::from(1.0f64)).is_err());

    let values = [1.0f64, 2.0, 3.0, 4.0].into_iter().map(Scalar::Double).collect();
    let matrix = Array::new(DataKind::Double, values)
        .and_then(|a| a.with_dimensions(vec![2, 2]))
        .unwrap();
    assert!(arg.check(&Variant::from(matrix)).is_err());
}

#[test]
fn arity_signature_names_placeholders() {
    let signature = MethodSignature::with_arity(2, 1);

    assert_eq!(signature.input_count(), 2);
    assert_eq!(signature.output_count(), 1);
    assert_eq!(signature.inputs[1].name, "Input2");
    assert_eq!(signature.outputs[0].name, "Output1");
    assert_eq!(signature.inputs[0].value_rank, value_rank::ANY);
}

#[test]
fn argument_description_is_kept() {
    let arg = Argument::new("unit", ids::STRING).with_description("engineering unit");

    assert_eq!(arg.description.text, "engineering unit");
}
