use super::*;
use crate::ids;
use crate::AddressSpaceError;
use crate::Error;
use crate::LocalizedText;
use crate::NodeId;
use crate::QualifiedName;
use crate::ValueError;
use crate::Variant;

fn variable(attributes: VariableAttributes) -> Node {
    Node::new(
        NodeId::string(1, "Count"),
        QualifiedName::new(1, "Count"),
        NodeAttributes::Variable(attributes),
    )
}

#[test]
fn new_node_uses_browse_name_as_display_name() {
    let node = variable(VariableAttributes::new(1i32));

    assert_eq!(node.display_name, LocalizedText::from("Count"));
    assert_eq!(node.node_class(), NodeClass::Variable);
    assert!(node.references.is_empty());
    assert!(node.context.is_none());
}

#[test]
fn read_common_and_class_attributes() {
    let node = variable(VariableAttributes::new(7i32));

    assert_eq!(
        node.read_attribute(AttributeId::NodeId).unwrap(),
        Variant::from(NodeId::string(1, "Count"))
    );
    assert_eq!(
        node.read_attribute(AttributeId::NodeClass).unwrap(),
        Variant::from(NodeClass::Variable as i32)
    );
    assert_eq!(node.read_attribute(AttributeId::Value).unwrap(), Variant::from(7i32));
    assert_eq!(node.read_attribute(AttributeId::DataType).unwrap(), Variant::from(ids::INT32));
}

#[test]
fn read_attribute_of_other_class_is_not_applicable() {
    let node = variable(VariableAttributes::new(7i32));

    let err = node.read_attribute(AttributeId::Executable).unwrap_err();

    assert_eq!(
        err,
        AddressSpaceError::AttributeNotApplicable {
            node_id: NodeId::string(1, "Count"),
            attribute: AttributeId::Executable,
        }
    );
}

#[test]
fn write_then_read_value_round_trips() {
    let mut node = variable(VariableAttributes::new(1i32));

    node.write_attribute(AttributeId::Value, &Variant::from(42i32)).unwrap();

    assert_eq!(node.read_attribute(AttributeId::Value).unwrap(), Variant::from(42i32));
    assert_eq!(node.value(), Some(&Variant::from(42i32)));
}

#[test]
fn write_value_with_wrong_kind_is_type_mismatch() {
    let mut node = variable(VariableAttributes::new(1i32));

    let err = node
        .write_attribute(AttributeId::Value, &Variant::from("text"))
        .unwrap_err();

    assert!(matches!(err, Error::Value(ValueError::TypeMismatch { .. })));
    assert_eq!(node.value(), Some(&Variant::from(1i32)));
}

#[test]
fn write_value_to_base_data_type_accepts_any_kind() {
    let mut node = variable(VariableAttributes::new(Variant::Empty));

    node.write_attribute(AttributeId::Value, &Variant::from("text")).unwrap();
    node.write_attribute(AttributeId::Value, &Variant::from(2.5f64)).unwrap();

    assert_eq!(node.value(), Some(&Variant::from(2.5f64)));
}

#[test]
fn write_value_checks_value_rank() {
    let mut node = variable(VariableAttributes::new(1i32).with_value_rank(value_rank::SCALAR));

    let err = node
        .write_attribute(AttributeId::Value, &Variant::from(vec![1i32, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, Error::Value(ValueError::TypeMismatch { .. })));

    let mut node = variable(VariableAttributes::new(vec![1i32]).with_value_rank(value_rank::ONE_DIMENSION));
    node.write_attribute(AttributeId::Value, &Variant::from(vec![4i32, 5])).unwrap();
    assert!(node.write_attribute(AttributeId::Value, &Variant::from(4i32)).is_err());
}

#[test]
fn write_value_requires_write_access() {
    let mut node = variable(VariableAttributes::new(1i32).read_only());

    let err = node
        .write_attribute(AttributeId::Value, &Variant::from(2i32))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AddressSpace(AddressSpaceError::AccessDenied { .. })
    ));
}

#[test]
fn node_id_and_class_are_immutable() {
    let mut node = variable(VariableAttributes::new(1i32));

    assert!(node
        .write_attribute(AttributeId::NodeId, &Variant::from(NodeId::numeric(1, 1)))
        .is_err());
    assert!(node.write_attribute(AttributeId::NodeClass, &Variant::from(1i32)).is_err());
    assert_eq!(node.node_id, NodeId::string(1, "Count"));
}

#[test]
fn write_browse_name_and_access_level() {
    let mut node = variable(VariableAttributes::new(1i32));

    node.write_attribute(AttributeId::BrowseName, &Variant::from(QualifiedName::new(1, "Total")))
        .unwrap();
    node.write_attribute(AttributeId::AccessLevel, &Variant::from(access_level::CURRENT_READ))
        .unwrap();

    assert_eq!(node.browse_name, QualifiedName::new(1, "Total"));
    assert!(node.write_attribute(AttributeId::Value, &Variant::from(3i32)).is_err());
}

#[test]
fn method_executable_flag() {
    let mut node = Node::new(
        NodeId::numeric(1, 9),
        QualifiedName::new(1, "Add"),
        MethodAttributes::default().into(),
    );

    assert_eq!(node.read_attribute(AttributeId::Executable).unwrap(), Variant::from(true));
    node.write_attribute(AttributeId::Executable, &Variant::from(false)).unwrap();
    assert_eq!(node.read_attribute(AttributeId::Executable).unwrap(), Variant::from(false));
    assert!(node.read_attribute(AttributeId::Value).is_err());
}

#[test]
fn write_mask_gates_everything_but_variable_values() {
    let mut node = variable(VariableAttributes::new(1i32));

    assert!(node.check_write_mask(AttributeId::Value).is_ok());
    assert!(matches!(
        node.check_write_mask(AttributeId::AccessLevel),
        Err(Error::AddressSpace(AddressSpaceError::AccessDenied { .. }))
    ));
    assert!(node.check_write_mask(AttributeId::WriteMask).is_err());

    node.write_mask = write_mask::ACCESS_LEVEL | write_mask::DISPLAY_NAME;
    assert!(node.check_write_mask(AttributeId::AccessLevel).is_ok());
    assert!(node.check_write_mask(AttributeId::DisplayName).is_ok());
    assert!(node.check_write_mask(AttributeId::BrowseName).is_err());
}

#[test]
fn variable_type_value_has_its_own_mask_bit() {
    assert_eq!(AttributeId::Value.write_mask_bit(NodeClass::Variable), None);
    assert_eq!(
        AttributeId::Value.write_mask_bit(NodeClass::VariableType),
        Some(write_mask::VALUE_FOR_VARIABLE_TYPE)
    );
    assert_eq!(
        AttributeId::WriteMask.write_mask_bit(NodeClass::Object),
        Some(write_mask::WRITE_MASK)
    );
}
