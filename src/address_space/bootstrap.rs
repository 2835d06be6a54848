//! Namespace 0 nodes every address space starts with.

use super::AddressSpace;
use crate::ids;
use crate::DataKind;
use crate::DataTypeAttributes;
use crate::LocalizedText;
use crate::Node;
use crate::NodeAttributes;
use crate::NodeId;
use crate::ObjectAttributes;
use crate::ObjectTypeAttributes;
use crate::QualifiedName;
use crate::ReferenceTypeAttributes;
use crate::VariableTypeAttributes;

/// (id, name, inverse name, supertype, abstract, symmetric)
const REFERENCE_TYPES: &[(NodeId, &str, &str, Option<NodeId>, bool, bool)] = &[
    (ids::REFERENCES, "References", "", None, true, true),
    (
        ids::HIERARCHICAL_REFERENCES,
        "HierarchicalReferences",
        "InverseHierarchicalReferences",
        Some(ids::REFERENCES),
        true,
        false,
    ),
    (
        ids::NON_HIERARCHICAL_REFERENCES,
        "NonHierarchicalReferences",
        "",
        Some(ids::REFERENCES),
        true,
        true,
    ),
    (ids::HAS_CHILD, "HasChild", "ChildOf", Some(ids::HIERARCHICAL_REFERENCES), true, false),
    (ids::ORGANIZES, "Organizes", "OrganizedBy", Some(ids::HIERARCHICAL_REFERENCES), false, false),
    (
        ids::HAS_EVENT_SOURCE,
        "HasEventSource",
        "EventSourceOf",
        Some(ids::HIERARCHICAL_REFERENCES),
        false,
        false,
    ),
    (ids::AGGREGATES, "Aggregates", "AggregatedBy", Some(ids::HAS_CHILD), true, false),
    (ids::HAS_SUBTYPE, "HasSubtype", "SubtypeOf", Some(ids::HAS_CHILD), false, false),
    (ids::HAS_PROPERTY, "HasProperty", "PropertyOf", Some(ids::AGGREGATES), false, false),
    (ids::HAS_COMPONENT, "HasComponent", "ComponentOf", Some(ids::AGGREGATES), false, false),
    (
        ids::HAS_ORDERED_COMPONENT,
        "HasOrderedComponent",
        "OrderedComponentOf",
        Some(ids::HAS_COMPONENT),
        false,
        false,
    ),
    (ids::HAS_NOTIFIER, "HasNotifier", "NotifierOf", Some(ids::HAS_EVENT_SOURCE), false, false),
    (
        ids::HAS_MODELLING_RULE,
        "HasModellingRule",
        "ModellingRuleOf",
        Some(ids::NON_HIERARCHICAL_REFERENCES),
        false,
        false,
    ),
    (
        ids::HAS_TYPE_DEFINITION,
        "HasTypeDefinition",
        "TypeDefinitionOf",
        Some(ids::NON_HIERARCHICAL_REFERENCES),
        false,
        false,
    ),
];

/// (id, name, parent)
const FOLDERS: &[(NodeId, &str, Option<NodeId>)] = &[
    (ids::ROOT_FOLDER, "Root", None),
    (ids::OBJECTS_FOLDER, "Objects", Some(ids::ROOT_FOLDER)),
    (ids::TYPES_FOLDER, "Types", Some(ids::ROOT_FOLDER)),
    (ids::VIEWS_FOLDER, "Views", Some(ids::ROOT_FOLDER)),
    (ids::OBJECT_TYPES_FOLDER, "ObjectTypes", Some(ids::TYPES_FOLDER)),
    (ids::VARIABLE_TYPES_FOLDER, "VariableTypes", Some(ids::TYPES_FOLDER)),
    (ids::DATA_TYPES_FOLDER, "DataTypes", Some(ids::TYPES_FOLDER)),
    (ids::REFERENCE_TYPES_FOLDER, "ReferenceTypes", Some(ids::TYPES_FOLDER)),
];

pub(super) fn populate(space: &mut AddressSpace) {
    for (id, name, inverse_name, _, is_abstract, symmetric) in REFERENCE_TYPES {
        let attributes = ReferenceTypeAttributes {
            is_abstract: *is_abstract,
            symmetric: *symmetric,
            inverse_name: LocalizedText::from(*inverse_name),
        };
        space.insert(node(id, name, NodeAttributes::ReferenceType(attributes)));
    }
    for (id, _, _, supertype, _, _) in REFERENCE_TYPES {
        if let Some(supertype) = supertype {
            space.link(supertype, &ids::HAS_SUBTYPE, id);
        }
    }

    // Object types
    space.insert(node(
        &ids::BASE_OBJECT_TYPE,
        "BaseObjectType",
        NodeAttributes::ObjectType(ObjectTypeAttributes::default()),
    ));
    for (id, name) in [
        (ids::FOLDER_TYPE, "FolderType"),
        (ids::MODELLING_RULE_TYPE, "ModellingRuleType"),
    ] {
        space.insert(node(
            &id,
            name,
            NodeAttributes::ObjectType(ObjectTypeAttributes::default()),
        ));
        space.link(&ids::BASE_OBJECT_TYPE, &ids::HAS_SUBTYPE, &id);
    }

    // Variable types
    space.insert(node(
        &ids::BASE_VARIABLE_TYPE,
        "BaseVariableType",
        NodeAttributes::VariableType(VariableTypeAttributes {
            is_abstract: true,
            ..Default::default()
        }),
    ));
    for (id, name) in [
        (ids::BASE_DATA_VARIABLE_TYPE, "BaseDataVariableType"),
        (ids::PROPERTY_TYPE, "PropertyType"),
    ] {
        space.insert(node(
            &id,
            name,
            NodeAttributes::VariableType(VariableTypeAttributes::default()),
        ));
        space.link(&ids::BASE_VARIABLE_TYPE, &ids::HAS_SUBTYPE, &id);
    }

    // Data types
    space.insert(node(
        &ids::BASE_DATA_TYPE,
        "BaseDataType",
        NodeAttributes::DataType(DataTypeAttributes { is_abstract: true }),
    ));
    for kind in DataKind::ALL {
        let id = kind.data_type_id();
        space.insert(node(
            &id,
            kind.name(),
            NodeAttributes::DataType(DataTypeAttributes::default()),
        ));
        space.link(&ids::BASE_DATA_TYPE, &ids::HAS_SUBTYPE, &id);
    }

    // Folder skeleton
    for (id, name, parent) in FOLDERS {
        space.insert(node(id, name, NodeAttributes::Object(ObjectAttributes::default())));
        space.link(id, &ids::HAS_TYPE_DEFINITION, &ids::FOLDER_TYPE);
        if let Some(parent) = parent {
            space.link(parent, &ids::ORGANIZES, id);
        }
    }
    space.link(&ids::OBJECT_TYPES_FOLDER, &ids::ORGANIZES, &ids::BASE_OBJECT_TYPE);
    space.link(&ids::VARIABLE_TYPES_FOLDER, &ids::ORGANIZES, &ids::BASE_VARIABLE_TYPE);
    space.link(&ids::DATA_TYPES_FOLDER, &ids::ORGANIZES, &ids::BASE_DATA_TYPE);
    space.link(&ids::REFERENCE_TYPES_FOLDER, &ids::ORGANIZES, &ids::REFERENCES);

    // Server object and modelling rules
    space.insert(node(
        &ids::SERVER,
        "Server",
        NodeAttributes::Object(ObjectAttributes::default()),
    ));
    space.link(&ids::OBJECTS_FOLDER, &ids::ORGANIZES, &ids::SERVER);
    space.link(&ids::SERVER, &ids::HAS_TYPE_DEFINITION, &ids::BASE_OBJECT_TYPE);

    space.insert(node(
        &ids::MODELLING_RULE_MANDATORY,
        "Mandatory",
        NodeAttributes::Object(ObjectAttributes::default()),
    ));
    space.link(
        &ids::MODELLING_RULE_MANDATORY,
        &ids::HAS_TYPE_DEFINITION,
        &ids::MODELLING_RULE_TYPE,
    );
}

fn node(
    id: &NodeId,
    name: &str,
    attributes: NodeAttributes,
) -> Node {
    Node::new(id.clone(), QualifiedName::new(0, name), attributes)
}
