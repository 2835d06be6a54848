use crate::access_level;
use crate::ids;
use crate::value_rank;
use crate::AddressSpaceError;
use crate::AttributeId;
use crate::ContextHandle;
use crate::DataKind;
use crate::LocalizedText;
use crate::NodeAttributes;
use crate::NodeClass;
use crate::NodeId;
use crate::Operation;
use crate::QualifiedName;
use crate::Reference;
use crate::Result;
use crate::ValueError;
use crate::Variant;

/// An address space entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_id: NodeId,
    pub browse_name: QualifiedName,
    pub display_name: LocalizedText,
    pub description: LocalizedText,
    pub write_mask: u32,
    pub attributes: NodeAttributes,
    pub references: Vec<Reference>,
    /// Handle into the externally owned context registry; never owning.
    pub context: Option<ContextHandle>,
}

impl Node {
    pub fn new(
        node_id: NodeId,
        browse_name: QualifiedName,
        attributes: NodeAttributes,
    ) -> Self {
        Self {
            node_id,
            display_name: LocalizedText::new("", browse_name.name.clone()),
            browse_name,
            description: LocalizedText::default(),
            write_mask: 0,
            attributes,
            references: Vec::new(),
            context: None,
        }
    }

    pub fn node_class(&self) -> NodeClass {
        self.attributes.node_class()
    }

    /// Forward references of exactly `reference_type_id`
    pub fn forward_references<'a>(
        &'a self,
        reference_type_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Reference> + 'a {
        self.references
            .iter()
            .filter(move |r| r.is_forward && &r.reference_type_id == reference_type_id)
    }

    pub fn has_reference(
        &self,
        reference: &Reference,
    ) -> bool {
        self.references.contains(reference)
    }

    /// Current value of a Variable or VariableType
    pub fn value(&self) -> Option<&Variant> {
        match &self.attributes {
            NodeAttributes::Variable(v) => Some(&v.value),
            NodeAttributes::VariableType(v) => Some(&v.value),
            _ => None,
        }
    }

    pub fn read_attribute(
        &self,
        attribute: AttributeId,
    ) -> std::result::Result<Variant, AddressSpaceError> {
        let value = match (attribute, &self.attributes) {
            (AttributeId::NodeId, _) => self.node_id.clone().into(),
            (AttributeId::NodeClass, _) => (self.node_class() as i32).into(),
            (AttributeId::BrowseName, _) => self.browse_name.clone().into(),
            (AttributeId::DisplayName, _) => self.display_name.clone().into(),
            (AttributeId::Description, _) => self.description.clone().into(),
            (AttributeId::WriteMask, _) => self.write_mask.into(),

            (AttributeId::EventNotifier, NodeAttributes::Object(a)) => a.event_notifier.into(),

            (AttributeId::Value, NodeAttributes::Variable(a)) => a.value.clone(),
            (AttributeId::DataType, NodeAttributes::Variable(a)) => a.data_type.clone().into(),
            (AttributeId::ValueRank, NodeAttributes::Variable(a)) => a.value_rank.into(),
            (AttributeId::ArrayDimensions, NodeAttributes::Variable(a)) => a.array_dimensions.clone().into(),
            (AttributeId::AccessLevel, NodeAttributes::Variable(a)) => a.access_level.into(),
            (AttributeId::MinimumSamplingInterval, NodeAttributes::Variable(a)) => {
                a.minimum_sampling_interval.into()
            }
            (AttributeId::Historizing, NodeAttributes::Variable(a)) => a.historizing.into(),

            (AttributeId::Executable, NodeAttributes::Method(a)) => a.executable.into(),

            (AttributeId::IsAbstract, NodeAttributes::ObjectType(a)) => a.is_abstract.into(),

            (AttributeId::Value, NodeAttributes::VariableType(a)) => a.value.clone(),
            (AttributeId::DataType, NodeAttributes::VariableType(a)) => a.data_type.clone().into(),
            (AttributeId::ValueRank, NodeAttributes::VariableType(a)) => a.value_rank.into(),
            (AttributeId::ArrayDimensions, NodeAttributes::VariableType(a)) => a.array_dimensions.clone().into(),
            (AttributeId::IsAbstract, NodeAttributes::VariableType(a)) => a.is_abstract.into(),

            (AttributeId::IsAbstract, NodeAttributes::ReferenceType(a)) => a.is_abstract.into(),
            (AttributeId::Symmetric, NodeAttributes::ReferenceType(a)) => a.symmetric.into(),
            (AttributeId::InverseName, NodeAttributes::ReferenceType(a)) => a.inverse_name.clone().into(),

            (AttributeId::IsAbstract, NodeAttributes::DataType(a)) => a.is_abstract.into(),

            (AttributeId::ContainsNoLoops, NodeAttributes::View(a)) => a.contains_no_loops.into(),
            (AttributeId::EventNotifier, NodeAttributes::View(a)) => a.event_notifier.into(),

            _ => return Err(self.not_applicable(attribute)),
        };
        Ok(value)
    }

    /// Refuses a remote write of an attribute whose WriteMask bit is clear.
    pub fn check_write_mask(
        &self,
        attribute: AttributeId,
    ) -> Result<()> {
        match attribute.write_mask_bit(self.node_class()) {
            Some(bit) if self.write_mask & bit == 0 => Err(AddressSpaceError::AccessDenied {
                operation: Operation::WriteAttribute,
                node_id: self.node_id.clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Writes one attribute. The Value attribute is checked against the
    /// node's DataType, ValueRank and AccessLevel.
    pub fn write_attribute(
        &mut self,
        attribute: AttributeId,
        value: &Variant,
    ) -> Result<()> {
        match (attribute, &mut self.attributes) {
            (AttributeId::NodeId | AttributeId::NodeClass, _) => {
                return Err(AddressSpaceError::AccessDenied {
                    operation: Operation::WriteAttribute,
                    node_id: self.node_id.clone(),
                }
                .into())
            }
            (AttributeId::BrowseName, _) => self.browse_name = value.get()?,
            (AttributeId::DisplayName, _) => self.display_name = value.get()?,
            (AttributeId::Description, _) => self.description = value.get()?,
            (AttributeId::WriteMask, _) => self.write_mask = value.get()?,

            (AttributeId::EventNotifier, NodeAttributes::Object(a)) => a.event_notifier = value.get()?,

            (AttributeId::Value, NodeAttributes::Variable(a)) => {
                if a.access_level & access_level::CURRENT_WRITE == 0 {
                    return Err(AddressSpaceError::AccessDenied {
                        operation: Operation::WriteAttribute,
                        node_id: self.node_id.clone(),
                    }
                    .into());
                }
                check_value(&a.data_type, a.value_rank, value)?;
                a.value = value.clone();
            }
            (AttributeId::DataType, NodeAttributes::Variable(a)) => a.data_type = value.get()?,
            (AttributeId::ValueRank, NodeAttributes::Variable(a)) => a.value_rank = value.get()?,
            (AttributeId::ArrayDimensions, NodeAttributes::Variable(a)) => a.array_dimensions = dimensions(value)?,
            (AttributeId::AccessLevel, NodeAttributes::Variable(a)) => a.access_level = value.get()?,
            (AttributeId::MinimumSamplingInterval, NodeAttributes::Variable(a)) => {
                a.minimum_sampling_interval = value.get()?
            }
            (AttributeId::Historizing, NodeAttributes::Variable(a)) => a.historizing = value.get()?,

            (AttributeId::Executable, NodeAttributes::Method(a)) => a.executable = value.get()?,

            (AttributeId::IsAbstract, NodeAttributes::ObjectType(a)) => a.is_abstract = value.get()?,

            (AttributeId::Value, NodeAttributes::VariableType(a)) => {
                check_value(&a.data_type, a.value_rank, value)?;
                a.value = value.clone();
            }
            (AttributeId::DataType, NodeAttributes::VariableType(a)) => a.data_type = value.get()?,
            (AttributeId::ValueRank, NodeAttributes::VariableType(a)) => a.value_rank = value.get()?,
            (AttributeId::ArrayDimensions, NodeAttributes::VariableType(a)) => {
                a.array_dimensions = dimensions(value)?
            }
            (AttributeId::IsAbstract, NodeAttributes::VariableType(a)) => a.is_abstract = value.get()?,

            (AttributeId::IsAbstract, NodeAttributes::ReferenceType(a)) => a.is_abstract = value.get()?,
            (AttributeId::Symmetric, NodeAttributes::ReferenceType(a)) => a.symmetric = value.get()?,
            (AttributeId::InverseName, NodeAttributes::ReferenceType(a)) => a.inverse_name = value.get()?,

            (AttributeId::IsAbstract, NodeAttributes::DataType(a)) => a.is_abstract = value.get()?,

            (AttributeId::ContainsNoLoops, NodeAttributes::View(a)) => a.contains_no_loops = value.get()?,
            (AttributeId::EventNotifier, NodeAttributes::View(a)) => a.event_notifier = value.get()?,

            _ => {
                return Err(AddressSpaceError::AttributeNotApplicable {
                    node_id: self.node_id.clone(),
                    attribute,
                }
                .into())
            }
        }
        Ok(())
    }

    fn not_applicable(
        &self,
        attribute: AttributeId,
    ) -> AddressSpaceError {
        AddressSpaceError::AttributeNotApplicable {
            node_id: self.node_id.clone(),
            attribute,
        }
    }
}

fn dimensions(value: &Variant) -> std::result::Result<Vec<u32>, ValueError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value.get_array::<u32>()
}

/// Checks a new Value against the declared DataType and ValueRank.
/// An empty variant is always accepted.
pub(crate) fn check_value(
    data_type: &NodeId,
    rank: i32,
    value: &Variant,
) -> std::result::Result<(), ValueError> {
    let Some(kind) = value.kind() else {
        return Ok(());
    };

    if *data_type != ids::BASE_DATA_TYPE && DataKind::from_data_type_id(data_type) != Some(kind) {
        return Err(ValueError::TypeMismatch {
            expected: DataKind::from_data_type_id(data_type)
                .map(|k| k.name().to_string())
                .unwrap_or_else(|| data_type.to_string()),
            actual: kind.name().to_string(),
        });
    }

    let actual = value.value_rank();
    let rank_ok = match rank {
        value_rank::ANY => true,
        value_rank::SCALAR_OR_ONE_DIMENSION => actual <= 1,
        value_rank::SCALAR => actual == value_rank::SCALAR,
        value_rank::ONE_OR_MORE_DIMENSIONS => actual >= 1,
        n => actual == n,
    };
    if !rank_ok {
        return Err(ValueError::TypeMismatch {
            expected: format!("{} with value rank {rank}", kind.name()),
            actual: format!("{} with value rank {actual}", kind.name()),
        });
    }
    Ok(())
}
