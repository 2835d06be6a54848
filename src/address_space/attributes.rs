//! Node classes, attribute ids and the class specific attribute sets used
//! when adding nodes.

use crate::ids;
use crate::LocalizedText;
use crate::NodeId;
use crate::Variant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Object = 1,
    Variable = 2,
    Method = 4,
    ObjectType = 8,
    VariableType = 16,
    ReferenceType = 32,
    DataType = 64,
    View = 128,
}

impl NodeClass {
    pub fn is_type(self) -> bool {
        matches!(
            self,
            NodeClass::ObjectType | NodeClass::VariableType | NodeClass::ReferenceType | NodeClass::DataType
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    NodeId = 1,
    NodeClass = 2,
    BrowseName = 3,
    DisplayName = 4,
    Description = 5,
    WriteMask = 6,
    IsAbstract = 8,
    Symmetric = 9,
    InverseName = 10,
    ContainsNoLoops = 11,
    EventNotifier = 12,
    Value = 13,
    DataType = 14,
    ValueRank = 15,
    ArrayDimensions = 16,
    AccessLevel = 17,
    MinimumSamplingInterval = 19,
    Historizing = 20,
    Executable = 21,
}

impl AttributeId {
    /// WriteMask bit that lets remote sessions write this attribute on a node
    /// of `node_class`. `None` for attributes the mask does not govern: a
    /// Variable's Value follows its AccessLevel instead.
    pub fn write_mask_bit(
        self,
        node_class: NodeClass,
    ) -> Option<u32> {
        let bit = match self {
            AttributeId::AccessLevel => write_mask::ACCESS_LEVEL,
            AttributeId::ArrayDimensions => write_mask::ARRAY_DIMENSIONS,
            AttributeId::BrowseName => write_mask::BROWSE_NAME,
            AttributeId::ContainsNoLoops => write_mask::CONTAINS_NO_LOOPS,
            AttributeId::DataType => write_mask::DATA_TYPE,
            AttributeId::Description => write_mask::DESCRIPTION,
            AttributeId::DisplayName => write_mask::DISPLAY_NAME,
            AttributeId::EventNotifier => write_mask::EVENT_NOTIFIER,
            AttributeId::Executable => write_mask::EXECUTABLE,
            AttributeId::Historizing => write_mask::HISTORIZING,
            AttributeId::InverseName => write_mask::INVERSE_NAME,
            AttributeId::IsAbstract => write_mask::IS_ABSTRACT,
            AttributeId::MinimumSamplingInterval => write_mask::MINIMUM_SAMPLING_INTERVAL,
            AttributeId::NodeClass => write_mask::NODE_CLASS,
            AttributeId::NodeId => write_mask::NODE_ID,
            AttributeId::Symmetric => write_mask::SYMMETRIC,
            AttributeId::ValueRank => write_mask::VALUE_RANK,
            AttributeId::WriteMask => write_mask::WRITE_MASK,
            AttributeId::Value if node_class == NodeClass::VariableType => write_mask::VALUE_FOR_VARIABLE_TYPE,
            AttributeId::Value => return None,
        };
        Some(bit)
    }
}

/// Bits of the WriteMask attribute
pub mod write_mask {
    pub const ACCESS_LEVEL: u32 = 1 << 0;
    pub const ARRAY_DIMENSIONS: u32 = 1 << 1;
    pub const BROWSE_NAME: u32 = 1 << 2;
    pub const CONTAINS_NO_LOOPS: u32 = 1 << 3;
    pub const DATA_TYPE: u32 = 1 << 4;
    pub const DESCRIPTION: u32 = 1 << 5;
    pub const DISPLAY_NAME: u32 = 1 << 6;
    pub const EVENT_NOTIFIER: u32 = 1 << 7;
    pub const EXECUTABLE: u32 = 1 << 8;
    pub const HISTORIZING: u32 = 1 << 9;
    pub const INVERSE_NAME: u32 = 1 << 10;
    pub const IS_ABSTRACT: u32 = 1 << 11;
    pub const MINIMUM_SAMPLING_INTERVAL: u32 = 1 << 12;
    pub const NODE_CLASS: u32 = 1 << 13;
    pub const NODE_ID: u32 = 1 << 14;
    pub const SYMMETRIC: u32 = 1 << 15;
    pub const VALUE_RANK: u32 = 1 << 19;
    pub const WRITE_MASK: u32 = 1 << 20;
    pub const VALUE_FOR_VARIABLE_TYPE: u32 = 1 << 21;
}

/// Bits of the AccessLevel attribute
pub mod access_level {
    pub const CURRENT_READ: u8 = 0x01;
    pub const CURRENT_WRITE: u8 = 0x02;
    pub const HISTORY_READ: u8 = 0x04;
    pub const HISTORY_WRITE: u8 = 0x08;
}

/// Value rank constants
pub mod value_rank {
    pub const SCALAR_OR_ONE_DIMENSION: i32 = -3;
    pub const ANY: i32 = -2;
    pub const SCALAR: i32 = -1;
    pub const ONE_OR_MORE_DIMENSIONS: i32 = 0;
    pub const ONE_DIMENSION: i32 = 1;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectAttributes {
    pub event_notifier: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableAttributes {
    pub value: Variant,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Vec<u32>,
    pub access_level: u8,
    pub minimum_sampling_interval: f64,
    pub historizing: bool,
}

impl VariableAttributes {
    /// Readable and writable variable typed after its initial value.
    pub fn new(value: impl Into<Variant>) -> Self {
        let value = value.into();
        Self {
            data_type: value.data_type_id().unwrap_or(ids::BASE_DATA_TYPE),
            value_rank: value_rank::ANY,
            array_dimensions: Vec::new(),
            access_level: access_level::CURRENT_READ | access_level::CURRENT_WRITE,
            minimum_sampling_interval: 0.0,
            historizing: false,
            value,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.access_level = access_level::CURRENT_READ;
        self
    }

    pub fn with_value_rank(
        mut self,
        value_rank: i32,
    ) -> Self {
        self.value_rank = value_rank;
        self
    }

    pub fn with_data_type(
        mut self,
        data_type: NodeId,
    ) -> Self {
        self.data_type = data_type;
        self
    }
}

impl Default for VariableAttributes {
    fn default() -> Self {
        Self::new(Variant::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodAttributes {
    pub executable: bool,
}

impl Default for MethodAttributes {
    fn default() -> Self {
        Self { executable: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectTypeAttributes {
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableTypeAttributes {
    pub value: Variant,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Vec<u32>,
    pub is_abstract: bool,
}

impl Default for VariableTypeAttributes {
    fn default() -> Self {
        Self {
            value: Variant::Empty,
            data_type: ids::BASE_DATA_TYPE,
            value_rank: value_rank::ANY,
            array_dimensions: Vec::new(),
            is_abstract: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceTypeAttributes {
    pub is_abstract: bool,
    pub symmetric: bool,
    pub inverse_name: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTypeAttributes {
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewAttributes {
    pub contains_no_loops: bool,
    pub event_notifier: u8,
}

/// Class specific attributes of a node; the variant fixes the node class.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAttributes {
    Object(ObjectAttributes),
    Variable(VariableAttributes),
    Method(MethodAttributes),
    ObjectType(ObjectTypeAttributes),
    VariableType(VariableTypeAttributes),
    ReferenceType(ReferenceTypeAttributes),
    DataType(DataTypeAttributes),
    View(ViewAttributes),
}

impl NodeAttributes {
    pub fn node_class(&self) -> NodeClass {
        match self {
            NodeAttributes::Object(_) => NodeClass::Object,
            NodeAttributes::Variable(_) => NodeClass::Variable,
            NodeAttributes::Method(_) => NodeClass::Method,
            NodeAttributes::ObjectType(_) => NodeClass::ObjectType,
            NodeAttributes::VariableType(_) => NodeClass::VariableType,
            NodeAttributes::ReferenceType(_) => NodeClass::ReferenceType,
            NodeAttributes::DataType(_) => NodeClass::DataType,
            NodeAttributes::View(_) => NodeClass::View,
        }
    }

    /// Type definition used when an add request does not name one
    pub fn default_type_definition(&self) -> NodeId {
        match self {
            NodeAttributes::Object(_) => ids::BASE_OBJECT_TYPE,
            NodeAttributes::Variable(_) => ids::BASE_DATA_VARIABLE_TYPE,
            _ => NodeId::null(),
        }
    }

    /// Reference used to attach a new node of this class to its parent when
    /// the add request does not name one
    pub fn default_reference_type(&self) -> NodeId {
        match self {
            NodeAttributes::Object(_) | NodeAttributes::View(_) => ids::ORGANIZES,
            NodeAttributes::Variable(_) | NodeAttributes::Method(_) => ids::HAS_COMPONENT,
            _ => ids::HAS_SUBTYPE,
        }
    }
}

impl From<VariableAttributes> for NodeAttributes {
    fn from(attrs: VariableAttributes) -> Self {
        NodeAttributes::Variable(attrs)
    }
}

impl From<ObjectAttributes> for NodeAttributes {
    fn from(attrs: ObjectAttributes) -> Self {
        NodeAttributes::Object(attrs)
    }
}

impl From<MethodAttributes> for NodeAttributes {
    fn from(attrs: MethodAttributes) -> Self {
        NodeAttributes::Method(attrs)
    }
}
