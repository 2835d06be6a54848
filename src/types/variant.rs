//! Self-describing attribute values.
//!
//! A [`Variant`] is empty, a single [`Scalar`], or a homogeneous [`Array`] of
//! scalars with optional multi-dimensional shape. The payload is owned by the
//! variant; `clone()` is a deep copy.
//!
//! Typed access goes through [`Variant::get`] and [`Variant::get_array`],
//! which fail with [`ValueError::TypeMismatch`] when the stored kind differs
//! from the requested one.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use uuid::Uuid;

use super::ids;
use super::LocalizedText;
use super::NodeId;
use super::QualifiedName;
use super::StatusCode;
use crate::ValueError;

/// The fixed set of data kinds a variant can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    ByteString,
    NodeId,
    StatusCode,
    QualifiedName,
    LocalizedText,
}

impl DataKind {
    pub const ALL: [DataKind; 19] = [
        DataKind::Boolean,
        DataKind::SByte,
        DataKind::Byte,
        DataKind::Int16,
        DataKind::UInt16,
        DataKind::Int32,
        DataKind::UInt32,
        DataKind::Int64,
        DataKind::UInt64,
        DataKind::Float,
        DataKind::Double,
        DataKind::String,
        DataKind::DateTime,
        DataKind::Guid,
        DataKind::ByteString,
        DataKind::NodeId,
        DataKind::StatusCode,
        DataKind::QualifiedName,
        DataKind::LocalizedText,
    ];

    /// Namespace 0 DataType node describing this kind
    pub fn data_type_id(self) -> NodeId {
        match self {
            DataKind::Boolean => ids::BOOLEAN,
            DataKind::SByte => ids::SBYTE,
            DataKind::Byte => ids::BYTE,
            DataKind::Int16 => ids::INT16,
            DataKind::UInt16 => ids::UINT16,
            DataKind::Int32 => ids::INT32,
            DataKind::UInt32 => ids::UINT32,
            DataKind::Int64 => ids::INT64,
            DataKind::UInt64 => ids::UINT64,
            DataKind::Float => ids::FLOAT,
            DataKind::Double => ids::DOUBLE,
            DataKind::String => ids::STRING,
            DataKind::DateTime => ids::DATE_TIME,
            DataKind::Guid => ids::GUID,
            DataKind::ByteString => ids::BYTE_STRING,
            DataKind::NodeId => ids::NODE_ID,
            DataKind::StatusCode => ids::STATUS_CODE,
            DataKind::QualifiedName => ids::QUALIFIED_NAME,
            DataKind::LocalizedText => ids::LOCALIZED_TEXT,
        }
    }

    pub fn from_data_type_id(id: &NodeId) -> Option<Self> {
        Self::ALL.into_iter().find(|k| &k.data_type_id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            DataKind::Boolean => "Boolean",
            DataKind::SByte => "SByte",
            DataKind::Byte => "Byte",
            DataKind::Int16 => "Int16",
            DataKind::UInt16 => "UInt16",
            DataKind::Int32 => "Int32",
            DataKind::UInt32 => "UInt32",
            DataKind::Int64 => "Int64",
            DataKind::UInt64 => "UInt64",
            DataKind::Float => "Float",
            DataKind::Double => "Double",
            DataKind::String => "String",
            DataKind::DateTime => "DateTime",
            DataKind::Guid => "Guid",
            DataKind::ByteString => "ByteString",
            DataKind::NodeId => "NodeId",
            DataKind::StatusCode => "StatusCode",
            DataKind::QualifiedName => "QualifiedName",
            DataKind::LocalizedText => "LocalizedText",
        }
    }
}

/// 100 nanosecond ticks since 1601-01-01 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DateTime(i64);

// Ticks between 1601-01-01 and 1970-01-01
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

impl DateTime {
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| (d.as_nanos() / 100) as i64)
            .unwrap_or(0);
        Self(UNIX_EPOCH_TICKS + since_epoch)
    }

    pub const fn ticks(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    DateTime(DateTime),
    Guid(Uuid),
    ByteString(Vec<u8>),
    NodeId(NodeId),
    StatusCode(StatusCode),
    QualifiedName(QualifiedName),
    LocalizedText(LocalizedText),
}

impl Scalar {
    pub fn kind(&self) -> DataKind {
        match self {
            Scalar::Boolean(_) => DataKind::Boolean,
            Scalar::SByte(_) => DataKind::SByte,
            Scalar::Byte(_) => DataKind::Byte,
            Scalar::Int16(_) => DataKind::Int16,
            Scalar::UInt16(_) => DataKind::UInt16,
            Scalar::Int32(_) => DataKind::Int32,
            Scalar::UInt32(_) => DataKind::UInt32,
            Scalar::Int64(_) => DataKind::Int64,
            Scalar::UInt64(_) => DataKind::UInt64,
            Scalar::Float(_) => DataKind::Float,
            Scalar::Double(_) => DataKind::Double,
            Scalar::String(_) => DataKind::String,
            Scalar::DateTime(_) => DataKind::DateTime,
            Scalar::Guid(_) => DataKind::Guid,
            Scalar::ByteString(_) => DataKind::ByteString,
            Scalar::NodeId(_) => DataKind::NodeId,
            Scalar::StatusCode(_) => DataKind::StatusCode,
            Scalar::QualifiedName(_) => DataKind::QualifiedName,
            Scalar::LocalizedText(_) => DataKind::LocalizedText,
        }
    }
}

/// Homogeneous array of scalars.
///
/// `dimensions` is empty for a plain one-dimensional array; otherwise the
/// product of the dimensions equals the number of elements (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    kind: DataKind,
    values: Vec<Scalar>,
    dimensions: Vec<u32>,
}

impl Array {
    pub fn new(
        kind: DataKind,
        values: Vec<Scalar>,
    ) -> Result<Self, ValueError> {
        if let Some(bad) = values.iter().find(|v| v.kind() != kind) {
            return Err(ValueError::NotHomogeneous {
                expected: kind.name(),
                found: bad.kind().name(),
            });
        }
        Ok(Self {
            kind,
            values,
            dimensions: Vec::new(),
        })
    }

    /// Reshapes the array; the dimensions must cover every element exactly.
    pub fn with_dimensions(
        mut self,
        dimensions: Vec<u32>,
    ) -> Result<Self, ValueError> {
        let expected: u64 = dimensions.iter().map(|d| *d as u64).product();
        if dimensions.is_empty() || expected != self.values.len() as u64 {
            return Err(ValueError::DimensionMismatch {
                dimensions,
                len: self.values.len(),
            });
        }
        self.dimensions = dimensions;
        Ok(self)
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shape of the array; a one-dimensional array reports its length.
    pub fn dimensions(&self) -> Vec<u32> {
        if self.dimensions.is_empty() {
            vec![self.values.len() as u32]
        } else {
            self.dimensions.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// The null variant: no type, no data
    #[default]
    Empty,
    Scalar(Scalar),
    Array(Array),
}

/// Rust types that map onto exactly one [`DataKind`].
pub trait VariantScalar: Sized {
    const KIND: DataKind;

    fn into_scalar(self) -> Scalar;

    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

macro_rules! variant_scalar {
    ($ty:ty, $kind:ident) => {
        impl VariantScalar for $ty {
            const KIND: DataKind = DataKind::$kind;

            fn into_scalar(self) -> Scalar {
                Scalar::$kind(self)
            }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$kind(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Variant {
            fn from(value: $ty) -> Self {
                Variant::Scalar(value.into_scalar())
            }
        }

        impl From<Vec<$ty>> for Variant {
            fn from(values: Vec<$ty>) -> Self {
                Variant::Array(Array {
                    kind: DataKind::$kind,
                    values: values.into_iter().map(VariantScalar::into_scalar).collect(),
                    dimensions: Vec::new(),
                })
            }
        }
    };
}

variant_scalar!(bool, Boolean);
variant_scalar!(i8, SByte);
variant_scalar!(u8, Byte);
variant_scalar!(i16, Int16);
variant_scalar!(u16, UInt16);
variant_scalar!(i32, Int32);
variant_scalar!(u32, UInt32);
variant_scalar!(i64, Int64);
variant_scalar!(u64, UInt64);
variant_scalar!(f32, Float);
variant_scalar!(f64, Double);
variant_scalar!(String, String);
variant_scalar!(DateTime, DateTime);
variant_scalar!(Uuid, Guid);
variant_scalar!(NodeId, NodeId);
variant_scalar!(StatusCode, StatusCode);
variant_scalar!(QualifiedName, QualifiedName);
variant_scalar!(LocalizedText, LocalizedText);

// `Vec<u8>` converts to a Byte array; ByteString scalars come from slices.
impl VariantScalar for Vec<u8> {
    const KIND: DataKind = DataKind::ByteString;

    fn into_scalar(self) -> Scalar {
        Scalar::ByteString(self)
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::ByteString(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<&[u8]> for Variant {
    fn from(bytes: &[u8]) -> Self {
        Variant::Scalar(Scalar::ByteString(bytes.to_vec()))
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<Scalar> for Variant {
    fn from(scalar: Scalar) -> Self {
        Variant::Scalar(scalar)
    }
}

impl From<Array> for Variant {
    fn from(array: Array) -> Self {
        Variant::Array(array)
    }
}

impl Variant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Variant::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    pub fn kind(&self) -> Option<DataKind> {
        match self {
            Variant::Empty => None,
            Variant::Scalar(s) => Some(s.kind()),
            Variant::Array(a) => Some(a.kind()),
        }
    }

    pub fn data_type_id(&self) -> Option<NodeId> {
        self.kind().map(DataKind::data_type_id)
    }

    /// `-1` for scalars, the number of dimensions for arrays, `-2` (any) when empty.
    pub fn value_rank(&self) -> i32 {
        match self {
            Variant::Empty => -2,
            Variant::Scalar(_) => -1,
            Variant::Array(a) => a.dimensions().len() as i32,
        }
    }

    pub fn array_dimensions(&self) -> Vec<u32> {
        match self {
            Variant::Array(a) => a.dimensions(),
            _ => Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Empty => "Null",
            Variant::Scalar(s) => s.kind().name(),
            Variant::Array(a) => a.kind().name(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Variant::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Variant::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Typed scalar access.
    pub fn get<T: VariantScalar>(&self) -> Result<T, ValueError> {
        self.as_scalar()
            .and_then(T::from_scalar)
            .ok_or_else(|| self.mismatch(T::KIND, false))
    }

    /// Typed array access.
    pub fn get_array<T: VariantScalar>(&self) -> Result<Vec<T>, ValueError> {
        match self {
            Variant::Array(a) if a.kind() == T::KIND => Ok(a.values().iter().filter_map(T::from_scalar).collect()),
            _ => Err(self.mismatch(T::KIND, true)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Variant::Scalar(Scalar::String(s)) => Ok(s),
            _ => Err(self.mismatch(DataKind::String, false)),
        }
    }

    /// Reads any integer kind as i64; floats and other kinds mismatch.
    pub fn to_i64(&self) -> Result<i64, ValueError> {
        match self.as_scalar() {
            Some(Scalar::SByte(v)) => Ok(*v as i64),
            Some(Scalar::Byte(v)) => Ok(*v as i64),
            Some(Scalar::Int16(v)) => Ok(*v as i64),
            Some(Scalar::UInt16(v)) => Ok(*v as i64),
            Some(Scalar::Int32(v)) => Ok(*v as i64),
            Some(Scalar::UInt32(v)) => Ok(*v as i64),
            Some(Scalar::Int64(v)) => Ok(*v),
            Some(Scalar::UInt64(v)) => i64::try_from(*v).map_err(|_| self.mismatch(DataKind::Int64, false)),
            _ => Err(self.mismatch(DataKind::Int64, false)),
        }
    }

    /// Reads any numeric kind as f64.
    pub fn to_f64(&self) -> Result<f64, ValueError> {
        match self.as_scalar() {
            Some(Scalar::Float(v)) => Ok(*v as f64),
            Some(Scalar::Double(v)) => Ok(*v),
            _ => self.to_i64().map(|v| v as f64).map_err(|_| self.mismatch(DataKind::Double, false)),
        }
    }

    fn mismatch(
        &self,
        expected: DataKind,
        array: bool,
    ) -> ValueError {
        let shape = |is_array: bool| if is_array { "[]" } else { "" };
        ValueError::TypeMismatch {
            expected: format!("{}{}", expected.name(), shape(array)),
            actual: format!("{}{}", self.type_name(), shape(self.is_array())),
        }
    }
}
