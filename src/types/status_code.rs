use std::fmt;

/// Protocol level result code.
///
/// The top two bits carry the severity (`00` good, `01` uncertain, `10` bad),
/// the remaining bits identify the condition. Only the codes this runtime can
/// produce are named here; anything else is still representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StatusCode(u32);

macro_rules! status_codes {
    ($($name:ident = $bits:literal, $label:literal;)*) => {
        impl StatusCode {
            $(pub const $name: StatusCode = StatusCode($bits);)*

            /// Symbolic name of a known status code
            pub fn name(&self) -> &'static str {
                match self.0 {
                    $($bits => $label,)*
                    _ => "Unknown",
                }
            }
        }
    };
}

status_codes! {
    GOOD = 0x0000_0000, "Good";
    BAD_UNEXPECTED_ERROR = 0x8001_0000, "BadUnexpectedError";
    BAD_INTERNAL_ERROR = 0x8002_0000, "BadInternalError";
    BAD_OUT_OF_MEMORY = 0x8003_0000, "BadOutOfMemory";
    BAD_RESOURCE_UNAVAILABLE = 0x8004_0000, "BadResourceUnavailable";
    BAD_SHUTDOWN = 0x800C_0000, "BadShutdown";
    BAD_USER_ACCESS_DENIED = 0x801F_0000, "BadUserAccessDenied";
    BAD_NODE_ID_INVALID = 0x8033_0000, "BadNodeIdInvalid";
    BAD_NODE_ID_UNKNOWN = 0x8034_0000, "BadNodeIdUnknown";
    BAD_ATTRIBUTE_ID_INVALID = 0x8035_0000, "BadAttributeIdInvalid";
    BAD_NOT_FOUND = 0x803E_0000, "BadNotFound";
    BAD_REFERENCE_TYPE_ID_INVALID = 0x804C_0000, "BadReferenceTypeIdInvalid";
    BAD_PARENT_NODE_ID_INVALID = 0x805B_0000, "BadParentNodeIdInvalid";
    BAD_NODE_ID_EXISTS = 0x805E_0000, "BadNodeIdExists";
    BAD_NODE_CLASS_INVALID = 0x805F_0000, "BadNodeClassInvalid";
    BAD_BROWSE_NAME_DUPLICATED = 0x8061_0000, "BadBrowseNameDuplicated";
    BAD_NO_MATCH = 0x806F_0000, "BadNoMatch";
    BAD_TYPE_MISMATCH = 0x8074_0000, "BadTypeMismatch";
    BAD_METHOD_INVALID = 0x8075_0000, "BadMethodInvalid";
    BAD_ARGUMENTS_MISSING = 0x8076_0000, "BadArgumentsMissing";
    BAD_CONFIGURATION_ERROR = 0x8089_0000, "BadConfigurationError";
    BAD_INVALID_ARGUMENT = 0x80AB_0000, "BadInvalidArgument";
    BAD_TOO_MANY_MATCHES = 0x80DB_0000, "BadTooManyMatches";
    BAD_TOO_MANY_ARGUMENTS = 0x80E5_0000, "BadTooManyArguments";
    BAD_NOT_EXECUTABLE = 0x8111_0000, "BadNotExecutable";
}

impl StatusCode {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    pub const fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.0)
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
