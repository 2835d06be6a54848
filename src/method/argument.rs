use crate::ids;
use crate::value_rank;
use crate::LocalizedText;
use crate::NodeId;
use crate::ValueError;
use crate::Variant;

/// Declared shape of one method input or output
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Vec<u32>,
    pub description: LocalizedText,
}

impl Argument {
    /// Scalar argument of `data_type`
    pub fn new(
        name: impl Into<String>,
        data_type: NodeId,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            value_rank: value_rank::SCALAR,
            array_dimensions: Vec::new(),
            description: LocalizedText::default(),
        }
    }

    /// Argument accepting any value
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            value_rank: value_rank::ANY,
            ..Self::new(name, ids::BASE_DATA_TYPE)
        }
    }

    pub fn with_value_rank(
        mut self,
        value_rank: i32,
    ) -> Self {
        self.value_rank = value_rank;
        self
    }

    pub fn with_description(
        mut self,
        description: impl Into<LocalizedText>,
    ) -> Self {
        self.description = description.into();
        self
    }

    /// Checks a supplied value against the declared type and rank.
    pub fn check(
        &self,
        value: &Variant,
    ) -> Result<(), ValueError> {
        crate::address_space::check_value(&self.data_type, self.value_rank, value)
    }
}

/// Input and output arity of a method, fixed at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodSignature {
    pub inputs: Vec<Argument>,
    pub outputs: Vec<Argument>,
}

impl MethodSignature {
    pub fn new(
        inputs: Vec<Argument>,
        outputs: Vec<Argument>,
    ) -> Self {
        Self { inputs, outputs }
    }

    /// `n_inputs` and `n_outputs` untyped arguments, to be described later
    pub fn with_arity(
        n_inputs: usize,
        n_outputs: usize,
    ) -> Self {
        Self {
            inputs: (1..=n_inputs).map(|i| Argument::any(format!("Input{i}"))).collect(),
            outputs: (1..=n_outputs).map(|i| Argument::any(format!("Output{i}"))).collect(),
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}
