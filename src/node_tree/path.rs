use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Logical path of browse names. Segments are separated by `/` or `.`;
/// empty segments are dropped, so `"/A//B."` is the path `A.B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Self {
        Self(
            path.split(['/', '.'])
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Everything but the last segment
    pub fn parent(&self) -> Option<NodePath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn push(
        &mut self,
        segment: impl Into<String>,
    ) {
        self.0.push(segment.into());
    }

    /// A copy of this path with `segment` appended
    pub fn join(
        &self,
        segment: impl Into<String>,
    ) -> NodePath {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }
}

impl fmt::Display for NodePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for NodePath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for NodePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl<S: Into<String>> FromIterator<S> for NodePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
