use std::fmt;

/// Browse name of a node: a name scoped by a namespace index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct QualifiedName {
    pub namespace: u16,
    pub name: String,
}

impl QualifiedName {
    pub fn new(
        namespace: u16,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.name.is_empty()
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(0, name)
    }
}

impl From<(u16, &str)> for QualifiedName {
    fn from((namespace, name): (u16, &str)) -> Self {
        Self::new(namespace, name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.namespace == 0 {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

/// Human readable text with an optional locale, used for display names and
/// descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(
        locale: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            text: text.into(),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        Self::new("", text)
    }
}

impl From<String> for LocalizedText {
    fn from(text: String) -> Self {
        Self::new("", text)
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.text)
    }
}
