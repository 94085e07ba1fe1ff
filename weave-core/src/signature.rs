//! Call signatures: the static description of an intercepted operation.

use std::fmt;

/// Describes the operation being invoked: owning type, method and parameters.
///
/// The owning type is split into its dot-separated package and simple type
/// name, so `com.example.dao.AccountDao` has package `com.example.dao` and
/// type name `AccountDao`.
///
/// # Example
///
/// ```rust
/// use weave_core::CallSignature;
///
/// let sig = CallSignature::new("com.example.dao.AccountDao", "findAccounts")
///     .with_params(["bool"]);
/// assert_eq!(sig.package(), "com.example.dao");
/// assert_eq!(sig.to_short_string(), "AccountDao.findAccounts(..)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSignature {
    package: String,
    type_name: String,
    method: String,
    params: Vec<String>,
}

impl CallSignature {
    /// Create a signature from a fully qualified owner and a method name.
    pub fn new(owner: impl AsRef<str>, method: impl Into<String>) -> Self {
        let owner = owner.as_ref();
        let (package, type_name) = match owner.rsplit_once('.') {
            Some((package, type_name)) => (package.to_string(), type_name.to_string()),
            None => (String::new(), owner.to_string()),
        };
        Self {
            package,
            type_name,
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Set the ordered parameter type names.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Dot-separated package of the owning type; empty when it has none.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple name of the owning type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parameter type names, in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Fully qualified owning type.
    pub fn owner(&self) -> String {
        if self.package.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.package, self.type_name)
        }
    }

    /// `Type.method(..)`, the compact form used in log lines.
    pub fn to_short_string(&self) -> String {
        format!("{}.{}(..)", self.type_name, self.method)
    }
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner(), self.method, self.params.join(", "))
    }
}
