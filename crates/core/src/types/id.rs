//! Newtype IDs for document-store references.
//!
//! Identifiers are assigned by the external document store and are opaque
//! strings. Use the `define_id!` macro to create wrappers that keep IDs of
//! different collections from being mixed up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<String>`, `From<&str>` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use zym_power_core::define_id;
/// define_id!(OrderRef);
///
/// let id = OrderRef::new("abc123");
/// assert_eq!(id.as_str(), "abc123");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a document id.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying document id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the document id.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(AdminUid);

/// Longest document id the store accepts, in bytes.
pub const MAX_DOCUMENT_ID_LEN: usize = 1500;

impl ProductId {
    /// Whether this can name a document directly inside the products
    /// collection.
    ///
    /// Document ids are a single path segment: no `/`, not `.` or `..`,
    /// and not of the reserved `__name__` form.
    #[must_use]
    pub fn is_document_id(&self) -> bool {
        let id = self.as_str();
        !id.is_empty()
            && id.len() <= MAX_DOCUMENT_ID_LEN
            && !id.contains('/')
            && id != "."
            && id != ".."
            && !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
    }
}
