// ABOUTME: DataSpec schema overlay mapping array positions to field names, recursively.
// ABOUTME: Lets tuple-style (array-encoded) MessagePack objects decode into keyed targets.

//! A [`DataSpec`] describes how an array-encoded object should be read as if
//! it were map-encoded: field `i` of the DataSpec names element `i` of the array.
//!
//! ```rust
//! use msgpack_dataspec::DataSpec;
//!
//! let spec = DataSpec::builder()
//!     .field("id")
//!     .field("name")
//!     .object("login", DataSpec::builder()
//!         .field("username")
//!         .array("uris", DataSpec::builder().field("uri").build())
//!         .build())
//!     .build();
//!
//! assert_eq!(spec.len(), 3);
//! assert_eq!(spec.position("login"), Some(2));
//! ```

/// An ordered list of named positions. The order is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSpec {
    fields: Vec<DataSpecField>,
}

/// One named position of a [`DataSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSpecField {
    name: String,
    shape: FieldShape,
}

/// What the value at a position looks like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldShape {
    /// A scalar, or any value that is decoded without relabeling.
    #[default]
    Scalar,
    /// An array-encoded object, relabeled with the nested spec.
    Object(DataSpec),
    /// An array whose every element is an array-encoded object relabeled
    /// with the nested spec.
    ArrayOf(DataSpec),
}

impl DataSpec {
    #[must_use]
    pub fn builder() -> DataSpecBuilder {
        DataSpecBuilder::default()
    }

    /// A flat spec of scalar positions.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::builder(), |builder, name| builder.field(name))
            .build()
    }

    #[must_use]
    pub fn fields(&self) -> &[DataSpecField] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field at array position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DataSpecField> {
        self.fields.get(index)
    }

    /// Look up a field by name (first match).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DataSpecField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Array position of a named field.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Resolve the shape registered at a field path such as `["login", "uris"]`.
    #[must_use]
    pub fn resolve(&self, path: &[&str]) -> Option<&FieldShape> {
        let (first, rest) = path.split_first()?;
        let shape = &self.field(first)?.shape;
        if rest.is_empty() {
            return Some(shape);
        }
        match shape {
            FieldShape::Object(child) | FieldShape::ArrayOf(child) => child.resolve(rest),
            FieldShape::Scalar => None,
        }
    }
}

impl DataSpecField {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }
}

/// Builds a [`DataSpec`] one position at a time, in array order.
#[derive(Debug, Clone, Default)]
pub struct DataSpecBuilder {
    fields: Vec<DataSpecField>,
}

impl DataSpecBuilder {
    /// Append a scalar position.
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.push(name, FieldShape::Scalar)
    }

    /// Append a position holding an array-encoded object.
    #[must_use]
    pub fn object(self, name: impl Into<String>, spec: DataSpec) -> Self {
        self.push(name, FieldShape::Object(spec))
    }

    /// Append a position holding an array of array-encoded objects.
    #[must_use]
    pub fn array(self, name: impl Into<String>, element: DataSpec) -> Self {
        self.push(name, FieldShape::ArrayOf(element))
    }

    #[must_use]
    pub fn build(self) -> DataSpec {
        DataSpec { fields: self.fields }
    }

    fn push(mut self, name: impl Into<String>, shape: FieldShape) -> Self {
        self.fields.push(DataSpecField {
            name: name.into(),
            shape,
        });
        self
    }
}
