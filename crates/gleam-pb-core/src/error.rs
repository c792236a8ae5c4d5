//! Error types for gleam-pb code generation

use thiserror::Error;

/// Result type alias for generator operations
pub type GenResult<T> = Result<T, GenError>;

/// Error type for generator operations
///
/// Every variant is terminal for the run: nothing is retried and no output is
/// written once one of these has been produced.
#[derive(Error, Debug)]
pub enum GenError {
    /// A field uses a proto type outside the supported scalar set
    #[error("unsupported primitive type `{proto_type}` for field `{field}` of `{entity}` in {file}")]
    UnsupportedPrimitive {
        entity: String,
        field: String,
        proto_type: String,
        file: String,
    },

    /// A required configuration key was not provided
    #[error("missing required configuration: please specify the `{0}` flag")]
    MissingConfiguration(String),

    /// A configuration value could not be understood
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The external codec generator failed; the message is its own output
    #[error("codec generator failed: {0}")]
    CodecGenerator(String),

    /// Two generated identifiers ended up with the same name
    #[error("name collision in {scope}: `{name}` is generated for both {first} and {second}")]
    NameCollision {
        scope: String,
        name: String,
        first: String,
        second: String,
    },

    /// A field references a type that is not present in the descriptors
    #[error("unresolved type `{type_name}` referenced by `{entity}`")]
    UnresolvedType { entity: String, type_name: String },

    /// The descriptors describe something the lowering cannot express
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// I/O error while reading inputs or writing outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decoding of the descriptor input failed
    #[error("descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl GenError {
    /// Returns a stable code for this error, used as the process exit status
    pub fn error_code(&self) -> u8 {
        match self {
            GenError::UnsupportedPrimitive { .. } => 2,
            GenError::MissingConfiguration(_) => 3,
            GenError::InvalidConfiguration(_) => 4,
            GenError::CodecGenerator(_) => 5,
            GenError::NameCollision { .. } => 6,
            GenError::UnresolvedType { .. } => 7,
            GenError::InvalidSchema(_) => 8,
            GenError::Io(_) => 9,
            GenError::Decode(_) => 10,
        }
    }

    /// Shorthand for a collision between two named sources in one scope
    pub fn collision(
        scope: impl Into<String>,
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        GenError::NameCollision {
            scope: scope.into(),
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

impl From<toml::de::Error> for GenError {
    fn from(err: toml::de::Error) -> Self {
        GenError::InvalidConfiguration(err.to_string())
    }
}
