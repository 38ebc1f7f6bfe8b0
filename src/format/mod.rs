//! Address mapping engine.
//!
//! Declarative field models describe each service configuration type; the
//! resolver reads and writes fields by external key, and the codec turns a
//! whole configuration into an address URL and back.

mod codec;
mod enums;
mod field;
mod model;
mod passthrough;
mod resolver;
mod value;

pub use codec::{Location, ServiceConfig, decode, encode};
pub use enums::EnumFormatter;
pub use field::FieldDescriptor;
pub use model::{Accessor, Configurable, FieldModel, FieldModelBuilder};
pub use passthrough::{
    DATA_PREFIX, EXTENSION_PREFIX, HEADER_PREFIX, PassThrough, normalized_header_key,
};
pub use resolver::ConfigResolver;
pub use value::{FieldKind, FieldValue, join_list, parse_bool, print_bool, split_list};
