use super::value::FieldKind;

/// Static description of one configuration field.
///
/// `key` is the primary external name; lookups compare it and every alias
/// case-insensitively. Only the primary key is ever written when encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub aliases: Vec<&'static str>,
    pub description: &'static str,
    pub default: Option<&'static str>,
    pub kind: FieldKind,
    /// Legal symbolic values in ordinal order, empty unless `kind` is `Enum`
    pub enum_values: &'static [&'static str],
    pub required: bool,
    /// Written by `encode`; false for write-only fields
    pub exportable: bool,
    /// Accepted by `set`
    pub importable: bool,
    /// Written by `encode` even when equal to the default
    pub always_export: bool,
}

impl FieldDescriptor {
    pub(crate) fn new(key: &'static str, kind: FieldKind, enum_values: &'static [&'static str]) -> Self {
        Self {
            key,
            aliases: Vec::new(),
            description: "",
            default: None,
            kind,
            enum_values,
            required: false,
            exportable: true,
            importable: true,
            always_export: false,
        }
    }

    pub fn is_list(&self) -> bool {
        self.kind == FieldKind::List
    }

    pub fn is_enum(&self) -> bool {
        self.kind == FieldKind::Enum
    }

    /// Case-insensitive match against the primary key and aliases
    pub fn matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(key))
    }
}
