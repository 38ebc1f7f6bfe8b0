//! Textual forms of configuration field values.
//!
//! Every field type that can appear in a service configuration implements
//! [`FieldValue`], which fixes its [`FieldKind`] and its reversible string
//! representation. The conversions here are the only place where raw query
//! text is turned into typed values.

use std::fmt;

/// Cardinality and validation domain of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    Enum,
    List,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum => "option",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type that can be stored in a configuration field.
///
/// `parse_field` must accept everything `format_field` produces and yield an
/// equal value.
pub trait FieldValue: Default + PartialEq + Clone + Send + Sync + 'static {
    const KIND: FieldKind;

    /// Symbolic names for enumerations, empty otherwise
    fn enum_names() -> &'static [&'static str] {
        &[]
    }

    /// Parses the external string form; the error is a human-readable reason
    fn parse_field(raw: &str) -> Result<Self, String>;

    fn format_field(&self) -> String;
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn parse_field(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn format_field(&self) -> String {
        self.clone()
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn parse_field(raw: &str) -> Result<Self, String> {
        parse_bool(raw).ok_or_else(|| "expected yes/no, true/false or 1/0".to_string())
    }

    fn format_field(&self) -> String {
        print_bool(*self).to_string()
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::Integer;

                fn parse_field(raw: &str) -> Result<Self, String> {
                    let (digits, radix) = strip_number_prefix(raw.trim());
                    <$ty>::from_str_radix(digits, radix)
                        .map_err(|e| format!("not a valid {}: {}", stringify!($ty), e))
                }

                fn format_field(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_field_value!(u8, u16, u32, u64, i32, i64);

impl FieldValue for Vec<String> {
    const KIND: FieldKind = FieldKind::List;

    fn parse_field(raw: &str) -> Result<Self, String> {
        Ok(split_list(raw))
    }

    fn format_field(&self) -> String {
        join_list(self)
    }
}

/// Optional fields use the empty string for "absent".
impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn enum_names() -> &'static [&'static str] {
        T::enum_names()
    }

    fn parse_field(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::parse_field(raw).map(Some)
        }
    }

    fn format_field(&self) -> String {
        self.as_ref().map(T::format_field).unwrap_or_default()
    }
}

/// Parses the boolean spellings accepted in addresses (case-insensitive)
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn print_bool(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Returns the digits and radix for `#ff`, `0xff` or plain decimal input
pub fn strip_number_prefix(raw: &str) -> (&str, u32) {
    if let Some(hex) = raw.strip_prefix('#') {
        (hex, 16)
    } else if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        (hex, 16)
    } else {
        (raw, 10)
    }
}

/// Escapes a single list element so that commas inside it survive a split
pub fn escape_list_item(item: &str) -> String {
    let mut escaped = String::with_capacity(item.len());
    for c in item.chars() {
        if c == '\\' || c == ',' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Joins list elements with `,`, escaping each element
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| escape_list_item(item.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits on unescaped commas and unescapes each element.
///
/// Like any other input, the empty string holds one (empty) element; a list
/// field left out of an address stays empty instead. A trailing lone
/// backslash is kept literally.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}
