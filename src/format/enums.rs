//! Closed enumerations for configuration fields.

/// Ordinal/name mapping for a closed set of symbolic values.
///
/// Names are matched case-insensitively when parsing and printed with their
/// declared spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumFormatter {
    names: &'static [&'static str],
}

impl EnumFormatter {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn print(&self, ordinal: usize) -> Option<&'static str> {
        self.names.get(ordinal).copied()
    }

    pub fn parse(&self, token: &str) -> Option<usize> {
        let token = token.trim();
        self.names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(token))
    }
}

/// Declares a fieldless enum usable as a configuration field.
///
/// The first variant is the zero value (`Default`). Ordinals follow
/// declaration order starting at 0.
///
/// ```ignore
/// config_enum! {
///     /// Notification priority
///     pub enum Priority {
///         Min = "min",
///         Low = "low",
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident = $first_text:literal
            $(, $(#[$variant_meta:meta])* $variant:ident = $text:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $(#[$first_meta])*
            #[default]
            $first,
            $($(#[$variant_meta])* $variant,)*
        }

        impl $name {
            pub const VARIANTS: &'static [$name] = &[$name::$first, $($name::$variant),*];
            pub const NAMES: &'static [&'static str] = &[$first_text, $($text),*];

            pub fn formatter() -> $crate::format::EnumFormatter {
                $crate::format::EnumFormatter::new(Self::NAMES)
            }

            pub fn ordinal(&self) -> usize {
                *self as usize
            }

            pub fn from_ordinal(ordinal: usize) -> Option<Self> {
                Self::VARIANTS.get(ordinal).copied()
            }

            pub fn as_str(&self) -> &'static str {
                Self::NAMES[self.ordinal()]
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::formatter()
                    .parse(s)
                    .and_then(Self::from_ordinal)
                    .ok_or_else(|| format!("expected one of: {}", Self::NAMES.join(", ")))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::format::FieldValue for $name {
            const KIND: $crate::format::FieldKind = $crate::format::FieldKind::Enum;

            fn enum_names() -> &'static [&'static str] {
                Self::NAMES
            }

            fn parse_field(raw: &str) -> Result<Self, String> {
                raw.parse()
            }

            fn format_field(&self) -> String {
                self.as_str().to_string()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FieldValue;

    crate::config_enum! {
        enum Shade {
            Light = "light",
            Dark = "dark",
            HighContrast = "highContrast",
        }
    }

    #[test]
    fn test_formatter_round_trip() {
        let formatter = EnumFormatter::new(&["none", "starttls", "tls"]);
        assert_eq!(formatter.parse("StartTLS"), Some(1));
        assert_eq!(formatter.print(2), Some("tls"));
        assert_eq!(formatter.print(3), None);
        assert_eq!(formatter.parse("ssl"), None);
    }

    #[test]
    fn test_declared_enum_ordinals() {
        assert_eq!(Shade::default(), Shade::Light);
        assert_eq!(Shade::HighContrast.ordinal(), 2);
        assert_eq!(Shade::from_ordinal(1), Some(Shade::Dark));
        assert_eq!(Shade::from_ordinal(3), None);
        assert_eq!(Shade::formatter().names(), &["light", "dark", "highContrast"]);
    }

    #[test]
    fn test_declared_enum_parsing() {
        assert_eq!(Shade::parse_field("HIGHCONTRAST"), Ok(Shade::HighContrast));
        assert_eq!(Shade::HighContrast.format_field(), "highContrast");
        let err = Shade::parse_field("sepia").unwrap_err();
        assert!(err.contains("light, dark, highContrast"));
    }
}
