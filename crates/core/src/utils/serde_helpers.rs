//! Serde utility helpers for case-insensitive deserialization

/// Implements case-insensitive deserialization for unit enums, accepting any
/// of the listed spellings for each variant.
///
/// Usage:
/// ```
/// #[derive(Debug, PartialEq)]
/// enum Mode { Fast, Slow }
///
/// cmdhub_core::impl_case_insensitive_deserialize!(
///     Mode,
///     Fast => "fast" | "quick",
///     Slow => "slow"
/// );
///
/// let mode: Mode = serde_json::from_str("\"QUICK\"").unwrap();
/// assert_eq!(mode, Mode::Fast);
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $first:literal $(| $alias:literal)*),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $first $(| $alias)* => Ok(Self::$variant),
                    )+
                    _ => Err(serde::de::Error::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        vec![$($first),+].join(", ")
                    ))),
                }
            }
        }
    };
}
