/// A lazily compiled `&'static regex::Regex`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: $crate::__private::once_cell::sync::Lazy<$crate::__private::regex::Regex> =
            $crate::__private::once_cell::sync::Lazy::new(|| $crate::__private::regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// A lazily compiled `&'static Pattern`. Panics on first use if the pattern is invalid, so only use
/// it with literals known to compile.
///
/// ```
/// let pattern = dissector::pattern!("%{a} %{b}");
/// assert_eq!(pattern.dissect("x y").unwrap().get("b"), Some("y"));
/// ```
#[macro_export]
macro_rules! pattern {
    ($pat:literal) => {{
        static PATTERN: $crate::__private::once_cell::sync::Lazy<$crate::Pattern> =
            $crate::__private::once_cell::sync::Lazy::new(|| $crate::Pattern::compile($pat).unwrap());
        &*PATTERN
    }};
}

/// Ordered `(source field, pattern)` pairs for [`DissectConfig::mapping`](crate::DissectConfig).
///
/// ```
/// let mapping = dissector::mapping! { "message" => "%{a} %{b}", "b" => "%{c}-%{d}" };
/// assert_eq!(mapping[1], ("b".to_string(), "%{c}-%{d}".to_string()));
/// ```
#[macro_export]
macro_rules! mapping {
    ($($source:expr => $pattern:expr),* $(,)?) => {
        vec![ $(($source.to_string(), $pattern.to_string())),* ]
    };
}
