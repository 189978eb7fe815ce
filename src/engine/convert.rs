//! Datatype conversion.
//!
//! Conversions are declared as `(field, type)` pairs, validated once when the engine is built, and
//! applied to a record after every mapping entry has run. Problems at apply time never fail the
//! record: they add a field-specific tag and leave the value alone.
//!
//! `int` values are [`BigInt`]s and `float` values [`BigDecimal`]s, so every digit of the input is
//! kept: integers of any width and decimal fractions without binary rounding.

use crate::error::ConfigError;
use crate::record::{Record, Value};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;

/// Target type of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Int,
    Float,
}

impl Datatype {
    pub fn name(self) -> &'static str {
        match self {
            Datatype::Int => "int",
            Datatype::Float => "float",
        }
    }

    /// Coerce `value`, or `None` if it has no numeric reading.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        let number = match value {
            Value::Int(n) => BigDecimal::new(n.clone(), 0),
            Value::Float(d) => d.clone(),
            Value::Text(s) => parse_decimal(s.trim())?,
            Value::Bool(_) | Value::Null | Value::List(_) | Value::Map(_) => return None,
        };
        Some(match self {
            Datatype::Int => Value::Int(truncate(&number)),
            Datatype::Float => Value::Float(number),
        })
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Datatype {
    type Err = ();

    /// Exactly `int` or `float`, case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Datatype::Int),
            "float" => Ok(Datatype::Float),
            _ => Err(()),
        }
    }
}

/// Largest exponent accepted beyond the written digits. `1e999999999` would otherwise expand into a
/// billion-digit integer.
const MAX_EXPONENT: i64 = 4096;

fn parse_decimal(s: &str) -> Option<BigDecimal> {
    if s.is_empty() {
        return None;
    }
    let number = s.parse::<BigDecimal>().ok()?;
    let (_, scale) = number.as_bigint_and_exponent();
    let digits = i64::try_from(number.digits()).unwrap_or(i64::MAX);
    (scale >= -MAX_EXPONENT && scale <= digits.saturating_add(MAX_EXPONENT)).then_some(number)
}

/// Drop the fractional part, rounding toward zero.
fn truncate(number: &BigDecimal) -> BigInt {
    number.with_scale(0).into_bigint_and_exponent().0
}

/// One configured conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub field: String,
    pub datatype: Datatype,
}

/// A non-fatal problem converting one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionIssue {
    /// The field was absent or null.
    NullValue { field: String, datatype: Datatype },
    /// The field was present but had no numeric reading.
    Uncoercible { field: String, datatype: Datatype },
}

impl ConversionIssue {
    /// The tag this issue adds to the record.
    pub fn tag(&self) -> String {
        match self {
            ConversionIssue::NullValue { field, datatype } => format!("_dataconversionnullvalue_{field}_{datatype}"),
            ConversionIssue::Uncoercible { field, datatype } => {
                format!("_dataconversionuncoercible_{field}_{datatype}")
            }
        }
    }
}

/// Validated, immutable set of conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSpec {
    conversions: Vec<Conversion>,
}

impl ConversionSpec {
    /// Validate `(field, type)` pairs, keeping their order.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let conversions = pairs
            .into_iter()
            .map(|(field, datatype)| {
                let field = field.into();
                match datatype.as_ref().parse::<Datatype>() {
                    Ok(datatype) => Ok(Conversion { field, datatype }),
                    Err(()) => Err(ConfigError::ConvertDatatypeFormat { field, datatype: datatype.as_ref().to_string() }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConversionSpec { conversions })
    }

    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }

    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }

    /// Convert every configured field of `record` in place, tagging whatever could not be converted.
    pub fn apply<R: Record + ?Sized>(&self, record: &mut R) -> Vec<ConversionIssue> {
        let mut issues = Vec::new();

        for Conversion { field, datatype } in &self.conversions {
            let issue = match record.get(field) {
                None | Some(Value::Null) => ConversionIssue::NullValue { field: field.clone(), datatype: *datatype },
                Some(value) => match datatype.coerce(value) {
                    Some(converted) => {
                        record.set(field, converted);
                        continue;
                    }
                    None => ConversionIssue::Uncoercible { field: field.clone(), datatype: *datatype },
                },
            };

            tracing::warn!(field = %field, datatype = %datatype, value = ?record.get(field), "datatype conversion failed");
            record.tag(&issue.tag());
            issues.push(issue);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Event;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn int(s: &str) -> Value {
        Value::Int(s.parse().unwrap())
    }

    fn float(s: &str) -> Value {
        Value::Float(s.parse().unwrap())
    }

    #[test]
    fn only_int_and_float_are_accepted() {
        assert!(ConversionSpec::new([("code", "int"), ("cpu", "float")]).is_ok());
        for bad in ["integer", "Int", "FLOAT", "string", ""] {
            assert_eq!(
                ConversionSpec::new([("code", bad)]).unwrap_err(),
                ConfigError::ConvertDatatypeFormat { field: "code".into(), datatype: bad.into() }
            );
        }
    }

    #[test]
    fn coerces_text() {
        let cases = vec![
            (Datatype::Int, "00000001", int("1")),
            (Datatype::Int, "1234", int("1234")),
            (Datatype::Int, "12.34", int("12")),
            (Datatype::Int, "4394740425750718628", int("4394740425750718628")),
            (Datatype::Int, "98765432109876543210", int("98765432109876543210")),
            (Datatype::Float, "95.43", float("95.43")),
            (Datatype::Float, "1234", float("1234")),
            (Datatype::Float, "4394740425750718628.345324", float("4394740425750718628.345324")),
            (Datatype::Float, "1.5e3", float("1500")),
            (Datatype::Int, "-12.9", int("-12")),
        ];
        for (datatype, input, expected) in cases {
            assert_eq!(datatype.coerce(&Value::from(input)), Some(expected), "{datatype} {input}");
        }
    }

    #[test]
    fn keeps_every_digit() {
        let wide = "123456789012345678901234567890123";
        assert_eq!(Datatype::Int.coerce(&Value::from(wide)), Some(int(wide)));
        assert_eq!(Datatype::Int.coerce(&Value::from(wide)).unwrap().as_text().as_deref(), Some(wide));

        let precise = "0.123456789012345678901234567890123";
        let converted = Datatype::Float.coerce(&Value::from(precise)).unwrap();
        assert_eq!(converted, float(precise));
        assert_eq!(converted.as_text().as_deref(), Some(precise));
    }

    #[test]
    fn rejects_runaway_exponents() {
        assert_eq!(Datatype::Int.coerce(&Value::from("1e999999999")), None);
        assert_eq!(Datatype::Int.coerce(&Value::from("1e-999999999")), None);
        assert_eq!(Datatype::Int.coerce(&Value::from("1e20")), Some(int("100000000000000000000")));
    }

    #[test]
    fn retypes_numbers() {
        assert_eq!(Datatype::Int.coerce(&float("12.34")), Some(int("12")));
        assert_eq!(Datatype::Float.coerce(&int("1234")), Some(float("1234")));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(Datatype::Int.coerce(&Value::from("abc")), None);
        assert_eq!(Datatype::Int.coerce(&Value::from("")), None);
        assert_eq!(Datatype::Int.coerce(&Value::Map(BTreeMap::new())), None);
        assert_eq!(Datatype::Float.coerce(&Value::List(vec![])), None);
    }

    #[test]
    fn apply_converts_and_tags() {
        let spec = ConversionSpec::new([("code", "int"), ("ccu", "float"), ("other", "int")]).unwrap();
        let mut event = Event::with_fields([("code", Value::from("00000001")), ("other", Value::Map(BTreeMap::new()))]);

        let issues = spec.apply(&mut event);

        assert_eq!(event.get("code"), Some(&int("1")));
        assert_eq!(event.get("other"), Some(&Value::Map(BTreeMap::new())));
        assert_eq!(
            issues.iter().map(ConversionIssue::tag).collect::<Vec<_>>(),
            vec!["_dataconversionnullvalue_ccu_float", "_dataconversionuncoercible_other_int"]
        );
        assert_eq!(event.tags(), &["_dataconversionnullvalue_ccu_float", "_dataconversionuncoercible_other_int"]);
    }

    #[test]
    fn null_value_is_tagged_like_a_missing_one() {
        let spec = ConversionSpec::new([("code", "int")]).unwrap();
        let mut event: Event = serde_json::from_str(r#"{"code": null}"#).unwrap();

        let issues = spec.apply(&mut event);

        assert_eq!(issues, vec![ConversionIssue::NullValue { field: "code".into(), datatype: Datatype::Int }]);
        assert_eq!(event.tags(), &["_dataconversionnullvalue_code_int"]);
        assert_eq!(event.get("code"), Some(&Value::Null));
    }
}
