//! Builders for MapLibre-style style expressions.
//!
//! Expressions are plain JSON arrays. A filter of `null` clears the layer's
//! filter.

use serde_json::{json, Value};
use storemap_core::NameSet;

/// A filter no feature satisfies.
#[must_use]
pub fn never() -> Value {
    json!(["==", 1, 0])
}

/// Whether `property` holds one of `values`. An empty value list yields
/// [`never`] rather than an expression that some surfaces reject.
#[must_use]
pub fn property_in<I, S>(property: &str, values: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return never();
    }
    json!(["in", ["get", property], ["literal", values]])
}

/// Membership test over normalized names.
#[must_use]
pub fn name_in(property: &str, names: &NameSet) -> Value {
    property_in(property, names.iter())
}

#[must_use]
pub fn not(expr: Value) -> Value {
    json!(["!", expr])
}

/// Conjunction; a single operand is returned unwrapped.
#[must_use]
pub fn all(mut exprs: Vec<Value>) -> Value {
    if exprs.len() == 1 {
        return exprs.remove(0);
    }
    let mut out = vec![json!("all")];
    out.extend(exprs);
    Value::Array(out)
}

/// `then` where `condition` holds, `otherwise` elsewhere.
#[must_use]
pub fn case(condition: Value, then: Value, otherwise: Value) -> Value {
    json!(["case", condition, then, otherwise])
}

/// Features that are cluster bubbles rather than individual points.
#[must_use]
pub fn is_cluster() -> Value {
    json!(["has", "point_count"])
}

#[must_use]
pub fn unclustered() -> Value {
    not(is_cluster())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_membership_matches_nothing() {
        assert_eq!(property_in("code", Vec::<String>::new()), never());
        assert_eq!(name_in("match_name", &NameSet::new()), never());
    }

    #[test]
    fn membership_uses_literal_list() {
        let names = NameSet::from_names([" PRISTINA ", "Prizren"]);
        assert_eq!(
            name_in("match_name", &names),
            json!(["in", ["get", "match_name"], ["literal", ["pristina", "prizren"]]])
        );
    }

    #[test]
    fn all_unwraps_single_operand() {
        assert_eq!(all(vec![unclustered()]), json!(["!", ["has", "point_count"]]));
        assert_eq!(
            all(vec![unclustered(), never()]),
            json!(["all", ["!", ["has", "point_count"]], ["==", 1, 0]])
        );
    }
}
