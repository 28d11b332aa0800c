use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::application::filter::{FilterKey, FilterValue, KeyFilter, ValueKind};

/// Append `filter` to a `WHERE` clause as `AND` predicates.
///
/// Unconstrained keys add nothing, an empty value list adds `FALSE`, a
/// single value compares with `=`, and several values use `= ANY(...)`.
/// Values are bound with the key's [`ValueKind`]; a value of the other kind
/// can never match and is left out.
pub(super) fn push_key_filter<K, F>(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: Option<&KeyFilter<K>>,
    column: F,
) where
    K: FilterKey,
    F: Fn(K) -> &'static str,
{
    let Some(filter) = filter else {
        return;
    };

    for (key, allowed) in filter.constraints() {
        let Some(allowed) = allowed else {
            continue;
        };
        let column = column(key);

        match key.value_kind() {
            ValueKind::Bool => {
                let values: Vec<bool> = allowed
                    .iter()
                    .filter_map(|value| match value {
                        FilterValue::Bool(value) => Some(*value),
                        FilterValue::Text(_) => None,
                    })
                    .collect();
                push_membership(qb, column, values);
            }
            ValueKind::Text => {
                let values: Vec<String> = allowed
                    .iter()
                    .filter_map(|value| match value {
                        FilterValue::Text(value) => Some(value.clone()),
                        FilterValue::Bool(_) => None,
                    })
                    .collect();
                push_membership(qb, column, values);
            }
        }
    }
}

fn push_membership<'args, T>(
    qb: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    mut values: Vec<T>,
) where
    T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    Vec<T>: 'args + Encode<'args, Postgres> + Type<Postgres>,
{
    match values.len() {
        0 => {
            qb.push(" AND FALSE");
        }
        1 => {
            qb.push(format!(" AND {column} = "));
            if let Some(value) = values.pop() {
                qb.push_bind(value);
            }
        }
        _ => {
            qb.push(format!(" AND {column} = ANY("));
            qb.push_bind(values);
            qb.push(")");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::filter::FieldKey;

    fn column(key: FieldKey) -> &'static str {
        match key {
            FieldKey::Name => "name",
            FieldKey::IsPrimary => "is_primary",
            FieldKey::IsLookup => "is_lookup",
            _ => "other",
        }
    }

    fn render(filter: &KeyFilter<FieldKey>) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_key_filter(&mut qb, Some(filter), column);
        qb.sql().to_string()
    }

    #[test]
    fn unconstrained_keys_add_nothing() {
        let filter = KeyFilter::new().unconstrained(FieldKey::Name);
        assert_eq!(render(&filter), "SELECT 1 WHERE TRUE");
    }

    #[test]
    fn empty_list_excludes_everything() {
        let filter = KeyFilter::new().allow(FieldKey::Name, Vec::<String>::new());
        assert_eq!(render(&filter), "SELECT 1 WHERE TRUE AND FALSE");
    }

    #[test]
    fn single_and_multiple_values() {
        let filter = KeyFilter::new()
            .allow(FieldKey::IsPrimary, [true])
            .allow(FieldKey::Name, ["a", "b"]);
        assert_eq!(
            render(&filter),
            "SELECT 1 WHERE TRUE AND is_primary = $1 AND name = ANY($2)"
        );
    }

    #[test]
    fn boolean_keys_bind_booleans_only() {
        let mut filter = KeyFilter::new().allow(FieldKey::IsLookup, [true, false]);
        assert_eq!(
            render(&filter),
            "SELECT 1 WHERE TRUE AND is_lookup = ANY($1)"
        );

        filter = KeyFilter::new().allow(FieldKey::IsPrimary, ["not a bool"]);
        assert_eq!(render(&filter), "SELECT 1 WHERE TRUE AND FALSE");
    }
}
