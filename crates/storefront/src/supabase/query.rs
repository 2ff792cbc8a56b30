//! PostgREST query string builder.
//!
//! Produces the `(column, operator.value)` pairs PostgREST expects, e.g.
//! `status=eq.active`, `id=in.("a","b")`, `order=sort_order.asc`.

/// Query parameters for a PostgREST table read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Default for Query {
    fn default() -> Self {
        Self::select("*")
    }
}

impl Query {
    /// Start a query selecting `columns`.
    #[must_use]
    pub fn select(columns: &str) -> Self {
        Self {
            params: vec![("select".to_string(), columns.to_string())],
        }
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column IN (values)`. Every value is double-quoted so ids may
    /// contain PostgREST's reserved characters.
    #[must_use]
    pub fn is_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let list = values
            .into_iter()
            .map(|v| quote(v.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({list})")));
        self
    }

    /// Ascending order on `column`.
    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.params.push(("order".to_string(), format!("{column}.asc")));
        self
    }

    /// Row limit.
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    /// Query pairs, ready for `reqwest::RequestBuilder::query`.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &Query) -> Vec<(&str, &str)> {
        query
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_default_selects_all() {
        assert_eq!(pairs(&Query::default()), vec![("select", "*")]);
    }

    #[test]
    fn test_listing_query() {
        let query = Query::default()
            .eq("status", "active")
            .eq("category", "sleep")
            .order_asc("sort_order");
        assert_eq!(
            pairs(&query),
            vec![
                ("select", "*"),
                ("status", "eq.active"),
                ("category", "eq.sleep"),
                ("order", "sort_order.asc"),
            ]
        );
    }

    #[test]
    fn test_featured_query() {
        let query = Query::default().eq("featured", true).limit(4);
        assert_eq!(
            pairs(&query),
            vec![("select", "*"), ("featured", "eq.true"), ("limit", "4")]
        );
    }

    #[test]
    fn test_in_quotes_values() {
        let query = Query::select("id").is_in("id", ["a", "b,c", "say \"hi\""]);
        assert_eq!(pairs(&query)[1], ("id", r#"in.("a","b,c","say \"hi\"")"#));
    }
}
