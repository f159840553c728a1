// src/dataverse/query.rs

/// OData system query options. Repositories always fill `select` with an
/// explicit column list; a wildcard projection is never sent.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub select: Vec<&'static str>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &[&'static str]) -> Self {
        self.select = columns.to_vec();
        self
    }

    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Render as query-string pairs; reqwest does the percent-encoding.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select", self.select.join(",")));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.clone()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby", order_by.clone()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        pairs
    }
}

/// Escape a single quote for use inside an OData string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_only_present_options() {
        let pairs = QueryOptions::new()
            .select(&["crdfd_name", "crdfd_phonenumber"])
            .top(50)
            .to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("$select", "crdfd_name,crdfd_phonenumber".to_string()),
                ("$top", "50".to_string()),
            ]
        );
    }

    #[test]
    fn renders_filter_order_and_skip() {
        let pairs = QueryOptions::new()
            .select(&["crdfd_name"])
            .filter("statecode eq 0")
            .order_by("createdon desc")
            .skip(10)
            .to_pairs();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[1], ("$filter", "statecode eq 0".to_string()));
        assert_eq!(pairs[2], ("$orderby", "createdon desc".to_string()));
    }

    #[test]
    fn escapes_quotes_in_literals() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
    }
}
