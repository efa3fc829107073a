use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{postgres::PgRow, PgPool};

/// Maximum page size accepted on list endpoints
pub const MAX_PAGE_SIZE: u32 = 100;

/// Highest page number accepted on list endpoints
pub const MAX_PAGE: u32 = 100_000;

/// A value bound to a positional parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    Bool(bool),
    Date(NaiveDate),
}

/// SQL query builder for constructing parameterized list queries
/// Builds the page query and a matching COUNT query from the same filters
pub struct SQLQueryBuilder {
    select: String,
    from: String,
    where_clauses: Vec<String>,
    params: Vec<SqlParam>,
    order_clause: Option<String>,
    limit: u32,
    offset: u64,
}

impl SQLQueryBuilder {
    /// `select` is the column list, `from` the table expression (may include joins)
    pub fn new(select: &str, from: &str) -> Self {
        Self {
            select: select.to_string(),
            from: from.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
            limit: 10,
            offset: 0,
        }
    }

    fn next_placeholder(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    /// Case-insensitive partial match against any of the given columns
    pub fn add_search_filter(&mut self, columns: &[&str], search: &str) {
        if columns.is_empty() {
            return;
        }
        let placeholder = self.next_placeholder(SqlParam::Text(format!("%{}%", search)));
        let ors: Vec<String> = columns
            .iter()
            .map(|col| format!("{} ILIKE {}", col, placeholder))
            .collect();
        self.where_clauses.push(format!("({})", ors.join(" OR ")));
    }

    /// Exact match on a column
    pub fn add_eq_filter(&mut self, column: &str, value: SqlParam) {
        let placeholder = self.next_placeholder(value);
        self.where_clauses.push(format!("{} = {}", column, placeholder));
    }

    /// Match any of a set of integer ids
    pub fn add_in_filter(&mut self, column: &str, values: &[i32]) {
        if values.is_empty() {
            // Nothing can match an empty set
            self.where_clauses.push("FALSE".to_string());
            return;
        }
        let placeholders: Vec<String> = values
            .iter()
            .map(|v| self.next_placeholder(SqlParam::Int(*v)))
            .collect();
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
    }

    /// Sets the ORDER BY clause; `column` must come from a whitelist
    pub fn set_sort(&mut self, column: &str, order: SortOrder) {
        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        self.order_clause = Some(format!("{} {}", column, order_str));
    }

    /// Calculates LIMIT and OFFSET from a 1-indexed page number
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = u64::from(page.max(1) - 1).saturating_mul(u64::from(limit));
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Builds the page query; LIMIT/OFFSET are inlined as integers
    pub fn build(&self) -> (String, Vec<SqlParam>) {
        let mut query = format!("SELECT {} FROM {}{}", self.select, self.from, self.where_sql());
        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }
        query.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));
        (query, self.params.clone())
    }

    /// Builds the COUNT(*) query over the same filters
    pub fn build_count(&self) -> (String, Vec<SqlParam>) {
        (
            format!("SELECT COUNT(*) FROM {}{}", self.from, self.where_sql()),
            self.params.clone(),
        )
    }

    /// Run the page and count queries and return (rows, total)
    pub async fn fetch_page<T>(&self, pool: &PgPool) -> Result<(Vec<T>, i64), sqlx::Error>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let (sql, params) = self.build();
        let mut query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            query = match param {
                SqlParam::Text(v) => query.bind(v),
                SqlParam::Int(v) => query.bind(v),
                SqlParam::Bool(v) => query.bind(v),
                SqlParam::Date(v) => query.bind(v),
            };
        }
        let rows = query.fetch_all(pool).await?;

        let (count_sql, params) = self.build_count();
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in params {
            count = match param {
                SqlParam::Text(v) => count.bind(v),
                SqlParam::Int(v) => count.bind(v),
                SqlParam::Bool(v) => count.bind(v),
                SqlParam::Date(v) => count.bind(v),
            };
        }
        let total = count.fetch_one(pool).await?;

        Ok((rows, total))
    }
}

/// Paging, search and sort parameters common to list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    /// Search term for partial matching (case-insensitive)
    pub search: Option<String>,
    /// Sort key, must be one the endpoint allows
    pub sort: Option<String>,
    /// "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    /// Column name resolved from the endpoint's whitelist
    pub sort_column: Option<&'static str>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ValidatedQuery {
    /// Apply search, sort (or the fallback) and pagination to a builder
    pub fn apply(
        &self,
        builder: &mut SQLQueryBuilder,
        search_columns: &[&str],
        default_sort: &str,
    ) {
        if let Some(ref search) = self.search {
            builder.add_search_filter(search_columns, search);
        }
        match self.sort_column {
            Some(column) => builder.set_sort(column, self.sort_order),
            None => builder.set_sort(default_sort, self.sort_order),
        }
        builder.set_pagination(self.page, self.limit);
    }
}

/// Validation error type
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::error::ApiError {
    fn from(err: ValidationError) -> Self {
        crate::error::ApiError::BadRequest(err.message)
    }
}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters.
    /// `sortable` maps public sort keys to column names.
    pub fn validate(
        params: QueryParams,
        sortable: &[(&str, &'static str)],
    ) -> Result<ValidatedQuery, ValidationError> {
        let search = Self::normalize_string(params.search);

        let sort_column = match Self::normalize_string(params.sort) {
            Some(key) => Some(Self::parse_sort_field(&key, sortable)?),
            None => None,
        };

        let sort_order = match params.order {
            Some(order_str) => Self::parse_sort_order(&order_str)?,
            None => SortOrder::Asc,
        };

        let page = match params.page {
            Some(p) => {
                Self::validate_pagination_param(p, "page")?;
                if p > MAX_PAGE {
                    return Err(ValidationError {
                        message: format!("page không được vượt quá {}", MAX_PAGE),
                    });
                }
                p
            }
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => {
                Self::validate_pagination_param(l, "limit")?;
                l.min(MAX_PAGE_SIZE)
            }
            None => 10,
        };

        Ok(ValidatedQuery {
            search,
            sort_column,
            sort_order,
            page,
            limit,
        })
    }

    /// Trims whitespace; None if the string is empty or whitespace-only
    pub fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn parse_sort_field(
        s: &str,
        sortable: &[(&str, &'static str)],
    ) -> Result<&'static str, ValidationError> {
        let key = s.to_lowercase();
        sortable
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, column)| *column)
            .ok_or_else(|| {
                let allowed: Vec<&str> = sortable.iter().map(|(name, _)| *name).collect();
                ValidationError {
                    message: format!(
                        "Trường sắp xếp '{}' không hợp lệ. Cho phép: {}",
                        s,
                        allowed.join(", ")
                    ),
                }
            })
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, ValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError {
                message: format!("Thứ tự sắp xếp '{}' không hợp lệ. Chỉ chấp nhận 'asc' hoặc 'desc'", s),
            }),
        }
    }

    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError {
                message: format!("{} phải là số dương", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[(&str, &'static str)] = &[("name", "f.name"), ("created_at", "f.created_at")];

    #[test]
    fn test_sql_builder_basic_query() {
        let builder = SQLQueryBuilder::new("id, name", "facilities");
        let (query, params) = builder.build();
        assert_eq!(query, "SELECT id, name FROM facilities LIMIT 10 OFFSET 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_sql_builder_with_search_over_columns() {
        let mut builder = SQLQueryBuilder::new("*", "facilities");
        builder.add_search_filter(&["name", "address"], "quận 7");
        let (query, params) = builder.build();
        assert!(query.contains("WHERE (name ILIKE $1 OR address ILIKE $1)"));
        assert_eq!(params, vec![SqlParam::Text("%quận 7%".to_string())]);
    }

    #[test]
    fn test_sql_builder_placeholders_are_sequential() {
        let mut builder = SQLQueryBuilder::new("*", "bookings b");
        builder.add_eq_filter("b.facility_id", SqlParam::Int(3));
        builder.add_eq_filter("b.status", SqlParam::Text("pending".into()));
        builder.add_in_filter("b.field_id", &[1, 2]);
        let (query, params) = builder.build();
        assert!(query.contains("b.facility_id = $1 AND b.status = $2 AND b.field_id IN ($3, $4)"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_sql_builder_empty_in_filter_matches_nothing() {
        let mut builder = SQLQueryBuilder::new("*", "bookings");
        builder.add_in_filter("facility_id", &[]);
        let (query, params) = builder.build();
        assert!(query.contains("WHERE FALSE"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_sql_builder_count_shares_filters() {
        let mut builder = SQLQueryBuilder::new("*", "fields");
        builder.add_eq_filter("facility_id", SqlParam::Int(9));
        builder.set_sort("name", SortOrder::Desc);
        builder.set_pagination(3, 20);
        let (query, _) = builder.build();
        let (count, params) = builder.build_count();
        assert!(query.ends_with("ORDER BY name DESC LIMIT 20 OFFSET 40"));
        assert_eq!(count, "SELECT COUNT(*) FROM fields WHERE facility_id = $1");
        assert_eq!(params, vec![SqlParam::Int(9)]);
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(
            QueryValidator::normalize_string(Some("  sân 5  ".into())),
            Some("sân 5".to_string())
        );
        assert_eq!(QueryValidator::normalize_string(Some("   ".into())), None);
        assert_eq!(QueryValidator::normalize_string(None), None);
    }

    #[test]
    fn test_validate_defaults() {
        let validated = QueryValidator::validate(QueryParams::default(), SORTABLE).unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 10);
        assert_eq!(validated.sort_column, None);
        assert_eq!(validated.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_validate_sort_whitelist() {
        let params = QueryParams {
            sort: Some("NAME".into()),
            order: Some("desc".into()),
            ..Default::default()
        };
        let validated = QueryValidator::validate(params, SORTABLE).unwrap();
        assert_eq!(validated.sort_column, Some("f.name"));
        assert_eq!(validated.sort_order, SortOrder::Desc);

        let params = QueryParams {
            sort: Some("password_hash".into()),
            ..Default::default()
        };
        assert!(QueryValidator::validate(params, SORTABLE).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page() {
        let params = QueryParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(QueryValidator::validate(params, SORTABLE).is_err());
    }

    #[test]
    fn test_validate_rejects_page_past_maximum() {
        let params = QueryParams {
            page: Some(50_000_000),
            limit: Some(100),
            ..Default::default()
        };
        let err = QueryValidator::validate(params, SORTABLE).unwrap_err();
        assert!(err.message.contains("page"));
    }

    #[test]
    fn test_pagination_offset_does_not_overflow() {
        let mut builder = SQLQueryBuilder::new("id", "facilities");
        builder.set_pagination(u32::MAX, MAX_PAGE_SIZE);
        let (query, _) = builder.build();
        assert!(query.ends_with("LIMIT 100 OFFSET 429496729400"));
    }

    #[test]
    fn test_validate_caps_limit() {
        let params = QueryParams {
            limit: Some(5000),
            ..Default::default()
        };
        let validated = QueryValidator::validate(params, SORTABLE).unwrap();
        assert_eq!(validated.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_order_rejected() {
        let params = QueryParams {
            order: Some("sideways".into()),
            ..Default::default()
        };
        assert!(QueryValidator::validate(params, SORTABLE).is_err());
    }
}
