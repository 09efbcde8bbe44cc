//! SQL compilation of translated queries.
//!
//! [`SqlCompiler`] turns a [`QueryAst`] into parameterized SQL for
//! PostgreSQL (`$1, $2, ...`) or SQLite / MySQL (`?`). Only what a single
//! statement can express is accepted: filters, one ordering chain, skip/take,
//! and a scalar or object `Select`. Group-and-flatten, `SelectMany`, and
//! filters or orderings after paging are rejected with
//! [`SpecError::Unsupported`]. Search patterns using `[...]` sets compile to a
//! case-insensitive regular expression match, which SQLite lacks.
//!
//! ```
//! use queryspec_core::SqlBackend;
//! use queryspec_db::expr::Lambda;
//! use queryspec_db::query::{Query, SqlCompiler};
//! use queryspec_db::record::Row;
//! use queryspec_db::value::Value;
//!
//! let q = Query::<Row>::new()
//!     .filter(Lambda::new(|x| x.member("age").gt(18)))
//!     .take(10);
//! let (sql, params) = SqlCompiler::new(SqlBackend::PostgreSQL).compile_select(q.ast()).unwrap();
//! assert_eq!(sql, "SELECT * FROM \"row\" WHERE (\"age\" > $1) LIMIT 10");
//! assert_eq!(params, vec![Value::Int(18)]);
//! ```

use queryspec_core::{Settings, SpecError, SpecResult, SqlBackend};

use super::ast::{QueryAst, QueryOp};
use crate::expr::{BinaryOp, Expr, Lambda, ParamId, SetPropertyCalls};
use crate::search::{sql_pattern, SqlPattern};
use crate::value::Value;

/// The pieces of a SELECT gathered from the op list.
#[derive(Default)]
struct Plan<'a> {
    filters: Vec<&'a Lambda>,
    order: Vec<(&'a Lambda, bool)>,
    offset: usize,
    limit: Option<usize>,
    select: Option<&'a Lambda>,
}

impl Plan<'_> {
    const fn is_paged(&self) -> bool {
        self.offset > 0 || self.limit.is_some()
    }
}

const fn describe(op: &QueryOp) -> &'static str {
    match op {
        QueryOp::Filter(_) => "filter",
        QueryOp::OrderBy { .. } => "order_by",
        QueryOp::ThenBy { .. } => "then_by",
        QueryOp::GroupFlatten(_) => "group_by",
        QueryOp::Skip(_) => "skip",
        QueryOp::Take(_) => "take",
        QueryOp::Select(_) => "select",
        QueryOp::SelectMany(_) => "select_many",
    }
}

fn plan(ast: &QueryAst) -> SpecResult<Plan<'_>> {
    let mut plan = Plan::default();
    for op in &ast.ops {
        let after = if plan.select.is_some() {
            Some("projection")
        } else if plan.is_paged() {
            Some("skip/take")
        } else {
            None
        };
        match op {
            QueryOp::Filter(_) | QueryOp::OrderBy { .. } | QueryOp::ThenBy { .. } if after.is_some() => {
                return Err(SpecError::Unsupported(format!(
                    "{} after {} cannot be expressed as a single SQL statement",
                    describe(op),
                    after.unwrap_or_default()
                )));
            }
            QueryOp::Filter(predicate) => plan.filters.push(predicate),
            QueryOp::OrderBy { key, descending } => plan.order = vec![(key, *descending)],
            QueryOp::ThenBy { key, descending } => {
                if plan.order.is_empty() {
                    return Err(SpecError::MissingPrimaryOrder);
                }
                plan.order.push((key, *descending));
            }
            QueryOp::Skip(n) => {
                plan.offset += n;
                plan.limit = plan.limit.map(|l| l.saturating_sub(*n));
            }
            QueryOp::Take(n) => plan.limit = Some(plan.limit.map_or(*n, |l| l.min(*n))),
            QueryOp::Select(selector) if plan.select.is_none() => plan.select = Some(selector),
            QueryOp::GroupFlatten(_) | QueryOp::Select(_) | QueryOp::SelectMany(_) => {
                return Err(SpecError::Unsupported(format!(
                    "{} cannot be expressed as a single SQL statement",
                    describe(op)
                )));
            }
        }
    }
    Ok(plan)
}

/// Translates a [`QueryAst`] into parameterized SQL.
///
/// Different backends use different placeholder styles:
/// - PostgreSQL: `$1, $2, $3, ...`
/// - SQLite / MySQL: `?, ?, ?, ...`
#[derive(Debug, Clone, Copy)]
pub struct SqlCompiler {
    backend: SqlBackend,
}

impl SqlCompiler {
    /// Creates a new compiler for the given backend.
    pub const fn new(backend: SqlBackend) -> Self {
        Self { backend }
    }

    /// Creates a compiler for the backend named in the settings.
    pub const fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.sql_backend)
    }

    /// Returns a parameter placeholder for the given 1-based index.
    fn placeholder(&self, index: usize) -> String {
        match self.backend {
            SqlBackend::PostgreSQL => format!("${index}"),
            SqlBackend::SQLite | SqlBackend::MySQL => "?".to_string(),
        }
    }

    fn bind(&self, value: &Value, params: &mut Vec<Value>) -> String {
        params.push(value.clone());
        self.placeholder(params.len())
    }

    /// Compiles a SELECT statement.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Unsupported`] for operations a single SELECT
    /// cannot express, and [`SpecError::MissingPrimaryOrder`] for a
    /// secondary ordering with no primary.
    pub fn compile_select(&self, query: &QueryAst) -> SpecResult<(String, Vec<Value>)> {
        let plan = plan(query)?;
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        match plan.select {
            Some(selector) => sql.push_str(&self.compile_projection(selector, &mut params)?),
            None => sql.push('*'),
        }
        sql.push_str(&format!(" FROM \"{}\"", query.entity));

        self.push_where(&plan.filters, &mut sql, &mut params)?;

        if !plan.order.is_empty() {
            let orders = plan
                .order
                .iter()
                .map(|(key, descending)| {
                    let dir = if *descending { " DESC" } else { " ASC" };
                    Ok(format!("{}{dir}", self.compile_expr(&key.body, key.param, &mut params)?))
                })
                .collect::<SpecResult<Vec<_>>>()?;
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        match (plan.limit, plan.offset) {
            (Some(limit), 0) => sql.push_str(&format!(" LIMIT {limit}")),
            (Some(limit), offset) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (None, 0) => {}
            // SQLite and MySQL need a LIMIT before OFFSET
            (None, offset) => match self.backend {
                SqlBackend::PostgreSQL => sql.push_str(&format!(" OFFSET {offset}")),
                SqlBackend::SQLite => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
                SqlBackend::MySQL => {
                    sql.push_str(&format!(" LIMIT 18446744073709551615 OFFSET {offset}"));
                }
            },
        }

        Ok((sql, params))
    }

    /// Compiles an UPDATE statement from a filter-only query and a composed
    /// update instruction.
    ///
    /// A property assigned more than once is set once, to the last value.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::EmptyUpdateInstructions`] when the instruction
    /// assigns nothing, and [`SpecError::Unsupported`] when the query has
    /// anything besides filters.
    pub fn compile_update(&self, query: &QueryAst, instruction: &Lambda) -> SpecResult<(String, Vec<Value>)> {
        let filters = Self::filters_only(query, "UPDATE")?;
        let calls = SetPropertyCalls::new().apply(instruction)?;
        if calls.is_empty() {
            return Err(SpecError::EmptyUpdateInstructions);
        }

        let mut assignments: Vec<(&str, &Lambda)> = Vec::new();
        for assignment in calls.assignments() {
            match assignments.iter_mut().find(|(p, _)| *p == assignment.property) {
                Some(slot) => slot.1 = &assignment.value,
                None => assignments.push((assignment.property.as_str(), &assignment.value)),
            }
        }

        let mut params = Vec::new();
        let set_parts = assignments
            .iter()
            .map(|(property, value)| {
                let rhs = self.compile_expr(&value.body, value.param, &mut params)?;
                Ok(format!("\"{property}\" = {rhs}"))
            })
            .collect::<SpecResult<Vec<_>>>()?;

        let mut sql = format!("UPDATE \"{}\" SET {}", query.entity, set_parts.join(", "));
        self.push_where(&filters, &mut sql, &mut params)?;
        Ok((sql, params))
    }

    /// Compiles a DELETE statement from a filter-only query.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Unsupported`] when the query has anything
    /// besides filters.
    pub fn compile_delete(&self, query: &QueryAst) -> SpecResult<(String, Vec<Value>)> {
        let filters = Self::filters_only(query, "DELETE")?;
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM \"{}\"", query.entity);
        self.push_where(&filters, &mut sql, &mut params)?;
        Ok((sql, params))
    }

    fn filters_only<'a>(query: &'a QueryAst, statement: &str) -> SpecResult<Vec<&'a Lambda>> {
        query
            .ops
            .iter()
            .map(|op| match op {
                QueryOp::Filter(predicate) => Ok(predicate),
                other => Err(SpecError::Unsupported(format!(
                    "{} in an {statement} statement",
                    describe(other)
                ))),
            })
            .collect()
    }

    fn push_where(&self, filters: &[&Lambda], sql: &mut String, params: &mut Vec<Value>) -> SpecResult<()> {
        if filters.is_empty() {
            return Ok(());
        }
        let conditions = filters
            .iter()
            .map(|f| self.compile_expr(&f.body, f.param, params))
            .collect::<SpecResult<Vec<_>>>()?;
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
        Ok(())
    }

    fn compile_projection(&self, selector: &Lambda, params: &mut Vec<Value>) -> SpecResult<String> {
        match &selector.body {
            Expr::Object(fields) => {
                let columns = fields
                    .iter()
                    .map(|(alias, e)| {
                        Ok(format!("{} AS \"{alias}\"", self.compile_expr(e, selector.param, params)?))
                    })
                    .collect::<SpecResult<Vec<_>>>()?;
                Ok(columns.join(", "))
            }
            body => match body.member_path(selector.param) {
                Some(path) if path.is_empty() => Ok("*".to_string()),
                Some(path) => Ok(quote_path(&path)),
                None => Ok(format!("{} AS \"value\"", self.compile_expr(body, selector.param, params)?)),
            },
        }
    }

    /// Compiles one scalar expression where `param` stands for the current row.
    fn compile_expr(&self, expr: &Expr, param: ParamId, params: &mut Vec<Value>) -> SpecResult<String> {
        match expr {
            Expr::Param(id) if *id == param => Err(SpecError::Unsupported(
                "a bare entity reference has no SQL form".to_string(),
            )),
            Expr::Param(id) => Err(SpecError::UnboundParameter(id.to_string())),
            Expr::Const(Value::Null) => Ok("NULL".to_string()),
            Expr::Const(v) => Ok(self.bind(v, params)),
            Expr::Member { .. } => expr.member_path(param).map(|p| quote_path(&p)).ok_or_else(|| {
                SpecError::Unsupported(format!("member access on a computed value: {expr}"))
            }),
            Expr::Binary { op, lhs, rhs } => match (op, lhs.as_ref(), rhs.as_ref()) {
                (BinaryOp::Eq | BinaryOp::Ne, other, Expr::Const(Value::Null))
                | (BinaryOp::Eq | BinaryOp::Ne, Expr::Const(Value::Null), other) => {
                    let operand = self.compile_expr(other, param, params)?;
                    let not = if *op == BinaryOp::Ne { " NOT" } else { "" };
                    Ok(format!("{operand} IS{not} NULL"))
                }
                (BinaryOp::Add, l, r) if is_string_const(l) || is_string_const(r) => {
                    let l = self.compile_expr(l, param, params)?;
                    let r = self.compile_expr(r, param, params)?;
                    Ok(match self.backend {
                        SqlBackend::MySQL => format!("CONCAT({l}, {r})"),
                        SqlBackend::PostgreSQL | SqlBackend::SQLite => format!("({l} || {r})"),
                    })
                }
                (op, l, r) => {
                    let l = self.compile_expr(l, param, params)?;
                    let r = self.compile_expr(r, param, params)?;
                    Ok(format!("({l} {} {r})", sql_operator(*op)))
                }
            },
            Expr::Not(inner) => Ok(format!("NOT ({})", self.compile_expr(inner, param, params)?)),
            Expr::IsNull(inner) => Ok(format!("{} IS NULL", self.compile_expr(inner, param, params)?)),
            Expr::Like { input, pattern } => {
                let input = self.compile_expr(input, param, params)?;
                match pattern.as_ref() {
                    Expr::Const(Value::String(raw)) => self.compile_like(&input, raw, params),
                    computed => {
                        let pattern = self.compile_expr(computed, param, params)?;
                        Ok(self.like_sql(&input, &pattern))
                    }
                }
            }
            Expr::Object(_) | Expr::List(_) | Expr::SetProperty { .. } => Err(SpecError::Unsupported(
                format!("{expr} cannot be used as a scalar SQL expression"),
            )),
        }
    }

    fn like_sql(&self, input: &str, pattern: &str) -> String {
        match self.backend {
            SqlBackend::PostgreSQL => format!("{input} ILIKE {pattern}"),
            SqlBackend::SQLite | SqlBackend::MySQL => format!("LOWER({input}) LIKE LOWER({pattern})"),
        }
    }

    /// Compiles a match against a constant pattern. Sets become a
    /// case-insensitive regular expression where the backend has one.
    fn compile_like(&self, input: &str, raw: &str, params: &mut Vec<Value>) -> SpecResult<String> {
        match sql_pattern(raw)? {
            SqlPattern::Like(pattern) => {
                // PostgreSQL and MySQL treat `\` as the default LIKE escape.
                let pattern = match self.backend {
                    SqlBackend::SQLite => pattern,
                    SqlBackend::PostgreSQL | SqlBackend::MySQL => pattern.replace('\\', "\\\\"),
                };
                let pattern = self.bind(&Value::String(pattern), params);
                Ok(self.like_sql(input, &pattern))
            }
            SqlPattern::Regex(regex) => match self.backend {
                SqlBackend::PostgreSQL => Ok(format!("{input} ~* {}", self.bind(&Value::String(regex), params))),
                SqlBackend::MySQL => Ok(format!(
                    "REGEXP_LIKE({input}, {}, 'i')",
                    self.bind(&Value::String(regex), params)
                )),
                SqlBackend::SQLite => Err(SpecError::Unsupported(format!(
                    "character sets in search pattern {raw:?} have no SQLite form"
                ))),
            },
        }
    }
}

fn quote_path(path: &[String]) -> String {
    path.iter()
        .map(|segment| format!("\"{segment}\""))
        .collect::<Vec<_>>()
        .join(".")
}

const fn is_string_const(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(Value::String(_)))
}

const fn sql_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "=",
        BinaryOp::Ne => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::record::Row;

    fn pg() -> SqlCompiler {
        SqlCompiler::new(SqlBackend::PostgreSQL)
    }

    fn sqlite() -> SqlCompiler {
        SqlCompiler::new(SqlBackend::SQLite)
    }

    fn mysql() -> SqlCompiler {
        SqlCompiler::new(SqlBackend::MySQL)
    }

    // ── SELECT ───────────────────────────────────────────────────────

    #[test]
    fn test_select_all() {
        let (sql, params) = pg().compile_select(Query::<Row>::new().ast()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"row\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_filter_order_page() {
        let q = Query::<Row>::new()
            .filter(Lambda::new(|x| x.member("n").gt(5)))
            .order_by(Lambda::member("n"), false)
            .skip(1)
            .take(2);
        let (sql, params) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"row\" WHERE (\"n\" > $1) ORDER BY \"n\" ASC LIMIT 2 OFFSET 1"
        );
        assert_eq!(params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_take_then_skip_narrows_limit() {
        let q = Query::<Row>::new().take(5).skip(2);
        let (sql, _) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"row\" LIMIT 3 OFFSET 2");
    }

    #[test]
    fn test_offset_without_limit_per_backend() {
        let q = Query::<Row>::new().skip(3);
        assert_eq!(pg().compile_select(q.ast()).unwrap().0, "SELECT * FROM \"row\" OFFSET 3");
        assert_eq!(
            sqlite().compile_select(q.ast()).unwrap().0,
            "SELECT * FROM \"row\" LIMIT -1 OFFSET 3"
        );
        assert_eq!(
            mysql().compile_select(q.ast()).unwrap().0,
            "SELECT * FROM \"row\" LIMIT 18446744073709551615 OFFSET 3"
        );
    }

    #[test]
    fn test_multiple_filters_and_placeholders() {
        let q = Query::<Row>::new()
            .filter(Lambda::new(|x| x.member("n").ge(1)))
            .filter(Lambda::new(|x| x.member("n").lt(9)));
        let (sql, params) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"row\" WHERE (\"n\" >= $1) AND (\"n\" < $2)");
        assert_eq!(params.len(), 2);
        let (sql, _) = sqlite().compile_select(q.ast()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"row\" WHERE (\"n\" >= ?) AND (\"n\" < ?)");
    }

    #[test]
    fn test_like_per_backend() {
        let q = Query::<Row>::new().filter(Lambda::new(|x| x.member("name").like("%ann%")));
        assert_eq!(
            pg().compile_select(q.ast()).unwrap().0,
            "SELECT * FROM \"row\" WHERE \"name\" ILIKE $1"
        );
        assert_eq!(
            mysql().compile_select(q.ast()).unwrap().0,
            "SELECT * FROM \"row\" WHERE LOWER(\"name\") LIKE LOWER(?)"
        );
    }

    #[test]
    fn test_null_comparisons() {
        let q = Query::<Row>::new()
            .filter(Lambda::new(|x| x.member("deleted_at").equals(Value::Null)))
            .filter(Lambda::new(|x| x.member("owner").not_equals(Value::Null)));
        let (sql, params) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"row\" WHERE \"deleted_at\" IS NULL AND \"owner\" IS NOT NULL"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_not_and_or() {
        let q = Query::<Row>::new().filter(Lambda::new(|x| {
            !(x.clone().member("a").equals(1) | x.member("b").is_null())
        }));
        let (sql, _) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"row\" WHERE NOT (((\"a\" = $1) OR \"b\" IS NULL))"
        );
    }

    #[test]
    fn test_string_concat() {
        let q = Query::<Row>::new().select::<String>(Lambda::new(|x| x.member("first") + Expr::val("!")));
        assert_eq!(
            pg().compile_select(q.ast()).unwrap().0,
            "SELECT (\"first\" || $1) AS \"value\" FROM \"row\""
        );
        assert_eq!(
            mysql().compile_select(q.ast()).unwrap().0,
            "SELECT CONCAT(\"first\", ?) AS \"value\" FROM \"row\""
        );
    }

    #[test]
    fn test_select_object_and_member() {
        let q = Query::<Row>::new().select::<Value>(Lambda::new(|x| {
            Expr::object([
                ("n", x.clone().member("name")),
                ("next", x.member("age") + Expr::val(1)),
            ])
        }));
        let (sql, params) = pg().compile_select(q.ast()).unwrap();
        assert_eq!(sql, "SELECT \"name\" AS \"n\", (\"age\" + $1) AS \"next\" FROM \"row\"");
        assert_eq!(params, vec![Value::Int(1)]);

        let q = Query::<Row>::new().select::<String>(Lambda::new(|x| x.member("address").member("city")));
        assert_eq!(
            pg().compile_select(q.ast()).unwrap().0,
            "SELECT \"address\".\"city\" FROM \"row\""
        );
    }

    #[test]
    fn test_order_then_by_desc() {
        let q = Query::<Row>::new()
            .order_by(Lambda::member("last"), false)
            .then_by(Lambda::member("first"), true);
        assert_eq!(
            pg().compile_select(q.ast()).unwrap().0,
            "SELECT * FROM \"row\" ORDER BY \"last\" ASC, \"first\" DESC"
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        let grouped = Query::<Row>::new().group_flatten(Lambda::member("k"));
        assert!(matches!(pg().compile_select(grouped.ast()), Err(SpecError::Unsupported(_))));

        let many = Query::<Row>::new().select_many::<Value>(Lambda::member("tags"));
        assert!(matches!(pg().compile_select(many.ast()), Err(SpecError::Unsupported(_))));

        let late_filter = Query::<Row>::new()
            .take(3)
            .filter(Lambda::new(|x| x.member("n").gt(1)));
        let err = pg().compile_select(late_filter.ast()).unwrap_err();
        assert!(err.to_string().contains("filter after skip/take"));

        let orphan = Query::<Row>::new().then_by(Lambda::member("n"), false);
        assert!(matches!(pg().compile_select(orphan.ast()), Err(SpecError::MissingPrimaryOrder)));
    }

    // ── UPDATE / DELETE ──────────────────────────────────────────────

    #[test]
    fn test_update() {
        let q = Query::<Row>::new().filter(Lambda::new(|x| x.member("id").equals(7)));
        let instruction = Lambda::new(|c| {
            c.set("x", 1)
                .set_property("y", Lambda::new(|e| e.member("y") + Expr::val(2)))
        });
        let (sql, params) = pg().compile_update(q.ast(), &instruction).unwrap();
        assert_eq!(
            sql,
            "UPDATE \"row\" SET \"x\" = $1, \"y\" = (\"y\" + $2) WHERE (\"id\" = $3)"
        );
        assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::Int(7)]);
    }

    #[test]
    fn test_update_dedupes_properties() {
        let q = Query::<Row>::new();
        let instruction = Lambda::new(|c| c.set("x", 1).set("y", 2).set("x", 3));
        let (sql, params) = sqlite().compile_update(q.ast(), &instruction).unwrap();
        assert_eq!(sql, "UPDATE \"row\" SET \"x\" = ?, \"y\" = ?");
        assert_eq!(params, vec![Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn test_update_rejects_paging_and_empty() {
        let paged = Query::<Row>::new().take(1);
        let instruction = Lambda::new(|c| c.set("x", 1));
        assert!(matches!(
            pg().compile_update(paged.ast(), &instruction),
            Err(SpecError::Unsupported(_))
        ));
        let empty = Lambda::identity();
        assert!(matches!(
            pg().compile_update(Query::<Row>::new().ast(), &empty),
            Err(SpecError::EmptyUpdateInstructions)
        ));
    }

    #[test]
    fn test_delete() {
        let q = Query::<Row>::new().filter(Lambda::new(|x| x.member("id").equals(7)));
        let (sql, params) = mysql().compile_delete(q.ast()).unwrap();
        assert_eq!(sql, "DELETE FROM \"row\" WHERE (\"id\" = ?)");
        assert_eq!(params, vec![Value::Int(7)]);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.sql_backend = SqlBackend::SQLite;
        let (sql, _) = SqlCompiler::from_settings(&settings)
            .compile_select(Query::<Row>::new().filter(Lambda::new(|x| x.member("a").equals(1))).ast())
            .unwrap();
        assert!(sql.ends_with("= ?)"));
    }
}
