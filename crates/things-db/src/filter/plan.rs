//! Compiled query plans.

use things_model::{TaskKind, ThingsDate};

use super::sort::DEFAULT_ORDER_BY;
use super::TaskFilter;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        QueryParam::Int(value)
    }
}

impl From<f64> for QueryParam {
    fn from(value: f64) -> Self {
        QueryParam::Real(value)
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Text(value.to_string())
    }
}

impl From<ThingsDate> for QueryParam {
    fn from(value: ThingsDate) -> Self {
        QueryParam::Int(value.raw())
    }
}

/// The conjunctive predicates, bindings, order and pagination for one task
/// query.
///
/// Predicates refer to the aliases of the repository's task query: `t` for
/// the task, `p` its project, `a` its area, `h` its heading and `hp` the
/// heading's project. Parameters are listed in the order their placeholders
/// appear in `predicates`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<String>,
    pub params: Vec<QueryParam>,
    pub order_by: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl QueryPlan {
    /// `WHERE ... ORDER BY ... [LIMIT ... OFFSET ...]` with every binding,
    /// pagination included.
    pub fn sql_tail(&self) -> (String, Vec<QueryParam>) {
        let mut sql = String::from(" WHERE 1=1");
        for predicate in &self.predicates {
            sql.push_str(" AND ");
            sql.push_str(predicate);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order_by);

        let mut params = self.params.clone();
        match (self.limit, self.offset) {
            (Some(limit), offset) if limit > 0 => {
                sql.push_str(" LIMIT ?");
                params.push(QueryParam::Int(limit as i64));
                if let Some(offset) = offset.filter(|o| *o > 0) {
                    sql.push_str(" OFFSET ?");
                    params.push(QueryParam::Int(offset as i64));
                }
            }
            (_, Some(offset)) if offset > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(QueryParam::Int(offset as i64));
            }
            _ => {}
        }
        (sql, params)
    }
}

/// Escapes `\`, `%` and `_` so a search term matches literally under
/// `LIKE ... ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl TaskFilter {
    /// Compiles the filter into a query plan.
    ///
    /// Every set field adds one predicate; unset fields add none. The output
    /// is deterministic for a given filter. A view scope goes right after the
    /// kinds, and its order applies when the filter has no sort of its own.
    pub fn to_query_plan(&self) -> QueryPlan {
        let mut predicates: Vec<String> = Vec::new();
        let mut params: Vec<QueryParam> = Vec::new();

        if !self.kinds.is_empty() {
            let placeholders = vec!["?"; self.kinds.len()].join(",");
            predicates.push(format!("t.type IN ({placeholders})"));
            params.extend(self.kinds.iter().map(|k| QueryParam::Int(k.code())));
        }
        if let Some(scope) = &self.scope {
            predicates.push(format!("({})", scope.predicate));
            params.extend(scope.params.iter().cloned());
        }
        if !self.include_trashed {
            predicates.push("t.trashed = 0".to_string());
        }
        if self.exclude_trashed_context {
            predicates.push("NOT IFNULL(p.trashed, 0)".to_string());
            predicates.push("NOT IFNULL(hp.trashed, 0)".to_string());
        }
        if let Some(status) = self.status {
            predicates.push("t.status = ?".to_string());
            params.push(QueryParam::Int(status.code()));
        }
        if let Some(project) = &self.project_id {
            predicates.push("(t.project = ? OR hp.uuid = ?)".to_string());
            params.push(project.as_str().into());
            params.push(project.as_str().into());
        }
        if let Some(area) = &self.area_id {
            predicates.push("t.area = ?".to_string());
            params.push(area.as_str().into());
        }
        if let Some(tag) = &self.tag_id {
            predicates.push(
                "EXISTS (SELECT 1 FROM TMTaskTag tt WHERE tt.tasks = t.uuid AND tt.tags = ?)"
                    .to_string(),
            );
            params.push(tag.as_str().into());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(
                "(lower(t.title) LIKE lower(?) ESCAPE '\\' OR lower(t.notes) LIKE lower(?) ESCAPE '\\' OR lower(a.title) LIKE lower(?) ESCAPE '\\')"
                    .to_string(),
            );
            let like = format!("%{}%", escape_like(search));
            for _ in 0..3 {
                params.push(QueryParam::Text(like.clone()));
            }
        }
        if let Some(value) = self.created_after {
            predicates.push("t.creationDate >= ?".to_string());
            params.push(value.into());
        }
        if let Some(value) = self.created_before {
            predicates.push("t.creationDate < ?".to_string());
            params.push(value.into());
        }
        if let Some(value) = self.modified_after {
            predicates.push("t.userModificationDate >= ?".to_string());
            params.push(value.into());
        }
        if let Some(value) = self.modified_before {
            predicates.push("t.userModificationDate < ?".to_string());
            params.push(value.into());
        }
        if let Some(value) = self.due_before {
            predicates.push("t.deadline IS NOT NULL AND t.deadline <= ?".to_string());
            params.push(value.into());
        }
        if let Some(value) = self.start_before {
            predicates.push("t.startDate IS NOT NULL AND t.startDate <= ?".to_string());
            params.push(value.into());
        }
        match self.has_url {
            Some(true) => predicates.push(
                "(IFNULL(t.notes, '') LIKE '%http://%' OR IFNULL(t.notes, '') LIKE '%https://%')"
                    .to_string(),
            ),
            Some(false) => predicates.push(
                "(IFNULL(t.notes, '') NOT LIKE '%http://%' AND IFNULL(t.notes, '') NOT LIKE '%https://%')"
                    .to_string(),
            ),
            None => {}
        }
        if self.repeating_only {
            predicates.push("t.rt1_recurrenceRule IS NOT NULL".to_string());
        } else if !self.include_repeating {
            predicates.push("t.rt1_recurrenceRule IS NULL".to_string());
        }

        QueryPlan {
            predicates,
            params,
            order_by: self
                .order
                .order_by()
                .or_else(|| {
                    self.scope
                        .as_ref()
                        .and_then(|s| s.order_by)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| DEFAULT_ORDER_BY.to_string()),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Kinds listed by the `todos` view when the caller does not choose.
pub const DEFAULT_KINDS: [TaskKind; 1] = [TaskKind::Todo];
