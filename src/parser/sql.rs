//! Queries and DML statements.

use super::lexer::TokenKind;
use super::tree::*;
use super::{PResult, Parser};

/// Words starting a join in a `from` clause
const JOIN_WORDS: &[&str] = &["join", "inner", "left", "right", "full", "cross", "natural", "outer"];

impl Parser<'_> {
    pub(super) fn at_query_start(&mut self) -> bool {
        self.at_any_word(&["select", "with"])
    }

    pub(super) fn at_sql_start(&mut self) -> bool {
        self.at_any_word(&["select", "with", "insert", "update", "delete"])
    }

    pub(super) fn dml(&mut self) -> PResult<Dml> {
        if self.at_word("insert") {
            return Ok(Dml::Insert(self.insert()?));
        }
        if self.at_word("update") {
            return Ok(Dml::Update(self.update()?));
        }
        if self.at_word("delete") {
            return Ok(Dml::Delete(self.delete()?));
        }
        Ok(Dml::Query(self.query()?))
    }

    pub(super) fn query(&mut self) -> PResult<Query> {
        self.nested(|p| {
            let with = if p.at_word("with") {
                Some(p.with_clause()?)
            } else {
                None
            };
            let first = p.query_term()?;
            let mut rest = Vec::new();
            while p.at_any_word(&["union", "intersect", "minus", "except"]) {
                let mut op = vec![p.keyword()];
                if let Some(all) = p.accept_word("all") {
                    op.push(all);
                }
                rest.push((op, p.query_term()?));
            }
            let order_by = p.order_by()?;
            let row_limit = p.row_limit()?;
            let for_update = p.for_update()?;
            Ok(Query {
                with,
                first,
                rest,
                order_by,
                row_limit,
                for_update,
            })
        })
    }

    fn with_clause(&mut self) -> PResult<WithClause> {
        let kw = self.keyword();
        let mut ctes = List::new();
        loop {
            let name = self.expect_identifier()?;
            let as_kw = self.expect_word("as")?;
            let query = self.subquery()?;
            ctes.items.push(Cte { name, as_kw, query });
            match self.accept_symbol(",") {
                Some(comma) => ctes.commas.push(comma),
                None => return Ok(WithClause { kw, ctes }),
            }
        }
    }

    fn query_term(&mut self) -> PResult<QueryTerm> {
        if self.at_symbol("(") {
            return Ok(QueryTerm::Nested(self.subquery()?));
        }
        Ok(QueryTerm::Select(Box::new(self.select()?)))
    }

    /// `( query )`
    pub(super) fn subquery(&mut self) -> PResult<Subquery> {
        let open = self.expect_symbol("(")?;
        let query = Box::new(self.query()?);
        let close = self.expect_symbol(")")?;
        Ok(Subquery { open, query, close })
    }

    fn select(&mut self) -> PResult<Select> {
        let select_kw = self.expect_word("select")?;
        let quantifier = if self.at_any_word(&["distinct", "unique", "all"]) {
            Some(self.keyword())
        } else {
            None
        };

        let mut items = List::new();
        loop {
            let expr = self.expr()?;
            let alias = self.alias(true)?;
            items.items.push(SelectItem { expr, alias });
            match self.accept_symbol(",") {
                Some(comma) => items.commas.push(comma),
                None => break,
            }
        }

        let into = self.into_clause()?;
        let from = match self.accept_word("from") {
            Some(kw) => Some(self.from_clause(kw)?),
            None => None,
        };
        let where_clause = self.condition(&["where"])?;

        let mut hierarchy = Vec::new();
        loop {
            if let Some(start) = self.accept_word("start") {
                let with = self.expect_word("with")?;
                let cond = self.expr()?;
                hierarchy.push(Condition {
                    kws: vec![start, with],
                    cond,
                });
            } else if let Some(connect) = self.accept_word("connect") {
                let mut kws = vec![connect, self.expect_word("by")?];
                if let Some(nocycle) = self.accept_word("nocycle") {
                    kws.push(nocycle);
                }
                let cond = self.expr()?;
                hierarchy.push(Condition { kws, cond });
            } else {
                break;
            }
        }

        let group_by = match self.accept_word("group") {
            Some(group) => {
                let by = self.expect_word("by")?;
                Some((vec![group, by], self.expr_list()?))
            }
            None => None,
        };
        let having = self.condition(&["having"])?;

        Ok(Select {
            select_kw,
            quantifier,
            items,
            into,
            from,
            where_clause,
            hierarchy,
            group_by,
            having,
        })
    }

    /// Clause keyword followed by a condition, if the keyword is next
    fn condition(&mut self, words: &[&str]) -> PResult<Option<Condition>> {
        if !self.at_word(words[0]) {
            return Ok(None);
        }
        let mut kws = Vec::with_capacity(words.len());
        for word in words {
            kws.push(self.expect_word(word)?);
        }
        let cond = self.expr()?;
        Ok(Some(Condition { kws, cond }))
    }

    fn expr_list(&mut self) -> PResult<List<Expr>> {
        let mut list = List::new();
        loop {
            list.items.push(self.expr()?);
            match self.accept_symbol(",") {
                Some(comma) => list.commas.push(comma),
                None => return Ok(list),
            }
        }
    }

    /// `into a, b` or `bulk collect into a, b`
    pub(super) fn into_clause(&mut self) -> PResult<Option<IntoClause>> {
        let mut kws = Vec::new();
        if self.at_word("bulk") && self.word_at(1, "collect") {
            kws.push(self.keyword());
            kws.push(self.keyword());
            kws.push(self.expect_word("into")?);
        } else if let Some(into) = self.accept_word("into") {
            kws.push(into);
        } else {
            return Ok(None);
        }
        let mut targets = List::new();
        loop {
            targets.items.push(self.primary()?);
            match self.accept_symbol(",") {
                Some(comma) => targets.commas.push(comma),
                None => return Ok(Some(IntoClause { kws, targets })),
            }
        }
    }

    fn from_clause(&mut self, kw: Tok) -> PResult<FromClause> {
        let mut tables = List::new();
        loop {
            let primary = self.table_primary()?;
            let mut joins = Vec::new();
            while let Some(join) = self.join()? {
                joins.push(join);
            }
            tables.items.push(TableRef { primary, joins });
            match self.accept_symbol(",") {
                Some(comma) => tables.commas.push(comma),
                None => return Ok(FromClause { kw, tables }),
            }
        }
    }

    fn table_primary(&mut self) -> PResult<TablePrimary> {
        if self.at_symbol("(") {
            let query = self.subquery()?;
            let alias = self.alias(false)?;
            return Ok(TablePrimary::Subquery { query, alias });
        }
        if self.at_word("table") && self.symbol_at(1, "(") {
            let kw = self.keyword();
            let open = self.advance();
            let expr = self.expr()?;
            let close = self.expect_symbol(")")?;
            let alias = self.alias(false)?;
            return Ok(TablePrimary::Collection {
                kw,
                open,
                expr,
                close,
                alias,
            });
        }
        let name = self.name()?;
        let alias = self.alias(false)?;
        Ok(TablePrimary::Table { name, alias })
    }

    fn join(&mut self) -> PResult<Option<Join>> {
        let apply = (self.word_at(0, "cross") || self.word_at(0, "outer")) && self.word_at(1, "apply");
        if !apply && !self.at_any_word(JOIN_WORDS) {
            return Ok(None);
        }

        let mut kws = Vec::new();
        let mut needs_constraint = true;
        if apply {
            kws.push(self.keyword());
            kws.push(self.keyword());
            needs_constraint = false;
        } else {
            if let Some(natural) = self.accept_word("natural") {
                kws.push(natural);
                needs_constraint = false;
            }
            if let Some(cross) = self.accept_word("cross") {
                kws.push(cross);
                needs_constraint = false;
            } else if let Some(inner) = self.accept_word("inner") {
                kws.push(inner);
            } else if self.at_any_word(&["left", "right", "full"]) {
                kws.push(self.keyword());
                if let Some(outer) = self.accept_word("outer") {
                    kws.push(outer);
                }
            }
            kws.push(self.expect_word("join")?);
        }

        let target = self.table_primary()?;
        let constraint = if let Some(on) = self.condition(&["on"])? {
            Some(JoinConstraint::On(on))
        } else if let Some(kw) = self.accept_word("using") {
            Some(JoinConstraint::Using {
                kw,
                columns: self.args()?,
            })
        } else if needs_constraint {
            return Err(self.error());
        } else {
            None
        };
        Ok(Some(Join {
            kws,
            target,
            constraint,
        }))
    }

    fn order_by(&mut self) -> PResult<Option<OrderBy>> {
        let Some(order) = self.accept_word("order") else {
            return Ok(None);
        };
        let mut kws = vec![order];
        if let Some(siblings) = self.accept_word("siblings") {
            kws.push(siblings);
        }
        kws.push(self.expect_word("by")?);

        let mut items = List::new();
        loop {
            let expr = self.expr()?;
            let mut modifiers = Vec::new();
            if self.at_any_word(&["asc", "desc"]) {
                modifiers.push(self.keyword());
            }
            if let Some(nulls) = self.accept_word("nulls") {
                modifiers.push(nulls);
                if !self.at_any_word(&["first", "last"]) {
                    return Err(self.error());
                }
                modifiers.push(self.keyword());
            }
            items.items.push(OrderItem { expr, modifiers });
            match self.accept_symbol(",") {
                Some(comma) => items.commas.push(comma),
                None => return Ok(Some(OrderBy { kws, items })),
            }
        }
    }

    /// `offset n rows` and `fetch first|next [n [percent]] rows only|with ties`
    fn row_limit(&mut self) -> PResult<Option<RowLimit>> {
        let offset = if self.word_at(0, "offset") {
            let kw = self.keyword();
            let value = self.expr()?;
            Some((kw, value, self.rows_word()?))
        } else {
            None
        };
        let fetch = if self.word_at(0, "fetch") && (self.word_at(1, "first") || self.word_at(1, "next")) {
            let kws = [self.keyword(), self.keyword()];
            let count = if self.word_at(0, "rows") || self.word_at(0, "row") {
                None
            } else {
                Some(self.expr()?)
            };
            let mut tail = Vec::new();
            tail.extend(self.accept_word("percent"));
            tail.push(self.rows_word()?);
            if let Some(only) = self.accept_word("only") {
                tail.push(only);
            } else {
                tail.push(self.expect_word("with")?);
                tail.push(self.expect_word("ties")?);
            }
            Some(FetchFirst { kws, count, tail })
        } else {
            None
        };
        if offset.is_none() && fetch.is_none() {
            return Ok(None);
        }
        Ok(Some(RowLimit { offset, fetch }))
    }

    fn rows_word(&mut self) -> PResult<Tok> {
        if self.at_any_word(&["rows", "row"]) {
            Ok(self.keyword())
        } else {
            Err(self.error())
        }
    }

    /// `for update [of cols] [nowait | wait n | skip locked]`
    fn for_update(&mut self) -> PResult<Option<ForUpdate>> {
        if !(self.word_at(0, "for") && self.word_at(1, "update")) {
            return Ok(None);
        }
        let kws = [self.keyword(), self.keyword()];
        let of = match self.accept_word("of") {
            Some(of) => Some((of, self.expr_list()?)),
            None => None,
        };
        let mut lock = Vec::new();
        if let Some(nowait) = self.accept_word("nowait") {
            lock.push(nowait);
        } else if let Some(wait) = self.accept_word("wait") {
            lock.push(wait);
            if self.peek().kind != TokenKind::Number {
                self.expect_symbol_name("number");
                return Err(self.error());
            }
            lock.push(self.advance());
        } else if let Some(skip) = self.accept_word("skip") {
            lock.push(skip);
            lock.push(self.expect_word("locked")?);
        }
        Ok(Some(ForUpdate { kws, of, lock }))
    }

    /// `over (...)`, `within group (...)` or `keep (dense_rank first ...)`
    pub(super) fn analytic_clause(&mut self) -> PResult<AnalyticClause> {
        let mut kws = vec![self.keyword()];
        let keep = self.tokens[kws[0]].is_word("keep");
        if self.tokens[kws[0]].is_word("within") {
            kws.push(self.expect_word("group")?);
        }
        let open = self.expect_symbol("(")?;
        let mut lead = Vec::new();
        if keep {
            lead.push(self.expect_word("dense_rank")?);
            if !self.at_any_word(&["first", "last"]) {
                return Err(self.error());
            }
            lead.push(self.keyword());
        }
        let partition_by = match self.accept_word("partition") {
            Some(partition) => {
                let by = self.expect_word("by")?;
                Some((vec![partition, by], self.expr_list()?))
            }
            None => None,
        };
        let order_by = self.order_by()?;
        let frame = if self.at_any_word(&["rows", "range", "groups"]) {
            Some(self.window_frame()?)
        } else {
            None
        };
        let close = self.expect_symbol(")")?;
        Ok(AnalyticClause {
            kws,
            open,
            lead,
            partition_by,
            order_by,
            frame,
            close,
        })
    }

    fn window_frame(&mut self) -> PResult<WindowFrame> {
        let mut kws = vec![self.keyword()];
        let between = self.accept_word("between");
        kws.extend(between);
        let start = self.frame_bound()?;
        let end = if between.is_some() {
            let and_kw = self.expect_word("and")?;
            Some((and_kw, self.frame_bound()?))
        } else {
            None
        };
        Ok(WindowFrame { kws, start, end })
    }

    fn frame_bound(&mut self) -> PResult<FrameBound> {
        if let Some(unbounded) = self.accept_word("unbounded") {
            if !self.at_any_word(&["preceding", "following"]) {
                return Err(self.error());
            }
            return Ok(FrameBound {
                value: None,
                kws: vec![unbounded, self.keyword()],
            });
        }
        if let Some(current) = self.accept_word("current") {
            return Ok(FrameBound {
                value: None,
                kws: vec![current, self.expect_word("row")?],
            });
        }
        let value = self.expr()?;
        if !self.at_any_word(&["preceding", "following"]) {
            return Err(self.error());
        }
        Ok(FrameBound {
            value: Some(value),
            kws: vec![self.keyword()],
        })
    }

    fn insert(&mut self) -> PResult<Insert> {
        let kws = [self.keyword(), self.expect_word("into")?];
        let table = self.name()?;
        let alias = self.alias(false)?;
        let columns = if self.at_symbol("(") {
            Some(self.args()?)
        } else {
            None
        };
        let source = if let Some(kw) = self.accept_word("values") {
            InsertSource::Values {
                kw,
                row: self.args()?,
            }
        } else if self.at_query_start() {
            InsertSource::Query(self.query()?)
        } else {
            return Err(self.error());
        };
        let returning = self.returning()?;
        Ok(Insert {
            kws,
            table,
            alias,
            columns,
            source,
            returning,
        })
    }

    fn update(&mut self) -> PResult<Update> {
        let kw = self.keyword();
        let table = self.name()?;
        let alias = self.alias(false)?;
        let set_kw = self.expect_word("set")?;
        let mut assignments = List::new();
        loop {
            let target = self.primary()?;
            let eq = self.expect_symbol("=")?;
            let value = self.expr()?;
            assignments.items.push(SetItem { target, eq, value });
            match self.accept_symbol(",") {
                Some(comma) => assignments.commas.push(comma),
                None => break,
            }
        }
        let where_clause = self.condition(&["where"])?;
        let returning = self.returning()?;
        Ok(Update {
            kw,
            table,
            alias,
            set_kw,
            assignments,
            where_clause,
            returning,
        })
    }

    fn delete(&mut self) -> PResult<Delete> {
        let mut kws = vec![self.keyword()];
        if let Some(from) = self.accept_word("from") {
            kws.push(from);
        }
        let table = self.name()?;
        let alias = self.alias(false)?;
        let where_clause = self.condition(&["where"])?;
        let returning = self.returning()?;
        Ok(Delete {
            kws,
            table,
            alias,
            where_clause,
            returning,
        })
    }

    fn returning(&mut self) -> PResult<Option<Returning>> {
        let Some(kw) = self.accept_word("returning") else {
            return Ok(None);
        };
        let values = self.expr_list()?;
        let Some(into) = self.into_clause()? else {
            return Err(self.error());
        };
        Ok(Some(Returning { kw, values, into }))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, tree::*};
    use crate::profile::Grammar;

    fn parse_query(source: &str) -> Query {
        let tree = parse(source, &Grammar::builtin().unwrap()).unwrap();
        let UnitBody::Sql(sql) = tree.script.units.into_iter().next().unwrap().body else {
            panic!("expected sql unit");
        };
        match sql.dml {
            Dml::Query(query) => query,
            other => panic!("expected query, got {other:?}"),
        }
    }

    fn first_select(query: &Query) -> &Select {
        match &query.first {
            QueryTerm::Select(select) => select,
            QueryTerm::Nested(_) => panic!("expected select"),
        }
    }

    #[test]
    fn test_select_clauses() {
        let query = parse_query(
            "select d.department_name, count(*) as cnt
               from departments d
               join employees e on e.department_id = d.department_id
              where d.location_id = 1700
              group by d.department_name
             having count(*) > 1
              order by 2 desc nulls last, 1;",
        );
        let select = first_select(&query);
        assert_eq!(select.items.items.len(), 2);
        assert!(select.items.items[1].alias.is_some());
        let from = select.from.as_ref().unwrap();
        assert_eq!(from.tables.items[0].joins.len(), 1);
        assert!(select.where_clause.is_some());
        assert!(select.group_by.is_some());
        assert!(select.having.is_some());
        let order_by = query.order_by.as_ref().unwrap();
        assert_eq!(order_by.items.items[0].modifiers.len(), 3);
    }

    #[test]
    fn test_cross_apply_with_subquery() {
        let query = parse_query(
            "select * from departments d cross apply (select * from employees e where e.department_id = d.department_id) v;",
        );
        let select = first_select(&query);
        let table = &select.from.as_ref().unwrap().tables.items[0];
        assert_eq!(table.joins[0].kws.len(), 2);
        assert!(matches!(
            table.joins[0].target,
            TablePrimary::Subquery { alias: Some(_), .. }
        ));
    }

    #[test]
    fn test_set_operators_and_with() {
        let query = parse_query(
            "with a as (select 1 x from dual) select x from a union all select 2 from dual minus select 3 from dual;",
        );
        assert!(query.with.is_some());
        assert_eq!(query.rest.len(), 2);
        assert_eq!(query.rest[0].0.len(), 2);
    }

    #[test]
    fn test_join_requires_condition() {
        let err = parse("select * from a join b;", &Grammar::builtin().unwrap()).unwrap_err();
        assert!(err.expected.contains(&"'on'".to_string()));
        assert!(err.expected.contains(&"'using'".to_string()));
    }

    #[test]
    fn test_dml_statements() {
        let source = "insert into t (a, b) values (1, 'x');
insert into t select * from s;
update t x set a = 1, b = b + 1 where c = 2 returning a into l_a;
delete from t where a in (select a from s);
delete t;";
        let tree = parse(source, &Grammar::builtin().unwrap()).unwrap();
        assert_eq!(tree.script.units.len(), 5);
        let UnitBody::Sql(update) = &tree.script.units[2].body else {
            panic!("expected sql");
        };
        let Dml::Update(update) = &update.dml else {
            panic!("expected update");
        };
        assert_eq!(update.assignments.items.len(), 2);
        assert!(update.alias.is_some());
        assert!(update.returning.is_some());
    }

    #[test]
    fn test_row_limit_and_for_update() {
        let query = parse_query("select a from t order by a offset 10 rows fetch next 5 rows only;");
        let limit = query.row_limit.as_ref().unwrap();
        assert!(limit.offset.is_some());
        assert_eq!(limit.fetch.as_ref().unwrap().tail.len(), 2);

        let query = parse_query("select a from t where b = 1 for update of a, c skip locked;");
        let for_update = query.for_update.as_ref().unwrap();
        assert_eq!(for_update.of.as_ref().unwrap().1.items.len(), 2);
        assert_eq!(for_update.lock.len(), 2);
    }

    #[test]
    fn test_analytic_clauses() {
        let query = parse_query(
            "select row_number() over (partition by d order by s desc rows between unbounded preceding and current row) rn,
                    listagg(n, ',') within group (order by n),
                    max(s) keep (dense_rank last order by h)
               from t;",
        );
        let select = first_select(&query);
        assert_eq!(select.items.items.len(), 3);
        assert!(select.items.items[0].alias.is_some());
        let Expr::Path(path) = &select.items.items[0].expr else {
            panic!("expected path");
        };
        let Segment::Analytic(clause) = &path.segments[1] else {
            panic!("expected analytic clause");
        };
        assert!(clause.partition_by.is_some());
        assert!(clause.frame.as_ref().unwrap().end.is_some());
        let Expr::Path(path) = &select.items.items[2].expr else {
            panic!("expected path");
        };
        let Segment::Analytic(keep) = &path.segments[1] else {
            panic!("expected keep clause");
        };
        assert_eq!(keep.lead.len(), 2);
    }

    #[test]
    fn test_outer_join_marker() {
        let query = parse_query("select * from a, b where a.id = b.id(+);");
        let cond = &first_select(&query).where_clause.as_ref().unwrap().cond;
        let Expr::Binary { right, .. } = cond else {
            panic!("expected comparison");
        };
        let Expr::Path(path) = &**right else {
            panic!("expected path");
        };
        assert!(matches!(path.segments.last(), Some(Segment::OuterJoin { .. })));
    }

    #[test]
    fn test_hierarchical_query() {
        let query = parse_query(
            "select level from emp start with mgr is null connect by nocycle prior id = mgr;",
        );
        assert_eq!(first_select(&query).hierarchy.len(), 2);
    }
}
