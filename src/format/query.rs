//! Layout of queries and DML
//!
//! Right-aligned layout puts every clause keyword on its own line with its last
//! letter under the last letter of `select`, and the clause elements after it:
//!
//! ```text
//! select a,
//!        b
//!   from t
//!  where x = 1
//!    and y = 2
//! ```
//!
//! Block layout puts the clause keyword alone on its line and indents the
//! elements below it.

use super::Rewriter;
use crate::parser::{
    Alias, Condition, Delete, Dml, Expr, ForUpdate, FromClause, Insert, InsertSource, IntoClause,
    Join, JoinConstraint, OrderBy, Query, QueryTerm, Returning, RowLimit, Select, SqlStatement,
    Subquery, TablePrimary, TableRef, Tok, Update,
};
use crate::profile::ClauseLayout;

/// Width of `select`; right-aligned clause keywords end in this column
const KEYWORD_END: usize = 6;

impl Rewriter<'_> {
    pub(super) fn sql_statement(&mut self, sql: &SqlStatement) {
        let base = self.indent();
        match &sql.dml {
            Dml::Query(query) => self.query(query, base),
            Dml::Insert(insert) => self.insert(insert, base),
            Dml::Update(update) => self.update(update, base),
            Dml::Delete(delete) => self.delete(delete, base),
        }
        self.set_indent(base);
        if let Some(semi) = sql.semi {
            self.attach(semi);
        }
    }

    /// Column of a right-aligned keyword
    fn keyword_column(&self, kw: Tok, base: usize) -> usize {
        (base + KEYWORD_END).saturating_sub(self.width(kw)).max(base)
    }

    /// Clause keywords on a new line; returns the column of the clause elements
    fn clause(&mut self, kws: &[Tok], base: usize) -> usize {
        match self.style.clause_layout {
            ClauseLayout::RightAligned => {
                let col = self.keyword_column(kws[0], base);
                self.line(col);
                self.toks(kws);
                let items = col + self.words_width(kws) + 1;
                self.set_indent(items);
                items
            }
            ClauseLayout::Block => {
                self.line(base);
                self.toks(kws);
                let items = base + self.style.indent;
                self.line(items);
                items
            }
        }
    }

    pub(super) fn query(&mut self, query: &Query, base: usize) {
        if let Some(with) = &query.with {
            self.line(base);
            self.tok(with.kw);
            for (i, cte) in with.ctes.items.iter().enumerate() {
                if i > 0 {
                    self.line(base);
                }
                self.tok(cte.name);
                self.tok(cte.as_kw);
                self.subquery_block(&cte.query, base);
                if let Some(comma) = with.ctes.commas.get(i) {
                    self.comma(*comma);
                }
            }
        }
        self.query_term(&query.first, base);
        for (ops, term) in &query.rest {
            self.line(base);
            self.toks(ops);
            self.query_term(term, base);
        }
        if let Some(order_by) = &query.order_by {
            self.order_by(order_by, base);
        }
        if let Some(limit) = &query.row_limit {
            self.row_limit(limit, base);
        }
        if let Some(for_update) = &query.for_update {
            self.for_update(for_update, base);
        }
    }

    fn query_term(&mut self, term: &QueryTerm, base: usize) {
        match term {
            QueryTerm::Select(select) => self.select(select, base),
            QueryTerm::Nested(sub) => {
                self.line(base);
                self.subquery_block(sub, base);
            }
        }
    }

    /// `(` at the end of the line, the query indented below, `)` back at `base`
    pub(super) fn subquery_block(&mut self, sub: &Subquery, base: usize) {
        self.tok(sub.open);
        self.query(&sub.query, base + self.style.indent);
        self.line(base);
        self.tok(sub.close);
    }

    fn select(&mut self, select: &Select, base: usize) {
        let mut head = vec![select.select_kw];
        head.extend(select.quantifier);
        let col = self.clause(&head, base);
        self.exploded(&select.items, col, |r, item| {
            r.expr(&item.expr);
            if let Some(alias) = item.alias {
                r.alias(alias);
            }
        });
        if let Some(into) = &select.into {
            self.into_clause(into, base);
        }
        if let Some(from) = &select.from {
            self.from_clause(from, base);
        }
        if let Some(cond) = &select.where_clause {
            self.where_clause(cond, base);
        }
        for cond in &select.hierarchy {
            self.clause(&cond.kws, base);
            self.expr(&cond.cond);
        }
        if let Some((kws, exprs)) = &select.group_by {
            let col = self.clause(kws, base);
            self.exploded(exprs, col, |r, e| r.expr(e));
        }
        if let Some(cond) = &select.having {
            self.where_clause(cond, base);
        }
    }

    pub(super) fn alias(&mut self, alias: Alias) {
        if let Some(as_kw) = alias.as_kw {
            self.tok(as_kw);
        }
        self.tok(alias.name);
    }

    fn into_clause(&mut self, into: &IntoClause, base: usize) {
        self.clause(&into.kws, base);
        self.inline_list(&into.targets, |r, target| r.expr(target));
    }

    fn from_clause(&mut self, from: &FromClause, base: usize) {
        let col = self.clause(&[from.kw], base);
        self.exploded(&from.tables, col, |r, table| r.table_ref(table, base, col));
    }

    fn table_ref(&mut self, table: &TableRef, base: usize, col: usize) {
        self.table_primary(&table.primary, col);
        for join in &table.joins {
            self.join(join, base, col);
        }
    }

    fn table_primary(&mut self, primary: &TablePrimary, col: usize) {
        match primary {
            TablePrimary::Table { name, alias } => {
                self.name(*name);
                if let Some(alias) = alias {
                    self.alias(*alias);
                }
            }
            TablePrimary::Subquery { query, alias } => {
                self.subquery_block(query, col);
                if let Some(alias) = alias {
                    self.alias(*alias);
                }
            }
            TablePrimary::Collection {
                kw,
                open,
                expr,
                close,
                alias,
            } => {
                self.tok(*kw);
                self.attach(*open);
                self.w.no_space();
                self.expr(expr);
                self.attach(*close);
                if let Some(alias) = alias {
                    self.alias(*alias);
                }
            }
        }
    }

    fn join(&mut self, join: &Join, base: usize, col: usize) {
        match self.style.clause_layout {
            ClauseLayout::RightAligned => {
                let kw_col = self.keyword_column(join.kws[0], base);
                self.line(kw_col);
            }
            ClauseLayout::Block => self.line(col),
        }
        self.toks(&join.kws);
        self.set_indent(col);
        self.table_primary(&join.target, col);
        match &join.constraint {
            Some(JoinConstraint::On(cond)) => {
                self.toks(&cond.kws);
                self.expr(&cond.cond);
            }
            Some(JoinConstraint::Using { kw, columns }) => {
                self.tok(*kw);
                self.arg_list(columns, true);
            }
            None => {}
        }
    }

    /// `where`/`having` with one top-level `and` per line
    fn where_clause(&mut self, cond: &Condition, base: usize) {
        let col = self.clause(&cond.kws, base);
        for (and_kw, part) in self.conjuncts(&cond.cond) {
            if let Some(and_kw) = and_kw {
                let and_col = match self.style.clause_layout {
                    ClauseLayout::RightAligned => self.keyword_column(and_kw, base),
                    ClauseLayout::Block => col,
                };
                self.line(and_col);
                self.tok(and_kw);
                self.set_indent(col);
            }
            self.expr(part);
        }
    }

    /// Operands of the top-level `and` chain, each with the `and` before it
    pub(super) fn conjuncts<'e>(&self, cond: &'e Expr) -> Vec<(Option<Tok>, &'e Expr)> {
        let mut parts = Vec::new();
        let mut current = cond;
        loop {
            match current {
                Expr::Binary { left, op, right } if op.len() == 1 && self.is_word(op[0], "and") => {
                    parts.push((Some(op[0]), &**right));
                    current = &**left;
                }
                _ => {
                    parts.push((None, current));
                    break;
                }
            }
        }
        parts.reverse();
        parts
    }

    fn order_by(&mut self, order_by: &OrderBy, base: usize) {
        let col = self.clause(&order_by.kws, base);
        self.exploded(&order_by.items, col, |r, item| {
            r.expr(&item.expr);
            r.toks(&item.modifiers);
        });
    }

    /// Keywords on a new line, the rest of the clause on the same line
    pub(super) fn short_clause(&mut self, kws: &[Tok], base: usize) {
        let col = match self.style.clause_layout {
            ClauseLayout::RightAligned => self.keyword_column(kws[0], base),
            ClauseLayout::Block => base,
        };
        self.line(col);
        self.toks(kws);
    }

    fn row_limit(&mut self, limit: &RowLimit, base: usize) {
        if let Some((kw, value, rows)) = &limit.offset {
            self.short_clause(&[*kw], base);
            self.expr(value);
            self.tok(*rows);
        }
        if let Some(fetch) = &limit.fetch {
            self.short_clause(&fetch.kws, base);
            if let Some(count) = &fetch.count {
                self.expr(count);
            }
            self.toks(&fetch.tail);
        }
    }

    fn for_update(&mut self, for_update: &ForUpdate, base: usize) {
        self.short_clause(&for_update.kws, base);
        if let Some((of, columns)) = &for_update.of {
            self.tok(*of);
            self.inline_list(columns, |r, column| r.expr(column));
        }
        self.toks(&for_update.lock);
    }

    fn insert(&mut self, insert: &Insert, base: usize) {
        self.line(base);
        self.toks(&insert.kws);
        self.name(insert.table);
        if let Some(alias) = insert.alias {
            self.alias(alias);
        }
        if let Some(columns) = &insert.columns {
            self.arg_list(columns, true);
        }
        match &insert.source {
            InsertSource::Values { kw, row } => {
                self.clause(&[*kw], base);
                self.arg_list(row, true);
            }
            InsertSource::Query(query) => self.query(query, base),
        }
        if let Some(returning) = &insert.returning {
            self.returning(returning, base);
        }
    }

    fn update(&mut self, update: &Update, base: usize) {
        self.clause(&[update.kw], base);
        self.name(update.table);
        if let Some(alias) = update.alias {
            self.alias(alias);
        }
        let col = self.clause(&[update.set_kw], base);
        self.exploded(&update.assignments, col, |r, item| {
            r.expr(&item.target);
            r.tok(item.eq);
            r.expr(&item.value);
        });
        if let Some(cond) = &update.where_clause {
            self.where_clause(cond, base);
        }
        if let Some(returning) = &update.returning {
            self.returning(returning, base);
        }
    }

    fn delete(&mut self, delete: &Delete, base: usize) {
        self.clause(&delete.kws, base);
        self.name(delete.table);
        if let Some(alias) = delete.alias {
            self.alias(alias);
        }
        if let Some(cond) = &delete.where_clause {
            self.where_clause(cond, base);
        }
        if let Some(returning) = &delete.returning {
            self.returning(returning, base);
        }
    }

    fn returning(&mut self, returning: &Returning, base: usize) {
        self.clause(&[returning.kw], base);
        self.inline_list(&returning.values, |r, value| r.expr(value));
        self.into_clause(&returning.into, base);
    }
}
