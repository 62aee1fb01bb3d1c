//! Layout of expressions
//!
//! Expressions are written on one line. Argument lists and `case` expressions
//! that would run past `line_length` are exploded one element per line;
//! subqueries always start a block.

use super::Rewriter;
use crate::parser::{
    AnalyticClause, Arg, Args, CaseExpr, Expr, FrameBound, InList, Path, Segment, Tok,
};

impl Rewriter<'_> {
    pub(super) fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(t) | Expr::Bind(t) | Expr::Star(t) => self.tok(*t),
            Expr::TypedLiteral { kw, value } => {
                self.tok(*kw);
                self.tok(*value);
            }
            Expr::Path(path) => self.path(path),
            Expr::Unary { op, operand } => {
                self.tok(*op);
                if self.tree.tokens[*op].is_symbol("-") || self.tree.tokens[*op].is_symbol("+") {
                    self.w.no_space();
                }
                self.expr(operand);
            }
            Expr::Binary { .. } => {
                // left-deep chains are walked iteratively
                let mut chain = Vec::new();
                let mut current = expr;
                while let Expr::Binary { left, op, right } = current {
                    chain.push((op, right));
                    current = &**left;
                }
                self.expr(current);
                for (op, right) in chain.into_iter().rev() {
                    self.toks(op);
                    self.expr(right);
                }
            }
            Expr::IsNull { operand, kws } => {
                self.expr(operand);
                self.toks(kws);
            }
            Expr::Between {
                operand,
                kws,
                low,
                and_kw,
                high,
            } => {
                self.expr(operand);
                self.toks(kws);
                self.expr(low);
                self.tok(*and_kw);
                self.expr(high);
            }
            Expr::In {
                operand,
                kws,
                list,
            } => {
                self.expr(operand);
                self.toks(kws);
                self.in_list(list);
            }
            Expr::Quantified { kw, list } => {
                self.tok(*kw);
                self.in_list(list);
            }
            Expr::Exists { kw, query } => {
                self.tok(*kw);
                let base = self.indent();
                self.subquery_block(query, base);
            }
            Expr::Paren(args) => self.arg_list(args, true),
            Expr::Subquery(sub) => {
                let base = self.indent();
                self.subquery_block(sub, base);
            }
            Expr::Case(case) => self.case_expr(case),
        }
    }

    fn in_list(&mut self, list: &InList) {
        match list {
            InList::Values(args) => self.arg_list(args, true),
            InList::Query(sub) => {
                let base = self.indent();
                self.subquery_block(sub, base);
            }
        }
    }

    fn path(&mut self, path: &Path) {
        self.tok(path.head);
        for segment in &path.segments {
            match segment {
                Segment::Member { dot, name }
                | Segment::Attribute { percent: dot, name }
                | Segment::Link { at: dot, name } => {
                    self.attach(*dot);
                    self.attach(*name);
                }
                Segment::Call(args) => self.call_args(args),
                Segment::OuterJoin { open, plus, close } => {
                    self.attach(*open);
                    self.attach(*plus);
                    self.attach(*close);
                }
                Segment::Analytic(clause) => self.analytic(clause),
            }
        }
    }

    /// Analytic and ordered-set clauses stay on the line of their call
    fn analytic(&mut self, clause: &AnalyticClause) {
        self.toks(&clause.kws);
        self.tok(clause.open);
        self.w.no_space();
        self.toks(&clause.lead);
        if let Some((kws, exprs)) = &clause.partition_by {
            self.toks(kws);
            self.inline_list(exprs, |r, e| r.expr(e));
        }
        if let Some(order_by) = &clause.order_by {
            self.toks(&order_by.kws);
            self.inline_list(&order_by.items, |r, item| {
                r.expr(&item.expr);
                r.toks(&item.modifiers);
            });
        }
        if let Some(frame) = &clause.frame {
            self.toks(&frame.kws);
            self.frame_bound(&frame.start);
            if let Some((and_kw, end)) = &frame.end {
                self.tok(*and_kw);
                self.frame_bound(end);
            }
        }
        self.attach(clause.close);
    }

    fn frame_bound(&mut self, bound: &FrameBound) {
        if let Some(value) = &bound.value {
            self.expr(value);
        }
        self.toks(&bound.kws);
    }

    /// Arguments directly after a name: `f(a, b)`
    pub(super) fn call_args(&mut self, args: &Args) {
        self.arg_list(args, false);
    }

    /// Parenthesized list, on one line if it fits, otherwise one element per
    /// line; `spaced` separates the `(` from the previous text
    pub(super) fn arg_list(&mut self, args: &Args, spaced: bool) {
        let inline = self.flat
            || args.list.is_empty()
            || self.fits(self.measure(|r| r.arg_list_inline(args, spaced)));
        if inline {
            self.arg_list_inline(args, spaced);
            return;
        }
        let base = self.indent();
        let inner = base + self.style.indent;
        self.open_paren(args.open, spaced);
        self.line(inner);
        self.exploded(&args.list, inner, Self::arg);
        self.line(base);
        self.attach(args.close);
    }

    fn arg_list_inline(&mut self, args: &Args, spaced: bool) {
        self.open_paren(args.open, spaced);
        self.w.no_space();
        self.inline_list(&args.list, Self::arg);
        self.attach(args.close);
    }

    fn open_paren(&mut self, open: Tok, spaced: bool) {
        if spaced {
            self.tok(open);
        } else {
            self.attach(open);
        }
    }

    fn arg(&mut self, arg: &Arg) {
        if let Some((name, arrow)) = arg.named {
            self.tok(name);
            self.tok(arrow);
        }
        if let Some(quantifier) = arg.quantifier {
            self.tok(quantifier);
        }
        self.expr(&arg.value);
        if let Some((as_kw, ty)) = &arg.as_type {
            self.tok(*as_kw);
            self.data_type(ty);
        }
    }

    fn case_expr(&mut self, case: &CaseExpr) {
        let inline = self.flat || self.fits(self.measure(|r| r.case_inline(case)));
        if inline {
            self.case_inline(case);
            return;
        }
        let base = self.indent();
        let inner = base + self.style.indent;
        self.tok(case.case_kw);
        if let Some(selector) = &case.selector {
            self.expr(selector);
        }
        for when in &case.whens {
            self.line(inner);
            self.tok(when.when);
            self.expr(&when.cond);
            self.tok(when.then_kw);
            self.expr(&when.result);
        }
        if let Some((kw, value)) = &case.else_branch {
            self.line(inner);
            self.tok(*kw);
            self.expr(value);
        }
        self.line(base);
        self.tok(case.end_kw);
    }

    fn case_inline(&mut self, case: &CaseExpr) {
        self.tok(case.case_kw);
        if let Some(selector) = &case.selector {
            self.expr(selector);
        }
        for when in &case.whens {
            self.tok(when.when);
            self.expr(&when.cond);
            self.tok(when.then_kw);
            self.expr(&when.result);
        }
        if let Some((kw, value)) = &case.else_branch {
            self.tok(*kw);
            self.expr(value);
        }
        self.tok(case.end_kw);
    }
}
