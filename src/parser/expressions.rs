//! Expressions, parsed by precedence climbing.
//!
//! Binding powers, loosest first: `or`, `and`, `not`, comparisons (including
//! `like`, `between`, `in`, `is null`), `||` `+` `-`, `*` `/`, `**`, unary sign.
//! An `escape` clause binds to the `like` before it.

use super::lexer::TokenKind;
use super::tree::*;
use super::{PResult, Parser};

const BP_OR: u8 = 1;
const BP_AND: u8 = 2;
const BP_NOT: u8 = 3;
const BP_COMPARE: u8 = 4;
const BP_CONCAT: u8 = 5;
const BP_PRODUCT: u8 = 6;
const BP_POWER: u8 = 7;
const BP_UNARY: u8 = 8;

const COMPARISON_OPS: &[&str] = &["=", "<>", "!=", "^=", "~=", "<", ">", "<=", ">="];

/// Words that start a literal of the following string
const TYPED_LITERAL_WORDS: &[&str] = &["date", "timestamp", "interval"];

enum Infix {
    /// Operator made of `words` tokens
    Binary { words: usize, lbp: u8, rbp: u8 },
    IsNull,
    Between,
    In,
    /// `escape 'c'` after a `like`
    Escape,
}

/// Quantifiers of a comparison with a list or subquery
const QUANTIFIER_WORDS: &[&str] = &["any", "some", "all"];

impl Parser<'_> {
    pub(super) fn expr(&mut self) -> PResult<Expr> {
        self.nested(|p| p.expr_bp(0))
    }

    fn expr_bp(&mut self, min_bp: u8) -> PResult<Expr> {
        let mut left = self.prefix()?;
        while let Some(infix) = self.peek_infix() {
            let lbp = match infix {
                Infix::Binary { lbp, .. } => lbp,
                Infix::IsNull | Infix::Between | Infix::In | Infix::Escape => BP_COMPARE,
            };
            if lbp < min_bp {
                break;
            }
            if matches!(infix, Infix::Escape) && !self.is_like(&left) {
                break;
            }
            left = match infix {
                Infix::Binary { words, rbp, .. } => {
                    let op = self.operator_tokens(words);
                    let right = self.nested(|p| p.expr_bp(rbp))?;
                    Expr::Binary {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    }
                }
                Infix::IsNull => {
                    let mut kws = vec![self.keyword()];
                    if let Some(not_kw) = self.accept_word("not") {
                        kws.push(not_kw);
                    }
                    kws.push(self.expect_word("null")?);
                    Expr::IsNull {
                        operand: Box::new(left),
                        kws,
                    }
                }
                Infix::Between => {
                    let mut kws = Vec::new();
                    if let Some(not_kw) = self.accept_word("not") {
                        kws.push(not_kw);
                    }
                    kws.push(self.keyword());
                    let low = self.nested(|p| p.expr_bp(BP_CONCAT))?;
                    let and_kw = self.expect_word("and")?;
                    let high = self.nested(|p| p.expr_bp(BP_CONCAT))?;
                    Expr::Between {
                        operand: Box::new(left),
                        kws,
                        low: Box::new(low),
                        and_kw,
                        high: Box::new(high),
                    }
                }
                Infix::In => {
                    let mut kws = Vec::new();
                    if let Some(not_kw) = self.accept_word("not") {
                        kws.push(not_kw);
                    }
                    kws.push(self.keyword());
                    let list = self.in_list()?;
                    Expr::In {
                        operand: Box::new(left),
                        kws,
                        list,
                    }
                }
                Infix::Escape => {
                    let op = vec![self.keyword()];
                    let right = self.nested(|p| p.expr_bp(BP_CONCAT))?;
                    Expr::Binary {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    }
                }
            };
        }
        Ok(left)
    }

    /// `(1, 2)` or `(select ...)`
    fn in_list(&mut self) -> PResult<InList> {
        if self.at_symbol("(") && (self.word_at(1, "select") || self.word_at(1, "with")) {
            Ok(InList::Query(self.subquery()?))
        } else {
            Ok(InList::Values(self.args()?))
        }
    }

    fn is_like(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Binary { op, .. } => op
                .iter()
                .any(|t| self.tokens[*t].is_word("like") || self.tokens[*t].is_word("likec")),
            _ => false,
        }
    }

    fn peek_infix(&self) -> Option<Infix> {
        let token = self.peek();
        match token.kind {
            TokenKind::Symbol => {
                let text = token.text.as_str();
                if COMPARISON_OPS.contains(&text) {
                    Some(Infix::Binary {
                        words: 1,
                        lbp: BP_COMPARE,
                        rbp: BP_CONCAT,
                    })
                } else if matches!(text, "||" | "+" | "-") {
                    Some(Infix::Binary {
                        words: 1,
                        lbp: BP_CONCAT,
                        rbp: BP_PRODUCT,
                    })
                } else if matches!(text, "*" | "/") {
                    Some(Infix::Binary {
                        words: 1,
                        lbp: BP_PRODUCT,
                        rbp: BP_POWER,
                    })
                } else if text == "**" {
                    // right associative
                    Some(Infix::Binary {
                        words: 1,
                        lbp: BP_POWER,
                        rbp: BP_POWER,
                    })
                } else {
                    None
                }
            }
            TokenKind::Word => {
                let word = token.text.to_ascii_lowercase();
                match word.as_str() {
                    "or" => Some(Infix::Binary {
                        words: 1,
                        lbp: BP_OR,
                        rbp: BP_AND,
                    }),
                    "and" => Some(Infix::Binary {
                        words: 1,
                        lbp: BP_AND,
                        rbp: BP_NOT,
                    }),
                    "like" | "likec" => Some(Infix::Binary {
                        words: 1,
                        lbp: BP_COMPARE,
                        rbp: BP_CONCAT,
                    }),
                    "is" => Some(Infix::IsNull),
                    "escape" => Some(Infix::Escape),
                    "between" => Some(Infix::Between),
                    "in" => Some(Infix::In),
                    "not" => {
                        let next = self.peek_at(1);
                        if next.is_word("like") || next.is_word("likec") {
                            Some(Infix::Binary {
                                words: 2,
                                lbp: BP_COMPARE,
                                rbp: BP_CONCAT,
                            })
                        } else if next.is_word("between") {
                            Some(Infix::Between)
                        } else if next.is_word("in") {
                            Some(Infix::In)
                        } else {
                            None
                        }
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn operator_tokens(&mut self, count: usize) -> Vec<Tok> {
        (0..count)
            .map(|_| {
                if self.peek().kind == TokenKind::Word {
                    self.keyword()
                } else {
                    self.advance()
                }
            })
            .collect()
    }

    fn prefix(&mut self) -> PResult<Expr> {
        if self.peek().is_word("not") {
            let op = self.keyword();
            let operand = self.nested(|p| p.expr_bp(BP_NOT))?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        if self.peek().is_word("prior") {
            let op = self.keyword();
            let operand = self.nested(|p| p.expr_bp(BP_UNARY))?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        if QUANTIFIER_WORDS.iter().any(|w| self.peek().is_word(w)) && self.symbol_at(1, "(") {
            let kw = self.keyword();
            let list = self.in_list()?;
            return Ok(Expr::Quantified { kw, list });
        }
        if self.peek().is_symbol("-") || self.peek().is_symbol("+") {
            let op = self.advance();
            let operand = self.nested(|p| p.expr_bp(BP_UNARY))?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    /// Operand without operators: literal, name path, call, subquery, `case`
    pub(super) fn primary(&mut self) -> PResult<Expr> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::Number | TokenKind::String => return Ok(Expr::Literal(self.advance())),
            TokenKind::Bind => {
                let head = self.advance();
                return self.path(head, true);
            }
            TokenKind::Symbol if self.peek().is_symbol("*") => {
                return Ok(Expr::Star(self.advance()));
            }
            _ => {}
        }

        if self.at_symbol("(") {
            if self.word_at(1, "select") || self.word_at(1, "with") {
                return Ok(Expr::Subquery(self.subquery()?));
            }
            return Ok(Expr::Paren(self.args()?));
        }
        if self.at_word("null") {
            return Ok(Expr::Literal(self.keyword()));
        }
        if self.at_word("case") {
            return Ok(Expr::Case(Box::new(self.case_expr()?)));
        }
        if self.at_word("exists") {
            let kw = self.keyword();
            let query = self.subquery()?;
            return Ok(Expr::Exists { kw, query });
        }
        if TYPED_LITERAL_WORDS.iter().any(|w| self.peek().is_word(w))
            && self.peek_at(1).kind == TokenKind::String
        {
            let kw = self.keyword();
            let value = self.advance();
            return Ok(Expr::TypedLiteral { kw, value });
        }
        if self.at_identifier() {
            let head = self.advance();
            return self.path(head, false);
        }
        self.expect_symbol_name("literal");
        Err(self.error())
    }

    /// Member access, calls, attributes and db links after `head`
    fn path(&mut self, head: Tok, is_bind: bool) -> PResult<Expr> {
        let mut segments = Vec::new();
        loop {
            let next_kind = self.peek_at(1).kind;
            let next_is_name = matches!(next_kind, TokenKind::Word | TokenKind::QuotedIdent);
            if self.peek().is_symbol(".") && (next_is_name || self.symbol_at(1, "*")) {
                let dot = self.advance();
                let name = self.advance();
                segments.push(Segment::Member { dot, name });
            } else if self.peek().is_symbol("(") && self.symbol_at(1, "+") && self.symbol_at(2, ")") {
                let open = self.advance();
                let plus = self.advance();
                let close = self.advance();
                segments.push(Segment::OuterJoin { open, plus, close });
            } else if self.peek().is_symbol("(") {
                segments.push(Segment::Call(self.args()?));
            } else if self.at_analytic_clause(segments.last()) {
                segments.push(Segment::Analytic(Box::new(self.analytic_clause()?)));
            } else if self.peek().is_symbol("%") && next_kind == TokenKind::Word {
                let percent = self.advance();
                let name = self.keyword();
                segments.push(Segment::Attribute { percent, name });
            } else if self.peek().is_symbol("@") && next_is_name {
                let at = self.advance();
                let name = self.advance();
                segments.push(Segment::Link { at, name });
            } else {
                break;
            }
        }
        if is_bind && segments.is_empty() {
            return Ok(Expr::Bind(head));
        }
        Ok(Expr::Path(Path { head, segments }))
    }

    /// `over (`, `within group (` or `keep (` directly after a call
    fn at_analytic_clause(&self, last: Option<&Segment>) -> bool {
        if !matches!(last, Some(Segment::Call(_))) {
            return false;
        }
        ((self.word_at(0, "over") || self.word_at(0, "keep")) && self.symbol_at(1, "("))
            || (self.word_at(0, "within") && self.word_at(1, "group") && self.symbol_at(2, "("))
    }

    /// `( [name =>] [distinct] expr [as type], ... )`, possibly empty
    pub(super) fn args(&mut self) -> PResult<Args> {
        let open = self.expect_symbol("(")?;
        let mut list = List::new();
        if let Some(close) = self.accept_symbol(")") {
            return Ok(Args { open, list, close });
        }
        loop {
            let named = if self.is_identifier(self.peek()) && self.symbol_at(1, "=>") {
                Some((self.advance(), self.advance()))
            } else {
                None
            };
            let quantifier = if (self.peek().is_word("distinct") || self.peek().is_word("all"))
                && !self.symbol_at(1, ",")
                && !self.symbol_at(1, ")")
            {
                Some(self.keyword())
            } else {
                None
            };
            let value = self.expr()?;
            let as_type = if self.word_at(0, "as") {
                let as_kw = self.keyword();
                Some((as_kw, self.data_type()?))
            } else {
                None
            };
            list.items.push(Arg {
                named,
                quantifier,
                value,
                as_type,
            });
            match self.accept_symbol(",") {
                Some(comma) => list.commas.push(comma),
                None => break,
            }
        }
        let close = self.expect_symbol(")")?;
        Ok(Args { open, list, close })
    }

    fn case_expr(&mut self) -> PResult<CaseExpr> {
        let case_kw = self.keyword();
        let selector = if self.at_word("when") {
            None
        } else {
            Some(self.expr()?)
        };
        let mut whens = Vec::new();
        while let Some(when) = self.accept_word("when") {
            let cond = self.expr()?;
            let then_kw = self.expect_word("then")?;
            let result = self.expr()?;
            whens.push(CaseExprWhen {
                when,
                cond,
                then_kw,
                result,
            });
        }
        if whens.is_empty() {
            return Err(self.error());
        }
        let else_branch = match self.accept_word("else") {
            Some(kw) => Some((kw, self.expr()?)),
            None => None,
        };
        let end_kw = self.expect_word("end")?;
        Ok(CaseExpr {
            case_kw,
            selector,
            whens,
            else_branch,
            end_kw,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, tree::*};
    use crate::profile::Grammar;

    /// Parse `x := <expr>;` and return the assigned expression
    fn parse_expr(expr: &str) -> (ParseTree, Expr) {
        let source = format!("begin x := {expr}; end;");
        let tree = parse(&source, &Grammar::builtin().unwrap()).unwrap();
        let UnitBody::Block(block) = &tree.script.units[0].body else {
            panic!("expected block");
        };
        let StatementKind::Assign { value, .. } = &block.body[0].kind else {
            panic!("expected assignment");
        };
        let value = value.clone();
        (tree, value)
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let (tree, expr) = parse_expr("a or b and c");
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(tree.tokens[op[0]].text, "or");
        assert!(matches!(*right, Expr::Binary { .. }));
    }

    #[test]
    fn test_arithmetic_precedence() {
        let (tree, expr) = parse_expr("1 + 2 * 3 || 'x'");
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(tree.tokens[op[0]].text, "||");
        let Expr::Binary { op, right, .. } = *left else {
            panic!("expected binary");
        };
        assert_eq!(tree.tokens[op[0]].text, "+");
        assert!(matches!(*right, Expr::Binary { .. }));
    }

    #[test]
    fn test_predicates() {
        let (_, expr) = parse_expr("a is not null and b not between 1 and 2 and c not in (1, 2) and d not like 'x%'");
        let Expr::Binary { left, right, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(*right, Expr::Binary { ref op, .. } if op.len() == 2));
        let Expr::Binary { left, right, .. } = *left else {
            panic!("expected binary");
        };
        assert!(matches!(*right, Expr::In { ref kws, .. } if kws.len() == 2));
        let Expr::Binary { left, right, .. } = *left else {
            panic!("expected binary");
        };
        assert!(matches!(*right, Expr::Between { ref kws, .. } if kws.len() == 2));
        assert!(matches!(*left, Expr::IsNull { ref kws, .. } if kws.len() == 3));
    }

    #[test]
    fn test_paths_and_calls() {
        let (tree, expr) = parse_expr("pkg.f(p_a => 1, count(distinct x)).field%type");
        let Expr::Path(path) = expr else {
            panic!("expected path");
        };
        assert_eq!(path.segments.len(), 4);
        let Segment::Call(args) = &path.segments[1] else {
            panic!("expected call");
        };
        assert!(args.list.items[0].named.is_some());
        assert!(tree.keywords[tree.tokens.iter().position(|t| t.text == "type").unwrap()]);
    }

    #[test]
    fn test_case_and_literals() {
        let (_, expr) = parse_expr("case when a = 1 then date '2020-01-01' else null end");
        let Expr::Case(case) = expr else {
            panic!("expected case");
        };
        assert!(case.selector.is_none());
        assert!(matches!(case.whens[0].result, Expr::TypedLiteral { .. }));
        assert!(matches!(case.else_branch, Some((_, Expr::Literal(_)))));
    }

    #[test]
    fn test_subqueries() {
        let (_, expr) = parse_expr("(select count(*) from t) + 1");
        let Expr::Binary { left, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expr::Subquery(_)));
    }

    #[test]
    fn test_escape_cast_and_quantified_comparisons() {
        let (tree, expr) = parse_expr(
            "a like 'x!_%' escape '!' and b = any (1, 2) and cast(c as varchar2(10)) > all (select d from t)",
        );
        let Expr::Binary { left, right, .. } = expr else {
            panic!("expected binary");
        };
        let Expr::Binary { left: cast, right: all, .. } = *right else {
            panic!("expected comparison");
        };
        assert!(matches!(*all, Expr::Quantified { list: InList::Query(_), .. }));
        let Expr::Path(path) = *cast else {
            panic!("expected call");
        };
        let Segment::Call(args) = &path.segments[0] else {
            panic!("expected call");
        };
        assert!(args.list.items[0].as_type.is_some());

        let Expr::Binary { left, right, .. } = *left else {
            panic!("expected binary");
        };
        let Expr::Binary { right: any, .. } = *right else {
            panic!("expected comparison");
        };
        assert!(matches!(*any, Expr::Quantified { list: InList::Values(_), .. }));
        let Expr::Binary { op, left: like, .. } = *left else {
            panic!("expected escape");
        };
        assert_eq!(tree.tokens[op[0]].text, "escape");
        assert!(matches!(*like, Expr::Binary { .. }));
    }

    #[test]
    fn test_escape_needs_like() {
        let err = parse("begin x := a = b escape 'c'; end;", &Grammar::builtin().unwrap());
        assert!(err.is_err());
    }

    #[test]
    fn test_bind_variables() {
        let (_, expr) = parse_expr(":new.id + :1");
        let Expr::Binary { left, right, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expr::Path(_)));
        assert!(matches!(*right, Expr::Bind(_)));
    }
}
