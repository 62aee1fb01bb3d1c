//! Rewriter: parse tree to canonical text.
//!
//! The rewriter walks the tree in source order and writes every token exactly
//! once, so nothing the parser accepted (comments included) can get lost. Layout
//! decisions come from the [`Style`] and the grammar's [`LayoutRules`]:
//! - [`writer`]: output buffer with lazy line breaks and indentation
//! - [`case_convert`]: keyword and identifier case
//! - [`aligner`]: column widths for aligned declarations and assignments
//! - `plsql`, `query`, `expr`: layout of each language layer
//!
//! Lists and `case` expressions are kept on one line when they fit within
//! `line_length`, measured by rendering them into a scratch writer. Everything
//! else is decided by the rules alone, which keeps the output a fixed point:
//! formatting already formatted text changes nothing.

pub mod aligner;
pub mod case_convert;
pub mod writer;

mod expr;
mod plsql;
mod query;

use std::borrow::Cow;

pub use writer::Writer;

use crate::parser::{parse, CommentKind, List, Name, ParseTree, SyntaxError, Tok};
use crate::profile::{CommaStyle, LayoutRules, RuleProfile, StatementBreak, Style};

/// Format one code region
///
/// Whitespace-only text is returned unchanged. Otherwise the result ends with
/// exactly one newline if `text` ended with one, and with none if it did not.
/// Line breaks take the ending of the first line of `text`; the content of
/// literals and comments is copied unchanged.
pub fn format_text(text: &str, profile: &RuleProfile) -> Result<String, SyntaxError> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }

    let tree = parse(text, &profile.grammar)?;
    let mut rewriter = Rewriter::new(&tree, &profile.style, &profile.grammar.layout, false);
    if uses_crlf(text) {
        rewriter.w = Writer::with_crlf();
    }
    rewriter.script(&tree.script);
    let line_ending = rewriter.w.line_ending();
    let mut out = rewriter.w.finish();

    if text.ends_with('\n') {
        out.push_str(line_ending);
    }
    Ok(out)
}

fn uses_crlf(text: &str) -> bool {
    text.find('\n').is_some_and(|i| text[..i].ends_with('\r'))
}

pub(crate) struct Rewriter<'t> {
    tree: &'t ParseTree,
    style: &'t Style,
    layout: &'t LayoutRules,
    w: Writer,
    /// Measuring: lists and `case` expressions stay on one line
    flat: bool,
}

impl<'t> Rewriter<'t> {
    fn new(tree: &'t ParseTree, style: &'t Style, layout: &'t LayoutRules, flat: bool) -> Self {
        Rewriter {
            tree,
            style,
            layout,
            w: Writer::new(),
            flat,
        }
    }

    /// Output text of a token
    fn text(&self, t: Tok) -> Cow<'t, str> {
        let tree = self.tree;
        case_convert::token_text(&tree.tokens[t], tree.keywords[t], self.style)
    }

    fn width(&self, t: Tok) -> usize {
        self.text(t).chars().count()
    }

    /// Width of tokens written with single spaces between them
    fn words_width(&self, toks: &[Tok]) -> usize {
        toks.iter().map(|t| self.width(*t)).sum::<usize>() + toks.len().saturating_sub(1)
    }

    fn is_word(&self, t: Tok, word: &str) -> bool {
        self.tree.tokens[t].is_word(word)
    }

    /// Write a token separated by a space
    fn tok(&mut self, t: Tok) {
        self.comments(t);
        let text = self.text(t);
        self.w.word(&text);
    }

    /// Write a token directly after the previous text
    fn attach(&mut self, t: Tok) {
        self.comments(t);
        let text = self.text(t);
        self.w.attach(&text);
    }

    /// A separator kept on the line of the item before it; comments that
    /// preceded it in the source follow it
    fn comma(&mut self, t: Tok) {
        let text = self.text(t);
        self.w.attach(&text);
        self.comments(t);
    }

    fn toks(&mut self, toks: &[Tok]) {
        for t in toks {
            self.tok(*t);
        }
    }

    /// Dotted name without inner spaces
    fn name(&mut self, name: Name) {
        self.tok(name.first);
        for t in name.first + 1..=name.last {
            self.attach(t);
        }
    }

    /// Write the comments attached to a token, ahead of the token itself
    fn comments(&mut self, t: Tok) {
        let token = &self.tree.tokens[t];
        for comment in &token.comments {
            if comment.trailing {
                self.w.trailing(&comment.text);
            } else if comment.own_line {
                if comment.blank_line_before {
                    self.w.blank_line();
                } else {
                    self.w.newline();
                }
                self.w.word(&comment.text);
            } else {
                self.w.word(&comment.text);
            }
            if comment.newline_after || comment.kind == CommentKind::Line {
                self.w.newline();
            }
        }
        if token.blank_line_before && self.w.has_pending_newline() {
            self.w.blank_line();
        }
    }

    fn indent(&self) -> usize {
        self.w.indent()
    }

    fn set_indent(&mut self, indent: usize) {
        self.w.set_indent(indent);
    }

    /// Start a new line at `indent`
    fn line(&mut self, indent: usize) {
        self.w.set_indent(indent);
        self.w.newline();
    }

    /// Break before whatever follows a construct; `after_end` is whether that
    /// construct ended with `end ...;`
    fn break_after(&mut self, after_end: bool) {
        if self.glues(after_end) {
            self.w.glue();
        } else {
            self.w.newline();
        }
    }

    /// Whether the next statement follows an `end ...;` on the same line
    fn glues(&self, after_end: bool) -> bool {
        after_end && self.layout.statement_after_end == StatementBreak::Inline
    }

    /// Width of a rendering on one line, `None` if it needs several lines
    fn measure(&self, render: impl FnOnce(&mut Rewriter<'t>)) -> Option<usize> {
        let mut sizer = Rewriter::new(self.tree, self.style, self.layout, true);
        render(&mut sizer);
        let text = sizer.w.finish();
        (!text.contains('\n')).then(|| text.chars().count())
    }

    /// Whether a rendering of `width` fits on the current line
    fn fits(&self, width: Option<usize>) -> bool {
        width.is_some_and(|w| self.w.next_column() + w <= self.style.line_length)
    }

    /// Items of a list on one line
    fn inline_list<T>(&mut self, list: &List<T>, mut item: impl FnMut(&mut Self, &T)) {
        for (i, it) in list.items.iter().enumerate() {
            item(self, it);
            if let Some(comma) = list.commas.get(i) {
                self.comma(*comma);
            }
        }
    }

    /// Items of a list one per line, starting at column `col`
    ///
    /// The first item goes wherever the writer is; callers request the break
    /// before it if they want one.
    fn exploded<T>(&mut self, list: &List<T>, col: usize, mut item: impl FnMut(&mut Self, &T)) {
        self.set_indent(col);
        for (i, it) in list.items.iter().enumerate() {
            if i > 0 {
                match self.style.comma_style {
                    CommaStyle::Trailing => self.line(col),
                    CommaStyle::Leading => {
                        self.line(col.saturating_sub(2));
                        self.attach(list.commas[i - 1]);
                        self.set_indent(col);
                        self.w.pad_to(col);
                    }
                }
            }
            item(self, it);
            if self.style.comma_style == CommaStyle::Trailing {
                if let Some(comma) = list.commas.get(i) {
                    self.comma(*comma);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ClauseLayout, Grammar, GrammarOrigin, StyleOrigin, StylePreset};
    use pretty_assertions::assert_eq;

    fn compact() -> RuleProfile {
        RuleProfile::builtin().unwrap()
    }

    fn expanded() -> RuleProfile {
        RuleProfile::with_style(Style::expanded()).unwrap()
    }

    fn with_layout(layout: &str) -> RuleProfile {
        let builtin = include_str!("../profile/default_grammar.toml");
        let keywords = &builtin[..builtin.find("[layout]").unwrap()];
        let grammar =
            Grammar::from_toml_str("compact blocks", &format!("{keywords}[layout]\n{layout}"))
                .unwrap();
        RuleProfile {
            grammar,
            grammar_origin: GrammarOrigin::Builtin,
            style: Style::compact(),
            style_origin: StyleOrigin::Builtin(StylePreset::Compact),
        }
    }

    /// Format and check that formatting the result again changes nothing
    fn fmt(source: &str, profile: &RuleProfile) -> String {
        let once = format_text(source, profile).unwrap();
        let twice = format_text(&once, profile).unwrap();
        assert_eq!(once, twice, "formatting is not a fixed point");
        once
    }

    const PACKAGE_BODY: &str = "\
CREATE OR REPLACE PACKAGE BODY the_api.math AS
FUNCTION to_int_table(in_integers IN VARCHAR2, in_pattern IN VARCHAR2 DEFAULT '[0-9]+')
RETURN sys.ora_mining_number_nt DETERMINISTIC ACCESSIBLE BY (PACKAGE the_api.math, PACKAGE the_api.test_math)
IS
l_result SYS.ora_mining_number_nt := sys.ora_mining_number_nt();
l_pos INTEGER := 1;
l_int INTEGER;
BEGIN
<<integer_tokens>>
LOOP
l_int := to_number(regexp_substr(in_integers, in_pattern, 1, l_pos));
EXIT integer_tokens WHEN l_int IS NULL;
l_result.extend;
l_result(l_pos) := l_int;
l_pos := l_pos + 1;
END LOOP integer_tokens;
RETURN l_result;
END to_int_table;
END math;
/
";

    #[test]
    fn test_compact_package_body() {
        let expected = "\
create or replace package body the_api.math as
   function to_int_table (
      in_integers  in  varchar2,
      in_pattern   in  varchar2 default '[0-9]+'
   ) return sys.ora_mining_number_nt
      deterministic
      accessible by ( package the_api.math, package the_api.test_math )
   is
      l_result  SYS.ora_mining_number_nt := sys.ora_mining_number_nt();
      l_pos     integer := 1;
      l_int     integer;
   begin
      <<integer_tokens>>
      loop
         l_int           := to_number(regexp_substr(in_integers, in_pattern, 1, l_pos));
         exit integer_tokens when l_int is null;
         l_result.extend;
         l_result(l_pos) := l_int;
         l_pos           := l_pos + 1;
      end loop integer_tokens;
      return l_result;
   end to_int_table;
end math;
/
";
        assert_eq!(fmt(PACKAGE_BODY, &compact()), expected);
    }

    #[test]
    fn test_expanded_package_body() {
        let expected = "\
CREATE OR REPLACE PACKAGE BODY the_api.math AS

    FUNCTION to_int_table (
        in_integers  IN  VARCHAR2,
        in_pattern   IN  VARCHAR2 DEFAULT '[0-9]+'
    ) RETURN sys.ora_mining_number_nt
        DETERMINISTIC
        ACCESSIBLE BY ( PACKAGE the_api.math, PACKAGE the_api.test_math )
    IS

        l_result  SYS.ora_mining_number_nt := sys.ora_mining_number_nt();
        l_pos     INTEGER := 1;
        l_int     INTEGER;
    BEGIN
        <<integer_tokens>>
        LOOP
            l_int := to_number(regexp_substr(in_integers, in_pattern, 1, l_pos));
            EXIT integer_tokens WHEN l_int IS NULL;
            l_result.extend;
            l_result(l_pos) := l_int;
            l_pos := l_pos + 1;
        END LOOP integer_tokens;
        RETURN l_result;
    END to_int_table;

END math;
/
";
        assert_eq!(fmt(PACKAGE_BODY, &expanded()), expected);
    }

    #[test]
    fn test_compact_blocks_layout() {
        let profile = with_layout(
            "header_joins_first_member = true\nlabel_placement = \"inline\"\nlabel_padding = true\nstatement_after_end = \"inline\"\n",
        );
        let expected = "\
create or replace package body the_api.math as function to_int_table (
      in_integers  in  varchar2,
      in_pattern   in  varchar2 default '[0-9]+'
   ) return sys.ora_mining_number_nt
      deterministic
      accessible by ( package the_api.math, package the_api.test_math )
   is l_result  SYS.ora_mining_number_nt := sys.ora_mining_number_nt();
      l_pos     integer := 1;
      l_int     integer;
   begin
      << integer_tokens >> loop
         l_int           := to_number(regexp_substr(in_integers, in_pattern, 1, l_pos));
         exit integer_tokens when l_int is null;
         l_result.extend;
         l_result(l_pos) := l_int;
         l_pos           := l_pos + 1;
      end loop integer_tokens;return l_result;
   end to_int_table;end math;
/
";
        assert_eq!(fmt(PACKAGE_BODY, &profile), expected);
    }

    const QUERY: &str = "\
SELECT d.department_name, v.employee_id, v.last_name
FROM departments d CROSS APPLY (SELECT * FROM employees e WHERE e.department_id = d.department_id) v
WHERE d.department_name IN ('Marketing', 'Operations', 'Public Relations') AND v.salary > 1000
ORDER BY d.department_name, v.employee_id;
";

    #[test]
    fn test_compact_query() {
        let expected = "\
select d.department_name,
       v.employee_id,
       v.last_name
  from departments d
 cross apply (
          select *
            from employees e
           where e.department_id = d.department_id
       ) v
 where d.department_name in ('Marketing', 'Operations', 'Public Relations')
   and v.salary > 1000
 order by d.department_name,
          v.employee_id;
";
        assert_eq!(fmt(QUERY, &compact()), expected);
    }

    #[test]
    fn test_expanded_query() {
        let expected = "\
SELECT
    d.department_name,
    v.employee_id,
    v.last_name
FROM
    departments d
    CROSS APPLY (
        SELECT
            *
        FROM
            employees e
        WHERE
            e.department_id = d.department_id
    ) v
WHERE
    d.department_name IN ('Marketing', 'Operations', 'Public Relations')
    AND v.salary > 1000
ORDER BY
    d.department_name,
    v.employee_id;
";
        assert_eq!(fmt(QUERY, &expanded()), expected);
    }

    #[test]
    fn test_leading_commas() {
        let profile = RuleProfile::with_style(Style {
            comma_style: CommaStyle::Leading,
            ..Style::compact()
        })
        .unwrap();
        assert_eq!(
            fmt("select a, b from t;\n", &profile),
            "select a\n     , b\n  from t;\n"
        );
    }

    #[test]
    fn test_comment_before_comma_stays_after_it() {
        assert_eq!(
            fmt("select a -- c1\n, b, c from t;\n", &compact()),
            "select a, -- c1\n       b,\n       c\n  from t;\n"
        );
        let cte = fmt(
            "with x as (select 1 n from dual) -- first\n, y as (select 2 n from dual)\nselect n from y;\n",
            &compact(),
        );
        assert!(cte.contains("), -- first\n"), "{cte}");
        assert!(!cte.contains("\n,"), "{cte}");
    }

    #[test]
    fn test_block_layout_with_lower_case() {
        let profile = RuleProfile::with_style(Style {
            clause_layout: ClauseLayout::Block,
            ..Style::compact()
        })
        .unwrap();
        assert_eq!(
            fmt("select a from t where x = 1;", &profile),
            "select\n   a\nfrom\n   t\nwhere\n   x = 1;"
        );
    }

    #[test]
    fn test_whitespace_only_is_unchanged() {
        assert_eq!(format_text("  \n\n", &compact()).unwrap(), "  \n\n");
        assert_eq!(format_text("", &compact()).unwrap(), "");
    }

    #[test]
    fn test_trailing_newline_is_normalized() {
        assert_eq!(format_text("select 1 from dual;\n\n\n", &compact()).unwrap(), "select 1\n  from dual;\n");
        assert_eq!(format_text("select 1 from dual;", &compact()).unwrap(), "select 1\n  from dual;");
    }

    #[test]
    fn test_crlf_is_kept() {
        assert_eq!(
            fmt("begin\r\nnull;\r\nend;\r\n", &compact()),
            "begin\r\n   null;\r\nend;\r\n"
        );
    }

    #[test]
    fn test_line_breaks_inside_literals_are_copied() {
        assert_eq!(
            fmt("begin\r\nx := 'a\nb';\r\nend;\r\n", &compact()),
            "begin\r\n   x := 'a\nb';\r\nend;\r\n"
        );
        assert_eq!(
            fmt("begin\nx := 'a\r\nb'; /* c\r\n */\nend;\n", &compact()),
            "begin\n   x := 'a\r\nb'; /* c\r\n */\nend;\n"
        );
    }

    #[test]
    fn test_comments_survive() {
        let source = "\
-- header
begin
  x := 1; -- one

  /* two */
  y := 2;
end;
-- footer
";
        let expected = "\
-- header
begin
   x := 1; -- one

   /* two */
   y := 2;
end;
-- footer
";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_blank_lines_between_statements_are_kept_once() {
        assert_eq!(
            fmt("begin\n  a;\n\n\n\n  b;\nend;\n", &compact()),
            "begin\n   a;\n\n   b;\nend;\n"
        );
    }

    #[test]
    fn test_long_call_is_exploded() {
        let profile = RuleProfile::with_style(Style {
            line_length: 40,
            ..Style::compact()
        })
        .unwrap();
        let expected = "\
begin
   some_procedure(
      first_argument => 1,
      second_argument => 2
   );
end;
";
        assert_eq!(
            fmt("begin some_procedure(first_argument => 1, second_argument => 2); end;\n", &profile),
            expected
        );
    }

    #[test]
    fn test_if_elsif_else() {
        let source = "begin if a = 1 then b; elsif a = 2 then c; else d; end if; end;";
        let expected = "\
begin
   if a = 1 then
      b;
   elsif a = 2 then
      c;
   else
      d;
   end if;
end;";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_select_into_and_dml() {
        let source = "begin select count(*) into l_n from emp where deptno = 10; \
update emp set sal = sal * 2, comm = 0 where empno = 7; delete from emp where empno = 8; \
insert into emp (empno, ename) values (9, 'X'); end;";
        let expected = "\
begin
   select count(*)
     into l_n
     from emp
    where deptno = 10;
   update emp
      set sal = sal * 2,
          comm = 0
    where empno = 7;
   delete from emp
    where empno = 8;
   insert into emp (empno, ename)
   values (9, 'X');
end;";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_case_and_cursor_loop() {
        let source = "begin for r in (select a from t) loop \
case r.a when 1 then x; else y; end case; end loop; end;";
        let expected = "\
begin
   for r in (
      select a
        from t
   ) loop
      case r.a
         when 1 then
            x;
         else
            y;
      end case;
   end loop;
end;";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_declarations_of_a_block() {
        let source = "declare type r_t is record (id number, name varchar2(30)); \
cursor c_emp (p_id integer) is select * from emp where id = p_id; \
e_oops exception; pragma exception_init(e_oops, -20001); begin null; end;";
        let expected = "\
declare
   type r_t is record (
      id    number,
      name  varchar2(30)
   );
   cursor c_emp (p_id integer) is
      select *
        from emp
       where id = p_id;
   e_oops exception;
   pragma exception_init(e_oops, -20001);
begin
   null;
end;";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_union_and_subquery_in_where() {
        let source = "select a from t where exists (select 1 from u where u.a = t.a) union all select b from v;";
        let expected = "\
select a
  from t
 where exists (
          select 1
            from u
           where u.a = t.a
       )
union all
select b
  from v;";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_long_case_expression_is_exploded() {
        let profile = RuleProfile::with_style(Style {
            line_length: 40,
            ..Style::compact()
        })
        .unwrap();
        let source = "begin x := case when a = 1 then 'one' when a = 2 then 'two' else 'many' end; end;";
        let expected = "\
begin
   x := case
      when a = 1 then 'one'
      when a = 2 then 'two'
      else 'many'
   end;
end;";
        assert_eq!(fmt(source, &profile), expected);
    }

    #[test]
    fn test_row_limit_and_for_update() {
        assert_eq!(
            fmt("SELECT a FROM t ORDER BY a OFFSET 5 ROWS FETCH FIRST 10 ROWS ONLY;", &compact()),
            "select a\n  from t\n order by a\noffset 5 rows\n fetch first 10 rows only;"
        );
        assert_eq!(
            fmt("select a from t where b = 1 for update of a nowait;", &compact()),
            "select a\n  from t\n where b = 1\n   for update of a nowait;"
        );
    }

    #[test]
    fn test_analytic_and_oracle_operators() {
        assert_eq!(
            fmt("select row_number() over (partition by d order by s desc) rn from t;", &compact()),
            "select row_number() over (partition by d order by s desc) rn\n  from t;"
        );
        let source = "select cast(a as varchar2(10)) from t, s where t.id = s.id(+) \
                      and t.n like 'a!_%' escape '!' and t.k = any (1, 2);";
        let expected = "\
select cast(a as varchar2(10))
  from t,
       s
 where t.id = s.id(+)
   and t.n like 'a!_%' escape '!'
   and t.k = any (1, 2);";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_forall_body_is_indented() {
        let source = "begin\nforall i in 1 .. l_ids.count\ndelete from t where id = l_ids(i);\nend;\n";
        let expected = "\
begin
   forall i in 1 .. l_ids.count
      delete from t
       where id = l_ids(i);
end;
";
        assert_eq!(fmt(source, &compact()), expected);
    }

    #[test]
    fn test_trigger_and_view() {
        let source = "create or replace trigger emp_biu before insert or update of sal on emp \
                      for each row when (new.sal > 0) begin :new.sal := 1; end;\n/\n";
        let expected = "\
create or replace trigger emp_biu
   before insert or update of sal on emp
   for each row
   when (new.sal > 0)
begin
   :new.sal := 1;
end;
/
";
        assert_eq!(fmt(source, &compact()), expected);
        assert_eq!(
            fmt("create or replace view v (a, b) as select x, y from t with read only;\n", &compact()),
            "create or replace view v (a, b) as\nselect x,\n       y\n  from t\n  with read only;\n"
        );
    }

    #[test]
    fn test_syntax_error_is_returned() {
        let err = format_text("begin\n  x := ;\nend;\n", &compact()).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_keyword_case_keep() {
        let profile = RuleProfile::with_style(Style {
            keyword_case: crate::profile::CaseMode::Keep,
            ..Style::compact()
        })
        .unwrap();
        assert_eq!(fmt("Select A From T;", &profile), "Select A\n  From T;");
    }
}
