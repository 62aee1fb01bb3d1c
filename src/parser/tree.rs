//! Parse tree for PL/SQL scripts.
//!
//! Nodes never copy text. Every token of the source is referenced exactly once
//! by index ([`Tok`]) into [`ParseTree::tokens`], in source order, so the
//! rewriter can emit the tokens (and the comments attached to them) without
//! losing or reordering anything.

use super::lexer::Token;

/// Index of a token in [`ParseTree::tokens`]
pub type Tok = usize;

/// Result of a successful parse
#[derive(Debug, Clone)]
pub struct ParseTree {
    pub tokens: Vec<Token>,
    /// Per token: consumed in keyword position (cased as a keyword)
    pub keywords: Vec<bool>,
    pub script: Script,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub units: Vec<Unit>,
    /// Carries comments after the last unit
    pub eof: Tok,
}

/// One top-level compilation unit with its optional `/` line
#[derive(Debug, Clone)]
pub struct Unit {
    pub body: UnitBody,
    pub slash: Option<Tok>,
}

#[derive(Debug, Clone)]
pub enum UnitBody {
    Package(Box<PackageDef>),
    Subprogram(Box<CreateSubprogram>),
    Trigger(Box<TriggerDef>),
    View(Box<ViewDef>),
    Block(Box<Block>),
    Sql(Box<SqlStatement>),
}

impl UnitBody {
    /// Whether the unit ends with `end [name];`
    #[must_use]
    pub fn ends_with_end(&self) -> bool {
        match self {
            UnitBody::Package(_) | UnitBody::Trigger(_) | UnitBody::Block(_) => true,
            UnitBody::Subprogram(create) => create.subprogram.is_defined(),
            UnitBody::View(_) | UnitBody::Sql(_) => false,
        }
    }
}

/// Comma separated items with their separators
#[derive(Debug, Clone)]
pub struct List<T> {
    pub items: Vec<T>,
    /// `commas[i]` follows `items[i]`
    pub commas: Vec<Tok>,
}

impl<T> List<T> {
    #[must_use]
    pub fn new() -> Self {
        List {
            items: Vec::new(),
            commas: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// `create or replace [editionable] package [body] name ... end name;`
#[derive(Debug, Clone)]
pub struct PackageDef {
    /// From `create` through `package [body]`
    pub header: Vec<Tok>,
    pub name: Name,
    pub modifiers: Vec<Modifier>,
    pub is_kw: Tok,
    pub items: Vec<Declaration>,
    /// Initialization section of a package body
    pub init: Option<(Tok, Vec<Statement>)>,
    pub end_kw: Tok,
    pub end_name: Option<Tok>,
    pub semi: Tok,
}

/// `create or replace procedure|function ...`
#[derive(Debug, Clone)]
pub struct CreateSubprogram {
    /// From `create` up to (not including) `procedure`/`function`
    pub header: Vec<Tok>,
    pub subprogram: Subprogram,
}

/// `create or replace trigger name before insert or update on t ... begin ... end;`
#[derive(Debug, Clone)]
pub struct TriggerDef {
    /// From `create` through `trigger`
    pub header: Vec<Tok>,
    pub name: Name,
    /// `before`, `after` or `instead of`
    pub timing: Vec<Tok>,
    pub events: Vec<TriggerEvent>,
    pub on_kw: Tok,
    pub table: Name,
    /// `referencing new as n old as o`
    pub referencing: Vec<Tok>,
    /// `for each row`
    pub for_each_row: Vec<Tok>,
    /// `when (condition)`
    pub when: Option<(Tok, Args)>,
    pub body: Box<Block>,
}

/// `insert`, `delete` or `update [of a, b]`, with the `or` before it
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub or_kw: Option<Tok>,
    pub kw: Tok,
    pub of: Option<(Tok, List<Tok>)>,
}

/// `create or replace view name [(columns)] as query [with read only];`
#[derive(Debug, Clone)]
pub struct ViewDef {
    /// From `create` through `view`
    pub header: Vec<Tok>,
    pub name: Name,
    pub columns: Option<Args>,
    pub as_kw: Tok,
    pub query: Query,
    /// `with read only` or `with check option`
    pub options: Vec<Tok>,
    /// Absent when a `/` line ends the view
    pub semi: Option<Tok>,
}

/// Dotted name written without spaces, such as `the_api.math`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub first: Tok,
    /// Inclusive
    pub last: Tok,
}

#[derive(Debug, Clone)]
pub struct Subprogram {
    /// `procedure` or `function`
    pub kind_kw: Tok,
    pub name: Name,
    pub params: Option<ParamList>,
    pub ret: Option<(Tok, DataType)>,
    pub modifiers: Vec<Modifier>,
    pub body: SubprogramBody,
}

impl Subprogram {
    #[must_use]
    pub fn is_defined(&self) -> bool {
        matches!(self.body, SubprogramBody::Defined { .. })
    }
}

#[derive(Debug, Clone)]
pub enum SubprogramBody {
    /// Forward declaration or specification, ends in `;`
    Forward(Tok),
    Defined { is_kw: Tok, block: Box<Block> },
}

#[derive(Debug, Clone)]
pub enum Modifier {
    /// `deterministic`, `pipelined`, `parallel_enable`, `result_cache`
    Word(Tok),
    /// `authid current_user`
    Authid { kw: Tok, value: Tok },
    /// `accessible by ( package a, b )`
    AccessibleBy {
        kws: [Tok; 2],
        open: Tok,
        accessors: List<Accessor>,
        close: Tok,
    },
}

#[derive(Debug, Clone)]
pub struct Accessor {
    /// `package`, `procedure`, ...
    pub unit_kind: Option<Tok>,
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct ParamList {
    pub open: Tok,
    pub params: List<Param>,
    pub close: Tok,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Tok,
    /// `in`, `out`, `in out`, `nocopy`
    pub mode: Vec<Tok>,
    pub ty: DataType,
    /// `default` or `:=` and the value
    pub default: Option<(Tok, Expr)>,
}

/// A type reference such as `varchar2(30 char)`, `t.col%type` or
/// `timestamp with time zone`
#[derive(Debug, Clone)]
pub struct DataType {
    pub name: Name,
    pub args: Option<TypeArgs>,
    /// Trailing words: `with time zone`, `day to second`
    pub suffix: Vec<Tok>,
}

/// Size arguments of a type, written inline
#[derive(Debug, Clone)]
pub struct TypeArgs {
    pub open: Tok,
    pub toks: Vec<Tok>,
    pub close: Tok,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Variable(Box<VariableDecl>),
    /// `e_failed exception;`
    Exception { name: Tok, kw: Tok, semi: Tok },
    Type(Box<TypeDecl>),
    Cursor(Box<CursorDecl>),
    /// `pragma autonomous_transaction;`
    Pragma {
        kw: Tok,
        name: Tok,
        args: Option<Args>,
        semi: Tok,
    },
    Subprogram(Box<Subprogram>),
}

impl Declaration {
    /// Whether the declaration is aligned with its neighbours
    #[must_use]
    pub fn aligned_name(&self) -> Option<Tok> {
        match self {
            Declaration::Variable(var) => Some(var.name),
            Declaration::Exception { name, .. } => Some(*name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_subprogram(&self) -> bool {
        matches!(self, Declaration::Subprogram(_))
    }

    /// Whether the declaration ends with `end [name];`
    #[must_use]
    pub fn ends_with_end(&self) -> bool {
        match self {
            Declaration::Subprogram(sub) => sub.is_defined(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: Tok,
    pub constant: Option<Tok>,
    pub ty: DataType,
    /// `not null`
    pub not_null: Vec<Tok>,
    pub default: Option<(Tok, Expr)>,
    pub semi: Tok,
}

/// `type t is ...;` or `subtype t is ...;`
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kw: Tok,
    pub name: Tok,
    pub is_kw: Tok,
    pub def: TypeDef,
    pub semi: Tok,
}

#[derive(Debug, Clone)]
pub enum TypeDef {
    Record {
        kw: Tok,
        open: Tok,
        fields: List<Field>,
        close: Tok,
    },
    /// `table of t [index by t]`, `varray(n) of t`
    Collection {
        kind: Tok,
        size: Option<TypeArgs>,
        of: Tok,
        elem: DataType,
        not_null: Vec<Tok>,
        index_by: Option<([Tok; 2], DataType)>,
    },
    /// `ref cursor [return t]`
    RefCursor {
        kws: [Tok; 2],
        ret: Option<(Tok, DataType)>,
    },
    /// `subtype s is number(5) [not null]`
    Alias { ty: DataType, not_null: Vec<Tok> },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: Tok,
    pub ty: DataType,
    pub not_null: Vec<Tok>,
    pub default: Option<(Tok, Expr)>,
}

#[derive(Debug, Clone)]
pub struct CursorDecl {
    pub kw: Tok,
    pub name: Tok,
    pub params: Option<ParamList>,
    pub ret: Option<(Tok, DataType)>,
    /// `is` and the query, absent for a cursor specification
    pub query: Option<(Tok, Query)>,
    pub semi: Tok,
}

/// `[declare ...] begin ... [exception ...] end [name];`
#[derive(Debug, Clone)]
pub struct Block {
    pub declare: Option<Tok>,
    pub decls: Vec<Declaration>,
    pub begin: Tok,
    pub body: Vec<Statement>,
    pub exception: Option<ExceptionSection>,
    pub end_kw: Tok,
    pub end_name: Option<Tok>,
    pub semi: Tok,
}

#[derive(Debug, Clone)]
pub struct ExceptionSection {
    pub kw: Tok,
    pub handlers: Vec<Handler>,
}

/// `when a or b then ...`
#[derive(Debug, Clone)]
pub struct Handler {
    pub when: Tok,
    pub choices: Vec<Name>,
    pub ors: Vec<Tok>,
    pub then_kw: Tok,
    pub body: Vec<Statement>,
}

/// `<<name>>`
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub open: Tok,
    pub name: Tok,
    pub close: Tok,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub labels: Vec<Label>,
    pub kind: StatementKind,
}

impl Statement {
    /// Whether the statement ends with `end ...;`
    #[must_use]
    pub fn ends_with_end(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::If(_)
                | StatementKind::Loop(_)
                | StatementKind::Case(_)
                | StatementKind::Block(_)
        )
    }
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    /// Keyword statements with an optional operand: `null;`, `commit;`,
    /// `rollback to savepoint s;`, `goto l;`, `close c;`, `raise e;`
    Simple {
        words: Vec<Tok>,
        target: Option<Expr>,
        semi: Tok,
    },
    Assign {
        target: Expr,
        op: Tok,
        value: Expr,
        semi: Tok,
    },
    /// Procedure call or method invocation
    Call { expr: Expr, semi: Tok },
    If(Box<IfStmt>),
    Loop(Box<LoopStmt>),
    /// `exit` or `continue`
    Exit {
        kw: Tok,
        label: Option<Tok>,
        when: Option<(Tok, Expr)>,
        semi: Tok,
    },
    Return {
        kw: Tok,
        value: Option<Expr>,
        semi: Tok,
    },
    Block(Box<Block>),
    Case(Box<CaseStmt>),
    Sql(Box<SqlStatement>),
    /// `open c [(args)] [for query|expr];`
    Open {
        kw: Tok,
        cursor: Expr,
        source: Option<(Tok, OpenSource)>,
        semi: Tok,
    },
    /// `fetch c [bulk collect] into a, b [limit n];`
    Fetch {
        kw: Tok,
        cursor: Expr,
        into: IntoClause,
        limit: Option<(Tok, Expr)>,
        semi: Tok,
    },
    ExecuteImmediate {
        kws: [Tok; 2],
        sql: Expr,
        into: Option<IntoClause>,
        using: Option<(Tok, List<UsingArg>)>,
        semi: Tok,
    },
    /// `pipe row (expr);`
    PipeRow {
        kws: [Tok; 2],
        open: Tok,
        value: Expr,
        close: Tok,
        semi: Tok,
    },
    /// `forall i in 1 .. n [save exceptions] dml;`
    Forall {
        kw: Tok,
        var: Tok,
        in_kw: Tok,
        range: ForRange,
        save_exceptions: Vec<Tok>,
        body: Box<Statement>,
    },
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Query(Query),
    Dynamic(Expr),
}

/// `[in|out|in out] expr` in a `using` clause
#[derive(Debug, Clone)]
pub struct UsingArg {
    pub mode: Vec<Tok>,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub if_kw: Tok,
    pub cond: Expr,
    pub then_kw: Tok,
    pub body: Vec<Statement>,
    pub elsifs: Vec<ElsIf>,
    pub else_branch: Option<(Tok, Vec<Statement>)>,
    pub end: [Tok; 2],
    pub semi: Tok,
}

#[derive(Debug, Clone)]
pub struct ElsIf {
    pub kw: Tok,
    pub cond: Expr,
    pub then_kw: Tok,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct LoopStmt {
    pub scheme: LoopScheme,
    pub loop_kw: Tok,
    pub body: Vec<Statement>,
    pub end: [Tok; 2],
    pub end_label: Option<Tok>,
    pub semi: Tok,
}

#[derive(Debug, Clone)]
pub enum LoopScheme {
    Basic,
    While {
        kw: Tok,
        cond: Expr,
    },
    For {
        kw: Tok,
        var: Tok,
        in_kw: Tok,
        reverse: Option<Tok>,
        range: ForRange,
    },
}

#[derive(Debug, Clone)]
pub enum ForRange {
    /// `1 .. n`
    Numeric { low: Expr, dots: Tok, high: Expr },
    /// `(select ...)`
    Query(Subquery),
    /// `c` or `c(args)`
    Cursor(Expr),
    /// `indices of t` or `values of t`, only in `forall`
    Collection { kws: [Tok; 2], collection: Expr },
}

/// Searched or simple `case` statement
#[derive(Debug, Clone)]
pub struct CaseStmt {
    pub case_kw: Tok,
    pub selector: Option<Expr>,
    pub whens: Vec<CaseStmtWhen>,
    pub else_branch: Option<(Tok, Vec<Statement>)>,
    pub end: [Tok; 2],
    pub semi: Tok,
}

#[derive(Debug, Clone)]
pub struct CaseStmtWhen {
    pub when: Tok,
    pub cond: Expr,
    pub then_kw: Tok,
    pub body: Vec<Statement>,
}

/// A SQL statement with its terminator
#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub dml: Dml,
    /// Absent only for a top-level statement ended by a `/` line
    pub semi: Option<Tok>,
}

#[derive(Debug, Clone)]
pub enum Dml {
    Query(Query),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

#[derive(Debug, Clone)]
pub struct Query {
    pub with: Option<WithClause>,
    pub first: QueryTerm,
    /// Set operators (`union all`, `minus`, ...) and the following terms
    pub rest: Vec<(Vec<Tok>, QueryTerm)>,
    pub order_by: Option<OrderBy>,
    pub row_limit: Option<RowLimit>,
    pub for_update: Option<ForUpdate>,
}

/// `[offset n rows] [fetch first n rows only]`, at least one of them
#[derive(Debug, Clone)]
pub struct RowLimit {
    /// `offset`, the count and `rows`
    pub offset: Option<(Tok, Expr, Tok)>,
    pub fetch: Option<FetchFirst>,
}

#[derive(Debug, Clone)]
pub struct FetchFirst {
    /// `fetch first` or `fetch next`
    pub kws: [Tok; 2],
    pub count: Option<Expr>,
    /// `[percent] rows only` or `[percent] rows with ties`
    pub tail: Vec<Tok>,
}

/// `for update [of a, b] [nowait | wait n | skip locked]`
#[derive(Debug, Clone)]
pub struct ForUpdate {
    pub kws: [Tok; 2],
    pub of: Option<(Tok, List<Expr>)>,
    pub lock: Vec<Tok>,
}

#[derive(Debug, Clone)]
pub struct WithClause {
    pub kw: Tok,
    pub ctes: List<Cte>,
}

#[derive(Debug, Clone)]
pub struct Cte {
    pub name: Tok,
    pub as_kw: Tok,
    pub query: Subquery,
}

#[derive(Debug, Clone)]
pub enum QueryTerm {
    Select(Box<Select>),
    Nested(Subquery),
}

#[derive(Debug, Clone)]
pub struct Select {
    pub select_kw: Tok,
    /// `distinct`, `unique` or `all`
    pub quantifier: Option<Tok>,
    pub items: List<SelectItem>,
    pub into: Option<IntoClause>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Condition>,
    /// `start with` and `connect by [nocycle]`, in source order
    pub hierarchy: Vec<Condition>,
    pub group_by: Option<(Vec<Tok>, List<Expr>)>,
    pub having: Option<Condition>,
}

/// Clause keywords followed by a condition (`where`, `having`, `on`, ...)
#[derive(Debug, Clone)]
pub struct Condition {
    pub kws: Vec<Tok>,
    pub cond: Expr,
}

#[derive(Debug, Clone)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<Alias>,
}

#[derive(Debug, Clone, Copy)]
pub struct Alias {
    pub as_kw: Option<Tok>,
    pub name: Tok,
}

/// `into a, b` or `bulk collect into a, b`
#[derive(Debug, Clone)]
pub struct IntoClause {
    pub kws: Vec<Tok>,
    pub targets: List<Expr>,
}

#[derive(Debug, Clone)]
pub struct FromClause {
    pub kw: Tok,
    pub tables: List<TableRef>,
}

#[derive(Debug, Clone)]
pub struct TableRef {
    pub primary: TablePrimary,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone)]
pub enum TablePrimary {
    Table {
        name: Name,
        alias: Option<Alias>,
    },
    Subquery {
        query: Subquery,
        alias: Option<Alias>,
    },
    /// `table(expr)`
    Collection {
        kw: Tok,
        open: Tok,
        expr: Expr,
        close: Tok,
        alias: Option<Alias>,
    },
}

#[derive(Debug, Clone)]
pub struct Join {
    /// `join`, `left outer join`, `cross apply`, ...
    pub kws: Vec<Tok>,
    pub target: TablePrimary,
    pub constraint: Option<JoinConstraint>,
}

#[derive(Debug, Clone)]
pub enum JoinConstraint {
    On(Condition),
    Using { kw: Tok, columns: Args },
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub kws: Vec<Tok>,
    pub items: List<OrderItem>,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub expr: Expr,
    /// `asc`, `desc`, `nulls first`, ...
    pub modifiers: Vec<Tok>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    /// `insert into`
    pub kws: [Tok; 2],
    pub table: Name,
    pub alias: Option<Alias>,
    pub columns: Option<Args>,
    pub source: InsertSource,
    pub returning: Option<Returning>,
}

#[derive(Debug, Clone)]
pub enum InsertSource {
    Values { kw: Tok, row: Args },
    Query(Query),
}

#[derive(Debug, Clone)]
pub struct Update {
    pub kw: Tok,
    pub table: Name,
    pub alias: Option<Alias>,
    pub set_kw: Tok,
    pub assignments: List<SetItem>,
    pub where_clause: Option<Condition>,
    pub returning: Option<Returning>,
}

#[derive(Debug, Clone)]
pub struct SetItem {
    pub target: Expr,
    pub eq: Tok,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct Delete {
    /// `delete [from]`
    pub kws: Vec<Tok>,
    pub table: Name,
    pub alias: Option<Alias>,
    pub where_clause: Option<Condition>,
    pub returning: Option<Returning>,
}

/// `returning a, b into x, y`
#[derive(Debug, Clone)]
pub struct Returning {
    pub kw: Tok,
    pub values: List<Expr>,
    pub into: IntoClause,
}

/// `( query )`
#[derive(Debug, Clone)]
pub struct Subquery {
    pub open: Tok,
    pub query: Box<Query>,
    pub close: Tok,
}

/// Parenthesized argument list of a call, a tuple or a value row
#[derive(Debug, Clone)]
pub struct Args {
    pub open: Tok,
    pub list: List<Arg>,
    pub close: Tok,
}

#[derive(Debug, Clone)]
pub struct Arg {
    /// `name =>`
    pub named: Option<(Tok, Tok)>,
    /// `distinct` or `all` in aggregate calls
    pub quantifier: Option<Tok>,
    pub value: Expr,
    /// `as t` in `cast(x as t)`
    pub as_type: Option<(Tok, DataType)>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// String, number or `null`
    Literal(Tok),
    /// `date '2020-01-01'`
    TypedLiteral { kw: Tok, value: Tok },
    Bind(Tok),
    /// `*` in a select list or `count(*)`
    Star(Tok),
    /// Name with member access, calls and attributes: `a.b(1).c%rowcount`
    Path(Path),
    Unary {
        op: Tok,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        /// One or more words: `=`, `and`, `not like`
        op: Vec<Tok>,
        right: Box<Expr>,
    },
    /// `x is [not] null`
    IsNull { operand: Box<Expr>, kws: Vec<Tok> },
    Between {
        operand: Box<Expr>,
        kws: Vec<Tok>,
        low: Box<Expr>,
        and_kw: Tok,
        high: Box<Expr>,
    },
    In {
        operand: Box<Expr>,
        kws: Vec<Tok>,
        list: InList,
    },
    Exists { kw: Tok, query: Subquery },
    /// Right side of `= any (...)`, `> all (select ...)`
    Quantified { kw: Tok, list: InList },
    /// `( expr [, expr ...] )`
    Paren(Args),
    Subquery(Subquery),
    Case(Box<CaseExpr>),
}

#[derive(Debug, Clone)]
pub enum InList {
    Values(Args),
    Query(Subquery),
}

#[derive(Debug, Clone)]
pub struct Path {
    pub head: Tok,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub enum Segment {
    /// `.name` or `.*`
    Member { dot: Tok, name: Tok },
    Call(Args),
    /// `%rowcount`, `%type`
    Attribute { percent: Tok, name: Tok },
    /// `@dblink`
    Link { at: Tok, name: Tok },
    /// `(+)`
    OuterJoin { open: Tok, plus: Tok, close: Tok },
    /// `over (...)`, `within group (...)` or `keep (...)` after a call
    Analytic(Box<AnalyticClause>),
}

#[derive(Debug, Clone)]
pub struct AnalyticClause {
    /// `over`, `within group` or `keep`
    pub kws: Vec<Tok>,
    pub open: Tok,
    /// `dense_rank first|last` of a `keep` clause
    pub lead: Vec<Tok>,
    pub partition_by: Option<(Vec<Tok>, List<Expr>)>,
    pub order_by: Option<OrderBy>,
    pub frame: Option<WindowFrame>,
    pub close: Tok,
}

/// `rows between unbounded preceding and current row`
#[derive(Debug, Clone)]
pub struct WindowFrame {
    /// `rows`, `range` or `groups`, then `between` if present
    pub kws: Vec<Tok>,
    pub start: FrameBound,
    pub end: Option<(Tok, FrameBound)>,
}

#[derive(Debug, Clone)]
pub struct FrameBound {
    /// Offset of `n preceding`
    pub value: Option<Expr>,
    /// `unbounded preceding`, `current row`, `preceding`, ...
    pub kws: Vec<Tok>,
}

#[derive(Debug, Clone)]
pub struct CaseExpr {
    pub case_kw: Tok,
    pub selector: Option<Expr>,
    pub whens: Vec<CaseExprWhen>,
    pub else_branch: Option<(Tok, Expr)>,
    pub end_kw: Tok,
}

#[derive(Debug, Clone)]
pub struct CaseExprWhen {
    pub when: Tok,
    pub cond: Expr,
    pub then_kw: Tok,
    pub result: Expr,
}

impl Expr {
    /// Whether the expression renders across lines no matter how short it is
    #[must_use]
    pub fn has_subquery(&self) -> bool {
        match self {
            Expr::Subquery(_) | Expr::Exists { .. } => true,
            Expr::In { operand, list, .. } => {
                matches!(list, InList::Query(_)) || operand.has_subquery()
            }
            Expr::Quantified { list, .. } => matches!(list, InList::Query(_)),
            Expr::Unary { operand, .. } | Expr::IsNull { operand, .. } => operand.has_subquery(),
            Expr::Binary { left, right, .. } => left.has_subquery() || right.has_subquery(),
            Expr::Between {
                operand, low, high, ..
            } => operand.has_subquery() || low.has_subquery() || high.has_subquery(),
            Expr::Paren(args) => args.list.items.iter().any(|a| a.value.has_subquery()),
            Expr::Path(path) => path.segments.iter().any(|s| match s {
                Segment::Call(args) => args.list.items.iter().any(|a| a.value.has_subquery()),
                _ => false,
            }),
            Expr::Case(case) => {
                case.selector.as_ref().is_some_and(Expr::has_subquery)
                    || case
                        .whens
                        .iter()
                        .any(|w| w.cond.has_subquery() || w.result.has_subquery())
                    || case.else_branch.as_ref().is_some_and(|(_, e)| e.has_subquery())
            }
            Expr::Literal(_)
            | Expr::TypedLiteral { .. }
            | Expr::Bind(_)
            | Expr::Star(_) => false,
        }
    }
}
