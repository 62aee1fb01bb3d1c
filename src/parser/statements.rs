//! Units, declarations and PL/SQL statements.

use super::lexer::TokenKind;
use super::tree::*;
use super::{PResult, Parser};

/// Subprogram modifiers that are a single word
const MODIFIER_WORDS: &[&str] = &[
    "deterministic",
    "pipelined",
    "parallel_enable",
    "result_cache",
];

/// Words that may follow a type name as part of the type
const TYPE_SUFFIX_WORDS: &[&str] = &[
    "with", "local", "time", "zone", "precision", "raw", "varying", "day", "to", "second",
    "year", "month",
];

/// Statement keywords that are not reserved; they only start a statement when
/// the next token cannot continue a name
const SOFT_STATEMENT_WORDS: &[&str] = &[
    "exit", "continue", "raise", "open", "fetch", "close", "execute", "commit", "rollback",
    "savepoint", "goto", "pipe",
];

impl Parser<'_> {
    pub(super) fn script(&mut self) -> PResult<Script> {
        let mut units = Vec::new();
        while !self.at_eof() {
            let body = self.unit()?;
            let slash = (self.peek().kind == TokenKind::Slash).then(|| self.advance());
            units.push(Unit { body, slash });
        }
        Ok(Script {
            units,
            eof: self.pos,
        })
    }

    fn unit(&mut self) -> PResult<UnitBody> {
        if self.at_word("create") {
            return self.create();
        }
        if self.at_any_word(&["declare", "begin"]) {
            let declare = self.accept_word("declare");
            return Ok(UnitBody::Block(Box::new(self.block(declare)?)));
        }
        if self.at_sql_start() {
            let dml = self.dml()?;
            let semi = self.unit_semicolon()?;
            return Ok(UnitBody::Sql(Box::new(SqlStatement { dml, semi })));
        }
        Err(self.error())
    }

    /// `;` ending a top-level statement, optional before a `/` line
    fn unit_semicolon(&mut self) -> PResult<Option<Tok>> {
        if self.peek().kind == TokenKind::Slash {
            return Ok(None);
        }
        Ok(Some(self.expect_symbol(";")?))
    }

    fn create(&mut self) -> PResult<UnitBody> {
        let mut header = vec![self.keyword()];
        if let Some(or_kw) = self.accept_word("or") {
            header.push(or_kw);
            header.push(self.expect_word("replace")?);
        }
        if self.word_at(0, "force") || self.word_at(0, "noforce") {
            header.push(self.keyword());
        }
        if self.at_any_word(&["editionable", "noneditionable"]) {
            header.push(self.keyword());
        }

        if self.at_word("package") {
            header.push(self.keyword());
            if let Some(body) = self.accept_word("body") {
                header.push(body);
            }
            return Ok(UnitBody::Package(Box::new(self.package(header)?)));
        }
        if self.at_any_word(&["procedure", "function"]) {
            let subprogram = self.subprogram()?;
            return Ok(UnitBody::Subprogram(Box::new(CreateSubprogram {
                header,
                subprogram,
            })));
        }
        if self.at_word("trigger") {
            header.push(self.keyword());
            return Ok(UnitBody::Trigger(Box::new(self.trigger(header)?)));
        }
        if self.at_word("view") {
            header.push(self.keyword());
            return Ok(UnitBody::View(Box::new(self.view(header)?)));
        }
        Err(self.error())
    }

    fn trigger(&mut self, header: Vec<Tok>) -> PResult<TriggerDef> {
        let name = self.name()?;
        let mut timing = Vec::new();
        if let Some(instead) = self.accept_word("instead") {
            timing.push(instead);
            timing.push(self.expect_word("of")?);
        } else if self.at_any_word(&["before", "after"]) {
            timing.push(self.keyword());
        } else {
            return Err(self.error());
        }

        let mut events = Vec::new();
        loop {
            let or_kw = if events.is_empty() {
                None
            } else if let Some(or_kw) = self.accept_word("or") {
                Some(or_kw)
            } else {
                break;
            };
            if !self.at_any_word(&["insert", "update", "delete"]) {
                return Err(self.error());
            }
            let kw = self.keyword();
            let of = if self.tokens[kw].is_word("update") {
                match self.accept_word("of") {
                    Some(of) => Some((of, self.identifier_list()?)),
                    None => None,
                }
            } else {
                None
            };
            events.push(TriggerEvent { or_kw, kw, of });
        }
        let on_kw = self.expect_word("on")?;
        let table = self.name()?;

        let mut referencing = Vec::new();
        if let Some(kw) = self.accept_word("referencing") {
            referencing.push(kw);
            while self.at_any_word(&["new", "old", "parent"]) {
                referencing.push(self.keyword());
                referencing.extend(self.accept_word("as"));
                referencing.push(self.expect_identifier()?);
            }
        }
        let mut for_each_row = Vec::new();
        if let Some(for_kw) = self.accept_word("for") {
            for_each_row.push(for_kw);
            for_each_row.push(self.expect_word("each")?);
            for_each_row.push(self.expect_word("row")?);
        }
        let when = match self.accept_word("when") {
            Some(when) => Some((when, self.args()?)),
            None => None,
        };
        if !self.at_any_word(&["declare", "begin"]) {
            return Err(self.error());
        }
        let declare = self.accept_word("declare");
        let body = Box::new(self.block(declare)?);
        Ok(TriggerDef {
            header,
            name,
            timing,
            events,
            on_kw,
            table,
            referencing,
            for_each_row,
            when,
            body,
        })
    }

    fn identifier_list(&mut self) -> PResult<List<Tok>> {
        let mut list = List::new();
        loop {
            list.items.push(self.expect_identifier()?);
            match self.accept_symbol(",") {
                Some(comma) => list.commas.push(comma),
                None => return Ok(list),
            }
        }
    }

    fn view(&mut self, header: Vec<Tok>) -> PResult<ViewDef> {
        let name = self.name()?;
        let columns = if self.peek().is_symbol("(") {
            Some(self.args()?)
        } else {
            None
        };
        let as_kw = self.expect_word("as")?;
        let query = self.query()?;
        let mut options = Vec::new();
        if self.word_at(0, "with") && (self.word_at(1, "read") || self.word_at(1, "check")) {
            options.push(self.keyword());
            if let Some(read) = self.accept_word("read") {
                options.push(read);
                options.push(self.expect_word("only")?);
            } else {
                options.push(self.expect_word("check")?);
                options.push(self.expect_word("option")?);
            }
        }
        let semi = self.unit_semicolon()?;
        Ok(ViewDef {
            header,
            name,
            columns,
            as_kw,
            query,
            options,
            semi,
        })
    }

    fn package(&mut self, header: Vec<Tok>) -> PResult<PackageDef> {
        let name = self.name()?;
        let modifiers = self.modifiers()?;
        let is_kw = self.is_or_as()?;
        let items = self.declarations()?;
        let init = match self.accept_word("begin") {
            Some(begin) => Some((begin, self.statements(&["end"])?)),
            None => None,
        };
        let end_kw = self.expect_word("end")?;
        let end_name = self.end_name();
        let semi = self.expect_symbol(";")?;
        Ok(PackageDef {
            header,
            name,
            modifiers,
            is_kw,
            items,
            init,
            end_kw,
            end_name,
            semi,
        })
    }

    fn is_or_as(&mut self) -> PResult<Tok> {
        match self.accept_word("is") {
            Some(tok) => Ok(tok),
            None => self.expect_word("as"),
        }
    }

    fn end_name(&mut self) -> Option<Tok> {
        self.at_identifier().then(|| self.advance())
    }

    /// `procedure|function name [(params)] [return type] [modifiers] (; | is block)`
    pub(super) fn subprogram(&mut self) -> PResult<Subprogram> {
        let kind_kw = self.keyword();
        let is_function = self.tokens[kind_kw].is_word("function");
        let name = self.name()?;
        let params = if self.peek().is_symbol("(") {
            Some(self.param_list()?)
        } else {
            None
        };
        let ret = if is_function {
            let kw = self.expect_word("return")?;
            Some((kw, self.data_type()?))
        } else {
            None
        };
        let modifiers = self.modifiers()?;

        let body = if let Some(semi) = self.accept_symbol(";") {
            SubprogramBody::Forward(semi)
        } else {
            let is_kw = self.is_or_as()?;
            SubprogramBody::Defined {
                is_kw,
                block: Box::new(self.block(None)?),
            }
        };
        Ok(Subprogram {
            kind_kw,
            name,
            params,
            ret,
            modifiers,
            body,
        })
    }

    fn modifiers(&mut self) -> PResult<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        loop {
            if self.at_any_word(MODIFIER_WORDS) {
                modifiers.push(Modifier::Word(self.keyword()));
            } else if let Some(kw) = self.accept_word("authid") {
                if !self.at_any_word(&["current_user", "definer"]) {
                    return Err(self.error());
                }
                let value = self.keyword();
                modifiers.push(Modifier::Authid { kw, value });
            } else if let Some(accessible) = self.accept_word("accessible") {
                let by = self.expect_word("by")?;
                let open = self.expect_symbol("(")?;
                let mut accessors = List::new();
                loop {
                    let unit_kind = if self.at_any_word(&[
                        "function", "procedure", "package", "trigger", "type",
                    ]) && self.is_name_part(self.peek_at(1))
                    {
                        Some(self.keyword())
                    } else {
                        None
                    };
                    accessors.items.push(Accessor {
                        unit_kind,
                        name: self.name()?,
                    });
                    match self.accept_symbol(",") {
                        Some(comma) => accessors.commas.push(comma),
                        None => break,
                    }
                }
                let close = self.expect_symbol(")")?;
                modifiers.push(Modifier::AccessibleBy {
                    kws: [accessible, by],
                    open,
                    accessors,
                    close,
                });
            } else {
                return Ok(modifiers);
            }
        }
    }

    fn param_list(&mut self) -> PResult<ParamList> {
        let open = self.expect_symbol("(")?;
        let mut params = List::new();
        loop {
            params.items.push(self.param()?);
            match self.accept_symbol(",") {
                Some(comma) => params.commas.push(comma),
                None => break,
            }
        }
        let close = self.expect_symbol(")")?;
        Ok(ParamList {
            open,
            params,
            close,
        })
    }

    fn param(&mut self) -> PResult<Param> {
        let name = self.expect_identifier()?;
        let mut mode = Vec::new();
        if let Some(in_kw) = self.accept_word("in") {
            mode.push(in_kw);
        }
        if let Some(out_kw) = self.accept_word("out") {
            mode.push(out_kw);
            if let Some(nocopy) = self.accept_word("nocopy") {
                mode.push(nocopy);
            }
        }
        let ty = self.data_type()?;
        let default = self.default_value()?;
        Ok(Param {
            name,
            mode,
            ty,
            default,
        })
    }

    /// `:= expr` or `default expr`
    fn default_value(&mut self) -> PResult<Option<(Tok, Expr)>> {
        let op = if let Some(assign) = self.accept_symbol(":=") {
            assign
        } else if let Some(default) = self.accept_word("default") {
            default
        } else {
            return Ok(None);
        };
        Ok(Some((op, self.expr()?)))
    }

    pub(super) fn data_type(&mut self) -> PResult<DataType> {
        if !self.is_name_part(self.peek()) {
            self.expect_symbol_name("data type");
            return Err(self.error());
        }
        let first = self.advance();
        let builtin = self.grammar.is_type_name(&self.tokens[first].text);
        self.keywords[first] = builtin;
        let mut last = first;
        while self.peek().is_symbol(".") && self.is_name_part(self.peek_at(1)) {
            self.advance();
            last = self.advance();
        }
        if self.peek().is_symbol("%") && (self.word_at(1, "type") || self.word_at(1, "rowtype")) {
            self.advance();
            last = self.keyword();
        }
        let name = Name { first, last };

        let args = if self.peek().is_symbol("(") {
            Some(self.type_args()?)
        } else {
            None
        };

        let mut suffix = Vec::new();
        if builtin {
            while TYPE_SUFFIX_WORDS.iter().any(|w| self.peek().is_word(w)) {
                suffix.push(self.keyword());
            }
        }
        Ok(DataType { name, args, suffix })
    }

    /// `( 30 char )`, `( 10, 2 )`
    fn type_args(&mut self) -> PResult<TypeArgs> {
        let open = self.expect_symbol("(")?;
        let mut toks = Vec::new();
        while !self.peek().is_symbol(")") {
            let token = self.peek();
            match token.kind {
                TokenKind::Number => {
                    toks.push(self.advance());
                }
                TokenKind::Word => {
                    toks.push(self.keyword());
                }
                TokenKind::Symbol if token.text == "," || token.text == "*" => {
                    toks.push(self.advance());
                }
                _ => {
                    self.expect_symbol_name("')'");
                    return Err(self.error());
                }
            }
        }
        let close = self.advance();
        Ok(TypeArgs { open, toks, close })
    }

    /// Declarations up to `begin` or `end`
    fn declarations(&mut self) -> PResult<Vec<Declaration>> {
        let mut decls = Vec::new();
        while !self.at_any_word(&["begin", "end"]) && !self.at_eof() {
            decls.push(self.declaration()?);
        }
        Ok(decls)
    }

    fn declaration(&mut self) -> PResult<Declaration> {
        if self.at_any_word(&["procedure", "function"]) {
            return Ok(Declaration::Subprogram(Box::new(self.subprogram()?)));
        }
        if self.at_any_word(&["type", "subtype"])
            && self.is_identifier(self.peek_at(1))
            && (self.word_at(2, "is") || self.word_at(2, "as"))
        {
            return Ok(Declaration::Type(Box::new(self.type_decl()?)));
        }
        if self.at_word("cursor") && self.is_identifier(self.peek_at(1)) {
            return Ok(Declaration::Cursor(Box::new(self.cursor_decl()?)));
        }
        if let Some(kw) = self.accept_word("pragma") {
            let name = self.keyword_name()?;
            let args = if self.peek().is_symbol("(") {
                Some(self.args()?)
            } else {
                None
            };
            let semi = self.expect_symbol(";")?;
            return Ok(Declaration::Pragma {
                kw,
                name,
                args,
                semi,
            });
        }

        let name = self.expect_identifier()?;
        if let Some(kw) = self.accept_word("exception") {
            let semi = self.expect_symbol(";")?;
            return Ok(Declaration::Exception { name, kw, semi });
        }
        let constant = self.accept_word("constant");
        let ty = self.data_type()?;
        let not_null = self.not_null()?;
        let default = self.default_value()?;
        let semi = self.expect_symbol(";")?;
        Ok(Declaration::Variable(Box::new(VariableDecl {
            name,
            constant,
            ty,
            not_null,
            default,
            semi,
        })))
    }

    /// A word consumed in keyword position, such as a pragma name
    fn keyword_name(&mut self) -> PResult<Tok> {
        if self.peek().kind == TokenKind::Word {
            Ok(self.keyword())
        } else {
            self.expect_symbol_name("identifier");
            Err(self.error())
        }
    }

    fn not_null(&mut self) -> PResult<Vec<Tok>> {
        match self.accept_word("not") {
            Some(not_kw) => Ok(vec![not_kw, self.expect_word("null")?]),
            None => Ok(Vec::new()),
        }
    }

    fn type_decl(&mut self) -> PResult<TypeDecl> {
        let kw = self.keyword();
        let name = self.advance();
        let is_kw = self.keyword();

        let def = if let Some(record) = self.accept_word("record") {
            let open = self.expect_symbol("(")?;
            let mut fields = List::new();
            loop {
                let name = self.expect_identifier()?;
                let ty = self.data_type()?;
                let not_null = self.not_null()?;
                let default = self.default_value()?;
                fields.items.push(Field {
                    name,
                    ty,
                    not_null,
                    default,
                });
                match self.accept_symbol(",") {
                    Some(comma) => fields.commas.push(comma),
                    None => break,
                }
            }
            let close = self.expect_symbol(")")?;
            TypeDef::Record {
                kw: record,
                open,
                fields,
                close,
            }
        } else if self.at_any_word(&["table", "varray"]) {
            let kind = self.keyword();
            let size = if self.peek().is_symbol("(") {
                Some(self.type_args()?)
            } else {
                None
            };
            let of = self.expect_word("of")?;
            let elem = self.data_type()?;
            let not_null = self.not_null()?;
            let index_by = match self.accept_word("index") {
                Some(index) => {
                    let by = self.expect_word("by")?;
                    Some(([index, by], self.data_type()?))
                }
                None => None,
            };
            TypeDef::Collection {
                kind,
                size,
                of,
                elem,
                not_null,
                index_by,
            }
        } else if let Some(ref_kw) = self.accept_word("ref") {
            let cursor = self.expect_word("cursor")?;
            let ret = match self.accept_word("return") {
                Some(kw) => Some((kw, self.data_type()?)),
                None => None,
            };
            TypeDef::RefCursor {
                kws: [ref_kw, cursor],
                ret,
            }
        } else {
            let ty = self.data_type()?;
            let not_null = self.not_null()?;
            TypeDef::Alias { ty, not_null }
        };

        let semi = self.expect_symbol(";")?;
        Ok(TypeDecl {
            kw,
            name,
            is_kw,
            def,
            semi,
        })
    }

    fn cursor_decl(&mut self) -> PResult<CursorDecl> {
        let kw = self.keyword();
        let name = self.advance();
        let params = if self.peek().is_symbol("(") {
            Some(self.param_list()?)
        } else {
            None
        };
        let ret = match self.accept_word("return") {
            Some(kw) => Some((kw, self.data_type()?)),
            None => None,
        };
        let query = match self.accept_word("is") {
            Some(is_kw) => Some((is_kw, self.query()?)),
            None => None,
        };
        let semi = self.expect_symbol(";")?;
        Ok(CursorDecl {
            kw,
            name,
            params,
            ret,
            query,
            semi,
        })
    }

    /// Block after an optional `declare`; subprogram bodies pass `None` and
    /// still get a declaration section
    pub(super) fn block(&mut self, declare: Option<Tok>) -> PResult<Block> {
        let decls = if declare.is_some() || !self.at_word("begin") {
            self.declarations()?
        } else {
            Vec::new()
        };
        let begin = self.expect_word("begin")?;
        let body = self.statements(&["exception", "end"])?;

        let exception = match self.accept_word("exception") {
            Some(kw) => {
                let mut handlers = Vec::new();
                while self.at_word("when") {
                    handlers.push(self.handler()?);
                }
                Some(ExceptionSection { kw, handlers })
            }
            None => None,
        };

        let end_kw = self.expect_word("end")?;
        let end_name = self.end_name();
        let semi = self.expect_symbol(";")?;
        Ok(Block {
            declare,
            decls,
            begin,
            body,
            exception,
            end_kw,
            end_name,
            semi,
        })
    }

    fn handler(&mut self) -> PResult<Handler> {
        let when = self.keyword();
        let mut choices = vec![self.handler_choice()?];
        let mut ors = Vec::new();
        while let Some(or_kw) = self.accept_word("or") {
            ors.push(or_kw);
            choices.push(self.handler_choice()?);
        }
        let then_kw = self.expect_word("then")?;
        let body = self.statements(&["when", "end"])?;
        Ok(Handler {
            when,
            choices,
            ors,
            then_kw,
            body,
        })
    }

    fn handler_choice(&mut self) -> PResult<Name> {
        if self.at_word("others") {
            let tok = self.keyword();
            return Ok(Name {
                first: tok,
                last: tok,
            });
        }
        self.name()
    }

    /// Statements up to one of the `terminators` keywords
    fn statements(&mut self, terminators: &[&str]) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.at_any_word(terminators) && !self.at_eof() {
            statements.push(self.nested(Parser::statement)?);
        }
        Ok(statements)
    }

    fn statement(&mut self) -> PResult<Statement> {
        let mut labels = Vec::new();
        while self.at_symbol("<<") {
            let open = self.advance();
            let name = self.expect_identifier()?;
            let close = self.expect_symbol(">>")?;
            labels.push(Label { open, name, close });
        }
        let kind = self.statement_kind()?;
        Ok(Statement { labels, kind })
    }

    fn statement_kind(&mut self) -> PResult<StatementKind> {
        if self.at_word("null") && self.symbol_at(1, ";") {
            let words = vec![self.keyword()];
            let semi = self.advance();
            return Ok(StatementKind::Simple {
                words,
                target: None,
                semi,
            });
        }
        if self.at_word("if") {
            return Ok(StatementKind::If(Box::new(self.if_statement()?)));
        }
        if self.at_any_word(&["loop", "while", "for"]) {
            return Ok(StatementKind::Loop(Box::new(self.loop_statement()?)));
        }
        if self.at_any_word(&["declare", "begin"]) {
            let declare = self.accept_word("declare");
            return Ok(StatementKind::Block(Box::new(self.block(declare)?)));
        }
        if self.at_word("case") {
            return Ok(StatementKind::Case(Box::new(self.case_statement()?)));
        }
        if self.peek().is_word("forall") && self.word_at(2, "in") {
            return self.forall_statement();
        }
        if self.at_word("return") {
            let kw = self.keyword();
            let value = if self.peek().is_symbol(";") {
                None
            } else {
                Some(self.expr()?)
            };
            let semi = self.expect_symbol(";")?;
            return Ok(StatementKind::Return { kw, value, semi });
        }
        if self.at_sql_start() {
            let dml = self.dml()?;
            let semi = Some(self.expect_symbol(";")?);
            return Ok(StatementKind::Sql(Box::new(SqlStatement { dml, semi })));
        }
        if self.at_soft_statement_word() {
            return self.soft_statement();
        }

        let target = self.primary()?;
        if let Some(op) = self.accept_symbol(":=") {
            let value = self.expr()?;
            let semi = self.expect_symbol(";")?;
            return Ok(StatementKind::Assign {
                target,
                op,
                value,
                semi,
            });
        }
        let semi = self.expect_symbol(";")?;
        Ok(StatementKind::Call { expr: target, semi })
    }

    fn at_soft_statement_word(&mut self) -> bool {
        let next = self.peek_at(1);
        let continues_name = next.kind == TokenKind::Symbol
            && matches!(next.text.as_str(), ":=" | "." | "(" | "%" | "@");
        !continues_name && self.at_any_word(SOFT_STATEMENT_WORDS)
    }

    fn soft_statement(&mut self) -> PResult<StatementKind> {
        let word = self.peek().text.to_ascii_lowercase();
        let kw = self.keyword();
        match word.as_str() {
            "exit" | "continue" => {
                let label = (!self.at_word("when") && self.at_identifier()).then(|| self.advance());
                let when = match self.accept_word("when") {
                    Some(when) => Some((when, self.expr()?)),
                    None => None,
                };
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::Exit {
                    kw,
                    label,
                    when,
                    semi,
                })
            }
            "open" => {
                let cursor = self.primary()?;
                let source = match self.accept_word("for") {
                    Some(for_kw) => {
                        let source = if self.at_query_start() {
                            OpenSource::Query(self.query()?)
                        } else {
                            OpenSource::Dynamic(self.expr()?)
                        };
                        Some((for_kw, source))
                    }
                    None => None,
                };
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::Open {
                    kw,
                    cursor,
                    source,
                    semi,
                })
            }
            "fetch" => {
                let cursor = self.primary()?;
                let Some(into) = self.into_clause()? else {
                    return Err(self.error());
                };
                let limit = match self.accept_word("limit") {
                    Some(limit) => Some((limit, self.expr()?)),
                    None => None,
                };
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::Fetch {
                    kw,
                    cursor,
                    into,
                    limit,
                    semi,
                })
            }
            "execute" => {
                let immediate = self.expect_word("immediate")?;
                let sql = self.expr()?;
                let into = self.into_clause()?;
                let using = match self.accept_word("using") {
                    Some(using) => Some((using, self.using_args()?)),
                    None => None,
                };
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::ExecuteImmediate {
                    kws: [kw, immediate],
                    sql,
                    into,
                    using,
                    semi,
                })
            }
            "pipe" => {
                let row = self.expect_word("row")?;
                let open = self.expect_symbol("(")?;
                let value = self.expr()?;
                let close = self.expect_symbol(")")?;
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::PipeRow {
                    kws: [kw, row],
                    open,
                    value,
                    close,
                    semi,
                })
            }
            "commit" | "rollback" => {
                let mut words = vec![kw];
                if let Some(work) = self.accept_word("work") {
                    words.push(work);
                }
                let mut target = None;
                if word == "rollback" {
                    if let Some(to) = self.accept_word("to") {
                        words.push(to);
                        if let Some(savepoint) = self.accept_word("savepoint") {
                            words.push(savepoint);
                        }
                        target = Some(self.primary()?);
                    }
                }
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::Simple {
                    words,
                    target,
                    semi,
                })
            }
            _ => {
                // raise [name], close name, savepoint name, goto label
                let target = if word == "raise" && self.peek().is_symbol(";") {
                    None
                } else {
                    Some(self.primary()?)
                };
                let semi = self.expect_symbol(";")?;
                Ok(StatementKind::Simple {
                    words: vec![kw],
                    target,
                    semi,
                })
            }
        }
    }

    fn using_args(&mut self) -> PResult<List<UsingArg>> {
        let mut args = List::new();
        loop {
            let mut mode = Vec::new();
            if let Some(in_kw) = self.accept_word("in") {
                mode.push(in_kw);
            }
            if let Some(out_kw) = self.accept_word("out") {
                mode.push(out_kw);
            }
            let value = self.expr()?;
            args.items.push(UsingArg { mode, value });
            match self.accept_symbol(",") {
                Some(comma) => args.commas.push(comma),
                None => return Ok(args),
            }
        }
    }

    fn if_statement(&mut self) -> PResult<IfStmt> {
        let if_kw = self.keyword();
        let cond = self.expr()?;
        let then_kw = self.expect_word("then")?;
        let body = self.statements(&["elsif", "else", "end"])?;

        let mut elsifs = Vec::new();
        while let Some(kw) = self.accept_word("elsif") {
            let cond = self.expr()?;
            let then_kw = self.expect_word("then")?;
            let body = self.statements(&["elsif", "else", "end"])?;
            elsifs.push(ElsIf {
                kw,
                cond,
                then_kw,
                body,
            });
        }
        let else_branch = match self.accept_word("else") {
            Some(kw) => Some((kw, self.statements(&["end"])?)),
            None => None,
        };
        let end = [self.expect_word("end")?, self.expect_word("if")?];
        let semi = self.expect_symbol(";")?;
        Ok(IfStmt {
            if_kw,
            cond,
            then_kw,
            body,
            elsifs,
            else_branch,
            end,
            semi,
        })
    }

    fn loop_statement(&mut self) -> PResult<LoopStmt> {
        let scheme = if let Some(kw) = self.accept_word("while") {
            LoopScheme::While {
                kw,
                cond: self.expr()?,
            }
        } else if let Some(kw) = self.accept_word("for") {
            let var = self.expect_identifier()?;
            let in_kw = self.expect_word("in")?;
            let reverse = self.accept_word("reverse");
            let range = self.for_range()?;
            LoopScheme::For {
                kw,
                var,
                in_kw,
                reverse,
                range,
            }
        } else {
            LoopScheme::Basic
        };

        let loop_kw = self.expect_word("loop")?;
        let body = self.statements(&["end"])?;
        let end = [self.expect_word("end")?, self.expect_word("loop")?];
        let end_label = self.end_name();
        let semi = self.expect_symbol(";")?;
        Ok(LoopStmt {
            scheme,
            loop_kw,
            body,
            end,
            end_label,
            semi,
        })
    }

    /// `forall i in 1 .. n | indices of t | values of t [save exceptions] dml;`
    fn forall_statement(&mut self) -> PResult<StatementKind> {
        let kw = self.keyword();
        let var = self.expect_identifier()?;
        let in_kw = self.expect_word("in")?;
        let range = if self.at_any_word(&["indices", "values"]) {
            let kws = [self.keyword(), self.expect_word("of")?];
            ForRange::Collection {
                kws,
                collection: self.primary()?,
            }
        } else {
            let low = self.expr()?;
            let dots = self.expect_symbol("..")?;
            let high = self.expr()?;
            ForRange::Numeric { low, dots, high }
        };
        let mut save_exceptions = Vec::new();
        if let Some(save) = self.accept_word("save") {
            save_exceptions.push(save);
            save_exceptions.push(self.expect_word("exceptions")?);
        }
        let body = Box::new(self.nested(Parser::statement)?);
        Ok(StatementKind::Forall {
            kw,
            var,
            in_kw,
            range,
            save_exceptions,
            body,
        })
    }

    fn for_range(&mut self) -> PResult<ForRange> {
        if self.at_symbol("(") && (self.word_at(1, "select") || self.word_at(1, "with")) {
            return Ok(ForRange::Query(self.subquery()?));
        }
        let low = self.expr()?;
        if let Some(dots) = self.accept_symbol("..") {
            let high = self.expr()?;
            return Ok(ForRange::Numeric { low, dots, high });
        }
        Ok(ForRange::Cursor(low))
    }

    fn case_statement(&mut self) -> PResult<CaseStmt> {
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
            let body = self.statements(&["when", "else", "end"])?;
            whens.push(CaseStmtWhen {
                when,
                cond,
                then_kw,
                body,
            });
        }
        if whens.is_empty() {
            return Err(self.error());
        }
        let else_branch = match self.accept_word("else") {
            Some(kw) => Some((kw, self.statements(&["end"])?)),
            None => None,
        };
        let end = [self.expect_word("end")?, self.expect_word("case")?];
        let semi = self.expect_symbol(";")?;
        Ok(CaseStmt {
            case_kw,
            selector,
            whens,
            else_branch,
            end,
            semi,
        })
    }
}
