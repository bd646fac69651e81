/*!
This crate compiles a single C translation unit into a COIL object - a binary
intermediate representation built from a symbol table, named sections and a
stream of typed instructions over virtual variables.

## Compilation stages
1. **Tokenization** - [lex](lexer::lex) scans the source text into a stream of
   [Tokens](lexer::Token) carrying file/line/column positions. The stream always
   ends with a single `Eof` token. Lexical errors (unterminated literals, bad
   exponents, unknown characters, ..) are reported to the shared
   [Diagnostics](diag::Diagnostics) sink and scanning continues.
2. **Parsing** - [parse](parser::parse) builds a [Program](ast::Program) from the
   tokens by recursive descent with precedence climbing. On a syntax error the
   parser records a diagnostic and synchronizes to the next statement or
   declaration boundary, so one bad construct does not hide the rest.
3. **Semantic analysis** - [analyze](semantic::analyze) walks the tree with a
   lexically scoped symbol table, computes a type for every expression under
   C's usual arithmetic conversions, and checks declarations, calls, returns
   and loop control statements.
4. **Code generation** - [generate](codegen::generate) lowers the validated tree
   into a [CoilObject](coil::CoilObject): `.text`/`.data`/`.bss` sections,
   fresh virtual-variable ids, generated labels for control flow, and
   ABI-tagged parameter/return moves.

The driver aborts between stages whenever the sink has recorded an error, so
later stages may assume their input passed the earlier checks.

## Source language
A C89 subset: the full keyword and operator set is tokenized; declarations,
functions, the usual statement forms (`if`, `while`, `do`-`while`, `for`,
`return`, `break`, `continue`, blocks) and expressions over `void`, `char`,
`int`, `float`, `double` and pointers are compiled. There is no preprocessor,
no `typedef`/`struct`/`union`/`enum` definitions, no `switch`, no `goto`, no
`sizeof` and no initializer lists.
*/

#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]

pub mod args;
pub mod ast;
pub mod coil;
pub mod codegen;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod semantic;
