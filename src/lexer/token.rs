use std::fmt;
use std::rc::Rc;

/// Kind of a lexed token. Closed set: literals, the C89 keyword list and
/// every operator and punctuation mark of the source language, including all
/// multi-character operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// end of input, exactly once per stream
    Eof,
    /// lexically broken input that still produced a token
    Unknown,

    Identifier,
    IntLiteral,
    FloatLiteral,
    StrLiteral,
    CharLiteral,

    KwAuto,
    KwBreak,
    KwCase,
    KwChar,
    KwConst,
    KwContinue,
    KwDefault,
    KwDo,
    KwDouble,
    KwElse,
    KwEnum,
    KwExtern,
    KwFloat,
    KwFor,
    KwGoto,
    KwIf,
    KwInt,
    KwLong,
    KwRegister,
    KwReturn,
    KwShort,
    KwSigned,
    KwSizeof,
    KwStatic,
    KwStruct,
    KwSwitch,
    KwTypedef,
    KwUnion,
    KwUnsigned,
    KwVoid,
    KwVolatile,
    KwWhile,

    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// &
    Amp,
    /// |
    Pipe,
    /// ^
    Caret,
    /// ~
    Tilde,
    /// !
    Bang,
    /// =
    Assign,
    /// <
    Less,
    /// >
    Greater,
    /// .
    Dot,
    /// ->
    Arrow,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    /// +=
    PlusAssign,
    /// -=
    MinusAssign,
    /// *=
    StarAssign,
    /// /=
    SlashAssign,
    /// %=
    PercentAssign,
    /// &=
    AmpAssign,
    /// |=
    PipeAssign,
    /// ^=
    CaretAssign,
    /// <<=
    ShlAssign,
    /// >>=
    ShrAssign,
    /// ==
    EqualEqual,
    /// !=
    BangEqual,
    /// <=
    LessEqual,
    /// >=
    GreaterEqual,
    /// <<
    Shl,
    /// >>
    Shr,
    /// &&
    AmpAmp,
    /// ||
    PipePipe,
    /// ?
    Question,

    /// ;
    Semicolon,
    /// :
    Colon,
    /// ,
    Comma,
    /// (
    OpenParen,
    /// )
    CloseParen,
    /// {
    OpenBrace,
    /// }
    CloseBrace,
    /// [
    OpenBracket,
    /// ]
    CloseBracket,
    /// #
    Hash,
    /// ...
    Ellipsis,
}

/// A token with its literal source span and the 1-based position of its first
/// character.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, file: Rc<str>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme,
            file,
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            write!(f, "end of file")
        } else {
            write!(f, "'{}'", self.lexeme)
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = match self {
            Self::Eof => "end of file",
            Self::Unknown => "unknown token",
            Self::Identifier => "identifier",
            Self::IntLiteral => "integer literal",
            Self::FloatLiteral => "float literal",
            Self::StrLiteral => "string literal",
            Self::CharLiteral => "character literal",
            Self::KwAuto => "'auto'",
            Self::KwBreak => "'break'",
            Self::KwCase => "'case'",
            Self::KwChar => "'char'",
            Self::KwConst => "'const'",
            Self::KwContinue => "'continue'",
            Self::KwDefault => "'default'",
            Self::KwDo => "'do'",
            Self::KwDouble => "'double'",
            Self::KwElse => "'else'",
            Self::KwEnum => "'enum'",
            Self::KwExtern => "'extern'",
            Self::KwFloat => "'float'",
            Self::KwFor => "'for'",
            Self::KwGoto => "'goto'",
            Self::KwIf => "'if'",
            Self::KwInt => "'int'",
            Self::KwLong => "'long'",
            Self::KwRegister => "'register'",
            Self::KwReturn => "'return'",
            Self::KwShort => "'short'",
            Self::KwSigned => "'signed'",
            Self::KwSizeof => "'sizeof'",
            Self::KwStatic => "'static'",
            Self::KwStruct => "'struct'",
            Self::KwSwitch => "'switch'",
            Self::KwTypedef => "'typedef'",
            Self::KwUnion => "'union'",
            Self::KwUnsigned => "'unsigned'",
            Self::KwVoid => "'void'",
            Self::KwVolatile => "'volatile'",
            Self::KwWhile => "'while'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Amp => "'&'",
            Self::Pipe => "'|'",
            Self::Caret => "'^'",
            Self::Tilde => "'~'",
            Self::Bang => "'!'",
            Self::Assign => "'='",
            Self::Less => "'<'",
            Self::Greater => "'>'",
            Self::Dot => "'.'",
            Self::Arrow => "'->'",
            Self::PlusPlus => "'++'",
            Self::MinusMinus => "'--'",
            Self::PlusAssign => "'+='",
            Self::MinusAssign => "'-='",
            Self::StarAssign => "'*='",
            Self::SlashAssign => "'/='",
            Self::PercentAssign => "'%='",
            Self::AmpAssign => "'&='",
            Self::PipeAssign => "'|='",
            Self::CaretAssign => "'^='",
            Self::ShlAssign => "'<<='",
            Self::ShrAssign => "'>>='",
            Self::EqualEqual => "'=='",
            Self::BangEqual => "'!='",
            Self::LessEqual => "'<='",
            Self::GreaterEqual => "'>='",
            Self::Shl => "'<<'",
            Self::Shr => "'>>'",
            Self::AmpAmp => "'&&'",
            Self::PipePipe => "'||'",
            Self::Question => "'?'",
            Self::Semicolon => "';'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::OpenBrace => "'{'",
            Self::CloseBrace => "'}'",
            Self::OpenBracket => "'['",
            Self::CloseBracket => "']'",
            Self::Hash => "'#'",
            Self::Ellipsis => "'...'",
        };
        write!(f, "{spelling}")
    }
}

impl TokenKind {
    /// One of the core base-type keywords.
    #[inline]
    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            Self::KwVoid
                | Self::KwChar
                | Self::KwShort
                | Self::KwInt
                | Self::KwLong
                | Self::KwFloat
                | Self::KwDouble
                | Self::KwSigned
                | Self::KwUnsigned
        )
    }

    #[inline]
    pub fn is_type_qualifier(self) -> bool {
        matches!(self, Self::KwConst | Self::KwVolatile)
    }

    /// True for any token that can open a type: qualifiers and base types.
    #[inline]
    pub fn starts_type(self) -> bool {
        self.is_type_specifier() || self.is_type_qualifier()
    }

    #[inline]
    pub fn is_compound_assign(self) -> bool {
        matches!(
            self,
            Self::PlusAssign
                | Self::MinusAssign
                | Self::StarAssign
                | Self::SlashAssign
                | Self::PercentAssign
                | Self::AmpAssign
                | Self::PipeAssign
                | Self::CaretAssign
                | Self::ShlAssign
                | Self::ShrAssign
        )
    }

    #[inline]
    pub fn is_prefix_op(self) -> bool {
        matches!(
            self,
            Self::Minus
                | Self::Plus
                | Self::Bang
                | Self::Tilde
                | Self::Star
                | Self::Amp
                | Self::PlusPlus
                | Self::MinusMinus
        )
    }

    /// The binary operator a compound assignment applies, `+=` -> `+`.
    #[must_use]
    pub fn compound_to_binary(self) -> Self {
        match self {
            Self::PlusAssign => Self::Plus,
            Self::MinusAssign => Self::Minus,
            Self::StarAssign => Self::Star,
            Self::SlashAssign => Self::Slash,
            Self::PercentAssign => Self::Percent,
            Self::AmpAssign => Self::Amp,
            Self::PipeAssign => Self::Pipe,
            Self::CaretAssign => Self::Caret,
            Self::ShlAssign => Self::Shl,
            Self::ShrAssign => Self::Shr,
            _ => self,
        }
    }
}

/// Keyword table: exact-match lookup for a scanned identifier.
pub fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match lexeme {
        "auto" => KwAuto,
        "break" => KwBreak,
        "case" => KwCase,
        "char" => KwChar,
        "const" => KwConst,
        "continue" => KwContinue,
        "default" => KwDefault,
        "do" => KwDo,
        "double" => KwDouble,
        "else" => KwElse,
        "enum" => KwEnum,
        "extern" => KwExtern,
        "float" => KwFloat,
        "for" => KwFor,
        "goto" => KwGoto,
        "if" => KwIf,
        "int" => KwInt,
        "long" => KwLong,
        "register" => KwRegister,
        "return" => KwReturn,
        "short" => KwShort,
        "signed" => KwSigned,
        "sizeof" => KwSizeof,
        "static" => KwStatic,
        "struct" => KwStruct,
        "switch" => KwSwitch,
        "typedef" => KwTypedef,
        "union" => KwUnion,
        "unsigned" => KwUnsigned,
        "void" => KwVoid,
        "volatile" => KwVolatile,
        "while" => KwWhile,
        _ => return None,
    };
    Some(kind)
}

impl TryFrom<char> for TokenKind {
    type Error = char;

    fn try_from(c: char) -> Result<Self, char> {
        match c {
            ';' => Ok(Self::Semicolon),
            ':' => Ok(Self::Colon),
            ',' => Ok(Self::Comma),
            '(' => Ok(Self::OpenParen),
            ')' => Ok(Self::CloseParen),
            '{' => Ok(Self::OpenBrace),
            '}' => Ok(Self::CloseBrace),
            '[' => Ok(Self::OpenBracket),
            ']' => Ok(Self::CloseBracket),
            '#' => Ok(Self::Hash),
            '~' => Ok(Self::Tilde),
            '?' => Ok(Self::Question),
            '.' => Ok(Self::Dot),
            '+' => Ok(Self::Plus),
            '-' => Ok(Self::Minus),
            '*' => Ok(Self::Star),
            '/' => Ok(Self::Slash),
            '%' => Ok(Self::Percent),
            '&' => Ok(Self::Amp),
            '|' => Ok(Self::Pipe),
            '^' => Ok(Self::Caret),
            '!' => Ok(Self::Bang),
            '=' => Ok(Self::Assign),
            '<' => Ok(Self::Less),
            '>' => Ok(Self::Greater),
            _ => Err(c),
        }
    }
}
