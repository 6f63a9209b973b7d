/// Every command keyword the language understands. Aliases collapse onto one
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // Drawing
    MoveTo,
    LineTo,
    RegularPolygon,
    Square,
    Quadrilateral,
    Rectangle,
    Circle,
    Triangle,
    Dot,
    Clear,
    ResetPen,

    // Pen & fill state
    FillOn,
    FillOff,
    Fill,
    Pen,
    PenWidth,

    // Variables
    Var,

    // Control flow
    If,
    While,
    For,
    Def,
    Call,
    Ret,
    End,
}

impl Command {
    pub fn lookup(keyword: &str) -> Option<Self> {
        let cmd = match keyword {
            "move" | "moveto"                 => Self::MoveTo,
            "drawto" | "line" | "lineto"      => Self::LineTo,
            "regularpolygon" | "rp"           => Self::RegularPolygon,
            "square"                          => Self::Square,
            "quadrilateral"                   => Self::Quadrilateral,
            "rectangle"                       => Self::Rectangle,
            "circle"                          => Self::Circle,
            "triangle"                        => Self::Triangle,
            "dot"                             => Self::Dot,
            "clear"                           => Self::Clear,
            "reset" | "resetpen"              => Self::ResetPen,
            "fillon"                          => Self::FillOn,
            "filloff"                         => Self::FillOff,
            "fill"                            => Self::Fill,
            "pen"                             => Self::Pen,
            "penwidth"                        => Self::PenWidth,
            "var"                             => Self::Var,
            "if"                              => Self::If,
            "while"                           => Self::While,
            "for"                             => Self::For,
            "def"                             => Self::Def,
            "call"                            => Self::Call,
            "ret"                             => Self::Ret,
            "end"                             => Self::End,
            _ => return None,
        };
        Some(cmd)
    }

    /// Accepted parameter counts. `None` for commands with their own grammar.
    pub fn arities(self) -> Option<&'static [usize]> {
        let arities: &'static [usize] = match self {
            Self::MoveTo | Self::LineTo        => &[2],
            Self::RegularPolygon               => &[2, 3],
            Self::Square                       => &[1, 2],
            Self::Quadrilateral                => &[8],
            Self::Rectangle                    => &[2, 4, 8],
            Self::Circle                       => &[1],
            Self::Triangle                     => &[1, 2, 6],
            Self::Dot | Self::Clear | Self::ResetPen
            | Self::FillOn | Self::FillOff     => &[0],
            Self::Fill | Self::Pen             => &[1, 3, 4],
            Self::PenWidth                     => &[1],
            Self::If | Self::While             => &[1],
            Self::For                          => &[3, 4],
            Self::Def | Self::Call             => &[1],
            Self::Ret | Self::End              => &[0],
            Self::Var                          => return None,
        };
        Some(arities)
    }

    /// Opens a block that must be closed with `end`.
    pub fn opens_block(self) -> bool {
        matches!(self, Self::If | Self::While | Self::For | Self::Def)
    }
}

/// Every keyword spelling plus the boolean words.
pub const RESERVED: &[&str] = &[
    "move", "moveto",
    "drawto", "line", "lineto",
    "regularpolygon", "rp",
    "square",
    "quadrilateral",
    "rectangle",
    "circle",
    "triangle",
    "dot",
    "clear",
    "reset", "resetpen",
    "fillon", "filloff",
    "pen", "penwidth",
    "fill",
    "if", "while", "for", "def", "call", "ret", "end",
    "var",
    "true", "false", "on", "off",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Operator glyphs. Padded with spaces before a parameter list is split.
pub const OPERATOR_CHARS: &str = "+-*/=><!";

pub fn is_operator(tok: &str) -> bool {
    matches!(tok, "+" | "-" | "*" | "/" | "=" | ">" | "<" | "!=")
}
