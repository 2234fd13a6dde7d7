//! Color themes, cycled with `t` and preselectable with `--theme`.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub display_name: &'static str,
    pub foreground: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub graph_user: Color,
    pub graph_assistant: Color,
    /// Matrix strength ramp, minimal to strongest.
    pub matrix: [Color; 5],
}

pub const THEMES: [Theme; 6] = [
    Theme {
        name: "dracula",
        display_name: "Dracula",
        foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
        primary: Color::Rgb(0xbd, 0x93, 0xf9),
        secondary: Color::Rgb(0xff, 0x79, 0xc6),
        success: Color::Rgb(0x50, 0xfa, 0x7b),
        warning: Color::Rgb(0xff, 0xb8, 0x6c),
        error: Color::Rgb(0xff, 0x55, 0x55),
        info: Color::Rgb(0x8b, 0xe9, 0xfd),
        muted: Color::Rgb(0x62, 0x72, 0xa4),
        border: Color::Rgb(0x44, 0x47, 0x5a),
        highlight: Color::Rgb(0xf1, 0xfa, 0x8c),
        graph_user: Color::Rgb(0x8b, 0xe9, 0xfd),
        graph_assistant: Color::Rgb(0xff, 0x79, 0xc6),
        matrix: [
            Color::Rgb(0x44, 0x47, 0x5a),
            Color::Rgb(0x62, 0x72, 0xa4),
            Color::Rgb(0xbd, 0x93, 0xf9),
            Color::Rgb(0xff, 0x79, 0xc6),
            Color::Rgb(0x50, 0xfa, 0x7b),
        ],
    },
    Theme {
        name: "nord",
        display_name: "Nord",
        foreground: Color::Rgb(0xec, 0xef, 0xf4),
        primary: Color::Rgb(0x88, 0xc0, 0xd0),
        secondary: Color::Rgb(0x81, 0xa1, 0xc1),
        success: Color::Rgb(0xa3, 0xbe, 0x8c),
        warning: Color::Rgb(0xeb, 0xcb, 0x8b),
        error: Color::Rgb(0xbf, 0x61, 0x6a),
        info: Color::Rgb(0x5e, 0x81, 0xac),
        muted: Color::Rgb(0x4c, 0x56, 0x6a),
        border: Color::Rgb(0x43, 0x4c, 0x5e),
        highlight: Color::Rgb(0xd8, 0xde, 0xe9),
        graph_user: Color::Rgb(0x88, 0xc0, 0xd0),
        graph_assistant: Color::Rgb(0xb4, 0x8e, 0xad),
        matrix: [
            Color::Rgb(0x3b, 0x42, 0x52),
            Color::Rgb(0x43, 0x4c, 0x5e),
            Color::Rgb(0x81, 0xa1, 0xc1),
            Color::Rgb(0x88, 0xc0, 0xd0),
            Color::Rgb(0xa3, 0xbe, 0x8c),
        ],
    },
    Theme {
        name: "monokai",
        display_name: "Monokai",
        foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
        primary: Color::Rgb(0x66, 0xd9, 0xef),
        secondary: Color::Rgb(0xa6, 0xe2, 0x2e),
        success: Color::Rgb(0xa6, 0xe2, 0x2e),
        warning: Color::Rgb(0xe6, 0xdb, 0x74),
        error: Color::Rgb(0xf9, 0x26, 0x72),
        info: Color::Rgb(0x66, 0xd9, 0xef),
        muted: Color::Rgb(0x75, 0x71, 0x5e),
        border: Color::Rgb(0x3e, 0x3d, 0x32),
        highlight: Color::Rgb(0xfd, 0x97, 0x1f),
        graph_user: Color::Rgb(0x66, 0xd9, 0xef),
        graph_assistant: Color::Rgb(0xf9, 0x26, 0x72),
        matrix: [
            Color::Rgb(0x3e, 0x3d, 0x32),
            Color::Rgb(0x75, 0x71, 0x5e),
            Color::Rgb(0xe6, 0xdb, 0x74),
            Color::Rgb(0xfd, 0x97, 0x1f),
            Color::Rgb(0xa6, 0xe2, 0x2e),
        ],
    },
    Theme {
        name: "github",
        display_name: "GitHub",
        foreground: Color::Rgb(0x24, 0x29, 0x2e),
        primary: Color::Rgb(0x03, 0x66, 0xd6),
        secondary: Color::Rgb(0x28, 0xa7, 0x45),
        success: Color::Rgb(0x28, 0xa7, 0x45),
        warning: Color::Rgb(0xff, 0xd3, 0x3d),
        error: Color::Rgb(0xd7, 0x3a, 0x49),
        info: Color::Rgb(0x03, 0x66, 0xd6),
        muted: Color::Rgb(0x6a, 0x73, 0x7d),
        border: Color::Rgb(0xe1, 0xe4, 0xe8),
        highlight: Color::Rgb(0xf6, 0xf8, 0xfa),
        graph_user: Color::Rgb(0x03, 0x66, 0xd6),
        graph_assistant: Color::Rgb(0x6f, 0x42, 0xc1),
        matrix: [
            Color::Rgb(0xf6, 0xf8, 0xfa),
            Color::Rgb(0xe1, 0xe4, 0xe8),
            Color::Rgb(0xff, 0xd3, 0x3d),
            Color::Rgb(0xf9, 0x82, 0x6c),
            Color::Rgb(0x28, 0xa7, 0x45),
        ],
    },
    Theme {
        name: "solarized-dark",
        display_name: "Solarized Dark",
        foreground: Color::Rgb(0x83, 0x94, 0x96),
        primary: Color::Rgb(0x26, 0x8b, 0xd2),
        secondary: Color::Rgb(0x2a, 0xa1, 0x98),
        success: Color::Rgb(0x85, 0x99, 0x00),
        warning: Color::Rgb(0xb5, 0x89, 0x00),
        error: Color::Rgb(0xdc, 0x32, 0x2f),
        info: Color::Rgb(0x26, 0x8b, 0xd2),
        muted: Color::Rgb(0x58, 0x6e, 0x75),
        border: Color::Rgb(0x07, 0x36, 0x42),
        highlight: Color::Rgb(0x93, 0xa1, 0xa1),
        graph_user: Color::Rgb(0x26, 0x8b, 0xd2),
        graph_assistant: Color::Rgb(0xd3, 0x36, 0x82),
        matrix: [
            Color::Rgb(0x07, 0x36, 0x42),
            Color::Rgb(0x58, 0x6e, 0x75),
            Color::Rgb(0xb5, 0x89, 0x00),
            Color::Rgb(0xcb, 0x4b, 0x16),
            Color::Rgb(0x85, 0x99, 0x00),
        ],
    },
    Theme {
        name: "one-dark",
        display_name: "One Dark",
        foreground: Color::Rgb(0xab, 0xb2, 0xbf),
        primary: Color::Rgb(0x61, 0xaf, 0xef),
        secondary: Color::Rgb(0xc6, 0x78, 0xdd),
        success: Color::Rgb(0x98, 0xc3, 0x79),
        warning: Color::Rgb(0xe5, 0xc0, 0x7b),
        error: Color::Rgb(0xe0, 0x6c, 0x75),
        info: Color::Rgb(0x56, 0xb6, 0xc2),
        muted: Color::Rgb(0x5c, 0x63, 0x70),
        border: Color::Rgb(0x3b, 0x40, 0x48),
        highlight: Color::Rgb(0xd1, 0x9a, 0x66),
        graph_user: Color::Rgb(0x61, 0xaf, 0xef),
        graph_assistant: Color::Rgb(0xc6, 0x78, 0xdd),
        matrix: [
            Color::Rgb(0x3b, 0x40, 0x48),
            Color::Rgb(0x5c, 0x63, 0x70),
            Color::Rgb(0xe5, 0xc0, 0x7b),
            Color::Rgb(0xd1, 0x9a, 0x66),
            Color::Rgb(0x98, 0xc3, 0x79),
        ],
    },
];

/// Look up a theme by name, falling back to the first (dracula).
pub fn theme_by_name(name: &str) -> &'static Theme {
    THEMES.iter().find(|t| t.name == name).unwrap_or(&THEMES[0])
}

/// Index of a theme in the cycle order, 0 when unknown.
pub fn theme_index(name: &str) -> usize {
    THEMES.iter().position(|t| t.name == name).unwrap_or(0)
}

pub fn next_theme(current: usize) -> usize {
    (current + 1) % THEMES.len()
}
