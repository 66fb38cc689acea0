//! Layout of a display grid as a flat list of boxes and text runs, in
//! logical pixels. Capture backends turn a [`Surface`] into an image.

use std::fmt;

use crate::grid::DisplayGrid;

const PADDING: u32 = 20;
const TITLE_HEIGHT: u32 = 56;
const TITLE_SIZE: u32 = 18;
const BUTTON_WIDTH: u32 = 140;
const BUTTON_HEIGHT: u32 = 32;
const TIME_COLUMN_WIDTH: u32 = 110;
const DAY_COLUMN_WIDTH: u32 = 170;
const HEADER_HEIGHT: u32 = 36;
const HEADER_SIZE: u32 = 14;
const CELL_PADDING: u32 = 8;
const CAPTION_SIZE: u32 = 11;
const NAME_SIZE: u32 = 13;
const LINE_HEIGHT: u32 = 17;
/// Rough glyph width for `NAME_SIZE` text, used for wrapping.
const NAME_CHAR_WIDTH: u32 = 7;

pub const DOWNLOAD_LABEL: &str = "Download Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const TEXT: Rgb = Rgb(0x33, 0x33, 0x33);
    pub const MUTED: Rgb = Rgb(0x77, 0x77, 0x77);
    pub const RULE: Rgb = Rgb(0xdd, 0xdd, 0xdd);
    pub const TITLE_BAR: Rgb = Rgb(0xf9, 0xf9, 0xf9);
    pub const HEADER: Rgb = Rgb(0xf2, 0xf2, 0xf2);
    pub const FREE: Rgb = Rgb(0xe6, 0xf4, 0xea);
    pub const BUSY: Rgb = Rgb(0xfd, 0xec, 0xea);
    pub const ACCENT: Rgb = Rgb(0xf5, 0x8a, 0x1f);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Box {
        fill: Rgb,
        stroke: Option<Rgb>,
    },
    /// Single line of text; `rect.y` is the top of the line.
    Text {
        content: String,
        size: u32,
        bold: bool,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub rect: Rect,
    pub kind: NodeKind,
    /// Interactive-only element that never appears in an exported image.
    pub capture_excluded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<Node>,
}

impl Surface {
    /// Nodes that belong in a captured image.
    pub fn captured(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.capture_excluded)
    }

    fn boxed(&mut self, rect: Rect, fill: Rgb, stroke: Option<Rgb>) {
        self.nodes.push(Node {
            rect,
            kind: NodeKind::Box { fill, stroke },
            capture_excluded: false,
        });
    }

    fn text(&mut self, x: u32, y: u32, width: u32, content: String, style: TextStyle) {
        self.nodes.push(Node {
            rect: Rect {
                x,
                y,
                width,
                height: style.size,
            },
            kind: NodeKind::Text {
                content,
                size: style.size,
                bold: style.bold,
                color: style.color,
            },
            capture_excluded: false,
        });
    }
}

#[derive(Clone, Copy)]
struct TextStyle {
    size: u32,
    bold: bool,
    color: Rgb,
}

const TITLE: TextStyle = TextStyle {
    size: TITLE_SIZE,
    bold: true,
    color: Rgb::TEXT,
};
const HEADER: TextStyle = TextStyle {
    size: HEADER_SIZE,
    bold: true,
    color: Rgb::TEXT,
};
const CAPTION: TextStyle = TextStyle {
    size: CAPTION_SIZE,
    bold: false,
    color: Rgb::MUTED,
};
const NAMES: TextStyle = TextStyle {
    size: NAME_SIZE,
    bold: false,
    color: Rgb::TEXT,
};

/// Lays out `grid` under a title bar holding `title` and the download control.
pub fn render(grid: &DisplayGrid, title: &str) -> Surface {
    let days = grid.columns.len() as u32;
    let table_width = TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * days;
    let width = PADDING * 2 + table_width;

    let mut surface = Surface {
        width,
        height: 0,
        nodes: Vec::new(),
    };

    // Title bar.
    surface.boxed(
        Rect {
            x: 0,
            y: 0,
            width,
            height: TITLE_HEIGHT,
        },
        Rgb::TITLE_BAR,
        None,
    );
    surface.boxed(
        Rect {
            x: 0,
            y: TITLE_HEIGHT - 1,
            width,
            height: 1,
        },
        Rgb::RULE,
        None,
    );
    surface.text(
        PADDING,
        (TITLE_HEIGHT - TITLE_SIZE) / 2,
        width.saturating_sub(PADDING * 3 + BUTTON_WIDTH),
        title.to_string(),
        TITLE,
    );
    let button = Rect {
        x: width.saturating_sub(PADDING + BUTTON_WIDTH),
        y: (TITLE_HEIGHT - BUTTON_HEIGHT) / 2,
        width: BUTTON_WIDTH,
        height: BUTTON_HEIGHT,
    };
    surface.nodes.push(Node {
        rect: button,
        kind: NodeKind::Box {
            fill: Rgb::ACCENT,
            stroke: None,
        },
        capture_excluded: true,
    });
    surface.nodes.push(Node {
        rect: Rect {
            x: button.x + CELL_PADDING,
            y: button.y + (BUTTON_HEIGHT - HEADER_SIZE) / 2,
            width: BUTTON_WIDTH - CELL_PADDING * 2,
            height: HEADER_SIZE,
        },
        kind: NodeKind::Text {
            content: DOWNLOAD_LABEL.to_string(),
            size: HEADER_SIZE,
            bold: true,
            color: Rgb::WHITE,
        },
        capture_excluded: true,
    });

    // Header row.
    let mut y = TITLE_HEIGHT + PADDING;
    surface.boxed(
        Rect {
            x: PADDING,
            y,
            width: table_width,
            height: HEADER_HEIGHT,
        },
        Rgb::HEADER,
        Some(Rgb::RULE),
    );
    let header_text_y = y + (HEADER_HEIGHT - HEADER_SIZE) / 2;
    surface.text(
        PADDING + CELL_PADDING,
        header_text_y,
        TIME_COLUMN_WIDTH - CELL_PADDING * 2,
        "Time".to_string(),
        HEADER,
    );
    for (i, day) in grid.days().enumerate() {
        surface.text(
            column_x(i) + CELL_PADDING,
            header_text_y,
            DAY_COLUMN_WIDTH - CELL_PADDING * 2,
            day.to_string(),
            HEADER,
        );
    }
    y += HEADER_HEIGHT;

    // Slot rows.
    let chars_per_line = ((DAY_COLUMN_WIDTH - CELL_PADDING * 2) / NAME_CHAR_WIDTH) as usize;
    for (row, (start, _)) in grid.row_times().into_iter().enumerate() {
        let cells: Vec<_> = grid
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| {
                let cell = column.cells.get(row)?;
                let lines = if cell.is_free {
                    wrap(&cell.names.join(", "), chars_per_line)
                } else {
                    vec!["Busy".to_string()]
                };
                Some((i, cell, lines))
            })
            .collect();
        let max_lines = cells.iter().map(|(_, _, l)| l.len()).max().unwrap_or(1) as u32;
        let row_height = CELL_PADDING * 2 + LINE_HEIGHT * (1 + max_lines);

        surface.boxed(
            Rect {
                x: PADDING,
                y,
                width: TIME_COLUMN_WIDTH,
                height: row_height,
            },
            Rgb::HEADER,
            Some(Rgb::RULE),
        );
        surface.text(
            PADDING + CELL_PADDING,
            y + CELL_PADDING,
            TIME_COLUMN_WIDTH - CELL_PADDING * 2,
            start.display(),
            HEADER,
        );

        for (i, cell, lines) in cells {
            let x = column_x(i);
            let fill = if cell.is_free { Rgb::FREE } else { Rgb::BUSY };
            surface.boxed(
                Rect {
                    x,
                    y,
                    width: DAY_COLUMN_WIDTH,
                    height: row_height,
                },
                fill,
                Some(Rgb::RULE),
            );
            let text_width = DAY_COLUMN_WIDTH - CELL_PADDING * 2;
            surface.text(
                x + CELL_PADDING,
                y + CELL_PADDING,
                text_width,
                format!("{} - {}", cell.start.display(), cell.end.display()),
                CAPTION,
            );
            for (n, line) in lines.into_iter().enumerate() {
                surface.text(
                    x + CELL_PADDING,
                    y + CELL_PADDING + LINE_HEIGHT * (n as u32 + 1),
                    text_width,
                    line,
                    NAMES,
                );
            }
        }
        y += row_height;
    }

    surface.height = y + PADDING;
    surface
}

fn column_x(index: usize) -> u32 {
    PADDING + TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * index as u32
}

/// Greedy word wrap. Words longer than a line get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
