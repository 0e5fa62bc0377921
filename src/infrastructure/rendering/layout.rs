//! Page layout for canonical PDFs
//!
//! Layout is pure: it turns text or rows into one content stream per page.
//! Everything is set in Courier so text width is a function of character
//! count alone.

use lopdf::content::{Content, Operation};
use lopdf::Object;

use crate::domain::extraction::TableRows;

/// Name the page resources register the Courier font under
pub const FONT_NAME: &str = "F1";

/// Courier advance width as a fraction of the font size
const CHAR_WIDTH_EM: f32 = 0.6;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };

    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
    };
}

/// Geometry of the text layout
pub mod text {
    use super::PageSize;

    pub const PAGE: PageSize = PageSize::LETTER;
    pub const MARGIN: f32 = 40.0;
    pub const FONT_SIZE: f32 = 12.0;
    pub const LEADING: f32 = 14.4;
    pub const TAB_WIDTH: usize = 4;
}

/// Geometry of the table layout
pub mod table {
    use super::PageSize;

    pub const PAGE: PageSize = PageSize::A4;
    pub const MARGIN: f32 = 40.0;
    pub const PADDING: f32 = 4.0;
    pub const ROW_HEIGHT: f32 = 20.0;
    pub const FONT_SIZE: f32 = 10.0;
    /// #f3f4f6
    pub const HEADER_FILL: [f32; 3] = [0.953, 0.957, 0.965];
    /// #111827
    pub const TEXT_COLOR: [f32; 3] = [0.067, 0.094, 0.153];
    pub const ELLIPSIS: char = '\u{2026}';
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// How many characters of Courier at `font_size` fit in `width` points
pub fn chars_that_fit(width: f32, font_size: f32) -> usize {
    if width <= 0.0 {
        return 0;
    }
    (width / (font_size * CHAR_WIDTH_EM)).floor() as usize
}

/// Encode text for a WinAnsiEncoding font.
///
/// Latin-1 maps directly; the common typographic characters Windows-1252
/// adds in 0x80..0x9f are mapped; anything else becomes `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn show_text(text: &str) -> Operation {
    op("Tj", vec![Object::string_literal(win_ansi_bytes(text))])
}

/// Break one logical line into pieces of at most `max_chars` characters,
/// preferring to break at spaces.
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_chars {
        return vec![line.trim_end().to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let remaining = chars.len() - start;
        if remaining <= max_chars {
            pieces.push(chars[start..].iter().collect::<String>().trim_end().to_string());
            break;
        }

        let window = &chars[start..start + max_chars + 1];
        let end = match window.iter().rposition(|c| *c == ' ') {
            Some(space) if space > 0 => start + space,
            _ => start + max_chars,
        };

        pieces.push(chars[start..end].iter().collect::<String>().trim_end().to_string());

        start = end;
        while start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
    }

    pieces
}

/// Visual lines of a text body at the text layout's width
pub fn text_lines(text: &str) -> Vec<String> {
    let max_chars = chars_that_fit(text::PAGE.width - 2.0 * text::MARGIN, text::FONT_SIZE);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    normalized
        .split('\n')
        .flat_map(|line| {
            let expanded = line.replace('\t', &" ".repeat(text::TAB_WIDTH));
            wrap_line(&expanded, max_chars)
        })
        .collect()
}

/// Lines that fit on one text page
pub fn text_lines_per_page() -> usize {
    ((text::PAGE.height - 2.0 * text::MARGIN) / text::LEADING).floor() as usize
}

/// One content stream per page of left-aligned body text.
///
/// Empty text still produces a single blank page.
pub fn layout_text(body: &str) -> Vec<Content> {
    let lines = if body.is_empty() {
        Vec::new()
    } else {
        text_lines(body)
    };

    let per_page = text_lines_per_page().max(1);
    if lines.is_empty() {
        return vec![Content { operations: Vec::new() }];
    }

    lines
        .chunks(per_page)
        .map(|page_lines| {
            let mut operations = vec![
                op("BT", vec![]),
                op("Tf", vec![FONT_NAME.into(), real(text::FONT_SIZE)]),
                op("TL", vec![real(text::LEADING)]),
                op(
                    "Td",
                    vec![
                        real(text::MARGIN),
                        real(text::PAGE.height - text::MARGIN - text::FONT_SIZE),
                    ],
                ),
            ];

            for (i, line) in page_lines.iter().enumerate() {
                if i > 0 {
                    operations.push(op("T*", vec![]));
                }
                if !line.is_empty() {
                    operations.push(show_text(line));
                }
            }

            operations.push(op("ET", vec![]));
            Content { operations }
        })
        .collect()
}

/// Fit a cell's text into `max_chars`, replacing the tail with an ellipsis
pub fn truncate_cell(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if flat.chars().count() <= max_chars {
        return flat;
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut cut: String = flat.chars().take(max_chars - 1).collect();
    cut.push(table::ELLIPSIS);
    cut
}

/// Rows that fit on one table page
pub fn table_rows_per_page() -> usize {
    ((table::PAGE.height - 2.0 * table::MARGIN) / table::ROW_HEIGHT).floor() as usize
}

fn rgb(operator: &str, color: [f32; 3]) -> Operation {
    op(operator, color.iter().map(|c| real(*c)).collect())
}

/// One content stream per page of a fixed grid.
///
/// The column count comes from row 0. Every row draws exactly that many
/// cells: extra cells are dropped, missing ones drawn empty. Row 0 gets the
/// header fill. With no rows the result is a single blank page.
pub fn layout_table(rows: &TableRows) -> Vec<Content> {
    let usable_width = table::PAGE.width - 2.0 * table::MARGIN;
    let col_count = rows.first().map(|r| r.len()).unwrap_or(0);
    let col_width = if col_count > 0 {
        usable_width / col_count as f32
    } else {
        usable_width
    };
    let max_chars = chars_that_fit(col_width - 2.0 * table::PADDING, table::FONT_SIZE);
    let per_page = table_rows_per_page().max(1);

    if rows.is_empty() {
        return vec![Content { operations: Vec::new() }];
    }

    rows.chunks(per_page)
        .enumerate()
        .map(|(page_index, page_rows)| {
            let mut operations = vec![op("w", vec![real(0.5)])];

            for (i, row) in page_rows.iter().enumerate() {
                let top = table::PAGE.height - table::MARGIN - i as f32 * table::ROW_HEIGHT;
                let bottom = top - table::ROW_HEIGHT;

                if page_index == 0 && i == 0 {
                    operations.push(rgb("rg", table::HEADER_FILL));
                    operations.push(op(
                        "re",
                        vec![
                            real(table::MARGIN),
                            real(bottom),
                            real(usable_width),
                            real(table::ROW_HEIGHT),
                        ],
                    ));
                    operations.push(op("f", vec![]));
                }

                for col in 0..col_count {
                    let x = table::MARGIN + col as f32 * col_width;

                    operations.push(rgb("RG", [0.0, 0.0, 0.0]));
                    operations.push(op(
                        "re",
                        vec![real(x), real(bottom), real(col_width), real(table::ROW_HEIGHT)],
                    ));
                    operations.push(op("S", vec![]));

                    let value = row.get(col).map(|c| c.to_string()).unwrap_or_default();
                    let text = truncate_cell(&value, max_chars);
                    if text.is_empty() {
                        continue;
                    }

                    operations.push(op("BT", vec![]));
                    operations.push(rgb("rg", table::TEXT_COLOR));
                    operations.push(op("Tf", vec![FONT_NAME.into(), real(table::FONT_SIZE)]));
                    operations.push(op(
                        "Td",
                        vec![
                            real(x + table::PADDING),
                            real(top - table::PADDING - table::FONT_SIZE * 0.8),
                        ],
                    ));
                    operations.push(show_text(&text));
                    operations.push(op("ET", vec![]));
                }
            }

            Content { operations }
        })
        .collect()
}
