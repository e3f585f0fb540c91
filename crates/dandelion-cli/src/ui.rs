pub const DEFAULT_WIDTH: usize = 70;

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}", " ".repeat(left), text)
}

const LOGO: &str = r#"
                                                     `;:`  BREAK 1 2
                                         .;:;         /    BREAK 3 4
        _____                   _      _;::;         `     ADD 1 3
        |  __ \                | |    | |';:;'
        | |  | | __ _ _ __   __| | ___| |  _  ___  _ __
        | |  | |/ _` | '_ \ / _` |/ _ \ | | |/ _ \| '_ \
        | |__| | (_| | | | | (_| |  __/ | | | (_) | | | |
        |_____/ \__,_|_| |_|\__,_|\___|_| |_|\___/|_| |_|
"#;

pub fn render_header(width: usize) -> String {
    let lines = [
        "Chemical compound space sampling".to_string(),
        "near transition state using xTB, SE-GSM and NEB".to_string(),
        format!("Ver. {} by mlee", env!("CARGO_PKG_VERSION")),
    ];
    let mut out = String::from(LOGO);
    out.push('\n');
    for line in &lines {
        out.push_str(&center(line, width));
        out.push('\n');
    }
    out
}

/// Boxes a phase title, e.g. `╔═══╗ / ║  title  ║ / ╚═══╝`.
///
/// Titles wider than the box stretch it rather than being cut.
pub fn render_separator(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let width = width.max(len + 6);
    let padding = width - len - 4;
    let left = padding / 2;
    let right = padding - left;

    let rule = "═".repeat(width - 2);
    format!(
        "╔{rule}╗\n║{}  {text}  {}║\n╚{rule}╝",
        " ".repeat(left - 1),
        " ".repeat(right - 1),
    )
}

pub fn print_header() {
    println!("{}", render_header(DEFAULT_WIDTH));
}
