use dissector::{DissectReport, Event, EntryReport};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Human-readable account of one record: what each mapping entry did, conversion problems, the
/// final record and timings.
pub fn print_run(index: usize, event: &Event, report: &DissectReport, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Record #{index}"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Mapping ━━━", ansi::GRAY));
    if report.entries.is_empty() {
        println!("{}", palette.dim("  No mapping entries configured"));
    }
    for entry in &report.entries {
        print_entry(entry, &palette);
    }

    if !report.conversion_issues.is_empty() {
        println!("\n{}", palette.paint("━━━ Conversion ━━━", ansi::GRAY));
        for issue in &report.conversion_issues {
            println!("  {} {}", palette.paint("✗", ansi::RED), palette.paint(issue.tag(), ansi::YELLOW));
        }
    }

    println!("\n{}", palette.paint("━━━ Record ━━━", ansi::GRAY));
    for (field, value) in event.fields() {
        println!("  {} {} {}", palette.paint(field, ansi::BLUE), palette.dim("="), value);
    }
    if !event.tags().is_empty() {
        println!("  {} {}", palette.dim("tags:"), palette.paint(event.tags().join(", "), ansi::YELLOW));
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let entries = report
        .metrics
        .entries
        .iter()
        .map(|m| format!("{} {:?}", m.source, m.duration))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  Total: {}  │  Entries: {}  │  Convert: {}",
        palette.paint(format!("{:?}", report.metrics.total), ansi::GREEN),
        palette.paint(if entries.is_empty() { "-".to_string() } else { entries }, ansi::CYAN),
        palette.dim(format!("{:?}", report.metrics.convert)),
    );
}

fn print_entry(entry: &EntryReport, palette: &ansi::Palette) {
    println!(
        "  {} {} {}",
        palette.paint(&entry.source, ansi::BLUE),
        palette.dim("│"),
        palette.dim(&entry.pattern),
    );
    match &entry.outcome {
        Ok(fields) if fields.is_empty() => println!("    {}", palette.paint("✓ matched, nothing to commit", ansi::GREEN)),
        Ok(fields) => {
            for (key, value) in fields {
                println!("    {} {} {}", palette.paint("✓", ansi::GREEN), palette.bold(key), palette.dim(format!("{value:?}")));
            }
        }
        Err(failure) => println!("    {} {}", palette.paint("✗", ansi::RED), palette.paint(failure.to_string(), ansi::YELLOW)),
    }
}
