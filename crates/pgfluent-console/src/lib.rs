//! # pgfluent-console
//!
//! Leveled, tag-colored terminal output.
//!
//! Messages may contain inline color tags such as `<G>` or `<LY>` (see [`tags`]). Every line
//! gets a prefix naming the console, the caller and the time, unless printed minified:
//!
//! ```text
//! → ~\app\db\migrate [14:03:27 INFO ~]› created table users
//! ```
//!
//! ```ignore
//! use pgfluent_console::{Console, PrintOptions};
//!
//! let console = Console::new("app.db");
//! console.info("created table <LG>users", &PrintOptions::caller("migrate"))?;
//! console.print_sql("SELECT * FROM users", &PrintOptions::minified())?;
//! ```

pub mod highlight;
pub mod tags;

use serde::Serialize;
use std::io::{self, Write};

/// How a single message is laid out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Label shown after the console prefix, usually the calling function.
    pub caller: String,
    /// Skip the prefix and print `› message` instead.
    pub minified: bool,
    /// Indentation depth; each level renders as four spaces.
    pub tabs: usize,
    /// End the line with a carriage return so the next print replaces it.
    pub overwrite: bool,
}

impl PrintOptions {
    pub fn caller(caller: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            ..Self::default()
        }
    }

    pub fn minified() -> Self {
        Self {
            minified: true,
            ..Self::default()
        }
    }

    pub fn tabs(mut self, tabs: usize) -> Self {
        self.tabs = tabs;
        self
    }

    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

/// A named console writing to stdout.
#[derive(Debug, Clone)]
pub struct Console {
    prefix: String,
    colorize: bool,
}

impl Console {
    /// Create a console. Dots in `prefix` become path separators: `app.db` shows as `~\app\db`.
    pub fn new(prefix: &str) -> Self {
        let mut console = Self {
            prefix: String::new(),
            colorize: true,
        };
        console.set_prefix(prefix);
        console
    }

    /// Disable colors; tags are stripped instead.
    pub fn plain(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = format!("~\\{}", prefix.replace('.', "\\"));
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self, message: &str, options: &PrintOptions) -> io::Result<()> {
        self.emit("<LC>INFO ~", message, options)
    }

    pub fn warning(&self, message: &str, options: &PrintOptions) -> io::Result<()> {
        self.emit("<LY>WARNING #", message, options)
    }

    pub fn error(&self, message: &str, options: &PrintOptions) -> io::Result<()> {
        self.emit("<R>ERROR !", message, options)
    }

    pub fn success(&self, message: &str, options: &PrintOptions) -> io::Result<()> {
        self.emit("<G>SUCCESS •", message, options)
    }

    /// Pretty-print a value as highlighted JSON.
    ///
    /// Serialization failures are reported as [`io::ErrorKind::InvalidData`].
    pub fn print_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        options: &PrintOptions,
    ) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value)?.replace("  ", "\t");
        self.emit("<LC>JSON -", &highlight::json(&text), options)
    }

    pub fn print_sql(&self, sql: &str, options: &PrintOptions) -> io::Result<()> {
        self.emit("<LC>SQL -", &highlight::sql(sql), options)
    }

    /// Build the full line for a message without printing it.
    pub fn format(&self, label: &str, message: &str, options: &PrintOptions) -> String {
        let indent = "\t".repeat(options.tabs);
        let body = message.replace('\n', &format!("\n{indent}"));
        let tagged = if options.minified {
            let marker = if options.tabs == 0 { "› " } else { "" };
            format!("{indent}<M>{marker}<W>{body}")
        } else {
            let time = chrono::Local::now().format("%H:%M:%S");
            format!(
                "<G>→ <LC>{}\\{} <C>[{} {}<C>]<M>› <W>{}",
                self.prefix,
                options.caller,
                time,
                label.replace(' ', " <LB>"),
                body
            )
        };
        tags::render(&tagged, self.colorize).replace('\t', "    ")
    }

    /// Write one formatted message to `out`.
    ///
    /// Lines end with `\n`, or with `\r` and a flush when `options.overwrite` is set. Colored
    /// output clears the rest of the terminal line first.
    pub fn write_to<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        message: &str,
        options: &PrintOptions,
    ) -> io::Result<()> {
        let line = self.format(label, message, options);
        let clear = if self.colorize { "\x1b[K" } else { "" };
        if options.overwrite {
            write!(out, "{clear}{line}\r")?;
            out.flush()
        } else {
            writeln!(out, "{clear}{line}")
        }
    }

    fn emit(&self, label: &str, message: &str, options: &PrintOptions) -> io::Result<()> {
        self.write_to(&mut io::stdout().lock(), label, message, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        Console::new("app.db").plain()
    }

    #[test]
    fn prefix_turns_dots_into_separators() {
        let mut c = console();
        assert_eq!(c.prefix(), "~\\app\\db");
        c.set_prefix("other");
        assert_eq!(c.prefix(), "~\\other");
    }

    #[test]
    fn full_line_layout() {
        let line = console().format("<LC>INFO ~", "hello", &PrintOptions::caller("main"));
        assert!(line.starts_with("→ ~\\app\\db\\main ["), "{line}");
        assert!(line.ends_with(" INFO ~]› hello"), "{line}");

        // HH:MM:SS between the brackets.
        let time = &line["→ ~\\app\\db\\main [".len()..][..8];
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn minified_layout_and_tabs() {
        let c = console();
        assert_eq!(c.format("x", "hi", &PrintOptions::minified()), "› hi");
        assert_eq!(
            c.format("x", "a\nb", &PrintOptions::minified().tabs(1)),
            "    a\n    b"
        );
    }

    #[test]
    fn message_tags_are_rendered() {
        let c = console();
        assert_eq!(
            c.format("x", "<LG>ok <Q>", &PrintOptions::minified()),
            "› ok <Q>"
        );
    }

    #[test]
    fn sql_highlighting_survives_plain_output() {
        let c = console();
        let sql = "UPDATE t SET v = 1";
        assert_eq!(
            c.format("x", &highlight::sql(sql), &PrintOptions::minified()),
            format!("› {sql}")
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_end_with_newline_or_carriage_return() {
        let c = console();
        let mut out = Vec::new();
        c.write_to(&mut out, "x", "one", &PrintOptions::minified())
            .unwrap();
        c.write_to(&mut out, "x", "two", &PrintOptions::minified().overwrite())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "› one\n› two\r");
    }

    #[test]
    fn colored_lines_clear_the_terminal_line() {
        let c = Console::new("app.db");
        let mut out = Vec::new();
        c.write_to(&mut out, "x", "hi", &PrintOptions::minified())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[K"), "{text:?}");
        assert!(text.ends_with('\n'), "{text:?}");
    }

    #[test]
    fn write_failures_are_returned() {
        let c = console();
        let err = c
            .write_to(&mut ClosedPipe, "x", "hi", &PrintOptions::minified())
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let err = c
            .write_to(
                &mut ClosedPipe,
                "x",
                "hi",
                &PrintOptions::minified().overwrite(),
            )
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
