// Console output in the section / comment / status-block style

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

pub struct Console<W: Write> {
    out: W,
    styled: bool,
}

impl Console<io::Stdout> {
    /// Console on stdout, coloured only when attached to a terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let styled = out.is_terminal();
        Self { out, styled }
    }
}

impl<W: Write> Console<W> {
    /// Plain, uncoloured console
    pub fn new(out: W) -> Self {
        Self { out, styled: false }
    }

    pub fn with_style(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Emphasise an inline value, e.g. a process name
    pub fn highlight(&self, text: &str) -> String {
        if self.styled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Title underlined with dashes, surrounded by blank lines
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        let rule = "-".repeat(title.chars().count());
        if self.styled {
            writeln!(self.out, "\n{}\n{}\n", title.yellow(), rule.yellow())
        } else {
            writeln!(self.out, "\n{}\n{}\n", title, rule)
        }
    }

    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, " // {}", text)
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        let line = format!("[OK] {}", text);
        let line = if self.styled {
            line.green().to_string()
        } else {
            line
        };
        self.block(&line)
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        let line = format!("[WARNING] {}", text);
        let line = if self.styled {
            line.yellow().to_string()
        } else {
            line
        };
        self.block(&line)
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        let line = format!("[ERROR] {}", text);
        let line = if self.styled {
            line.red().bold().to_string()
        } else {
            line
        };
        self.block(&line)
    }

    fn block(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, " {}", line)?;
        self.out.flush()
    }
}
