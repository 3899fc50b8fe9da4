//! Operator prompts and console output.
//!
//! Syntactic validation stops here: prompts loop until they can hand back a
//! well-formed scalar. Semantic checks (distinct from current state,
//! operator approval) live in the guarded prompt loop.

use indicatif::{ProgressBar, ProgressStyle};
use minter_common::{Address, TokenAmount};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Synchronous prompt/output surface.
///
/// Production is `StdConsole`; tests drive flows with a scripted fake.
pub trait Console: Send + Sync {
    fn write(&self, msg: &str);

    fn warn(&self, msg: &str);

    /// Prompts for an address; an empty line accepts the fallback when one
    /// is given.
    fn prompt_address(&self, prompt: &str, fallback: Option<&Address>) -> io::Result<Address>;

    /// Prompts for a positive decimal token amount.
    fn prompt_amount(&self, prompt: &str) -> io::Result<TokenAmount>;

    /// Prompts for an http(s) URL.
    fn prompt_url(&self, prompt: &str) -> io::Result<String>;

    /// Explicit yes/no; no default, loops until one is given.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;

    /// Numbered menu; returns the chosen index into `options`.
    fn choose(&self, prompt: &str, options: &[&str]) -> io::Result<usize>;

    /// Long-wait indicator around the settlement poll. No-ops by default so
    /// fakes can ignore it.
    fn start_wait(&self, _msg: &str) {}

    fn end_wait(&self) {}
}

/// Terminal-backed console.
pub struct StdConsole {
    spinner: Mutex<Option<ProgressBar>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn read_line(&self) -> io::Result<String> {
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn prompt_line(&self, prompt: &str) -> io::Result<String> {
        print!("{}  ", prompt.bright_magenta());
        io::stdout().flush()?;
        self.read_line()
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn write(&self, msg: &str) {
        println!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        println!("{}  {}", "!".yellow().bold(), msg);
    }

    fn prompt_address(&self, prompt: &str, fallback: Option<&Address>) -> io::Result<Address> {
        loop {
            let line = match fallback {
                Some(addr) => {
                    self.prompt_line(&format!("{} [{}]:", prompt, addr.to_string().dimmed()))?
                }
                None => self.prompt_line(prompt)?,
            };
            if line.is_empty() {
                if let Some(addr) = fallback {
                    return Ok(*addr);
                }
            }
            match line.parse::<Address>() {
                Ok(addr) => return Ok(addr),
                Err(e) => self.warn(&e.to_string()),
            }
        }
    }

    fn prompt_amount(&self, prompt: &str) -> io::Result<TokenAmount> {
        loop {
            let line = self.prompt_line(prompt)?;
            match line.parse::<TokenAmount>() {
                Ok(amount) if amount.is_zero() => {
                    self.warn("Amount must be positive");
                }
                Ok(amount) => return Ok(amount),
                Err(e) => self.warn(&e.to_string()),
            }
        }
    }

    fn prompt_url(&self, prompt: &str) -> io::Result<String> {
        loop {
            let line = self.prompt_line(prompt)?;
            if line.starts_with("http://") || line.starts_with("https://") {
                return Ok(line);
            }
            self.warn("Expected an http(s) url");
        }
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        loop {
            let line = self.prompt_line(prompt)?.to_lowercase();
            match line.as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.warn("Please answer 'yes' or 'no'"),
            }
        }
    }

    fn choose(&self, prompt: &str, options: &[&str]) -> io::Result<usize> {
        println!();
        for (i, opt) in options.iter().enumerate() {
            println!("   {}  {}", format!("[{}]", i + 1).cyan(), opt);
        }
        println!();
        loop {
            let line = self.prompt_line(prompt)?;
            if let Ok(num) = line.parse::<usize>() {
                if num >= 1 && num <= options.len() {
                    return Ok(num - 1);
                }
            }
            self.warn(&format!(
                "Please enter a number between 1 and {}",
                options.len()
            ));
        }
    }

    fn start_wait(&self, msg: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| {
                ProgressStyle::default_spinner()
            }),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(bar);
    }

    fn end_wait(&self) {
        if let Some(bar) = self
            .spinner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            bar.finish_and_clear();
        }
    }
}
