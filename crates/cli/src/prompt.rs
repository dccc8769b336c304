// Terminal confirmations for search wrap and column deletion.

use std::io::{self, BufRead, Write};

use gridedit_config::WrapPolicy;
use gridedit_engine::{Confirm, Prompt};

pub struct Prompter {
    wrap: WrapPolicy,
    /// `--yes`: answer every question with yes
    assume_yes: bool,
    /// stdin is a terminal not already used for input
    interactive: bool,
}

impl Prompter {
    pub fn new(wrap: WrapPolicy, assume_yes: bool, stdin_busy: bool) -> Self {
        let interactive = !stdin_busy && atty::is(atty::Stream::Stdin);
        Self { wrap, assume_yes, interactive }
    }

    /// `None` when the answer needs a terminal and there is none.
    pub fn confirm_delete_column(&mut self, name: &str) -> Option<bool> {
        if self.assume_yes {
            return Some(true);
        }
        if !self.interactive {
            return None;
        }
        Some(ask(&format!("Delete column '{}'? [y/N] ", name)))
    }
}

impl Confirm for Prompter {
    fn confirm(&mut self, prompt: Prompt) -> bool {
        match self.wrap {
            WrapPolicy::Always => true,
            WrapPolicy::Never => false,
            WrapPolicy::Ask if self.assume_yes => true,
            WrapPolicy::Ask if !self.interactive => false,
            WrapPolicy::Ask => ask(match prompt {
                Prompt::WrapFind => "Reached the end of the table. Continue from the top? [y/N] ",
                Prompt::WrapHeaderSearch => "Reached the last header. Continue from the first? [y/N] ",
            }),
        }
    }
}

fn ask(question: &str) -> bool {
    eprint!("{}", question);
    io::stderr().flush().ok();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_overrides_terminal() {
        let mut always = Prompter { wrap: WrapPolicy::Always, assume_yes: false, interactive: false };
        assert!(always.confirm(Prompt::WrapFind));
        let mut never = Prompter { wrap: WrapPolicy::Never, assume_yes: true, interactive: false };
        assert!(!never.confirm(Prompt::WrapFind));
    }

    #[test]
    fn test_ask_without_terminal() {
        let mut p = Prompter { wrap: WrapPolicy::Ask, assume_yes: false, interactive: false };
        assert!(!p.confirm(Prompt::WrapHeaderSearch));
        assert_eq!(p.confirm_delete_column("A"), None);

        let mut yes = Prompter { wrap: WrapPolicy::Ask, assume_yes: true, interactive: false };
        assert!(yes.confirm(Prompt::WrapFind));
        assert_eq!(yes.confirm_delete_column("A"), Some(true));
    }
}
