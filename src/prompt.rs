// src/prompt.rs

//! Interactive prompts for provider setup and confirmations
//!
//! On a terminal the user is asked; otherwise (pipes, CI) every prompt
//! answers with its default without touching stdin.

use crate::error::{Error, Result};
use crate::provider::ProviderKind;
use std::io::{self, BufRead, IsTerminal, Write};
use strum::IntoEnumIterator;

/// Style of prompt interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Interactive TTY
    Interactive,
    /// Non-TTY or scripting; prompts return their defaults
    Simple,
}

/// Asks the user questions
pub struct UserPrompt {
    style: PromptStyle,
}

impl UserPrompt {
    pub fn new(style: PromptStyle) -> Self {
        Self { style }
    }

    /// Detect the appropriate prompt style based on environment
    pub fn detect() -> Self {
        let style = if io::stdin().is_terminal() && io::stdout().is_terminal() {
            PromptStyle::Interactive
        } else {
            PromptStyle::Simple
        };
        Self { style }
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    /// Let the user pick a provider; `None` in simple mode
    pub fn choose_provider(&self, current: ProviderKind, configured: &[ProviderKind]) -> Result<Option<ProviderKind>> {
        match self.style {
            PromptStyle::Interactive => {
                choose_provider_with(&mut io::stdin().lock(), &mut io::stdout(), current, configured).map(Some)
            }
            PromptStyle::Simple => Ok(None),
        }
    }

    /// Ask for an API key; `None` in simple mode
    pub fn api_key(&self, kind: ProviderKind) -> Result<Option<String>> {
        match self.style {
            PromptStyle::Interactive => api_key_with(&mut io::stdin().lock(), &mut io::stdout(), kind).map(Some),
            PromptStyle::Simple => Ok(None),
        }
    }

    /// Yes/no question; `default` in simple mode
    pub fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        match self.style {
            PromptStyle::Interactive => confirm_with(&mut io::stdin().lock(), &mut io::stdout(), question, default),
            PromptStyle::Simple => Ok(default),
        }
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Err(Error::Prompt("input closed".to_string()));
    }
    Ok(line.trim().to_string())
}

pub(crate) fn choose_provider_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    current: ProviderKind,
    configured: &[ProviderKind],
) -> Result<ProviderKind> {
    let kinds: Vec<ProviderKind> = ProviderKind::iter().collect();
    writeln!(output)?;
    writeln!(output, "Select an AI provider:")?;
    for (i, kind) in kinds.iter().enumerate() {
        let key = if configured.contains(kind) { "key set" } else { "no key" };
        let marker = if *kind == current { " (current)" } else { "" };
        writeln!(output, "  [{}] {} - {}{}", i + 1, kind.display_name(), key, marker)?;
    }

    loop {
        write!(output, "Choice [1-{}, default {}]: ", kinds.len(), current)?;
        output.flush()?;
        let answer = read_answer(input)?;
        if answer.is_empty() {
            return Ok(current);
        }
        if let Ok(n) = answer.parse::<usize>() {
            if let Some(kind) = n.checked_sub(1).and_then(|i| kinds.get(i)) {
                return Ok(*kind);
            }
        }
        if let Ok(kind) = ProviderKind::parse(&answer) {
            return Ok(kind);
        }
        writeln!(output, "Unknown option. Please try again.")?;
    }
}

pub(crate) fn api_key_with<R: BufRead, W: Write>(input: &mut R, output: &mut W, kind: ProviderKind) -> Result<String> {
    loop {
        write!(output, "Enter {} API key ({}): ", kind.display_name(), kind.env_key())?;
        output.flush()?;
        let answer = read_answer(input)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        writeln!(output, "The key cannot be empty.")?;
    }
}

pub(crate) fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: bool,
) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
        write!(output, "{question} [{hint}]: ")?;
        output.flush()?;
        match read_answer(input)?.to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please enter y or n.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_simple_style_returns_defaults() {
        let prompt = UserPrompt::new(PromptStyle::Simple);
        assert_eq!(prompt.choose_provider(ProviderKind::Mistral, &[]).unwrap(), None);
        assert_eq!(prompt.api_key(ProviderKind::Gemini).unwrap(), None);
        assert!(prompt.confirm("Continue?", true).unwrap());
        assert!(!prompt.confirm("Continue?", false).unwrap());
    }

    #[test]
    fn test_choose_provider() {
        let mut out = Vec::new();
        let mut input = Cursor::new("7\n2\n");
        let kind = choose_provider_with(&mut input, &mut out, ProviderKind::Mistral, &[ProviderKind::Mistral]).unwrap();
        assert_eq!(kind, ProviderKind::Gemini);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unknown option"));
        assert!(text.contains("(current)"));

        let mut input = Cursor::new("\n");
        let kind = choose_provider_with(&mut input, &mut Vec::new(), ProviderKind::Gemini, &[]).unwrap();
        assert_eq!(kind, ProviderKind::Gemini);

        let mut input = Cursor::new("mistral\n");
        let kind = choose_provider_with(&mut input, &mut Vec::new(), ProviderKind::Gemini, &[]).unwrap();
        assert_eq!(kind, ProviderKind::Mistral);
    }

    #[test]
    fn test_api_key_rejects_empty() {
        let mut input = Cursor::new("\n  sk-123  \n");
        let key = api_key_with(&mut input, &mut Vec::new(), ProviderKind::Mistral).unwrap();
        assert_eq!(key, "sk-123");
    }

    #[test]
    fn test_confirm() {
        assert!(confirm_with(&mut Cursor::new("\n"), &mut Vec::new(), "Go?", true).unwrap());
        assert!(!confirm_with(&mut Cursor::new("maybe\nno\n"), &mut Vec::new(), "Go?", true).unwrap());
        assert!(matches!(
            confirm_with(&mut Cursor::new(""), &mut Vec::new(), "Go?", true),
            Err(Error::Prompt(_))
        ));
    }
}
