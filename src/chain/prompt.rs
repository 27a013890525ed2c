//! Prompt templates for the retrieval chain.
//!
//! Templates carry named `{variable}` slots. The compiled-in defaults can be
//! overridden per file from a prompt directory.

use crate::error::{PromptError, Result};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Offence-severity evaluator instructions. One slot: `message`.
pub const SEVERITY_TEMPLATE: &str = r"You are a law enforcing crime evaluater. Based on the data given to your about various punishments for various offences,
you have to take the user input which will be description of the crime, compare it with the corresponding charges mentioned in the data given and give me a severity level of the offence between 1-10.
Where 1 being that the offence is not very serious and can be overlooked and 10 being that the charges are quite serious and the offense is quite severe and should be punished urgently.

All the information and description on each section is mentioned after section_[]. Where the number in square brackets can be anything.

Give the response in a single sentence where you explain the severity of the crime and rate it from 1-10.

Measure the severity of the case based on how long punishment one can get and how many sections are applicable on the case.
Everything is directly proportional to the severity value.

Make sure to give the response in a single sentence like below:-
Severity of the case out of 1-10:- (mention your severity here)

Below is a message I received from the prospect:
{message}";

/// Rewrites a follow-up into a standalone question.
pub const CONDENSE_QUESTION_TEMPLATE: &str = "Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.\n\nChat History:\n{chat_history}\nFollow Up Input: {question}\nStandalone question:";

/// System message carrying the retrieved passages.
pub const QA_SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's question. \nIf you don't know the answer, just say that you don't know, don't try to make up an answer.\n----------------\n{context}";

/// Environment variable naming a prompt override directory.
pub const PROMPT_DIR_ENV: &str = "NYAYA_PROMPT_DIR";

const SEVERITY_FILENAME: &str = "severity.md";
const CONDENSE_FILENAME: &str = "condense.md";
const QA_FILENAME: &str = "qa.md";

#[allow(clippy::expect_used)]
fn slot_regex() -> &'static Regex {
    static SLOT: OnceLock<Regex> = OnceLock::new();
    SLOT.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

/// A text template with `{name}` slots.
///
/// Only identifier-shaped names in braces are slots; other braces are
/// literal text.
///
/// # Examples
///
/// ```
/// use nyaya_rag::chain::PromptTemplate;
///
/// let template = PromptTemplate::new("Section {number}: {title}");
/// let text = template.format(&[("number", "378"), ("title", "Theft")]).unwrap();
/// assert_eq!(text, "Section 378: Theft");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Creates a template from its text.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Declared variable names, first occurrence order, deduplicated.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in slot_regex().captures_iter(&self.template) {
            if let Some(name) = caps.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// True if every name in `required` is a declared slot.
    #[must_use]
    pub fn declares(&self, required: &[&str]) -> bool {
        let declared = self.variables();
        required.iter().all(|name| declared.contains(name))
    }

    /// Renders the template in one pass; substituted values are not rescanned.
    ///
    /// Values for undeclared names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingVariable`] if a declared slot has no value.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String> {
        let lookup = |name: &str| {
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        };

        if let Some(missing) = self.variables().into_iter().find(|n| lookup(*n).is_none()) {
            return Err(PromptError::MissingVariable {
                name: missing.to_string(),
            }
            .into());
        }

        let rendered = slot_regex().replace_all(&self.template, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_default().to_string()
        });
        Ok(rendered.into_owned())
    }
}

/// Renders the built-in severity template around `message`.
#[must_use]
pub fn format_severity_prompt(message: &str) -> String {
    SEVERITY_TEMPLATE.replace("{message}", message)
}

/// The three templates the chain uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Severity evaluator wrapper for user queries.
    pub severity: PromptTemplate,
    /// Follow-up condensing prompt.
    pub condense: PromptTemplate,
    /// Answering system prompt.
    pub qa: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PromptSet {
    /// Compiled-in templates, without touching the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            severity: PromptTemplate::new(SEVERITY_TEMPLATE),
            condense: PromptTemplate::new(CONDENSE_QUESTION_TEMPLATE),
            qa: PromptTemplate::new(QA_SYSTEM_TEMPLATE),
        }
    }

    /// Loads templates, overriding defaults from files where present.
    ///
    /// Directory resolution order:
    /// 1. `prompt_dir` (the `--prompt-dir` flag)
    /// 2. `NYAYA_PROMPT_DIR`
    /// 3. `<config dir>/nyaya-rag/prompts`
    ///
    /// Each file is independent. A missing or unreadable file, or one that
    /// drops a required slot, keeps the default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(PROMPT_DIR_ENV).map(PathBuf::from))
            .or_else(Self::default_dir);

        let Some(dir) = resolved else {
            return Self::defaults();
        };
        debug!(dir = %dir.display(), "resolving prompt templates");

        Self {
            severity: load_template(&dir, SEVERITY_FILENAME, SEVERITY_TEMPLATE, &["message"]),
            condense: load_template(
                &dir,
                CONDENSE_FILENAME,
                CONDENSE_QUESTION_TEMPLATE,
                &["chat_history", "question"],
            ),
            qa: load_template(&dir, QA_FILENAME, QA_SYSTEM_TEMPLATE, &["context"]),
        }
    }

    /// Default prompt directory under the user's config directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("nyaya-rag").join("prompts"))
    }
}

fn load_template(dir: &Path, filename: &str, default: &str, required: &[&str]) -> PromptTemplate {
    let path = dir.join(filename);
    let Ok(text) = std::fs::read_to_string(&path) else {
        return PromptTemplate::new(default);
    };

    let template = PromptTemplate::new(text);
    if template.declares(required) {
        debug!(path = %path.display(), "loaded prompt override");
        template
    } else {
        warn!(
            path = %path.display(),
            required = ?required,
            "prompt override is missing a required slot; using the default"
        );
        PromptTemplate::new(default)
    }
}
