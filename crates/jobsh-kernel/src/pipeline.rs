//! Pipeline builder: token sequence → stage descriptors.

use std::path::PathBuf;

use crate::error::ShellError;
use crate::tokens::Word;

/// One pipe-delimited segment of a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Program name followed by its arguments. May be empty when the stage
    /// only carries redirections.
    pub argv: Vec<String>,
    /// File to read standard input from (`< path`).
    pub input: Option<PathBuf>,
    /// File to write standard output to (`> path`).
    pub output: Option<PathBuf>,
}

impl StageDescriptor {
    /// The program name, if the stage has one.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

/// A parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<StageDescriptor>,
    /// The line ended with `&`.
    pub background: bool,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of pipes needed to connect the stages.
    pub fn pipe_count(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }
}

const PIPE: &str = "|";
const BACKGROUND: &str = "&";
const REDIRECT_IN: &str = "<";
const REDIRECT_OUT: &str = ">";

/// Split `words` into stages.
///
/// A trailing `&` marks the pipeline as background. An empty word list
/// (or a lone `&`) yields a pipeline with no stages. Quoted words are never
/// operators.
pub fn build(words: &[Word]) -> Result<Pipeline, ShellError> {
    let background = words.last().is_some_and(|w| w.is_operator(BACKGROUND));
    let words = if background {
        &words[..words.len() - 1]
    } else {
        words
    };

    if words.is_empty() {
        return Ok(Pipeline {
            stages: Vec::new(),
            background,
        });
    }

    let stages = words
        .split(|w| w.is_operator(PIPE))
        .map(build_stage)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Pipeline { stages, background })
}

fn build_stage(words: &[Word]) -> Result<StageDescriptor, ShellError> {
    if words.is_empty() {
        return Err(ShellError::Syntax("empty command in pipeline".into()));
    }

    let mut stage = StageDescriptor::default();
    let mut iter = words.iter();
    while let Some(word) = iter.next() {
        if word.is_operator(REDIRECT_IN) {
            stage.input = Some(redirect_target(iter.next(), "input", REDIRECT_IN)?);
        } else if word.is_operator(REDIRECT_OUT) {
            stage.output = Some(redirect_target(iter.next(), "output", REDIRECT_OUT)?);
        } else {
            stage.argv.push(word.as_str().to_string());
        }
    }
    Ok(stage)
}

fn redirect_target(next: Option<&Word>, kind: &str, op: &str) -> Result<PathBuf, ShellError> {
    match next {
        Some(word) if !word.is_operator(REDIRECT_IN) && !word.is_operator(REDIRECT_OUT) => {
            Ok(PathBuf::from(word.as_str()))
        }
        _ => Err(ShellError::Syntax(format!("missing {kind} file after {op}"))),
    }
}
