use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Conversation starters shipped with the binary
pub const ICE_BREAKERS: &[&str] = &[
    "What's the worst bug you've ever shipped to production?",
    "Tabs or spaces, and would you die on that hill?",
    "What's a tool you can't live without that nobody else seems to know about?",
    "What was the first program you ever wrote?",
    "Which language would you delete from existence if you could?",
    "What's the most over-engineered thing you've ever built?",
    "What side project are you working on right now?",
    "What's the best piece of code review feedback you've ever received?",
    "Describe your dream dev setup in three words.",
    "What's a technology you were wrong about?",
    "What's the longest you've spent hunting a single bug?",
    "Which framework do you secretly love even though it's uncool?",
    "What's your most controversial coding opinion?",
    "If you could rewrite one system from scratch, what would it be?",
    "What got you into software in the first place?",
    "What's the weirdest job you've had outside of tech?",
    "What's the best talk or conference session you've ever attended?",
    "Dark mode or light mode, and why are you wrong?",
    "What's one thing you'd change about how your team works?",
    "What did you learn this year that surprised you?",
    "What's the oldest code you still have running somewhere?",
    "Which error message haunts your dreams?",
    "What's your favourite keyboard shortcut?",
    "What's a hobby that makes you a better developer?",
    "What would you build if you had a year off with full pay?",
    "What's the most useful thing you've automated?",
    "Vim, Emacs, or something else entirely?",
    "What's the best open source project nobody talks about?",
    "What is the one book every developer should read?",
    "Monolith or microservices for your next project?",
];

/// Returns `count` prompts from `catalog` in uniformly random order with no
/// repeats. When `count` exceeds the catalog the whole shuffled catalog comes
/// back, so callers must cope with a shorter sequence.
pub fn select<S, R>(catalog: &[S], count: usize, rng: &mut R) -> Vec<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut shuffled: Vec<String> = catalog.iter().map(|p| p.as_ref().to_owned()).collect();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

pub fn builtin_catalog() -> Vec<String> {
    ICE_BREAKERS.iter().map(|p| p.to_string()).collect()
}

/// One prompt per line. Blank lines and `#` comments are skipped.
pub fn parse_catalog(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

pub fn load_catalog(path: &Path) -> Result<Vec<String>, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let prompts = parse_catalog(&text);
    if prompts.is_empty() {
        return Err(CatalogError::Empty(path.to_path_buf()));
    }
    Ok(prompts)
}
