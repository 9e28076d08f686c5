use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::wm::tree::Terminal;

const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxz";
const VOWELS: &[u8] = b"aeiouy";
const SYLLABLES: usize = 5;

/// Everything a new terminal is known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// `%n` value
    pub id: String,
    /// Window title
    pub title: String,
    /// tmux session name
    pub session: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Naming {
    /// Smallest free number on the workspace
    Sequential,
    /// Pronounceable 10-letter token
    #[default]
    Random,
}

impl Naming {
    pub fn strategy(self) -> Box<dyn NamingStrategy + Send> {
        match self {
            Naming::Sequential => Box::new(Sequential),
            Naming::Random => Box::new(RandomSyllables::from_time()),
        }
    }
}

pub trait NamingStrategy {
    fn next_id(&mut self, terminals: &[Terminal], workspace: &str) -> String;

    /// Whether `next_id` looks at the terminals at all.
    fn needs_terminals(&self) -> bool {
        true
    }
}

/// Numbers terminals 1, 2, 3... per workspace, reusing gaps.
///
/// Terminals with an empty workspace came from a template without `%w`
/// and count against every workspace.
pub struct Sequential;

impl NamingStrategy for Sequential {
    fn next_id(&mut self, terminals: &[Terminal], workspace: &str) -> String {
        let taken: HashSet<u32> = terminals
            .iter()
            .filter(|t| t.workspace.is_empty() || t.workspace == workspace)
            .map(|t| t.number)
            .collect();

        let id = (1..).find(|n| !taken.contains(n)).unwrap_or(1);
        id.to_string()
    }
}

/// Consonant/vowel pairs drawn from an injected generator.
///
/// No collision check is made against live sessions.
pub struct RandomSyllables<R> {
    rng: R,
}

impl<R: Rng> RandomSyllables<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSyllables<StdRng> {
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NamingStrategy for RandomSyllables<R> {
    fn next_id(&mut self, _terminals: &[Terminal], _workspace: &str) -> String {
        let mut id = String::with_capacity(SYLLABLES * 2);
        for _ in 0..SYLLABLES {
            id.push(CONSONANTS[self.rng.gen_range(0..CONSONANTS.len())] as char);
            id.push(VOWELS[self.rng.gen_range(0..VOWELS.len())] as char);
        }
        id
    }

    fn needs_terminals(&self) -> bool {
        false
    }
}

/// Replace every `%w` and `%n` in `template`.
pub fn substitute(template: &str, workspace: &str, id: &str) -> String {
    template.replace("%w", workspace).replace("%n", id)
}

pub fn session_name(workspace: &str, id: &str) -> String {
    format!("marvex-{}-{}", workspace, id)
}

pub fn derive_identity(
    strategy: &mut dyn NamingStrategy,
    terminals: &[Terminal],
    workspace: &str,
    title_template: &str,
) -> Identity {
    let id = strategy.next_id(terminals, workspace);
    Identity {
        title: substitute(title_template, workspace, &id),
        session: session_name(workspace, &id),
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminals(ws: &str, numbers: &[u32]) -> Vec<Terminal> {
        numbers
            .iter()
            .map(|&number| Terminal {
                workspace: ws.to_string(),
                number,
            })
            .collect()
    }

    #[test]
    fn test_sequential_fills_smallest_gap() {
        let mut s = Sequential;
        assert_eq!(s.next_id(&terminals("3", &[1, 2, 4]), "3"), "3");
        assert_eq!(s.next_id(&[], "3"), "1");
        assert_eq!(s.next_id(&terminals("3", &[2, 3]), "3"), "1");
        assert_eq!(s.next_id(&terminals("3", &[0, 1]), "3"), "2");
    }

    #[test]
    fn test_sequential_ignores_other_workspaces() {
        let mut s = Sequential;
        let mut all = terminals("web", &[1, 2]);
        all.extend(terminals("3", &[1]));
        assert_eq!(s.next_id(&all, "3"), "2");
    }

    #[test]
    fn test_sequential_counts_terminals_without_workspace() {
        // title template had no %w
        let mut s = Sequential;
        assert_eq!(s.next_id(&terminals("", &[1, 2]), "3"), "3");
        assert_eq!(s.next_id(&terminals("", &[2]), "web"), "1");
    }

    #[test]
    fn test_random_token_shape() {
        let mut s = RandomSyllables::new(StdRng::seed_from_u64(7));
        let id = s.next_id(&[], "3");
        assert_eq!(id.len(), 10);
        for (i, c) in id.bytes().enumerate() {
            if i % 2 == 0 {
                assert!(CONSONANTS.contains(&c), "{} at {} in {}", c as char, i, id);
            } else {
                assert!(VOWELS.contains(&c), "{} at {} in {}", c as char, i, id);
            }
        }
    }

    #[test]
    fn test_random_is_deterministic_for_seed() {
        let a = RandomSyllables::new(StdRng::seed_from_u64(42)).next_id(&[], "1");
        let b = RandomSyllables::new(StdRng::seed_from_u64(42)).next_id(&[], "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_substitute_replaces_every_placeholder() {
        assert_eq!(substitute("plain", "3", "7"), "plain");
        assert_eq!(substitute("marvex-%w-%n", "3", "7"), "marvex-3-7");
        assert_eq!(substitute("%n%w%n%w", "a", "1"), "1a1a");

        let once = substitute("%w:%n:%w", "web", "2");
        assert_eq!(once, substitute("%w:%n:%w", "web", "2"));
        assert!(!once.contains("%w") && !once.contains("%n"));
    }

    #[test]
    fn test_derive_identity_sequential() {
        let identity = derive_identity(
            &mut Sequential,
            &terminals("3", &[1, 2]),
            "3",
            "term %w/%n",
        );
        assert_eq!(
            identity,
            Identity {
                id: "3".into(),
                title: "term 3/3".into(),
                session: "marvex-3-3".into(),
            }
        );
    }
}
