//! Password generation and strength scoring

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Upper bound on `generate_suggestions` in one call
pub const MAX_SUGGESTIONS: usize = 1_000;

/// Characters easily confused with one another
const LOOK_ALIKES: &str = "0O1Il|`";

const COMMON_PATTERNS: [&str; 9] = [
    "password", "123456", "qwerty", "admin", "welcome", "login", "user", "guest", "test",
];

/// Options for `generate_password`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordOptions {
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_symbols: bool,
    pub exclude_look_alikes: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_look_alikes: false,
        }
    }
}

impl PasswordOptions {
    fn charset(&self) -> Vec<char> {
        let mut charset = String::new();
        if self.include_lowercase {
            charset.push_str(LOWERCASE);
        }
        if self.include_uppercase {
            charset.push_str(UPPERCASE);
        }
        if self.include_numbers {
            charset.push_str(NUMBERS);
        }
        if self.include_symbols {
            charset.push_str(SYMBOLS);
        }

        charset
            .chars()
            .filter(|c| !(self.exclude_look_alikes && LOOK_ALIKES.contains(*c)))
            .collect()
    }
}

/// Generate a random password from the OS CSPRNG
pub fn generate_password(options: &PasswordOptions) -> Result<String> {
    let charset = options.charset();
    if charset.is_empty() {
        return Err(VaultError::GeneratorError(
            "At least one character type must be selected".to_string(),
        ));
    }

    let mut rng = OsRng;
    Ok((0..options.length)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect())
}

/// Generate up to `count` distinct passwords
///
/// Gives up early if the options cannot produce enough distinct values.
pub fn generate_suggestions(options: &PasswordOptions, count: usize) -> Result<Vec<String>> {
    if count > MAX_SUGGESTIONS {
        return Err(VaultError::GeneratorError(format!(
            "Cannot generate more than {} passwords at once",
            MAX_SUGGESTIONS
        )));
    }

    let mut suggestions: Vec<String> = Vec::with_capacity(count);
    let mut attempts = 0;

    while suggestions.len() < count && attempts < count.saturating_mul(10) {
        attempts += 1;
        let password = generate_password(options)?;
        if !suggestions.contains(&password) {
            suggestions.push(password);
        }
    }

    Ok(suggestions)
}

/// Strength score (0-100) with a label and improvement hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub score: u8,
    pub description: &'static str,
    pub feedback: Vec<String>,
}

/// Score a password
pub fn calculate_strength(password: &str) -> StrengthReport {
    let mut score: i32 = 0;
    let mut feedback = Vec::new();
    let length = password.chars().count();

    if length >= 12 {
        score += 25;
    } else if length >= 8 {
        score += 15;
        feedback.push("Consider using at least 12 characters".to_string());
    } else {
        score += 5;
        feedback.push("Password should be at least 8 characters long".to_string());
    }

    let classes = [
        (password.chars().any(|c| c.is_ascii_lowercase()), "Add lowercase letters"),
        (password.chars().any(|c| c.is_ascii_uppercase()), "Add uppercase letters"),
        (password.chars().any(|c| c.is_ascii_digit()), "Add numbers"),
        (password.chars().any(|c| SYMBOLS.contains(c)), "Add special characters"),
    ];
    for (present, hint) in classes {
        if present {
            score += 15;
        } else {
            feedback.push(hint.to_string());
        }
    }

    let chars: Vec<char> = password.chars().collect();
    if has_repeating_run(&chars) {
        score -= 10;
        feedback.push("Avoid repeating characters".to_string());
    }
    if has_sequential_run(&chars) {
        score -= 10;
        feedback.push("Avoid sequential characters".to_string());
    }

    if length >= 16 {
        score += 10;
    }

    let score = score.clamp(0, 100) as u8;
    let description = match score {
        80.. => "Very Strong",
        60..=79 => "Strong",
        40..=59 => "Medium",
        20..=39 => "Weak",
        _ => "Very Weak",
    };

    StrengthReport {
        score,
        description,
        feedback,
    }
}

/// Common words and sequences found in the password, case-insensitively
pub fn check_common_patterns(password: &str) -> Vec<String> {
    let lower = password.to_lowercase();
    COMMON_PATTERNS
        .iter()
        .filter(|pattern| lower.contains(*pattern))
        .map(|pattern| format!("Contains common word: {}", pattern))
        .collect()
}

/// Same character three or more times in a row
fn has_repeating_run(chars: &[char]) -> bool {
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// Ascending letter triple (`abc`..`xyz`, any case) or digit triple (`123`..`789`)
fn has_sequential_run(chars: &[char]) -> bool {
    chars.windows(3).any(|w| {
        let [a, b, c] = [w[0], w[1], w[2]].map(|ch| ch.to_ascii_lowercase());
        let ascending = |lo: char, hi: char| {
            (lo..=hi).contains(&a)
                && (lo..=hi).contains(&c)
                && b as u32 == a as u32 + 1
                && c as u32 == b as u32 + 1
        };
        ascending('a', 'z') || ascending('1', '9')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_charset() {
        let options = PasswordOptions {
            length: 64,
            include_uppercase: false,
            include_lowercase: false,
            include_numbers: true,
            include_symbols: false,
            exclude_look_alikes: false,
        };

        let password = generate_password(&options).unwrap();
        assert_eq!(password.len(), 64);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_exclude_look_alikes() {
        let options = PasswordOptions {
            length: 500,
            exclude_look_alikes: true,
            ..Default::default()
        };

        let password = generate_password(&options).unwrap();
        assert!(!password.chars().any(|c| LOOK_ALIKES.contains(c)));
    }

    #[test]
    fn test_empty_charset_rejected() {
        let options = PasswordOptions {
            include_uppercase: false,
            include_lowercase: false,
            include_numbers: false,
            include_symbols: false,
            ..Default::default()
        };

        let err = generate_password(&options).unwrap_err();
        assert_eq!(err.to_string(), "At least one character type must be selected");
    }

    #[test]
    fn test_suggestions_distinct() {
        let suggestions = generate_suggestions(&PasswordOptions::default(), 5).unwrap();
        assert_eq!(suggestions.len(), 5);

        let mut sorted = suggestions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn test_suggestions_stop_when_exhausted() {
        let options = PasswordOptions {
            length: 1,
            include_uppercase: false,
            include_lowercase: false,
            include_numbers: true,
            include_symbols: false,
            exclude_look_alikes: false,
        };

        let suggestions = generate_suggestions(&options, 50).unwrap();
        assert!(suggestions.len() <= 10);
    }

    #[test]
    fn test_suggestions_count_is_bounded() {
        let options = PasswordOptions::default();

        assert!(matches!(
            generate_suggestions(&options, usize::MAX),
            Err(VaultError::GeneratorError(_))
        ));
        assert!(matches!(
            generate_suggestions(&options, MAX_SUGGESTIONS + 1),
            Err(VaultError::GeneratorError(_))
        ));
        assert_eq!(generate_suggestions(&options, 0).unwrap().len(), 0);
    }

    #[test]
    fn test_strength_weak() {
        let report = calculate_strength("aaa");
        // 5 (length) + 15 (lowercase) - 10 (repeat)
        assert_eq!(report.score, 10);
        assert_eq!(report.description, "Very Weak");
        assert!(report.feedback.contains(&"Avoid repeating characters".to_string()));
    }

    #[test]
    fn test_strength_strong() {
        let report = calculate_strength("Tr0ub4dor&3-horse!");
        // 25 + 60 + 10
        assert_eq!(report.score, 95);
        assert_eq!(report.description, "Very Strong");
        assert!(report.feedback.is_empty());
    }

    #[test]
    fn test_strength_sequences() {
        assert!(has_sequential_run(&"xABCx".chars().collect::<Vec<_>>()));
        assert!(has_sequential_run(&"a789".chars().collect::<Vec<_>>()));
        assert!(!has_sequential_run(&"012".chars().collect::<Vec<_>>()));
        assert!(!has_sequential_run(&"acegik".chars().collect::<Vec<_>>()));

        let report = calculate_strength("abc12345");
        // 15 + 30 - 10
        assert_eq!(report.score, 35);
        assert_eq!(report.description, "Weak");
    }

    #[test]
    fn test_common_patterns() {
        let found = check_common_patterns("MyPassword123456");
        assert_eq!(
            found,
            vec![
                "Contains common word: password".to_string(),
                "Contains common word: 123456".to_string(),
            ]
        );
        assert!(check_common_patterns("zebra-lamp").is_empty());
    }
}
