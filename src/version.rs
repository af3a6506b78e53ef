//! Engine version constraints
//!
//! Grammar: an optional operator (`>=`, `>`, `=`, `^`, `~`; `>=` when
//! omitted) followed by one to three dot-separated numbers. Missing
//! components are zero. Checks are advisory and fail open: a constraint
//! that does not parse, or a version that cannot be read, counts as
//! satisfied.

use semver::Version;

/// Comparison operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `>=`
    AtLeast,
    /// `>`
    Greater,
    /// `=`
    Exact,
    /// `^`: same major, at least the given version
    Caret,
    /// `~`: same major and minor, at least the given version
    Tilde,
}

/// A parsed engine constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Operator,
    pub version: Version,
}

impl Constraint {
    /// Parse a constraint, `None` when malformed
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (op, rest) = [
            (">=", Operator::AtLeast),
            (">", Operator::Greater),
            ("=", Operator::Exact),
            ("^", Operator::Caret),
            ("~", Operator::Tilde),
        ]
        .into_iter()
        .find_map(|(prefix, op)| input.strip_prefix(prefix).map(|rest| (op, rest)))
        .unwrap_or((Operator::AtLeast, input));

        let parts: Vec<&str> = rest.trim().split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }

        Some(Self {
            op,
            version: Version::new(numbers[0], numbers[1], numbers[2]),
        })
    }

    /// Whether `actual` meets this constraint
    pub fn matches(&self, actual: &Version) -> bool {
        let wanted = &self.version;
        match self.op {
            Operator::AtLeast => actual >= wanted,
            Operator::Greater => actual > wanted,
            Operator::Exact => actual == wanted,
            Operator::Caret => actual.major == wanted.major && actual >= wanted,
            Operator::Tilde => {
                actual.major == wanted.major && actual.minor == wanted.minor && actual >= wanted
            }
        }
    }
}

/// Read a reported runtime version such as `1.1.38` or `v20.11.1`
///
/// Pre-release and build suffixes are dropped; missing components are zero.
pub fn parse_version(input: &str) -> Option<Version> {
    let input = input.trim();
    let input = input.strip_prefix('v').unwrap_or(input);
    let core = input.split(&['-', '+'][..]).next().unwrap_or_default();

    let mut numbers = [0u64; 3];
    for (idx, (slot, part)) in numbers.iter_mut().zip(core.split('.')).enumerate() {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse() {
            Ok(n) => *slot = n,
            Err(_) if idx == 0 => return None,
            Err(_) => break,
        }
    }

    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Evaluate `actual` against `constraint`, failing open on bad input
pub fn satisfies(actual: &str, constraint: &str) -> bool {
    let (Some(constraint), Some(actual)) = (Constraint::parse(constraint), parse_version(actual))
    else {
        return true;
    };
    constraint.matches(&actual)
}
