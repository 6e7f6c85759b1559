//! # Inflection Helpers
//!
//! Pure string transforms shared by the key transformer and the dispatcher:
//! camelCase <-> snake_case conversion and English singularization of resource names.
//!
//! These follow the conventions JSON APIs built on Rails-style backends use on the wire:
//! - [`camelize`] turns `some_attr` into `someAttr`.
//! - [`decamelize`] turns `somePhotos` into `some_photos` (splits before uppercase letters).
//! - [`decamelize_with`] can also split before digits (`address2` -> `address_2`), which is
//!   what request bodies use.
//! - [`singular`] turns `somePhotos` into `somePhoto`, preserving the casing of the rest
//!   of the word.

use regex::Regex;
use std::sync::LazyLock;

/// Separator inserted by [`decamelize`].
pub const SEPARATOR: char = '_';

/// Where [`decamelize_with`] starts a new word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSplit {
    /// Split before uppercase letters only.
    Uppercase,
    /// Split before uppercase letters and ASCII digits.
    UppercaseAndDigits,
}

fn is_numerical(s: &str) -> bool {
    !s.is_empty() && s.trim().parse::<f64>().is_ok()
}

/// Converts `snake_case`, `kebab-case` or space separated words into `camelCase`.
///
/// Numeric strings are returned unchanged. The first character is always lowercased.
pub fn camelize(s: &str) -> String {
    if is_numerical(s) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}

/// Converts `camelCase` into `snake_case`, splitting before uppercase letters.
pub fn decamelize(s: &str) -> String {
    decamelize_with(s, WordSplit::Uppercase)
}

/// Converts `camelCase` into `snake_case` using the given split rule.
///
/// A split is never inserted before the first character. Numeric strings are
/// returned unchanged.
pub fn decamelize_with(s: &str, split: WordSplit) -> String {
    if is_numerical(s) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        let boundary = match split {
            WordSplit::Uppercase => c.is_uppercase(),
            WordSplit::UppercaseAndDigits => c.is_uppercase() || c.is_ascii_digit(),
        };
        if boundary && i > 0 {
            out.push(SEPARATOR);
        }
        out.extend(c.to_lowercase());
    }
    out
}

const UNCOUNTABLE: &[&str] = &[
    "adulthood", "advice", "agenda", "aid", "aircraft", "alcohol", "ammo", "analytics",
    "anime", "athletics", "audio", "bison", "blood", "bream", "buffalo", "butter", "carp",
    "cash", "chassis", "chess", "clothing", "cod", "commerce", "cooperation", "corps",
    "debris", "diabetes", "digestion", "elk", "energy", "equipment", "excretion",
    "expertise", "firmware", "flounder", "fun", "gallows", "garbage", "graffiti",
    "hardware", "headquarters", "health", "herpes", "highjinks", "homework", "housework",
    "information", "jeans", "justice", "kudos", "labour", "literature", "machinery",
    "mackerel", "mail", "media", "mews", "moose", "music", "mud", "manga", "news", "only",
    "personnel", "pike", "plankton", "pliers", "police", "pollution", "premises", "rain",
    "research", "rice", "salmon", "scissors", "series", "sewage", "shambles", "shrimp",
    "software", "staff", "species", "swine", "tennis", "traffic", "transportation",
    "trout", "tuna", "wealth", "welfare", "whiting", "wildebeest", "wildlife",
];

/// Words matching these are left as they are.
const UNCOUNTABLE_PATTERNS: &[&str] = &[
    r"pok[eé]mon$",
    r"[^aeiou]ese$",
    r"deer$",
    r"fish$",
    r"measles$",
    r"o[iu]s$",
    r"pox$",
    r"sheep$",
];

/// `(singular, plural)` pairs no suffix rule handles.
const IRREGULAR: &[(&str, &str)] = &[
    ("this", "these"),
    ("that", "those"),
    ("echo", "echoes"),
    ("dingo", "dingoes"),
    ("volcano", "volcanoes"),
    ("tornado", "tornadoes"),
    ("torpedo", "torpedoes"),
    ("genus", "genera"),
    ("viscus", "viscera"),
    ("stigma", "stigmata"),
    ("stoma", "stomata"),
    ("dogma", "dogmata"),
    ("lemma", "lemmata"),
    ("schema", "schemata"),
    ("anathema", "anathemata"),
    ("ox", "oxen"),
    ("axe", "axes"),
    ("die", "dice"),
    ("yes", "yeses"),
    ("foot", "feet"),
    ("eave", "eaves"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("quiz", "quizzes"),
    ("human", "humans"),
    ("proof", "proofs"),
    ("carve", "carves"),
    ("valve", "valves"),
    ("looey", "looies"),
    ("thief", "thieves"),
    ("groove", "grooves"),
    ("pickaxe", "pickaxes"),
    ("passerby", "passersby"),
];

/// Suffix rules, highest priority first: `(pattern, replacement)`. Patterns match
/// case-insensitively at the end of the word.
const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"men$", "man"),
    (r"(eau)x?$", "${1}"),
    (r"(child)ren$", "${1}"),
    (r"(pe)(rson|ople)$", "${1}rson"),
    (r"(matr|append)ices$", "${1}ix"),
    (r"(cod|mur|sil|vert|ind)ices$", "${1}ex"),
    (r"(alumn|alg|vertebr)ae$", "${1}a"),
    (
        r"(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)a$",
        "${1}on",
    ),
    (
        r"(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|quor)a$",
        "${1}um",
    ),
    (
        r"(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
        "${1}us",
    ),
    (r"(test)(?:is|es)$", "${1}is"),
    (r"(movie|twelve|abuse|e[mn]u)s$", "${1}"),
    (r"(analy|diagno|parenthe|progno|synop|the|empha|cri|ne)(?:sis|ses)$", "${1}sis"),
    (
        r"(x|ch|ss|sh|zz|tto|go|cho|alias|[^aou]us|t[lm]as|gas|(?:her|at|gr)o|[aeiou]ris)(?:es)?$",
        "${1}",
    ),
    (r"(seraph|cherub)im$", "${1}"),
    (r"\b((?:tit)?m|l)ice$", "${1}ouse"),
    (r"\b(mon|smil)ies$", "${1}ey"),
    (
        r"\b(l|(?:neck|cross|hog|aun)?t|coll|faer|food|gen|goon|group|hipp|junk|vegg|(?:pork)?p|charl|calor|cut)ies$",
        "${1}ie",
    ),
    (r"(dg|ss|ois|lk|ok|wn|mb|th|ch|ec|oal|is|ck|ix|sser|ts|wb)ies$", "${1}ie"),
    (r"ies$", "y"),
    (r"(ar|(?:wo|[ae])l|[eo][ao])ves$", "${1}f"),
    (r"(wi|kni|(?:after|half|high|low|mid|non|night|[^\w]|^)li)ves$", "${1}fe"),
    (r"(ss)$", "${1}"),
    (r"s$", ""),
];

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("inflection rule is valid")
}

static UNCOUNTABLE_RULES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| UNCOUNTABLE_PATTERNS.iter().map(|p| compile(p)).collect());

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SINGULAR_RULES
        .iter()
        .map(|(pattern, replacement)| (compile(pattern), *replacement))
        .collect()
});

/// Byte offset of the last word in a camelCase or snake_case identifier.
fn last_word_start(s: &str) -> usize {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in s.char_indices() {
        if c == '_' || c == '-' {
            start = i + c.len_utf8();
        } else if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            start = i;
        }
        prev = Some(c);
    }
    start
}

/// Applies the casing of `matched` to `replacement`.
fn restore_case(matched: &str, replacement: &str) -> String {
    if matched == replacement {
        return replacement.to_string();
    }
    if matched.chars().any(char::is_alphabetic) && matched == matched.to_uppercase() {
        return replacement.to_uppercase();
    }
    match matched.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(head) => head.to_uppercase().chain(chars.map(|c| c.to_ascii_lowercase())).collect(),
                None => String::new(),
            }
        }
        _ => replacement.to_lowercase(),
    }
}

/// Singular form of one word, or `None` when it is already singular or uncountable.
fn singular_word(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    if lower.is_empty()
        || UNCOUNTABLE.contains(&lower.as_str())
        || IRREGULAR.iter().any(|(single, _)| *single == lower)
    {
        return None;
    }
    if let Some((single, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == lower) {
        return Some(restore_case(word, single));
    }
    if UNCOUNTABLE_RULES.iter().any(|rule| rule.is_match(word)) {
        return None;
    }

    let (rule, replacement) = RULES.iter().find(|(rule, _)| rule.is_match(word))?;
    let caps = rule.captures(word)?;
    let matched = caps.get(0)?;
    let mut expanded = String::new();
    caps.expand(replacement, &mut expanded);

    let single = format!("{}{}", &word[..matched.start()], restore_case(matched.as_str(), &expanded));
    // A bare "s" has no stem to keep.
    (!single.is_empty()).then_some(single)
}

/// Returns the singular form of an English plural, operating on the last word of a
/// camelCase or snake_case identifier.
///
/// ```
/// use crud_sync::inflect::singular;
///
/// assert_eq!(singular("photos"), "photo");
/// assert_eq!(singular("somePhotos"), "somePhoto");
/// assert_eq!(singular("categories"), "category");
/// assert_eq!(singular("statuses"), "status");
/// ```
pub fn singular(s: &str) -> String {
    let (head, word) = s.split_at(last_word_start(s));
    match singular_word(word) {
        Some(single) => format!("{head}{single}"),
        None => s.to_string(),
    }
}
