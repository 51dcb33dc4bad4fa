//! Text Processing
//!
//! Shared lexical helpers for the index and query pipeline: tokenization,
//! synonym expansion, and n-gram generation. All functions are pure.

/// Words too common to carry signal. Tokens shorter than three characters
/// are dropped before this list is consulted.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "near", "from", "that", "this", "are", "was", "were", "have",
    "has", "had", "you", "your", "our", "their", "its", "but", "not", "all", "any", "can", "will",
    "what", "when", "where", "which", "who", "how", "into", "onto", "about", "some", "them",
    "then", "than", "there", "here", "out", "off", "over", "under", "very", "just", "more", "most",
    "other", "such", "only", "own", "same", "too", "also", "both", "each", "few", "she", "him",
    "her", "his", "they", "been", "being", "does", "did", "doing", "would", "should", "could",
];

/// Lower-case, strip punctuation, split on whitespace, and drop short or
/// stop-word tokens. Empty and whitespace-only input yields an empty list.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.len() >= 3 && !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Union each token with its fixed-table synonyms, de-duplicated and in
/// first-seen order.
pub fn expand_tokens(tokens: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut expanded = Vec::new();

    for token in tokens {
        if seen.insert(token.clone()) {
            expanded.push(token.clone());
        }
        for synonym in synonyms_for(token) {
            if seen.insert(synonym.to_string()) {
                expanded.push(synonym.to_string());
            }
        }
    }

    expanded
}

/// Every contiguous run of `n` tokens joined by a single space, in order.
pub fn generate_ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Fixed synonym table for the trip domain. Kept as a match table so new
/// entries stay greppable.
fn synonyms_for(token: &str) -> &'static [&'static str] {
    match token {
        "hiking" | "hike" | "hikes" => &["trail", "trek", "walking", "nature"],
        "food" | "eat" | "eating" => &["dining", "restaurant", "cuisine", "culinary"],
        "restaurant" | "restaurants" => &["dining", "food", "eatery"],
        "cafe" | "cafes" | "coffee" => &["coffeehouse", "brunch", "espresso"],
        "park" | "parks" => &["garden", "nature", "outdoor"],
        "museum" | "museums" => &["gallery", "exhibit", "art"],
        "market" | "markets" => &["shopping", "bazaar", "stalls"],
        "view" | "views" | "viewpoint" => &["scenic", "overlook", "panorama"],
        "culture" | "cultural" => &["heritage", "history", "art"],
        "shopping" | "shop" | "shops" => &["market", "mall", "souvenir"],
        "night" | "nightlife" => &["evening", "bar", "live"],
        "relax" | "relaxing" | "relaxation" => &["spa", "wellness", "unwind"],
        "adventure" | "adventurous" => &["outdoor", "trek", "thrill"],
        "family" => &["kids", "children"],
        "cheap" | "budget" => &["affordable", "free"],
        "scenery" | "scenic" => &["view", "landscape", "panorama"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_punctuation_and_stop_words() {
        let tokens = tokenize("The best FOOD near Burnham Park!");
        assert_eq!(tokens, vec!["best", "food", "burnham", "park"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert!(tokenize("a an of").is_empty());
    }

    #[test]
    fn test_tokenize_is_deterministic_and_normalized() {
        let first = tokenize("Strawberry Picking at La Trinidad");
        let second = tokenize("Strawberry Picking at La Trinidad");
        assert_eq!(first, second);
        for token in &first {
            assert!(token.len() >= 3);
            assert_eq!(token, &token.to_lowercase());
            assert!(!STOP_WORDS.contains(&token.as_str()));
        }
    }

    #[test]
    fn test_expand_tokens_adds_synonyms_without_duplicates() {
        let tokens = vec!["park".to_string(), "garden".to_string()];
        let expanded = expand_tokens(&tokens);
        assert_eq!(expanded[0], "park");
        assert!(expanded.contains(&"nature".to_string()));
        assert_eq!(
            expanded
                .iter()
                .filter(|t| t.as_str() == "garden")
                .count(),
            1
        );
    }

    #[test]
    fn test_generate_ngrams() {
        let tokens: Vec<String> = ["burnham", "park", "boating"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            generate_ngrams(&tokens, 2),
            vec!["burnham park", "park boating"]
        );
        assert!(generate_ngrams(&tokens, 4).is_empty());
        assert!(generate_ngrams(&tokens, 0).is_empty());
    }
}
