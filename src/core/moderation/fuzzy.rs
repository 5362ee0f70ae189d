// Fuzzy string similarity used by the phrase matcher.
//
// The similarity of two equally long char slices is the indel-normalized
// 200 * LCS / (|a| + |b|), rounded, 0..=100. `best_window_score` slides a
// catalog phrase over a message and keeps the best window, so a short phrase
// buried in a long message still scores high. A message shorter than the
// phrase is compared whole; it is never slid over the phrase.

use std::collections::HashMap;

/// Length of the longest common subsequence of `a` and `b`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}

fn scaled(common: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * common) as f64 / total as f64).round() as u8
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    scaled(lcs_len(a, b), a.len() + b.len())
}

/// Best score of `needle` against `haystack`, if it is strictly above
/// `floor`.
///
/// Windows whose shared character counts cannot beat the current best are
/// skipped without running the LCS table, so a clean message costs roughly
/// one pass per phrase.
pub fn best_window_score(needle: &[char], haystack: &[char], floor: u8) -> Option<u8> {
    if needle.is_empty() || haystack.is_empty() || floor >= 100 {
        return None;
    }

    if haystack.len() < needle.len() {
        let score = ratio_chars(needle, haystack);
        return (score > floor).then_some(score);
    }

    let width = needle.len();
    let mut wanted: HashMap<char, usize> = HashMap::new();
    for &c in needle {
        *wanted.entry(c).or_default() += 1;
    }

    // Sum over chars of min(count in window, count in needle): an upper
    // bound on the LCS of the window and the needle.
    let mut in_window: HashMap<char, usize> = HashMap::new();
    let mut overlap = 0usize;

    let mut best = floor;
    let mut found = false;

    for (end, &c) in haystack.iter().enumerate() {
        if let Some(&limit) = wanted.get(&c) {
            let count = in_window.entry(c).or_default();
            *count += 1;
            if *count <= limit {
                overlap += 1;
            }
        }

        if end >= width {
            let gone = haystack[end - width];
            if let Some(&limit) = wanted.get(&gone) {
                let count = in_window.entry(gone).or_default();
                if *count <= limit {
                    overlap -= 1;
                }
                *count -= 1;
            }
        }

        if end + 1 < width || scaled(overlap, 2 * width) <= best {
            continue;
        }

        let score = ratio_chars(needle, &haystack[end + 1 - width..=end]);
        if score > best {
            best = score;
            found = true;
            if best == 100 {
                break;
            }
        }
    }

    found.then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn score(needle: &str, haystack: &str) -> u8 {
        best_window_score(&chars(needle), &chars(haystack), 0).unwrap_or(0)
    }

    /// Straightforward scorer without the overlap shortcut.
    fn slow_score(needle: &str, haystack: &str) -> u8 {
        let (needle, haystack) = (chars(needle), chars(haystack));
        if needle.is_empty() || haystack.is_empty() {
            return 0;
        }
        if haystack.len() < needle.len() {
            return ratio_chars(&needle, &haystack);
        }
        haystack
            .windows(needle.len())
            .map(|w| ratio_chars(&needle, w))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio_chars(&[], &[]), 0);
        assert_eq!(ratio_chars(&chars("abc"), &chars("abc")), 100);
        assert_eq!(ratio_chars(&chars("abc"), &chars("xyz")), 0);
        // LCS 4 over 10 chars
        assert_eq!(ratio_chars(&chars("abcde"), &chars("abcdx")), 80);
    }

    #[test]
    fn test_phrase_found_inside_message() {
        assert_eq!(score("واتساب", "راسلني على واتساب من فضلك"), 100);
        assert_eq!(score("zoom", "on fait un zoom demain"), 100);
    }

    #[test]
    fn test_short_message_is_compared_whole() {
        // A message that is a fragment of a phrase does not score 100.
        assert_eq!(score("facebook", "ok"), 40);
        assert_eq!(score("zoom", "zoo"), 86);
        assert!(score("mon numéro", "mon") < 50);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(score("", "واتساب"), 0);
        assert_eq!(score("واتساب", ""), 0);
        assert_eq!(score("", ""), 0);
    }

    #[test]
    fn test_rounding() {
        // 13 of 16 chars in common: 81.25 -> 81
        assert_eq!(score("abcdefghijklmnop", "abcdefghijklmXYZ"), 81);
        // one typo in a 6 letter word: 83.33 -> 83
        assert_eq!(score("واتساب", "واتصاب"), 83);
    }

    #[test]
    fn test_floor_is_exclusive() {
        let (needle, haystack) = (chars("abcde"), chars("abcdx"));
        assert_eq!(best_window_score(&needle, &haystack, 79), Some(80));
        assert_eq!(best_window_score(&needle, &haystack, 80), None);
        assert_eq!(best_window_score(&needle, &needle, 100), None);
    }

    #[test]
    fn test_skipping_windows_does_not_change_scores() {
        let pairs = [
            ("rendez-vous", "on se fait un rendez vous demain soir"),
            ("خارج المنصه", "نتقابل خارج المنصه غدا ان شاء الله"),
            ("رقم الهاتف", "هل يمكن تاجير المعدات لمده سنه؟"),
            ("aab", "abababbbaaab"),
            ("instagram", "salam"),
        ];
        for (needle, haystack) in pairs {
            assert_eq!(
                score(needle, haystack),
                slow_score(needle, haystack),
                "{} in {}",
                needle,
                haystack
            );
        }
    }
}
