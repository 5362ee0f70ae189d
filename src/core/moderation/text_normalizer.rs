// Text normalization for phrase matching.
//
// Message and catalog phrase go through the same function so that spelling
// variants compare equal:
// - Unicode NFC
// - Arabic diacritics (tashkeel) and tatweel dropped
// - alef variants -> bare alef, ta marbuta -> ha, alef maksura -> ya
// - lower-case (Latin script)
// - whitespace runs collapsed to one space, trimmed

use unicode_normalization::UnicodeNormalization;

const ALEF: char = '\u{0627}';
const HA: char = '\u{0647}';
const YA: char = '\u{064A}';
const TATWEEL: char = '\u{0640}';

/// Alef with hamza above/below, alef with madda, alef wasla.
const ALEF_VARIANTS: &[char] = &['\u{0623}', '\u{0625}', '\u{0622}', '\u{0671}'];
const TA_MARBUTA: char = '\u{0629}';
const ALEF_MAKSURA: char = '\u{0649}';

fn is_arabic_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn unify_letter(c: char) -> char {
    if ALEF_VARIANTS.contains(&c) {
        ALEF
    } else if c == TA_MARBUTA {
        HA
    } else if c == ALEF_MAKSURA {
        YA
    } else {
        c
    }
}

/// Canonicalize `text` for comparison. Idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    // Start true so leading whitespace is skipped.
    let mut last_was_space = true;

    for c in text.nfc() {
        if c == TATWEEL || is_arabic_diacritic(c) {
            continue;
        }

        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }

        out.extend(unify_letter(c).to_lowercase());
        last_was_space = false;
    }

    if out.ends_with(' ') {
        out.pop();
    }

    // Dropping marks can bring a base letter next to a mark it now composes with.
    out.nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alef_variants_unified() {
        assert_eq!(normalize("أحمد"), "احمد");
        assert_eq!(normalize("إيميل"), "ايميل");
        assert_eq!(normalize("آخر"), "اخر");
        assert_eq!(normalize("ٱلله"), "الله");
    }

    #[test]
    fn test_ta_marbuta_and_alef_maksura() {
        assert_eq!(normalize("مكالمة"), "مكالمه");
        assert_eq!(normalize("على"), "علي");
    }

    #[test]
    fn test_diacritics_and_tatweel_removed() {
        assert_eq!(normalize("رَاسِلْنِي"), "راسلني");
        assert_eq!(normalize("واتـــساب"), "واتساب");
    }

    #[test]
    fn test_decomposed_hamza_composes_then_unifies() {
        // alef + combining hamza above composes to U+0623 before unification
        assert_eq!(normalize("\u{0627}\u{0654}رسل"), "ارسل");
    }

    #[test]
    fn test_latin_lowercase_and_nfc() {
        assert_eq!(normalize("WhatsApp"), "whatsapp");
        // e + combining acute -> precomposed é
        assert_eq!(normalize("nume\u{0301}ro"), "numéro");
        assert_eq!(normalize("NUMÉRO"), "numéro");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize("  اتصل   بي \n\t الآن  "), "اتصل بي الان");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            " ",
            "اتصل بي على 0551234567",
            "راسلني على واتساب من فضلك",
            "مرحبا، متحمس للمشروع، هل يمكننا مناقشة التفاصيل هنا؟",
            "أَعُوذُ بِاللهِ",
            "\u{0627}\u{0654}\u{0654}",
            "\u{0623}\u{0654}",
            "e\u{0654}\u{0301}",
            "ÉCRIS-MOI SUR Instagram",
            "İstanbul ǅ ß ﬁ",
            "مكالمة زوم على سكايب",
            "\u{200F}mixed\u{00A0}spaces\u{2003}here",
            "Ω ω ℃ Å",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

}
