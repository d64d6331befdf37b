// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ghost-text capitalization against the writer's preceding text.
//!
//! At a sentence boundary the first letter is uppercased; mid-sentence it is
//! lowercased. The pronoun "I" and all-caps words are left alone, as are
//! scripts without case.

const SENTENCE_END: &[char] = &['.', '!', '?', '。', '！', '？', '…'];

const CLOSERS: &[char] = &['"', '\'', '\u{201D}', '\u{2019}', ')', ']', '»', '」', '』'];

/// Whether a continuation of `preceding` starts a new sentence.
pub fn at_sentence_boundary(preceding: &str) -> bool {
    let trimmed = preceding.trim_end_matches([' ', '\t']);
    if trimmed.is_empty() || trimmed.ends_with('\n') {
        return true;
    }
    let trimmed = trimmed.trim_end();
    let body = trimmed.trim_end_matches(CLOSERS);
    body.ends_with(SENTENCE_END)
}

fn keeps_own_case(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if word == "I" || word.starts_with("I'") || word.starts_with("I\u{2019}") {
        return true;
    }
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

/// Correct the first letter of `ghost` for where it lands in the text.
pub fn fix_ghost_capitalization(ghost: &str, preceding: &str) -> String {
    let Some((idx, first)) = ghost.char_indices().find(|(_, c)| !c.is_whitespace()) else {
        return ghost.to_string();
    };
    if !first.is_uppercase() && !first.is_lowercase() {
        return ghost.to_string();
    }

    let rest = &ghost[idx + first.len_utf8()..];
    let replacement: String = if at_sentence_boundary(preceding) {
        first.to_uppercase().collect()
    } else {
        let word_end = ghost[idx..]
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '!' | '?'))
            .map_or(ghost.len(), |n| idx + n);
        if keeps_own_case(&ghost[idx..word_end]) {
            return ghost.to_string();
        }
        first.to_lowercase().collect()
    };
    format!("{}{replacement}{rest}", &ghost[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_after_sentence_end() {
        assert_eq!(fix_ghost_capitalization(" even so", "I finished it."), " Even so");
    }

    #[test]
    fn lowercases_mid_sentence() {
        assert_eq!(
            fix_ghost_capitalization(" And the sky", "I looked up at"),
            " and the sky"
        );
    }

    #[test]
    fn keeps_pronoun_i_mid_sentence() {
        assert_eq!(fix_ghost_capitalization(" I think", "and then"), " I think");
        assert_eq!(fix_ghost_capitalization(" I'm not sure", "and"), " I'm not sure");
        assert_eq!(fix_ghost_capitalization(" NASA called", "then"), " NASA called");
    }

    #[test]
    fn closing_quotes_do_not_hide_sentence_end() {
        assert_eq!(fix_ghost_capitalization(" then", "she said \"no.\""), " Then");
        assert_eq!(fix_ghost_capitalization(" then", "(it was late.)"), " Then");
    }

    #[test]
    fn cjk_sentence_end_counts() {
        assert!(at_sentence_boundary("終わった。"));
        assert!(at_sentence_boundary("本当に？"));
    }

    #[test]
    fn empty_or_new_paragraph_is_a_boundary() {
        assert_eq!(fix_ghost_capitalization(" maybe", ""), " Maybe");
        assert_eq!(fix_ghost_capitalization(" maybe", "Some line\n"), " Maybe");
    }

    #[test]
    fn caseless_scripts_pass_through() {
        assert_eq!(fix_ghost_capitalization(" 然后", "我"), " 然后");
        assert_eq!(fix_ghost_capitalization(" 然后", "好。"), " 然后");
    }

    #[test]
    fn non_latin_cased_scripts_are_handled() {
        assert_eq!(fix_ghost_capitalization(" и дальше", "Конец."), " И дальше");
        assert_eq!(fix_ghost_capitalization(" Και", "και"), " και");
    }
}
