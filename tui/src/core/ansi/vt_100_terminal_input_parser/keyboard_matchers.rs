// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Keyboard pattern matchers: small recognizers that turn a complete
//! [`EscapeSequence`] into a [`Key`].
//!
//! | Matcher               | Sequences                                  | Overlapping |
//! | :-------------------- | :----------------------------------------- | :---------- |
//! | `ss3_key`             | `ESC O P..S`, `ESC O A..D`, `ESC O H/F`    | no          |
//! | `csi_arrow`           | `CSI A..D`, `CSI 1 ; m A..D`               | no          |
//! | `csi_function_key`    | `CSI n ~`, `CSI n ; m ~`, rxvt `$ ^ @`     | no          |
//! | `csi_navigation`      | `CSI H`, `CSI F`, `CSI Z`, `CSI 1 ; m H/F` | no          |
//! | `csi_modified_f1_f4`  | `CSI 1 ; m P..S`                           | yes         |
//!
//! The last one is "overlapping": `CSI 1 ; 2 R` is Shift+F3 to some terminals and a
//! cursor position report (row 1, col 2) to every terminal. Overlapping matchers are
//! only tried after the terminal reply recognizers have had a chance.
//!
//! # Modifier parameter
//!
//! `m = 1 + bits` where Shift=1, Alt=2, Ctrl=4. Codes outside `2..=8` leave the key
//! unmodified.

use super::{EscapeSequence, Key, KeyCode, KeyModifiers, ControlPrefix};
use crate::core::ansi::constants::{ANSI_FUNCTION_KEY_TERMINATOR, ARROW_DOWN_FINAL,
                                   ARROW_KEY_MODIFIER_BASE, ARROW_LEFT_FINAL,
                                   ARROW_RIGHT_FINAL, ARROW_UP_FINAL, BACKTAB_FINAL,
                                   MODIFIER_ALT, MODIFIER_CTRL, MODIFIER_PARAM_MAX,
                                   MODIFIER_PARAM_MIN, MODIFIER_SHIFT,
                                   SPECIAL_DELETE_CODE, SPECIAL_END_ALT1_CODE,
                                   SPECIAL_END_ALT2_CODE, SPECIAL_END_FINAL,
                                   SPECIAL_HOME_ALT1_CODE, SPECIAL_HOME_ALT2_CODE,
                                   SPECIAL_HOME_FINAL, SPECIAL_INSERT_CODE,
                                   SPECIAL_PAGE_DOWN_CODE, SPECIAL_PAGE_UP_CODE,
                                   SS3_F1_FINAL, SS3_F2_FINAL, SS3_F3_FINAL,
                                   SS3_F4_FINAL};
use std::{collections::HashMap, fmt::Debug};

/// Decode a modifier parameter using the fixed table:
///
/// | m | modifiers        |
/// |---|------------------|
/// | 2 | Shift            |
/// | 3 | Alt              |
/// | 4 | Alt+Shift        |
/// | 5 | Ctrl             |
/// | 6 | Ctrl+Shift       |
/// | 7 | Ctrl+Alt         |
/// | 8 | Ctrl+Alt+Shift   |
#[must_use]
pub fn decode_modifier_param(m: u16) -> KeyModifiers {
    if !(MODIFIER_PARAM_MIN..=MODIFIER_PARAM_MAX).contains(&m) {
        return KeyModifiers::NONE;
    }
    let bits = m - 1;
    KeyModifiers {
        shift: bits & MODIFIER_SHIFT != 0,
        alt: bits & MODIFIER_ALT != 0,
        ctrl: bits & MODIFIER_CTRL != 0,
    }
}

pub trait KeyboardPatternMatcher: Debug + Send {
    /// Stable name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Overlapping matchers share their shape with terminal replies and are tried last.
    fn is_overlapping(&self) -> bool { false }

    /// Structural check only.
    fn matches(&self, seq: &EscapeSequence) -> bool;

    fn decode(&self, seq: &EscapeSequence) -> Option<Key>;
}

/// Accepts `[]`, `[1]`, or `[1, m]` and returns the modifiers.
fn modifiers_from_optional_param(seq: &EscapeSequence) -> Option<KeyModifiers> {
    match seq.params.as_slice() {
        [] | [ARROW_KEY_MODIFIER_BASE] => Some(KeyModifiers::NONE),
        [ARROW_KEY_MODIFIER_BASE, m] => Some(decode_modifier_param(*m)),
        _ => None,
    }
}

fn arrow_code(terminator: char) -> Option<KeyCode> {
    match terminator {
        ARROW_UP_FINAL => Some(KeyCode::Up),
        ARROW_DOWN_FINAL => Some(KeyCode::Down),
        ARROW_RIGHT_FINAL => Some(KeyCode::Right),
        ARROW_LEFT_FINAL => Some(KeyCode::Left),
        _ => None,
    }
}

fn f1_to_f4(terminator: char) -> Option<KeyCode> {
    match terminator {
        SS3_F1_FINAL => Some(KeyCode::Function(1)),
        SS3_F2_FINAL => Some(KeyCode::Function(2)),
        SS3_F3_FINAL => Some(KeyCode::Function(3)),
        SS3_F4_FINAL => Some(KeyCode::Function(4)),
        _ => None,
    }
}

/// `ESC O <final>`: F1-F4, arrows, Home and End in application mode.
#[derive(Debug, Default)]
pub struct Ss3KeyMatcher;

impl KeyboardPatternMatcher for Ss3KeyMatcher {
    fn name(&self) -> &'static str { "ss3_key" }

    fn matches(&self, seq: &EscapeSequence) -> bool {
        seq.prefix == ControlPrefix::Ss3 && seq.code.is_none()
    }

    fn decode(&self, seq: &EscapeSequence) -> Option<Key> {
        let modifiers = modifiers_from_optional_param(seq)?;
        let code = match seq.terminator {
            SPECIAL_HOME_FINAL => KeyCode::Home,
            SPECIAL_END_FINAL => KeyCode::End,
            it => f1_to_f4(it).or_else(|| arrow_code(it))?,
        };
        Some(Key::new(code, modifiers))
    }
}

/// `CSI A..D` with an optional `1 ; m` modifier.
#[derive(Debug, Default)]
pub struct CsiArrowMatcher;

impl KeyboardPatternMatcher for CsiArrowMatcher {
    fn name(&self) -> &'static str { "csi_arrow" }

    fn matches(&self, seq: &EscapeSequence) -> bool {
        seq.prefix == ControlPrefix::Csi
            && seq.code.is_none()
            && arrow_code(seq.terminator).is_some()
    }

    fn decode(&self, seq: &EscapeSequence) -> Option<Key> {
        Some(Key::new(
            arrow_code(seq.terminator)?,
            modifiers_from_optional_param(seq)?,
        ))
    }
}

/// `CSI n ~` with an optional `; m` modifier. The rxvt family reports modifiers through
/// the terminator instead: `$` Shift, `^` Ctrl, `@` Ctrl+Shift.
#[derive(Debug, Default)]
pub struct CsiFunctionKeyMatcher;

impl CsiFunctionKeyMatcher {
    #[rustfmt::skip]
    fn code_for(n: u16) -> Option<KeyCode> {
        Some(match n {
            SPECIAL_HOME_ALT1_CODE | SPECIAL_HOME_ALT2_CODE => KeyCode::Home,
            SPECIAL_END_ALT1_CODE | SPECIAL_END_ALT2_CODE   => KeyCode::End,
            SPECIAL_INSERT_CODE                             => KeyCode::Insert,
            SPECIAL_DELETE_CODE                             => KeyCode::Delete,
            SPECIAL_PAGE_UP_CODE                            => KeyCode::PageUp,
            SPECIAL_PAGE_DOWN_CODE                          => KeyCode::PageDown,
            11..=15 => KeyCode::Function(u8::try_from(n - 10).ok()?),
            17..=21 => KeyCode::Function(u8::try_from(n - 11).ok()?),
            23..=26 => KeyCode::Function(u8::try_from(n - 12).ok()?),
            28..=29 => KeyCode::Function(u8::try_from(n - 13).ok()?),
            31..=34 => KeyCode::Function(u8::try_from(n - 14).ok()?),
            _ => return None,
        })
    }

    fn terminator_modifiers(terminator: char) -> Option<KeyModifiers> {
        match terminator {
            ANSI_FUNCTION_KEY_TERMINATOR => Some(KeyModifiers::NONE),
            '$' => Some(KeyModifiers::SHIFT),
            '^' => Some(KeyModifiers::CTRL),
            '@' => Some(KeyModifiers::CTRL.with_shift()),
            _ => None,
        }
    }
}

impl KeyboardPatternMatcher for CsiFunctionKeyMatcher {
    fn name(&self) -> &'static str { "csi_function_key" }

    fn matches(&self, seq: &EscapeSequence) -> bool {
        seq.prefix == ControlPrefix::Csi
            && seq.code.is_none()
            && Self::terminator_modifiers(seq.terminator).is_some()
            && matches!(seq.params.len(), 1 | 2)
    }

    fn decode(&self, seq: &EscapeSequence) -> Option<Key> {
        let code = Self::code_for(seq.param(0)?)?;
        let from_terminator = Self::terminator_modifiers(seq.terminator)?;
        let from_param = seq.param(1).map_or(KeyModifiers::NONE, decode_modifier_param);
        Some(Key::new(code, from_terminator.union(from_param)))
    }
}

/// `CSI H` (Home), `CSI F` (End), `CSI Z` (`BackTab`), with an optional `1 ; m`.
#[derive(Debug, Default)]
pub struct CsiNavigationMatcher;

impl KeyboardPatternMatcher for CsiNavigationMatcher {
    fn name(&self) -> &'static str { "csi_navigation" }

    fn matches(&self, seq: &EscapeSequence) -> bool {
        seq.prefix == ControlPrefix::Csi
            && seq.code.is_none()
            && matches!(
                seq.terminator,
                SPECIAL_HOME_FINAL | SPECIAL_END_FINAL | BACKTAB_FINAL
            )
    }

    fn decode(&self, seq: &EscapeSequence) -> Option<Key> {
        let modifiers = modifiers_from_optional_param(seq)?;
        Some(match seq.terminator {
            SPECIAL_HOME_FINAL => Key::new(KeyCode::Home, modifiers),
            SPECIAL_END_FINAL => Key::new(KeyCode::End, modifiers),
            BACKTAB_FINAL => Key::new(KeyCode::BackTab, modifiers.with_shift()),
            _ => return None,
        })
    }
}

/// `CSI 1 ; m P..S`: modified F1-F4 (xterm). Overlaps with cursor position reports.
#[derive(Debug, Default)]
pub struct CsiModifiedF1F4Matcher;

impl KeyboardPatternMatcher for CsiModifiedF1F4Matcher {
    fn name(&self) -> &'static str { "csi_modified_f1_f4" }

    fn is_overlapping(&self) -> bool { true }

    fn matches(&self, seq: &EscapeSequence) -> bool {
        seq.prefix == ControlPrefix::Csi
            && seq.code.is_none()
            && f1_to_f4(seq.terminator).is_some()
            && matches!(seq.params.as_slice(), [ARROW_KEY_MODIFIER_BASE, m]
                if (MODIFIER_PARAM_MIN..=MODIFIER_PARAM_MAX).contains(m))
    }

    fn decode(&self, seq: &EscapeSequence) -> Option<Key> {
        Some(Key::new(
            f1_to_f4(seq.terminator)?,
            decode_modifier_param(seq.param(1)?),
        ))
    }
}

/// The ordered set of matchers, plus diagnostics about which one recognized the most
/// recent sequence. The diagnostics never affect matching.
#[derive(Debug)]
pub struct KeyboardMatchers {
    matchers: Vec<Box<dyn KeyboardPatternMatcher>>,
    last_matcher: Option<&'static str>,
    hit_counts: HashMap<&'static str, u64>,
}

impl Default for KeyboardMatchers {
    fn default() -> Self {
        Self::new(vec![
            Box::new(Ss3KeyMatcher),
            Box::new(CsiArrowMatcher),
            Box::new(CsiFunctionKeyMatcher),
            Box::new(CsiNavigationMatcher),
            Box::new(CsiModifiedF1F4Matcher),
        ])
    }
}

impl KeyboardMatchers {
    /// Matchers are tried in the order given.
    #[must_use]
    pub fn new(matchers: Vec<Box<dyn KeyboardPatternMatcher>>) -> Self {
        Self {
            matchers,
            last_matcher: None,
            hit_counts: HashMap::new(),
        }
    }

    /// Try the matchers whose [`KeyboardPatternMatcher::is_overlapping`] equals
    /// `overlapping`, in priority order. The first structural match that also decodes
    /// wins.
    pub fn try_match(&mut self, seq: &EscapeSequence, overlapping: bool) -> Option<Key> {
        let (name, key) = self
            .matchers
            .iter()
            .filter(|it| it.is_overlapping() == overlapping && it.matches(seq))
            .find_map(|it| it.decode(seq).map(|key| (it.name(), key)))?;
        self.last_matcher = Some(name);
        *self.hit_counts.entry(name).or_default() += 1;
        Some(key)
    }

    #[must_use]
    pub fn last_matcher_name(&self) -> Option<&'static str> { self.last_matcher }

    #[must_use]
    pub fn hit_count(&self, name: &str) -> u64 {
        self.hit_counts.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod test_fixtures {
    pub use super::*;
    pub use pretty_assertions::assert_eq;
    pub use smallvec::SmallVec;

    pub fn seq(prefix: ControlPrefix, params: &[u16], terminator: char) -> EscapeSequence {
        EscapeSequence {
            prefix,
            code: None,
            params: params.iter().copied().collect::<SmallVec<_>>(),
            terminator,
        }
    }

    pub fn csi(params: &[u16], terminator: char) -> EscapeSequence {
        seq(ControlPrefix::Csi, params, terminator)
    }
}


#[cfg(test)]
mod tests_matchers {
    use super::test_fixtures::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case('P', 1)]
    #[test_case('Q', 2)]
    #[test_case('R', 3)]
    #[test_case('S', 4)]
    fn ss3_function_keys(terminator: char, n: u8) {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(
            matchers.try_match(&seq(ControlPrefix::Ss3, &[], terminator), false),
            Some(Key::plain(KeyCode::Function(n)))
        );
        assert_eq!(matchers.last_matcher_name(), Some("ss3_key"));
    }

    #[test_case(&[11], KeyCode::Function(1))]
    #[test_case(&[15], KeyCode::Function(5))]
    #[test_case(&[17], KeyCode::Function(6))]
    #[test_case(&[21], KeyCode::Function(10))]
    #[test_case(&[23], KeyCode::Function(11))]
    #[test_case(&[24], KeyCode::Function(12))]
    #[test_case(&[34], KeyCode::Function(20))]
    #[test_case(&[2], KeyCode::Insert)]
    #[test_case(&[3], KeyCode::Delete)]
    #[test_case(&[5], KeyCode::PageUp)]
    #[test_case(&[6], KeyCode::PageDown)]
    #[test_case(&[1], KeyCode::Home)]
    #[test_case(&[7], KeyCode::Home)]
    #[test_case(&[4], KeyCode::End)]
    #[test_case(&[8], KeyCode::End)]
    fn tilde_keys(params: &[u16], expected: KeyCode) {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(
            matchers.try_match(&csi(params, '~'), false),
            Some(Key::plain(expected))
        );
    }

    #[test]
    fn tilde_key_with_modifier() {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(
            matchers.try_match(&csi(&[3, 5], '~'), false),
            Some(Key::new(KeyCode::Delete, KeyModifiers::CTRL))
        );
    }

    #[test]
    fn rxvt_terminator_modifiers() {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(
            matchers.try_match(&csi(&[2], '$'), false),
            Some(Key::new(KeyCode::Insert, KeyModifiers::SHIFT))
        );
        assert_eq!(
            matchers.try_match(&csi(&[5], '^'), false),
            Some(Key::new(KeyCode::PageUp, KeyModifiers::CTRL))
        );
    }

    #[test]
    fn unknown_tilde_code_is_not_a_key() {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(matchers.try_match(&csi(&[16], '~'), false), None);
        assert_eq!(matchers.try_match(&csi(&[200], '~'), false), None);
    }

    #[test]
    fn navigation_letters() {
        let mut matchers = KeyboardMatchers::default();
        assert_eq!(
            matchers.try_match(&csi(&[], 'H'), false),
            Some(Key::plain(KeyCode::Home))
        );
        assert_eq!(
            matchers.try_match(&csi(&[1, 2], 'F'), false),
            Some(Key::new(KeyCode::End, KeyModifiers::SHIFT))
        );
        assert_eq!(
            matchers.try_match(&csi(&[], 'Z'), false),
            Some(Key::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        );
        // Cursor position `CSI 10 ; 20 H` is output, never a key.
        assert_eq!(matchers.try_match(&csi(&[10, 20], 'H'), false), None);
    }

    #[test]
    fn overlapping_matcher_only_in_overlapping_pass() {
        let mut matchers = KeyboardMatchers::default();
        let shift_f3 = csi(&[1, 2], 'R');
        assert_eq!(matchers.try_match(&shift_f3, false), None);
        assert_eq!(
            matchers.try_match(&shift_f3, true),
            Some(Key::new(KeyCode::Function(3), KeyModifiers::SHIFT))
        );
        assert_eq!(matchers.last_matcher_name(), Some("csi_modified_f1_f4"));
    }

    #[test]
    fn hit_counts_are_tracked_per_matcher() {
        let mut matchers = KeyboardMatchers::default();
        matchers.try_match(&csi(&[], 'A'), false);
        matchers.try_match(&csi(&[], 'B'), false);
        matchers.try_match(&csi(&[3], '~'), false);
        matchers.try_match(&csi(&[99], '~'), false);
        assert_eq!(matchers.hit_count("csi_arrow"), 2);
        assert_eq!(matchers.hit_count("csi_function_key"), 1);
        assert_eq!(matchers.hit_count("ss3_key"), 0);
        assert_eq!(matchers.last_matcher_name(), Some("csi_function_key"));
    }
}
