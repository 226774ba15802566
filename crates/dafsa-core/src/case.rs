// Case folding for integer-coded labels.
//
// Only one-to-one mappings fold. Labels that are not characters, and
// characters whose case mapping expands to several characters (e.g. U+00DF
// uppercasing to "SS"), fold to themselves.

use crate::label::Label;

/// The sole character of a case mapping, or `c` when the mapping expands.
fn single_mapping(mut mapped: impl Iterator<Item = char>, c: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m,
        _ => c,
    }
}

/// Convert a character to its simple uppercase equivalent.
///
/// Characters with multi-character uppercase expansions are returned
/// unchanged.
pub fn simple_upper(c: char) -> char {
    single_mapping(c.to_uppercase(), c)
}

/// Convert a character to its simple lowercase equivalent.
pub fn simple_lower(c: char) -> char {
    single_mapping(c.to_lowercase(), c)
}

/// Uppercase form of a label. Non-character labels are returned unchanged.
#[inline]
pub fn upper_label(label: Label) -> Label {
    match char::from_u32(label) {
        Some(c) => simple_upper(c) as Label,
        None => label,
    }
}

/// Lowercase form of a label. Non-character labels are returned unchanged.
#[inline]
pub fn lower_label(label: Label) -> Label {
    match char::from_u32(label) {
        Some(c) => simple_lower(c) as Label,
        None => label,
    }
}

/// Alternative lookup keys for `label` under case folding, excluding `label`
/// itself.
///
/// The uppercase form comes first, then the lowercase form when it differs
/// from both. Returns at most two labels.
pub fn folded_alternatives(label: Label) -> FoldedLabels {
    let upper = upper_label(label);
    let lower = lower_label(label);
    let mut alts = FoldedLabels::default();
    if upper != label {
        alts.push(upper);
    }
    if lower != label && lower != upper {
        alts.push(lower);
    }
    alts
}

/// Up to two case-folded alternatives of a label, without allocating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldedLabels {
    labels: [Label; 2],
    len: usize,
}

impl FoldedLabels {
    fn push(&mut self, label: Label) {
        self.labels[self.len] = label;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.labels[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(c: char) -> Label {
        c as Label
    }

    #[test]
    fn simple_upper_basic_latin() {
        assert_eq!(simple_upper('a'), 'A');
        assert_eq!(simple_upper('A'), 'A');
        assert_eq!(simple_upper('\u{00E4}'), '\u{00C4}');
    }

    #[test]
    fn expanding_mappings_fold_to_self() {
        // ß uppercases to "SS", U+FB00 to "FF", U+0149 to "\u{02BC}N"
        assert_eq!(simple_upper('\u{00DF}'), '\u{00DF}');
        assert_eq!(upper_label(0xFB00), 0xFB00);
        assert_eq!(upper_label(0x0149), 0x0149);
        // U+0130 lowercases to "i\u{0307}"
        assert_eq!(lower_label(0x0130), 0x0130);
        assert!(folded_alternatives(l('\u{00DF}')).is_empty());
        assert!(folded_alternatives(0xFB00).is_empty());
    }

    #[test]
    fn upper_and_lower_labels() {
        assert_eq!(upper_label(l('c')), l('C'));
        assert_eq!(lower_label(l('C')), l('c'));
        assert_eq!(upper_label(l('1')), l('1'));
        assert_eq!(upper_label(0), 0);
    }

    #[test]
    fn non_char_labels_unchanged() {
        assert_eq!(upper_label(0xD800), 0xD800);
        assert_eq!(lower_label(0x11_0000), 0x11_0000);
    }

    #[test]
    fn alternatives_of_lowercase() {
        let alts = folded_alternatives(l('c'));
        assert_eq!(alts.as_slice(), &[l('C')]);
    }

    #[test]
    fn alternatives_of_uppercase() {
        let alts = folded_alternatives(l('C'));
        assert_eq!(alts.as_slice(), &[l('c')]);
    }

    #[test]
    fn alternatives_of_titlecase() {
        // U+01C5 (Dž): upper U+01C4, lower U+01C6
        let alts = folded_alternatives(0x01C5);
        assert_eq!(alts.as_slice(), &[0x01C4, 0x01C6]);
    }

    #[test]
    fn no_alternatives_for_epsilon_or_digits() {
        assert!(folded_alternatives(0).is_empty());
        assert!(folded_alternatives(l('7')).is_empty());
    }
}
