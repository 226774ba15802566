// State, label and feature identifiers shared by the trie and the transducer.

use hashbrown::HashSet;

/// Automaton state identifier. States are numbered from 1; 0 is [`NO_STATE`].
pub type State = u32;

/// Integer-coded symbol on a transition, usually a Unicode scalar value.
pub type Label = u32;

/// Final feature tag attached to an accepting state.
pub type Feature = u32;

/// Set of final features of an accepting state.
///
/// Non-accepting states have no set at all; an owning structure never stores
/// an empty one.
pub type FinalSet = HashSet<Feature>;

/// Sentinel meaning "no such state" or "no such transition".
pub const NO_STATE: State = 0;

/// The start state of every automaton.
pub const START_STATE: State = 1;

/// The epsilon label: consumes no input on the input side, emits nothing on
/// the output side.
pub const EPSILON: Label = 0;

/// Largest label that fits one half of a packed label.
pub const MAX_PACKED_HALF: Label = 0xFFFF;

/// Pack an input/output label pair into a single transition label.
///
/// The input label occupies the high 16 bits and the output label the low 16
/// bits. Returns `None` if either label does not fit in 16 bits.
#[inline]
pub fn pack_label(input: Label, output: Label) -> Option<Label> {
    if input > MAX_PACKED_HALF || output > MAX_PACKED_HALF {
        return None;
    }
    Some((input << 16) | output)
}

/// Split a packed transition label into `(input, output)`.
#[inline]
pub fn unpack_label(packed: Label) -> (Label, Label) {
    (packed >> 16, packed & MAX_PACKED_HALF)
}

/// Align an input and an output sequence position by position into packed
/// labels, padding the shorter side with [`EPSILON`].
///
/// Returns `None` if any label does not fit in 16 bits.
pub fn pack_aligned(input: &[Label], output: &[Label]) -> Option<Vec<Label>> {
    let len = input.len().max(output.len());
    (0..len)
        .map(|i| {
            let a = input.get(i).copied().unwrap_or(EPSILON);
            let b = output.get(i).copied().unwrap_or(EPSILON);
            pack_label(a, b)
        })
        .collect()
}

/// Convert a character to its label.
#[inline]
pub fn char_label(c: char) -> Label {
    c as Label
}

/// Convert a label back to a character.
///
/// Labels that are not Unicode scalar values (e.g. lone UTF-16 surrogates
/// from 16-bit packed data) map to U+FFFD.
#[inline]
pub fn label_char(label: Label) -> char {
    char::from_u32(label).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Render a label sequence as a string, skipping epsilon labels.
pub fn labels_to_string(labels: &[Label]) -> String {
    labels
        .iter()
        .filter(|&&l| l != EPSILON)
        .map(|&l| label_char(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_places_input_high() {
        assert_eq!(pack_label(0x61, 0x62), Some(0x0061_0062));
        assert_eq!(unpack_label(0x0061_0062), (0x61, 0x62));
    }

    #[test]
    fn pack_epsilon_halves() {
        assert_eq!(pack_label(EPSILON, 'x' as Label), Some('x' as Label));
        assert_eq!(unpack_label('x' as Label), (EPSILON, 'x' as Label));
        assert_eq!(unpack_label(('y' as Label) << 16), ('y' as Label, EPSILON));
    }

    #[test]
    fn pack_rejects_wide_labels() {
        assert_eq!(pack_label(0x1_0000, 1), None);
        assert_eq!(pack_label(1, 0x1F600), None);
        assert_eq!(pack_label(0xFFFF, 0xFFFF), Some(0xFFFF_FFFF));
    }

    #[test]
    fn pack_aligned_pads_shorter_side() {
        let input = ['a' as Label, 'b' as Label];
        let output = ['x' as Label];
        assert_eq!(
            pack_aligned(&input, &output),
            Some(vec![0x0061_0078, 0x0062_0000])
        );
        assert_eq!(
            pack_aligned(&output, &input),
            Some(vec![0x0078_0061, 0x0000_0062])
        );
        assert_eq!(pack_aligned(&[], &[]), Some(vec![]));
        assert_eq!(pack_aligned(&[0x1F600], &[]), None);
    }

    #[test]
    fn label_char_conversion() {
        assert_eq!(char_label('\u{00E4}'), 0xE4);
        assert_eq!(label_char(0xE4), '\u{00E4}');
        assert_eq!(label_char(0xD800), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn labels_to_string_skips_epsilon() {
        let labels = ['c' as Label, EPSILON, 'a' as Label, 't' as Label];
        assert_eq!(labels_to_string(&labels), "cat");
        assert_eq!(labels_to_string(&[]), "");
    }
}
