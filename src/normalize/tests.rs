use super::*;

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "\t\n  \r\n",
    "What is   the capital\tof France?",
    "  leading and trailing  ",
    "bell\u{7}char",
    "a \u{0} b",
    "\u{1b}[31mred\u{1b}[0m",
    "全角　スペース？",
    "Hello,   WORLD!!  How's it going?",
    "mixed\u{85}next line",
];

#[test]
fn test_empty_and_whitespace_normalize_to_empty() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   "), "");
    assert_eq!(normalize("\n\t \r"), "");
}

#[test]
fn test_trims_and_collapses_whitespace() {
    assert_eq!(
        normalize("  What is   the capital\tof\n\nFrance?  "),
        "What is the capital of France?"
    );
}

#[test]
fn test_strips_control_characters() {
    assert_eq!(normalize("bell\u{7}char"), "bellchar");
    assert_eq!(normalize("nul\u{0}"), "nul");
}

#[test]
fn test_stripping_control_between_spaces_recollapses() {
    assert_eq!(normalize("a \u{0} b"), "a b");
    assert_eq!(normalize("\u{0} a"), "a");
}

#[test]
fn test_normalize_is_idempotent() {
    for sample in SAMPLES {
        let once = normalize(sample);
        let twice = normalize(&once);
        assert_eq!(once, twice, "normalize not idempotent for {:?}", sample);
    }
}

#[test]
fn test_normalize_preserves_case_and_punctuation() {
    assert_eq!(normalize("What's UP, Doc?"), "What's UP, Doc?");
}

#[test]
fn test_aggressive_lowercases_and_strips_punctuation() {
    assert_eq!(
        normalize_aggressive("What's the Capital of FRANCE?!"),
        "whats the capital of france?"
    );
}

#[test]
fn test_aggressive_keeps_full_width_question_mark() {
    assert_eq!(normalize_aggressive("天气怎么样？"), "天气怎么样？");
}

#[test]
fn test_aggressive_recollapses_after_punctuation_removal() {
    assert_eq!(normalize_aggressive("a - b"), "a b");
    assert_eq!(normalize_aggressive("- leading"), "leading");
}

#[test]
fn test_aggressive_is_idempotent() {
    for sample in SAMPLES {
        let once = normalize_aggressive(sample);
        assert_eq!(once, normalize_aggressive(&once), "sample {:?}", sample);
    }
}

#[test]
fn test_modes_are_independent() {
    let input = "  Is It RAINING?  ";
    assert_eq!(NormalizeMode::Standard.apply(input), "Is It RAINING?");
    assert_eq!(NormalizeMode::Aggressive.apply(input), "is it raining?");
    assert_eq!(NormalizeMode::Disabled.apply(input), input);
}

#[test]
fn test_mode_from_str() {
    assert_eq!(
        "aggressive".parse::<NormalizeMode>(),
        Ok(NormalizeMode::Aggressive)
    );
    assert_eq!("OFF".parse::<NormalizeMode>(), Ok(NormalizeMode::Disabled));
    assert_eq!(
        "standard".parse::<NormalizeMode>(),
        Ok(NormalizeMode::Standard)
    );
    assert!("loud".parse::<NormalizeMode>().is_err());
}
