use readaloud::{Highlighter, progress_bar};
use tts::WordBoundary;

const TEXT: &str = "Hi there. How are you? Fine!";

#[test]
fn brackets_active_word_within_its_sentence() {
    let h = Highlighter::new(TEXT, 10);
    let line = h.render(&WordBoundary {
        char_index: 14,
        char_length: 3,
        sentence_index: 1,
    });
    assert_eq!(line, "How [are] you? [######----]  61%");
}

#[test]
fn whole_sentence_boundary_brackets_everything() {
    let h = Highlighter::new(TEXT, 4);
    let line = h.render(&WordBoundary {
        char_index: 0,
        char_length: 9,
        sentence_index: 0,
    });
    assert_eq!(line, "[Hi there.] [#---]  32%");
}

#[test]
fn mismatched_boundary_renders_plain_sentence() {
    let h = Highlighter::new(TEXT, 4);
    let line = h.render(&WordBoundary {
        char_index: 2,
        char_length: 3,
        sentence_index: 2,
    });
    assert!(line.starts_with("Fine! ["));
}

#[test]
fn progress_bar_is_clamped() {
    assert_eq!(progress_bar(0.0, 4), "[----]   0%");
    assert_eq!(progress_bar(1.0, 4), "[####] 100%");
    assert_eq!(progress_bar(7.5, 4), "[####] 100%");
}
