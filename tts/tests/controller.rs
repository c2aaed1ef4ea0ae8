use std::sync::{Arc, atomic::Ordering};
use tts::{
    BoundaryKind, EngineEvent, EngineFailure, EventDrivenBackend, NarrationError, NarrationEvent,
    PlaybackController, PlaybackState, SpeakOptions, SynthesisBackend, Voice, WordBoundary,
};

use fake_engine::{ScriptedEngine, assert_quiet, collect_until_done, next_event};

const TEXT: &str = "Hi there. How are you? Fine!";

fn controller(engine: &Arc<ScriptedEngine>) -> PlaybackController {
    let backend = Arc::new(EventDrivenBackend::new(engine.clone())) as Arc<dyn SynthesisBackend>;
    PlaybackController::new(backend)
}

fn boundary(char_index: usize, char_length: usize, sentence_index: usize) -> NarrationEvent {
    NarrationEvent::WordBoundary(WordBoundary {
        char_index,
        char_length,
        sentence_index,
    })
}

#[tokio::test]
async fn narrates_every_sentence_then_ends_once() {
    let engine = ScriptedEngine::automatic();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    let events = collect_until_done(&mut rx).await;

    assert_eq!(
        events,
        vec![
            boundary(0, 9, 0),
            boundary(0, 2, 0),
            boundary(3, 6, 0),
            boundary(10, 12, 1),
            boundary(10, 3, 1),
            boundary(14, 3, 1),
            boundary(18, 4, 1),
            boundary(23, 5, 2),
            boundary(23, 5, 2),
            NarrationEvent::End,
        ]
    );
    assert_eq!(engine.spoken(), vec!["Hi there.", "How are you?", "Fine!"]);
    assert_eq!(ctl.state().await, PlaybackState::Finished);
    assert_quiet(&mut rx).await;

    ctl.resume().await;
    assert_eq!(ctl.state().await, PlaybackState::Finished);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn progress_reaches_completion_on_last_word() {
    let engine = ScriptedEngine::automatic();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    let events = collect_until_done(&mut rx).await;
    let total = ctl.text_len().await;
    let last = events
        .iter()
        .rev()
        .find_map(|e| match e {
            NarrationEvent::WordBoundary(b) => Some(*b),
            _ => None,
        })
        .unwrap();
    assert_eq!(last.progress(total), 1.0);
}

#[tokio::test]
async fn empty_text_finishes_immediately() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak("   ", SpeakOptions::default()).await;
    assert_eq!(next_event(&mut rx).await, NarrationEvent::End);
    assert_eq!(ctl.state().await, PlaybackState::Finished);
    assert!(engine.spoken().is_empty());
}

#[tokio::test]
async fn starts_at_requested_sentence() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default().starting_at(2)).await;
    engine.wait_for_utterances(1).await;
    assert_eq!(engine.spoken(), vec!["Fine!"]);
    assert_eq!(next_event(&mut rx).await, boundary(23, 5, 2));
    assert_eq!(ctl.current_sentence_index().await, 2);
}

#[tokio::test]
async fn stop_is_silent_and_disables_pause_resume() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    assert_eq!(next_event(&mut rx).await, boundary(0, 9, 0));

    let before = engine.cancels.load(Ordering::SeqCst);
    ctl.stop().await;
    assert_eq!(ctl.state().await, PlaybackState::Idle);
    assert_eq!(engine.cancels.load(Ordering::SeqCst), before + 1);
    assert_quiet(&mut rx).await;

    ctl.pause().await;
    assert_eq!(ctl.state().await, PlaybackState::Idle);
    ctl.resume().await;
    assert_eq!(ctl.state().await, PlaybackState::Idle);
    assert_eq!(engine.pauses.load(Ordering::SeqCst), 0);
    assert_eq!(engine.resumes.load(Ordering::SeqCst), 0);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn out_of_range_skip_is_a_noop() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;
    let cancels = engine.cancels.load(Ordering::SeqCst);

    ctl.skip_to_sentence(3).await;
    ctl.skip_to_sentence(usize::MAX).await;
    ctl.skip_backward().await;

    assert_eq!(ctl.current_sentence_index().await, 0);
    assert_eq!(ctl.state().await, PlaybackState::Speaking);
    assert_eq!(engine.spoken().len(), 1);
    assert_eq!(engine.cancels.load(Ordering::SeqCst), cancels);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn skips_restart_narration_at_target() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    ctl.skip_forward().await;
    engine.wait_for_utterances(2).await;
    assert_eq!(engine.spoken()[1], "How are you?");
    assert_eq!(next_event(&mut rx).await, boundary(10, 12, 1));
    assert_eq!(ctl.current_sentence_index().await, 1);

    ctl.skip_to_sentence(2).await;
    engine.wait_for_utterances(3).await;
    assert_eq!(next_event(&mut rx).await, boundary(23, 5, 2));

    ctl.skip_forward().await;
    assert_eq!(ctl.current_sentence_index().await, 2);

    ctl.skip_backward().await;
    engine.wait_for_utterances(4).await;
    assert_eq!(engine.spoken()[3], "How are you?");
    // One cancel per restart, including the initial speak.
    assert_eq!(engine.cancels.load(Ordering::SeqCst), 4);
    assert_eq!(ctl.state().await, PlaybackState::Speaking);
}

#[tokio::test]
async fn skip_while_paused_resumes_speaking() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    ctl.pause().await;
    ctl.skip_forward().await;

    assert_eq!(ctl.state().await, PlaybackState::Speaking);
    assert_eq!(ctl.current_sentence_index().await, 1);
}

#[tokio::test]
async fn engine_end_after_skip_continues_from_new_position() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    ctl.skip_forward().await;
    engine.wait_for_utterances(2).await;
    let _ = next_event(&mut rx).await;

    engine.emit(EngineEvent::End);
    engine.wait_for_utterances(3).await;
    assert_eq!(engine.spoken()[2], "Fine!");
    assert_eq!(ctl.current_sentence_index().await, 2);
}

#[tokio::test]
async fn synthesis_error_halts_without_advancing() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    engine.emit(EngineEvent::Error(EngineFailure::Synthesis("engine exploded".into())));
    assert_eq!(
        next_event(&mut rx).await,
        NarrationEvent::Error(NarrationError::Upstream("engine exploded".into()))
    );
    assert_eq!(ctl.state().await, PlaybackState::Error);
    assert_eq!(ctl.current_sentence_index().await, 0);
    assert_eq!(engine.spoken().len(), 1);
    assert_quiet(&mut rx).await;

    ctl.resume().await;
    assert_eq!(ctl.state().await, PlaybackState::Error);

    ctl.stop().await;
    assert_eq!(ctl.state().await, PlaybackState::Idle);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn interruptions_are_not_reported() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    engine.emit(EngineEvent::Error(EngineFailure::Interrupted));
    assert_quiet(&mut rx).await;
    assert_eq!(ctl.state().await, PlaybackState::Speaking);
}

#[tokio::test]
async fn pause_and_resume_delegate_to_engine() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;

    ctl.pause().await;
    ctl.pause().await;
    assert_eq!(ctl.state().await, PlaybackState::Paused);
    assert!(ctl.is_paused().await);
    assert_eq!(engine.pauses.load(Ordering::SeqCst), 1);

    ctl.resume().await;
    ctl.resume().await;
    assert_eq!(ctl.state().await, PlaybackState::Speaking);
    assert_eq!(engine.resumes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sentence_ending_while_paused_waits_for_resume() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    ctl.pause().await;
    engine.emit(EngineEvent::End);
    assert_quiet(&mut rx).await;
    assert_eq!(engine.spoken().len(), 1);
    assert_eq!(ctl.current_sentence_index().await, 1);
    assert_eq!(ctl.state().await, PlaybackState::Paused);

    ctl.resume().await;
    engine.wait_for_utterances(2).await;
    assert_eq!(next_event(&mut rx).await, boundary(10, 12, 1));
    assert_eq!(ctl.state().await, PlaybackState::Speaking);
}

#[tokio::test]
async fn missing_word_length_is_measured_from_text() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;

    engine.emit(EngineEvent::Boundary {
        kind: BoundaryKind::Word,
        char_index: 3,
        char_length: None,
    });
    assert_eq!(next_event(&mut rx).await, boundary(3, 6, 0));

    engine.emit(EngineEvent::Boundary {
        kind: BoundaryKind::Sentence,
        char_index: 0,
        char_length: Some(9),
    });
    engine.emit(EngineEvent::Boundary {
        kind: BoundaryKind::Word,
        char_index: 2,
        char_length: Some(0),
    });
    assert_eq!(next_event(&mut rx).await, boundary(2, 1, 0));
}

#[tokio::test]
async fn new_speak_replaces_running_session() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);
    let mut rx = ctl.subscribe();

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    let _ = next_event(&mut rx).await;
    ctl.skip_forward().await;
    engine.wait_for_utterances(2).await;
    let _ = next_event(&mut rx).await;

    ctl.speak("Second text. Short.", SpeakOptions::default().with_rate(1.5))
        .await;
    engine.wait_for_utterances(3).await;
    assert_eq!(next_event(&mut rx).await, boundary(0, 12, 0));
    assert_eq!(ctl.current_sentence_index().await, 0);
    assert_eq!(ctl.sentence_count().await, 2);
    assert_eq!(engine.utterances()[2].rate, 1.5);
}

#[tokio::test]
async fn rate_change_applies_from_next_sentence() {
    let engine = ScriptedEngine::manual();
    let ctl = controller(&engine);

    ctl.speak(TEXT, SpeakOptions::default()).await;
    engine.wait_for_utterances(1).await;
    ctl.set_rate(2.0).await;
    assert_eq!(engine.utterances()[0].rate, 1.0);

    engine.emit(EngineEvent::End);
    engine.wait_for_utterances(2).await;
    assert_eq!(engine.utterances()[1].rate, 2.0);
}

#[tokio::test]
async fn voice_is_matched_by_name() {
    let engine = ScriptedEngine::with_voices(vec![Voice::new("Alex", "en-US"), Voice::new("Anna", "de-DE")]);
    let ctl = controller(&engine);

    ctl.speak("One. Two.", SpeakOptions::default().with_voice("Anna"))
        .await;
    engine.wait_for_utterances(1).await;
    assert_eq!(engine.utterances()[0].voice, Some(Voice::new("Anna", "de-DE")));

    ctl.speak("One.", SpeakOptions::default().with_voice("Nobody"))
        .await;
    engine.wait_for_utterances(2).await;
    assert_eq!(engine.utterances()[1].voice, None);
}

#[tokio::test]
async fn voices_wait_for_catalog() {
    let engine = ScriptedEngine::manual();
    let ctl = Arc::new(controller(&engine));

    let pending = tokio::spawn({
        let ctl = ctl.clone();
        async move { ctl.voices().await }
    });
    tokio::task::yield_now().await;
    engine.publish_voices(vec![Voice::new("Alex", "en-US")]);

    let voices = pending.await.unwrap();
    assert_eq!(voices, vec![Voice::new("Alex", "en-US")]);
}
